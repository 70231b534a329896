pub mod card;
pub mod game;
pub mod prompt;
pub mod term_render;

pub use card::{Card, JOKER, load_words};
pub use game::{GameView, Input, Outcome, play};
pub use prompt::Retry;
pub use term_render::{AnsiTermStyle, CellLook, Frame, PlainTermStyle, TermStyle};
