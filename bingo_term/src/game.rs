//! Foreground loop: board display, keyboard input and win detection

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use bingo_arena::{BingoError, Board, Coordinator};
use console::{Key, Term};

use crate::card::Card;
use crate::term_render::{AnsiTermStyle, Frame, PlainTermStyle};

const RENDER_INTERVAL: Duration = Duration::from_millis(50);
const MAX_BANNERS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    Left,
    Right,
    Toggle,
    Quit,
}

impl Input {
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::ArrowUp => Some(Input::Up),
            Key::ArrowDown => Some(Input::Down),
            Key::ArrowLeft => Some(Input::Left),
            Key::ArrowRight => Some(Input::Right),
            Key::Enter | Key::Char(' ') => Some(Input::Toggle),
            Key::Char('q') | Key::Char('Q') | Key::Escape | Key::CtrlC => Some(Input::Quit),
            _ => None,
        }
    }
}

/// What the loop has to do after an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Redraw,
    Bingo,
    Quit,
}

/// Card, marks and cursor of the local player
#[derive(Debug, Clone)]
pub struct GameView {
    card: Card,
    board: Board,
    cursor: (usize, usize),
}

impl GameView {
    pub fn new(card: Card) -> Self {
        let board = card.board();
        Self {
            card,
            board,
            cursor: (0, 0),
        }
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Apply one input. The cursor stops at the edges.
    pub fn apply(&mut self, input: Input) -> Outcome {
        let (row, col) = self.cursor;
        match input {
            Input::Up => self.cursor = (row.saturating_sub(1), col),
            Input::Down => self.cursor = ((row + 1).min(self.board.height().saturating_sub(1)), col),
            Input::Left => self.cursor = (row, col.saturating_sub(1)),
            Input::Right => self.cursor = (row, (col + 1).min(self.board.width().saturating_sub(1))),
            Input::Toggle => {
                self.board.toggle(row, col);
                if self.board.has_bingo() {
                    return Outcome::Bingo;
                }
            }
            Input::Quit => return Outcome::Quit,
        }
        Outcome::Redraw
    }
}

/// Run the board until the round ends and `grace` has passed, or the
/// player quits
pub async fn play(round: &Coordinator, card: Card, grace: Duration) -> anyhow::Result<()> {
    let (input_tx, input_rx) = flume::unbounded();

    // Keyboard input task with its own term
    let keyboard_task = tokio::task::spawn_blocking(move || {
        let input_term = Term::stdout();
        loop {
            let Ok(key) = input_term.read_key() else {
                break;
            };
            if let Some(input) = Input::from_key(&key)
                && (input_tx.send(input).is_err() || input == Input::Quit)
            {
                break;
            }
        }
    });

    let term = Term::stdout();
    term.hide_cursor()?;
    term.clear_screen()?;

    let mut view = GameView::new(card);
    let mut banners: VecDeque<String> = VecDeque::new();
    let mut finished_at: Option<Instant> = None;
    let mut ticker = tokio::time::interval(RENDER_INTERVAL);

    loop {
        tokio::select! {
            input = input_rx.recv_async() => {
                let Ok(input) = input else {
                    break;
                };
                if finished_at.is_some() && input != Input::Quit {
                    continue;
                }
                match view.apply(input) {
                    Outcome::Redraw => {}
                    Outcome::Bingo => accept_refusal(round.report_win().await)?,
                    Outcome::Quit => {
                        if finished_at.is_none() {
                            accept_refusal(round.report_abort().await)?;
                        }
                        draw(&term, round, &view, &banners)?;
                        break;
                    }
                }
            }
            _ = ticker.tick() => {}
        }

        for event in round.drain_events() {
            banners.push_back(event.to_string());
            if banners.len() > MAX_BANNERS {
                banners.pop_front();
            }
        }
        draw(&term, round, &view, &banners)?;

        match finished_at {
            None if round.snapshot().is_finished() => finished_at = Some(Instant::now()),
            Some(at) if at.elapsed() >= grace => break,
            _ => {}
        }
    }

    keyboard_task.abort();
    term.show_cursor()?;
    Ok(())
}

/// Another player may have finished the round between the local check and
/// the report
fn accept_refusal(result: bingo_arena::Result<()>) -> bingo_arena::Result<()> {
    match result {
        Err(BingoError::AlreadyReported) => Ok(()),
        other => other,
    }
}

fn draw(
    term: &Term,
    round: &Coordinator,
    view: &GameView,
    banners: &VecDeque<String>,
) -> std::io::Result<()> {
    let snapshot = round.snapshot();
    let banners: Vec<String> = banners.iter().cloned().collect();
    let frame = Frame {
        card: view.card(),
        board: view.board(),
        cursor: view.cursor(),
        player: round.player(),
        snapshot: &snapshot,
        banners: &banners,
    };
    let lines = if console::colors_enabled() {
        frame.render(&AnsiTermStyle)
    } else {
        frame.render(&PlainTermStyle)
    };

    term.move_cursor_to(0, 0)?;
    for line in lines {
        term.clear_line()?;
        term.write_line(&line)?;
    }
    term.clear_to_end_of_screen()?;
    term.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn view(height: usize, width: usize) -> GameView {
        let words: Vec<String> = (0..height * width).map(|i| format!("w{}", i)).collect();
        let card = Card::generate(&words, height, width, &mut StdRng::seed_from_u64(3)).unwrap();
        GameView::new(card)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Input::from_key(&Key::ArrowUp), Some(Input::Up));
        assert_eq!(Input::from_key(&Key::Enter), Some(Input::Toggle));
        assert_eq!(Input::from_key(&Key::Char(' ')), Some(Input::Toggle));
        assert_eq!(Input::from_key(&Key::Char('q')), Some(Input::Quit));
        assert_eq!(Input::from_key(&Key::Char('z')), None);
    }

    #[test]
    fn test_cursor_stays_on_board() {
        let mut view = view(3, 4);
        view.apply(Input::Up);
        view.apply(Input::Left);
        assert_eq!(view.cursor(), (0, 0));

        for _ in 0..10 {
            view.apply(Input::Down);
            view.apply(Input::Right);
        }
        assert_eq!(view.cursor(), (2, 3));
    }

    #[test]
    fn test_toggle_and_bingo() {
        let mut view = view(3, 3);
        assert_eq!(view.apply(Input::Toggle), Outcome::Redraw);
        assert!(view.board().is_marked(0, 0));
        assert_eq!(view.apply(Input::Toggle), Outcome::Redraw);
        assert!(!view.board().is_marked(0, 0));

        // Main diagonal through the Joker
        assert_eq!(view.apply(Input::Toggle), Outcome::Redraw);
        view.apply(Input::Down);
        view.apply(Input::Right);
        view.apply(Input::Down);
        view.apply(Input::Right);
        assert_eq!(view.apply(Input::Toggle), Outcome::Bingo);
    }

    #[test]
    fn test_empty_card_keeps_cursor_home() {
        let card = Card::generate(&[], 0, 0, &mut StdRng::seed_from_u64(3)).unwrap();
        let mut view = GameView::new(card);
        assert_eq!(view.apply(Input::Down), Outcome::Redraw);
        assert_eq!(view.apply(Input::Right), Outcome::Redraw);
        assert_eq!(view.cursor(), (0, 0));
    }

    #[test]
    fn test_quit() {
        let mut view = view(2, 2);
        assert_eq!(view.apply(Input::Quit), Outcome::Quit);
    }

    #[test]
    fn test_accept_refusal() {
        assert!(accept_refusal(Err(BingoError::AlreadyReported)).is_ok());
        assert!(accept_refusal(Err(BingoError::Finished)).is_err());
    }
}
