use std::path::{Path, PathBuf};
use std::time::Duration;

use bingo_arena::{Arena, ArenaConfig, Coordinator, RoundBuilder, RoundConfig};
use bingo_term::term_render::status_line;
use bingo_term::{Card, Retry, load_words, play};
use clap::{Parser, Subcommand};
use console::Term;

/// bingo_term - terminal bingo for several processes on one machine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the player channels
    #[arg(long, global = true)]
    channel_root: Option<PathBuf>,

    /// Share one channel directory between all rounds
    #[arg(long, global = true)]
    no_round_scope: bool,

    /// Seconds to keep the board on screen once the round is over
    #[arg(long, global = true, default_value_t = 3)]
    grace_secs: u64,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a round and wait for a second player
    Create {
        /// Round file to create
        #[arg(short, long)]
        round: PathBuf,

        /// Board rows
        #[arg(long, default_value_t = 5)]
        height: usize,

        /// Board columns
        #[arg(long, default_value_t = 5)]
        width: usize,

        /// Word file, one word per line
        #[arg(long)]
        words: PathBuf,

        /// Maximum number of players
        #[arg(short, long, default_value_t = 4)]
        max_players: usize,

        /// Player name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Join an existing round
    Join {
        /// Round file to join
        #[arg(short, long)]
        round: PathBuf,

        /// Player name
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they stay out of the board
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ArenaConfig::default().with_scope_channels_by_round(!args.no_round_scope);
    if let Some(root) = &args.channel_root {
        config = config.with_channel_root(root);
    }
    let arena = Arena::new(config);

    let (round, card) = match args.command {
        Command::Create {
            round,
            height,
            width,
            words,
            max_players,
            name,
        } => {
            let round_config =
                RoundConfig::new(max_players, height, width, words.display().to_string());
            round_config.validate()?;
            // A bad word file must fail before anyone can join
            let card = Card::generate(&load_words(&words)?, height, width, &mut rand::rng())?;

            println!("=== bingo_term ===");
            println!("Round: {}", round.display());
            println!("Waiting for a second player...");
            let coordinator = enter(&arena, round, name, |arena, path| {
                arena.create_round(path, round_config.clone())
            })
            .await?;
            (coordinator, card)
        }
        Command::Join { round, name } => {
            let coordinator = enter(&arena, round, name, |arena, path| arena.join_round(path)).await?;
            match card_for(&coordinator) {
                Ok(card) => (coordinator, card),
                Err(e) => {
                    coordinator.shutdown().await?;
                    return Err(e);
                }
            }
        }
    };

    tracing::info!("Playing as '{}' with {:?}", round.player(), round.roster());
    let result = play(&round, card, Duration::from_secs(args.grace_secs)).await;

    println!("{}", status_line(&round.snapshot(), round.player()));
    tracing::debug!("Channel stats: {}", round.stats());
    round.shutdown().await?;
    result
}

/// Await a round builder. While someone is at the keyboard, a refused name
/// or round file is asked for again instead of ending the process.
async fn enter(
    arena: &Arena,
    mut round: PathBuf,
    mut name: Option<String>,
    builder: impl Fn(&Arena, &Path) -> RoundBuilder,
) -> anyhow::Result<Coordinator> {
    let interactive = console::user_attended();
    let term = Term::stdout();
    loop {
        let attempt = match &name {
            Some(chosen) => builder(arena, &round).player(chosen.as_str()),
            None => Ok(builder(arena, &round)),
        };
        let result = match attempt {
            Ok(round_builder) => round_builder.await,
            Err(e) => Err(e),
        };

        let err = match result {
            Ok(coordinator) => return Ok(coordinator),
            Err(e) => e,
        };
        let retry = Retry::for_error(&err).filter(|_| interactive);
        let Some(retry) = retry else {
            return Err(refused(err, &round));
        };

        println!("{}", err);
        match (retry, retry.ask(&term)?) {
            (Retry::PlayerName, answer) => name = answer,
            (Retry::RoundFile, Some(answer)) => round = PathBuf::from(answer),
            (Retry::RoundFile, None) => {
                return Err(refused(err, &round));
            }
        }
    }
}

fn refused(err: bingo_arena::BingoError, round: &Path) -> anyhow::Error {
    anyhow::Error::new(err).context(format!("Cannot enter round {}", round.display()))
}

/// Card for a joined round, from the word file named in the round record
fn card_for(round: &Coordinator) -> anyhow::Result<Card> {
    let config = round.round_config();
    let words = load_words(Path::new(&config.word_source))?;
    Card::generate(&words, config.board_height, config.board_width, &mut rand::rng())
}
