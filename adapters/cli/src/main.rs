#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads a map file and plays it in the terminal.

mod map_file;

use std::{
    io::{self, BufRead},
    path::PathBuf,
    sync::mpsc::{self, Receiver, Sender},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result as AnyResult};
use clap::Parser;
use gridfall_core::{Direction, Intent, MonotonicClock, Notification};
use gridfall_rendering::{Presenter, TextPresenter};
use gridfall_session::{GameLoop, MapLoader};
use tracing_subscriber::EnvFilter;

use crate::map_file::TomlMapSupplier;

/// Gridfall dungeon crawler
#[derive(Parser, Debug)]
#[command(name = "gridfall")]
#[command(version, about = "Gridfall - crawl a tile dungeon from the terminal", long_about = None)]
struct Args {
    /// Map file to play
    #[arg(default_value = "maps/dungeon.toml")]
    map: PathBuf,

    /// Stop after this many ticks
    #[arg(short = 't', long = "ticks")]
    ticks: Option<u64>,

    /// Override the movement seed stored in the map
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Print every n-th frame; frames with rewards or a state change always print
    #[arg(long = "frame-every", default_value_t = 20)]
    frame_every: u64,

    /// Ignore stdin and let the session run on its own
    #[arg(long = "headless")]
    headless: bool,
}

/// Entry point for the Gridfall command-line interface.
fn main() -> AnyResult<()> {
    let args = Args::parse();
    init_tracing();

    let loader = MapLoader::spawn(TomlMapSupplier::new(args.map.clone()))
        .context("failed to start loading the map")?;
    let mut data = loader
        .wait()
        .with_context(|| format!("failed to load map {}", args.map.display()))?;
    if let Some(seed) = args.seed {
        data.config.rng_seed = seed;
    }

    let mut session = GameLoop::new(data, MonotonicClock::new())
        .with_context(|| format!("map {} is not playable", args.map.display()))?;

    let (intent_sender, intents) = mpsc::channel();
    let (notification_sender, notifications) = mpsc::channel();
    // Headless runs keep the sender so the loop never sees a disconnect.
    let _idle_sender = if args.headless {
        Some(intent_sender)
    } else {
        spawn_input(intent_sender)?;
        None
    };
    let presenter = spawn_presenter(notifications, args.frame_every)?;

    let state = session.run(&intents, &notification_sender, args.ticks);
    drop(notification_sender);

    presenter
        .join()
        .map_err(|_| anyhow!("presenter thread panicked"))??;
    tracing::info!(?state, ticks = session.tick_count(), "gridfall exited");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn spawn_input(sender: Sender<Intent>) -> AnyResult<()> {
    let _detached = thread::Builder::new()
        .name("gridfall-input".to_owned())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                for intent in line.chars().filter_map(intent_for) {
                    if sender.send(intent).is_err() {
                        return;
                    }
                }
            }
            tracing::debug!("stdin closed");
        })
        .context("failed to start the input thread")?;
    Ok(())
}

fn spawn_presenter(
    notifications: Receiver<Notification>,
    frame_every: u64,
) -> AnyResult<JoinHandle<AnyResult<()>>> {
    thread::Builder::new()
        .name("gridfall-presenter".to_owned())
        .spawn(move || -> AnyResult<()> {
            let mut presenter = TextPresenter::new(io::stdout());
            let mut last_state = None;
            for notification in notifications {
                match notification {
                    Notification::Frame(frame) => {
                        let changed = last_state != Some(frame.state);
                        last_state = Some(frame.state);
                        if changed
                            || !frame.rewards.is_empty()
                            || frame.tick % frame_every.max(1) == 0
                        {
                            presenter.present(&frame)?;
                        }
                    }
                    Notification::Closed { state } => {
                        presenter.finish(state)?;
                        break;
                    }
                }
            }
            Ok(())
        })
        .context("failed to start the presenter thread")
}

/// Keyboard layout: `qweadzxc` move, `f` attacks, `g` interacts, `u` drinks a
/// potion, `p`/`o` pause and resume, `R` restarts and `Q` quits.
fn intent_for(key: char) -> Option<Intent> {
    let intent = match key {
        'w' => Intent::Move(Direction::North),
        'e' => Intent::Move(Direction::NorthEast),
        'd' => Intent::Move(Direction::East),
        'c' => Intent::Move(Direction::SouthEast),
        'x' => Intent::Move(Direction::South),
        'z' => Intent::Move(Direction::SouthWest),
        'a' => Intent::Move(Direction::West),
        'q' => Intent::Move(Direction::NorthWest),
        'f' => Intent::Attack,
        'g' => Intent::Interact,
        'u' => Intent::UseItem,
        'p' => Intent::Pause,
        'o' => Intent::Resume,
        'R' => Intent::Restart,
        'Q' => Intent::Exit,
        _ => return None,
    };
    Some(intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_to_intents() {
        assert_eq!(intent_for('w'), Some(Intent::Move(Direction::North)));
        assert_eq!(intent_for('c'), Some(Intent::Move(Direction::SouthEast)));
        assert_eq!(intent_for('f'), Some(Intent::Attack));
        assert_eq!(intent_for('Q'), Some(Intent::Exit));
        assert_eq!(intent_for(' '), None);
    }

    #[test]
    fn args_accept_overrides() {
        let args = Args::try_parse_from(["gridfall", "level.toml", "--ticks", "12", "-s", "9"])
            .expect("valid arguments");

        assert_eq!(args.map, PathBuf::from("level.toml"));
        assert_eq!(args.ticks, Some(12));
        assert_eq!(args.seed, Some(9));
        assert!(!args.headless);
    }
}
