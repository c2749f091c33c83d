use std::{
    io::Stdout,
    path::PathBuf,
    sync::mpsc::{Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, bail};
use chrono::Utc;
use clap::Parser;
use log::{info, warn};
use pacer_core::{
    catalog::SourceId,
    config::ReaderConfig,
    player::{Command, Player},
    session::SessionRegistry,
    timer::ManualTimer,
};

use file_source::{BYTES_PER_MB, FileSourceLoader};
use keys::KeyAction;
use state_file::JsonStateStore;
use terminal::TerminalSink;

#[path = "main/file_source.rs"]
mod file_source;
#[path = "main/keys.rs"]
mod keys;
#[path = "main/state_file.rs"]
mod state_file;
#[path = "main/terminal.rs"]
mod terminal;

const IDLE_POLL_MS: u64 = 250;
const DEFAULT_STATE_FILE: &str = ".pacer-state.json";

type HostPlayer = Player<FileSourceLoader, ManualTimer, JsonStateStore, TerminalSink<Stdout>>;

/// Speed-read text files in the terminal, one small chunk at a time.
#[derive(Debug, Parser)]
#[command(name = "pacer", version, about)]
struct Cli {
    /// Files or folders to read. Folders are scanned for .md, .markdown,
    /// .txt, .pdf and .epub files.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Reading speed in words per minute (100-1200).
    #[arg(long, default_value_t = 450)]
    wpm: u16,

    /// Words shown at once (1-5).
    #[arg(long, default_value_t = 1)]
    chunk_size: usize,

    /// Pause after each title, in milliseconds.
    #[arg(long = "pause-ms", default_value_t = 500)]
    pause_ms: u32,

    /// Continue with the next file when one ends.
    #[arg(long)]
    auto_advance: bool,

    /// Start playing right away instead of waiting for Enter.
    #[arg(long)]
    play: bool,

    /// Where reading positions are kept between runs.
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    state_file: PathBuf,

    /// Largest text file accepted, in megabytes.
    #[arg(long, default_value_t = 10)]
    max_file_mb: u64,

    /// Log filter, e.g. `debug` or `pacer_core=debug`. Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            wpm: self.wpm,
            chunk_size: self.chunk_size,
            pause_duration_ms: self.pause_ms,
            auto_advance: self.auto_advance,
            ..ReaderConfig::default()
        }
        .normalized()
    }
}

/// Wall-clock milliseconds, anchored at start-up and advanced monotonically.
struct WallClock {
    epoch_ms: u64,
    started: Instant,
}

impl WallClock {
    fn start() -> Self {
        Self {
            epoch_ms: u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default(),
            started: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        let elapsed = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.epoch_ms.saturating_add(elapsed)
    }
}

fn init_logging(filter: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let config = cli.reader_config();
    let sources = file_source::collect_sources(&cli.paths)?;
    if sources.is_empty() {
        bail!("no readable files found");
    }

    let store = JsonStateStore::open(&cli.state_file)
        .with_context(|| format!("failed to open state file {}", cli.state_file.display()))?;
    info!("main: state_file={}", store.path().display());

    let clock = WallClock::start();
    let loader = FileSourceLoader::new(cli.max_file_mb.saturating_mul(BYTES_PER_MB));
    let player = Player::new(
        loader,
        ManualTimer::starting_at(clock.now_ms()),
        store,
        TerminalSink::stdout(),
        config,
    );

    let mut sessions = SessionRegistry::new();
    let session = sessions.create(player);
    let keys = keys::spawn_stdin_reader(config).context("failed to start keyboard reader")?;

    let result = match sessions.get_mut(session) {
        Some(player) => run(player, &keys, &clock, &cli, sources),
        None => bail!("session {} vanished", session.raw()),
    };

    if let Some(mut player) = sessions.dispose(session) {
        player.advance_to(clock.now_ms());
        player.stop();
    }
    result
}

fn run(
    player: &mut HostPlayer,
    keys: &Receiver<KeyAction>,
    clock: &WallClock,
    cli: &Cli,
    sources: Vec<SourceId>,
) -> anyhow::Result<()> {
    let loaded = player.set_sources(sources);
    if loaded.truncated {
        player
            .sink_mut()
            .notice("too many files, the rest were skipped");
    }
    player.handle(Command::ShowHelp)?;

    if cli.play {
        apply(player, Command::Play);
    } else {
        player.sink_mut().notice("press Enter to start");
    }

    let mut input_open = true;
    loop {
        player.advance_to(clock.now_ms());

        if !input_open && !player.is_playing() {
            info!("main: input closed and playback idle, exiting");
            return Ok(());
        }

        let wait_ms = player
            .next_due_ms()
            .map_or(IDLE_POLL_MS, |due| due.saturating_sub(clock.now_ms()));
        let wait = Duration::from_millis(wait_ms);

        if !input_open {
            thread::sleep(wait);
            continue;
        }

        match keys.recv_timeout(wait) {
            Ok(KeyAction::Quit) => return Ok(()),
            Ok(KeyAction::Player(command)) => {
                player.advance_to(clock.now_ms());
                apply(player, command);
                if command == Command::ToggleAutoAdvance {
                    let state = if player.auto_advance() { "on" } else { "off" };
                    player.sink_mut().notice(&format!("auto-advance {state}"));
                }
                if command == Command::CycleChunkSize {
                    let size = player.chunk_size();
                    player.sink_mut().notice(&format!("chunk size {size}"));
                }
            }
            Ok(KeyAction::RemoveActive) => match player.catalog().active() {
                Some(index) => apply(player, Command::RemoveSource(index)),
                None => player.sink_mut().notice("no source to remove"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => input_open = false,
        }
    }
}

/// Runs a command and shows load failures on the terminal.
fn apply(player: &mut HostPlayer, command: Command) {
    if let Err(err) = player.handle(command) {
        warn!("main: command={:?} failed err={}", command, err);
        player.sink_mut().notice(&err.to_string());
    }
}
