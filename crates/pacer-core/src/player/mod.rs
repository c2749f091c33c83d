//! Playback scheduler: owns the chunk sequence, the cursor and the single
//! pending timer of one reading session.

use log::{debug, info, warn};

use crate::{
    catalog::{CatalogLoadResult, SourceCatalog, SourceId},
    config::{ReaderConfig, clamp_chunk_size, cycle_chunk_size},
    error::LoadError,
    segment::{Chunk, ChunkKind, cursor_for_position, reading_position, segment},
    state::{PersistedState, StateStore},
    structure::{FormatTag, StructuralUnit, structure_tagged},
    timer::{ManualTimer, TimerHandle, TimerQueue},
};

mod runtime;
mod sources;
mod transport;


pub const HELP_TEXT: &str = "space: pause | +/-: \u{b1}50 wpm | ++/--: \u{b1}100 | [ ]: rewind/skip 5 | \
     c: cycle chunks | n/b: next/prev source | a: auto-advance | r: reset speed | s: stop | q: quit | ?: help";

/// Raw text handed over by the extraction collaborator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceText {
    pub text: String,
    pub format: FormatTag,
}

impl SourceText {
    pub fn new(text: impl Into<String>, format: FormatTag) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }
}

/// Supplies raw text for a source identity.
pub trait SourceLoader {
    fn load(&mut self, id: &SourceId) -> Result<SourceText, LoadError>;
}

/// Receives every event the player produces, in order.
pub trait DisplaySink {
    fn emit(&mut self, event: PlayerEvent);
}

impl DisplaySink for Vec<PlayerEvent> {
    fn emit(&mut self, event: PlayerEvent) {
        self.push(event);
    }
}

/// Transport and navigation requests.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    Play,
    Pause,
    TogglePause,
    Stop,
    SpeedUp(u16),
    SpeedDown(u16),
    ResetSpeed,
    Rewind(usize),
    Skip(usize),
    CycleChunkSize,
    SelectSource(usize),
    NextSource,
    PrevSource,
    RemoveSource(usize),
    ToggleAutoAdvance,
    ShowHelp,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayChunk {
    pub text: String,
    pub kind: ChunkKind,
    pub level: Option<u8>,
    pub progress_percent: f32,
    pub wpm: u16,
    pub estimated_remaining_secs: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SourceListEntry {
    pub id: SourceId,
    pub label: String,
    pub progress_percent: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    DisplayChunk(DisplayChunk),
    Stopped,
    SourceList {
        entries: Vec<SourceListEntry>,
        active_index: Option<usize>,
    },
    SourceProgress {
        index: usize,
        progress_percent: f32,
    },
    WpmChanged {
        wpm: u16,
        playing: bool,
    },
    Help {
        text: &'static str,
    },
    /// A source could not be loaded while no caller was waiting on the result.
    LoadFailed {
        index: usize,
        message: String,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlaybackPhase {
    Idle,
    Playing,
    Paused,
    /// Transient: the end of the sequence was reached and the player is
    /// deciding between auto-advance and idling.
    Finished,
}

/// Structured and segmented text of the active source.
#[derive(Clone, Debug)]
struct LoadedSource {
    id: SourceId,
    units: Vec<StructuralUnit>,
    chunks: Vec<Chunk>,
}

/// A load that succeeded but has not touched the player yet.
struct PreparedSource {
    source: LoadedSource,
    cursor: usize,
    wpm: u16,
    chunk_size: usize,
}

pub struct Player<L, T, S, D>
where
    L: SourceLoader,
    T: TimerQueue,
    S: StateStore,
    D: DisplaySink,
{
    loader: L,
    timer: T,
    store: S,
    sink: D,
    config: ReaderConfig,
    catalog: SourceCatalog,
    loaded: Option<LoadedSource>,
    phase: PlaybackPhase,
    cursor: usize,
    wpm: u16,
    chunk_size: usize,
    pending: Option<TimerHandle>,
}

impl<L, T, S, D> Player<L, T, S, D>
where
    L: SourceLoader,
    T: TimerQueue,
    S: StateStore,
    D: DisplaySink,
{
    pub fn new(loader: L, timer: T, store: S, sink: D, config: ReaderConfig) -> Self {
        let config = config.normalized();
        Self {
            loader,
            timer,
            store,
            sink,
            wpm: config.wpm,
            chunk_size: config.chunk_size,
            config,
            catalog: SourceCatalog::new(),
            loaded: None,
            phase: PlaybackPhase::Idle,
            cursor: 0,
            pending: None,
        }
    }

    /// Applies one command. Only source loads can fail; every other command
    /// clamps or ignores out-of-range requests.
    pub fn handle(&mut self, command: Command) -> Result<(), LoadError> {
        debug!(
            "player: command={:?} phase={:?} cursor={}",
            command, self.phase, self.cursor
        );

        match command {
            Command::Play => self.play(),
            Command::Pause => {
                self.pause();
                Ok(())
            }
            Command::TogglePause => self.toggle_pause(),
            Command::Stop => {
                self.stop();
                Ok(())
            }
            Command::SpeedUp(delta) => {
                self.adjust_speed(i32::from(delta));
                Ok(())
            }
            Command::SpeedDown(delta) => {
                self.adjust_speed(-i32::from(delta));
                Ok(())
            }
            Command::ResetSpeed => {
                self.set_wpm(self.config.default_wpm);
                Ok(())
            }
            Command::Rewind(steps) => {
                self.rewind(steps);
                Ok(())
            }
            Command::Skip(steps) => {
                self.skip(steps);
                Ok(())
            }
            Command::CycleChunkSize => {
                self.cycle_chunk_size();
                Ok(())
            }
            Command::SelectSource(index) => self.select_source(index),
            Command::NextSource => self.next_source(),
            Command::PrevSource => self.prev_source(),
            Command::RemoveSource(index) => self.remove_source(index),
            Command::ToggleAutoAdvance => {
                self.config.auto_advance = !self.config.auto_advance;
                info!("player: auto_advance={}", self.config.auto_advance);
                Ok(())
            }
            Command::ShowHelp => {
                self.sink.emit(PlayerEvent::Help { text: HELP_TEXT });
                Ok(())
            }
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn wpm(&self) -> u16 {
        self.wpm
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn auto_advance(&self) -> bool {
        self.config.auto_advance
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn chunks(&self) -> &[Chunk] {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.chunks.as_slice())
            .unwrap_or_default()
    }

    pub fn units(&self) -> &[StructuralUnit] {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.units.as_slice())
            .unwrap_or_default()
    }

    pub fn loaded_source(&self) -> Option<&SourceId> {
        self.loaded.as_ref().map(|loaded| &loaded.id)
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.pending
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    /// Share of the sequence before the cursor, in percent.
    pub fn progress_percent(&self) -> f32 {
        progress_percent(self.cursor, self.chunks().len())
    }

    /// Seconds left at the current speed, from the cursor to the end.
    pub fn estimated_remaining_secs(&self) -> u64 {
        let remaining = self.chunks().len().saturating_sub(self.cursor);
        estimated_remaining_secs(remaining, self.wpm, self.chunk_size)
    }
}

/// Timer-loop helpers for hosts that drive a [`ManualTimer`].
impl<L, S, D> Player<L, ManualTimer, S, D>
where
    L: SourceLoader,
    S: StateStore,
    D: DisplaySink,
{
    pub fn next_due_ms(&self) -> Option<u64> {
        self.timer.next_due_ms()
    }

    /// Moves the clock to `now_ms`, firing every timer that falls due on the
    /// way at its own deadline.
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some(due) = self.timer.next_due_ms().filter(|due| *due <= now_ms) {
            self.timer.set_now(due);
            while let Some(handle) = self.timer.pop_due() {
                self.fire(handle);
            }
        }
        self.timer.set_now(now_ms);
    }

    pub fn advance_by(&mut self, delta_ms: u64) {
        let target = self.timer.now_ms().saturating_add(delta_ms);
        self.advance_to(target);
    }
}

fn progress_percent(cursor: usize, len: usize) -> f32 {
    if len == 0 {
        return 0.0;
    }
    (cursor.min(len) as f32 / len as f32) * 100.0
}

/// `ceil(remaining / (wpm / 60 / chunk_size))`, in integer arithmetic.
fn estimated_remaining_secs(remaining_chunks: usize, wpm: u16, chunk_size: usize) -> u64 {
    if wpm == 0 || chunk_size == 0 {
        return 0;
    }
    let numerator = (remaining_chunks as u64)
        .saturating_mul(60)
        .saturating_mul(chunk_size as u64);
    numerator.div_ceil(u64::from(wpm))
}
