use std::io::{self, IsTerminal, Stdout, Write};

use log::{debug, warn};
use pacer_core::{
    orp::{OrpWord, render_chunk},
    player::{DisplayChunk, DisplaySink, PlayerEvent, SourceListEntry},
    segment::ChunkKind,
};

/// Column the pivot letter of the first word is drawn at.
const PIVOT_COLUMN: usize = 14;

const CLEAR_LINE: &str = "\r\x1b[2K";
const PIVOT_ON: &str = "\x1b[1;31m";
const TITLE_ON: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Draws player events on a terminal. On a tty each chunk replaces the
/// previous one in place; otherwise every chunk gets its own line.
pub(super) struct TerminalSink<W: Write> {
    out: W,
    interactive: bool,
}

impl TerminalSink<Stdout> {
    pub(super) fn stdout() -> Self {
        let out = io::stdout();
        let interactive = out.is_terminal();
        Self::new(out, interactive)
    }
}

impl<W: Write> TerminalSink<W> {
    pub(super) fn new(out: W, interactive: bool) -> Self {
        Self { out, interactive }
    }

    /// Status line outside the player's own events.
    pub(super) fn notice(&mut self, message: &str) {
        let line = format!("[{message}]");
        self.write_block(&line);
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn write_block(&mut self, text: &str) {
        let result = if self.interactive {
            writeln!(self.out, "{CLEAR_LINE}{text}")
        } else {
            writeln!(self.out, "{text}")
        };
        self.finish_write(result);
    }

    fn write_chunk(&mut self, line: &str) {
        let result = if self.interactive {
            write!(self.out, "{CLEAR_LINE}{line}")
        } else {
            writeln!(self.out, "{line}")
        };
        self.finish_write(result);
    }

    fn finish_write(&mut self, result: io::Result<()>) {
        if let Err(err) = result.and_then(|()| self.out.flush()) {
            warn!("terminal: write failed err={}", err);
        }
    }
}

impl<W: Write> DisplaySink for TerminalSink<W> {
    fn emit(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::DisplayChunk(chunk) => {
                let line = render_line(&chunk, self.interactive);
                self.write_chunk(&line);
            }
            PlayerEvent::Stopped => self.notice("stopped"),
            PlayerEvent::SourceList {
                entries,
                active_index,
            } => {
                let list = render_source_list(&entries, active_index);
                self.write_block(&list);
            }
            PlayerEvent::SourceProgress {
                index,
                progress_percent,
            } => {
                debug!(
                    "terminal: progress index={} percent={:.1}",
                    index, progress_percent
                );
            }
            PlayerEvent::WpmChanged { wpm, playing } => {
                let state = if playing { "playing" } else { "paused" };
                self.notice(&format!("{wpm} wpm, {state}"));
            }
            PlayerEvent::Help { text } => self.write_block(text),
            PlayerEvent::LoadFailed { index, message } => {
                self.notice(&format!("could not load source {}: {message}", index + 1));
            }
        }
    }
}

/// One display line: the chunk with its pivot letters marked, then a status
/// suffix with progress, speed and time left.
pub(super) fn render_line(chunk: &DisplayChunk, color: bool) -> String {
    let mut line = String::new();
    let words: Vec<OrpWord<'_>> = render_chunk(&chunk.text).collect();

    let lead = words.first().map_or(0, OrpWord::lead_chars);
    line.extend(std::iter::repeat_n(' ', PIVOT_COLUMN.saturating_sub(lead)));

    if chunk.kind == ChunkKind::Title && color {
        line.push_str(TITLE_ON);
    }
    for (index, word) in words.iter().enumerate() {
        if index > 0 {
            line.push(' ');
        }
        push_word(&mut line, word, color, chunk.kind == ChunkKind::Title);
    }
    if color {
        line.push_str(RESET);
    }

    line.push_str(&format!(
        "   {:>5.1}% | {} wpm | {} left",
        chunk.progress_percent,
        chunk.wpm,
        format_remaining(chunk.estimated_remaining_secs)
    ));
    line
}

fn push_word(line: &mut String, word: &OrpWord<'_>, color: bool, title: bool) {
    match word {
        OrpWord::Whole(text) => line.push_str(text),
        OrpWord::Split { pre, pivot, post } => {
            line.push_str(pre);
            if color {
                line.push_str(PIVOT_ON);
                line.push(*pivot);
                line.push_str(RESET);
                if title {
                    line.push_str(TITLE_ON);
                }
            } else {
                line.push(*pivot);
            }
            line.push_str(post);
        }
    }
}

fn format_remaining(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn render_source_list(entries: &[SourceListEntry], active_index: Option<usize>) -> String {
    if entries.is_empty() {
        return "(no sources)".to_owned();
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let marker = if active_index == Some(index) { '>' } else { ' ' };
            format!(
                "{marker} {:>2}. {} ({:.0}%)",
                index + 1,
                entry.label,
                entry.progress_percent
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
