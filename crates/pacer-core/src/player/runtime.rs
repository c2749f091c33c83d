use super::*;

impl<L, T, S, D> Player<L, T, S, D>
where
    L: SourceLoader,
    T: TimerQueue,
    S: StateStore,
    D: DisplaySink,
{
    /// Timer callback. Presents the chunk at the cursor (pause chunks are
    /// only waited out), advances, and arms the next timer.
    pub fn fire(&mut self, handle: TimerHandle) {
        debug_assert_eq!(self.pending, Some(handle), "stale timer fired");
        if self.pending != Some(handle) {
            warn!("player: ignoring stale timer handle={}", handle.raw());
            return;
        }
        self.pending = None;

        if self.phase != PlaybackPhase::Playing {
            return;
        }

        let Some(chunk) = self.chunks().get(self.cursor) else {
            self.finish();
            return;
        };

        if chunk.is_pause() {
            self.cursor += 1;
        } else {
            let event = self.display_event(chunk);
            self.sink.emit(PlayerEvent::DisplayChunk(event));
            self.report_progress();
            self.cursor += 1;
        }

        self.schedule_next();
    }

    /// Arms the timer for the chunk at the cursor, or finishes the sequence.
    pub(super) fn schedule_next(&mut self) {
        self.cancel_pending();

        let delay_ms = match self.chunks().get(self.cursor) {
            None => {
                self.finish();
                return;
            }
            Some(Chunk::Pause { duration_ms }) => u64::from(*duration_ms),
            Some(_) => self.chunk_interval_ms(),
        };
        self.pending = Some(self.timer.arm(delay_ms));
    }

    pub(super) fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.timer.cancel(handle);
        }
    }

    fn chunk_interval_ms(&self) -> u64 {
        60_000 / u64::from(self.wpm.max(1))
    }

    fn display_event(&self, chunk: &Chunk) -> DisplayChunk {
        DisplayChunk {
            text: chunk.text().unwrap_or_default().to_owned(),
            kind: chunk.kind(),
            level: chunk.level(),
            progress_percent: self.progress_percent(),
            wpm: self.wpm,
            estimated_remaining_secs: self.estimated_remaining_secs(),
        }
    }

    /// End of the sequence: advance to the next source when enabled,
    /// otherwise fall back to idle.
    fn finish(&mut self) {
        self.phase = PlaybackPhase::Finished;
        info!("player: finished source={:?}", self.loaded_source());
        self.persist();

        if self.config.auto_advance
            && let Some(next) = self.catalog.active().map(|index| index + 1)
            && next < self.catalog.len()
        {
            match self.prepare(next) {
                Ok(mut prepared) => {
                    prepared.cursor = 0;
                    self.commit(next, prepared);
                    self.emit_source_list();
                    info!("player: auto-advance index={}", next);
                    self.phase = PlaybackPhase::Playing;
                    self.schedule_next();
                    return;
                }
                Err(err) => {
                    warn!("player: auto-advance failed index={} err={}", next, err);
                    self.sink.emit(PlayerEvent::LoadFailed {
                        index: next,
                        message: err.to_string(),
                    });
                }
            }
        }

        self.phase = PlaybackPhase::Idle;
        self.sink.emit(PlayerEvent::Stopped);
    }

    /// Best-effort save of the loaded source's position.
    pub(super) fn persist(&mut self) {
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };

        let key = loaded.id.state_key();
        let state = PersistedState {
            cursor: self.cursor,
            wpm: self.wpm,
            chunk_size: self.chunk_size,
            timestamp_ms: self.timer.now_ms(),
        };
        if let Err(err) = self.store.save(&key, &state) {
            warn!("player: persist failed key={} err={}", key, err);
        }

        self.report_progress();
    }

    fn report_progress(&mut self) {
        let Some(index) = self.catalog.active() else {
            return;
        };
        let progress_percent = self.progress_percent();
        self.catalog.set_progress(index, progress_percent);
        self.sink.emit(PlayerEvent::SourceProgress {
            index,
            progress_percent,
        });
    }
}
