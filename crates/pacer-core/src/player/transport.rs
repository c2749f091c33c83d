use super::*;

impl<L, T, S, D> Player<L, T, S, D>
where
    L: SourceLoader,
    T: TimerQueue,
    S: StateStore,
    D: DisplaySink,
{
    /// Starts or resumes playback from the cursor, loading the active source
    /// first when nothing is loaded. A cursor at the end restarts from zero.
    pub fn play(&mut self) -> Result<(), LoadError> {
        if self.phase == PlaybackPhase::Playing {
            return Ok(());
        }

        if self.loaded.is_none() {
            let index = self.catalog.active().ok_or(LoadError::NoSource)?;
            self.load_source(index)?;
        }

        if self.cursor >= self.chunks().len() {
            self.cursor = 0;
        }

        info!(
            "player: play cursor={}/{} wpm={} chunk_size={}",
            self.cursor,
            self.chunks().len(),
            self.wpm,
            self.chunk_size
        );
        self.phase = PlaybackPhase::Playing;
        self.schedule_next();
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.phase != PlaybackPhase::Playing {
            return;
        }

        self.cancel_pending();
        self.phase = PlaybackPhase::Paused;
        info!("player: pause cursor={}", self.cursor);
        self.persist();
    }

    pub fn toggle_pause(&mut self) -> Result<(), LoadError> {
        if self.phase == PlaybackPhase::Playing {
            self.pause();
        } else {
            self.play()?;
        }

        self.sink.emit(PlayerEvent::WpmChanged {
            wpm: self.wpm,
            playing: self.is_playing(),
        });
        Ok(())
    }

    /// Halts playback and keeps the cursor for a later resume.
    pub fn stop(&mut self) {
        self.cancel_pending();
        self.phase = PlaybackPhase::Idle;
        info!("player: stop cursor={}", self.cursor);
        self.persist();
        self.sink.emit(PlayerEvent::Stopped);
    }

    /// Changes the speed by `delta`, clamped to the configured bounds.
    pub fn adjust_speed(&mut self, delta: i32) {
        let target = (i32::from(self.wpm) + delta).clamp(0, i32::from(u16::MAX));
        self.set_wpm(target as u16);
    }

    pub fn set_wpm(&mut self, wpm: u16) {
        let wpm = self.config.clamp_wpm(wpm);
        if wpm != self.wpm {
            self.wpm = wpm;
            debug!("player: wpm={}", wpm);

            if self.is_playing() {
                self.cancel_pending();
                self.schedule_next();
            }
        }

        self.sink.emit(PlayerEvent::WpmChanged {
            wpm: self.wpm,
            playing: self.is_playing(),
        });
    }

    pub fn rewind(&mut self, steps: usize) {
        self.cursor = self.cursor.saturating_sub(steps);
        debug!("player: rewind steps={} cursor={}", steps, self.cursor);
        self.persist();
    }

    pub fn skip(&mut self, steps: usize) {
        let last = self.chunks().len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add(steps).min(last);
        debug!("player: skip steps={} cursor={}", steps, self.cursor);
        self.persist();
    }

    /// Moves to the next chunk size and re-segments the loaded text, keeping
    /// the reading position. Playback restarts when it was running.
    pub fn cycle_chunk_size(&mut self) {
        let was_playing = self.is_playing();
        self.cancel_pending();

        self.chunk_size = cycle_chunk_size(self.chunk_size);
        if let Some(loaded) = self.loaded.as_mut() {
            let at_end = self.cursor >= loaded.chunks.len();
            let position = reading_position(&loaded.chunks, self.cursor);
            loaded.chunks = segment(
                &loaded.units,
                self.chunk_size,
                self.config.pause_duration_ms,
            );
            // A finished sequence stays finished so the next play restarts.
            self.cursor = if at_end {
                loaded.chunks.len()
            } else {
                cursor_for_position(&loaded.chunks, position)
                    .min(loaded.chunks.len().saturating_sub(1))
            };
        }

        info!(
            "player: resegment chunk_size={} cursor={}/{}",
            self.chunk_size,
            self.cursor,
            self.chunks().len()
        );
        self.persist();

        if was_playing {
            self.schedule_next();
        }
    }
}
