use super::*;

impl<L, T, S, D> Player<L, T, S, D>
where
    L: SourceLoader,
    T: TimerQueue,
    S: StateStore,
    D: DisplaySink,
{
    /// Replaces the active source set. Nothing is loaded until playback or
    /// selection asks for it.
    pub fn set_sources<I>(&mut self, ids: I) -> CatalogLoadResult
    where
        I: IntoIterator<Item = SourceId>,
    {
        let was_running = self.phase != PlaybackPhase::Idle;
        self.halt();
        self.loaded = None;
        self.cursor = 0;
        if was_running {
            self.sink.emit(PlayerEvent::Stopped);
        }

        let result = self.catalog.replace(ids);
        info!(
            "player: set_sources loaded={} truncated={}",
            result.loaded, result.truncated
        );
        self.emit_source_list();
        result
    }

    /// Queues sources that are not in the set yet.
    pub fn add_sources<I>(&mut self, ids: I) -> CatalogLoadResult
    where
        I: IntoIterator<Item = SourceId>,
    {
        let result = self.catalog.append(ids);
        info!(
            "player: add_sources loaded={} truncated={}",
            result.loaded, result.truncated
        );
        self.emit_source_list();
        result
    }

    /// Drops a source from the set and discards its persisted state.
    pub fn remove_source(&mut self, index: usize) -> Result<(), LoadError> {
        let id = self
            .catalog
            .get(index)
            .map(|entry| entry.id.clone())
            .ok_or(LoadError::UnknownSource(index))?;

        if self.loaded_source() == Some(&id) {
            self.cancel_pending();
            self.loaded = None;
            self.cursor = 0;
            if self.phase != PlaybackPhase::Idle {
                self.phase = PlaybackPhase::Idle;
                self.sink.emit(PlayerEvent::Stopped);
            }
        }

        let key = id.state_key();
        if let Err(err) = self.store.remove(&key) {
            warn!("player: discard state failed key={} err={}", key, err);
        }

        self.catalog.remove(index);
        info!("player: remove_source index={} id={}", index, id);
        self.emit_source_list();
        Ok(())
    }

    /// Loads the source at `index` and makes it active, restoring any saved
    /// position. Leaves the player untouched when the load fails.
    pub fn load_source(&mut self, index: usize) -> Result<(), LoadError> {
        let prepared = self.prepare(index)?;
        self.halt();
        self.commit(index, prepared);
        self.emit_source_list();
        Ok(())
    }

    /// Switches to the source at `index`; starts playing right away when
    /// auto-advance is on.
    pub fn select_source(&mut self, index: usize) -> Result<(), LoadError> {
        self.load_source(index)?;

        if self.config.auto_advance {
            self.play()
        } else {
            self.sink.emit(PlayerEvent::Stopped);
            Ok(())
        }
    }

    /// No-op on the last source.
    pub fn next_source(&mut self) -> Result<(), LoadError> {
        match self.catalog.active() {
            Some(active) if active + 1 < self.catalog.len() => self.select_source(active + 1),
            _ => Ok(()),
        }
    }

    /// No-op on the first source.
    pub fn prev_source(&mut self) -> Result<(), LoadError> {
        match self.catalog.active() {
            Some(active) if active > 0 => self.select_source(active - 1),
            _ => Ok(()),
        }
    }

    pub(super) fn prepare(&mut self, index: usize) -> Result<PreparedSource, LoadError> {
        let id = self
            .catalog
            .get(index)
            .map(|entry| entry.id.clone())
            .ok_or(LoadError::UnknownSource(index))?;

        // Reloading the open source restores from its live position.
        if self.loaded_source() == Some(&id) {
            self.persist();
        }

        let text = self.loader.load(&id)?;
        let units = structure_tagged(&text.text, text.format)?;

        let saved = match self.store.load(&id.state_key()) {
            Ok(saved) => saved,
            Err(err) => {
                warn!("player: restore failed id={} err={}", id, err);
                None
            }
        };

        let chunk_size = saved.map_or(self.chunk_size, |state| clamp_chunk_size(state.chunk_size));
        let wpm = saved.map_or(self.wpm, |state| self.config.clamp_wpm(state.wpm));
        let chunks = segment(&units, chunk_size, self.config.pause_duration_ms);
        if chunks.is_empty() {
            return Err(LoadError::EmptyContent);
        }
        let cursor = saved.map_or(0, |state| state.cursor.min(chunks.len() - 1));

        debug!(
            "player: prepared id={} format={} units={} chunks={} restored={}",
            id,
            text.format,
            units.len(),
            chunks.len(),
            saved.is_some()
        );
        Ok(PreparedSource {
            source: LoadedSource { id, units, chunks },
            cursor,
            wpm,
            chunk_size,
        })
    }

    pub(super) fn commit(&mut self, index: usize, prepared: PreparedSource) {
        self.loaded = Some(prepared.source);
        self.cursor = prepared.cursor;
        self.wpm = prepared.wpm;
        self.chunk_size = prepared.chunk_size;
        self.catalog.set_active(index);

        let progress_percent = self.progress_percent();
        self.catalog.set_progress(index, progress_percent);
    }

    /// Cancels playback of the loaded source and saves its position.
    fn halt(&mut self) {
        self.cancel_pending();
        self.persist();
        self.phase = PlaybackPhase::Idle;
    }

    pub(super) fn emit_source_list(&mut self) {
        let entries = self
            .catalog
            .entries()
            .iter()
            .map(|entry| SourceListEntry {
                id: entry.id.clone(),
                label: entry.label.as_str().to_owned(),
                progress_percent: entry.progress_percent,
            })
            .collect();
        self.sink.emit(PlayerEvent::SourceList {
            entries,
            active_index: self.catalog.active(),
        });
    }
}
