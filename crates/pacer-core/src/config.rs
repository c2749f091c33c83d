//! Reader tuning knobs.

pub const MIN_CHUNK_SIZE: usize = 1;
pub const MAX_CHUNK_SIZE: usize = 5;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReaderConfig {
    pub wpm: u16,
    pub min_wpm: u16,
    pub max_wpm: u16,
    /// Speed restored by a reset.
    pub default_wpm: u16,
    pub chunk_size: usize,
    pub pause_duration_ms: u32,
    pub rewind_step: usize,
    pub skip_step: usize,
    pub speed_step: u16,
    pub speed_step_big: u16,
    pub auto_advance: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            wpm: 450,
            min_wpm: 100,
            max_wpm: 1200,
            default_wpm: 450,
            chunk_size: 1,
            pause_duration_ms: 500,
            rewind_step: 5,
            skip_step: 5,
            speed_step: 50,
            speed_step_big: 100,
            auto_advance: false,
        }
    }
}

impl ReaderConfig {
    /// Repairs user-supplied values so that every speed and chunk size the
    /// player sees is in range.
    pub fn normalized(mut self) -> Self {
        if self.min_wpm > self.max_wpm {
            core::mem::swap(&mut self.min_wpm, &mut self.max_wpm);
        }
        self.min_wpm = self.min_wpm.max(1);
        self.max_wpm = self.max_wpm.max(self.min_wpm);
        self.wpm = self.clamp_wpm(self.wpm);
        self.default_wpm = self.clamp_wpm(self.default_wpm);
        self.chunk_size = clamp_chunk_size(self.chunk_size);
        self
    }

    pub fn clamp_wpm(&self, wpm: u16) -> u16 {
        wpm.clamp(self.min_wpm, self.max_wpm)
    }
}

pub fn clamp_chunk_size(chunk_size: usize) -> usize {
    chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

/// Next chunk size in the 1..=5 cycle.
pub const fn cycle_chunk_size(chunk_size: usize) -> usize {
    (chunk_size % MAX_CHUNK_SIZE) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_cycles_through_one_to_five() {
        let mut size = 1;
        let mut seen = Vec::new();
        for _ in 0..6 {
            size = cycle_chunk_size(size);
            seen.push(size);
        }
        assert_eq!(seen, vec![2, 3, 4, 5, 1, 2]);
    }

    #[test]
    fn normalized_repairs_out_of_range_values() {
        let config = ReaderConfig {
            wpm: 5_000,
            min_wpm: 900,
            max_wpm: 200,
            default_wpm: 10,
            chunk_size: 0,
            ..ReaderConfig::default()
        }
        .normalized();

        assert_eq!((config.min_wpm, config.max_wpm), (200, 900));
        assert_eq!(config.wpm, 900);
        assert_eq!(config.default_wpm, 200);
        assert_eq!(config.chunk_size, 1);
    }

    #[test]
    fn defaults_are_already_normal() {
        assert_eq!(ReaderConfig::default().normalized(), ReaderConfig::default());
    }
}
