//! Chunk-size calibration.
//!
//! Keeps a rolling window of recent chunk sizes and wall-clock durations and
//! retunes the next chunk size so that progress updates land near the
//! configured rate. The window is a plain moving average: it trades
//! precision for robustness against transient I/O stalls.

use std::collections::VecDeque;
use std::time::Duration;

/// Number of samples in the rolling window.
pub const SPEED_SAMPLES: usize = 30;

/// Chunk sizes never drop below this, no matter how slow the device looks.
pub const MIN_CHUNK_SIZE: u64 = 1024;

/// Fixed-capacity ring of the most recent chunk samples, newest first.
///
/// Seeded at full capacity (the configured chunk size, 1.0s durations) so
/// the averages are well-defined from the first real sample onward.
#[derive(Debug, Clone)]
pub struct SpeedWindow {
    sizes: VecDeque<u64>,
    durations: VecDeque<f64>,
}

impl SpeedWindow {
    /// Create a window pre-filled with synthetic seed samples.
    pub fn seeded(initial_chunk_size: u64) -> Self {
        Self {
            sizes: VecDeque::from(vec![initial_chunk_size; SPEED_SAMPLES]),
            durations: VecDeque::from(vec![1.0; SPEED_SAMPLES]),
        }
    }

    /// Record a chunk's byte count, evicting the oldest size sample.
    pub fn push_size(&mut self, bytes: u64) {
        self.sizes.pop_back();
        self.sizes.push_front(bytes);
    }

    /// Record a chunk's duration, evicting the oldest duration sample.
    pub fn push_duration(&mut self, seconds: f64) {
        self.durations.pop_back();
        self.durations.push_front(seconds);
    }

    /// Mean of the size track.
    pub fn average_chunk_bytes(&self) -> f64 {
        self.sizes.iter().sum::<u64>() as f64 / SPEED_SAMPLES as f64
    }

    /// Mean of the duration track.
    pub fn average_chunk_seconds(&self) -> f64 {
        self.durations.iter().sum::<f64>() / SPEED_SAMPLES as f64
    }
}

/// Feedback controller for the per-chunk transfer size.
#[derive(Debug)]
pub struct SpeedCalibrator {
    window: SpeedWindow,
    chunk_size: u64,
    enabled: bool,
    /// Seconds per progress update the controller aims for.
    update_interval: f64,
}

impl SpeedCalibrator {
    pub fn new(initial_chunk_size: u64, update_interval: f64, enabled: bool) -> Self {
        Self {
            window: SpeedWindow::seeded(initial_chunk_size),
            chunk_size: initial_chunk_size,
            enabled,
            update_interval,
        }
    }

    /// The size the next chunk should use.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Record one finished chunk.
    ///
    /// Size samples are always kept. The chunk size is only retuned when
    /// calibration is enabled; otherwise it stays at the configured value.
    pub fn record_chunk(&mut self, bytes: u64, elapsed: Duration) {
        self.window.push_size(bytes);

        if !self.enabled {
            return;
        }

        self.window.push_duration(elapsed.as_secs_f64());
        let throughput = self.window.average_chunk_bytes() / self.window.average_chunk_seconds();
        let next = (throughput * self.update_interval).floor() as u64;
        self.chunk_size = next.max(MIN_CHUNK_SIZE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_window_has_full_capacity_averages() {
        let window = SpeedWindow::seeded(4096);
        assert_eq!(window.average_chunk_bytes(), 4096.0);
        assert_eq!(window.average_chunk_seconds(), 1.0);
    }

    #[test]
    fn test_push_evicts_oldest_and_keeps_capacity() {
        let mut window = SpeedWindow::seeded(100);
        for _ in 0..SPEED_SAMPLES {
            window.push_size(200);
            window.push_duration(2.0);
        }
        // Every seed sample has been evicted by now.
        assert_eq!(window.average_chunk_bytes(), 200.0);
        assert_eq!(window.average_chunk_seconds(), 2.0);

        window.push_size(500);
        assert_eq!(window.sizes.len(), SPEED_SAMPLES);
    }

    #[test]
    fn test_disabled_calibrator_keeps_fixed_chunk_size() {
        let mut calibrator = SpeedCalibrator::new(8192, 1.0 / 60.0, false);
        for _ in 0..50 {
            calibrator.record_chunk(8192, Duration::from_millis(500));
        }
        assert_eq!(calibrator.chunk_size(), 8192);
    }

    #[test]
    fn test_calibrator_converges_within_one_window_fill() {
        // 8 MiB chunks in 0.25s each, targeting 64 updates/s. All values are
        // exact in binary, so the expected size is too:
        // (8 MiB / 0.25s) * (1/64)s = 512 KiB.
        let mut calibrator = SpeedCalibrator::new(8 * 1024 * 1024, 1.0 / 64.0, true);
        for _ in 0..SPEED_SAMPLES {
            calibrator.record_chunk(8 * 1024 * 1024, Duration::from_millis(250));
        }
        assert_eq!(calibrator.chunk_size(), 512 * 1024);
    }

    #[test]
    fn test_calibrator_clamps_to_minimum() {
        // 512-byte chunks at one per second would imply an 8-byte chunk at
        // 64 Hz; the clamp keeps the loop productive.
        let mut calibrator = SpeedCalibrator::new(512, 1.0 / 64.0, true);
        for _ in 0..SPEED_SAMPLES {
            calibrator.record_chunk(512, Duration::from_secs(1));
        }
        assert_eq!(calibrator.chunk_size(), MIN_CHUNK_SIZE);
    }

    #[test]
    fn test_calibrator_tracks_throughput_change() {
        let mut calibrator = SpeedCalibrator::new(1024 * 1024, 1.0 / 64.0, true);
        for _ in 0..SPEED_SAMPLES {
            calibrator.record_chunk(1024 * 1024, Duration::from_millis(250));
        }
        let slow = calibrator.chunk_size();

        for _ in 0..SPEED_SAMPLES {
            calibrator.record_chunk(8 * 1024 * 1024, Duration::from_millis(250));
        }
        let fast = calibrator.chunk_size();

        assert!(fast > slow, "faster device should raise chunk size");
        assert_eq!(fast, 512 * 1024);
    }
}
