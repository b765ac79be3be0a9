// Render scheduling - one draw pass per distinct refresh tick

/// What a tick decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// A full draw pass is due.
    Draw,
    /// Same timestamp as the last completed pass.
    Duplicate,
    /// Nothing has been received yet.
    NoSnapshot,
    Stopped,
}

#[derive(Debug, Default)]
pub struct RenderScheduler {
    last_rendered: Option<f64>,
    frames: u64,
    stopped: bool,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether the tick at `timestamp` draws. A `Draw` result records
    /// the timestamp, so a second call with the same value is a no-op.
    pub fn begin(&mut self, timestamp: f64, has_snapshot: bool) -> Tick {
        if self.stopped {
            return Tick::Stopped;
        }
        if !has_snapshot {
            return Tick::NoSnapshot;
        }
        if self.last_rendered == Some(timestamp) {
            return Tick::Duplicate;
        }
        self.last_rendered = Some(timestamp);
        self.frames += 1;
        Tick::Draw
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn last_rendered(&self) -> Option<f64> {
        self.last_rendered
    }

    /// Completed draw passes.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_timestamp_draws_once() {
        let mut scheduler = RenderScheduler::new();
        assert_eq!(scheduler.begin(16.7, true), Tick::Draw);
        assert_eq!(scheduler.begin(16.7, true), Tick::Duplicate);
        assert_eq!(scheduler.begin(33.4, true), Tick::Draw);
        assert_eq!(scheduler.frames(), 2);
        assert_eq!(scheduler.last_rendered(), Some(33.4));
    }

    #[test]
    fn test_no_snapshot_does_not_record() {
        let mut scheduler = RenderScheduler::new();
        assert_eq!(scheduler.begin(10.0, false), Tick::NoSnapshot);
        assert_eq!(scheduler.last_rendered(), None);
        assert_eq!(scheduler.begin(10.0, true), Tick::Draw);
    }

    #[test]
    fn test_stop_is_final() {
        let mut scheduler = RenderScheduler::new();
        scheduler.begin(1.0, true);
        scheduler.stop();
        assert!(scheduler.is_stopped());
        assert_eq!(scheduler.begin(2.0, true), Tick::Stopped);
        assert_eq!(scheduler.frames(), 1);
    }
}
