//! Frame Loop
//!
//! A tiny idempotent start/stop latch plus a frame counter. The window
//! shell drives redraws; this only answers "are we running" and hands out
//! frame numbers, so pausing and resuming cannot double-start anything.

#[derive(Debug, Default)]
pub struct FrameLoop {
    running: bool,
    frame: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Returns `false` when already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Count a frame; returns its number. No-op while stopped.
    pub fn advance(&mut self) -> Option<u64> {
        if !self.running {
            return None;
        }
        let n = self.frame;
        self.frame += 1;
        Some(n)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let mut fl = FrameLoop::new();
        assert!(!fl.is_running());
        assert!(fl.start());
        assert!(!fl.start());
        assert!(fl.is_running());
        assert!(fl.stop());
        assert!(!fl.stop());
        assert!(!fl.is_running());
    }

    #[test]
    fn test_frames_count_only_while_running() {
        let mut fl = FrameLoop::new();
        assert_eq!(fl.advance(), None);
        fl.start();
        assert_eq!(fl.advance(), Some(0));
        assert_eq!(fl.advance(), Some(1));
        fl.stop();
        assert_eq!(fl.advance(), None);
        fl.start();
        // The counter survives a pause.
        assert_eq!(fl.advance(), Some(2));
    }
}
