//! Headless display.
//!
//! Stands in for the preview window when the `display-opencv` feature is
//! off or `--headless` is set. Frames are counted rather than rendered, and
//! the quit "key" is a shared flag the ctrl-c handler sets.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::frame::Frame;
use crate::pipeline::QUIT_KEY;

use super::Display;

pub struct HeadlessDisplay {
    quit: Arc<AtomicBool>,
    frames_shown: u64,
}

impl HeadlessDisplay {
    pub fn new(quit: Arc<AtomicBool>) -> Self {
        Self {
            quit,
            frames_shown: 0,
        }
    }
}

impl Display for HeadlessDisplay {
    fn show(&mut self, frame: &Frame) -> Result<()> {
        self.frames_shown += 1;
        if self.frames_shown % 100 == 0 {
            log::debug!(
                "HeadlessDisplay: {} frames shown ({}x{})",
                self.frames_shown,
                frame.width(),
                frame.height()
            );
        }
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<char>> {
        // Pace the loop the way a window's key wait would.
        if !timeout.is_zero() {
            std::thread::sleep(timeout);
        }
        if self.quit.load(Ordering::SeqCst) {
            Ok(Some(QUIT_KEY))
        } else {
            Ok(None)
        }
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_flag_surfaces_as_the_quit_key() -> Result<()> {
        let quit = Arc::new(AtomicBool::new(false));
        let mut display = HeadlessDisplay::new(quit.clone());

        assert_eq!(display.poll_key(Duration::ZERO)?, None);
        quit.store(true, Ordering::SeqCst);
        assert_eq!(display.poll_key(Duration::ZERO)?, Some(QUIT_KEY));
        Ok(())
    }

    #[test]
    fn show_accepts_frames_without_a_window() -> Result<()> {
        let mut display = HeadlessDisplay::new(Arc::new(AtomicBool::new(false)));
        let frame = Frame::new(vec![0u8; 12], 2, 2)?;
        display.show(&frame)?;
        display.show(&frame)?;
        display.close()?;
        assert_eq!(display.frames_shown, 2);
        Ok(())
    }
}
