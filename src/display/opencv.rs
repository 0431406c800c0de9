#![cfg(feature = "display-opencv")]

//! OpenCV highgui preview window.

use std::time::Duration;

use anyhow::{Context, Result};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::{highgui, imgproc};

use crate::frame::Frame;

use super::Display;

pub struct OpencvDisplay {
    window: String,
    created: bool,
    closed: bool,
}

impl OpencvDisplay {
    pub fn new(window_name: &str) -> Self {
        Self {
            window: window_name.to_string(),
            created: false,
            closed: false,
        }
    }
}

impl Display for OpencvDisplay {
    fn show(&mut self, frame: &Frame) -> Result<()> {
        if !self.created {
            highgui::named_window(&self.window, highgui::WINDOW_AUTOSIZE)
                .with_context(|| format!("create display window '{}'", self.window))?;
            self.created = true;
        }

        // Pack the RGB bytes into a rows x cols Mat, then swap to BGR for
        // highgui.
        let flat = Mat::from_slice(frame.pixels()).context("wrap frame pixels")?;
        let rgb = flat
            .reshape(3, frame.height() as i32)
            .context("reshape frame pixels")?;
        let mut bgr = Mat::default();
        imgproc::cvt_color(&*rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)
            .context("convert frame to BGR")?;

        highgui::imshow(&self.window, &bgr).context("show frame")?;
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<char>> {
        let millis = (timeout.as_millis() as i32).max(1);
        let key = highgui::wait_key(millis).context("poll window key")?;
        if key < 0 {
            return Ok(None);
        }
        Ok(char::from_u32((key as u32) & 0xFF))
    }

    fn close(&mut self) -> Result<()> {
        if self.created && !self.closed {
            highgui::destroy_all_windows().context("destroy display windows")?;
            self.closed = true;
        }
        Ok(())
    }
}
