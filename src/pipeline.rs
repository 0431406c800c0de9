//! The capture-infer-render loop.
//!
//! One blocking, single-threaded loop: pull a frame from the source, run
//! the detector, draw boxes and the measured frame rate onto a copy, show
//! it, and poll for the quit key. The loop ends when the source stops
//! producing frames, the device fails, or the user quits; the display is
//! closed on every exit path and the source handle is released when the
//! caller drops it.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::detect::DetectorBackend;
use crate::display::Display;
use crate::fps::FpsCounter;
use crate::overlay;
use crate::source::VideoSource;

/// Key that ends the run when pressed in the preview window.
pub const QUIT_KEY: char = 'q';

const KEY_POLL_TIMEOUT: Duration = Duration::from_millis(1);
const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopReason {
    /// The source reported end of stream.
    #[default]
    EndOfStream,
    /// The user pressed the quit key.
    QuitKey,
    /// Frame acquisition failed.
    SourceError,
}

#[derive(Clone, Debug, Default)]
pub struct PipelineStats {
    pub frames_processed: u64,
    pub detections_total: u64,
    pub detector_failures: u64,
    pub stop: StopReason,
}

/// Run the loop until the stream ends, the device fails, or the user quits.
///
/// Source and detector failures are terminal but handled: they are logged
/// and reflected in the returned stats rather than propagated. Only display
/// errors surface as `Err`, and the display is closed first even then.
pub fn run<S, D, W>(source: &mut S, detector: &mut D, display: &mut W) -> Result<PipelineStats>
where
    S: VideoSource + ?Sized,
    D: DetectorBackend + ?Sized,
    W: Display + ?Sized,
{
    let mut stats = PipelineStats::default();
    let result = run_loop(source, detector, display, &mut stats);

    // Cleanup must happen on every exit path, including display errors.
    if let Err(err) = display.close() {
        log::warn!("failed to close display: {:#}", err);
    }
    if let Err(err) = result {
        // The progress made so far would otherwise be lost with the error.
        log::info!(
            "stopping on display error after {} frames, {} detections, {} inference failures",
            stats.frames_processed,
            stats.detections_total,
            stats.detector_failures
        );
        return Err(err);
    }

    Ok(stats)
}

fn run_loop<S, D, W>(
    source: &mut S,
    detector: &mut D,
    display: &mut W,
    stats: &mut PipelineStats,
) -> Result<()>
where
    S: VideoSource + ?Sized,
    D: DetectorBackend + ?Sized,
    W: Display + ?Sized,
{
    let mut fps = FpsCounter::new();
    let mut last_health_log = Instant::now();

    loop {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("source reached end of stream");
                stats.stop = StopReason::EndOfStream;
                return Ok(());
            }
            Err(err) => {
                log::error!("failed to capture frame: {:#}", err);
                stats.stop = StopReason::SourceError;
                return Ok(());
            }
        };
        stats.frames_processed += 1;

        // A failed inference is not a device failure: show the frame bare
        // and keep going.
        let detections = match detector.detect(frame.pixels(), frame.width(), frame.height()) {
            Ok(detections) => detections,
            Err(err) => {
                stats.detector_failures += 1;
                log::warn!(
                    "inference failed on frame {}: {:#}",
                    stats.frames_processed,
                    err
                );
                Vec::new()
            }
        };
        stats.detections_total += detections.len() as u64;

        let rate = fps.tick();
        let annotated = overlay::annotate(&frame, &detections, rate);
        display.show(&annotated)?;

        if let Some(key) = display.poll_key(KEY_POLL_TIMEOUT)? {
            if key == QUIT_KEY {
                log::info!("quit key received, stopping");
                stats.stop = StopReason::QuitKey;
                return Ok(());
            }
        }

        if last_health_log.elapsed() >= HEALTH_LOG_INTERVAL {
            let source_stats = source.stats();
            log::info!(
                "source health={} frames={} device={}",
                source.is_healthy(),
                source_stats.frames_captured,
                source_stats.device
            );
            last_health_log = Instant::now();
        }
    }
}
