//! robot-vision - live object-detection preview
//!
//! Opens a camera, runs the detector over every frame, and shows the
//! annotated stream with an FPS readout until the user presses 'q' (or
//! ctrl-c in headless mode). All init and runtime failures are handled:
//! they log a diagnostic and the process exits cleanly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use robot_vision::display::Display;
#[cfg(feature = "display-opencv")]
use robot_vision::OpencvDisplay;
use robot_vision::{
    pipeline, CameraConfig, CameraSource, DetectorBackend, HeadlessDisplay, StubBackend,
    VideoSource,
};
#[cfg(feature = "backend-tract")]
use robot_vision::YoloBackend;

#[cfg(feature = "display-opencv")]
const WINDOW_NAME: &str = "Industrial Robot Vision";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the ONNX detector weights (or stub:// for the motion stub).
    #[arg(long, default_value = "yolov8n.onnx")]
    model: String,
    /// Confidence threshold for detections.
    #[arg(long, default_value_t = 0.25)]
    conf: f32,
    /// Camera index (usually 0 for built-in, 1 for USB).
    #[arg(long, default_value_t = 0)]
    camera: u32,
    /// Capture device override (e.g. /dev/video1 or stub://bench).
    #[arg(long)]
    device: Option<String>,
    /// Run without a preview window, logging instead of rendering.
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let Some((mut detector, mut source)) = init_pipeline(&args, open_source) else {
        // Handled init failure, already logged.
        return Ok(());
    };

    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit = quit.clone();
        ctrlc::set_handler(move || quit.store(true, Ordering::SeqCst))
            .context("install ctrl-c handler")?;
    }
    let mut display = build_display(args.headless, quit);

    log::info!(
        "camera opened. press '{}' in the preview window to exit",
        pipeline::QUIT_KEY
    );
    let stats = pipeline::run(&mut source, detector.as_mut(), display.as_mut())?;
    log::info!(
        "stopped ({:?}): {} frames processed, {} detections, {} inference failures",
        stats.stop,
        stats.frames_processed,
        stats.detections_total,
        stats.detector_failures
    );
    Ok(())
}

/// Loads the model, then opens the camera. The order matters: a bad
/// weights path must never touch the device, so `open` is only called
/// once the detector is ready. Returns `None` on a handled failure
/// (already logged) so `main` can exit cleanly.
fn init_pipeline<S, F>(args: &Args, open: F) -> Option<(Box<dyn DetectorBackend>, S)>
where
    F: FnOnce(CameraConfig) -> Result<S>,
{
    let mut detector = match build_detector(args) {
        Ok(detector) => detector,
        Err(err) => {
            log::error!("error loading model: {:#}", err);
            return None;
        }
    };
    if let Err(err) = detector.warm_up() {
        log::warn!("model warm-up failed: {:#}", err);
    }

    let config = match &args.device {
        Some(device) => CameraConfig {
            device: device.clone(),
            ..CameraConfig::default()
        },
        None => CameraConfig::for_index(args.camera),
    };
    let device = config.device.clone();
    match open(config) {
        Ok(source) => Some((detector, source)),
        Err(err) => {
            log::error!("could not open camera {}: {:#}", device, err);
            log::error!("try a different camera index using the --camera argument");
            None
        }
    }
}

fn build_detector(args: &Args) -> Result<Box<dyn DetectorBackend>> {
    if args.model.starts_with("stub://") {
        log::info!("using stub motion detector ({})", args.model);
        return Ok(Box::new(StubBackend::new(args.conf)));
    }
    #[cfg(feature = "backend-tract")]
    {
        let backend = YoloBackend::new(&args.model, args.conf)?;
        log::info!("loaded model from {}", args.model);
        Ok(Box::new(backend))
    }
    #[cfg(not(feature = "backend-tract"))]
    {
        Err(anyhow::anyhow!(
            "loading {} requires the backend-tract feature",
            args.model
        ))
    }
}

fn open_source(config: CameraConfig) -> Result<CameraSource> {
    let mut source = CameraSource::new(config)?;
    source.connect()?;
    Ok(source)
}

fn build_display(headless: bool, quit: Arc<AtomicBool>) -> Box<dyn Display> {
    #[cfg(feature = "display-opencv")]
    {
        if !headless {
            return Box::new(OpencvDisplay::new(WINDOW_NAME));
        }
    }
    #[cfg(not(feature = "display-opencv"))]
    if !headless {
        log::info!("preview window requires the display-opencv feature; running headless");
    }
    Box::new(HeadlessDisplay::new(quit))
}
