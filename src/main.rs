//! Gaze and gesture desktop control driven by recorded landmark frames.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gaze_gesture_control::{
    action_controller::ClickMode,
    app::{GazeControlApp, RunSummary},
    config::{Config, EXAMPLE_CONFIG},
    cursor_control::CursorController,
    landmarks::{LandmarkSource, ReplaySource},
    sink::{ActionSink, LogSink},
};
use log::{info, warn};
use std::{path::PathBuf, thread, time::Duration};

/// Output backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    /// Drive the X11 pointer and keyboard
    X11,
    /// Log actions only
    Log,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Landmark frames to replay (YAML list)
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Where actions are sent
    #[arg(short, long, value_enum, default_value = "log")]
    sink: SinkKind,

    /// Run a calibration session at the start of the stream
    #[arg(long)]
    calibrate: bool,

    /// Calibration model file to load and save
    #[arg(long)]
    calibration_file: Option<PathBuf>,

    /// Click mode (dwell, gesture, manual)
    #[arg(long)]
    click_mode: Option<ClickMode>,

    /// Cursor sensitivity (0.1 to 3.0)
    #[arg(long)]
    sensitivity: Option<f64>,

    /// Pace replayed frames by their timestamps
    #[arg(long)]
    realtime: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    info!("Gaze & Gesture Control");

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::load(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(mode) = args.click_mode {
        config.control.click_mode = mode;
    }
    if let Some(sensitivity) = args.sensitivity {
        config.control.sensitivity = sensitivity;
        config.clamp_adjustable_values();
    }
    if let Some(path) = args.calibration_file.clone() {
        config.calibration.file = Some(path);
    }

    let Some(replay) = args.replay.as_ref() else {
        warn!("No landmark input given, nothing to do (see --replay)");
        return Ok(());
    };
    let mut source = ReplaySource::from_file(replay)
        .with_context(|| format!("Failed to read landmark frames from {}", replay.display()))?;

    let summary = match args.sink {
        SinkKind::X11 => {
            let sink = CursorController::new().context("Failed to open X11 display")?;
            run(config, sink, &mut source, &args)?
        }
        SinkKind::Log => run(config, LogSink::new(), &mut source, &args)?,
    };

    info!(
        "Done: {} frames, {} without face, {} gestures, {} actions, {} sink errors",
        summary.frames,
        summary.frames_without_face,
        summary.gestures_recognized,
        summary.actions_dispatched,
        summary.sink_errors
    );
    Ok(())
}

fn run<S: ActionSink>(
    config: Config,
    sink: S,
    source: &mut dyn LandmarkSource,
    args: &Args,
) -> Result<RunSummary> {
    let mut app = GazeControlApp::new(config, sink)?;

    if args.calibrate {
        info!("Starting calibration");
        app.start_calibration();
    } else if !app.calibration().is_calibrated() {
        info!("No calibration loaded, using raw gaze mapping");
    }

    if !args.realtime {
        return Ok(app.run(source)?);
    }

    let mut summary = RunSummary::default();
    let mut previous: Option<f64> = None;
    while let Some(frame) = source.next_frame()? {
        if let Some(prev) = previous {
            let delta = frame.timestamp - prev;
            if delta > 0.0 && delta.is_finite() {
                thread::sleep(Duration::from_secs_f64(delta));
            }
        }
        previous = Some(frame.timestamp);
        summary.record(&app.process_frame(&frame));
    }
    Ok(summary)
}
