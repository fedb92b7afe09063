//! Gaze and gesture control library for hands-free desktop interaction.
//!
//! The library turns per-frame facial and hand landmarks (produced by an
//! external detector) into cursor movement and desktop actions:
//! - Gaze estimation from the iris position inside each eye
//! - Calibration that maps gaze ratios to screen pixels by inverse-distance
//!   weighting
//! - Eye gestures (single, double and long blinks, directional looks)
//! - Hand gestures (static poses and swipes)
//! - Dwell clicking, a gesture binding table and an X11 output sink
//!
//! The processing pipeline for each frame is:
//! 1. Estimate the gaze ratio and eye aspect ratio
//! 2. Smooth the gaze ratio with a moving average
//! 3. Feed a running calibration session, or map the gaze to the screen
//! 4. Update the eye and hand gesture recognizers
//! 5. Move the cursor, detect dwell clicks and dispatch bound actions
//!
//! # Examples
//!
//! ## Replaying recorded landmarks
//!
//! ```no_run
//! use gaze_gesture_control::{
//!     app::GazeControlApp, config::Config, landmarks::ReplaySource, sink::LogSink,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut app = GazeControlApp::new(Config::default(), LogSink::new())?;
//! let mut source = ReplaySource::from_file("session.yaml")?;
//! let summary = app.run(&mut source)?;
//! println!("{} frames, {} actions", summary.frames, summary.actions_dispatched);
//! # Ok(())
//! # }
//! ```
//!
//! ## Eye gestures
//!
//! ```
//! use gaze_gesture_control::{
//!     config::EyeGestureConfig, eye_gestures::EyeGestureMachine, geometry::Point2,
//!     gestures::GestureKind,
//! };
//!
//! let mut machine = EyeGestureMachine::new(EyeGestureConfig::default(), 0.5);
//! let center = Point2::new(0.5, 0.5);
//!
//! // Eyes closed for a full second
//! machine.update(0.1, center, 0.0);
//! let events = machine.update(0.3, center, 1.0);
//! assert_eq!(events[0].kind, GestureKind::LongBlink);
//! ```
//!
//! ## Smoothing
//!
//! ```
//! use gaze_gesture_control::filters::MovingAverageFilter;
//!
//! let mut filter = MovingAverageFilter::<f64>::new(3);
//! filter.push(1.0);
//! filter.push(2.0);
//! assert_eq!(filter.push(3.0), 2.0);
//! ```

/// Planar point type
pub mod geometry;

/// Landmark frames and their sources
pub mod landmarks;

/// Gaze ratio and eye aspect ratio estimation
pub mod gaze_estimation;

/// Moving average smoothing for scalars and points
pub mod filters;

/// Gaze-to-screen calibration
pub mod calibration;

/// Gesture kinds and events
pub mod gestures;

/// Per-kind cooldown tracking
pub mod cooldown;

/// Blink and directional gaze state machine
pub mod eye_gestures;

/// Static and swipe hand gesture recognition
pub mod hand_gestures;

/// Dwell click detection
pub mod dwell;

/// Desktop actions and gesture bindings
pub mod actions;

/// Cursor smoothing, click modes and action dispatch policy
pub mod action_controller;

/// Action sinks
pub mod sink;

/// Gaze-typed virtual keyboard
pub mod virtual_keyboard;

/// Utility functions for numeric conversions and statistics
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Cursor control module for X11 systems
pub mod cursor_control;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
