//! Signal smoothing for gaze ratios and cursor positions.
//!
//! The same moving-average window is used for 1-D values (eye aspect
//! ratios) and 2-D values (gaze ratios, screen positions).

/// Moving average filter over a bounded FIFO window
pub mod moving_average;

use crate::geometry::Point2;
use std::ops::{Add, Div, Mul};

pub use moving_average::MovingAverageFilter;

/// Values that can be averaged by a smoothing window
pub trait Smoothable:
    Copy + Default + Add<Output = Self> + Mul<f64, Output = Self> + Div<f64, Output = Self>
{
}

impl Smoothable for f64 {}

impl Smoothable for Point2 {}

/// Moving average over gaze ratios or screen positions
pub type PointSmoother = MovingAverageFilter<Point2>;
