use std::collections::VecDeque;

use super::Smoothable;

/// Fixed-capacity moving average over the most recent samples
#[derive(Debug, Clone)]
pub struct MovingAverageFilter<T> {
    window_size: usize,
    buffer: VecDeque<T>,
}

impl<T: Smoothable> MovingAverageFilter<T> {
    /// Create a filter averaging over `window_size` samples
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is zero.
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "Window size must be greater than 0");
        Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size),
        }
    }

    /// Add a sample and return the average of the current window
    pub fn push(&mut self, value: T) -> T {
        if self.buffer.len() >= self.window_size {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);

        // Non-empty after the push above
        self.mean()
    }

    /// Average of the current window, `None` before the first sample
    #[must_use]
    pub fn average(&self) -> Option<T> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.mean())
        }
    }

    /// Drop every retained sample
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of samples currently retained
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// No sample retained
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Configured window size
    #[must_use]
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// Retained samples, oldest first
    pub fn samples(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(&self) -> T {
        let sum = self
            .buffer
            .iter()
            .fold(T::default(), |acc, value| acc + *value);
        sum / self.buffer.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2;

    #[test]
    fn test_moving_average_scalar() {
        let mut filter = MovingAverageFilter::new(3);

        assert_eq!(filter.push(10.0), 10.0);
        assert_eq!(filter.push(20.0), 15.0);
        assert_eq!(filter.push(30.0), 20.0);

        // Window is full, oldest value should be dropped
        assert_eq!(filter.push(40.0), 30.0);
        assert_eq!(filter.len(), 3);
    }

    #[test]
    fn test_moving_average_points() {
        let mut filter = MovingAverageFilter::new(2);

        filter.push(Point2::new(10.0, 20.0));
        let avg = filter.push(Point2::new(20.0, 40.0));
        assert_eq!(avg, Point2::new(15.0, 30.0));

        let avg = filter.push(Point2::new(30.0, 60.0));
        assert_eq!(avg, Point2::new(25.0, 50.0));
    }

    #[test]
    fn test_average_before_first_sample() {
        let mut filter: MovingAverageFilter<f64> = MovingAverageFilter::new(4);
        assert!(filter.average().is_none());
        filter.push(1.0);
        assert_eq!(filter.average(), Some(1.0));
        filter.reset();
        assert!(filter.is_empty());
    }

    #[test]
    #[should_panic(expected = "Window size must be greater than 0")]
    fn test_zero_window() {
        let _ = MovingAverageFilter::<f64>::new(0);
    }
}
