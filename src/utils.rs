//! Utility functions for numeric conversion and window statistics.

pub mod safe_cast;

/// Statistical summary of a data window
#[derive(Debug, Clone, Copy)]
pub struct Statistics {
    /// Mean value of the data
    pub mean: f64,
    /// Population standard deviation of the data
    pub std_dev: f64,
    /// Minimum value in the window
    pub min: f64,
    /// Maximum value in the window
    pub max: f64,
}

/// Calculate statistics for a data window, `None` when empty
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_stats<I>(data: I) -> Option<Statistics>
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let iter = data.into_iter();
    let count = iter.clone().count();
    if count == 0 {
        return None;
    }

    let n = count as f64;
    let mean = iter.clone().sum::<f64>() / n;
    let variance = iter.clone().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let min = iter.clone().fold(f64::INFINITY, f64::min);
    let max = iter.fold(f64::NEG_INFINITY, f64::max);

    Some(Statistics {
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
    })
}
