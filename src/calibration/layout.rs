use crate::{constants::CALIBRATION_MARGIN, geometry::Point2, Error, Result};

/// Screen positions of the calibration targets, in presentation order
///
/// Targets keep a margin of 10 % of the screen size from every edge.
/// Four points are the corners (TL, TR, BL, BR), five points add the center
/// between the top and bottom rows, nine points form a row-major 3x3 grid.
///
/// # Errors
///
/// Returns `InvalidConfiguration` for any other point count
pub fn target_positions(num_points: u8, width: u32, height: u32) -> Result<Vec<Point2>> {
    let w = f64::from(width);
    let h = f64::from(height);

    let left = w * CALIBRATION_MARGIN;
    let right = w * (1.0 - CALIBRATION_MARGIN);
    let top = h * CALIBRATION_MARGIN;
    let bottom = h * (1.0 - CALIBRATION_MARGIN);
    let center_x = w / 2.0;
    let center_y = h / 2.0;

    let points = match num_points {
        4 => vec![
            Point2::new(left, top),
            Point2::new(right, top),
            Point2::new(left, bottom),
            Point2::new(right, bottom),
        ],
        5 => vec![
            Point2::new(left, top),
            Point2::new(right, top),
            Point2::new(center_x, center_y),
            Point2::new(left, bottom),
            Point2::new(right, bottom),
        ],
        9 => [top, center_y, bottom]
            .into_iter()
            .flat_map(|y| [left, center_x, right].into_iter().map(move |x| Point2::new(x, y)))
            .collect(),
        n => {
            return Err(Error::InvalidConfiguration(format!(
                "Calibration point count must be 4, 5 or 9, got {n}"
            )))
        }
    };

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_point_grid_is_row_major() {
        let points = target_positions(9, 1000, 500).unwrap();
        assert_eq!(points.len(), 9);
        assert_eq!(points[0], Point2::new(100.0, 50.0));
        assert_eq!(points[1], Point2::new(500.0, 50.0));
        assert_eq!(points[2], Point2::new(900.0, 50.0));
        assert_eq!(points[4], Point2::new(500.0, 250.0));
        assert_eq!(points[8], Point2::new(900.0, 450.0));
    }

    #[test]
    fn test_five_point_layout() {
        let points = target_positions(5, 1000, 500).unwrap();
        assert_eq!(points[2], Point2::new(500.0, 250.0));
        assert_eq!(points[3], Point2::new(100.0, 450.0));
    }

    #[test]
    fn test_four_corners() {
        let points = target_positions(4, 1000, 500).unwrap();
        assert_eq!(
            points,
            vec![
                Point2::new(100.0, 50.0),
                Point2::new(900.0, 50.0),
                Point2::new(100.0, 450.0),
                Point2::new(900.0, 450.0),
            ]
        );
    }

    #[test]
    fn test_unsupported_count() {
        assert!(matches!(
            target_positions(7, 1000, 500),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}
