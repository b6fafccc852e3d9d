//! Linear axes mapping data values to pixel coordinates.

use serde::{Deserialize, Serialize};

/// A closed numeric interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Parse an extent string: "min,max"
    pub fn from_str_pair(s: &str) -> Result<Self, ExtentParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 2 {
            return Err(ExtentParseError::InvalidFormat(s.to_string()));
        }

        Ok(Self {
            min: parts[0]
                .parse()
                .map_err(|_| ExtentParseError::InvalidNumber(parts[0].to_string()))?,
            max: parts[1]
                .parse()
                .map_err(|_| ExtentParseError::InvalidNumber(parts[1].to_string()))?,
        })
    }

    /// Smallest extent covering all finite values, or `None` if there are none.
    pub fn of_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(Extent::new(v, v)),
                Some(e) => Some(Extent::new(e.min.min(v), e.max.max(v))),
            })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtentParseError {
    #[error("Invalid extent format: {0}. Expected 'min,max'")]
    InvalidFormat(String),

    #[error("Invalid number in extent: {0}")]
    InvalidNumber(String),
}

/// Maps a data extent linearly onto a pixel coordinate extent.
///
/// The coordinate extent may be decreasing (e.g. `[height, 0]` for a y axis
/// with the origin at the top of the image). No clamping is applied in
/// either direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearAxis {
    data_extent: Extent,
    coord_extent: [f64; 2],
}

impl LinearAxis {
    pub fn new(data_extent: Extent, coord_extent: [f64; 2]) -> Self {
        Self {
            data_extent,
            coord_extent,
        }
    }

    pub fn data_extent(&self) -> Extent {
        self.data_extent
    }

    pub fn coord_extent(&self) -> [f64; 2] {
        self.coord_extent
    }

    pub fn set_coord_extent(&mut self, min: f64, max: f64) {
        self.coord_extent = [min, max];
    }

    /// Swap the direction of the coordinate extent.
    pub fn reverse(&mut self) {
        self.coord_extent.reverse();
    }

    /// Position of `data` within the data extent; 0.5 for a degenerate extent.
    pub fn normalize(&self, data: f64) -> f64 {
        let span = self.data_extent.span();
        if span == 0.0 {
            return 0.5;
        }
        (data - self.data_extent.min) / span
    }

    /// Inverse of [`normalize`](Self::normalize).
    pub fn scale(&self, t: f64) -> f64 {
        self.data_extent.min + t * self.data_extent.span()
    }

    pub fn data_to_coord(&self, data: f64) -> f64 {
        let [start, end] = self.coord_extent;
        start + self.normalize(data) * (end - start)
    }

    pub fn coord_to_data(&self, coord: f64) -> f64 {
        let [start, end] = self.coord_extent;
        let span = end - start;
        let t = if span == 0.0 { 0.5 } else { (coord - start) / span };
        self.scale(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extent() {
        let e = Extent::from_str_pair("-10, 20.5").unwrap();
        assert_eq!(e, Extent::new(-10.0, 20.5));
        assert!(Extent::from_str_pair("1,2,3").is_err());
        assert!(Extent::from_str_pair("a,2").is_err());
    }

    #[test]
    fn test_extent_of_values_skips_non_finite() {
        let e = Extent::of_values([3.0, f64::NAN, -1.0, 7.0]).unwrap();
        assert_eq!(e, Extent::new(-1.0, 7.0));
        assert!(Extent::of_values([f64::NAN]).is_none());
    }

    #[test]
    fn test_data_to_coord_round_trip() {
        let axis = LinearAxis::new(Extent::new(0.0, 100.0), [0.0, 400.0]);
        assert_eq!(axis.data_to_coord(25.0), 100.0);
        assert_eq!(axis.coord_to_data(100.0), 25.0);
        // Unclamped beyond the extent
        assert_eq!(axis.data_to_coord(150.0), 600.0);
    }

    #[test]
    fn test_reversed_axis() {
        let mut axis = LinearAxis::new(Extent::new(0.0, 10.0), [0.0, 200.0]);
        axis.reverse();
        assert_eq!(axis.coord_extent(), [200.0, 0.0]);
        assert_eq!(axis.data_to_coord(0.0), 200.0);
        assert_eq!(axis.data_to_coord(10.0), 0.0);
    }

    #[test]
    fn test_degenerate_extent_maps_to_middle() {
        let axis = LinearAxis::new(Extent::new(5.0, 5.0), [0.0, 100.0]);
        assert_eq!(axis.data_to_coord(5.0), 50.0);
    }
}
