use serde::{Deserialize, Serialize};

use crate::coord::Position;

/// Axis-aligned geographic bounding box in WGS84 degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

/// Valid extent for South Korean tourist-site coordinates.
pub const KOREA_BOUNDS: GeoBounds = GeoBounds::new(124.0, 33.0, 132.0, 43.0);

impl GeoBounds {
    pub const fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        GeoBounds {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Smallest box enclosing every position, or `None` for an empty slice.
    pub fn from_positions(positions: &[Position]) -> Option<Self> {
        let (first, rest) = positions.split_first()?;
        let mut b = GeoBounds::new(
            first.longitude,
            first.latitude,
            first.longitude,
            first.latitude,
        );
        for p in rest {
            b.min_lon = b.min_lon.min(p.longitude);
            b.min_lat = b.min_lat.min(p.latitude);
            b.max_lon = b.max_lon.max(p.longitude);
            b.max_lat = b.max_lat.max(p.latitude);
        }
        Some(b)
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// The larger of the longitude and latitude extents, in degrees.
    pub fn span(&self) -> f64 {
        self.lon_span().max(self.lat_span())
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon)
    }

    pub fn contains_lat(&self, lat: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat)
    }

    pub fn contains(&self, p: Position) -> bool {
        self.contains_lon(p.longitude) && self.contains_lat(p.latitude)
    }
}
