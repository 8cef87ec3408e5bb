//! Coordinate normalization for tourist-site records.
//!
//! Upstream records carry positions in one of two encodings without a format
//! flag: plain WGS84 decimal degrees (`"126.9998434"`) or a legacy fixed-point
//! integer with seven implied decimals (`"1269998434"`). Both resolve to the
//! same [`Position`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bounds::KOREA_BOUNDS;

/// Divisor that turns a legacy fixed-point value into decimal degrees.
pub const LEGACY_FIXED_POINT_SCALE: f64 = 10_000_000.0;

/// WGS84 position in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

impl Position {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.7}, {:.7})", self.longitude, self.latitude)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Axis {
    Longitude,
    Latitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Longitude => f.write_str("longitude"),
            Axis::Latitude => f.write_str("latitude"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("invalid {axis} value {raw:?}")]
    InvalidCoordinate { axis: Axis, raw: String },
}

/// Resolves a raw longitude/latitude string pair to a [`Position`].
///
/// Values inside the Korea box pass through unchanged. Values outside it are
/// tried as legacy fixed-point integers; if the scaled value does not land in
/// the box either, the parsed value is kept as-is.
pub fn normalize(raw_longitude: &str, raw_latitude: &str) -> Result<Position, CoordinateError> {
    let lon = parse_axis(Axis::Longitude, raw_longitude)?;
    let lat = parse_axis(Axis::Latitude, raw_latitude)?;
    Ok(normalize_position(Position::new(lon, lat)))
}

/// Re-applies the fixed-point heuristic to an already parsed position.
///
/// Idempotent: `normalize_position(normalize_position(p)) == normalize_position(p)`.
pub fn normalize_position(p: Position) -> Position {
    Position::new(
        normalize_axis(p.longitude, |v| KOREA_BOUNDS.contains_lon(v)),
        normalize_axis(p.latitude, |v| KOREA_BOUNDS.contains_lat(v)),
    )
}

fn parse_axis(axis: Axis, raw: &str) -> Result<f64, CoordinateError> {
    let invalid = || CoordinateError::InvalidCoordinate {
        axis,
        raw: raw.to_string(),
    };
    let v: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !v.is_finite() {
        return Err(invalid());
    }
    Ok(v)
}

fn normalize_axis(v: f64, in_range: impl Fn(f64) -> bool) -> f64 {
    if in_range(v) {
        return v;
    }
    let scaled = v / LEGACY_FIXED_POINT_SCALE;
    if in_range(scaled) { scaled } else { v }
}
