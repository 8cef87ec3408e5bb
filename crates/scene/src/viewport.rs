//! Initial center/zoom selection from resolved marker positions.
//!
//! Zoom levels follow the web-map convention: larger values are closer in.

use foundation::bounds::GeoBounds;
use foundation::coord::Position;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: Position,
    pub zoom: u8,
}

/// Geographic centre of South Korea, used when there is nothing to show.
pub const FALLBACK_CENTER: Position = Position::new(127.7669, 35.9078);
/// Whole-country zoom.
pub const FALLBACK_ZOOM: u8 = 7;
/// Zoom used to frame a single site.
pub const SINGLE_POSITION_ZOOM: u8 = 15;

/// `(exclusive upper span bound in degrees, zoom)`, checked in order.
const SPAN_ZOOM_STEPS: &[(f64, u8)] = &[(0.01, 15), (0.05, 13), (0.1, 12), (0.5, 10)];
const WIDEST_ZOOM: u8 = 8;

pub fn zoom_for_span(span_deg: f64) -> u8 {
    SPAN_ZOOM_STEPS
        .iter()
        .find(|(limit, _)| span_deg < *limit)
        .map(|(_, zoom)| *zoom)
        .unwrap_or(WIDEST_ZOOM)
}

/// Picks the view shown when a session is built.
///
/// Several positions are centred on their arithmetic mean, not the
/// bounding-box midpoint.
pub fn compute_initial_view(positions: &[Position]) -> ViewState {
    let Some(bounds) = GeoBounds::from_positions(positions) else {
        return ViewState {
            center: FALLBACK_CENTER,
            zoom: FALLBACK_ZOOM,
        };
    };
    if let [only] = positions {
        return ViewState {
            center: *only,
            zoom: SINGLE_POSITION_ZOOM,
        };
    }

    let n = positions.len() as f64;
    let (sum_lon, sum_lat) = positions.iter().fold((0.0, 0.0), |(lon, lat), p| {
        (lon + p.longitude, lat + p.latitude)
    });
    ViewState {
        center: Position::new(sum_lon / n, sum_lat / n),
        zoom: zoom_for_span(bounds.span()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_uses_fallback() {
        let v = compute_initial_view(&[]);
        assert_eq!(v.center, FALLBACK_CENTER);
        assert_eq!(v.zoom, FALLBACK_ZOOM);
    }

    #[test]
    fn single_position_is_centred_close_in() {
        let p = Position::new(126.98, 37.57);
        let v = compute_initial_view(&[p]);
        assert_eq!(v.center, p);
        assert_eq!(v.zoom, SINGLE_POSITION_ZOOM);
    }

    #[test]
    fn many_positions_use_mean_and_span_table() {
        let v = compute_initial_view(&[Position::new(126.0, 37.0), Position::new(128.0, 38.0)]);
        assert_eq!(v.center, Position::new(127.0, 37.5));
        assert_eq!(v.zoom, 8);
    }

    #[test]
    fn mean_differs_from_bbox_midpoint() {
        let v = compute_initial_view(&[
            Position::new(127.0, 37.0),
            Position::new(127.0, 37.0),
            Position::new(127.3, 37.3),
        ]);
        assert!((v.center.longitude - 127.1).abs() < 1e-9);
        assert!((v.center.latitude - 37.1).abs() < 1e-9);
        assert_eq!(v.zoom, 10);
    }

    #[test]
    fn span_steps() {
        assert_eq!(zoom_for_span(0.0), 15);
        assert_eq!(zoom_for_span(0.009), 15);
        assert_eq!(zoom_for_span(0.01), 13);
        assert_eq!(zoom_for_span(0.049), 13);
        assert_eq!(zoom_for_span(0.05), 12);
        assert_eq!(zoom_for_span(0.099), 12);
        assert_eq!(zoom_for_span(0.1), 10);
        assert_eq!(zoom_for_span(0.49), 10);
        assert_eq!(zoom_for_span(0.5), 8);
        assert_eq!(zoom_for_span(12.0), 8);
    }

    #[test]
    fn coincident_positions_zoom_all_the_way_in() {
        let p = Position::new(129.0, 35.1);
        let v = compute_initial_view(&[p, p, p]);
        assert_eq!(v.zoom, 15);
        assert!((v.center.longitude - p.longitude).abs() < 1e-9);
    }
}
