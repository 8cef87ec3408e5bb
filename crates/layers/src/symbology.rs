//! Marker symbology: one normal and one emphasized icon per content category.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Self-contained marker image plus its placement on the map.
///
/// `anchor_x`/`anchor_y` are pixel offsets from the image's top-left corner
/// to the point that sits on the marker's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconSpec {
    pub markup: String,
    pub width: u32,
    pub height: u32,
    pub anchor_x: u32,
    pub anchor_y: u32,
}

impl IconSpec {
    /// Encodes the markup as a base64 `data:` URL usable as an image source.
    pub fn data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(self.markup.as_bytes());
        format!("data:image/svg+xml;base64,{encoded}")
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconVariant {
    Normal,
    Emphasized,
}

/// Maps a category code to its icon.
///
/// Implementations must return an icon for every code; unknown codes fall
/// back to a default category.
pub trait IconResolver {
    fn resolve(&self, category_code: &str, variant: IconVariant) -> IconSpec;
}

/// A content category as published by the Korea Tour API (`contenttypeid`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Category {
    pub code: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

pub const DEFAULT_CATEGORY: Category = Category {
    code: "12",
    label: "관광지",
    color: "#2f80ed",
};

pub const CATEGORIES: &[Category] = &[
    DEFAULT_CATEGORY,
    Category {
        code: "14",
        label: "문화시설",
        color: "#9b51e0",
    },
    Category {
        code: "15",
        label: "축제공연행사",
        color: "#eb5757",
    },
    Category {
        code: "25",
        label: "여행코스",
        color: "#27ae60",
    },
    Category {
        code: "28",
        label: "레포츠",
        color: "#f2994a",
    },
    Category {
        code: "32",
        label: "숙박",
        color: "#56ccf2",
    },
    Category {
        code: "38",
        label: "쇼핑",
        color: "#f2c94c",
    },
    Category {
        code: "39",
        label: "음식점",
        color: "#e0457b",
    },
];

pub fn category(code: &str) -> Category {
    CATEGORIES
        .iter()
        .copied()
        .find(|c| c.code == code.trim())
        .unwrap_or(DEFAULT_CATEGORY)
}

/// Human-readable category name, falling back to the default category.
pub fn category_label(code: &str) -> &'static str {
    category(code).label
}

/// Pixel size of a pin before scaling.
const PIN_WIDTH: u32 = 24;
const PIN_HEIGHT: u32 = 35;

/// Static icon table built from [`CATEGORIES`].
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryIcons {
    normal_scale: f64,
    emphasized_scale: f64,
}

impl CategoryIcons {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for CategoryIcons {
    fn default() -> Self {
        Self {
            normal_scale: 1.0,
            emphasized_scale: 1.4,
        }
    }
}

impl IconResolver for CategoryIcons {
    fn resolve(&self, category_code: &str, variant: IconVariant) -> IconSpec {
        let cat = category(category_code);
        match variant {
            IconVariant::Normal => pin_icon(cat.color, self.normal_scale, 1.5),
            IconVariant::Emphasized => pin_icon(cat.color, self.emphasized_scale, 3.0),
        }
    }
}

fn pin_icon(color: &str, scale: f64, stroke_width: f64) -> IconSpec {
    let width = (PIN_WIDTH as f64 * scale).round() as u32;
    let height = (PIN_HEIGHT as f64 * scale).round() as u32;
    let markup = format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 24 35">"##,
            r##"<path d="M12 1C5.9 1 1 5.9 1 12c0 8.3 11 22 11 22s11-13.7 11-22C23 5.9 18.1 1 12 1z" "##,
            r##"fill="{color}" stroke="#ffffff" stroke-width="{stroke}"/>"##,
            r##"<circle cx="12" cy="12" r="4.5" fill="#ffffff"/></svg>"##
        ),
        w = width,
        h = height,
        color = color,
        stroke = stroke_width,
    );
    IconSpec {
        markup,
        width,
        height,
        // Pin tip: horizontally centred, bottom edge.
        anchor_x: width / 2,
        anchor_y: height,
    }
}
