//! Per-marker popups: content, and the single-open activation rule.

use layers::symbology::category_label;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId};
use crate::sdk::MapSdk;
use crate::session::MapSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoWindowContent {
    pub title: String,
    /// Address when known, otherwise the category name.
    pub location: String,
    pub detail_url: String,
}

impl InfoWindowContent {
    pub fn to_html(&self) -> String {
        format!(
            concat!(
                r#"<div class="marker-info">"#,
                r#"<strong class="marker-info__title">{title}</strong>"#,
                r#"<p class="marker-info__location">{location}</p>"#,
                r#"<a class="marker-info__link" href="{href}">자세히 보기</a>"#,
                "</div>"
            ),
            title = escape_html(&self.title),
            location = escape_html(&self.location),
            href = escape_html(&self.detail_url),
        )
    }
}

/// Builds info-window content from entity records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoWindowTemplate {
    detail_base_url: String,
}

impl InfoWindowTemplate {
    pub fn new(detail_base_url: impl Into<String>) -> Self {
        let mut detail_base_url = detail_base_url.into();
        while detail_base_url.ends_with('/') {
            detail_base_url.pop();
        }
        Self { detail_base_url }
    }

    pub fn detail_url(&self, id: &EntityId) -> String {
        format!("{}/{}", self.detail_base_url, id)
    }

    pub fn content_for(&self, entity: &Entity) -> InfoWindowContent {
        let location = entity
            .address()
            .unwrap_or_else(|| category_label(&entity.category_code))
            .to_string();
        InfoWindowContent {
            title: entity.title.clone(),
            location,
            detail_url: self.detail_url(&entity.id),
        }
    }
}

impl Default for InfoWindowTemplate {
    fn default() -> Self {
        Self::new("/detail")
    }
}

/// Opens the info window of `id`, closing every other one first.
///
/// Returns `false` (and changes nothing) when `id` has no info window.
pub fn activate<S: MapSdk>(session: &MapSession<S>, sdk: &mut S, id: &EntityId) -> bool {
    let (Some(map), Some(window), Some(placed)) = (
        session.map.as_ref(),
        session.info_windows_by_entity_id.get(id),
        session.markers_by_entity_id.get(id),
    ) else {
        return false;
    };
    for other in session.info_windows_by_entity_id.values() {
        sdk.close_info_window(other);
    }
    sdk.open_info_window(window, map, &placed.handle);
    true
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
