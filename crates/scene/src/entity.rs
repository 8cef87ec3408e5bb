use std::fmt;

use foundation::coord::{CoordinateError, Position, normalize};
use serde::{Deserialize, Serialize};

/// Identifier of a tourist-site record, as issued by the upstream catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One tourist-site record. Read-only to the map engine.
///
/// Accepts both the engine's field names and the Korea Tour API item names
/// (`contentid`, `contenttypeid`, `mapx`, `mapy`, `addr1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(alias = "contentid")]
    pub id: EntityId,
    pub title: String,
    #[serde(alias = "contenttypeid", default)]
    pub category_code: String,
    #[serde(alias = "mapx", default)]
    pub raw_longitude: String,
    #[serde(alias = "mapy", default)]
    pub raw_latitude: String,
    #[serde(alias = "addr1", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Entity {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category_code: impl Into<String>,
        raw_longitude: impl Into<String>,
        raw_latitude: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(id),
            title: title.into(),
            category_code: category_code.into(),
            raw_longitude: raw_longitude.into(),
            raw_latitude: raw_latitude.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Resolves the record's raw coordinates.
    pub fn position(&self) -> Result<Position, CoordinateError> {
        normalize(&self.raw_longitude, &self.raw_latitude)
    }

    /// Address, if present and non-blank.
    pub fn address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{Entity, EntityId};
    use foundation::coord::Position;

    #[test]
    fn deserializes_tour_api_item() {
        let raw = r#"{
            "contentid": "126508",
            "title": "경복궁",
            "contenttypeid": "12",
            "mapx": "126.9769930325",
            "mapy": "37.5788222356",
            "addr1": "서울특별시 종로구 사직로 161"
        }"#;
        let e: Entity = serde_json::from_str(raw).unwrap();
        assert_eq!(e.id, EntityId::new("126508"));
        assert_eq!(e.category_code, "12");
        assert_eq!(e.address(), Some("서울특별시 종로구 사직로 161"));
        assert_eq!(
            e.position().unwrap(),
            Position::new(126.9769930325, 37.5788222356)
        );
    }

    #[test]
    fn deserializes_engine_field_names() {
        let raw = r#"{
            "id": "a",
            "title": "A",
            "categoryCode": "39",
            "rawLongitude": "1269998434",
            "rawLatitude": "374296913"
        }"#;
        let e: Entity = serde_json::from_str(raw).unwrap();
        assert_eq!(e.address, None);
        assert!(e.position().is_ok());
    }

    #[test]
    fn missing_coordinates_do_not_resolve() {
        let raw = r#"{ "contentid": "1", "title": "no coords" }"#;
        let e: Entity = serde_json::from_str(raw).unwrap();
        assert!(e.position().is_err());
    }

    #[test]
    fn blank_address_is_treated_as_absent() {
        let e = Entity::new("1", "x", "12", "127", "37").with_address("  ");
        assert_eq!(e.address(), None);
    }
}
