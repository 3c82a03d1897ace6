use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::error::{EngineError, EngineResult};

/// One batch of images to load, as passed to `Engine::load_assets`.
///
/// Without `collection_name`, each named entry becomes a single entity
/// registered under its name. With it, every entry spawns `amount` entities
/// (default 1) appended to the named collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    /// Collection to append entities to. Created on first use.
    #[serde(default)]
    pub collection_name: Option<String>,
    /// Images in this batch. Each entry counts once toward the ready threshold.
    #[serde(default)]
    pub assets: Vec<AssetDescriptor>,
    /// Entities spawned per loaded image in a collection (default: 1).
    #[serde(default)]
    pub amount: Option<u32>,
}

/// A single image source within a `LoadRequest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Image URL or path, passed verbatim to the host loader.
    pub src: String,
    /// Registry name for singleton assets. Ignored inside collections.
    #[serde(default)]
    pub name: Option<String>,
    /// Resting position of the spawned entities (default: origin).
    #[serde(default)]
    pub offset: Option<Offset>,
}

/// Static origin bias for an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl From<Offset> for Vec2 {
    fn from(offset: Offset) -> Self {
        Vec2::new(offset.x, offset.y)
    }
}

impl AssetDescriptor {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            name: None,
            offset: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Some(Offset { x, y });
        self
    }

    /// Offset as a vector, origin when unset.
    pub fn offset_vec(&self) -> Vec2 {
        self.offset.map(Vec2::from).unwrap_or(Vec2::ZERO)
    }
}

impl LoadRequest {
    /// A batch of singleton assets.
    pub fn new() -> Self {
        Self::default()
    }

    /// A batch feeding the named collection.
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_asset(mut self, asset: AssetDescriptor) -> Self {
        self.assets.push(asset);
        self
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Entities spawned per image when this batch feeds a collection.
    pub fn spawn_count(&self) -> u32 {
        self.amount.unwrap_or(1)
    }

    /// Parse and validate a request from a JSON string.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let request: Self = serde_json::from_str(json)?;
        request.validate()?;
        Ok(request)
    }

    /// Reject malformed batches before they touch any loader state.
    pub fn validate(&self) -> EngineResult<()> {
        if self.assets.is_empty() {
            return Err(EngineError::InvalidRequest(
                "request has no assets".to_string(),
            ));
        }
        if let Some(index) = self.assets.iter().position(|a| a.src.trim().is_empty()) {
            return Err(EngineError::InvalidRequest(format!(
                "asset {index} has an empty src"
            )));
        }
        match (&self.collection_name, self.amount) {
            (Some(name), _) if name.is_empty() => Err(EngineError::InvalidRequest(
                "collection name is empty".to_string(),
            )),
            (_, Some(0)) => Err(EngineError::InvalidRequest(
                "amount must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_named_assets() {
        let json = r#"{
            "assets": [
                { "src": "img/bg.png", "name": "background" },
                { "src": "img/bird.png", "name": "bird", "offset": { "x": 60, "y": 200 } }
            ]
        }"#;
        let request = LoadRequest::from_json(json).unwrap();
        assert_eq!(request.assets.len(), 2);
        assert!(request.collection_name.is_none());
        assert_eq!(request.assets[0].offset_vec(), Vec2::ZERO);
        assert_eq!(request.assets[1].name.as_deref(), Some("bird"));
        assert_eq!(request.assets[1].offset_vec(), Vec2::new(60.0, 200.0));
    }

    #[test]
    fn parse_collection_with_amount() {
        let json = r#"{
            "collectionName": "pipes",
            "assets": [ { "src": "img/pipe.png", "offset": { "x": 500 } } ],
            "amount": 5
        }"#;
        let request = LoadRequest::from_json(json).unwrap();
        assert_eq!(request.collection_name.as_deref(), Some("pipes"));
        assert_eq!(request.spawn_count(), 5);
        assert_eq!(request.assets[0].offset_vec(), Vec2::new(500.0, 0.0));
    }

    #[test]
    fn missing_assets_is_invalid_request() {
        let err = LoadRequest::from_json(r#"{ "collectionName": "pipes" }"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)), "got {err}");
    }

    #[test]
    fn wrong_shape_is_json_error() {
        let err = LoadRequest::from_json(r#"{ "assets": "bird.png" }"#).unwrap_err();
        assert!(matches!(err, EngineError::Json(_)));
    }

    #[test]
    fn validate_rejects_bad_fields() {
        let empty_src = LoadRequest::new().with_asset(AssetDescriptor::new("  "));
        assert!(empty_src.validate().is_err());

        let zero = LoadRequest::collection("pipes")
            .with_asset(AssetDescriptor::new("pipe.png"))
            .with_amount(0);
        assert!(zero.validate().is_err());


        let unnamed = LoadRequest::collection("").with_asset(AssetDescriptor::new("pipe.png"));
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn amount_without_collection_is_ignored() {
        let request = LoadRequest::new()
            .with_asset(AssetDescriptor::new("bird.png").named("bird"))
            .with_amount(3);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn builder_produces_valid_request() {
        let request = LoadRequest::collection("pipes")
            .with_asset(AssetDescriptor::new("pipe.png").with_offset(400.0, 0.0))
            .with_amount(2);
        assert!(request.validate().is_ok());
        assert_eq!(request.spawn_count(), 2);
    }
}
