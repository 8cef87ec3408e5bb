use scene::sdk::SdkError;
use thiserror::Error;

/// Engine-level failures. Per-entity coordinate problems never reach this
/// type; they only exclude the entity from the marker set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("map API key is not configured (set KAKAO_MAP_APP_KEY or `api_key`)")]
    MissingCredential,

    #[error("map SDK failed to load: {0}")]
    SdkLoadFailure(String),

    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error("invalid engine configuration: {0}")]
    Config(String),
}
