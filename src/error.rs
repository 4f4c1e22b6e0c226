//! Crate error type
//!
//! Only a handful of entry points can fail: picking a level by name,
//! parsing settings/tuning JSON, and wiring up the browser at startup.
//! Everything inside the frame loop degrades instead of erroring.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("unknown level '{0}' (expected volleyball, pacman, archery or karting)")]
    UnknownLevel(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, ArcadeError>;

#[cfg(target_arch = "wasm32")]
impl From<ArcadeError> for wasm_bindgen::JsValue {
    fn from(err: ArcadeError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_level_message() {
        let err = ArcadeError::UnknownLevel("tetris".into());
        assert!(err.to_string().contains("tetris"));
    }

    #[test]
    fn test_config_from_json_error() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: ArcadeError = parse.unwrap_err().into();
        assert!(matches!(err, ArcadeError::Config(_)));
    }
}
