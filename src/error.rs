//! Error types for the component engine.
//!
//! - [`ComponentError`] — Errors raised while building or rendering a
//!   component tree.
//! - [`ComponentResult`] — Convenience alias used throughout the crate.

use thiserror::Error;

/// Component-level errors
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("The {component} component requires {missing} local(s) or component(s)")]
    MissingRequirements { component: String, missing: String },
    #[error("Cannot render the root {component} component without a key")]
    RenderWithoutKey { component: String },
    #[error("Capture error: {0}")]
    Capture(String),
    #[error("Render error: {0}")]
    Render(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ComponentError {
    fn from(e: serde_json::Error) -> Self {
        ComponentError::Serialization(e.to_string())
    }
}

/// Convenience alias for component-level results.
pub type ComponentResult<T> = Result<T, ComponentError>;
