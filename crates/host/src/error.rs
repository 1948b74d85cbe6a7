use frame_html::SerializeError;
use render_tree::{BuildError, ComponentId};
use std::error::Error as StdError;
use thiserror::Error;

/// Failure inside a render pass. Surfaced by the host before any
/// serialization is attempted.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("component {component} failed to render: {source}")]
    Failed {
        component: ComponentId,
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("component {component} produced an invalid tree: {source}")]
    InvalidTree {
        component: ComponentId,
        source: BuildError,
    },

    #[error("component {component} panicked: {message}")]
    Panicked {
        component: ComponentId,
        message: String,
    },

    #[error("render pass cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render pass failed: {0}")]
    Lifecycle(LifecycleError),

    #[error("render cancelled")]
    Cancelled,

    #[error("another render is in flight on this host")]
    Busy,

    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

impl From<LifecycleError> for RenderError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Cancelled => RenderError::Cancelled,
            other => RenderError::Lifecycle(other),
        }
    }
}
