//! Component host: runs render passes and serializes their settled output.
//!
//! A [`ComponentHost`] owns the frame storage for one component hierarchy.
//! Render passes against the same host are admitted one at a time; a pass
//! writes fresh trees for every component it mounts, and serialization only
//! starts once the pass has finished without error or cancellation.
//! Separate hosts share nothing and can render concurrently.

mod cancel;
mod component;
mod error;
mod host;

pub use crate::cancel::CancelToken;
pub use crate::component::{Component, Layout, LayoutTemplate, RenderContext};
pub use crate::error::{LifecycleError, RenderError};
pub use crate::host::{ComponentHost, HostConfig, ROOT_COMPONENT};
