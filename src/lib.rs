//! Static HTML rendering of component render trees.
//!
//! - [`tree`]: the frame model and the builders and stores that produce it.
//! - [`html`]: the serializer that turns settled trees into HTML text.
//! - [`host`]: a component host that runs render passes and serializes them.

pub use component_host as host;
pub use frame_html as html;
pub use render_tree as tree;

pub use component_host::{CancelToken, Component, ComponentHost, RenderContext, RenderError};
pub use frame_html::{SerializeError, serialize};
pub use render_tree::{ComponentId, FrameBuilder, FrameStore, RenderFrame, RenderTree, TreeSource};
