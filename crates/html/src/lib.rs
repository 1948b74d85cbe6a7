//! Static HTML output for flattened render trees.
//!
//! [`HtmlSerializer`] walks the settled [`RenderTree`](render_tree::RenderTree)s
//! provided by a [`TreeSource`](render_tree::TreeSource) and writes the
//! equivalent markup to any [`std::fmt::Write`] sink.

pub mod escape;

mod error;
mod serializer;

pub use crate::error::{Malformed, SerializeError, SerializeResult};
pub use crate::escape::{encode_attribute_value, encode_text, is_void_element};
pub use crate::serializer::{HtmlSerializer, SerializerConfig, serialize};
