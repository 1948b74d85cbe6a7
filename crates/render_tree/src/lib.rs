//! Flattened render-instruction trees.
//!
//! A render pass produces one [`RenderTree`] per component: a pre-order
//! sequence of [`RenderFrame`]s where every node that can own children records
//! its inclusive subtree length. Consumers walk the sequence with an index
//! cursor and skip whole subtrees in O(1).
//!
//! Invariants:
//! - Attribute frames form contiguous runs directly after the Element (or
//!   Component) frame that owns them.
//! - For Element, Component and Region frames at `position`,
//!   `position + subtree_length` is the first frame outside the subtree.
//! - Component frames reference another tree by [`ComponentId`]; their subtree
//!   length counts frames in the *parent* sequence only.
//! - A tree handed to a consumer is settled and is never mutated in place; the
//!   next render pass replaces it wholesale.

mod builder;
mod source;

pub use crate::builder::{BuildError, FrameBuilder};
pub use crate::source::{FrameStore, TreeSource};

use std::fmt;
use std::sync::Arc;

/// Identity of one component instance within a host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque reference to an event handler registered by the lifecycle engine.
///
/// Always non-zero; zero means "no handler" in the producing engine and is
/// never stored in a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventHandlerId(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    Bool(bool),
    EventHandler(EventHandlerId),
    /// A value with no textual form (delegates, object parameters).
    Opaque,
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<EventHandlerId> for AttributeValue {
    fn from(value: EventHandlerId) -> Self {
        AttributeValue::EventHandler(value)
    }
}

/// One node of a flattened pre-order render tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderFrame {
    Element {
        name: Arc<str>,
        subtree_length: usize,
    },
    Attribute {
        name: Arc<str>,
        value: AttributeValue,
    },
    Text(String),
    /// Pre-trusted HTML, emitted verbatim.
    Markup(String),
    Component {
        id: ComponentId,
        subtree_length: usize,
    },
    /// Structural grouping without an HTML representation.
    Region {
        subtree_length: usize,
    },
    ReferenceCapture,
}

impl RenderFrame {
    pub fn element(name: &str, subtree_length: usize) -> Self {
        RenderFrame::Element {
            name: Arc::from(name),
            subtree_length,
        }
    }

    pub fn attribute(name: &str, value: impl Into<AttributeValue>) -> Self {
        RenderFrame::Attribute {
            name: Arc::from(name),
            value: value.into(),
        }
    }

    pub fn text(text: &str) -> Self {
        RenderFrame::Text(text.to_string())
    }

    pub fn markup(markup: &str) -> Self {
        RenderFrame::Markup(markup.to_string())
    }

    pub fn component(id: ComponentId, subtree_length: usize) -> Self {
        RenderFrame::Component { id, subtree_length }
    }

    pub fn region(subtree_length: usize) -> Self {
        RenderFrame::Region { subtree_length }
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            RenderFrame::Element { .. } => FrameKind::Element,
            RenderFrame::Attribute { .. } => FrameKind::Attribute,
            RenderFrame::Text(_) => FrameKind::Text,
            RenderFrame::Markup(_) => FrameKind::Markup,
            RenderFrame::Component { .. } => FrameKind::Component,
            RenderFrame::Region { .. } => FrameKind::Region,
            RenderFrame::ReferenceCapture => FrameKind::ReferenceCapture,
        }
    }

    /// Inclusive subtree length for frames that own a subtree, `1` otherwise.
    pub fn subtree_length(&self) -> usize {
        match self {
            RenderFrame::Element { subtree_length, .. }
            | RenderFrame::Component { subtree_length, .. }
            | RenderFrame::Region { subtree_length } => *subtree_length,
            _ => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Element,
    Attribute,
    Text,
    Markup,
    Component,
    Region,
    ReferenceCapture,
}

impl FrameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameKind::Element => "element",
            FrameKind::Attribute => "attribute",
            FrameKind::Text => "text",
            FrameKind::Markup => "markup",
            FrameKind::Component => "component",
            FrameKind::Region => "region",
            FrameKind::ReferenceCapture => "reference-capture",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The settled output of one render pass for one component.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderTree {
    frames: Vec<RenderFrame>,
}

impl RenderTree {
    pub fn new(frames: Vec<RenderFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[RenderFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_frames(self) -> Vec<RenderFrame> {
        self.frames
    }
}

impl From<Vec<RenderFrame>> for RenderTree {
    fn from(frames: Vec<RenderFrame>) -> Self {
        Self::new(frames)
    }
}

impl FromIterator<RenderFrame> for RenderTree {
    fn from_iter<I: IntoIterator<Item = RenderFrame>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
