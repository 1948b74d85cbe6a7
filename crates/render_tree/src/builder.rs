//! Producer-side construction of [`RenderTree`]s.
//!
//! Subtree lengths are filled in when a frame is closed, so producers never
//! count frames by hand. The first misuse is recorded and reported by
//! [`FrameBuilder::build`]; later calls after an error are ignored.

use crate::{AttributeValue, ComponentId, FrameKind, RenderFrame, RenderTree};
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("attribute at position {position} does not follow an element or component open")]
    AttributeOutOfPlace { position: usize },
    #[error("close of {found} while the innermost open frame is {expected}")]
    MismatchedClose { expected: FrameKind, found: FrameKind },
    #[error("close of {kind} with no open frame")]
    UnbalancedClose { kind: FrameKind },
    #[error("{open} frame(s) still open at build")]
    UnclosedFrames { open: usize },
}

#[derive(Debug, Default)]
pub struct FrameBuilder {
    frames: Vec<RenderFrame>,
    open: Vec<usize>,
    attributes_allowed: bool,
    error: Option<BuildError>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames emitted so far.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn open_element(&mut self, name: &str) -> &mut Self {
        self.open_frame(RenderFrame::Element {
            name: Arc::from(name),
            subtree_length: 0,
        });
        self.attributes_allowed = true;
        self
    }

    pub fn close_element(&mut self) -> &mut Self {
        self.close_frame(FrameKind::Element)
    }

    pub fn add_attribute(&mut self, name: &str, value: impl Into<AttributeValue>) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if !self.attributes_allowed {
            self.error = Some(BuildError::AttributeOutOfPlace {
                position: self.frames.len(),
            });
            return self;
        }
        self.frames.push(RenderFrame::Attribute {
            name: Arc::from(name),
            value: value.into(),
        });
        self
    }

    pub fn add_text(&mut self, text: &str) -> &mut Self {
        self.push_leaf(RenderFrame::Text(text.to_string()))
    }

    pub fn add_markup(&mut self, markup: &str) -> &mut Self {
        self.push_leaf(RenderFrame::Markup(markup.to_string()))
    }

    pub fn add_reference_capture(&mut self) -> &mut Self {
        self.push_leaf(RenderFrame::ReferenceCapture)
    }

    /// Opens a reference to another component's tree. Attributes added
    /// directly after this call are the component's parameters.
    pub fn open_component(&mut self, id: ComponentId) -> &mut Self {
        self.open_frame(RenderFrame::Component {
            id,
            subtree_length: 0,
        });
        self.attributes_allowed = true;
        self
    }

    pub fn close_component(&mut self) -> &mut Self {
        self.close_frame(FrameKind::Component)
    }

    pub fn open_region(&mut self) -> &mut Self {
        self.open_frame(RenderFrame::Region { subtree_length: 0 });
        self
    }

    pub fn close_region(&mut self) -> &mut Self {
        self.close_frame(FrameKind::Region)
    }

    pub fn build(self) -> Result<RenderTree, BuildError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.open.is_empty() {
            return Err(BuildError::UnclosedFrames {
                open: self.open.len(),
            });
        }
        Ok(RenderTree::new(self.frames))
    }

    fn push_leaf(&mut self, frame: RenderFrame) -> &mut Self {
        if self.error.is_none() {
            self.frames.push(frame);
            self.attributes_allowed = false;
        }
        self
    }

    fn open_frame(&mut self, frame: RenderFrame) {
        if self.error.is_some() {
            return;
        }
        self.open.push(self.frames.len());
        self.frames.push(frame);
        self.attributes_allowed = false;
    }

    fn close_frame(&mut self, kind: FrameKind) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        self.attributes_allowed = false;
        let Some(start) = self.open.pop() else {
            self.error = Some(BuildError::UnbalancedClose { kind });
            return self;
        };
        let length = self.frames.len() - start;
        match &mut self.frames[start] {
            RenderFrame::Element { subtree_length, .. } if kind == FrameKind::Element => {
                *subtree_length = length;
            }
            RenderFrame::Component { subtree_length, .. } if kind == FrameKind::Component => {
                *subtree_length = length;
            }
            RenderFrame::Region { subtree_length } if kind == FrameKind::Region => {
                *subtree_length = length;
            }
            other => {
                self.error = Some(BuildError::MismatchedClose {
                    expected: other.kind(),
                    found: kind,
                });
            }
        }
        self
    }
}
