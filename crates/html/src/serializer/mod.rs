//! Render-frame to HTML serialization.
//!
//! Walks one component's frame sequence with an index cursor, recursing into
//! nested component trees as Component frames are reached.
//!
//! Contract:
//! - Output is deterministic: the same settled trees always yield the same bytes.
//! - Subtrees are skipped by their recorded length, never by re-scanning.
//! - Every step advances the cursor; a step that does not is reported as
//!   `Malformed::NoProgress`, never retried.
//! - A subtree length is checked against its enclosing range before anything
//!   inside it is read, so malformed input cannot index out of bounds.
//! - Recursion is bounded by `max_nesting_depth`, counted over components,
//!   regions and elements with children alike.
//! - `<option>` elements whose `value` equals the `value` of the enclosing
//!   `<select>` get a synthesized `selected` token. Tracking is single-slot:
//!   leaving any `<select>` clears it, so nested selects lose the outer value.
//! - Event handler attributes render as their numeric handler id, `true`
//!   renders a bare name, `false` and opaque values are dropped.
//!
//! Complexity: O(n) in the total number of frames reachable from the root.

use crate::error::{Malformed, SerializeError, SerializeResult};
use crate::escape::{is_void_element, write_encoded_attribute_value, write_encoded_text};
use render_tree::{AttributeValue, ComponentId, RenderFrame, TreeSource};
use std::fmt::Write;

const LOG_TARGET: &str = "frame_html.serialize";

#[derive(Clone, Debug)]
pub struct SerializerConfig {
    /// Maximum nesting of Component, Region and non-empty Element frames
    /// across the whole walk, root component included. Deeper input, including
    /// a component cycle in the tree source, fails with
    /// `DepthLimitExceeded`.
    pub max_nesting_depth: usize,
    /// Bytes reserved up front by [`HtmlSerializer::serialize`].
    pub initial_capacity: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 512,
            initial_capacity: 1024,
        }
    }
}

/// Serializes settled render trees from a [`TreeSource`] to HTML.
///
/// Holds no walk state, so one serializer can run any number of
/// (possibly concurrent) serializations against the same source.
pub struct HtmlSerializer<'s, S: TreeSource + ?Sized> {
    source: &'s S,
    config: SerializerConfig,
}

impl<'s, S: TreeSource + ?Sized> HtmlSerializer<'s, S> {
    pub fn new(source: &'s S) -> Self {
        Self::with_config(source, SerializerConfig::default())
    }

    pub fn with_config(source: &'s S, config: SerializerConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    pub fn serialize(&self, root: ComponentId) -> SerializeResult<String> {
        let mut out = String::with_capacity(self.config.initial_capacity);
        self.serialize_into(root, &mut out)?;
        log::debug!(
            target: LOG_TARGET,
            "serialized component {root}: {} bytes",
            out.len()
        );
        Ok(out)
    }

    /// Writes the HTML for `root` into `out`. On error `out` may hold a
    /// partial document.
    pub fn serialize_into<W: Write + ?Sized>(
        &self,
        root: ComponentId,
        out: &mut W,
    ) -> SerializeResult<()> {
        let mut walk = Walk {
            source: self.source,
            out,
            max_depth: self.config.max_nesting_depth,
            depth: 0,
            closest_select_value: None,
        };
        walk.render_component(root)
    }
}

/// Serializes `root` with the default configuration.
pub fn serialize<S: TreeSource + ?Sized>(root: ComponentId, source: &S) -> SerializeResult<String> {
    HtmlSerializer::new(source).serialize(root)
}

/// One component's frames, carried for diagnostics.
#[derive(Clone, Copy)]
struct Sequence<'a> {
    component: ComponentId,
    frames: &'a [RenderFrame],
}

impl Sequence<'_> {
    fn malformed(self, position: usize, reason: Malformed) -> SerializeError {
        SerializeError::MalformedTree {
            component: self.component,
            position,
            frame: self.frames[position].kind(),
            reason,
        }
    }

    fn check_subtree(self, position: usize, length: usize, end: usize) -> SerializeResult<()> {
        let available = end - position;
        if length > available {
            return Err(self.malformed(
                position,
                Malformed::SubtreeOverrun {
                    claimed: length,
                    available,
                },
            ));
        }
        Ok(())
    }
}

/// State of a single top-level serialization.
struct Walk<'a, 'w, S: ?Sized, W: ?Sized> {
    source: &'a S,
    out: &'w mut W,
    max_depth: usize,
    depth: usize,
    /// `value` of the innermost open `<select>`, if any.
    closest_select_value: Option<&'a str>,
}

impl<'a, S: TreeSource + ?Sized, W: Write + ?Sized> Walk<'a, '_, S, W> {
    fn render_component(&mut self, id: ComponentId) -> SerializeResult<()> {
        self.descend(id)?;
        let result = self.render_tree(id);
        self.depth -= 1;
        result
    }

    fn render_tree(&mut self, id: ComponentId) -> SerializeResult<()> {
        let source: &'a S = self.source;
        let tree = source
            .frames(id)
            .ok_or(SerializeError::UnresolvedComponent(id))?;
        log::trace!(
            target: LOG_TARGET,
            "enter component {id} at depth {} ({} frames)",
            self.depth,
            tree.len()
        );
        let seq = Sequence {
            component: id,
            frames: tree.frames(),
        };
        self.render_frames(seq, 0, seq.frames.len()).map(|_| ())
    }

    fn descend(&mut self, component: ComponentId) -> SerializeResult<()> {
        if self.depth >= self.max_depth {
            return Err(SerializeError::DepthLimitExceeded {
                component,
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Renders the children in `start..end` one nesting level down.
    fn render_nested(&mut self, seq: Sequence<'a>, start: usize, end: usize) -> SerializeResult<usize> {
        self.descend(seq.component)?;
        let result = self.render_frames(seq, start, end);
        self.depth -= 1;
        result
    }

    /// Renders frames in `start..end`; returns the position after the last one.
    fn render_frames(&mut self, seq: Sequence<'a>, start: usize, end: usize) -> SerializeResult<usize> {
        let mut position = start;
        while position < end {
            let next = self.render_frame(seq, position, end)?;
            if next <= position {
                return Err(seq.malformed(position, Malformed::NoProgress));
            }
            position = next;
        }
        Ok(position)
    }

    fn render_frame(&mut self, seq: Sequence<'a>, position: usize, end: usize) -> SerializeResult<usize> {
        let frames = seq.frames;
        match &frames[position] {
            RenderFrame::Element {
                name,
                subtree_length,
            } => self.render_element(seq, position, end, name, *subtree_length),
            RenderFrame::Attribute { .. } => Err(seq.malformed(position, Malformed::StrayAttribute)),
            RenderFrame::Text(text) => {
                write_encoded_text(&mut *self.out, text)?;
                Ok(position + 1)
            }
            RenderFrame::Markup(markup) => {
                self.out.write_str(markup)?;
                Ok(position + 1)
            }
            RenderFrame::Component { id, subtree_length } => {
                seq.check_subtree(position, *subtree_length, end)?;
                if *subtree_length == 0 {
                    return Ok(position);
                }
                self.render_component(*id)?;
                // The child tree's own length plays no part in parent advancement.
                Ok(position + subtree_length)
            }
            RenderFrame::Region { subtree_length } => {
                seq.check_subtree(position, *subtree_length, end)?;
                if *subtree_length == 0 {
                    return Ok(position);
                }
                let region_end = position + subtree_length;
                self.render_nested(seq, position + 1, region_end)?;
                Ok(region_end)
            }
            RenderFrame::ReferenceCapture => Ok(position + 1),
        }
    }

    fn render_element(
        &mut self,
        seq: Sequence<'a>,
        position: usize,
        end: usize,
        name: &str,
        subtree_length: usize,
    ) -> SerializeResult<usize> {
        seq.check_subtree(position, subtree_length, end)?;
        if subtree_length == 0 {
            return Ok(position);
        }
        let subtree_end = position + subtree_length;

        self.out.write_char('<')?;
        self.out.write_str(name)?;
        let (after_attributes, captured_value) =
            self.render_attributes(seq, position + 1, subtree_end)?;

        // Static stand-in for a bound <select>: mark the option whose value
        // matches the select's value.
        if self.closest_select_value.is_some()
            && name.eq_ignore_ascii_case("option")
            && captured_value == self.closest_select_value
        {
            self.out.write_str(" selected")?;
        }

        if after_attributes == subtree_end {
            if is_void_element(name) {
                self.out.write_str(" />")?;
            } else {
                self.out.write_str("></")?;
                self.out.write_str(name)?;
                self.out.write_char('>')?;
            }
            return Ok(subtree_end);
        }

        self.out.write_char('>')?;
        let is_select = name.eq_ignore_ascii_case("select");
        if is_select {
            self.closest_select_value = captured_value;
        }
        self.render_nested(seq, after_attributes, subtree_end)?;
        if is_select {
            // Single-slot tracking: an outer select's value is not restored.
            self.closest_select_value = None;
        }
        self.out.write_str("</")?;
        self.out.write_str(name)?;
        self.out.write_char('>')?;
        Ok(subtree_end)
    }

    /// Renders the attribute run starting at `start`. Returns the first
    /// position past the run and the last text `value` attribute seen.
    fn render_attributes(
        &mut self,
        seq: Sequence<'a>,
        start: usize,
        end: usize,
    ) -> SerializeResult<(usize, Option<&'a str>)> {
        let frames = seq.frames;
        let mut captured = None;
        let mut position = start;
        while position < end {
            let RenderFrame::Attribute { name, value } = &frames[position] else {
                break;
            };
            if name.eq_ignore_ascii_case("value") {
                captured = value.as_text();
            }
            match value {
                AttributeValue::EventHandler(handler) => {
                    write!(self.out, " {name}=\"{}\"", handler.0)?;
                }
                AttributeValue::Bool(true) => {
                    self.out.write_char(' ')?;
                    self.out.write_str(name)?;
                }
                AttributeValue::Text(text) => {
                    self.out.write_char(' ')?;
                    self.out.write_str(name)?;
                    self.out.write_str("=\"")?;
                    write_encoded_attribute_value(&mut *self.out, text)?;
                    self.out.write_char('"')?;
                }
                AttributeValue::Bool(false) | AttributeValue::Opaque => {}
            }
            position += 1;
        }
        Ok((position, captured))
    }
}
