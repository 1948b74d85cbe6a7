//! HTML encoding for text content and quoted attribute values.
//!
//! Contract:
//! - Encoded characters: `&` → `&amp;`, `<` → `&lt;`, `>` → `&gt;`,
//!   `"` → `&quot;`, `'` → `&#39;`.
//! - Everything else, including non-ASCII, passes through as UTF-8.
//! - Text and attribute values use the same table; attribute values are always
//!   delimited with `"`, which the table neutralizes.
//! - Input without any of the five characters is returned borrowed, so
//!   encoding already-safe input is a no-op.

use memchr::{memchr2, memchr3};
use std::borrow::Cow;
use std::fmt::{self, Write};

pub fn encode_text(s: &str) -> Cow<'_, str> {
    encode(s)
}

pub fn encode_attribute_value(s: &str) -> Cow<'_, str> {
    encode(s)
}

pub fn write_encoded_text<W: Write + ?Sized>(out: &mut W, s: &str) -> fmt::Result {
    write_encoded(out, s)
}

pub fn write_encoded_attribute_value<W: Write + ?Sized>(out: &mut W, s: &str) -> fmt::Result {
    write_encoded(out, s)
}

/// Case-insensitive membership in the HTML void element set.
pub fn is_void_element(name: &str) -> bool {
    const MAX_VOID_LEN: usize = 6;
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_VOID_LEN {
        return false;
    }
    let mut folded = [0u8; MAX_VOID_LEN];
    for (dst, src) in folded.iter_mut().zip(bytes) {
        *dst = src.to_ascii_lowercase();
    }
    matches!(
        &folded[..bytes.len()],
        b"area"
            | b"base"
            | b"br"
            | b"col"
            | b"embed"
            | b"hr"
            | b"img"
            | b"input"
            | b"link"
            | b"meta"
            | b"param"
            | b"source"
            | b"track"
            | b"wbr"
    )
}

fn encode(s: &str) -> Cow<'_, str> {
    if next_special(s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + s.len() / 4 + 8);
    out.extend(Pieces::new(s));
    Cow::Owned(out)
}

fn write_encoded<W: Write + ?Sized>(out: &mut W, s: &str) -> fmt::Result {
    Pieces::new(s).try_for_each(|piece| out.write_str(piece))
}

/// Splits input into alternating runs of verbatim text and entities.
struct Pieces<'a> {
    rest: &'a str,
    pending_entity: Option<&'static str>,
}

impl<'a> Pieces<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            rest: s,
            pending_entity: None,
        }
    }
}

impl<'a> Iterator for Pieces<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if let Some(entity) = self.pending_entity.take() {
            return Some(entity);
        }
        if self.rest.is_empty() {
            return None;
        }
        let Some(at) = next_special(self.rest.as_bytes()) else {
            return Some(std::mem::take(&mut self.rest));
        };
        // All specials are ASCII, so `at` and `at + 1` are char boundaries.
        let verbatim = &self.rest[..at];
        self.pending_entity = Some(entity_for(self.rest.as_bytes()[at]));
        self.rest = &self.rest[at + 1..];
        if verbatim.is_empty() {
            self.pending_entity.take()
        } else {
            Some(verbatim)
        }
    }
}

fn next_special(bytes: &[u8]) -> Option<usize> {
    let markup = memchr3(b'&', b'<', b'>', bytes);
    let quote = match markup {
        Some(limit) => memchr2(b'"', b'\'', &bytes[..limit]),
        None => memchr2(b'"', b'\'', bytes),
    };
    quote.or(markup)
}

fn entity_for(byte: u8) -> &'static str {
    match byte {
        b'&' => "&amp;",
        b'<' => "&lt;",
        b'>' => "&gt;",
        b'"' => "&quot;",
        b'\'' => "&#39;",
        _ => unreachable!("only special bytes are encoded"),
    }
}
