use render_tree::{ComponentId, FrameKind};
use std::fmt;
use thiserror::Error;

pub type SerializeResult<T> = Result<T, SerializeError>;

/// Serialization failure. Every variant is fatal: the sink may hold a
/// partial document, which callers must discard.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SerializeError {
    #[error("malformed render tree for component {component}: {reason} at {frame} frame {position}")]
    MalformedTree {
        component: ComponentId,
        position: usize,
        frame: FrameKind,
        reason: Malformed,
    },

    #[error("no render tree for component {0}")]
    UnresolvedComponent(ComponentId),

    #[error("frame nesting exceeded {max_depth} levels in component {component}")]
    DepthLimitExceeded {
        component: ComponentId,
        max_depth: usize,
    },

    #[error("output sink rejected a write")]
    Sink(#[from] fmt::Error),
}

/// What made a tree malformed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Malformed {
    /// A step did not advance the cursor (zero-length subtree).
    NoProgress,
    /// An attribute frame outside the run following its element.
    StrayAttribute,
    /// A subtree length reaching past the enclosing range.
    SubtreeOverrun { claimed: usize, available: usize },
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformed::NoProgress => f.write_str("no input consumed"),
            Malformed::StrayAttribute => f.write_str("attribute outside an attribute run"),
            Malformed::SubtreeOverrun { claimed, available } => write!(
                f,
                "subtree length {claimed} overruns the {available} available frame(s)"
            ),
        }
    }
}
