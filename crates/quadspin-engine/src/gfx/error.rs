use std::fmt;

use super::{ContextId, ResourceId};

/// Failure reported by a graphics backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// The call needs a current context and none is.
    NoCurrentContext,
    UnknownContext(ContextId),
    /// The name is not alive in the current context.
    UnknownResource(ResourceId),
    /// Nothing is bound where the call needs an object.
    NothingBound(&'static str),
    /// The backend could not allocate another object.
    OutOfMemory,
    /// Draw parameters do not fit the bound buffers.
    InvalidDraw(String),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCurrentContext => write!(f, "no current graphics context"),
            Self::UnknownContext(ctx) => write!(f, "unknown graphics context {ctx}"),
            Self::UnknownResource(id) => write!(f, "unknown gpu object {id}"),
            Self::NothingBound(what) => write!(f, "no {what} bound"),
            Self::OutOfMemory => write!(f, "out of gpu memory"),
            Self::InvalidDraw(msg) => write!(f, "invalid draw: {msg}"),
        }
    }
}

impl std::error::Error for GraphicsError {}
