use std::fmt;

use crate::geometry::GeometryError;
use crate::gfx::GraphicsError;

/// Failure of a render session call.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// `update` / `draw` before `initialize`.
    NotInitialized,
    /// `initialize` on a session that already owns GPU objects.
    AlreadyInitialized,
    /// Any call other than `teardown` after `teardown`.
    TornDown,
    InvalidGeometry(GeometryError),
    Graphics(GraphicsError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "render session not initialized"),
            Self::AlreadyInitialized => write!(f, "render session already initialized"),
            Self::TornDown => write!(f, "render session already torn down"),
            Self::InvalidGeometry(e) => write!(f, "invalid geometry: {e}"),
            Self::Graphics(e) => write!(f, "graphics backend failed: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidGeometry(e) => Some(e),
            Self::Graphics(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GraphicsError> for SessionError {
    fn from(e: GraphicsError) -> Self {
        Self::Graphics(e)
    }
}

impl From<GeometryError> for SessionError {
    fn from(e: GeometryError) -> Self {
        Self::InvalidGeometry(e)
    }
}
