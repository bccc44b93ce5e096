use std::fmt;

/// Why no swapchain texture was available for a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameSkipped {
    /// The surface went stale (lost or outdated) and has been configured again.
    Reconfigured,
    /// Timed out or otherwise unavailable; try again next frame.
    Unavailable,
    /// The device is out of memory. Rendering cannot continue.
    OutOfMemory,
}

impl FrameSkipped {
    #[inline]
    pub fn is_fatal(self) -> bool {
        self == Self::OutOfMemory
    }
}

impl fmt::Display for FrameSkipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reconfigured => f.write_str("surface reconfigured"),
            Self::Unavailable => f.write_str("surface texture unavailable"),
            Self::OutOfMemory => f.write_str("out of GPU memory"),
        }
    }
}

impl std::error::Error for FrameSkipped {}
