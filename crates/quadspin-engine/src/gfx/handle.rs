use std::fmt;
use std::num::NonZeroU32;

/// Name of a rendering context.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ContextId(NonZeroU32);

/// Name of a GPU object (buffer or vertex array) inside a context.
///
/// Zero is reserved by GL to mean "no object", so it is unrepresentable here.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(NonZeroU32);

macro_rules! impl_name {
    ($ty:ident) => {
        impl $ty {
            #[inline]
            pub const fn new(raw: NonZeroU32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn get(self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_name!(ContextId);
impl_name!(ResourceId);

/// Ownership slot for one GPU object.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum GpuHandle {
    #[default]
    Unallocated,
    Allocated(ResourceId),
}

impl GpuHandle {
    #[inline]
    pub fn id(self) -> Option<ResourceId> {
        match self {
            GpuHandle::Unallocated => None,
            GpuHandle::Allocated(id) => Some(id),
        }
    }

    #[inline]
    pub fn is_allocated(self) -> bool {
        matches!(self, GpuHandle::Allocated(_))
    }

    /// Returns the held id and leaves the slot unallocated.
    #[inline]
    pub fn take(&mut self) -> Option<ResourceId> {
        std::mem::take(self).id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(raw: u32) -> ResourceId {
        ResourceId::new(NonZeroU32::new(raw).unwrap())
    }

    #[test]
    fn default_handle_is_unallocated() {
        assert_eq!(GpuHandle::default(), GpuHandle::Unallocated);
        assert!(GpuHandle::default().id().is_none());
    }

    #[test]
    fn take_empties_the_slot() {
        let mut h = GpuHandle::Allocated(rid(7));
        assert_eq!(h.take(), Some(rid(7)));
        assert_eq!(h, GpuHandle::Unallocated);
        assert_eq!(h.take(), None);
    }
}
