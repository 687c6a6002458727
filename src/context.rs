// angleview/src/context.rs
//
//! Declarations common to all contexts.

use crate::info::GLVersion;

use std::sync::Mutex;

/// A process-unique identifier for a context.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContextID(pub u64);

pub(crate) static CREATE_CONTEXT_MUTEX: Mutex<ContextID> = Mutex::new(ContextID(0));

impl ContextID {
    pub(crate) fn next() -> ContextID {
        let mut next_context_id = match CREATE_CONTEXT_MUTEX.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = *next_context_id;
        next_context_id.0 += 1;
        id
    }
}

bitflags! {
    /// Optional buffers that the framebuffer config must provide.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ContextAttributeFlags: u8 {
        const ALPHA   = 0x01;
        const DEPTH   = 0x02;
        const STENCIL = 0x04;
    }
}

/// Attributes that are requested when a context is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContextAttributes {
    pub version: GLVersion,
    pub flags: ContextAttributeFlags,
}

impl Default for ContextAttributes {
    /// An OpenGL ES 2.0 context with 8-bit color channels and a 24-bit depth buffer.
    fn default() -> ContextAttributes {
        ContextAttributes {
            version: GLVersion::new(2, 0),
            flags: ContextAttributeFlags::DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContextAttributeFlags, ContextAttributes, ContextID};
    use crate::GLVersion;

    #[test]
    fn test_default_attributes() {
        let attributes = ContextAttributes::default();
        assert_eq!(attributes.version, GLVersion::new(2, 0));
        assert!(attributes.flags.contains(ContextAttributeFlags::DEPTH));
        assert!(!attributes.flags.contains(ContextAttributeFlags::ALPHA));
        assert!(!attributes.flags.contains(ContextAttributeFlags::STENCIL));
    }

    #[test]
    fn test_context_ids_are_unique() {
        let first = ContextID::next();
        let second = ContextID::next();
        assert_ne!(first, second);
        assert!(second.0 > first.0);
    }
}
