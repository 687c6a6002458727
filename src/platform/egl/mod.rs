// angleview/src/platform/egl/mod.rs
//
//! ANGLE's EGL implementation: displays, configs, contexts and window surfaces.

pub mod context;
pub mod device;
pub(crate) mod error;
pub(crate) mod ffi;
pub mod surface;
