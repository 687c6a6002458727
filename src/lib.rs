// angleview/src/lib.rs
//
//! Draws a triangle through ANGLE's EGL and OpenGL ES implementation inside a native view.
//!
//! On macOS the view is an `NSView` and on iOS a `UIView`. Either is backed by a `CAMetalLayer`
//! that ANGLE presents into, and a display link redraws it once per refresh. The EGL layer in
//! `platform::egl` is usable on its own wherever an ANGLE build can be loaded.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

pub mod platform;
pub use crate::platform::egl::context::{Context, ContextDescriptor};
pub use crate::platform::egl::device::{AngleBackend, Device};
pub use crate::platform::egl::surface::{NativeWidget, Surface};

pub mod error;
pub use crate::error::{Error, WindowingApiError};

mod context;
pub use crate::context::{ContextAttributeFlags, ContextAttributes, ContextID};

mod info;
pub use crate::info::GLVersion;

pub mod library;
pub use crate::library::{DynamicLibrary, LibraryKind};

pub mod frame;
pub use crate::frame::{DisplayLinkKind, DisplayLinkPreference, FrameClock};

pub mod options;
pub use crate::options::AppOptions;

pub mod renderer;
pub use crate::renderer::{RenderOptions, Renderer};

pub mod scene;
pub use crate::scene::{Scene, VertexUpload};

mod gl_utils;

#[allow(non_camel_case_types)]
mod egl {
    use std::os::raw::{c_long, c_void};
    pub type khronos_utime_nanoseconds_t = khronos_uint64_t;
    pub type khronos_uint64_t = u64;
    pub type khronos_ssize_t = c_long;
    pub type EGLint = i32;
    pub type EGLNativeDisplayType = *const c_void;
    pub type EGLNativePixmapType = *const c_void;
    pub type EGLNativeWindowType = *const c_void;
    pub type NativeDisplayType = EGLNativeDisplayType;
    pub type NativePixmapType = EGLNativePixmapType;
    pub type NativeWindowType = EGLNativeWindowType;
    include!(concat!(env!("OUT_DIR"), "/egl_bindings.rs"));
}

#[cfg(test)]
mod tests;
