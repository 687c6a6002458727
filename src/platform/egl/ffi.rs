// angleview/src/platform/egl/ffi.rs
//
//! ANGLE extension constants that the core EGL registry doesn't carry.

#![allow(dead_code)]

use crate::egl::types::{EGLAttrib, EGLenum};

pub const EGL_PLATFORM_ANGLE_ANGLE:              EGLenum = 0x3202;
pub const EGL_PLATFORM_ANGLE_TYPE_ANGLE:         EGLenum = 0x3203;
pub const EGL_PLATFORM_ANGLE_TYPE_DEFAULT_ANGLE: EGLenum = 0x3206;
pub const EGL_PLATFORM_ANGLE_TYPE_OPENGL_ANGLE:  EGLenum = 0x320d;
pub const EGL_PLATFORM_ANGLE_TYPE_METAL_ANGLE:   EGLenum = 0x3489;

pub const EGL_NONE_ATTRIB: EGLAttrib = crate::egl::NONE as EGLAttrib;
