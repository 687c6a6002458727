// angleview/src/platform/mod.rs
//
//! Platform-specific backends.

pub mod egl;

#[cfg(apple)]
pub mod apple;

#[cfg(macos)]
pub mod macos;

#[cfg(ios)]
pub mod ios;
