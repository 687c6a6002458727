// angleview/src/platform/egl/surface.rs
//
//! Window surfaces bound to a native view's compositor layer.

use super::context::Context;
use super::device::Device;
use super::error::ToWindowingApiError;
use crate::context::ContextID;
use crate::egl;
use crate::egl::types::{EGLNativeWindowType, EGLSurface, EGLint};
use crate::Error;

use euclid::default::Size2D;
use std::fmt::{self, Debug, Formatter};
use std::os::raw::c_void;
use std::ptr::{self, NonNull};
use std::thread;

/// The layer a window surface presents into.
///
/// With ANGLE on Apple platforms this is a `CAMetalLayer`. The layer must outlive every surface
/// created from it.
#[derive(Clone, Copy, Debug)]
pub struct NativeWidget {
    pub(crate) layer: NonNull<c_void>,
    pub(crate) size: Size2D<i32>,
}

impl NativeWidget {
    /// Wraps a compositor layer whose drawable is `size` device pixels.
    ///
    /// A zero-size layer makes window surface creation fail, so it is rejected here.
    ///
    /// # Safety
    ///
    /// `layer` must point to a live layer object that the EGL implementation accepts as an
    /// `EGLNativeWindowType`.
    pub unsafe fn new(layer: *mut c_void, size: Size2D<i32>) -> Result<NativeWidget, Error> {
        let layer = match NonNull::new(layer) {
            None => return Err(Error::InvalidNativeWidget),
            Some(layer) => layer,
        };
        if size.width <= 0 || size.height <= 0 {
            return Err(Error::InvalidNativeWidget);
        }
        Ok(NativeWidget { layer, size })
    }

    /// The size of the layer in device pixels at the time the widget was created.
    #[inline]
    pub fn size(&self) -> Size2D<i32> {
        self.size
    }
}

/// An EGL window surface.
///
/// Surfaces must be destroyed with `Device::destroy_surface()`, or a panic will occur.
pub struct Surface {
    pub(crate) egl_surface: EGLSurface,
    pub(crate) context_id: ContextID,
    pub(crate) size: Size2D<i32>,
    pub(crate) destroyed: bool,
}

impl Debug for Surface {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "Surface({:?}, {:?})", self.egl_surface, self.context_id)
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        if !self.destroyed && !thread::panicking() {
            panic!("Should have destroyed the surface first with `destroy_surface()`!")
        }
    }
}

impl Device {
    /// Creates a window surface that presents into `native_widget`'s layer.
    pub fn create_surface(
        &self,
        context: &Context,
        native_widget: &NativeWidget,
    ) -> Result<Surface, Error> {
        unsafe {
            let egl_config = self.egl_config_from_id(context.egl_config_id)?;
            let egl_surface = self.egl.CreateWindowSurface(
                self.egl_display,
                egl_config,
                native_widget.layer.as_ptr() as EGLNativeWindowType,
                ptr::null(),
            );
            if egl_surface == egl::NO_SURFACE {
                let err = self.egl.GetError().to_windowing_api_error();
                return Err(Error::SurfaceCreationFailed(err));
            }

            let surface = Surface {
                egl_surface,
                context_id: context.id,
                size: native_widget.size,
                destroyed: false,
            };
            debug!("Created {:?} for {:?}", surface, native_widget.size);
            Ok(surface)
        }
    }

    /// Returns the current size of the surface in device pixels.
    ///
    /// Falls back to the size of the layer at creation time if EGL can't be queried.
    pub fn surface_size(&self, surface: &Surface) -> Size2D<i32> {
        unsafe {
            let (mut width, mut height): (EGLint, EGLint) = (0, 0);
            let width_ok = self.egl.QuerySurface(
                self.egl_display,
                surface.egl_surface,
                egl::WIDTH as EGLint,
                &mut width,
            );
            let height_ok = self.egl.QuerySurface(
                self.egl_display,
                surface.egl_surface,
                egl::HEIGHT as EGLint,
                &mut height,
            );
            if width_ok == egl::FALSE || height_ok == egl::FALSE {
                return surface.size;
            }
            Size2D::new(width, height)
        }
    }

    /// Displays the contents of the back buffer.
    pub fn present_surface(&self, context: &Context, surface: &mut Surface) -> Result<(), Error> {
        if surface.context_id != context.id {
            return Err(Error::IncompatibleSurface);
        }

        unsafe {
            let result = self.egl.SwapBuffers(self.egl_display, surface.egl_surface);
            if result == egl::FALSE {
                let err = self.egl.GetError().to_windowing_api_error();
                return Err(Error::PresentFailed(err));
            }
            Ok(())
        }
    }

    /// Destroys `surface`. It must not be current.
    pub fn destroy_surface(&self, surface: &mut Surface) -> Result<(), Error> {
        if surface.destroyed {
            return Ok(());
        }

        unsafe {
            let result = self.egl.DestroySurface(self.egl_display, surface.egl_surface);
            surface.egl_surface = egl::NO_SURFACE;
            surface.destroyed = true;
            if result == egl::FALSE {
                let err = self.egl.GetError().to_windowing_api_error();
                return Err(Error::SurfaceDestructionFailed(err));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NativeWidget;
    use crate::Error;
    use euclid::default::Size2D;
    use std::os::raw::c_void;
    use std::ptr;

    #[test]
    fn test_null_layer_is_rejected() {
        let result = unsafe { NativeWidget::new(ptr::null_mut(), Size2D::new(100, 100)) };
        assert!(matches!(result, Err(Error::InvalidNativeWidget)));
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let mut layer = 0u8;
        let layer = &mut layer as *mut u8 as *mut c_void;
        for size in [Size2D::new(0, 100), Size2D::new(100, 0), Size2D::new(0, 0)] {
            let result = unsafe { NativeWidget::new(layer, size) };
            assert!(matches!(result, Err(Error::InvalidNativeWidget)));
        }
    }

    #[test]
    fn test_valid_widget_keeps_size() {
        let mut layer = 0u8;
        let layer = &mut layer as *mut u8 as *mut c_void;
        let widget = unsafe { NativeWidget::new(layer, Size2D::new(100, 100)).unwrap() };
        assert_eq!(widget.size(), Size2D::new(100, 100));
    }
}
