// angleview/src/platform/egl/device.rs
//
//! Acquiring and initializing an ANGLE EGL display.

use super::error::ToWindowingApiError;
use super::ffi::{EGL_NONE_ATTRIB, EGL_PLATFORM_ANGLE_ANGLE, EGL_PLATFORM_ANGLE_TYPE_ANGLE};
use super::ffi::{EGL_PLATFORM_ANGLE_TYPE_METAL_ANGLE, EGL_PLATFORM_ANGLE_TYPE_OPENGL_ANGLE};
use crate::egl::types::{EGLAttrib, EGLDisplay, EGLint};
use crate::egl::{self, Egl};
use crate::library::DynamicLibrary;
use crate::Error;

use std::ffi::{CStr, CString};
use std::fmt::{self, Debug, Formatter};
use std::os::raw::{c_char, c_void};
use std::ptr;
use std::str::FromStr;

/// The GPU API that ANGLE translates OpenGL ES calls to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum AngleBackend {
    /// Let ANGLE pick. No platform attributes are passed to `eglGetPlatformDisplay()`.
    #[default]
    Default,
    /// Metal.
    Metal,
    /// Desktop OpenGL (deprecated on Apple platforms, but still shipped by ANGLE on macOS).
    OpenGL,
}

impl AngleBackend {
    /// The attribute list passed to `eglGetPlatformDisplay()`, or `None` for a null list.
    pub(crate) fn display_attributes(self) -> Option<[EGLAttrib; 3]> {
        let platform_type = match self {
            AngleBackend::Default => return None,
            AngleBackend::Metal => EGL_PLATFORM_ANGLE_TYPE_METAL_ANGLE,
            AngleBackend::OpenGL => EGL_PLATFORM_ANGLE_TYPE_OPENGL_ANGLE,
        };
        Some([
            EGL_PLATFORM_ANGLE_TYPE_ANGLE as EGLAttrib,
            platform_type as EGLAttrib,
            EGL_NONE_ATTRIB,
        ])
    }
}

impl FromStr for AngleBackend {
    type Err = String;

    fn from_str(string: &str) -> Result<AngleBackend, String> {
        match &*string.to_ascii_lowercase() {
            "default" => Ok(AngleBackend::Default),
            "metal" => Ok(AngleBackend::Metal),
            "opengl" | "gl" => Ok(AngleBackend::OpenGL),
            _ => Err(format!("unknown ANGLE backend `{}`", string)),
        }
    }
}

/// An initialized EGL display on the ANGLE platform.
///
/// Contexts and surfaces are created, bound, presented and destroyed through the device. The
/// display is terminated when the device is dropped, so every context and surface must be
/// destroyed first.
pub struct Device {
    pub(crate) egl_display: EGLDisplay,
    pub(crate) egl: Egl,
    version: (EGLint, EGLint),
    library: DynamicLibrary,
}

impl Debug for Device {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(
            formatter,
            "Device({:?}, EGL {}.{})",
            self.egl_display, self.version.0, self.version.1
        )
    }
}

impl Device {
    /// Acquires the ANGLE platform display from `library` and initializes it.
    pub fn new(library: DynamicLibrary, backend: AngleBackend) -> Result<Device, Error> {
        let egl = Egl::load_with(|symbol| library.symbol(symbol));
        if !egl.GetPlatformDisplay.is_loaded() || !egl.Initialize.is_loaded() {
            return Err(Error::GLFunctionNotFound);
        }

        unsafe {
            let display_attributes = backend.display_attributes();
            let display_attributes_ptr = display_attributes
                .as_ref()
                .map_or(ptr::null(), |attributes| attributes.as_ptr());

            let egl_display = egl.GetPlatformDisplay(
                EGL_PLATFORM_ANGLE_ANGLE,
                ptr::null_mut(),
                display_attributes_ptr,
            );
            if egl_display == egl::NO_DISPLAY {
                let err = egl.GetError().to_windowing_api_error();
                return Err(Error::DisplayAcquisitionFailed(err));
            }

            let (mut major, mut minor) = (0, 0);
            let result = egl.Initialize(egl_display, &mut major, &mut minor);
            if result == egl::FALSE {
                let err = egl.GetError().to_windowing_api_error();
                return Err(Error::InitializationFailed(err));
            }

            let device = Device {
                egl_display,
                egl,
                version: (major, minor),
                library,
            };
            info!(
                "Initialized EGL {}.{} on {:?} backend ({}, client APIs: {})",
                major,
                minor,
                backend,
                device.query_string(egl::VENDOR as EGLint),
                device.query_string(egl::CLIENT_APIS as EGLint)
            );
            Ok(device)
        }
    }

    /// The EGL version reported by `eglInitialize()`.
    #[inline]
    pub fn egl_version(&self) -> (i32, i32) {
        self.version
    }

    /// Builds an OpenGL ES function table for the current context.
    ///
    /// Symbols that `eglGetProcAddress()` doesn't know are looked up in `gles_library`.
    ///
    /// # Safety
    ///
    /// A context created from this device must be current on the calling thread.
    pub unsafe fn load_gl(&self, gles_library: Option<&DynamicLibrary>) -> glow::Context {
        glow::Context::from_loader_function(|symbol_name| {
            let address = self.get_proc_address(symbol_name);
            match (address.is_null(), gles_library) {
                (true, Some(gles_library)) => gles_library.symbol(symbol_name),
                _ => address,
            }
        })
    }

    pub(crate) fn get_proc_address(&self, symbol_name: &str) -> *const c_void {
        unsafe {
            let symbol_name = match CString::new(symbol_name) {
                Ok(symbol_name) => symbol_name,
                Err(_) => return ptr::null(),
            };
            self.egl.GetProcAddress(symbol_name.as_ptr() as *const u8 as *const c_char)
                as *const c_void
        }
    }

    unsafe fn query_string(&self, name: EGLint) -> String {
        let string = self.egl.QueryString(self.egl_display, name);
        if string.is_null() {
            return String::new();
        }
        CStr::from_ptr(string).to_string_lossy().into_owned()
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        unsafe {
            let result = self.egl.Terminate(self.egl_display);
            if result == egl::FALSE {
                let err = self.egl.GetError().to_windowing_api_error();
                warn!("eglTerminate() failed: {}", err);
            }
            self.egl.ReleaseThread();
        }
        debug!("Terminated EGL display from {}", self.library.path().display());
    }
}

#[cfg(test)]
mod tests {
    use super::AngleBackend;
    use crate::egl;
    use crate::egl::types::EGLAttrib;
    use crate::platform::egl::ffi::EGL_PLATFORM_ANGLE_TYPE_ANGLE;
    use crate::platform::egl::ffi::EGL_PLATFORM_ANGLE_TYPE_METAL_ANGLE;

    #[test]
    fn test_default_backend_passes_no_attributes() {
        assert_eq!(AngleBackend::default(), AngleBackend::Default);
        assert!(AngleBackend::Default.display_attributes().is_none());
    }

    #[test]
    fn test_metal_backend_attributes() {
        let attributes = AngleBackend::Metal.display_attributes().unwrap();
        assert_eq!(attributes[0], EGL_PLATFORM_ANGLE_TYPE_ANGLE as EGLAttrib);
        assert_eq!(attributes[1], EGL_PLATFORM_ANGLE_TYPE_METAL_ANGLE as EGLAttrib);
        assert_eq!(attributes[2], egl::NONE as EGLAttrib);
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("metal".parse::<AngleBackend>(), Ok(AngleBackend::Metal));
        assert_eq!("OpenGL".parse::<AngleBackend>(), Ok(AngleBackend::OpenGL));
        assert_eq!("default".parse::<AngleBackend>(), Ok(AngleBackend::Default));
        assert!("vulkan".parse::<AngleBackend>().is_err());
    }
}
