// angleview/src/platform/egl/error.rs
//
//! Translation of errors from the EGL API to `angleview` errors.

use crate::egl;
use crate::egl::types::{EGLenum, EGLint};
use crate::WindowingApiError;

pub(crate) trait ToWindowingApiError {
    fn to_windowing_api_error(self) -> WindowingApiError;
}

impl ToWindowingApiError for EGLint {
    fn to_windowing_api_error(self) -> WindowingApiError {
        match self as EGLenum {
            egl::NOT_INITIALIZED => WindowingApiError::NotInitialized,
            egl::BAD_ACCESS => WindowingApiError::BadAccess,
            egl::BAD_ALLOC => WindowingApiError::BadAlloc,
            egl::BAD_ATTRIBUTE => WindowingApiError::BadAttribute,
            egl::BAD_CONFIG => WindowingApiError::BadConfig,
            egl::BAD_CONTEXT => WindowingApiError::BadContext,
            egl::BAD_CURRENT_SURFACE => WindowingApiError::BadCurrentSurface,
            egl::BAD_DISPLAY => WindowingApiError::BadDisplay,
            egl::BAD_SURFACE => WindowingApiError::BadSurface,
            egl::BAD_MATCH => WindowingApiError::BadMatch,
            egl::BAD_PARAMETER => WindowingApiError::BadParameter,
            egl::BAD_NATIVE_PIXMAP => WindowingApiError::BadNativePixmap,
            egl::BAD_NATIVE_WINDOW => WindowingApiError::BadNativeWindow,
            egl::CONTEXT_LOST => WindowingApiError::ContextLost,
            _ => WindowingApiError::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ToWindowingApiError;
    use crate::egl;
    use crate::egl::types::EGLint;
    use crate::WindowingApiError;

    #[test]
    fn test_known_codes() {
        assert_eq!(
            (egl::BAD_NATIVE_WINDOW as EGLint).to_windowing_api_error(),
            WindowingApiError::BadNativeWindow
        );
        assert_eq!(
            (egl::BAD_CONFIG as EGLint).to_windowing_api_error(),
            WindowingApiError::BadConfig
        );
        assert_eq!(
            (egl::NOT_INITIALIZED as EGLint).to_windowing_api_error(),
            WindowingApiError::NotInitialized
        );
    }

    #[test]
    fn test_success_and_unknown_codes_are_failures() {
        // `EGL_SUCCESS` is never passed here on a real failure path, but a driver that fails
        // without setting an error must still produce an error value.
        assert_eq!(
            (egl::SUCCESS as EGLint).to_windowing_api_error(),
            WindowingApiError::Failed
        );
        assert_eq!((0x7fff as EGLint).to_windowing_api_error(), WindowingApiError::Failed);
    }
}
