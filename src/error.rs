// angleview/src/error.rs
//
//! Various errors that methods can produce.

use std::fmt::{self, Display, Formatter};

/// Various errors that methods can produce.
#[derive(Debug)]
pub enum Error {
    /// None of the candidate paths for the EGL or OpenGL ES library could be loaded.
    LibraryNotFound,
    /// Looking up an EGL or OpenGL ES function address failed.
    GLFunctionNotFound,
    /// `eglGetPlatformDisplay()` returned no display.
    DisplayAcquisitionFailed(WindowingApiError),
    /// `eglInitialize()` failed on the acquired display.
    InitializationFailed(WindowingApiError),
    /// Choosing an EGL config failed.
    PixelFormatSelectionFailed(WindowingApiError),
    /// The system couldn't choose an EGL config.
    NoPixelFormatFound,
    /// The system couldn't create an OpenGL ES context.
    ContextCreationFailed(WindowingApiError),
    /// The system couldn't destroy the OpenGL ES context.
    ContextDestructionFailed(WindowingApiError),
    /// The system couldn't make the OpenGL ES context current.
    MakeCurrentFailed(WindowingApiError),
    /// The swap interval couldn't be applied to the current surface.
    SwapIntervalFailed(WindowingApiError),
    /// The system couldn't create a window surface.
    SurfaceCreationFailed(WindowingApiError),
    /// The system couldn't destroy a window surface.
    SurfaceDestructionFailed(WindowingApiError),
    /// The system couldn't present a window surface.
    PresentFailed(WindowingApiError),
    /// The surface was not created from this context.
    IncompatibleSurface,
    /// The native widget is invalid, for example a null layer or an empty frame.
    InvalidNativeWidget,
    /// The native widget type does not match this platform.
    IncompatibleNativeWidget,
    /// A shader failed to compile. Carries the shader info log.
    ShaderCompilationFailed(String),
    /// The shader program failed to link. Carries the program info log.
    ProgramLinkFailed(String),
    /// OpenGL ES refused to create an object.
    GLObjectCreationFailed(String),
    /// The display link couldn't be created or started. Carries the `CVReturn` code.
    DisplayLinkFailed(i32),
    /// The native UI toolkit was used off the main thread.
    NotOnMainThread,
}

/// Abstraction of the errors that EGL returns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WindowingApiError {
    /// Miscellaneous error.
    Failed,
    /// EGL is not initialized, or could not be initialized, for the specified EGL display
    /// connection.
    NotInitialized,
    /// EGL cannot access a requested resource (for example a context is bound in another
    /// thread).
    BadAccess,
    /// EGL failed to allocate resources for the requested operation.
    BadAlloc,
    /// An unrecognized attribute or attribute value was passed in the attribute list.
    BadAttribute,
    /// An `EGLConfig` argument does not name a valid EGL frame buffer configuration.
    BadConfig,
    /// An `EGLContext` argument does not name a valid EGL rendering context.
    BadContext,
    /// The current surface of the calling thread is a window, pixel buffer or pixmap that is no
    /// longer valid.
    BadCurrentSurface,
    /// An `EGLDisplay` argument does not name a valid EGL display connection.
    BadDisplay,
    /// Arguments are inconsistent (for example, a valid context requires buffers not supplied by
    /// a valid surface).
    BadMatch,
    /// A `NativePixmapType` argument does not refer to a valid native pixmap.
    BadNativePixmap,
    /// A `NativeWindowType` argument does not refer to a valid native window.
    BadNativeWindow,
    /// One or more argument values are invalid.
    BadParameter,
    /// An `EGLSurface` argument does not name a valid surface configured for GL rendering.
    BadSurface,
    /// A power management event has occurred. The application must destroy all contexts and
    /// reinitialise OpenGL ES state and objects to continue rendering.
    ContextLost,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Error::LibraryNotFound => write!(f, "the ANGLE library could not be loaded"),
            Error::GLFunctionNotFound => write!(f, "a required function was not found"),
            Error::DisplayAcquisitionFailed(err) => {
                write!(f, "eglGetPlatformDisplay() failed: {}", err)
            }
            Error::InitializationFailed(err) => write!(f, "eglInitialize() failed: {}", err),
            Error::PixelFormatSelectionFailed(err) => {
                write!(f, "eglChooseConfig() failed: {}", err)
            }
            Error::NoPixelFormatFound => write!(f, "no matching EGL config"),
            Error::ContextCreationFailed(err) => write!(f, "eglCreateContext() failed: {}", err),
            Error::ContextDestructionFailed(err) => {
                write!(f, "eglDestroyContext() failed: {}", err)
            }
            Error::MakeCurrentFailed(err) => write!(f, "eglMakeCurrent() failed: {}", err),
            Error::SwapIntervalFailed(err) => write!(f, "eglSwapInterval() failed: {}", err),
            Error::SurfaceCreationFailed(err) => {
                write!(f, "eglCreateWindowSurface() failed: {}", err)
            }
            Error::SurfaceDestructionFailed(err) => {
                write!(f, "eglDestroySurface() failed: {}", err)
            }
            Error::PresentFailed(err) => write!(f, "eglSwapBuffers() failed: {}", err),
            Error::IncompatibleSurface => write!(f, "surface belongs to another context"),
            Error::InvalidNativeWidget => write!(f, "invalid native widget"),
            Error::IncompatibleNativeWidget => {
                write!(f, "native widget does not match this platform")
            }
            Error::ShaderCompilationFailed(log) => write!(f, "shader compilation failed: {}", log),
            Error::ProgramLinkFailed(log) => write!(f, "program link failed: {}", log),
            Error::GLObjectCreationFailed(message) => {
                write!(f, "GL object creation failed: {}", message)
            }
            Error::DisplayLinkFailed(code) => write!(f, "display link failed ({})", code),
            Error::NotOnMainThread => write!(f, "must be called on the main thread"),
        }
    }
}

impl std::error::Error for Error {}

impl Display for WindowingApiError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match *self {
            WindowingApiError::Failed => "EGL_FAILED",
            WindowingApiError::NotInitialized => "EGL_NOT_INITIALIZED",
            WindowingApiError::BadAccess => "EGL_BAD_ACCESS",
            WindowingApiError::BadAlloc => "EGL_BAD_ALLOC",
            WindowingApiError::BadAttribute => "EGL_BAD_ATTRIBUTE",
            WindowingApiError::BadConfig => "EGL_BAD_CONFIG",
            WindowingApiError::BadContext => "EGL_BAD_CONTEXT",
            WindowingApiError::BadCurrentSurface => "EGL_BAD_CURRENT_SURFACE",
            WindowingApiError::BadDisplay => "EGL_BAD_DISPLAY",
            WindowingApiError::BadMatch => "EGL_BAD_MATCH",
            WindowingApiError::BadNativePixmap => "EGL_BAD_NATIVE_PIXMAP",
            WindowingApiError::BadNativeWindow => "EGL_BAD_NATIVE_WINDOW",
            WindowingApiError::BadParameter => "EGL_BAD_PARAMETER",
            WindowingApiError::BadSurface => "EGL_BAD_SURFACE",
            WindowingApiError::ContextLost => "EGL_CONTEXT_LOST",
        };
        f.write_str(name)
    }
}
