// angleview/src/tests.rs
//
//! Unit tests.
//!
//! Tests that load EGL share the process-wide library and run serially. Machines without an
//! ANGLE build fail at library loading or display acquisition, and those tests pass vacuously.

use crate::{AngleBackend, ContextAttributeFlags, ContextAttributes, Device, DynamicLibrary};
use crate::{Error, GLVersion, LibraryKind, NativeWidget, RenderOptions, Renderer};
use crate::WindowingApiError;

use euclid::default::Size2D;
use serial_test::serial;
use std::os::raw::c_void;
use std::path::PathBuf;
use std::ptr;

static GL_ES_VERSIONS: [GLVersion; 2] = [
    GLVersion { major: 2, minor: 0 },
    GLVersion { major: 3, minor: 0 },
];

fn open_device() -> Option<Device> {
    let candidates = LibraryKind::Egl.default_candidates();
    let library = match DynamicLibrary::open(&candidates) {
        Ok(library) => library,
        Err(Error::LibraryNotFound) => return None,
        Err(err) => panic!("unexpected error loading EGL: {:?}", err),
    };
    match Device::new(library, AngleBackend::Default) {
        Ok(device) => Some(device),
        // Not ANGLE, or ANGLE without a usable backend.
        Err(Error::GLFunctionNotFound)
        | Err(Error::DisplayAcquisitionFailed(_))
        | Err(Error::InitializationFailed(_)) => None,
        Err(err) => panic!("unexpected error creating the device: {:?}", err),
    }
}

#[test]
#[serial]
fn test_device_creation() {
    let device = match open_device() {
        Some(device) => device,
        None => return,
    };
    let (major, minor) = device.egl_version();
    assert!(major > 1 || (major == 1 && minor >= 4));
}

// Tests that all combinations of flags result in the creation of valid context descriptors and
// contexts.
#[test]
#[serial]
fn test_context_creation() {
    let device = match open_device() {
        Some(device) => device,
        None => return,
    };

    for &version in &GL_ES_VERSIONS {
        for flag_bits in 0..(ContextAttributeFlags::all().bits() + 1) {
            let flags = ContextAttributeFlags::from_bits_truncate(flag_bits);
            let attributes = ContextAttributes { version, flags };

            let descriptor = match device.create_context_descriptor(&attributes) {
                Ok(descriptor) => descriptor,
                Err(Error::NoPixelFormatFound) => continue,
                Err(err) => panic!("failed to choose a config for {:?}: {:?}", attributes, err),
            };
            let actual_attributes = device.context_descriptor_attributes(&descriptor).unwrap();
            assert_eq!(actual_attributes.version, version);
            if flags.contains(ContextAttributeFlags::DEPTH) {
                assert!(actual_attributes.flags.contains(ContextAttributeFlags::DEPTH));
            }

            let mut context = match device.create_context(&descriptor) {
                Ok(context) => context,
                Err(Error::ContextCreationFailed(_)) if version.major >= 3 => continue,
                Err(err) => panic!("failed to create a context for {:?}: {:?}", attributes, err),
            };
            assert_eq!(context.version(), version);
            device.destroy_context(&mut context).unwrap();
        }
    }
}

#[test]
#[serial]
fn test_context_ids_differ() {
    let device = match open_device() {
        Some(device) => device,
        None => return,
    };
    let descriptor = device
        .create_context_descriptor(&ContextAttributes::default())
        .unwrap();
    let mut first = device.create_context(&descriptor).unwrap();
    let mut second = device.create_context(&descriptor).unwrap();
    assert_ne!(first.id(), second.id());
    device.destroy_context(&mut first).unwrap();
    device.destroy_context(&mut second).unwrap();
}

// Querying a config the display never handed out is an error, not an abort.
#[test]
#[serial]
fn test_config_query_failure_is_reported() {
    let device = match open_device() {
        Some(device) => device,
        None => return,
    };
    let result = unsafe { device.get_config_attr(ptr::null(), crate::egl::RED_SIZE as i32) };
    match result {
        Err(Error::PixelFormatSelectionFailed(WindowingApiError::BadConfig)) => {}
        other => panic!("expected EGL_BAD_CONFIG, got {:?}", other),
    }
}

#[test]
fn test_renderer_reports_missing_library() {
    // Never handed to EGL: loading fails first.
    let mut layer = 0u8;
    let layer = &mut layer as *mut u8 as *mut c_void;
    let native_widget = unsafe { NativeWidget::new(layer, Size2D::new(64, 64)).unwrap() };

    let options = RenderOptions {
        egl_library: Some(PathBuf::from("/nonexistent/angle/libEGL.dylib")),
        ..RenderOptions::default()
    };
    match Renderer::new(&native_widget, &options) {
        Err(Error::LibraryNotFound) => {}
        other => panic!("expected LibraryNotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_error_messages_name_the_failing_call() {
    let err = Error::SurfaceCreationFailed(WindowingApiError::BadNativeWindow);
    assert_eq!(
        err.to_string(),
        "eglCreateWindowSurface() failed: EGL_BAD_NATIVE_WINDOW"
    );
    let err = Error::InitializationFailed(WindowingApiError::NotInitialized);
    assert_eq!(err.to_string(), "eglInitialize() failed: EGL_NOT_INITIALIZED");
    let err = Error::ShaderCompilationFailed("0:1: syntax error".to_owned());
    assert!(err.to_string().ends_with("0:1: syntax error"));
}
