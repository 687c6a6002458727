// angleview/src/platform/apple/mod.rs
//
//! Pieces shared by the AppKit and UIKit front ends: the `CAMetalLayer` that ANGLE presents
//! into, and the OS version that picks a display link.

use crate::frame::OsVersion;
use crate::platform::egl::surface::NativeWidget;
use crate::Error;

use euclid::default::Size2D;
use objc2::rc::Retained;
use objc2_foundation::NSProcessInfo;
use objc2_quartz_core::{CALayer, CAMetalLayer};
use std::os::raw::c_void;

/// The size of `layer` in device pixels: its bounds scaled by its `contentsScale`.
pub fn layer_pixel_size(layer: &CALayer) -> Size2D<i32> {
    let bounds = layer.bounds();
    let scale = layer.contentsScale();
    Size2D::new(
        (bounds.size.width * scale).round() as i32,
        (bounds.size.height * scale).round() as i32,
    )
}

/// The size of the drawables `layer` hands out, which is what ANGLE renders into.
///
/// Falls back to the layer's pixel size while no drawable size has been set.
pub fn layer_drawable_size(layer: &CAMetalLayer) -> Size2D<i32> {
    let drawable_size = layer.drawableSize();
    if drawable_size.width <= 0.0 || drawable_size.height <= 0.0 {
        return layer_pixel_size(layer);
    }
    Size2D::new(
        drawable_size.width.round() as i32,
        drawable_size.height.round() as i32,
    )
}

/// Wraps `layer` for window surface creation.
///
/// The caller keeps `layer` alive for as long as any surface created from the widget.
pub fn native_widget_from_layer(layer: &CAMetalLayer) -> Result<NativeWidget, Error> {
    let size = layer_pixel_size(layer);
    let layer_ptr = layer as *const CAMetalLayer as *mut c_void;
    unsafe { NativeWidget::new(layer_ptr, size) }
}

/// Returns the running OS version.
pub fn os_version() -> OsVersion {
    let version = NSProcessInfo::processInfo().operatingSystemVersion();
    OsVersion::new(
        version.majorVersion as u32,
        version.minorVersion as u32,
        version.patchVersion as u32,
    )
}

fn metal_layer_of(layer: Retained<CALayer>) -> Result<Retained<CAMetalLayer>, Error> {
    layer
        .downcast::<CAMetalLayer>()
        .map_err(|_| Error::IncompatibleNativeWidget)
}

#[cfg(feature = "raw-window-handle-06")]
impl NativeWidget {
    /// Creates a native widget from the `CAMetalLayer` backing the view in `handle`.
    ///
    /// Views that aren't backed by a `CAMetalLayer` are rejected with
    /// `Error::IncompatibleNativeWidget`.
    ///
    /// # Safety
    ///
    /// Must be called on the main thread, and the view must outlive every surface created from
    /// the returned widget.
    pub unsafe fn from_window_handle(handle: rwh_06::WindowHandle) -> Result<NativeWidget, Error> {
        use rwh_06::RawWindowHandle;

        let layer = match handle.as_raw() {
            #[cfg(macos)]
            RawWindowHandle::AppKit(handle) => {
                let ns_view = handle.ns_view.cast::<objc2_app_kit::NSView>().as_ref();
                ns_view.layer().ok_or(Error::IncompatibleNativeWidget)?
            }
            #[cfg(ios)]
            RawWindowHandle::UiKit(handle) => {
                let ui_view = handle.ui_view.cast::<objc2_ui_kit::UIView>().as_ref();
                ui_view.layer()
            }
            _ => return Err(Error::IncompatibleNativeWidget),
        };
        let metal_layer = metal_layer_of(layer)?;
        // The view retains its layer, so the pointer stays valid after this reference goes.
        native_widget_from_layer(&metal_layer)
    }
}

#[cfg(test)]
mod tests {
    use super::{layer_drawable_size, layer_pixel_size, metal_layer_of};
    use super::{native_widget_from_layer, os_version};
    use crate::Error;
    use euclid::default::Size2D;
    use objc2::rc::Retained;
    use objc2_core_foundation::{CGPoint, CGRect, CGSize};
    use objc2_quartz_core::{CALayer, CAMetalLayer};

    #[test]
    fn test_layer_pixel_size_applies_scale() {
        let layer = CAMetalLayer::new();
        layer.setBounds(CGRect::new(CGPoint::new(0.0, 0.0), CGSize::new(400.0, 300.0)));
        layer.setContentsScale(2.0);
        assert_eq!(layer_pixel_size(&layer), Size2D::new(800, 600));

        let widget = native_widget_from_layer(&layer).unwrap();
        assert_eq!(widget.size(), Size2D::new(800, 600));
    }

    #[test]
    fn test_drawable_size_wins_over_bounds() {
        let layer = CAMetalLayer::new();
        layer.setBounds(CGRect::new(CGPoint::new(0.0, 0.0), CGSize::new(400.0, 300.0)));
        layer.setContentsScale(2.0);
        layer.setDrawableSize(CGSize::new(640.0, 480.0));
        assert_eq!(layer_drawable_size(&layer), Size2D::new(640, 480));

        layer.setDrawableSize(CGSize::new(0.0, 0.0));
        assert_eq!(layer_drawable_size(&layer), Size2D::new(800, 600));
    }

    #[test]
    fn test_unsized_layer_is_rejected() {
        let layer = CAMetalLayer::new();
        assert!(matches!(
            native_widget_from_layer(&layer),
            Err(Error::InvalidNativeWidget)
        ));
    }

    #[test]
    fn test_plain_layer_is_not_a_metal_layer() {
        assert!(metal_layer_of(CALayer::new()).is_err());
        let metal_layer: Retained<CALayer> = Retained::into_super(CAMetalLayer::new());
        assert!(metal_layer_of(metal_layer).is_ok());
    }

    #[test]
    fn test_os_version_is_plausible() {
        assert!(os_version().major >= 10);
    }
}
