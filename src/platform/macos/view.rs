// angleview/src/platform/macos/view.rs
//
//! An `NSView` backed by a `CAMetalLayer` that ANGLE renders into.

use super::display_link::DisplayLink;
use crate::frame::{self, ApplePlatform};
use crate::options::AppOptions;
use crate::platform::apple::{self, layer_drawable_size};
use crate::renderer::Renderer;

use euclid::default::Size2D;
use objc2::rc::Retained;
use objc2::{define_class, msg_send, DefinedClass, MainThreadMarker, MainThreadOnly};
use objc2_app_kit::{NSResponder, NSView};
use objc2_foundation::{NSObject, NSObjectProtocol, NSRect};
use objc2_quartz_core::{CALayer, CAMetalLayer};
use std::cell::{OnceCell, RefCell};

pub struct RenderViewIvars {
    options: AppOptions,
    // Dropped in declaration order: callbacks stop before the renderer goes, and the renderer's
    // surface goes before the layer.
    display_link: RefCell<Option<DisplayLink>>,
    renderer: RefCell<Option<Renderer>>,
    metal_layer: OnceCell<Retained<CAMetalLayer>>,
}

define_class! {
    #[unsafe(super(NSView, NSResponder, NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "AngleViewRenderView"]
    #[ivars = RenderViewIvars]
    pub struct RenderView;

    unsafe impl NSObjectProtocol for RenderView {}

    impl RenderView {
        #[unsafe(method(makeBackingLayer))]
        fn make_backing_layer(&self) -> Retained<CALayer> {
            let metal_layer = self.ivars().metal_layer.get_or_init(CAMetalLayer::new);
            if let Some(window) = self.window() {
                metal_layer.setContentsScale(window.backingScaleFactor());
            }
            Retained::into_super(metal_layer.clone())
        }

        #[unsafe(method(viewDidChangeBackingProperties))]
        fn view_did_change_backing_properties(&self) {
            let _: () = unsafe { msg_send![super(self), viewDidChangeBackingProperties] };
            let metal_layer = self.ivars().metal_layer.get();
            if let (Some(window), Some(metal_layer)) = (self.window(), metal_layer) {
                let scale = window.backingScaleFactor();
                if metal_layer.contentsScale() != scale {
                    debug!("Backing scale changed to {}", scale);
                    metal_layer.setContentsScale(scale);
                }
            }
        }

        #[unsafe(method(isOpaque))]
        fn is_opaque(&self) -> bool {
            true
        }
    }
}

impl RenderView {
    /// Creates a layer-backed view and brings up ANGLE inside it.
    ///
    /// If set-up fails the error is logged and the view stays blank.
    pub fn new(frame: NSRect, options: AppOptions, mtm: MainThreadMarker) -> Retained<RenderView> {
        let this = mtm.alloc::<RenderView>().set_ivars(RenderViewIvars {
            options,
            display_link: RefCell::new(None),
            renderer: RefCell::new(None),
            metal_layer: OnceCell::new(),
        });
        let view: Retained<RenderView> = unsafe { msg_send![super(this), initWithFrame: frame] };
        view.setWantsLayer(true);
        view.start_rendering(mtm);
        view
    }

    fn start_rendering(&self, mtm: MainThreadMarker) {
        let metal_layer = match self.ivars().metal_layer.get() {
            Some(metal_layer) => metal_layer,
            None => {
                error!("The view has no CAMetalLayer; not rendering");
                return;
            }
        };

        let native_widget = match apple::native_widget_from_layer(metal_layer) {
            Ok(native_widget) => native_widget,
            Err(err) => {
                error!("Couldn't use the view's layer: {}", err);
                return;
            }
        };
        let mut renderer = match Renderer::new(&native_widget, &self.ivars().options.render) {
            Ok(renderer) => renderer,
            Err(err) => {
                error!("Couldn't set up ANGLE: {}", err);
                return;
            }
        };
        if let Err(err) = renderer.render_frame(layer_drawable_size(metal_layer)) {
            error!("Couldn't present the first frame: {}", err);
            return;
        }
        *self.ivars().renderer.borrow_mut() = Some(renderer);

        let kind = frame::select_display_link(
            ApplePlatform::MacOS,
            apple::os_version(),
            self.ivars().options.display_link,
        );
        match DisplayLink::new(self, kind, mtm) {
            Ok(display_link) => {
                info!("Driving frames with {}", kind);
                *self.ivars().display_link.borrow_mut() = Some(display_link);
            }
            Err(err) => error!("Couldn't start {}: {}", kind, err),
        }
    }

    /// Draws and presents one frame. Called by the display link.
    pub(crate) fn render_frame(&self) {
        let drawable_size = match self.ivars().metal_layer.get() {
            Some(metal_layer) => layer_drawable_size(metal_layer),
            None => Size2D::zero(),
        };

        let result = match *self.ivars().renderer.borrow_mut() {
            Some(ref mut renderer) => renderer.render_frame(drawable_size),
            None => return,
        };
        if let Err(err) = result {
            error!("Rendering failed, stopping the display link: {}", err);
            self.ivars().display_link.borrow_mut().take();
        }
    }

    /// The number of frames presented so far.
    pub fn frames_presented(&self) -> u64 {
        self.ivars()
            .renderer
            .borrow()
            .as_ref()
            .map_or(0, |renderer| renderer.frames_presented())
    }
}
