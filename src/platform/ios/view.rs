// angleview/src/platform/ios/view.rs
//
//! A `UIView` whose layer is a `CAMetalLayer`, redrawn by a `CADisplayLink`.

use crate::frame::{self, ApplePlatform};
use crate::options::AppOptions;
use crate::platform::apple::{self, layer_drawable_size};
use crate::renderer::Renderer;

use euclid::default::Size2D;
use objc2::rc::{Retained, Weak};
use objc2::runtime::AnyClass;
use objc2::{
    define_class, msg_send, sel, ClassType, DefinedClass, MainThreadMarker, MainThreadOnly,
};
use objc2_core_foundation::CGRect;
use objc2_foundation::{NSObject, NSObjectProtocol, NSRunLoop, NSRunLoopCommonModes};
use objc2_quartz_core::{CADisplayLink, CAMetalLayer};
use objc2_ui_kit::{UIResponder, UITraitCollection, UIView};
use std::cell::{OnceCell, RefCell};

pub struct RenderViewIvars {
    options: AppOptions,
    display_link: RefCell<Option<Retained<CADisplayLink>>>,
    renderer: RefCell<Option<Renderer>>,
    metal_layer: OnceCell<Retained<CAMetalLayer>>,
}

define_class! {
    #[unsafe(super(UIView, UIResponder, NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "AngleViewRenderView"]
    #[ivars = RenderViewIvars]
    pub struct RenderView;

    unsafe impl NSObjectProtocol for RenderView {}

    impl RenderView {
        #[unsafe(method(layerClass))]
        fn layer_class() -> &'static AnyClass {
            CAMetalLayer::class()
        }

        #[unsafe(method(traitCollectionDidChange:))]
        fn trait_collection_did_change(&self, previous: Option<&UITraitCollection>) {
            let _: () = unsafe { msg_send![super(self), traitCollectionDidChange: previous] };
            self.update_contents_scale();
        }
    }
}

define_class! {
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "AngleViewDisplayLinkTarget"]
    #[ivars = Weak<RenderView>]
    struct DisplayLinkTarget;

    unsafe impl NSObjectProtocol for DisplayLinkTarget {}

    impl DisplayLinkTarget {
        #[unsafe(method(step:))]
        fn step(&self, _sender: &CADisplayLink) {
            if let Some(view) = self.ivars().load() {
                view.render_frame();
            }
        }
    }
}

impl DisplayLinkTarget {
    fn new(view: &RenderView, mtm: MainThreadMarker) -> Retained<DisplayLinkTarget> {
        let this = mtm.alloc::<DisplayLinkTarget>().set_ivars(Weak::new(view));
        unsafe { msg_send![super(this), init] }
    }
}

impl RenderView {
    /// Creates the view and brings up ANGLE inside it.
    ///
    /// If set-up fails the error is logged and the view stays blank.
    pub fn new(frame: CGRect, options: AppOptions, mtm: MainThreadMarker) -> Retained<RenderView> {
        let this = mtm.alloc::<RenderView>().set_ivars(RenderViewIvars {
            options,
            display_link: RefCell::new(None),
            renderer: RefCell::new(None),
            metal_layer: OnceCell::new(),
        });
        let view: Retained<RenderView> = unsafe { msg_send![super(this), initWithFrame: frame] };
        match view.layer().downcast::<CAMetalLayer>() {
            Ok(metal_layer) => {
                let _ = view.ivars().metal_layer.set(metal_layer);
                view.update_contents_scale();
                view.start_rendering(mtm);
            }
            Err(_) => error!("The view isn't backed by a CAMetalLayer; not rendering"),
        }
        view
    }

    fn update_contents_scale(&self) {
        let metal_layer = match self.ivars().metal_layer.get() {
            Some(metal_layer) => metal_layer,
            None => return,
        };
        let trait_collection: Retained<UITraitCollection> =
            unsafe { msg_send![self, traitCollection] };
        let scale = trait_collection.displayScale();
        if scale > 0.0 && metal_layer.contentsScale() != scale {
            debug!("Display scale changed to {}", scale);
            metal_layer.setContentsScale(scale);
        }
    }

    fn start_rendering(&self, mtm: MainThreadMarker) {
        let metal_layer = match self.ivars().metal_layer.get() {
            Some(metal_layer) => metal_layer,
            None => return,
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
            ApplePlatform::IOS,
            apple::os_version(),
            self.ivars().options.display_link,
        );

        // The link retains its target, and the target only holds the view weakly.
        let target = DisplayLinkTarget::new(self, mtm);
        let display_link = unsafe {
            CADisplayLink::displayLinkWithTarget_selector(&target, sel!(step:))
        };
        unsafe {
            display_link.addToRunLoop_forMode(&NSRunLoop::currentRunLoop(), NSRunLoopCommonModes);
        }
        info!("Driving frames with {}", kind);
        *self.ivars().display_link.borrow_mut() = Some(display_link);
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
            if let Some(display_link) = self.ivars().display_link.borrow_mut().take() {
                display_link.invalidate();
            }
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

impl Drop for RenderViewIvars {
    fn drop(&mut self) {
        if let Some(display_link) = self.display_link.get_mut().take() {
            display_link.invalidate();
        }
    }
}
