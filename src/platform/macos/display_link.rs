// angleview/src/platform/macos/display_link.rs
//
//! Display links that call back into a `RenderView` once per refresh.
//!
//! `CADisplayLink` fires on the main run loop directly. `CVDisplayLink` fires on a CoreVideo
//! thread, so its callback only carries a view ID across to the main queue, where the view is
//! looked up in a registry of weak references.

use super::view::RenderView;
use crate::frame::DisplayLinkKind;
use crate::Error;

use dispatch2::DispatchQueue;
use objc2::rc::{Retained, Weak};
use objc2::{define_class, msg_send, sel, DefinedClass, MainThreadMarker, MainThreadOnly};
use objc2_core_foundation::CFRetained;
use objc2_core_video::{kCVReturnSuccess, CVDisplayLink as CVDisplayLinkRaw, CVReturn, CVTimeStamp};
use objc2_foundation::{NSObject, NSObjectProtocol, NSRunLoop, NSRunLoopCommonModes};
use objc2_quartz_core::CADisplayLink;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::os::raw::c_void;
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicU64, Ordering};

thread_local! {
    // Main thread only.
    static REGISTERED_VIEWS: RefCell<HashMap<u64, Weak<RenderView>>> =
        RefCell::new(HashMap::new());
}

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

fn register_view(view: &RenderView) -> u64 {
    let view_id = NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed);
    REGISTERED_VIEWS.with(|views| views.borrow_mut().insert(view_id, Weak::new(view)));
    view_id
}

fn unregister_view(view_id: u64) {
    REGISTERED_VIEWS.with(|views| views.borrow_mut().remove(&view_id));
}

fn render_registered_view(view_id: u64) {
    let view = REGISTERED_VIEWS.with(|views| views.borrow().get(&view_id).and_then(Weak::load));
    if let Some(view) = view {
        view.render_frame();
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

/// A running display link. Dropping it stops the callbacks.
pub enum DisplayLink {
    CoreAnimation(Retained<CADisplayLink>),
    CoreVideo(CoreVideoLink),
}

impl Debug for DisplayLink {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "DisplayLink({})", self.kind())
    }
}

impl DisplayLink {
    /// Starts a display link of the given kind driving `view`.
    pub fn new(
        view: &RenderView,
        kind: DisplayLinkKind,
        mtm: MainThreadMarker,
    ) -> Result<DisplayLink, Error> {
        match kind {
            DisplayLinkKind::CoreAnimation => {
                // The link retains its target, and the target only holds the view weakly.
                let target = DisplayLinkTarget::new(view, mtm);
                let link: Retained<CADisplayLink> = unsafe {
                    msg_send![view, displayLinkWithTarget: &*target, selector: sel!(step:)]
                };
                unsafe {
                    link.addToRunLoop_forMode(&NSRunLoop::currentRunLoop(), NSRunLoopCommonModes);
                }
                Ok(DisplayLink::CoreAnimation(link))
            }
            DisplayLinkKind::CoreVideo => Ok(DisplayLink::CoreVideo(CoreVideoLink::new(view)?)),
        }
    }

    pub fn kind(&self) -> DisplayLinkKind {
        match *self {
            DisplayLink::CoreAnimation(_) => DisplayLinkKind::CoreAnimation,
            DisplayLink::CoreVideo(_) => DisplayLinkKind::CoreVideo,
        }
    }
}

impl Drop for DisplayLink {
    fn drop(&mut self) {
        if let DisplayLink::CoreAnimation(ref link) = *self {
            link.invalidate();
        }
    }
}

/// A `CVDisplayLink` over all active displays.
pub struct CoreVideoLink {
    raw: CFRetained<CVDisplayLinkRaw>,
    // Shared with the output callback. Outlives `raw`'s callbacks because `drop()` stops the
    // link first.
    view_id: Box<u64>,
}

impl CoreVideoLink {
    #[allow(deprecated)]
    fn new(view: &RenderView) -> Result<CoreVideoLink, Error> {
        let mut link_ptr: *mut CVDisplayLinkRaw = ptr::null_mut();
        let result = unsafe {
            CVDisplayLinkRaw::create_with_active_cg_displays(NonNull::from(&mut link_ptr))
        };
        if result != kCVReturnSuccess {
            return Err(Error::DisplayLinkFailed(result));
        }
        let raw = match NonNull::new(link_ptr) {
            Some(raw) => unsafe { CFRetained::from_raw(raw) },
            None => return Err(Error::DisplayLinkFailed(result)),
        };

        let view_id = Box::new(register_view(view));
        let user_info = &*view_id as *const u64 as *mut c_void;
        let link = CoreVideoLink { raw, view_id };

        let result = unsafe { link.raw.set_output_callback(Some(display_link_callback), user_info) };
        if result != kCVReturnSuccess {
            return Err(Error::DisplayLinkFailed(result));
        }
        let result = link.raw.start();
        if result != kCVReturnSuccess {
            return Err(Error::DisplayLinkFailed(result));
        }
        Ok(link)
    }
}

impl Drop for CoreVideoLink {
    #[allow(deprecated)]
    fn drop(&mut self) {
        if self.raw.is_running() {
            let result = self.raw.stop();
            if result != kCVReturnSuccess {
                warn!("CVDisplayLinkStop() failed ({})", result);
            }
        }
        unregister_view(*self.view_id);
    }
}

// Runs on the CoreVideo thread.
unsafe extern "C-unwind" fn display_link_callback(
    _display_link: NonNull<CVDisplayLinkRaw>,
    _in_now: NonNull<CVTimeStamp>,
    _in_output_time: NonNull<CVTimeStamp>,
    _flags_in: u64,
    _flags_out: NonNull<u64>,
    user_info: *mut c_void,
) -> CVReturn {
    let view_id = *(user_info as *const u64);
    DispatchQueue::main().exec_async(move || render_registered_view(view_id));
    kCVReturnSuccess
}
