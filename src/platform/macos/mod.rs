// angleview/src/platform/macos/mod.rs
//
//! The AppKit front end.

pub mod display_link;
pub mod view;

pub use self::view::RenderView;

use crate::options::{AppOptions, APP_NAME};
use crate::Error;

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2::{define_class, msg_send, DefinedClass, MainThreadMarker, MainThreadOnly};
use objc2_app_kit::{
    NSApplication, NSApplicationActivationPolicy, NSApplicationDelegate, NSBackingStoreType,
    NSView, NSWindow, NSWindowStyleMask,
};
use objc2_foundation::{
    NSNotification, NSObject, NSObjectProtocol, NSPoint, NSRect, NSSize, NSString,
};
use std::cell::OnceCell;

pub struct AppDelegateIvars {
    options: AppOptions,
    window: OnceCell<Retained<NSWindow>>,
}

define_class! {
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "AngleViewAppDelegate"]
    #[ivars = AppDelegateIvars]
    struct AppDelegate;

    unsafe impl NSObjectProtocol for AppDelegate {}

    unsafe impl NSApplicationDelegate for AppDelegate {
        #[unsafe(method(applicationDidFinishLaunching:))]
        fn application_did_finish_launching(&self, _notification: &NSNotification) {
            let mtm = MainThreadMarker::from(self);
            let window = open_window(&self.ivars().options, mtm);
            let _ = self.ivars().window.set(window);

            let app = NSApplication::sharedApplication(mtm);
            #[allow(deprecated)]
            app.activateIgnoringOtherApps(true);
        }

        #[unsafe(method(applicationShouldTerminateAfterLastWindowClosed:))]
        fn application_should_terminate_after_last_window_closed(
            &self,
            _app: &NSApplication,
        ) -> bool {
            true
        }
    }
}

impl AppDelegate {
    fn new(options: AppOptions, mtm: MainThreadMarker) -> Retained<AppDelegate> {
        let this = mtm.alloc::<AppDelegate>().set_ivars(AppDelegateIvars {
            options,
            window: OnceCell::new(),
        });
        unsafe { msg_send![super(this), init] }
    }
}

fn open_window(options: &AppOptions, mtm: MainThreadMarker) -> Retained<NSWindow> {
    let size = NSSize::new(
        options.window_size.width as f64,
        options.window_size.height as f64,
    );
    let frame = NSRect::new(NSPoint::new(0.0, 0.0), size);
    let style = NSWindowStyleMask::Titled
        | NSWindowStyleMask::Closable
        | NSWindowStyleMask::Resizable
        | NSWindowStyleMask::Miniaturizable;

    let window = unsafe {
        NSWindow::initWithContentRect_styleMask_backing_defer(
            mtm.alloc::<NSWindow>(),
            frame,
            style,
            NSBackingStoreType::Buffered,
            false,
        )
    };
    unsafe { window.setReleasedWhenClosed(false) };
    window.setTitle(&NSString::from_str(APP_NAME));

    let view = RenderView::new(frame, options.clone(), mtm);
    let content_view: &NSView = &view;
    window.setContentView(Some(content_view));
    window.center();
    window.makeKeyAndOrderFront(None);
    window
}

/// Runs the application until its window is closed.
pub fn run(options: AppOptions) -> Result<(), Error> {
    let mtm = MainThreadMarker::new().ok_or(Error::NotOnMainThread)?;
    let app = NSApplication::sharedApplication(mtm);
    app.setActivationPolicy(NSApplicationActivationPolicy::Regular);

    let delegate = AppDelegate::new(options, mtm);
    app.setDelegate(Some(ProtocolObject::from_ref(&*delegate)));

    info!("Starting {}", APP_NAME);
    app.run();
    Ok(())
}
