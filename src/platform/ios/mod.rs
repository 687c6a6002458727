// angleview/src/platform/ios/mod.rs
//
//! The UIKit front end.

pub mod view;

pub use self::view::RenderView;

use crate::options::AppOptions;
use crate::Error;

use objc2::rc::Retained;
use objc2::{define_class, msg_send, ClassType, MainThreadMarker, MainThreadOnly};
use objc2_foundation::{NSObject, NSObjectProtocol, NSString};
use objc2_ui_kit::{
    UIApplication, UIApplicationDelegate, UIResponder, UIScreen, UIView, UIViewController,
    UIWindow,
};
use std::cell::RefCell;

thread_local! {
    // UIKit instantiates the delegate by class name, so the options wait here until launch.
    static PENDING_OPTIONS: RefCell<Option<AppOptions>> = const { RefCell::new(None) };
    static KEY_WINDOW: RefCell<Option<Retained<UIWindow>>> = const { RefCell::new(None) };
}

define_class! {
    #[unsafe(super(UIResponder, NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "AngleViewAppDelegate"]
    #[ivars = ()]
    struct AppDelegate;

    unsafe impl NSObjectProtocol for AppDelegate {}

    unsafe impl UIApplicationDelegate for AppDelegate {
        #[unsafe(method(applicationDidFinishLaunching:))]
        fn application_did_finish_launching(&self, _application: &UIApplication) {
            let mtm = MainThreadMarker::from(self);
            let options = PENDING_OPTIONS
                .with(|options| options.borrow_mut().take())
                .unwrap_or_default();
            let window = open_window(options, mtm);
            KEY_WINDOW.with(|key_window| *key_window.borrow_mut() = Some(window));
        }

        #[unsafe(method(applicationWillTerminate:))]
        fn application_will_terminate(&self, _application: &UIApplication) {
            KEY_WINDOW.with(|key_window| key_window.borrow_mut().take());
        }
    }
}

fn open_window(options: AppOptions, mtm: MainThreadMarker) -> Retained<UIWindow> {
    #[allow(deprecated)]
    let bounds = UIScreen::mainScreen(mtm).bounds();

    let window: Retained<UIWindow> =
        unsafe { msg_send![mtm.alloc::<UIWindow>(), initWithFrame: bounds] };
    let view_controller = UIViewController::new(mtm);
    let view = RenderView::new(bounds, options, mtm);
    let root_view: &UIView = &view;
    view_controller.setView(Some(root_view));
    window.setRootViewController(Some(&*view_controller));
    window.makeKeyAndVisible();
    window
}

/// Hands control to UIKit. Only returns if called off the main thread.
pub fn run(options: AppOptions) -> Result<(), Error> {
    let mtm = MainThreadMarker::new().ok_or(Error::NotOnMainThread)?;
    PENDING_OPTIONS.with(|pending| *pending.borrow_mut() = Some(options));

    info!("Starting {}", crate::options::APP_NAME);
    let delegate_class = NSString::from_str(AppDelegate::NAME);
    UIApplication::main(None, Some(&delegate_class), mtm)
}
