// angleview/src/main.rs
//
//! Opens a window with a view that ANGLE draws a red triangle into.

use angleview::AppOptions;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = AppOptions::app().get_matches();
    let options = match AppOptions::from_matches(&matches) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {}", message);
            process::exit(2);
        }
    };

    if let Err(err) = run(options) {
        log::error!("{}", err);
        process::exit(1);
    }
}

#[cfg(target_os = "macos")]
fn run(options: AppOptions) -> Result<(), angleview::Error> {
    angleview::platform::macos::run(options)
}

#[cfg(target_os = "ios")]
fn run(options: AppOptions) -> Result<(), angleview::Error> {
    angleview::platform::ios::run(options)
}

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
fn run(_: AppOptions) -> Result<(), angleview::Error> {
    println!("The angleview demo needs AppKit or UIKit and only runs on macOS and iOS.");
    Ok(())
}
