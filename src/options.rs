// angleview/src/options.rs
//
//! Application options and their command-line form.

use crate::frame::DisplayLinkPreference;
use crate::platform::egl::device::AngleBackend;
use crate::renderer::RenderOptions;
use crate::scene::VertexUpload;
use crate::GLVersion;

use clap::{App, Arg, ArgMatches};
use euclid::default::Size2D;
use std::path::PathBuf;
use std::str::FromStr;

pub static APP_NAME: &str = "angleview";

pub const DEFAULT_WINDOW_WIDTH: u32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 600;

/// Options for the demo application as a whole.
#[derive(Clone, Debug, PartialEq)]
pub struct AppOptions {
    pub render: RenderOptions,
    pub display_link: DisplayLinkPreference,
    /// The initial window content size in points. Ignored on iOS, where the window fills the
    /// screen.
    pub window_size: Size2D<u32>,
}

impl Default for AppOptions {
    fn default() -> AppOptions {
        AppOptions {
            render: RenderOptions::default(),
            display_link: DisplayLinkPreference::Auto,
            window_size: Size2D::new(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT),
        }
    }
}

impl AppOptions {
    /// The command line accepted by the binary.
    pub fn app<'a, 'b>() -> App<'a, 'b> {
        App::new(APP_NAME)
            .version(env!("CARGO_PKG_VERSION"))
            .about("Draws a triangle with ANGLE's OpenGL ES inside a native view")
            .arg(
                Arg::with_name("egl-library")
                    .long("egl-library")
                    .takes_value(true)
                    .value_name("PATH")
                    .help("Load libEGL from this path"),
            )
            .arg(
                Arg::with_name("gles-library")
                    .long("gles-library")
                    .takes_value(true)
                    .value_name("PATH")
                    .help("Load libGLESv2 from this path"),
            )
            .arg(
                Arg::with_name("backend")
                    .long("backend")
                    .takes_value(true)
                    .possible_values(&["default", "metal", "opengl"])
                    .help("The GPU API ANGLE translates to"),
            )
            .arg(
                Arg::with_name("upload")
                    .long("upload")
                    .takes_value(true)
                    .possible_values(&["buffer", "per-frame"])
                    .help("Upload the triangle once, or again every frame"),
            )
            .arg(
                Arg::with_name("display-link")
                    .long("display-link")
                    .takes_value(true)
                    .possible_values(&["auto", "core-animation", "core-video"])
                    .help("The display link that drives frames"),
            )
            .arg(
                Arg::with_name("swap-interval")
                    .long("swap-interval")
                    .takes_value(true)
                    .value_name("N")
                    .help("Vertical refreshes between buffer swaps"),
            )
            .arg(
                Arg::with_name("gles-version")
                    .long("gles-version")
                    .takes_value(true)
                    .value_name("MAJOR.MINOR")
                    .help("The OpenGL ES version to request"),
            )
            .arg(
                Arg::with_name("width")
                    .long("width")
                    .takes_value(true)
                    .help("Initial window width in points"),
            )
            .arg(
                Arg::with_name("height")
                    .long("height")
                    .takes_value(true)
                    .help("Initial window height in points"),
            )
    }

    /// Builds options from parsed arguments, starting from the defaults.
    pub fn from_matches(matches: &ArgMatches) -> Result<AppOptions, String> {
        let mut options = AppOptions::default();
        let render = &mut options.render;

        render.egl_library = matches.value_of("egl-library").map(PathBuf::from);
        render.gles_library = matches.value_of("gles-library").map(PathBuf::from);
        if let Some(backend) = parse_value::<AngleBackend>(matches, "backend")? {
            render.backend = backend;
        }
        if let Some(upload) = parse_value::<VertexUpload>(matches, "upload")? {
            render.upload = upload;
        }
        if let Some(swap_interval) = parse_value::<i32>(matches, "swap-interval")? {
            render.swap_interval = swap_interval;
        }
        if let Some(version) = parse_value::<GLVersion>(matches, "gles-version")? {
            if version.major < 2 {
                return Err(format!("OpenGL ES {} is too old; 2.0 is the minimum", version));
            }
            render.attributes.version = version;
        }
        if let Some(display_link) = parse_value::<DisplayLinkPreference>(matches, "display-link")? {
            options.display_link = display_link;
        }
        if let Some(width) = parse_value::<u32>(matches, "width")? {
            options.window_size.width = width;
        }
        if let Some(height) = parse_value::<u32>(matches, "height")? {
            options.window_size.height = height;
        }
        if options.window_size.is_empty() {
            return Err("the window must not be empty".to_owned());
        }

        Ok(options)
    }
}

fn parse_value<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: ToString,
{
    match matches.value_of(name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|err: T::Err| format!("invalid --{} `{}`: {}", name, value, err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::AppOptions;
    use crate::frame::DisplayLinkPreference;
    use crate::platform::egl::device::AngleBackend;
    use crate::scene::VertexUpload;
    use crate::GLVersion;
    use euclid::default::Size2D;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Result<AppOptions, String> {
        let matches = AppOptions::app()
            .get_matches_from_safe(std::iter::once("angleview").chain(args.iter().cloned()))
            .map_err(|err| err.message)?;
        AppOptions::from_matches(&matches)
    }

    #[test]
    fn test_no_arguments_gives_defaults() {
        assert_eq!(parse(&[]).unwrap(), AppOptions::default());
        assert_eq!(AppOptions::default().window_size, Size2D::new(800, 600));
    }

    #[test]
    fn test_all_arguments() {
        let options = parse(&[
            "--egl-library",
            "/opt/angle/libEGL.dylib",
            "--gles-library",
            "/opt/angle/libGLESv2.dylib",
            "--backend",
            "metal",
            "--upload",
            "per-frame",
            "--display-link",
            "core-video",
            "--swap-interval",
            "1",
            "--gles-version",
            "3.0",
            "--width",
            "1024",
            "--height",
            "768",
        ])
        .unwrap();

        let render = &options.render;
        assert_eq!(render.egl_library, Some(PathBuf::from("/opt/angle/libEGL.dylib")));
        assert_eq!(render.gles_library, Some(PathBuf::from("/opt/angle/libGLESv2.dylib")));
        assert_eq!(render.backend, AngleBackend::Metal);
        assert_eq!(render.upload, VertexUpload::PerFrame);
        assert_eq!(render.swap_interval, 1);
        assert_eq!(render.attributes.version, GLVersion::new(3, 0));
        assert_eq!(options.display_link, DisplayLinkPreference::CoreVideo);
        assert_eq!(options.window_size, Size2D::new(1024, 768));
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        assert!(parse(&["--backend", "vulkan"]).is_err());
        assert!(parse(&["--swap-interval", "often"]).is_err());
        assert!(parse(&["--gles-version", "1.1"]).is_err());
        assert!(parse(&["--gles-version", "three"]).is_err());
        assert!(parse(&["--width", "0"]).is_err());
    }
}
