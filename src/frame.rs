// angleview/src/frame.rs
//
//! Choosing a display link and keeping frame statistics.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::{Duration, Instant};

/// The first macOS release where `NSView` vends a `CADisplayLink`.
pub const MACOS_CA_DISPLAY_LINK_VERSION: OsVersion = OsVersion::new(14, 0, 0);

/// How often `FrameClock` reports a frame rate.
pub const FRAME_RATE_INTERVAL: Duration = Duration::from_secs(1);

/// Which display link the user asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DisplayLinkPreference {
    /// `CADisplayLink` where the OS has it, `CVDisplayLink` otherwise.
    #[default]
    Auto,
    CoreAnimation,
    CoreVideo,
}

impl FromStr for DisplayLinkPreference {
    type Err = String;

    fn from_str(string: &str) -> Result<DisplayLinkPreference, String> {
        match &*string.to_ascii_lowercase() {
            "auto" => Ok(DisplayLinkPreference::Auto),
            "core-animation" | "ca" => Ok(DisplayLinkPreference::CoreAnimation),
            "core-video" | "cv" => Ok(DisplayLinkPreference::CoreVideo),
            _ => Err(format!("unknown display link `{}`", string)),
        }
    }
}

/// The display link actually driving frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DisplayLinkKind {
    CoreAnimation,
    CoreVideo,
}

impl Display for DisplayLinkKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            DisplayLinkKind::CoreAnimation => f.write_str("CADisplayLink"),
            DisplayLinkKind::CoreVideo => f.write_str("CVDisplayLink"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ApplePlatform {
    MacOS,
    IOS,
}

/// An operating system version, ordered by major, minor, then patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl OsVersion {
    #[inline]
    pub const fn new(major: u32, minor: u32, patch: u32) -> OsVersion {
        OsVersion {
            major,
            minor,
            patch,
        }
    }
}

impl Display for OsVersion {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Picks the display link for `platform` running `os_version`.
pub fn select_display_link(
    platform: ApplePlatform,
    os_version: OsVersion,
    preference: DisplayLinkPreference,
) -> DisplayLinkKind {
    if platform == ApplePlatform::IOS {
        return DisplayLinkKind::CoreAnimation;
    }

    let has_ca_display_link = os_version >= MACOS_CA_DISPLAY_LINK_VERSION;
    match preference {
        DisplayLinkPreference::CoreVideo => DisplayLinkKind::CoreVideo,
        DisplayLinkPreference::Auto if has_ca_display_link => DisplayLinkKind::CoreAnimation,
        DisplayLinkPreference::Auto => DisplayLinkKind::CoreVideo,
        DisplayLinkPreference::CoreAnimation if has_ca_display_link => {
            DisplayLinkKind::CoreAnimation
        }
        DisplayLinkPreference::CoreAnimation => {
            warn!(
                "CADisplayLink needs macOS {}; falling back to CVDisplayLink on {}",
                MACOS_CA_DISPLAY_LINK_VERSION, os_version
            );
            DisplayLinkKind::CoreVideo
        }
    }
}

/// Counts presented frames and periodically reports the frame rate.
#[derive(Clone, Debug)]
pub struct FrameClock {
    total_frames: u64,
    interval_frames: u32,
    interval_start: Option<Instant>,
}

impl Default for FrameClock {
    fn default() -> FrameClock {
        FrameClock::new()
    }
}

impl FrameClock {
    pub fn new() -> FrameClock {
        FrameClock {
            total_frames: 0,
            interval_frames: 0,
            interval_start: None,
        }
    }

    /// Records a frame presented now.
    pub fn tick(&mut self) -> Option<f64> {
        self.tick_at(Instant::now())
    }

    /// Records a frame presented at `now`. Returns the frames per second over the last interval
    /// once at least `FRAME_RATE_INTERVAL` has passed since the interval began.
    pub fn tick_at(&mut self, now: Instant) -> Option<f64> {
        self.total_frames += 1;

        let interval_start = match self.interval_start {
            Some(interval_start) => interval_start,
            None => {
                self.interval_start = Some(now);
                return None;
            }
        };

        self.interval_frames += 1;
        let elapsed = now.saturating_duration_since(interval_start);
        if elapsed < FRAME_RATE_INTERVAL {
            return None;
        }

        let frames_per_second = self.interval_frames as f64 / elapsed.as_secs_f64();
        debug!(
            "{:.1} frames per second ({} frames total)",
            frames_per_second, self.total_frames
        );
        self.interval_frames = 0;
        self.interval_start = Some(now);
        Some(frames_per_second)
    }

    #[inline]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

#[cfg(test)]
mod tests {
    use super::{select_display_link, ApplePlatform, DisplayLinkKind, DisplayLinkPreference};
    use super::{FrameClock, OsVersion};
    use std::time::{Duration, Instant};

    const SONOMA: OsVersion = OsVersion::new(14, 0, 0);
    const VENTURA: OsVersion = OsVersion::new(13, 6, 1);

    #[test]
    fn test_ios_always_uses_core_animation() {
        for preference in [
            DisplayLinkPreference::Auto,
            DisplayLinkPreference::CoreAnimation,
            DisplayLinkPreference::CoreVideo,
        ] {
            assert_eq!(
                select_display_link(ApplePlatform::IOS, OsVersion::new(12, 0, 0), preference),
                DisplayLinkKind::CoreAnimation
            );
        }
    }

    #[test]
    fn test_macos_auto_depends_on_version() {
        let auto = DisplayLinkPreference::Auto;
        assert_eq!(
            select_display_link(ApplePlatform::MacOS, SONOMA, auto),
            DisplayLinkKind::CoreAnimation
        );
        assert_eq!(
            select_display_link(ApplePlatform::MacOS, OsVersion::new(15, 1, 0), auto),
            DisplayLinkKind::CoreAnimation
        );
        assert_eq!(
            select_display_link(ApplePlatform::MacOS, VENTURA, auto),
            DisplayLinkKind::CoreVideo
        );
    }

    #[test]
    fn test_macos_forced_links() {
        assert_eq!(
            select_display_link(ApplePlatform::MacOS, SONOMA, DisplayLinkPreference::CoreVideo),
            DisplayLinkKind::CoreVideo
        );
        assert_eq!(
            select_display_link(
                ApplePlatform::MacOS,
                VENTURA,
                DisplayLinkPreference::CoreAnimation
            ),
            DisplayLinkKind::CoreVideo
        );
    }

    #[test]
    fn test_os_version_ordering() {
        assert!(OsVersion::new(13, 9, 9) < OsVersion::new(14, 0, 0));
        assert!(OsVersion::new(14, 0, 1) > OsVersion::new(14, 0, 0));
        assert_eq!(OsVersion::new(14, 2, 0).to_string(), "14.2.0");
    }

    #[test]
    fn test_preference_parsing() {
        assert_eq!(
            "core-animation".parse::<DisplayLinkPreference>(),
            Ok(DisplayLinkPreference::CoreAnimation)
        );
        assert_eq!("CV".parse::<DisplayLinkPreference>(), Ok(DisplayLinkPreference::CoreVideo));
        assert_eq!("auto".parse::<DisplayLinkPreference>(), Ok(DisplayLinkPreference::Auto));
        assert!("metal".parse::<DisplayLinkPreference>().is_err());
    }

    #[test]
    fn test_frame_clock_reports_after_interval() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick_at(start), None);
        for frame in 1..60 {
            let now = start + Duration::from_millis(frame * 16);
            assert_eq!(clock.tick_at(now), None);
        }

        let fps = clock.tick_at(start + Duration::from_secs(1)).unwrap();
        assert!((fps - 60.0).abs() < 1e-9);
        assert_eq!(clock.total_frames(), 61);

        // The next interval starts from the reporting frame.
        assert_eq!(clock.tick_at(start + Duration::from_millis(1500)), None);
        let fps = clock.tick_at(start + Duration::from_secs(2)).unwrap();
        assert!((fps - 2.0).abs() < 1e-9);
    }
}
