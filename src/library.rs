// angleview/src/library.rs
//
//! Locating and loading the ANGLE shared libraries at runtime.

use crate::Error;

use libc::{dlclose, dlerror, dlopen, dlsym, RTLD_LAZY, RTLD_LOCAL};
use std::ffi::{CStr, CString};
use std::os::raw::c_void;
use std::path::{Path, PathBuf};

#[cfg(macos)]
static EGL_LIBRARY_CANDIDATES: [&str; 3] = [
    "libEGL.dylib",
    "@rpath/libEGL.framework/libEGL",
    "@executable_path/../Frameworks/libEGL.framework/libEGL",
];
#[cfg(macos)]
static GLES_LIBRARY_CANDIDATES: [&str; 3] = [
    "libGLESv2.dylib",
    "@rpath/libGLESv2.framework/libGLESv2",
    "@executable_path/../Frameworks/libGLESv2.framework/libGLESv2",
];

#[cfg(ios)]
static EGL_LIBRARY_CANDIDATES: [&str; 2] = ["@rpath/libEGL.framework/libEGL", "libEGL.dylib"];
#[cfg(ios)]
static GLES_LIBRARY_CANDIDATES: [&str; 2] =
    ["@rpath/libGLESv2.framework/libGLESv2", "libGLESv2.dylib"];

#[cfg(not(apple))]
static EGL_LIBRARY_CANDIDATES: [&str; 2] = ["libEGL.so.1", "libEGL.so"];
#[cfg(not(apple))]
static GLES_LIBRARY_CANDIDATES: [&str; 2] = ["libGLESv2.so.2", "libGLESv2.so"];

/// Which ANGLE library to look for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LibraryKind {
    /// `libEGL`, which provides the display, context and surface entry points.
    Egl,
    /// `libGLESv2`, which provides the OpenGL ES entry points.
    Gles,
}

impl LibraryKind {
    /// The paths tried, in order, when no explicit path is configured.
    pub fn default_candidates(self) -> Vec<PathBuf> {
        let candidates: &[&str] = match self {
            LibraryKind::Egl => &EGL_LIBRARY_CANDIDATES,
            LibraryKind::Gles => &GLES_LIBRARY_CANDIDATES,
        };
        candidates.iter().map(PathBuf::from).collect()
    }

    /// The explicit path if there is one, otherwise the default candidates.
    pub fn candidates(self, explicit: Option<&Path>) -> Vec<PathBuf> {
        match explicit {
            Some(path) => vec![path.to_path_buf()],
            None => self.default_candidates(),
        }
    }
}

/// An open handle to a shared library, closed on drop.
pub struct DynamicLibrary {
    handle: *mut c_void,
    path: PathBuf,
}

impl DynamicLibrary {
    /// Opens the first candidate that the dynamic loader accepts.
    pub fn open<P>(candidates: &[P]) -> Result<DynamicLibrary, Error>
    where
        P: AsRef<Path>,
    {
        for candidate in candidates {
            let path = candidate.as_ref();
            let c_path = match CString::new(path.to_string_lossy().into_owned()) {
                Ok(c_path) => c_path,
                Err(_) => continue,
            };

            unsafe {
                let handle = dlopen(c_path.as_ptr(), RTLD_LAZY | RTLD_LOCAL);
                if !handle.is_null() {
                    info!("Loaded {}", path.display());
                    return Ok(DynamicLibrary {
                        handle,
                        path: path.to_path_buf(),
                    });
                }
                debug!("Couldn't load {}: {}", path.display(), last_loader_error());
            }
        }

        Err(Error::LibraryNotFound)
    }

    /// Looks up `symbol_name`, returning null if the library doesn't export it.
    pub fn symbol(&self, symbol_name: &str) -> *const c_void {
        let symbol_name = match CString::new(symbol_name) {
            Ok(symbol_name) => symbol_name,
            Err(_) => return std::ptr::null(),
        };
        unsafe { dlsym(self.handle, symbol_name.as_ptr()) as *const c_void }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DynamicLibrary {
    fn drop(&mut self) {
        unsafe {
            dlclose(self.handle);
        }
    }
}

unsafe fn last_loader_error() -> String {
    let message = dlerror();
    if message.is_null() {
        return "unknown error".to_owned();
    }
    CStr::from_ptr(message).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::{DynamicLibrary, LibraryKind};
    use crate::Error;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_explicit_path_replaces_defaults() {
        let explicit = Path::new("/opt/angle/libEGL.dylib");
        assert_eq!(
            LibraryKind::Egl.candidates(Some(explicit)),
            vec![PathBuf::from("/opt/angle/libEGL.dylib")]
        );
        assert_eq!(
            LibraryKind::Gles.candidates(None),
            LibraryKind::Gles.default_candidates()
        );
    }

    #[test]
    fn test_default_candidates_name_the_right_library() {
        for path in LibraryKind::Egl.default_candidates() {
            assert!(path.to_string_lossy().contains("libEGL"));
        }
        for path in LibraryKind::Gles.default_candidates() {
            assert!(path.to_string_lossy().contains("libGLESv2"));
        }
    }

    #[test]
    fn test_missing_library_is_reported() {
        let candidates = ["/nonexistent/libEGL-missing.so", "also-not-a-library.dylib"];
        match DynamicLibrary::open(&candidates) {
            Err(Error::LibraryNotFound) => {}
            Err(err) => panic!("unexpected error: {:?}", err),
            Ok(library) => panic!("{} should not exist", library.path().display()),
        }
    }

    #[test]
    fn test_no_candidates() {
        let candidates: [&str; 0] = [];
        assert!(matches!(
            DynamicLibrary::open(&candidates),
            Err(Error::LibraryNotFound)
        ));
    }
}
