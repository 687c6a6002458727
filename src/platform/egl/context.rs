// angleview/src/platform/egl/context.rs
//
//! Config selection and OpenGL ES context management.

use super::device::Device;
use super::error::ToWindowingApiError;
use super::surface::Surface;
use crate::context::ContextID;
use crate::egl;
use crate::egl::types::{EGLConfig, EGLContext, EGLint};
use crate::{ContextAttributeFlags, ContextAttributes, Error, GLVersion};

use std::fmt::{self, Debug, Formatter};
use std::ptr;
use std::thread;

const RGB_CHANNEL_BIT_DEPTH: EGLint = 8;

/// Everything needed to create a context: the chosen config and the requested version.
#[derive(Clone, Debug)]
pub struct ContextDescriptor {
    pub(crate) egl_config_id: EGLint,
    pub(crate) version: GLVersion,
}

/// An OpenGL ES context.
///
/// Contexts must be destroyed with `Device::destroy_context()`, or a panic will occur.
pub struct Context {
    pub(crate) egl_context: EGLContext,
    pub(crate) id: ContextID,
    pub(crate) egl_config_id: EGLint,
    pub(crate) version: GLVersion,
    pub(crate) destroyed: bool,
}

impl Debug for Context {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "Context({:?})", self.id)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if !self.destroyed && !thread::panicking() {
            panic!("Should have destroyed the context first with `destroy_context()`!")
        }
    }
}

impl Context {
    #[inline]
    pub fn id(&self) -> ContextID {
        self.id
    }

    /// The OpenGL ES version this context was created with.
    #[inline]
    pub fn version(&self) -> GLVersion {
        self.version
    }
}

/// Config attributes that every candidate must match exactly.
pub(crate) fn required_config_attributes() -> [EGLint; 6] {
    [
        egl::RED_SIZE as EGLint,    RGB_CHANNEL_BIT_DEPTH,
        egl::GREEN_SIZE as EGLint,  RGB_CHANNEL_BIT_DEPTH,
        egl::BLUE_SIZE as EGLint,   RGB_CHANNEL_BIT_DEPTH,
    ]
}

/// The `EGL_NONE`-terminated attribute list passed to `eglChooseConfig()`.
pub(crate) fn requested_config_attributes(attributes: &ContextAttributes) -> Vec<EGLint> {
    let flags = attributes.flags;
    let alpha_size   = if flags.contains(ContextAttributeFlags::ALPHA)   { 8  } else { 0 };
    let depth_size   = if flags.contains(ContextAttributeFlags::DEPTH)   { 24 } else { 0 };
    let stencil_size = if flags.contains(ContextAttributeFlags::STENCIL) { 8  } else { 0 };
    let renderable_type = if attributes.version.major >= 3 {
        egl::OPENGL_ES3_BIT
    } else {
        egl::OPENGL_ES2_BIT
    };

    let mut requested_config_attributes = required_config_attributes().to_vec();
    requested_config_attributes.extend_from_slice(&[
        egl::ALPHA_SIZE as EGLint,      alpha_size,
        egl::DEPTH_SIZE as EGLint,      depth_size,
        egl::STENCIL_SIZE as EGLint,    stencil_size,
        egl::SURFACE_TYPE as EGLint,    egl::WINDOW_BIT as EGLint,
        egl::RENDERABLE_TYPE as EGLint, renderable_type as EGLint,
        egl::NONE as EGLint,
    ]);
    requested_config_attributes
}

/// The `EGL_NONE`-terminated attribute list passed to `eglCreateContext()`.
pub(crate) fn context_attributes(version: GLVersion) -> [EGLint; 5] {
    [
        egl::CONTEXT_MAJOR_VERSION as EGLint, version.major as EGLint,
        egl::CONTEXT_MINOR_VERSION as EGLint, version.minor as EGLint,
        egl::NONE as EGLint,
    ]
}

impl Device {
    /// Chooses a framebuffer config matching `attributes`.
    pub fn create_context_descriptor(
        &self,
        attributes: &ContextAttributes,
    ) -> Result<ContextDescriptor, Error> {
        let required_config_attributes = required_config_attributes();
        let requested_config_attributes = requested_config_attributes(attributes);

        unsafe {
            // See how many applicable configs there are.
            let mut config_count = 0;
            let result = self.egl.ChooseConfig(
                self.egl_display,
                requested_config_attributes.as_ptr(),
                ptr::null_mut(),
                0,
                &mut config_count,
            );
            if result == egl::FALSE {
                let err = self.egl.GetError().to_windowing_api_error();
                return Err(Error::PixelFormatSelectionFailed(err));
            }
            if config_count == 0 {
                return Err(Error::NoPixelFormatFound);
            }

            // Enumerate all those configs.
            let mut configs = vec![ptr::null(); config_count as usize];
            let mut real_config_count = config_count;
            let result = self.egl.ChooseConfig(
                self.egl_display,
                requested_config_attributes.as_ptr(),
                configs.as_mut_ptr(),
                config_count,
                &mut real_config_count,
            );
            if result == egl::FALSE {
                let err = self.egl.GetError().to_windowing_api_error();
                return Err(Error::PixelFormatSelectionFailed(err));
            }
            configs.truncate(real_config_count.max(0) as usize);

            // Sanitize configs.
            let mut chosen_config = None;
            'configs: for egl_config in configs {
                for pair in required_config_attributes.chunks(2) {
                    if self.get_config_attr(egl_config, pair[0])? != pair[1] {
                        continue 'configs;
                    }
                }
                chosen_config = Some(egl_config);
                break;
            }
            let egl_config = match chosen_config {
                None => return Err(Error::NoPixelFormatFound),
                Some(egl_config) => egl_config,
            };

            let egl_config_id = self.get_config_attr(egl_config, egl::CONFIG_ID as EGLint)?;
            debug!("Chose EGL config {} for {:?}", egl_config_id, attributes);
            Ok(ContextDescriptor {
                egl_config_id,
                version: attributes.version,
            })
        }
    }

    /// Returns the attributes that the descriptor's config actually provides.
    pub fn context_descriptor_attributes(
        &self,
        descriptor: &ContextDescriptor,
    ) -> Result<ContextAttributes, Error> {
        unsafe {
            let egl_config = self.egl_config_from_id(descriptor.egl_config_id)?;

            let alpha_size = self.get_config_attr(egl_config, egl::ALPHA_SIZE as EGLint)?;
            let depth_size = self.get_config_attr(egl_config, egl::DEPTH_SIZE as EGLint)?;
            let stencil_size = self.get_config_attr(egl_config, egl::STENCIL_SIZE as EGLint)?;

            let mut attribute_flags = ContextAttributeFlags::empty();
            attribute_flags.set(ContextAttributeFlags::ALPHA, alpha_size != 0);
            attribute_flags.set(ContextAttributeFlags::DEPTH, depth_size != 0);
            attribute_flags.set(ContextAttributeFlags::STENCIL, stencil_size != 0);

            Ok(ContextAttributes {
                flags: attribute_flags,
                version: descriptor.version,
            })
        }
    }

    /// Creates a context from the config and version in `descriptor`.
    pub fn create_context(&self, descriptor: &ContextDescriptor) -> Result<Context, Error> {
        let egl_context_attributes = context_attributes(descriptor.version);

        unsafe {
            let egl_config = self.egl_config_from_id(descriptor.egl_config_id)?;
            let egl_context = self.egl.CreateContext(
                self.egl_display,
                egl_config,
                egl::NO_CONTEXT,
                egl_context_attributes.as_ptr(),
            );
            if egl_context == egl::NO_CONTEXT {
                let err = self.egl.GetError().to_windowing_api_error();
                return Err(Error::ContextCreationFailed(err));
            }

            let context = Context {
                egl_context,
                id: ContextID::next(),
                egl_config_id: descriptor.egl_config_id,
                version: descriptor.version,
                destroyed: false,
            };
            info!(
                "Created OpenGL ES {} context {:?}",
                descriptor.version, context.id
            );
            Ok(context)
        }
    }

    /// Binds `context` to the calling thread, drawing to and reading from `surface`.
    pub fn make_context_current(&self, context: &Context, surface: &Surface) -> Result<(), Error> {
        if surface.context_id != context.id {
            return Err(Error::IncompatibleSurface);
        }

        unsafe {
            let result = self.egl.MakeCurrent(
                self.egl_display,
                surface.egl_surface,
                surface.egl_surface,
                context.egl_context,
            );
            if result == egl::FALSE {
                let err = self.egl.GetError().to_windowing_api_error();
                return Err(Error::MakeCurrentFailed(err));
            }
            Ok(())
        }
    }

    /// Releases whatever context is current on the calling thread.
    pub fn make_no_context_current(&self) -> Result<(), Error> {
        unsafe {
            let result = self.egl.MakeCurrent(
                self.egl_display,
                egl::NO_SURFACE,
                egl::NO_SURFACE,
                egl::NO_CONTEXT,
            );
            if result == egl::FALSE {
                let err = self.egl.GetError().to_windowing_api_error();
                return Err(Error::MakeCurrentFailed(err));
            }
            Ok(())
        }
    }

    /// Sets the minimum number of vertical refreshes between buffer swaps for the current
    /// surface.
    pub fn set_swap_interval(&self, interval: i32) -> Result<(), Error> {
        unsafe {
            let result = self.egl.SwapInterval(self.egl_display, interval);
            if result == egl::FALSE {
                let err = self.egl.GetError().to_windowing_api_error();
                return Err(Error::SwapIntervalFailed(err));
            }
            Ok(())
        }
    }

    /// Destroys `context`. Its surface must already have been destroyed.
    pub fn destroy_context(&self, context: &mut Context) -> Result<(), Error> {
        if context.destroyed {
            return Ok(());
        }

        unsafe {
            if let Err(err) = self.make_no_context_current() {
                warn!("Couldn't release the current context before destroying it: {}", err);
            }
            let result = self.egl.DestroyContext(self.egl_display, context.egl_context);
            context.egl_context = egl::NO_CONTEXT;
            context.destroyed = true;
            if result == egl::FALSE {
                let err = self.egl.GetError().to_windowing_api_error();
                return Err(Error::ContextDestructionFailed(err));
            }
            Ok(())
        }
    }

    pub(crate) unsafe fn egl_config_from_id(
        &self,
        egl_config_id: EGLint,
    ) -> Result<EGLConfig, Error> {
        let config_attributes = [
            egl::CONFIG_ID as EGLint,   egl_config_id,
            egl::NONE as EGLint,        0,
            0,                          0,
        ];

        let (mut config, mut config_count) = (ptr::null(), 0);
        let result = self.egl.ChooseConfig(
            self.egl_display,
            config_attributes.as_ptr(),
            &mut config,
            1,
            &mut config_count,
        );
        if result == egl::FALSE {
            let err = self.egl.GetError().to_windowing_api_error();
            return Err(Error::PixelFormatSelectionFailed(err));
        }
        if config_count == 0 {
            return Err(Error::NoPixelFormatFound);
        }
        Ok(config)
    }

    pub(crate) unsafe fn get_config_attr(
        &self,
        egl_config: EGLConfig,
        attr: EGLint,
    ) -> Result<EGLint, Error> {
        let mut value = 0;
        let result = self.egl.GetConfigAttrib(self.egl_display, egl_config, attr, &mut value);
        if result == egl::FALSE {
            let err = self.egl.GetError().to_windowing_api_error();
            return Err(Error::PixelFormatSelectionFailed(err));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{context_attributes, requested_config_attributes, required_config_attributes};
    use crate::egl;
    use crate::egl::types::EGLint;
    use crate::{ContextAttributeFlags, ContextAttributes, GLVersion};

    fn lookup(list: &[EGLint], attribute: u32) -> Option<EGLint> {
        list.chunks(2)
            .find(|pair| pair[0] == attribute as EGLint)
            .and_then(|pair| pair.get(1).copied())
    }

    #[test]
    fn test_default_config_matches_rgb888_depth24() {
        let list = requested_config_attributes(&ContextAttributes::default());
        assert_eq!(lookup(&list, egl::RED_SIZE), Some(8));
        assert_eq!(lookup(&list, egl::GREEN_SIZE), Some(8));
        assert_eq!(lookup(&list, egl::BLUE_SIZE), Some(8));
        assert_eq!(lookup(&list, egl::DEPTH_SIZE), Some(24));
        assert_eq!(lookup(&list, egl::ALPHA_SIZE), Some(0));
        assert_eq!(lookup(&list, egl::STENCIL_SIZE), Some(0));
        assert_eq!(lookup(&list, egl::SURFACE_TYPE), Some(egl::WINDOW_BIT as EGLint));
        assert_eq!(
            lookup(&list, egl::RENDERABLE_TYPE),
            Some(egl::OPENGL_ES2_BIT as EGLint)
        );
        assert_eq!(list.last(), Some(&(egl::NONE as EGLint)));
    }

    #[test]
    fn test_config_flags_and_es3() {
        let attributes = ContextAttributes {
            version: GLVersion::new(3, 0),
            flags: ContextAttributeFlags::all(),
        };
        let list = requested_config_attributes(&attributes);
        assert_eq!(lookup(&list, egl::ALPHA_SIZE), Some(8));
        assert_eq!(lookup(&list, egl::STENCIL_SIZE), Some(8));
        assert_eq!(
            lookup(&list, egl::RENDERABLE_TYPE),
            Some(egl::OPENGL_ES3_BIT as EGLint)
        );
    }

    #[test]
    fn test_required_attributes_are_a_prefix() {
        let requested = requested_config_attributes(&ContextAttributes::default());
        let required = required_config_attributes();
        assert_eq!(&requested[..required.len()], &required[..]);
    }

    #[test]
    fn test_context_attributes() {
        let list = context_attributes(GLVersion::new(2, 0));
        assert_eq!(lookup(&list, egl::CONTEXT_MAJOR_VERSION), Some(2));
        assert_eq!(lookup(&list, egl::CONTEXT_MINOR_VERSION), Some(0));
        assert_eq!(list[4], egl::NONE as EGLint);
    }
}
