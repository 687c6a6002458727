// angleview/src/renderer.rs
//
//! Brings up EGL over a native widget and redraws the triangle on demand.

use crate::frame::FrameClock;
use crate::gl_utils::check_gl_error;
use crate::library::{DynamicLibrary, LibraryKind};
use crate::platform::egl::context::Context;
use crate::platform::egl::device::{AngleBackend, Device};
use crate::platform::egl::surface::{NativeWidget, Surface};
use crate::scene::{Scene, VertexUpload};
use crate::{ContextAttributes, Error};

use euclid::default::Size2D;
use glow::HasContext;
use std::fmt::{self, Debug, Formatter};
use std::path::PathBuf;

/// Everything that influences how the renderer is brought up.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// An explicit path to `libEGL`. The platform's default locations are searched otherwise.
    pub egl_library: Option<PathBuf>,
    /// An explicit path to `libGLESv2`, consulted for symbols `eglGetProcAddress()` lacks.
    pub gles_library: Option<PathBuf>,
    pub backend: AngleBackend,
    pub attributes: ContextAttributes,
    pub swap_interval: i32,
    pub upload: VertexUpload,
    /// RGBA.
    pub clear_color: [f32; 4],
}

impl Default for RenderOptions {
    fn default() -> RenderOptions {
        RenderOptions {
            egl_library: None,
            gles_library: None,
            backend: AngleBackend::Default,
            attributes: ContextAttributes::default(),
            swap_interval: 0,
            upload: VertexUpload::BufferObject,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// An EGL context and window surface, current on the thread that created them, plus the scene
/// drawn into them.
///
/// Dropping the renderer tears everything down in reverse order of creation.
pub struct Renderer {
    scene: Option<Scene>,
    gl: glow::Context,
    surface: Surface,
    context: Context,
    device: Device,
    gles_library: Option<DynamicLibrary>,
    clear_color: [f32; 4],
    frame_clock: FrameClock,
}

impl Debug for Renderer {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(
            formatter,
            "Renderer({:?}, {:?}, {:?})",
            self.device, self.context, self.surface
        )
    }
}

impl Renderer {
    /// Runs the EGL bootstrap against `native_widget`.
    ///
    /// On return the context is current on the calling thread. On failure, whatever was already
    /// created is destroyed again before the error is returned.
    pub fn new(native_widget: &NativeWidget, options: &RenderOptions) -> Result<Renderer, Error> {
        let egl_candidates = LibraryKind::Egl.candidates(options.egl_library.as_deref());
        let egl_library = DynamicLibrary::open(&egl_candidates)?;
        let device = Device::new(egl_library, options.backend)?;

        let context_descriptor = device.create_context_descriptor(&options.attributes)?;
        let mut context = device.create_context(&context_descriptor)?;

        let mut surface = match device.create_surface(&context, native_widget) {
            Ok(surface) => surface,
            Err(err) => {
                abandon(&device, &mut context, None);
                return Err(err);
            }
        };

        let bound = device
            .make_context_current(&context, &surface)
            .and_then(|()| device.set_swap_interval(options.swap_interval));
        if let Err(err) = bound {
            abandon(&device, &mut context, Some(&mut surface));
            return Err(err);
        }

        let gles_candidates = LibraryKind::Gles.candidates(options.gles_library.as_deref());
        let gles_library = match DynamicLibrary::open(&gles_candidates) {
            Ok(gles_library) => Some(gles_library),
            Err(_) => {
                warn!("No libGLESv2 found; resolving GL functions through EGL only");
                None
            }
        };

        let gl = unsafe { device.load_gl(gles_library.as_ref()) };
        let scene = match unsafe { Scene::new(&gl, options.upload, context.version()) } {
            Ok(scene) => scene,
            Err(err) => {
                abandon(&device, &mut context, Some(&mut surface));
                return Err(err);
            }
        };

        unsafe {
            info!(
                "OpenGL ES context ready: {} ({})",
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER)
            );
        }

        Ok(Renderer {
            scene: Some(scene),
            gl,
            surface,
            context,
            device,
            gles_library,
            clear_color: options.clear_color,
            frame_clock: FrameClock::new(),
        })
    }

    /// Draws one frame covering `drawable_size` device pixels and presents it.
    ///
    /// An empty `drawable_size` means the layer hasn't been sized yet, in which case the
    /// surface's own size is used.
    pub fn render_frame(&mut self, drawable_size: Size2D<i32>) -> Result<(), Error> {
        let size = if drawable_size.is_empty() {
            self.device.surface_size(&self.surface)
        } else {
            drawable_size
        };

        unsafe {
            let gl = &self.gl;
            gl.viewport(0, 0, size.width, size.height);
            let [r, g, b, a] = self.clear_color;
            gl.clear_color(r, g, b, a);
            gl.clear(glow::COLOR_BUFFER_BIT);
            if let Some(ref scene) = self.scene {
                scene.draw(gl);
            }
        }

        self.device.present_surface(&self.context, &mut self.surface)?;
        self.frame_clock.tick();
        Ok(())
    }

    #[inline]
    pub fn frames_presented(&self) -> u64 {
        self.frame_clock.total_frames()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(err) = self.device.make_context_current(&self.context, &self.surface) {
            warn!("Couldn't make the context current for teardown: {}", err);
        }
        if let Some(scene) = self.scene.take() {
            unsafe {
                scene.destroy(&self.gl);
            }
            check_gl_error(&self.gl, "Scene teardown");
        }
        abandon(&self.device, &mut self.context, Some(&mut self.surface));
        // GL entry points resolved through `dlsym` stay valid until here.
        if let Some(gles_library) = self.gles_library.take() {
            debug!("Closing {}", gles_library.path().display());
        }
        debug!("Destroyed renderer after {} frames", self.frames_presented());
    }
}

// Destroys a partially or fully built surface/context pair. Errors are logged, not returned,
// since there is nothing left to recover.
fn abandon(device: &Device, context: &mut Context, surface: Option<&mut Surface>) {
    if let Some(surface) = surface {
        if let Err(err) = device.destroy_surface(surface) {
            warn!("Failed to destroy surface: {}", err);
        }
    }
    if let Err(err) = device.destroy_context(context) {
        warn!("Failed to destroy context: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::RenderOptions;
    use crate::platform::egl::device::AngleBackend;
    use crate::scene::VertexUpload;
    use crate::{ContextAttributeFlags, GLVersion};

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert_eq!(options.egl_library, None);
        assert_eq!(options.gles_library, None);
        assert_eq!(options.backend, AngleBackend::Default);
        assert_eq!(options.attributes.version, GLVersion::new(2, 0));
        assert_eq!(options.attributes.flags, ContextAttributeFlags::DEPTH);
        assert_eq!(options.swap_interval, 0);
        assert_eq!(options.upload, VertexUpload::BufferObject);
        assert_eq!(options.clear_color, [0.0, 0.0, 0.0, 1.0]);
    }
}
