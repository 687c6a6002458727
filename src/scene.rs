// angleview/src/scene.rs
//
//! The fixed shader program and triangle drawn every frame.

use crate::gl_utils::{self, check_gl_error};
use crate::{Error, GLVersion};

use glow::HasContext;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Three vertices, three components each, in normalized device coordinates.
#[rustfmt::skip]
pub static TRIANGLE_VERTICES: [f32; 9] = [
     0.0,  0.5, 0.0,
    -0.5, -0.5, 0.0,
     0.5, -0.5, 0.0,
];

pub const COMPONENTS_PER_VERTEX: i32 = 3;
pub const VERTEX_COUNT: i32 = 3;

/// The attribute location `vPosition` is bound to before linking.
pub const POSITION_ATTRIBUTE: u32 = 0;

pub static VERTEX_SHADER_SOURCE: &str = "\
attribute vec4 vPosition;
void main()
{
    gl_Position = vPosition;
}
";

pub static FRAGMENT_SHADER_SOURCE: &str = "\
precision mediump float;
void main()
{
    gl_FragColor = vec4(1.0, 0.0, 0.0, 1.0);
}
";

/// How the triangle's vertices reach the GPU.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum VertexUpload {
    /// Uploaded once into a static buffer object at set-up.
    #[default]
    BufferObject,
    /// Uploaded again from client memory before every draw.
    PerFrame,
}

impl FromStr for VertexUpload {
    type Err = String;

    fn from_str(string: &str) -> Result<VertexUpload, String> {
        match &*string.to_ascii_lowercase() {
            "buffer" | "buffer-object" => Ok(VertexUpload::BufferObject),
            "per-frame" | "client" => Ok(VertexUpload::PerFrame),
            _ => Err(format!("unknown vertex upload strategy `{}`", string)),
        }
    }
}

impl Display for VertexUpload {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            VertexUpload::BufferObject => f.write_str("buffer"),
            VertexUpload::PerFrame => f.write_str("per-frame"),
        }
    }
}

/// The program, vertex buffer and (on OpenGL ES 3) vertex array for the triangle.
pub struct Scene {
    program: glow::Program,
    buffer: glow::Buffer,
    vertex_array: Option<glow::VertexArray>,
    upload: VertexUpload,
    vertex_bytes: Vec<u8>,
}

impl Scene {
    /// Compiles the shaders, links the program and sets up the vertex attribute.
    ///
    /// # Safety
    ///
    /// `gl` must belong to the context that is current on the calling thread, and that context
    /// must be at least `version`.
    pub unsafe fn new(
        gl: &glow::Context,
        upload: VertexUpload,
        version: GLVersion,
    ) -> Result<Scene, Error> {
        let vertex_shader =
            gl_utils::compile_shader(gl, glow::VERTEX_SHADER, VERTEX_SHADER_SOURCE)
                .map_err(Error::ShaderCompilationFailed)?;
        let fragment_shader =
            match gl_utils::compile_shader(gl, glow::FRAGMENT_SHADER, FRAGMENT_SHADER_SOURCE) {
                Ok(fragment_shader) => fragment_shader,
                Err(info_log) => {
                    gl.delete_shader(vertex_shader);
                    return Err(Error::ShaderCompilationFailed(info_log));
                }
            };

        let program = gl_utils::link_program(
            gl,
            &[vertex_shader, fragment_shader],
            &[(POSITION_ATTRIBUTE, "vPosition")],
        );
        gl.delete_shader(vertex_shader);
        gl.delete_shader(fragment_shader);
        let program = program.map_err(Error::ProgramLinkFailed)?;

        // Without vertex array objects the attribute state lives in the default vertex array.
        let vertex_array = if version.has_vertex_array_objects() {
            match gl.create_vertex_array() {
                Ok(vertex_array) => {
                    gl.bind_vertex_array(Some(vertex_array));
                    Some(vertex_array)
                }
                Err(message) => {
                    gl.delete_program(program);
                    return Err(Error::GLObjectCreationFailed(message));
                }
            }
        } else {
            None
        };

        let buffer = match gl.create_buffer() {
            Ok(buffer) => buffer,
            Err(message) => {
                if let Some(vertex_array) = vertex_array {
                    gl.delete_vertex_array(vertex_array);
                }
                gl.delete_program(program);
                return Err(Error::GLObjectCreationFailed(message));
            }
        };

        let vertex_bytes = gl_utils::f32_bytes(&TRIANGLE_VERTICES);
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
        if upload == VertexUpload::BufferObject {
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &vertex_bytes, glow::STATIC_DRAW);
        }
        gl.vertex_attrib_pointer_f32(
            POSITION_ATTRIBUTE,
            COMPONENTS_PER_VERTEX,
            glow::FLOAT,
            false,
            0,
            0,
        );
        gl.enable_vertex_attrib_array(POSITION_ATTRIBUTE);
        gl.use_program(Some(program));
        check_gl_error(gl, "Scene set-up");

        info!("Built triangle scene ({} vertex upload)", upload);
        Ok(Scene {
            program,
            buffer,
            vertex_array,
            upload,
            vertex_bytes,
        })
    }

    /// Issues the single draw call.
    ///
    /// # Safety
    ///
    /// The context the scene was built in must be current.
    pub unsafe fn draw(&self, gl: &glow::Context) {
        gl.use_program(Some(self.program));
        if let Some(vertex_array) = self.vertex_array {
            gl.bind_vertex_array(Some(vertex_array));
        }
        if self.upload == VertexUpload::PerFrame {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.buffer));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &self.vertex_bytes, glow::STREAM_DRAW);
        }
        gl.draw_arrays(glow::TRIANGLES, 0, VERTEX_COUNT);
    }

    /// Deletes the program, buffer and vertex array.
    ///
    /// # Safety
    ///
    /// The context the scene was built in must be current.
    pub unsafe fn destroy(self, gl: &glow::Context) {
        gl.use_program(None);
        if let Some(vertex_array) = self.vertex_array {
            gl.bind_vertex_array(None);
            gl.delete_vertex_array(vertex_array);
        }
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
        gl.delete_buffer(self.buffer);
        gl.delete_program(self.program);
    }
}

#[cfg(test)]
mod tests {
    use super::{VertexUpload, COMPONENTS_PER_VERTEX, TRIANGLE_VERTICES, VERTEX_COUNT};
    use super::{FRAGMENT_SHADER_SOURCE, VERTEX_SHADER_SOURCE};

    #[test]
    fn test_triangle_layout() {
        assert_eq!(
            TRIANGLE_VERTICES.len(),
            (COMPONENTS_PER_VERTEX * VERTEX_COUNT) as usize
        );
        // Every vertex lies in the z = 0 plane inside clip space.
        for vertex in TRIANGLE_VERTICES.chunks(3) {
            assert!(vertex[0].abs() <= 1.0 && vertex[1].abs() <= 1.0);
            assert_eq!(vertex[2], 0.0);
        }
    }

    #[test]
    fn test_shaders_target_glsl_es_100() {
        assert!(VERTEX_SHADER_SOURCE.contains("attribute vec4 vPosition;"));
        assert!(!VERTEX_SHADER_SOURCE.contains("#version"));
        assert!(FRAGMENT_SHADER_SOURCE.starts_with("precision mediump float;"));
        assert!(FRAGMENT_SHADER_SOURCE.contains("vec4(1.0, 0.0, 0.0, 1.0)"));
    }

    #[test]
    fn test_vertex_upload_parsing() {
        assert_eq!(VertexUpload::default(), VertexUpload::BufferObject);
        assert_eq!("buffer".parse::<VertexUpload>(), Ok(VertexUpload::BufferObject));
        assert_eq!("per-frame".parse::<VertexUpload>(), Ok(VertexUpload::PerFrame));
        assert_eq!("client".parse::<VertexUpload>(), Ok(VertexUpload::PerFrame));
        assert!("mapped".parse::<VertexUpload>().is_err());
        for upload in [VertexUpload::BufferObject, VertexUpload::PerFrame] {
            assert_eq!(upload.to_string().parse::<VertexUpload>(), Ok(upload));
        }
    }
}
