// angleview/src/gl_utils.rs
//
//! Various OpenGL ES utilities used by the scene.

use glow::HasContext;

pub(crate) unsafe fn compile_shader(
    gl: &glow::Context,
    shader_type: u32,
    source: &str,
) -> Result<glow::Shader, String> {
    let shader = gl.create_shader(shader_type)?;

    gl.shader_source(shader, source);

    gl.compile_shader(shader);

    if gl.get_shader_compile_status(shader) {
        Ok(shader)
    } else {
        let info_log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        Err(info_log)
    }
}

/// Links `shaders` into a program, binding each `(location, name)` attribute first.
pub(crate) unsafe fn link_program(
    gl: &glow::Context,
    shaders: &[glow::Shader],
    attribute_locations: &[(u32, &str)],
) -> Result<glow::Program, String> {
    let program = gl.create_program()?;

    for &shader in shaders {
        gl.attach_shader(program, shader);
    }
    for &(location, name) in attribute_locations {
        gl.bind_attrib_location(program, location, name);
    }

    gl.link_program(program);

    for &shader in shaders {
        gl.detach_shader(program, shader);
    }

    if gl.get_program_link_status(program) {
        Ok(program)
    } else {
        let info_log = gl.get_program_info_log(program);
        gl.delete_program(program);
        Err(info_log)
    }
}

/// Logs and clears any pending OpenGL ES error.
pub(crate) fn check_gl_error(gl: &glow::Context, operation: &str) {
    unsafe {
        let error = gl.get_error();
        if error != glow::NO_ERROR {
            warn!("{} raised GL error 0x{:04x}", operation, error);
        }
    }
}

/// Reinterprets `floats` as native-endian bytes for a buffer upload.
pub(crate) fn f32_bytes(floats: &[f32]) -> Vec<u8> {
    floats.iter().flat_map(|value| value.to_ne_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::f32_bytes;

    #[test]
    fn test_f32_bytes() {
        let bytes = f32_bytes(&[1.0, -0.5]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1.0f32.to_ne_bytes());
        assert_eq!(&bytes[4..], &(-0.5f32).to_ne_bytes());
    }
}
