//! Shader program dispatch and use-program cache.

use crate::context::Capabilities;
use crate::extension::Extension;
use crate::gl;
use crate::gl::types::*;
use crate::state::Cached;
use crate::version::{Api, Version};

pub struct ShaderProgramState {
  uniform1i_implementation: unsafe fn(&mut ShaderProgramState, &gl::Gl, GLuint, GLint, GLint),
  release_compiler_implementation: unsafe fn(&gl::Gl),

  current_program: Cached<GLuint>,
}

impl ShaderProgramState {
  pub(crate) fn new(caps: &Capabilities) -> ShaderProgramState {
    let version = caps.version();
    // Program-targeted uniform uploads avoid disturbing the use-program
    // state; they came in with separate shader objects.
    let separate = version >= Version::GL410
      || version >= Version::GLES310
      || caps.is_extension_supported(Extension::ArbSeparateShaderObjects)
      || caps.is_extension_supported(Extension::ExtSeparateShaderObjects);

    let uniform1i_implementation: unsafe fn(&mut ShaderProgramState, &gl::Gl, GLuint, GLint, GLint) =
      if separate { uniform1i_separate } else { uniform1i_default };

    // The compiler-release hint only exists on ES and GL 4.1+.
    let release_compiler_implementation: unsafe fn(&gl::Gl) =
      if version >= Version::GL410 || version.api() == Api::Gles {
        release_compiler_default
      } else {
        release_compiler_noop
      };

    ShaderProgramState {
      uniform1i_implementation,
      release_compiler_implementation,
      current_program: Cached::unknown(),
    }
  }

  /// Install `program`, skipping the driver call when the cache already
  /// agrees. Returns whether a driver call was issued.
  pub unsafe fn use_program(&mut self, gl: &gl::Gl, program: GLuint) -> bool {
    if self.current_program.is_invalid(&program) {
      gl.UseProgram(program);
      self.current_program.set(program);
      true
    } else {
      false
    }
  }

  /// Upload an integer uniform into `program` through the fastest path; the
  /// fallback installs the program first.
  pub unsafe fn set_uniform_1i(
    &mut self,
    gl: &gl::Gl,
    program: GLuint,
    location: GLint,
    value: GLint,
  ) {
    let implementation = self.uniform1i_implementation;
    implementation(self, gl, program, location, value)
  }

  /// Hint that no new programs will be compiled for a while. No-op where the
  /// hint does not exist.
  pub unsafe fn release_compiler(&self, gl: &gl::Gl) {
    let implementation = self.release_compiler_implementation;
    implementation(gl)
  }

  /// Forget the cached program; the next use is forced through.
  pub fn reset(&mut self) {
    self.current_program.invalidate();
  }
}

unsafe fn uniform1i_separate(
  _: &mut ShaderProgramState,
  gl: &gl::Gl,
  program: GLuint,
  location: GLint,
  value: GLint,
) {
  gl.ProgramUniform1i(program, location, value);
}

unsafe fn uniform1i_default(
  state: &mut ShaderProgramState,
  gl: &gl::Gl,
  program: GLuint,
  location: GLint,
  value: GLint,
) {
  state.use_program(gl, program);
  gl.Uniform1i(location, value);
}

unsafe fn release_compiler_default(gl: &gl::Gl) {
  gl.ReleaseShaderCompiler();
}

unsafe fn release_compiler_noop(_: &gl::Gl) {}
