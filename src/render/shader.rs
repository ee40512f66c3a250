//! Shader programs.
//!
//! A shader is a WGSL module exposing a `vs_main` vertex entry point and an
//! `fs_main` fragment entry point, compiled against one [`InputLayout`].
//! Uniform groups follow the bind slots in [`crate::render::constants`].

use std::path::Path;

use crate::errors::{LanternError, Result};
use crate::render::backend::{RenderBackend, ShaderId};
use crate::render::vertex::InputLayout;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// The shaders shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinShader {
    /// Unlit, per-vertex colour.
    VertexColor,
    /// Unlit colour for gizmos placed relative to the light.
    LightGeometry,
    /// Per-vertex colour with diffuse lighting.
    SimpleLit,
    /// Diffuse lighting modulated by a texture.
    Textured,
}

impl BuiltinShader {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            BuiltinShader::VertexColor => "combined",
            BuiltinShader::LightGeometry => "light_geometry",
            BuiltinShader::SimpleLit => "simple_lit",
            BuiltinShader::Textured => "textured",
        }
    }

    #[must_use]
    pub fn layout(self) -> InputLayout {
        match self {
            BuiltinShader::VertexColor | BuiltinShader::LightGeometry => InputLayout::VertexColor,
            BuiltinShader::SimpleLit => InputLayout::VertexColorNormal,
            BuiltinShader::Textured => InputLayout::VertexColorNormalUv,
        }
    }

    #[must_use]
    pub fn source(self) -> &'static str {
        match self {
            BuiltinShader::VertexColor => include_str!("shaders/combined.wgsl"),
            BuiltinShader::LightGeometry => include_str!("shaders/light_geometry.wgsl"),
            BuiltinShader::SimpleLit => include_str!("shaders/simple_lit.wgsl"),
            BuiltinShader::Textured => include_str!("shaders/textured.wgsl"),
        }
    }
}

/// Everything needed to compile a shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderDesc {
    pub label: String,
    pub source: String,
    pub layout: InputLayout,
}

impl ShaderDesc {
    pub fn new(label: impl Into<String>, source: impl Into<String>, layout: InputLayout) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
            layout,
        }
    }

    #[must_use]
    pub fn builtin(shader: BuiltinShader) -> Self {
        Self::new(shader.label(), shader.source(), shader.layout())
    }

    /// Reads WGSL source from disk. The label is the file stem.
    pub fn from_file(path: impl AsRef<Path>, layout: InputLayout) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| LanternError::AssetLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let label = path
            .file_stem()
            .map_or_else(|| "shader".to_string(), |s| s.to_string_lossy().into_owned());
        Ok(Self::new(label, source, layout))
    }

    /// Checks that both entry points are declared.
    pub fn validate(&self) -> Result<()> {
        for entry in [VERTEX_ENTRY, FRAGMENT_ENTRY] {
            if !self.source.contains(&format!("fn {entry}")) {
                return Err(LanternError::ShaderCompilation {
                    label: self.label.clone(),
                    reason: format!("missing entry point `{entry}`"),
                });
            }
        }
        Ok(())
    }
}

/// A compiled shader owned by the application.
///
/// Scene nodes refer to shaders through the resource registry, never
/// directly. After [`cleanup`](Self::cleanup) the shader is no longer ready
/// and nodes using it skip their draw.
#[derive(Debug)]
pub struct Shader {
    label: String,
    layout: InputLayout,
    id: Option<ShaderId>,
}

impl Shader {
    pub fn compile(backend: &mut dyn RenderBackend, desc: &ShaderDesc) -> Result<Self> {
        let id = backend.create_shader(desc)?;
        log::debug!("Compiled shader '{}' ({:?})", desc.label, desc.layout);
        Ok(Self {
            label: desc.label.clone(),
            layout: desc.layout,
            id: Some(id),
        })
    }

    pub fn builtin(backend: &mut dyn RenderBackend, shader: BuiltinShader) -> Result<Self> {
        Self::compile(backend, &ShaderDesc::builtin(shader))
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> InputLayout {
        self.layout
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<ShaderId> {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.id.is_some()
    }

    pub fn cleanup(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(id) = self.id.take() {
            log::debug!("Releasing shader '{}'", self.label);
            backend.release_shader(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sources_declare_entry_points() {
        for shader in [
            BuiltinShader::VertexColor,
            BuiltinShader::LightGeometry,
            BuiltinShader::SimpleLit,
            BuiltinShader::Textured,
        ] {
            assert!(ShaderDesc::builtin(shader).validate().is_ok(), "{shader:?}");
        }
    }

    #[test]
    fn missing_fragment_entry_is_rejected() {
        let desc = ShaderDesc::new("broken", "fn vs_main() {}", InputLayout::VertexColor);
        assert!(matches!(
            desc.validate(),
            Err(LanternError::ShaderCompilation { .. })
        ));
    }
}
