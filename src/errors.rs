//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`LanternError`] covers the failure modes of:
//! - GPU initialization and resource creation
//! - Shader compilation and vertex layout validation
//! - Mesh and texture loading
//! - Scene graph structural misuse (unknown handles, cycles)
//! - Settings parsing and application startup
//!
//! Per-frame traversal never fails: a node whose renderable is gone simply
//! does not draw. Errors are reserved for construction time.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, LanternError>`.
//!
//! ```rust,ignore
//! use lantern::errors::{LanternError, Result};
//!
//! fn build() -> Result<()> {
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::scene::NodeHandle;

/// The main error type for Lantern.
#[derive(Error, Debug)]
pub enum LanternError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// The presentation surface could not be created or configured.
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// The backend refused to create a resource.
    #[error("Failed to create {kind} '{label}': {reason}")]
    ResourceCreation {
        /// Kind of resource (vertex buffer, texture, ...)
        kind: ResourceKind,
        /// Debug label of the resource
        label: String,
        /// Backend-specific reason
        reason: String,
    },

    /// A resource id did not resolve in the backend.
    #[error("{kind} not found in backend")]
    ResourceNotFound {
        /// Kind of resource that was looked up
        kind: ResourceKind,
    },

    // ========================================================================
    // Shader Errors
    // ========================================================================
    /// Shader source failed validation.
    #[error("Shader '{label}' failed to compile: {reason}")]
    ShaderCompilation {
        /// Shader label
        label: String,
        /// Why compilation failed
        reason: String,
    },

    /// Vertex data does not match the input layout expected by a shader.
    #[error("Vertex layout mismatch: expected stride {expected}, got {actual}")]
    LayoutMismatch {
        /// Stride required by the layout
        expected: u32,
        /// Stride supplied
        actual: u32,
    },

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// A mesh or texture could not be loaded.
    #[error("Failed to load asset '{path}': {reason}")]
    AssetLoad {
        /// Path of the asset
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// OBJ parsing error.
    #[error("OBJ load error: {0}")]
    ObjLoad(#[from] tobj::LoadError),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Scene Graph Errors
    // ========================================================================
    /// The node handle does not refer to a live node.
    #[error("Scene node {0:?} not found")]
    NodeNotFound(NodeHandle),

    /// Attaching the child would make a node its own ancestor.
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    HierarchyCycle {
        /// Intended parent
        parent: NodeHandle,
        /// Intended child
        child: NodeHandle,
    },

    /// The scene root cannot be removed or re-parented.
    #[error("The scene root cannot be removed or re-parented")]
    RootModification,

    // ========================================================================
    // Configuration & Application Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Event loop error (winit).
    #[cfg(feature = "winit")]
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    /// A startup stage failed; carries the stage for exit-code reporting.
    #[error("Startup failed during {stage}: {source}")]
    Startup {
        /// Stage that failed
        stage: StartupStage,
        /// Underlying error
        #[source]
        source: Box<LanternError>,
    },
}

impl LanternError {
    /// Wraps this error with the startup stage it happened in.
    #[must_use]
    pub fn at_stage(self, stage: StartupStage) -> Self {
        match self {
            // Keep the innermost stage.
            err @ LanternError::Startup { .. } => err,
            other => LanternError::Startup {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Process exit code for this error.
    ///
    /// Startup failures map to their stage's code; anything else is `1`.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            LanternError::Startup { stage, .. } => stage.exit_code(),
            _ => 1,
        }
    }
}

/// Kind of backend resource, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    VertexBuffer,
    IndexBuffer,
    ConstantBuffer,
    Texture,
    Shader,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::VertexBuffer => "vertex buffer",
            ResourceKind::IndexBuffer => "index buffer",
            ResourceKind::ConstantBuffer => "constant buffer",
            ResourceKind::Texture => "texture",
            ResourceKind::Shader => "shader",
        };
        f.write_str(name)
    }
}

/// Startup stages of the windowed application, in execution order.
///
/// Each stage exits the process with its own code when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartupStage {
    /// Event loop or window creation.
    Window,
    /// Adapter and device acquisition.
    Device,
    /// Surface configuration and depth buffer.
    RenderTarget,
    /// Shaders, global constant buffers and renderables.
    Resources,
    /// Scene construction.
    Scene,
}

impl StartupStage {
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            StartupStage::Window => 1,
            StartupStage::Device => 2,
            StartupStage::RenderTarget => 3,
            StartupStage::Resources => 4,
            StartupStage::Scene => 5,
        }
    }
}

impl fmt::Display for StartupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StartupStage::Window => "window creation",
            StartupStage::Device => "device creation",
            StartupStage::RenderTarget => "render target setup",
            StartupStage::Resources => "resource creation",
            StartupStage::Scene => "scene construction",
        };
        f.write_str(name)
    }
}

/// Alias for `Result<T, LanternError>`.
pub type Result<T> = std::result::Result<T, LanternError>;
