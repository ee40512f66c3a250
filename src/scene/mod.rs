//! Scene graph
//!
//! - [`SceneNode`]: a node with a local transform, cached world transform and
//!   an optional renderable attachment
//! - [`Transform`]: component/explicit-matrix local transform
//! - [`SceneGraph`]: arena owning the nodes, with update and draw traversals
//! - [`transform_system`]: the propagation pass, decoupled from the graph

pub mod graph;
pub mod node;
pub mod transform;
pub mod transform_system;

pub use graph::{DrawStats, SceneGraph};
pub use node::{Attachment, SceneNode};
pub use transform::{LocalMode, Transform};

use slotmap::new_key_type;

new_key_type! {
    /// Handle of a node in a [`SceneGraph`].
    pub struct NodeHandle;
}
