use smallvec::SmallVec;

use crate::scene::graph::{NodeHandle, SurfaceHandle};

/// A scene-graph node: hierarchy links plus attached component handles.
///
/// Surfaces live in the graph's component pool; nodes only carry handles.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: String,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
    pub(crate) surfaces: SmallVec<[SurfaceHandle; 2]>,
    /// Anchor for the scene-manager ancestor search.
    pub(crate) scene_manager: bool,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Handles of the surface components attached to this node.
    #[inline]
    #[must_use]
    pub fn surfaces(&self) -> &[SurfaceHandle] {
        &self.surfaces
    }

    #[inline]
    #[must_use]
    pub fn has_scene_manager(&self) -> bool {
        self.scene_manager
    }
}
