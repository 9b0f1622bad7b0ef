//! Structural event stream of the scene graph.
//!
//! Every observer gets its own queue; events are drained by consumers (the
//! renderer drains at the start of each frame and on demand). Detach events
//! carry the surfaces of the detached subtree collected at emit time, so
//! consumers never have to enumerate a subtree that may since have been
//! destroyed.

use bitflags::bitflags;

use crate::scene::graph::{NodeHandle, SurfaceHandle};

bitflags! {
    /// Which aspect of a surface changed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SurfaceChange: u8 {
        const GEOMETRY = 1;
        const MATERIAL = 1 << 1;
        const EFFECT = 1 << 2;
    }
}

/// A component attached to or removed from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Surface(SurfaceHandle),
    SceneManagerTag,
}

/// A scene-graph mutation, as observed through [`crate::SceneGraph::subscribe`].
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// `node` (and its subtree) was attached under `parent`.
    NodeAttached {
        node: NodeHandle,
        parent: NodeHandle,
    },
    /// `node` (and its subtree) left `parent`. `parent` is `None` when a
    /// root node was destroyed outright. `surfaces` lists every surface
    /// that was in the subtree when the event fired.
    NodeDetached {
        node: NodeHandle,
        parent: Option<NodeHandle>,
        surfaces: Vec<SurfaceHandle>,
    },
    ComponentAdded {
        node: NodeHandle,
        component: Component,
    },
    ComponentRemoved {
        node: NodeHandle,
        component: Component,
    },
    /// A surface's geometry, material or effect changed.
    SurfaceChanged {
        surface: SurfaceHandle,
        change: SurfaceChange,
    },
}
