//! Scene graph: node arena, surface component pool, structural events.

use slotmap::{SlotMap, new_key_type};

use crate::resources::{Assets, BindingValue, EffectHandle, GeometryHandle, MaterialHandle};
use crate::scene::events::{Component, SceneEvent, SurfaceChange};
use crate::scene::node::Node;
use crate::scene::surface::Surface;

new_key_type! {
    pub struct NodeHandle;
    pub struct SurfaceHandle;
    /// Identifies one subscription to the graph's event stream.
    pub struct ObserverHandle;
}

/// Hierarchical scene graph.
///
/// Nodes live in a slotmap arena and reference each other by handle, so
/// consumers (renderers, trackers) never hold owning references into the
/// tree. Structural mutations are broadcast to every subscribed observer
/// over an unbounded channel.
pub struct SceneGraph {
    nodes: SlotMap<NodeHandle, Node>,
    surfaces: SlotMap<SurfaceHandle, Surface>,
    root_nodes: Vec<NodeHandle>,
    observers: SlotMap<ObserverHandle, flume::Sender<SceneEvent>>,
    assets: Assets,
}

impl SceneGraph {
    #[must_use]
    pub fn new(assets: Assets) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            surfaces: SlotMap::with_key(),
            root_nodes: Vec::new(),
            observers: SlotMap::with_key(),
            assets,
        }
    }

    #[must_use]
    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut Assets {
        &mut self.assets
    }

    // ========================================================================
    // Nodes & hierarchy
    // ========================================================================

    /// Creates a root node.
    pub fn create_node(&mut self) -> NodeHandle {
        self.create_node_with_name("Node")
    }

    /// Creates a root node with a name.
    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.nodes.insert(Node::new(name));
        self.root_nodes.push(handle);
        handle
    }

    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[must_use]
    pub fn contains_node(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[must_use]
    pub fn root_nodes(&self) -> &[NodeHandle] {
        &self.root_nodes
    }

    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> Option<&str> {
        self.nodes.get(handle).map(|node| node.name.as_str())
    }

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if let Some(node) = self.nodes.get_mut(handle) {
            name.clone_into(&mut node.name);
        }
    }

    /// Attaches `child` (with its subtree) under `parent`.
    ///
    /// A child that already had a parent is detached first, which emits a
    /// `NodeDetached` before the `NodeAttached`. Attaching a node to itself
    /// or to one of its own descendants is a no-op.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("cannot attach a node to itself");
            return;
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            log::error!("attach with a dead node handle");
            return;
        }
        if self.is_in_subtree(parent, child) {
            log::warn!("cannot attach a node under its own descendant");
            return;
        }

        if self.nodes[child].parent.is_some() {
            self.detach(child);
        }
        self.root_nodes.retain(|&handle| handle != child);

        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        self.emit(SceneEvent::NodeAttached {
            node: child,
            parent,
        });
    }

    /// Detaches `child` from its parent; the subtree stays alive as a new
    /// root. Detaching a node that has no parent is a no-op.
    pub fn detach(&mut self, child: NodeHandle) {
        let Some(parent) = self.nodes.get(child).and_then(Node::parent) else {
            log::warn!("detach without a matching attach");
            return;
        };

        self.nodes[parent].children.retain(|&handle| handle != child);
        self.nodes[child].parent = None;
        self.root_nodes.push(child);

        let surfaces = self.collect_surfaces(child);
        self.emit(SceneEvent::NodeDetached {
            node: child,
            parent: Some(parent),
            surfaces,
        });
    }

    /// Destroys `node` and its whole subtree, including attached surfaces.
    pub fn remove_node(&mut self, node: NodeHandle) {
        let Some(parent) = self.nodes.get(node).map(Node::parent) else {
            log::warn!("remove_node with a dead node handle");
            return;
        };

        let surfaces = self.collect_surfaces(node);
        self.emit(SceneEvent::NodeDetached {
            node,
            parent,
            surfaces,
        });

        if let Some(parent) = parent {
            self.nodes[parent].children.retain(|&handle| handle != node);
        } else {
            self.root_nodes.retain(|&handle| handle != node);
        }
        self.destroy_subtree(node);
    }

    fn destroy_subtree(&mut self, node: NodeHandle) {
        let Some(removed) = self.nodes.remove(node) else {
            return;
        };
        for surface in removed.surfaces {
            self.surfaces.remove(surface);
        }
        for child in removed.children {
            self.destroy_subtree(child);
        }
    }

    /// Whether `node` is `root` or one of its descendants.
    #[must_use]
    pub fn is_in_subtree(&self, node: NodeHandle, root: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == root {
                return true;
            }
            current = self.nodes.get(handle).and_then(Node::parent);
        }
        false
    }

    /// All surface handles in the subtree rooted at `root`, in depth-first
    /// order.
    #[must_use]
    pub fn collect_surfaces(&self, root: NodeHandle) -> Vec<SurfaceHandle> {
        let mut out = Vec::new();
        self.collect_surfaces_into(root, &mut out);
        out
    }

    fn collect_surfaces_into(&self, node: NodeHandle, out: &mut Vec<SurfaceHandle>) {
        if let Some(node) = self.nodes.get(node) {
            out.extend(node.surfaces.iter().copied());
            for &child in &node.children {
                self.collect_surfaces_into(child, out);
            }
        }
    }

    // ========================================================================
    // Surface components
    // ========================================================================

    /// Attaches a surface component to `node`.
    pub fn add_surface(&mut self, node: NodeHandle, mut surface: Surface) -> Option<SurfaceHandle> {
        if !self.nodes.contains_key(node) {
            log::error!("add_surface with a dead node handle");
            return None;
        }
        surface.node = Some(node);
        let handle = self.surfaces.insert(surface);
        self.nodes[node].surfaces.push(handle);
        self.emit(SceneEvent::ComponentAdded {
            node,
            component: Component::Surface(handle),
        });
        Some(handle)
    }

    /// Removes a surface component from its node.
    pub fn remove_surface(&mut self, handle: SurfaceHandle) {
        let Some(surface) = self.surfaces.remove(handle) else {
            log::warn!("remove_surface with a dead surface handle");
            return;
        };
        let Some(node) = surface.node else {
            return;
        };
        if let Some(owner) = self.nodes.get_mut(node) {
            owner.surfaces.retain(|entry| *entry != handle);
        }
        self.emit(SceneEvent::ComponentRemoved {
            node,
            component: Component::Surface(handle),
        });
    }

    #[must_use]
    pub fn surface(&self, handle: SurfaceHandle) -> Option<&Surface> {
        self.surfaces.get(handle)
    }

    /// The node a surface is attached to.
    #[must_use]
    pub fn surface_node(&self, handle: SurfaceHandle) -> Option<NodeHandle> {
        self.surfaces.get(handle).and_then(Surface::node)
    }

    pub fn set_surface_geometry(&mut self, handle: SurfaceHandle, geometry: GeometryHandle) {
        if let Some(surface) = self.surfaces.get_mut(handle) {
            surface.geometry = geometry;
            self.emit(SceneEvent::SurfaceChanged {
                surface: handle,
                change: SurfaceChange::GEOMETRY,
            });
        }
    }

    pub fn set_surface_material(&mut self, handle: SurfaceHandle, material: MaterialHandle) {
        if let Some(surface) = self.surfaces.get_mut(handle) {
            surface.material = material;
            self.emit(SceneEvent::SurfaceChanged {
                surface: handle,
                change: SurfaceChange::MATERIAL,
            });
        }
    }

    pub fn set_surface_effect(&mut self, handle: SurfaceHandle, effect: Option<EffectHandle>) {
        if let Some(surface) = self.surfaces.get_mut(handle) {
            surface.effect = effect;
            self.emit(SceneEvent::SurfaceChanged {
                surface: handle,
                change: SurfaceChange::EFFECT,
            });
        }
    }

    /// Sets a surface-level data binding. Bindings affect technique
    /// resolution, so this reports as an effect-level change.
    pub fn set_surface_binding(&mut self, handle: SurfaceHandle, key: &str, value: BindingValue) {
        if let Some(surface) = self.surfaces.get_mut(handle) {
            surface.bindings.insert(key.to_string(), value);
            self.emit(SceneEvent::SurfaceChanged {
                surface: handle,
                change: SurfaceChange::EFFECT,
            });
        }
    }

    // ========================================================================
    // Scene-manager tag
    // ========================================================================

    /// Marks `node` as a scene-manager root (the anchor renderers search
    /// their ancestry for).
    pub fn tag_scene_manager(&mut self, node: NodeHandle) {
        if let Some(entry) = self.nodes.get_mut(node) {
            if entry.scene_manager {
                return;
            }
            entry.scene_manager = true;
            self.emit(SceneEvent::ComponentAdded {
                node,
                component: Component::SceneManagerTag,
            });
        }
    }

    pub fn untag_scene_manager(&mut self, node: NodeHandle) {
        if let Some(entry) = self.nodes.get_mut(node) {
            if !entry.scene_manager {
                return;
            }
            entry.scene_manager = false;
            self.emit(SceneEvent::ComponentRemoved {
                node,
                component: Component::SceneManagerTag,
            });
        }
    }

    // ========================================================================
    // Event stream
    // ========================================================================

    /// Subscribes to structural events. The receiver holds every event
    /// emitted after this call until drained.
    pub fn subscribe(&mut self) -> (ObserverHandle, flume::Receiver<SceneEvent>) {
        let (sender, receiver) = flume::unbounded();
        (self.observers.insert(sender), receiver)
    }

    /// Drops a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, handle: ObserverHandle) -> bool {
        self.observers.remove(handle).is_some()
    }

    #[must_use]
    pub fn num_observers(&self) -> usize {
        self.observers.len()
    }

    fn emit(&mut self, event: SceneEvent) {
        // Observers whose receiver was dropped are pruned here.
        self.observers
            .retain(|_, sender| sender.send(event.clone()).is_ok());
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(Assets::new())
    }
}
