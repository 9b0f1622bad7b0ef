//! Frame coordination across renderers.

use slotmap::{SlotMap, new_key_type};

use crate::renderer::{RenderContext, Renderer};
use crate::scene::graph::{NodeHandle, SceneGraph};

new_key_type! {
    pub struct RendererKey;
}

/// Owns a set of renderers and drives them once per frame.
///
/// Renderers activate by finding this manager's tagged node among the
/// ancestors of one of their targets; a renderer that resolves no manager
/// (or a different one) stays inert and is skipped by [`Self::render_frame`].
/// Ordering between renderers is by descending priority, stable for ties.
pub struct SceneManager {
    renderers: SlotMap<RendererKey, Renderer>,
    root: Option<NodeHandle>,
    frame_id: u64,
}

impl SceneManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            renderers: SlotMap::with_key(),
            root: None,
            frame_id: 0,
        }
    }

    /// Tags `node` as this manager's root. Renderers attached anywhere
    /// under it become active once they observe the tag.
    pub fn tag_root(&mut self, graph: &mut SceneGraph, node: NodeHandle) {
        if let Some(previous) = self.root.take() {
            graph.untag_scene_manager(previous);
        }
        graph.tag_scene_manager(node);
        self.root = Some(node);
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeHandle> {
        self.root
    }

    #[must_use]
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn add_renderer(&mut self, renderer: Renderer) -> RendererKey {
        self.renderers.insert(renderer)
    }

    pub fn remove_renderer(&mut self, key: RendererKey) -> Option<Renderer> {
        self.renderers.remove(key)
    }

    #[must_use]
    pub fn renderer(&self, key: RendererKey) -> Option<&Renderer> {
        self.renderers.get(key)
    }

    pub fn renderer_mut(&mut self, key: RendererKey) -> Option<&mut Renderer> {
        self.renderers.get_mut(key)
    }

    #[must_use]
    pub fn num_renderers(&self) -> usize {
        self.renderers.len()
    }

    /// Runs one frame: every enabled renderer bound to this manager's root
    /// renders in descending priority order. A failing renderer aborts only
    /// its own pass.
    pub fn render_frame(&mut self, graph: &SceneGraph, context: &mut dyn RenderContext) {
        self.frame_id += 1;

        // Let every renderer observe pending graph events first; a freshly
        // tagged root is only visible to a renderer through its stream.
        let mut ordered: Vec<(RendererKey, f32)> = Vec::with_capacity(self.renderers.len());
        for (key, renderer) in &mut self.renderers {
            renderer.process_events(graph);
            if renderer.enabled() && renderer.scene_manager() == self.root && self.root.is_some() {
                ordered.push((key, renderer.priority()));
            }
        }
        ordered.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        for (key, _) in ordered {
            if let Some(renderer) = self.renderers.get_mut(key)
                && let Err(error) = renderer.render(graph, context, None)
            {
                log::error!("renderer '{}' failed: {error}", renderer.name());
            }
        }
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}
