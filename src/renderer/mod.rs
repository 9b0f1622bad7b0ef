//! Render orchestration.
//!
//! The [`Renderer`] watches the subtrees rooted at its targets, keeps a
//! [`DrawCallPool`] in sync with the surfaces found there, and executes the
//! pool against a [`RenderContext`] once per frame:
//!
//! 1. drain pending scene events,
//! 2. resolve the render target,
//! 3. flush the pending-collection set into the pool,
//! 4. clear / viewport / scissor setup,
//! 5. `rendering_begin`, submission in pool order, `rendering_end`,
//!    `before_present`.

mod context;
mod draw_call;
mod filter;
mod pool;
mod tracker;

use glam::IVec4;

use crate::errors::{RenderError, Result};
use crate::resources::EffectHandle;
use crate::scene::{Component, NodeHandle, ObserverHandle, SceneEvent, SceneGraph, SurfaceHandle};
use crate::utils::signal::Signal;

pub use context::{RenderContext, RenderTarget, TextureHandle, color_to_vec4};
pub use draw_call::DrawCall;
pub use filter::{FilterChain, FilterKey, FilterScope, SurfaceFilter};
pub use pool::DrawCallPool;

use tracker::SurfaceTracker;

/// Payload of the renderer's lifecycle signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderEvent {
    /// Diagnostic name of the emitting renderer.
    pub renderer: String,
    /// Live draw calls at emission time.
    pub num_draw_calls: usize,
}

/// Per-frame render orchestrator for one or more target subtrees.
///
/// All targets share one draw-call pool and one pending set. The renderer
/// owns both exclusively; nothing else mutates them.
pub struct Renderer {
    name: String,
    background_color: u32,
    viewport: IVec4,
    scissor: IVec4,
    render_target: Option<RenderTarget>,
    clear_before_render: bool,
    enabled: bool,
    /// Used by the scene manager to order renderer instances; the renderer
    /// itself never reads it.
    priority: f32,
    /// Default effect for surfaces that lack one of their own.
    effect: Option<EffectHandle>,

    rendering_begin: Signal<RenderEvent>,
    rendering_end: Signal<RenderEvent>,
    before_present: Signal<RenderEvent>,

    pool: DrawCallPool,
    tracker: SurfaceTracker,
    filters: FilterChain,
    subscription: Option<(ObserverHandle, flume::Receiver<SceneEvent>)>,
    scene_manager: Option<NodeHandle>,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "Renderer".to_string(),
            background_color: 0,
            viewport: IVec4::ZERO,
            scissor: IVec4::ZERO,
            render_target: None,
            clear_before_render: true,
            enabled: true,
            priority: 0.0,
            effect: None,
            rendering_begin: Signal::new(),
            rendering_end: Signal::new(),
            before_present: Signal::new(),
            pool: DrawCallPool::new(),
            tracker: SurfaceTracker::default(),
            filters: FilterChain::new(),
            subscription: None,
            scene_manager: None,
        }
    }

    // ========================================================================
    // Configuration surface
    // ========================================================================

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        name.clone_into(&mut self.name);
    }

    #[must_use]
    pub fn background_color(&self) -> u32 {
        self.background_color
    }

    /// Packed `0xRRGGBBAA` clear color.
    pub fn set_background_color(&mut self, color: u32) {
        self.background_color = color;
    }

    #[must_use]
    pub fn viewport(&self) -> IVec4 {
        self.viewport
    }

    pub fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport = IVec4::new(x, y, width, height);
    }

    #[must_use]
    pub fn scissor(&self) -> IVec4 {
        self.scissor
    }

    pub fn set_scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.scissor = IVec4::new(x, y, width, height);
    }

    #[must_use]
    pub fn render_target(&self) -> Option<RenderTarget> {
        self.render_target
    }

    pub fn set_render_target(&mut self, target: Option<RenderTarget>) {
        self.render_target = target;
    }

    #[must_use]
    pub fn clear_before_render(&self) -> bool {
        self.clear_before_render
    }

    pub fn set_clear_before_render(&mut self, value: bool) {
        self.clear_before_render = value;
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, value: bool) {
        self.enabled = value;
    }

    #[must_use]
    pub fn priority(&self) -> f32 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: f32) {
        self.priority = priority;
    }

    #[must_use]
    pub fn effect(&self) -> Option<EffectHandle> {
        self.effect
    }

    pub fn set_effect(&mut self, effect: Option<EffectHandle>) {
        self.effect = effect;
    }

    // ========================================================================
    // Queries & signals
    // ========================================================================

    #[must_use]
    pub fn num_draw_calls(&self) -> usize {
        self.pool.len()
    }

    #[must_use]
    pub fn pool(&self) -> &DrawCallPool {
        &self.pool
    }

    #[must_use]
    pub fn targets(&self) -> &[NodeHandle] {
        self.tracker.targets()
    }

    /// Surfaces scheduled for (de)registration at the next flush.
    #[must_use]
    pub fn num_pending(&self) -> usize {
        self.tracker.num_pending()
    }

    /// The scene-manager node resolved from this renderer's targets, if any.
    /// A renderer without one is valid but inert under manager-driven
    /// frames.
    #[must_use]
    pub fn scene_manager(&self) -> Option<NodeHandle> {
        self.scene_manager
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.scene_manager.is_some()
    }

    pub fn rendering_begin(&mut self) -> &mut Signal<RenderEvent> {
        &mut self.rendering_begin
    }

    pub fn rendering_end(&mut self) -> &mut Signal<RenderEvent> {
        &mut self.rendering_end
    }

    pub fn before_present(&mut self) -> &mut Signal<RenderEvent> {
        &mut self.before_present
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Registers a data-binding filter. Pooled surfaces pick it up on their
    /// next rebuild.
    pub fn add_filter(&mut self, scope: FilterScope, filter: Box<dyn SurfaceFilter>) -> FilterKey {
        self.filters.add(scope, filter)
    }

    pub fn remove_filter(&mut self, scope: FilterScope, key: FilterKey) -> bool {
        self.filters.remove(scope, key)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Attaches this renderer to `target`: its subtree is scanned for
    /// surfaces and watched for changes from now on. The first target also
    /// opens the renderer's graph subscription and resolves the owning
    /// scene manager by ancestor search.
    pub fn attach_target(&mut self, graph: &mut SceneGraph, target: NodeHandle) {
        if !graph.contains_node(target) {
            log::error!("attach_target with a dead node handle");
            return;
        }
        if !self.tracker.target_attached(graph, target) {
            return;
        }
        if self.subscription.is_none() {
            self.subscription = Some(graph.subscribe());
        }
        self.resolve_scene_manager(graph);
    }

    /// Detaches this renderer from `target`. Pool entries for surfaces that
    /// were only reachable through it are erased immediately; pending
    /// entries are cancelled; the graph subscription closes with the last
    /// target. A detach without a matching attach is a no-op.
    pub fn detach_target(&mut self, graph: &mut SceneGraph, target: NodeHandle) {
        self.process_events(graph);
        if !self.tracker.target_detached(graph, target, &mut self.pool) {
            return;
        }
        if self.tracker.targets().is_empty() {
            if let Some((observer, _)) = self.subscription.take() {
                graph.unsubscribe(observer);
            }
            self.tracker.clear(&mut self.pool);
        }
        self.resolve_scene_manager(graph);
    }

    /// Drains and applies buffered scene events. Called automatically at
    /// the start of every frame; callers that need surface changes applied
    /// mid-frame may invoke it directly.
    pub fn process_events(&mut self, graph: &SceneGraph) {
        let Some((_, receiver)) = &self.subscription else {
            return;
        };
        let events: Vec<SceneEvent> = receiver.try_iter().collect();
        for event in events {
            self.handle_event(graph, &event);
        }
    }

    fn handle_event(&mut self, graph: &SceneGraph, event: &SceneEvent) {
        match event {
            // Geometry/material/effect changes only touch the surface's own
            // range, so they rebuild immediately instead of going through
            // the pending set.
            SceneEvent::SurfaceChanged { surface, .. } => {
                self.rebuild_surface(graph, *surface);
            }
            SceneEvent::ComponentAdded {
                component: Component::SceneManagerTag,
                ..
            }
            | SceneEvent::ComponentRemoved {
                component: Component::SceneManagerTag,
                ..
            } => {
                self.resolve_scene_manager(graph);
            }
            // Hierarchy changes can move a target into or out of a tagged
            // subtree, so the association is re-resolved after tracking.
            SceneEvent::NodeAttached { .. } | SceneEvent::NodeDetached { .. } => {
                self.tracker.handle_event(graph, &self.pool, event);
                self.resolve_scene_manager(graph);
            }
            _ => self.tracker.handle_event(graph, &self.pool, event),
        }
    }

    fn rebuild_surface(&mut self, graph: &SceneGraph, surface: SurfaceHandle) {
        if self.pool.contains(surface) {
            self.pool
                .rebuild_surface(graph, surface, self.effect, &self.filters);
        }
    }

    fn resolve_scene_manager(&mut self, graph: &SceneGraph) {
        self.scene_manager = self.tracker.targets().iter().find_map(|&target| {
            let mut current = Some(target);
            while let Some(handle) = current {
                let node = graph.node(handle)?;
                if node.has_scene_manager() {
                    return Some(handle);
                }
                current = node.parent();
            }
            None
        });
        if self.scene_manager.is_none() && !self.tracker.targets().is_empty() {
            log::debug!("renderer '{}' has no ancestor scene manager", self.name);
        }
    }

    // ========================================================================
    // Frame execution
    // ========================================================================

    /// Renders one frame.
    ///
    /// Target resolution order: `target_override`, then the renderer's own
    /// target, then the context's default backbuffer; with none of the
    /// three the frame aborts with [`RenderError::NoRenderTarget`] before
    /// any context call. A disabled renderer still drains its event queue
    /// but returns `Ok` without touching the context.
    pub fn render(
        &mut self,
        graph: &SceneGraph,
        context: &mut dyn RenderContext,
        target_override: Option<RenderTarget>,
    ) -> Result<()> {
        self.process_events(graph);
        if !self.enabled {
            return Ok(());
        }

        let target = target_override
            .or(self.render_target)
            .or_else(|| context.default_target())
            .ok_or(RenderError::NoRenderTarget)?;

        // Surfaces scheduled this frame are drawn this frame.
        self.tracker
            .flush(graph, &mut self.pool, self.effect, &self.filters);

        if self.clear_before_render {
            context.clear(target, self.background_color);
        }
        context.set_viewport(self.viewport);
        context.set_scissor(self.scissor);

        let event = RenderEvent {
            renderer: self.name.clone(),
            num_draw_calls: self.pool.len(),
        };
        self.rendering_begin.emit(&event);
        for call in self.pool.iter() {
            context.submit(call);
        }
        self.rendering_end.emit(&event);
        self.before_present.emit(&event);
        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
