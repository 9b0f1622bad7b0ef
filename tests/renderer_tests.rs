//! Renderer Integration Tests
//!
//! Tests for:
//! - Target lifecycle: attach/detach, multi-target, subscription handling
//! - Pending collection: same-frame pickup, add/remove cancellation
//! - Frame execution: target resolution, clear/viewport/scissor, submission
//!   order, lifecycle signals
//! - Event-driven rebuilds and stale-event rejection

use std::cell::RefCell;
use std::rc::Rc;

use glam::IVec4;
use mirage::{
    Assets, BindingValue, DrawCall, Effect, EffectHandle, Geometry, GeometryHandle, Material,
    MaterialHandle, NodeHandle, RenderContext, RenderError, RenderTarget, Renderer, SceneGraph,
    Surface, SurfaceHandle, Technique, TextureHandle,
};

type Trace = Rc<RefCell<Vec<String>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum GpuOp {
    Clear { target: RenderTarget, color: u32 },
    Viewport(IVec4),
    Scissor(IVec4),
    Submit { surface: SurfaceHandle, pass: usize },
}

/// Backend double that records every context call.
struct RecordingContext {
    backbuffer: bool,
    ops: Vec<GpuOp>,
    trace: Trace,
}

impl RecordingContext {
    fn new() -> Self {
        Self {
            backbuffer: true,
            ops: Vec::new(),
            trace: Trace::default(),
        }
    }

    /// A context with no default backbuffer.
    fn offscreen() -> Self {
        Self {
            backbuffer: false,
            ..Self::new()
        }
    }

    fn submissions(&self) -> Vec<SurfaceHandle> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                GpuOp::Submit { surface, .. } => Some(*surface),
                _ => None,
            })
            .collect()
    }
}

impl RenderContext for RecordingContext {
    fn default_target(&self) -> Option<RenderTarget> {
        self.backbuffer.then_some(RenderTarget::Backbuffer)
    }

    fn clear(&mut self, target: RenderTarget, color: u32) {
        self.trace.borrow_mut().push("clear".to_string());
        self.ops.push(GpuOp::Clear { target, color });
    }

    fn set_viewport(&mut self, rect: IVec4) {
        self.trace.borrow_mut().push("viewport".to_string());
        self.ops.push(GpuOp::Viewport(rect));
    }

    fn set_scissor(&mut self, rect: IVec4) {
        self.trace.borrow_mut().push("scissor".to_string());
        self.ops.push(GpuOp::Scissor(rect));
    }

    fn submit(&mut self, call: &DrawCall) {
        self.trace.borrow_mut().push("submit".to_string());
        self.ops.push(GpuOp::Submit {
            surface: call.surface,
            pass: call.pass,
        });
    }
}

struct Fixture {
    graph: SceneGraph,
    geometry: GeometryHandle,
    material: MaterialHandle,
    effect: EffectHandle,
}

impl Fixture {
    fn new() -> Self {
        let mut assets = Assets::new();
        let geometry = assets.add_geometry(Geometry::new("quad", 4).with_indices(6));
        let material = assets.add_material(Material::new("default"));
        let effect = assets.add_effect(
            Effect::new("basic").with_technique(Technique::new("forward").with_pass("main")),
        );
        Self {
            graph: SceneGraph::new(assets),
            geometry,
            material,
            effect,
        }
    }

    fn spawn_surface(&mut self, node: NodeHandle) -> SurfaceHandle {
        self.graph
            .add_surface(
                node,
                Surface::new(self.geometry, self.material).with_effect(self.effect),
            )
            .unwrap()
    }
}

// ============================================================================
// Target Lifecycle
// ============================================================================

#[test]
fn attach_target_picks_up_existing_surfaces() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let child = fx.graph.create_node();
    fx.graph.attach(child, target);
    let surface = fx.spawn_surface(child);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    assert_eq!(renderer.num_pending(), 1);

    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(context.submissions(), vec![surface]);
    assert_eq!(renderer.num_draw_calls(), 1);
    assert_eq!(renderer.num_pending(), 0);
}

#[test]
fn attach_same_target_twice_is_a_noop() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    fx.spawn_surface(target);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    renderer.attach_target(&mut fx.graph, target);
    assert_eq!(renderer.targets().len(), 1);
    assert_eq!(renderer.num_pending(), 1);
    assert_eq!(fx.graph.num_observers(), 1);
}

#[test]
fn surfaces_under_every_target_are_tracked() {
    let mut fx = Fixture::new();
    let t1 = fx.graph.create_node();
    let t2 = fx.graph.create_node();
    let s1 = fx.spawn_surface(t1);
    let s2 = fx.spawn_surface(t2);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, t1);
    renderer.attach_target(&mut fx.graph, t2);

    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(context.submissions(), vec![s1, s2]);
}

#[test]
fn detach_erases_draw_calls_immediately() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    fx.spawn_surface(target);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(renderer.num_draw_calls(), 1);

    renderer.detach_target(&mut fx.graph, target);
    assert_eq!(renderer.num_draw_calls(), 0);
    assert_eq!(renderer.num_pending(), 0);
    assert!(renderer.targets().is_empty());
    // Last target gone, subscription closed.
    assert_eq!(fx.graph.num_observers(), 0);
}

#[test]
fn detach_keeps_surfaces_reachable_through_another_target() {
    let mut fx = Fixture::new();
    let outer = fx.graph.create_node();
    let inner = fx.graph.create_node();
    fx.graph.attach(inner, outer);
    let surface = fx.spawn_surface(inner);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, outer);
    renderer.attach_target(&mut fx.graph, inner);
    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();

    renderer.detach_target(&mut fx.graph, outer);
    assert_eq!(renderer.num_draw_calls(), 1);
    assert!(renderer.pool().contains(surface));
}

#[test]
fn detach_without_attach_is_a_noop() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let mut renderer = Renderer::new();
    renderer.detach_target(&mut fx.graph, target);
    assert!(renderer.targets().is_empty());
}

#[test]
fn destroyed_target_drains_its_surfaces() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    fx.spawn_surface(target);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(renderer.num_draw_calls(), 1);

    fx.graph.remove_node(target);
    context.ops.clear();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert!(context.submissions().is_empty());
    assert_eq!(renderer.num_draw_calls(), 0);
}

// ============================================================================
// Pending Collection
// ============================================================================

#[test]
fn surface_added_before_a_frame_is_drawn_that_frame() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);

    let surface = fx.spawn_surface(target);
    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(context.submissions(), vec![surface]);
}

#[test]
fn add_then_remove_before_flush_cancels_out() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);

    let surface = fx.spawn_surface(target);
    fx.graph.remove_surface(surface);
    renderer.process_events(&fx.graph);
    assert_eq!(renderer.num_pending(), 0);

    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert!(context.submissions().is_empty());
}

#[test]
fn removal_of_a_pooled_surface_takes_effect_next_frame() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let surface = fx.spawn_surface(target);
    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);

    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(renderer.num_draw_calls(), 1);

    fx.graph.remove_surface(surface);
    context.ops.clear();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert!(context.submissions().is_empty());
    assert_eq!(renderer.num_draw_calls(), 0);
}

#[test]
fn registration_order_survives_interleaved_scheduling() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);

    let a = fx.spawn_surface(target);
    let b = fx.spawn_surface(target);
    let c = fx.spawn_surface(target);
    fx.graph.remove_surface(b);

    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(context.submissions(), vec![a, c]);
}

#[test]
fn node_moved_between_targets_stays_pooled() {
    let mut fx = Fixture::new();
    let t1 = fx.graph.create_node();
    let t2 = fx.graph.create_node();
    let carrier = fx.graph.create_node();
    fx.graph.attach(carrier, t1);
    let surface = fx.spawn_surface(carrier);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, t1);
    renderer.attach_target(&mut fx.graph, t2);
    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();

    // Reparent under the other target; both the detach and the attach event
    // are observed in one drain, against the post-move graph.
    fx.graph.attach(carrier, t2);
    context.ops.clear();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(context.submissions(), vec![surface]);
}

#[test]
fn node_moved_out_of_scope_is_dropped() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let elsewhere = fx.graph.create_node();
    let carrier = fx.graph.create_node();
    fx.graph.attach(carrier, target);
    fx.spawn_surface(carrier);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(renderer.num_draw_calls(), 1);

    fx.graph.attach(carrier, elsewhere);
    context.ops.clear();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert!(context.submissions().is_empty());
}

// ============================================================================
// Frame Execution
// ============================================================================

#[test]
fn frame_orders_clear_viewport_scissor_then_submits() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let surface = fx.spawn_surface(target);

    let mut renderer = Renderer::new();
    renderer.set_background_color(0x2040_60FF);
    renderer.set_viewport(0, 0, 800, 600);
    renderer.set_scissor(10, 10, 100, 100);
    renderer.attach_target(&mut fx.graph, target);

    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(
        context.ops,
        vec![
            GpuOp::Clear {
                target: RenderTarget::Backbuffer,
                color: 0x2040_60FF,
            },
            GpuOp::Viewport(IVec4::new(0, 0, 800, 600)),
            GpuOp::Scissor(IVec4::new(10, 10, 100, 100)),
            GpuOp::Submit { surface, pass: 0 },
        ]
    );
}

#[test]
fn signals_bracket_submission() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    fx.spawn_surface(target);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);

    let mut context = RecordingContext::new();
    let trace = Rc::clone(&context.trace);
    let sink = Rc::clone(&trace);
    renderer
        .rendering_begin()
        .connect(move |_| sink.borrow_mut().push("begin".to_string()));
    let sink = Rc::clone(&trace);
    renderer
        .rendering_end()
        .connect(move |_| sink.borrow_mut().push("end".to_string()));
    let sink = Rc::clone(&trace);
    renderer
        .before_present()
        .connect(move |_| sink.borrow_mut().push("present".to_string()));

    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(
        *trace.borrow(),
        vec!["clear", "viewport", "scissor", "begin", "submit", "end", "present"]
    );
}

#[test]
fn signal_payload_reports_draw_call_count() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    fx.spawn_surface(target);
    fx.spawn_surface(target);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);

    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    renderer
        .rendering_begin()
        .connect(move |event| *sink.borrow_mut() = Some(event.num_draw_calls));

    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(*seen.borrow(), Some(2));
}

#[test]
fn disabled_renderer_skips_the_frame() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    fx.spawn_surface(target);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    renderer.set_enabled(false);

    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert!(context.ops.is_empty());
}

#[test]
fn missing_render_target_is_an_error() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);

    let mut context = RecordingContext::offscreen();
    let result = renderer.render(&fx.graph, &mut context, None);
    assert!(matches!(result, Err(RenderError::NoRenderTarget)));
    assert!(context.ops.is_empty());
}

#[test]
fn target_override_beats_the_configured_target() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    renderer.set_render_target(Some(RenderTarget::Backbuffer));

    let texture = RenderTarget::Texture(TextureHandle::default());
    let mut context = RecordingContext::offscreen();
    renderer.render(&fx.graph, &mut context, Some(texture)).unwrap();
    assert_eq!(
        context.ops[0],
        GpuOp::Clear {
            target: texture,
            color: 0,
        }
    );
}

#[test]
fn clear_can_be_disabled() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    renderer.set_clear_before_render(false);

    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert!(!matches!(context.ops[0], GpuOp::Clear { .. }));
}

// ============================================================================
// Event-Driven Rebuilds
// ============================================================================

#[test]
fn surface_change_rebuilds_its_draw_calls() {
    let mut fx = Fixture::new();
    let gated = fx.graph.assets_mut().add_effect(
        Effect::new("gated")
            .with_technique(Technique::new("lit").require("lit").with_pass("a").with_pass("b"))
            .with_technique(Technique::new("unlit").with_pass("flat")),
    );
    let target = fx.graph.create_node();
    let surface = fx.spawn_surface(target);
    fx.graph.set_surface_effect(surface, Some(gated));

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(renderer.num_draw_calls(), 1);

    fx.graph
        .set_surface_binding(surface, "lit", BindingValue::Bool(true));
    context.ops.clear();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(renderer.num_draw_calls(), 2);
    assert_eq!(context.submissions(), vec![surface, surface]);
}

#[test]
fn default_effect_applies_to_effectless_surfaces() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let surface = fx
        .graph
        .add_surface(target, Surface::new(fx.geometry, fx.material))
        .unwrap();

    let mut renderer = Renderer::new();
    renderer.set_effect(Some(fx.effect));
    renderer.attach_target(&mut fx.graph, target);

    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(context.submissions(), vec![surface]);
}

#[test]
fn reparenting_under_a_tagged_root_activates_the_renderer() {
    let mut fx = Fixture::new();
    let root = fx.graph.create_node();
    fx.graph.tag_scene_manager(root);

    // Target starts in its own tree, with no tagged ancestor.
    let target = fx.graph.create_node();
    fx.spawn_surface(target);
    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    assert!(!renderer.is_active());

    fx.graph.attach(target, root);
    renderer.process_events(&fx.graph);
    assert_eq!(renderer.scene_manager(), Some(root));
    assert!(renderer.is_active());
}

#[test]
fn leaving_the_tagged_root_deactivates_the_renderer() {
    let mut fx = Fixture::new();
    let root = fx.graph.create_node();
    fx.graph.tag_scene_manager(root);
    let target = fx.graph.create_node();
    fx.graph.attach(target, root);
    fx.spawn_surface(target);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    assert!(renderer.is_active());

    fx.graph.detach(target);
    renderer.process_events(&fx.graph);
    assert!(!renderer.is_active());
    // The target itself is still tracked; only the association is gone.
    assert_eq!(renderer.targets(), &[target]);
}

#[test]
fn surface_added_under_a_detached_target_is_ignored() {
    let mut fx = Fixture::new();
    let t1 = fx.graph.create_node();
    let t2 = fx.graph.create_node();
    let s2 = fx.spawn_surface(t2);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, t1);
    renderer.attach_target(&mut fx.graph, t2);
    renderer.detach_target(&mut fx.graph, t1);

    // The subscription is still open through t2, so this event is observed
    // but must not touch the pool.
    fx.spawn_surface(t1);
    renderer.process_events(&fx.graph);
    assert_eq!(renderer.num_pending(), 1);

    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();
    assert_eq!(context.submissions(), vec![s2]);
    assert_eq!(renderer.num_draw_calls(), 1);
}

#[test]
fn disabled_renderer_still_drains_events() {
    let mut fx = Fixture::new();
    let target = fx.graph.create_node();
    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    renderer.set_enabled(false);

    fx.spawn_surface(target);
    let mut context = RecordingContext::new();
    renderer.render(&fx.graph, &mut context, None).unwrap();

    // No context work, but the event made it into the pending set.
    assert!(context.ops.is_empty());
    assert_eq!(renderer.num_pending(), 1);
}

#[test]
fn scene_manager_tag_is_observed_through_events() {
    let mut fx = Fixture::new();
    let root = fx.graph.create_node();
    let target = fx.graph.create_node();
    fx.graph.attach(target, root);

    let mut renderer = Renderer::new();
    renderer.attach_target(&mut fx.graph, target);
    assert!(!renderer.is_active());

    fx.graph.tag_scene_manager(root);
    renderer.process_events(&fx.graph);
    assert_eq!(renderer.scene_manager(), Some(root));
    assert!(renderer.is_active());

    fx.graph.untag_scene_manager(root);
    renderer.process_events(&fx.graph);
    assert!(!renderer.is_active());
}
