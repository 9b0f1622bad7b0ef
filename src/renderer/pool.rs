//! Draw-call pool.
//!
//! Owns the mapping from surface to generated draw calls. Each registered
//! surface holds one contiguous range of calls; ranges never interleave and
//! removing one surface leaves every other range untouched. Iteration walks
//! surfaces in registration order, passes in generation order — no
//! re-sorting per frame.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::renderer::draw_call::DrawCall;
use crate::renderer::filter::FilterChain;
use crate::resources::EffectHandle;
use crate::scene::{SceneGraph, SurfaceHandle};

type CallRange = SmallVec<[DrawCall; 4]>;

/// Owner of all live draw calls, indexed by originating surface.
#[derive(Default)]
pub struct DrawCallPool {
    /// Surfaces in registration order; drives iteration.
    order: Vec<SurfaceHandle>,
    ranges: FxHashMap<SurfaceHandle, CallRange>,
    num_calls: usize,
}

impl DrawCallPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a surface and generates its draw calls.
    ///
    /// A surface with no valid technique under the current bindings (or no
    /// effect at all, given `fallback_effect`) is registered with an empty
    /// range: it stays out of submission but keeps its identity, so a later
    /// rebuild can resolve a technique for it. Re-registration is a no-op.
    pub fn add_surface(
        &mut self,
        graph: &SceneGraph,
        surface: SurfaceHandle,
        fallback_effect: Option<EffectHandle>,
        filters: &FilterChain,
    ) -> bool {
        if self.ranges.contains_key(&surface) {
            log::debug!("surface already registered, ignoring");
            return false;
        }
        let calls = build_draw_calls(graph, surface, fallback_effect, filters);
        self.num_calls += calls.len();
        self.order.push(surface);
        self.ranges.insert(surface, calls);
        true
    }

    /// Erases a surface's entire draw-call range. All other ranges remain
    /// valid. Returns `false` if the surface was not registered.
    pub fn remove_surface(&mut self, surface: SurfaceHandle) -> bool {
        let Some(calls) = self.ranges.remove(&surface) else {
            return false;
        };
        self.num_calls -= calls.len();
        self.order.retain(|&entry| entry != surface);
        true
    }

    /// Regenerates a surface's draw calls in place, after its geometry,
    /// material or effect changed. The surface keeps its position in
    /// iteration order. Returns `false` if the surface was not registered.
    pub fn rebuild_surface(
        &mut self,
        graph: &SceneGraph,
        surface: SurfaceHandle,
        fallback_effect: Option<EffectHandle>,
        filters: &FilterChain,
    ) -> bool {
        let Some(range) = self.ranges.get_mut(&surface) else {
            return false;
        };
        let calls = build_draw_calls(graph, surface, fallback_effect, filters);
        self.num_calls = self.num_calls - range.len() + calls.len();
        *range = calls;
        true
    }

    #[must_use]
    pub fn contains(&self, surface: SurfaceHandle) -> bool {
        self.ranges.contains_key(&surface)
    }

    /// Registered surfaces in registration order.
    #[must_use]
    pub fn surfaces(&self) -> &[SurfaceHandle] {
        &self.order
    }

    /// One surface's contiguous draw-call range.
    #[must_use]
    pub fn surface_range(&self, surface: SurfaceHandle) -> Option<&[DrawCall]> {
        self.ranges.get(&surface).map(SmallVec::as_slice)
    }

    /// Number of live draw calls (surfaces with empty ranges contribute
    /// nothing).
    #[must_use]
    pub fn len(&self) -> usize {
        self.num_calls
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_calls == 0
    }

    /// The full ordered sequence of live draw calls for one frame.
    pub fn iter(&self) -> impl Iterator<Item = &DrawCall> {
        self.order
            .iter()
            .filter_map(|surface| self.ranges.get(surface))
            .flatten()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.ranges.clear();
        self.num_calls = 0;
    }
}

/// Resolves a surface's technique and expands it into one draw call per
/// pass. Every skip condition yields an empty range, never a failure.
fn build_draw_calls(
    graph: &SceneGraph,
    handle: SurfaceHandle,
    fallback_effect: Option<EffectHandle>,
    filters: &FilterChain,
) -> CallRange {
    let mut calls = CallRange::new();

    let Some(surface) = graph.surface(handle) else {
        log::warn!("building draw calls for a dead surface");
        return calls;
    };
    let Some(effect_handle) = surface.effect().or(fallback_effect) else {
        log::debug!("surface '{}' has no effect, skipping", surface.name);
        return calls;
    };
    let Some(effect) = graph.assets().effect(effect_handle) else {
        log::warn!("surface '{}' references a dead effect", surface.name);
        return calls;
    };

    // Material bindings overlaid with the surface's own, then filtered.
    let mut bindings = graph
        .assets()
        .material(surface.material())
        .map(|material| material.bindings.clone())
        .unwrap_or_default();
    bindings.extend(
        surface
            .bindings()
            .iter()
            .map(|(key, value)| (key.clone(), *value)),
    );
    let bindings = filters.apply(bindings);

    let Some((technique_index, technique)) = effect.select_technique(&bindings) else {
        log::debug!(
            "surface '{}' has no valid technique for effect '{}'",
            surface.name,
            effect.name
        );
        return calls;
    };

    let (vertex_count, index_count) = graph
        .assets()
        .geometry(surface.geometry())
        .map_or((0, None), |geometry| {
            (geometry.vertex_count, geometry.index_count)
        });

    for (pass_index, _) in technique.passes().iter().enumerate() {
        calls.push(DrawCall {
            surface: handle,
            geometry: surface.geometry(),
            material: surface.material(),
            effect: effect_handle,
            technique: technique_index,
            pass: pass_index,
            vertex_count,
            index_count,
        });
    }
    calls
}
