//! Surface tracking.
//!
//! Keeps the draw-call pool consistent with the live scene-graph subtrees
//! rooted at each of the renderer's targets. Structural events write into a
//! pending set that is flushed into the pool at the start of a frame; the
//! set deduplicates, so a surface scheduled "added" and then "removed"
//! before the flush cancels out entirely.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::renderer::filter::FilterChain;
use crate::renderer::pool::DrawCallPool;
use crate::resources::EffectHandle;
use crate::scene::{Component, NodeHandle, SceneEvent, SceneGraph, SurfaceHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingOp {
    Add,
    Remove,
}

/// Pending-collection bookkeeping for one renderer.
///
/// The pool itself is the authority on which surfaces are registered; the
/// tracker only decides *when* registration state must change.
#[derive(Default)]
pub(crate) struct SurfaceTracker {
    targets: Vec<NodeHandle>,
    /// Deduplicated pending set; the sequence number preserves scheduling
    /// order across the flush.
    pending: FxHashMap<SurfaceHandle, (PendingOp, u64)>,
    next_seq: u64,
}

impl SurfaceTracker {
    pub(crate) fn targets(&self) -> &[NodeHandle] {
        &self.targets
    }

    pub(crate) fn has_target(&self, node: NodeHandle) -> bool {
        self.targets.contains(&node)
    }

    pub(crate) fn num_pending(&self) -> usize {
        self.pending.len()
    }

    /// Starts tracking `target`: every surface already in its subtree is
    /// scheduled for registration.
    pub(crate) fn target_attached(&mut self, graph: &SceneGraph, target: NodeHandle) -> bool {
        if self.targets.contains(&target) {
            log::warn!("target attached twice, ignoring");
            return false;
        }
        self.targets.push(target);
        for surface in graph.collect_surfaces(target) {
            self.schedule(surface, PendingOp::Add);
        }
        true
    }

    /// Stops tracking `target`, eagerly erasing every pooled surface that
    /// is no longer under any remaining target and cancelling pending
    /// entries that no longer apply. No stale draw call survives a detach.
    pub(crate) fn target_detached(
        &mut self,
        graph: &SceneGraph,
        target: NodeHandle,
        pool: &mut DrawCallPool,
    ) -> bool {
        let Some(position) = self.targets.iter().position(|&t| t == target) else {
            log::warn!("target detach without a matching attach, ignoring");
            return false;
        };
        self.targets.remove(position);

        let stale: Vec<SurfaceHandle> = pool
            .surfaces()
            .iter()
            .copied()
            .filter(|&surface| {
                !graph
                    .surface_node(surface)
                    .is_some_and(|owner| self.under_any_target(graph, owner))
            })
            .collect();
        for surface in stale {
            pool.remove_surface(surface);
        }

        let targets = &self.targets;
        self.pending.retain(|&surface, (op, _)| match op {
            PendingOp::Add => graph
                .surface_node(surface)
                .is_some_and(|owner| under_targets(graph, targets, owner)),
            PendingOp::Remove => pool.contains(surface),
        });
        true
    }

    /// Applies one structural event. Membership is always checked against
    /// the graph's current state, so stale events from subtrees that have
    /// since left scope are ignored.
    pub(crate) fn handle_event(
        &mut self,
        graph: &SceneGraph,
        pool: &DrawCallPool,
        event: &SceneEvent,
    ) {
        match event {
            SceneEvent::NodeAttached { node, .. } => {
                if self.under_any_target(graph, *node) {
                    for surface in graph.collect_surfaces(*node) {
                        self.schedule(surface, PendingOp::Add);
                    }
                }
            }
            SceneEvent::NodeDetached { surfaces, .. } => {
                // Dead targets (destroyed inside the detached subtree) stop
                // counting for membership.
                self.targets.retain(|&t| graph.contains_node(t));

                for &surface in surfaces {
                    let still_in_scope = graph
                        .surface_node(surface)
                        .is_some_and(|owner| self.under_any_target(graph, owner));
                    if !still_in_scope && (pool.contains(surface) || self.has_pending_add(surface))
                    {
                        self.schedule(surface, PendingOp::Remove);
                    }
                }
            }
            SceneEvent::ComponentAdded {
                node,
                component: Component::Surface(surface),
            } => {
                if self.under_any_target(graph, *node) {
                    self.schedule(*surface, PendingOp::Add);
                }
            }
            SceneEvent::ComponentRemoved {
                component: Component::Surface(surface),
                ..
            } => {
                if pool.contains(*surface) || self.has_pending_add(*surface) {
                    self.schedule(*surface, PendingOp::Remove);
                }
            }
            // Scene-manager tagging and per-surface changes are the
            // renderer's concern.
            SceneEvent::ComponentAdded { .. }
            | SceneEvent::ComponentRemoved { .. }
            | SceneEvent::SurfaceChanged { .. } => {}
        }
    }

    /// Flushes the pending set into the pool in scheduling order.
    pub(crate) fn flush(
        &mut self,
        graph: &SceneGraph,
        pool: &mut DrawCallPool,
        fallback_effect: Option<EffectHandle>,
        filters: &FilterChain,
    ) {
        if self.pending.is_empty() {
            return;
        }
        let mut entries: Vec<(SurfaceHandle, PendingOp, u64)> = self
            .pending
            .drain()
            .map(|(surface, (op, seq))| (surface, op, seq))
            .collect();
        entries.sort_by_key(|&(_, _, seq)| seq);

        for (surface, op, _) in entries {
            match op {
                PendingOp::Add => {
                    if graph.surface(surface).is_none() {
                        log::debug!("pending surface vanished before flush, skipping");
                        continue;
                    }
                    pool.add_surface(graph, surface, fallback_effect, filters);
                }
                PendingOp::Remove => {
                    pool.remove_surface(surface);
                }
            }
        }
    }

    /// Drops every target and pending entry and empties the pool.
    pub(crate) fn clear(&mut self, pool: &mut DrawCallPool) {
        self.targets.clear();
        self.pending.clear();
        pool.clear();
    }

    fn schedule(&mut self, surface: SurfaceHandle, op: PendingOp) {
        match self.pending.entry(surface) {
            Entry::Occupied(entry) => {
                // Opposite operations cancel; rescheduling the same one
                // keeps the original position.
                if entry.get().0 != op {
                    entry.remove();
                }
            }
            Entry::Vacant(entry) => {
                self.next_seq += 1;
                entry.insert((op, self.next_seq));
            }
        }
    }

    fn has_pending_add(&self, surface: SurfaceHandle) -> bool {
        matches!(self.pending.get(&surface), Some((PendingOp::Add, _)))
    }

    fn under_any_target(&self, graph: &SceneGraph, node: NodeHandle) -> bool {
        under_targets(graph, &self.targets, node)
    }
}

fn under_targets(graph: &SceneGraph, targets: &[NodeHandle], node: NodeHandle) -> bool {
    targets
        .iter()
        .any(|&target| graph.is_in_subtree(node, target))
}
