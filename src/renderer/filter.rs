//! Data-binding filters.
//!
//! An extension point consulted before a surface's draw calls are (re)built:
//! active filters transform the surface's binding table so derived values
//! (light masks and the like) are visible to technique resolution. No
//! filters are active by default.

use crate::resources::BindingTable;

/// Which data-binding store a filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterScope {
    Target,
    Renderer,
    Root,
}

/// A data-transforming filter.
pub trait SurfaceFilter {
    fn transform(&self, scope: FilterScope, bindings: &BindingTable) -> BindingTable;
}

/// Token identifying a registered filter within its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterKey(u64);

/// Three independent filter lists, one per binding scope.
#[derive(Default)]
pub struct FilterChain {
    next_key: u64,
    target: Vec<(FilterKey, Box<dyn SurfaceFilter>)>,
    renderer: Vec<(FilterKey, Box<dyn SurfaceFilter>)>,
    root: Vec<(FilterKey, Box<dyn SurfaceFilter>)>,
}

impl FilterChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, scope: FilterScope) -> &Vec<(FilterKey, Box<dyn SurfaceFilter>)> {
        match scope {
            FilterScope::Target => &self.target,
            FilterScope::Renderer => &self.renderer,
            FilterScope::Root => &self.root,
        }
    }

    fn list_mut(&mut self, scope: FilterScope) -> &mut Vec<(FilterKey, Box<dyn SurfaceFilter>)> {
        match scope {
            FilterScope::Target => &mut self.target,
            FilterScope::Renderer => &mut self.renderer,
            FilterScope::Root => &mut self.root,
        }
    }

    pub fn add(&mut self, scope: FilterScope, filter: Box<dyn SurfaceFilter>) -> FilterKey {
        let key = FilterKey(self.next_key);
        self.next_key += 1;
        self.list_mut(scope).push((key, filter));
        key
    }

    pub fn remove(&mut self, scope: FilterScope, key: FilterKey) -> bool {
        let list = self.list_mut(scope);
        let before = list.len();
        list.retain(|(entry, _)| *entry != key);
        list.len() != before
    }

    #[must_use]
    pub fn len(&self, scope: FilterScope) -> usize {
        self.list(scope).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target.is_empty() && self.renderer.is_empty() && self.root.is_empty()
    }

    /// Runs `bindings` through every filter, target scope first, then
    /// renderer, then root, each scope in registration order.
    #[must_use]
    pub fn apply(&self, bindings: BindingTable) -> BindingTable {
        let mut current = bindings;
        for scope in [FilterScope::Target, FilterScope::Renderer, FilterScope::Root] {
            for (_, filter) in self.list(scope) {
                current = filter.transform(scope, &current);
            }
        }
        current
    }
}
