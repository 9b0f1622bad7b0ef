//! Effects, techniques and passes.
//!
//! An effect is a named set of techniques; a technique is selectable when
//! every binding it requires is present and truthy, and expands to one draw
//! call per pass. Technique *compilation* is out of scope — these records
//! describe already-compiled programs.

use crate::resources::binding::BindingTable;

/// One rendering pass of a technique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pass {
    pub name: String,
}

impl Pass {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// A named pass configuration, selectable based on current data bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Technique {
    pub name: String,
    /// Binding keys that must be present and truthy for this technique.
    requires: Vec<String>,
    passes: Vec<Pass>,
}

impl Technique {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            requires: Vec::new(),
            passes: Vec::new(),
        }
    }

    #[must_use]
    pub fn require(mut self, key: &str) -> Self {
        self.requires.push(key.to_string());
        self
    }

    #[must_use]
    pub fn with_pass(mut self, name: &str) -> Self {
        self.passes.push(Pass::new(name));
        self
    }

    #[must_use]
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Whether every required binding is present and truthy in `bindings`.
    #[must_use]
    pub fn is_satisfied_by(&self, bindings: &BindingTable) -> bool {
        self.requires
            .iter()
            .all(|key| bindings.get(key).is_some_and(|value| value.is_truthy()))
    }
}

/// A named rendering program: an ordered list of techniques.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    pub name: String,
    techniques: Vec<Technique>,
}

impl Effect {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            techniques: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_technique(mut self, technique: Technique) -> Self {
        self.techniques.push(technique);
        self
    }

    #[must_use]
    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }

    /// Selects the first technique satisfied by `bindings`.
    ///
    /// `None` means the surface has no valid technique under the current
    /// bindings and generates zero draw calls.
    #[must_use]
    pub fn select_technique(&self, bindings: &BindingTable) -> Option<(usize, &Technique)> {
        self.techniques
            .iter()
            .enumerate()
            .find(|(_, technique)| technique.is_satisfied_by(bindings))
    }
}
