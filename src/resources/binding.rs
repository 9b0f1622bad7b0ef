//! Data bindings used during technique resolution.
//!
//! Materials and surfaces contribute key/value bindings; an effect selects
//! the first of its techniques whose requirements are satisfied by the
//! combined table. Data-binding filters may transform the table before
//! resolution.

use rustc_hash::FxHashMap;

/// String-keyed table of data bindings.
pub type BindingTable = FxHashMap<String, BindingValue>;

/// A single data-binding value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl BindingValue {
    /// Whether this value satisfies a technique requirement.
    #[must_use]
    pub fn is_truthy(self) -> bool {
        match self {
            Self::Bool(value) => value,
            Self::Int(value) => value != 0,
            Self::Float(value) => value != 0.0,
        }
    }
}
