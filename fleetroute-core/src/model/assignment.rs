//! Solver-produced variable values.

use super::variables::VarId;

/// One value per model variable; `None` marks a variable the solver never
/// assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    values: Vec<Option<f64>>,
}

impl Assignment {
    /// An assignment of `len` unassigned variables.
    pub fn unassigned(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    /// An assignment of `len` variables all set to zero.
    pub fn zeroed(len: usize) -> Self {
        Self {
            values: vec![Some(0.0); len],
        }
    }

    pub fn from_values(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    pub fn get(&self, var: VarId) -> Option<f64> {
        self.values.get(var.0).copied().flatten()
    }

    /// Set `var` to `value`; ids past the end are ignored.
    pub fn set(&mut self, var: VarId, value: f64) {
        if let Some(slot) = self.values.get_mut(var.0) {
            *slot = Some(value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether every variable carries a value.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}
