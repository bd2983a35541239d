use crate::containers::HashMap;
use crate::engine::variables::IntVar;

/// A (partial) assignment of values to integer variables.
///
/// Assignments are plain data: they can be captured at a solution, stored
/// across backtracks and later re-applied through
/// [`crate::Solver::check_assignment`] or a restoring decision builder.
#[derive(Debug, Default, Clone)]
pub struct Assignment {
    values: HashMap<IntVar, i64>,
    ordered: Vec<IntVar>,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment::default()
    }

    /// Record `var = value`, overwriting any previous value for `var`.
    pub fn set_value(&mut self, var: IntVar, value: i64) {
        if self.values.insert(var, value).is_none() {
            self.ordered.push(var);
        }
    }

    pub fn value(&self, var: IntVar) -> Option<i64> {
        self.values.get(&var).copied()
    }

    pub fn contains(&self, var: IntVar) -> bool {
        self.values.contains_key(&var)
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Iterate over the recorded pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (IntVar, i64)> + '_ {
        self.ordered.iter().map(move |var| (*var, self.values[var]))
    }
}
