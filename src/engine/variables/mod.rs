//! Integer variables with reversible domains.
//!
//! A variable's domain is its reversible lower/upper bound plus, once a hole
//! is punched into the interior, a bitset over the initial range. All three
//! live in the solver's reversible storage, so domain changes are undone by
//! ordinary trail backtracking. Demons attach to the variable's events and
//! are enqueued whenever a modification touches the corresponding part of
//! the domain.

use enumset::EnumSet;
use enumset::EnumSetType;

use crate::basic_types::PropagationStatus;
use crate::containers::StorageKey;
use crate::engine::propagation::DemonId;
use crate::engine::state::RevInt64;
use crate::engine::state::RevU64;
use crate::engine::Solver;
use crate::kabocha_assert_moderate;
use crate::kabocha_assert_simple;

/// The handle of an integer variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntVar {
    id: u32,
}

impl StorageKey for IntVar {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        IntVar { id: index as u32 }
    }
}

impl std::fmt::Display for IntVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}

/// The kinds of variable events a demon can attach to.
#[derive(EnumSetType, Debug)]
pub enum VarEvent {
    /// The lower or upper bound changed.
    Range,
    /// The variable became assigned.
    Bound,
    /// Any change to the domain.
    Domain,
}

impl VarEvent {
    fn index(self) -> usize {
        match self {
            VarEvent::Range => 0,
            VarEvent::Bound => 1,
            VarEvent::Domain => 2,
        }
    }
}

/// The interior-hole bitset of a domain: bit `value - offset` is set iff
/// `value` is still present. Only consulted between the bounds.
pub(crate) struct DomainBits {
    offset: i64,
    words: Vec<RevU64>,
}

pub(crate) struct IntVarData {
    pub(crate) min: RevInt64,
    pub(crate) max: RevInt64,
    pub(crate) size: RevInt64,
    pub(crate) initial_min: i64,
    pub(crate) initial_max: i64,
    /// Allocated lazily on the first interior removal; bound-only variables
    /// never pay for it.
    pub(crate) bits: Option<DomainBits>,
    /// Attached demons per event kind. The live prefix is bounded by the
    /// reversible length, so attachments made during search disappear on
    /// backtrack.
    demons: [Vec<DemonId>; 3],
    demon_lens: [RevInt64; 3],
}

/// Variable creation and read access.
impl Solver {
    /// Create a new integer variable with domain `[lower_bound, upper_bound]`.
    pub fn new_int_var(&mut self, lower_bound: i64, upper_bound: i64) -> IntVar {
        kabocha_assert_simple!(
            lower_bound <= upper_bound,
            "cannot create a variable with an empty domain"
        );
        let min = self.memory.new_int64(lower_bound);
        let max = self.memory.new_int64(upper_bound);
        let size = self.memory.new_int64(upper_bound - lower_bound + 1);
        let demon_lens = [
            self.memory.new_int64(0),
            self.memory.new_int64(0),
            self.memory.new_int64(0),
        ];
        self.vars.push(IntVarData {
            min,
            max,
            size,
            initial_min: lower_bound,
            initial_max: upper_bound,
            bits: None,
            demons: Default::default(),
            demon_lens,
        })
    }

    /// Create a new integer variable with the given name.
    pub fn new_named_int_var(
        &mut self,
        lower_bound: i64,
        upper_bound: i64,
        name: impl Into<String>,
    ) -> IntVar {
        let var = self.new_int_var(lower_bound, upper_bound);
        self.set_var_name(var, name.into());
        var
    }

    /// Create a variable whose domain contains exactly `values`.
    pub fn new_int_var_from_values(&mut self, mut values: Vec<i64>) -> IntVar {
        kabocha_assert_simple!(
            !values.is_empty(),
            "cannot create a variable with an empty domain"
        );
        values.sort_unstable();
        values.dedup();

        let var = self.new_int_var(values[0], values[values.len() - 1]);
        let mut next_index = 0;
        for value in values[0]..=values[values.len() - 1] {
            if value == values[next_index] {
                next_index += 1;
            } else {
                self.apply_remove_value(var, value)
                    .expect("removing a non-extreme value from a fresh domain cannot fail");
            }
        }
        var
    }

    pub fn lower_bound(&self, var: IntVar) -> i64 {
        self.memory.int64(self.vars[var].min)
    }

    pub fn upper_bound(&self, var: IntVar) -> i64 {
        self.memory.int64(self.vars[var].max)
    }

    /// Whether the variable is assigned.
    pub fn is_bound(&self, var: IntVar) -> bool {
        self.lower_bound(var) == self.upper_bound(var)
    }

    /// The assigned value of the variable; it must be bound.
    pub fn value(&self, var: IntVar) -> i64 {
        kabocha_assert_simple!(self.is_bound(var), "value() on an unbound variable");
        self.lower_bound(var)
    }

    /// The number of values left in the domain.
    pub fn domain_size(&self, var: IntVar) -> i64 {
        self.memory.int64(self.vars[var].size)
    }

    pub fn contains(&self, var: IntVar, value: i64) -> bool {
        if value < self.lower_bound(var) || value > self.upper_bound(var) {
            return false;
        }
        self.bit_is_set(var, value)
    }

    /// The values currently in the domain, in increasing order.
    pub fn domain_values(&self, var: IntVar) -> Vec<i64> {
        (self.lower_bound(var)..=self.upper_bound(var))
            .filter(|&value| self.bit_is_set(var, value))
            .collect()
    }

    pub fn num_variables(&self) -> usize {
        self.vars.len()
    }

    /// Attach a registered demon to the given events of `var`; attachments
    /// made during search are undone on backtrack.
    pub fn attach_demon(&mut self, var: IntVar, events: EnumSet<VarEvent>, demon: DemonId) {
        for event in events {
            let index = event.index();
            let len_key = self.vars[var].demon_lens[index];
            let live = self.memory.int64(len_key) as usize;
            // Entries beyond the reversible length are stale leftovers from
            // an undone branch.
            self.vars[var].demons[index].truncate(live);
            self.vars[var].demons[index].push(demon);
            self.save_and_set_int64(len_key, live as i64 + 1);
        }
    }
}

/// Domain modification; every entry point traces the event, applies the
/// reduction through the trail and wakes the attached demons.
impl Solver {
    pub fn set_min(&mut self, var: IntVar, new_min: i64) -> PropagationStatus {
        if new_min <= self.lower_bound(var) {
            return Ok(());
        }
        if new_min > self.upper_bound(var) {
            return Err(self.fail());
        }
        if self.instruments_variables {
            self.trace_set_min(var, new_min);
        }
        self.apply_set_min(var, new_min)
    }

    pub fn set_max(&mut self, var: IntVar, new_max: i64) -> PropagationStatus {
        if new_max >= self.upper_bound(var) {
            return Ok(());
        }
        if new_max < self.lower_bound(var) {
            return Err(self.fail());
        }
        if self.instruments_variables {
            self.trace_set_max(var, new_max);
        }
        self.apply_set_max(var, new_max)
    }

    pub fn set_range(&mut self, var: IntVar, new_min: i64, new_max: i64) -> PropagationStatus {
        if new_min > new_max {
            return Err(self.fail());
        }
        if new_min <= self.lower_bound(var) && new_max >= self.upper_bound(var) {
            return Ok(());
        }
        if self.instruments_variables {
            self.trace_set_range(var, new_min, new_max);
        }
        if new_min > self.lower_bound(var) {
            self.apply_set_min(var, new_min)?;
        }
        if new_max < self.upper_bound(var) {
            self.apply_set_max(var, new_max)?;
        }
        Ok(())
    }

    pub fn set_value(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        if self.is_bound(var) && self.lower_bound(var) == value {
            return Ok(());
        }
        if !self.contains(var, value) {
            return Err(self.fail());
        }
        if self.instruments_variables {
            self.trace_set_value(var, value);
        }
        if value > self.lower_bound(var) {
            self.apply_set_min(var, value)?;
        }
        if value < self.upper_bound(var) {
            self.apply_set_max(var, value)?;
        }
        Ok(())
    }

    pub fn remove_value(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        if !self.contains(var, value) {
            return Ok(());
        }
        if self.instruments_variables {
            self.trace_remove_value(var, value);
        }
        self.apply_remove_value(var, value)
    }

    pub fn remove_values(&mut self, var: IntVar, values: &[i64]) -> PropagationStatus {
        if self.instruments_variables {
            self.trace_remove_values(var, values);
        }
        for &value in values {
            if self.contains(var, value) {
                self.apply_remove_value(var, value)?;
            }
        }
        Ok(())
    }

    /// Remove every value in `[interval_min, interval_max]`.
    pub fn remove_interval(
        &mut self,
        var: IntVar,
        interval_min: i64,
        interval_max: i64,
    ) -> PropagationStatus {
        if interval_min > interval_max {
            return Ok(());
        }
        if self.instruments_variables {
            self.trace_remove_interval(var, interval_min, interval_max);
        }
        if interval_min <= self.lower_bound(var) {
            if interval_max >= self.lower_bound(var) {
                return self.apply_set_min(var, interval_max + 1);
            }
            return Ok(());
        }
        if interval_max >= self.upper_bound(var) {
            if interval_min <= self.upper_bound(var) {
                return self.apply_set_max(var, interval_min - 1);
            }
            return Ok(());
        }
        for value in interval_min..=interval_max {
            if self.contains(var, value) {
                self.apply_remove_value(var, value)?;
            }
        }
        Ok(())
    }

    /// Reduce the domain to the values in `values`.
    pub fn set_values(&mut self, var: IntVar, values: &[i64]) -> PropagationStatus {
        if self.instruments_variables {
            self.trace_set_values(var, values);
        }
        let to_remove: Vec<i64> = (self.lower_bound(var)..=self.upper_bound(var))
            .filter(|value| self.bit_is_set(var, *value) && !values.contains(value))
            .collect();
        for value in to_remove {
            // A removal can cascade into a bound update that already dropped
            // later candidates.
            if self.contains(var, value) {
                self.apply_remove_value(var, value)?;
            }
        }
        Ok(())
    }
}

/// The untraced modification internals.
impl Solver {
    fn apply_set_min(&mut self, var: IntVar, new_min: i64) -> PropagationStatus {
        let old_min = self.lower_bound(var);
        kabocha_assert_moderate!(new_min > old_min);
        let adjusted = match self.first_in_domain_from(var, new_min) {
            Some(value) => value,
            None => return Err(self.fail()),
        };
        let removed = self.count_in_domain(var, old_min, adjusted - 1);

        let min_key = self.vars[var].min;
        let size_key = self.vars[var].size;
        self.save_and_set_int64(min_key, adjusted);
        let new_size = self.memory.int64(size_key) - removed;
        self.save_and_set_int64(size_key, new_size);

        self.wake_demons(var, true)
    }

    fn apply_set_max(&mut self, var: IntVar, new_max: i64) -> PropagationStatus {
        let old_max = self.upper_bound(var);
        kabocha_assert_moderate!(new_max < old_max);
        let adjusted = match self.last_in_domain_until(var, new_max) {
            Some(value) => value,
            None => return Err(self.fail()),
        };
        let removed = self.count_in_domain(var, adjusted + 1, old_max);

        let max_key = self.vars[var].max;
        let size_key = self.vars[var].size;
        self.save_and_set_int64(max_key, adjusted);
        let new_size = self.memory.int64(size_key) - removed;
        self.save_and_set_int64(size_key, new_size);

        self.wake_demons(var, true)
    }

    fn apply_remove_value(&mut self, var: IntVar, value: i64) -> PropagationStatus {
        kabocha_assert_moderate!(self.contains(var, value));
        if value == self.lower_bound(var) {
            return self.apply_set_min(var, value + 1);
        }
        if value == self.upper_bound(var) {
            return self.apply_set_max(var, value - 1);
        }
        self.ensure_bits(var);
        let (offset, word_key) = {
            let bits = self.vars[var].bits.as_ref().unwrap();
            let word_index = ((value - bits.offset) / 64) as usize;
            (bits.offset, bits.words[word_index])
        };
        let bit = 1_u64 << ((value - offset) % 64) as u32;
        let word = self.memory.u64(word_key);
        kabocha_assert_moderate!(word & bit != 0);
        self.save_and_set_u64(word_key, word & !bit);

        let size_key = self.vars[var].size;
        let new_size = self.memory.int64(size_key) - 1;
        self.save_and_set_int64(size_key, new_size);

        self.wake_demons(var, false)
    }

    /// Enqueue the demons watching `var`; bound events only fire at the
    /// moment the variable becomes assigned.
    fn wake_demons(&mut self, var: IntVar, range_changed: bool) -> PropagationStatus {
        if range_changed {
            self.wake_demon_list(var, VarEvent::Range)?;
            if self.is_bound(var) {
                self.wake_demon_list(var, VarEvent::Bound)?;
            }
        }
        self.wake_demon_list(var, VarEvent::Domain)
    }

    fn wake_demon_list(&mut self, var: IntVar, event: VarEvent) -> PropagationStatus {
        // Indexed loop over the live prefix: enqueueing may run demons which
        // attach further demons; those only see later events.
        let index = event.index();
        let live = self.memory.int64(self.vars[var].demon_lens[index]) as usize;
        let count = live.min(self.vars[var].demons[index].len());
        for position in 0..count {
            let demon = self.vars[var].demons[index][position];
            self.enqueue_demon(demon)?;
        }
        Ok(())
    }

    fn ensure_bits(&mut self, var: IntVar) {
        if self.vars[var].bits.is_some() {
            return;
        }
        let initial_min = self.vars[var].initial_min;
        let initial_max = self.vars[var].initial_max;
        let num_words = ((initial_max - initial_min) / 64 + 1) as usize;
        let mut words = Vec::with_capacity(num_words);
        for _ in 0..num_words {
            words.push(self.memory.new_u64(u64::MAX));
        }
        self.vars[var].bits = Some(DomainBits {
            offset: initial_min,
            words,
        });
    }

    fn bit_is_set(&self, var: IntVar, value: i64) -> bool {
        match &self.vars[var].bits {
            None => true,
            Some(bits) => {
                let position = value - bits.offset;
                let word = self.memory.u64(bits.words[(position / 64) as usize]);
                word & (1_u64 << (position % 64) as u32) != 0
            }
        }
    }

    /// The smallest domain value `>= from`, ignoring the bounds of values
    /// below `from`.
    fn first_in_domain_from(&self, var: IntVar, from: i64) -> Option<i64> {
        let max = self.upper_bound(var);
        (from..=max).find(|&value| self.bit_is_set(var, value))
    }

    /// The largest domain value `<= until`.
    fn last_in_domain_until(&self, var: IntVar, until: i64) -> Option<i64> {
        let min = self.lower_bound(var);
        (min..=until).rev().find(|&value| self.bit_is_set(var, value))
    }

    /// The number of domain values in `[low, high]`.
    fn count_in_domain(&self, var: IntVar, low: i64, high: i64) -> i64 {
        if low > high {
            return 0;
        }
        match &self.vars[var].bits {
            None => high - low + 1,
            Some(_) => (low..=high)
                .filter(|&value| self.bit_is_set(var, value))
                .count() as i64,
        }
    }
}
