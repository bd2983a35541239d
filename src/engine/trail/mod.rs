//! The reversible trail: the log of state changes that makes backtracking
//! possible.
//!
//! Every mutation of a reversible location first records an
//! address/old-value cell on the trail. Popping the cells in LIFO order and
//! writing each old value back re-establishes the state that existed when
//! the corresponding trail lengths were observed. Scalar cells go through
//! block-compressed stacks (one per primitive kind); bool snapshots and
//! deferred destructions are kept in plain lists.

mod compressed_stack;
mod entry;
mod packer;

use std::any::Any;
use std::rc::Rc;

pub(crate) use compressed_stack::CompressedStack;
pub(crate) use entry::AddrVal;
pub(crate) use entry::TrailEntry;

use crate::containers::StorageKey;
use crate::engine::state::RevBool;
use crate::engine::state::RevInt;
use crate::engine::state::RevInt64;
use crate::engine::state::RevPtr;
use crate::engine::state::RevU64;
use crate::engine::state::StateRegistry;
use crate::options::TrailCompression;

/// A snapshot of the lengths of every trail section.
///
/// Backtracking to a mark pops each section down to the recorded length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TrailMark {
    rev_ints: usize,
    rev_int64s: usize,
    rev_u64s: usize,
    rev_ptrs: usize,
    rev_bools: usize,
    rev_int_arrays: usize,
    rev_int64_arrays: usize,
    rev_u64_arrays: usize,
    rev_objects: usize,
    rev_object_arrays: usize,
}

/// The reversible trail, one section per cell kind plus the deferred
/// destruction lists.
pub(crate) struct Trail {
    rev_ints: CompressedStack<AddrVal<i32>>,
    rev_int64s: CompressedStack<AddrVal<i64>>,
    rev_u64s: CompressedStack<AddrVal<u64>>,
    rev_ptrs: CompressedStack<AddrVal<u64>>,
    // Bool saves are routed to an uncompressed pair of parallel lists; bool
    // cells are too small for block compression to pay off.
    rev_bool_keys: Vec<RevBool>,
    rev_bool_values: Vec<bool>,
    // Deferred deallocations, run when the trail unwinds past them.
    rev_int_arrays: Vec<Vec<i32>>,
    rev_int64_arrays: Vec<Vec<i64>>,
    rev_u64_arrays: Vec<Vec<u64>>,
    rev_objects: Vec<Rc<dyn Any>>,
    rev_object_arrays: Vec<Vec<Rc<dyn Any>>>,
}

impl Trail {
    pub(crate) fn new(block_size: usize, compression: TrailCompression) -> Trail {
        Trail {
            rev_ints: CompressedStack::new(block_size, compression),
            rev_int64s: CompressedStack::new(block_size, compression),
            rev_u64s: CompressedStack::new(block_size, compression),
            rev_ptrs: CompressedStack::new(block_size, compression),
            rev_bool_keys: Vec::new(),
            rev_bool_values: Vec::new(),
            rev_int_arrays: Vec::new(),
            rev_int64_arrays: Vec::new(),
            rev_u64_arrays: Vec::new(),
            rev_objects: Vec::new(),
            rev_object_arrays: Vec::new(),
        }
    }

    /// Append a cell capturing the current value of `key`. Repeated saves of
    /// the same key are legal; the restores run in LIFO order so the
    /// outermost one wins.
    pub(crate) fn save_int(&mut self, key: RevInt, old: i32) {
        self.rev_ints.push(AddrVal::new(key.index() as u32, old));
    }

    pub(crate) fn save_int64(&mut self, key: RevInt64, old: i64) {
        self.rev_int64s.push(AddrVal::new(key.index() as u32, old));
    }

    pub(crate) fn save_u64(&mut self, key: RevU64, old: u64) {
        self.rev_u64s.push(AddrVal::new(key.index() as u32, old));
    }

    pub(crate) fn save_ptr(&mut self, key: RevPtr, old: u64) {
        self.rev_ptrs.push(AddrVal::new(key.index() as u32, old));
    }

    pub(crate) fn save_bool(&mut self, key: RevBool, old: bool) {
        self.rev_bool_keys.push(key);
        self.rev_bool_values.push(old);
    }

    /// Register an integer array whose storage is released when the trail
    /// unwinds past this point.
    pub(crate) fn defer_free_int_array(&mut self, array: Vec<i32>) {
        self.rev_int_arrays.push(array);
    }

    pub(crate) fn defer_free_int64_array(&mut self, array: Vec<i64>) {
        self.rev_int64_arrays.push(array);
    }

    pub(crate) fn defer_free_u64_array(&mut self, array: Vec<u64>) {
        self.rev_u64_arrays.push(array);
    }

    /// Register an object released (LIFO) when the trail unwinds past this
    /// point. The trail holds one strong reference; the object itself is
    /// dropped once no other reference remains.
    pub(crate) fn defer_destroy(&mut self, object: Rc<dyn Any>) {
        self.rev_objects.push(object);
    }

    pub(crate) fn defer_destroy_array(&mut self, objects: Vec<Rc<dyn Any>>) {
        self.rev_object_arrays.push(objects);
    }

    /// Snapshot the current length of every section.
    pub(crate) fn mark(&self) -> TrailMark {
        TrailMark {
            rev_ints: self.rev_ints.len(),
            rev_int64s: self.rev_int64s.len(),
            rev_u64s: self.rev_u64s.len(),
            rev_ptrs: self.rev_ptrs.len(),
            rev_bools: self.rev_bool_keys.len(),
            rev_int_arrays: self.rev_int_arrays.len(),
            rev_int64_arrays: self.rev_int64_arrays.len(),
            rev_u64_arrays: self.rev_u64_arrays.len(),
            rev_objects: self.rev_objects.len(),
            rev_object_arrays: self.rev_object_arrays.len(),
        }
    }

    /// Pop cells and deferrals in LIFO order down to `mark`, restoring every
    /// saved value into `registry` and dropping every deferred allocation.
    pub(crate) fn backtrack_to(&mut self, registry: &mut StateRegistry, mark: TrailMark) {
        while self.rev_ints.len() > mark.rev_ints {
            let cell = self.rev_ints.back();
            registry.restore_int(RevInt::create_from_index(cell.slot as usize), cell.old);
            self.rev_ints.pop();
        }
        while self.rev_int64s.len() > mark.rev_int64s {
            let cell = self.rev_int64s.back();
            registry.restore_int64(RevInt64::create_from_index(cell.slot as usize), cell.old);
            self.rev_int64s.pop();
        }
        while self.rev_u64s.len() > mark.rev_u64s {
            let cell = self.rev_u64s.back();
            registry.restore_u64(RevU64::create_from_index(cell.slot as usize), cell.old);
            self.rev_u64s.pop();
        }
        while self.rev_ptrs.len() > mark.rev_ptrs {
            let cell = self.rev_ptrs.back();
            registry.restore_ptr(RevPtr::create_from_index(cell.slot as usize), cell.old);
            self.rev_ptrs.pop();
        }
        while self.rev_bool_keys.len() > mark.rev_bools {
            let key = self.rev_bool_keys.pop().unwrap();
            let old = self.rev_bool_values.pop().unwrap();
            registry.restore_bool(key, old);
        }
        self.rev_int_arrays.truncate(mark.rev_int_arrays);
        self.rev_int64_arrays.truncate(mark.rev_int64_arrays);
        self.rev_u64_arrays.truncate(mark.rev_u64_arrays);
        while self.rev_objects.len() > mark.rev_objects {
            let _ = self.rev_objects.pop();
        }
        while self.rev_object_arrays.len() > mark.rev_object_arrays {
            let _ = self.rev_object_arrays.pop();
        }
    }

    /// The engine's own accounting of trail memory, used for
    /// `memory_usage_bytes`.
    pub(crate) fn memory_usage_bytes(&self) -> usize {
        self.rev_ints.memory_usage_bytes()
            + self.rev_int64s.memory_usage_bytes()
            + self.rev_u64s.memory_usage_bytes()
            + self.rev_ptrs.memory_usage_bytes()
            + self.rev_bool_keys.capacity() * std::mem::size_of::<RevBool>()
            + self.rev_bool_values.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trail() -> (Trail, StateRegistry) {
        (
            Trail::new(16, TrailCompression::None),
            StateRegistry::default(),
        )
    }

    #[test]
    fn backtracking_restores_saved_scalars() {
        let (mut trail, mut registry) = trail();
        let x = registry.new_int(3);
        let y = registry.new_int64(-7);

        let mark = trail.mark();

        trail.save_int(x, registry.int(x));
        registry.write_int(x, 10);
        trail.save_int64(y, registry.int64(y));
        registry.write_int64(y, 99);

        assert_eq!(registry.int(x), 10);
        assert_eq!(registry.int64(y), 99);

        trail.backtrack_to(&mut registry, mark);

        assert_eq!(registry.int(x), 3);
        assert_eq!(registry.int64(y), -7);
    }

    #[test]
    fn repeated_saves_of_one_location_restore_the_outermost_value() {
        let (mut trail, mut registry) = trail();
        let x = registry.new_int(1);

        let mark = trail.mark();
        for value in 2..10 {
            trail.save_int(x, registry.int(x));
            registry.write_int(x, value);
        }

        trail.backtrack_to(&mut registry, mark);
        assert_eq!(registry.int(x), 1);
    }

    #[test]
    fn repeated_bool_saves_restore_in_lifo_order() {
        let (mut trail, mut registry) = trail();
        let flag = registry.new_bool(false);

        let mark = trail.mark();
        trail.save_bool(flag, registry.bool(flag));
        registry.write_bool(flag, true);
        trail.save_bool(flag, registry.bool(flag));
        registry.write_bool(flag, false);

        trail.backtrack_to(&mut registry, mark);
        assert!(!registry.bool(flag));
    }

    #[test]
    fn partial_backtrack_only_undoes_past_the_mark() {
        let (mut trail, mut registry) = trail();
        let x = registry.new_int(0);

        trail.save_int(x, registry.int(x));
        registry.write_int(x, 1);

        let mark = trail.mark();

        trail.save_int(x, registry.int(x));
        registry.write_int(x, 2);

        trail.backtrack_to(&mut registry, mark);
        assert_eq!(registry.int(x), 1);
    }

    #[test]
    fn deferred_objects_are_released_on_backtrack() {
        let (mut trail, mut registry) = trail();

        let object: Rc<dyn Any> = Rc::new(42_i32);
        let weak = Rc::downgrade(&Rc::clone(&object));

        let mark = trail.mark();
        trail.defer_destroy(object);
        assert!(weak.upgrade().is_some());

        trail.backtrack_to(&mut registry, mark);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn marks_are_restored_across_many_blocks() {
        let (mut trail, mut registry) = trail();
        let x = registry.new_int(0);

        let mark = trail.mark();
        // Push far more cells than a single block holds.
        for value in 1..=1000 {
            trail.save_int(x, registry.int(x));
            registry.write_int(x, value);
        }
        assert_eq!(registry.int(x), 1000);

        trail.backtrack_to(&mut registry, mark);
        assert_eq!(registry.int(x), 0);
        assert_eq!(trail.mark(), mark);
    }
}
