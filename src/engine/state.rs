//! Storage for the solver's reversible scalars.
//!
//! Every reversible location is a slot in the [`StateRegistry`], addressed by
//! a typed `Copy` key. Mutations go through the solver, which trails the old
//! value before writing; the registry itself only knows how to read, write
//! and grow. Keying by slot rather than by raw address keeps the trail cells
//! small and stable across moves of the backing storage.

use crate::containers::KeyedVec;
use crate::containers::StorageKey;

macro_rules! reversible_key {
    ($(#[$documentation:meta])* $name:ident) => {
        $(#[$documentation])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name {
            id: u32,
        }

        impl Default for $name {
            fn default() -> Self {
                Self { id: u32::MAX }
            }
        }

        impl StorageKey for $name {
            fn index(&self) -> usize {
                self.id as usize
            }

            fn create_from_index(index: usize) -> Self {
                Self { id: index as u32 }
            }
        }
    };
}

reversible_key!(
    /// Key of a reversible `i32`.
    RevInt
);
reversible_key!(
    /// Key of a reversible `i64`.
    RevInt64
);
reversible_key!(
    /// Key of a reversible `u64`.
    RevU64
);
reversible_key!(
    /// Key of a reversible opaque handle; clients store indices into their
    /// own structures in it (list heads, cursor positions and the like).
    RevPtr
);
reversible_key!(
    /// Key of a reversible `bool`.
    RevBool
);

/// The backing storage of all reversible scalars, one arena per primitive
/// kind.
#[derive(Default, Debug)]
pub(crate) struct StateRegistry {
    ints: KeyedVec<RevInt, i32>,
    int64s: KeyedVec<RevInt64, i64>,
    u64s: KeyedVec<RevU64, u64>,
    ptrs: KeyedVec<RevPtr, u64>,
    bools: KeyedVec<RevBool, bool>,
}

impl StateRegistry {
    pub(crate) fn new_int(&mut self, initial: i32) -> RevInt {
        self.ints.push(initial)
    }

    pub(crate) fn new_int64(&mut self, initial: i64) -> RevInt64 {
        self.int64s.push(initial)
    }

    pub(crate) fn new_u64(&mut self, initial: u64) -> RevU64 {
        self.u64s.push(initial)
    }

    pub(crate) fn new_ptr(&mut self, initial: u64) -> RevPtr {
        self.ptrs.push(initial)
    }

    pub(crate) fn new_bool(&mut self, initial: bool) -> RevBool {
        self.bools.push(initial)
    }

    pub(crate) fn int(&self, key: RevInt) -> i32 {
        self.ints[key]
    }

    pub(crate) fn int64(&self, key: RevInt64) -> i64 {
        self.int64s[key]
    }

    pub(crate) fn u64(&self, key: RevU64) -> u64 {
        self.u64s[key]
    }

    pub(crate) fn ptr(&self, key: RevPtr) -> u64 {
        self.ptrs[key]
    }

    pub(crate) fn bool(&self, key: RevBool) -> bool {
        self.bools[key]
    }

    // Raw writes; callers are responsible for trailing the old value first
    // when the write must be reversible.

    pub(crate) fn write_int(&mut self, key: RevInt, value: i32) {
        self.ints[key] = value;
    }

    pub(crate) fn write_int64(&mut self, key: RevInt64, value: i64) {
        self.int64s[key] = value;
    }

    pub(crate) fn write_u64(&mut self, key: RevU64, value: u64) {
        self.u64s[key] = value;
    }

    pub(crate) fn write_ptr(&mut self, key: RevPtr, value: u64) {
        self.ptrs[key] = value;
    }

    pub(crate) fn write_bool(&mut self, key: RevBool, value: bool) {
        self.bools[key] = value;
    }

    // Restores, invoked by the trail while backtracking.

    pub(crate) fn restore_int(&mut self, key: RevInt, old: i32) {
        self.ints[key] = old;
    }

    pub(crate) fn restore_int64(&mut self, key: RevInt64, old: i64) {
        self.int64s[key] = old;
    }

    pub(crate) fn restore_u64(&mut self, key: RevU64, old: u64) {
        self.u64s[key] = old;
    }

    pub(crate) fn restore_ptr(&mut self, key: RevPtr, old: u64) {
        self.ptrs[key] = old;
    }

    pub(crate) fn restore_bool(&mut self, key: RevBool, old: bool) {
        self.bools[key] = old;
    }

    pub(crate) fn memory_usage_bytes(&self) -> usize {
        self.ints.len() * std::mem::size_of::<i32>()
            + self.int64s.len() * std::mem::size_of::<i64>()
            + self.u64s.len() * std::mem::size_of::<u64>()
            + self.ptrs.len() * std::mem::size_of::<u64>()
            + self.bools.len()
    }
}
