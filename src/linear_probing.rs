use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::error::Result;
use crate::error::TableError;
use crate::hash_functions::HashFunction;
use crate::hash_table::DEFAULT_CAPACITY;
use crate::hash_table::HashTable;
use crate::hash_table::LoadFactor;
use crate::hash_table::TableId;
use crate::hash_table::Values;
use crate::hash_table::grown_capacity;
use crate::hash_table::shrunk_capacity;

/// Growth is triggered once half of the slots hold values.
pub const MAX_LOAD_FACTOR: f64 = MAX_LOAD.as_f64();
/// Shrinking is triggered once at most an eighth of the slots hold values.
pub const MIN_LOAD_FACTOR: f64 = MIN_LOAD.as_f64();

const MAX_LOAD: LoadFactor = LoadFactor::new(1, 2);
const MIN_LOAD: LoadFactor = LoadFactor::new(1, 8);

/// State of a single slot.
///
/// Lookups treat a tombstone as "keep probing", since the value being searched
/// for may have been placed beyond it before the removal. Insertions treat a
/// tombstone as free. Only an empty slot ends a probe sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Empty,
    Occupied(i32),
    Tombstone,
}

impl Slot {
    #[inline(always)]
    fn value(&self) -> Option<i32> {
        match *self {
            Slot::Occupied(value) => Some(value),
            _ => None,
        }
    }
}

/// An integer hash set resolving collisions by linear probing.
///
/// All values live directly in one array of slots. A value's home slot is
/// `hash(value) % capacity`; on collision the next slot is tried, wrapping at
/// the end. Removal leaves a tombstone so probe sequences running through the
/// slot stay intact.
///
/// The table doubles once half of its slots hold values and halves once at
/// most an eighth do, down to a single slot.
///
/// # Examples
///
/// ```rust
/// use probe_chain::HashTable;
/// use probe_chain::LinearProbingHashTable;
///
/// let mut table = LinearProbingHashTable::new();
/// assert!(table.add(5));
/// assert!(!table.add(5));
/// assert!(table.contains(5));
/// assert!(table.remove(5));
/// assert!(table.empty());
/// ```
pub struct LinearProbingHashTable {
    slots: Vec<Slot>,
    populated: usize,
    tombstones: usize,
    hasher: HashFunction,
    modifications: u64,
    id: TableId,
}

impl Clone for LinearProbingHashTable {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            populated: self.populated,
            tombstones: self.tombstones,
            hasher: self.hasher.clone(),
            modifications: self.modifications,
            id: TableId::next(),
        }
    }
}

impl Debug for LinearProbingHashTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Default for LinearProbingHashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearProbingHashTable {
    /// Creates an empty table with the default capacity and the
    /// [`mix`](crate::hash_functions::mix) hash function.
    pub fn new() -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, HashFunction::mix())
    }

    /// Creates an empty table with the default capacity and the given hash
    /// function.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_chain::HashFunction;
    /// use probe_chain::HashTable;
    /// use probe_chain::LinearProbingHashTable;
    ///
    /// let mut table = LinearProbingHashTable::with_hasher(HashFunction::identity());
    /// table.extend([3, 1, 2]);
    ///
    /// // With the identity hash, layout order is numeric order.
    /// assert_eq!(table.iter().collect::<Vec<_>>(), [1, 2, 3]);
    /// ```
    pub fn with_hasher(hasher: HashFunction) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// Creates an empty table with `capacity` slots.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, HashFunction::mix())
    }

    /// Creates an empty table with `capacity` slots and the given hash
    /// function.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: HashFunction) -> Self {
        Self {
            slots: vec![Slot::Empty; capacity.max(1)],
            populated: 0,
            tombstones: 0,
            hasher,
            modifications: 0,
            id: TableId::next(),
        }
    }

    /// Returns the number of slots in the backing store.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns an iterator over the values in slot order.
    ///
    /// The iterator is double ended; `iter().rev()` yields exactly the
    /// reverse sequence.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns a fail-fast cursor positioned before the first slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_chain::HashTable;
    /// use probe_chain::LinearProbingHashTable;
    /// use probe_chain::TableError;
    ///
    /// let mut table: LinearProbingHashTable = (1..=5).collect();
    /// let mut cursor = table.cursor();
    ///
    /// let first = cursor.next(&table).unwrap();
    /// cursor.remove(&mut table).unwrap();
    /// assert!(!table.contains(first));
    /// assert_eq!(table.size(), 4);
    ///
    /// table.add(6);
    /// assert_eq!(
    ///     cursor.next(&table),
    ///     Err(TableError::ConcurrentStructuralChange)
    /// );
    /// ```
    pub fn cursor(&self) -> Cursor {
        Cursor {
            next_index: 0,
            last_returned: None,
            table: self.id,
            expected_modifications: self.modifications,
        }
    }

    /// Returns a fail-fast cursor positioned after the last slot, walking
    /// towards the first.
    pub fn reverse_cursor(&self) -> ReverseCursor {
        ReverseCursor {
            remaining: self.slots.len(),
            last_returned: None,
            table: self.id,
            expected_modifications: self.modifications,
        }
    }

    #[inline(always)]
    fn home(&self, value: i32) -> usize {
        self.hasher.hash(value) as usize % self.slots.len()
    }

    /// Returns the slot index holding `value`.
    ///
    /// Probing stops at the first empty slot, or after visiting every slot
    /// once when tombstones have filled all the gaps.
    fn find(&self, value: i32) -> Option<usize> {
        let capacity = self.slots.len();
        let mut index = self.home(value);
        for _ in 0..capacity {
            match self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied(existing) if existing == value => return Some(index),
                Slot::Occupied(_) | Slot::Tombstone => {}
            }
            index = (index + 1) % capacity;
        }
        None
    }

    /// Returns the first empty or tombstoned slot of `value`'s probe
    /// sequence, visiting every slot at most once.
    fn free_slot(&self, value: i32) -> Option<usize> {
        let capacity = self.slots.len();
        let mut index = self.home(value);
        for _ in 0..capacity {
            if self.slots[index].value().is_none() {
                return Some(index);
            }
            index = (index + 1) % capacity;
        }
        None
    }

    /// Writes `value` into the first free slot of its probe sequence.
    ///
    /// The caller must have checked that `value` is absent. The load limit
    /// keeps a free slot around; should every slot hold a value anyway, the
    /// table grows first.
    fn place(&mut self, value: i32) {
        let Some(index) = self.free_slot(value) else {
            self.resize(grown_capacity(self.slots.len()));
            return self.place(value);
        };

        if self.slots[index] == Slot::Tombstone {
            self.tombstones -= 1;
        }
        self.slots[index] = Slot::Occupied(value);
        self.populated += 1;
    }

    /// Tombstones the slot at `index` without considering a shrink.
    fn erase(&mut self, index: usize) {
        debug_assert!(self.slots[index].value().is_some());

        self.slots[index] = Slot::Tombstone;
        self.populated -= 1;
        self.tombstones += 1;
        self.modifications += 1;
    }

    fn maybe_grow(&mut self) {
        let capacity = self.slots.len();
        if MAX_LOAD.reached_by(self.populated, capacity) {
            self.resize(grown_capacity(capacity));
        } else if MAX_LOAD.reached_by(self.populated + self.tombstones, capacity) {
            self.resize(capacity);
        }
    }

    fn maybe_shrink(&mut self) {
        let capacity = self.slots.len();
        if MIN_LOAD.not_exceeded_by(self.populated, capacity)
            && let Some(capacity) = shrunk_capacity(capacity)
        {
            self.resize(capacity);
        }
    }

    /// Rebuilds the table with `capacity` slots.
    ///
    /// Probe positions depend on the capacity, so every value is placed again
    /// in old slot order. Tombstones are dropped.
    #[cold]
    fn resize(&mut self, capacity: usize) {
        log::trace!(
            "linear probing resize: {} -> {} slots ({} values, {} tombstones)",
            self.slots.len(),
            capacity,
            self.populated,
            self.tombstones
        );

        let old = core::mem::replace(&mut self.slots, vec![Slot::Empty; capacity]);
        self.populated = 0;
        self.tombstones = 0;
        for value in old.iter().filter_map(Slot::value) {
            self.place(value);
        }
        self.modifications += 1;
    }

    fn swap_storage(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.slots, &mut other.slots);
        core::mem::swap(&mut self.populated, &mut other.populated);
        core::mem::swap(&mut self.tombstones, &mut other.tombstones);
        core::mem::swap(&mut self.hasher, &mut other.hasher);
        self.modifications += 1;
        other.modifications += 1;
    }

    /// Returns a histogram of probe distances: entry `d` counts the values
    /// stored `d` slots past their home slot.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let capacity = self.slots.len();
        let mut hist = Vec::new();
        for (index, value) in self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.value().map(|value| (index, value)))
        {
            let distance = (index + capacity - self.home(value)) % capacity;
            if hist.len() <= distance {
                hist.resize(distance + 1, 0);
            }
            hist[distance] += 1;
        }
        hist
    }

    /// Returns layout statistics for debugging.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        crate::hash_table::DebugStats {
            populated: self.populated,
            capacity: self.slots.len(),
            occupied_slots: self.populated + self.tombstones,
            tombstones: self.tombstones,
            load_factor: LoadFactor::ratio(self.populated, self.slots.len()),
            longest_run: self.probe_histogram().len().saturating_sub(1),
        }
    }

    /// Pretty-prints the probe-distance histogram using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        crate::hash_table::print_histogram(
            &alloc::format!("probe histogram ({} values)", self.populated),
            &self.probe_histogram(),
        );
    }
}

impl HashTable for LinearProbingHashTable {
    fn size(&self) -> usize {
        self.populated
    }

    fn clear(&mut self) {
        let mut fresh = Vec::new();
        match fresh.try_reserve_exact(DEFAULT_CAPACITY) {
            Ok(()) => {
                fresh.resize(DEFAULT_CAPACITY, Slot::Empty);
                self.slots = fresh;
            }
            Err(err) => {
                log::debug!(
                    "linear probing clear: {err}; resetting {} slots in place",
                    self.slots.len()
                );
                self.slots.fill(Slot::Empty);
            }
        }

        self.populated = 0;
        self.tombstones = 0;
        self.modifications += 1;
    }

    fn swap(&mut self, other: Option<&mut dyn HashTable>) -> Result<()> {
        let other = other.ok_or(TableError::InvalidArgument)?;
        if let Some(other) = other.as_any_mut().downcast_mut::<Self>() {
            self.swap_storage(other);
            return Ok(());
        }

        log::debug!(
            "linear probing swap by value: {} values out, {} values in",
            self.populated,
            other.size()
        );

        let mut incoming = Self::with_hasher(self.hasher.clone());
        for value in other.values() {
            incoming.add(value);
        }

        other.clear();
        for value in self.iter() {
            other.add(value);
        }

        self.swap_storage(&mut incoming);
        Ok(())
    }

    fn add(&mut self, value: i32) -> bool {
        if self.contains(value) {
            return false;
        }

        self.place(value);
        self.modifications += 1;
        self.maybe_grow();
        true
    }

    fn remove(&mut self, value: i32) -> bool {
        let Some(index) = self.find(value) else {
            return false;
        };

        self.erase(index);
        self.maybe_shrink();
        true
    }

    fn contains(&self, value: i32) -> bool {
        self.find(value).is_some()
    }

    fn values(&self) -> Values<'_> {
        alloc::boxed::Box::new(self.iter())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl FromIterator<i32> for LinearProbingHashTable {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl Extend<i32> for LinearProbingHashTable {
    fn extend<I: IntoIterator<Item = i32>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a> IntoIterator for &'a LinearProbingHashTable {
    type IntoIter = Iter<'a>;
    type Item = i32;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A borrowing iterator over the values of a [`LinearProbingHashTable`] in
/// slot order.
///
/// This struct is created by [`LinearProbingHashTable::iter`].
pub struct Iter<'a> {
    slots: core::slice::Iter<'a, Slot>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.slots.find_map(Slot::value)?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let value = self.slots.by_ref().rev().find_map(Slot::value)?;
        self.remaining -= 1;
        Some(value)
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// A fail-fast forward cursor over a [`LinearProbingHashTable`].
///
/// The cursor does not borrow the table; each call takes the table it was
/// created from, and any other table is rejected with
/// [`TableError::InvalidArgument`]. Any structural change made to the table
/// other than through [`Cursor::remove`] makes every later call fail with
/// [`TableError::ConcurrentStructuralChange`].
#[derive(Debug, Clone)]
pub struct Cursor {
    next_index: usize,
    last_returned: Option<usize>,
    table: TableId,
    expected_modifications: u64,
}

impl Cursor {
    fn check(&self, table: &LinearProbingHashTable) -> Result<()> {
        if table.id != self.table {
            return Err(TableError::InvalidArgument);
        }
        if table.modifications != self.expected_modifications {
            return Err(TableError::ConcurrentStructuralChange);
        }
        Ok(())
    }

    fn seek(&self, table: &LinearProbingHashTable) -> Option<(usize, i32)> {
        table
            .slots
            .get(self.next_index..)?
            .iter()
            .enumerate()
            .find_map(|(offset, slot)| slot.value().map(|value| (self.next_index + offset, value)))
    }

    /// Returns `true` if [`next`](Cursor::next) would yield a value.
    pub fn has_next(&self, table: &LinearProbingHashTable) -> Result<bool> {
        self.check(table)?;
        Ok(self.seek(table).is_some())
    }

    /// Advances to the next value in slot order.
    ///
    /// # Errors
    ///
    /// [`TableError::NoSuchElement`] once every value has been visited.
    pub fn next(&mut self, table: &LinearProbingHashTable) -> Result<i32> {
        self.check(table)?;
        let (index, value) = self.seek(table).ok_or(TableError::NoSuchElement)?;
        self.next_index = index + 1;
        self.last_returned = Some(index);
        Ok(value)
    }

    /// Removes the value returned by the last call to [`next`](Cursor::next).
    ///
    /// The cursor stays valid. A removal through the cursor never shrinks the
    /// table; the next removal through the table re-evaluates the load.
    ///
    /// # Errors
    ///
    /// [`TableError::IllegalIteratorState`] unless the previous successful
    /// call on this cursor was `next`.
    pub fn remove(&mut self, table: &mut LinearProbingHashTable) -> Result<()> {
        self.check(table)?;
        let index = self
            .last_returned
            .take()
            .ok_or(TableError::IllegalIteratorState)?;
        table.erase(index);
        self.expected_modifications = table.modifications;
        Ok(())
    }

    /// Feeds every remaining value to `action`.
    pub fn for_each_remaining(
        &mut self,
        table: &LinearProbingHashTable,
        mut action: impl FnMut(i32),
    ) -> Result<()> {
        while self.has_next(table)? {
            action(self.next(table)?);
        }
        Ok(())
    }
}

/// A fail-fast reverse cursor over a [`LinearProbingHashTable`].
///
/// Visits values in exactly the reverse order of [`Cursor`], with the same
/// fail-fast rules.
#[derive(Debug, Clone)]
pub struct ReverseCursor {
    remaining: usize,
    last_returned: Option<usize>,
    table: TableId,
    expected_modifications: u64,
}

impl ReverseCursor {
    fn check(&self, table: &LinearProbingHashTable) -> Result<()> {
        if table.id != self.table {
            return Err(TableError::InvalidArgument);
        }
        if table.modifications != self.expected_modifications {
            return Err(TableError::ConcurrentStructuralChange);
        }
        Ok(())
    }

    fn seek(&self, table: &LinearProbingHashTable) -> Option<(usize, i32)> {
        table
            .slots
            .get(..self.remaining)?
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, slot)| slot.value().map(|value| (index, value)))
    }

    /// Returns `true` if [`previous`](ReverseCursor::previous) would yield a
    /// value.
    pub fn has_previous(&self, table: &LinearProbingHashTable) -> Result<bool> {
        self.check(table)?;
        Ok(self.seek(table).is_some())
    }

    /// Steps back to the previous value in slot order.
    ///
    /// # Errors
    ///
    /// [`TableError::NoSuchElement`] once every value has been visited.
    pub fn previous(&mut self, table: &LinearProbingHashTable) -> Result<i32> {
        self.check(table)?;
        let (index, value) = self.seek(table).ok_or(TableError::NoSuchElement)?;
        self.remaining = index;
        self.last_returned = Some(index);
        Ok(value)
    }

    /// Removes the value returned by the last call to
    /// [`previous`](ReverseCursor::previous).
    ///
    /// # Errors
    ///
    /// [`TableError::IllegalIteratorState`] unless the previous successful
    /// call on this cursor was `previous`.
    pub fn remove(&mut self, table: &mut LinearProbingHashTable) -> Result<()> {
        self.check(table)?;
        let index = self
            .last_returned
            .take()
            .ok_or(TableError::IllegalIteratorState)?;
        table.erase(index);
        self.expected_modifications = table.modifications;
        Ok(())
    }

    /// Feeds every remaining value to `action`.
    pub fn for_each_remaining(
        &mut self,
        table: &LinearProbingHashTable,
        mut action: impl FnMut(i32),
    ) -> Result<()> {
        while self.has_previous(table)? {
            action(self.previous(table)?);
        }
        Ok(())
    }
}
