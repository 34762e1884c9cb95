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

/// Growth is triggered once buckets hold three quarters of a value on
/// average.
pub const MAX_LOAD_FACTOR: f64 = MAX_LOAD.as_f64();
/// Shrinking is triggered once buckets hold at most a quarter of a value on
/// average.
pub const MIN_LOAD_FACTOR: f64 = MIN_LOAD.as_f64();

const MAX_LOAD: LoadFactor = LoadFactor::new(3, 4);
const MIN_LOAD: LoadFactor = LoadFactor::new(1, 4);

/// Values sharing `hash % capacity`, in insertion order and without
/// duplicates.
type Bucket = Vec<i32>;

fn empty_buckets(capacity: usize) -> Vec<Bucket> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, Bucket::new);
    buckets
}

/// An integer hash set resolving collisions by separate chaining.
///
/// Every bucket holds the values whose hash lands on it, in the order they
/// were added. The load factor is measured over the whole table
/// (`size / capacity`), not per bucket: the table doubles at 0.75 and halves
/// at 0.25, down to a single bucket.
///
/// # Examples
///
/// ```rust
/// use probe_chain::HashTable;
/// use probe_chain::SeparateChainingHashTable;
///
/// let mut table = SeparateChainingHashTable::new();
/// table.extend(0..100);
/// assert_eq!(table.size(), 100);
/// assert!(table.capacity() >= 128);
///
/// for value in 0..100 {
///     table.remove(value);
/// }
/// assert!(table.empty());
/// ```
pub struct SeparateChainingHashTable {
    buckets: Vec<Bucket>,
    populated: usize,
    hasher: HashFunction,
    modifications: u64,
    id: TableId,
}

impl Clone for SeparateChainingHashTable {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            populated: self.populated,
            hasher: self.hasher.clone(),
            modifications: self.modifications,
            id: TableId::next(),
        }
    }
}

impl Debug for SeparateChainingHashTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Default for SeparateChainingHashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SeparateChainingHashTable {
    /// Creates an empty table with the default capacity and the
    /// [`fnv`](crate::hash_functions::fnv) hash function.
    pub fn new() -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, HashFunction::fnv())
    }

    /// Creates an empty table with the default capacity and the given hash
    /// function.
    pub fn with_hasher(hasher: HashFunction) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// Creates an empty table with `capacity` buckets.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, HashFunction::fnv())
    }

    /// Creates an empty table with `capacity` buckets and the given hash
    /// function.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: HashFunction) -> Self {
        Self {
            buckets: empty_buckets(capacity.max(1)),
            populated: 0,
            hasher,
            modifications: 0,
            id: TableId::next(),
        }
    }

    /// Returns the number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns an iterator over the values in bucket order, and in insertion
    /// order within a bucket.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            values: self.buckets.iter().flatten(),
            remaining: self.populated,
        }
    }

    /// Returns a fail-fast cursor positioned before the first bucket.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            bucket: 0,
            offset: 0,
            last_returned: None,
            table: self.id,
            expected_modifications: self.modifications,
        }
    }

    /// Returns a fail-fast cursor positioned after the last bucket, walking
    /// towards the first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use probe_chain::HashFunction;
    /// use probe_chain::SeparateChainingHashTable;
    ///
    /// let mut table = SeparateChainingHashTable::with_hasher(HashFunction::identity());
    /// table.extend([1, 17, 2]);
    ///
    /// let mut cursor = table.reverse_cursor();
    /// let mut seen = Vec::new();
    /// cursor.for_each_remaining(&table, |v| seen.push(v)).unwrap();
    /// assert_eq!(seen, [2, 17, 1]);
    /// ```
    pub fn reverse_cursor(&self) -> ReverseCursor {
        ReverseCursor {
            bucket: self.buckets.len(),
            offset: None,
            last_returned: None,
            table: self.id,
            expected_modifications: self.modifications,
        }
    }

    #[inline(always)]
    fn home(&self, value: i32) -> usize {
        self.hasher.hash(value) as usize % self.buckets.len()
    }

    /// Removes the value at `offset` of `bucket` without considering a shrink.
    fn erase(&mut self, bucket: usize, offset: usize) {
        self.buckets[bucket].remove(offset);
        self.populated -= 1;
        self.modifications += 1;
    }

    /// Rebuilds the table with `capacity` buckets, re-appending values in old
    /// bucket order and then old insertion order.
    #[cold]
    fn resize(&mut self, capacity: usize) {
        log::trace!(
            "separate chaining resize: {} -> {} buckets ({} values)",
            self.buckets.len(),
            capacity,
            self.populated
        );

        let old = core::mem::replace(&mut self.buckets, empty_buckets(capacity));
        for value in old.into_iter().flatten() {
            let home = self.home(value);
            self.buckets[home].push(value);
        }
        self.modifications += 1;
    }

    fn swap_storage(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.buckets, &mut other.buckets);
        core::mem::swap(&mut self.populated, &mut other.populated);
        core::mem::swap(&mut self.hasher, &mut other.hasher);
        self.modifications += 1;
        other.modifications += 1;
    }

    /// Returns a histogram of bucket lengths: entry `n` counts the buckets
    /// holding exactly `n` values.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn bucket_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        for bucket in &self.buckets {
            if hist.len() <= bucket.len() {
                hist.resize(bucket.len() + 1, 0);
            }
            hist[bucket.len()] += 1;
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
            capacity: self.buckets.len(),
            occupied_slots: self.buckets.iter().filter(|b| !b.is_empty()).count(),
            tombstones: 0,
            load_factor: LoadFactor::ratio(self.populated, self.buckets.len()),
            longest_run: self.buckets.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    /// Pretty-prints the bucket-length histogram using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_bucket_histogram(&self) {
        crate::hash_table::print_histogram(
            &alloc::format!("bucket histogram ({} values)", self.populated),
            &self.bucket_histogram(),
        );
    }
}

impl HashTable for SeparateChainingHashTable {
    fn size(&self) -> usize {
        self.populated
    }

    fn clear(&mut self) {
        let mut fresh = Vec::new();
        match fresh.try_reserve_exact(DEFAULT_CAPACITY) {
            Ok(()) => {
                fresh.resize_with(DEFAULT_CAPACITY, Bucket::new);
                self.buckets = fresh;
            }
            Err(err) => {
                log::debug!(
                    "separate chaining clear: {err}; emptying {} buckets in place",
                    self.buckets.len()
                );
                self.buckets.iter_mut().for_each(Vec::clear);
            }
        }

        self.populated = 0;
        self.modifications += 1;
    }

    fn swap(&mut self, other: Option<&mut dyn HashTable>) -> Result<()> {
        let other = other.ok_or(TableError::InvalidArgument)?;
        if let Some(other) = other.as_any_mut().downcast_mut::<Self>() {
            self.swap_storage(other);
            return Ok(());
        }

        log::debug!(
            "separate chaining swap by value: {} values out, {} values in",
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
        let home = self.home(value);
        if self.buckets[home].contains(&value) {
            return false;
        }

        self.buckets[home].push(value);
        self.populated += 1;
        self.modifications += 1;

        let capacity = self.buckets.len();
        if MAX_LOAD.reached_by(self.populated, capacity) {
            self.resize(grown_capacity(capacity));
        }
        true
    }

    fn remove(&mut self, value: i32) -> bool {
        let home = self.home(value);
        let Some(offset) = self.buckets[home].iter().position(|&v| v == value) else {
            return false;
        };

        self.erase(home, offset);

        let capacity = self.buckets.len();
        if MIN_LOAD.not_exceeded_by(self.populated, capacity)
            && let Some(capacity) = shrunk_capacity(capacity)
        {
            self.resize(capacity);
        }
        true
    }

    fn contains(&self, value: i32) -> bool {
        self.buckets[self.home(value)].contains(&value)
    }

    fn values(&self) -> Values<'_> {
        alloc::boxed::Box::new(self.iter())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl FromIterator<i32> for SeparateChainingHashTable {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl Extend<i32> for SeparateChainingHashTable {
    fn extend<I: IntoIterator<Item = i32>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a> IntoIterator for &'a SeparateChainingHashTable {
    type IntoIter = Iter<'a>;
    type Item = i32;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A borrowing iterator over the values of a [`SeparateChainingHashTable`].
///
/// This struct is created by [`SeparateChainingHashTable::iter`].
pub struct Iter<'a> {
    values: core::iter::Flatten<core::slice::Iter<'a, Bucket>>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        let value = *self.values.next()?;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let value = *self.values.next_back()?;
        self.remaining -= 1;
        Some(value)
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// A fail-fast forward cursor over a [`SeparateChainingHashTable`].
///
/// The cursor does not borrow the table; each call takes the table it was
/// created from, and any other table is rejected with
/// [`TableError::InvalidArgument`]. Any structural change made to the table
/// other than through [`Cursor::remove`] makes every later call fail with
/// [`TableError::ConcurrentStructuralChange`].
#[derive(Debug, Clone)]
pub struct Cursor {
    bucket: usize,
    offset: usize,
    last_returned: Option<(usize, usize)>,
    table: TableId,
    expected_modifications: u64,
}

impl Cursor {
    fn check(&self, table: &SeparateChainingHashTable) -> Result<()> {
        if table.id != self.table {
            return Err(TableError::InvalidArgument);
        }
        if table.modifications != self.expected_modifications {
            return Err(TableError::ConcurrentStructuralChange);
        }
        Ok(())
    }

    /// Position and value of the next value at or after the cursor.
    fn seek(&self, table: &SeparateChainingHashTable) -> Option<(usize, usize, i32)> {
        let mut offset = self.offset;
        for (bucket, values) in table.buckets.iter().enumerate().skip(self.bucket) {
            if let Some(&value) = values.get(offset) {
                return Some((bucket, offset, value));
            }
            offset = 0;
        }
        None
    }

    /// Returns `true` if [`next`](Cursor::next) would yield a value.
    pub fn has_next(&self, table: &SeparateChainingHashTable) -> Result<bool> {
        self.check(table)?;
        Ok(self.seek(table).is_some())
    }

    /// Advances to the next value.
    ///
    /// # Errors
    ///
    /// [`TableError::NoSuchElement`] once every value has been visited.
    pub fn next(&mut self, table: &SeparateChainingHashTable) -> Result<i32> {
        self.check(table)?;
        let (bucket, offset, value) = self.seek(table).ok_or(TableError::NoSuchElement)?;
        self.bucket = bucket;
        self.offset = offset + 1;
        self.last_returned = Some((bucket, offset));
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
    pub fn remove(&mut self, table: &mut SeparateChainingHashTable) -> Result<()> {
        self.check(table)?;
        let (bucket, offset) = self
            .last_returned
            .take()
            .ok_or(TableError::IllegalIteratorState)?;
        table.erase(bucket, offset);
        // Later values in the bucket moved down by one.
        self.offset = offset;
        self.expected_modifications = table.modifications;
        Ok(())
    }

    /// Feeds every remaining value to `action`.
    pub fn for_each_remaining(
        &mut self,
        table: &SeparateChainingHashTable,
        mut action: impl FnMut(i32),
    ) -> Result<()> {
        while self.has_next(table)? {
            action(self.next(table)?);
        }
        Ok(())
    }
}

/// A fail-fast reverse cursor over a [`SeparateChainingHashTable`].
///
/// Visits buckets from last to first and each bucket from its newest value to
/// its oldest: exactly the reverse of [`Cursor`].
#[derive(Debug, Clone)]
pub struct ReverseCursor {
    /// Buckets below this index are not fully visited.
    bucket: usize,
    /// Unvisited prefix length of bucket `bucket - 1`; `None` until entered.
    offset: Option<usize>,
    last_returned: Option<(usize, usize)>,
    table: TableId,
    expected_modifications: u64,
}

impl ReverseCursor {
    fn check(&self, table: &SeparateChainingHashTable) -> Result<()> {
        if table.id != self.table {
            return Err(TableError::InvalidArgument);
        }
        if table.modifications != self.expected_modifications {
            return Err(TableError::ConcurrentStructuralChange);
        }
        Ok(())
    }

    fn seek(&self, table: &SeparateChainingHashTable) -> Option<(usize, usize, i32)> {
        let mut limit = self.offset;
        for (bucket, values) in table
            .buckets
            .get(..self.bucket)?
            .iter()
            .enumerate()
            .rev()
        {
            let end = limit.unwrap_or(values.len()).min(values.len());
            if end > 0 {
                return Some((bucket, end - 1, values[end - 1]));
            }
            limit = None;
        }
        None
    }

    /// Returns `true` if [`previous`](ReverseCursor::previous) would yield a
    /// value.
    pub fn has_previous(&self, table: &SeparateChainingHashTable) -> Result<bool> {
        self.check(table)?;
        Ok(self.seek(table).is_some())
    }

    /// Steps back to the previous value.
    ///
    /// # Errors
    ///
    /// [`TableError::NoSuchElement`] once every value has been visited.
    pub fn previous(&mut self, table: &SeparateChainingHashTable) -> Result<i32> {
        self.check(table)?;
        let (bucket, offset, value) = self.seek(table).ok_or(TableError::NoSuchElement)?;
        self.bucket = bucket + 1;
        self.offset = Some(offset);
        self.last_returned = Some((bucket, offset));
        Ok(value)
    }

    /// Removes the value returned by the last call to
    /// [`previous`](ReverseCursor::previous).
    ///
    /// # Errors
    ///
    /// [`TableError::IllegalIteratorState`] unless the previous successful
    /// call on this cursor was `previous`.
    pub fn remove(&mut self, table: &mut SeparateChainingHashTable) -> Result<()> {
        self.check(table)?;
        let (bucket, offset) = self
            .last_returned
            .take()
            .ok_or(TableError::IllegalIteratorState)?;
        table.erase(bucket, offset);
        self.expected_modifications = table.modifications;
        Ok(())
    }

    /// Feeds every remaining value to `action`.
    pub fn for_each_remaining(
        &mut self,
        table: &SeparateChainingHashTable,
        mut action: impl FnMut(i32),
    ) -> Result<()> {
        while self.has_previous(table)? {
            action(self.previous(table)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use siphasher::sip::SipHasher;

    use super::*;
    use crate::LinearProbingHashTable;

    fn identity_table() -> SeparateChainingHashTable {
        SeparateChainingHashTable::with_hasher(HashFunction::identity())
    }

    fn filled(values: impl IntoIterator<Item = i32>) -> SeparateChainingHashTable {
        values.into_iter().collect()
    }

    fn sip_hasher() -> HashFunction {
        HashFunction::new(|value| {
            use core::hash::Hasher;

            let mut hasher = SipHasher::new_with_keys(7, 11);
            hasher.write_i32(value);
            (hasher.finish() >> 33) as u32
        })
    }

    #[test]
    fn colliding_values_share_a_bucket_in_insertion_order() {
        let mut table = identity_table();
        table.extend([33, 1, 17]);

        assert_eq!(table.buckets[1], vec![33, 1, 17]);
        assert_eq!(table.debug_stats().longest_run, 3);
        assert_eq!(table.iter().collect::<Vec<_>>(), [33, 1, 17]);
    }

    #[test]
    fn removal_keeps_remaining_bucket_order() {
        let mut table = identity_table();
        table.extend([33, 1, 17, 49]);

        assert!(table.remove(1));
        assert_eq!(table.buckets[1], vec![33, 17, 49]);
        assert!(!table.remove(1));
    }

    #[test]
    fn grows_at_three_quarters() {
        let mut table = identity_table();
        table.extend(0..11);
        assert_eq!(table.capacity(), 16);

        table.add(11);
        assert_eq!(table.capacity(), 32);
        for value in 0..12 {
            assert!(table.contains(value));
        }
    }

    #[test]
    fn shrinks_by_half_at_a_quarter() {
        let mut table = identity_table();
        table.extend(0..12);
        assert_eq!(table.capacity(), 32);

        for value in 0..3 {
            table.remove(value);
        }
        assert_eq!(table.capacity(), 32);

        table.remove(3);
        assert_eq!(table.capacity(), 16);
        for value in 4..12 {
            assert!(table.contains(value));
        }

        for value in 4..7 {
            table.remove(value);
        }
        assert_eq!(table.capacity(), 16);
        table.remove(7);
        assert_eq!(table.capacity(), 8);
        for value in 8..12 {
            table.remove(value);
        }
        assert_eq!(table.capacity(), 1);
        assert!(table.empty());
    }

    #[test]
    fn load_factor_constants_match_thresholds() {
        assert_eq!(MAX_LOAD_FACTOR, 0.75);
        assert_eq!(MIN_LOAD_FACTOR, 0.25);
        assert_eq!(MAX_LOAD_FACTOR, MAX_LOAD.as_f64());
        assert_eq!(MIN_LOAD_FACTOR, MIN_LOAD.as_f64());
    }

    #[test]
    fn default_capacity_is_not_a_floor() {
        let mut table = identity_table();
        table.extend(0..5);
        assert_eq!(table.capacity(), 16);

        assert!(table.remove(0));
        assert_eq!(table.capacity(), 8);
        for value in 1..5 {
            assert!(table.contains(value));
        }
    }

    #[test]
    fn resize_redistributes_by_new_capacity() {
        let mut table = identity_table();
        table.extend([1, 17, 33]);
        table.resize(32);

        assert_eq!(table.buckets[1], vec![1, 33]);
        assert_eq!(table.buckets[17], vec![17]);
        assert_eq!(table.size(), 3);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut table = SeparateChainingHashTable::with_capacity(0);
        assert_eq!(table.capacity(), 1);

        table.add(1);
        assert_eq!(table.capacity(), 2);
        table.remove(1);
        assert_eq!(table.capacity(), 1);
        assert!(table.add(1));
        assert!(table.contains(1));
    }

    #[test]
    fn custom_hash_function_spreads_values() {
        let mut table = SeparateChainingHashTable::with_hasher(sip_hasher());
        table.extend(0..1000);
        assert_eq!(table.size(), 1000);

        let stats = table.debug_stats();
        assert!(stats.load_factor < MAX_LOAD_FACTOR);
        assert!(stats.load_factor > MIN_LOAD_FACTOR);
        assert!(stats.longest_run < 16);
        assert_eq!(table.bucket_histogram().iter().sum::<usize>(), stats.capacity);
    }

    #[test]
    fn clear_restores_default_capacity() {
        let mut table = filled(0..100);
        assert!(table.capacity() > DEFAULT_CAPACITY);
        table.clear();
        assert_eq!(table.capacity(), DEFAULT_CAPACITY);
        assert_eq!(table.debug_stats().occupied_slots, 0);
    }

    #[test]
    fn cross_strategy_swap_exchanges_values() {
        let mut linear: LinearProbingHashTable = (0..10).collect();
        let mut chaining = filled(10..20);

        linear.swap(Some(&mut chaining)).unwrap();

        let mut held: Vec<i32> = linear.iter().collect();
        held.sort_unstable();
        assert_eq!(held, (10..20).collect::<Vec<_>>());

        let mut held: Vec<i32> = chaining.iter().collect();
        held.sort_unstable();
        assert_eq!(held, (0..10).collect::<Vec<_>>());
        assert_eq!(linear.size(), 10);
        assert_eq!(chaining.size(), 10);
    }

    #[test]
    fn same_strategy_swap_exchanges_storage() {
        let mut table = identity_table();
        table.extend([1, 17]);
        let mut other = filled(0..40);
        let other_capacity = other.capacity();

        table.swap(Some(&mut other)).unwrap();

        assert_eq!(table.size(), 40);
        assert_eq!(table.capacity(), other_capacity);
        assert_eq!(other.buckets[1], vec![1, 17]);
    }

    #[test]
    fn iteration_is_bucket_then_insertion_order() {
        let mut table = identity_table();
        table.extend([2, 18, 1, 17]);

        assert_eq!(table.iter().collect::<Vec<_>>(), [1, 17, 2, 18]);
        assert_eq!(table.iter().rev().collect::<Vec<_>>(), [18, 2, 17, 1]);
        assert_eq!((&table).into_iter().len(), 4);
    }

    #[test]
    fn cursor_visits_every_value_once() {
        let table = filled([1, 2, 3, 4, 5, 3]);
        let mut cursor = table.cursor();
        let mut seen = Vec::new();
        while cursor.has_next(&table).unwrap() {
            seen.push(cursor.next(&table).unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn reverse_cursor_mirrors_forward_cursor() {
        let mut table = identity_table();
        table.extend([2, 18, 34, 1, 17, 5]);

        let mut forward = Vec::new();
        table
            .cursor()
            .for_each_remaining(&table, |v| forward.push(v))
            .unwrap();

        let mut backward = Vec::new();
        table
            .reverse_cursor()
            .for_each_remaining(&table, |v| backward.push(v))
            .unwrap();

        assert_eq!(forward, [1, 17, 2, 18, 34, 5]);
        assert_eq!(backward, [5, 34, 18, 2, 17, 1]);
    }

    #[test]
    fn cursor_fails_fast_after_table_mutation() {
        let mut table = filled(1..=5);
        let mut cursor = table.cursor();
        cursor.next(&table).unwrap();

        table.remove(5);
        assert_eq!(
            cursor.has_next(&table),
            Err(TableError::ConcurrentStructuralChange)
        );
        assert_eq!(
            cursor.next(&table),
            Err(TableError::ConcurrentStructuralChange)
        );

        let mut reverse = table.reverse_cursor();
        table.add(5);
        assert_eq!(
            reverse.has_previous(&table),
            Err(TableError::ConcurrentStructuralChange)
        );
        assert_eq!(
            reverse.remove(&mut table),
            Err(TableError::ConcurrentStructuralChange)
        );
    }

    #[test]
    fn cursor_remove_requires_a_preceding_advance() {
        let mut table = filled(1..=5);
        let mut cursor = table.cursor();
        assert_eq!(
            cursor.remove(&mut table),
            Err(TableError::IllegalIteratorState)
        );

        let mut reverse = table.reverse_cursor();
        assert_eq!(
            reverse.remove(&mut table),
            Err(TableError::IllegalIteratorState)
        );
        reverse.previous(&table).unwrap();
        reverse.remove(&mut table).unwrap();
        assert_eq!(
            reverse.remove(&mut table),
            Err(TableError::IllegalIteratorState)
        );
        assert_eq!(table.size(), 4);
    }

    #[test]
    fn forward_cursor_removal_within_a_bucket() {
        let mut table = identity_table();
        table.extend([1, 17, 33, 2]);

        let mut cursor = table.cursor();
        let mut kept = Vec::new();
        while cursor.has_next(&table).unwrap() {
            let value = cursor.next(&table).unwrap();
            if value == 17 || value == 33 {
                cursor.remove(&mut table).unwrap();
            } else {
                kept.push(value);
            }
        }

        assert_eq!(kept, [1, 2]);
        assert_eq!(table.size(), 2);
        assert_eq!(table.buckets[1], vec![1]);
    }

    #[test]
    fn reverse_cursor_removal_within_a_bucket() {
        let mut table = identity_table();
        table.extend([1, 17, 33, 2]);

        let mut cursor = table.reverse_cursor();
        let mut visited = Vec::new();
        while cursor.has_previous(&table).unwrap() {
            let value = cursor.previous(&table).unwrap();
            visited.push(value);
            if value == 17 {
                cursor.remove(&mut table).unwrap();
            }
        }

        assert_eq!(visited, [2, 33, 17, 1]);
        assert_eq!(table.buckets[1], vec![1, 33]);
    }

    #[test]
    fn cursor_rejects_a_foreign_table() {
        let mut table = identity_table();
        table.add(15);
        let mut other = identity_table();
        other.add(1);
        assert_eq!(table.modifications, other.modifications);

        let mut cursor = table.cursor();
        assert_eq!(cursor.next(&table), Ok(15));
        assert_eq!(cursor.remove(&mut other), Err(TableError::InvalidArgument));
        assert_eq!(cursor.has_next(&other), Err(TableError::InvalidArgument));
        assert_eq!(other.size(), 1);
        assert_eq!(other.buckets[1], vec![1]);

        let mut reverse = table.reverse_cursor();
        assert_eq!(reverse.has_previous(&other), Err(TableError::InvalidArgument));
        assert_eq!(reverse.previous(&table), Ok(15));
        assert_eq!(reverse.remove(&mut other), Err(TableError::InvalidArgument));

        assert_eq!(cursor.remove(&mut table), Ok(()));
        assert!(table.empty());
    }

    #[test]
    fn cursor_rejects_a_clone_of_its_table() {
        let table = filled(1..=5);
        let mut copy = table.clone();
        let mut cursor = table.cursor();
        cursor.next(&table).unwrap();

        assert_eq!(cursor.remove(&mut copy), Err(TableError::InvalidArgument));
        assert_eq!(copy.size(), 5);
    }

    #[test]
    fn cursor_reports_exhaustion() {
        let table = filled(1..=5);
        let mut cursor = table.cursor();
        for _ in 0..5 {
            cursor.next(&table).unwrap();
        }
        assert!(!cursor.has_next(&table).unwrap());
        assert_eq!(cursor.next(&table), Err(TableError::NoSuchElement));

        let mut reverse = table.reverse_cursor();
        for _ in 0..4 {
            reverse.previous(&table).unwrap();
            assert!(reverse.has_previous(&table).unwrap());
        }
        reverse.previous(&table).unwrap();
        assert_eq!(reverse.previous(&table), Err(TableError::NoSuchElement));
    }

    #[test]
    fn cursor_drain_leaves_table_usable() {
        let mut table = filled(0..200);
        let mut cursor = table.cursor();
        while cursor.has_next(&table).unwrap() {
            cursor.next(&table).unwrap();
            cursor.remove(&mut table).unwrap();
        }

        assert!(table.empty());
        assert!(table.add(3));
        assert!(table.contains(3));
    }
}
