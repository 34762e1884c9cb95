use alloc::boxed::Box;
use core::any::Any;
use core::sync::atomic::AtomicU64;
use core::sync::atomic::Ordering;

use crate::error::Result;

/// Backing-store length of a freshly created or cleared table.
pub const DEFAULT_CAPACITY: usize = 16;

/// Factor by which tables grow and shrink.
pub const RESIZE_FACTOR: usize = 2;

/// A load factor kept as an exact fraction so threshold checks never round.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LoadFactor {
    numerator: usize,
    denominator: usize,
}

impl LoadFactor {
    pub(crate) const fn new(numerator: usize, denominator: usize) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// `populated / capacity >= self`
    #[inline(always)]
    pub(crate) fn reached_by(self, populated: usize, capacity: usize) -> bool {
        populated * self.denominator >= capacity * self.numerator
    }

    /// `populated / capacity <= self`
    #[inline(always)]
    pub(crate) fn not_exceeded_by(self, populated: usize, capacity: usize) -> bool {
        populated * self.denominator <= capacity * self.numerator
    }

    pub(crate) const fn as_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn ratio(populated: usize, capacity: usize) -> f64 {
        if capacity == 0 {
            0.0
        } else {
            populated as f64 / capacity as f64
        }
    }
}

#[inline(always)]
pub(crate) fn grown_capacity(capacity: usize) -> usize {
    capacity.saturating_mul(RESIZE_FACTOR)
}

/// `None` once halving would leave no slot at all.
#[inline(always)]
pub(crate) fn shrunk_capacity(capacity: usize) -> Option<usize> {
    let shrunk = capacity / RESIZE_FACTOR;
    (shrunk > 0).then_some(shrunk)
}

/// Identity of one table instance, checked by cursors so that a cursor is
/// only ever applied to the table that created it.
///
/// Clones get a fresh id. Swaps leave ids in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TableId(u64);

impl TableId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Boxed double-ended iterator returned by [`HashTable::values`].
pub type Values<'a> = Box<dyn DoubleEndedIterator<Item = i32> + 'a>;

/// The capability contract shared by every collision strategy.
///
/// Both [`LinearProbingHashTable`](crate::LinearProbingHashTable) and
/// [`SeparateChainingHashTable`](crate::SeparateChainingHashTable) implement
/// it, so code written against `dyn HashTable` works with either and the two
/// can exchange contents through [`swap`](HashTable::swap).
///
/// # Examples
///
/// ```rust
/// use probe_chain::HashTable;
/// use probe_chain::LinearProbingHashTable;
/// use probe_chain::SeparateChainingHashTable;
///
/// let probing: Box<dyn HashTable> = Box::new(LinearProbingHashTable::new());
/// let chaining: Box<dyn HashTable> = Box::new(SeparateChainingHashTable::new());
///
/// for mut table in [probing, chaining] {
///     assert!(table.add(3));
///     assert!(!table.add(3));
///     assert!(table.contains(3));
///     assert_eq!(table.size(), 1);
/// }
/// ```
pub trait HashTable: Any {
    /// Returns the number of values stored in the table.
    fn size(&self) -> usize;

    /// Returns `true` if the table holds no values.
    fn empty(&self) -> bool {
        self.size() == 0
    }

    /// Removes every value and returns the table to its default capacity.
    ///
    /// If the fresh backing store cannot be allocated, the current one is
    /// reset in place instead.
    fn clear(&mut self);

    /// Exchanges the contents of two tables.
    ///
    /// Tables of the same strategy trade their backing stores, sizes and hash
    /// functions without touching a value. Tables of different strategies
    /// trade their values: each side ends up holding the other's values under
    /// its own strategy and keeps its own hash function.
    ///
    /// # Errors
    ///
    /// [`TableError::InvalidArgument`](crate::TableError::InvalidArgument) if
    /// `other` is `None`.
    fn swap(&mut self, other: Option<&mut dyn HashTable>) -> Result<()>;

    /// Adds `value`, returning `true` if the table changed.
    fn add(&mut self, value: i32) -> bool;

    /// Removes `value`, returning `true` if the table changed.
    fn remove(&mut self, value: i32) -> bool;

    /// Returns `true` if the table holds `value`.
    fn contains(&self, value: i32) -> bool;

    /// Returns an iterator over the values in table layout order.
    ///
    /// Reverse it with [`Iterator::rev`] to visit the same values in exactly
    /// the opposite order.
    fn values(&self) -> Values<'_>;

    /// Upcast used by [`swap`](HashTable::swap) to recognize a partner of the
    /// same strategy.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Statistics for inspecting table layout.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq)]
pub struct DebugStats {
    /// Number of values currently in the table
    pub populated: usize,
    /// Length of the backing store
    pub capacity: usize,
    /// Slots holding a value or a tombstone, or buckets holding at least one
    /// value
    pub occupied_slots: usize,
    /// Tombstoned slots (always zero for chaining)
    pub tombstones: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Longest probe distance (open addressing) or bucket length (chaining)
    pub longest_run: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Slot Usage: {}/{} ({} tombstones)",
            self.occupied_slots, self.capacity, self.tombstones
        );
        println!("Longest run: {}", self.longest_run);
    }
}

/// Prints a histogram as a horizontal bar chart, one row per bin.
#[cfg(all(any(test, feature = "stats"), feature = "std"))]
pub fn print_histogram(title: &str, hist: &[usize]) {
    let max = hist.iter().copied().max().unwrap_or(0);
    if max == 0 {
        println!("{title}: empty");
        return;
    }

    let max_bar = 60usize;
    println!("{title}:");
    for (i, &count) in hist.iter().enumerate() {
        let width = (count * max_bar).div_ceil(max);
        println!("{:>3} | {} ({})", i, "█".repeat(width), count);
    }
}
