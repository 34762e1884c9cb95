use alloc::sync::Arc;
use core::fmt::Debug;

const MIX_MULTIPLIER: u32 = 0x045d_9f3b;

const FNV_32_INIT: u32 = 0x811c_9dc5;
const FNV_32_PRIME: u32 = 0x0100_0193;

#[cfg(feature = "foldhash")]
const FOLD_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Clears the sign bit so results stay in `0..=i32::MAX`.
///
/// The tables accept any `u32`, but keeping results in the positive `i32`
/// range lets the reference functions be stored anywhere a non-negative `i32`
/// is expected.
#[inline(always)]
fn clear_sign(hash: u32) -> u32 {
    hash & 0x7fff_ffff
}

/// Returns the value itself, reinterpreted as unsigned.
///
/// Useful for tests that need to predict home slots exactly.
#[inline]
pub fn identity(x: i32) -> u32 {
    x as u32
}

/// Two rounds of xor-shift-multiply mixing.
#[inline]
pub fn mix(x: i32) -> u32 {
    let mut x = x as u32;
    x = ((x >> 16) ^ x).wrapping_mul(MIX_MULTIPLIER);
    x = ((x >> 16) ^ x).wrapping_mul(MIX_MULTIPLIER);
    x = (x >> 16) ^ x;
    clear_sign(x)
}

/// FNV-1 style hashing over the four byte lanes of `x`.
///
/// Each lane is masked in place rather than shifted down, so the high lanes
/// contribute their full positional value.
#[inline]
pub fn fnv(x: i32) -> u32 {
    let x = x as u32;
    let lanes = [x & 0x0000_00ff, x & 0x0000_ff00, x & 0x00ff_0000, x & 0xff00_0000];

    let mut hash = FNV_32_INIT;
    for lane in lanes {
        hash ^= lane;
        hash = hash.wrapping_mul(FNV_32_PRIME);
    }
    clear_sign(hash)
}

/// foldhash with a fixed seed, folded down to 31 bits.
#[cfg(feature = "foldhash")]
#[inline]
pub fn fold(x: i32) -> u32 {
    use core::hash::BuildHasher;

    let hash = foldhash::fast::FixedState::with_seed(FOLD_SEED).hash_one(x);
    clear_sign((hash >> 32) as u32 ^ hash as u32)
}

/// A hash function shared by a table and its clones.
///
/// Tables take `hash(value) % capacity` as the home slot or bucket of a value,
/// so any deterministic function works; the quality of its low bits decides
/// how well values spread.
///
/// # Examples
///
/// ```rust
/// use probe_chain::HashFunction;
///
/// let modulo_seven = HashFunction::new(|x| x.rem_euclid(7) as u32);
/// assert_eq!(modulo_seven.hash(15), 1);
/// assert_eq!(HashFunction::identity().hash(42), 42);
/// ```
#[derive(Clone)]
pub struct HashFunction {
    f: Arc<dyn Fn(i32) -> u32 + Send + Sync>,
}

impl Debug for HashFunction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashFunction").finish_non_exhaustive()
    }
}

impl HashFunction {
    /// Wraps an arbitrary function.
    pub fn new(f: impl Fn(i32) -> u32 + Send + Sync + 'static) -> Self {
        Self { f: Arc::new(f) }
    }

    /// See [`identity`].
    pub fn identity() -> Self {
        Self::new(identity)
    }

    /// See [`mix`].
    pub fn mix() -> Self {
        Self::new(mix)
    }

    /// See [`fnv`].
    pub fn fnv() -> Self {
        Self::new(fnv)
    }

    /// See [`fold`].
    #[cfg(feature = "foldhash")]
    pub fn fold() -> Self {
        Self::new(fold)
    }

    /// Hashes `value`.
    #[inline(always)]
    pub fn hash(&self, value: i32) -> u32 {
        (self.f)(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_is_deterministic() {
        assert_eq!(mix(-44), mix(-44));
    }

    #[test]
    fn mix_separates_values() {
        assert_ne!(mix(100), mix(0));
    }

    #[test]
    fn fnv_is_deterministic() {
        assert_eq!(fnv(12), fnv(12));
    }

    #[test]
    fn fnv_separates_values() {
        assert_ne!(fnv(5), fnv(-2783));
    }

    #[test]
    fn identity_separates_values() {
        assert_eq!(identity(12), 12);
        assert_ne!(identity(4), identity(5));
        assert_eq!(identity(-1), u32::MAX);
    }

    #[test]
    fn reference_functions_stay_in_positive_range() {
        for x in [i32::MIN, -2783, -1, 0, 1, 44, i32::MAX] {
            assert!(mix(x) <= i32::MAX as u32);
            assert!(fnv(x) <= i32::MAX as u32);
        }
    }

    #[cfg(feature = "foldhash")]
    #[test]
    fn fold_is_deterministic() {
        assert_eq!(fold(7), fold(7));
        assert_ne!(fold(7), fold(8));
        assert!(fold(i32::MIN) <= i32::MAX as u32);
    }

    #[test]
    fn wrapped_closure_is_shared_by_clones() {
        let f = HashFunction::new(|x| (x as u32).wrapping_mul(3));
        let g = f.clone();
        assert_eq!(f.hash(9), 27);
        assert_eq!(g.hash(9), 27);
    }
}
