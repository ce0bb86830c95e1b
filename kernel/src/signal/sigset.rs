//! Fixed-width signal sets.
//!
//! Signal `n` (1..=64) is bit `n - 1` of a `u64`, the same layout the
//! `rt_sigprocmask` ABI uses, so a set crosses the syscall boundary as-is.

use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Sub, SubAssign};

use super::constants::{is_valid_signal, sig_mask, NSIG};
use super::error::SignalError;

/// A set of signal numbers.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct SigSet {
    bits: u64,
}

impl SigSet {
    /// The empty set.
    pub const fn empty() -> Self {
        SigSet { bits: 0 }
    }

    /// Every signal from 1 to `NSIG`.
    pub const fn full() -> Self {
        SigSet { bits: u64::MAX }
    }

    pub const fn from_bits(bits: u64) -> Self {
        SigSet { bits }
    }

    pub const fn bits(self) -> u64 {
        self.bits
    }

    /// Set holding just `sig`; empty if `sig` is out of range.
    pub const fn from_signal(sig: u32) -> Self {
        SigSet { bits: sig_mask(sig) }
    }

    /// Set built from a list of signal numbers. Out-of-range numbers are dropped.
    pub const fn from_signals(sigs: &[u32]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < sigs.len() {
            bits |= sig_mask(sigs[i]);
            i += 1;
        }
        SigSet { bits }
    }

    #[inline]
    pub const fn union(self, other: SigSet) -> Self {
        SigSet { bits: self.bits | other.bits }
    }

    #[inline]
    pub const fn intersect(self, other: SigSet) -> Self {
        SigSet { bits: self.bits & other.bits }
    }

    /// `self ∧ ¬other`
    #[inline]
    pub const fn intersect_complement(self, other: SigSet) -> Self {
        SigSet { bits: self.bits & !other.bits }
    }

    /// Ignores `self` and yields `other`; the `SIG_SETMASK` combinator.
    #[inline]
    pub const fn replace(self, other: SigSet) -> Self {
        other
    }

    #[inline]
    pub const fn complement(self) -> Self {
        SigSet { bits: !self.bits }
    }

    #[inline]
    pub const fn contains(self, sig: u32) -> bool {
        is_valid_signal(sig) && self.bits & sig_mask(sig) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.bits.count_ones()
    }

    /// Lowest signal number in the set.
    #[inline]
    pub const fn first(self) -> Option<u32> {
        if self.bits == 0 {
            None
        } else {
            Some(self.bits.trailing_zeros() + 1)
        }
    }

    /// `sigaddset`: reject numbers outside 1..=NSIG.
    pub fn add(&mut self, sig: u32) -> Result<(), SignalError> {
        if !is_valid_signal(sig) {
            return Err(SignalError::InvalidArgument);
        }
        self.bits |= sig_mask(sig);
        Ok(())
    }

    /// `sigdelset`: reject numbers outside 1..=NSIG.
    pub fn remove(&mut self, sig: u32) -> Result<(), SignalError> {
        if !is_valid_signal(sig) {
            return Err(SignalError::InvalidArgument);
        }
        self.bits &= !sig_mask(sig);
        Ok(())
    }

    /// Members in ascending signal-number order.
    pub fn iter(self) -> SigSetIter {
        SigSetIter { remaining: self.bits }
    }
}

/// Ascending iterator over the members of a [`SigSet`].
#[derive(Debug, Clone)]
pub struct SigSetIter {
    remaining: u64,
}

impl Iterator for SigSetIter {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let bit = self.remaining.trailing_zeros();
        // Clear lowest set bit
        self.remaining &= self.remaining - 1;
        Some(bit + 1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl IntoIterator for SigSet {
    type Item = u32;
    type IntoIter = SigSetIter;

    fn into_iter(self) -> SigSetIter {
        self.iter()
    }
}

impl From<u64> for SigSet {
    fn from(bits: u64) -> Self {
        SigSet { bits }
    }
}

impl From<SigSet> for u64 {
    fn from(set: SigSet) -> u64 {
        set.bits
    }
}

impl BitOr for SigSet {
    type Output = SigSet;

    fn bitor(self, rhs: SigSet) -> SigSet {
        self.union(rhs)
    }
}

impl BitOrAssign for SigSet {
    fn bitor_assign(&mut self, rhs: SigSet) {
        self.bits |= rhs.bits;
    }
}

impl BitAnd for SigSet {
    type Output = SigSet;

    fn bitand(self, rhs: SigSet) -> SigSet {
        self.intersect(rhs)
    }
}

impl BitAndAssign for SigSet {
    fn bitand_assign(&mut self, rhs: SigSet) {
        self.bits &= rhs.bits;
    }
}

impl Sub for SigSet {
    type Output = SigSet;

    fn sub(self, rhs: SigSet) -> SigSet {
        self.intersect_complement(rhs)
    }
}

impl SubAssign for SigSet {
    fn sub_assign(&mut self, rhs: SigSet) {
        self.bits &= !rhs.bits;
    }
}

impl Not for SigSet {
    type Output = SigSet;

    fn not(self) -> SigSet {
        self.complement()
    }
}

impl fmt::Debug for SigSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::LowerHex for SigSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.bits, f)
    }
}

const _: () = assert!(NSIG as usize == u64::BITS as usize);

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================================================
    // Combinators
    // =============================================================================

    #[test]
    fn test_union_and_intersect_complement() {
        let a = SigSet::from_signals(&[1, 3, 5]);
        let b = SigSet::from_signals(&[3, 4]);
        assert_eq!(a.union(b), SigSet::from_signals(&[1, 3, 4, 5]));
        assert_eq!(a.intersect_complement(b), SigSet::from_signals(&[1, 5]));
        assert_eq!(a.intersect(b), SigSet::from_signal(3));
        assert_eq!(a.replace(b), b);
        assert_eq!(a | b, a.union(b));
        assert_eq!(a - b, a.intersect_complement(b));
        assert_eq!(a & !b, a - b);
    }

    #[test]
    fn test_contains_out_of_range_is_false() {
        let full = SigSet::full();
        assert!(!full.contains(0), "signal 0 is never a member");
        assert!(!full.contains(65), "signals above NSIG are never members");
        assert!(full.contains(64));
    }

    #[test]
    fn test_from_signals_drops_invalid_numbers() {
        let set = SigSet::from_signals(&[0, 2, 70]);
        assert_eq!(set, SigSet::from_signal(2));
    }

    // =============================================================================
    // Checked add/remove
    // =============================================================================

    #[test]
    fn test_add_remove() {
        let mut set = SigSet::empty();
        assert_eq!(set.add(10), Ok(()));
        assert!(set.contains(10));
        assert_eq!(set.remove(10), Ok(()));
        assert!(set.is_empty());
    }

    #[test]
    fn test_add_rejects_invalid_signal() {
        let mut set = SigSet::empty();
        assert_eq!(set.add(0), Err(SignalError::InvalidArgument));
        assert_eq!(set.add(65), Err(SignalError::InvalidArgument));
        assert_eq!(set.remove(0), Err(SignalError::InvalidArgument));
        assert!(set.is_empty());
    }

    // =============================================================================
    // Iteration
    // =============================================================================

    #[test]
    fn test_iter_is_ascending() {
        let set = SigSet::from_signals(&[9, 2, 64, 4]);
        let order: Vec<u32> = set.iter().collect();
        assert_eq!(order, vec![2, 4, 9, 64]);
        assert_eq!(set.first(), Some(2));
        assert_eq!(SigSet::empty().first(), None);
    }

    #[test]
    fn test_debug_lists_members() {
        let set = SigSet::from_signals(&[3, 7]);
        assert_eq!(format!("{:?}", set), "{3, 7}");
        assert_eq!(format!("{:x}", set), "44");
    }
}
