/*!
Type definitions for identifier types.

A [`StateID`] identifies a single state in a Thompson NFA. States live in one
flat arena owned by the NFA, and a `StateID` is simply an index into that
arena. Every successor reference in the automaton is a `StateID`, which is
what lets the state graph contain cycles and converging edges without any
single state owning another.

The identifier clamps the range of permissible values to something smaller
than its `u32` representation (see [`StateID::MAX`]). Users may not rely on
this clamping for the purpose of memory safety, but it does guarantee that
every valid ID is representable as a `usize` and an `i32`.
*/

use core::convert::TryFrom;

use alloc::vec::Vec;

/// An identifier for a state in an NFA.
///
/// # Representation
///
/// This type is always represented internally by a `u32` and is marked as
/// `repr(transparent)`. Thus, this type always has the same representation as
/// a `u32`.
///
/// # Indexing
///
/// For convenience, callers may use a `StateID` to index slices.
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord,
)]
pub struct StateID(u32);

impl StateID {
    /// The maximum state ID value.
    #[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
    pub const MAX: StateID =
        StateID::new_unchecked(core::i32::MAX as usize - 1);

    /// The maximum state ID value.
    #[cfg(target_pointer_width = "16")]
    pub const MAX: StateID =
        StateID::new_unchecked(core::isize::MAX as usize - 1);

    /// The total number of states that are allowed in any single NFA,
    /// represented as a `usize`.
    pub const LIMIT: usize = StateID::MAX.as_usize() + 1;

    /// The zero state ID value.
    pub const ZERO: StateID = StateID::new_unchecked(0);

    /// The number of bytes that a single `StateID` uses in memory.
    pub const SIZE: usize = core::mem::size_of::<StateID>();

    /// Create a new state ID.
    ///
    /// If the given identifier exceeds [`StateID::MAX`], then this returns
    /// an error.
    #[inline]
    pub fn new(id: usize) -> Result<StateID, StateIDError> {
        StateID::try_from(id)
    }

    /// Create a new state ID without checking whether the given value
    /// exceeds [`StateID::MAX`].
    ///
    /// While this is unchecked, providing an incorrect value must never
    /// sacrifice memory safety, as documented above.
    #[inline]
    pub const fn new_unchecked(id: usize) -> StateID {
        StateID(id as u32)
    }

    /// Like [`StateID::new`], but panics if the given ID is not valid.
    #[inline]
    pub fn must(id: usize) -> StateID {
        StateID::new(id).unwrap()
    }

    /// Return this state ID as a `usize`.
    #[inline]
    pub const fn as_usize(&self) -> usize {
        self.0 as usize
    }

    /// Return the internal u32 of this state ID.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

/// This error occurs when a state ID could not be constructed.
///
/// This occurs when given an integer exceeding the maximum state ID value.
///
/// When the `std` feature is enabled, this implements the `Error` trait.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StateIDError {
    attempted: u64,
}

impl StateIDError {
    /// Returns the value that failed to construct a state ID.
    pub fn attempted(&self) -> u64 {
        self.attempted
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StateIDError {}

impl core::fmt::Display for StateIDError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "failed to create StateID from {:?}, which exceeds {:?}",
            self.attempted(),
            StateID::MAX,
        )
    }
}

impl<T> core::ops::Index<StateID> for [T] {
    type Output = T;

    #[inline]
    fn index(&self, index: StateID) -> &T {
        &self[index.as_usize()]
    }
}

impl<T> core::ops::IndexMut<StateID> for [T] {
    #[inline]
    fn index_mut(&mut self, index: StateID) -> &mut T {
        &mut self[index.as_usize()]
    }
}

impl<T> core::ops::Index<StateID> for Vec<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: StateID) -> &T {
        &self[index.as_usize()]
    }
}

impl<T> core::ops::IndexMut<StateID> for Vec<T> {
    #[inline]
    fn index_mut(&mut self, index: StateID) -> &mut T {
        &mut self[index.as_usize()]
    }
}

impl TryFrom<usize> for StateID {
    type Error = StateIDError;

    fn try_from(id: usize) -> Result<StateID, StateIDError> {
        if id > StateID::MAX.as_usize() {
            return Err(StateIDError { attempted: id as u64 });
        }
        Ok(StateID::new_unchecked(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits() {
        assert_eq!(StateID::ZERO, StateID::must(0));
        assert_eq!(StateID::LIMIT, StateID::MAX.as_usize() + 1);
        assert!(StateID::new(StateID::MAX.as_usize()).is_ok());

        let err = StateID::new(StateID::LIMIT).unwrap_err();
        assert_eq!(StateID::LIMIT as u64, err.attempted());
    }

    #[test]
    fn indexing() {
        let mut states = vec!['a', 'b', 'c'];
        assert_eq!('b', states[StateID::must(1)]);
        states[StateID::must(2)] = 'z';
        assert_eq!('z', states[..][StateID::must(2)]);
    }
}
