/*!
State sets for the NFA simulation.

Each step of a search needs the set of states alive before the current
character and the set alive after it. The second set also serves as the
visited set of the epsilon closure, so inserting must report whether the
state was new. Both operations, and clearing, are constant time.
*/

use alloc::{vec, vec::Vec};

use crate::util::id::StateID;

/// The current and next state sets of a search.
///
/// Fields are public to the crate so that a step can read `set1` while
/// writing `set2`.
#[derive(Clone, Debug)]
pub(crate) struct SparseSets {
    pub(crate) set1: SparseSet,
    pub(crate) set2: SparseSet,
}

impl SparseSets {
    /// Two empty sets, each able to hold every state of an NFA with
    /// `states` states.
    pub(crate) fn new(states: usize) -> SparseSets {
        SparseSets { set1: SparseSet::new(states), set2: SparseSet::new(states) }
    }

    /// Empty both sets and make room for an NFA with `states` states.
    pub(crate) fn resize(&mut self, states: usize) {
        self.set1.resize(states);
        self.set2.resize(states);
    }

    pub(crate) fn clear(&mut self) {
        self.set1.clear();
        self.set2.clear();
    }

    /// Make the next set current.
    pub(crate) fn swap(&mut self) {
        core::mem::swap(&mut self.set1, &mut self.set2);
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.set1.memory_usage() + self.set2.memory_usage()
    }
}

/// A set of state IDs below a fixed bound.
///
/// `members` lists the states in insertion order and `index` maps a state to
/// its position in `members`. An entry of `index` is only trusted when it
/// points back at the same state, so stale entries left behind by `clear`
/// never need resetting. See <https://research.swtch.com/sparse>.
#[derive(Clone)]
pub(crate) struct SparseSet {
    members: Vec<StateID>,
    index: Vec<u32>,
}

impl SparseSet {
    fn new(states: usize) -> SparseSet {
        let mut set = SparseSet { members: vec![], index: vec![] };
        set.resize(states);
        set
    }

    fn resize(&mut self, states: usize) {
        assert!(
            states <= StateID::LIMIT,
            "a state set cannot hold more than {} states",
            StateID::LIMIT,
        );
        self.members.clear();
        self.members.reserve(states);
        self.index.resize(states, 0);
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add `id`, returning false if it was already present.
    ///
    /// Panics if `id` is not below the bound the set was sized for.
    pub(crate) fn insert(&mut self, id: StateID) -> bool {
        if self.contains(id) {
            return false;
        }
        self.index[id] = self.members.len() as u32;
        self.members.push(id);
        true
    }

    pub(crate) fn contains(&self, id: StateID) -> bool {
        let at = self.index[id] as usize;
        self.members.get(at) == Some(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.members.clear();
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.members.capacity() * StateID::SIZE
            + self.index.len() * core::mem::size_of::<u32>()
    }
}

impl core::fmt::Debug for SparseSet {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_set().entries(self.members.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a SparseSet {
    type Item = StateID;
    type IntoIter = core::iter::Copied<core::slice::Iter<'a, StateID>>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(id: usize) -> StateID {
        StateID::must(id)
    }

    #[test]
    fn insert_reports_new_members_in_order() {
        let mut set = SparseSet::new(5);
        assert!(set.insert(sid(3)));
        assert!(set.insert(sid(0)));
        assert!(!set.insert(sid(3)));
        assert_eq!(2, set.len());
        assert_eq!(vec![sid(3), sid(0)], set.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn stale_index_is_ignored_after_clear() {
        let mut set = SparseSet::new(3);
        set.insert(sid(2));
        set.insert(sid(0));
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(sid(2)));
        // The index of 2 still says 0, but position 0 now holds 1.
        set.insert(sid(1));
        assert!(!set.contains(sid(2)));
        assert!(set.insert(sid(2)));
    }

    #[test]
    fn swap_pair() {
        let mut sets = SparseSets::new(4);
        sets.set1.insert(sid(1));
        sets.swap();
        assert!(sets.set1.is_empty());
        assert!(sets.set2.contains(sid(1)));
        sets.clear();
        assert!(sets.set2.is_empty());
        sets.resize(8);
        assert!(sets.set1.insert(sid(7)));
        assert!(sets.memory_usage() >= 2 * 8 * (StateID::SIZE + 4));
    }

    #[test]
    #[should_panic]
    fn insert_out_of_bounds_panics() {
        let mut set = SparseSet::new(1);
        set.insert(sid(1));
    }
}
