use core::mem;

use alloc::vec::Vec;

use crate::{
    nfa::thompson::{
        error::Error,
        nfa::{self, State, Transition, NFA},
    },
    util::id::StateID,
};

/// Which successor field of a state a [`Slot`] refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Successor {
    Next,
    Fork,
}

/// The address of a successor field that has not been filled in yet.
///
/// Fragments carry lists of these while they are being composed. Patching a
/// slot writes a state ID into the field it names.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Slot {
    id: StateID,
    successor: Successor,
}

impl Slot {
    pub(crate) fn next(id: StateID) -> Slot {
        Slot { id, successor: Successor::Next }
    }

    pub(crate) fn fork(id: StateID) -> Slot {
        Slot { id, successor: Successor::Fork }
    }
}

/// An arena of NFA states under construction.
///
/// States are appended and assigned a state ID equivalent to their index.
/// Once a state is added, its successors may still be filled in via
/// [`Builder::patch`], but each successor may be filled in at most once.
/// [`Builder::build`] freezes the arena into an [`NFA`].
#[derive(Clone, Debug, Default)]
pub(crate) struct Builder {
    /// The state arena, in creation order.
    states: Vec<State>,
    /// A size limit to respect when building an NFA. If the total heap memory
    /// of the arena exceeds (or would exceed) this amount, then an error is
    /// returned.
    size_limit: Option<usize>,
}

impl Builder {
    pub(crate) fn new() -> Builder {
        Builder::default()
    }

    /// Clear this builder so that it may be reused for another pattern. The
    /// size limit is kept.
    pub(crate) fn clear(&mut self) {
        self.states.clear();
    }

    /// Reserve room for at least `additional` more states.
    pub(crate) fn reserve(&mut self, additional: usize) {
        self.states.reserve(additional);
    }

    /// Freeze the states added so far into an NFA.
    ///
    /// Every successor slot reachable from `start` must have been patched by
    /// this point. The builder is left empty.
    pub(crate) fn build(
        &mut self,
        start: StateID,
        accept: StateID,
    ) -> Result<NFA, Error> {
        assert!(
            self.states[accept].is_accept(),
            "accept ID must point to an accepting state",
        );
        let states = mem::replace(&mut self.states, Vec::new());
        let final_nfa =
            NFA::from_inner(nfa::Inner { states, start, accept });
        trace!(
            "NFA compilation via builder complete, \
             final NFA size: {} states, {} bytes on heap",
            final_nfa.states().len(),
            final_nfa.memory_usage(),
        );
        Ok(final_nfa)
    }

    /// Add a state that consumes one character matching the given
    /// transition. Its `next` successor starts out empty.
    pub(crate) fn add_atom(
        &mut self,
        trans: Transition,
    ) -> Result<StateID, Error> {
        assert!(
            !trans.is_epsilon() && !trans.is_accept(),
            "atoms must consume input",
        );
        self.add(State::new(trans, None, None))
    }

    /// Add an epsilon state with the given successors. Either may be absent
    /// and patched in later.
    pub(crate) fn add_epsilon(
        &mut self,
        next: Option<StateID>,
        fork: Option<StateID>,
    ) -> Result<StateID, Error> {
        self.add(State::new(Transition::Epsilon, next, fork))
    }

    pub(crate) fn add_accept(&mut self) -> Result<StateID, Error> {
        self.add(State::new(Transition::Accept, None, None))
    }

    fn add(&mut self, state: State) -> Result<StateID, Error> {
        let id = StateID::new(self.states.len())
            .map_err(|_| Error::too_many_states(self.states.len()))?;
        self.states.push(state);
        self.check_size_limit()?;
        Ok(id)
    }

    /// Point the given dangling slot at `to`.
    ///
    /// # Panics
    ///
    /// This panics if the slot was already patched or if it names the fork
    /// of a state that isn't an epsilon state.
    pub(crate) fn patch(&mut self, slot: Slot, to: StateID) {
        let state = &mut self.states[slot.id];
        let field = match slot.successor {
            Successor::Next => state.next_mut(),
            Successor::Fork => {
                assert!(
                    state.is_epsilon(),
                    "only epsilon states have a fork successor",
                );
                state.fork_mut()
            }
        };
        assert!(field.is_none(), "slot {:?} was patched twice", slot);
        *field = Some(to);
    }

    pub(crate) fn set_size_limit(
        &mut self,
        limit: Option<usize>,
    ) -> Result<(), Error> {
        self.size_limit = limit;
        self.check_size_limit()
    }

    /// Returns the heap memory usage, in bytes, used by the NFA states added
    /// so far.
    pub(crate) fn memory_usage(&self) -> usize {
        self.states.len() * mem::size_of::<State>()
    }

    fn check_size_limit(&self) -> Result<(), Error> {
        if let Some(limit) = self.size_limit {
            if self.memory_usage() > limit {
                return Err(Error::exceeded_size_limit(limit));
            }
        }
        Ok(())
    }
}
