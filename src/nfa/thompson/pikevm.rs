/*!
An NFA backed simulation that answers whether an entire haystack is matched.

The simulation tracks the set of all NFA states reachable after consuming
each character of the haystack. This is the same idea as the Pike VM, minus
capture tracking and match offsets: the only question answered here is
whether the automaton accepts the whole input. Its running time is bounded
by the length of the haystack multiplied by the number of NFA states.
*/

use alloc::vec::Vec;

use crate::{
    nfa::thompson::{self, Error, NFA},
    syntax,
    util::{
        id::StateID,
        sparse_set::{SparseSet, SparseSets},
    },
};

/// A builder for a PikeVM.
#[derive(Clone, Debug)]
pub struct Builder {
    thompson: thompson::Compiler,
}

impl Builder {
    /// Create a new PikeVM builder with its default configuration.
    pub fn new() -> Builder {
        Builder { thompson: thompson::Compiler::new() }
    }

    /// Compile the given pattern and wrap it in a PikeVM.
    pub fn build(&self, pattern: &str) -> Result<PikeVM, Error> {
        let nfa = self.thompson.build(pattern)?;
        Ok(self.build_from_nfa(nfa))
    }

    /// Wrap an already compiled NFA in a PikeVM.
    pub fn build_from_nfa(&self, nfa: NFA) -> PikeVM {
        PikeVM { nfa }
    }

    /// Set the tokenizer configuration used by this builder.
    pub fn syntax(&mut self, config: syntax::Config) -> &mut Builder {
        self.thompson.syntax(config);
        self
    }

    /// Set the Thompson NFA configuration used by this builder.
    pub fn thompson(&mut self, config: thompson::Config) -> &mut Builder {
        self.thompson.configure(config);
        self
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}

/// A simulation of a Thompson NFA.
///
/// A `PikeVM` never mutates its NFA. All of the scratch space needed during
/// a search lives in a separate [`Cache`], so a single `PikeVM` may be shared
/// by many threads as long as each uses its own cache.
#[derive(Clone, Debug)]
pub struct PikeVM {
    nfa: NFA,
}

impl PikeVM {
    /// Compile the given pattern with the default configuration.
    pub fn new(pattern: &str) -> Result<PikeVM, Error> {
        PikeVM::builder().build(pattern)
    }

    /// Wrap an already compiled NFA.
    pub fn new_from_nfa(nfa: NFA) -> PikeVM {
        PikeVM::builder().build_from_nfa(nfa)
    }

    /// Return a builder for configuring the construction of a PikeVM.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Create a new cache for this PikeVM.
    pub fn create_cache(&self) -> Cache {
        Cache::new(self)
    }

    /// Reset the given cache such that it can be used with this PikeVM.
    ///
    /// This is only needed when reusing a cache created for a different
    /// PikeVM. Searching with a cache that is too small for this PikeVM's
    /// NFA panics.
    pub fn reset_cache(&self, cache: &mut Cache) {
        cache.reset(self);
    }

    /// Return the NFA being simulated.
    pub fn nfa(&self) -> &NFA {
        &self.nfa
    }

    /// Returns true if and only if the NFA accepts the entire haystack.
    ///
    /// This never fails. It returns `false` as soon as no NFA state remains
    /// alive, since no further input can revive the search.
    ///
    /// # Example
    ///
    /// ```
    /// use nfa_regex::nfa::thompson::pikevm::PikeVM;
    ///
    /// let vm = PikeVM::new(r"\a+( \0+)*")?;
    /// let mut cache = vm.create_cache();
    /// assert!(vm.is_match(&mut cache, "route 66"));
    /// assert!(!vm.is_match(&mut cache, "66 route"));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn is_match(&self, cache: &mut Cache, haystack: &str) -> bool {
        let Cache { ref mut stack, ref mut sets } = *cache;
        sets.clear();
        self.epsilon_closure(stack, &mut sets.set1, self.nfa.start());
        for ch in haystack.chars() {
            if sets.set1.is_empty() {
                trace!("no live states left before {:?}, giving up", ch);
                return false;
            }
            self.step(stack, &sets.set1, &mut sets.set2, ch);
            trace!("after {:?}: {} states alive", ch, sets.set2.len());
            sets.swap();
            sets.set2.clear();
        }
        sets.set1.contains(self.nfa.accept())
    }

    /// Follow every state in `clist` that consumes `ch`, adding the epsilon
    /// closure of its successor to `nlist`.
    fn step(
        &self,
        stack: &mut Vec<StateID>,
        clist: &SparseSet,
        nlist: &mut SparseSet,
        ch: char,
    ) {
        for sid in clist {
            let state = self.nfa.state(sid);
            if !state.transition().matches(ch) {
                continue;
            }
            if let Some(next) = state.next() {
                self.epsilon_closure(stack, nlist, next);
            }
        }
    }

    /// Add `sid` and every state reachable from it through epsilon states to
    /// `set`.
    ///
    /// Epsilon states are recorded in the set too. That way a state already
    /// in the set is never expanded a second time, which is what stops the
    /// walk on epsilon cycles like the one in `a**`. Since epsilon states
    /// never match a character, leaving them in the set doesn't change the
    /// next step.
    fn epsilon_closure(
        &self,
        stack: &mut Vec<StateID>,
        set: &mut SparseSet,
        sid: StateID,
    ) {
        stack.push(sid);
        while let Some(mut sid) = stack.pop() {
            loop {
                if !set.insert(sid) {
                    break;
                }
                let state = self.nfa.state(sid);
                if !state.is_epsilon() {
                    break;
                }
                if let Some(fork) = state.fork() {
                    stack.push(fork);
                }
                sid = match state.next() {
                    None => break,
                    Some(next) => next,
                };
            }
        }
    }
}

/// A cache represents mutable state that a [`PikeVM`] requires during a
/// search.
///
/// For a given [`PikeVM`], its corresponding cache may be created either via
/// [`PikeVM::create_cache`], or via [`Cache::new`]. They are equivalent in
/// every way, except the former does not require explicitly importing
/// `Cache`.
#[derive(Clone, Debug)]
pub struct Cache {
    /// Stack used while computing epsilon closures.
    stack: Vec<StateID>,
    /// The current and next sets of live states.
    sets: SparseSets,
}

impl Cache {
    /// Create a new [`PikeVM`] cache.
    pub fn new(re: &PikeVM) -> Cache {
        Cache { stack: Vec::new(), sets: SparseSets::new(re.nfa().len()) }
    }

    /// Reset this cache such that it can be used for searching with a
    /// different [`PikeVM`].
    pub fn reset(&mut self, re: &PikeVM) {
        self.stack.clear();
        self.sets.resize(re.nfa().len());
    }

    /// Returns the heap memory usage, in bytes, of this cache.
    pub fn memory_usage(&self) -> usize {
        use core::mem::size_of;

        (self.stack.capacity() * size_of::<StateID>())
            + self.sets.memory_usage()
    }
}
