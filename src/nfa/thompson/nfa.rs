use core::fmt;

use alloc::{
    string::{String, ToString},
    sync::Arc,
    vec,
    vec::Vec,
};

use crate::{
    nfa::thompson::{
        compiler::{Compiler, Config},
        error::Error,
    },
    util::id::StateID,
};

/// A character oriented Thompson non-deterministic finite automaton (NFA).
///
/// A Thompson NFA is a finite state machine where every state either
/// consumes exactly one character of input (if that character satisfies the
/// state's [`Transition`]) or consumes nothing and forks into at most two
/// successors via an epsilon transition. There is exactly one accepting
/// state.
///
/// Every state lives in a single arena owned by the NFA and successors are
/// referenced by [`StateID`]. Repetition operators make the state graph
/// cyclic, and alternation makes paths converge, so no state owns another;
/// the whole graph is one unit of ownership and is freed at once when the
/// last clone of the NFA is dropped.
///
/// # Cheap clones
///
/// An NFA is immutable once built and uses reference counting internally.
/// Therefore, it is cheap to clone and it may be shared freely between
/// threads. Searching never mutates it.
///
/// # Example
///
/// ```
/// use nfa_regex::nfa::thompson::{pikevm::PikeVM, NFA};
///
/// let nfa = NFA::new("a((b|c))*")?;
/// let vm = PikeVM::new_from_nfa(nfa);
/// let mut cache = vm.create_cache();
/// assert!(vm.is_match(&mut cache, "abcbc"));
/// assert!(!vm.is_match(&mut cache, "abd"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct NFA(Arc<Inner>);

impl NFA {
    /// Parse and compile the given pattern into an NFA using the default
    /// configuration.
    pub fn new(pattern: &str) -> Result<NFA, Error> {
        NFA::compiler().build(pattern)
    }

    /// Return a default configuration for an `NFA`.
    pub fn config() -> Config {
        Config::new()
    }

    /// Return a compiler for building an NFA with a non-default
    /// configuration.
    pub fn compiler() -> Compiler {
        Compiler::new()
    }

    /// Return the identifier of the starting state of this NFA.
    #[inline]
    pub fn start(&self) -> StateID {
        self.0.start
    }

    /// Return the identifier of the one and only accepting state of this
    /// NFA.
    #[inline]
    pub fn accept(&self) -> StateID {
        self.0.accept
    }

    /// Return the NFA state corresponding to the given ID.
    ///
    /// # Panics
    ///
    /// If the ID does not refer to a valid state, then this panics.
    #[inline]
    pub fn state(&self, id: StateID) -> &State {
        &self.0.states[id]
    }

    /// Returns a slice of all states in this NFA, in the order they were
    /// created during compilation.
    ///
    /// The slice returned is indexed by `StateID`.
    #[inline]
    pub fn states(&self) -> &[State] {
        &self.0.states
    }

    /// Returns the total number of states in this NFA.
    ///
    /// This is never zero, since every NFA has an accepting state.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.states.len()
    }

    /// Returns the heap memory usage, in bytes, of this NFA.
    ///
    /// This does **not** include the stack size used up by this NFA. To
    /// compute that, use `std::mem::size_of::<NFA>()`.
    #[inline]
    pub fn memory_usage(&self) -> usize {
        self.0.states.len() * core::mem::size_of::<State>()
    }

    /// Render a human readable dump of this NFA.
    ///
    /// States are visited breadth first from the starting state, following
    /// `next` before `fork`, and are numbered in the order they are
    /// discovered. Each state gets one line of the form
    ///
    /// ```text
    /// >000000: EPS => 1, 2
    /// ```
    ///
    /// where a leading `>` marks the starting state, the number is the
    /// discovery number, the middle column is the state's transition
    /// predicate (`ACC`, `EPS`, a quoted literal character, `ANY`, `ALPHA`,
    /// `ALNUM` or `SPACE`) and the last two columns are the discovery
    /// numbers of the `next` and `fork` successors, or `NULL` when absent.
    ///
    /// Compiling the same pattern twice always yields the same dump.
    ///
    /// # Example
    ///
    /// ```
    /// use nfa_regex::nfa::thompson::NFA;
    ///
    /// let nfa = NFA::new("a|b")?;
    /// let expected = "\
    /// >000000: EPS => 1, 2
    ///  000001: 'a' => 3, NULL
    ///  000002: 'b' => 3, NULL
    ///  000003: ACC => NULL, NULL
    /// ";
    /// assert_eq!(expected, nfa.describe());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn describe(&self) -> String {
        // Maps a state ID to its discovery number.
        let mut order: Vec<Option<usize>> = vec![None; self.len()];
        let mut queue: Vec<StateID> = Vec::with_capacity(self.len());
        order[self.start()] = Some(0);
        queue.push(self.start());
        let mut i = 0;
        while i < queue.len() {
            let state = self.state(queue[i]);
            i += 1;
            for &succ in [state.next(), state.fork()].iter() {
                let sid = match succ {
                    None => continue,
                    Some(sid) => sid,
                };
                if order[sid].is_none() {
                    order[sid] = Some(queue.len());
                    queue.push(sid);
                }
            }
        }

        let render = |succ: Option<StateID>| -> String {
            match succ.and_then(|sid| order[sid]) {
                None => "NULL".to_string(),
                Some(n) => n.to_string(),
            }
        };
        let mut out = String::new();
        for (n, &sid) in queue.iter().enumerate() {
            let state = self.state(sid);
            let marker = if n == 0 { '>' } else { ' ' };
            out.push_str(&alloc::format!(
                "{}{:06}: {} => {}, {}\n",
                marker,
                n,
                state.transition(),
                render(state.next()),
                render(state.fork()),
            ));
        }
        out
    }

    pub(super) fn from_inner(inner: Inner) -> NFA {
        NFA(Arc::new(inner))
    }
}

impl fmt::Debug for NFA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "thompson::NFA(")?;
        write!(f, "{}", self.describe())?;
        writeln!(f, ")")
    }
}

/// The "inner" part of the NFA. We split this part out so that we can easily
/// wrap it in an `Arc` above in the definition of `NFA`.
///
/// See builder.rs for the code that actually produces this type.
#[derive(Debug)]
pub(super) struct Inner {
    /// The state arena, indexed by `StateID`.
    pub(super) states: Vec<State>,
    /// The starting state.
    pub(super) start: StateID,
    /// The single accepting state.
    pub(super) accept: StateID,
}

/// The condition under which a state may be left.
///
/// `Accept` and `Epsilon` never consume input. Every other transition
/// consumes exactly one character, provided it satisfies the predicate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Transition {
    /// The terminal state. Reaching it after consuming all input means the
    /// input matched.
    Accept,
    /// An unconditional transition to `next` and, if present, `fork`.
    Epsilon,
    /// Matches exactly the given character.
    Literal(char),
    /// Matches any character.
    Wildcard,
    /// Matches `A-Z` and `a-z`.
    AlphaClass,
    /// Matches `A-Z`, `a-z` and `0-9`.
    ///
    /// Note that despite its name (and its `\0` spelling), this class
    /// includes letters.
    NumericClass,
    /// Matches space, `\t`, `\n`, `\x0B`, `\x0C` and `\r`.
    WhitespaceClass,
}

impl Transition {
    /// Returns true if and only if this transition consumes the given
    /// character.
    ///
    /// This always returns false for `Accept` and `Epsilon`.
    #[inline]
    pub fn matches(&self, ch: char) -> bool {
        match *self {
            Transition::Accept | Transition::Epsilon => false,
            Transition::Literal(lit) => lit == ch,
            Transition::Wildcard => true,
            Transition::AlphaClass => ch.is_ascii_alphabetic(),
            Transition::NumericClass => ch.is_ascii_alphanumeric(),
            Transition::WhitespaceClass => match ch {
                ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r' => true,
                _ => false,
            },
        }
    }

    /// Returns true if this transition is followed without consuming input.
    #[inline]
    pub fn is_epsilon(&self) -> bool {
        *self == Transition::Epsilon
    }

    /// Returns true if this is the accepting transition.
    #[inline]
    pub fn is_accept(&self) -> bool {
        *self == Transition::Accept
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Transition::Accept => write!(f, "ACC"),
            Transition::Epsilon => write!(f, "EPS"),
            Transition::Literal(ch) => write!(f, "{:?}", ch),
            Transition::Wildcard => write!(f, "ANY"),
            Transition::AlphaClass => write!(f, "ALPHA"),
            Transition::NumericClass => write!(f, "ALNUM"),
            Transition::WhitespaceClass => write!(f, "SPACE"),
        }
    }
}

/// A state in a Thompson NFA.
///
/// A state is a [`Transition`] plus up to two successors. Only `Epsilon`
/// states ever have a `fork`, and an `Accept` state has no successors at
/// all.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct State {
    trans: Transition,
    next: Option<StateID>,
    fork: Option<StateID>,
}

impl State {
    pub(super) fn new(
        trans: Transition,
        next: Option<StateID>,
        fork: Option<StateID>,
    ) -> State {
        State { trans, next, fork }
    }

    /// The predicate that must be satisfied to leave this state.
    #[inline]
    pub fn transition(&self) -> Transition {
        self.trans
    }

    /// The successor reached by satisfying this state's transition.
    #[inline]
    pub fn next(&self) -> Option<StateID> {
        self.next
    }

    /// The second successor of an epsilon state.
    #[inline]
    pub fn fork(&self) -> Option<StateID> {
        self.fork
    }

    /// Returns true if this state can be left without consuming input.
    #[inline]
    pub fn is_epsilon(&self) -> bool {
        self.trans.is_epsilon()
    }

    /// Returns true if this is an accepting state.
    #[inline]
    pub fn is_accept(&self) -> bool {
        self.trans.is_accept()
    }

    pub(super) fn next_mut(&mut self) -> &mut Option<StateID> {
        &mut self.next
    }

    pub(super) fn fork_mut(&mut self) -> &mut Option<StateID> {
        &mut self.fork
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = |succ: Option<StateID>| -> String {
            match succ {
                None => "NULL".to_string(),
                Some(sid) => sid.as_usize().to_string(),
            }
        };
        write!(f, "{} => {}, {}", self.trans, id(self.next), id(self.fork))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_predicates() {
        assert!(Transition::Wildcard.matches('\n'));
        assert!(Transition::Wildcard.matches('β'));

        assert!(Transition::AlphaClass.matches('q'));
        assert!(Transition::AlphaClass.matches('Q'));
        assert!(!Transition::AlphaClass.matches('1'));
        assert!(!Transition::AlphaClass.matches('β'));

        // `\0` reads like "digit" but has always matched letters too.
        assert!(Transition::NumericClass.matches('7'));
        assert!(Transition::NumericClass.matches('x'));
        assert!(!Transition::NumericClass.matches('_'));

        for ch in [' ', '\t', '\n', '\x0B', '\x0C', '\r'].iter() {
            assert!(Transition::WhitespaceClass.matches(*ch), "{:?}", ch);
        }
        assert!(!Transition::WhitespaceClass.matches('a'));
        assert!(!Transition::WhitespaceClass.matches('\u{A0}'));

        assert!(Transition::Literal('z').matches('z'));
        assert!(!Transition::Literal('z').matches('Z'));
        assert!(!Transition::Accept.matches('a'));
        assert!(!Transition::Epsilon.matches('a'));
    }

    #[test]
    fn transition_display() {
        assert_eq!("ACC", Transition::Accept.to_string());
        assert_eq!("EPS", Transition::Epsilon.to_string());
        assert_eq!("'a'", Transition::Literal('a').to_string());
        assert_eq!("'\\n'", Transition::Literal('\n').to_string());
        assert_eq!("ANY", Transition::Wildcard.to_string());
        assert_eq!("ALPHA", Transition::AlphaClass.to_string());
        assert_eq!("ALNUM", Transition::NumericClass.to_string());
        assert_eq!("SPACE", Transition::WhitespaceClass.to_string());
    }

    #[test]
    fn describe_single_literal() {
        let nfa = NFA::new("a").unwrap();
        let expected = "\
>000000: 'a' => 1, NULL
 000001: ACC => NULL, NULL
";
        assert_eq!(expected, nfa.describe());
    }

    #[test]
    fn describe_empty_pattern() {
        let nfa = NFA::new("").unwrap();
        assert_eq!(1, nfa.len());
        assert_eq!(nfa.start(), nfa.accept());
        assert_eq!(">000000: ACC => NULL, NULL\n", nfa.describe());
    }

    #[test]
    fn describe_star_loop() {
        // The epsilon state is created after the literal, but it is the
        // starting state, so it is discovered first.
        let nfa = NFA::new("a*").unwrap();
        let expected = "\
>000000: EPS => 1, 2
 000001: 'a' => 0, NULL
 000002: ACC => NULL, NULL
";
        assert_eq!(expected, nfa.describe());
    }

    #[test]
    fn describe_plus_and_classes() {
        let nfa = NFA::new(r"\a+\0.\ ").unwrap();
        let expected = "\
>000000: ALPHA => 1, NULL
 000001: EPS => 0, 2
 000002: ALNUM => 3, NULL
 000003: ANY => 4, NULL
 000004: SPACE => 5, NULL
 000005: ACC => NULL, NULL
";
        assert_eq!(expected, nfa.describe());
    }

    #[test]
    fn describe_is_deterministic() {
        let pattern = "(ab|c)*d?(e|)+";
        let a = NFA::new(pattern).unwrap();
        let b = NFA::new(pattern).unwrap();
        assert_eq!(a.describe(), b.describe());
    }

    #[test]
    fn state_accessors() {
        let nfa = NFA::new("a?").unwrap();
        let start = nfa.state(nfa.start());
        assert!(start.is_epsilon());
        assert!(start.next().is_some());
        assert_eq!(Some(nfa.accept()), start.fork());
        assert!(nfa.state(nfa.accept()).is_accept());
        assert_eq!(3, nfa.states().len());
        assert_eq!(3 * core::mem::size_of::<State>(), nfa.memory_usage());
    }

    #[test]
    fn debug_wraps_describe() {
        let nfa = NFA::new("x").unwrap();
        let dbg = alloc::format!("{:?}", nfa);
        assert!(dbg.starts_with("thompson::NFA(\n>000000: 'x' => 1, NULL\n"));
        assert!(dbg.ends_with(")\n"));
    }
}
