use core::{cell::RefCell, mem};

use alloc::{vec, vec::Vec};

use crate::{
    nfa::thompson::{
        builder::{Builder, Slot},
        error::Error,
        nfa::{Transition, NFA},
    },
    syntax::{self, Quantifier, Token, Tokenizer, Tokens},
    util::id::StateID,
};

/// The configuration used for a Thompson NFA compiler.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    nfa_size_limit: Option<usize>,
}

impl Config {
    /// Return a new default Thompson NFA compiler configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// Sets an approximate size limit on the total heap used by the NFA being
    /// compiled.
    ///
    /// This permits imposing constraints on the size of a compiled NFA. This
    /// may be useful in contexts where the patterns being compiled come from
    /// an untrusted source.
    ///
    /// The size is approximated by the number of states multiplied by the
    /// size of a single state.
    ///
    /// By default, there is no limit.
    ///
    /// # Example
    ///
    /// ```
    /// use nfa_regex::nfa::thompson::{Compiler, Config};
    ///
    /// let mut compiler = Compiler::new();
    /// compiler.configure(Config::new().nfa_size_limit(Some(0)));
    /// assert!(compiler.build("a").is_err());
    /// ```
    pub fn nfa_size_limit(mut self, bytes: Option<usize>) -> Config {
        self.nfa_size_limit = bytes;
        self
    }

    /// Returns the configured NFA size limit, if one was set.
    pub fn get_nfa_size_limit(&self) -> Option<usize> {
        self.nfa_size_limit
    }
}

/// A builder for compiling a pattern into a Thompson NFA.
///
/// Compilation happens in two passes. The pattern is first tokenized, which
/// is where every syntax error is detected. The tokens are then folded,
/// left to right, into NFA *fragments*: partially built automata with one
/// starting state and a list of successor slots that don't point anywhere
/// yet. Concatenation patches the slots of one fragment to the start of the
/// next, alternation and repetition add epsilon states, and at the very end
/// every remaining slot is patched to a single accepting state.
#[derive(Clone, Debug)]
pub struct Compiler {
    /// The tokenizer used to turn a pattern string into tokens.
    tokenizer: Tokenizer,
    /// The compiler configuration.
    config: Config,
    /// The builder for actually constructing an NFA. This provides a
    /// convenient abstraction for writing a compiler.
    builder: RefCell<Builder>,
}

impl Compiler {
    /// Create a new NFA compiler with its default configuration.
    pub fn new() -> Compiler {
        Compiler {
            tokenizer: Tokenizer::new(),
            config: Config::default(),
            builder: RefCell::new(Builder::new()),
        }
    }

    /// Compile the given pattern into an NFA.
    ///
    /// If there was a problem parsing the pattern, then an error is
    /// returned. An error is also returned if the NFA would exceed the
    /// configured size limit.
    pub fn build(&self, pattern: &str) -> Result<NFA, Error> {
        let tokens = self.tokenizer.tokenize(pattern)?;
        self.build_from_tokens(&tokens)
    }

    /// Compile an already tokenized pattern into an NFA.
    pub fn build_from_tokens(&self, tokens: &Tokens) -> Result<NFA, Error> {
        self.compile(tokens)
    }

    /// Apply the given tokenizer configuration to this compiler.
    pub fn syntax(&mut self, config: syntax::Config) -> &mut Compiler {
        self.tokenizer.configure(config);
        self
    }

    /// Apply the given NFA configuration options to this compiler.
    pub fn configure(&mut self, config: Config) -> &mut Compiler {
        self.config = config;
        self
    }

    /// Returns the configuration of this compiler.
    pub fn get_config(&self) -> &Config {
        &self.config
    }

    fn compile(&self, tokens: &Tokens) -> Result<NFA, Error> {
        {
            let mut builder = self.builder.borrow_mut();
            builder.clear();
            builder.set_size_limit(self.config.get_nfa_size_limit())?;
            // Every token other than a parenthesis makes at most one state,
            // plus one more for the accepting state.
            builder.reserve(tokens.literal_len() + 1);
        }
        let (frag, end) = self.c_group(tokens.as_slice(), 0)?;
        // The tokenizer rejects any stray ')' so the top level always runs
        // to the end.
        assert_eq!(end, tokens.len(), "top level must consume every token");

        let accept = self.add_accept()?;
        let start = match frag.start {
            None => accept,
            Some(start) => {
                self.patch_all(frag.dangling, accept);
                start
            }
        };
        let nfa = self.builder.borrow_mut().build(start, accept)?;
        debug!(
            "compiled {} tokens (literal length {}) into an NFA \
             with {} states",
            tokens.len(),
            tokens.literal_len(),
            nfa.len(),
        );
        Ok(nfa)
    }

    /// Compile the tokens starting at `at` up to (but not including) the
    /// next `)` this level doesn't consume, or up to the end if there is
    /// none.
    ///
    /// This returns the compiled fragment along with the position at which
    /// compilation stopped, which is either the position of a `)` or the
    /// length of `tokens`.
    ///
    /// The fold keeps two fragments: `concat` holds everything before the
    /// most recent atom or group, and `last` holds that atom or group so
    /// that a quantifier can bind to it.
    ///
    /// A `|` compiles everything after it at a fresh level, which stops at
    /// the next unconsumed `)`. The result is joined with `concat`, that `)`
    /// is skipped and the fold carries on at this level with an empty
    /// `last`. So `a|b|c` becomes `a|(b|c)`, `(a|b)c` stays a
    /// concatenation, and a quantifier right after the `)` of a group
    /// holding a `|` has nothing to bind to: `(a|b)*` is `(a|b)`. Wrapping
    /// the group again, as in `((a|b))*`, repeats it.
    fn c_group(
        &self,
        tokens: &[Token],
        mut at: usize,
    ) -> Result<(Fragment, usize), Error> {
        let mut concat = Fragment::empty();
        let mut last = Fragment::empty();
        while let Some(&token) = tokens.get(at) {
            match token {
                Token::GroupClose => break,
                Token::Quantifier(quant) => self.c_repeat(&mut last, quant)?,
                Token::Union => {
                    self.c_concat(&mut concat, mem::take(&mut last));
                    let (right, end) = self.c_group(tokens, at + 1)?;
                    concat = self.c_union(mem::take(&mut concat), right)?;
                    at = end;
                    if at == tokens.len() {
                        break;
                    }
                }
                Token::GroupOpen => {
                    self.c_concat(&mut concat, mem::take(&mut last));
                    let (group, end) = self.c_group(tokens, at + 1)?;
                    last = group;
                    at = end;
                    if at == tokens.len() {
                        break;
                    }
                }
                atom => {
                    self.c_concat(&mut concat, mem::take(&mut last));
                    last = self.c_atom(atom)?;
                }
            }
            at += 1;
        }
        self.c_concat(&mut concat, last);
        Ok((concat, at))
    }

    /// A single state that consumes one character. Its `next` is dangling.
    fn c_atom(&self, token: Token) -> Result<Fragment, Error> {
        let trans = match token {
            Token::Literal(ch) => Transition::Literal(ch),
            Token::Wildcard => Transition::Wildcard,
            Token::AlphaClass => Transition::AlphaClass,
            Token::NumericClass => Transition::NumericClass,
            Token::WhitespaceClass => Transition::WhitespaceClass,
            _ => unreachable!("{:?} is not an atom", token),
        };
        let id = self.builder.borrow_mut().add_atom(trans)?;
        Ok(Fragment { start: Some(id), dangling: vec![Slot::next(id)] })
    }

    /// Append `next` to `frag`. Appending an empty fragment is a no-op, and
    /// appending to an empty fragment adopts `next` wholesale.
    fn c_concat(&self, frag: &mut Fragment, next: Fragment) {
        let next_start = match next.start {
            None => return,
            Some(start) => start,
        };
        if frag.start.is_none() {
            *frag = next;
            return;
        }
        let dangling = mem::replace(&mut frag.dangling, next.dangling);
        self.patch_all(dangling, next_start);
    }

    /// Apply a quantifier to the given fragment in place.
    ///
    /// This adds one epsilon state whose `next` is the fragment's start and
    /// whose `fork` is left dangling as the way out. If the quantifier is
    /// unbounded, the fragment's exits loop back to the new state. If it
    /// allows zero occurrences, the new state becomes the start so that the
    /// fragment can be skipped.
    ///
    /// Quantifying an empty fragment (as in `*a` or `()+`) does nothing.
    fn c_repeat(
        &self,
        frag: &mut Fragment,
        quant: Quantifier,
    ) -> Result<(), Error> {
        let start = match frag.start {
            None => return Ok(()),
            Some(start) => start,
        };
        let split = self.add_epsilon(Some(start), None)?;
        if quant.allows_zero() {
            frag.start = Some(split);
        }
        if quant.is_unbounded() {
            let dangling = mem::replace(&mut frag.dangling, vec![]);
            self.patch_all(dangling, split);
        }
        frag.dangling.push(Slot::fork(split));
        Ok(())
    }

    /// Join two alternatives with an epsilon state whose `next` leads into
    /// `left` and whose `fork` leads into `right`.
    ///
    /// An empty alternative matches the empty string, so the corresponding
    /// successor of the new state is left dangling instead. If both sides
    /// are empty, then so is the result.
    fn c_union(
        &self,
        left: Fragment,
        right: Fragment,
    ) -> Result<Fragment, Error> {
        if left.start.is_none() && right.start.is_none() {
            return Ok(Fragment::empty());
        }
        let split = self.add_epsilon(left.start, right.start)?;
        let mut dangling =
            Vec::with_capacity(left.dangling.len() + right.dangling.len() + 1);
        match left.start {
            None => dangling.push(Slot::next(split)),
            Some(_) => dangling.extend(left.dangling),
        }
        match right.start {
            None => dangling.push(Slot::fork(split)),
            Some(_) => dangling.extend(right.dangling),
        }
        Ok(Fragment { start: Some(split), dangling })
    }

    fn add_epsilon(
        &self,
        next: Option<StateID>,
        fork: Option<StateID>,
    ) -> Result<StateID, Error> {
        self.builder.borrow_mut().add_epsilon(next, fork)
    }

    fn add_accept(&self) -> Result<StateID, Error> {
        self.builder.borrow_mut().add_accept()
    }

    fn patch_all(&self, slots: Vec<Slot>, to: StateID) {
        let mut builder = self.builder.borrow_mut();
        for slot in slots {
            builder.patch(slot, to);
        }
    }
}

impl Default for Compiler {
    fn default() -> Compiler {
        Compiler::new()
    }
}

/// A partially built NFA.
///
/// A fragment has at most one entry point and an ordered list of successor
/// slots that have yet to be connected to anything. Every unfilled slot of
/// every state created so far belongs to exactly one live fragment. An
/// empty fragment has no start and no slots.
#[derive(Debug, Default)]
struct Fragment {
    start: Option<StateID>,
    dangling: Vec<Slot>,
}

impl Fragment {
    fn empty() -> Fragment {
        Fragment::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::nfa::thompson::nfa::State;

    fn build(pattern: &str) -> NFA {
        NFA::new(pattern).unwrap()
    }

    /// Returns the states of the given NFA in creation order, without their
    /// successors.
    fn transitions(nfa: &NFA) -> Vec<Transition> {
        nfa.states().iter().map(State::transition).collect()
    }

    #[test]
    fn state_count_is_bounded_by_literal_len() {
        for pattern in &["", "a", "ab|c", "(a|b)*c+d?", "((x))", "a|", "()"] {
            let tokens = syntax::tokenize(pattern).unwrap();
            let nfa = Compiler::new().build_from_tokens(&tokens).unwrap();
            assert!(
                nfa.len() <= tokens.literal_len() + 1,
                "pattern {:?} produced {} states",
                pattern,
                nfa.len(),
            );
        }
        assert_eq!(6, build("((a|b))*c").len());
    }

    #[test]
    fn accept_is_created_last() {
        let nfa = build("ab");
        assert_eq!(
            vec![
                Transition::Literal('a'),
                Transition::Literal('b'),
                Transition::Accept,
            ],
            transitions(&nfa),
        );
        assert_eq!(StateID::must(2), nfa.accept());
        assert_eq!(StateID::must(0), nfa.start());
    }

    #[test]
    fn union_is_right_nested() {
        let expected = "\
>000000: EPS => 1, 2
 000001: 'a' => 3, NULL
 000002: EPS => 4, 5
 000003: ACC => NULL, NULL
 000004: 'b' => 3, NULL
 000005: 'c' => 3, NULL
";
        assert_eq!(expected, build("a|b|c").describe());
    }

    #[test]
    fn union_binds_looser_than_concat() {
        let expected = "\
>000000: EPS => 1, 2
 000001: 'a' => 3, NULL
 000002: 'c' => 4, NULL
 000003: 'b' => 4, NULL
 000004: ACC => NULL, NULL
";
        assert_eq!(expected, build("ab|c").describe());
    }

    #[test]
    fn empty_alternatives_are_zero_width() {
        let expected = "\
>000000: EPS => 1, 2
 000001: 'a' => 2, NULL
 000002: ACC => NULL, NULL
";
        assert_eq!(expected, build("(a|)").describe());
        assert_eq!(expected, build("a|").describe());

        let expected = "\
>000000: EPS => 1, 2
 000001: ACC => NULL, NULL
 000002: 'a' => 1, NULL
";
        assert_eq!(expected, build("(|a)").describe());

        assert_eq!(build("").describe(), build("(|)").describe());
    }

    #[test]
    fn quantifier_binds_to_group() {
        let expected = "\
>000000: 'x' => 1, NULL
 000001: EPS => 2, 3
 000002: EPS => 4, 5
 000003: ACC => NULL, NULL
 000004: 'a' => 1, NULL
 000005: 'b' => 1, NULL
";
        assert_eq!(expected, build("x((a|b))*").describe());
    }

    #[test]
    fn union_consumes_its_group_close() {
        // The `)` closing a group that holds a `|` is consumed along with
        // the union, so a quantifier right after it applies to nothing.
        let expected = "\
>000000: 'x' => 1, NULL
 000001: EPS => 2, 3
 000002: 'a' => 4, NULL
 000003: 'b' => 4, NULL
 000004: ACC => NULL, NULL
";
        assert_eq!(expected, build("x(a|b)*").describe());
        assert_eq!(build("x(a|b)y").describe(), build("x(a|b)*y").describe());
        assert_eq!(build("(a|b)").describe(), build("(a|b)+?").describe());
    }

    #[test]
    fn union_tail_joins_last_alternative() {
        // After the last alternative of a group consumes the `)`, whatever
        // follows is concatenated onto that alternative only.
        assert_eq!(build("a|(b|c)d").describe(), build("(a|b|c)d").describe());
        assert_eq!(build("((a|b)c)").describe(), build("(a|b)c").describe());
    }

    #[test]
    fn quantifier_binds_to_last_atom() {
        let expected = "\
>000000: 'a' => 1, NULL
 000001: 'b' => 2, NULL
 000002: EPS => 1, 3
 000003: ACC => NULL, NULL
";
        assert_eq!(expected, build("ab+").describe());
    }

    #[test]
    fn quantifier_on_nothing_is_ignored() {
        assert_eq!(build("a").describe(), build("*a").describe());
        assert_eq!(build("a").describe(), build("+?a").describe());
        assert_eq!(build("a").describe(), build("a()*").describe());
        assert_eq!(build("b").describe(), build("(*b)").describe());
        assert_eq!(build("a|b").describe(), build("a|*b").describe());
    }

    #[test]
    fn empty_groups_are_no_ops() {
        assert_eq!(build("ab").describe(), build("a()b").describe());
        assert_eq!(build("ab").describe(), build("(a)(b)").describe());
        assert_eq!(build("").describe(), build("(())").describe());
    }

    #[test]
    fn stacked_quantifiers_nest() {
        let nfa = build("a**");
        assert_eq!(
            vec![
                Transition::Literal('a'),
                Transition::Epsilon,
                Transition::Epsilon,
                Transition::Accept,
            ],
            transitions(&nfa),
        );
        // The second star loops back into the first, creating an epsilon
        // cycle between the two splits.
        let first = nfa.state(StateID::must(1));
        let second = nfa.state(StateID::must(2));
        assert_eq!(Some(StateID::must(2)), first.fork());
        assert_eq!(Some(StateID::must(1)), second.next());
        assert_eq!(StateID::must(2), nfa.start());
    }

    #[test]
    fn every_slot_is_filled() {
        let patterns = &[
            "a", "a?", "a*", "a+", "(a|b)+c", "((a|)*|b?)+", "|", "a||b",
            r"\a\0\ .", "(((x)))*y",
        ];
        for pattern in patterns.iter() {
            let nfa = build(pattern);
            for (i, state) in nfa.states().iter().enumerate() {
                let t = state.transition();
                if t.is_accept() {
                    assert!(state.next().is_none() && state.fork().is_none());
                } else if t.is_epsilon() {
                    assert!(
                        state.next().is_some() && state.fork().is_some(),
                        "{:?}: epsilon state {} has an empty slot",
                        pattern,
                        i,
                    );
                } else {
                    assert!(state.next().is_some());
                    assert!(state.fork().is_none());
                }
            }
        }
    }

    #[test]
    fn syntax_errors_propagate() {
        for pattern in &["(a", "a)", r"\x", r"\"] {
            let err = Compiler::new().build(pattern).unwrap_err();
            assert!(err.is_syntax(), "{:?} should be a syntax error", pattern);
        }
    }

    #[test]
    fn nest_limit_is_applied() {
        let mut compiler = Compiler::new();
        compiler.syntax(syntax::Config::new().nest_limit(1));
        assert!(compiler.build("(a)(b)").is_ok());
        let err = compiler.build("((a))").unwrap_err();
        assert_eq!(
            &syntax::ErrorKind::NestLimitExceeded(1),
            err.syntax_error().unwrap().kind(),
        );
    }

    #[test]
    fn size_limit_is_applied() {
        let size = core::mem::size_of::<State>();
        let mut compiler = Compiler::new();
        compiler.configure(Config::new().nfa_size_limit(Some(3 * size)));
        assert!(compiler.build("ab").is_ok());
        let err = compiler.build("abc").unwrap_err();
        assert!(!err.is_syntax());
        // The compiler is reusable after a failure.
        assert_eq!(3, compiler.build("a*").unwrap().len());
    }
}
