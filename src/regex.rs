use core::{fmt, str::FromStr};

use alloc::string::{String, ToString};

use crate::{
    nfa::thompson::{self, pikevm::PikeVM, Error, NFA},
    syntax,
};

/// A compiled pattern that can be tested against whole strings.
///
/// A `Regex` answers a single question: does the pattern match the entire
/// haystack? There are no partial matches, match offsets or capture groups.
///
/// A `Regex` is immutable once built and may be shared freely between
/// threads. Each call to [`Regex::is_match`] allocates its own scratch
/// space. Callers that want to reuse that space across many searches can
/// drop down to the [`PikeVM`] returned by [`Regex::pikevm`].
///
/// # Example
///
/// ```
/// use nfa_regex::Regex;
///
/// let re = Regex::new(r"\a+(_\0+)*")?;
/// assert!(re.is_match("snake_case2"));
/// assert!(!re.is_match("2fast"));
/// assert!(!re.is_match(""));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct Regex {
    pattern: String,
    vm: PikeVM,
}

impl Regex {
    /// Compile the given pattern with the default configuration.
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        Regex::builder().build(pattern)
    }

    /// Return a builder for configuring the construction of a `Regex`.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Returns true if and only if this regex matches all of `haystack`.
    pub fn is_match(&self, haystack: &str) -> bool {
        let mut cache = self.vm.create_cache();
        self.vm.is_match(&mut cache, haystack)
    }

    /// Return the pattern this regex was compiled from.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Render the underlying NFA. See [`NFA::describe`] for the format.
    pub fn describe(&self) -> String {
        self.nfa().describe()
    }

    /// Return the underlying NFA.
    pub fn nfa(&self) -> &NFA {
        self.vm.nfa()
    }

    /// Return the underlying NFA simulation.
    pub fn pikevm(&self) -> &PikeVM {
        &self.vm
    }
}

impl FromStr for Regex {
    type Err = Error;

    fn from_str(pattern: &str) -> Result<Regex, Error> {
        Regex::new(pattern)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Regex").field(&self.as_str()).finish()
    }
}

/// A builder for a [`Regex`].
///
/// # Example
///
/// ```
/// use nfa_regex::{nfa::thompson, syntax, Regex};
///
/// let re = Regex::builder()
///     .syntax(syntax::Config::new().nest_limit(1))
///     .thompson(thompson::Config::new().nfa_size_limit(Some(1 << 20)))
///     .build("(a|b)c")?;
/// assert!(re.is_match("bc"));
///
/// let err = Regex::builder()
///     .syntax(syntax::Config::new().nest_limit(1))
///     .build("((a))")
///     .unwrap_err();
/// assert!(err.is_syntax());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Builder {
    pikevm: thompson::pikevm::Builder,
}

impl Builder {
    /// Create a new regex builder with the default configuration.
    pub fn new() -> Builder {
        Builder { pikevm: PikeVM::builder() }
    }

    /// Compile the given pattern into a `Regex`.
    pub fn build(&self, pattern: &str) -> Result<Regex, Error> {
        let vm = self.pikevm.build(pattern)?;
        Ok(Regex { pattern: pattern.to_string(), vm })
    }

    /// Set the tokenizer configuration.
    pub fn syntax(&mut self, config: syntax::Config) -> &mut Builder {
        self.pikevm.syntax(config);
        self
    }

    /// Set the Thompson NFA compiler configuration.
    pub fn thompson(&mut self, config: thompson::Config) -> &mut Builder {
        self.pikevm.thompson(config);
        self
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn whole_string_only() {
        let r = re("ab");
        assert!(r.is_match("ab"));
        assert!(!r.is_match("abab"));
        assert!(!r.is_match("xab"));
        assert!(!r.is_match("a"));
    }

    #[test]
    fn quantifier_laws() {
        for haystack in &["", "a", "aa", "aaa", "b"] {
            let n = haystack.len();
            let all_a = haystack.chars().all(|c| c == 'a');
            assert_eq!(n <= 1 && all_a, re("a?").is_match(haystack));
            assert_eq!(all_a, re("a*").is_match(haystack));
            assert_eq!(n >= 1 && all_a, re("a+").is_match(haystack));
        }
    }

    #[test]
    fn union_precedence() {
        let r = re("ab|cd");
        assert!(r.is_match("ab"));
        assert!(r.is_match("cd"));
        assert!(!r.is_match("abd"));
        assert!(!r.is_match("acd"));

        let r = re("a(b|c)d");
        assert!(r.is_match("abd"));
        assert!(r.is_match("acd"));
        assert!(!r.is_match("ab"));
    }

    #[test]
    fn empty_alternatives() {
        assert!(re("(a|)").is_match(""));
        assert!(re("(a|)").is_match("a"));
        assert!(re("|").is_match(""));
        assert!(!re("|").is_match("a"));
        assert!(re("a||b").is_match(""));
    }

    #[test]
    fn malformed_patterns() {
        for pattern in &["(", ")", "(a", "a)", "(a))", r"\", r"a\", r"\q"] {
            let err = Regex::new(pattern).unwrap_err();
            assert!(err.is_syntax(), "pattern {:?}", pattern);
        }
    }

    #[test]
    fn accessors() {
        let r: Regex = "x(y|z)".parse().unwrap();
        assert_eq!("x(y|z)", r.as_str());
        assert_eq!("x(y|z)", format!("{}", r));
        assert_eq!(r#"Regex("x(y|z)")"#, format!("{:?}", r));
        assert_eq!(r.nfa().describe(), r.describe());
        assert_eq!(r.nfa().len(), r.pikevm().nfa().len());
    }

    #[test]
    fn thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Regex>();
        assert_send_sync::<NFA>();
        assert_send_sync::<PikeVM>();
        assert_send_sync::<Error>();
    }
}
