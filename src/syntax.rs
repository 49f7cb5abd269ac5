/*!
Turns a pattern string into a flat sequence of tokens.

The pattern language is deliberately tiny:

* Any character not listed below is a literal.
* `.` matches any single character.
* `?`, `*` and `+` repeat the preceding item zero-or-one, zero-or-more and
  one-or-more times.
* `|` separates alternatives.
* `(` and `)` group.
* `\` escapes the next character. `\A` and `\a` match an ASCII letter, `\0`
  matches an ASCII letter or digit, and `\ ` (backslash space) matches ASCII
  whitespace. A backslash before one of `( ) \ . ? * + |` makes that
  character a literal. Anything else after a backslash is an error.

Tokenization is the only place where syntax errors are detected. Once a
pattern tokenizes successfully, its groups are balanced and every escape is
valid, so the compiler never has to report a syntax error of its own.
*/

use alloc::vec::Vec;

/// The configuration used by a [`Tokenizer`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    nest_limit: u32,
}

impl Config {
    /// Return a new default tokenizer configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// Set the nesting limit for groups.
    ///
    /// The compiler recurses once for every level of group nesting, so this
    /// bounds the amount of call stack space a single pattern can use. A
    /// pattern like `((a))` has a nesting depth of `2`. Patterns that exceed
    /// this limit are rejected with [`ErrorKind::NestLimitExceeded`].
    ///
    /// The default is `250`.
    pub fn nest_limit(mut self, limit: u32) -> Config {
        self.nest_limit = limit;
        self
    }

    /// Returns the nesting limit for groups.
    pub fn get_nest_limit(&self) -> u32 {
        self.nest_limit
    }
}

impl Default for Config {
    fn default() -> Config {
        Config { nest_limit: 250 }
    }
}

/// A single lexical item in a pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Token {
    /// A character that matches only itself.
    Literal(char),
    /// `.`, which matches any character.
    Wildcard,
    /// `\A` or `\a`, which matches any ASCII letter.
    AlphaClass,
    /// `\0`, which matches any ASCII letter or digit.
    NumericClass,
    /// `\ `, which matches any ASCII whitespace character.
    WhitespaceClass,
    /// `(`
    GroupOpen,
    /// `)`
    GroupClose,
    /// One of `?`, `*` or `+`.
    Quantifier(Quantifier),
    /// `|`
    Union,
}

/// A postfix repetition operator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Quantifier {
    /// `?`
    ZeroOrOne,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Quantifier {
    /// Whether the repeated item may be skipped entirely.
    pub fn allows_zero(&self) -> bool {
        match *self {
            Quantifier::ZeroOrOne | Quantifier::ZeroOrMore => true,
            Quantifier::OneOrMore => false,
        }
    }

    /// Whether the repeated item may occur any number of times.
    pub fn is_unbounded(&self) -> bool {
        match *self {
            Quantifier::ZeroOrOne => false,
            Quantifier::ZeroOrMore | Quantifier::OneOrMore => true,
        }
    }
}

/// The result of tokenizing a pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tokens {
    tokens: Vec<Token>,
    literal_len: usize,
}

impl Tokens {
    /// The tokens, in pattern order.
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// The number of tokens that are not grouping parentheses.
    ///
    /// Every such token produces at most one NFA state, so this plus one
    /// (for the accepting state) bounds the number of states in the
    /// compiled NFA.
    pub fn literal_len(&self) -> usize {
        self.literal_len
    }
}

/// Tokenizes pattern strings according to a [`Config`].
#[derive(Clone, Debug, Default)]
pub struct Tokenizer {
    config: Config,
}

impl Tokenizer {
    /// Create a new tokenizer with a default configuration.
    pub fn new() -> Tokenizer {
        Tokenizer::default()
    }

    /// Set the configuration of this tokenizer.
    pub fn configure(&mut self, config: Config) -> &mut Tokenizer {
        self.config = config;
        self
    }

    /// Tokenize the given pattern.
    ///
    /// This fails if the groups in the pattern are unbalanced, if they are
    /// nested more deeply than the configured limit, or if a backslash is
    /// followed by anything other than a class selector or a
    /// meta-character.
    pub fn tokenize(&self, pattern: &str) -> Result<Tokens, Error> {
        let mut tokens = Vec::with_capacity(pattern.len());
        // The offsets of every group that is still open.
        let mut open: Vec<usize> = Vec::new();
        let mut groups = 0;
        let mut chars = pattern.chars().enumerate();
        while let Some((offset, ch)) = chars.next() {
            let token = match ch {
                '.' => Token::Wildcard,
                '?' => Token::Quantifier(Quantifier::ZeroOrOne),
                '*' => Token::Quantifier(Quantifier::ZeroOrMore),
                '+' => Token::Quantifier(Quantifier::OneOrMore),
                '|' => Token::Union,
                '(' => {
                    open.push(offset);
                    if open.len() > self.config.nest_limit as usize {
                        return Err(Error::new(
                            ErrorKind::NestLimitExceeded(
                                self.config.nest_limit,
                            ),
                            offset,
                        ));
                    }
                    groups += 1;
                    Token::GroupOpen
                }
                ')' => {
                    if open.pop().is_none() {
                        return Err(Error::new(
                            ErrorKind::GroupUnopened,
                            offset,
                        ));
                    }
                    Token::GroupClose
                }
                '\\' => match chars.next() {
                    None => {
                        return Err(Error::new(
                            ErrorKind::EscapeUnexpectedEof,
                            offset,
                        ))
                    }
                    Some((_, 'A')) | Some((_, 'a')) => Token::AlphaClass,
                    Some((_, '0')) => Token::NumericClass,
                    Some((_, ' ')) => Token::WhitespaceClass,
                    Some((_, c)) if is_meta_character(c) => {
                        Token::Literal(c)
                    }
                    Some((_, c)) => {
                        return Err(Error::new(
                            ErrorKind::EscapeUnrecognized(c),
                            offset,
                        ))
                    }
                },
                c => Token::Literal(c),
            };
            tokens.push(token);
        }
        if let Some(&offset) = open.last() {
            return Err(Error::new(ErrorKind::GroupUnclosed, offset));
        }
        let literal_len = tokens.len() - 2 * groups;
        Ok(Tokens { tokens, literal_len })
    }
}

/// Tokenize a pattern using the default configuration.
pub fn tokenize(pattern: &str) -> Result<Tokens, Error> {
    Tokenizer::new().tokenize(pattern)
}

/// Returns true if the given character has special meaning in a pattern and
/// thus must be escaped to be matched literally.
pub fn is_meta_character(c: char) -> bool {
    match c {
        '(' | ')' | '\\' | '.' | '?' | '*' | '+' | '|' => true,
        _ => false,
    }
}

/// Escape every meta-character in the given string, such that the result is
/// a pattern that matches exactly the given string.
pub fn escape(text: &str) -> alloc::string::String {
    let mut buf = alloc::string::String::with_capacity(text.len());
    for c in text.chars() {
        if is_meta_character(c) {
            buf.push('\\');
        }
        buf.push(c);
    }
    buf
}

/// An error that occurred while tokenizing a pattern.
///
/// Every error carries the reason the pattern was rejected, available via
/// [`Error::kind`], and the offset (counted in characters, not bytes) of the
/// character in the pattern that caused it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    offset: usize,
}

/// The reason a pattern was rejected.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A `)` was found without a matching `(`. The offset points at the
    /// `)`.
    GroupUnopened,
    /// The pattern ended while at least one group was still open. The offset
    /// points at the innermost unclosed `(`.
    GroupUnclosed,
    /// The pattern ended with a lone `\`.
    EscapeUnexpectedEof,
    /// A `\` was followed by a character that is neither a class selector
    /// nor a meta-character.
    EscapeUnrecognized(char),
    /// Groups were nested more deeply than the limit given.
    NestLimitExceeded(u32),
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, offset: usize) -> Error {
        Error { kind, offset }
    }

    /// Return the reason this error occurred.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Return the character offset in the pattern where this error occurred.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "syntax error at offset {}: ", self.offset)?;
        match self.kind {
            ErrorKind::GroupUnopened => {
                write!(f, "unopened group")
            }
            ErrorKind::GroupUnclosed => {
                write!(f, "unclosed group")
            }
            ErrorKind::EscapeUnexpectedEof => {
                write!(f, "incomplete escape sequence at end of pattern")
            }
            ErrorKind::EscapeUnrecognized(c) => {
                write!(f, "unrecognized escape sequence '\\{}'", c)
            }
            ErrorKind::NestLimitExceeded(limit) => write!(
                f,
                "exceed the maximum number of \
                 nested groups ({})",
                limit,
            ),
        }
    }
}
