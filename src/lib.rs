/*!
A small regular expression engine built on Thompson NFAs.

Patterns are compiled into a non-deterministic finite automaton using
Thompson's construction and then simulated over the entire haystack. A
pattern either matches all of a haystack or it doesn't match at all.

# Syntax

The pattern language supports literals, `.` for any character, the postfix
quantifiers `?`, `*` and `+`, alternation with `|`, grouping with `(` and
`)`, and a handful of backslash escapes. See the [`syntax`] module for the
details.

A `|` inside a group runs up to and including the group's `)`, so a
quantifier written directly after that `)` has nothing to apply to and is
ignored: `(a|b)*` matches only `a` or `b`. To repeat an alternation, wrap
it in a second group, as in `((a|b))*`.

# Example

```
use nfa_regex::Regex;

let re = Regex::new(r"(ab|c)\0+")?;
assert!(re.is_match("abcab42"));
assert!(re.is_match("c7"));
assert!(!re.is_match("7"));
assert!(!re.is_match("abc-"));
# Ok::<(), Box<dyn std::error::Error>>(())
```

# Lower level APIs

[`Regex`] is a thin wrapper. The compiled NFA is exposed in
[`nfa::thompson`], and [`nfa::thompson::pikevm::PikeVM`] simulates it while
letting the caller reuse scratch space across searches.

# Crate features

* **std** - Enabled by default. Implements `std::error::Error` for error
types. Without it, this crate is `no_std` but still requires `alloc`.
* **logging** - Emits compilation and search diagnostics through the `log`
crate.
*/

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use crate::{
    nfa::thompson::Error,
    regex::{Builder as RegexBuilder, Regex},
};

#[macro_use]
mod macros;

pub mod nfa;
mod regex;
pub mod syntax;
pub mod util;
