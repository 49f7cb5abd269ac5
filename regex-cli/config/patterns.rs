use {
    anyhow::Context,
    lexopt::{Arg, Parser, ValueExt},
    nfa_regex::syntax,
};

use crate::{args::Usage, config::Configurable};

/// Collects the pattern given as a positional argument.
#[derive(Debug, Default)]
pub struct Config {
    patterns: Vec<String>,
    fixed_strings: bool,
}

impl Config {
    /// Returns the one and only pattern given on the command line, escaped
    /// if -F/--fixed-strings was set.
    ///
    /// Giving no pattern, or more than one, is an error.
    pub fn get(&self) -> anyhow::Result<String> {
        anyhow::ensure!(
            self.patterns.len() == 1,
            "wrong number of arguments: expected exactly one pattern, \
             but {} were given",
            self.patterns.len(),
        );
        let pattern = &self.patterns[0];
        if self.fixed_strings {
            Ok(syntax::escape(pattern))
        } else {
            Ok(pattern.clone())
        }
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        _: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Short('F') | Arg::Long("fixed-strings") => {
                self.fixed_strings = true;
            }
            Arg::Value(ref mut v) => {
                let v = std::mem::take(v);
                self.patterns
                    .push(v.string().context("patterns must be valid UTF-8")?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &'static [Usage] = &[Usage::new(
            "-F, --fixed-strings",
            "Interpret the pattern as a literal.",
            r#"
Interpret the pattern as a literal string instead of a regular expression.
Every meta character in the pattern is escaped before it is compiled.
"#,
        )];
        USAGES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_pattern() {
        let mut config = Config::default();
        assert!(config.get().is_err());
        config.patterns.push("a*".to_string());
        assert_eq!("a*", config.get().unwrap());
        config.patterns.push("b".to_string());
        let err = config.get().unwrap_err();
        assert!(err.to_string().contains("wrong number of arguments"));
    }

    #[test]
    fn fixed_strings() {
        let config = Config {
            patterns: vec!["a.b*".to_string()],
            fixed_strings: true,
        };
        assert_eq!(r"a\.b\*", config.get().unwrap());
    }
}
