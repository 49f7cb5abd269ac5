use {
    lexopt::{Arg, Parser},
    nfa_regex::syntax,
};

use crate::{
    args::{self, Usage},
    config::Configurable,
};

/// Exposes the tokenizer configuration via CLI flags.
#[derive(Debug, Default)]
pub struct Config {
    syntax: syntax::Config,
}

impl Config {
    /// Return a `syntax::Config` object from this configuration.
    pub fn syntax(&self) -> syntax::Config {
        self.syntax
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Long("nest-limit") => {
                let limit = args::parse(p, "--nest-limit")?;
                self.syntax = self.syntax.nest_limit(limit);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &'static [Usage] = &[Usage::new(
            "--nest-limit <limit>",
            "Set the maximum group nesting depth.",
            r#"
Set the maximum depth of nested groups a pattern may have. A pattern nesting
groups deeper than this fails to compile.

The default is 250.
"#,
        )];
        USAGES
    }
}
