use {
    anyhow::Context,
    lexopt::{Arg, Parser},
    nfa_regex::{nfa::thompson, syntax},
};

use crate::{
    args::{self, Usage},
    config::Configurable,
};

/// Exposes the Thompson NFA compiler configuration via CLI flags.
#[derive(Debug, Default)]
pub struct Config {
    thompson: thompson::Config,
}

impl Config {
    /// Return a `thompson::Config` object from this configuration.
    pub fn thompson(&self) -> thompson::Config {
        self.thompson
    }

    /// Compiles the given pattern into an NFA.
    pub fn from_pattern(
        &self,
        syntax: syntax::Config,
        pattern: &str,
    ) -> anyhow::Result<thompson::NFA> {
        thompson::Compiler::new()
            .syntax(syntax)
            .configure(self.thompson)
            .build(pattern)
            .context("failed to compile Thompson NFA")
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Long("nfa-size-limit") => {
                let limit = args::parse_maybe(p, "--nfa-size-limit")?;
                self.thompson = self.thompson.nfa_size_limit(limit);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &'static [Usage] = &[Usage::new(
            "--nfa-size-limit <limit>",
            "Set a limit on heap used by the NFA in bytes.",
            r#"
This sets a limit on the number of heap memory bytes that may be used by the
NFA's states. When the limit is exceeded, compilation fails. The special value
'none' indicates that no limit should be imposed.

By default, there is no limit.
"#,
        )];
        USAGES
    }
}
