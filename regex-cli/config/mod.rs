use std::fmt::Debug;

use lexopt::{Arg, Parser};

use crate::args::Usage;

pub mod common;
pub mod input;
pub mod patterns;
pub mod syntax;
pub mod thompson;

/// A group of flags that can be recognized and applied by a command.
pub trait Configurable: Debug + 'static {
    /// Apply the given argument to this configuration, pulling a value out
    /// of the parser if the flag needs one. Returns false if the argument
    /// isn't one of this configuration's flags.
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool>;

    fn usage(&self) -> &[Usage];
}

/// Parse all remaining arguments by offering each one to the given targets
/// in order. An argument no target recognizes is an error.
///
/// `-h` and `--help` turn the given usage into an error, with `%options%`
/// replaced by the short or long documentation of every target's flags.
pub fn configure(
    p: &mut Parser,
    usage: &str,
    targets: &mut [&mut dyn Configurable],
) -> anyhow::Result<()> {
    while let Some(arg) = p.next()? {
        match arg {
            Arg::Short('h') | Arg::Long("help") => {
                let mut usages = vec![];
                for t in targets.iter() {
                    usages.extend_from_slice(t.usage());
                }
                usages.sort_by_key(|u| u.format);
                let options = if arg == Arg::Short('h') {
                    Usage::short(&usages)
                } else {
                    Usage::long(&usages)
                };
                let usage = usage.replace("%options%", &options);
                anyhow::bail!("{}", usage.trim());
            }
            _ => {}
        }
        // We do this little dance to disentangle the lifetime of 'p' from the
        // lifetime on 'arg'. The cost is that we have to clone all long flag
        // names to give it a place to live that isn't tied to 'p'.
        let long_flag: Option<String> = match arg {
            Arg::Long(name) => Some(name.to_string()),
            _ => None,
        };
        let mut arg = match (long_flag.as_deref(), arg) {
            (Some(flag), _) => Arg::Long(flag),
            (None, Arg::Short(c)) => Arg::Short(c),
            (None, Arg::Value(value)) => Arg::Value(value),
            (None, Arg::Long(_)) => unreachable!(),
        };
        let mut recognized = false;
        for t in targets.iter_mut() {
            if t.configure(p, &mut arg)? {
                recognized = true;
                break;
            }
        }
        if !recognized {
            return Err(arg.unexpected().into());
        }
    }
    Ok(())
}
