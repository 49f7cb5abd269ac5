use std::io::{stdout, Write};

use crate::{
    args,
    config::{common, configure, patterns, syntax, thompson},
    util::{self, Table},
};

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    const USAGE: &'static str = "\
Prints the debug representation of things built by nfa-regex.

USAGE:
    regex-cli debug <command> ...

COMMANDS:
    thompson   Print the debug representation of a Thompson NFA.
";

    let cmd = args::require_command(USAGE, p)?;
    match &*cmd {
        "thompson" => run_thompson(p),
        unk => anyhow::bail!("unrecognized command '{}'", unk),
    }
}

fn run_thompson(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    const USAGE: &'static str = "\
Prints the debug representation of a Thompson NFA.

USAGE:
    regex-cli debug thompson <pattern>

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

    let mut common = common::Config::default();
    let mut patterns = patterns::Config::default();
    let mut syntax = syntax::Config::default();
    let mut thompson = thompson::Config::default();
    configure(
        p,
        USAGE,
        &mut [&mut common, &mut patterns, &mut syntax, &mut thompson],
    )?;

    let pattern = patterns.get()?;
    let mut table = Table::empty();
    let (nfa, time) =
        util::timeitr(|| thompson.from_pattern(syntax.syntax(), &pattern))?;
    table.add("compile nfa time", time);
    table.add("memory", nfa.memory_usage());
    table.add("states", nfa.len());
    table.add("start", nfa.start().as_usize());
    table.add("accept", nfa.accept().as_usize());
    table.print(stdout())?;
    if !common.quiet {
        write!(stdout(), "\n{}", nfa.describe())?;
    }
    Ok(())
}
