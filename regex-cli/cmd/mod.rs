use std::io::{stdout, Write};

use crate::args;

mod debug;
mod find;

const USAGE: &'static str = "\
A tool for compiling and running nfa-regex patterns on the command line.

USAGE:
    regex-cli <command> ...

COMMANDS:
    debug    Print the debug representation of a compiled pattern.
    find     Report which lines of input a pattern matches in full.
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let cmd = match args::next_as_command(USAGE, p)? {
        Some(cmd) => cmd,
        None => {
            write!(stdout(), "{}", USAGE)?;
            return Ok(());
        }
    };
    match &*cmd {
        "debug" => debug::run(p),
        "find" => find::run(p),
        unk => anyhow::bail!("unrecognized command '{}'", unk),
    }
}
