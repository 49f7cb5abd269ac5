use std::io::{stdout, BufRead, Write};

use nfa_regex::nfa::thompson::pikevm::PikeVM;

use crate::config::{common, configure, input, patterns, syntax, thompson};

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    const USAGE: &'static str = "\
Matches a pattern against every line of input.

Each line is matched in full, without its line terminator. For every line,
either 'true' or 'false' is printed. With --matching, only the lines that
match are printed.

USAGE:
    regex-cli find <pattern>

TIP:
    use -h for short docs and --help for long docs

OPTIONS:
%options%
";

    let mut common = common::Config::default();
    let mut input = input::Config::default();
    let mut patterns = patterns::Config::default();
    let mut syntax = syntax::Config::default();
    let mut thompson = thompson::Config::default();
    configure(
        p,
        USAGE,
        &mut [
            &mut common,
            &mut input,
            &mut patterns,
            &mut syntax,
            &mut thompson,
        ],
    )?;

    let pattern = patterns.get()?;
    let nfa = thompson.from_pattern(syntax.syntax(), &pattern)?;
    let vm = PikeVM::new_from_nfa(nfa);
    let mut cache = vm.create_cache();

    let stdout = stdout();
    let mut out = stdout.lock();
    let (mut searched, mut matched) = (0, 0);
    for line in input.reader()?.lines() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        let is_match = vm.is_match(&mut cache, line);
        searched += 1;
        if is_match {
            matched += 1;
        }
        if input.matching {
            if is_match {
                writeln!(out, "{}", line)?;
            }
        } else if !common.quiet {
            writeln!(out, "{}", is_match)?;
        }
    }
    out.flush()?;
    log::debug!("searched {} lines, {} matched", searched, matched);
    Ok(())
}
