use std::{
    fs::File,
    io::{self, BufRead},
    path::PathBuf,
};

use {
    anyhow::Context,
    lexopt::{Arg, Parser},
};

use crate::{args::Usage, config::Configurable};

/// Where the haystacks for a search come from and how results are reported.
#[derive(Debug, Default)]
pub struct Config {
    path: Option<PathBuf>,
    pub matching: bool,
}

impl Config {
    /// Return a reader over the lines to search. This reads from the file
    /// given by --input, or from stdin when no file was given.
    pub fn reader(&self) -> anyhow::Result<Box<dyn BufRead>> {
        match self.path {
            None => Ok(Box::new(io::BufReader::new(io::stdin()))),
            Some(ref path) => {
                let file = File::open(path).with_context(|| {
                    format!("failed to open {}", path.display())
                })?;
                Ok(Box::new(io::BufReader::new(file)))
            }
        }
    }
}

impl Configurable for Config {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            Arg::Long("input") => {
                let path = PathBuf::from(p.value().context("--input")?);
                self.path = Some(path);
            }
            Arg::Long("matching") => {
                self.matching = true;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const USAGES: &'static [Usage] = &[
            Usage::new(
                "--input <path>",
                "Read haystacks from a file.",
                r#"
Read haystacks, one per line, from the given file instead of stdin.
"#,
            ),
            Usage::new(
                "--matching",
                "Only print lines that match.",
                r#"
Instead of printing 'true' or 'false' for every line, print only the lines
that the pattern matches in full.
"#,
            ),
        ];
        USAGES
    }
}
