use std::{
    fmt::{Debug, Display, Write},
    str::FromStr,
};

use {
    anyhow::Context,
    lexopt::{Arg, Parser, ValueExt},
};

/// Parses the argument from the given parser as a command name, and returns
/// it. If no argument remains, then `Ok(None)` is returned so the caller can
/// decide what an empty command line means.
///
/// This also handles the case where -h/--help is given, in which case, the
/// given usage information is converted into an error and printed.
pub fn next_as_command(
    usage: &str,
    p: &mut Parser,
) -> anyhow::Result<Option<String>> {
    let usage = usage.trim();
    let arg = match p.next()? {
        Some(arg) => arg,
        None => return Ok(None),
    };
    let cmd = match arg {
        Arg::Value(cmd) => cmd.string()?,
        Arg::Short('h') | Arg::Long("help") => anyhow::bail!("{}", usage),
        arg => return Err(arg.unexpected().into()),
    };
    Ok(Some(cmd))
}

/// Like `next_as_command`, but a missing command is an error whose message
/// is the given usage.
pub fn require_command(usage: &str, p: &mut Parser) -> anyhow::Result<String> {
    match next_as_command(usage, p)? {
        Some(cmd) => Ok(cmd),
        None => anyhow::bail!("{}", usage.trim()),
    }
}

/// Parses the next 'p.value()' into 'T'. Any error messages will include the
/// given flag name in them.
pub fn parse<T>(p: &mut Parser, flag_name: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    let osv = p.value().context(flag_name)?;
    let strv = match osv.to_str() {
        Some(strv) => strv,
        None => {
            let err = lexopt::Error::NonUnicodeValue(osv.into());
            return Err(anyhow::Error::from(err).context(flag_name));
        }
    };
    let parsed = match strv.parse() {
        Err(err) => return Err(anyhow::Error::msg(err).context(flag_name)),
        Ok(parsed) => parsed,
    };
    Ok(parsed)
}

/// Like `parse`, but permits the string value "none" to indicate absent. This
/// is useful for parsing things like limits, where "no limit" is a legal
/// value.
pub fn parse_maybe<T>(
    p: &mut Parser,
    flag_name: &'static str,
) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    let osv = p.value().context(flag_name)?;
    let strv = match osv.to_str() {
        Some(strv) => strv,
        None => {
            let err = lexopt::Error::NonUnicodeValue(osv.into());
            return Err(anyhow::Error::from(err).context(flag_name));
        }
    };
    if strv == "none" {
        return Ok(None);
    }
    let parsed = match strv.parse() {
        Err(err) => return Err(anyhow::Error::msg(err).context(flag_name)),
        Ok(parsed) => parsed,
    };
    Ok(Some(parsed))
}

/// A type for expressing the documentation of a flag.
///
/// The `Usage::short` and `Usage::long` functions take a slice of usages and
/// format them into a human readable display. It does simple word wrapping and
/// column alignment for you.
#[derive(Clone, Copy, Debug)]
pub struct Usage {
    /// The format of the flag, for example, '--nest-limit <limit>'.
    pub format: &'static str,
    /// A very short description of the flag. Should fit on one line along with
    /// the format.
    pub short: &'static str,
    /// A longer form description of the flag. May be multiple paragraphs long
    /// (but doesn't have to be).
    pub long: &'static str,
}

impl Usage {
    /// Create a new usage from the given components.
    pub const fn new(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { format, short, long }
    }

    /// Format a two column table from the given usages, where the first
    /// column is the format and the second column is the short description.
    pub fn short(usages: &[Usage]) -> String {
        const MIN_SPACE: usize = 2;

        let mut result = String::new();
        let max_len = match usages.iter().map(|u| u.format.len()).max() {
            None => return result,
            Some(len) => len,
        };
        for usage in usages.iter() {
            let padlen = MIN_SPACE + (max_len - usage.format.len());
            let padding = " ".repeat(padlen);
            // Writing to a String never fails.
            let _ = writeln!(
                result,
                "    {}{}{}",
                usage.format, padding, usage.short
            );
        }
        result
    }

    /// Print the format of each usage and its long description below the
    /// format. This also does appropriate indentation with the assumption that
    /// it is in an OPTIONS section of a bigger usage message.
    pub fn long(usages: &[Usage]) -> String {
        let wrap_opts = textwrap::Options::new(79)
            .initial_indent("        ")
            .subsequent_indent("        ");
        let mut result = String::new();
        for (i, usage) in usages.iter().enumerate() {
            if i > 0 {
                result.push('\n');
            }
            result.push_str("    ");
            result.push_str(usage.format);
            result.push('\n');
            for (i, paragraph) in usage.long.trim().split("\n\n").enumerate() {
                if i > 0 {
                    result.push('\n');
                }
                let flattened = paragraph.replace("\n", " ");
                for line in textwrap::wrap(&flattened, &wrap_opts) {
                    result.push_str(&line);
                    result.push('\n');
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USAGES: &[Usage] = &[
        Usage::new("-q, --quiet", "Suppress output.", "Suppress output."),
        Usage::new(
            "--nest-limit <limit>",
            "Set the nest limit.",
            "Set the nest limit.\n\nThe default is 250.",
        ),
    ];

    #[test]
    fn short_usage_aligns_columns() {
        let got = Usage::short(USAGES);
        let lines: Vec<&str> = got.lines().collect();
        assert_eq!(2, lines.len());
        assert_eq!(
            lines[0].find("Suppress").unwrap(),
            lines[1].find("Set").unwrap(),
        );
    }

    #[test]
    fn long_usage_keeps_paragraphs() {
        let got = Usage::long(USAGES);
        assert!(got.contains("    --nest-limit <limit>\n"));
        assert!(got.contains("        Set the nest limit.\n\n"));
        assert!(got.contains("        The default is 250.\n"));
    }

    #[test]
    fn parse_limits() {
        let mut p = Parser::from_args(&["10", "none", "x"]);
        let n: usize = parse(&mut p, "--n").unwrap();
        assert_eq!(10, n);
        let n: Option<usize> = parse_maybe(&mut p, "--n").unwrap();
        assert_eq!(None, n);
        assert!(parse::<usize>(&mut p, "--n").is_err());
    }
}
