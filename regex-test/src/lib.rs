/*!
A small harness for running TOML encoded regex tests.

Each test names a pattern, an input string and whether the pattern is
expected to match the *entire* input. A test may instead declare that its
pattern must fail to compile. For example:

```toml
[[tests]]
name = "star-empty"
regex = "a*"
input = ""
match = true

[[tests]]
name = "unclosed"
regex = "(a"
input = ""
compiles = false
```

Tests are loaded into a [`RegexTests`] collection and run with a
[`TestRunner`], which collects every failure and reports all of them at
once when [`TestRunner::assert`] is called.
*/

use std::borrow::Borrow;
use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use bstr::{BString, ByteSlice, ByteVec};
use serde::Deserialize;

const ENV_REGEX_TEST: &str = "REGEX_TEST";
const ENV_REGEX_TEST_VERBOSE: &str = "REGEX_TEST_VERBOSE";

/// A collection of regex tests.
#[derive(Clone, Debug, Deserialize)]
pub struct RegexTests {
    tests: Vec<RegexTest>,
    #[serde(skip)]
    seen: HashSet<String>,
}

/// A regex test describes a pattern, an input and the expected outcome of
/// matching the pattern against the whole input.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegexTest {
    #[serde(skip)]
    group: String,
    #[serde(default)]
    name: String,
    #[serde(skip)]
    full_name: String,
    regex: String,
    #[serde(default)]
    input: String,
    #[serde(rename = "match")]
    is_match: Option<bool>,
    #[serde(default = "default_true")]
    compiles: bool,
}

impl RegexTests {
    /// Create a new empty collection of regex tests.
    pub fn new() -> RegexTests {
        RegexTests { tests: vec![], seen: HashSet::new() }
    }

    /// Load all of the TOML encoded tests in `data` into this collection.
    /// The given group name is assigned to all loaded tests.
    pub fn load_slice(&mut self, group_name: &str, data: &[u8]) -> Result<()> {
        let mut index = 1;
        let mut tests: RegexTests =
            toml::from_slice(&data).context("error decoding TOML")?;
        for t in &mut tests.tests {
            t.group = group_name.to_string();
            if t.name.is_empty() {
                t.name = format!("{}", index);
                index += 1;
            }
            t.full_name = format!("{}/{}", t.group, t.name);
            t.validate().with_context(|| {
                format!("error loading test '{}'", t.full_name())
            })?;
            if self.seen.contains(t.full_name()) {
                bail!("found duplicate tests for name '{}'", t.full_name());
            }
            self.seen.insert(t.full_name().to_string());
        }
        self.tests.extend(tests.tests);
        Ok(())
    }

    /// Return an iterator over all regex tests that have been loaded. The
    /// order of the iterator corresponds to the order in which the tests were
    /// loaded.
    pub fn iter(&self) -> RegexTestsIter {
        RegexTestsIter { it: self.tests.iter() }
    }
}

impl RegexTest {
    fn test(&self, regex: &CompiledRegex) -> TestResult {
        (regex.match_regex)(self)
    }

    fn validate(&self) -> Result<()> {
        if self.compiles && self.is_match.is_none() {
            bail!("'match' must be present unless 'compiles = false'");
        }
        if !self.compiles && self.is_match.is_some() {
            bail!("'match' cannot be used with 'compiles = false'");
        }
        Ok(())
    }

    /// The name of this test.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full name of this test, which is formed by joining the group
    /// name with the test name via a `/`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Return the pattern under test.
    pub fn regex(&self) -> &str {
        &self.regex
    }

    /// Return the text the pattern should be matched against.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns true if and only if this test expects the pattern to match
    /// the whole input. This is always false for tests whose pattern is
    /// expected to fail compilation.
    pub fn is_match(&self) -> bool {
        self.is_match.unwrap_or(false)
    }

    /// Returns true if the pattern in this test is expected to compile.
    pub fn compiles(&self) -> bool {
        self.compiles
    }
}

/// The result of compiling a regex.
///
/// A `CompiledRegex` represents a pattern that compiled and is ready to be
/// matched against the input of the test it was compiled for.
pub struct CompiledRegex {
    match_regex: Box<dyn Fn(&RegexTest) -> TestResult>,
}

impl CompiledRegex {
    /// Provide a closure that represents the compiled regex and matches it
    /// against the input of a `RegexTest`. The `RegexTest` given to the
    /// closure is the same one that was used to compile this regex.
    pub fn compiled<F: Fn(&RegexTest) -> TestResult + 'static>(
        match_regex: F,
    ) -> CompiledRegex {
        CompiledRegex { match_regex: Box::new(match_regex) }
    }
}

impl std::fmt::Debug for CompiledRegex {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("CompiledRegex").finish()
    }
}

/// The answer a compiled regex gave for a single test.
#[derive(Debug, Clone, Copy)]
pub struct TestResult {
    matched: bool,
}

impl TestResult {
    /// Create a test result from the answer of a match.
    pub fn is_match(yes: bool) -> TestResult {
        TestResult { matched: yes }
    }
}

/// A runner for executing regex tests.
///
/// This runner is intended to be used within a Rust unit test, marked with
/// the `#[test]` attribute. Typical usage corresponds to calling `test_iter`
/// on an iterator of `RegexTest`s, and then calling `assert` once done. If
/// any tests failed, then `assert` will panic with an error message
/// containing all test failures.
///
/// ### Skipping tests
///
/// If the `REGEX_TEST` environment variable is set, then it may contain
/// a comma separated list of substrings. Each substring corresponds to a
/// whitelisted item, unless it starts with a `-`, in which case it
/// corresponds to a blacklisted item.
///
/// If there are any whitelist substrings, then a test's full name must
/// contain at least one of them in order to be run. If there are none, then
/// a test is run only when it does not match any blacklist substrings. The
/// last substring that a test name matches takes precedence.
#[derive(Debug)]
pub struct TestRunner {
    include: Vec<IncludePattern>,
    results: RegexTestResults,
}

#[derive(Debug)]
struct IncludePattern {
    blacklist: bool,
    substring: BString,
}

impl TestRunner {
    /// Create a new runner for executing tests.
    ///
    /// If there was a problem reading the `REGEX_TEST` environment variable,
    /// then an error is returned.
    pub fn new() -> Result<TestRunner> {
        let mut runner =
            TestRunner { include: vec![], results: RegexTestResults::new() };
        for mut substring in read_env(ENV_REGEX_TEST)?.split(",") {
            substring = substring.trim();
            if substring.is_empty() {
                continue;
            }
            if substring.starts_with("-") {
                runner.blacklist(&substring[1..]);
            } else {
                runner.whitelist(substring);
            }
        }
        Ok(runner)
    }

    /// Assert that all tests run have either passed or have been skipped.
    ///
    /// If any tests have failed, then a panic occurs with a report of all
    /// failures.
    ///
    /// If `REGEX_TEST_VERBOSE` is set to `1`, then a longer report of tests
    /// that passed, failed or skipped is printed.
    pub fn assert(&mut self) {
        self.results.assert();
    }

    /// Whitelist the given substring.
    pub fn whitelist(&mut self, substring: &str) -> &mut TestRunner {
        self.include.push(IncludePattern {
            blacklist: false,
            substring: BString::from(substring),
        });
        self
    }

    /// Blacklist the given substring.
    ///
    /// A blacklisted test is never run, unless a whitelisted substring added
    /// after the blacklisted substring matches it.
    pub fn blacklist(&mut self, substring: &str) -> &mut TestRunner {
        self.include.push(IncludePattern {
            blacklist: true,
            substring: BString::from(substring),
        });
        self
    }

    /// Run all of the given tests.
    pub fn test_iter<I, T>(
        &mut self,
        it: I,
        mut compile: impl FnMut(
            &RegexTest,
            &str,
        )
            -> std::result::Result<CompiledRegex, Box<dyn std::error::Error>>,
    ) -> &mut TestRunner
    where
        I: IntoIterator<Item = T>,
        T: Borrow<RegexTest>,
    {
        for test in it {
            let test = test.borrow();
            if self.should_skip(test) {
                self.results.skip(test);
                continue;
            }
            self.test(test, |regex| compile(test, regex));
        }
        self
    }

    /// Run a single test and record its outcome. Failures are only reported
    /// by `assert`.
    fn test(
        &mut self,
        test: &RegexTest,
        mut compile: impl FnMut(
            &str,
        )
            -> std::result::Result<CompiledRegex, Box<dyn std::error::Error>>,
    ) -> &mut TestRunner {
        let compiled = match safe(|| compile(test.regex())) {
            Err(msg) => {
                self.results.fail(
                    test,
                    RegexTestFailureKind::UnexpectedPanicCompile(msg),
                );
                return self;
            }
            Ok(Ok(compiled)) => compiled,
            Ok(Err(err)) => {
                if !test.compiles() {
                    self.results.pass(test);
                } else {
                    self.results.fail(
                        test,
                        RegexTestFailureKind::CompileError { err },
                    );
                }
                return self;
            }
        };
        if !test.compiles() {
            self.results.fail(test, RegexTestFailureKind::NoCompileError);
            return self;
        }
        let result = match safe(|| test.test(&compiled)) {
            Ok(result) => result,
            Err(msg) => {
                self.results.fail(
                    test,
                    RegexTestFailureKind::UnexpectedPanicSearch(msg),
                );
                return self;
            }
        };
        if result.matched != test.is_match() {
            self.results.fail(test, RegexTestFailureKind::IsMatch);
        } else {
            self.results.pass(test);
        }
        self
    }

    /// Return true if and only if the given test should be skipped.
    fn should_skip(&self, test: &RegexTest) -> bool {
        if self.include.is_empty() {
            return false;
        }
        // If we don't have any whitelist patterns, then the test will be run
        // unless it is blacklisted. Otherwise, if there are whitelist
        // patterns, then the test must match at least one of them.
        let mut skip = self.include.iter().any(|pat| !pat.blacklist);
        for pat in &self.include {
            if test.full_name().as_bytes().contains_str(&pat.substring) {
                skip = pat.blacklist;
            }
        }
        skip
    }
}

/// A collection of test results, corresponding to passed, skipped and failed
/// tests.
#[derive(Debug)]
struct RegexTestResults {
    pass: Vec<RegexTest>,
    fail: Vec<RegexTestFailure>,
    skip: Vec<RegexTest>,
}

/// A test that failed along with the reason why.
#[derive(Debug)]
struct RegexTestFailure {
    test: RegexTest,
    kind: RegexTestFailureKind,
}

/// Describes the nature of the failed test.
#[derive(Debug)]
enum RegexTestFailureKind {
    /// The test expected a match (or didn't expect a match), but the regex
    /// implementation didn't match (or did match).
    IsMatch,
    /// The test expected the regex to fail to compile, but it compiled
    /// successfully.
    NoCompileError,
    /// The test expected the regex to compile successfully, but it failed
    /// to compile.
    CompileError { err: Box<dyn std::error::Error> },
    /// While compiling, a panic occurred. If possible, the panic message
    /// is captured.
    UnexpectedPanicCompile(String),
    /// While searching, a panic occurred. If possible, the panic message
    /// is captured.
    UnexpectedPanicSearch(String),
}

impl RegexTestResults {
    fn new() -> RegexTestResults {
        RegexTestResults { pass: vec![], fail: vec![], skip: vec![] }
    }

    fn pass(&mut self, test: &RegexTest) {
        self.pass.push(test.clone());
    }

    fn fail(&mut self, test: &RegexTest, kind: RegexTestFailureKind) {
        self.fail.push(RegexTestFailure { test: test.clone(), kind });
    }

    fn skip(&mut self, test: &RegexTest) {
        self.skip.push(test.clone());
    }

    fn assert(&self) {
        if read_env(ENV_REGEX_TEST_VERBOSE).map_or(false, |s| s == "1") {
            self.verbose();
        }
        if self.fail.is_empty() {
            return;
        }
        let failures = self
            .fail
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<String>>()
            .join("\n\n");
        panic!(
            "found {} failures:\n{}\n{}\n{}\n\n\
             Set the REGEX_TEST environment variable to filter tests, \n\
             e.g., REGEX_TEST=foo,-foo2 runs every test whose name contains \n\
             foo but not foo2\n\n",
            self.fail.len(),
            "~".repeat(79),
            failures.trim(),
            "~".repeat(79),
        )
    }

    fn verbose(&self) {
        println!("{}", "~".repeat(79));
        for t in &self.skip {
            println!("skip: {}", t.full_name());
        }
        for t in &self.pass {
            println!("pass: {}", t.full_name());
        }
        for t in &self.fail {
            println!("FAIL: {}", t.test.full_name());
        }
        println!(
            "\npassed: {}, skipped: {}, failed: {}",
            self.pass.len(),
            self.skip.len(),
            self.fail.len()
        );
        println!("{}", "~".repeat(79));
    }
}

impl std::fmt::Display for RegexTestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: {}\n\
             pattern:     {:?}\n\
             input:       {:?}",
            self.test.full_name(),
            self.kind.fmt(&self.test)?,
            self.test.regex(),
            self.test.input(),
        )
    }
}

impl RegexTestFailureKind {
    fn fmt(
        &self,
        test: &RegexTest,
    ) -> std::result::Result<String, std::fmt::Error> {
        use std::fmt::Write;

        let mut buf = String::new();
        match *self {
            RegexTestFailureKind::IsMatch => {
                if test.is_match() {
                    write!(buf, "expected match, but none found")?;
                } else {
                    write!(buf, "expected no match, but found a match")?;
                }
            }
            RegexTestFailureKind::NoCompileError => {
                write!(buf, "expected regex to NOT compile, but it did")?;
            }
            RegexTestFailureKind::CompileError { ref err } => {
                write!(buf, "expected regex to compile, failed: {}", err)?;
            }
            RegexTestFailureKind::UnexpectedPanicCompile(ref msg) => {
                write!(buf, "got unexpected panic while compiling:\n{}", msg)?;
            }
            RegexTestFailureKind::UnexpectedPanicSearch(ref msg) => {
                write!(buf, "got unexpected panic while searching:\n{}", msg)?;
            }
        }
        Ok(buf)
    }
}

/// An iterator over regex tests.
#[derive(Debug)]
pub struct RegexTestsIter<'a> {
    it: std::slice::Iter<'a, RegexTest>,
}

impl<'a> Iterator for RegexTestsIter<'a> {
    type Item = &'a RegexTest;

    fn next(&mut self) -> Option<&'a RegexTest> {
        self.it.next()
    }
}

/// Read the environment variable given. If it doesn't exist, then return an
/// empty string. Otherwise, check that it is valid UTF-8. If it isn't, return
/// a useful error message.
fn read_env(var: &str) -> Result<String> {
    let val = match std::env::var_os(var) {
        None => return Ok("".to_string()),
        Some(val) => val,
    };
    let val = val.into_string().map_err(|os| {
        anyhow::anyhow!(
            "invalid UTF-8 in env var {}={:?}",
            var,
            Vec::from_os_str_lossy(&os),
        )
    })?;
    Ok(val)
}

fn safe<T, F>(fun: F) -> std::result::Result<T, String>
where
    F: FnOnce() -> T,
{
    use std::panic;

    panic::catch_unwind(panic::AssertUnwindSafe(fun)).map_err(|any_err| {
        // Extract common types of panic payload:
        // panic and assert produce &str or String
        if let Some(&s) = any_err.downcast_ref::<&str>() {
            s.to_owned()
        } else if let Some(s) = any_err.downcast_ref::<String>() {
            s.to_owned()
        } else {
            "UNABLE TO SHOW RESULT OF PANIC.".to_owned()
        }
    })
}

/// A function to set some boolean fields to a default of 'true'. We use a
/// function so that we can hand a path to it to Serde.
fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn err_unknown_field() {
        let data = r#"
[[tests]]
name = "foo"
regex = "a*"
input = "aaa"
match = true
anchored = true
"#;
        let mut tests = RegexTests::new();
        assert!(tests.load_slice("test", data.as_bytes()).is_err());
    }

    #[test]
    fn err_no_match() {
        let data = r#"
[[tests]]
name = "foo"
regex = "a*"
input = "aaa"
"#;
        let mut tests = RegexTests::new();
        assert!(tests.load_slice("test", data.as_bytes()).is_err());
    }

    #[test]
    fn err_match_with_compile_failure() {
        let data = r#"
[[tests]]
name = "foo"
regex = "(a"
match = false
compiles = false
"#;
        let mut tests = RegexTests::new();
        assert!(tests.load_slice("test", data.as_bytes()).is_err());
    }

    #[test]
    fn err_duplicate_name() {
        let data = r#"
[[tests]]
name = "foo"
regex = "a"
input = "a"
match = true

[[tests]]
name = "foo"
regex = "b"
input = "b"
match = true
"#;
        let mut tests = RegexTests::new();
        assert!(tests.load_slice("test", data.as_bytes()).is_err());
    }

    #[test]
    fn load_match() {
        let data = r#"
[[tests]]
name = "foo"
regex = '\a+'
input = "abc"
match = true

[[tests]]
regex = "(a"
compiles = false
"#;
        let mut tests = RegexTests::new();
        tests.load_slice("test", data.as_bytes()).unwrap();
        let t0 = &tests.tests[0];
        assert_eq!("foo", t0.name());
        assert_eq!("test/foo", t0.full_name());
        assert_eq!(r"\a+", t0.regex());
        assert_eq!("abc", t0.input());
        assert!(t0.is_match());
        assert!(t0.compiles());

        let t1 = &tests.tests[1];
        assert_eq!("1", t1.name());
        assert_eq!("", t1.input());
        assert!(!t1.is_match());
        assert!(!t1.compiles());
    }

    fn runner_tests() -> RegexTests {
        let data = r#"
[[tests]]
name = "literal"
regex = "a"
input = "a"
match = true

[[tests]]
name = "literal-mismatch"
regex = "a"
input = "b"
match = false

[[tests]]
name = "unclosed"
regex = "("
compiles = false
"#;
        let mut tests = RegexTests::new();
        tests.load_slice("runner", data.as_bytes()).unwrap();
        tests
    }

    fn fake_compile(
        _: &RegexTest,
        regex: &str,
    ) -> std::result::Result<CompiledRegex, Box<dyn std::error::Error>> {
        if regex.contains('(') {
            return Err("unclosed group".into());
        }
        let regex = regex.to_string();
        Ok(CompiledRegex::compiled(move |t| {
            TestResult::is_match(t.input() == regex)
        }))
    }

    #[test]
    fn runner_passes() {
        let tests = runner_tests();
        let mut runner = TestRunner {
            include: vec![],
            results: RegexTestResults::new(),
        };
        runner.test_iter(tests.iter(), fake_compile).assert();
        assert_eq!(3, runner.results.pass.len());
    }

    #[test]
    #[should_panic(expected = "found 2 failures")]
    fn runner_reports_failures() {
        let tests = runner_tests();
        let mut runner = TestRunner {
            include: vec![],
            results: RegexTestResults::new(),
        };
        runner
            .test_iter(tests.iter(), |_, _| {
                Ok(CompiledRegex::compiled(|_| TestResult::is_match(true)))
            })
            .assert();
    }

    #[test]
    fn runner_filters() {
        let tests = runner_tests();
        let mut runner = TestRunner {
            include: vec![],
            results: RegexTestResults::new(),
        };
        runner.whitelist("literal").blacklist("mismatch");
        runner.test_iter(tests.iter(), fake_compile).assert();
        assert_eq!(1, runner.results.pass.len());
        assert_eq!(2, runner.results.skip.len());
    }
}
