use nfa_regex::{
    nfa::thompson::pikevm::{self, PikeVM},
    Regex, RegexBuilder,
};

use regex_test::{CompiledRegex, RegexTest, TestResult, TestRunner};

use crate::{suite, Result};

/// Tests the default configuration of the top-level regex API.
#[test]
fn regex_default() -> Result<()> {
    let builder = Regex::builder();
    TestRunner::new()?
        .test_iter(suite()?.iter(), regex_compiler(builder))
        .assert();
    Ok(())
}

/// Tests the PikeVM directly, reusing one cache for every search made by
/// a compiled pattern.
#[test]
fn pikevm_default() -> Result<()> {
    let builder = PikeVM::builder();
    TestRunner::new()?
        .test_iter(suite()?.iter(), pikevm_compiler(builder))
        .assert();
    Ok(())
}

fn regex_compiler(
    builder: RegexBuilder,
) -> impl FnMut(&RegexTest, &str) -> Result<CompiledRegex> {
    move |_, regex| {
        let re = builder.build(regex)?;
        Ok(CompiledRegex::compiled(move |test| -> TestResult {
            TestResult::is_match(re.is_match(test.input()))
        }))
    }
}

fn pikevm_compiler(
    builder: pikevm::Builder,
) -> impl FnMut(&RegexTest, &str) -> Result<CompiledRegex> {
    move |_, regex| {
        let vm = builder.build(regex)?;
        let cache = std::cell::RefCell::new(vm.create_cache());
        Ok(CompiledRegex::compiled(move |test| -> TestResult {
            let mut cache = cache.borrow_mut();
            // A second search with the same cache must agree with the first.
            let first = vm.is_match(&mut cache, test.input());
            let second = vm.is_match(&mut cache, test.input());
            assert_eq!(first, second, "cache reuse changed the result");
            TestResult::is_match(first)
        }))
    }
}
