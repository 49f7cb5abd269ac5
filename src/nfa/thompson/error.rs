use crate::{syntax, util::id::StateID};

/// An error that can occur during the construction of a Thompson NFA.
///
/// This error does not provide many introspection capabilities. There are
/// generally only two things you can do with it:
///
/// * Obtain a human readable message via its `std::fmt::Display` impl.
/// * Access an underlying [`syntax::Error`] via [`Error::syntax_error`] (or
/// the `source` method of the `std::error::Error` trait), which says why and
/// where a pattern was rejected.
///
/// Otherwise, errors only occur when a limit has been breached. For example,
/// if the total heap usage of the compiled NFA exceeds the limit set by
/// [`Config::nfa_size_limit`](crate::nfa::thompson::Config::nfa_size_limit),
/// then building the NFA will fail.
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The kind of error that occurred during the construction of a Thompson NFA.
#[derive(Clone, Debug)]
enum ErrorKind {
    /// The pattern is malformed: unbalanced groups, a bad escape sequence or
    /// groups nested too deeply.
    Syntax(syntax::Error),
    /// An error that occurs if too many states are produced while building an
    /// NFA.
    TooManyStates {
        /// The minimum number of states that are desired, which exceeds the
        /// limit.
        given: usize,
        /// The limit on the number of states.
        limit: usize,
    },
    /// An error that occurs when NFA compilation exceeds a configured heap
    /// limit.
    ExceededSizeLimit {
        /// The configured limit, in bytes.
        limit: usize,
    },
}

impl Error {
    fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// If this error occurred because the pattern is malformed, then return
    /// the underlying syntax error.
    pub fn syntax_error(&self) -> Option<&syntax::Error> {
        match self.kind() {
            ErrorKind::Syntax(ref err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if and only if this error occurred because the pattern
    /// is malformed.
    pub fn is_syntax(&self) -> bool {
        self.syntax_error().is_some()
    }

    pub(crate) fn syntax(err: syntax::Error) -> Error {
        Error { kind: ErrorKind::Syntax(err) }
    }

    pub(crate) fn too_many_states(given: usize) -> Error {
        let limit = StateID::LIMIT;
        Error { kind: ErrorKind::TooManyStates { given, limit } }
    }

    pub(crate) fn exceeded_size_limit(limit: usize) -> Error {
        Error { kind: ErrorKind::ExceededSizeLimit { limit } }
    }
}

impl From<syntax::Error> for Error {
    fn from(err: syntax::Error) -> Error {
        Error::syntax(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Syntax(ref err) => Some(err),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind() {
            ErrorKind::Syntax(ref err) => {
                write!(f, "error parsing regex: {}", err)
            }
            ErrorKind::TooManyStates { given, limit } => write!(
                f,
                "attempted to compile {} NFA states, \
                 which exceeds the limit of {}",
                given, limit,
            ),
            ErrorKind::ExceededSizeLimit { limit } => write!(
                f,
                "heap usage during NFA compilation exceeded limit of {}",
                limit,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::ToString};

    use super::*;

    #[test]
    fn messages() {
        let err = Error::too_many_states(7);
        assert_eq!(
            format!(
                "attempted to compile 7 NFA states, \
                 which exceeds the limit of {}",
                StateID::LIMIT,
            ),
            err.to_string(),
        );
        assert!(!err.is_syntax());

        let err = Error::exceeded_size_limit(64);
        assert_eq!(
            "heap usage during NFA compilation exceeded limit of 64",
            err.to_string(),
        );
    }

    #[test]
    fn syntax_errors_are_wrapped() {
        let err = Error::from(syntax::tokenize("(a").unwrap_err());
        assert!(err.is_syntax());
        assert_eq!(
            &syntax::ErrorKind::GroupUnclosed,
            err.syntax_error().unwrap().kind(),
        );
        assert!(err.to_string().starts_with("error parsing regex: "));
    }
}
