//! Process exit codes
//!
//! Scripts branch on these numbers, so the values are part of the CLI
//! contract. Renumbering one is a breaking change.

use std::fmt;

use cs_core::Error;

/// How a `cstash` invocation ended
///
/// A batch that finishes with failed items exits `GeneralError` once its
/// summary has been printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    /// Bad flags, malformed location or unusable configuration
    UsageError = 2,
    /// Transport or provider failure worth retrying
    NetworkError = 3,
    AuthError = 4,
    /// Missing bucket, object or profile
    NotFound = 5,
    /// Existing bucket, non-empty bucket or refused deletion
    Conflict = 6,
    UnsupportedFeature = 7,
    /// Ctrl-C, or a confirmation that was declined
    Interrupted = 130,
}

const ALL: [ExitCode; 9] = [
    ExitCode::Success,
    ExitCode::GeneralError,
    ExitCode::UsageError,
    ExitCode::NetworkError,
    ExitCode::AuthError,
    ExitCode::NotFound,
    ExitCode::Conflict,
    ExitCode::UnsupportedFeature,
    ExitCode::Interrupted,
];

impl ExitCode {
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Map a core error onto the code scripts see
    pub fn from_error(error: &Error) -> Self {
        Self::try_from(error.exit_code()).unwrap_or(Self::GeneralError)
    }

    fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::GeneralError => "error",
            Self::UsageError => "usage error",
            Self::NetworkError => "network error",
            Self::AuthError => "access denied",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::UnsupportedFeature => "unsupported",
            Self::Interrupted => "interrupted",
        }
    }
}

impl TryFrom<i32> for ExitCode {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        ALL.into_iter()
            .find(|code| code.as_i32() == value)
            .ok_or(value)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.as_i32())
    }
}
