use std::fmt;

use crate::core::CheckFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    InvalidArgs,
    CheckFailed,
    TransportFailed,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::InvalidArgs => 2,
            ExitCode::CheckFailed => 10,
            ExitCode::TransportFailed => 20,
        }
    }
}

#[derive(Debug)]
pub struct ExitError {
    pub code: ExitCode,
    pub err: anyhow::Error,
}

impl ExitError {
    pub fn new(code: ExitCode, err: anyhow::Error) -> Self {
        Self { code, err }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.err.as_ref())
    }
}

pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return exit.code.as_i32();
    }
    ExitCode::CheckFailed.as_i32()
}

pub fn invalid_args(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, anyhow::anyhow!(message.into())).into()
}

pub fn invalid_args_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, err).into()
}

pub fn check_failed(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::CheckFailed, anyhow::anyhow!(message.into())).into()
}

pub fn transport_failed(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::TransportFailed, anyhow::anyhow!(message.into())).into()
}

/// Maps a settled failure onto the process exit code it stands for.
pub fn from_failure(failure: &CheckFailure) -> anyhow::Error {
    match failure {
        CheckFailure::Transport(_) => transport_failed(failure.user_message()),
        CheckFailure::Application(_) => check_failed(failure.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ApplicationError, FailureKind, TransportError};

    #[test]
    fn failures_map_to_distinct_codes() {
        let transport = from_failure(&CheckFailure::Transport(TransportError::Status(500)));
        assert_eq!(exit_code(&transport), 20);

        let app = from_failure(&CheckFailure::Application(ApplicationError {
            kind: FailureKind::Generic,
            message: None,
        }));
        assert_eq!(exit_code(&app), 10);
        assert_eq!(app.to_string(), "The site check failed.");

        assert_eq!(exit_code(&anyhow::anyhow!("plain")), 10);
        assert_eq!(exit_code(&invalid_args("bad")), 2);
    }
}
