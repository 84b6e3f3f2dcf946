//! Error types.
//!
//! Errors stay typed inside the binding. They are flattened into the ABI's
//! sentinels (empty string, null, negative status) only by the exported
//! entry points and by the few accessors documented as sentinel-shaped.

use thiserror::Error;
use xante_plugin_interface::ErrorCode;

/// Failure converting a string across the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    #[error("foreign string pointer is null")]
    NullString,
    #[error("string contains a NUL byte at offset {position}")]
    InteriorNul { position: usize },
    #[error("string is not valid UTF-8 after byte {valid_up_to}")]
    InvalidUtf8 { valid_up_to: usize },
}

/// Failure loading the argument bundle of a callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The pointer handed to the callback is not a usable argument map.
    #[error("unable to load function arguments")]
    MalformedArguments,
    /// A hook required an argument the toolkit did not supply.
    #[error("missing '{0}' argument")]
    MissingArgument(&'static str),
}

/// Failure of a call forwarded to the toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XanteError {
    #[error(transparent)]
    Marshal(#[from] MarshalError),
    #[error(transparent)]
    Event(#[from] EventError),
    /// The toolkit returned a failure status.
    #[error("toolkit call failed with status {code}")]
    Toolkit { code: i32 },
    /// The toolkit's last-error slot was set after the call.
    #[error("toolkit error {code} ({kind:?})")]
    LastError { code: i32, kind: Option<ErrorCode> },
    /// The call succeeded but produced no value.
    #[error("no value")]
    NoValue,
}

impl XanteError {
    pub fn last_error(code: i32) -> Self {
        XanteError::LastError {
            code,
            kind: ErrorCode::from_raw(code),
        }
    }
}

/// Outcome of a plugin hook that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// The hook refuses the action that triggered it.
    #[error("rejected: {0}")]
    Rejected(String),
    /// Return this exact status to the toolkit, whatever its sign.
    #[error("hook returned status {0}")]
    Status(i32),
    #[error("hook failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Xante(#[from] XanteError),
    #[error(transparent)]
    Event(#[from] EventError),
}

impl HookError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        HookError::Rejected(reason.into())
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        HookError::Failed(reason.into())
    }

    /// Status reported to the toolkit: the carried code for
    /// [`HookError::Status`], -1 for everything else.
    pub fn status(&self) -> i32 {
        match self {
            HookError::Status(code) => *code,
            _ => -1,
        }
    }
}

impl From<MarshalError> for HookError {
    fn from(err: MarshalError) -> Self {
        HookError::Xante(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_report_minus_one() {
        assert_eq!(HookError::rejected("empty").status(), -1);
        assert_eq!(HookError::failed("io").status(), -1);
        assert_eq!(HookError::from(EventError::MalformedArguments).status(), -1);
    }

    #[test]
    fn test_explicit_status_passes_through() {
        assert_eq!(HookError::Status(-7).status(), -7);
        assert_eq!(HookError::Status(0).status(), 0);
        assert_eq!(HookError::Status(1).status(), 1);
        assert_eq!(HookError::Status(100).status(), 100);
    }

    #[test]
    fn test_last_error_decodes_known_codes() {
        let err = XanteError::last_error(ErrorCode::NullArg.as_raw());
        assert_eq!(
            err,
            XanteError::LastError {
                code: ErrorCode::NullArg.as_raw(),
                kind: Some(ErrorCode::NullArg)
            }
        );
        assert_eq!(
            XanteError::last_error(9999),
            XanteError::LastError { code: 9999, kind: None }
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            MarshalError::InteriorNul { position: 3 }.to_string(),
            "string contains a NUL byte at offset 3"
        );
        assert_eq!(
            EventError::MissingArgument("item").to_string(),
            "missing 'item' argument"
        );
        assert_eq!(
            XanteError::Toolkit { code: -1 }.to_string(),
            "toolkit call failed with status -1"
        );
    }
}
