use std::{
    cell::RefCell,
    ffi::{CString, c_char},
    panic::{AssertUnwindSafe, catch_unwind},
};

use semaphore::{ErrorKind, SemaphoreError};
use semaphore_primitives::PrimitiveError;
use semaphore_proof::ProofError;

/// No error was recorded on this thread.
pub const SEMAPHORE_ERROR_NONE: i32 = 0;
/// An input could not be parsed or was out of range.
pub const SEMAPHORE_ERROR_INPUT_MALFORMED: i32 = 1;
/// The call is not valid in the current state of the handle.
pub const SEMAPHORE_ERROR_STATE_INVALID: i32 = 2;
/// The proving backend or its artifacts failed.
pub const SEMAPHORE_ERROR_BACKEND_FAILURE: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub(crate) enum FfiError {
    #[error("argument `{0}` is null")]
    NullPointer(&'static str),
    #[error("argument `{0}` is not valid UTF-8")]
    InvalidUtf8(&'static str),
    #[error("output contains an interior NUL byte")]
    InteriorNul,
    #[error(transparent)]
    Semaphore(#[from] SemaphoreError),
    #[error("internal panic in `{0}`")]
    Panic(&'static str),
}

impl From<PrimitiveError> for FfiError {
    fn from(value: PrimitiveError) -> Self {
        Self::Semaphore(value.into())
    }
}

impl From<ProofError> for FfiError {
    fn from(value: ProofError) -> Self {
        Self::Semaphore(value.into())
    }
}

impl FfiError {
    const fn code(&self) -> i32 {
        match self {
            Self::NullPointer(_) | Self::InvalidUtf8(_) => SEMAPHORE_ERROR_INPUT_MALFORMED,
            Self::InteriorNul | Self::Panic(_) => SEMAPHORE_ERROR_BACKEND_FAILURE,
            Self::Semaphore(err) => match err.kind() {
                ErrorKind::InputMalformed => SEMAPHORE_ERROR_INPUT_MALFORMED,
                ErrorKind::StateInvalid => SEMAPHORE_ERROR_STATE_INVALID,
                ErrorKind::BackendFailure => SEMAPHORE_ERROR_BACKEND_FAILURE,
            },
        }
    }
}

struct LastError {
    code: i32,
    message: String,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<LastError>> = const { RefCell::new(None) };
}

fn set_last_error(function: &'static str, err: &FfiError) {
    tracing::error!(function, code = err.code(), %err, "semaphore ffi call failed");
    LAST_ERROR.with(|last| {
        *last.borrow_mut() = Some(LastError {
            code: err.code(),
            message: err.to_string(),
        });
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|last| last.borrow_mut().take());
}

pub(crate) fn last_error_code() -> i32 {
    LAST_ERROR.with(|last| {
        last.borrow()
            .as_ref()
            .map_or(SEMAPHORE_ERROR_NONE, |err| err.code)
    })
}

pub(crate) fn last_error_message() -> *mut c_char {
    LAST_ERROR.with(|last| {
        last.borrow()
            .as_ref()
            .and_then(|err| CString::new(err.message.as_str()).ok())
            .map_or(std::ptr::null_mut(), CString::into_raw)
    })
}

/// Runs `f`, records its error or panic for [`crate::semaphore_last_error`] and returns
/// `fallback` in that case.
pub(crate) fn guard<T>(
    function: &'static str,
    fallback: T,
    f: impl FnOnce() -> Result<T, FfiError>,
) -> T {
    clear_last_error();
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            set_last_error(function, &err);
            fallback
        }
        Err(_) => {
            set_last_error(function, &FfiError::Panic(function));
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_records_errors_and_clears_them() {
        let value = guard("failing", 0, || Err(FfiError::NullPointer("tree")));
        assert_eq!(value, 0);
        assert_eq!(last_error_code(), SEMAPHORE_ERROR_INPUT_MALFORMED);

        let value = guard("succeeding", 0, || Ok(7));
        assert_eq!(value, 7);
        assert_eq!(last_error_code(), SEMAPHORE_ERROR_NONE);
        assert!(last_error_message().is_null());
    }

    #[test]
    fn guard_catches_panics() {
        let value: i32 = guard("panicking", -1, || panic!("boom"));
        assert_eq!(value, -1);
        assert_eq!(last_error_code(), SEMAPHORE_ERROR_BACKEND_FAILURE);
        let message = last_error_message();
        // SAFETY: the pointer was just returned by `CString::into_raw`.
        let message = unsafe { CString::from_raw(message) };
        assert_eq!(message.to_str().unwrap(), "internal panic in `panicking`");
    }

    #[test]
    fn codes_follow_error_kinds() {
        assert_eq!(
            FfiError::from(SemaphoreError::TreeFull { capacity: 4 }).code(),
            SEMAPHORE_ERROR_STATE_INVALID
        );
        assert_eq!(
            FfiError::from(PrimitiveError::NotInField).code(),
            SEMAPHORE_ERROR_INPUT_MALFORMED
        );
        assert_eq!(
            FfiError::from(ProofError::Prover("x".to_owned())).code(),
            SEMAPHORE_ERROR_BACKEND_FAILURE
        );
    }
}
