use opal_core::diagnostics::report_error;
use opal_core::error::Error;
use opal_core::span::Span;

/// Create a lowering error that also lands in the global diagnostic sink
pub fn lowering_error(message: impl Into<String>) -> Error {
    report_error(message)
}

/// An invariant violation: a bug in an earlier pass, not a user mistake.
/// These fail loudly instead of turning into diagnostics.
pub fn invariant_error(message: impl Into<String>) -> Error {
    Error::invariant(Span::null(), message)
}

/// An invariant violation pinned to a source location
pub fn invariant_error_with_span(message: impl Into<String>, span: Span) -> Error {
    Error::invariant(span, message)
}

/// Create a generic error (when we don't have specific error information)
pub fn generic_error(message: impl Into<eyre::Report>) -> Error {
    Error::Generic(message.into())
}

// Convenience macros for invariant checks inside passes

/// Macro to return early with an invariant-violation error
#[macro_export]
macro_rules! lower_bail {
    ($message:expr) => {
        return Err($crate::error::invariant_error($message))
    };
    ($message:expr, $span:expr) => {
        return Err($crate::error::invariant_error_with_span($message, $span))
    };
}

/// Macro to ensure a condition holds, or return an invariant-violation error
#[macro_export]
macro_rules! lower_ensure {
    ($cond:expr, $message:expr) => {
        if !($cond) {
            $crate::lower_bail!($message);
        }
    };
    ($cond:expr, $message:expr, $span:expr) => {
        if !($cond) {
            $crate::lower_bail!($message, $span);
        }
    };
}
