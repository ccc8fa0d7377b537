//! Error types for fragment capture and typed value access.
//!
//! A single [`FragmentError`] covers the whole crate. Its variants fall into
//! two families:
//!
//! - **structural** errors ([`MalformedInput`](FragmentError::MalformedInput),
//!   [`InternalConsistency`](FragmentError::InternalConsistency),
//!   [`InvalidCaptureRequest`](FragmentError::InvalidCaptureRequest),
//!   [`LimitExceeded`](FragmentError::LimitExceeded), [`Io`](FragmentError::Io))
//!   terminate the stream they occur in;
//! - **value** errors ([`ValueMissing`](FragmentError::ValueMissing),
//!   [`ValueConversion`](FragmentError::ValueConversion),
//!   [`MultipleChildren`](FragmentError::MultipleChildren)) are raised by the
//!   typed accessors on [`FragmentNode`](crate::fragment::FragmentNode) and are
//!   meant to be handled per field by picking the right accessor variant.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FragmentError>;

/// The error type for every fallible operation in this crate.
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    /// The tokenizer reported input that is not well-formed XML.
    #[error("malformed XML{}: {message}", ByteOffset(.byte_offset))]
    MalformedInput {
        /// Diagnostic from the tokenizer.
        message: String,
        /// Byte offset into the source, when the tokenizer knows it.
        byte_offset: Option<u64>,
    },

    /// A required child element, attribute or text value is absent or empty.
    #[error("XML value missing: {what}")]
    ValueMissing {
        /// Description of what was looked up.
        what: String,
    },

    /// A present value failed to convert to the requested type.
    #[error("string {value:?} is not {target}")]
    ValueConversion {
        /// The offending text.
        value: String,
        /// Human-readable name of the requested type.
        target: &'static str,
    },

    /// A child lookup by tag matched more than one element.
    #[error("multiple children named <{tag}> ({count} found)")]
    MultipleChildren {
        /// The tag that was looked up.
        tag: String,
        /// How many children carried it.
        count: usize,
    },

    /// Fragment collection was requested outside the start-element hook or
    /// more than once for the same element.
    #[error("invalid capture request: {0}")]
    InvalidCaptureRequest(String),

    /// An internal invariant was violated: mismatched element nesting,
    /// accessor misuse on a text node, or a builder used out of order.
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),

    /// A fragment grew past one of the configured capture limits.
    #[error("capture limit exceeded: {limit} (max {max})")]
    LimitExceeded {
        /// Name of the limit.
        limit: &'static str,
        /// The configured maximum.
        max: usize,
    },

    /// Reading the XML source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An application hook failed.
    #[error("handler error: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FragmentError {
    /// Builds a [`FragmentError::MalformedInput`] without position information.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
            byte_offset: None,
        }
    }

    /// Builds a [`FragmentError::ValueMissing`].
    pub fn missing(what: impl Into<String>) -> Self {
        Self::ValueMissing { what: what.into() }
    }

    pub(crate) fn conversion(value: &str, target: &'static str) -> Self {
        Self::ValueConversion {
            value: value.to_string(),
            target,
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::InternalConsistency(message.into())
    }

    /// Wraps an application error raised inside a [`FragmentHandler`] hook.
    ///
    /// [`FragmentHandler`]: crate::stream::FragmentHandler
    pub fn handler(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Handler(Box::new(err))
    }

    /// Returns `true` for errors that abort the whole stream.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. }
                | Self::InternalConsistency(_)
                | Self::InvalidCaptureRequest(_)
                | Self::LimitExceeded { .. }
                | Self::Io(_)
        )
    }

    /// Returns `true` for per-field accessor errors.
    #[must_use]
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Self::ValueMissing { .. } | Self::ValueConversion { .. } | Self::MultipleChildren { .. }
        )
    }
}

/// Renders `" at byte N"` when an offset is known, nothing otherwise.
struct ByteOffset<'a>(&'a Option<u64>);

impl fmt::Display for ByteOffset<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.0 {
            Some(offset) => write!(f, " at byte {offset}"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_malformed_display_with_offset() {
        let err = FragmentError::MalformedInput {
            message: "unexpected end of input".to_string(),
            byte_offset: Some(14),
        };
        assert_eq!(
            err.to_string(),
            "malformed XML at byte 14: unexpected end of input"
        );
    }

    #[test]
    fn test_malformed_display_without_offset() {
        let err = FragmentError::malformed("bad token");
        assert_eq!(err.to_string(), "malformed XML: bad token");
    }

    #[test]
    fn test_value_conversion_display() {
        let err = FragmentError::conversion("42.5", "an integer");
        assert_eq!(err.to_string(), "string \"42.5\" is not an integer");
    }

    #[test]
    fn test_multiple_children_display() {
        let err = FragmentError::MultipleChildren {
            tag: "amount".to_string(),
            count: 2,
        };
        assert_eq!(err.to_string(), "multiple children named <amount> (2 found)");
    }

    #[test]
    fn test_classification() {
        assert!(FragmentError::malformed("x").is_structural());
        assert!(FragmentError::internal("x").is_structural());
        assert!(FragmentError::InvalidCaptureRequest("x".into()).is_structural());
        assert!(!FragmentError::missing("x").is_structural());

        assert!(FragmentError::missing("x").is_value_error());
        assert!(FragmentError::conversion("x", "a float").is_value_error());
        assert!(!FragmentError::malformed("x").is_value_error());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: FragmentError = io.into();
        assert!(matches!(err, FragmentError::Io(_)));
        assert!(err.is_structural());
    }

    #[test]
    fn test_handler_error_keeps_source() {
        let io = std::io::Error::other("downstream");
        let err = FragmentError::handler(io);
        assert_eq!(err.to_string(), "handler error: downstream");
        assert!(std::error::Error::source(&err).is_some());
    }
}
