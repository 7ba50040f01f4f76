//! Routing and management errors.

use keyroute_core::DestinationNotFound;

/// Errors returned by [`MappingRouter`](crate::MappingRouter) and its
/// management surface.
///
/// Routing errors abort the current routing call only; router configuration
/// is never modified by a failed call.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// A required management argument was missing or null.
    #[error("'{argument}' must not be null")]
    InvalidArgument { argument: &'static str },

    /// A routing key was neither a known shape nor convertible to a string.
    #[error("unsupported routing key type [{type_name}] for message {failed_message}")]
    UnsupportedKeyType {
        type_name: &'static str,
        failed_message: String,
    },

    /// A decorated destination name did not resolve and resolution is required.
    #[error("failed to resolve destination name '{name}' for message {failed_message}")]
    DestinationResolutionFailed {
        name: String,
        failed_message: String,
        #[source]
        cause: DestinationNotFound,
    },
}

impl RouteError {
    /// The `Debug` rendering of the message that failed to route, if any.
    #[must_use]
    pub fn failed_message(&self) -> Option<&str> {
        match self {
            Self::InvalidArgument { .. } => None,
            Self::UnsupportedKeyType { failed_message, .. }
            | Self::DestinationResolutionFailed { failed_message, .. } => Some(failed_message),
        }
    }
}
