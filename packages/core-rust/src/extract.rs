//! Key extraction strategy.

use crate::key::RoutingKey;

/// Produces the raw routing keys for a message.
///
/// Concrete routers differ only in how they pick keys out of a message (a
/// header value, the payload type, a recipient list). The mapping router
/// calls this once per routed message. Returning an empty list routes the
/// message nowhere.
///
/// Any `Fn(&M) -> Vec<RoutingKey<D>>` closure is a `KeyExtractor`.
pub trait KeyExtractor<M, D>: Send + Sync {
    /// Returns the raw routing keys for `message`, in routing order.
    fn extract_keys(&self, message: &M) -> Vec<RoutingKey<D>>;
}

impl<M, D, F> KeyExtractor<M, D> for F
where
    F: Fn(&M) -> Vec<RoutingKey<D>> + Send + Sync,
{
    fn extract_keys(&self, message: &M) -> Vec<RoutingKey<D>> {
        self(message)
    }
}
