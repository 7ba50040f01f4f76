//! Routing key shapes produced by a [`KeyExtractor`](crate::KeyExtractor).

use std::any::{Any, TypeId};
use std::fmt;

/// A raw routing key extracted from a message.
///
/// Keys are produced fresh for every routing call and consumed by the router.
/// `D` is the destination handle type the host environment routes to.
#[derive(Debug)]
pub enum RoutingKey<D> {
    /// An unset key. Produces no destinations.
    Absent,
    /// A concrete destination handle, used as-is.
    Handle(D),
    /// Several destination handles, used as-is and in order.
    Handles(Vec<D>),
    /// A key or destination name. May contain comma-delimited sub-keys.
    Name(String),
    /// Several keys or destination names.
    Names(Vec<String>),
    /// Arbitrarily nested keys of any shape.
    Nested(Vec<RoutingKey<D>>),
    /// A value of some other type, routed only if it converts to a string.
    Opaque(OpaqueKey),
}

impl<D> RoutingKey<D> {
    /// Wraps an arbitrary typed value as an [`Opaque`](Self::Opaque) key.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque(OpaqueKey::new(value))
    }
}

impl<D> From<&str> for RoutingKey<D> {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl<D> From<String> for RoutingKey<D> {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl<D> From<Vec<String>> for RoutingKey<D> {
    fn from(value: Vec<String>) -> Self {
        Self::Names(value)
    }
}

impl<D> From<Vec<&str>> for RoutingKey<D> {
    fn from(value: Vec<&str>) -> Self {
        Self::Names(value.into_iter().map(str::to_string).collect())
    }
}

impl<D> From<Option<RoutingKey<D>>> for RoutingKey<D> {
    fn from(value: Option<RoutingKey<D>>) -> Self {
        value.unwrap_or(Self::Absent)
    }
}

/// A type-erased routing key value.
///
/// Remembers the concrete type so a [`TypeConverter`](crate::TypeConverter)
/// can dispatch on it and errors can name it.
pub struct OpaqueKey {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl OpaqueKey {
    /// Erases `value`, recording its type name.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Fully qualified name of the wrapped type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// `TypeId` of the wrapped value.
    #[must_use]
    pub fn value_type_id(&self) -> TypeId {
        (*self.value).type_id()
    }

    /// Borrows the wrapped value.
    #[must_use]
    pub fn as_any(&self) -> &(dyn Any + Send + Sync) {
        &*self.value
    }

    /// Returns the value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for OpaqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueKey")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
