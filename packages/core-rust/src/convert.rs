//! Best-effort conversion of opaque routing keys to strings.

use std::any::{Any, TypeId};
use std::fmt::Display;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;

use crate::key::OpaqueKey;

/// Converts routing keys of arbitrary types into string keys.
///
/// Consulted only for [`RoutingKey::Opaque`](crate::RoutingKey::Opaque) keys.
pub trait TypeConverter: Send + Sync {
    /// Converts `key` to a string, or `None` if it is not convertible.
    fn convert_to_string(&self, key: &OpaqueKey) -> Option<String>;
}

type ConvertFn = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Option<String> + Send + Sync>;

/// `TypeId`-keyed table of string conversions.
///
/// [`ConversionRegistry::with_defaults`] covers the primitive scalar types;
/// hosts register their own key types with [`register`](Self::register) or
/// [`register_display`](Self::register_display).
pub struct ConversionRegistry {
    converters: DashMap<TypeId, ConvertFn>,
}

impl ConversionRegistry {
    /// Creates a registry with no conversions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            converters: DashMap::new(),
        }
    }

    /// Creates a registry preloaded with conversions for integers, floats,
    /// `bool`, `char`, `Box<str>`, `IpAddr`, and `PathBuf`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register_display::<i8>();
        registry.register_display::<i16>();
        registry.register_display::<i32>();
        registry.register_display::<i64>();
        registry.register_display::<i128>();
        registry.register_display::<isize>();
        registry.register_display::<u8>();
        registry.register_display::<u16>();
        registry.register_display::<u32>();
        registry.register_display::<u64>();
        registry.register_display::<u128>();
        registry.register_display::<usize>();
        registry.register_display::<f32>();
        registry.register_display::<f64>();
        registry.register_display::<bool>();
        registry.register_display::<char>();
        registry.register_display::<Box<str>>();
        registry.register_display::<IpAddr>();
        registry.register::<PathBuf, _>(|path| Some(path.to_string_lossy().into_owned()));
        registry
    }

    /// Registers a conversion for `T`, replacing any existing one.
    pub fn register<T, F>(&self, convert: F)
    where
        T: Any + Send + Sync,
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        let erased: ConvertFn = Arc::new(move |value: &(dyn Any + Send + Sync)| {
            value.downcast_ref::<T>().and_then(&convert)
        });
        self.converters.insert(TypeId::of::<T>(), erased);
    }

    /// Registers the `Display` rendering of `T` as its string conversion.
    pub fn register_display<T>(&self)
    where
        T: Any + Display + Send + Sync,
    {
        self.register::<T, _>(|value| Some(value.to_string()));
    }

    /// Removes the conversion for `T`. Returns whether one was registered.
    pub fn unregister<T: Any>(&self) -> bool {
        self.converters.remove(&TypeId::of::<T>()).is_some()
    }
}

impl Default for ConversionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TypeConverter for ConversionRegistry {
    fn convert_to_string(&self, key: &OpaqueKey) -> Option<String> {
        // Clone the Arc out so the shard lock is not held while converting.
        let convert = self
            .converters
            .get(&key.value_type_id())
            .map(|entry| entry.value().clone())?;
        (*convert)(key.as_any())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Region {
        code: &'static str,
    }

    struct Unconvertible;

    #[test]
    fn defaults_convert_scalars() {
        let registry = ConversionRegistry::with_defaults();
        assert_eq!(
            registry.convert_to_string(&OpaqueKey::new(17_i64)),
            Some("17".to_string())
        );
        assert_eq!(
            registry.convert_to_string(&OpaqueKey::new(true)),
            Some("true".to_string())
        );
        assert_eq!(
            registry.convert_to_string(&OpaqueKey::new('x')),
            Some("x".to_string())
        );
        assert_eq!(
            registry.convert_to_string(&OpaqueKey::new(PathBuf::from("a/b"))),
            Some("a/b".to_string())
        );
    }

    #[test]
    fn unknown_type_is_not_convertible() {
        let registry = ConversionRegistry::with_defaults();
        let key = OpaqueKey::new(Unconvertible);
        assert_eq!(registry.convert_to_string(&key), None);
    }

    #[test]
    fn custom_conversion_is_used() {
        let registry = ConversionRegistry::new();
        registry.register::<Region, _>(|r| Some(format!("region-{}", r.code)));

        let key = OpaqueKey::new(Region { code: "eu" });
        assert_eq!(registry.convert_to_string(&key), Some("region-eu".to_string()));
    }

    #[test]
    fn conversion_may_decline() {
        let registry = ConversionRegistry::new();
        registry.register::<u8, _>(|v| (*v > 0).then(|| v.to_string()));
        assert_eq!(registry.convert_to_string(&OpaqueKey::new(0_u8)), None);
        assert_eq!(
            registry.convert_to_string(&OpaqueKey::new(3_u8)),
            Some("3".to_string())
        );
    }

    #[test]
    fn unregister_removes_conversion() {
        let registry = ConversionRegistry::with_defaults();
        assert!(registry.unregister::<u32>());
        assert_eq!(registry.convert_to_string(&OpaqueKey::new(1_u32)), None);
        assert!(!registry.unregister::<u32>());
    }
}
