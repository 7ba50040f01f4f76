//! Destination name resolution.
//!
//! - [`DestinationResolver`]: turns a decorated destination name into a handle
//! - [`RegistryResolver`]: concurrent name -> handle registry, the default resolver

use dashmap::DashMap;

/// A destination name could not be resolved.
///
/// Covers both a lookup that failed and a lookup that found nothing; the
/// router treats the two identically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no destination named '{name}'{}", reason_suffix(.reason.as_deref()))]
pub struct DestinationNotFound {
    /// The name that was looked up.
    pub name: String,
    /// Optional resolver-specific detail.
    pub reason: Option<String>,
}

fn reason_suffix(reason: Option<&str>) -> String {
    reason.map(|r| format!(": {r}")).unwrap_or_default()
}

impl DestinationNotFound {
    /// Not found, no further detail.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: None,
        }
    }

    /// Not found because of `reason`.
    #[must_use]
    pub fn with_reason(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: Some(reason.into()),
        }
    }
}

/// Resolves a destination name to a concrete destination handle.
///
/// Called once per string key that survives mapping and decoration. The
/// router performs no caching, so implementations backed by a remote
/// registry should cache themselves if lookups are expensive.
pub trait DestinationResolver<D>: Send + Sync {
    /// Resolves `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DestinationNotFound`] if no destination is known by `name`.
    fn resolve_destination(&self, name: &str) -> Result<D, DestinationNotFound>;
}

/// Concurrent registry of named destinations.
///
/// Lookups are exact and case-sensitive. Handles are cloned out on
/// resolution, so `D` is typically an `Arc` or another cheap handle.
pub struct RegistryResolver<D> {
    destinations: DashMap<String, D>,
}

impl<D: Clone> RegistryResolver<D> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            destinations: DashMap::new(),
        }
    }

    /// Registers `destination` under `name`, returning the handle it replaced.
    pub fn register(&self, name: impl Into<String>, destination: D) -> Option<D> {
        self.destinations.insert(name.into(), destination)
    }

    /// Removes the destination registered under `name`.
    pub fn unregister(&self, name: &str) -> Option<D> {
        self.destinations.remove(name).map(|(_, d)| d)
    }

    /// Whether a destination is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.destinations.contains_key(name)
    }

    /// Number of registered destinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

impl<D: Clone> Default for RegistryResolver<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> DestinationResolver<D> for RegistryResolver<D>
where
    D: Clone + Send + Sync,
{
    fn resolve_destination(&self, name: &str) -> Result<D, DestinationNotFound> {
        self.destinations
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DestinationNotFound::new(name))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
