//! Key-to-destination mapping router.
//!
//! [`MappingRouter`] turns the routing keys of a message into an ordered list
//! of destination handles:
//!
//! 1. **Extraction**: the injected [`KeyExtractor`] yields raw [`RoutingKey`]s
//! 2. **Normalization**: keys are flattened recursively; string keys are split
//!    on `,` and trimmed, opaque keys go through the [`TypeConverter`]
//! 3. **Mapping**: each string key is looked up in the channel mappings; an
//!    unmapped key is used verbatim as the destination name
//! 4. **Decoration**: the configured prefix and suffix wrap the name
//! 5. **Resolution**: the [`DestinationResolver`] turns the name into a handle
//!
//! Configuration is held in `ArcSwap` cells so routing never blocks on a
//! concurrent reconfiguration.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use keyroute_core::{
    parse_mappings, ConversionRegistry, DestinationResolver, KeyExtractor, RoutingKey,
    TypeConverter,
};
use tracing::{debug, trace};

use crate::config::RouterConfig;
use crate::error::RouteError;

/// Delimiter splitting one string key into several.
const KEY_DELIMITER: char = ',';

// ---------------------------------------------------------------------------
// MappingRouter
// ---------------------------------------------------------------------------

/// Routes messages of type `M` to destinations of type `D` through a mutable
/// key -> destination-name table.
///
/// All methods take `&self`; share the router behind an `Arc` and call
/// [`route`](Self::route) and the mutators from any thread. Bulk replacement
/// of the mappings is a single pointer swap, so a routing call sees either the
/// old table or the new one. Single-entry edits are copy-on-write and never
/// lose a concurrent edit.
pub struct MappingRouter<M, D> {
    channel_mappings: ArcSwap<HashMap<String, String>>,
    prefix: ArcSwapOption<String>,
    suffix: ArcSwapOption<String>,
    resolution_required: AtomicBool,
    extractor: Arc<dyn KeyExtractor<M, D>>,
    resolver: Arc<dyn DestinationResolver<D>>,
    converter: Arc<dyn TypeConverter>,
}

impl<M, D> fmt::Debug for MappingRouter<M, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingRouter")
            .field("channel_mappings", &self.channel_mappings.load().len())
            .field("prefix", &self.prefix.load().as_deref())
            .field("suffix", &self.suffix.load().as_deref())
            .field(
                "resolution_required",
                &self.resolution_required.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}

impl<M, D> MappingRouter<M, D> {
    /// Creates a router with empty mappings, no decoration, resolution
    /// required, and the default [`ConversionRegistry`].
    #[must_use]
    pub fn new(
        extractor: Arc<dyn KeyExtractor<M, D>>,
        resolver: Arc<dyn DestinationResolver<D>>,
    ) -> Self {
        Self {
            channel_mappings: ArcSwap::from_pointee(HashMap::new()),
            prefix: ArcSwapOption::empty(),
            suffix: ArcSwapOption::empty(),
            resolution_required: AtomicBool::new(true),
            extractor,
            resolver,
            converter: Arc::new(ConversionRegistry::with_defaults()),
        }
    }

    /// Creates a router and applies `config` to it.
    #[must_use]
    pub fn from_config(
        config: &RouterConfig,
        extractor: Arc<dyn KeyExtractor<M, D>>,
        resolver: Arc<dyn DestinationResolver<D>>,
    ) -> Self {
        let router = Self::new(extractor, resolver);
        router.apply_config(config);
        router
    }

    /// Replaces the converter used for opaque routing keys.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn TypeConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Applies every field of `config`. The mappings are replaced, not merged.
    pub fn apply_config(&self, config: &RouterConfig) {
        self.set_prefix(config.prefix.as_deref());
        self.set_suffix(config.suffix.as_deref());
        self.set_resolution_required(config.resolution_required);
        self.set_channel_mappings(config.channel_mappings.clone());
    }

    // -- configuration ------------------------------------------------------

    /// Replaces the whole mapping table with `mappings`.
    pub fn set_channel_mappings(&self, mappings: HashMap<String, String>) {
        self.swap_channel_mappings(mappings);
    }

    /// Parses newline-delimited `key=value` text and replaces the whole
    /// mapping table with the result. Malformed lines are ignored.
    pub fn replace_channel_mappings(&self, text: &str) {
        self.swap_channel_mappings(parse_mappings(text));
    }

    fn swap_channel_mappings(&self, mappings: HashMap<String, String>) {
        let new = Arc::new(mappings);
        let old = self.channel_mappings.swap(Arc::clone(&new));
        debug!(old = ?old, new = ?new, "channel mappings replaced");
    }

    /// Maps `key` to `channel_name`, replacing any existing mapping for `key`.
    pub fn set_channel_mapping(&self, key: &str, channel_name: &str) {
        self.channel_mappings.rcu(|current| {
            let mut next: HashMap<String, String> = (**current).clone();
            next.insert(key.to_string(), channel_name.to_string());
            next
        });
    }

    /// Removes the mapping for `key`, if present.
    pub fn remove_channel_mapping(&self, key: &str) {
        if !self.channel_mappings.load().contains_key(key) {
            return;
        }
        self.channel_mappings.rcu(|current| {
            let mut next: HashMap<String, String> = (**current).clone();
            next.remove(key);
            next
        });
    }

    /// Returns a snapshot of the current mappings.
    ///
    /// The snapshot is immutable and unaffected by later changes.
    #[must_use]
    pub fn channel_mappings(&self) -> Arc<HashMap<String, String>> {
        self.channel_mappings.load_full()
    }

    /// Sets the prefix prepended to every destination name. `None` or an
    /// empty string clears it.
    pub fn set_prefix(&self, prefix: Option<&str>) {
        self.prefix.store(decoration(prefix));
    }

    /// Sets the suffix appended to every destination name. `None` or an empty
    /// string clears it.
    pub fn set_suffix(&self, suffix: Option<&str>) {
        self.suffix.store(decoration(suffix));
    }

    /// Current prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<String> {
        self.prefix.load().as_deref().cloned()
    }

    /// Current suffix, if any.
    #[must_use]
    pub fn suffix(&self) -> Option<String> {
        self.suffix.load().as_deref().cloned()
    }

    /// Sets whether an unresolvable destination name fails the routing call
    /// (`true`) or is silently skipped (`false`).
    pub fn set_resolution_required(&self, required: bool) {
        self.resolution_required.store(required, Ordering::Release);
    }

    /// Whether unresolvable destination names fail the routing call.
    #[must_use]
    pub fn resolution_required(&self) -> bool {
        self.resolution_required.load(Ordering::Acquire)
    }

    // -- routing ------------------------------------------------------------

    /// Computes the destinations for `message`.
    ///
    /// Destinations are returned in the order their keys were produced and
    /// expanded; duplicates are kept. Configuration is read once at the start
    /// of the call, so a concurrent reconfiguration affects only later calls.
    ///
    /// # Errors
    ///
    /// - [`RouteError::UnsupportedKeyType`] if an opaque key has no string
    ///   conversion.
    /// - [`RouteError::DestinationResolutionFailed`] if a destination name does
    ///   not resolve while resolution is required.
    pub fn route(&self, message: &M) -> Result<Vec<D>, RouteError>
    where
        M: fmt::Debug,
    {
        let scope = RouteScope {
            mappings: self.channel_mappings.load_full(),
            prefix: self.prefix.load_full(),
            suffix: self.suffix.load_full(),
            resolution_required: self.resolution_required(),
            message,
        };

        let mut destinations = Vec::new();
        for key in self.extractor.extract_keys(message) {
            self.add_key(&scope, &mut destinations, key)?;
        }
        trace!(count = destinations.len(), "destinations determined");
        Ok(destinations)
    }

    fn add_key(
        &self,
        scope: &RouteScope<'_, M>,
        destinations: &mut Vec<D>,
        key: RoutingKey<D>,
    ) -> Result<(), RouteError>
    where
        M: fmt::Debug,
    {
        match key {
            RoutingKey::Absent => {}
            RoutingKey::Handle(destination) => destinations.push(destination),
            RoutingKey::Handles(handles) => destinations.extend(handles),
            RoutingKey::Name(name) => self.add_from_string(scope, destinations, &name)?,
            RoutingKey::Names(names) => {
                for name in &names {
                    self.add_from_string(scope, destinations, name)?;
                }
            }
            RoutingKey::Nested(keys) => {
                for key in keys {
                    self.add_key(scope, destinations, key)?;
                }
            }
            RoutingKey::Opaque(opaque) => match self.converter.convert_to_string(&opaque) {
                Some(name) => self.add_from_string(scope, destinations, &name)?,
                None => {
                    return Err(RouteError::UnsupportedKeyType {
                        type_name: opaque.type_name(),
                        failed_message: format!("{:?}", scope.message),
                    })
                }
            },
        }
        Ok(())
    }

    fn add_from_string(
        &self,
        scope: &RouteScope<'_, M>,
        destinations: &mut Vec<D>,
        key: &str,
    ) -> Result<(), RouteError>
    where
        M: fmt::Debug,
    {
        if key.contains(KEY_DELIMITER) {
            for token in key
                .split(KEY_DELIMITER)
                .filter(|token| !token.trim().is_empty())
            {
                self.add_from_string(scope, destinations, token)?;
            }
            return Ok(());
        }

        let name = scope.destination_name(key.trim());
        if let Some(destination) = self.resolve(scope, &name)? {
            destinations.push(destination);
        }
        Ok(())
    }

    fn resolve(&self, scope: &RouteScope<'_, M>, name: &str) -> Result<Option<D>, RouteError>
    where
        M: fmt::Debug,
    {
        match self.resolver.resolve_destination(name) {
            Ok(destination) => {
                trace!(name, "destination resolved");
                Ok(Some(destination))
            }
            Err(cause) if scope.resolution_required => {
                Err(RouteError::DestinationResolutionFailed {
                    name: name.to_string(),
                    failed_message: format!("{:?}", scope.message),
                    cause,
                })
            }
            Err(cause) => {
                debug!(name, %cause, "skipping unresolved destination");
                Ok(None)
            }
        }
    }
}

fn decoration(value: Option<&str>) -> Option<Arc<String>> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| Arc::new(v.to_string()))
}

// ---------------------------------------------------------------------------
// RouteScope
// ---------------------------------------------------------------------------

/// Configuration captured at the start of one routing call.
struct RouteScope<'a, M> {
    mappings: Arc<HashMap<String, String>>,
    prefix: Option<Arc<String>>,
    suffix: Option<Arc<String>>,
    resolution_required: bool,
    message: &'a M,
}

impl<M> RouteScope<'_, M> {
    /// Maps `key` to a destination name and applies prefix and suffix.
    fn destination_name(&self, key: &str) -> String {
        let base = self.mappings.get(key).map_or(key, String::as_str);
        let prefix = self.prefix.as_deref().map_or("", String::as_str);
        let suffix = self.suffix.as_deref().map_or("", String::as_str);

        let mut name = String::with_capacity(prefix.len() + base.len() + suffix.len());
        name.push_str(prefix);
        name.push_str(base);
        name.push_str(suffix);
        name
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
