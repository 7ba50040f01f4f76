//! keyroute core -- routing keys and the collaborator contracts of the mapping router.
//!
//! - [`RoutingKey`]: the shapes a key extracted from a message can take
//! - [`KeyExtractor`]: pulls raw routing keys out of a message
//! - [`DestinationResolver`]: resolves a destination name to a handle
//! - [`TypeConverter`]: best-effort conversion of opaque keys to strings
//! - [`parse_mappings`]: administrative `key=value` mapping text

pub mod convert;
pub mod extract;
pub mod key;
pub mod mappings;
pub mod resolve;

pub use convert::{ConversionRegistry, TypeConverter};
pub use extract::KeyExtractor;
pub use key::{OpaqueKey, RoutingKey};
pub use mappings::parse_mappings;
pub use resolve::{DestinationNotFound, DestinationResolver, RegistryResolver};
