//! keyroute router -- dynamic key-to-destination routing.
//!
//! A [`MappingRouter`] extracts routing keys from a message, maps each key to
//! a destination name through a runtime-mutable table, decorates the name
//! with an optional prefix and suffix, and resolves it to a destination
//! handle.
//!
//! - **Routing** (`router`): key normalization, mapping, decoration, resolution
//! - **Configuration** (`config`): initial router settings
//! - **Management** (`management`): control-bus surface for the mapping table
//! - **Service** (`service`): `tower::Service` adapter for dispatch pipelines

pub mod config;
pub mod error;
pub mod management;
pub mod router;
pub mod service;

pub use config::RouterConfig;
pub use error::RouteError;
pub use management::{ControlCommand, MappingRouterManagement};
pub use router::MappingRouter;
pub use service::RouteService;

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
