//! Runtime management of a router's channel mappings.
//!
//! [`MappingRouterManagement`] is the administrative surface a control bus
//! drives; [`ControlCommand`] is its JSON wire form.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::RouteError;
use crate::router::MappingRouter;

// ---------------------------------------------------------------------------
// MappingRouterManagement trait
// ---------------------------------------------------------------------------

/// Administrative operations on a router's key -> destination-name table.
pub trait MappingRouterManagement: Send + Sync {
    /// Returns an immutable snapshot of the current mappings.
    fn channel_mappings(&self) -> Arc<HashMap<String, String>>;

    /// Replaces all mappings.
    fn set_channel_mappings(&self, mappings: HashMap<String, String>);

    /// Adds or replaces the mapping for `key`.
    fn set_channel_mapping(&self, key: &str, channel_name: &str);

    /// Removes the mapping for `key`, if present.
    fn remove_channel_mapping(&self, key: &str);

    /// Replaces all mappings with those parsed from newline-delimited
    /// `key=value` text.
    fn replace_channel_mappings(&self, text: &str);
}

impl<M, D> MappingRouterManagement for MappingRouter<M, D> {
    fn channel_mappings(&self) -> Arc<HashMap<String, String>> {
        MappingRouter::channel_mappings(self)
    }

    fn set_channel_mappings(&self, mappings: HashMap<String, String>) {
        MappingRouter::set_channel_mappings(self, mappings);
    }

    fn set_channel_mapping(&self, key: &str, channel_name: &str) {
        MappingRouter::set_channel_mapping(self, key, channel_name);
    }

    fn remove_channel_mapping(&self, key: &str) {
        MappingRouter::remove_channel_mapping(self, key);
    }

    fn replace_channel_mappings(&self, text: &str) {
        MappingRouter::replace_channel_mappings(self, text);
    }
}

// ---------------------------------------------------------------------------
// ControlCommand
// ---------------------------------------------------------------------------

/// A management command as received from a control bus.
///
/// Tagged by `"op"`, e.g.
/// `{"op": "setChannelMapping", "key": "us", "channelName": "orders-us"}`.
/// Arguments are optional on the wire so that a missing or `null` argument
/// can be reported as [`RouteError::InvalidArgument`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ControlCommand {
    GetChannelMappings,
    SetChannelMappings {
        channel_mappings: Option<serde_json::Map<String, Value>>,
    },
    SetChannelMapping {
        key: Option<String>,
        channel_name: Option<String>,
    },
    RemoveChannelMapping {
        key: Option<String>,
    },
    ReplaceChannelMappings {
        channel_mappings: Option<String>,
    },
}

impl ControlCommand {
    /// Parses a command from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a known command.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let command: ControlCommand = serde_json::from_str(json)?;
        Ok(command)
    }

    /// Applies this command to `target`.
    ///
    /// Returns the mapping snapshot as a JSON object for
    /// [`GetChannelMappings`](Self::GetChannelMappings) and `null` otherwise.
    /// In `SetChannelMappings`, entries whose value is not a string are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidArgument`] if a required argument is
    /// missing or `null`; `target` is left unchanged.
    pub fn apply(self, target: &dyn MappingRouterManagement) -> Result<Value, RouteError> {
        match self {
            Self::GetChannelMappings => {
                let snapshot = target.channel_mappings();
                let object = snapshot
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                return Ok(Value::Object(object));
            }
            Self::SetChannelMappings { channel_mappings } => {
                let raw = required(channel_mappings, "channelMappings")?;
                target.set_channel_mappings(string_entries(raw));
            }
            Self::SetChannelMapping { key, channel_name } => {
                let key = required(key, "key")?;
                let channel_name = required(channel_name, "channelName")?;
                target.set_channel_mapping(&key, &channel_name);
            }
            Self::RemoveChannelMapping { key } => {
                target.remove_channel_mapping(&required(key, "key")?);
            }
            Self::ReplaceChannelMappings { channel_mappings } => {
                target.replace_channel_mappings(&required(channel_mappings, "channelMappings")?);
            }
        }
        Ok(Value::Null)
    }
}

fn required<T>(value: Option<T>, argument: &'static str) -> Result<T, RouteError> {
    value.ok_or(RouteError::InvalidArgument { argument })
}

fn string_entries(raw: serde_json::Map<String, Value>) -> HashMap<String, String> {
    raw.into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(name) => Some((key, name)),
            other => {
                debug!(key, value = %other, "ignoring non-string channel mapping");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
