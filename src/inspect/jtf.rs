//! Event bindings declared in a JTF document.
//!
//! Menus and items carry an `events` object that maps an event name to the
//! function the toolkit calls for it. Only the bare names (no module prefix)
//! must be exported by the application's plugin.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use xante_plugin_interface::{FunctionReference, ItemEvent, split_function_reference};

const EVENTS_KEY: &str = "events";
const NAME_KEY: &str = "name";

#[derive(Debug, Error)]
pub enum JtfError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JTF document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One `"event": "function"` pair.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EventBinding {
    /// `name` of the menu or item declaring the binding, when it has one.
    pub owner: Option<String>,
    pub event: String,
    pub function: String,
}

impl EventBinding {
    pub fn reference(&self) -> FunctionReference<'_> {
        split_function_reference(&self.function)
    }

    /// Whether the toolkit knows the event name.
    pub fn is_known_event(&self) -> bool {
        ItemEvent::from_key(&self.event).is_some()
    }
}

pub fn load_bindings(path: &Path) -> Result<Vec<EventBinding>, JtfError> {
    let content = fs::read_to_string(path).map_err(|source| JtfError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_bindings(&content)
}

/// Every binding in the document, in document order.
pub fn parse_bindings(content: &str) -> Result<Vec<EventBinding>, JtfError> {
    let document: Value = serde_json::from_str(content)?;
    let mut bindings = Vec::new();
    collect(&document, &mut bindings);
    Ok(bindings)
}

/// Functions the plugin itself must export, deduplicated and sorted.
pub fn plugin_functions(bindings: &[EventBinding]) -> BTreeSet<&str> {
    bindings
        .iter()
        .filter_map(|binding| match binding.reference() {
            FunctionReference::Plugin(function) if !function.is_empty() => Some(function),
            _ => None,
        })
        .collect()
}

fn collect(value: &Value, bindings: &mut Vec<EventBinding>) {
    match value {
        Value::Object(object) => {
            if let Some(Value::Object(events)) = object.get(EVENTS_KEY) {
                let owner = object
                    .get(NAME_KEY)
                    .and_then(Value::as_str)
                    .map(str::to_string);

                for (event, function) in events {
                    let Some(function) = function.as_str() else {
                        tracing::debug!(event = %event, "ignoring non-string event binding");
                        continue;
                    };
                    bindings.push(EventBinding {
                        owner: owner.clone(),
                        event: event.clone(),
                        function: function.to_string(),
                    });
                }
            }

            for (key, child) in object {
                if key != EVENTS_KEY {
                    collect(child, bindings);
                }
            }
        }
        Value::Array(values) => {
            for child in values {
                collect(child, bindings);
            }
        }
        _ => {}
    }
}
