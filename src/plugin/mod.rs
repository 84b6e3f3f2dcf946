//! The plugin side of the ABI.
//!
//! A plugin declares its metadata ([`PluginInfo`]) and its hooks
//! ([`HookTable`]) as statics. [`PluginRuntime`] implements every exported
//! entry point on top of them, and [`export_plugin!`](crate::export_plugin)
//! generates the `#[no_mangle]` symbols the toolkit looks up.

mod export;
mod runtime;

pub use runtime::PluginRuntime;

use std::ffi::c_int;

use thiserror::Error;
use xante_plugin_interface::{
    MANDATORY_FUNCTIONS, METADATA_FUNCTIONS, PLUGIN_AUTHOR, PLUGIN_DESCRIPTION, PLUGIN_NAME,
    PLUGIN_VERSION,
};

use crate::error::HookError;
use crate::event::Event;
use crate::log::Logger;

/// Hook that runs without an event bundle (`xapl_init`, `xapl_uninit`).
pub type LifecycleHook = fn(&Logger<'_>) -> Result<(), HookError>;

/// Status a hook hands back to the toolkit.
///
/// `Ok(n)` is returned unchanged, so non-negative values carry data
/// (a progress percentage, a string length, a validity flag). Void entry
/// points discard it.
pub type HookResult = Result<c_int, HookError>;

/// Hook that receives the callback's event bundle.
///
/// The signature is generic over the bundle's lifetime, so nothing borrowed
/// from it can be kept once the hook returns.
pub type EventHook = for<'ev> fn(&Event<'ev>, &Logger<'_>) -> HookResult;

/// Strings returned by `plugin_name`, `plugin_version`, `plugin_author` and
/// `plugin_description`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub description: &'static str,
}

impl PluginInfo {
    /// Value for one of the metadata symbols.
    pub fn field(&self, symbol: &str) -> Option<&'static str> {
        match symbol {
            PLUGIN_NAME => Some(self.name),
            PLUGIN_VERSION => Some(self.version),
            PLUGIN_AUTHOR => Some(self.author),
            PLUGIN_DESCRIPTION => Some(self.description),
            _ => None,
        }
    }
}

/// Registration table mapping exported names to handlers.
///
/// Lifecycle slots left empty behave as successful no-ops. Custom hooks are
/// looked up by the exact name the toolkit calls.
#[derive(Clone, Copy)]
pub struct HookTable {
    pub init: Option<LifecycleHook>,
    pub uninit: Option<LifecycleHook>,
    pub config_load: Option<EventHook>,
    pub config_unload: Option<EventHook>,
    pub changes_saved: Option<EventHook>,
    pub custom: &'static [(&'static str, EventHook)],
}

impl HookTable {
    pub const EMPTY: HookTable = HookTable {
        init: None,
        uninit: None,
        config_load: None,
        config_unload: None,
        changes_saved: None,
        custom: &[],
    };

    pub fn custom_hook(&self, name: &str) -> Option<EventHook> {
        self.custom
            .iter()
            .find(|(hook, _)| *hook == name)
            .map(|(_, handler)| *handler)
    }

    pub fn custom_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.custom.iter().map(|(name, _)| *name)
    }

    /// Check that every custom name can be exported and is unique.
    pub fn validate(&self) -> Result<(), HookTableError> {
        for (i, (name, _)) in self.custom.iter().enumerate() {
            if !is_c_identifier(name) {
                return Err(HookTableError::InvalidSymbol(name.to_string()));
            }
            if MANDATORY_FUNCTIONS.contains(name) || METADATA_FUNCTIONS.contains(name) {
                return Err(HookTableError::Reserved(name.to_string()));
            }
            if self.custom[..i].iter().any(|(other, _)| other == name) {
                return Err(HookTableError::Duplicate(name.to_string()));
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for HookTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookTable")
            .field("init", &self.init.is_some())
            .field("uninit", &self.uninit.is_some())
            .field("config_load", &self.config_load.is_some())
            .field("config_unload", &self.config_unload.is_some())
            .field("changes_saved", &self.changes_saved.is_some())
            .field("custom", &self.custom_names().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookTableError {
    #[error("hook '{0}' is registered twice")]
    Duplicate(String),
    #[error("'{0}' is reserved for the plugin lifecycle")]
    Reserved(String),
    #[error("'{0}' is not a valid symbol name")]
    InvalidSymbol(String),
}

fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
