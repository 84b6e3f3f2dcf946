//! Exported symbol names, argument keys and entry-point signatures.
//!
//! libxante looks plugin functions up by name with `dlsym`, so these strings
//! are the ABI. Changing any of them breaks every deployed plugin.

use std::ffi::{CStr, c_char, c_int, c_void};

// ============================================================================
// Metadata accessors
// ============================================================================

pub const PLUGIN_NAME: &str = "plugin_name";
pub const PLUGIN_VERSION: &str = "plugin_version";
pub const PLUGIN_AUTHOR: &str = "plugin_author";
pub const PLUGIN_DESCRIPTION: &str = "plugin_description";

/// Metadata accessors, in the order the loader reads them.
pub const METADATA_FUNCTIONS: [&str; 4] =
    [PLUGIN_NAME, PLUGIN_VERSION, PLUGIN_AUTHOR, PLUGIN_DESCRIPTION];

// ============================================================================
// Lifecycle hooks
// ============================================================================

pub const EV_INIT: &str = "xapl_init";
pub const EV_UNINIT: &str = "xapl_uninit";
pub const EV_CONFIG_LOAD: &str = "xapl_config_load";
pub const EV_CONFIG_UNLOAD: &str = "xapl_config_unload";
pub const EV_CHANGES_SAVED: &str = "xapl_changes_saved";

/// Functions a module must export for the toolkit to accept it.
pub const MANDATORY_FUNCTIONS: [&str; 5] = [
    EV_INIT,
    EV_UNINIT,
    EV_CONFIG_LOAD,
    EV_CONFIG_UNLOAD,
    EV_CHANGES_SAVED,
];

// ============================================================================
// Event argument keys
// ============================================================================

pub const ARG_XPP: &CStr = c"xpp";
pub const ARG_MENU: &CStr = c"menu";
pub const ARG_ITEM: &CStr = c"item";
pub const ARG_CFG_FILE: &CStr = c"cfg-file";
pub const ARG_VALUE: &CStr = c"value";
pub const ARG_CHANGES: &CStr = c"changes";
pub const ARG_DATA: &CStr = c"data";

/// Every key the event loader queries, in lookup order.
pub const EVENT_ARGUMENT_KEYS: [&CStr; 7] = [
    ARG_XPP,
    ARG_MENU,
    ARG_ITEM,
    ARG_CFG_FILE,
    ARG_VALUE,
    ARG_CHANGES,
    ARG_DATA,
];

// ============================================================================
// Entry-point signatures
// ============================================================================

/// `plugin_name` and friends. The returned string is allocated with `malloc`
/// and owned by the caller.
pub type MetadataFn = unsafe extern "C" fn() -> *mut c_char;

/// `xapl_init`: 0 keeps the plugin loaded, anything else aborts the load.
pub type InitFn = unsafe extern "C" fn(*mut c_void) -> c_int;

/// `xapl_uninit`, `xapl_config_load`, `xapl_config_unload`.
pub type VoidHookFn = unsafe extern "C" fn(*mut c_void);

/// `xapl_changes_saved` and custom event handlers: 0 accepts, negative
/// rejects the triggering action. Some events read a positive return as
/// data (a progress percentage, a length, a validity flag).
pub type HookFn = unsafe extern "C" fn(*mut c_void) -> c_int;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandatory_functions_share_prefix() {
        for name in MANDATORY_FUNCTIONS {
            assert!(name.starts_with("xapl_"), "{name}");
        }
    }

    #[test]
    fn test_argument_keys_are_distinct() {
        for (i, a) in EVENT_ARGUMENT_KEYS.iter().enumerate() {
            for b in &EVENT_ARGUMENT_KEYS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_cfg_file_key_uses_dash() {
        assert_eq!(ARG_CFG_FILE.to_bytes(), b"cfg-file");
    }
}
