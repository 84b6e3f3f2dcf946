//! ABI contract between libxante's plugin loader and plugins.
//!
//! The toolkit resolves plugins by exact symbol name and hands every callback
//! a single opaque argument map. This crate holds the pieces of that contract
//! that do not depend on the native library: exported symbol names, argument
//! keys, entry-point signatures and the layout-stable enums the toolkit
//! exchanges as plain integers.

pub mod events;
pub mod symbols;
pub mod types;

pub use events::{FunctionReference, ItemEvent, split_function_reference};
pub use symbols::{
    ARG_CFG_FILE, ARG_CHANGES, ARG_DATA, ARG_ITEM, ARG_MENU, ARG_VALUE, ARG_XPP, EV_CHANGES_SAVED,
    EV_CONFIG_LOAD, EV_CONFIG_UNLOAD, EV_INIT, EV_UNINIT, EVENT_ARGUMENT_KEYS, HookFn, InitFn,
    MANDATORY_FUNCTIONS, METADATA_FUNCTIONS, MetadataFn, PLUGIN_AUTHOR, PLUGIN_DESCRIPTION,
    PLUGIN_NAME, PLUGIN_VERSION, VoidHookFn,
};
pub use types::{AccessMode, ErrorCode, ExitValue, LogLevel, MenuType, MsgBoxType, ObjectType};
