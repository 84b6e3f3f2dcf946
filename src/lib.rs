//! Rust bindings for libxante plugins.
//!
//! libxante loads a plugin shared object and calls its functions by name,
//! passing each callback one opaque argument map. This crate turns that map
//! into typed, callback-scoped handles ([`event::Event`]) and generates the
//! fixed export symbols from a static registration table
//! ([`export_plugin!`]).
//!
//! Every foreign call goes through the [`toolkit::Toolkit`] trait. Plugins
//! build against [`toolkit::NativeToolkit`] (feature `native`); tests use
//! [`testing::FakeToolkit`].

pub mod app;
pub mod cfg;
pub mod config;
pub mod error;
pub mod event;
pub mod handle;
pub mod inspect;
pub mod item;
pub mod log;
pub mod marshal;
pub mod menu;
pub mod plugin;
#[cfg(feature = "native")]
pub mod sys;
pub mod testing;
pub mod toolkit;

pub use app::Application;
pub use cfg::CfgFile;
pub use error::{EventError, HookError, MarshalError, XanteError};
pub use event::{ArgumentMap, Event};
pub use handle::{Handle, RawRef};
pub use item::Item;
pub use log::{LogSink, Logger};
pub use menu::Menu;
pub use plugin::{HookResult, HookTable, PluginInfo, PluginRuntime};
pub use toolkit::{ArgumentLookup, RawHandle, RuntimeFlag, Toolkit};

pub use xante_plugin_interface as interface;
pub use xante_plugin_interface::{
    AccessMode, ErrorCode, ExitValue, LogLevel, MenuType, MsgBoxType, ObjectType,
};
