use std::any::Any;
use std::ffi::{c_char, c_int, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr;

use crate::error::HookError;
use crate::event::{ArgumentMap, Event};
use crate::log::Logger;
use crate::marshal::into_foreign_string;
use crate::toolkit::Toolkit;

use super::{EventHook, HookTable, PluginInfo};

/// Status returned to the toolkit when a hook cannot run or fails.
const FAILURE: c_int = -1;

/// Implements every exported entry point of a plugin.
///
/// Entry points never unwind into the toolkit: panics are caught, logged
/// and reported with the same sentinel as any other failure.
pub struct PluginRuntime<T> {
    toolkit: T,
    info: PluginInfo,
    hooks: HookTable,
}

impl<T> PluginRuntime<T> {
    pub const fn new(toolkit: T, info: PluginInfo, hooks: HookTable) -> Self {
        PluginRuntime {
            toolkit,
            info,
            hooks,
        }
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn info(&self) -> &PluginInfo {
        &self.info
    }

    pub fn hooks(&self) -> &HookTable {
        &self.hooks
    }
}

impl<T: Toolkit> PluginRuntime<T> {
    pub fn logger(&self) -> Logger<'_> {
        Logger::new(&self.toolkit)
    }

    /// A freshly allocated copy of one metadata string. The caller frees it.
    /// Null for an unknown symbol or a string that cannot be marshaled.
    pub fn metadata(&self, symbol: &str) -> *mut c_char {
        self.guard(symbol, ptr::null_mut(), || {
            let Some(value) = self.info.field(symbol) else {
                return ptr::null_mut();
            };
            into_foreign_string(&self.toolkit, value).unwrap_or_else(|err| {
                tracing::error!(
                    plugin = %self.info.name,
                    symbol,
                    error = %err,
                    "cannot export metadata"
                );
                ptr::null_mut()
            })
        })
    }

    /// `xapl_init`. The argument is not an event bundle and is not read.
    ///
    /// # Safety
    ///
    /// Must only be called by the toolkit's loader (or with any pointer,
    /// since it is ignored).
    pub unsafe fn init(&self, _args: *mut c_void) -> c_int {
        self.guard("xapl_init", FAILURE, || {
            tracing::debug!(plugin = %self.info.name, "init");
            let Some(hook) = self.hooks.init else {
                return 0;
            };
            match hook(&self.logger()) {
                Ok(()) => 0,
                Err(err) => self.report("xapl_init", &err),
            }
        })
    }

    /// `xapl_uninit`.
    ///
    /// # Safety
    ///
    /// See [`PluginRuntime::init`].
    pub unsafe fn uninit(&self, _args: *mut c_void) {
        self.guard("xapl_uninit", (), || {
            let Some(hook) = self.hooks.uninit else {
                return;
            };
            if let Err(err) = hook(&self.logger()) {
                self.report("xapl_uninit", &err);
            }
        })
    }

    /// `xapl_config_load`. An unreadable argument map is ignored.
    ///
    /// # Safety
    ///
    /// `args` must be null or the argument map the toolkit passed to the
    /// current callback.
    pub unsafe fn config_load(&self, args: *mut c_void) {
        // SAFETY: forwarded from the caller.
        unsafe { self.void_event("xapl_config_load", self.hooks.config_load, args) }
    }

    /// `xapl_config_unload`. An unreadable argument map is ignored.
    ///
    /// # Safety
    ///
    /// As for [`PluginRuntime::config_load`].
    pub unsafe fn config_unload(&self, args: *mut c_void) {
        // SAFETY: forwarded from the caller.
        unsafe { self.void_event("xapl_config_unload", self.hooks.config_unload, args) }
    }

    /// `xapl_changes_saved`.
    ///
    /// # Safety
    ///
    /// As for [`PluginRuntime::config_load`].
    pub unsafe fn changes_saved(&self, args: *mut c_void) -> c_int {
        match self.hooks.changes_saved {
            // SAFETY: forwarded from the caller.
            Some(hook) => unsafe { self.status_event("xapl_changes_saved", hook, args) },
            None => 0,
        }
    }

    /// A custom hook called by name. Unknown names fail.
    ///
    /// # Safety
    ///
    /// As for [`PluginRuntime::config_load`].
    pub unsafe fn call(&self, name: &str, args: *mut c_void) -> c_int {
        match self.hooks.custom_hook(name) {
            // SAFETY: forwarded from the caller.
            Some(hook) => unsafe { self.status_event(name, hook, args) },
            None => {
                tracing::warn!(plugin = %self.info.name, hook = name, "no such hook");
                FAILURE
            }
        }
    }

    unsafe fn void_event(&self, entry: &str, hook: Option<EventHook>, args: *mut c_void) {
        let Some(hook) = hook else {
            return;
        };

        self.guard(entry, (), || {
            // SAFETY: forwarded from the caller.
            let args = unsafe { ArgumentMap::from_raw(args) };
            let event = match Event::load(&self.toolkit, &args) {
                Ok(event) => event,
                Err(err) => {
                    tracing::debug!(
                        plugin = %self.info.name,
                        hook = entry,
                        error = %err,
                        "skipping hook"
                    );
                    return;
                }
            };

            if let Err(err) = hook(&event, &self.logger()) {
                self.report(entry, &err);
            }
        })
    }

    unsafe fn status_event(&self, entry: &str, hook: EventHook, args: *mut c_void) -> c_int {
        self.guard(entry, FAILURE, || {
            // SAFETY: forwarded from the caller.
            let args = unsafe { ArgumentMap::from_raw(args) };
            let event = match Event::load(&self.toolkit, &args) {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(
                        plugin = %self.info.name,
                        hook = entry,
                        error = %err,
                        "cannot load event"
                    );
                    return FAILURE;
                }
            };

            match hook(&event, &self.logger()) {
                Ok(status) => status,
                Err(err) => self.report(entry, &err),
            }
        })
    }

    fn report(&self, entry: &str, err: &HookError) -> c_int {
        match err {
            HookError::Rejected(_) | HookError::Status(_) => {
                tracing::debug!(
                    plugin = %self.info.name,
                    hook = entry,
                    error = %err,
                    "hook rejected"
                );
            }
            _ => {
                tracing::warn!(plugin = %self.info.name, hook = entry, error = %err, "hook failed");
            }
        }
        err.status()
    }

    fn guard<R>(&self, entry: &str, failure: R, f: impl FnOnce() -> R) -> R {
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => value,
            Err(payload) => {
                tracing::error!(
                    plugin = %self.info.name,
                    hook = entry,
                    "panicked: {}",
                    panic_message(payload.as_ref())
                );
                failure
            }
        }
    }
}

/// Text of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
