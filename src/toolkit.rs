//! The seam between the binding and libxante.
//!
//! Every foreign call the wrappers make goes through [`Toolkit`]. Plugins use
//! [`NativeToolkit`], which forwards to the `extern "C"` declarations in
//! [`crate::sys`]; tests use [`crate::testing::FakeToolkit`].
//!
//! The trait speaks in raw foreign shapes (`*const c_char`, status integers)
//! so that marshaling rules live in one place ([`crate::marshal`]) and are
//! exercised the same way against the fake and the real library.

use std::ffi::{CStr, c_char, c_int, c_void};
use std::ptr::NonNull;

use xante_plugin_interface::{LogLevel, MsgBoxType};

/// A non-null opaque reference to toolkit-owned memory.
///
/// The binding never dereferences it; it is only handed back to the toolkit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RawHandle(NonNull<c_void>);

impl RawHandle {
    /// Wrap a pointer received from the toolkit. Null yields `None`.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a live toolkit object for as long as the
    /// handle is used. The toolkit only guarantees that for the duration of
    /// the callback that supplied it.
    pub unsafe fn from_raw(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(RawHandle)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Result of looking a key up in a callback argument map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgumentLookup {
    /// The key exists. The value may still be null.
    Found(Option<RawHandle>),
    /// The key is not present in the map.
    Missing,
    /// The map itself could not be interpreted.
    Malformed,
}

/// A key no argument map holds. Looking it up tells which collections error
/// a map reports for an absent key.
pub const ABSENT_ARGUMENT_KEY: &CStr = c"\x01";

/// Classify a failed argument lookup.
///
/// `error` is the collections error left by the lookup and `absent` the one
/// left by looking up [`ABSENT_ARGUMENT_KEY`] in the same map (`None` if
/// that lookup succeeded). Only an error matching the absent-key error means
/// the key is missing. Anything else, such as a value stored under a
/// non-pointer type, makes the map malformed.
pub fn classify_failed_lookup(error: c_int, absent: Option<c_int>) -> ArgumentLookup {
    match absent {
        Some(absent) if absent == error => ArgumentLookup::Missing,
        _ => ArgumentLookup::Malformed,
    }
}

/// Boolean runtime options stored by the toolkit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuntimeFlag {
    DiscardChanges,
    DiscardChangesOnTimeout,
    ForceConfigFileSaving,
    ShowConfigSavingQuestion,
    AccentCharacters,
    CloseUi,
    ExecuteModule,
    UiActive,
    UserAuthentication,
    /// ESC closes dialogs.
    EscKey,
    /// Ctrl+Z suspends the application.
    SuspendKey,
    /// Ctrl+C stops the application.
    StopKey,
}

impl RuntimeFlag {
    pub const ALL: [RuntimeFlag; 12] = [
        RuntimeFlag::DiscardChanges,
        RuntimeFlag::DiscardChangesOnTimeout,
        RuntimeFlag::ForceConfigFileSaving,
        RuntimeFlag::ShowConfigSavingQuestion,
        RuntimeFlag::AccentCharacters,
        RuntimeFlag::CloseUi,
        RuntimeFlag::ExecuteModule,
        RuntimeFlag::UiActive,
        RuntimeFlag::UserAuthentication,
        RuntimeFlag::EscKey,
        RuntimeFlag::SuspendKey,
        RuntimeFlag::StopKey,
    ];

    /// Whether libxante exposes a setter for this flag.
    pub fn is_writable(self) -> bool {
        matches!(
            self,
            RuntimeFlag::DiscardChanges
                | RuntimeFlag::DiscardChangesOnTimeout
                | RuntimeFlag::ForceConfigFileSaving
                | RuntimeFlag::ShowConfigSavingQuestion
                | RuntimeFlag::AccentCharacters
                | RuntimeFlag::CloseUi
        )
    }
}

/// Status returned by setters that do not exist for a flag.
pub const UNSUPPORTED_STATUS: i32 = -1;

/// Foreign entry points used by the binding.
///
/// Methods take [`RawHandle`]s, which can only be created through an
/// `unsafe` constructor, so implementations may assume every handle they
/// receive is live for the current callback.
pub trait Toolkit {
    // ------------------------------------------------------------------
    // Argument maps, errors and objects (libcollections)
    // ------------------------------------------------------------------

    fn argument_pointer(&self, args: RawHandle, key: &CStr) -> ArgumentLookup;

    /// Raw value of the toolkit's global last-error slot. Zero means no error.
    fn last_error(&self) -> i32;

    /// Convert a generic object to a newly referenced string object.
    fn object_to_cstring(&self, object: RawHandle) -> Option<RawHandle>;

    /// Borrow the bytes of a string object returned by
    /// [`Toolkit::object_to_cstring`].
    fn string_valueof(&self, string: RawHandle) -> *const c_char;

    fn string_unref(&self, string: RawHandle);

    fn object_unref(&self, object: RawHandle);

    /// Allocate a C string the receiver releases with `free`.
    fn alloc_string(&self, s: &CStr) -> *mut c_char {
        // SAFETY: `s` is a valid null-terminated string.
        unsafe { libc::strdup(s.as_ptr()) }
    }

    /// Release a string obtained from [`Toolkit::alloc_string`] or handed
    /// to us with ownership by the toolkit.
    ///
    /// # Safety
    ///
    /// `ptr` must come from the matching allocator and must not be used again.
    unsafe fn free_string(&self, ptr: *mut c_char) {
        // SAFETY: guaranteed by the caller.
        unsafe { libc::free(ptr.cast()) }
    }

    // ------------------------------------------------------------------
    // Items and menus
    // ------------------------------------------------------------------

    fn item_name(&self, item: RawHandle) -> *const c_char;
    fn item_object_id(&self, item: RawHandle) -> *const c_char;
    fn item_object_type(&self, item: RawHandle) -> i32;
    fn item_access_mode(&self, item: RawHandle) -> u32;

    /// New reference to the item's value object. Check
    /// [`Toolkit::last_error`] right after the call.
    fn item_value(&self, item: RawHandle) -> Option<RawHandle>;

    fn item_update_value(&self, item: RawHandle, content: &CStr) -> i32;

    fn menu_name(&self, menu: RawHandle) -> *const c_char;
    fn menu_object_id(&self, menu: RawHandle) -> *const c_char;
    fn menu_type(&self, menu: RawHandle) -> i32;

    // ------------------------------------------------------------------
    // Configuration file
    // ------------------------------------------------------------------

    /// New reference to the value stored under `[section] key`, if any.
    fn cfg_get_value(&self, cfg: RawHandle, section: &CStr, key: &CStr) -> Option<RawHandle>;

    // ------------------------------------------------------------------
    // Dialogs and log
    // ------------------------------------------------------------------

    /// Run a message box. Blocks until the user dismisses it.
    fn messagebox(&self, xpp: RawHandle, kind: MsgBoxType, title: &CStr, message: &CStr) -> i32;

    /// Run the dialog described by a JTS document. Blocks until it closes.
    fn single_run(&self, xpp: RawHandle, jts: &CStr) -> i32;

    fn log(&self, level: LogLevel, function: &CStr, line: i32, content: &CStr);

    // ------------------------------------------------------------------
    // Runtime options
    // ------------------------------------------------------------------

    fn runtime_flag(&self, xpp: RawHandle, flag: RuntimeFlag) -> bool;

    /// Returns the toolkit's raw status, or [`UNSUPPORTED_STATUS`] for
    /// read-only flags.
    fn set_runtime_flag(&self, xpp: RawHandle, flag: RuntimeFlag, value: bool) -> i32;

    fn inactivity_timeout(&self, xpp: RawHandle) -> i32;
    fn set_inactivity_timeout(&self, xpp: RawHandle, seconds: u32) -> i32;
    fn exit_value(&self, xpp: RawHandle) -> i32;
    fn caller_name(&self, xpp: RawHandle) -> *const c_char;
}

#[cfg(feature = "native")]
pub use native::NativeToolkit;

#[cfg(feature = "native")]
mod native {
    use super::*;
    use crate::sys;

    /// [`Toolkit`] backed by the libxante and libcollections symbols of the
    /// host process.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct NativeToolkit;

    /// One `cl_plugin_argument_pointer` call. A failure yields the
    /// collections error it left behind.
    fn lookup(args: RawHandle, key: &CStr) -> Result<*mut c_void, c_int> {
        let mut out: *mut c_void = std::ptr::null_mut();
        // SAFETY: `args` is the argument map of the running callback and
        // `key` outlives the call.
        let ret =
            unsafe { sys::cl_plugin_argument_pointer(args.as_ptr(), key.as_ptr(), &mut out) };
        if ret != 0 {
            // SAFETY: no arguments; reads the collections error of this thread.
            return Err(unsafe { sys::cl_get_last_error() });
        }
        Ok(out)
    }

    impl Toolkit for NativeToolkit {
        fn argument_pointer(&self, args: RawHandle, key: &CStr) -> ArgumentLookup {
            match lookup(args, key) {
                Ok(out) => {
                    // SAFETY: values stored in the map live as long as the map.
                    ArgumentLookup::Found(unsafe { RawHandle::from_raw(out) })
                }
                Err(error) => {
                    let absent = lookup(args, ABSENT_ARGUMENT_KEY).err();
                    classify_failed_lookup(error, absent)
                }
            }
        }

        fn last_error(&self) -> i32 {
            // SAFETY: no arguments; reads a toolkit global.
            unsafe { sys::xante_get_last_error() }
        }

        fn object_to_cstring(&self, object: RawHandle) -> Option<RawHandle> {
            // SAFETY: `object` is a live cl_object_t.
            unsafe { RawHandle::from_raw(sys::cl_object_to_cstring(object.as_ptr())) }
        }

        fn string_valueof(&self, string: RawHandle) -> *const c_char {
            // SAFETY: `string` is a live cl_string_t.
            unsafe { sys::cl_string_valueof(string.as_ptr()) }
        }

        fn string_unref(&self, string: RawHandle) {
            // SAFETY: we hold one reference to `string`.
            unsafe {
                sys::cl_string_unref(string.as_ptr());
            }
        }

        fn object_unref(&self, object: RawHandle) {
            // SAFETY: we hold one reference to `object`.
            unsafe {
                sys::cl_object_unref(object.as_ptr());
            }
        }

        fn item_name(&self, item: RawHandle) -> *const c_char {
            // SAFETY: `item` is a live xante_item_t.
            unsafe { sys::xante_item_name(item.as_ptr()) }
        }

        fn item_object_id(&self, item: RawHandle) -> *const c_char {
            // SAFETY: `item` is a live xante_item_t.
            unsafe { sys::xante_item_object_id(item.as_ptr()) }
        }

        fn item_object_type(&self, item: RawHandle) -> i32 {
            // SAFETY: `item` is a live xante_item_t.
            unsafe { sys::xante_item_object_type(item.as_ptr()) }
        }

        fn item_access_mode(&self, item: RawHandle) -> u32 {
            // SAFETY: `item` is a live xante_item_t.
            unsafe { sys::xante_item_access_mode(item.as_ptr()) }
        }

        fn item_value(&self, item: RawHandle) -> Option<RawHandle> {
            // SAFETY: `item` is a live xante_item_t; the result is a new
            // reference owned by the caller.
            unsafe { RawHandle::from_raw(sys::xante_item_value(item.as_ptr())) }
        }

        fn item_update_value(&self, item: RawHandle, content: &CStr) -> i32 {
            // SAFETY: the toolkit copies `content` before returning.
            unsafe { sys::xante_item_update_value_ex(item.as_ptr(), content.as_ptr()) }
        }

        fn menu_name(&self, menu: RawHandle) -> *const c_char {
            // SAFETY: `menu` is a live xante_menu_t.
            unsafe { sys::xante_menu_name(menu.as_ptr()) }
        }

        fn menu_object_id(&self, menu: RawHandle) -> *const c_char {
            // SAFETY: `menu` is a live xante_menu_t.
            unsafe { sys::xante_menu_object_id(menu.as_ptr()) }
        }

        fn menu_type(&self, menu: RawHandle) -> i32 {
            // SAFETY: `menu` is a live xante_menu_t.
            unsafe { sys::xante_menu_type(menu.as_ptr()) }
        }

        fn cfg_get_value(&self, cfg: RawHandle, section: &CStr, key: &CStr) -> Option<RawHandle> {
            // SAFETY: `cfg` is a live cl_cfg_file_t and both keys outlive the call.
            unsafe {
                RawHandle::from_raw(sys::cl_cfg_get_value(
                    cfg.as_ptr(),
                    section.as_ptr(),
                    key.as_ptr(),
                ))
            }
        }

        fn messagebox(
            &self,
            xpp: RawHandle,
            kind: MsgBoxType,
            title: &CStr,
            message: &CStr,
        ) -> i32 {
            // SAFETY: `xpp` is the running application; strings outlive the
            // call, which returns only after the dialog closes.
            unsafe {
                sys::xante_dlg_messagebox_ex(
                    xpp.as_ptr(),
                    kind.as_raw(),
                    title.as_ptr(),
                    message.as_ptr(),
                )
            }
        }

        fn single_run(&self, xpp: RawHandle, jts: &CStr) -> i32 {
            // SAFETY: as for `messagebox`.
            unsafe { sys::xante_manager_single_run(xpp.as_ptr(), jts.as_ptr()) }
        }

        fn log(&self, level: LogLevel, function: &CStr, line: i32, content: &CStr) {
            // SAFETY: strings outlive the call.
            unsafe { sys::xante_log_ex(level.as_raw(), function.as_ptr(), line, content.as_ptr()) }
        }

        fn runtime_flag(&self, xpp: RawHandle, flag: RuntimeFlag) -> bool {
            let xpp = xpp.as_ptr();
            // SAFETY: `xpp` is the running application.
            unsafe {
                match flag {
                    RuntimeFlag::DiscardChanges => sys::xante_runtime_discard_changes(xpp),
                    RuntimeFlag::DiscardChangesOnTimeout => {
                        sys::xante_runtime_discard_changes_on_timeout(xpp)
                    }
                    RuntimeFlag::ForceConfigFileSaving => {
                        sys::xante_runtime_force_config_file_saving(xpp)
                    }
                    RuntimeFlag::ShowConfigSavingQuestion => {
                        sys::xante_runtime_show_config_saving_question(xpp)
                    }
                    RuntimeFlag::AccentCharacters => sys::xante_runtime_accent_characters(xpp),
                    RuntimeFlag::CloseUi => sys::xante_runtime_close_ui(xpp),
                    RuntimeFlag::ExecuteModule => sys::xante_runtime_execute_module(xpp),
                    RuntimeFlag::UiActive => sys::xante_runtime_ui_active(xpp),
                    RuntimeFlag::UserAuthentication => sys::xante_runtime_user_authentication(xpp),
                    RuntimeFlag::EscKey => sys::xante_runtime_esc_key(xpp),
                    RuntimeFlag::SuspendKey => sys::xante_runtime_suspend_key(xpp),
                    RuntimeFlag::StopKey => sys::xante_runtime_stop_key(xpp),
                }
            }
        }

        fn set_runtime_flag(&self, xpp: RawHandle, flag: RuntimeFlag, value: bool) -> i32 {
            let xpp = xpp.as_ptr();
            // SAFETY: `xpp` is the running application.
            unsafe {
                match flag {
                    RuntimeFlag::DiscardChanges => {
                        sys::xante_runtime_set_discard_changes(xpp, value)
                    }
                    RuntimeFlag::DiscardChangesOnTimeout => {
                        sys::xante_runtime_set_discard_changes_on_timeout(xpp, value)
                    }
                    RuntimeFlag::ForceConfigFileSaving => {
                        sys::xante_runtime_set_force_config_file_saving(xpp, value)
                    }
                    RuntimeFlag::ShowConfigSavingQuestion => {
                        sys::xante_runtime_set_show_config_saving_question(xpp, value)
                    }
                    RuntimeFlag::AccentCharacters => {
                        sys::xante_runtime_set_accent_characters(xpp, value)
                    }
                    RuntimeFlag::CloseUi => sys::xante_runtime_set_close_ui(xpp, value),
                    _ => UNSUPPORTED_STATUS,
                }
            }
        }

        fn inactivity_timeout(&self, xpp: RawHandle) -> i32 {
            // SAFETY: `xpp` is the running application.
            unsafe { sys::xante_runtime_inactivity_timeout(xpp.as_ptr()) }
        }

        fn set_inactivity_timeout(&self, xpp: RawHandle, seconds: u32) -> i32 {
            // SAFETY: `xpp` is the running application.
            unsafe { sys::xante_runtime_set_inactivity_timeout(xpp.as_ptr(), seconds) }
        }

        fn exit_value(&self, xpp: RawHandle) -> i32 {
            // SAFETY: `xpp` is the running application.
            unsafe { sys::xante_runtime_exit_value(xpp.as_ptr()) }
        }

        fn caller_name(&self, xpp: RawHandle) -> *const c_char {
            // SAFETY: `xpp` is the running application.
            unsafe { sys::xante_runtime_caller_name(xpp.as_ptr()) }
        }
    }
}
