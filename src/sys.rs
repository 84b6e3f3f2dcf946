//! Raw declarations of the libxante and libcollections symbols the binding
//! calls.
//!
//! There is no `#[link]` attribute: plugins are loaded into a process that
//! already links both libraries, so the dynamic loader resolves these from
//! the host. Only the non-variadic `_ex` entry points are declared.

use std::ffi::{c_char, c_int, c_uint, c_void};

unsafe extern "C" {
    // libcollections
    pub fn cl_plugin_argument_pointer(
        args: *const c_void,
        arg_name: *const c_char,
        ptr: *mut *mut c_void,
    ) -> c_int;
    pub fn cl_get_last_error() -> c_int;
    pub fn cl_object_to_cstring(object: *const c_void) -> *mut c_void;
    pub fn cl_string_valueof(string: *const c_void) -> *const c_char;
    pub fn cl_string_unref(string: *mut c_void) -> c_int;
    pub fn cl_object_unref(object: *mut c_void) -> c_int;
    pub fn cl_cfg_get_value(
        file: *const c_void,
        section: *const c_char,
        key: *const c_char,
    ) -> *mut c_void;

    // errors and log
    pub fn xante_get_last_error() -> c_int;
    pub fn xante_log_ex(level: c_int, function: *const c_char, line: c_int, content: *const c_char);

    // items
    pub fn xante_item_name(item: *const c_void) -> *const c_char;
    pub fn xante_item_object_id(item: *const c_void) -> *const c_char;
    pub fn xante_item_object_type(item: *const c_void) -> c_int;
    pub fn xante_item_access_mode(item: *const c_void) -> c_uint;
    pub fn xante_item_value(item: *const c_void) -> *mut c_void;
    pub fn xante_item_update_value_ex(item: *mut c_void, content: *const c_char) -> c_int;

    // menus
    pub fn xante_menu_name(menu: *const c_void) -> *const c_char;
    pub fn xante_menu_object_id(menu: *const c_void) -> *const c_char;
    pub fn xante_menu_type(menu: *const c_void) -> c_int;

    // dialogs
    pub fn xante_dlg_messagebox_ex(
        xpp: *mut c_void,
        kind: c_int,
        title: *const c_char,
        message: *const c_char,
    ) -> c_int;
    pub fn xante_manager_single_run(xpp: *mut c_void, jts: *const c_char) -> c_int;

    // runtime
    pub fn xante_runtime_set_discard_changes(xpp: *mut c_void, discard_changes: bool) -> c_int;
    pub fn xante_runtime_discard_changes(xpp: *const c_void) -> bool;
    pub fn xante_runtime_set_discard_changes_on_timeout(
        xpp: *mut c_void,
        discard_changes: bool,
    ) -> c_int;
    pub fn xante_runtime_discard_changes_on_timeout(xpp: *const c_void) -> bool;
    pub fn xante_runtime_execute_module(xpp: *const c_void) -> bool;
    pub fn xante_runtime_set_force_config_file_saving(
        xpp: *mut c_void,
        force_saving: bool,
    ) -> c_int;
    pub fn xante_runtime_force_config_file_saving(xpp: *const c_void) -> bool;
    pub fn xante_runtime_set_inactivity_timeout(xpp: *mut c_void, timeout: c_uint) -> c_int;
    pub fn xante_runtime_inactivity_timeout(xpp: *const c_void) -> c_int;
    pub fn xante_runtime_set_show_config_saving_question(
        xpp: *mut c_void,
        show_question: bool,
    ) -> c_int;
    pub fn xante_runtime_show_config_saving_question(xpp: *const c_void) -> bool;
    pub fn xante_runtime_set_accent_characters(xpp: *mut c_void, use_accents: bool) -> c_int;
    pub fn xante_runtime_accent_characters(xpp: *const c_void) -> bool;
    pub fn xante_runtime_exit_value(xpp: *const c_void) -> c_int;
    pub fn xante_runtime_set_close_ui(xpp: *mut c_void, close_ui: bool) -> c_int;
    pub fn xante_runtime_close_ui(xpp: *const c_void) -> bool;
    pub fn xante_runtime_ui_active(xpp: *const c_void) -> bool;
    pub fn xante_runtime_user_authentication(xpp: *const c_void) -> bool;
    pub fn xante_runtime_caller_name(xpp: *const c_void) -> *const c_char;
    pub fn xante_runtime_esc_key(xpp: *const c_void) -> bool;
    pub fn xante_runtime_suspend_key(xpp: *const c_void) -> bool;
    pub fn xante_runtime_stop_key(xpp: *const c_void) -> bool;
}
