//! Entry points driven the way libxante drives them, against the fake
//! toolkit.

use std::ffi::{CStr, CString, c_void};
use std::ptr;
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tracing_subscriber::prelude::*;
use xante::interface::{ARG_CFG_FILE, ARG_ITEM, ARG_XPP, PLUGIN_DESCRIPTION, PLUGIN_NAME};
use xante::log::ToolkitLayer;
use xante::plugin::EventHook;
use xante::testing::{AllocationStats, DialogGate, FakeToolkit, RecordedDialog, RecordingSink};
use xante::{
    AccessMode, ArgumentMap, ErrorCode, Event, ExitValue, HookError, HookResult, HookTable,
    LogLevel, Logger, MsgBoxType, ObjectType, PluginInfo, PluginRuntime, Toolkit,
};

const INFO: PluginInfo = PluginInfo {
    name: "Rust-Plugin",
    version: "0.1",
    author: "tests",
    description: "Rust plugin example for libxante",
};

fn runtime(hooks: HookTable) -> PluginRuntime<FakeToolkit> {
    PluginRuntime::new(FakeToolkit::new(), INFO, hooks)
}

fn custom(table: &'static [(&'static str, EventHook)]) -> HookTable {
    HookTable {
        custom: table,
        ..HookTable::EMPTY
    }
}

fn ptr_of(args: &ArgumentMap<'_>) -> *mut c_void {
    args.raw().map_or(ptr::null_mut(), |raw| raw.as_ptr())
}

// ----------------------------------------------------------------------------
// Hooks
// ----------------------------------------------------------------------------

fn log_config(event: &Event<'_>, log: &Logger<'_>) -> HookResult {
    let cfg = event.require_cfg_file()?;
    log.info(&format!("[Main]input_int = {}", cfg.get("Main", "input_int")));
    log.info(&format!("[Main]input_string = '{}'", cfg.get("Main", "input_string")));
    Ok(0)
}

fn show_item_name(event: &Event<'_>, _log: &Logger<'_>) -> HookResult {
    let app = event.require_app()?;
    let item = event.require_item()?;
    app.msg_box(
        MsgBoxType::Info,
        "Rust foo_custom",
        &format!("Custom event name: {}", item.name()),
    )?;
    Ok(0)
}

fn describe_item(event: &Event<'_>, log: &Logger<'_>) -> HookResult {
    let item = event.require_item()?;
    if event.app().is_some() || event.menu().is_some() || event.cfg_file().is_some() {
        return Err(HookError::Status(-2));
    }
    if item.object_type() != Some(ObjectType::InputString) {
        return Err(HookError::Status(-3));
    }
    log.info(&format!("{} {}", item.name(), item.object_id()));
    Ok(0)
}

fn reject_empty(event: &Event<'_>, _log: &Logger<'_>) -> HookResult {
    let item = event.require_item()?;
    if item.value().is_empty() {
        return Err(HookError::rejected("empty"));
    }
    Ok(0)
}

fn uppercase_value(event: &Event<'_>, _log: &Logger<'_>) -> HookResult {
    let item = event.require_item()?;
    let value = item.try_value()?;
    item.set_value(&value.to_uppercase())?;
    Ok(0)
}

fn status_minus_five(_: &Event<'_>, _: &Logger<'_>) -> HookResult {
    Err(HookError::Status(-5))
}

fn status_positive(_: &Event<'_>, _: &Logger<'_>) -> HookResult {
    Err(HookError::Status(7))
}

fn progress_percent(_: &Event<'_>, _: &Logger<'_>) -> HookResult {
    Ok(42)
}

fn value_length(event: &Event<'_>, _log: &Logger<'_>) -> HookResult {
    let value = event.require_item()?.try_value_bytes()?;
    Ok(value.as_bytes().len() as i32)
}

fn value_is_digits(event: &Event<'_>, _log: &Logger<'_>) -> HookResult {
    let value = event.require_item()?.value();
    Ok(i32::from(!value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())))
}

fn reverse_value(event: &Event<'_>, _log: &Logger<'_>) -> HookResult {
    let item = event.require_item()?;
    let mut bytes = item.try_value_bytes()?.into_bytes();
    bytes.reverse();
    let reversed = CString::new(bytes).map_err(|e| HookError::failed(e.to_string()))?;
    item.set_value_bytes(&reversed)?;
    Ok(0)
}

const SETTINGS_DIALOG: &str = r#"{"general":{"name":"settings"}}"#;

fn run_dialog(event: &Event<'_>, _log: &Logger<'_>) -> HookResult {
    let app = event.require_app()?;
    let exit = app.dialog(SETTINGS_DIALOG)?;
    Ok(exit.as_raw())
}

fn explode(_: &Event<'_>, _: &Logger<'_>) -> HookResult {
    panic!("boom");
}

// ----------------------------------------------------------------------------
// Metadata
// ----------------------------------------------------------------------------

#[test]
fn test_metadata_is_freed_once_by_receiver() {
    let runtime = runtime(HookTable::EMPTY);

    for symbol in [PLUGIN_NAME, PLUGIN_DESCRIPTION] {
        let raw = runtime.metadata(symbol);
        assert!(runtime.toolkit().owns_string(raw));

        // SAFETY: a live string allocated by the fake.
        let text = unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned();
        assert_eq!(Some(text.as_str()), INFO.field(symbol));

        // SAFETY: the receiver owns the string and frees it once.
        unsafe { runtime.toolkit().free_string(raw) };
    }

    assert_eq!(
        runtime.toolkit().allocations(),
        AllocationStats {
            allocated: 2,
            freed: 2,
            invalid_frees: 0,
            outstanding: 0,
        }
    );
}

// ----------------------------------------------------------------------------
// Lifecycle
// ----------------------------------------------------------------------------

#[test]
fn test_empty_table_accepts_every_lifecycle_call() {
    let runtime = runtime(HookTable::EMPTY);
    let args = runtime.toolkit().argument_map(&[]);

    // SAFETY: null or a map built by the fake.
    unsafe {
        assert_eq!(runtime.init(ptr::null_mut()), 0);
        runtime.config_load(ptr_of(&args));
        runtime.config_unload(ptr_of(&args));
        assert_eq!(runtime.changes_saved(ptr_of(&args)), 0);
        runtime.uninit(ptr::null_mut());
    }
    assert!(runtime.toolkit().logs().is_empty());
}

#[test]
fn test_config_load_reads_settings() {
    let runtime = runtime(HookTable {
        config_load: Some(log_config),
        ..HookTable::EMPTY
    });
    let toolkit = runtime.toolkit();
    let cfg = toolkit.add_config(&[
        ("Main", "input_int", "42"),
        ("Main", "input_string", "ação"),
    ]);
    let args = toolkit.argument_map(&[(ARG_CFG_FILE, Some(cfg))]);

    // SAFETY: a map built by the fake.
    unsafe { runtime.config_load(ptr_of(&args)) };

    let lines: Vec<_> = toolkit.logs().into_iter().map(|r| r.content).collect();
    assert_eq!(
        lines,
        vec![
            "[Main]input_int = 42".to_string(),
            "[Main]input_string = 'ação'".to_string(),
        ]
    );
    assert_eq!(toolkit.live_objects(), 0);
}

#[test]
fn test_config_load_with_malformed_map_is_noop() {
    let runtime = runtime(HookTable {
        config_load: Some(log_config),
        ..HookTable::EMPTY
    });
    let args = runtime.toolkit().malformed_argument_map();

    // SAFETY: the fake rejects the map without dereferencing it.
    unsafe {
        runtime.config_load(ptr_of(&args));
        runtime.config_load(ptr::null_mut());
    }

    assert!(runtime.toolkit().logs().is_empty());
}

// ----------------------------------------------------------------------------
// Custom hooks
// ----------------------------------------------------------------------------

#[test]
fn test_item_only_bundle() {
    static HOOKS: [(&str, EventHook); 1] = [("describe_item", describe_item)];
    let runtime = runtime(custom(&HOOKS));
    let toolkit = runtime.toolkit();
    let item = toolkit.add_item(
        "input_string",
        "ID_STRING",
        ObjectType::InputString.as_raw(),
        AccessMode::EDIT.bits(),
    );
    let args = toolkit.argument_map(&[(ARG_ITEM, Some(item))]);

    // SAFETY: a map built by the fake.
    assert_eq!(unsafe { runtime.call("describe_item", ptr_of(&args)) }, 0);
    assert_eq!(toolkit.logs()[0].content, "input_string ID_STRING");
    assert_eq!(toolkit.logs()[0].level, LogLevel::Info);
}

#[test]
fn test_missing_item_fails_the_hook() {
    static HOOKS: [(&str, EventHook); 1] = [("foo_custom", show_item_name)];
    let runtime = runtime(custom(&HOOKS));
    let toolkit = runtime.toolkit();
    let xpp = toolkit.add_application();
    let args = toolkit.argument_map(&[(ARG_XPP, Some(xpp))]);

    // SAFETY: a map built by the fake.
    assert_eq!(unsafe { runtime.call("foo_custom", ptr_of(&args)) }, -1);
    assert!(toolkit.dialogs().is_empty());
}

#[test]
fn test_custom_hook_shows_message_box() {
    static HOOKS: [(&str, EventHook); 1] = [("foo_custom", show_item_name)];
    let runtime = runtime(custom(&HOOKS));
    let toolkit = runtime.toolkit();
    let xpp = toolkit.add_application();
    let item = toolkit.add_item("input_string", "ID_STRING", ObjectType::InputString.as_raw(), 0);
    let args = toolkit.argument_map(&[(ARG_XPP, Some(xpp)), (ARG_ITEM, Some(item))]);

    // SAFETY: a map built by the fake.
    assert_eq!(unsafe { runtime.call("foo_custom", ptr_of(&args)) }, 0);
    assert_eq!(
        toolkit.dialogs(),
        vec![RecordedDialog::MessageBox {
            kind: MsgBoxType::Info,
            title: "Rust foo_custom".to_string(),
            message: "Custom event name: input_string".to_string(),
        }]
    );
}

#[test]
fn test_value_under_last_error_is_empty() {
    static HOOKS: [(&str, EventHook); 1] = [("validate_input", reject_empty)];
    let runtime = runtime(custom(&HOOKS));
    let toolkit = runtime.toolkit();
    let item = toolkit.add_item("input_int", "ID_INT", ObjectType::InputInt.as_raw(), 0);
    toolkit.set_item_value(item, "12");
    let args = toolkit.argument_map(&[(ARG_ITEM, Some(item))]);

    // SAFETY: a map built by the fake.
    assert_eq!(unsafe { runtime.call("validate_input", ptr_of(&args)) }, 0);

    toolkit.fail_item_value(ErrorCode::InvalidArg);
    // SAFETY: as above.
    assert_eq!(unsafe { runtime.call("validate_input", ptr_of(&args)) }, -1);
    assert_eq!(toolkit.live_objects(), 0);
    assert_eq!(toolkit.invalid_unrefs(), 0);
}

#[test]
fn test_hook_updates_item_value() {
    static HOOKS: [(&str, EventHook); 1] = [("uppercase_value", uppercase_value)];
    let runtime = runtime(custom(&HOOKS));
    let toolkit = runtime.toolkit();
    let item = toolkit.add_item("input_string", "ID_STRING", ObjectType::InputString.as_raw(), 0);
    toolkit.set_item_value(item, "shout");
    let args = toolkit.argument_map(&[(ARG_ITEM, Some(item))]);

    // SAFETY: a map built by the fake.
    assert_eq!(unsafe { runtime.call("uppercase_value", ptr_of(&args)) }, 0);
    assert_eq!(toolkit.item_value_text(item), Some("SHOUT".to_string()));

    toolkit.set_setter_status(ErrorCode::InvalidArg.as_raw());
    // SAFETY: as above.
    assert_eq!(unsafe { runtime.call("uppercase_value", ptr_of(&args)) }, -1);
    assert_eq!(toolkit.item_value_text(item), Some("SHOUT".to_string()));
}

#[test]
fn test_custom_status_codes() {
    static HOOKS: [(&str, EventHook); 3] = [
        ("minus_five", status_minus_five),
        ("positive", status_positive),
        ("progress", progress_percent),
    ];
    let runtime = runtime(custom(&HOOKS));
    let args = runtime.toolkit().argument_map(&[]);

    // SAFETY: a map built by the fake.
    unsafe {
        assert_eq!(runtime.call("minus_five", ptr_of(&args)), -5);
        assert_eq!(runtime.call("positive", ptr_of(&args)), 7);
        assert_eq!(runtime.call("progress", ptr_of(&args)), 42);
        assert_eq!(runtime.call("not_registered", ptr_of(&args)), -1);
    }
}

#[test]
fn test_value_hooks_return_data() {
    static HOOKS: [(&str, EventHook); 2] = [
        ("value_strlen", value_length),
        ("value_check", value_is_digits),
    ];
    let runtime = runtime(custom(&HOOKS));
    let toolkit = runtime.toolkit();
    let item = toolkit.add_item("input_int", "ID_INT", ObjectType::InputInt.as_raw(), 0);
    toolkit.set_item_value_bytes(item, b"caf\xe9 12");
    let args = toolkit.argument_map(&[(ARG_ITEM, Some(item))]);

    // SAFETY: a map built by the fake.
    unsafe {
        assert_eq!(runtime.call("value_strlen", ptr_of(&args)), 7);
        assert_eq!(runtime.call("value_check", ptr_of(&args)), 0);

        toolkit.set_item_value(item, "1234");
        assert_eq!(runtime.call("value_check", ptr_of(&args)), 1);
    }
    assert_eq!(toolkit.live_objects(), 0);
}

#[test]
fn test_non_utf8_value_round_trips_through_a_hook() {
    static HOOKS: [(&str, EventHook); 1] = [("reverse_value", reverse_value)];
    let runtime = runtime(custom(&HOOKS));
    let toolkit = runtime.toolkit();
    let item = toolkit.add_item("input_string", "ID_STRING", ObjectType::InputString.as_raw(), 0);
    toolkit.set_item_value_bytes(item, &[0x63, 0xE7, 0x61]);
    let args = toolkit.argument_map(&[(ARG_ITEM, Some(item))]);

    // SAFETY: a map built by the fake.
    assert_eq!(unsafe { runtime.call("reverse_value", ptr_of(&args)) }, 0);
    assert_eq!(toolkit.item_value_bytes(item), Some(vec![0x61, 0xE7, 0x63]));

    // SAFETY: as above.
    assert_eq!(unsafe { runtime.call("reverse_value", ptr_of(&args)) }, 0);
    assert_eq!(toolkit.item_value_bytes(item), Some(vec![0x63, 0xE7, 0x61]));
    assert_eq!(toolkit.live_objects(), 0);
}

#[test]
fn test_custom_hook_with_malformed_map_fails() {
    static HOOKS: [(&str, EventHook); 1] = [("minus_five", status_minus_five)];
    let runtime = runtime(custom(&HOOKS));
    let args = runtime.toolkit().malformed_argument_map();

    // SAFETY: the fake rejects the map without dereferencing it.
    assert_eq!(unsafe { runtime.call("minus_five", ptr_of(&args)) }, -1);
}

// ----------------------------------------------------------------------------
// Panics and logging
// ----------------------------------------------------------------------------

#[test]
fn test_panic_is_logged_and_reported() {
    static HOOKS: [(&str, EventHook); 1] = [("explode", explode)];
    let sink = RecordingSink::default();
    let subscriber = tracing_subscriber::registry().with(ToolkitLayer::new(sink.clone()));

    let status = tracing::subscriber::with_default(subscriber, || {
        let runtime = runtime(custom(&HOOKS));
        let args = runtime.toolkit().argument_map(&[]);
        // SAFETY: a map built by the fake.
        unsafe { runtime.call("explode", ptr_of(&args)) }
    });

    assert_eq!(status, -1);
    let records = sink.records();
    let panic = records
        .iter()
        .find(|r| r.level == LogLevel::Error)
        .expect("panic should be logged");
    assert!(panic.content.contains("panicked: boom"));
    assert!(panic.content.contains("hook=\"explode\""));
}

// ----------------------------------------------------------------------------
// Blocking dialogs
// ----------------------------------------------------------------------------

#[test]
fn test_msg_box_blocks_until_dismissed() {
    static HOOKS: [(&str, EventHook); 1] = [("foo_custom", show_item_name)];
    let gate = DialogGate::new();

    let worker = {
        let gate = gate.clone();
        thread::spawn(move || {
            let runtime = runtime(custom(&HOOKS));
            let toolkit = runtime.toolkit();
            toolkit.set_dialog_gate(gate);
            let xpp = toolkit.add_application();
            let item = toolkit.add_item("input_string", "ID", ObjectType::InputString.as_raw(), 0);
            let args = toolkit.argument_map(&[(ARG_XPP, Some(xpp)), (ARG_ITEM, Some(item))]);

            // SAFETY: a map built by the fake.
            let status = unsafe { runtime.call("foo_custom", ptr_of(&args)) };
            (status, toolkit.dialogs().len())
        })
    };

    assert!(gate.wait_entered(Duration::from_secs(5)));
    thread::sleep(Duration::from_millis(50));
    assert!(!worker.is_finished());
    assert_eq!(gate.entered(), 1);

    gate.release();
    assert_eq!(worker.join().unwrap(), (0, 1));
}

#[test]
fn test_dialog_blocks_until_closed() {
    static HOOKS: [(&str, EventHook); 1] = [("settings", run_dialog)];
    let gate = DialogGate::new();

    let worker = {
        let gate = gate.clone();
        thread::spawn(move || {
            let runtime = runtime(custom(&HOOKS));
            let toolkit = runtime.toolkit();
            toolkit.set_dialog_gate(gate);
            toolkit.set_dialog_result(ExitValue::ConfigSaved.as_raw());
            let xpp = toolkit.add_application();
            let args = toolkit.argument_map(&[(ARG_XPP, Some(xpp))]);

            // SAFETY: a map built by the fake.
            let status = unsafe { runtime.call("settings", ptr_of(&args)) };
            (status, toolkit.dialogs())
        })
    };

    assert!(gate.wait_entered(Duration::from_secs(5)));
    thread::sleep(Duration::from_millis(50));
    assert!(!worker.is_finished());
    assert_eq!(gate.entered(), 1);

    gate.release();
    let (status, dialogs) = worker.join().unwrap();
    assert_eq!(ExitValue::from_raw(status), Some(ExitValue::ConfigSaved));
    assert_eq!(
        dialogs,
        vec![RecordedDialog::SingleRun {
            jts: SETTINGS_DIALOG.to_string(),
        }]
    );
}
