//! A small libxante plugin.
//!
//! Point a JTF item's `events` at `foo_custom`, `validate_input` or
//! `input_length` and list this library as the application's plugin.

use xante::{Event, HookError, HookResult, Logger, MsgBoxType};

fn on_init(log: &Logger<'_>) -> Result<(), HookError> {
    xante::log::init();
    log.info("Hello from xapl_init");
    Ok(())
}

fn on_config_load(event: &Event<'_>, log: &Logger<'_>) -> HookResult {
    let cfg = event.require_cfg_file()?;

    // read some settings
    let input_int = cfg.get("Main", "input_int");
    let input_string = cfg.get("Main", "input_string");

    log.info("Hello from xapl_config_load");
    log.info(&format!("[Main]input_int = {input_int}"));
    log.info(&format!("[Main]input_string = '{input_string}'"));
    Ok(0)
}

fn on_changes_saved(event: &Event<'_>, _log: &Logger<'_>) -> HookResult {
    tracing::debug!(has_changes = event.changes().is_some(), "changes saved");
    Ok(0)
}

fn on_foo_custom(event: &Event<'_>, _log: &Logger<'_>) -> HookResult {
    let app = event.require_app()?;
    let item = event.require_item()?;

    app.msg_box(
        MsgBoxType::Info,
        "Rust foo_custom",
        &format!("Custom event name: {}", item.name()),
    )?;
    Ok(0)
}

fn on_validate_input(event: &Event<'_>, _log: &Logger<'_>) -> HookResult {
    let item = event.require_item()?;
    if item.value().trim().is_empty() {
        return Err(HookError::rejected(format!("{} cannot be empty", item.name())));
    }
    Ok(0)
}

/// `value-strlen`: the toolkit reads the returned length.
fn on_input_length(event: &Event<'_>, _log: &Logger<'_>) -> HookResult {
    let value = event.require_item()?.try_value_bytes()?;
    i32::try_from(value.as_bytes().len()).map_err(|e| HookError::failed(e.to_string()))
}

xante::export_plugin! {
    info: {
        name: "Rust-Plugin",
        version: "0.1",
        author: "xante contributors",
        description: "Rust plugin example for libxante",
    },
    hooks: {
        init: on_init,
        config_load: on_config_load,
        changes_saved: on_changes_saved,
    },
    custom: {
        foo_custom => on_foo_custom,
        validate_input => on_validate_input,
        input_length => on_input_length,
    },
}
