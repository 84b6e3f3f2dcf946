//! Item events and the function references bound to them.
//!
//! A JTF item carries an `events` object mapping event names to function
//! names, e.g. `{"custom-event": "foo_custom"}`. The toolkit calls the named
//! function in the plugin when the event fires. A reference may carry a
//! module prefix (`"other:foo"`); `xante:` or an empty prefix points at the
//! toolkit's internal dispatch table instead of the plugin.

/// Events a JTF item can bind to a plugin function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemEvent {
    ItemSelected,
    ItemValueConfirm,
    ItemValueUpdated,
    ItemExit,
    MenuExit,
    Custom,
    UpdateRoutine,
    ItemCustomData,
    SyncRoutine,
    ValueStrlen,
    ValueCheck,
    ExtraButtonPressed,
}

impl ItemEvent {
    pub const ALL: [ItemEvent; 12] = [
        ItemEvent::ItemSelected,
        ItemEvent::ItemValueConfirm,
        ItemEvent::ItemValueUpdated,
        ItemEvent::ItemExit,
        ItemEvent::MenuExit,
        ItemEvent::Custom,
        ItemEvent::UpdateRoutine,
        ItemEvent::ItemCustomData,
        ItemEvent::SyncRoutine,
        ItemEvent::ValueStrlen,
        ItemEvent::ValueCheck,
        ItemEvent::ExtraButtonPressed,
    ];

    /// Key used in the JTF `events` object.
    pub fn key(self) -> &'static str {
        match self {
            ItemEvent::ItemSelected => "item-selected",
            ItemEvent::ItemValueConfirm => "item-value-confirm",
            ItemEvent::ItemValueUpdated => "item-value-updated",
            ItemEvent::ItemExit => "item-exit",
            ItemEvent::MenuExit => "menu-exit",
            ItemEvent::Custom => "custom-event",
            ItemEvent::UpdateRoutine => "update-routine",
            ItemEvent::ItemCustomData => "item-custom-data",
            ItemEvent::SyncRoutine => "sync-routine",
            ItemEvent::ValueStrlen => "value-strlen",
            ItemEvent::ValueCheck => "value-check",
            ItemEvent::ExtraButtonPressed => "extra-button-pressed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.key() == key)
    }
}

/// Where a bound function name resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FunctionReference<'a> {
    /// A function exported by the application's own plugin.
    Plugin(&'a str),
    /// A function in the toolkit's internal dispatch table.
    Internal(&'a str),
    /// A function exported by another module.
    External { module: &'a str, function: &'a str },
}

impl<'a> FunctionReference<'a> {
    pub fn function(&self) -> &'a str {
        match self {
            FunctionReference::Plugin(f) | FunctionReference::Internal(f) => f,
            FunctionReference::External { function, .. } => function,
        }
    }
}

/// Split a JTF function reference on its first colon.
pub fn split_function_reference(value: &str) -> FunctionReference<'_> {
    match value.split_once(':') {
        None => FunctionReference::Plugin(value),
        Some((module, function)) if module.is_empty() || module == "xante" => {
            FunctionReference::Internal(function)
        }
        Some((module, function)) => FunctionReference::External { module, function },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_keys_round_trip() {
        for event in ItemEvent::ALL {
            assert_eq!(ItemEvent::from_key(event.key()), Some(event));
        }
        assert_eq!(ItemEvent::from_key("no-such-event"), None);
    }

    #[test]
    fn test_plain_reference_targets_plugin() {
        assert_eq!(
            split_function_reference("foo_custom"),
            FunctionReference::Plugin("foo_custom")
        );
    }

    #[test]
    fn test_xante_prefix_is_internal() {
        assert_eq!(
            split_function_reference("xante:ev_sync"),
            FunctionReference::Internal("ev_sync")
        );
        assert_eq!(
            split_function_reference(":ev_sync"),
            FunctionReference::Internal("ev_sync")
        );
    }

    #[test]
    fn test_other_module_is_external() {
        let reference = split_function_reference("netmod:apply");
        assert_eq!(
            reference,
            FunctionReference::External {
                module: "netmod",
                function: "apply"
            }
        );
        assert_eq!(reference.function(), "apply");
    }
}
