//! Loading the argument bundle passed to every callback.
//!
//! The toolkit hands each plugin function one pointer to a key/value
//! argument map. [`Event::load`] looks up the well-known keys and wraps what
//! it finds. An absent key is not an error; only a map that cannot be read
//! at all is.

use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;

use xante_plugin_interface::{
    ARG_CFG_FILE, ARG_CHANGES, ARG_DATA, ARG_ITEM, ARG_MENU, ARG_VALUE, ARG_XPP,
    EVENT_ARGUMENT_KEYS,
};

use crate::app::Application;
use crate::cfg::CfgFile;
use crate::error::EventError;
use crate::handle::{Handle, RawRef};
use crate::item::Item;
use crate::menu::Menu;
use crate::toolkit::{ArgumentLookup, RawHandle, Toolkit};

/// The opaque argument pointer of one callback.
#[derive(Clone, Copy, Debug)]
pub struct ArgumentMap<'ev> {
    raw: Option<RawHandle>,
    _scope: PhantomData<(&'ev (), *const ())>,
}

impl<'ev> ArgumentMap<'ev> {
    /// # Safety
    ///
    /// `ptr` must be null or the argument pointer the toolkit passed to the
    /// current callback, and every object reachable from it must stay valid
    /// for `'ev`.
    pub unsafe fn from_raw(ptr: *mut c_void) -> Self {
        ArgumentMap {
            // SAFETY: forwarded from the caller.
            raw: unsafe { RawHandle::from_raw(ptr) },
            _scope: PhantomData,
        }
    }

    pub fn raw(&self) -> Option<RawHandle> {
        self.raw
    }

    /// Look up one key. A null map reads as malformed.
    pub fn lookup(&self, toolkit: &dyn Toolkit, key: &std::ffi::CStr) -> ArgumentLookup {
        match self.raw {
            Some(map) => toolkit.argument_pointer(map, key),
            None => ArgumentLookup::Malformed,
        }
    }
}

/// Everything a callback received, wrapped.
pub struct Event<'ev> {
    app: Option<Application<'ev>>,
    menu: Option<Menu<'ev>>,
    item: Option<Item<'ev>>,
    cfg_file: Option<CfgFile<'ev>>,
    value: Option<RawRef<'ev>>,
    changes: Option<RawRef<'ev>>,
    data: Option<RawRef<'ev>>,
}

impl<'ev> Event<'ev> {
    pub fn load(toolkit: &'ev dyn Toolkit, args: &ArgumentMap<'ev>) -> Result<Self, EventError> {
        if args.raw().is_none() {
            return Err(EventError::MalformedArguments);
        }

        let mut found = [None; EVENT_ARGUMENT_KEYS.len()];
        for (slot, key) in found.iter_mut().zip(EVENT_ARGUMENT_KEYS) {
            *slot = match args.lookup(toolkit, key) {
                ArgumentLookup::Found(handle) => handle,
                ArgumentLookup::Missing => None,
                ArgumentLookup::Malformed => return Err(EventError::MalformedArguments),
            };
        }
        let [xpp, menu, item, cfg_file, value, changes, data] = found;

        // SAFETY: the toolkit stores under each key an object of the kind the
        // key names, alive for the callback (`'ev`, per `ArgumentMap`).
        unsafe {
            Ok(Event {
                app: xpp.map(|raw| Application::new(toolkit, Handle::new(raw))),
                menu: menu.map(|raw| Menu::load(toolkit, Handle::new(raw))),
                item: item.map(|raw| Item::load(toolkit, Handle::new(raw))),
                cfg_file: cfg_file.map(|raw| CfgFile::new(toolkit, Handle::new(raw))),
                value: value.map(|raw| Handle::new(raw)),
                changes: changes.map(|raw| Handle::new(raw)),
                data: data.map(|raw| Handle::new(raw)),
            })
        }
    }

    pub fn app(&self) -> Option<&Application<'ev>> {
        self.app.as_ref()
    }

    pub fn menu(&self) -> Option<&Menu<'ev>> {
        self.menu.as_ref()
    }

    pub fn item(&self) -> Option<&Item<'ev>> {
        self.item.as_ref()
    }

    pub fn cfg_file(&self) -> Option<&CfgFile<'ev>> {
        self.cfg_file.as_ref()
    }

    /// Event-specific value (e.g. the value being validated).
    pub fn value(&self) -> Option<RawRef<'ev>> {
        self.value
    }

    /// Pending changes list.
    pub fn changes(&self) -> Option<RawRef<'ev>> {
        self.changes
    }

    /// User data attached to the event.
    pub fn data(&self) -> Option<RawRef<'ev>> {
        self.data
    }

    pub fn require_app(&self) -> Result<&Application<'ev>, EventError> {
        self.app().ok_or(EventError::MissingArgument(key_name(ARG_XPP)))
    }

    pub fn require_menu(&self) -> Result<&Menu<'ev>, EventError> {
        self.menu().ok_or(EventError::MissingArgument(key_name(ARG_MENU)))
    }

    pub fn require_item(&self) -> Result<&Item<'ev>, EventError> {
        self.item().ok_or(EventError::MissingArgument(key_name(ARG_ITEM)))
    }

    pub fn require_cfg_file(&self) -> Result<&CfgFile<'ev>, EventError> {
        self.cfg_file()
            .ok_or(EventError::MissingArgument(key_name(ARG_CFG_FILE)))
    }

    pub fn require_value(&self) -> Result<RawRef<'ev>, EventError> {
        self.value
            .ok_or(EventError::MissingArgument(key_name(ARG_VALUE)))
    }

    pub fn require_changes(&self) -> Result<RawRef<'ev>, EventError> {
        self.changes
            .ok_or(EventError::MissingArgument(key_name(ARG_CHANGES)))
    }

    pub fn require_data(&self) -> Result<RawRef<'ev>, EventError> {
        self.data.ok_or(EventError::MissingArgument(key_name(ARG_DATA)))
    }
}

fn key_name(key: &'static std::ffi::CStr) -> &'static str {
    key.to_str().unwrap_or("?")
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("app", &self.app.map(|a| a.handle()))
            .field("menu", &self.menu)
            .field("item", &self.item)
            .field("cfg_file", &self.cfg_file.map(|c| c.handle()))
            .field("value", &self.value)
            .field("changes", &self.changes)
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeToolkit;
    use pretty_assertions::assert_eq;
    use xante_plugin_interface::{AccessMode, ObjectType};

    #[test]
    fn test_null_map_is_malformed() {
        let toolkit = FakeToolkit::new();
        // SAFETY: null is accepted.
        let args = unsafe { ArgumentMap::from_raw(std::ptr::null_mut()) };
        assert_eq!(
            Event::load(&toolkit, &args).unwrap_err(),
            EventError::MalformedArguments
        );
    }

    #[test]
    fn test_unreadable_map_is_malformed() {
        let toolkit = FakeToolkit::new();
        let args = toolkit.malformed_argument_map();
        assert_eq!(
            Event::load(&toolkit, &args).unwrap_err(),
            EventError::MalformedArguments
        );
    }

    #[test]
    fn test_missing_item_is_none() {
        let toolkit = FakeToolkit::new();
        let xpp = toolkit.add_application();
        let args = toolkit.argument_map(&[(ARG_XPP, Some(xpp))]);

        let event = Event::load(&toolkit, &args).unwrap();
        assert!(event.item().is_none());
        assert!(event.app().is_some());
        assert_eq!(
            event.require_item().unwrap_err(),
            EventError::MissingArgument("item")
        );
    }

    #[test]
    fn test_null_value_under_present_key_is_none() {
        let toolkit = FakeToolkit::new();
        let args = toolkit.argument_map(&[(ARG_MENU, None), (ARG_DATA, None)]);
        let event = Event::load(&toolkit, &args).unwrap();
        assert!(event.menu().is_none());
        assert!(event.data().is_none());
    }

    #[test]
    fn test_item_only_bundle() {
        let toolkit = FakeToolkit::new();
        let item = toolkit.add_item(
            "input_string",
            "id-input",
            ObjectType::InputString.as_raw(),
            AccessMode::EDIT.bits(),
        );
        let args = toolkit.argument_map(&[(ARG_ITEM, Some(item))]);

        let event = Event::load(&toolkit, &args).unwrap();
        let loaded = event.item().unwrap();
        assert_eq!(loaded.object_type(), Some(ObjectType::InputString));
        assert_eq!(loaded.name(), "input_string");
        assert!(event.menu().is_none());
        assert!(event.app().is_none());
        assert!(event.cfg_file().is_none());
    }

    #[test]
    fn test_untyped_payloads_pass_through() {
        let toolkit = FakeToolkit::new();
        let value = toolkit.add_opaque();
        let data = toolkit.add_opaque();
        let args = toolkit.argument_map(&[(ARG_VALUE, Some(value)), (ARG_DATA, Some(data))]);

        let event = Event::load(&toolkit, &args).unwrap();
        assert_eq!(event.value().map(|h| h.raw()), Some(value));
        assert_eq!(event.require_data().unwrap().raw(), data);
        assert!(event.changes().is_none());
    }

    #[test]
    fn test_every_key_is_queried() {
        let toolkit = FakeToolkit::new();
        let args = toolkit.argument_map(&[]);
        Event::load(&toolkit, &args).unwrap();
        assert_eq!(toolkit.call_count("argument_pointer"), EVENT_ARGUMENT_KEYS.len());
    }
}
