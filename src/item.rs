//! Item handle (`xante_item_t`).

use std::ffi::{CStr, CString};

use xante_plugin_interface::{AccessMode, ObjectType};

use crate::error::XanteError;
use crate::handle::{Handle, ItemTag};
use crate::marshal::{c_string, copy_foreign_str, into_utf8, object_bytes};
use crate::toolkit::Toolkit;

/// An item received by a callback.
///
/// Name, object id, type and access mode are read once at construction.
/// The value is read on demand because hooks may update it.
#[derive(Clone)]
pub struct Item<'ev> {
    handle: Handle<'ev, ItemTag>,
    toolkit: &'ev dyn Toolkit,
    name: String,
    object_id: String,
    object_type: i32,
    access_mode: AccessMode,
}

impl<'ev> Item<'ev> {
    pub fn load(toolkit: &'ev dyn Toolkit, handle: Handle<'ev, ItemTag>) -> Self {
        let raw = handle.raw();

        // SAFETY: strings are owned by the item, which outlives this call.
        let (name, object_id) = unsafe {
            (
                copy_foreign_str(toolkit.item_name(raw)).unwrap_or_default(),
                copy_foreign_str(toolkit.item_object_id(raw)).unwrap_or_default(),
            )
        };

        Item {
            handle,
            toolkit,
            name,
            object_id,
            object_type: toolkit.item_object_type(raw),
            access_mode: AccessMode(toolkit.item_access_mode(raw)),
        }
    }

    pub fn handle(&self) -> Handle<'ev, ItemTag> {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    pub fn object_type(&self) -> Option<ObjectType> {
        ObjectType::from_raw(self.object_type)
    }

    pub fn object_type_raw(&self) -> i32 {
        self.object_type
    }

    pub fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    /// Current value exactly as the toolkit stores it.
    ///
    /// The toolkit's last-error slot is checked right after the read; if it
    /// is set, no value object is returned and the reference we got is
    /// released.
    pub fn try_value_bytes(&self) -> Result<CString, XanteError> {
        let object = self.toolkit.item_value(self.handle.raw());
        let code = self.toolkit.last_error();

        if code != 0 {
            if let Some(object) = object {
                self.toolkit.object_unref(object);
            }
            return Err(XanteError::last_error(code));
        }

        let object = object.ok_or(XanteError::NoValue)?;
        object_bytes(self.toolkit, object)
    }

    /// Current value as UTF-8 text. Values in another encoding fail with
    /// [`MarshalError::InvalidUtf8`](crate::MarshalError::InvalidUtf8); use
    /// [`Item::try_value_bytes`] for those.
    pub fn try_value(&self) -> Result<String, XanteError> {
        Ok(into_utf8(self.try_value_bytes()?)?)
    }

    /// Current value as text, or an empty string if it cannot be read.
    pub fn value(&self) -> String {
        self.try_value().unwrap_or_else(|err| {
            tracing::debug!(item = %self.name, error = %err, "item value unavailable");
            String::new()
        })
    }

    /// Replace the item's value. The toolkit converts `content` to the
    /// item's native type.
    pub fn set_value(&self, content: &str) -> Result<(), XanteError> {
        self.set_value_bytes(&c_string(content)?)
    }

    /// Replace the item's value with raw bytes, as read by
    /// [`Item::try_value_bytes`].
    pub fn set_value_bytes(&self, content: &CStr) -> Result<(), XanteError> {
        match self.toolkit.item_update_value(self.handle.raw(), content) {
            0 => Ok(()),
            code => Err(XanteError::Toolkit { code }),
        }
    }
}

impl std::fmt::Debug for Item<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Item")
            .field("handle", &self.handle)
            .field("name", &self.name)
            .field("object_id", &self.object_id)
            .field("object_type", &self.object_type)
            .field("access_mode", &self.access_mode)
            .finish()
    }
}
