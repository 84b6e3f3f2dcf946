//! Menu handle (`xante_menu_t`).

use xante_plugin_interface::MenuType;

use crate::handle::{Handle, MenuTag};
use crate::marshal::copy_foreign_str;
use crate::toolkit::Toolkit;

/// A menu received by a callback. Descriptive fields are read once when the
/// wrapper is built; the menu does not change while the callback runs.
#[derive(Debug, Clone)]
pub struct Menu<'ev> {
    handle: Handle<'ev, MenuTag>,
    name: String,
    object_id: String,
    menu_type: i32,
}

impl<'ev> Menu<'ev> {
    pub fn load(toolkit: &dyn Toolkit, handle: Handle<'ev, MenuTag>) -> Self {
        let raw = handle.raw();

        // SAFETY: strings are owned by the menu, which outlives this call.
        let (name, object_id) = unsafe {
            (
                copy_foreign_str(toolkit.menu_name(raw)).unwrap_or_default(),
                copy_foreign_str(toolkit.menu_object_id(raw)).unwrap_or_default(),
            )
        };

        Menu {
            handle,
            name,
            object_id,
            menu_type: toolkit.menu_type(raw),
        }
    }

    pub fn handle(&self) -> Handle<'ev, MenuTag> {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// `None` for a type this binding does not know.
    pub fn menu_type(&self) -> Option<MenuType> {
        MenuType::from_raw(self.menu_type)
    }

    pub fn menu_type_raw(&self) -> i32 {
        self.menu_type
    }
}
