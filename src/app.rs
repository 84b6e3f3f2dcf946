//! The running application (`xante_t`).

use xante_plugin_interface::{ExitValue, MsgBoxType};

use crate::error::XanteError;
use crate::handle::{ApplicationTag, Handle};
use crate::marshal::{c_string, copy_foreign_str};
use crate::toolkit::{RuntimeFlag, Toolkit};

/// Application handle received by a callback.
///
/// Runtime flags are read from the toolkit on every call since hooks may
/// change them. Setters return the toolkit's status code untouched
/// (0 on success).
#[derive(Clone, Copy)]
pub struct Application<'ev> {
    handle: Handle<'ev, ApplicationTag>,
    toolkit: &'ev dyn Toolkit,
}

impl<'ev> Application<'ev> {
    pub fn new(toolkit: &'ev dyn Toolkit, handle: Handle<'ev, ApplicationTag>) -> Self {
        Application { handle, toolkit }
    }

    pub fn handle(&self) -> Handle<'ev, ApplicationTag> {
        self.handle
    }

    /// Show a message box and wait until the user closes it.
    pub fn msg_box(&self, kind: MsgBoxType, title: &str, message: &str) -> Result<(), XanteError> {
        let title = c_string(title)?;
        let message = c_string(message)?;

        tracing::debug!(kind = ?kind, title = ?title, "showing message box");
        let status = self
            .toolkit
            .messagebox(self.handle.raw(), kind, &title, &message);

        if status < 0 {
            return Err(XanteError::Toolkit { code: status });
        }

        Ok(())
    }

    /// Run a one-off dialog described by a JTS document and wait for it to
    /// finish.
    pub fn dialog(&self, jts: &str) -> Result<ExitValue, XanteError> {
        let jts = c_string(jts)?;
        let status = self.toolkit.single_run(self.handle.raw(), &jts);

        match ExitValue::from_raw(status) {
            Some(ExitValue::Error) | None => Err(XanteError::Toolkit { code: status }),
            Some(value) => Ok(value),
        }
    }

    fn flag(&self, flag: RuntimeFlag) -> bool {
        self.toolkit.runtime_flag(self.handle.raw(), flag)
    }

    fn set_flag(&self, flag: RuntimeFlag, value: bool) -> i32 {
        self.toolkit.set_runtime_flag(self.handle.raw(), flag, value)
    }

    /// Whether every change made during the session is discarded on exit.
    pub fn discard_changes(&self) -> bool {
        self.flag(RuntimeFlag::DiscardChanges)
    }

    pub fn set_discard_changes(&self, discard: bool) -> i32 {
        self.set_flag(RuntimeFlag::DiscardChanges, discard)
    }

    /// Whether changes are discarded when the session ends by inactivity.
    pub fn discard_changes_on_timeout(&self) -> bool {
        self.flag(RuntimeFlag::DiscardChangesOnTimeout)
    }

    pub fn set_discard_changes_on_timeout(&self, discard: bool) -> i32 {
        self.set_flag(RuntimeFlag::DiscardChangesOnTimeout, discard)
    }

    pub fn force_config_file_saving(&self) -> bool {
        self.flag(RuntimeFlag::ForceConfigFileSaving)
    }

    pub fn set_force_config_file_saving(&self, force: bool) -> i32 {
        self.set_flag(RuntimeFlag::ForceConfigFileSaving, force)
    }

    /// Inactivity timeout in seconds.
    pub fn inactivity_timeout(&self) -> u32 {
        u32::try_from(self.toolkit.inactivity_timeout(self.handle.raw())).unwrap_or(0)
    }

    pub fn set_inactivity_timeout(&self, seconds: u32) -> i32 {
        self.toolkit.set_inactivity_timeout(self.handle.raw(), seconds)
    }

    pub fn show_config_saving_question(&self) -> bool {
        self.flag(RuntimeFlag::ShowConfigSavingQuestion)
    }

    pub fn set_show_config_saving_question(&self, show: bool) -> i32 {
        self.set_flag(RuntimeFlag::ShowConfigSavingQuestion, show)
    }

    pub fn set_accent_characters(&self, use_accents: bool) -> i32 {
        self.set_flag(RuntimeFlag::AccentCharacters, use_accents)
    }

    pub fn close_ui(&self) -> bool {
        self.flag(RuntimeFlag::CloseUi)
    }

    pub fn set_close_ui(&self, close: bool) -> i32 {
        self.set_flag(RuntimeFlag::CloseUi, close)
    }

    /// Whether ESC is allowed to close dialogs.
    pub fn esc_key(&self) -> bool {
        self.flag(RuntimeFlag::EscKey)
    }

    /// Whether Ctrl+Z is enabled.
    pub fn suspend_key(&self) -> bool {
        self.flag(RuntimeFlag::SuspendKey)
    }

    /// Whether Ctrl+C is enabled.
    pub fn stop_key(&self) -> bool {
        self.flag(RuntimeFlag::StopKey)
    }

    /// Whether the application runs with a module loaded.
    pub fn execute_module(&self) -> bool {
        self.flag(RuntimeFlag::ExecuteModule)
    }

    pub fn ui_active(&self) -> bool {
        self.flag(RuntimeFlag::UiActive)
    }

    pub fn user_authentication(&self) -> bool {
        self.flag(RuntimeFlag::UserAuthentication)
    }

    /// Name of the user or process that started the application. Empty when
    /// the toolkit has none.
    pub fn caller_name(&self) -> String {
        let raw = self.toolkit.caller_name(self.handle.raw());
        // SAFETY: the toolkit keeps the name alive for the session.
        unsafe { copy_foreign_str(raw) }.unwrap_or_default()
    }

    pub fn exit_value(&self) -> Option<ExitValue> {
        ExitValue::from_raw(self.exit_value_raw())
    }

    pub fn exit_value_raw(&self) -> i32 {
        self.toolkit.exit_value(self.handle.raw())
    }
}
