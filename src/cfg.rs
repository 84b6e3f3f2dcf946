//! Configuration file handle (`cl_cfg_file_t`).

use std::ffi::CString;

use crate::error::XanteError;
use crate::handle::{ConfigTag, Handle};
use crate::marshal::{c_string, into_utf8, object_bytes};
use crate::toolkit::Toolkit;

/// The application's loaded configuration file.
#[derive(Clone, Copy)]
pub struct CfgFile<'ev> {
    handle: Handle<'ev, ConfigTag>,
    toolkit: &'ev dyn Toolkit,
}

impl<'ev> CfgFile<'ev> {
    pub fn new(toolkit: &'ev dyn Toolkit, handle: Handle<'ev, ConfigTag>) -> Self {
        CfgFile { handle, toolkit }
    }

    pub fn handle(&self) -> Handle<'ev, ConfigTag> {
        self.handle
    }

    /// Raw bytes stored under `[section] key`, or `None` if there is no
    /// entry.
    pub fn try_get_bytes(&self, section: &str, key: &str) -> Result<Option<CString>, XanteError> {
        let section = c_string(section)?;
        let key = c_string(key)?;

        match self.toolkit.cfg_get_value(self.handle.raw(), &section, &key) {
            Some(object) => object_bytes(self.toolkit, object).map(Some),
            None => Ok(None),
        }
    }

    /// Value stored under `[section] key` as UTF-8 text.
    pub fn try_get(&self, section: &str, key: &str) -> Result<Option<String>, XanteError> {
        match self.try_get_bytes(section, key)? {
            Some(bytes) => Ok(Some(into_utf8(bytes)?)),
            None => Ok(None),
        }
    }

    /// Value stored under `[section] key`, empty when absent.
    pub fn get(&self, section: &str, key: &str) -> String {
        self.try_get(section, key).ok().flatten().unwrap_or_default()
    }
}
