//! Opens a plugin shared object the way the toolkit's loader does and
//! resolves its exported symbols.
//!
//! Plugin functions run in this process. A panic that reaches their C ABI
//! boundary aborts it, as does a call into a toolkit symbol the process
//! cannot resolve.

use abi_stable::library::{LibraryError, RawLibrary};
use std::ffi::CStr;
use std::path::{Path, PathBuf};
use std::ptr;
use thiserror::Error;
use xante_plugin_interface::{EV_INIT, InitFn, METADATA_FUNCTIONS, MetadataFn};

use crate::marshal::copy_foreign_str;

/// Toolkit entry points `xapl_init` may reach. Calling it is only safe when
/// the process already provides them.
pub const TOOLKIT_SYMBOLS: [&CStr; 3] = [
    c"xante_log_ex",
    c"xante_get_last_error",
    c"cl_plugin_argument_pointer",
];

/// Kinds of inspection failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectErrorKind {
    /// The file could not be opened as a shared library.
    LibraryCorrupted,
    /// A symbol that must be exported is absent.
    SymbolMissing(String),
    /// The process lacks the toolkit symbols a plugin call may use.
    ToolkitUnavailable(Vec<String>),
    /// `xapl_init` returned a nonzero status.
    InitFailed(i32),
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct InspectError {
    pub path: PathBuf,
    pub kind: InspectErrorKind,
    pub message: String,
}

/// A plugin library kept open for inspection. Dropping it unloads the
/// library.
pub struct PluginLibrary {
    path: PathBuf,
    library: RawLibrary,
}

impl std::fmt::Debug for PluginLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLibrary")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// The four metadata strings. `None` when the plugin returned null.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Metadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
}

impl PluginLibrary {
    /// Open the library at `path`.
    ///
    /// The toolkit symbols a plugin imports resolve lazily, so loading
    /// succeeds outside the toolkit as long as nothing calls into it.
    pub fn open(path: &Path) -> Result<Self, InspectError> {
        tracing::debug!(path = %path.display(), "opening plugin");

        let library = RawLibrary::load_at(path).map_err(|err| map_library_error(path, &err))?;
        Ok(PluginLibrary {
            path: path.to_path_buf(),
            library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the library exports `symbol`.
    pub fn has_symbol(&self, symbol: &str) -> bool {
        let Some(name) = nul_terminated(symbol) else {
            return false;
        };
        // SAFETY: the symbol is only resolved, never called, and the returned
        // guard is dropped before the library.
        unsafe { self.library.get::<*const ()>(&name).is_ok() }
    }

    /// Every symbol in `symbols` that the library does not export.
    pub fn missing_symbols<'s>(&self, symbols: impl IntoIterator<Item = &'s str>) -> Vec<&'s str> {
        symbols
            .into_iter()
            .filter(|symbol| !self.has_symbol(symbol))
            .collect()
    }

    /// Call the four metadata accessors and take ownership of each result.
    pub fn metadata(&self) -> Result<Metadata, InspectError> {
        let [name, version, author, description] = METADATA_FUNCTIONS;
        Ok(Metadata {
            name: self.metadata_field(name)?,
            version: self.metadata_field(version)?,
            author: self.metadata_field(author)?,
            description: self.metadata_field(description)?,
        })
    }

    fn metadata_field(&self, symbol: &str) -> Result<Option<String>, InspectError> {
        let function = self.function::<MetadataFn>(symbol)?;

        // SAFETY: the symbol has the metadata signature. It takes no arguments
        // and returns a malloc'd string the caller frees.
        let raw = unsafe { function() };
        if raw.is_null() {
            return Ok(None);
        }

        // SAFETY: non-null, nul-terminated, owned by us from here on.
        let value = unsafe { copy_foreign_str(raw) };
        // SAFETY: allocated with malloc by the plugin and not freed elsewhere.
        unsafe { libc::free(raw.cast()) };

        Ok(value.ok())
    }

    /// Call `xapl_init` with a null argument and check its status.
    ///
    /// Refused unless every [`TOOLKIT_SYMBOLS`] entry resolves in this
    /// process, which in practice means running inside the toolkit.
    pub fn call_init(&self) -> Result<(), InspectError> {
        let init = self.function::<InitFn>(EV_INIT)?;

        let unresolved = unresolved_symbols(&TOOLKIT_SYMBOLS, host_resolves);
        if !unresolved.is_empty() {
            return Err(InspectError {
                path: self.path.clone(),
                message: format!(
                    "Not calling {} of {}: toolkit symbols unavailable ({})",
                    EV_INIT,
                    self.path.display(),
                    unresolved.join(", ")
                ),
                kind: InspectErrorKind::ToolkitUnavailable(unresolved),
            });
        }

        // SAFETY: `xapl_init` ignores its argument.
        let status = unsafe { init(ptr::null_mut()) };
        if status != 0 {
            return Err(InspectError {
                path: self.path.clone(),
                kind: InspectErrorKind::InitFailed(status),
                message: format!(
                    "Plugin {} returned {} from {}",
                    self.path.display(),
                    status,
                    EV_INIT
                ),
            });
        }

        Ok(())
    }

    fn function<F: Copy>(&self, symbol: &str) -> Result<F, InspectError> {
        let missing = || InspectError {
            path: self.path.clone(),
            kind: InspectErrorKind::SymbolMissing(symbol.to_string()),
            message: format!(
                "Plugin {} missing required symbol: {}",
                self.path.display(),
                symbol
            ),
        };

        let name = nul_terminated(symbol).ok_or_else(missing)?;
        // SAFETY: callers pick `F` to match the exported signature for
        // `symbol`, and the copy does not outlive `self`.
        unsafe { self.library.get::<F>(&name) }
            .map(|function| *function)
            .map_err(|_| missing())
    }
}

/// Whether the running process already provides `symbol`.
pub fn host_resolves(symbol: &CStr) -> bool {
    // SAFETY: `symbol` is nul-terminated and RTLD_DEFAULT searches the
    // global scope without loading anything.
    !unsafe { libc::dlsym(libc::RTLD_DEFAULT, symbol.as_ptr()) }.is_null()
}

fn unresolved_symbols(symbols: &[&CStr], resolves: impl Fn(&CStr) -> bool) -> Vec<String> {
    symbols
        .iter()
        .filter(|symbol| !resolves(symbol))
        .map(|symbol| symbol.to_string_lossy().into_owned())
        .collect()
}

fn nul_terminated(symbol: &str) -> Option<Vec<u8>> {
    if symbol.as_bytes().contains(&0) {
        return None;
    }
    let mut name = Vec::with_capacity(symbol.len() + 1);
    name.extend_from_slice(symbol.as_bytes());
    name.push(0);
    Some(name)
}

fn map_library_error(path: &Path, err: &LibraryError) -> InspectError {
    let detail = err.to_string();
    match err {
        LibraryError::GetSymbolError { symbol, .. } => {
            let symbol = String::from_utf8_lossy(symbol)
                .trim_end_matches('\0')
                .to_string();
            InspectError {
                path: path.to_path_buf(),
                message: format!(
                    "Plugin {} missing required symbol: {}",
                    path.display(),
                    symbol
                ),
                kind: InspectErrorKind::SymbolMissing(symbol),
            }
        }
        _ => InspectError {
            path: path.to_path_buf(),
            kind: InspectErrorKind::LibraryCorrupted,
            message: format!(
                "Plugin {} failed to open library: {}",
                path.display(),
                detail
            ),
        },
    }
}
