//! Callback-scoped references to toolkit objects.
//!
//! A [`Handle`] pairs a [`RawHandle`] with a capability tag saying what kind
//! of object it points to, and borrows it for `'ev`, the lifetime of one
//! callback. Hook signatures are higher-ranked over `'ev`, so a handle
//! cannot be stored anywhere that outlives the call that produced it.
//! Handles are `!Send` and `!Sync`: the toolkit calls plugins from its UI
//! thread only.

use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;

use crate::toolkit::RawHandle;

mod sealed {
    pub trait Sealed {}
}

/// Capability tag of a [`Handle`].
pub trait HandleKind: sealed::Sealed {
    const NAME: &'static str;
}

macro_rules! handle_kinds {
    ($($(#[$doc:meta])* $tag:ident => $name:literal;)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug)]
            pub enum $tag {}

            impl sealed::Sealed for $tag {}

            impl HandleKind for $tag {
                const NAME: &'static str = $name;
            }
        )*
    };
}

handle_kinds! {
    /// The running application (`xante_t`).
    ApplicationTag => "application";
    MenuTag => "menu";
    ItemTag => "item";
    /// A loaded configuration file (`cl_cfg_file_t`).
    ConfigTag => "cfg-file";
    /// A payload whose shape depends on the event.
    Untyped => "untyped";
}

/// A tagged reference valid for the callback lifetime `'ev`.
pub struct Handle<'ev, K: HandleKind> {
    raw: RawHandle,
    _scope: PhantomData<(&'ev (), *const K)>,
}

/// An untyped argument (`value`, `changes`, `data`).
pub type RawRef<'ev> = Handle<'ev, Untyped>;

impl<'ev, K: HandleKind> Handle<'ev, K> {
    /// Tag a raw reference.
    ///
    /// # Safety
    ///
    /// `raw` must point to an object of kind `K` that stays valid for `'ev`.
    pub unsafe fn new(raw: RawHandle) -> Self {
        Handle {
            raw,
            _scope: PhantomData,
        }
    }

    pub fn raw(self) -> RawHandle {
        self.raw
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.raw.as_ptr()
    }

    pub fn kind(self) -> &'static str {
        K::NAME
    }
}

impl<K: HandleKind> Clone for Handle<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: HandleKind> Copy for Handle<'_, K> {}

impl<K: HandleKind> PartialEq for Handle<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K: HandleKind> Eq for Handle<'_, K> {}

impl<K: HandleKind> fmt::Debug for Handle<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({:p})", K::NAME, self.raw.as_ptr())
    }
}
