//! In-memory stand-in for libxante.
//!
//! [`FakeToolkit`] implements [`Toolkit`] over a small object table so the
//! binding and plugin hooks can be exercised without the native library.
//! Handles it returns are opaque ids and are never dereferenced.
//!
//! It also keeps the books the tests need: which strings were allocated and
//! freed, which value objects are still referenced, which dialogs ran and
//! what was logged.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ffi::{CStr, CString, c_char};
use std::ptr;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use xante_plugin_interface::{ErrorCode, LogLevel, MsgBoxType};

use crate::event::ArgumentMap;
use crate::log::LogSink;
use crate::toolkit::{ArgumentLookup, RawHandle, RuntimeFlag, Toolkit, UNSUPPORTED_STATUS};

/// One line written to a log sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub function: String,
    pub line: u32,
    pub content: String,
}

/// A dialog the toolkit was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedDialog {
    MessageBox {
        kind: MsgBoxType,
        title: String,
        message: String,
    },
    SingleRun {
        jts: String,
    },
}

/// Counters of the C-string allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationStats {
    pub allocated: usize,
    pub freed: usize,
    /// Frees of pointers that were never allocated or already freed.
    pub invalid_frees: usize,
    pub outstanding: usize,
}

enum FakeObject {
    Application,
    Menu {
        name: CString,
        object_id: CString,
        menu_type: i32,
    },
    Item {
        name: CString,
        object_id: CString,
        object_type: i32,
        access_mode: u32,
        value: Option<CString>,
    },
    Config {
        entries: Vec<(String, String, String)>,
    },
    ArgumentMap {
        entries: Vec<(CString, Option<RawHandle>)>,
    },
    MalformedMap,
    Opaque,
    /// A referenced value object (`cl_object_t`).
    Value {
        text: CString,
        refs: usize,
    },
    /// A referenced string object (`cl_string_t`).
    Text {
        text: CString,
        refs: usize,
    },
}

struct State {
    next_id: usize,
    objects: HashMap<usize, FakeObject>,
    last_error: i32,
    fail_item_value: Option<i32>,
    setter_status: i32,
    dialog_result: i32,
    flags: HashMap<RuntimeFlag, bool>,
    inactivity_timeout: i32,
    exit_value: i32,
    caller_name: Option<CString>,
    dialogs: Vec<RecordedDialog>,
    logs: Vec<LogRecord>,
    calls: HashMap<&'static str, usize>,
    live_strings: HashSet<usize>,
    allocs: AllocationStats,
    invalid_unrefs: usize,
}

impl Default for State {
    fn default() -> Self {
        State {
            next_id: 1,
            objects: HashMap::new(),
            last_error: 0,
            fail_item_value: None,
            setter_status: 0,
            dialog_result: 0,
            flags: HashMap::new(),
            inactivity_timeout: 0,
            exit_value: 0,
            caller_name: None,
            dialogs: Vec::new(),
            logs: Vec::new(),
            calls: HashMap::new(),
            live_strings: HashSet::new(),
            allocs: AllocationStats::default(),
            invalid_unrefs: 0,
        }
    }
}

/// Fake toolkit for tests.
#[derive(Default)]
pub struct FakeToolkit {
    state: RefCell<State>,
    gate: RefCell<Option<DialogGate>>,
}

// Handles are ids shifted past the low bits so they look like aligned pointers.
const ID_SHIFT: usize = 4;

fn handle_for(id: usize) -> RawHandle {
    // SAFETY: fake handles are never dereferenced.
    let handle = unsafe { RawHandle::from_raw(ptr::without_provenance_mut(id << ID_SHIFT)) };
    handle.unwrap_or_else(|| unreachable!("ids start at 1"))
}

fn id_of(handle: RawHandle) -> usize {
    handle.as_ptr().addr() >> ID_SHIFT
}

fn lossy(s: &CStr) -> String {
    s.to_string_lossy().into_owned()
}

fn owned_c(s: &str) -> CString {
    owned_bytes(s.as_bytes())
}

fn owned_bytes(bytes: &[u8]) -> CString {
    let bytes: Vec<u8> = bytes.iter().map(|&b| if b == 0 { b' ' } else { b }).collect();
    CString::new(bytes).unwrap_or_default()
}

impl FakeToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, object: FakeObject) -> RawHandle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.objects.insert(id, object);
        handle_for(id)
    }

    fn count(&self, call: &'static str) {
        *self.state.borrow_mut().calls.entry(call).or_default() += 1;
    }

    // ------------------------------------------------------------------
    // Building the world
    // ------------------------------------------------------------------

    pub fn add_application(&self) -> RawHandle {
        self.insert(FakeObject::Application)
    }

    pub fn add_menu(&self, name: &str, object_id: &str, menu_type: i32) -> RawHandle {
        self.insert(FakeObject::Menu {
            name: owned_c(name),
            object_id: owned_c(object_id),
            menu_type,
        })
    }

    pub fn add_item(
        &self,
        name: &str,
        object_id: &str,
        object_type: i32,
        access_mode: u32,
    ) -> RawHandle {
        self.insert(FakeObject::Item {
            name: owned_c(name),
            object_id: owned_c(object_id),
            object_type,
            access_mode,
            value: None,
        })
    }

    pub fn set_item_value(&self, item: RawHandle, value: &str) {
        self.set_item_value_bytes(item, value.as_bytes());
    }

    /// Store raw bytes, e.g. Latin-1 text the toolkit accepted from a form.
    pub fn set_item_value_bytes(&self, item: RawHandle, value: &[u8]) {
        if let Some(FakeObject::Item { value: slot, .. }) =
            self.state.borrow_mut().objects.get_mut(&id_of(item))
        {
            *slot = Some(owned_bytes(value));
        }
    }

    pub fn item_value_text(&self, item: RawHandle) -> Option<String> {
        self.item_value_bytes(item)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn item_value_bytes(&self, item: RawHandle) -> Option<Vec<u8>> {
        match self.state.borrow().objects.get(&id_of(item)) {
            Some(FakeObject::Item { value, .. }) => value.as_ref().map(|v| v.as_bytes().to_vec()),
            _ => None,
        }
    }

    /// A configuration file holding `(section, key, value)` entries.
    pub fn add_config(&self, entries: &[(&str, &str, &str)]) -> RawHandle {
        self.insert(FakeObject::Config {
            entries: entries
                .iter()
                .map(|(s, k, v)| (s.to_string(), k.to_string(), v.to_string()))
                .collect(),
        })
    }

    /// An object the binding only passes through.
    pub fn add_opaque(&self) -> RawHandle {
        self.insert(FakeObject::Opaque)
    }

    /// A value object holding one reference, owned by the caller.
    pub fn add_value_object(&self, text: &str) -> RawHandle {
        self.add_value_object_bytes(text.as_bytes())
    }

    pub fn add_value_object_bytes(&self, bytes: &[u8]) -> RawHandle {
        self.insert(FakeObject::Value {
            text: owned_bytes(bytes),
            refs: 1,
        })
    }

    /// An argument map with the given entries. Keys not listed are missing.
    pub fn argument_map(&self, entries: &[(&CStr, Option<RawHandle>)]) -> ArgumentMap<'_> {
        let raw = self.insert(FakeObject::ArgumentMap {
            entries: entries.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect(),
        });
        // SAFETY: the map and everything in it live as long as `self`.
        unsafe { ArgumentMap::from_raw(raw.as_ptr()) }
    }

    /// A non-null pointer the argument lookup cannot interpret.
    pub fn malformed_argument_map(&self) -> ArgumentMap<'_> {
        let raw = self.insert(FakeObject::MalformedMap);
        // SAFETY: as above.
        unsafe { ArgumentMap::from_raw(raw.as_ptr()) }
    }

    // ------------------------------------------------------------------
    // Knobs
    // ------------------------------------------------------------------

    /// Make every following item value read set the last-error slot.
    pub fn fail_item_value(&self, code: ErrorCode) {
        self.state.borrow_mut().fail_item_value = Some(code.as_raw());
    }

    /// Status returned by every setter and value update from now on.
    pub fn set_setter_status(&self, status: i32) {
        self.state.borrow_mut().setter_status = status;
    }

    /// Status returned by the next single-run dialogs.
    pub fn set_dialog_result(&self, status: i32) {
        self.state.borrow_mut().dialog_result = status;
    }

    pub fn set_flag(&self, flag: RuntimeFlag, value: bool) {
        self.state.borrow_mut().flags.insert(flag, value);
    }

    pub fn set_exit_value(&self, value: i32) {
        self.state.borrow_mut().exit_value = value;
    }

    pub fn set_caller_name(&self, name: &str) {
        self.state.borrow_mut().caller_name = Some(owned_c(name));
    }

    /// Hold every dialog until `gate` is released.
    pub fn set_dialog_gate(&self, gate: DialogGate) {
        *self.gate.borrow_mut() = Some(gate);
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn dialogs(&self) -> Vec<RecordedDialog> {
        self.state.borrow().dialogs.clone()
    }

    pub fn logs(&self) -> Vec<LogRecord> {
        self.state.borrow().logs.clone()
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.state.borrow().calls.get(call).copied().unwrap_or(0)
    }

    pub fn allocations(&self) -> AllocationStats {
        let state = self.state.borrow();
        AllocationStats {
            outstanding: state.live_strings.len(),
            ..state.allocs
        }
    }

    /// Value and string objects still holding a reference.
    pub fn live_objects(&self) -> usize {
        self.state
            .borrow()
            .objects
            .values()
            .filter(|o| match o {
                FakeObject::Value { refs, .. } | FakeObject::Text { refs, .. } => *refs > 0,
                _ => false,
            })
            .count()
    }

    /// Unrefs of objects that held no reference.
    pub fn invalid_unrefs(&self) -> usize {
        self.state.borrow().invalid_unrefs
    }

    /// A string allocated the way the toolkit hands out owned strings.
    pub fn foreign_string(&self, s: &str) -> *mut c_char {
        self.alloc_string(&owned_c(s))
    }

    /// Whether `ptr` is a live allocation of this toolkit.
    pub fn owns_string(&self, ptr: *const c_char) -> bool {
        self.state.borrow().live_strings.contains(&ptr.addr())
    }

    fn pass_gate(&self) {
        let gate = self.gate.borrow().clone();
        if let Some(gate) = gate {
            gate.pass();
        }
    }

    fn unref(&self, handle: RawHandle) {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        match state.objects.get_mut(&id_of(handle)) {
            Some(FakeObject::Value { refs, .. } | FakeObject::Text { refs, .. }) if *refs > 0 => {
                *refs -= 1;
            }
            _ => state.invalid_unrefs += 1,
        }
    }
}

impl Drop for FakeToolkit {
    fn drop(&mut self) {
        for addr in self.state.get_mut().live_strings.drain() {
            // SAFETY: every live address came from `strdup` and was not freed.
            unsafe { libc::free(ptr::with_exposed_provenance_mut::<libc::c_void>(addr)) };
        }
    }
}

impl Toolkit for FakeToolkit {
    fn argument_pointer(&self, args: RawHandle, key: &CStr) -> ArgumentLookup {
        self.count("argument_pointer");
        match self.state.borrow().objects.get(&id_of(args)) {
            Some(FakeObject::ArgumentMap { entries }) => entries
                .iter()
                .find(|(k, _)| k.as_c_str() == key)
                .map_or(ArgumentLookup::Missing, |(_, v)| ArgumentLookup::Found(*v)),
            _ => ArgumentLookup::Malformed,
        }
    }

    fn last_error(&self) -> i32 {
        self.state.borrow().last_error
    }

    fn object_to_cstring(&self, object: RawHandle) -> Option<RawHandle> {
        let text = match self.state.borrow().objects.get(&id_of(object)) {
            Some(FakeObject::Value { text, .. }) => text.clone(),
            _ => return None,
        };
        Some(self.insert(FakeObject::Text { text, refs: 1 }))
    }

    fn string_valueof(&self, string: RawHandle) -> *const c_char {
        match self.state.borrow().objects.get(&id_of(string)) {
            Some(FakeObject::Text { text, .. }) => text.as_ptr(),
            _ => ptr::null(),
        }
    }

    fn string_unref(&self, string: RawHandle) {
        self.unref(string);
    }

    fn object_unref(&self, object: RawHandle) {
        self.unref(object);
    }

    fn alloc_string(&self, s: &CStr) -> *mut c_char {
        // SAFETY: `s` is null-terminated.
        let ptr = unsafe { libc::strdup(s.as_ptr()) };
        if !ptr.is_null() {
            let mut state = self.state.borrow_mut();
            state.live_strings.insert(ptr.expose_provenance());
            state.allocs.allocated += 1;
        }
        ptr
    }

    unsafe fn free_string(&self, ptr: *mut c_char) {
        let mut state = self.state.borrow_mut();
        if state.live_strings.remove(&ptr.addr()) {
            state.allocs.freed += 1;
            // SAFETY: allocated by `strdup` above and not yet freed.
            unsafe { libc::free(ptr.cast()) };
        } else {
            state.allocs.invalid_frees += 1;
        }
    }

    fn item_name(&self, item: RawHandle) -> *const c_char {
        self.count("item_name");
        match self.state.borrow().objects.get(&id_of(item)) {
            Some(FakeObject::Item { name, .. }) => name.as_ptr(),
            _ => ptr::null(),
        }
    }

    fn item_object_id(&self, item: RawHandle) -> *const c_char {
        match self.state.borrow().objects.get(&id_of(item)) {
            Some(FakeObject::Item { object_id, .. }) => object_id.as_ptr(),
            _ => ptr::null(),
        }
    }

    fn item_object_type(&self, item: RawHandle) -> i32 {
        match self.state.borrow().objects.get(&id_of(item)) {
            Some(FakeObject::Item { object_type, .. }) => *object_type,
            _ => -1,
        }
    }

    fn item_access_mode(&self, item: RawHandle) -> u32 {
        match self.state.borrow().objects.get(&id_of(item)) {
            Some(FakeObject::Item { access_mode, .. }) => *access_mode,
            _ => 0,
        }
    }

    fn item_value(&self, item: RawHandle) -> Option<RawHandle> {
        self.count("item_value");
        let (text, fail) = {
            let state = self.state.borrow();
            let text = match state.objects.get(&id_of(item)) {
                Some(FakeObject::Item { value, .. }) => value.clone(),
                _ => None,
            };
            (text, state.fail_item_value)
        };

        self.state.borrow_mut().last_error = fail.unwrap_or(0);
        // On failure the toolkit may still hand out a stale object.
        let text = match (text, fail) {
            (Some(text), _) => text,
            (None, Some(_)) => CString::default(),
            (None, None) => return None,
        };
        Some(self.insert(FakeObject::Value { text, refs: 1 }))
    }

    fn item_update_value(&self, item: RawHandle, content: &CStr) -> i32 {
        let status = self.state.borrow().setter_status;
        if status != 0 {
            return status;
        }
        match self.state.borrow_mut().objects.get_mut(&id_of(item)) {
            Some(FakeObject::Item { value, .. }) => {
                *value = Some(content.to_owned());
                0
            }
            _ => ErrorCode::NullArg.as_raw(),
        }
    }

    fn menu_name(&self, menu: RawHandle) -> *const c_char {
        self.count("menu_name");
        match self.state.borrow().objects.get(&id_of(menu)) {
            Some(FakeObject::Menu { name, .. }) => name.as_ptr(),
            _ => ptr::null(),
        }
    }

    fn menu_object_id(&self, menu: RawHandle) -> *const c_char {
        match self.state.borrow().objects.get(&id_of(menu)) {
            Some(FakeObject::Menu { object_id, .. }) => object_id.as_ptr(),
            _ => ptr::null(),
        }
    }

    fn menu_type(&self, menu: RawHandle) -> i32 {
        match self.state.borrow().objects.get(&id_of(menu)) {
            Some(FakeObject::Menu { menu_type, .. }) => *menu_type,
            _ => -1,
        }
    }

    fn cfg_get_value(&self, cfg: RawHandle, section: &CStr, key: &CStr) -> Option<RawHandle> {
        let (section, key) = (lossy(section), lossy(key));
        let text = match self.state.borrow().objects.get(&id_of(cfg)) {
            Some(FakeObject::Config { entries }) => entries
                .iter()
                .find(|(s, k, _)| *s == section && *k == key)
                .map(|(_, _, v)| owned_c(v)),
            _ => None,
        }?;
        Some(self.insert(FakeObject::Value { text, refs: 1 }))
    }

    fn messagebox(&self, _xpp: RawHandle, kind: MsgBoxType, title: &CStr, message: &CStr) -> i32 {
        self.state.borrow_mut().dialogs.push(RecordedDialog::MessageBox {
            kind,
            title: lossy(title),
            message: lossy(message),
        });
        self.pass_gate();
        0
    }

    fn single_run(&self, _xpp: RawHandle, jts: &CStr) -> i32 {
        self.state
            .borrow_mut()
            .dialogs
            .push(RecordedDialog::SingleRun { jts: lossy(jts) });
        self.pass_gate();
        self.state.borrow().dialog_result
    }

    fn log(&self, level: LogLevel, function: &CStr, line: i32, content: &CStr) {
        self.state.borrow_mut().logs.push(LogRecord {
            level,
            function: lossy(function),
            line: u32::try_from(line).unwrap_or(0),
            content: lossy(content),
        });
    }

    fn runtime_flag(&self, _xpp: RawHandle, flag: RuntimeFlag) -> bool {
        self.state.borrow().flags.get(&flag).copied().unwrap_or(false)
    }

    fn set_runtime_flag(&self, _xpp: RawHandle, flag: RuntimeFlag, value: bool) -> i32 {
        if !flag.is_writable() {
            return UNSUPPORTED_STATUS;
        }
        let mut state = self.state.borrow_mut();
        if state.setter_status != 0 {
            return state.setter_status;
        }
        state.flags.insert(flag, value);
        0
    }

    fn inactivity_timeout(&self, _xpp: RawHandle) -> i32 {
        self.state.borrow().inactivity_timeout
    }

    fn set_inactivity_timeout(&self, _xpp: RawHandle, seconds: u32) -> i32 {
        let mut state = self.state.borrow_mut();
        if state.setter_status != 0 {
            return state.setter_status;
        }
        state.inactivity_timeout = i32::try_from(seconds).unwrap_or(i32::MAX);
        0
    }

    fn exit_value(&self, _xpp: RawHandle) -> i32 {
        self.state.borrow().exit_value
    }

    fn caller_name(&self, _xpp: RawHandle) -> *const c_char {
        self.state
            .borrow()
            .caller_name
            .as_ref()
            .map_or(ptr::null(), |name| name.as_ptr())
    }
}

// ============================================================================
// DialogGate
// ============================================================================

#[derive(Default)]
struct GateState {
    entered: usize,
    released: bool,
}

/// Holds fake dialogs open until released from another thread.
///
/// The toolkit's dialogs block the calling thread until the user closes
/// them; a gated [`FakeToolkit`] reproduces that so tests can observe it.
#[derive(Clone, Default)]
pub struct DialogGate {
    inner: Arc<(Mutex<GateState>, Condvar)>,
}

impl DialogGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn pass(&self) {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock().unwrap_or_else(PoisonError::into_inner);
        state.entered += 1;
        cvar.notify_all();
        while !state.released {
            state = cvar.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Wait until some dialog is being held. Returns `false` on timeout.
    pub fn wait_entered(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let state = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (state, _) = cvar
            .wait_timeout_while(state, timeout, |s| s.entered == 0)
            .unwrap_or_else(PoisonError::into_inner);
        state.entered > 0
    }

    pub fn entered(&self) -> usize {
        let (lock, _) = &*self.inner;
        lock.lock().unwrap_or_else(PoisonError::into_inner).entered
    }

    /// Let every held and future dialog complete.
    pub fn release(&self) {
        let (lock, cvar) = &*self.inner;
        lock.lock().unwrap_or_else(PoisonError::into_inner).released = true;
        cvar.notify_all();
    }
}

// ============================================================================
// RecordingSink
// ============================================================================

/// Thread-safe [`LogSink`] that keeps every record, for use with
/// [`crate::log::ToolkitLayer`].
#[derive(Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for RecordingSink {
    fn write(&self, level: LogLevel, function: &str, line: u32, content: &str) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogRecord {
                level,
                function: function.to_string(),
                line,
                content: content.to_string(),
            });
    }
}
