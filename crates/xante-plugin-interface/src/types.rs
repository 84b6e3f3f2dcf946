//! Layout-stable enums exchanged with the toolkit as plain integers.
//!
//! The toolkit is the source of truth for which values are valid. `from_raw`
//! only reports unknown discriminants; it never clamps or guesses.

use abi_stable::StableAbi;

// ============================================================================
// ObjectType - Kind of UI item
// ============================================================================

/// Kind of a UI item (`xante_item_object_type`). Numbering starts at 1.
#[repr(i32)]
#[derive(StableAbi, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectType {
    MenuReference = 1,
    InputInt = 2,
    InputFloat = 3,
    InputDate = 4,
    InputString = 5,
    InputPasswd = 6,
    InputTime = 7,
    Calendar = 8,
    Timebox = 9,
    RadioChecklist = 10,
    Checklist = 11,
    YesNo = 12,
    DynamicMenuReference = 13,
    DeleteDynamicMenuItem = 14,
    AddDynamicMenuItem = 15,
    Custom = 16,
    Progress = 17,
    SpinnerSync = 18,
    SpinnerDots = 19,
    Range = 20,
    FileSelect = 21,
    DirSelect = 22,
    FileView = 23,
    Tailbox = 24,
    Scrolltext = 25,
    UpdateObject = 26,
    Inputscroll = 27,
    Mixedform = 28,
    Buildlist = 29,
    Spreadsheet = 30,
    Clock = 31,
}

impl ObjectType {
    /// Every object type, in discriminant order.
    pub const ALL: [ObjectType; 31] = [
        ObjectType::MenuReference,
        ObjectType::InputInt,
        ObjectType::InputFloat,
        ObjectType::InputDate,
        ObjectType::InputString,
        ObjectType::InputPasswd,
        ObjectType::InputTime,
        ObjectType::Calendar,
        ObjectType::Timebox,
        ObjectType::RadioChecklist,
        ObjectType::Checklist,
        ObjectType::YesNo,
        ObjectType::DynamicMenuReference,
        ObjectType::DeleteDynamicMenuItem,
        ObjectType::AddDynamicMenuItem,
        ObjectType::Custom,
        ObjectType::Progress,
        ObjectType::SpinnerSync,
        ObjectType::SpinnerDots,
        ObjectType::Range,
        ObjectType::FileSelect,
        ObjectType::DirSelect,
        ObjectType::FileView,
        ObjectType::Tailbox,
        ObjectType::Scrolltext,
        ObjectType::UpdateObject,
        ObjectType::Inputscroll,
        ObjectType::Mixedform,
        ObjectType::Buildlist,
        ObjectType::Spreadsheet,
        ObjectType::Clock,
    ];

    pub fn from_raw(raw: i32) -> Option<Self> {
        if raw < 1 {
            return None;
        }

        Self::ALL.get((raw - 1) as usize).copied()
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Whether the item edits its value through a text input box.
    pub fn is_input(self) -> bool {
        matches!(
            self,
            ObjectType::InputInt
                | ObjectType::InputFloat
                | ObjectType::InputDate
                | ObjectType::InputString
                | ObjectType::InputPasswd
                | ObjectType::InputTime
        )
    }
}

// ============================================================================
// MenuType
// ============================================================================

#[repr(i32)]
#[derive(StableAbi, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MenuType {
    Default = 0,
    Dynamic = 1,
}

impl MenuType {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(MenuType::Default),
            1 => Some(MenuType::Dynamic),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

// ============================================================================
// MsgBoxType
// ============================================================================

/// Severity shown by `xante_dlg_messagebox_ex`.
#[repr(i32)]
#[derive(StableAbi, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MsgBoxType {
    Info = 0,
    Warning = 1,
    Error = 2,
}

impl MsgBoxType {
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

// ============================================================================
// ExitValue
// ============================================================================

/// How a toolkit session (or a single-run dialog) ended.
#[repr(i32)]
#[derive(StableAbi, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExitValue {
    /// Internal error.
    Error = -1,
    /// Ended without modifications.
    Ok = 0,
    /// Ended with the user saving modifications.
    ConfigSaved = 1,
    /// Ended with unsaved modifications.
    ConfigUnsaved = 2,
    /// Ended by inactivity timeout.
    Timeout = 3,
}

impl ExitValue {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            -1 => Some(ExitValue::Error),
            0 => Some(ExitValue::Ok),
            1 => Some(ExitValue::ConfigSaved),
            2 => Some(ExitValue::ConfigUnsaved),
            3 => Some(ExitValue::Timeout),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

// ============================================================================
// LogLevel
// ============================================================================

/// Levels understood by `xante_log_ex` (libcollections' `cl_log_level`).
#[repr(i32)]
#[derive(StableAbi, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Off = 0,
    Emerg = 1,
    Alert = 2,
    Criti = 3,
    Error = 4,
    Warng = 5,
    Notice = 6,
    Info = 7,
    Debug = 8,
}

impl LogLevel {
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

// ============================================================================
// ErrorCode - the toolkit's last-error codes
// ============================================================================

/// Values returned by `xante_get_last_error`.
#[repr(i32)]
#[derive(StableAbi, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError = 0,
    NoMemory,
    NullArg,
    InvalidArg,
    WrongJtfFormat,
    JtfNoGeneralObject,
    JtfNoInfo,
    JtfInfoWithoutValue,
    JtfNoItemsObject,
    JtfNoMenusObject,
    JtfNoUiObject,
    UiNotInitialized,
    JtfNoRanges,
    JtfNoConfigObject,
    JtfNoInternalObject,
    JtfNoApplicationObject,
    PluginLoadError,
    PluginWithoutInfo,
    PluginInitError,
    NoEnvDbPath,
    DbAccessFailed,
    UnableToSaveJxdbi,
    DbOpen,
    DbUserNotFound,
    DbGroupNotFound,
    DbApplicationNotFound,
    DbMultipleUserEntries,
    DbMultipleGroupEntries,
    DbMultipleApplicationEntries,
    UnableToRetrieveLoginInfo,
    DbExists,
    JtfNoDynamicObject,
    JtfNoOriginObject,
    JtfWrongObjectType,
    UnknownEventDataType,
    InstanceAlreadyRunning,
    InvalidInternalConversion,
    MjtfNoObject,
    MenuNotFound,
    MenuHeadNotFound,
    ItemNotFound,
    InvalidFormJson,
    JtfNoDataObject,
    UnknownObjectPrefix,
    ItemHasNoInternalValue,
}

impl ErrorCode {
    const ALL: [ErrorCode; 45] = [
        ErrorCode::NoError,
        ErrorCode::NoMemory,
        ErrorCode::NullArg,
        ErrorCode::InvalidArg,
        ErrorCode::WrongJtfFormat,
        ErrorCode::JtfNoGeneralObject,
        ErrorCode::JtfNoInfo,
        ErrorCode::JtfInfoWithoutValue,
        ErrorCode::JtfNoItemsObject,
        ErrorCode::JtfNoMenusObject,
        ErrorCode::JtfNoUiObject,
        ErrorCode::UiNotInitialized,
        ErrorCode::JtfNoRanges,
        ErrorCode::JtfNoConfigObject,
        ErrorCode::JtfNoInternalObject,
        ErrorCode::JtfNoApplicationObject,
        ErrorCode::PluginLoadError,
        ErrorCode::PluginWithoutInfo,
        ErrorCode::PluginInitError,
        ErrorCode::NoEnvDbPath,
        ErrorCode::DbAccessFailed,
        ErrorCode::UnableToSaveJxdbi,
        ErrorCode::DbOpen,
        ErrorCode::DbUserNotFound,
        ErrorCode::DbGroupNotFound,
        ErrorCode::DbApplicationNotFound,
        ErrorCode::DbMultipleUserEntries,
        ErrorCode::DbMultipleGroupEntries,
        ErrorCode::DbMultipleApplicationEntries,
        ErrorCode::UnableToRetrieveLoginInfo,
        ErrorCode::DbExists,
        ErrorCode::JtfNoDynamicObject,
        ErrorCode::JtfNoOriginObject,
        ErrorCode::JtfWrongObjectType,
        ErrorCode::UnknownEventDataType,
        ErrorCode::InstanceAlreadyRunning,
        ErrorCode::InvalidInternalConversion,
        ErrorCode::MjtfNoObject,
        ErrorCode::MenuNotFound,
        ErrorCode::MenuHeadNotFound,
        ErrorCode::ItemNotFound,
        ErrorCode::InvalidFormJson,
        ErrorCode::JtfNoDataObject,
        ErrorCode::UnknownObjectPrefix,
        ErrorCode::ItemHasNoInternalValue,
    ];

    pub fn from_raw(raw: i32) -> Option<Self> {
        if raw < 0 {
            return None;
        }

        Self::ALL.get(raw as usize).copied()
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn is_error(self) -> bool {
        self != ErrorCode::NoError
    }
}

// ============================================================================
// AccessMode - item access bit set
// ============================================================================

/// Access mode of an item for the logged user. Copied verbatim from the
/// toolkit; unknown bits are preserved.
#[repr(transparent)]
#[derive(StableAbi, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct AccessMode(pub u32);

impl AccessMode {
    pub const HIDDEN: AccessMode = AccessMode(0);
    pub const VIEW: AccessMode = AccessMode(1 << 0);
    pub const EDIT: AccessMode = AccessMode(1 << 1);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_hidden(self) -> bool {
        self.0 == 0
    }

    pub fn can_view(self) -> bool {
        self.0 & Self::VIEW.0 != 0
    }

    pub fn can_edit(self) -> bool {
        self.0 & Self::EDIT.0 != 0
    }
}
