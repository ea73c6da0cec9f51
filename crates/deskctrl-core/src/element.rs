//! Element and desktop traits — platform-specific implementations live in separate crates.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Bounding rectangle of a UI element (screen coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Center of the rectangle, rounded to whole pixels.
    pub fn center(&self) -> Point {
        Point {
            x: (self.x + self.width / 2.0) as i32,
            y: (self.y + self.height / 2.0) as i32,
        }
    }
}

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Control type of a UI element, mirroring the UIA control-type set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlType {
    Button,
    Calendar,
    CheckBox,
    ComboBox,
    DataGrid,
    DataItem,
    Document,
    Edit,
    Group,
    Header,
    HeaderItem,
    Hyperlink,
    Image,
    List,
    ListItem,
    Menu,
    MenuBar,
    MenuItem,
    Pane,
    ProgressBar,
    RadioButton,
    ScrollBar,
    Separator,
    Slider,
    Spinner,
    SplitButton,
    StatusBar,
    Tab,
    TabItem,
    Table,
    Text,
    Thumb,
    TitleBar,
    ToolBar,
    ToolTip,
    Tree,
    TreeItem,
    Window,
    Custom,
    Unknown,
}

impl ControlType {
    /// Parse a control-type string from a selector or contract.
    ///
    /// The table is fixed; an unrecognized string is a selector-build error
    /// at the call site, never a silent no-match.
    pub fn parse(s: &str) -> Option<ControlType> {
        let ct = match s.trim().to_ascii_lowercase().as_str() {
            "button" => ControlType::Button,
            "calendar" => ControlType::Calendar,
            "checkbox" => ControlType::CheckBox,
            "combobox" | "dropdown" => ControlType::ComboBox,
            "datagrid" | "grid" => ControlType::DataGrid,
            "dataitem" => ControlType::DataItem,
            "document" => ControlType::Document,
            "edit" | "textbox" => ControlType::Edit,
            "group" => ControlType::Group,
            "header" => ControlType::Header,
            "headeritem" => ControlType::HeaderItem,
            "hyperlink" | "link" => ControlType::Hyperlink,
            "image" => ControlType::Image,
            "list" => ControlType::List,
            "listitem" => ControlType::ListItem,
            "menu" => ControlType::Menu,
            "menubar" => ControlType::MenuBar,
            "menuitem" => ControlType::MenuItem,
            "pane" => ControlType::Pane,
            "progressbar" => ControlType::ProgressBar,
            "radiobutton" | "radio" => ControlType::RadioButton,
            "scrollbar" => ControlType::ScrollBar,
            "separator" => ControlType::Separator,
            "slider" => ControlType::Slider,
            "spinner" => ControlType::Spinner,
            "splitbutton" => ControlType::SplitButton,
            "statusbar" => ControlType::StatusBar,
            "tab" => ControlType::Tab,
            "tabitem" => ControlType::TabItem,
            "table" => ControlType::Table,
            "text" | "label" => ControlType::Text,
            "thumb" => ControlType::Thumb,
            "titlebar" => ControlType::TitleBar,
            "toolbar" => ControlType::ToolBar,
            "tooltip" => ControlType::ToolTip,
            "tree" => ControlType::Tree,
            "treeitem" => ControlType::TreeItem,
            "window" => ControlType::Window,
            "custom" => ControlType::Custom,
            _ => return None,
        };
        Some(ct)
    }

    /// Canonical lowercase name, matching the parse table.
    pub fn name(&self) -> &'static str {
        match self {
            ControlType::Button => "button",
            ControlType::Calendar => "calendar",
            ControlType::CheckBox => "checkbox",
            ControlType::ComboBox => "combobox",
            ControlType::DataGrid => "datagrid",
            ControlType::DataItem => "dataitem",
            ControlType::Document => "document",
            ControlType::Edit => "edit",
            ControlType::Group => "group",
            ControlType::Header => "header",
            ControlType::HeaderItem => "headeritem",
            ControlType::Hyperlink => "hyperlink",
            ControlType::Image => "image",
            ControlType::List => "list",
            ControlType::ListItem => "listitem",
            ControlType::Menu => "menu",
            ControlType::MenuBar => "menubar",
            ControlType::MenuItem => "menuitem",
            ControlType::Pane => "pane",
            ControlType::ProgressBar => "progressbar",
            ControlType::RadioButton => "radiobutton",
            ControlType::ScrollBar => "scrollbar",
            ControlType::Separator => "separator",
            ControlType::Slider => "slider",
            ControlType::Spinner => "spinner",
            ControlType::SplitButton => "splitbutton",
            ControlType::StatusBar => "statusbar",
            ControlType::Tab => "tab",
            ControlType::TabItem => "tabitem",
            ControlType::Table => "table",
            ControlType::Text => "text",
            ControlType::Thumb => "thumb",
            ControlType::TitleBar => "titlebar",
            ControlType::ToolBar => "toolbar",
            ControlType::ToolTip => "tooltip",
            ControlType::Tree => "tree",
            ControlType::TreeItem => "treeitem",
            ControlType::Window => "window",
            ControlType::Custom => "custom",
            ControlType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ControlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle for the Invoke capability pattern of a resolved element.
pub trait InvokeHandle {
    fn invoke(&self) -> Result<()>;
}

/// Handle for the Value capability pattern of a resolved element.
pub trait ValueHandle {
    fn set_value(&self, value: &str) -> Result<()>;
    fn value(&self) -> Result<String>;
}

/// A call-scoped reference to a live UI element.
///
/// The underlying tree is owned by the OS and the target application; it can
/// mutate at any time. Handles are created, used, and dropped within a single
/// resolution call — never persisted between tool invocations.
///
/// Property getters are lossy: a property read that fails because the
/// element vanished mid-call degrades to an empty/default value rather than
/// aborting the walk.
pub trait UiElement {
    fn name(&self) -> String;
    fn automation_id(&self) -> String;
    fn class_name(&self) -> String;
    fn control_type(&self) -> ControlType;
    fn bounding_rect(&self) -> Option<Rect>;
    fn is_enabled(&self) -> bool;
    fn is_offscreen(&self) -> bool;

    /// Direct children in the control view. Fails only when the element
    /// itself is gone; individual child read errors are the caller's to
    /// tolerate.
    fn children(&self) -> Result<Vec<Box<dyn UiElement>>>;

    /// Invoke capability, if the element supports the pattern.
    fn try_invoke(&self) -> Option<Box<dyn InvokeHandle + '_>>;

    /// Value capability, if the element supports the pattern.
    fn try_value(&self) -> Option<Box<dyn ValueHandle + '_>>;

    /// Bring the element (typically a window) into focus.
    fn focus(&self) -> Result<()>;
}

/// Entry point to the live accessibility tree.
pub trait Desktop {
    /// All current top-level windows under the accessibility root.
    fn top_level_windows(&self) -> Result<Vec<Box<dyn UiElement>>>;

    /// Human-readable provider name (e.g. "windows-uia", "mock").
    fn platform_name(&self) -> &str;
}

/// Serialized descriptor of a live element, as reported in action results
/// and tree dumps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    pub name: String,
    pub automation_id: String,
    pub class_name: String,
    pub control_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_rectangle: Option<Rect>,
    pub is_enabled: bool,
    pub is_offscreen: bool,
    /// Capability patterns the element reported support for.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub patterns: Vec<String>,
}

impl ElementInfo {
    /// Snapshot the identifying properties of a live element.
    pub fn describe(el: &dyn UiElement) -> ElementInfo {
        let mut patterns = Vec::new();
        if el.try_invoke().is_some() {
            patterns.push("invoke".into());
        }
        if el.try_value().is_some() {
            patterns.push("value".into());
        }
        ElementInfo {
            name: el.name(),
            automation_id: el.automation_id(),
            class_name: el.class_name(),
            control_type: el.control_type().name().into(),
            bounding_rectangle: el.bounding_rect(),
            is_enabled: el.is_enabled(),
            is_offscreen: el.is_offscreen(),
            patterns,
        }
    }

    /// Short identity string used in result messages.
    pub fn identity(&self) -> String {
        format!(
            "{} name={:?} automationId={:?}",
            self.control_type, self.name, self.automation_id
        )
    }
}
