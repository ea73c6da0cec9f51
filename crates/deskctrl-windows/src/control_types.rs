//! Map UIA ControlType IDs to [`ControlType`].

use deskctrl_core::ControlType;

// UIA ControlType IDs (the 50000 series).
// See: https://learn.microsoft.com/en-us/windows/win32/winauto/uiauto-controltype-ids
const UIA_BUTTON: i32 = 50000;
const UIA_CALENDAR: i32 = 50001;
const UIA_CHECKBOX: i32 = 50002;
const UIA_COMBOBOX: i32 = 50003;
const UIA_EDIT: i32 = 50004;
const UIA_HYPERLINK: i32 = 50005;
const UIA_IMAGE: i32 = 50006;
const UIA_LISTITEM: i32 = 50007;
const UIA_LIST: i32 = 50008;
const UIA_MENU: i32 = 50009;
const UIA_MENUBAR: i32 = 50010;
const UIA_MENUITEM: i32 = 50011;
const UIA_PROGRESSBAR: i32 = 50012;
const UIA_RADIOBUTTON: i32 = 50013;
const UIA_SCROLLBAR: i32 = 50014;
const UIA_SLIDER: i32 = 50015;
const UIA_SPINNER: i32 = 50016;
const UIA_STATUSBAR: i32 = 50017;
const UIA_TAB: i32 = 50018;
const UIA_TABITEM: i32 = 50019;
const UIA_TEXT: i32 = 50020;
const UIA_TOOLBAR: i32 = 50021;
const UIA_TOOLTIP: i32 = 50022;
const UIA_TREE: i32 = 50023;
const UIA_TREEITEM: i32 = 50024;
const UIA_CUSTOM: i32 = 50025;
const UIA_GROUP: i32 = 50026;
const UIA_THUMB: i32 = 50027;
const UIA_DATAGRID: i32 = 50028;
const UIA_DATAITEM: i32 = 50029;
const UIA_DOCUMENT: i32 = 50030;
const UIA_SPLITBUTTON: i32 = 50031;
const UIA_WINDOW: i32 = 50032;
const UIA_PANE: i32 = 50033;
const UIA_HEADER: i32 = 50034;
const UIA_HEADERITEM: i32 = 50035;
const UIA_TABLE: i32 = 50036;
const UIA_TITLEBAR: i32 = 50037;
const UIA_SEPARATOR: i32 = 50038;

/// Map a UIA `ControlType` integer to the core [`ControlType`].
pub fn from_uia_id(ct: i32) -> ControlType {
    match ct {
        UIA_BUTTON => ControlType::Button,
        UIA_CALENDAR => ControlType::Calendar,
        UIA_CHECKBOX => ControlType::CheckBox,
        UIA_COMBOBOX => ControlType::ComboBox,
        UIA_EDIT => ControlType::Edit,
        UIA_HYPERLINK => ControlType::Hyperlink,
        UIA_IMAGE => ControlType::Image,
        UIA_LISTITEM => ControlType::ListItem,
        UIA_LIST => ControlType::List,
        UIA_MENU => ControlType::Menu,
        UIA_MENUBAR => ControlType::MenuBar,
        UIA_MENUITEM => ControlType::MenuItem,
        UIA_PROGRESSBAR => ControlType::ProgressBar,
        UIA_RADIOBUTTON => ControlType::RadioButton,
        UIA_SCROLLBAR => ControlType::ScrollBar,
        UIA_SLIDER => ControlType::Slider,
        UIA_SPINNER => ControlType::Spinner,
        UIA_STATUSBAR => ControlType::StatusBar,
        UIA_TAB => ControlType::Tab,
        UIA_TABITEM => ControlType::TabItem,
        UIA_TEXT => ControlType::Text,
        UIA_TOOLBAR => ControlType::ToolBar,
        UIA_TOOLTIP => ControlType::ToolTip,
        UIA_TREE => ControlType::Tree,
        UIA_TREEITEM => ControlType::TreeItem,
        UIA_CUSTOM => ControlType::Custom,
        UIA_GROUP => ControlType::Group,
        UIA_THUMB => ControlType::Thumb,
        UIA_DATAGRID => ControlType::DataGrid,
        UIA_DATAITEM => ControlType::DataItem,
        UIA_DOCUMENT => ControlType::Document,
        UIA_SPLITBUTTON => ControlType::SplitButton,
        UIA_WINDOW => ControlType::Window,
        UIA_PANE => ControlType::Pane,
        UIA_HEADER => ControlType::Header,
        UIA_HEADERITEM => ControlType::HeaderItem,
        UIA_TABLE => ControlType::Table,
        UIA_TITLEBAR => ControlType::TitleBar,
        UIA_SEPARATOR => ControlType::Separator,
        _ => ControlType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_control_types() {
        assert_eq!(from_uia_id(50000), ControlType::Button);
        assert_eq!(from_uia_id(50004), ControlType::Edit);
        assert_eq!(from_uia_id(50032), ControlType::Window);
    }

    #[test]
    fn unknown_control_type() {
        assert_eq!(from_uia_id(99999), ControlType::Unknown);
    }
}
