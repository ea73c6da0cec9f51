//! Locator contract model — the declarative map of an application's windows,
//! controls, and assertions.
//!
//! Loaded once, validated once, then held read-only for the session. Nothing
//! in here touches the live desktop.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Root contract document.
///
/// Every field is serde-defaulted so a partial or malformed document still
/// deserializes; the validator reports what is missing instead of the parser
/// rejecting the file outright.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    #[serde(default)]
    pub contract_version: String,
    #[serde(default)]
    pub app: AppInfo,
    #[serde(default)]
    pub windows: BTreeMap<String, WindowSpec>,
    #[serde(default)]
    pub controls: BTreeMap<String, ControlSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertions: Option<BTreeMap<String, AssertionSpec>>,
}

/// Target-application identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub process_names: Vec<String>,
}

/// How to find a live top-level window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl WindowSpec {
    /// At least one of the three locator fields is set (and non-blank).
    pub fn has_locator(&self) -> bool {
        is_set(&self.title_contains) || is_set(&self.title_regex) || is_set(&self.class_name)
    }
}

/// How to find a live control inside a window, with up to three locator
/// strategies in decreasing reliability: UIA, OCR text, fixed offset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub window_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uia: Option<UiaLocator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrLocator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_coords: Option<FallbackCoords>,
}

impl ControlSpec {
    /// At least one usable locator strategy is present.
    pub fn has_locator(&self) -> bool {
        self.uia.as_ref().is_some_and(UiaLocator::has_field)
            || self.ocr.as_ref().is_some_and(|o| is_set(&o.text))
            || self.fallback_coords.is_some()
    }
}

/// UIA selector fields. Counts as a locator when any subfield is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiaLocator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl UiaLocator {
    pub fn has_field(&self) -> bool {
        is_set(&self.automation_id)
            || is_set(&self.name)
            || is_set(&self.control_type)
            || is_set(&self.path)
    }
}

/// OCR text locator: search the screen for `text`, optionally the Nth
/// occurrence (1-based).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrLocator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<u32>,
}

/// Last-resort fixed offset from the resolved window's origin.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackCoords {
    #[serde(default)]
    pub offset_x: i32,
    #[serde(default)]
    pub offset_y: i32,
}

/// Post-step assertion. All fields optional; a fully empty assertion draws a
/// validation warning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_title_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_exists: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipboard_contains: Option<String>,
}

impl AssertionSpec {
    pub fn is_empty(&self) -> bool {
        !is_set(&self.ocr_text)
            && !is_set(&self.window_title_contains)
            && !is_set(&self.log_pattern)
            && !is_set(&self.file_exists)
            && !is_set(&self.clipboard_contains)
    }
}

impl Contract {
    /// Case-insensitive window lookup.
    pub fn window(&self, id: &str) -> Option<(&str, &WindowSpec)> {
        self.windows
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(id))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Case-insensitive control lookup.
    pub fn control(&self, id: &str) -> Option<(&str, &ControlSpec)> {
        self.controls
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(id))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Case-insensitive assertion lookup.
    pub fn assertion(&self, id: &str) -> Option<(&str, &AssertionSpec)> {
        self.assertions
            .as_ref()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(id))
            .map(|(k, v)| (k.as_str(), v))
    }
}

fn is_set(v: &Option<String>) -> bool {
    v.as_deref().is_some_and(|s| !s.trim().is_empty())
}

// ── Loading ────────────────────────────────────────────────────────────────

/// Load a contract from a JSON or YAML file.
///
/// The format is chosen by extension; with no (or an unknown) extension, JSON
/// is tried first, then YAML.
pub fn load_contract(path: &Path) -> Result<Contract> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read contract file {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => parse_json(&contents, path),
        Some("yaml") | Some("yml") => parse_yaml(&contents, path),
        _ => parse_json(&contents, path).or_else(|json_err| {
            parse_yaml(&contents, path).map_err(|yaml_err| {
                json_err.context(format!("also failed as YAML: {yaml_err:#}"))
            })
        }),
    }
}

fn parse_json(contents: &str, path: &Path) -> Result<Contract> {
    serde_json::from_str(contents)
        .with_context(|| format!("invalid JSON contract {}", path.display()))
}

fn parse_yaml(contents: &str, path: &Path) -> Result<Contract> {
    serde_yaml::from_str(contents)
        .with_context(|| format!("invalid YAML contract {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "contractVersion": "1.0",
            "app": { "name": "Notepad", "processNames": ["notepad.exe"] },
            "windows": {
                "main": { "titleRegex": "Notepad" }
            },
            "controls": {
                "save": {
                    "windowId": "main",
                    "uia": { "automationId": "btnSave", "controlType": "button" },
                    "ocr": { "text": "Save" },
                    "fallbackCoords": { "offsetX": 40, "offsetY": 12 }
                }
            },
            "assertions": {
                "saved": { "windowTitleContains": "saved" }
            }
        }"#
    }

    #[test]
    fn parses_camel_case_json() {
        let c: Contract = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(c.contract_version, "1.0");
        assert_eq!(c.app.process_names, vec!["notepad.exe"]);
        let (_, save) = c.control("save").unwrap();
        assert_eq!(save.window_id, "main");
        let uia = save.uia.as_ref().unwrap();
        assert_eq!(uia.automation_id.as_deref(), Some("btnSave"));
        assert_eq!(save.fallback_coords.unwrap().offset_x, 40);
    }

    #[test]
    fn parses_yaml() {
        let yaml = r#"
contractVersion: "2.0"
app:
  name: Calc
windows:
  main:
    titleContains: Calculator
controls:
  one:
    windowId: main
    uia:
      name: One
"#;
        let c: Contract = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(c.contract_version, "2.0");
        assert!(c.window("MAIN").is_some(), "lookup is case-insensitive");
    }

    #[test]
    fn partial_document_still_parses() {
        let c: Contract = serde_json::from_str("{}").unwrap();
        assert!(c.contract_version.is_empty());
        assert!(c.windows.is_empty());
    }

    #[test]
    fn case_insensitive_lookups() {
        let c: Contract = serde_json::from_str(sample_json()).unwrap();
        assert!(c.control("SAVE").is_some());
        assert!(c.window("Main").is_some());
        assert!(c.assertion("SAVED").is_some());
        assert!(c.control("missing").is_none());
    }

    #[test]
    fn locator_presence_rules() {
        let mut control = ControlSpec::default();
        assert!(!control.has_locator());
        control.ocr = Some(OcrLocator { text: Some("  ".into()), occurrence: None });
        assert!(!control.has_locator(), "blank ocr text is not a usable locator");
        control.fallback_coords = Some(FallbackCoords::default());
        assert!(control.has_locator());

        let mut win = WindowSpec::default();
        assert!(!win.has_locator());
        win.class_name = Some("Notepad".into());
        assert!(win.has_locator());
    }

    #[test]
    fn extension_autodetect_prefers_json_then_yaml() {
        let dir = std::env::temp_dir();
        let path = dir.join("deskctrl_contract_autodetect_test");
        std::fs::write(&path, "contractVersion: \"3\"\n").unwrap();
        let c = load_contract(&path).unwrap();
        assert_eq!(c.contract_version, "3");
        std::fs::remove_file(&path).ok();
    }
}
