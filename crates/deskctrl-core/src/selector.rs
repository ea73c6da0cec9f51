//! Selectors — composed predicates over live element properties.

use anyhow::{bail, Result};

use crate::contract::UiaLocator;
use crate::element::{ControlType, UiElement};

/// One step of a descendant path: a control type with an optional 1-based
/// index among same-typed siblings (e.g. `button[2]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub control_type: ControlType,
    pub index: Option<usize>,
}

impl std::fmt::Display for PathStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{}]", self.control_type, i),
            None => write!(f, "{}", self.control_type),
        }
    }
}

/// Composed element predicate. Every non-empty field must match (AND).
///
/// Ephemeral: built per resolution call from a tool argument string or a
/// contract locator, never persisted.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    pub automation_id: Option<String>,
    pub name: Option<String>,
    pub class_name: Option<String>,
    pub control_type: Option<ControlType>,
    /// Stepwise descent from the window element, applied before the
    /// property predicate. Only reachable through contract locators.
    pub path: Vec<PathStep>,
}

impl Selector {
    /// Parse the tool-facing mini-language: `key=value;key=value;...`
    ///
    /// Recognized keys: `automationId`, `name`, `className`, `controlType`.
    /// Unknown keys and malformed pairs are errors, not silent no-matches.
    pub fn parse(input: &str) -> Result<Selector> {
        let mut sel = Selector::default();
        let mut any = false;
        for pair in input.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let Some((key, value)) = pair.split_once('=') else {
                bail!("invalid selector segment {pair:?}: expected key=value");
            };
            let key = key.trim();
            let value = value.trim();
            if value.is_empty() {
                bail!("invalid selector segment {pair:?}: empty value");
            }
            match key {
                "automationId" => sel.automation_id = Some(value.into()),
                "name" => sel.name = Some(value.into()),
                "className" => sel.class_name = Some(value.into()),
                "controlType" => {
                    let Some(ct) = ControlType::parse(value) else {
                        bail!("unrecognized controlType {value:?} in selector");
                    };
                    sel.control_type = Some(ct);
                }
                other => bail!(
                    "unknown selector key {other:?} (expected automationId, name, className, or controlType)"
                ),
            }
            any = true;
        }
        if !any {
            bail!("empty selector: at least one of automationId, name, className, controlType is required");
        }
        Ok(sel)
    }

    /// Build a selector from a contract UIA locator.
    pub fn from_uia(locator: &UiaLocator) -> Result<Selector> {
        let mut sel = Selector {
            automation_id: none_if_blank(&locator.automation_id),
            name: none_if_blank(&locator.name),
            class_name: None,
            control_type: None,
            path: Vec::new(),
        };
        if let Some(ct) = none_if_blank(&locator.control_type) {
            let Some(parsed) = ControlType::parse(&ct) else {
                bail!("unrecognized controlType {ct:?} in uia locator");
            };
            sel.control_type = Some(parsed);
        }
        if let Some(path) = none_if_blank(&locator.path) {
            sel.path = parse_path(&path)?;
        }
        if sel.is_empty() {
            bail!("uia locator has no usable field");
        }
        Ok(sel)
    }

    /// True when no property field and no path is set.
    pub fn is_empty(&self) -> bool {
        !self.has_fields() && self.path.is_empty()
    }

    /// True when at least one property field (not counting path) is set.
    pub fn has_fields(&self) -> bool {
        self.automation_id.is_some()
            || self.name.is_some()
            || self.class_name.is_some()
            || self.control_type.is_some()
    }

    /// Apply the property predicate to a live element. Comparisons are
    /// exact; fuzzy matching belongs to the OCR locator, not here.
    pub fn matches(&self, el: &dyn UiElement) -> bool {
        if !self.has_fields() {
            return false;
        }
        if let Some(id) = &self.automation_id {
            if el.automation_id() != *id {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if el.name() != *name {
                return false;
            }
        }
        if let Some(class) = &self.class_name {
            if el.class_name() != *class {
                return false;
            }
        }
        if let Some(ct) = self.control_type {
            if el.control_type() != ct {
                return false;
            }
        }
        true
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if !self.path.is_empty() {
            let steps: Vec<String> = self.path.iter().map(|s| s.to_string()).collect();
            parts.push(format!("path={}", steps.join("/")));
        }
        if let Some(v) = &self.automation_id {
            parts.push(format!("automationId={v}"));
        }
        if let Some(v) = &self.name {
            parts.push(format!("name={v}"));
        }
        if let Some(v) = &self.class_name {
            parts.push(format!("className={v}"));
        }
        if let Some(v) = self.control_type {
            parts.push(format!("controlType={v}"));
        }
        f.write_str(&parts.join(";"))
    }
}

/// Parse a `/`-separated descendant path: `pane/toolbar/button[2]`.
fn parse_path(path: &str) -> Result<Vec<PathStep>> {
    let mut steps = Vec::new();
    for raw in path.split('/') {
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("empty step in uia path {path:?}");
        }
        let (type_part, index) = match raw.split_once('[') {
            Some((t, rest)) => {
                let Some(num) = rest.strip_suffix(']') else {
                    bail!("malformed path step {raw:?}: missing closing bracket");
                };
                let n: usize = num
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("malformed path step {raw:?}: bad index"))?;
                if n == 0 {
                    bail!("malformed path step {raw:?}: index is 1-based");
                }
                (t.trim(), Some(n))
            }
            None => (raw, None),
        };
        let Some(ct) = ControlType::parse(type_part) else {
            bail!("unrecognized control type {type_part:?} in path step {raw:?}");
        };
        steps.push(PathStep { control_type: ct, index });
    }
    Ok(steps)
}

fn none_if_blank(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_keys() {
        let sel = Selector::parse("automationId=btnOk; name=OK;className=Button32;controlType=button").unwrap();
        assert_eq!(sel.automation_id.as_deref(), Some("btnOk"));
        assert_eq!(sel.name.as_deref(), Some("OK"));
        assert_eq!(sel.class_name.as_deref(), Some("Button32"));
        assert_eq!(sel.control_type, Some(ControlType::Button));
    }

    #[test]
    fn rejects_unknown_key() {
        let err = Selector::parse("frobnicate=yes").unwrap_err();
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn rejects_unknown_control_type() {
        let err = Selector::parse("controlType=gizmo").unwrap_err();
        assert!(err.to_string().contains("gizmo"));
    }

    #[test]
    fn rejects_empty_selector() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse(" ; ; ").is_err());
    }

    #[test]
    fn rejects_missing_equals() {
        let err = Selector::parse("name").unwrap_err();
        assert!(err.to_string().contains("key=value"));
    }

    #[test]
    fn trailing_semicolon_ok() {
        let sel = Selector::parse("name=Save;").unwrap();
        assert_eq!(sel.name.as_deref(), Some("Save"));
    }

    #[test]
    fn path_parsing() {
        let steps = parse_path("pane/toolbar/button[2]").unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0], PathStep { control_type: ControlType::Pane, index: None });
        assert_eq!(steps[2], PathStep { control_type: ControlType::Button, index: Some(2) });
    }

    #[test]
    fn path_rejects_zero_index() {
        assert!(parse_path("button[0]").is_err());
    }

    #[test]
    fn path_rejects_bad_type() {
        assert!(parse_path("pane/widget").is_err());
    }

    #[test]
    fn from_uia_requires_usable_field() {
        let empty = UiaLocator::default();
        assert!(Selector::from_uia(&empty).is_err());

        let loc = UiaLocator { automation_id: Some("save".into()), ..Default::default() };
        let sel = Selector::from_uia(&loc).unwrap();
        assert_eq!(sel.automation_id.as_deref(), Some("save"));
    }

    #[test]
    fn from_uia_bad_control_type_is_error() {
        let loc = UiaLocator { control_type: Some("gizmo".into()), ..Default::default() };
        assert!(Selector::from_uia(&loc).is_err());
    }

    #[test]
    fn display_round_trip() {
        let sel = Selector::parse("name=OK;controlType=button").unwrap();
        let shown = sel.to_string();
        assert!(shown.contains("name=OK"));
        assert!(shown.contains("controlType=button"));
    }
}
