//! Static contract validation.
//!
//! Runs once at load time. Accumulates every violation instead of stopping at
//! the first, so one call surfaces the full defect list. Error strings are
//! namespaced `section.id.field: message` for machine-parseable diagnostics.

use std::collections::HashMap;

use crate::contract::Contract;
use crate::element::ControlType;
use crate::limits::Limits;
use crate::selector;
use crate::window::compile_title_regex;

/// Everything wrong (and questionable) about a contract.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a candidate contract. Never fails; the report is the verdict.
pub fn validate(contract: &Contract, limits: &Limits) -> ValidationReport {
    let mut report = ValidationReport::default();
    let errors = &mut report.errors;

    if contract.contract_version.trim().is_empty() {
        errors.push("contract.contractVersion: must be non-empty".into());
    }
    if contract.app.name.trim().is_empty() {
        errors.push("app.name: must be non-empty".into());
    }
    for (i, proc) in contract.app.process_names.iter().enumerate() {
        if proc.trim().is_empty() {
            errors.push(format!("app.processNames[{i}]: entry must be non-empty"));
        }
    }

    // Windows.
    if contract.windows.is_empty() {
        errors.push("windows: at least one window is required".into());
    }
    let mut seen_windows: HashMap<String, String> = HashMap::new();
    for (id, win) in &contract.windows {
        if id.trim().is_empty() {
            errors.push("windows: window id must be non-empty".into());
        }
        if let Some(first) = seen_windows.insert(id.to_ascii_lowercase(), id.clone()) {
            errors.push(format!(
                "windows.{id}: duplicate id (differs only in case from {first:?})"
            ));
        }
        if !win.has_locator() {
            errors.push(format!(
                "windows.{id}: at least one of titleContains, titleRegex, className is required"
            ));
        }
        if let Some(pattern) = win.title_regex.as_deref().filter(|p| !p.trim().is_empty()) {
            if let Err(e) = compile_title_regex(pattern, limits) {
                errors.push(format!("windows.{id}.titleRegex: invalid regex: {e}"));
            }
        }
    }

    // Controls.
    if contract.controls.is_empty() {
        errors.push("controls: at least one control is required".into());
    }
    let mut seen_controls: HashMap<String, String> = HashMap::new();
    for (id, control) in &contract.controls {
        if id.trim().is_empty() {
            errors.push("controls: control id must be non-empty".into());
        }
        if let Some(first) = seen_controls.insert(id.to_ascii_lowercase(), id.clone()) {
            errors.push(format!(
                "controls.{id}: duplicate id (differs only in case from {first:?})"
            ));
        }
        if control.window_id.trim().is_empty() {
            errors.push(format!("controls.{id}.windowId: must be non-empty"));
        } else if !contract.windows.is_empty() && contract.window(&control.window_id).is_none() {
            // Skipped when windows is empty: the missing-windows error above
            // already covers it, and repeating it per control is noise.
            errors.push(format!(
                "controls.{id}.windowId: references unknown window {:?}",
                control.window_id
            ));
        }
        if !control.has_locator() {
            errors.push(format!(
                "controls.{id}: at least one usable locator (uia, ocr, fallbackCoords) is required"
            ));
        }
        if let Some(ocr) = &control.ocr {
            if ocr.text.as_deref().map_or(true, |t| t.trim().is_empty()) {
                errors.push(format!(
                    "controls.{id}.ocr.text: required when ocr locator is present"
                ));
            }
        }
        if let Some(uia) = &control.uia {
            if let Some(ct) = uia.control_type.as_deref().filter(|s| !s.trim().is_empty()) {
                if ControlType::parse(ct).is_none() {
                    errors.push(format!(
                        "controls.{id}.uia.controlType: unrecognized control type {ct:?}"
                    ));
                }
            }
            if uia.path.as_deref().is_some_and(|p| !p.trim().is_empty()) {
                if let Err(e) = selector::Selector::from_uia(uia) {
                    errors.push(format!("controls.{id}.uia: {e}"));
                }
            }
        }
    }

    // Assertions.
    if let Some(assertions) = &contract.assertions {
        for (id, assertion) in assertions {
            if assertion.is_empty() {
                report
                    .warnings
                    .push(format!("assertions.{id}: no assertion field set"));
            }
            if let Some(pattern) = assertion.log_pattern.as_deref().filter(|p| !p.trim().is_empty())
            {
                if let Err(e) = compile_title_regex(pattern, limits) {
                    report
                        .errors
                        .push(format!("assertions.{id}.logPattern: invalid regex: {e}"));
                }
            }
        }
    }

    report
}
