//! Assertion evaluation — post-step checks declared in the contract.

use std::path::Path;

use anyhow::Result;

use crate::contract::Contract;
use crate::element::Desktop;
use crate::ocr::{Clipboard, OcrBridge};
use crate::result::ActionResult;

/// Evaluate one contract assertion against the live collaborators.
///
/// Every set field must hold. Expected failures (text not visible, file
/// missing, clipboard mismatch) come back as failure results; only the
/// desktop enumeration itself can error.
pub fn check_assertion(
    contract: &Contract,
    assertion_id: &str,
    desktop: &dyn Desktop,
    ocr: &dyn OcrBridge,
    clipboard: &dyn Clipboard,
) -> Result<ActionResult> {
    let Some((id, assertion)) = contract.assertion(assertion_id) else {
        return Ok(ActionResult::err(format!("unknown assertion id {assertion_id:?}")));
    };
    if assertion.is_empty() {
        return Ok(ActionResult::err(format!("assertion {id:?} has no field set")));
    }

    let mut failures: Vec<String> = Vec::new();

    if let Some(text) = set_field(&assertion.ocr_text) {
        let (found, status) = ocr.find_text_on_screen(text);
        if !status.is_ok() {
            failures.push(format!("ocrText: engine failure (status {})", status.0));
        } else if !found {
            failures.push(format!("ocrText: {text:?} not visible on screen"));
        }
    }

    if let Some(needle) = set_field(&assertion.window_title_contains) {
        let needle_lower = needle.to_lowercase();
        let found = desktop
            .top_level_windows()?
            .iter()
            .any(|w| w.name().to_lowercase().contains(&needle_lower));
        if !found {
            failures.push(format!("windowTitleContains: no window title contains {needle:?}"));
        }
    }

    if set_field(&assertion.log_pattern).is_some() {
        // Host log tailing is a pass-through collaborator outside this core.
        failures.push("logPattern: no log source collaborator available here".into());
    }

    if let Some(path) = set_field(&assertion.file_exists) {
        if !Path::new(path).exists() {
            failures.push(format!("fileExists: {path:?} does not exist"));
        }
    }

    if let Some(needle) = set_field(&assertion.clipboard_contains) {
        match clipboard.read_text() {
            Ok(text) if text.contains(needle) => {}
            Ok(_) => {
                failures.push(format!("clipboardContains: clipboard does not contain {needle:?}"))
            }
            Err(e) => failures.push(format!("clipboardContains: clipboard read failed: {e:#}")),
        }
    }

    if failures.is_empty() {
        Ok(ActionResult::ok(format!("assertion {id:?} held")))
    } else {
        Ok(ActionResult::err(format!(
            "assertion {id:?} failed: {}",
            failures.join("; ")
        )))
    }
}

fn set_field(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
