//! Tool layer — thin pass-throughs from tool arguments to core operations.
//!
//! Each `*_in` function runs against an injected desktop and is what the
//! tests exercise; the platform wrappers below hand the same closure to the
//! per-call apartment worker. This is the outermost boundary of every
//! operation: unexpected native failures are caught here and converted into
//! the same structured result shape expected failures use.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Serialize;

use deskctrl_core::assertions::check_assertion;
use deskctrl_core::chain::{resolve_control, Attempt, LocatorStrategy};
use deskctrl_core::{
    apps, load_contract, resolver, validate, ActionResult, Clipboard, Desktop, Limits, OcrBridge,
    Point, Selector, TreeNode, WindowQuery,
};
use deskctrl_core::window::{find_unique_window, WindowMatch};

/// Serializable view of a fallback-chain resolution.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<LocatorStrategy>,
    pub attempts: Vec<Attempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_point: Option<Point>,
}

/// Clipboard slot for hosts where no clipboard collaborator is wired in.
struct UnavailableClipboard;

impl Clipboard for UnavailableClipboard {
    fn read_text(&self) -> Result<String> {
        bail!("no clipboard collaborator wired on this host")
    }
}

// ── Desktop-parameterized operations ───────────────────────────────────────

/// Resolve a window by title regex and report the outcome.
pub fn find_window_in(desktop: &dyn Desktop, title_regex: &str, limits: &Limits) -> Result<ActionResult> {
    let outcome = find_unique_window(desktop, &WindowQuery::from_regex(title_regex), limits)?;
    let mut result = if outcome.window.is_some() {
        ActionResult::ok(outcome.message)
    } else {
        ActionResult::err(outcome.message)
    };
    result = result.with_count(outcome.match_count);
    Ok(result)
}

/// List live top-level windows, optionally filtered to a known app's aliases.
pub fn list_windows_in(desktop: &dyn Desktop, app: Option<&str>) -> Result<Vec<WindowMatch>> {
    let known = match app {
        Some(id) => match apps::by_id(id) {
            Some(known) => Some(known),
            None => bail!("unknown app id {id:?}"),
        },
        None => None,
    };
    let mut out = Vec::new();
    for win in desktop.top_level_windows()? {
        let title = win.name();
        if title.is_empty() {
            continue;
        }
        if let Some(known) = known {
            if !apps::title_matches(known, &title) {
                continue;
            }
        }
        out.push(WindowMatch { title, class_name: win.class_name() });
    }
    Ok(out)
}

/// Find elements matching a selector string inside a window.
pub fn find_elements_in(
    desktop: &dyn Desktop,
    title_regex: &str,
    selector: &str,
    limit: usize,
    limits: &Limits,
) -> Result<ActionResult> {
    let selector = match Selector::parse(selector) {
        Ok(s) => s,
        Err(e) => return Ok(ActionResult::err(format!("invalid selector: {e:#}"))),
    };
    let outcome = find_unique_window(desktop, &WindowQuery::from_regex(title_regex), limits)?;
    let Some(window) = outcome.window else {
        return Ok(ActionResult::err(outcome.message).with_count(outcome.match_count));
    };
    let found = resolver::find(&*window, &selector, limit, limits);
    Ok(ActionResult {
        success: true,
        message: format!("found {} matching elements", found.total),
        match_count: Some(found.total),
        matches: found.matches,
    })
}

/// Resolve uniquely and invoke.
pub fn invoke_in(
    desktop: &dyn Desktop,
    title_regex: &str,
    selector: &str,
    limits: &Limits,
) -> Result<ActionResult> {
    let selector = match Selector::parse(selector) {
        Ok(s) => s,
        Err(e) => return Ok(ActionResult::err(format!("invalid selector: {e:#}"))),
    };
    let outcome = find_unique_window(desktop, &WindowQuery::from_regex(title_regex), limits)?;
    let Some(window) = outcome.window else {
        return Ok(ActionResult::err(outcome.message).with_count(outcome.match_count));
    };
    Ok(resolver::invoke(&*window, &selector, limits))
}

/// Resolve uniquely and set a value.
pub fn set_value_in(
    desktop: &dyn Desktop,
    title_regex: &str,
    selector: &str,
    value: &str,
    limits: &Limits,
) -> Result<ActionResult> {
    let selector = match Selector::parse(selector) {
        Ok(s) => s,
        Err(e) => return Ok(ActionResult::err(format!("invalid selector: {e:#}"))),
    };
    let outcome = find_unique_window(desktop, &WindowQuery::from_regex(title_regex), limits)?;
    let Some(window) = outcome.window else {
        return Ok(ActionResult::err(outcome.message).with_count(outcome.match_count));
    };
    Ok(resolver::set_value(&*window, &selector, value, limits))
}

/// Bounded diagnostic tree dump of a window.
pub fn tree_in(
    desktop: &dyn Desktop,
    title_regex: &str,
    depth: usize,
    max_children: usize,
    limits: &Limits,
) -> Result<std::result::Result<TreeNode, ActionResult>> {
    let outcome = find_unique_window(desktop, &WindowQuery::from_regex(title_regex), limits)?;
    let Some(window) = outcome.window else {
        return Ok(Err(ActionResult::err(outcome.message).with_count(outcome.match_count)));
    };
    Ok(Ok(resolver::get_tree(&*window, depth, max_children)?))
}

/// Resolve a contract control through the UIA → OCR → fallbackCoords chain.
pub fn resolve_control_in(
    desktop: &dyn Desktop,
    ocr: &dyn OcrBridge,
    contract_path: &Path,
    control_id: &str,
    limits: &Limits,
) -> Result<ChainReport> {
    let contract = load_contract(contract_path)?;
    let report = validate(&contract, limits);
    if !report.is_valid() {
        return Ok(ChainReport {
            success: false,
            message: format!("contract invalid: {}", report.errors.join("; ")),
            strategy: None,
            attempts: Vec::new(),
            action_point: None,
        });
    }
    let resolution = resolve_control(desktop, ocr, &contract, control_id, limits)?;
    Ok(ChainReport {
        success: resolution.succeeded(),
        action_point: resolution.action_point(),
        strategy: resolution.strategy,
        attempts: resolution.attempts,
        message: resolution.message,
    })
}

/// Evaluate a contract assertion.
pub fn check_assertion_in(
    desktop: &dyn Desktop,
    ocr: &dyn OcrBridge,
    contract_path: &Path,
    assertion_id: &str,
) -> Result<ActionResult> {
    let contract = load_contract(contract_path)?;
    check_assertion(&contract, assertion_id, desktop, ocr, &UnavailableClipboard)
}

// ── Platform wrappers ──────────────────────────────────────────────────────

/// Convert a worker-level error into the generic failure result. The process
/// keeps serving tool calls regardless of one call's failure.
fn catch(result: Result<ActionResult>) -> ActionResult {
    match result {
        Ok(r) => r,
        Err(e) => {
            log::error!("tool call failed: {e:#}");
            ActionResult::err(format!("unexpected failure: {e:#}"))
        }
    }
}

#[cfg(windows)]
fn host_ocr() -> impl OcrBridge {
    deskctrl_windows::TesseractOcr::new(Box::new(deskctrl_windows::GdiCapture::new()))
}

pub fn find_window(title_regex: String, limits: Limits) -> ActionResult {
    catch(deskctrl_windows::with_desktop(move |d| {
        find_window_in(d, &title_regex, &limits)
    }))
}

pub fn list_windows(app: Option<String>) -> Result<Vec<WindowMatch>> {
    deskctrl_windows::with_desktop(move |d| list_windows_in(d, app.as_deref()))
}

pub fn find_elements(title_regex: String, selector: String, limit: usize, limits: Limits) -> ActionResult {
    catch(deskctrl_windows::with_desktop(move |d| {
        find_elements_in(d, &title_regex, &selector, limit, &limits)
    }))
}

pub fn invoke(title_regex: String, selector: String, limits: Limits) -> ActionResult {
    catch(deskctrl_windows::with_desktop(move |d| {
        invoke_in(d, &title_regex, &selector, &limits)
    }))
}

pub fn set_value(title_regex: String, selector: String, value: String, limits: Limits) -> ActionResult {
    catch(deskctrl_windows::with_desktop(move |d| {
        set_value_in(d, &title_regex, &selector, &value, &limits)
    }))
}

pub fn tree(
    title_regex: String,
    depth: usize,
    max_children: usize,
    limits: Limits,
) -> Result<std::result::Result<TreeNode, ActionResult>> {
    deskctrl_windows::with_desktop(move |d| tree_in(d, &title_regex, depth, max_children, &limits))
}

pub fn resolve(contract_path: PathBuf, control_id: String, limits: Limits) -> Result<ChainReport> {
    #[cfg(windows)]
    {
        deskctrl_windows::with_desktop(move |d| {
            resolve_control_in(d, &host_ocr(), &contract_path, &control_id, &limits)
        })
    }
    #[cfg(not(windows))]
    {
        let _ = (contract_path, control_id, limits);
        bail!("the Windows UIA provider is only available on Windows")
    }
}

pub fn check(contract_path: PathBuf, assertion_id: String) -> Result<ActionResult> {
    #[cfg(windows)]
    {
        deskctrl_windows::with_desktop(move |d| {
            check_assertion_in(d, &host_ocr(), &contract_path, &assertion_id)
        })
    }
    #[cfg(not(windows))]
    {
        let _ = (contract_path, assertion_id);
        bail!("the Windows UIA provider is only available on Windows")
    }
}
