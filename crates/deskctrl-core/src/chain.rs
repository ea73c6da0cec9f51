//! Locator fallback chain — UIA, then OCR, then fixed offset.
//!
//! The ordering reflects decreasing reliability: UIA is exact but brittle to
//! app/version churn, OCR survives automation-id churn but is imprecise and
//! language-sensitive, fixed offsets break on any relayout. Every attempt is
//! recorded so a caller sees why each strategy failed, not just the last one.

use anyhow::Result;
use serde::Serialize;

use crate::contract::Contract;
use crate::element::{Desktop, Point, UiElement};
use crate::limits::Limits;
use crate::ocr::OcrBridge;
use crate::resolver;
use crate::selector::Selector;
use crate::window::{find_unique_window, WindowQuery};

/// One of the three locator strategies a control can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LocatorStrategy {
    Uia,
    Ocr,
    FallbackCoords,
}

impl std::fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LocatorStrategy::Uia => "uia",
            LocatorStrategy::Ocr => "ocr",
            LocatorStrategy::FallbackCoords => "fallbackCoords",
        };
        f.write_str(s)
    }
}

/// Record of one strategy attempt, successful or not. Strategies the control
/// does not configure are recorded as `not configured`, so callers can tell
/// "tried and failed" from "absent".
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub strategy: LocatorStrategy,
    pub detail: String,
    pub succeeded: bool,
}

impl Attempt {
    fn failed(strategy: LocatorStrategy, detail: impl Into<String>) -> Self {
        Self { strategy, detail: detail.into(), succeeded: false }
    }

    fn succeeded(strategy: LocatorStrategy, detail: impl Into<String>) -> Self {
        Self { strategy, detail: detail.into(), succeeded: true }
    }
}

/// What a successful chain resolution points at: a live element (UIA path)
/// or a bare screen point (OCR and offset paths).
pub enum ResolvedTarget {
    Element(Box<dyn UiElement>),
    Point(Point),
}

/// Outcome of resolving one contract control against the live desktop.
pub struct ChainResolution {
    pub target: Option<ResolvedTarget>,
    pub strategy: Option<LocatorStrategy>,
    pub attempts: Vec<Attempt>,
    pub message: String,
}

impl ChainResolution {
    pub fn succeeded(&self) -> bool {
        self.target.is_some()
    }

    fn failure(message: String, attempts: Vec<Attempt>) -> Self {
        Self { target: None, strategy: None, attempts, message }
    }

    /// Action point for the resolved target, when one can be derived.
    pub fn action_point(&self) -> Option<Point> {
        match self.target.as_ref()? {
            ResolvedTarget::Point(p) => Some(*p),
            ResolvedTarget::Element(el) => el.bounding_rect().map(|r| r.center()),
        }
    }
}

/// Resolve a contract control by trying its locators strictly in priority
/// order UIA → OCR → fallbackCoords.
///
/// Expected failures (unknown ids, no locator succeeding) come back as a
/// failed `ChainResolution`; only unexpected native-layer failures surface
/// as errors.
pub fn resolve_control(
    desktop: &dyn Desktop,
    ocr: &dyn OcrBridge,
    contract: &Contract,
    control_id: &str,
    limits: &Limits,
) -> Result<ChainResolution> {
    let Some((control_id, control)) = contract.control(control_id) else {
        return Ok(ChainResolution::failure(
            format!("unknown control id {control_id:?}"),
            Vec::new(),
        ));
    };
    let Some((window_id, window_spec)) = contract.window(&control.window_id) else {
        return Ok(ChainResolution::failure(
            format!(
                "control {control_id:?} references unknown window {:?}",
                control.window_id
            ),
            Vec::new(),
        ));
    };

    let window_outcome =
        find_unique_window(desktop, &WindowQuery::from_spec(window_spec), limits)?;
    let Some(window) = window_outcome.window else {
        return Ok(ChainResolution::failure(
            format!("window {window_id:?}: {}", window_outcome.message),
            Vec::new(),
        ));
    };

    let mut attempts: Vec<Attempt> = Vec::new();

    // 1. UIA — exact selector against the live control tree.
    match &control.uia {
        Some(locator) if locator.has_field() => match Selector::from_uia(locator) {
            Ok(selector) => {
                let resolved = resolver::resolve_unique(&*window, &selector, limits);
                match resolved.element {
                    Some(el) => {
                        attempts.push(Attempt::succeeded(LocatorStrategy::Uia, resolved.message));
                        return Ok(ChainResolution {
                            target: Some(ResolvedTarget::Element(el)),
                            strategy: Some(LocatorStrategy::Uia),
                            attempts,
                            message: format!("resolved control {control_id:?} via uia"),
                        });
                    }
                    None => attempts.push(Attempt::failed(LocatorStrategy::Uia, resolved.message)),
                }
            }
            Err(e) => attempts.push(Attempt::failed(LocatorStrategy::Uia, format!("{e:#}"))),
        },
        _ => attempts.push(Attempt::failed(LocatorStrategy::Uia, "not configured")),
    }

    // 2. OCR — search the screen for the control's text.
    match &control.ocr {
        Some(locator) => match locator.text.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(text) => {
                let occurrence = locator.occurrence.unwrap_or(1).max(1);
                let (point, status) = ocr.text_coordinates(text, occurrence);
                if !status.is_ok() {
                    attempts.push(Attempt::failed(
                        LocatorStrategy::Ocr,
                        format!("engine failure (status {})", status.0),
                    ));
                } else if let Some(point) = point {
                    attempts.push(Attempt::succeeded(
                        LocatorStrategy::Ocr,
                        format!("text {text:?} found at ({}, {})", point.x, point.y),
                    ));
                    return Ok(ChainResolution {
                        target: Some(ResolvedTarget::Point(point)),
                        strategy: Some(LocatorStrategy::Ocr),
                        attempts,
                        message: format!("resolved control {control_id:?} via ocr"),
                    });
                } else {
                    attempts.push(Attempt::failed(
                        LocatorStrategy::Ocr,
                        format!("text {text:?} (occurrence {occurrence}) not found on screen"),
                    ));
                }
            }
            None => attempts.push(Attempt::failed(LocatorStrategy::Ocr, "no text configured")),
        },
        None => attempts.push(Attempt::failed(LocatorStrategy::Ocr, "not configured")),
    }

    // 3. Fixed offset from the window origin — last resort.
    match &control.fallback_coords {
        Some(coords) => match window.bounding_rect() {
            Some(rect) => {
                let point = Point {
                    x: rect.x as i32 + coords.offset_x,
                    y: rect.y as i32 + coords.offset_y,
                };
                attempts.push(Attempt::succeeded(
                    LocatorStrategy::FallbackCoords,
                    format!("window origin + ({}, {})", coords.offset_x, coords.offset_y),
                ));
                return Ok(ChainResolution {
                    target: Some(ResolvedTarget::Point(point)),
                    strategy: Some(LocatorStrategy::FallbackCoords),
                    attempts,
                    message: format!("resolved control {control_id:?} via fallbackCoords"),
                });
            }
            None => attempts.push(Attempt::failed(
                LocatorStrategy::FallbackCoords,
                "window bounding rectangle unavailable",
            )),
        },
        None => {
            attempts.push(Attempt::failed(LocatorStrategy::FallbackCoords, "not configured"))
        }
    }

    let summary: Vec<String> =
        attempts.iter().map(|a| format!("{}: {}", a.strategy, a.detail)).collect();
    Ok(ChainResolution::failure(
        format!(
            "control {control_id:?} could not be resolved: {}",
            summary.join("; ")
        ),
        attempts,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ControlType;
    use crate::mock::{MockDesktop, MockNode, MockOcr};

    fn contract_json(uia_id: &str) -> Contract {
        serde_json::from_str(&format!(
            r#"{{
                "contractVersion": "1.0",
                "app": {{ "name": "Notepad" }},
                "windows": {{ "main": {{ "titleRegex": "Notepad" }} }},
                "controls": {{
                    "save": {{
                        "windowId": "main",
                        "uia": {{ "automationId": "{uia_id}" }},
                        "ocr": {{ "text": "Save" }},
                        "fallbackCoords": {{ "offsetX": 40, "offsetY": 12 }}
                    }}
                }}
            }}"#
        ))
        .unwrap()
    }

    fn desktop() -> MockDesktop {
        MockDesktop::new().window(
            MockNode::new(ControlType::Window, "Notepad - a.txt")
                .rect(100.0, 200.0, 800.0, 600.0)
                .child(MockNode::new(ControlType::Button, "Save").automation_id("btnSave").invokable()),
        )
    }

    #[test]
    fn uia_wins_when_it_resolves() {
        let contract = contract_json("btnSave");
        let res = resolve_control(&desktop(), &MockOcr::new(), &contract, "save", &Limits::default())
            .unwrap();
        assert!(res.succeeded());
        assert_eq!(res.strategy, Some(LocatorStrategy::Uia));
        assert!(matches!(res.target, Some(ResolvedTarget::Element(_))));
        assert_eq!(res.attempts.len(), 1);
    }

    #[test]
    fn ocr_used_when_uia_fails_and_attempts_name_both() {
        let contract = contract_json("btnMissing");
        let ocr = MockOcr::new().with_text_at("Save", Point { x: 320, y: 240 });
        let res =
            resolve_control(&desktop(), &ocr, &contract, "save", &Limits::default()).unwrap();
        assert!(res.succeeded());
        assert_eq!(res.strategy, Some(LocatorStrategy::Ocr));
        match res.target {
            Some(ResolvedTarget::Point(p)) => assert_eq!(p, Point { x: 320, y: 240 }),
            _ => panic!("expected a point target"),
        }
        // The attempt list names the UIA failure reason plus the OCR success.
        assert_eq!(res.attempts.len(), 2);
        assert_eq!(res.attempts[0].strategy, LocatorStrategy::Uia);
        assert!(!res.attempts[0].succeeded);
        assert!(res.attempts[0].detail.contains("found 0"));
        assert!(res.attempts[1].succeeded);
    }

    #[test]
    fn fallback_coords_are_window_relative() {
        let contract = contract_json("btnMissing");
        // OCR finds nothing; fall through to fixed offset.
        let res = resolve_control(&desktop(), &MockOcr::new(), &contract, "save", &Limits::default())
            .unwrap();
        assert_eq!(res.strategy, Some(LocatorStrategy::FallbackCoords));
        match res.target {
            Some(ResolvedTarget::Point(p)) => {
                assert_eq!(p, Point { x: 140, y: 212 }, "window origin (100,200) + (40,12)");
            }
            _ => panic!("expected a point target"),
        }
        assert_eq!(res.attempts.len(), 3);
    }

    #[test]
    fn full_failure_enumerates_every_strategy() {
        let mut contract = contract_json("btnMissing");
        contract.controls.get_mut("save").unwrap().fallback_coords = None;
        let ocr = MockOcr::new().failing();
        let res =
            resolve_control(&desktop(), &ocr, &contract, "save", &Limits::default()).unwrap();
        assert!(!res.succeeded());
        assert!(res.message.contains("uia:"), "{}", res.message);
        assert!(res.message.contains("found 0"), "{}", res.message);
        assert!(res.message.contains("ocr:"), "{}", res.message);
        assert!(res.message.contains("engine failure"), "{}", res.message);
        assert!(res.message.contains("fallbackCoords: not configured"), "{}", res.message);
    }

    #[test]
    fn ambiguous_uia_failure_is_named_precisely() {
        let contract = contract_json("dup");
        let desktop = MockDesktop::new().window(
            MockNode::new(ControlType::Window, "Notepad")
                .rect(0.0, 0.0, 400.0, 300.0)
                .child(MockNode::new(ControlType::Button, "A").automation_id("dup"))
                .child(MockNode::new(ControlType::Button, "B").automation_id("dup")),
        );
        let res = resolve_control(&desktop, &MockOcr::new(), &contract, "save", &Limits::default())
            .unwrap();
        // Callers must see that UIA found 2, not just "failed".
        assert!(res.attempts[0].detail.contains("found 2"), "{}", res.attempts[0].detail);
    }

    #[test]
    fn window_failure_short_circuits() {
        let contract = contract_json("btnSave");
        let res = resolve_control(
            &MockDesktop::new(),
            &MockOcr::new(),
            &contract,
            "save",
            &Limits::default(),
        )
        .unwrap();
        assert!(!res.succeeded());
        assert!(res.attempts.is_empty());
        assert!(res.message.contains("no window matched"));
    }

    #[test]
    fn unknown_control_is_a_structured_failure() {
        let contract = contract_json("btnSave");
        let res = resolve_control(&desktop(), &MockOcr::new(), &contract, "nope", &Limits::default())
            .unwrap();
        assert!(!res.succeeded());
        assert!(res.message.contains("unknown control id"));
    }

    #[test]
    fn ocr_occurrence_is_forwarded() {
        let mut contract = contract_json("btnMissing");
        contract.controls.get_mut("save").unwrap().ocr =
            Some(crate::contract::OcrLocator { text: Some("Save".into()), occurrence: Some(2) });
        let ocr = MockOcr::new()
            .with_text_at("Save", Point { x: 1, y: 1 })
            .with_text_at("Save", Point { x: 2, y: 2 });
        let res =
            resolve_control(&desktop(), &ocr, &contract, "save", &Limits::default()).unwrap();
        match res.target {
            Some(ResolvedTarget::Point(p)) => assert_eq!(p, Point { x: 2, y: 2 }),
            _ => panic!("expected second occurrence"),
        }
    }
}
