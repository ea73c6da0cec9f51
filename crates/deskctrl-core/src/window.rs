//! Window resolver — exactly-one-or-fail lookup of live top-level windows.

use anyhow::Result;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::contract::WindowSpec;
use crate::element::{Desktop, UiElement};
use crate::limits::Limits;

/// Title/class query over live top-level windows. Non-empty fields are
/// AND-composed, mirroring selector composition.
#[derive(Debug, Clone, Default)]
pub struct WindowQuery {
    pub title_contains: Option<String>,
    pub title_regex: Option<String>,
    pub class_name: Option<String>,
}

impl WindowQuery {
    pub fn from_regex(pattern: impl Into<String>) -> Self {
        Self { title_regex: Some(pattern.into()), ..Default::default() }
    }

    pub fn from_spec(spec: &WindowSpec) -> Self {
        Self {
            title_contains: spec.title_contains.clone(),
            title_regex: spec.title_regex.clone(),
            class_name: spec.class_name.clone(),
        }
    }

    fn is_empty(&self) -> bool {
        self.title_contains.is_none() && self.title_regex.is_none() && self.class_name.is_none()
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(v) = &self.title_contains {
            parts.push(format!("titleContains={v:?}"));
        }
        if let Some(v) = &self.title_regex {
            parts.push(format!("titleRegex={v:?}"));
        }
        if let Some(v) = &self.class_name {
            parts.push(format!("className={v:?}"));
        }
        parts.join(", ")
    }
}

/// Title and class of one live window, as reported in ambiguity samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowMatch {
    pub title: String,
    pub class_name: String,
}

/// Outcome of a window resolution. `window` is set iff exactly one live
/// window matched; `matches` is a bounded sample, `match_count` the truth.
pub struct WindowOutcome {
    pub window: Option<Box<dyn UiElement>>,
    pub message: String,
    pub match_count: usize,
    pub matches: Vec<WindowMatch>,
}

impl WindowOutcome {
    fn failure(message: String) -> Self {
        Self { window: None, message, match_count: 0, matches: Vec::new() }
    }
}

/// Compile a window-title regex: case-insensitive, size-bounded.
///
/// The regex engine compiles to a linear-time automaton, so a pathological
/// pattern cannot stall matching; the size limit bounds compilation itself.
pub fn compile_title_regex(pattern: &str, limits: &Limits) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(limits.regex_size_limit)
        .build()
}

/// Enumerate live top-level windows and require exactly one match.
///
/// Zero matches and multiple matches are both resolution failures; a
/// multi-match failure lists `{title, className}` for the first few
/// candidates so the caller can narrow the query. Never silently picks one.
pub fn find_unique_window(
    desktop: &dyn Desktop,
    query: &WindowQuery,
    limits: &Limits,
) -> Result<WindowOutcome> {
    if query.is_empty() {
        return Ok(WindowOutcome::failure(
            "window query is empty: set titleContains, titleRegex, or className".into(),
        ));
    }

    let regex = match &query.title_regex {
        Some(pattern) => match compile_title_regex(pattern, limits) {
            Ok(r) => Some(r),
            Err(e) => {
                return Ok(WindowOutcome::failure(format!(
                    "invalid titleRegex {pattern:?}: {e}"
                )));
            }
        },
        None => None,
    };

    let mut matched: Vec<(Box<dyn UiElement>, WindowMatch)> = Vec::new();
    for win in desktop.top_level_windows()? {
        let title = win.name();
        if title.is_empty() {
            continue;
        }
        if let Some(needle) = &query.title_contains {
            if !title.to_lowercase().contains(&needle.to_lowercase()) {
                continue;
            }
        }
        if let Some(re) = &regex {
            if !re.is_match(&title) {
                continue;
            }
        }
        let class_name = win.class_name();
        if let Some(class) = &query.class_name {
            if class_name != *class {
                continue;
            }
        }
        matched.push((win, WindowMatch { title, class_name }));
    }

    let count = matched.len();
    match count {
        0 => Ok(WindowOutcome::failure(format!(
            "no window matched {}",
            query.describe()
        ))),
        1 => {
            let (win, info) = matched.remove(0);
            Ok(WindowOutcome {
                window: Some(win),
                message: format!("resolved window {:?}", info.title),
                match_count: 1,
                matches: vec![info],
            })
        }
        n => {
            let samples: Vec<WindowMatch> = matched
                .into_iter()
                .take(limits.match_sample_size)
                .map(|(_, info)| info)
                .collect();
            Ok(WindowOutcome {
                window: None,
                message: format!(
                    "found {n} windows matching {}; narrow the query",
                    query.describe()
                ),
                match_count: n,
                matches: samples,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ControlType;
    use crate::mock::{MockDesktop, MockNode};

    fn desktop_with(titles: &[(&str, &str)]) -> MockDesktop {
        let mut d = MockDesktop::new();
        for (title, class) in titles {
            d = d.window(MockNode::new(ControlType::Window, title).class_name(class));
        }
        d
    }

    #[test]
    fn zero_matches_is_not_found() {
        let d = desktop_with(&[("Calculator", "ApplicationFrameWindow")]);
        let out =
            find_unique_window(&d, &WindowQuery::from_regex("Notepad"), &Limits::default()).unwrap();
        assert!(out.window.is_none());
        assert_eq!(out.match_count, 0);
        assert!(out.message.contains("no window matched"));
    }

    #[test]
    fn unique_match_resolves() {
        let d = desktop_with(&[("Notepad - a.txt", "Notepad"), ("Calculator", "Frame")]);
        let out =
            find_unique_window(&d, &WindowQuery::from_regex("notepad"), &Limits::default()).unwrap();
        let win = out.window.expect("unique window");
        assert_eq!(win.name(), "Notepad - a.txt");
    }

    #[test]
    fn two_matches_fail_with_both_titles() {
        let d = desktop_with(&[("Notepad - a.txt", "Notepad"), ("Notepad - b.txt", "Notepad")]);
        let out =
            find_unique_window(&d, &WindowQuery::from_regex("Notepad"), &Limits::default()).unwrap();
        assert!(out.window.is_none());
        assert_eq!(out.match_count, 2);
        let titles: Vec<&str> = out.matches.iter().map(|m| m.title.as_str()).collect();
        assert!(titles.contains(&"Notepad - a.txt"));
        assert!(titles.contains(&"Notepad - b.txt"));
    }

    #[test]
    fn sample_is_bounded_but_count_is_true() {
        let mut d = MockDesktop::new();
        for i in 0..9 {
            d = d.window(MockNode::new(ControlType::Window, &format!("Doc {i}")));
        }
        let out =
            find_unique_window(&d, &WindowQuery::from_regex("Doc"), &Limits::default()).unwrap();
        assert_eq!(out.match_count, 9);
        assert_eq!(out.matches.len(), 5);
    }

    #[test]
    fn invalid_regex_is_reported_not_propagated() {
        let d = desktop_with(&[("Notepad", "Notepad")]);
        let out =
            find_unique_window(&d, &WindowQuery::from_regex("(unbalanced"), &Limits::default())
                .unwrap();
        assert!(out.window.is_none());
        assert!(out.message.contains("invalid titleRegex"));
    }

    #[test]
    fn untitled_windows_are_skipped() {
        let d = desktop_with(&[("", "Hidden"), ("Notepad", "Notepad")]);
        let out =
            find_unique_window(&d, &WindowQuery::from_regex(".*"), &Limits::default()).unwrap();
        assert!(out.window.is_some());
    }

    #[test]
    fn class_and_contains_compose() {
        let d = desktop_with(&[("Notepad - a.txt", "Notepad"), ("Notepad - b.txt", "Other")]);
        let q = WindowQuery {
            title_contains: Some("notepad".into()),
            title_regex: None,
            class_name: Some("Notepad".into()),
        };
        let out = find_unique_window(&d, &q, &Limits::default()).unwrap();
        assert_eq!(out.window.unwrap().class_name(), "Notepad");
    }

    #[test]
    fn regex_is_case_insensitive() {
        let d = desktop_with(&[("NOTEPAD", "N")]);
        let out =
            find_unique_window(&d, &WindowQuery::from_regex("notepad$"), &Limits::default())
                .unwrap();
        assert!(out.window.is_some());
    }
}
