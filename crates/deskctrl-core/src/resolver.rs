//! Element resolver — selector walks over the live descendant tree.
//!
//! Every operation re-enumerates from the window element it is handed; no
//! element handle survives a call. The live tree is owned by the target
//! application and can mutate mid-walk, so child enumeration failures prune
//! the affected subtree instead of aborting the operation.

use anyhow::Result;

use crate::element::{ElementInfo, UiElement};
use crate::limits::{Limits, TREE_DEPTH_CAP};
use crate::result::{ActionResult, TreeNode};
use crate::selector::{PathStep, Selector};

/// Matches from a selector walk: the true total plus up to `keep` live
/// handles (in depth-first order).
struct Matches {
    total: usize,
    kept: Vec<Box<dyn UiElement>>,
}

/// Walk all descendants of `root` (bounded by `max_walk_depth`), collecting
/// elements the selector matches.
fn collect_matches(
    root: &dyn UiElement,
    selector: &Selector,
    keep: usize,
    limits: &Limits,
) -> Matches {
    let mut total = 0;
    let mut kept: Vec<Box<dyn UiElement>> = Vec::new();
    let mut stack: Vec<(Box<dyn UiElement>, usize)> = match root.children() {
        Ok(kids) => kids.into_iter().map(|k| (k, 1)).collect(),
        Err(e) => {
            log::debug!("root children enumeration failed: {e:#}");
            Vec::new()
        }
    };

    while let Some((el, depth)) = stack.pop() {
        if depth < limits.max_walk_depth {
            match el.children() {
                Ok(kids) => stack.extend(kids.into_iter().map(|k| (k, depth + 1))),
                // Element likely vanished mid-walk; skip its subtree.
                Err(e) => log::debug!("child enumeration failed at depth {depth}: {e:#}"),
            }
        }
        if selector.matches(&*el) {
            total += 1;
            if kept.len() < keep {
                kept.push(el);
            }
        }
    }

    Matches { total, kept }
}

/// Walk a contract path (`pane/toolbar/button[2]`) stepwise from the window.
///
/// Each step filters the current element's direct children by control type;
/// an unindexed step must match exactly one child — the same
/// exactly-one-or-fail policy as every other locator in the system.
fn descend_path(
    window: &dyn UiElement,
    steps: &[PathStep],
) -> std::result::Result<Box<dyn UiElement>, String> {
    let mut current: Option<Box<dyn UiElement>> = None;
    for step in steps {
        let parent: &dyn UiElement = match &current {
            Some(el) => &**el,
            None => window,
        };
        let kids = parent
            .children()
            .map_err(|e| format!("path step {step}: child enumeration failed: {e:#}"))?;
        let mut typed: Vec<Box<dyn UiElement>> = kids
            .into_iter()
            .filter(|k| k.control_type() == step.control_type)
            .collect();
        let chosen = match step.index {
            Some(n) => {
                if n > typed.len() {
                    return Err(format!(
                        "path step {step}: only {} matching children",
                        typed.len()
                    ));
                }
                typed.swap_remove(n - 1)
            }
            None => match typed.len() {
                0 => return Err(format!("path step {step}: no matching child")),
                1 => typed.remove(0),
                n => return Err(format!("path step {step}: {n} matching children, index required")),
            },
        };
        current = Some(chosen);
    }
    current.ok_or_else(|| "empty path".into())
}

/// Result of `find`: a bounded descriptor list plus the true total.
pub struct FindOutcome {
    pub matches: Vec<ElementInfo>,
    pub total: usize,
}

/// Enumerate all descendants matching the selector, returning up to `limit`
/// serialized descriptors and the true total match count.
pub fn find(
    window: &dyn UiElement,
    selector: &Selector,
    limit: usize,
    limits: &Limits,
) -> FindOutcome {
    let found = collect_matches(window, selector, limit, limits);
    FindOutcome {
        matches: found.kept.iter().map(|el| ElementInfo::describe(&**el)).collect(),
        total: found.total,
    }
}

/// Result of a unique resolution attempt, mirroring the window resolver's
/// shape: the element is set iff exactly one descendant matched.
pub struct ResolveOutcome {
    pub element: Option<Box<dyn UiElement>>,
    pub message: String,
    pub match_count: usize,
    pub samples: Vec<ElementInfo>,
}

impl ResolveOutcome {
    fn failure(message: String, match_count: usize, samples: Vec<ElementInfo>) -> Self {
        Self { element: None, message, match_count, samples }
    }

    /// Convert to the wire-level result shape (dropping the live handle).
    pub fn to_action_result(&self) -> ActionResult {
        ActionResult {
            success: self.element.is_some(),
            message: self.message.clone(),
            match_count: Some(self.match_count),
            matches: self.samples.clone(),
        }
    }
}

/// Resolve a selector to exactly one live descendant of `window`.
///
/// 0 matches and >1 matches are both failures, with the true count and a
/// bounded descriptor sample. Never picks one of several candidates.
pub fn resolve_unique(
    window: &dyn UiElement,
    selector: &Selector,
    limits: &Limits,
) -> ResolveOutcome {
    // Path steps narrow the scope first.
    let path_target: Option<Box<dyn UiElement>> = if selector.path.is_empty() {
        None
    } else {
        match descend_path(window, &selector.path) {
            Ok(el) => Some(el),
            Err(reason) => return ResolveOutcome::failure(reason, 0, Vec::new()),
        }
    };

    // A pure-path selector resolves to the path target itself.
    if !selector.has_fields() {
        match path_target {
            Some(el) => {
                let info = ElementInfo::describe(&*el);
                return ResolveOutcome {
                    message: format!("resolved {}", info.identity()),
                    element: Some(el),
                    match_count: 1,
                    samples: vec![info],
                };
            }
            None => {
                return ResolveOutcome::failure("selector has no fields and no path".into(), 0, Vec::new())
            }
        }
    }

    let mut found = {
        let scope: &dyn UiElement = match &path_target {
            Some(el) => &**el,
            None => window,
        };
        collect_matches(scope, selector, limits.match_sample_size + 1, limits)
    };
    // The path target itself is a candidate alongside its descendants.
    if let Some(el) = path_target {
        if selector.matches(&*el) {
            found.total += 1;
            found.kept.insert(0, el);
        }
    }

    match found.total {
        0 => ResolveOutcome::failure(
            format!("found 0 elements matching selector [{selector}]"),
            0,
            Vec::new(),
        ),
        1 => {
            let el = found.kept.remove(0);
            let info = ElementInfo::describe(&*el);
            ResolveOutcome {
                message: format!("resolved {}", info.identity()),
                element: Some(el),
                match_count: 1,
                samples: vec![info],
            }
        }
        n => {
            let samples: Vec<ElementInfo> = found
                .kept
                .iter()
                .take(limits.match_sample_size)
                .map(|el| ElementInfo::describe(&**el))
                .collect();
            ResolveOutcome::failure(
                format!("found {n} elements matching selector [{selector}]; narrow the selector"),
                n,
                samples,
            )
        }
    }
}

/// Resolve uniquely, focus the window, and invoke the element.
///
/// Requires the Invoke capability pattern; an element without it yields a
/// structured failure naming the element, never a panic or error. Repeated
/// calls simply re-resolve and re-invoke.
pub fn invoke(window: &dyn UiElement, selector: &Selector, limits: &Limits) -> ActionResult {
    let resolved = resolve_unique(window, selector, limits);
    let Some(el) = resolved.element else {
        return resolved.to_action_result();
    };
    let info = ElementInfo::describe(&*el);

    if let Err(e) = window.focus() {
        log::warn!("window focus before invoke failed: {e:#}");
    }
    let result = match el.try_invoke() {
        Some(handle) => match handle.invoke() {
            Ok(()) => ActionResult::ok(format!("invoked {}", info.identity())),
            Err(e) => ActionResult::err(format!("invoke failed on {}: {e:#}", info.identity())),
        },
        None => ActionResult::err(format!(
            "{} does not support the Invoke pattern",
            info.identity()
        )),
    };
    result
}

/// Resolve uniquely, focus the window, and set the element's value.
///
/// Requires the Value capability pattern.
pub fn set_value(
    window: &dyn UiElement,
    selector: &Selector,
    value: &str,
    limits: &Limits,
) -> ActionResult {
    let resolved = resolve_unique(window, selector, limits);
    let Some(el) = resolved.element else {
        return resolved.to_action_result();
    };
    let info = ElementInfo::describe(&*el);

    if let Err(e) = window.focus() {
        log::warn!("window focus before set_value failed: {e:#}");
    }
    let result = match el.try_value() {
        Some(handle) => match handle.set_value(value) {
            Ok(()) => ActionResult::ok(format!("set value on {} to {value:?}", info.identity())),
            Err(e) => {
                ActionResult::err(format!("set_value failed on {}: {e:#}", info.identity()))
            }
        },
        None => ActionResult::err(format!(
            "{} does not support the Value pattern",
            info.identity()
        )),
    };
    result
}

/// Build a depth- and fan-out-bounded snapshot of the descendant tree.
///
/// `max_depth` is clamped to [`TREE_DEPTH_CAP`]; each node's children are
/// capped at `max_children` with the true count and a truncation flag, so
/// the dump terminates in bounded time against arbitrarily large live trees.
pub fn get_tree(
    window: &dyn UiElement,
    max_depth: usize,
    max_children: usize,
) -> Result<TreeNode> {
    let depth_cap = max_depth.min(TREE_DEPTH_CAP);
    Ok(build_node(window, 0, depth_cap, max_children.max(1)))
}

fn build_node(el: &dyn UiElement, depth: usize, depth_cap: usize, max_children: usize) -> TreeNode {
    let info = ElementInfo::describe(el);
    if depth >= depth_cap {
        return TreeNode { info, children: Vec::new(), children_count: 0, children_truncated: false };
    }
    let kids = match el.children() {
        Ok(kids) => kids,
        Err(e) => {
            log::debug!("tree dump: child enumeration failed at depth {depth}: {e:#}");
            Vec::new()
        }
    };
    let children_count = kids.len();
    let children_truncated = children_count > max_children;
    let children = kids
        .iter()
        .take(max_children)
        .map(|k| build_node(&**k, depth + 1, depth_cap, max_children))
        .collect();
    TreeNode { info, children, children_count, children_truncated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ControlType;
    use crate::mock::MockNode;

    fn window_with_buttons() -> MockNode {
        MockNode::new(ControlType::Window, "App")
            .child(
                MockNode::new(ControlType::Pane, "Body").child(
                    MockNode::new(ControlType::Button, "OK")
                        .automation_id("btnOk")
                        .invokable(),
                ),
            )
            .child(MockNode::new(ControlType::Button, "Cancel").automation_id("btnCancel").invokable())
    }

    #[test]
    fn unique_resolution_succeeds() {
        let win = window_with_buttons().into_element();
        let sel = Selector::parse("automationId=btnOk").unwrap();
        let out = resolve_unique(&win, &sel, &Limits::default());
        assert_eq!(out.match_count, 1);
        assert_eq!(out.element.unwrap().name(), "OK");
    }

    #[test]
    fn zero_matches_reports_count_zero() {
        let win = window_with_buttons().into_element();
        let sel = Selector::parse("automationId=btnNope").unwrap();
        let out = resolve_unique(&win, &sel, &Limits::default());
        assert!(out.element.is_none());
        assert_eq!(out.match_count, 0);
        assert!(out.message.contains("found 0"));
    }

    #[test]
    fn multiple_matches_report_true_count_and_samples() {
        let mut win = MockNode::new(ControlType::Window, "App");
        for i in 0..8 {
            win = win.child(MockNode::new(ControlType::Button, "Same").automation_id(&format!("b{i}")));
        }
        let win = win.into_element();
        let sel = Selector::parse("name=Same").unwrap();
        let out = resolve_unique(&win, &sel, &Limits::default());
        assert!(out.element.is_none());
        assert_eq!(out.match_count, 8);
        assert_eq!(out.samples.len(), 5, "sample bounded below true count");
        assert!(out.message.contains("found 8"));
    }

    #[test]
    fn selector_fields_are_anded() {
        let win = MockNode::new(ControlType::Window, "App")
            .child(MockNode::new(ControlType::Button, "Save").automation_id("a"))
            .child(MockNode::new(ControlType::Text, "Save").automation_id("b"))
            .into_element();
        let sel = Selector::parse("name=Save;controlType=button").unwrap();
        let out = resolve_unique(&win, &sel, &Limits::default());
        assert_eq!(out.match_count, 1);
        assert_eq!(out.element.unwrap().automation_id(), "a");
    }

    #[test]
    fn window_root_is_not_a_candidate() {
        let win = MockNode::new(ControlType::Window, "Target")
            .child(MockNode::new(ControlType::Button, "Target"))
            .into_element();
        let sel = Selector::parse("name=Target").unwrap();
        let out = resolve_unique(&win, &sel, &Limits::default());
        // Only the descendant matches; the window element itself is excluded.
        assert_eq!(out.match_count, 1);
        assert_eq!(out.element.unwrap().control_type(), ControlType::Button);
    }

    #[test]
    fn find_reports_true_total_when_truncated() {
        let mut win = MockNode::new(ControlType::Window, "App");
        for i in 0..30 {
            win = win.child(MockNode::new(ControlType::ListItem, &format!("row {i}")));
        }
        let win = win.into_element();
        let sel = Selector::parse("controlType=listitem").unwrap();
        let out = find(&win, &sel, 10, &Limits::default());
        assert_eq!(out.matches.len(), 10);
        assert_eq!(out.total, 30);
    }

    #[test]
    fn idempotent_re_resolution() {
        let win = window_with_buttons().into_element();
        let sel = Selector::parse("automationId=btnOk").unwrap();
        let a = resolve_unique(&win, &sel, &Limits::default());
        let b = resolve_unique(&win, &sel, &Limits::default());
        let ia = ElementInfo::describe(&*a.element.unwrap());
        let ib = ElementInfo::describe(&*b.element.unwrap());
        assert_eq!(ia.automation_id, ib.automation_id);
        assert_eq!(ia.class_name, ib.class_name);
        assert_eq!(ia.bounding_rectangle, ib.bounding_rectangle);
    }

    #[test]
    fn invoke_requires_pattern_support() {
        let win = MockNode::new(ControlType::Window, "App")
            .child(MockNode::new(ControlType::Text, "ReadOnly").automation_id("lbl"))
            .into_element();
        let sel = Selector::parse("automationId=lbl").unwrap();
        let result = invoke(&win, &sel, &Limits::default());
        assert!(!result.success);
        assert!(result.message.contains("Invoke pattern"));
        assert!(result.message.contains("lbl"));
    }

    #[test]
    fn invoke_fires_on_supported_element() {
        let win = window_with_buttons().into_element();
        let sel = Selector::parse("automationId=btnOk").unwrap();
        let result = invoke(&win, &sel, &Limits::default());
        assert!(result.success, "{}", result.message);
        assert_eq!(win.node().find("btnOk").unwrap().invoke_count(), 1);
    }

    #[test]
    fn set_value_requires_pattern_support() {
        let win = window_with_buttons().into_element();
        let sel = Selector::parse("automationId=btnOk").unwrap();
        let result = set_value(&win, &sel, "hello", &Limits::default());
        assert!(!result.success);
        assert!(result.message.contains("Value pattern"));
    }

    #[test]
    fn set_value_writes_through() {
        let win = MockNode::new(ControlType::Window, "App")
            .child(MockNode::new(ControlType::Edit, "Input").automation_id("txt").editable(""))
            .into_element();
        let sel = Selector::parse("automationId=txt").unwrap();
        let result = set_value(&win, &sel, "hello", &Limits::default());
        assert!(result.success, "{}", result.message);
        assert_eq!(win.node().find("txt").unwrap().value_text(), "hello");
    }

    #[test]
    fn tree_dump_truncates_wide_nodes_in_bounded_time() {
        let mut win = MockNode::new(ControlType::Window, "Big");
        for i in 0..10_000 {
            win = win.child(MockNode::new(ControlType::ListItem, &format!("row {i}")));
        }
        let win = win.into_element();
        let tree = get_tree(&win, 5, 80).unwrap();
        assert_eq!(tree.children.len(), 80);
        assert_eq!(tree.children_count, 10_000);
        assert!(tree.children_truncated);
    }

    #[test]
    fn tree_dump_depth_is_hard_capped() {
        // A 30-deep chain: the dump must stop at TREE_DEPTH_CAP even when
        // the caller asks for more.
        let mut node = MockNode::new(ControlType::Pane, "leaf");
        for i in 0..30 {
            node = MockNode::new(ControlType::Pane, &format!("level {i}")).child(node);
        }
        let win = node.into_element();
        let tree = get_tree(&win, 100, 10).unwrap();
        let mut depth = 0;
        let mut cursor = &tree;
        while let Some(child) = cursor.children.first() {
            cursor = child;
            depth += 1;
        }
        assert_eq!(depth, TREE_DEPTH_CAP);
    }

    #[test]
    fn path_descends_stepwise() {
        let win = MockNode::new(ControlType::Window, "App")
            .child(
                MockNode::new(ControlType::Pane, "Body")
                    .child(MockNode::new(ControlType::ToolBar, "Tools")
                        .child(MockNode::new(ControlType::Button, "First").invokable())
                        .child(MockNode::new(ControlType::Button, "Second").invokable())),
            )
            .into_element();
        let loc = crate::contract::UiaLocator {
            path: Some("pane/toolbar/button[2]".into()),
            ..Default::default()
        };
        let sel = Selector::from_uia(&loc).unwrap();
        let out = resolve_unique(&win, &sel, &Limits::default());
        assert_eq!(out.element.unwrap().name(), "Second");
    }

    #[test]
    fn unindexed_ambiguous_path_step_fails() {
        let win = MockNode::new(ControlType::Window, "App")
            .child(MockNode::new(ControlType::Pane, "A"))
            .child(MockNode::new(ControlType::Pane, "B"))
            .into_element();
        let loc = crate::contract::UiaLocator { path: Some("pane".into()), ..Default::default() };
        let sel = Selector::from_uia(&loc).unwrap();
        let out = resolve_unique(&win, &sel, &Limits::default());
        assert!(out.element.is_none());
        assert!(out.message.contains("2 matching children"));
    }

    #[test]
    fn path_scopes_field_matching() {
        // Two OK buttons, but only one inside the toolbar the path selects.
        let win = MockNode::new(ControlType::Window, "App")
            .child(MockNode::new(ControlType::ToolBar, "Tools")
                .child(MockNode::new(ControlType::Button, "OK").automation_id("inner")))
            .child(MockNode::new(ControlType::Button, "OK").automation_id("outer"))
            .into_element();
        let loc = crate::contract::UiaLocator {
            name: Some("OK".into()),
            path: Some("toolbar".into()),
            ..Default::default()
        };
        let sel = Selector::from_uia(&loc).unwrap();
        let out = resolve_unique(&win, &sel, &Limits::default());
        assert_eq!(out.element.unwrap().automation_id(), "inner");
    }

    #[test]
    fn walk_depth_is_bounded() {
        let mut node = MockNode::new(ControlType::Button, "Deep").automation_id("deep");
        for _ in 0..40 {
            node = MockNode::new(ControlType::Pane, "wrap").child(node);
        }
        let win = MockNode::new(ControlType::Window, "App").child(node).into_element();
        let sel = Selector::parse("automationId=deep").unwrap();
        let out = resolve_unique(&win, &sel, &Limits::default());
        // Past the walk-depth bound: not found rather than unbounded descent.
        assert!(out.element.is_none());
        assert_eq!(out.match_count, 0);
    }
}
