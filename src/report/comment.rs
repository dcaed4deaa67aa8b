//! Markdown summary posted on the pull request.

use serde::Serialize;
use std::fmt::Write;

use crate::plan::Action;

use super::ui::{UiData, UiStack};

/// Per-category stack counts shown in the comment.
///
/// Locked stacks count only as locked and errored stacks only as errored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommentStats {
    /// All stacks.
    pub total: usize,
    /// Stacks whose plan failed.
    pub errored: usize,
    /// Stacks locked by another pull.
    pub locked: usize,
    /// Stacks with at least one resource change.
    pub with_resource_changes: usize,
    /// Of those, stacks creating something.
    pub with_creates: usize,
    /// Of those, stacks updating something.
    pub with_updates: usize,
    /// Of those, stacks deleting something.
    pub with_deletes: usize,
    /// Stacks without resource changes.
    pub without_resource_changes: usize,
    /// Stacks with output changes.
    pub with_output_changes: usize,
    /// Stacks with drift.
    pub with_drifts: usize,
    /// Stacks with imports.
    pub with_imports: usize,
    /// Stacks with moves.
    pub with_moves: usize,
}

impl CommentStats {
    /// Counts the stacks of a report.
    #[must_use]
    pub fn from_stacks(stacks: &[UiStack]) -> Self {
        let mut stats = Self {
            total: stacks.len(),
            ..Self::default()
        };

        for stack in stacks {
            if stack.is_locked() {
                stats.locked += 1;
                continue;
            }
            if stack.plan_error {
                stats.errored += 1;
                continue;
            }

            let diffs = &stack.diffs;
            if diffs.resource_diffs.is_empty() {
                stats.without_resource_changes += 1;
            } else {
                stats.with_resource_changes += 1;
                stats.with_creates += usize::from(diffs.has_resource_action(Action::Create));
                stats.with_updates += usize::from(diffs.has_resource_action(Action::Update));
                stats.with_deletes += usize::from(diffs.has_resource_action(Action::Delete));
            }
            stats.with_output_changes += usize::from(!diffs.output_diffs.is_empty());
            stats.with_drifts += usize::from(!diffs.drift_diffs.is_empty());
            stats.with_imports += usize::from(!diffs.imports.is_empty());
            stats.with_moves += usize::from(!diffs.moves.is_empty());
        }

        stats
    }
}

/// Renders the summary comment.
///
/// The viewer link points at `{ui_url}#{pull}` (always the latest report), the
/// permalink at `{ui_url}#{pull}_{digest}`. Zero counts are left out.
#[must_use]
pub fn render_comment(data: &UiData, ui_url: &str, digest: &str) -> String {
    let stats = CommentStats::from_stacks(&data.stacks);
    let pull = data.pr_num;
    let mut out = String::new();

    let _ = writeln!(out, "## [↗️ Plans viewer]({ui_url}#{pull})");
    let _ = writeln!(out);
    let _ = writeln!(out, "<sup>[permalink]({ui_url}#{pull}_{digest})</sup>");
    let _ = writeln!(out);
    let _ = writeln!(out, "* Total stacks: **{}**", stats.total);

    line(&mut out, "⚠️ With plan errors", stats.errored);
    line(&mut out, "⌛️ Locked", stats.locked);

    if stats.with_resource_changes > 0 {
        let breakdown: Vec<String> = [
            ("🟢", stats.with_creates, "creates"),
            ("🟡", stats.with_updates, "updates"),
            ("🔴", stats.with_deletes, "deletes"),
        ]
        .into_iter()
        .filter(|(_, count, _)| *count > 0)
        .map(|(icon, count, what)| format!("{icon} **{count}** w/{what}"))
        .collect();

        let _ = writeln!(
            out,
            "* 📋 With resource changes: **{}** ({})",
            stats.with_resource_changes,
            breakdown.join("; ")
        );
    }

    line(&mut out, "0️⃣ Without resource changes", stats.without_resource_changes);
    line(&mut out, "⤴️ With output changes", stats.with_output_changes);
    line(&mut out, "↙️ With drifts", stats.with_drifts);
    line(&mut out, "⤵️ With imports", stats.with_imports);
    line(&mut out, "🔁 With moves", stats.with_moves);

    out
}

fn line(out: &mut String, label: &str, count: usize) {
    if count > 0 {
        let _ = writeln!(out, "* {label}: **{count}**");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{DiffEntry, DiffModel};

    fn stack(diffs: DiffModel) -> UiStack {
        UiStack {
            diffs,
            ..UiStack::default()
        }
    }

    fn sample() -> UiData {
        UiData {
            pr_num: 42,
            stacks: vec![
                stack(DiffModel {
                    resource_diffs: vec![
                        DiffEntry::resource("a.b", vec![Action::Create], "+"),
                        DiffEntry::resource("a.c", vec![Action::Delete, Action::Create], "-/+"),
                    ],
                    moves: vec![DiffEntry::moved("a.d", "a.e")],
                    ..DiffModel::default()
                }),
                stack(DiffModel {
                    output_diffs: vec![DiffEntry::output("o", "~")],
                    ..DiffModel::default()
                }),
                UiStack {
                    plan_error: true,
                    ..UiStack::default()
                },
                UiStack {
                    plan_error: true,
                    lock_url: Some(String::from("http://a/lock?id=x")),
                    ..UiStack::default()
                },
            ],
            ..UiData::default()
        }
    }

    #[test]
    fn test_stats() {
        let stats = CommentStats::from_stacks(&sample().stacks);

        assert_eq!(
            stats,
            CommentStats {
                total: 4,
                errored: 1,
                locked: 1,
                with_resource_changes: 1,
                with_creates: 1,
                with_updates: 0,
                with_deletes: 1,
                without_resource_changes: 1,
                with_output_changes: 1,
                with_drifts: 0,
                with_imports: 0,
                with_moves: 1,
            }
        );
    }

    #[test]
    fn test_render_comment() {
        let comment = render_comment(&sample(), "https://plans.example.com/", "d1g3st");

        let expected = "\
## [↗️ Plans viewer](https://plans.example.com/#42)

<sup>[permalink](https://plans.example.com/#42_d1g3st)</sup>

* Total stacks: **4**
* ⚠️ With plan errors: **1**
* ⌛️ Locked: **1**
* 📋 With resource changes: **1** (🟢 **1** w/creates; 🔴 **1** w/deletes)
* 0️⃣ Without resource changes: **1**
* ⤴️ With output changes: **1**
* 🔁 With moves: **1**
";
        assert_eq!(comment, expected);
    }

    #[test]
    fn test_render_empty_report() {
        let comment = render_comment(&UiData::default(), "https://p", "x");
        assert!(comment.ends_with("* Total stacks: **0**\n"));
    }
}
