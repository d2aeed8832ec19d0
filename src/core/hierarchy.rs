//! Flattening of the collapsible item tree into visible rows.
//!
//! Rows are rebuilt from scratch on every structural change; nothing here is
//! mutated in place. Span aggregation walks the whole tree, collapsed subtrees
//! included, so a collapsed group still reports the extent of its descendants.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::item::{ItemId, ItemTree};

/// One visible row in pre-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub item: ItemId,
    pub depth: usize,
    pub index: usize,
    pub parent: Option<ItemId>,
    pub child_count: usize,
    pub group: bool,
    pub collapsed: bool,
}

/// Displayed span of an item after group aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectiveSpan {
    Valid { start: NaiveDate, end: NaiveDate },
    Invalid,
}

impl EffectiveSpan {
    #[must_use]
    pub fn from_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) if start <= end => Self::Valid { start, end },
            _ => Self::Invalid,
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    #[must_use]
    pub fn dates(self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Self::Valid { start, end } => Some((start, end)),
            Self::Invalid => None,
        }
    }

    fn union(self, other: Self) -> Self {
        match (self, other) {
            (Self::Invalid, span) | (span, Self::Invalid) => span,
            (
                Self::Valid { start, end },
                Self::Valid {
                    start: other_start,
                    end: other_end,
                },
            ) => Self::Valid {
                start: start.min(other_start),
                end: end.max(other_end),
            },
        }
    }
}

/// A descendant extends past the authoritative span of a fixed-dates group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanWarning {
    pub group: ItemId,
    pub descendant: ItemId,
    pub group_span: (NaiveDate, NaiveDate),
    pub descendant_span: (NaiveDate, NaiveDate),
}

/// Output of one flatten pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattened {
    pub rows: Vec<Row>,
    /// Indexed by `ItemId::index`; covers every item, visible or not.
    pub spans: Vec<EffectiveSpan>,
    pub warnings: Vec<SpanWarning>,
}

impl Flattened {
    #[must_use]
    pub fn span(&self, item: ItemId) -> EffectiveSpan {
        self.spans
            .get(item.index())
            .copied()
            .unwrap_or(EffectiveSpan::Invalid)
    }

    /// Visible row position of `item`, if it is currently shown.
    #[must_use]
    pub fn row_of(&self, item: ItemId) -> Option<&Row> {
        self.rows.iter().find(|row| row.item == item)
    }
}

/// Flattens the tree into visible rows and resolves every item's span.
#[must_use]
pub fn flatten(tree: &ItemTree) -> Flattened {
    let (spans, warnings) = resolve_spans(tree);
    let mut rows = Vec::with_capacity(tree.len());

    // Explicit stack instead of recursion; children are pushed in reverse so
    // they pop in declaration order.
    let mut stack: Vec<(ItemId, usize)> = tree.roots().iter().rev().map(|id| (*id, 0)).collect();
    while let Some((id, depth)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        rows.push(Row {
            item: id,
            depth,
            index: rows.len(),
            parent: node.parent,
            child_count: node.children.len(),
            group: node.is_group(),
            collapsed: node.collapsed,
        });
        if !node.collapsed {
            stack.extend(node.children.iter().rev().map(|child| (*child, depth + 1)));
        }
    }

    Flattened {
        rows,
        spans,
        warnings,
    }
}

/// Number of rows `flatten` would emit, without building them.
#[must_use]
pub fn count_visible_rows(tree: &ItemTree) -> usize {
    let mut count = 0;
    let mut stack: Vec<ItemId> = tree.roots().to_vec();
    while let Some(id) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        count += 1;
        if !node.collapsed {
            stack.extend(node.children.iter().copied());
        }
    }
    count
}

/// Post-order span aggregation over every item.
#[must_use]
pub fn resolve_spans(tree: &ItemTree) -> (Vec<EffectiveSpan>, Vec<SpanWarning>) {
    let mut spans = vec![EffectiveSpan::Invalid; tree.len()];
    let mut warnings = Vec::new();

    for id in post_order(tree) {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let own = EffectiveSpan::from_dates(node.start, node.end);
        let span = if node.has_derived_span() {
            let aggregated = node
                .children
                .iter()
                .map(|child| spans[child.index()])
                .fold(EffectiveSpan::Invalid, EffectiveSpan::union);
            if aggregated.is_valid() { aggregated } else { own }
        } else {
            own
        };
        spans[id.index()] = span;

        if node.is_group() && node.fixed_dates {
            if let Some(group_span) = own.dates() {
                collect_fixed_span_warnings(tree, &spans, id, group_span, &mut warnings);
            }
        }
    }

    (spans, warnings)
}

fn collect_fixed_span_warnings(
    tree: &ItemTree,
    spans: &[EffectiveSpan],
    group: ItemId,
    group_span: (NaiveDate, NaiveDate),
    warnings: &mut Vec<SpanWarning>,
) {
    let Some(node) = tree.get(group) else {
        return;
    };
    let mut pending: Vec<ItemId> = node.children.clone();
    while let Some(descendant) = pending.pop() {
        if let Some(descendant_span) = spans[descendant.index()].dates() {
            if descendant_span.0 < group_span.0 || descendant_span.1 > group_span.1 {
                warn!(
                    group = %group,
                    descendant = %descendant,
                    "descendant span exceeds fixed group dates"
                );
                warnings.push(SpanWarning {
                    group,
                    descendant,
                    group_span,
                    descendant_span,
                });
            }
        }
        if let Some(child) = tree.get(descendant) {
            pending.extend(child.children.iter().copied());
        }
    }
}

fn post_order(tree: &ItemTree) -> Vec<ItemId> {
    let mut order = Vec::with_capacity(tree.len());
    let mut stack: Vec<(ItemId, bool)> = tree.roots().iter().rev().map(|id| (*id, false)).collect();
    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            order.push(id);
            continue;
        }
        stack.push((id, true));
        if let Some(node) = tree.get(id) {
            stack.extend(node.children.iter().rev().map(|child| (*child, false)));
        }
    }
    order
}
