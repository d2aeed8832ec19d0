use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::record::{Record, RecordValue, parse_date};
use crate::error::{GanttError, GanttResult};

/// Arena index of an item. Stable until the next data replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl ItemId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Nested item description supplied by the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemInput {
    pub key: String,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub collapsed: bool,
    /// Explicit group flag; items with children are groups regardless.
    #[serde(default)]
    pub group: bool,
    #[serde(default)]
    pub fixed_dates: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub record: Record,
    #[serde(default)]
    pub children: Vec<ItemInput>,
}

impl ItemInput {
    #[must_use]
    pub fn new(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<ItemInput>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    #[must_use]
    pub fn fixed_dates(mut self, fixed: bool) -> Self {
        self.fixed_dates = fixed;
        self
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: RecordValue) -> Self {
        self.record.insert(name.into(), value);
        self
    }
}

/// Field names used when importing raw JSON records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordKeys {
    pub key: String,
    pub start: String,
    pub end: String,
    pub content: String,
    pub children: String,
}

impl Default for RecordKeys {
    fn default() -> Self {
        Self {
            key: "id".to_owned(),
            start: "startDate".to_owned(),
            end: "endDate".to_owned(),
            content: "name".to_owned(),
            children: "children".to_owned(),
        }
    }
}

impl RecordKeys {
    #[must_use]
    pub fn with_date_keys(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start = start.into();
        self.end = end.into();
        self
    }
}

/// Converts a JSON array of nested records into item inputs.
///
/// Missing keys fall back to the record's path (`"0.2.1"`); unparseable dates
/// become `None` and later render as invalid bars.
pub fn items_from_json(records: &serde_json::Value, keys: &RecordKeys) -> GanttResult<Vec<ItemInput>> {
    let serde_json::Value::Array(entries) = records else {
        return Err(GanttError::InvalidData(
            "record list must be a json array".to_owned(),
        ));
    };
    entries
        .iter()
        .enumerate()
        .map(|(position, entry)| item_from_json(entry, keys, &position.to_string()))
        .collect()
}

fn item_from_json(entry: &serde_json::Value, keys: &RecordKeys, path: &str) -> GanttResult<ItemInput> {
    let serde_json::Value::Object(fields) = entry else {
        return Err(GanttError::InvalidData(format!(
            "record at `{path}` must be a json object"
        )));
    };

    let key = match fields.get(&keys.key) {
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(serde_json::Value::Number(number)) => number.to_string(),
        _ => path.to_owned(),
    };
    let date_field = |name: &str| fields.get(name).and_then(|value| value.as_str()).and_then(parse_date);
    let flag = |name: &str| fields.get(name).and_then(serde_json::Value::as_bool).unwrap_or(false);

    let children = match fields.get(&keys.children) {
        Some(serde_json::Value::Array(children)) => children
            .iter()
            .enumerate()
            .map(|(position, child)| item_from_json(child, keys, &format!("{path}.{position}")))
            .collect::<GanttResult<Vec<_>>>()?,
        _ => Vec::new(),
    };

    let record = fields
        .iter()
        .filter(|(name, _)| **name != keys.children)
        .map(|(name, value)| (name.clone(), RecordValue::from_json(value)))
        .collect();

    Ok(ItemInput {
        key,
        start: date_field(&keys.start),
        end: date_field(&keys.end),
        content: fields
            .get(&keys.content)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        collapsed: flag("collapsed"),
        group: flag("group"),
        fixed_dates: flag("fixedDates"),
        disabled: flag("disabled"),
        record,
        children,
    })
}

/// One arena slot. Parent/children are indices, never owning references.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemNode {
    pub id: ItemId,
    pub key: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub content: String,
    pub collapsed: bool,
    pub group: bool,
    pub fixed_dates: bool,
    pub disabled: bool,
    pub record: Record,
    pub parent: Option<ItemId>,
    pub children: Vec<ItemId>,
}

impl ItemNode {
    /// Groups are explicitly flagged items or any item owning children.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.group || !self.children.is_empty()
    }

    /// Writes the scheduled dates into the record under `keys`, so date
    /// columns read what the chart draws. Missing dates leave the record as is.
    pub fn store_dates(&mut self, keys: &RecordKeys) {
        if let Some(start) = self.start {
            self.record.insert(keys.start.clone(), RecordValue::Date(start));
        }
        if let Some(end) = self.end {
            self.record.insert(keys.end.clone(), RecordValue::Date(end));
        }
    }

    /// Bars of derived groups follow their descendants and cannot be dragged.
    #[must_use]
    pub fn has_derived_span(&self) -> bool {
        self.is_group() && !self.fixed_dates && !self.children.is_empty()
    }
}

/// Arena-backed item hierarchy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemTree {
    nodes: Vec<ItemNode>,
    roots: Vec<ItemId>,
    by_key: HashMap<String, ItemId>,
}

impl ItemTree {
    /// Builds the arena in pre-order. Duplicate keys are rejected.
    pub fn from_inputs(inputs: Vec<ItemInput>) -> GanttResult<Self> {
        let mut tree = Self::default();
        for input in inputs {
            let id = tree.insert(input, None)?;
            tree.roots.push(id);
        }
        Ok(tree)
    }

    fn insert(&mut self, input: ItemInput, parent: Option<ItemId>) -> GanttResult<ItemId> {
        if self.by_key.contains_key(&input.key) {
            return Err(GanttError::InvalidData(format!(
                "duplicate item key `{}`",
                input.key
            )));
        }
        let raw = u32::try_from(self.nodes.len())
            .map_err(|_| GanttError::InvalidData("too many items".to_owned()))?;
        let id = ItemId(raw);
        self.by_key.insert(input.key.clone(), id);
        self.nodes.push(ItemNode {
            id,
            key: input.key,
            start: input.start,
            end: input.end,
            content: input.content,
            collapsed: input.collapsed,
            group: input.group,
            fixed_dates: input.fixed_dates,
            disabled: input.disabled,
            record: input.record,
            parent,
            children: Vec::new(),
        });
        for child in input.children {
            let child_id = self.insert(child, Some(id))?;
            self.nodes[id.index()].children.push(child_id);
        }
        Ok(id)
    }

    /// [`ItemNode::store_dates`] for every node.
    pub fn store_dates(&mut self, keys: &RecordKeys) {
        for node in &mut self.nodes {
            node.store_dates(keys);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn roots(&self) -> &[ItemId] {
        &self.roots
    }

    #[must_use]
    pub fn nodes(&self) -> &[ItemNode] {
        &self.nodes
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&ItemNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut ItemNode> {
        self.nodes.get_mut(id.index())
    }

    pub fn node(&self, id: ItemId) -> GanttResult<&ItemNode> {
        self.get(id).ok_or(GanttError::UnknownItem(id))
    }

    pub fn node_mut(&mut self, id: ItemId) -> GanttResult<&mut ItemNode> {
        self.get_mut(id).ok_or(GanttError::UnknownItem(id))
    }

    #[must_use]
    pub fn id_of(&self, key: &str) -> Option<ItemId> {
        self.by_key.get(key).copied()
    }

    /// Earliest start and latest end over all dated items.
    #[must_use]
    pub fn date_extent(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.nodes
            .iter()
            .flat_map(|node| [node.start, node.end])
            .flatten()
            .fold(None, |extent, date| match extent {
                None => Some((date, date)),
                Some((min, max)) => Some((min.min(date), max.max(date))),
            })
    }

    /// `true` when `ancestor` is `id` or lies on its parent chain.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: ItemId, id: ItemId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.get(current).and_then(|node| node.parent);
        }
        false
    }

    /// Moves `id` under `new_parent` (or to the roots) at `position`.
    ///
    /// Positions past the end append. Moving an item below itself is rejected.
    pub fn reparent(
        &mut self,
        id: ItemId,
        new_parent: Option<ItemId>,
        position: usize,
    ) -> GanttResult<()> {
        let old_parent = self.node(id)?.parent;
        if let Some(parent) = new_parent {
            self.node(parent)?;
            if self.is_ancestor_or_self(id, parent) {
                return Err(GanttError::InvalidData(format!(
                    "cannot move item {id} below itself"
                )));
            }
        }

        let siblings = match old_parent {
            Some(parent) => &mut self.node_mut(parent)?.children,
            None => &mut self.roots,
        };
        siblings.retain(|sibling| *sibling != id);

        let siblings = match new_parent {
            Some(parent) => &mut self.node_mut(parent)?.children,
            None => &mut self.roots,
        };
        let position = position.min(siblings.len());
        siblings.insert(position, id);

        self.node_mut(id)?.parent = new_parent;
        Ok(())
    }
}
