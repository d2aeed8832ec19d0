use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::bar::{Bar, BarMetrics};
use crate::core::item::ItemTree;

/// Horizontal stub drawn out of and into a bar edge.
const CONNECTOR_STUB_PX: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependenceKind {
    StartFinish,
    FinishStart,
    StartStart,
    FinishFinish,
}

impl DependenceKind {
    /// `(leaves from the source's finish, enters at the target's finish)`.
    #[must_use]
    const fn edges(self) -> (bool, bool) {
        match self {
            Self::StartFinish => (false, true),
            Self::FinishStart => (true, false),
            Self::StartStart => (false, false),
            Self::FinishFinish => (true, true),
        }
    }
}

/// Directed rendering edge between two items, referenced by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependence {
    pub from: String,
    pub to: String,
    pub kind: DependenceKind,
}

impl Dependence {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: DependenceKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }
}

pub type ConnectorPoints = SmallVec<[(f64, f64); 6]>;

/// Orthogonal polyline between two visible, valid bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub from: String,
    pub to: String,
    pub kind: DependenceKind,
    pub points: ConnectorPoints,
}

/// Builds connectors for dependences whose endpoints are both visible and valid.
#[must_use]
pub fn build_connectors(
    tree: &ItemTree,
    dependences: &[Dependence],
    bars: &[Bar],
    metrics: BarMetrics,
) -> Vec<Connector> {
    let bar_for = |key: &str| {
        let id = tree.id_of(key)?;
        bars.iter().find(|bar| bar.item == id && !bar.invalid)
    };

    dependences
        .iter()
        .filter_map(|dependence| {
            let source = bar_for(&dependence.from)?;
            let target = bar_for(&dependence.to)?;
            Some(Connector {
                from: dependence.from.clone(),
                to: dependence.to.clone(),
                kind: dependence.kind,
                points: route(source, target, dependence.kind, metrics),
            })
        })
        .collect()
}

fn route(source: &Bar, target: &Bar, kind: DependenceKind, metrics: BarMetrics) -> ConnectorPoints {
    let (from_finish, to_finish) = kind.edges();
    let from_x = if from_finish {
        source.translate_x + source.width
    } else {
        source.translate_x
    };
    let to_x = if to_finish {
        target.translate_x + target.width
    } else {
        target.translate_x
    };
    let from_y = metrics.row_center(source.row_index);
    let to_y = metrics.row_center(target.row_index);

    let out_x = if from_finish {
        from_x + CONNECTOR_STUB_PX
    } else {
        from_x - CONNECTOR_STUB_PX
    };
    let in_x = if to_finish {
        to_x + CONNECTOR_STUB_PX
    } else {
        to_x - CONNECTOR_STUB_PX
    };

    let mut points = ConnectorPoints::new();
    points.push((from_x, from_y));
    points.push((out_x, from_y));
    if (from_finish && !to_finish && out_x <= in_x) || (!from_finish && to_finish && out_x >= in_x)
    {
        // Direct elbow: the stubs already face each other.
        points.push((out_x, to_y));
    } else {
        let mid_y = (from_y + to_y) / 2.0;
        points.push((out_x, mid_y));
        points.push((in_x, mid_y));
        points.push((in_x, to_y));
    }
    points.push((to_x, to_y));
    points
}
