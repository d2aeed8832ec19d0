use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::sight::Sight;
use crate::core::ticks::TickSet;
use crate::core::time_scale::TimeScale;

/// Host-defined dated annotation such as a release or holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEvent {
    pub key: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub content: String,
}

impl CustomEvent {
    #[must_use]
    pub fn new(key: impl Into<String>, date: NaiveDate, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            date,
            content: content.into(),
        }
    }
}

/// Vertical marker line spanning the chart body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMarker {
    pub key: String,
    pub content: String,
    pub date: NaiveDate,
    pub x: f64,
    pub height: f64,
}

/// Markers for events that fall on a visible day.
///
/// Markers are a day-level annotation; other sights produce none.
#[must_use]
pub fn project_markers(
    events: &[CustomEvent],
    ticks: &TickSet,
    scale: TimeScale,
    sight: Sight,
    body_height: f64,
) -> Vec<EventMarker> {
    if sight != Sight::Day {
        return Vec::new();
    }
    events
        .iter()
        .filter(|event| ticks.minor_containing(event.date).is_some())
        .map(|event| EventMarker {
            key: event.key.clone(),
            content: event.content.clone(),
            date: event.date,
            x: scale.to_pixel(event.date),
            height: body_height,
        })
        .collect()
}
