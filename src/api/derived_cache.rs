use crate::core::{Bar, Connector, Flattened, TableLayout, TickSet};

use super::invalidation::{Fingerprint, InvalidationTopic, InvalidationTopics};

/// Runtime metrics exposed by the derived-state cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivedCacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// One memoized value and the revisions it was computed from.
#[derive(Debug, Default)]
pub(super) struct Memo<T> {
    fingerprint: Option<Fingerprint>,
    value: T,
}

impl<T> Memo<T> {
    pub(super) fn is_fresh(&self, fingerprint: Fingerprint) -> bool {
        self.fingerprint == Some(fingerprint)
    }

    pub(super) fn store(&mut self, fingerprint: Fingerprint, value: T) {
        self.fingerprint = Some(fingerprint);
        self.value = value;
    }

    pub(super) fn value(&self) -> &T {
        &self.value
    }
}

pub(super) const FLATTEN_INPUTS: InvalidationTopics =
    InvalidationTopics::from_topic(InvalidationTopic::Data).with_topic(InvalidationTopic::Rows);

pub(super) const BAR_INPUTS: InvalidationTopics = FLATTEN_INPUTS
    .with_topic(InvalidationTopic::Scale)
    .with_topic(InvalidationTopic::Drag)
    .with_topic(InvalidationTopic::Presentation);

pub(super) const TICK_INPUTS: InvalidationTopics = InvalidationTopics::from_topic(InvalidationTopic::Scale)
    .with_topic(InvalidationTopic::Viewport)
    .with_topic(InvalidationTopic::Presentation);

pub(super) const TABLE_INPUTS: InvalidationTopics =
    InvalidationTopics::from_topic(InvalidationTopic::Columns).with_topic(InvalidationTopic::Viewport);

pub(super) const CONNECTOR_INPUTS: InvalidationTopics =
    BAR_INPUTS.with_topic(InvalidationTopic::Dependencies);

/// Memoized rows, bars, ticks, table layout and connectors.
#[derive(Debug, Default)]
pub(super) struct DerivedCache {
    pub(super) flattened: Memo<Flattened>,
    pub(super) bars: Memo<Vec<Bar>>,
    pub(super) ticks: Memo<TickSet>,
    pub(super) table: Memo<TableLayout>,
    pub(super) connectors: Memo<Vec<Connector>>,
    hits: u64,
    misses: u64,
}

impl DerivedCache {
    /// Counts one lookup; returns `true` when the value must be recomputed.
    pub(super) fn record_lookup(&mut self, fresh: bool) -> bool {
        if fresh {
            self.hits = self.hits.saturating_add(1);
        } else {
            self.misses = self.misses.saturating_add(1);
        }
        !fresh
    }

    pub(super) fn stats(&self) -> DerivedCacheStats {
        DerivedCacheStats {
            hits: self.hits,
            misses: self.misses,
        }
    }
}
