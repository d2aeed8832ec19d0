use serde::{Deserialize, Serialize};

use crate::render::Renderer;

use super::GanttEngine;

/// Ordered repaint classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum InvalidationLevel {
    #[default]
    None,
    /// Translation or live drag geometry only.
    Light,
    Full,
}

impl InvalidationLevel {
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        if self as u8 >= other as u8 {
            self
        } else {
            other
        }
    }
}

/// Source of engine state a derived value can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidationTopic {
    /// Item set, dates or hierarchy.
    Data,
    /// Collapse state.
    Rows,
    /// Sight, scale window or today.
    Scale,
    Viewport,
    Columns,
    /// Live or pending bar geometry and the disabled flag.
    Drag,
    Dependencies,
    /// Locale, rest days and duration rules.
    Presentation,
}

impl InvalidationTopic {
    pub const ALL: [InvalidationTopic; 8] = [
        Self::Data,
        Self::Rows,
        Self::Scale,
        Self::Viewport,
        Self::Columns,
        Self::Drag,
        Self::Dependencies,
        Self::Presentation,
    ];

    pub(super) const fn slot(self) -> usize {
        match self {
            Self::Data => 0,
            Self::Rows => 1,
            Self::Scale => 2,
            Self::Viewport => 3,
            Self::Columns => 4,
            Self::Drag => 5,
            Self::Dependencies => 6,
            Self::Presentation => 7,
        }
    }

    const fn bit(self) -> u16 {
        1 << self.slot()
    }

    /// Repaint class a change to this topic requires.
    #[must_use]
    pub const fn level(self) -> InvalidationLevel {
        match self {
            Self::Viewport | Self::Drag => InvalidationLevel::Light,
            _ => InvalidationLevel::Full,
        }
    }
}

/// Bitmask of invalidation topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InvalidationTopics {
    bits: u16,
}

impl InvalidationTopics {
    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self { bits: 0xFF }
    }

    #[must_use]
    pub const fn from_topic(topic: InvalidationTopic) -> Self {
        Self { bits: topic.bit() }
    }

    #[must_use]
    pub const fn with_topic(self, topic: InvalidationTopic) -> Self {
        Self {
            bits: self.bits | topic.bit(),
        }
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    #[must_use]
    pub const fn contains_topic(self, topic: InvalidationTopic) -> bool {
        (self.bits & topic.bit()) != 0
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }
}

/// Coalesced repaint request consumed by host frame scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InvalidationMask {
    level: InvalidationLevel,
    #[serde(default)]
    topics: InvalidationTopics,
}

impl InvalidationMask {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            level: InvalidationLevel::None,
            topics: InvalidationTopics::none(),
        }
    }

    #[must_use]
    pub const fn full() -> Self {
        Self {
            level: InvalidationLevel::Full,
            topics: InvalidationTopics::all(),
        }
    }

    #[must_use]
    pub const fn from_topic(topic: InvalidationTopic) -> Self {
        Self {
            level: topic.level(),
            topics: InvalidationTopics::from_topic(topic),
        }
    }

    #[must_use]
    pub const fn level(self) -> InvalidationLevel {
        self.level
    }

    #[must_use]
    pub const fn topics(self) -> InvalidationTopics {
        self.topics
    }

    #[must_use]
    pub const fn has_topic(self, topic: InvalidationTopic) -> bool {
        self.topics.contains_topic(topic)
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self.level, InvalidationLevel::None)
    }

    pub fn merge(&mut self, other: Self) {
        self.level = self.level.max(other.level);
        self.topics = self.topics.union(other.topics);
    }
}

/// Monotonic change counters, one per topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) struct Revisions {
    counters: [u64; 8],
}

impl Revisions {
    pub(super) fn bump(&mut self, topic: InvalidationTopic) {
        let slot = &mut self.counters[topic.slot()];
        *slot = slot.wrapping_add(1);
    }

    #[must_use]
    pub(super) fn get(&self, topic: InvalidationTopic) -> u64 {
        self.counters[topic.slot()]
    }

    /// Counters of `topics` only; other slots read as zero.
    #[must_use]
    pub(super) fn fingerprint(&self, topics: InvalidationTopics) -> Fingerprint {
        let mut counters = [0; 8];
        for topic in InvalidationTopic::ALL {
            if topics.contains_topic(topic) {
                counters[topic.slot()] = self.counters[topic.slot()];
            }
        }
        Fingerprint(counters)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct Fingerprint([u64; 8]);

impl<R: Renderer> GanttEngine<R> {
    /// Pending repaint request accumulated since the last take.
    #[must_use]
    pub fn pending_invalidation(&self) -> InvalidationMask {
        self.core.runtime.pending_invalidation
    }

    /// Returns and clears the pending repaint request.
    pub fn take_pending_invalidation(&mut self) -> InvalidationMask {
        std::mem::take(&mut self.core.runtime.pending_invalidation)
    }

    /// Revision counter of `topic`; bumps on every change to that state.
    #[must_use]
    pub fn revision(&self, topic: InvalidationTopic) -> u64 {
        self.core.runtime.revisions.get(topic)
    }

    pub(super) fn invalidate(&mut self, topic: InvalidationTopic) {
        self.core.runtime.revisions.bump(topic);
        self.core
            .runtime
            .pending_invalidation
            .merge(InvalidationMask::from_topic(topic));
    }
}
