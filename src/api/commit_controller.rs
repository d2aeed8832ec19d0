use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{BarOverride, Geometry, ItemId};
use crate::error::{GanttError, GanttResult};
use crate::extensions::GanttEvent;
use crate::interaction::DragTarget;
use crate::render::Renderer;

use super::GanttEngine;
use super::invalidation::InvalidationTopic;

/// Dates a committed bar gesture asks the host to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    pub ticket: u64,
    pub item: ItemId,
    pub key: String,
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DragOutcome {
    /// No session was active.
    Idle,
    /// Released without moving.
    Click { target: DragTarget },
    /// Applied immediately; no confirmation needed.
    Committed { target: DragTarget, geometry: Geometry },
    /// Bar dates wait for [`GanttEngine::resolve_commit`].
    PendingConfirmation(CommitRequest),
    /// The item already has a commit in flight; the bar reverted.
    Rejected { item: ItemId },
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct PendingCommit {
    pub(super) request: CommitRequest,
}

impl<R: Renderer> GanttEngine<R> {
    /// Outstanding confirmation requests in ticket order.
    #[must_use]
    pub fn pending_commits(&self) -> Vec<CommitRequest> {
        self.core
            .interaction
            .pending
            .values()
            .map(|pending| pending.request.clone())
            .collect()
    }

    #[must_use]
    pub fn has_pending_commit(&self, item: ItemId) -> bool {
        self.pending_ticket_for(item).is_some()
    }

    /// Settles a pending commit: `true` persists the dates, `false` reverts the bar.
    pub fn resolve_commit(&mut self, ticket: u64, accepted: bool) -> GanttResult<()> {
        let pending = self
            .core
            .interaction
            .pending
            .shift_remove(&ticket)
            .ok_or(GanttError::UnknownCommit(ticket))?;
        let request = pending.request;
        let item = request.item;

        let dragging_item = self
            .core
            .interaction
            .session
            .as_ref()
            .and_then(|session| session.target().item());
        if dragging_item == Some(item) {
            // The live gesture reverts to the untouched dates if it is cancelled.
            if let Some(snapshot) = self.core.interaction.snapshot.as_mut() {
                snapshot.previous_override = None;
            }
        } else {
            self.core.interaction.overrides.remove(&item);
        }
        self.invalidate(InvalidationTopic::Drag);

        if accepted {
            let node = self.core.model.tree.node_mut(item)?;
            node.start = Some(request.start);
            node.end = Some(request.end);
            node.store_dates(&self.core.model.record_keys);
            self.invalidate(InvalidationTopic::Data);
            self.refresh_scale_window()?;
        }
        debug!(ticket, item = %item, accepted, "commit resolved");
        self.emit_event(GanttEvent::CommitResolved {
            ticket,
            item,
            accepted,
        });
        Ok(())
    }

    pub(super) fn pending_ticket_for(&self, item: ItemId) -> Option<u64> {
        self.core
            .interaction
            .pending
            .iter()
            .find(|(_, pending)| pending.request.item == item)
            .map(|(ticket, _)| *ticket)
    }

    /// Opens a pending commit for `item` and shows the requested dates optimistically.
    pub(super) fn open_commit(
        &mut self,
        item: ItemId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> GanttResult<CommitRequest> {
        let key = self.core.model.tree.node(item)?.key.clone();
        let ticket = self.core.interaction.next_ticket;
        self.core.interaction.next_ticket = ticket.wrapping_add(1);
        let request = CommitRequest {
            ticket,
            item,
            key,
            start,
            end,
        };
        self.core.interaction.pending.insert(
            ticket,
            PendingCommit {
                request: request.clone(),
            },
        );
        self.core
            .interaction
            .overrides
            .insert(item, BarOverride::Pending { start, end });
        self.invalidate(InvalidationTopic::Drag);
        debug!(ticket, item = %item, %start, %end, "commit requested");
        self.emit_event(GanttEvent::CommitRequested(request.clone()));
        Ok(request)
    }

    /// Drops every pending commit and optimistic geometry.
    pub(super) fn clear_pending_commits(&mut self) {
        self.core.interaction.pending.clear();
        self.core.interaction.overrides.clear();
        self.invalidate(InvalidationTopic::Drag);
    }
}
