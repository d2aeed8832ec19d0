use tracing::debug;

use crate::error::{GanttError, GanttResult};
use crate::extensions::{GanttEvent, GanttPlugin};
use crate::interaction::DragTarget;
use crate::render::Renderer;

use super::GanttEngine;

impl<R: Renderer> GanttEngine<R> {
    /// Registers a plugin under a unique, non-blank id.
    ///
    /// A plugin joining mid-gesture first receives `DragStarted` for the live
    /// target, so every drag it observes opens before it updates or ends.
    pub fn register_plugin(&mut self, mut plugin: Box<dyn GanttPlugin>) -> GanttResult<()> {
        if plugin.id().trim().is_empty() {
            return Err(GanttError::InvalidData(
                "plugin id must not be blank".to_owned(),
            ));
        }
        if self.plugin_position(plugin.id()).is_some() {
            return Err(GanttError::InvalidData(format!(
                "plugin with id `{}` is already registered",
                plugin.id()
            )));
        }
        if let Some(target) = self.live_drag_target() {
            plugin.on_event(&GanttEvent::DragStarted { target }, self.plugin_context());
        }
        debug!(plugin_id = plugin.id(), "plugin registered");
        self.core.runtime.plugins.push(plugin);
        Ok(())
    }

    /// Unregisters a plugin by id. Returns `true` when removed.
    ///
    /// A plugin leaving mid-gesture receives `DragCancelled` for the live target.
    pub fn unregister_plugin(&mut self, plugin_id: &str) -> bool {
        let Some(position) = self.plugin_position(plugin_id) else {
            return false;
        };
        let mut plugin = self.core.runtime.plugins.remove(position);
        if let Some(target) = self.live_drag_target() {
            plugin.on_event(&GanttEvent::DragCancelled { target }, self.plugin_context());
        }
        debug!(
            plugin_id,
            remaining = self.core.runtime.plugins.len(),
            "plugin unregistered"
        );
        true
    }

    #[must_use]
    pub fn plugin_count(&self) -> usize {
        self.core.runtime.plugins.len()
    }

    #[must_use]
    pub fn has_plugin(&self, plugin_id: &str) -> bool {
        self.plugin_position(plugin_id).is_some()
    }

    fn plugin_position(&self, plugin_id: &str) -> Option<usize> {
        self.core
            .runtime
            .plugins
            .iter()
            .position(|plugin| plugin.id() == plugin_id)
    }

    /// Target of a session that has left the armed phase.
    fn live_drag_target(&self) -> Option<DragTarget> {
        self.core
            .interaction
            .session
            .as_ref()
            .filter(|session| session.is_dragging())
            .map(|session| session.target().clone())
    }
}
