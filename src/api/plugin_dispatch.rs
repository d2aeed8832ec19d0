use crate::extensions::{GanttEvent, PluginContext};
use crate::render::Renderer;

use super::GanttEngine;

impl<R: Renderer> GanttEngine<R> {
    pub(super) fn plugin_context(&self) -> PluginContext {
        PluginContext {
            container: self.core.view.container,
            sight: self.core.view.sight,
            translation: self.translation(),
            item_count: self.core.model.tree.len(),
            dragging: self.is_dragging(),
            disabled: self.core.interaction.disabled,
        }
    }

    pub(super) fn emit_event(&mut self, event: GanttEvent) {
        if self.core.runtime.plugins.is_empty() {
            return;
        }
        let context = self.plugin_context();
        for plugin in &mut self.core.runtime.plugins {
            plugin.on_event(&event, context);
        }
    }
}
