mod frame;
mod null_renderer;

pub use frame::GanttFrame;
pub use null_renderer::NullRenderer;

use crate::error::GanttResult;

/// Contract implemented by any painting backend.
///
/// Backends receive a fully materialized `GanttFrame` so drawing code stays
/// isolated from layout and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &GanttFrame) -> GanttResult<()>;
}
