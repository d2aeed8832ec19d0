pub mod bar;
pub mod column;
pub mod dependence;
pub mod hierarchy;
pub mod item;
pub mod label_format;
pub mod marker;
pub mod record;
pub mod sight;
pub mod ticks;
pub mod time_scale;
pub mod types;

pub use bar::{Bar, BarMetrics, BarOverride};
pub use column::{
    CellFormatterFn, Column, ColumnAlign, ColumnConfig, ColumnKind, ColumnSizing, ResolvedColumn,
    TableLayout,
};
pub use dependence::{Connector, Dependence, DependenceKind};
pub use hierarchy::{EffectiveSpan, Flattened, Row, SpanWarning};
pub use item::{ItemId, ItemInput, ItemNode, ItemTree, RecordKeys};
pub use label_format::{DurationFn, GanttLocale, RestDayFn, WorkdayMode};
pub use marker::{CustomEvent, EventMarker};
pub use record::{Record, RecordValue};
pub use sight::{CalendarUnit, Sight, SightCatalog, SightConfig};
pub use ticks::{Tick, TickSet};
pub use time_scale::{TimeScale, TimelineRange};
pub use types::{Geometry, PixelRange, ScrollBar, ScrollExtent, Viewport};
