pub mod guides;
pub mod line_chart;
pub mod markers;
pub mod time_axis;
pub mod value_axis;

pub use line_chart::{ChartState, PlottedPoint, UpdateSummary};
pub use markers::{JoinKey, Marker, MarkerKey, MarkerSet};
