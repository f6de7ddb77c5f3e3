//! Chart preparation: free-form quantity parsing and SVG rendering shared by
//! the recipe and ingredient chart endpoints.

mod quantity;
mod render;

pub use render::{prepare_chart, ChartError, ChartKind, ChartResponse, ChartRow};
