//! Spatial index reader for the borehole point dataset.
//!
//! Loads borehole records from a CSV export of the BGS borehole index,
//! optionally restricted to the boreholes inside a boundary.

mod filter;
mod polygon;
mod reader;

pub use filter::{BoundaryIndex, BoundsFilter};
pub use polygon::load_points_polygon;
pub use reader::read_boreholes;
