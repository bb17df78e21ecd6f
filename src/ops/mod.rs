pub mod flood_fill;

pub use flood_fill::{DEFAULT_TOLERANCE, FillReport, FillRequest, flood_fill, flood_fill_mut};
