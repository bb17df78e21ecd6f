//! HousePaint: recolor regions of house photos with a tolerance-bounded flood
//! fill, with snapshot undo/redo and a local store of saved pictures.

pub mod logger;

pub mod canvas;
pub mod cli;
pub mod color;
pub mod components;
pub mod io;
pub mod ops;
pub mod project;
pub mod settings;
pub mod store;

pub use color::{ParsedHex, blend, colors_match, hex_to_color, parse_hex};
pub use components::history::HistoryManager;
pub use ops::{FillReport, FillRequest, flood_fill, flood_fill_mut};
pub use project::PaintSession;
