//! Grid, image and labelling utilities.
//!
//! Every operation is a stateless function over caller-owned values:
//! - `grid`: radial offsets for 1D/2D/3D grids.
//! - `image_io`: PNG read/write over `ndarray` pixels.
//! - `labels` / `isolate`: connected components and size filtering.
//! - `naming`: collision-free renaming.
//! - `series`: text-column detection for polars columns.

pub mod api;
pub mod cfg;
pub mod grid;
pub mod image_io;
pub mod isolate;
pub mod labels;
pub mod naming;
pub mod series;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use grid::{radial, GridError, GridRank, RadialField};
pub use image_io::{read_png, save_png, ImageIoError};
pub use isolate::{isolate_mask, IsolateCfg};
pub use labels::{label, Connectivity, LabelError};
pub use naming::{unique_name, unique_names, NamePattern, UniqueNamer};
pub use series::is_string_series;
