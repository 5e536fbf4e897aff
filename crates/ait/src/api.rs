//! Flat re-exports for callers that want one import line.

// Radial offsets
pub use crate::grid::{
    radial, radial_1d, radial_2d, radial_3d, CenterRule, GridError, GridRank, RadialField,
};
// PNG I/O
pub use crate::image_io::{read_png, save_png, ImageIoError};
// Components
pub use crate::isolate::{isolate_mask, IsolateCfg};
pub use crate::labels::{component_sizes, label, Connectivity, LabelError};
// Names
pub use crate::naming::{unique_name, unique_names, NamePattern, NamePatternError, UniqueNamer};
// Columns
pub use crate::series::{is_string_series, is_text_values};
