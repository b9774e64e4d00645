// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flooding Grid
//!
//! Raster input of flood scenarios: ESRI ASCII grids and the incremental
//! water-depth files written by Delft-FLS.
//!
//! ## Quick start
//!
//! ```
//! use flooding_grid::{AscGrid, Pixel};
//!
//! let text = "ncols 2\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 10\n\
//!             nodata_value -999\n1.5 -999\n";
//! let grid = AscGrid::parse(text)?;
//! assert_eq!(grid.get(1, 1), Pixel::Value(1.5));
//! assert_eq!(grid.get_at(15.0, 5.0), Pixel::NoData);
//! # Ok::<(), flooding_grid::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialize grid headers and pixels

pub mod asc;
pub mod error;
pub mod fls;

pub use asc::{AscGrid, AscHeader, Pixel, DEFAULT_NODATA_VALUE};
pub use error::{Error, Result};
pub use fls::{count_frames, FlsHeader, FlsOptions, FlsReader};
