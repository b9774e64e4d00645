// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for grid operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or editing grids
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed header: {0}")]
    Header(String),

    #[error("Line {line}: {message}")]
    Data { line: usize, message: String },

    /// The column count is given as `***` and the caller supplied no default.
    #[error("Grid width is unknown (***) and no default column count was given")]
    MissingDimension,

    #[error("Pixel ({col}, {row}) is outside the grid")]
    OutOfBounds { col: usize, row: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Data error at a 1-based line number
    pub fn data(line: usize, message: impl Into<String>) -> Self {
        Self::Data {
            line,
            message: message.into(),
        }
    }
}
