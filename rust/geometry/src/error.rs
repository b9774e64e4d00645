// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building tessellations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Empty input: at least one point is required")]
    EmptyInput,

    /// Site sets the sweep cannot process, such as every site sharing one x
    /// coordinate (the edge-list hash would divide by a zero width).
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Invalid point: {0}")]
    InvalidPoint(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot assemble cell around ({x}, {y}): {reason}")]
    UnsupportedCell { x: f64, y: f64, reason: String },

    #[error("Polygon union failed: {0}")]
    Union(String),
}
