// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! flooding-tess - tessellation and grid inspection for flood scenarios.
//!
//! # Commands
//!
//! - `voronoi` - Voronoi diagram of a point file, optionally clipped
//! - `delaunay` - Delaunay triangles of a point file
//! - `generalized` - one merged cell per linear object
//! - `fls` - wet area per frame of a Delft-FLS incremental file
//!
//! Results are written to stdout as JSON, logs go to stderr.

use anyhow::Result;
use clap::Parser;

mod commands;
mod config;
mod types;

use commands::{run, Cli};
use config::Config;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    tracing::debug!(
        ndigits = config.ndigits,
        clip_margin = ?config.clip_margin,
        density = config.density,
        "Loaded configuration"
    );

    let cli = Cli::parse();
    let output = run(&cli.command, &config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
