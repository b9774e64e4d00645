// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line parsing and the commands themselves.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _, Result};
use clap::{Parser, Subcommand};
use flooding_geometry::{
    compute_delaunay_triangulation, compute_generalized_voronoi_diagram, compute_voronoi_diagram,
    resolve_points, ClipRegion, LinearGeometry, Point2, PointLike, Rect, VoronoiConfig,
};
use flooding_grid::{FlsOptions, FlsReader};
use serde_json::Value;

use crate::config::Config;
use crate::types::{DelaunayOutput, FlsOutput, FrameData, GeneralizedOutput, VoronoiOutput};

const ENVIRONMENT: &str = "\
Points files hold one `x y` point per line. Lines files hold one object per
line as `x,y x,y ...`. Lines starting with # are ignored.

Environment:
  FLOODING_NDIGITS, FLOODING_CLIP_MARGIN, FLOODING_DENSITY, FLOODING_NO_DATA
  RUST_LOG (default info)";

/// flooding-tess - tessellation and grid inspection for flood scenarios
#[derive(Parser, Debug)]
#[command(name = "flooding-tess", version, about, after_help = ENVIRONMENT)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// One invocation of the tool
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Voronoi diagram of a point file
    Voronoi {
        path: PathBuf,

        /// Clip rectangle as `X0,Y0,X1,Y1`
        #[arg(long, value_parser = parse_clip, allow_hyphen_values = true)]
        clip: Option<Rect>,

        /// Clip to the data bounds grown by this margin
        #[arg(long, conflicts_with = "clip", allow_negative_numbers = true)]
        margin: Option<f64>,

        /// Decimals kept when merging nearby vertices
        #[arg(long)]
        ndigits: Option<u32>,
    },

    /// Delaunay triangles of a point file
    Delaunay { path: PathBuf },

    /// One merged cell per linear object
    Generalized {
        path: PathBuf,

        /// Largest spacing of points placed along the objects
        #[arg(long)]
        density: Option<f64>,

        #[arg(long)]
        margin: Option<f64>,
    },

    /// Wet area per frame of a Delft-FLS incremental file
    Fls {
        path: PathBuf,

        /// Only the first frame of every whole hour
        #[arg(long)]
        one_per_hour: bool,

        /// Column count for files that give `***`
        #[arg(long)]
        ncols: Option<usize>,

        #[arg(long, allow_negative_numbers = true)]
        no_data: Option<f64>,
    },
}

/// `X0,Y0,X1,Y1` in any corner order
fn parse_clip(s: &str) -> Result<Rect, String> {
    let corners = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|e| format!("Invalid clip '{}': {}", s, e))?;
    let [x0, y0, x1, y1] = corners[..] else {
        return Err(format!("Invalid clip '{}': expected X0,Y0,X1,Y1", s));
    };
    Rect::from_corners(Point2::new(x0, y0), Point2::new(x1, y1)).map_err(|e| e.to_string())
}

/// An explicit rectangle wins over a margin, a flag over the environment
fn clip_region(clip: Option<Rect>, margin: Option<f64>, config: &Config) -> Option<ClipRegion> {
    match clip {
        Some(rect) => Some(ClipRegion::Rect(rect)),
        None => margin.or(config.clip_margin).map(ClipRegion::Margin),
    }
}

fn significant_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Points, one `x y` per line
pub fn parse_points(text: &str) -> Result<Vec<Point2<f64>>> {
    let points: Vec<PointLike> = significant_lines(text).map(PointLike::from).collect();
    Ok(resolve_points(&points)?)
}

/// Linear objects, one `x,y x,y ...` per line
pub fn parse_objects(text: &str) -> Result<Vec<LinearGeometry>> {
    significant_lines(text)
        .enumerate()
        .map(|(i, line)| {
            let coords = line
                .split_whitespace()
                .map(|pair| {
                    let (x, y) = pair
                        .split_once(',')
                        .ok_or_else(|| anyhow!("expected x,y, got '{}'", pair))?;
                    Ok(Point2::new(x.trim().parse()?, y.trim().parse()?))
                })
                .collect::<Result<Vec<Point2<f64>>>>()
                .with_context(|| format!("object {}", i + 1))?;
            Ok(match coords.as_slice() {
                [single] => LinearGeometry::Point(*single),
                _ => LinearGeometry::LineString(coords),
            })
        })
        .collect()
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Run a command and return its JSON output.
///
/// Options left out on the command line fall back to `config`.
pub fn run(command: &Command, config: &Config) -> Result<Value> {
    let output = match command {
        Command::Voronoi {
            path,
            clip,
            margin,
            ndigits,
        } => {
            let points = parse_points(&read(path)?)?;
            let mut voronoi = VoronoiConfig::new().with_ndigits(ndigits.unwrap_or(config.ndigits));
            if let Some(region) = clip_region(*clip, *margin, config) {
                voronoi = voronoi.with_region(region);
            }
            let diagram = compute_voronoi_diagram(&points, &voronoi)?;
            tracing::info!(
                points = points.len(),
                cells = diagram.polygons.len(),
                "Computed Voronoi diagram"
            );
            serde_json::to_value(VoronoiOutput::from(&diagram))?
        }
        Command::Delaunay { path } => {
            let points = parse_points(&read(path)?)?;
            let triangles = compute_delaunay_triangulation(&points)?;
            tracing::info!(points = points.len(), triangles = triangles.len(), "Triangulated");
            serde_json::to_value(DelaunayOutput { triangles })?
        }
        Command::Generalized {
            path,
            density,
            margin,
        } => {
            let objects = parse_objects(&read(path)?)?;
            let density = density.unwrap_or(config.density);
            let region = ClipRegion::Margin(margin.or(config.clip_margin).unwrap_or(0.0));
            let result = compute_generalized_voronoi_diagram(&objects, density, region)?;
            tracing::info!(objects = objects.len(), "Computed generalized Voronoi diagram");
            serde_json::to_value(GeneralizedOutput::from(&result))?
        }
        Command::Fls {
            path,
            one_per_hour,
            ncols,
            no_data,
        } => {
            let options = FlsOptions {
                no_data_value: no_data.unwrap_or(config.no_data),
                one_per_hour: *one_per_hour,
                default_ncols: *ncols,
            };
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            serde_json::to_value(summarize_fls(BufReader::new(file), options)?)?
        }
    };
    Ok(output)
}

/// Wet cell count and area of every frame.
pub fn summarize_fls<R: std::io::BufRead>(reader: R, options: FlsOptions) -> Result<FlsOutput> {
    let reader = FlsReader::new(reader, options)?;
    let grid = reader.header().asc_header(options.no_data_value);
    let geo_transform = reader.geo_transform(None);
    let cell_area = grid.cellsize * grid.cellsize;

    let frames = reader
        .map(|frame| {
            let (timestamp, frame) = frame?;
            let depths: Vec<f64> = frame.values().flatten().filter(|d| *d > 0.0).collect();
            Ok(FrameData {
                timestamp,
                wet_cells: depths.len(),
                wet_area: depths.len() as f64 * cell_area,
                max_depth: depths.iter().copied().reduce(f64::max),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(frames = frames.len(), "Read FLS frames");

    Ok(FlsOutput {
        grid,
        geo_transform,
        frames,
    })
}
