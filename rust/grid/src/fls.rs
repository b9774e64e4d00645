// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Delft-FLS incremental files (`fls_h.inc`)
//!
//! The header names the grid size, its placement and a table of classes.
//! It is followed by frames: a timestamp line, then one `m n class` line for
//! every cell that changed since the previous frame. Cells keep their value
//! until a later frame overwrites them.

use std::io::{BufRead, Lines};

use crate::asc::{AscGrid, AscHeader};
use crate::error::{Error, Result};

/// How frames are read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlsOptions {
    /// Written for cells no frame has touched yet
    pub no_data_value: f64,
    /// Yield only the first frame of every whole hour
    pub one_per_hour: bool,
    /// Column count to use when the file gives `***`
    pub default_ncols: Option<usize>,
}

impl Default for FlsOptions {
    fn default() -> Self {
        Self {
            no_data_value: -999.0,
            one_per_hour: false,
            default_ncols: None,
        }
    }
}

/// Dimensions, placement and classes of an incremental file
#[derive(Debug, Clone, PartialEq)]
pub struct FlsHeader {
    pub ncols: usize,
    pub nrows: usize,
    pub dx: f64,
    /// Centre of the western column
    pub x0: f64,
    /// Centre of the southern row in older files, of the northern row in newer ones
    pub y0: f64,
    /// One row of values per class, one column per quantity
    pub classes: Vec<Vec<f64>>,
}

impl FlsHeader {
    /// Whether `y0` lies at the south of the grid.
    ///
    /// The file alone cannot tell. A helper transform of the same region
    /// always has its `y0` at the north edge; if that is more than a tenth
    /// of the grid height north of this `y0`, this one is the southern one.
    fn y0_is_south(&self, helper: Option<&[f64; 6]>) -> bool {
        helper.is_some_and(|h| h[3] > self.y0 + 0.1 * (self.nrows as f64 * self.dx))
    }

    /// GDAL-style affine transform `[x0, dx, 0, y0, 0, -dx]` with `y0` at the north
    pub fn geo_transform(&self, helper: Option<&[f64; 6]>) -> [f64; 6] {
        let y0 = if self.y0_is_south(helper) {
            self.y0 + self.nrows as f64 * self.dx
        } else {
            self.y0
        };
        [self.x0, self.dx, 0.0, y0, 0.0, -self.dx]
    }

    /// Placement of the frames as ASCII grids
    pub fn asc_header(&self, no_data_value: f64) -> AscHeader {
        AscHeader {
            ncols: self.ncols,
            nrows: self.nrows,
            xllcorner: self.x0 - self.dx / 2.0,
            yllcorner: self.y0 - self.dx / 2.0,
            cellsize: self.dx,
            nodata_value: no_data_value,
        }
    }
}

/// Frame currently being filled
#[derive(Debug, Clone, Copy)]
struct Frame {
    timestamp: f64,
    class_column: usize,
    yielded: bool,
}

/// Reads the frames of an incremental file one at a time
pub struct FlsReader<R> {
    header: FlsHeader,
    options: FlsOptions,
    lines: Lines<R>,
    lineno: usize,
    grid: AscGrid,
    frame: Option<Frame>,
    last_yielded_hour: Option<i64>,
    done: bool,
}

fn tokens_start_with(line: &str, expected: &[&str]) -> bool {
    let mut tokens = line.split_whitespace();
    expected.iter().all(|word| tokens.next() == Some(*word))
}

fn is_timestamp(first_token: &str) -> bool {
    first_token.contains('.')
}

fn parse_float(lineno: usize, token: &str) -> Result<f64> {
    fast_float::parse::<f64, _>(token)
        .map_err(|_| Error::data(lineno, format!("not a number: '{}'", token)))
}

fn parse_int(lineno: usize, token: &str) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| Error::data(lineno, format!("not a whole number: '{}'", token)))
}

impl<R: BufRead> FlsReader<R> {
    /// Read the header; frames follow on iteration.
    pub fn new(reader: R, options: FlsOptions) -> Result<Self> {
        let mut lines = reader.lines();
        let mut lineno = 0;
        let header = read_header(&mut lines, &mut lineno, &options)?;
        tracing::debug!(
            ncols = header.ncols,
            nrows = header.nrows,
            classes = header.classes.len(),
            "Read FLS header"
        );

        let grid = AscGrid::new(header.asc_header(options.no_data_value), None);
        Ok(Self {
            header,
            options,
            lines,
            lineno,
            grid,
            frame: None,
            last_yielded_hour: None,
            done: false,
        })
    }

    pub fn header(&self) -> &FlsHeader {
        &self.header
    }

    pub fn geo_transform(&self, helper: Option<&[f64; 6]>) -> [f64; 6] {
        self.header.geo_transform(helper)
    }

    /// Snapshot of the frame being closed, if it is to be yielded
    fn close_frame(&mut self) -> Option<(f64, AscGrid)> {
        match self.frame.take() {
            Some(frame) if frame.yielded => {
                self.last_yielded_hour = Some(frame.timestamp.trunc() as i64);
                Some((frame.timestamp, self.grid.clone()))
            }
            _ => None,
        }
    }

    fn open_frame(&mut self, lineno: usize, line: &str) -> Result<()> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(Error::data(lineno, "timestamp line needs three fields"));
        }
        let timestamp = parse_float(lineno, tokens[0])?;
        let class_column = parse_int(lineno, tokens[2])?
            .checked_sub(1)
            .ok_or_else(|| Error::data(lineno, "class columns count from 1"))?;

        let yielded = !self.options.one_per_hour
            || self.last_yielded_hour != Some(timestamp.trunc() as i64);
        self.frame = Some(Frame {
            timestamp,
            class_column,
            yielded,
        });
        Ok(())
    }

    fn apply_cell(&mut self, lineno: usize, line: &str) -> Result<()> {
        let frame = self
            .frame
            .ok_or_else(|| Error::data(lineno, "cell line before the first timestamp"))?;
        let fields = line
            .split_whitespace()
            .map(|token| parse_int(lineno, token))
            .collect::<Result<Vec<usize>>>()?;
        let [m, n, class] = fields[..] else {
            return Err(Error::data(lineno, "cell lines hold three numbers"));
        };

        let value = if class == 0 {
            0.0
        } else {
            self.header
                .classes
                .get(class - 1)
                .and_then(|row| row.get(frame.class_column))
                .copied()
                .ok_or_else(|| {
                    let column = frame.class_column + 1;
                    let message = format!("no value for class {} in column {}", class, column);
                    Error::data(lineno, message)
                })?
        };

        // n counts rows from the south
        let row = (self.header.nrows + 1).saturating_sub(n);
        self.grid.set(m, row, Some(value)).map_err(|_| {
            let (ncols, nrows) = (self.header.ncols, self.header.nrows);
            Error::data(lineno, format!("cell ({}, {}) outside the {}x{} grid", m, n, ncols, nrows))
        })
    }

    fn next_line(&mut self) -> Result<Option<(usize, String)>> {
        match self.lines.next() {
            None => Ok(None),
            Some(line) => {
                self.lineno += 1;
                Ok(Some((self.lineno, line?)))
            }
        }
    }

    fn advance(&mut self) -> Result<Option<(f64, AscGrid)>> {
        loop {
            let Some((lineno, line)) = self.next_line()? else {
                return Ok(self.close_frame());
            };
            let Some(first) = line.split_whitespace().next() else {
                continue;
            };

            if is_timestamp(first) {
                let finished = self.close_frame();
                self.open_frame(lineno, &line)?;
                if finished.is_some() {
                    return Ok(finished);
                }
            } else {
                self.apply_cell(lineno, &line)?;
            }
        }
    }
}

impl<R: BufRead> Iterator for FlsReader<R> {
    type Item = Result<(f64, AscGrid)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Next line whose tokens start with `expected`, as a header error when missing
fn seek<R: BufRead>(lines: &mut Lines<R>, lineno: &mut usize, expected: &[&str]) -> Result<String> {
    for line in lines.by_ref() {
        *lineno += 1;
        let line = line?;
        if tokens_start_with(&line, expected) {
            return Ok(line);
        }
    }
    Err(Error::Header(format!("no '{}' line", expected.join(" "))))
}

fn next_header_line<R: BufRead>(lines: &mut Lines<R>, lineno: &mut usize) -> Result<String> {
    *lineno += 1;
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(Error::Header("file ends inside the header".to_string())),
    }
}

fn read_header<R: BufRead>(
    lines: &mut Lines<R>,
    lineno: &mut usize,
    options: &FlsOptions,
) -> Result<FlsHeader> {
    seek(lines, lineno, &["MAIN", "DIMENSIONS", "MMAX", "NMAX"])?;
    let dimensions = next_header_line(lines, lineno)?;
    let mut tokens = dimensions.split_whitespace();
    let (Some(mmax), Some(nmax)) = (tokens.next(), tokens.next()) else {
        return Err(Error::Header(format!("cannot read dimensions '{}'", dimensions.trim())));
    };
    let dimension = |token: &str| {
        token
            .parse::<usize>()
            .map_err(|_| Error::Header(format!("bad dimension '{}'", token)))
    };
    let ncols = if mmax == "***" {
        options.default_ncols.ok_or(Error::MissingDimension)?
    } else {
        dimension(mmax)?
    };
    let nrows = dimension(nmax)?;

    let grid_keys = seek(lines, lineno, &["GRID"])?;
    let grid_values = next_header_line(lines, lineno)?;
    let values = grid_values
        .split_whitespace()
        .map(|token| parse_float(*lineno, token))
        .collect::<Result<Vec<f64>>>()?;
    let keys: Vec<&str> = grid_keys.split_whitespace().skip(1).collect();
    let grid_value = |key: &str| {
        keys.iter()
            .position(|k| *k == key)
            .and_then(|i| values.get(i))
            .copied()
            .ok_or_else(|| Error::Header(format!("GRID has no {}", key)))
    };
    let (dx, x0, y0) = (grid_value("DX")?, grid_value("X0")?, grid_value("Y0")?);

    seek(lines, lineno, &["CLASSES", "OF", "INCREMENTAL", "FILE"])?;
    let mut classes = Vec::new();
    loop {
        let line = next_header_line(lines, lineno)?;
        if line.trim() == "ENDCLASSES" {
            break;
        }
        let row = line
            .split_whitespace()
            .map(|token| parse_float(*lineno, token))
            .collect::<Result<Vec<f64>>>()?;
        classes.push(row);
    }

    Ok(FlsHeader {
        ncols,
        nrows,
        dx,
        x0,
        y0,
        classes,
    })
}

/// Number of frames in an incremental file.
///
/// Only timestamps are looked at, so this works even when the grid width
/// is given as `***`.
pub fn count_frames(text: &str, one_per_hour: bool) -> usize {
    let mut frames = text
        .lines()
        .skip_while(|line| line.trim() != "ENDCLASSES")
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .filter(|first| is_timestamp(first))
        .filter_map(|first| fast_float::parse::<f64, _>(first).ok());

    if !one_per_hour {
        return frames.count();
    }
    let mut last_hour = None;
    frames
        .filter(|timestamp| {
            let hour = Some(timestamp.trunc() as i64);
            let first_of_hour = hour != last_hour;
            last_hour = hour;
            first_of_hour
        })
        .count()
}
