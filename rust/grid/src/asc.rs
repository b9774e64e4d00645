// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ESRI ASCII grids
//!
//! Pixels are addressed by 1-based `(col, row)`, row 1 being the northern
//! edge, or by geographic `(x, y)` inside the grid extent.

use std::io::Write;

use nom::{
    bytes::complete::take_while1,
    character::complete::{space0, space1},
    error::{Error as NomError, ErrorKind},
    sequence::{separated_pair, terminated},
    IResult,
};

use crate::error::{Error, Result};

/// No-data value assumed when the header does not name one
pub const DEFAULT_NODATA_VALUE: f64 = -9999.0;

/// Width of the key column when writing headers
const KEY_WIDTH: usize = 13;

/// Placement and size of a grid
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AscHeader {
    pub ncols: usize,
    pub nrows: usize,
    pub xllcorner: f64,
    pub yllcorner: f64,
    pub cellsize: f64,
    pub nodata_value: f64,
}

impl AscHeader {
    /// Whether `(col, row)` addresses a pixel of the grid
    pub fn contains(&self, col: usize, row: usize) -> bool {
        (1..=self.ncols).contains(&col) && (1..=self.nrows).contains(&row)
    }

    /// Pixel holding the geographic point `(x, y)`
    pub fn col_row(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let col = ((x - self.xllcorner) / self.cellsize).floor();
        let from_south = ((y - self.yllcorner) / self.cellsize).floor();
        if !(col >= 0.0 && col < self.ncols as f64) {
            return None;
        }
        if !(from_south >= 0.0 && from_south < self.nrows as f64) {
            return None;
        }
        Some((col as usize + 1, self.nrows - from_south as usize))
    }

    /// Centre of pixel `(col, row)`
    pub fn point(&self, col: usize, row: usize) -> Option<(f64, f64)> {
        self.point_at(col, row, (0.5, 0.5))
    }

    /// Point inside pixel `(col, row)`, as fractions of the cell size
    /// measured from its lower left corner
    pub fn point_at(&self, col: usize, row: usize, fraction: (f64, f64)) -> Option<(f64, f64)> {
        if !self.contains(col, row) {
            return None;
        }
        let x = self.xllcorner + ((col - 1) as f64 + fraction.0) * self.cellsize;
        let y = self.yllcorner + ((self.nrows - row) as f64 + fraction.1) * self.cellsize;
        Some((x, y))
    }

    /// Whether a stored value stands for missing data.
    ///
    /// Anything at or below a negative no-data value counts, so files mixing
    /// `-999`, `-999.999` and `-9999` read consistently.
    pub fn is_no_data(&self, value: f64) -> bool {
        value == self.nodata_value || (self.nodata_value < 0.0 && value <= self.nodata_value)
    }
}

/// Content of one pixel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pixel {
    Outside,
    NoData,
    Value(f64),
}

impl Pixel {
    pub fn value(self) -> Option<f64> {
        match self {
            Pixel::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_outside(self) -> bool {
        matches!(self, Pixel::Outside)
    }
}

/// Raster of optional values, stored row by row from the north
#[derive(Debug, Clone, PartialEq)]
pub struct AscGrid {
    header: AscHeader,
    values: Vec<Option<f64>>,
}

/// Floating point number, read with fast-float
fn number(input: &str) -> IResult<&str, f64> {
    match fast_float::parse_partial::<f64, _>(input) {
        Ok((value, consumed)) if consumed > 0 => Ok((&input[consumed..], value)),
        _ => Err(nom::Err::Error(NomError::new(input, ErrorKind::Float))),
    }
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

/// `key value` header line
fn header_line(input: &str) -> IResult<&str, (&str, f64)> {
    terminated(separated_pair(keyword, space1, number), space0)(input)
}

fn dimension(key: &str, value: f64) -> Result<usize> {
    if value >= 1.0 && value.fract() == 0.0 {
        Ok(value as usize)
    } else {
        Err(Error::Header(format!("{} must be a positive integer, got {}", key, value)))
    }
}

impl AscGrid {
    /// Grid with every pixel set to `default`
    pub fn new(header: AscHeader, default: Option<f64>) -> Self {
        Self {
            header,
            values: vec![default; header.ncols * header.nrows],
        }
    }

    /// Read a grid from the text of an `.asc` file.
    ///
    /// Leading `/* ... */` comment lines are skipped and header keys are
    /// matched in any letter case. Values may wrap over lines freely.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .skip_while(|(_, line)| line.is_empty() || line.starts_with("/*"))
            .peekable();

        let mut ncols = None;
        let mut nrows = None;
        let mut xllcorner = None;
        let mut yllcorner = None;
        let mut cellsize = None;
        let mut nodata_value = None;

        while let Some(&(lineno, line)) = lines.peek() {
            if !line.starts_with(|c: char| c.is_ascii_alphabetic()) {
                break;
            }
            let (rest, (key, value)) = header_line(line)
                .map_err(|_| Error::Header(format!("line {}: cannot read '{}'", lineno, line)))?;
            if !rest.is_empty() {
                return Err(Error::Header(format!("line {}: trailing '{}'", lineno, rest)));
            }

            match key.to_ascii_lowercase().as_str() {
                "ncols" => ncols = Some(dimension(key, value)?),
                "nrows" => nrows = Some(dimension(key, value)?),
                "xllcorner" => xllcorner = Some(value),
                "yllcorner" => yllcorner = Some(value),
                "cellsize" => cellsize = Some(value),
                "nodata_value" => nodata_value = Some(value),
                other => tracing::debug!(key = other, "Ignoring unknown header key"),
            }
            lines.next();
        }

        let missing = |name: &str| Error::Header(format!("missing {}", name));
        let header = AscHeader {
            ncols: ncols.ok_or_else(|| missing("ncols"))?,
            nrows: nrows.ok_or_else(|| missing("nrows"))?,
            xllcorner: xllcorner.ok_or_else(|| missing("xllcorner"))?,
            yllcorner: yllcorner.ok_or_else(|| missing("yllcorner"))?,
            cellsize: cellsize.ok_or_else(|| missing("cellsize"))?,
            nodata_value: nodata_value.unwrap_or(DEFAULT_NODATA_VALUE),
        };
        if !(header.cellsize > 0.0) {
            return Err(Error::Header(format!(
                "cellsize must be positive, got {}",
                header.cellsize
            )));
        }

        let expected = header.ncols * header.nrows;
        let mut values = Vec::with_capacity(expected);
        let mut last_line = 0;
        for (lineno, line) in lines {
            last_line = lineno;
            for token in line.split_whitespace() {
                let value = fast_float::parse::<f64, _>(token)
                    .map_err(|_| Error::data(lineno, format!("not a number: '{}'", token)))?;
                if values.len() == expected {
                    return Err(Error::data(lineno, format!("more than {} values", expected)));
                }
                values.push((!header.is_no_data(value)).then_some(value));
            }
        }
        if values.len() < expected {
            return Err(Error::data(
                last_line,
                format!("expected {} values, found {}", expected, values.len()),
            ));
        }

        tracing::debug!(ncols = header.ncols, nrows = header.nrows, "Read ASCII grid");
        Ok(Self { header, values })
    }

    pub fn header(&self) -> &AscHeader {
        &self.header
    }

    pub fn ncols(&self) -> usize {
        self.header.ncols
    }

    pub fn nrows(&self) -> usize {
        self.header.nrows
    }

    fn index(&self, col: usize, row: usize) -> Option<usize> {
        self.header
            .contains(col, row)
            .then(|| (row - 1) * self.header.ncols + (col - 1))
    }

    /// Pixel at 1-based `(col, row)`
    pub fn get(&self, col: usize, row: usize) -> Pixel {
        match self.index(col, row) {
            None => Pixel::Outside,
            Some(i) => self.values[i].map_or(Pixel::NoData, Pixel::Value),
        }
    }

    /// Pixel holding the geographic point `(x, y)`
    pub fn get_at(&self, x: f64, y: f64) -> Pixel {
        match self.header.col_row(x, y) {
            Some((col, row)) => self.get(col, row),
            None => Pixel::Outside,
        }
    }

    /// Store a value, or clear it with `None`
    pub fn set(&mut self, col: usize, row: usize, value: Option<f64>) -> Result<()> {
        let i = self.index(col, row).ok_or(Error::OutOfBounds { col, row })?;
        self.values[i] = value;
        Ok(())
    }

    /// Rows from north to south
    pub fn rows(&self) -> impl Iterator<Item = &[Option<f64>]> {
        self.values.chunks(self.header.ncols.max(1))
    }

    /// Every value, row by row from the north
    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().copied()
    }

    /// Write the grid in `.asc` layout
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        let h = &self.header;
        writeln!(out, "{:<w$}{}", "nCols", h.ncols, w = KEY_WIDTH)?;
        writeln!(out, "{:<w$}{}", "nRows", h.nrows, w = KEY_WIDTH)?;
        writeln!(out, "{:<w$}{}", "xllCorner", h.xllcorner, w = KEY_WIDTH)?;
        writeln!(out, "{:<w$}{}", "yllCorner", h.yllcorner, w = KEY_WIDTH)?;
        writeln!(out, "{:<w$}{}", "CellSize", h.cellsize, w = KEY_WIDTH)?;
        writeln!(out, "{:<w$}{}", "nodata_value", h.nodata_value, w = KEY_WIDTH)?;

        for row in self.rows() {
            for value in row {
                write!(out, " {}", value.unwrap_or(h.nodata_value))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DATA: &str = "\
nCols        5
nRows        5
xllCorner    135000
yllCorner    455000
CellSize     100
nodata_value -999
 -999 -0.2 0 -999 3.05
 -999 0 0 0.5 1.2
 -999 0 0 0 -999
 0 0 0 0 -999
 -999 1.1 1.4 0.1 0
";

    fn written(grid: &AscGrid) -> String {
        let mut out = Vec::new();
        grid.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_header() {
        let grid = AscGrid::parse(DATA).unwrap();
        let h = grid.header();
        assert_eq!((h.ncols, h.nrows), (5, 5));
        assert_eq!((h.xllcorner, h.yllcorner), (135000.0, 455000.0));
        assert_eq!(h.cellsize, 100.0);
        assert_eq!(h.nodata_value, -999.0);
        assert_eq!(grid.rows().count(), 5);
        assert!(grid.rows().all(|row| row.len() == 5));
    }

    #[test]
    fn test_comment_lines_are_skipped() {
        let text = format!("/* somebody wants to tell you something\n{}", DATA);
        let grid = AscGrid::parse(&text).unwrap();
        assert_eq!(grid.get(5, 1), Pixel::Value(3.05));
    }

    #[test]
    fn test_pixel_by_col_row() {
        let grid = AscGrid::parse(DATA).unwrap();
        assert_eq!(grid.get(2, 1), Pixel::Value(-0.2));
        assert_eq!(grid.get(3, 1), Pixel::Value(0.0));
        assert_eq!(grid.get(5, 1), Pixel::Value(3.05));
        assert_eq!(grid.get(1, 4), Pixel::Value(0.0));
        for (col, row) in [(1, 1), (4, 1), (1, 2), (1, 3), (1, 5)] {
            assert_eq!(grid.get(col, row), Pixel::NoData);
        }
        assert!(grid.get(3, 20).is_outside());
        assert!(grid.get(30, 5).is_outside());
        assert!(grid.get(3, 0).is_outside());
    }

    #[test]
    fn test_pixel_by_geographic_point() {
        let grid = AscGrid::parse(DATA).unwrap();
        assert_eq!(grid.get_at(135054.0, 455009.0), Pixel::NoData);
        assert_eq!(grid.get_at(135254.0, 455209.0), Pixel::Value(0.0));
        assert_eq!(grid.get_at(135154.0, 455049.0), Pixel::Value(1.1));
        assert_eq!(grid.get_at(135254.0, 455089.0), Pixel::Value(1.4));

        for (x, y) in [
            (105054.0, 455009.0),
            (235054.0, 455009.0),
            (135054.0, 355009.0),
            (135000.0, 455600.0),
            (134900.0, 455000.0),
        ] {
            assert!(grid.get_at(x, y).is_outside(), "({}, {})", x, y);
        }
    }

    #[test]
    fn test_coordinate_conversion() {
        let grid = AscGrid::parse(DATA).unwrap();
        let h = grid.header();
        assert_eq!(h.col_row(135050.0, 455450.0), Some((1, 1)));
        assert_eq!(h.col_row(135178.0, 455089.0), Some((2, 5)));

        let (x, y) = h.point(2, 5).unwrap();
        assert_relative_eq!(x, 135150.0);
        assert_relative_eq!(y, 455050.0);
        let (x, y) = h.point_at(2, 5, (0.78, 0.89)).unwrap();
        assert_relative_eq!(x, 135178.0, epsilon = 1e-6);
        assert_relative_eq!(y, 455089.0, epsilon = 1e-6);
        assert!(h.point(1, 45).is_none());
    }

    #[test]
    fn test_inconsistent_no_data() {
        let text = "\
nCols        5
nRows        3
xllCorner    135000
yllCorner    455000
CellSize     100
nodata_value -999
 -999.999 -0.2 0 -9999 3.05
 -99 -9 0 0.5 1.2
 -9999.99 0 0 0 -99999
";
        let grid = AscGrid::parse(text).unwrap();
        assert_eq!(grid.get(1, 1), Pixel::NoData);
        assert_eq!(grid.get(1, 2), Pixel::Value(-99.0));
        assert_eq!(grid.get(2, 2), Pixel::Value(-9.0));
        assert_eq!(grid.get(1, 3), Pixel::NoData);
        assert_eq!(grid.get(4, 1), Pixel::NoData);
        assert_eq!(grid.get(5, 1), Pixel::Value(3.05));
        assert_eq!(grid.get(5, 3), Pixel::NoData);
    }

    #[test]
    fn test_set_pixels() {
        let mut grid = AscGrid::parse(DATA).unwrap();
        grid.set(2, 1, Some(-0.1)).unwrap();
        assert_eq!(grid.get(2, 1), Pixel::Value(-0.1));
        grid.set(2, 1, None).unwrap();
        assert_eq!(grid.get(2, 1), Pixel::NoData);
        grid.set(1, 3, Some(1.0)).unwrap();
        assert_eq!(grid.get(1, 3), Pixel::Value(1.0));

        assert!(matches!(
            grid.set(3, 20, Some(1.0)),
            Err(Error::OutOfBounds { col: 3, row: 20 })
        ));
        assert!(grid.set(3, 0, Some(1.0)).is_err());
    }

    #[test]
    fn test_write_unaltered_and_altered() {
        let mut grid = AscGrid::parse(DATA).unwrap();
        assert_eq!(written(&grid), DATA);

        grid.set(2, 1, Some(-0.1)).unwrap();
        grid.set(5, 1, Some(1.05)).unwrap();
        grid.set(5, 2, Some(0.9)).unwrap();
        let out = written(&grid);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[6], " -999 -0.1 0 -999 1.05");
        assert_eq!(lines[7], " -999 0 0 0.5 0.9");
    }

    #[test]
    fn test_new_grid() {
        let header = AscHeader {
            ncols: 6,
            nrows: 4,
            xllcorner: 135000.0,
            yllcorner: 455000.0,
            cellsize: 100.0,
            nodata_value: -999.0,
        };
        let grid = AscGrid::new(header, Some(0.1));
        let out = written(&grid);
        assert!(out.starts_with("nCols        6\nnRows        4\n"));
        assert!(out.ends_with(" 0.1 0.1 0.1 0.1 0.1 0.1\n"));
        assert_eq!(out.lines().count(), 10);
    }

    #[test]
    fn test_crlf_and_lower_case_keys() {
        let text = DATA.replace("nCols", "NCOLS").replace("CellSize", "cellsize");
        let grid = AscGrid::parse(&text.replace('\n', "\r\n")).unwrap();
        assert_eq!(grid.header().cellsize, 100.0);
        assert_eq!(grid.get(5, 2), Pixel::Value(1.2));
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(AscGrid::parse("nCols 5\n"), Err(Error::Header(_))));
        assert!(matches!(
            AscGrid::parse(&DATA.replace("nRows        5", "nRows        2.5")),
            Err(Error::Header(_))
        ));
        assert!(matches!(
            AscGrid::parse(&DATA.replace("1.4", "x")),
            Err(Error::Data { line: 11, .. })
        ));
        let short = &DATA[..DATA.len() - " -999 1.1 1.4 0.1 0\n".len()];
        assert!(matches!(AscGrid::parse(short), Err(Error::Data { .. })));
    }
}
