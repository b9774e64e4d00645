// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Options recognized by the tessellation front-ends.

use nalgebra::Point2;

use crate::error::{Error, Result};

/// Default number of decimals for vertex deduplication
pub const DEFAULT_NDIGITS: u32 = 5;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Rect {
    /// A rectangle with positive width and height.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self> {
        let all_finite = [xmin, ymin, xmax, ymax].iter().all(|v| v.is_finite());
        if !all_finite || xmin >= xmax || ymin >= ymax {
            return Err(Error::InvalidConfig(format!(
                "clip rectangle ({}, {}, {}, {}) is empty",
                xmin, ymin, xmax, ymax
            )));
        }
        Ok(Self {
            xmin,
            ymin,
            xmax,
            ymax,
        })
    }

    /// Rectangle spanned by two opposite corners, in any order.
    pub fn from_corners(a: Point2<f64>, b: Point2<f64>) -> Result<Self> {
        Self::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// Smallest rectangle holding every point; `None` for no points.
    pub fn bounding<'a>(points: impl IntoIterator<Item = &'a Point2<f64>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut rect = Self {
            xmin: first.x,
            ymin: first.y,
            xmax: first.x,
            ymax: first.y,
        };
        for p in points {
            rect.xmin = rect.xmin.min(p.x);
            rect.ymin = rect.ymin.min(p.y);
            rect.xmax = rect.xmax.max(p.x);
            rect.ymax = rect.ymax.max(p.y);
        }
        Some(rect)
    }

    /// Grow by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            xmin: self.xmin - margin,
            ymin: self.ymin - margin,
            xmax: self.xmax + margin,
            ymax: self.ymax + margin,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn contains(&self, p: &Point2<f64>) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }
}

/// How a diagram is bounded before equivalent cells are merged
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipRegion {
    /// A fixed rectangle
    Rect(Rect),
    /// The bounding box of sites and vertices, grown by this margin
    Margin(f64),
}

/// Options for [`crate::compute_voronoi_diagram`]
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiConfig {
    pub clip: Option<Rect>,
    pub margin: Option<f64>,
    /// Vertices closer than `10^-ndigits` are merged
    pub ndigits: u32,
    /// Groups of input points whose cells are merged into one
    pub equivalence: Vec<Vec<Point2<f64>>>,
}

impl Default for VoronoiConfig {
    fn default() -> Self {
        Self {
            clip: None,
            margin: None,
            ndigits: DEFAULT_NDIGITS,
            equivalence: Vec::new(),
        }
    }
}

impl VoronoiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clip(mut self, clip: Rect) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn with_ndigits(mut self, ndigits: u32) -> Self {
        self.ndigits = ndigits;
        self
    }

    pub fn with_equivalence(mut self, equivalence: Vec<Vec<Point2<f64>>>) -> Self {
        self.equivalence = equivalence;
        self
    }

    pub fn with_region(self, region: ClipRegion) -> Self {
        match region {
            ClipRegion::Rect(rect) => self.with_clip(rect),
            ClipRegion::Margin(margin) => self.with_margin(margin),
        }
    }

    /// Distance under which two vertices are one
    pub fn zero_length(&self) -> f64 {
        10f64.powi(-(self.ndigits as i32))
    }

    pub fn validate(&self) -> Result<()> {
        if self.clip.is_some() && self.margin.is_some() {
            return Err(Error::InvalidConfig(
                "set either a clip rectangle or a clip margin, not both".into(),
            ));
        }
        if let Some(margin) = self.margin {
            if !margin.is_finite() || margin < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "clip margin must be a non-negative number, got {}",
                    margin
                )));
            }
        }
        if self.ndigits > 15 {
            return Err(Error::InvalidConfig(format!(
                "ndigits {} is beyond f64 precision",
                self.ndigits
            )));
        }
        if self.equivalence.iter().any(|class| class.is_empty()) {
            return Err(Error::InvalidConfig("empty equivalence class".into()));
        }
        let merges = self.equivalence.iter().any(|class| class.len() > 1);
        if merges && self.region().is_none() {
            return Err(Error::InvalidConfig(
                "merging equivalent cells needs a clip rectangle or margin".into(),
            ));
        }
        Ok(())
    }

    /// The configured clip region, if any
    pub fn region(&self) -> Option<ClipRegion> {
        match (self.clip, self.margin) {
            (Some(rect), _) => Some(ClipRegion::Rect(rect)),
            (None, Some(margin)) => Some(ClipRegion::Margin(margin)),
            (None, None) => None,
        }
    }
}
