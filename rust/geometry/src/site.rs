// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric primitives shared by the sweep and the polygon assembler.
//!
//! A [`Site`] is a 2D point with an optional z coordinate and the sequence
//! number the sweep assigns to it. Equality is tolerance based, hashing goes
//! through [`SiteKey`], which rounds coordinates to five decimals.
//!
//! ## Mixed dimensions
//!
//! Arithmetic between a 2D and a 3D site always degrades to 2D: the z
//! coordinate survives `+` and `-` only when both operands carry one, and
//! scaling keeps whatever z the site already has.

use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Sub};

use nalgebra::{Point2, Point3};
use smallvec::SmallVec;

/// Absolute tolerance for coordinate equality and for parallel-line tests
pub const TOLERANCE: f64 = 1e-9;

/// Decimals kept by [`SiteKey`]
const KEY_DECIMALS: i32 = 5;

/// True when `a` and `b` agree within `relative_error` of the larger magnitude,
/// or when both are below `relative_error`.
#[inline]
pub fn nearly_equal(a: f64, b: f64, relative_error: f64) -> bool {
    let norm = a.abs().max(b.abs());
    norm < relative_error || (a - b).abs() < relative_error * norm
}

/// Round a coordinate to a fixed number of decimals and return it as an integer.
#[inline]
pub(crate) fn quantize(value: f64, decimals: i32) -> i64 {
    (value * 10f64.powi(decimals)).round() as i64
}

/// A planar point with an optional z coordinate and a sweep sequence number
#[derive(Debug, Clone, Copy)]
pub struct Site {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub sitenum: usize,
}

impl Site {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            sitenum: 0,
        }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            sitenum: 0,
        }
    }

    pub fn numbered(x: f64, y: f64, sitenum: usize) -> Self {
        Self {
            x,
            y,
            z: None,
            sitenum,
        }
    }

    /// Number of coordinates: 2 or 3
    pub fn dimension(&self) -> usize {
        if self.z.is_some() {
            3
        } else {
            2
        }
    }

    /// Coordinate by position, like indexing a 2- or 3-tuple
    pub fn coord(&self, index: usize) -> Option<f64> {
        match index {
            0 => Some(self.x),
            1 => Some(self.y),
            2 => self.z,
            _ => None,
        }
    }

    /// Coordinates as a short vector of length 2 or 3
    pub fn to_tuple(&self) -> SmallVec<[f64; 3]> {
        let mut coords = SmallVec::new();
        coords.push(self.x);
        coords.push(self.y);
        if let Some(z) = self.z {
            coords.push(z);
        }
        coords
    }

    pub fn to_point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Planar Euclidean distance; z is ignored.
    pub fn distance(&self, other: &Site) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Hash key with coordinates rounded to five decimals
    pub fn key(&self) -> SiteKey {
        SiteKey {
            x: quantize(self.x, KEY_DECIMALS),
            y: quantize(self.y, KEY_DECIMALS),
            z: self.z.map(|z| quantize(z, KEY_DECIMALS)),
        }
    }

    /// Sweep order: by y, then by x.
    pub fn sweep_cmp(&self, other: &Site) -> Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| self.x.total_cmp(&other.x))
    }
}

impl Default for Site {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl PartialEq for Site {
    fn eq(&self, other: &Self) -> bool {
        if (self.x - other.x).abs() > TOLERANCE || (self.y - other.y).abs() > TOLERANCE {
            return false;
        }
        match (self.z, other.z) {
            (None, None) => true,
            (Some(a), Some(b)) => (a - b).abs() <= TOLERANCE,
            _ => false,
        }
    }
}

impl From<(f64, f64)> for Site {
    fn from((x, y): (f64, f64)) -> Self {
        Site::new(x, y)
    }
}

impl From<(f64, f64, f64)> for Site {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Site::with_z(x, y, z)
    }
}

impl From<Point2<f64>> for Site {
    fn from(p: Point2<f64>) -> Self {
        Site::new(p.x, p.y)
    }
}

impl From<&Point2<f64>> for Site {
    fn from(p: &Point2<f64>) -> Self {
        Site::new(p.x, p.y)
    }
}

impl From<Point3<f64>> for Site {
    fn from(p: Point3<f64>) -> Self {
        Site::with_z(p.x, p.y, p.z)
    }
}

impl Add for Site {
    type Output = Site;

    fn add(self, other: Site) -> Site {
        match (self.z, other.z) {
            (Some(a), Some(b)) => Site::with_z(self.x + other.x, self.y + other.y, a + b),
            _ => Site::new(self.x + other.x, self.y + other.y),
        }
    }
}

impl Sub for Site {
    type Output = Site;

    fn sub(self, other: Site) -> Site {
        match (self.z, other.z) {
            (Some(a), Some(b)) => Site::with_z(self.x - other.x, self.y - other.y, a - b),
            _ => Site::new(self.x - other.x, self.y - other.y),
        }
    }
}

impl Mul<f64> for Site {
    type Output = Site;

    fn mul(self, factor: f64) -> Site {
        Site {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z.map(|z| z * factor),
            sitenum: 0,
        }
    }
}

impl Div<f64> for Site {
    type Output = Site;

    fn div(self, divisor: f64) -> Site {
        Site {
            x: self.x / divisor,
            y: self.y / divisor,
            z: self.z.map(|z| z / divisor),
            sitenum: 0,
        }
    }
}

/// Hashable identity of a site: coordinates rounded to five decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteKey {
    x: i64,
    y: i64,
    z: Option<i64>,
}

impl From<&Point2<f64>> for SiteKey {
    fn from(p: &Point2<f64>) -> Self {
        Site::from(p).key()
    }
}

impl From<Point2<f64>> for SiteKey {
    fn from(p: Point2<f64>) -> Self {
        Site::from(p).key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_equality_is_tolerant() {
        assert_eq!(Site::new(0.0, 0.0), Site::from((0.0, 0.0)));
        assert_eq!(Site::new(1.0, 2.0), Site::new(1.0 + 1e-12, 2.0 - 1e-12));
        assert_ne!(Site::new(1.0, 2.0), Site::new(1.0 + 1e-6, 2.0));
    }

    #[test]
    fn test_dimension_mismatch_is_not_equal() {
        assert_ne!(Site::new(0.0, 0.0), Site::with_z(0.0, 0.0, 0.0));
        assert_eq!(Site::with_z(0.0, 0.0, 0.0), Site::from((0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_mixed_subtraction_degrades_to_2d() {
        let flat = Site::new(3.0, 4.0);
        let raised = Site::with_z(1.0, 1.0, 5.0);

        let a = flat - raised;
        assert_eq!(a.dimension(), 2);
        assert_eq!(a, Site::new(2.0, 3.0));

        let b = raised - flat;
        assert_eq!(b.dimension(), 2);
        assert_eq!(b, Site::new(-2.0, -3.0));

        let c = raised - Site::with_z(1.0, 1.0, 1.0);
        assert_eq!(c, Site::with_z(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_arithmetic() {
        let a = Site::new(0.0, 0.0);
        let b = Site::new(1.0, 1.0);
        assert_eq!(b, a + b);
        assert_eq!((b - a) * 2.0, Site::new(2.0, 2.0));
        assert_eq!(Site::new(3.0, 6.0) / 3.0, Site::new(1.0, 2.0));
        assert_relative_eq!(Site::new(0.0, 0.0).distance(&Site::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_tuple_access() {
        let site = Site::new(1.5, -2.0);
        assert_eq!(site.coord(0), Some(1.5));
        assert_eq!(site.coord(1), Some(-2.0));
        assert_eq!(site.coord(2), None);
        assert_eq!(site.to_tuple().as_slice(), &[1.5, -2.0]);
        assert_eq!(Site::with_z(1.0, 2.0, 3.0).to_tuple().len(), 3);
    }

    #[test]
    fn test_key_rounds_to_five_decimals() {
        assert_eq!(Site::new(1.000001, 2.0).key(), Site::new(1.0, 2.0).key());
        assert_ne!(Site::new(1.0001, 2.0).key(), Site::new(1.0, 2.0).key());
    }

    #[test]
    fn test_sweep_order() {
        let low = Site::new(5.0, 0.0);
        let high_left = Site::new(0.0, 1.0);
        let high_right = Site::new(2.0, 1.0);
        assert_eq!(low.sweep_cmp(&high_left), Ordering::Less);
        assert_eq!(high_left.sweep_cmp(&high_right), Ordering::Less);
        assert_eq!(high_right.sweep_cmp(&high_right), Ordering::Equal);
    }

    #[test]
    fn test_nearly_equal() {
        assert!(nearly_equal(0.0, 1e-12, TOLERANCE));
        assert!(!nearly_equal(0.0, 1e-3, TOLERANCE));
    }
}
