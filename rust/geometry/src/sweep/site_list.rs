// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deduplicated, translated and sorted input for the sweep.

use nalgebra::Point2;
use rustc_hash::FxHashSet;

use crate::error::{Error, Result};
use crate::site::Site;

/// The sites of one sweep.
///
/// Sites are numbered in input order after exact duplicates are dropped, so
/// `sitenum` doubles as an index into [`SiteList::sites`]. Coordinates are
/// shifted so the bounding box starts at the origin while the sweep runs;
/// [`SiteList::restore_origin`] undoes that.
#[derive(Debug, Clone)]
pub struct SiteList {
    sites: Vec<Site>,
    source_index: Vec<usize>,
    order: Vec<usize>,
    translation: (f64, f64),
    translated: bool,
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
    duplicates: usize,
}

impl SiteList {
    pub fn new(points: &[Point2<f64>]) -> Result<Self> {
        Self::build(points, true)
    }

    /// Same as [`SiteList::new`] without the shift to the origin.
    pub(crate) fn untranslated(points: &[Point2<f64>]) -> Result<Self> {
        Self::build(points, false)
    }

    fn build(points: &[Point2<f64>], translate: bool) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut seen = FxHashSet::default();
        let mut sites = Vec::with_capacity(points.len());
        let mut source_index = Vec::with_capacity(points.len());

        for (index, p) in points.iter().enumerate() {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(Error::InvalidPoint(format!(
                    "non-finite coordinates ({}, {}) at index {}",
                    p.x, p.y, index
                )));
            }
            // +0.0 and -0.0 are the same site
            let bits = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
            if seen.insert(bits) {
                sites.push(Site::numbered(p.x, p.y, sites.len()));
                source_index.push(index);
            }
        }

        let duplicates = points.len() - sites.len();

        let (mut xmin, mut ymin) = (f64::INFINITY, f64::INFINITY);
        let (mut xmax, mut ymax) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for site in &sites {
            xmin = xmin.min(site.x);
            ymin = ymin.min(site.y);
            xmax = xmax.max(site.x);
            ymax = ymax.max(site.y);
        }

        let translation = if translate { (xmin, ymin) } else { (0.0, 0.0) };
        if translate {
            for site in &mut sites {
                site.x -= translation.0;
                site.y -= translation.1;
            }
        }

        let mut order: Vec<usize> = (0..sites.len()).collect();
        order.sort_by(|&a, &b| sites[a].sweep_cmp(&sites[b]));

        Ok(Self {
            sites,
            source_index,
            order,
            translation,
            translated: translate,
            xmin: xmin - translation.0,
            ymin: ymin - translation.1,
            xmax: xmax - translation.0,
            ymax: ymax - translation.1,
            duplicates,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Site by its sequence number
    #[inline]
    pub fn get(&self, sitenum: usize) -> &Site {
        &self.sites[sitenum]
    }

    /// All sites in numbering order
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Sites in sweep order: ascending y, then ascending x
    pub fn sweep_order(&self) -> impl Iterator<Item = &Site> + '_ {
        self.order.iter().map(move |&i| &self.sites[i])
    }

    /// Position in the caller's input of the site numbered `sitenum`
    pub fn source_index(&self, sitenum: usize) -> usize {
        self.source_index[sitenum]
    }

    /// Number of input points dropped as exact duplicates
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Offset subtracted from every site while the sweep runs
    pub fn translation(&self) -> (f64, f64) {
        if self.translated {
            self.translation
        } else {
            (0.0, 0.0)
        }
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// Shift the sites back to the caller's coordinates. Idempotent.
    pub fn restore_origin(&mut self) {
        if !self.translated {
            return;
        }
        let (dx, dy) = self.translation;
        for site in &mut self.sites {
            site.x += dx;
            site.y += dy;
        }
        self.xmin += dx;
        self.xmax += dx;
        self.ymin += dy;
        self.ymax += dy;
        self.translated = false;
    }
}
