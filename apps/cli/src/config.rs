// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Defaults loaded from environment variables. Command-line flags win.

use flooding_geometry::DEFAULT_NDIGITS;

/// Tool configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Decimals kept when merging nearby vertices.
    pub ndigits: u32,
    /// Margin around sites and vertices for closing open cells.
    pub clip_margin: Option<f64>,
    /// Largest spacing of points placed along linear objects.
    pub density: f64,
    /// Value written for cells no FLS frame has touched.
    pub no_data: f64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their [`Default`] value.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ndigits: env_or("FLOODING_NDIGITS", defaults.ndigits),
            clip_margin: std::env::var("FLOODING_CLIP_MARGIN")
                .ok()
                .and_then(|v| v.parse().ok()),
            density: env_or("FLOODING_DENSITY", defaults.density),
            no_data: env_or("FLOODING_NO_DATA", defaults.no_data),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ndigits: DEFAULT_NDIGITS,
            clip_margin: None,
            density: 1.0,
            no_data: -999.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparsable_values_keep_the_default() {
        assert_eq!(env_or("FLOODING_TEST_UNSET_VARIABLE", 7u32), 7);
        assert_eq!(Config::default().ndigits, DEFAULT_NDIGITS);
        assert_eq!(Config::default().no_data, -999.0);
    }
}
