// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Power-weighted 1-D grid: discretization, binary I/O, lower-neighbor lookup.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{CheckpointError, ConfigError};

/// A monotone discretization of `[m, M]` into `n` points, produced by a
/// power-weighted map of an equidistant partition of `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    n: usize,
    m: f64,
    upper: f64,
    w: f64,
    d: Vec<f64>,
}

impl Grid {
    /// Builds and immediately fills a grid with `n` points on `[m, upper]`
    /// with weighting exponent `w`.
    pub fn new(n: usize, m: f64, upper: f64, w: f64) -> Grid {
        let mut g = Grid {
            n,
            m,
            upper,
            w,
            d: vec![0.0; n],
        };
        g.recompute();
        g
    }

    /// Parses `"N, m, M[, w]"`; `w` defaults to 1 when the fourth field is
    /// absent.
    pub fn from_init_string(s: &str) -> Result<Grid, ConfigError> {
        let fields: Vec<&str> = s.split(',').map(|f| f.trim()).collect();
        if fields.len() < 3 {
            return Err(ConfigError::MalformedGrid(s.to_string()));
        }
        let malformed = || ConfigError::MalformedGrid(s.to_string());
        let n: usize = fields[0].parse().map_err(|_| malformed())?;
        let m: f64 = fields[1].parse().map_err(|_| malformed())?;
        let upper: f64 = fields[2].parse().map_err(|_| malformed())?;
        let w: f64 = match fields.get(3) {
            Some(tok) => tok.parse().map_err(|_| malformed())?,
            None => 1.0,
        };
        Ok(Grid::new(n, m, upper, w))
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn m(&self) -> f64 {
        self.m
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    pub fn points(&self) -> &[f64] {
        &self.d
    }

    /// Sets a new upper bound and refills the points in place, leaving `n`,
    /// `m`, and `w` untouched. Used by the adaptive-bounds pass.
    pub fn set_upper_and_recompute(&mut self, upper: f64) {
        self.upper = upper;
        self.recompute();
    }

    /// Refills `d[i] = m + i^w * (upper - m) / (n - 1)^w`.
    pub fn recompute(&mut self) {
        if !(self.upper > self.m) {
            log::warn!("invalid grid domain definition: m={} upper={}", self.m, self.upper);
        }
        if !(self.w > 0.0) {
            log::warn!("invalid grid weighting exponent: w={}", self.w);
        }
        let h = (self.upper - self.m) / ((self.n - 1) as f64).powf(self.w);
        for i in 0..self.n {
            self.d[i] = self.m + (i as f64).powf(self.w) * h;
        }
    }

    /// Largest index `i` with `d[i] <= x`, clamped to `[0, n-2]`.
    pub fn lower_index(&self, x: f64) -> usize {
        if x <= self.m {
            return 0;
        }
        if x > self.upper {
            return self.n - 2;
        }
        let (mut lo, mut hi) = (0usize, self.n - 1);
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if x < self.d[mid] {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        // Note the `<=` on the right: `x == self.upper` exactly is a valid
        // query (S3 exercises it) and lands here with `lo == n - 2`, where
        // `x == d[lo + 1]`, not strictly less.
        debug_assert!(self.d[lo] <= x && x <= self.d[lo + 1]);
        lo
    }

    /// Binary layout: `i16 n | f64 w | n x f64 points`. `m`/`upper` are not
    /// stored directly; `load` recovers them from the first/last point.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CheckpointError> {
        let path = path.as_ref();
        let mut f = File::create(path).map_err(|source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        f.write_all(&(self.n as i16).to_ne_bytes())
            .and_then(|_| f.write_all(&self.w.to_ne_bytes()))
            .and_then(|_| {
                for v in &self.d {
                    f.write_all(&v.to_ne_bytes())?;
                }
                Ok(())
            })
            .map_err(|source| CheckpointError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Grid, CheckpointError> {
        let path = path.as_ref();
        let mut f = File::open(path).map_err(|source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let io_err = |source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        };
        let corrupt = || CheckpointError::Corrupt {
            path: path.to_path_buf(),
        };

        let mut i16_buf = [0u8; 2];
        f.read_exact(&mut i16_buf).map_err(io_err)?;
        let n = i16::from_ne_bytes(i16_buf);
        if n <= 0 {
            return Err(corrupt());
        }
        let n = n as usize;

        let mut f64_buf = [0u8; 8];
        f.read_exact(&mut f64_buf).map_err(io_err)?;
        let w = f64::from_ne_bytes(f64_buf);

        let mut d = Vec::with_capacity(n);
        for _ in 0..n {
            f.read_exact(&mut f64_buf).map_err(io_err)?;
            d.push(f64::from_ne_bytes(f64_buf));
        }

        let m = d[0];
        let upper = d[n - 1];
        Ok(Grid { n, m, upper, w, d })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotone_and_bounded() {
        let g = Grid::new(10, 1.0, 5.0, 1.5);
        assert_eq!(g.points()[0], 1.0);
        assert!((g.points()[9] - 5.0).abs() < 1e-9);
        for w in g.points().windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn round_trip_through_bytes() {
        let g = Grid::new(7, 0.0, 3.0, 2.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.bin");
        g.save(&path).unwrap();
        let loaded = Grid::load(&path).unwrap();
        assert_eq!(loaded.n(), g.n());
        assert_eq!(loaded.w(), g.w());
        assert_eq!(loaded.points(), g.points());
    }

    #[test]
    fn lower_index_edges_and_interior() {
        let g = Grid::new(5, 0.0, 4.0, 1.0);
        assert_eq!(g.lower_index(-1.0), 0);
        assert_eq!(g.lower_index(10.0), g.n() - 2);
        let mid = g.lower_index(2.5);
        assert!(g.points()[mid] <= 2.5 && 2.5 < g.points()[mid + 1]);
    }

    #[test]
    fn from_init_string_defaults_weight() {
        let g = Grid::from_init_string("4, 0, 1").unwrap();
        assert_eq!(g.n(), 4);
        assert_eq!(g.w(), 1.0);
    }
}
