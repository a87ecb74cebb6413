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

//! The solution container: grids, value/policy tables, and iteration state.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{CheckpointError, ConfigError};
use crate::grid::Grid;
use crate::interp::Table;
use crate::pmap::ParamMap;

/// Seconds since the Unix epoch, for timestamping `xbeg`/`xend`. Wall-clock
/// rather than the reference's `clock()` ticks, which are process-relative
/// and meaningless once persisted across a resume into a new process.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Numeric method parameters plus the four grids, the double-buffered
/// value tables, and the two policy tables.
pub struct Solution {
    pub maxit: i64,
    pub tol: f64,
    pub qadp: f64,
    pub sadp: f64,

    pub acc: f64,
    pub it: i64,
    /// Seconds-since-epoch when the fixed-point loop started. 0.0 means
    /// not yet timed. Carried across a resume rather than reset, so a
    /// checkpoint's `xend - xbeg` spans every solve that produced it.
    pub xbeg: f64,
    /// Seconds-since-epoch when the fixed-point loop last finished.
    pub xend: f64,

    pub xg: Grid,
    pub rg: Grid,
    pub qg: Grid,
    pub sg: Grid,

    pub v0: Table,
    pub v1: Table,
    pub qpol: Table,
    pub spol: Table,
}

impl Solution {
    /// Parses maxit/tol/qadp/sadp and the four grid init-strings, and
    /// allocates zero-initialized `nx x nr` value/policy tables. `acc` is
    /// seeded to `tol + 1` so the fixed-point loop always runs at least
    /// one iteration; `it` starts at zero.
    ///
    /// maxit/tol/qadp/sadp are optional, like every other scalar key
    /// (absent leaves the field at zero, matching the reference's `ifvar`).
    /// The four grid keys are a deliberate exception: a "zero" grid (`n=0`)
    /// is meaningless, so they are still required.
    pub fn from_pmap(map: &ParamMap) -> Result<Solution, ConfigError> {
        let maxit = map.get_f64("maxit").unwrap_or(0.0) as i64;
        let tol = map.get_f64("tol").unwrap_or(0.0);
        // qadp is parsed and carried as f64 throughout, never truncated to
        // an integer, even though the parameter key is still named "qadp".
        let qadp = map.get_f64("qadp").unwrap_or(0.0);
        let sadp = map.get_f64("sadp").unwrap_or(0.0);

        let xg = Grid::from_init_string(map.require_str("xg")?)?;
        let rg = Grid::from_init_string(map.require_str("rg")?)?;
        let qg = Grid::from_init_string(map.require_str("qg")?)?;
        let sg = Grid::from_init_string(map.require_str("sg")?)?;

        let (nx, nr) = (xg.n(), rg.n());
        Ok(Solution {
            maxit,
            tol,
            qadp,
            sadp,
            acc: tol + 1.0,
            it: 0,
            xbeg: 0.0,
            xend: 0.0,
            xg,
            rg,
            qg,
            sg,
            v0: Table::zeros(nx, nr),
            v1: Table::zeros(nx, nr),
            qpol: Table::zeros(nx, nr),
            spol: Table::zeros(nx, nr),
        })
    }

    pub fn to_pmap(&self) -> ParamMap {
        let mut map = ParamMap::new();
        map.add_int("maxit", self.maxit);
        map.add_double("tol", self.tol);
        map.add_double("qadp", self.qadp);
        map.add_double("sadp", self.sadp);
        map
    }

    pub fn converged(&self) -> bool {
        self.acc < self.tol
    }

    pub fn exhausted(&self) -> bool {
        self.it >= self.maxit
    }

    /// Raw ordered dump, matching the canonical layout exactly: maxit(i64),
    /// tol, qadp, sadp, acc, it(i64), xbeg, xend.
    pub fn save_scalars(&self, path: impl AsRef<Path>) -> Result<(), CheckpointError> {
        let path = path.as_ref();
        let io = |source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut f = File::create(path).map_err(io)?;
        f.write_all(&self.maxit.to_ne_bytes()).map_err(io)?;
        f.write_all(&self.tol.to_ne_bytes()).map_err(io)?;
        f.write_all(&self.qadp.to_ne_bytes()).map_err(io)?;
        f.write_all(&self.sadp.to_ne_bytes()).map_err(io)?;
        f.write_all(&self.acc.to_ne_bytes()).map_err(io)?;
        f.write_all(&self.it.to_ne_bytes()).map_err(io)?;
        f.write_all(&self.xbeg.to_ne_bytes()).map_err(io)?;
        f.write_all(&self.xend.to_ne_bytes()).map_err(io)?;
        Ok(())
    }

    #[allow(clippy::type_complexity)]
    pub fn load_scalars(path: impl AsRef<Path>) -> Result<(i64, f64, f64, f64, f64, i64, f64, f64), CheckpointError> {
        let path = path.as_ref();
        let io = |source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut f = File::open(path).map_err(io)?;
        let mut i64buf = [0u8; 8];
        let mut f64buf = [0u8; 8];

        f.read_exact(&mut i64buf).map_err(io)?;
        let maxit = i64::from_ne_bytes(i64buf);
        f.read_exact(&mut f64buf).map_err(io)?;
        let tol = f64::from_ne_bytes(f64buf);
        f.read_exact(&mut f64buf).map_err(io)?;
        let qadp = f64::from_ne_bytes(f64buf);
        f.read_exact(&mut f64buf).map_err(io)?;
        let sadp = f64::from_ne_bytes(f64buf);
        f.read_exact(&mut f64buf).map_err(io)?;
        let acc = f64::from_ne_bytes(f64buf);
        f.read_exact(&mut i64buf).map_err(io)?;
        let it = i64::from_ne_bytes(i64buf);
        f.read_exact(&mut f64buf).map_err(io)?;
        let xbeg = f64::from_ne_bytes(f64buf);
        f.read_exact(&mut f64buf).map_err(io)?;
        let xend = f64::from_ne_bytes(f64buf);

        Ok((maxit, tol, qadp, sadp, acc, it, xbeg, xend))
    }

    fn matrix_path(dir: &Path, name: &str) -> PathBuf {
        dir.join(name)
    }

    /// Persists the directory layout: `solution, xg, rg, qg, sg, v0, v1,
    /// qpol, spol`.
    pub fn save_dir(&self, dir: impl AsRef<Path>) -> Result<(), CheckpointError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| CheckpointError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        self.save_scalars(Self::matrix_path(dir, "solution"))?;
        self.xg.save(Self::matrix_path(dir, "xg"))?;
        self.rg.save(Self::matrix_path(dir, "rg"))?;
        self.qg.save(Self::matrix_path(dir, "qg"))?;
        self.sg.save(Self::matrix_path(dir, "sg"))?;
        save_matrix(&self.v0, Self::matrix_path(dir, "v0"))?;
        save_matrix(&self.v1, Self::matrix_path(dir, "v1"))?;
        save_matrix(&self.qpol, Self::matrix_path(dir, "qpol"))?;
        save_matrix(&self.spol, Self::matrix_path(dir, "spol"))?;
        Ok(())
    }

    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Solution, CheckpointError> {
        let dir = dir.as_ref();
        let (maxit, tol, qadp, sadp, acc, it, xbeg, xend) = Self::load_scalars(Self::matrix_path(dir, "solution"))?;
        let xg = Grid::load(Self::matrix_path(dir, "xg"))?;
        let rg = Grid::load(Self::matrix_path(dir, "rg"))?;
        let qg = Grid::load(Self::matrix_path(dir, "qg"))?;
        let sg = Grid::load(Self::matrix_path(dir, "sg"))?;
        let v0 = load_matrix(Self::matrix_path(dir, "v0"))?;
        let v1 = load_matrix(Self::matrix_path(dir, "v1"))?;
        let qpol = load_matrix(Self::matrix_path(dir, "qpol"))?;
        let spol = load_matrix(Self::matrix_path(dir, "spol"))?;

        Ok(Solution {
            maxit,
            tol,
            qadp,
            sadp,
            acc,
            it,
            xbeg,
            xend,
            xg,
            rg,
            qg,
            sg,
            v0,
            v1,
            qpol,
            spol,
        })
    }
}

/// Matrix binary layout: `i16 d1 | i16 d2 | d1*d2 x f64 row-major`.
fn save_matrix(table: &Table, path: impl AsRef<Path>) -> Result<(), CheckpointError> {
    let path = path.as_ref();
    let io = |source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut f = File::create(path).map_err(io)?;
    f.write_all(&(table.nx() as i16).to_ne_bytes()).map_err(io)?;
    f.write_all(&(table.nr() as i16).to_ne_bytes()).map_err(io)?;
    for v in table.as_slice() {
        f.write_all(&v.to_ne_bytes()).map_err(io)?;
    }
    Ok(())
}

fn load_matrix(path: impl AsRef<Path>) -> Result<Table, CheckpointError> {
    let path = path.as_ref();
    let io = |source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    };
    let corrupt = || CheckpointError::Corrupt {
        path: path.to_path_buf(),
    };
    let mut f = File::open(path).map_err(io)?;
    let mut i16buf = [0u8; 2];
    f.read_exact(&mut i16buf).map_err(io)?;
    let d1 = i16::from_ne_bytes(i16buf);
    f.read_exact(&mut i16buf).map_err(io)?;
    let d2 = i16::from_ne_bytes(i16buf);
    if d1 <= 0 || d2 <= 0 {
        return Err(corrupt());
    }
    let (d1, d2) = (d1 as usize, d2 as usize);

    let mut data = Vec::with_capacity(d1 * d2);
    let mut f64buf = [0u8; 8];
    for _ in 0..d1 * d2 {
        f.read_exact(&mut f64buf).map_err(io)?;
        data.push(f64::from_ne_bytes(f64buf));
    }
    Ok(Table::from_raw(d1, d2, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_map() -> ParamMap {
        let mut m = ParamMap::new();
        m.add_int("maxit", 50);
        m.add_double("tol", 1e-6);
        m.add_double("qadp", 0.1);
        m.add_double("sadp", 0.1);
        m.add("xg", "5, 0, 10");
        m.add("rg", "5, 0, 1");
        m.add("qg", "4, 0, 2");
        m.add("sg", "4, 0, 2");
        m
    }

    #[test]
    fn initializes_acc_above_tol_and_zero_iteration() {
        let sol = Solution::from_pmap(&base_map()).unwrap();
        assert!(sol.acc > sol.tol);
        assert_eq!(sol.it, 0);
        assert!(!sol.converged());
        assert!(!sol.exhausted());
    }

    #[test]
    fn save_and_load_dir_round_trips() {
        let mut sol = Solution::from_pmap(&base_map()).unwrap();
        sol.v1.set(1, 1, 3.25);
        sol.it = 4;
        let dir = tempfile::tempdir().unwrap();
        sol.save_dir(dir.path()).unwrap();
        let loaded = Solution::load_dir(dir.path()).unwrap();
        assert_eq!(loaded.it, 4);
        assert!((loaded.v1.get(1, 1) - 3.25).abs() < 1e-12);
        assert_eq!(loaded.xg.n(), sol.xg.n());
    }
}
