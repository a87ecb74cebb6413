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

//! Bilinear interpolation of a value-function table over a wealth/radius
//! grid pair.

use crate::grid::Grid;

/// A row-major `nx x nr` table of values, e.g. the value function or a
/// policy table.
#[derive(Debug, Clone)]
pub struct Table {
    nx: usize,
    nr: usize,
    data: Vec<f64>,
}

impl Table {
    pub fn zeros(nx: usize, nr: usize) -> Table {
        Table {
            nx,
            nr,
            data: vec![0.0; nx * nr],
        }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn nr(&self) -> usize {
        self.nr
    }

    #[inline]
    pub fn get(&self, xi: usize, ri: usize) -> f64 {
        self.data[xi * self.nr + ri]
    }

    #[inline]
    pub fn set(&mut self, xi: usize, ri: usize, v: f64) {
        self.data[xi * self.nr + ri] = v;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn from_raw(nx: usize, nr: usize, data: Vec<f64>) -> Table {
        debug_assert_eq!(data.len(), nx * nr);
        Table { nx, nr, data }
    }

    pub fn swap(a: &mut Table, b: &mut Table) {
        std::mem::swap(&mut a.data, &mut b.data);
        std::mem::swap(&mut a.nx, &mut b.nx);
        std::mem::swap(&mut a.nr, &mut b.nr);
    }
}

/// Bilinear interpolation of `table` at `(xp, rp)`, given the lower-neighbor
/// cell `(x1, r1)` obtained from `Grid::lower_index`. The caller is
/// responsible for supplying valid in-range indices; this function performs
/// no clamping.
pub fn bilinear(table: &Table, xg: &Grid, rg: &Grid, x1: usize, r1: usize, xp: f64, rp: f64) -> f64 {
    let xd = xg.points();
    let rd = rg.points();

    let r_frac = (rp - rd[r1]) / (rd[r1 + 1] - rd[r1]);
    let lo = table.get(x1, r1) + r_frac * (table.get(x1, r1 + 1) - table.get(x1, r1));
    let hi = table.get(x1 + 1, r1) + r_frac * (table.get(x1 + 1, r1 + 1) - table.get(x1 + 1, r1));

    let x_frac = (xp - xd[x1]) / (xd[x1 + 1] - xd[x1]);
    lo + x_frac * (hi - lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_at_grid_nodes() {
        let xg = Grid::new(4, 0.0, 3.0, 1.0);
        let rg = Grid::new(4, 0.0, 3.0, 1.0);
        let mut t = Table::zeros(4, 4);
        for xi in 0..4 {
            for ri in 0..4 {
                t.set(xi, ri, (xi * 10 + ri) as f64);
            }
        }
        for xi in 0..3 {
            for ri in 0..3 {
                let xp = xg.points()[xi];
                let rp = rg.points()[ri];
                let v = bilinear(&t, &xg, &rg, xi, ri, xp, rp);
                assert!((v - t.get(xi, ri)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn midpoint_is_average_of_four_corners() {
        let xg = Grid::new(2, 0.0, 2.0, 1.0);
        let rg = Grid::new(2, 0.0, 2.0, 1.0);
        let mut t = Table::zeros(2, 2);
        t.set(0, 0, 0.0);
        t.set(0, 1, 2.0);
        t.set(1, 0, 4.0);
        t.set(1, 1, 6.0);
        let v = bilinear(&t, &xg, &rg, 0, 0, 1.0, 1.0);
        assert!((v - 3.0).abs() < 1e-9);
    }
}
