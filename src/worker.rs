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

//! Per-partition one-iteration maximization kernel.

use crate::grid::Grid;
use crate::interp::{bilinear, Table};
use crate::model::Model;
use crate::partition::{decode, Partition};
use crate::specs::ObjectiveVars;

/// Per-worker scratch: a private copy of the quantity grid (whose upper
/// bound is retightened every inner loop) and the three output buffers
/// sized to the worker's partition.
pub struct WorkerScratch {
    pub qg_local: Grid,
    pub v_buf: Vec<f64>,
    pub q_buf: Vec<f64>,
    pub s_buf: Vec<f64>,
}

impl WorkerScratch {
    pub fn new(qg_template: &Grid, partition: &Partition) -> WorkerScratch {
        WorkerScratch {
            qg_local: qg_template.clone(),
            v_buf: vec![0.0; partition.logical_size],
            q_buf: vec![0.0; partition.logical_size],
            s_buf: vec![0.0; partition.logical_size],
        }
    }
}

/// Element-wise-max reductions a worker accumulates across one iteration
/// over its partition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reductions {
    pub acc: f64,
    pub q_max: f64,
    pub s_max: f64,
    pub v_max: f64,
}

/// Fixed warm-start seed for `v_buf`, run once before the first iteration:
/// `util(x, r, q = x/r, s = 0) - cost(...)`.
pub fn bootstrap_seed(model: &Model, xg: &Grid, rg: &Grid, partition: &Partition, v_buf: &mut [f64]) {
    for (li, slot) in v_buf.iter_mut().enumerate() {
        let (xi, ri) = decode(partition.logical_offset + li, rg.n());
        let x = xg.points()[xi];
        let r = rg.points()[ri];
        let q = x / r;
        let vars = ObjectiveVars {
            model,
            x,
            r,
            q,
            s: 0.0,
        };
        *slot = model.util_part.evaluate(&vars) - model.cost_part.evaluate(&vars);
    }
}

/// Runs one iteration of the maximization kernel over `partition`, reading
/// the previous value table `v1` and writing into the worker's scratch
/// buffers. `q_ceiling` is the coordinator's current global bound on the
/// quantity grid.
pub fn run_iteration(
    model: &Model,
    xg: &Grid,
    rg: &Grid,
    sg: &Grid,
    v1: &Table,
    partition: &Partition,
    scratch: &mut WorkerScratch,
    q_ceiling: f64,
) -> Reductions {
    let mut red = Reductions::default();

    for li in 0..partition.logical_size {
        let (xi, ri) = decode(partition.logical_offset + li, rg.n());
        let x = xg.points()[xi];
        let r = rg.points()[ri];

        let mut best_v = 0.0;
        let mut best_q = 0.0;
        let mut best_s = 0.0;
        let mut have_best = false;

        for &s in sg.points() {
            let vars_r = ObjectiveVars {
                model,
                x,
                r,
                q: 0.0,
                s,
            };
            let rp = model.radt_part.evaluate(&vars_r);
            let r_li = rg.lower_index(rp);

            scratch.qg_local.set_upper_and_recompute(q_ceiling.min(x / rp));
            let q_points: Vec<f64> = scratch.qg_local.points().to_vec();

            for &q in &q_points {
                let vars = ObjectiveVars {
                    model,
                    x,
                    r,
                    q,
                    s,
                };
                let xp = model.wltt_part.evaluate(&vars);
                let x_li = xg.lower_index(xp);
                let vp = bilinear(v1, xg, rg, x_li, r_li, xp, rp);
                let u = model.util_part.evaluate(&vars);
                let c = model.cost_part.evaluate(&vars);
                let v = u - c + model.beta * vp;

                if !have_best || best_v < v {
                    best_v = v;
                    best_q = q;
                    best_s = s;
                    have_best = true;
                }
            }
        }

        let diff = (best_v - v1.get(xi, ri)).abs();
        red.acc = red.acc.max(diff);
        red.q_max = red.q_max.max(best_q);
        red.s_max = red.s_max.max(best_s);
        red.v_max = red.v_max.max(best_v);

        scratch.v_buf[li] = best_v;
        scratch.q_buf[li] = best_q;
        scratch.s_buf[li] = best_s;
    }

    red
}
