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

//! Two-phase barrier coordinating `W` worker threads plus the driver
//! thread (itself acting as the `(W+1)`-th worker), the adaptive
//! control-grid tightening that runs each finalize phase, and the
//! periodic checkpoint trigger.

use std::path::{Path, PathBuf};

use parking_lot::{Condvar, Mutex, RwLock};

use crate::config::Config;
use crate::error::SolveError;
use crate::grid::Grid;
use crate::interp::Table;
use crate::model::Model;
use crate::partition::{partition, Partition};
use crate::solution::Solution;
use crate::worker::{bootstrap_seed, run_iteration, Reductions, WorkerScratch};

/// State mutated only while the coordinator mutex is held: the "new"
/// value/policy tables being assembled this iteration, the global
/// reduction buffers, the adaptively-tightened effort grid and quantity
/// ceiling, and the barrier bookkeeping.
struct Critical {
    v0: Table,
    qpol: Table,
    spol: Table,
    sg: Grid,
    acc: f64,
    accbuf: f64,
    q_max_buf: f64,
    s_max_buf: f64,
    v_max_buf: f64,
    q_ceiling: f64,
    it: i64,
    it_done_count: usize,
    is_next_ready: bool,
    /// Set when a worker thread failed to spawn and the driver is giving up
    /// on this solve; wakes any already-running workers blocked on the
    /// barrier for a driver that will now never finalize another phase.
    aborted: bool,
}

/// Shared coordinator state. `v1`, the previous iteration's value table,
/// lives behind a `RwLock` rather than inside `Critical`: workers hold a
/// read guard for the whole duration of their compute pass (many
/// concurrent readers, no contention), and the driver takes the write
/// lock only during the finalize-phase swap, by which point the barrier
/// guarantees every worker has already dropped its read guard.
struct Shared {
    critical: Mutex<Critical>,
    v1: RwLock<Table>,
    it_done: Condvar,
    next_ready: Condvar,
}

impl Shared {
    /// Publishes a worker's results for this phase and blocks until the
    /// driver releases the barrier for the next one. Returns `true` if the
    /// solve was aborted out from under it (a sibling worker failed to
    /// spawn) -- the caller should stop rather than start another phase.
    fn publish(&self, partition: &Partition, nr: usize, scratch: &WorkerScratch, red: Reductions) -> bool {
        let mut crit = self.critical.lock();
        for li in 0..partition.logical_size {
            let (xi, ri) = crate::partition::decode(partition.logical_offset + li, nr);
            crit.v0.set(xi, ri, scratch.v_buf[li]);
            crit.qpol.set(xi, ri, scratch.q_buf[li]);
            crit.spol.set(xi, ri, scratch.s_buf[li]);
        }
        crit.accbuf = crit.accbuf.max(red.acc);
        crit.q_max_buf = crit.q_max_buf.max(red.q_max);
        crit.s_max_buf = crit.s_max_buf.max(red.s_max);
        crit.v_max_buf = crit.v_max_buf.max(red.v_max);

        crit.it_done_count += 1;
        self.it_done.notify_one();

        while !crit.is_next_ready && !crit.aborted {
            self.next_ready.wait(&mut crit);
        }
        crit.aborted
    }

    /// Snapshot of the values a worker needs to run one iteration: the
    /// current effort grid and quantity ceiling, plus the current
    /// `(acc, it)` used to decide whether to keep iterating.
    fn snapshot(&self) -> (Grid, f64, f64, i64) {
        let crit = self.critical.lock();
        (crit.sg.clone(), crit.q_ceiling, crit.acc, crit.it)
    }
}

fn should_continue(acc: f64, it: i64, tol: f64, maxit: i64) -> bool {
    acc >= tol && it < maxit
}

#[allow(clippy::too_many_arguments)]
fn worker_thread_body(
    model: &Model,
    xg: &Grid,
    rg: &Grid,
    qg_template: &Grid,
    partition: Partition,
    shared: &Shared,
    tol: f64,
    maxit: i64,
    fresh: bool,
) {
    let mut scratch = WorkerScratch::new(qg_template, &partition);

    // Mirrors the driver's bootstrap handling in `solve_parallel`: a fresh
    // solve seeds and publishes once before the real loop; a resumed solve
    // skips straight in using the checkpointed `v1`/`acc`/`it`.
    if fresh {
        bootstrap_seed(model, xg, rg, &partition, &mut scratch.v_buf);
        if shared.publish(&partition, rg.n(), &scratch, Reductions::default()) {
            return;
        }
    }

    loop {
        let (sg_local, q_ceiling, acc, it) = shared.snapshot();
        if !should_continue(acc, it, tol, maxit) {
            break;
        }
        let v1_guard = shared.v1.read();
        let red = run_iteration(model, xg, rg, &sg_local, &v1_guard, &partition, &mut scratch, q_ceiling);
        drop(v1_guard);
        if shared.publish(&partition, rg.n(), &scratch, red) {
            break;
        }
    }
}

/// Finalizes one iteration on the driver's behalf: publishes the driver's
/// own partition, waits for every worker to publish, swaps the
/// double-buffered value tables, applies adaptive bounds, checkpoints on
/// cadence, and releases the barrier for the next iteration. Returns the
/// `(acc, it)` the workers will see next.
#[allow(clippy::too_many_arguments)]
fn driver_finalize(
    shared: &Shared,
    partition: &Partition,
    nr: usize,
    nb_workers: usize,
    scratch: &WorkerScratch,
    red: Reductions,
    qadp: f64,
    sadp: f64,
    config: &Config,
    model: &Model,
    xg: &Grid,
    rg: &Grid,
    qg_template: &Grid,
    maxit: i64,
    tol: f64,
    xbeg: f64,
) -> (f64, i64) {
    let mut crit = shared.critical.lock();
    for li in 0..partition.logical_size {
        let (xi, ri) = crate::partition::decode(partition.logical_offset + li, nr);
        crit.v0.set(xi, ri, scratch.v_buf[li]);
        crit.qpol.set(xi, ri, scratch.q_buf[li]);
        crit.spol.set(xi, ri, scratch.s_buf[li]);
    }
    crit.accbuf = crit.accbuf.max(red.acc);
    crit.q_max_buf = crit.q_max_buf.max(red.q_max);
    crit.s_max_buf = crit.s_max_buf.max(red.s_max);
    crit.v_max_buf = crit.v_max_buf.max(red.v_max);

    while crit.it_done_count < nb_workers {
        shared.it_done.wait(&mut crit);
    }
    crit.it_done_count = 0;
    crit.is_next_ready = false;

    if crit.it > 0 && crit.it as u64 % config.log_cycle.max(1) == 0 {
        log::trace!(
            "{:>10}|{:>10.4e}|{:>10.4e}|{:>10.4e}|{:>10.4e}",
            crit.it,
            crit.accbuf,
            crit.v_max_buf,
            crit.q_max_buf,
            crit.s_max_buf
        );
    }

    // Finalize phase swap: safe because every worker has already dropped
    // its v1 read guard by the time it reaches `publish`/`driver_finalize`.
    {
        let mut v1 = shared.v1.write();
        Table::swap(&mut v1, &mut crit.v0);
    }

    crit.acc = crit.accbuf;
    crit.accbuf = 0.0;

    // Adaptive bounds (component I): monotonically tighten the control
    // ceilings toward the observed maxima plus a diminishing slack term.
    if crit.it > 0 {
        let adp_q = crit.q_max_buf + qadp / (crit.it as f64 + 1.0);
        if adp_q < crit.q_ceiling {
            crit.q_ceiling = adp_q;
        }
        let adp_s = crit.s_max_buf + sadp / (crit.it as f64 + 1.0);
        if adp_s < crit.sg.upper() {
            crit.sg.set_upper_and_recompute(adp_s);
        }
    }

    crit.q_max_buf = 0.0;
    crit.s_max_buf = 0.0;
    crit.v_max_buf = 0.0;

    if crit.it > 0 && crit.it as u64 % config.save_cycle.max(1) == 0 {
        let dir = checkpoint_dir(config, crit.it);
        log::debug!("checkpointing at iteration {} to {:?}", crit.it, dir);
        let v1_snapshot = shared.v1.read();
        let mut qg_adapted = qg_template.clone();
        qg_adapted.set_upper_and_recompute(crit.q_ceiling);
        let snapshot = Solution {
            maxit,
            tol,
            qadp,
            sadp,
            acc: crit.acc,
            it: crit.it,
            xbeg,
            xend: 0.0,
            xg: xg.clone(),
            rg: rg.clone(),
            qg: qg_adapted,
            sg: crit.sg.clone(),
            v0: crit.v0.clone(),
            v1: v1_snapshot.clone(),
            qpol: crit.qpol.clone(),
            spol: crit.spol.clone(),
        };
        drop(v1_snapshot);
        if let Err(e) = write_checkpoint(&dir, model, &snapshot) {
            log::warn!("checkpoint write at iteration {} failed: {}", crit.it, e);
        }
    }

    crit.it += 1;
    crit.is_next_ready = true;
    shared.next_ready.notify_all();

    (crit.acc, crit.it)
}

fn checkpoint_dir(config: &Config, it: i64) -> PathBuf {
    config.tmp_dir.join("save").join(format!("it{it:05}"))
}

/// Writes a final checkpoint to a caller-chosen directory (e.g.
/// `<tmp_dir>/msol`), for the CLI binaries to call once after `solve`
/// returns -- distinct from the periodic `save_cycle` checkpoints taken
/// during the loop itself.
pub fn save_final(dir: &Path, model: &Model, solution: &Solution) -> Result<(), crate::error::CheckpointError> {
    write_checkpoint(dir, model, solution)
}

/// Writes the full checkpoint directory layout: a provenance header, the
/// model's scalars and function labels, and the solution's scalars,
/// grids, and tables.
fn write_checkpoint(dir: &Path, model: &Model, solution: &Solution) -> Result<(), crate::error::CheckpointError> {
    std::fs::create_dir_all(dir).map_err(|source| crate::error::CheckpointError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    write_head(&dir.join("head"))?;
    model.save(dir.join("model"))?;
    model
        .save_fncs(dir.join("fncs"))
        .map_err(|_| crate::error::CheckpointError::Corrupt { path: dir.join("fncs") })?;
    solution.save_dir(dir)
}

/// Provenance stamp: creation time, host, and user, each its own owned
/// `String` (the reference implementation's Windows branch reused one
/// fixed-size buffer length for both host and user names; using owned
/// strings here sidesteps that entirely).
fn write_head(path: &Path) -> Result<(), crate::error::CheckpointError> {
    let host = hostname();
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let created = chrono::Local::now().to_rfc3339();
    let contents = format!("Created = {created}\nHost = {host}\nUser = {user}\n");
    std::fs::write(path, contents).map_err(|source| crate::error::CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Runs the full parallel fixed-point iteration to convergence (or until
/// `solution.maxit`), mutating `solution` in place. On return, the
/// accepted value table is always `solution.v1` (a final swap is applied
/// if the iteration count is odd).
pub fn solve(model: &Model, solution: &mut Solution, config: &Config) -> Result<(), SolveError> {
    let nb_workers = config.workers;
    let nx = solution.xg.n();
    let nr = solution.rg.n();
    let partitions = partition(nx, nr, nb_workers + 1);

    log::info!(
        "starting solve: {}x{} states, {} workers, maxit={}, tol={:e}",
        nx,
        nr,
        nb_workers,
        solution.maxit,
        solution.tol
    );

    // xbeg is only stamped on a truly fresh solve (it == 0); a resume
    // carries its loaded xbeg forward unchanged, so xend - xbeg spans
    // every solve that has contributed to this checkpoint, not just the
    // most recent one.
    if solution.it == 0 {
        solution.xbeg = crate::solution::now_secs();
    }

    if nb_workers == 0 {
        solve_single_threaded(model, solution, config, &partitions[0]);
    } else {
        solve_parallel(model, solution, config, &partitions, nb_workers)?;
    }

    if solution.it % 2 != 0 {
        Table::swap(&mut solution.v0, &mut solution.v1);
    }

    solution.xend = crate::solution::now_secs();
    log::info!(
        "solve finished after {} iterations, acc={:e}, {:.3} sec",
        solution.it,
        solution.acc,
        solution.xend - solution.xbeg
    );
    Ok(())
}

/// The one-time bump a resumed solve applies before entering the real
/// loop: recomputes the q/s reduction buffers from the loaded policy
/// tables (since nothing has run yet to produce them), applies one
/// adaptive-bounds pass from those, and bumps `it` by one -- mirroring
/// the reference's `resume_concurrency`, which performs this before a
/// single real iteration has executed. `it` is bumped unconditionally
/// (not gated on new work happening), so a resume with zero additional
/// iterations still advances `it` by exactly one; property 7 (save/resume
/// equivalence) is stated "modulo that +1" for this reason.
fn resume_bump(solution: &mut Solution, q_ceiling: &mut f64) {
    let (nx, nr) = (solution.xg.n(), solution.rg.n());
    let mut q_max = 0.0f64;
    let mut s_max = 0.0f64;
    for xi in 0..nx {
        for ri in 0..nr {
            q_max = q_max.max(solution.qpol.get(xi, ri));
            s_max = s_max.max(solution.spol.get(xi, ri));
        }
    }

    let adp_q = q_max + solution.qadp / (solution.it as f64 + 1.0);
    if adp_q < *q_ceiling {
        *q_ceiling = adp_q;
        solution.qg.set_upper_and_recompute(*q_ceiling);
    }
    let adp_s = s_max + solution.sadp / (solution.it as f64 + 1.0);
    if adp_s < solution.sg.upper() {
        solution.sg.set_upper_and_recompute(adp_s);
    }

    solution.it += 1;
}

fn solve_single_threaded(model: &Model, solution: &mut Solution, config: &Config, partition: &Partition) {
    let mut scratch = WorkerScratch::new(&solution.qg, partition);
    let mut q_ceiling = solution.qg.upper();

    // Bootstrap phase: only run on a fresh solve (it == 0). A resumed
    // solve already has a meaningful v1 from its checkpoint and takes the
    // `resume_bump` path instead, skipping straight to the fixed-point
    // loop below. The bootstrap swap seeds v1 with the warm-start values
    // so the first real iteration has something to interpolate against;
    // it counts as the iteration that bumps `it` from 0 to 1, same as
    // every other iteration's finalize.
    if solution.it == 0 {
        bootstrap_seed(model, &solution.xg, &solution.rg, partition, &mut scratch.v_buf);
        for li in 0..partition.logical_size {
            let (xi, ri) = crate::partition::decode(partition.logical_offset + li, solution.rg.n());
            solution.v0.set(xi, ri, scratch.v_buf[li]);
        }
        Table::swap(&mut solution.v0, &mut solution.v1);
        solution.it = 1;
    } else {
        resume_bump(solution, &mut q_ceiling);
    }

    while solution.acc >= solution.tol && solution.it < solution.maxit {
        let red = run_iteration(
            model,
            &solution.xg,
            &solution.rg,
            &solution.sg,
            &solution.v1,
            partition,
            &mut scratch,
            q_ceiling,
        );
        for li in 0..partition.logical_size {
            let (xi, ri) = crate::partition::decode(partition.logical_offset + li, solution.rg.n());
            solution.v0.set(xi, ri, scratch.v_buf[li]);
            solution.qpol.set(xi, ri, scratch.q_buf[li]);
            solution.spol.set(xi, ri, scratch.s_buf[li]);
        }

        if solution.it > 0 && solution.it as u64 % config.log_cycle.max(1) == 0 {
            log::trace!(
                "{:>10}|{:>10.4e}|{:>10.4e}|{:>10.4e}|{:>10.4e}",
                solution.it,
                red.acc,
                red.v_max,
                red.q_max,
                red.s_max
            );
        }

        Table::swap(&mut solution.v0, &mut solution.v1);
        solution.acc = red.acc;

        if solution.it > 0 {
            let adp_q = red.q_max + solution.qadp / (solution.it as f64 + 1.0);
            if adp_q < q_ceiling {
                q_ceiling = adp_q;
                // Also update the persisted grid bound, for resuming.
                solution.qg.set_upper_and_recompute(q_ceiling);
            }
            let adp_s = red.s_max + solution.sadp / (solution.it as f64 + 1.0);
            if adp_s < solution.sg.upper() {
                solution.sg.set_upper_and_recompute(adp_s);
            }
        }

        if solution.it > 0 && solution.it as u64 % config.save_cycle.max(1) == 0 {
            let dir = checkpoint_dir(config, solution.it);
            let result = solution
                .save_dir(&dir)
                .and_then(|_| model.save(dir.join("model")))
                .and_then(|_| {
                    model
                        .save_fncs(dir.join("fncs"))
                        .map_err(|_| crate::error::CheckpointError::Corrupt { path: dir.join("fncs") })
                });
            if let Err(e) = result {
                log::warn!("checkpoint write at iteration {} failed: {}", solution.it, e);
            }
        }

        solution.it += 1;
    }
}

fn solve_parallel(
    model: &Model,
    solution: &mut Solution,
    config: &Config,
    partitions: &[Partition],
    nb_workers: usize,
) -> Result<(), SolveError> {
    // A fresh solve (it == 0) runs one bootstrap pass before the real
    // fixed-point loop, seeding v1 with a warm start. To prevent that
    // bootstrap swap from zeroing out `acc` (every worker publishes zero
    // reductions during bootstrap), `accbuf` is forced to `tol + 1` first,
    // mirroring the reference's pre-bootstrap `accbuf = tol + 1` trick. A
    // resumed solve (it > 0) already carries a meaningful `acc`/`v1` and
    // skips the bootstrap pass entirely, taking the single-threaded
    // `resume_bump` pass instead (done once up front, not per worker --
    // the reference performs it in `resume_concurrency` before any
    // threads are even created).
    let fresh = solution.it == 0;
    let mut q_ceiling_init = solution.qg.upper();
    if !fresh {
        resume_bump(solution, &mut q_ceiling_init);
    }
    let shared = Shared {
        critical: Mutex::new(Critical {
            v0: solution.v0.clone(),
            qpol: solution.qpol.clone(),
            spol: solution.spol.clone(),
            sg: solution.sg.clone(),
            acc: solution.acc,
            accbuf: if fresh { solution.tol + 1.0 } else { 0.0 },
            q_max_buf: 0.0,
            s_max_buf: 0.0,
            v_max_buf: 0.0,
            q_ceiling: q_ceiling_init,
            it: solution.it,
            it_done_count: 0,
            is_next_ready: false,
            aborted: false,
        }),
        v1: RwLock::new(solution.v1.clone()),
        it_done: Condvar::new(),
        next_ready: Condvar::new(),
    };

    let driver_partition = &partitions[nb_workers];
    let tol = solution.tol;
    let maxit = solution.maxit;
    let qadp = solution.qadp;
    let sadp = solution.sadp;
    let qg_template = &solution.qg;
    let xg = &solution.xg;
    let rg = &solution.rg;
    let xbeg = solution.xbeg;

    let spawn_result: Result<(), std::io::Error> = std::thread::scope(|scope| {
        for wid in 0..nb_workers {
            let p = partitions[wid];
            let shared = &shared;
            let spawned = std::thread::Builder::new().spawn_scoped(scope, move || {
                worker_thread_body(model, xg, rg, qg_template, p, shared, tol, maxit, fresh);
            });
            if let Err(e) = spawned {
                // Some workers before this one may already be running and
                // blocked on the barrier; wake them so the scope can join
                // everyone and return instead of hanging forever.
                let mut crit = shared.critical.lock();
                crit.aborted = true;
                drop(crit);
                shared.next_ready.notify_all();
                return Err(e);
            }
        }

        // Driver bootstrap: seeds its own partition, then runs the
        // fixed-point loop, itself acting as the (W+1)-th worker.
        let mut driver_scratch = WorkerScratch::new(qg_template, driver_partition);
        if fresh {
            bootstrap_seed(model, xg, rg, driver_partition, &mut driver_scratch.v_buf);
            driver_finalize(
                &shared,
                driver_partition,
                rg.n(),
                nb_workers,
                &driver_scratch,
                Reductions::default(),
                qadp,
                sadp,
                config,
                model,
                xg,
                rg,
                qg_template,
                maxit,
                tol,
                xbeg,
            );
        }

        loop {
            let (sg_local, q_ceiling, acc, it) = shared.snapshot();
            if !should_continue(acc, it, tol, maxit) {
                break;
            }
            let red = {
                let v1_guard = shared.v1.read();
                run_iteration(model, xg, rg, &sg_local, &v1_guard, driver_partition, &mut driver_scratch, q_ceiling)
            };
            driver_finalize(
                &shared,
                driver_partition,
                rg.n(),
                nb_workers,
                &driver_scratch,
                red,
                qadp,
                sadp,
                config,
                model,
                xg,
                rg,
                qg_template,
                maxit,
                tol,
                xbeg,
            );
        }
        Ok(())
    });
    spawn_result.map_err(SolveError::ThreadSpawn)?;

    let crit = shared.critical.into_inner();
    solution.v1 = shared.v1.into_inner();
    solution.v0 = crit.v0;
    solution.qpol = crit.qpol;
    solution.spol = crit.spol;
    solution.sg = crit.sg;
    solution.acc = crit.acc;
    solution.it = crit.it;
    solution.qg.set_upper_and_recompute(crit.q_ceiling);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pmap::ParamMap;
    use crate::specs::ObjectivePart;

    fn model() -> Model {
        Model {
            alpha: 0.1,
            beta: 0.9,
            delta: 0.2,
            gamma: 0.3,
            r_coef: 1.02,
            util_part: ObjectivePart::Util,
            cost_part: ObjectivePart::Cost,
            radt_part: ObjectivePart::RadiusTransition,
            wltt_part: ObjectivePart::WealthTransition,
        }
    }

    fn base_map() -> ParamMap {
        let mut m = ParamMap::new();
        m.add_int("maxit", 5);
        m.add_double("tol", 1e-9);
        m.add_double("qadp", 0.1);
        m.add_double("sadp", 0.1);
        m.add("xg", "4, 1, 4");
        m.add("rg", "4, 0.2, 1");
        m.add("qg", "3, 0, 2");
        m.add("sg", "3, 0, 1");
        m
    }

    #[test]
    fn single_threaded_solve_terminates_at_maxit() {
        let m = model();
        let mut sol = Solution::from_pmap(&base_map()).unwrap();
        let mut config = Config::default();
        config.workers = 0;
        solve(&m, &mut sol, &config).unwrap();
        assert_eq!(sol.it, sol.maxit);
    }

    #[test]
    fn parallel_and_single_threaded_agree_on_iteration_count() {
        let m = model();
        let mut sol_single = Solution::from_pmap(&base_map()).unwrap();
        let mut cfg_single = Config::default();
        cfg_single.workers = 0;
        solve(&m, &mut sol_single, &cfg_single).unwrap();

        let mut sol_parallel = Solution::from_pmap(&base_map()).unwrap();
        let mut cfg_parallel = Config::default();
        cfg_parallel.workers = 2;
        solve(&m, &mut sol_parallel, &cfg_parallel).unwrap();

        assert_eq!(sol_single.it, sol_parallel.it);
    }

    #[test]
    fn control_ceilings_never_increase() {
        let m = model();
        let mut sol = Solution::from_pmap(&base_map()).unwrap();
        let q_before = sol.qg.upper();
        let s_before = sol.sg.upper();
        let mut config = Config::default();
        config.workers = 0;
        solve(&m, &mut sol, &config).unwrap();
        assert!(sol.qg.upper() <= q_before + 1e-12);
        assert!(sol.sg.upper() <= s_before + 1e-12);
    }

    #[test]
    fn resume_bump_advances_it_by_exactly_one_and_never_raises_ceilings() {
        let m = model();
        let mut sol = Solution::from_pmap(&base_map()).unwrap();
        sol.maxit = 3;
        let mut config = Config::default();
        config.workers = 0;
        solve(&m, &mut sol, &config).unwrap();
        assert_eq!(sol.it, 3);

        let it_before = sol.it;
        let q_before = sol.qg.upper();
        let s_before = sol.sg.upper();
        let mut q_ceiling = q_before;
        resume_bump(&mut sol, &mut q_ceiling);

        assert_eq!(sol.it, it_before + 1);
        assert!(sol.qg.upper() <= q_before + 1e-12);
        assert!(sol.sg.upper() <= s_before + 1e-12);
    }

    #[test]
    fn resuming_with_zero_additional_iterations_only_bumps_it() {
        let m = model();
        let mut sol = Solution::from_pmap(&base_map()).unwrap();
        sol.maxit = 3;
        let mut config = Config::default();
        config.workers = 0;
        solve(&m, &mut sol, &config).unwrap();

        let v1_before = sol.v1.clone();
        let it_before = sol.it;

        // Capping maxit at the already-reached iteration count means the
        // fixed-point loop body never runs; only `resume_bump` fires.
        sol.maxit = it_before;
        solve(&m, &mut sol, &config).unwrap();

        assert_eq!(sol.it, it_before + 1);
        for xi in 0..sol.v1.nx() {
            for ri in 0..sol.v1.nr() {
                assert!((sol.v1.get(xi, ri) - v1_before.get(xi, ri)).abs() < 1e-12);
            }
        }
    }
}
