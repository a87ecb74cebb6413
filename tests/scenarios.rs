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

//! Concrete scenarios exercising the public API end to end, the way the
//! CLI binaries do.

use attn_radius_solver::config::Config;
use attn_radius_solver::coordinator;
use attn_radius_solver::grid::Grid;
use attn_radius_solver::interp::{bilinear, Table};
use attn_radius_solver::model::Model;
use attn_radius_solver::partition::partition;
use attn_radius_solver::pmap::ParamMap;
use attn_radius_solver::solution::Solution;
use attn_radius_solver::specs::ObjectivePart;

fn parts() -> [ObjectivePart; 4] {
    [
        ObjectivePart::Util,
        ObjectivePart::Cost,
        ObjectivePart::RadiusTransition,
        ObjectivePart::WealthTransition,
    ]
}

#[test]
fn s1_uniform_grid() {
    let g = Grid::from_init_string("5, 0.0, 1.0, 1.0").unwrap();
    let expected = [0.00, 0.25, 0.50, 0.75, 1.00];
    for (got, want) in g.points().iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-12);
    }
}

#[test]
fn s2_weighted_grid() {
    let g = Grid::from_init_string("5, 0.0, 1.0, 2.0").unwrap();
    let expected = [0.0, 0.0625, 0.25, 0.5625, 1.0];
    for (got, want) in g.points().iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-9);
    }
}

#[test]
fn s3_lower_index() {
    let g = Grid::from_init_string("5, 0.0, 1.0, 1.0").unwrap();
    let queries = [-1.0, 0.0, 0.3, 0.75, 1.0, 2.0];
    let expected = [0, 0, 1, 3, 3, 3];
    for (q, want) in queries.iter().zip(expected.iter()) {
        assert_eq!(g.lower_index(*q), *want);
    }
}

#[test]
fn s4_bilinear_midpoint() {
    let xg = Grid::from_init_string("2, 0.0, 1.0, 1.0").unwrap();
    let rg = Grid::from_init_string("2, 0.0, 1.0, 1.0").unwrap();
    let mut t = Table::zeros(2, 2);
    t.set(0, 0, 0.0);
    t.set(0, 1, 1.0);
    t.set(1, 0, 1.0);
    t.set(1, 1, 2.0);
    let v = bilinear(&t, &xg, &rg, 0, 0, 0.5, 0.5);
    assert!((v - 1.0).abs() < 1e-12);
}

#[test]
fn s5_partition_balanced() {
    let parts = partition(3, 4, 3);
    let sizes: Vec<usize> = parts.iter().map(|p| p.logical_size).collect();
    let offsets: Vec<usize> = parts.iter().map(|p| p.logical_offset).collect();
    assert_eq!(sizes, vec![4, 4, 4]);
    assert_eq!(offsets, vec![0, 4, 8]);
}

#[test]
fn s6_partition_with_remainder() {
    let parts = partition(3, 5, 4);
    let sizes: Vec<usize> = parts.iter().map(|p| p.logical_size).collect();
    let offsets: Vec<usize> = parts.iter().map(|p| p.logical_offset).collect();
    assert_eq!(sizes, vec![4, 4, 4, 3]);
    assert_eq!(offsets, vec![0, 4, 8, 12]);
}

fn tiny_model() -> Model {
    Model {
        alpha: 0.5,
        beta: 0.5,
        delta: 0.5,
        gamma: 0.5,
        r_coef: 0.5,
        util_part: ObjectivePart::Util,
        cost_part: ObjectivePart::Cost,
        radt_part: ObjectivePart::RadiusTransition,
        wltt_part: ObjectivePart::WealthTransition,
    }
}

fn tiny_map() -> ParamMap {
    let mut m = ParamMap::new();
    m.add_int("maxit", 10);
    m.add_double("tol", 1e-3);
    m.add_double("qadp", 0.1);
    m.add_double("sadp", 0.1);
    m.add("xg", "3, 0.1, 3");
    m.add("rg", "3, 0.1, 1");
    m.add("qg", "3, 0, 2");
    m.add("sg", "3, 0, 1");
    m
}

#[test]
fn s7_end_to_end_tiny_converges_with_monotone_ceiling() {
    let model = tiny_model();
    let mut solution = Solution::from_pmap(&tiny_map()).unwrap();
    let q_before = solution.qg.upper();

    let mut config = Config::default();
    config.workers = 0;

    coordinator::solve(&model, &mut solution, &config).unwrap();

    assert!(solution.it <= solution.maxit);
    assert!(solution.acc < solution.tol || solution.it == solution.maxit);
    assert!(solution.qg.upper() <= q_before + 1e-12);
}

#[test]
fn save_resume_equivalence() {
    let model = tiny_model();
    let mut solution = Solution::from_pmap(&tiny_map()).unwrap();
    solution.maxit = 3;

    let mut config = Config::default();
    config.workers = 0;
    coordinator::solve(&model, &mut solution, &config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    solution.save_dir(dir.path()).unwrap();
    model.save(dir.path().join("model")).unwrap();

    let mut resumed = Solution::load_dir(dir.path()).unwrap();
    let loaded_model = Model::load(dir.path().join("model"), parts()).unwrap();
    assert_eq!(resumed.it, solution.it);

    // Resuming for zero additional iterations (maxit capped at the
    // loaded iteration count) should leave the tables untouched; `it`
    // itself moves by exactly one, the resume bump described in
    // `coordinator::resume_bump`.
    resumed.maxit = resumed.it;
    coordinator::solve(&loaded_model, &mut resumed, &config).unwrap();
    assert_eq!(resumed.it, solution.it + 1);
    for xi in 0..resumed.v1.nx() {
        for ri in 0..resumed.v1.nr() {
            assert!((resumed.v1.get(xi, ri) - solution.v1.get(xi, ri)).abs() < 1e-9);
        }
    }
}

#[test]
fn parallel_matches_single_threaded_value_table() {
    let model = tiny_model();
    let mut single = Solution::from_pmap(&tiny_map()).unwrap();
    let mut cfg_single = Config::default();
    cfg_single.workers = 0;
    coordinator::solve(&model, &mut single, &cfg_single).unwrap();

    let mut parallel = Solution::from_pmap(&tiny_map()).unwrap();
    let mut cfg_parallel = Config::default();
    cfg_parallel.workers = 3;
    coordinator::solve(&model, &mut parallel, &cfg_parallel).unwrap();

    assert_eq!(single.it, parallel.it);
    for xi in 0..single.v1.nx() {
        for ri in 0..single.v1.nr() {
            assert!((single.v1.get(xi, ri) - parallel.v1.get(xi, ri)).abs() < 1e-6);
        }
    }
}
