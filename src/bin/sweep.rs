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

//! Parametric dependency sweep: re-solves the model from scratch once per
//! point of a named parameter's grid, holding the other scalars fixed, and
//! saves each solved setup under `<param>/<param>NN`.

use std::path::PathBuf;
use std::time::Instant;

use attn_radius_solver::checkpoint;
use attn_radius_solver::coordinator;
use attn_radius_solver::error::CheckpointError;
use attn_radius_solver::grid::Grid;
use attn_radius_solver::specs::ObjectivePart;
use attn_radius_solver::Config;
use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SweepParam {
    Delta,
    Alpha,
    Gamma,
}

impl SweepParam {
    fn key(self) -> &'static str {
        match self {
            SweepParam::Delta => "delta",
            SweepParam::Alpha => "alpha",
            SweepParam::Gamma => "gamma",
        }
    }

    fn grid_key(self) -> String {
        format!("{}g", self.key())
    }
}

/// Re-solves the model once per grid point of a chosen parameter, matching
/// the reference's `mdepparam` sweep over delta, alpha, and gamma.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding `pardep.prm`. Must define a `<param>g` grid init
    /// string (e.g. `deltag = 5, 0.1, 0.9`) for each swept parameter.
    #[clap(short, long)]
    data_dir: Option<PathBuf>,
    /// Which parameter to sweep. Defaults to sweeping delta, alpha, and gamma in turn.
    #[clap(short, long)]
    param: Option<SweepParam>,
    /// Directory under which `<param>/<param>NN` setups are written.
    #[clap(short, long, default_value = ".")]
    out_dir: PathBuf,
    #[clap(short, long)]
    workers: Option<usize>,
}

fn run_sweep(
    param: SweepParam,
    parameter_file: &PathBuf,
    args: &Args,
    config: &Config,
    parts: [ObjectivePart; 4],
) -> anyhow::Result<()> {
    let map = attn_radius_solver::pmap::ParamMap::from_file(parameter_file)?;
    let grid_init = map.require_str(&param.grid_key())?;
    let pg = Grid::from_init_string(grid_init)?;

    for it in 0..pg.n() {
        let (mut model, mut solution) = checkpoint::fresh(parameter_file, parts)?;
        let value = pg.points()[it];
        match param {
            SweepParam::Delta => model.delta = value,
            SweepParam::Alpha => model.alpha = value,
            SweepParam::Gamma => model.gamma = value,
        }
        log::info!("solving model for {} = {} ({}/{})", param.key(), value, it + 1, pg.n());

        let start = Instant::now();
        coordinator::solve(&model, &mut solution, config)?;
        let dur = start.elapsed();
        log::info!("solver completed ({} iter, {:.3} sec)", solution.it, dur.as_secs_f64());

        let dir = args.out_dir.join(param.key()).join(format!("{}{:02}", param.key(), it));
        std::fs::create_dir_all(&dir).map_err(|source| CheckpointError::Io {
            path: dir.clone(),
            source,
        })?;
        model.save(dir.join("model"))?;
        model.save_fncs(dir.join("fncs"))?;
        solution.save_dir(&dir)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = Config::default();
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(w) = args.workers {
        config.workers = w;
    }

    let parameter_file = config.data_dir.join("pardep.prm");
    let parts = [
        ObjectivePart::Util,
        ObjectivePart::Cost,
        ObjectivePart::RadiusTransition,
        ObjectivePart::WealthTransition,
    ];

    let params = match args.param {
        Some(p) => vec![p],
        None => vec![SweepParam::Delta, SweepParam::Alpha, SweepParam::Gamma],
    };
    for param in params {
        run_sweep(param, &parameter_file, &args, &config, parts)?;
    }
    Ok(())
}
