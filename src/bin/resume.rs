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

//! Resumes a fixed-point solve from the most recent checkpoint, or from an
//! explicitly named checkpoint directory.

use std::path::PathBuf;

use attn_radius_solver::checkpoint;
use attn_radius_solver::coordinator;
use attn_radius_solver::specs::ObjectivePart;
use attn_radius_solver::Config;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Checkpoint directory to resume from. If omitted, the latest under
    /// `<tmp_dir>/save/` is used.
    #[clap(short, long)]
    checkpoint: Option<PathBuf>,
    /// Number of additional worker threads. The driver itself always counts as one more.
    #[clap(short, long)]
    workers: Option<usize>,
    /// Directory holding checkpoints; defaults to the platform temp dir.
    #[clap(short, long)]
    tmp_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = Config::default();
    if let Some(w) = args.workers {
        config.workers = w;
    }
    if let Some(dir) = args.tmp_dir {
        config.tmp_dir = dir;
    }

    let parts = [
        ObjectivePart::Util,
        ObjectivePart::Cost,
        ObjectivePart::RadiusTransition,
        ObjectivePart::WealthTransition,
    ];
    let (model, mut solution) = match args.checkpoint {
        Some(dir) => checkpoint::load_checkpoint(&dir, parts)?,
        None => checkpoint::resume_latest(&config, parts)?,
    };

    log::info!("resuming from iteration {}", solution.it);
    coordinator::solve(&model, &mut solution, &config)?;

    let msol_dir = config.tmp_dir.join("msol");
    coordinator::save_final(&msol_dir, &model, &solution)?;
    log::info!("saved final solution to {:?}", msol_dir);

    println!("iterations: {}", solution.it);
    println!("final accuracy: {:e}", solution.acc);
    println!("converged: {}", solution.converged());
    Ok(())
}
