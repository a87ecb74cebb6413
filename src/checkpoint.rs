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

//! Checkpoint directory discovery and the `resume`/`fresh` solve entry points.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::{CheckpointError, SolveError};
use crate::model::Model;
use crate::pmap::ParamMap;
use crate::solution::Solution;
use crate::specs::ObjectivePart;

/// Scans `<tmp>/save/` for entries named `itNNNNN` and returns the
/// lexicographically greatest one, matching the reference's directory scan
/// (zero-padded iteration counts sort correctly as strings).
pub fn find_last_saved(config: &Config) -> Result<PathBuf, CheckpointError> {
    let save_dir = config.tmp_dir.join("save");
    let entries = std::fs::read_dir(&save_dir).map_err(|source| CheckpointError::Io {
        path: save_dir.clone(),
        source,
    })?;

    let mut last: Option<String> = None;
    for entry in entries {
        let entry = entry.map_err(|source| CheckpointError::Io {
            path: save_dir.clone(),
            source,
        })?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("it") && last.as_deref().map_or(true, |l| name.as_ref() > l) {
            last = Some(name.into_owned());
        }
    }

    last.map(|name| save_dir.join(name))
        .ok_or_else(|| CheckpointError::NotFound(save_dir))
}

/// Loads a fresh model/solution pair from a parameter file, ready for a
/// first solve (`solution.it == 0`).
pub fn fresh(parameter_path: impl AsRef<std::path::Path>, parts: [ObjectivePart; 4]) -> Result<(Model, Solution), SolveError> {
    let map = ParamMap::from_file(parameter_path)?;
    let model = Model::from_pmap(&map, parts)?;
    let solution = Solution::from_pmap(&map)?;
    Ok((model, solution))
}

/// Loads the most recent checkpoint under `config.tmp_dir/save/`, or a
/// caller-supplied directory, recovering a `Model`/`Solution` pair ready to
/// continue the fixed-point loop where it left off.
pub fn load_checkpoint(dir: &std::path::Path, parts: [ObjectivePart; 4]) -> Result<(Model, Solution), SolveError> {
    let model = Model::load(dir.join("model"), parts)?;
    let solution = Solution::load_dir(dir)?;
    Ok((model, solution))
}

/// Convenience: find and load the most recent checkpoint under `config`.
pub fn resume_latest(config: &Config, parts: [ObjectivePart; 4]) -> Result<(Model, Solution), SolveError> {
    let dir = find_last_saved(config)?;
    load_checkpoint(&dir, parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> [ObjectivePart; 4] {
        [
            ObjectivePart::Util,
            ObjectivePart::Cost,
            ObjectivePart::RadiusTransition,
            ObjectivePart::WealthTransition,
        ]
    }

    #[test]
    fn finds_lexicographically_greatest_iteration_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let save_dir = tmp.path().join("save");
        std::fs::create_dir_all(save_dir.join("it00010")).unwrap();
        std::fs::create_dir_all(save_dir.join("it00002")).unwrap();
        std::fs::create_dir_all(save_dir.join("it00100")).unwrap();

        let config = Config {
            data_dir: tmp.path().to_path_buf(),
            tmp_dir: tmp.path().to_path_buf(),
            save_cycle: 100,
            log_cycle: 20,
            workers: 0,
        };
        let found = find_last_saved(&config).unwrap();
        assert_eq!(found.file_name().unwrap(), "it00100");
    }

    #[test]
    fn missing_save_dir_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: tmp.path().to_path_buf(),
            tmp_dir: tmp.path().to_path_buf(),
            save_cycle: 100,
            log_cycle: 20,
            workers: 0,
        };
        assert!(find_last_saved(&config).is_err());
    }

    #[test]
    fn round_trips_checkpoint_written_by_coordinator_format() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("ck");
        let model = Model {
            alpha: 0.1,
            beta: 0.9,
            delta: 0.2,
            gamma: 0.3,
            r_coef: 1.02,
            util_part: ObjectivePart::Util,
            cost_part: ObjectivePart::Cost,
            radt_part: ObjectivePart::RadiusTransition,
            wltt_part: ObjectivePart::WealthTransition,
        };
        let mut map = ParamMap::new();
        map.add_int("maxit", 50);
        map.add_double("tol", 1e-6);
        map.add_double("qadp", 0.1);
        map.add_double("sadp", 0.1);
        map.add("xg", "5, 0, 10");
        map.add("rg", "5, 0, 1");
        map.add("qg", "4, 0, 2");
        map.add("sg", "4, 0, 2");
        let solution = Solution::from_pmap(&map).unwrap();

        std::fs::create_dir_all(&dir).unwrap();
        model.save(dir.join("model")).unwrap();
        solution.save_dir(&dir).unwrap();

        let (loaded_model, loaded_solution) = load_checkpoint(&dir, parts()).unwrap();
        assert_eq!(loaded_model, model);
        assert_eq!(loaded_solution.it, solution.it);
    }
}
