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

//! Model scalars and the four pluggable objective-function parts.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{CheckpointError, ConfigError};
use crate::pmap::ParamMap;
use crate::specs::ObjectivePart;

/// Economic model parameters plus the four function-part bindings. The
/// convention for (de)serializing model parameters is lexicographic field
/// order, with the function bindings always last.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Model {
    pub alpha: f64,
    pub beta: f64,
    pub delta: f64,
    pub gamma: f64,
    /// Named `r_coef` rather than `R` to avoid colliding with the state
    /// variable `r` (attention radius) used throughout the solver.
    pub r_coef: f64,
    pub util_part: ObjectivePart,
    pub cost_part: ObjectivePart,
    pub radt_part: ObjectivePart,
    pub wltt_part: ObjectivePart,
}

impl Model {
    /// Parses alpha/beta/delta/gamma/R from the map. All five are optional
    /// (a key absent from the parameter file leaves the corresponding field
    /// at zero, matching the reference's `ifvar` macro, which simply never
    /// executes the assignment); if R < -1 it is replaced by `1/beta`.
    /// Function parts are bound positionally from the caller-supplied array
    /// in order (util, cost, radt, wltt), matching the reference's
    /// `set_model_callbacks`.
    pub fn from_pmap(map: &ParamMap, parts: [ObjectivePart; 4]) -> Result<Model, ConfigError> {
        let alpha = map.get_f64("alpha").unwrap_or(0.0);
        let beta = map.get_f64("beta").unwrap_or(0.0);
        let delta = map.get_f64("delta").unwrap_or(0.0);
        let gamma = map.get_f64("gamma").unwrap_or(0.0);
        let mut r_coef = map.get_f64("R").unwrap_or(0.0);
        if r_coef < -1.0 {
            r_coef = 1.0 / beta;
        }
        Ok(Model {
            alpha,
            beta,
            delta,
            gamma,
            r_coef,
            util_part: parts[0],
            cost_part: parts[1],
            radt_part: parts[2],
            wltt_part: parts[3],
        })
    }

    pub fn to_pmap(&self) -> ParamMap {
        let mut map = ParamMap::new();
        map.add_double("alpha", self.alpha);
        map.add_double("beta", self.beta);
        map.add_double("delta", self.delta);
        map.add_double("gamma", self.gamma);
        map.add_double("R", self.r_coef);
        map
    }

    /// Raw ordered dump: alpha, beta, delta, gamma, R, five consecutive f64s.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CheckpointError> {
        let path = path.as_ref();
        let mut f = File::create(path).map_err(|source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        for v in [self.alpha, self.beta, self.delta, self.gamma, self.r_coef] {
            f.write_all(&v.to_ne_bytes())
                .map_err(|source| CheckpointError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>, parts: [ObjectivePart; 4]) -> Result<Model, CheckpointError> {
        let path = path.as_ref();
        let mut f = File::open(path).map_err(|source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut vals = [0f64; 5];
        let mut buf = [0u8; 8];
        for v in vals.iter_mut() {
            f.read_exact(&mut buf).map_err(|source| CheckpointError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            *v = f64::from_ne_bytes(buf);
        }
        Ok(Model {
            alpha: vals[0],
            beta: vals[1],
            delta: vals[2],
            gamma: vals[3],
            r_coef: vals[4],
            util_part: parts[0],
            cost_part: parts[1],
            radt_part: parts[2],
            wltt_part: parts[3],
        })
    }

    /// Writes the `fncs` text file: the four part labels, human-readable
    /// only — callables are re-bound positionally by the caller on load.
    pub fn save_fncs(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let mut map = ParamMap::new();
        map.add("util", self.util_part.label());
        map.add("cost", self.cost_part.label());
        map.add("radt", self.radt_part.label());
        map.add("wltt", self.wltt_part.label());
        map.save(path)
    }
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
    fn negative_r_is_replaced_by_inverse_beta() {
        let mut map = ParamMap::new();
        map.add_double("alpha", 0.1);
        map.add_double("beta", 0.9);
        map.add_double("delta", 0.2);
        map.add_double("gamma", 0.3);
        map.add_double("R", -5.0);
        let m = Model::from_pmap(&map, parts()).unwrap();
        assert!((m.r_coef - 1.0 / 0.9).abs() < 1e-12);
    }

    #[test]
    fn save_load_round_trip() {
        let m = Model {
            alpha: 0.1,
            beta: 0.9,
            delta: 0.2,
            gamma: 0.3,
            r_coef: 1.05,
            util_part: ObjectivePart::Util,
            cost_part: ObjectivePart::Cost,
            radt_part: ObjectivePart::RadiusTransition,
            wltt_part: ObjectivePart::WealthTransition,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model");
        m.save(&path).unwrap();
        let loaded = Model::load(&path, parts()).unwrap();
        assert_eq!(loaded, m);
    }
}
