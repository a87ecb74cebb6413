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

use std::path::PathBuf;

/// Tunables that do not belong in a model parameter file: checkpoint
/// locations, periodic cadences, and the worker count.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub tmp_dir: PathBuf,
    /// Iterations between checkpoints (reference default: 100).
    pub save_cycle: u64,
    /// Iterations between progress log lines (reference default: 20).
    pub log_cycle: u64,
    /// Number of additional worker threads; the driver itself always
    /// participates as one more worker.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: std::env::var_os("ATTN_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            tmp_dir: std::env::var_os("ATTN_TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            save_cycle: 100,
            log_cycle: 20,
            workers: num_cpus::get().saturating_sub(1),
        }
    }
}
