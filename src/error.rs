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

/// Failures while reading or interpreting a parameter file / grid init string.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read parameter file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing required parameter key '{0}'")]
    MissingKey(String),
    #[error("parameter '{key}' has invalid value '{value}'")]
    InvalidValue { key: String, value: String },
    #[error("malformed grid init string '{0}'")]
    MalformedGrid(String),
}

/// Failures while saving, loading, or scanning checkpoint directories.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("checkpoint file {path:?} is truncated or malformed")]
    Corrupt { path: PathBuf },
    #[error("no checkpoint found under {0:?}")]
    NotFound(PathBuf),
}

/// Top-level error produced by a solve, resume, or sweep run.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error("failed to spawn worker thread: {0}")]
    ThreadSpawn(std::io::Error),
}
