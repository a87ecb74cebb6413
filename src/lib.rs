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

//! Parallel fixed-point solver for a wealth/attention-radius dynamic
//! program: value iteration over a bilinearly-interpolated wealth x
//! radius grid, with pluggable objective functions and adaptive control
//! grids, checkpointed to a custom binary format.

pub mod checkpoint;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod grid;
pub mod interp;
pub mod model;
pub mod partition;
pub mod pmap;
pub mod solution;
pub mod specs;
pub mod worker;

pub use config::Config;
pub use error::{CheckpointError, ConfigError, SolveError};
pub use model::Model;
pub use solution::Solution;
