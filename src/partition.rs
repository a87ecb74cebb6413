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

//! Splitting the logical state-index range `[0, Nx*Nr)` across `W+1`
//! workers (`W` threads plus the driver).

/// One worker's share of the state space. `logical_offset`/`logical_size`
/// index into the flattened `(xi, ri)` space in row-major order; the axis
/// ranges are derived for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub logical_offset: usize,
    pub logical_size: usize,
    pub x_offset: usize,
    pub x_end: usize,
    pub r_offset: usize,
    pub r_end: usize,
}

/// Splits `nx * nr` logical indices across `workers` partitions. The first
/// `(nx*nr) mod workers` partitions get one extra index.
pub fn partition(nx: usize, nr: usize, workers: usize) -> Vec<Partition> {
    assert!(workers > 0);
    let total = nx * nr;
    let base = total / workers;
    let rem = total % workers;

    let mut parts = Vec::with_capacity(workers);
    let mut offset = 0usize;
    for i in 0..workers {
        let size = if i < rem { base + 1 } else { base };
        let (x_offset, r_offset) = if nr > 0 {
            (offset / nr, offset % nr)
        } else {
            (0, 0)
        };
        let end = offset + size;
        let (x_end, r_end) = if nr > 0 {
            (end / nr, end % nr)
        } else {
            (0, 0)
        };
        parts.push(Partition {
            logical_offset: offset,
            logical_size: size,
            x_offset,
            x_end,
            r_offset,
            r_end,
        });
        offset = end;
    }
    parts
}

/// Decodes a logical index back into `(xi, ri)` coordinates given the
/// radius-axis extent.
#[inline]
pub fn decode(logical_index: usize, nr: usize) -> (usize, usize) {
    (logical_index / nr, logical_index % nr)
}
