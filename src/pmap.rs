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

//! Ordered `key = value` text parameter maps.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// An ordered list of `(key, value)` string pairs, preserving insertion
/// order and looked up by linear scan, mirroring the reference's flat
/// key/value array.
#[derive(Debug, Clone, Default)]
pub struct ParamMap {
    entries: Vec<(String, String)>,
}

impl ParamMap {
    pub fn new() -> ParamMap {
        ParamMap { entries: Vec::new() }
    }

    /// Parses `key = value` lines. The key is trimmed on both sides; the
    /// value is everything after the first `=`, trimmed of the trailing
    /// newline only. Lines with no `=` are skipped.
    pub fn from_file(path: impl AsRef<Path>) -> Result<ParamMap, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(ParamMap::from_str(&text))
    }

    pub fn from_str(text: &str) -> ParamMap {
        let mut map = ParamMap::new();
        for line in text.lines() {
            if let Some(eq) = line.find('=') {
                let key = line[..eq].trim().to_string();
                let value = line[eq + 1..].trim_end_matches(['\r', '\n']).to_string();
                if !key.is_empty() {
                    map.entries.push((key, value));
                }
            }
        }
        map
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn add_int(&mut self, key: impl Into<String>, value: i64) {
        self.add(key, value.to_string());
    }

    pub fn add_double(&mut self, key: impl Into<String>, value: f64) {
        self.add(key, value.to_string());
    }

    pub fn find(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.find(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.find(key).and_then(|v| v.parse().ok())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.find(key).and_then(|v| v.parse().ok())
    }

    pub fn require_f64(&self, key: &str) -> Result<f64, ConfigError> {
        self.get_f64(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ConfigError> {
        self.get_str(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Writes `key = value` lines in insertion order.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let mut out = String::new();
        for (k, v) in &self.entries {
            out.push_str(k);
            out.push_str(" = ");
            out.push_str(v);
            out.push('\n');
        }
        fs::write(path, out).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_keys_and_verbatim_values() {
        let map = ParamMap::from_str("alpha = 0.5\n  beta  =  1.25  \nnot a kv line\ngamma=2\n");
        assert_eq!(map.get_f64("alpha"), Some(0.5));
        assert_eq!(map.get_str("beta"), Some("1.25"));
        assert_eq!(map.get_f64("gamma"), Some(2.0));
        assert_eq!(map.entries.len(), 3);
    }

    #[test]
    fn round_trips_through_save() {
        let mut map = ParamMap::new();
        map.add_double("alpha", 0.5);
        map.add_int("n", 7);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.prm");
        map.save(&path).unwrap();
        let loaded = ParamMap::from_file(&path).unwrap();
        assert_eq!(loaded.get_f64("alpha"), Some(0.5));
        assert_eq!(loaded.get_i64("n"), Some(7));
    }
}
