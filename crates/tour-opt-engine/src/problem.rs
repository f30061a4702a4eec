// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::err::EngineError;
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};
use tour_opt_core::prelude::Cost;

/// Visit window of a node. Arriving before `earliest` means waiting;
/// arriving after `latest` is late and penalized, never rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub earliest: i64,
    pub latest: i64,
}

/// One visit location with its service duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub window: TimeWindow,
    pub service: i64,
}

/// An in-memory problem instance.
///
/// Text format: the node count `n`, then `n` whitespace-separated rows of
/// `x y earliest latest service`. Line remainders after `#` are comments.
/// Node indices are zero-based in memory and one-based at the file
/// boundary (tour files).
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    nodes: Vec<Node>,
}

impl Instance {
    #[inline]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Travel time between two nodes: Euclidean distance rounded to the
    /// nearest integer.
    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> Cost {
        let na = &self.nodes[a];
        let nb = &self.nodes[b];
        let dx = na.x - nb.x;
        let dy = na.y - nb.y;
        (dx * dx + dy * dy).sqrt().round() as Cost
    }

    pub fn read_from<R: BufRead>(r: R) -> Result<Self, EngineError> {
        let mut scanner = Scanner::new(r);
        let count = scanner.next_usize("node count")?;

        let mut nodes = Vec::with_capacity(count);
        for i in 0..count {
            let x = scanner.next_f64("x")?;
            let y = scanner.next_f64("y")?;
            let earliest = scanner.next_i64("earliest")?;
            let latest = scanner.next_i64("latest")?;
            let service = scanner.next_i64("service")?;
            if latest < earliest {
                return Err(EngineError::Problem(format!(
                    "node {}: window closes ({}) before it opens ({})",
                    i + 1,
                    latest,
                    earliest
                )));
            }
            nodes.push(Node {
                x,
                y,
                window: TimeWindow { earliest, latest },
                service,
            });
        }

        Ok(Self::new(nodes))
    }

    #[inline]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    #[inline]
    pub fn from_reader<R: Read>(r: R) -> Result<Self, EngineError> {
        Self::read_from(BufReader::new(r))
    }
}

/// Whitespace-token reader over a buffered source. Refills one line at a
/// time and drops `#` comments before tokenizing.
struct Scanner<R> {
    reader: R,
    line: String,
    pos: usize,
}

impl<R: BufRead> Scanner<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pos: 0,
        }
    }

    fn next_token(&mut self, what: &str) -> Result<&str, EngineError> {
        loop {
            let rest = &self.line[self.pos..];
            let trimmed = rest.trim_start();
            if !trimmed.is_empty() {
                self.pos = self.line.len() - trimmed.len();
                let end = trimmed
                    .find(char::is_whitespace)
                    .map(|off| self.pos + off)
                    .unwrap_or(self.line.len());
                let start = self.pos;
                self.pos = end;
                return Ok(&self.line[start..end]);
            }

            self.line.clear();
            self.pos = 0;
            let read = self.reader.read_line(&mut self.line)?;
            if read == 0 {
                return Err(EngineError::Problem(format!(
                    "unexpected end of input while reading {}",
                    what
                )));
            }
            if let Some(hash) = self.line.find('#') {
                self.line.truncate(hash);
            }
        }
    }

    fn next_i64(&mut self, what: &str) -> Result<i64, EngineError> {
        let token = self.next_token(what)?;
        token.parse::<i64>().map_err(|_| {
            EngineError::Problem(format!("expected integer for {}, got {:?}", what, token))
        })
    }

    fn next_f64(&mut self, what: &str) -> Result<f64, EngineError> {
        let token = self.next_token(what)?;
        token.parse::<f64>().map_err(|_| {
            EngineError::Problem(format!("expected number for {}, got {:?}", what, token))
        })
    }

    fn next_usize(&mut self, what: &str) -> Result<usize, EngineError> {
        let token = self.next_token(what)?;
        token.parse::<usize>().map_err(|_| {
            EngineError::Problem(format!("expected count for {}, got {:?}", what, token))
        })
    }
}
