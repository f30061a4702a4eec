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

use crate::err::TourFileError;
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};
use tour_opt_core::prelude::{Cost, NodeId};

/// A persisted tour: the visiting order of a closed cycle, with its cost.
///
/// The node sequence includes the closing sentinel (the first node repeated
/// at the end), so `DIMENSION` in the text record is `nodes.len() - 1`.
/// Writing and re-reading a record must round-trip exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourRecord {
    pub name: String,
    pub cost: Cost,
    pub nodes: Vec<NodeId>,
}

impl TourRecord {
    #[inline]
    pub fn new(name: impl Into<String>, cost: Cost, nodes: Vec<NodeId>) -> Self {
        Self {
            name: name.into(),
            cost,
            nodes,
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), TourFileError> {
        writeln!(w, "NAME : {}", self.name)?;
        writeln!(w, "COMMENT : Cost = {}", self.cost)?;
        writeln!(w, "DIMENSION : {}", self.dimension())?;
        writeln!(w, "TOUR_SECTION")?;
        for node in &self.nodes {
            writeln!(w, "{}", node)?;
        }
        writeln!(w, "-1")?;
        writeln!(w, "EOF")?;
        Ok(())
    }

    #[inline]
    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<(), TourFileError> {
        let file = File::create(path)?;
        let mut bw = BufWriter::new(file);
        self.write_to(&mut bw)?;
        bw.flush()?;
        Ok(())
    }

    pub fn read_from<R: BufRead>(r: R) -> Result<Self, TourFileError> {
        let mut name: Option<String> = None;
        let mut cost: Option<Cost> = None;
        let mut nodes: Vec<NodeId> = Vec::new();
        let mut in_tour_section = false;
        let mut terminated = false;

        for line in r.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if !in_tour_section {
                if let Some(rest) = line.strip_prefix("NAME") {
                    name = Some(strip_field(rest).to_string());
                } else if let Some(rest) = line.strip_prefix("COMMENT") {
                    let comment = strip_field(rest);
                    let value = comment
                        .strip_prefix("Cost =")
                        .ok_or_else(|| TourFileError::BadCostComment(line.to_string()))?;
                    cost = Some(value.trim().parse::<Cost>()?);
                } else if line.starts_with("DIMENSION") {
                    // Redundant with the sequence length; validated below.
                } else if line == "TOUR_SECTION" {
                    in_tour_section = true;
                }
                continue;
            }

            if line == "-1" {
                terminated = true;
                continue;
            }
            if line == "EOF" {
                break;
            }
            if terminated {
                return Err(TourFileError::BadNodeLine(line.to_string()));
            }
            let id = line
                .parse::<u32>()
                .map_err(|_| TourFileError::BadNodeLine(line.to_string()))?;
            nodes.push(NodeId::new(id));
        }

        if !in_tour_section {
            return Err(TourFileError::MissingTourSection);
        }
        if !terminated {
            return Err(TourFileError::MissingTerminator);
        }

        Ok(Self {
            name: name.ok_or(TourFileError::MissingHeader("NAME"))?,
            cost: cost.ok_or(TourFileError::MissingHeader("COMMENT"))?,
            nodes,
        })
    }

    #[inline]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TourFileError> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    #[inline]
    pub fn from_reader<R: Read>(r: R) -> Result<Self, TourFileError> {
        Self::read_from(BufReader::new(r))
    }
}

/// Drops the `" : "` separator after a header keyword, tolerating missing
/// whitespace around the colon.
#[inline]
fn strip_field(rest: &str) -> &str {
    rest.trim_start().trim_start_matches(':').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TourRecord {
        let nodes = [1u32, 3, 2, 5, 4, 1]
            .iter()
            .map(|&n| NodeId::new(n))
            .collect();
        TourRecord::new("Best tour found", 1234, nodes)
    }

    #[test]
    fn test_write_produces_exact_format() {
        let mut buf = Vec::new();
        sample().write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "NAME : Best tour found\n\
             COMMENT : Cost = 1234\n\
             DIMENSION : 5\n\
             TOUR_SECTION\n\
             1\n3\n2\n5\n4\n1\n\
             -1\n\
             EOF\n"
        );
    }

    #[test]
    fn test_round_trip_is_bit_exact() {
        let record = sample();

        let mut first = Vec::new();
        record.write_to(&mut first).unwrap();

        let reread = TourRecord::from_reader(first.as_slice()).unwrap();
        assert_eq!(reread, record);

        let mut second = Vec::new();
        reread.write_to(&mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_read_tolerates_surrounding_whitespace() {
        let text = "  NAME : t\n COMMENT : Cost = -5\nDIMENSION : 2\nTOUR_SECTION\n 1 \n2\n1\n-1\nEOF\n";
        let record = TourRecord::from_reader(text.as_bytes()).unwrap();
        assert_eq!(record.name, "t");
        assert_eq!(record.cost, -5);
        assert_eq!(
            record.nodes,
            vec![NodeId::new(1), NodeId::new(2), NodeId::new(1)]
        );
        assert_eq!(record.dimension(), 2);
    }

    #[test]
    fn test_missing_tour_section_is_an_error() {
        let text = "NAME : t\nCOMMENT : Cost = 1\nEOF\n";
        match TourRecord::from_reader(text.as_bytes()) {
            Err(TourFileError::MissingTourSection) => {}
            other => panic!("expected MissingTourSection, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_terminator_is_an_error() {
        let text = "NAME : t\nCOMMENT : Cost = 1\nTOUR_SECTION\n1\n2\n1\nEOF\n";
        match TourRecord::from_reader(text.as_bytes()) {
            Err(TourFileError::MissingTerminator) => {}
            other => panic!("expected MissingTerminator, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_node_line_is_an_error() {
        let text = "NAME : t\nCOMMENT : Cost = 1\nTOUR_SECTION\none\n-1\nEOF\n";
        match TourRecord::from_reader(text.as_bytes()) {
            Err(TourFileError::BadNodeLine(line)) => assert_eq!(line, "one"),
            other => panic!("expected BadNodeLine, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_cost_comment_is_an_error() {
        let text = "NAME : t\nCOMMENT : something else\nTOUR_SECTION\n1\n-1\nEOF\n";
        assert!(matches!(
            TourRecord::from_reader(text.as_bytes()),
            Err(TourFileError::BadCostComment(_))
        ));
    }
}
