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

use tour_opt_core::prelude::NodeId;
use tour_opt_model::prelude::ParamsError;

/// Failures reported by an engine session.
///
/// The orchestrator classifies these by the call site, not by the variant:
/// a failure during `Init` is fatal for the run, while the same variant
/// from a per-trial call only skips that trial.
#[derive(Debug)]
pub enum EngineError {
    Io(std::io::Error),
    Parameters(String),
    Problem(String),
    NotAllocated,
    EmptyInstance,
    NoCandidates { node: NodeId },
    NoTour,
    SearchFailed(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Io(err) => write!(f, "I/O error: {}", err),
            EngineError::Parameters(msg) => write!(f, "Parameter loading failed: {}", msg),
            EngineError::Problem(msg) => write!(f, "Problem loading failed: {}", msg),
            EngineError::NotAllocated => {
                write!(f, "Engine structures have not been allocated")
            }
            EngineError::EmptyInstance => write!(f, "Instance has no nodes"),
            EngineError::NoCandidates { node } => {
                write!(f, "Node {} has no candidates", node)
            }
            EngineError::NoTour => write!(f, "No tour is available"),
            EngineError::SearchFailed(msg) => write!(f, "Local search failed: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EngineError {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err)
    }
}

impl From<ParamsError> for EngineError {
    #[inline]
    fn from(err: ParamsError) -> Self {
        EngineError::Parameters(err.to_string())
    }
}
