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

use std::num::ParseIntError;

#[derive(Debug)]
pub enum TourFileError {
    Io(std::io::Error),
    MissingHeader(&'static str),
    BadCostComment(String),
    BadNodeLine(String),
    MissingTourSection,
    MissingTerminator,
    ParseInt(ParseIntError),
}

impl std::fmt::Display for TourFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TourFileError::Io(err) => write!(f, "I/O error: {}", err),
            TourFileError::MissingHeader(name) => write!(f, "Missing header field: {}", name),
            TourFileError::BadCostComment(line) => {
                write!(f, "Malformed cost comment: {:?}", line)
            }
            TourFileError::BadNodeLine(line) => write!(f, "Malformed tour node line: {:?}", line),
            TourFileError::MissingTourSection => write!(f, "Missing TOUR_SECTION"),
            TourFileError::MissingTerminator => write!(f, "Tour section not terminated by -1"),
            TourFileError::ParseInt(err) => write!(f, "Integer parse error: {}", err),
        }
    }
}

impl std::error::Error for TourFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TourFileError::Io(err) => Some(err),
            TourFileError::ParseInt(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TourFileError {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        TourFileError::Io(err)
    }
}

impl From<ParseIntError> for TourFileError {
    #[inline]
    fn from(err: ParseIntError) -> Self {
        TourFileError::ParseInt(err)
    }
}

#[derive(Debug)]
pub enum ParamsError {
    Io(std::io::Error),
    MalformedLine(String),
    BadValue { key: String, value: String },
}

impl std::fmt::Display for ParamsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamsError::Io(err) => write!(f, "I/O error: {}", err),
            ParamsError::MalformedLine(line) => {
                write!(f, "Malformed parameter line: {:?}", line)
            }
            ParamsError::BadValue { key, value } => {
                write!(f, "Bad value {:?} for parameter {}", value, key)
            }
        }
    }
}

impl std::error::Error for ParamsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParamsError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ParamsError {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        ParamsError::Io(err)
    }
}
