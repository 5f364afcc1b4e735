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

use serde::{Deserialize, Serialize};

/// One of the two shuttle terminals.
///
/// Result files written by older tooling name the terminals `CEI` and `T2`;
/// both spellings are accepted when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Terminal {
    #[serde(alias = "CEI", alias = "a")]
    A,
    #[serde(alias = "T2", alias = "b")]
    B,
}

impl Terminal {
    pub const ALL: [Terminal; 2] = [Terminal::A, Terminal::B];

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Terminal::A => Terminal::B,
            Terminal::B => Terminal::A,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Terminal::A => 0,
            Terminal::B => 1,
        }
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Terminal::A => "A",
            Terminal::B => "B",
        }
    }
}

impl std::fmt::Display for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTerminalError {
    name: String,
}

impl UnknownTerminalError {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for UnknownTerminalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown terminal '{}'", self.name)
    }
}

impl std::error::Error for UnknownTerminalError {}

impl std::str::FromStr for Terminal {
    type Err = UnknownTerminalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" | "CEI" => Ok(Terminal::A),
            "B" | "T2" => Ok(Terminal::B),
            _ => Err(UnknownTerminalError {
                name: s.to_string(),
            }),
        }
    }
}
