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

pub mod err;
pub mod expected;
pub mod extract;
pub mod records;
pub mod result;

use crate::payload::err::PayloadReadError;
use serde::de::DeserializeOwned;
use std::{fs, path::Path};

/// Parses a JSON document, or the first record of a JSON-lines file.
pub(crate) fn parse_document<T: DeserializeOwned>(text: &str) -> Result<T, PayloadReadError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(PayloadReadError::Empty);
    }
    match serde_json::from_str(text) {
        Ok(v) => Ok(v),
        Err(e) if e.is_syntax() => match text.lines().next() {
            Some(first) if first.len() < text.len() => Ok(serde_json::from_str(first)?),
            _ => Err(e.into()),
        },
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn read_document<T: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<T, PayloadReadError> {
    let text = fs::read_to_string(path)?;
    parse_document(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Doc {
        a: i64,
    }

    #[test]
    fn test_parse_plain_document() {
        let d: Doc = parse_document("  {\"a\": 1}\n").unwrap();
        assert_eq!(d, Doc { a: 1 });
    }

    #[test]
    fn test_parse_first_json_line() {
        let d: Doc = parse_document("{\"a\": 1}\n{\"a\": 2}\n").unwrap();
        assert_eq!(d, Doc { a: 1 });
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_document::<Doc>("   "),
            Err(PayloadReadError::Empty)
        ));
        assert!(matches!(
            parse_document::<Doc>("{\"b\": 1}"),
            Err(PayloadReadError::Json(_))
        ));
        assert!(matches!(
            parse_document::<Doc>("{\"a\": "),
            Err(PayloadReadError::Json(_))
        ));
    }
}
