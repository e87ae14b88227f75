//! Case-insensitive substring search with line numbers and highlighting.

use std::io;

use regex::{Captures, Regex, RegexBuilder};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::error::{LogError, LogResult};
use crate::types::{Highlight, SearchMatch};

/// A compiled search term.
///
/// The term is matched literally; regex metacharacters in it have no
/// special meaning.
#[derive(Debug, Clone)]
pub struct Matcher {
    re: Regex,
    highlight: Highlight,
}

impl Matcher {
    pub fn new(term: &str, highlight: Highlight) -> LogResult<Self> {
        if term.is_empty() {
            return Err(LogError::Validation("search term must not be empty".into()));
        }
        let re = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
            .map_err(|e| LogError::Validation(format!("unusable search term: {e}")))?;
        Ok(Self { re, highlight })
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.re.is_match(line)
    }

    /// Wrap every occurrence in the highlight markers, keeping its original casing.
    pub fn highlight(&self, line: &str) -> String {
        let Highlight { open, close } = &self.highlight;
        self.re
            .replace_all(line, |caps: &Captures<'_>| format!("{open}{}{close}", &caps[0]))
            .into_owned()
    }
}

/// Scan `reader` forward and collect up to `max_matches` matching lines.
///
/// Every line read counts towards the 1-based line number, matching or
/// not. Reading stops at the limit or at end of input.
pub async fn search_lines<R>(
    reader: &mut R,
    matcher: &Matcher,
    max_matches: usize,
) -> io::Result<Vec<SearchMatch>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut matches = Vec::new();
    if max_matches == 0 {
        return Ok(matches);
    }

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut line_number = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        line_number += 1;

        let raw = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw);
        if !matcher.is_match(&line) {
            continue;
        }

        matches.push(SearchMatch {
            line_number,
            highlighted: matcher.highlight(&line),
            content: line.into_owned(),
        });
        if matches.len() >= max_matches {
            break;
        }
    }

    Ok(matches)
}
