//! Line-level tokenization of IPPcode source.
//!
//! Source is line-oriented: one instruction per line, `#` starts a
//! comment that runs to the end of the line, and tokens never contain
//! whitespace (string literals escape it as `\032`). That makes a
//! comment strip followed by a whitespace split a complete lexer.

/// Drop everything from the first `#` onward.
pub(crate) fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}

/// One non-blank source line: its 1-based number and its tokens.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub number: usize,
    pub tokens: Vec<&'a str>,
}

/// Split source into non-blank token lines, comments removed.
pub(crate) fn token_lines(source: &str) -> Vec<Line<'_>> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let tokens: Vec<&str> = strip_comment(raw).split_whitespace().collect();
            if tokens.is_empty() {
                None
            } else {
                Some(Line {
                    number: index + 1,
                    tokens,
                })
            }
        })
        .collect()
}
