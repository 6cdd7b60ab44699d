//! Line tokenizer for the interface header grammar.
//!
//! Every input line is trimmed and classified into exactly one [`TokenKind`].
//! Blank lines and `extern` linkage lines carry nothing and are dropped here;
//! block comments are tracked across lines so their inner lines are never
//! mistaken for declarations. Lines inside `__cplusplus` conditionals belong to
//! the fixed header preamble and outro and are dropped as well.

use regex::Regex;
use std::sync::LazyLock;

/// Section marker in the source header; never documentation.
pub const SECTION_MARKER: &str = "/* VARIANT TYPES */";

static RE_ENUM_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^typedef\s+enum\s*\{").unwrap());

static RE_STRUCT_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^typedef\s+struct\s*\{").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `#include`, `#ifndef`, `#pragma`, ...
    Preprocessor,
    /// First line of a comment fragment: a `//` line or a `/*` opener.
    CommentStart(String),
    /// Inner or closing line of a multi-line block comment.
    CommentLine(String),
    SectionMarker,
    EnumOpen,
    StructOpen,
    /// A line starting with `}`; holds the text after the brace.
    Close(String),
    /// A `typedef` line that does not open an enum or struct.
    Typedef(String),
    /// Anything else, typically an enum or struct member.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// 1-based source line.
    pub line: usize,
    pub kind: TokenKind,
}

pub struct Lexer<I> {
    lines: I,
    line_no: usize,
    in_block_comment: bool,
    /// Nesting depth of preprocessor conditionals opened by a `__cplusplus` test.
    cplusplus_depth: usize,
}

impl<I, S> Lexer<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    /// `first_line` is the 1-based number of the first line yielded by `lines`.
    pub fn new(lines: I, first_line: usize) -> Self {
        Lexer {
            lines,
            line_no: first_line.saturating_sub(1),
            in_block_comment: false,
            cplusplus_depth: 0,
        }
    }

    fn track_conditional(&mut self, directive: &str) {
        let keyword = directive
            .trim_start_matches('#')
            .trim_start()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .next()
            .unwrap_or("");
        if keyword.starts_with("if") {
            if self.cplusplus_depth > 0 {
                self.cplusplus_depth += 1;
            } else if directive.contains("__cplusplus") {
                self.cplusplus_depth = 1;
            }
        } else if keyword == "endif" && self.cplusplus_depth > 0 {
            self.cplusplus_depth -= 1;
        }
    }

    fn classify(&mut self, line: &str) -> Option<TokenKind> {
        if self.in_block_comment {
            if line.contains("*/") {
                self.in_block_comment = false;
            }
            return Some(TokenKind::CommentLine(line.to_string()));
        }

        if line.is_empty() || line.starts_with("extern") {
            return None;
        }
        if line.starts_with('#') {
            self.track_conditional(line);
            return Some(TokenKind::Preprocessor);
        }
        if self.cplusplus_depth > 0 {
            return None;
        }
        if line == SECTION_MARKER {
            return Some(TokenKind::SectionMarker);
        }
        if line.starts_with("//") {
            return Some(TokenKind::CommentStart(line.to_string()));
        }
        if let Some(rest) = line.strip_prefix("/*") {
            if !rest.contains("*/") {
                self.in_block_comment = true;
            }
            return Some(TokenKind::CommentStart(line.to_string()));
        }
        if RE_ENUM_OPEN.is_match(line) {
            return Some(TokenKind::EnumOpen);
        }
        if RE_STRUCT_OPEN.is_match(line) {
            return Some(TokenKind::StructOpen);
        }
        if let Some(rest) = line.strip_prefix('}') {
            return Some(TokenKind::Close(rest.trim().to_string()));
        }
        if line.starts_with("typedef ") {
            return Some(TokenKind::Typedef(line.to_string()));
        }
        Some(TokenKind::Text(line.to_string()))
    }
}

impl<I, S> Iterator for Lexer<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let raw = self.lines.next()?;
            self.line_no += 1;
            let line = raw.as_ref().trim();
            match self.classify(line) {
                Some(kind) => {
                    return Some(Token {
                        line: self.line_no,
                        kind,
                    })
                }
                None => log::trace!("line {}: skipped", self.line_no),
            }
        }
    }
}
