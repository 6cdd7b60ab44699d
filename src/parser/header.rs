//! Interface header decoder.
//!
//! Recursive descent over the [`Lexer`] token stream. The top level accepts
//! comments, simple and function pointer typedefs, and enum/struct openers;
//! an opener hands the stream to [`HeaderParser::parse_block`], which reads
//! members until the closing brace. Pending comment fragments are attached to
//! whatever declaration or member consumes them next.

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::model::*;
use crate::parser::clean::{clean_description, clean_line};
use crate::parser::directive::{self, Signature};
use crate::parser::lexer::{Lexer, Token, TokenKind};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

/// `/*****...*/` box rule that opens the copyright banner.
static RE_BANNER_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/\*{3,}/$").unwrap());

/// `typedef RET (*NAME)(ARGS);` with an optional trailing comment.
static RE_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^typedef\s+(.+?)\s*\(\s*\*\s*([A-Za-z_]\w*)\s*\)\s*\((.*)\)\s*;\s*(/[/*].*)?$")
        .unwrap()
});

/// `typedef TYPE NAME;` with an optional trailing comment.
static RE_SIMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^typedef\s+(.+?)\s*;\s*(/[/*].*)?$").unwrap());

/// `NAME( = VALUE)?,?` with an optional trailing comment.
static RE_ENUM_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_]\w*)(?:\s*=\s*([^,/]+?))?\s*,?\s*(/[/*].*)?$").unwrap()
});

/// `TYPE NAME;` with an optional trailing comment.
static RE_STRUCT_MEMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*;\s*(/[/*].*)?$").unwrap());

/// Text after the closing brace: `NAME;` with an optional trailing comment.
static RE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_]\w*)\s*;\s*(/[/*].*)?$").unwrap());

static RE_DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

// -- Public API ---------------------------------------------------------------

/// Decode header text into a [`Document`], reporting non-fatal problems to `sink`.
pub fn decode(text: &str, sink: &mut dyn DiagnosticSink) -> Document {
    decode_lines(text.lines(), sink)
}

/// Decode a sequence of header lines into a [`Document`].
pub fn decode_lines<I, S>(lines: I, sink: &mut dyn DiagnosticSink) -> Document
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lines: Vec<S> = lines.into_iter().collect();
    let (copyright, banner_len) = split_banner(&lines);

    let mut parser = HeaderParser::new(sink);
    let mut tokens = Lexer::new(lines[banner_len..].iter(), banner_len + 1);
    parser.parse_document(&mut tokens);

    Document {
        copyright,
        format_version: FORMAT_VERSION,
        types: parser.types,
        interface: parser.interface,
    }
}

/// Split off the copyright banner: the run of box-comment lines at the very
/// top of the file. The first two banner lines are the generated-file header
/// (rule and file name) and are not part of the copyright.
fn split_banner<S: AsRef<str>>(lines: &[S]) -> (Vec<String>, usize) {
    let starts_with_rule = lines
        .first()
        .is_some_and(|l| RE_BANNER_RULE.is_match(l.as_ref().trim()));
    if !starts_with_rule {
        return (Vec::new(), 0);
    }
    let len = lines
        .iter()
        .take_while(|l| {
            let t = l.as_ref().trim();
            t.starts_with("/*") && t.ends_with("*/")
        })
        .count();
    let copyright = lines[..len]
        .iter()
        .skip(2)
        .map(|l| l.as_ref().trim_end().to_string())
        .collect();
    (copyright, len)
}

// -- Parser -------------------------------------------------------------------

/// Members collected inside an open `typedef enum {` / `typedef struct {`.
enum Members {
    Enum(Vec<EnumMember>),
    Struct(Vec<StructMember>),
}

impl Members {
    fn kind(&self) -> &'static str {
        match self {
            Members::Enum(_) => "enum",
            Members::Struct(_) => "struct",
        }
    }
}

struct Block {
    /// Parent doc lines, raw (uncleaned).
    doc: Vec<String>,
    members: Members,
}

struct HeaderParser<'s> {
    sink: &'s mut dyn DiagnosticSink,
    /// Comment fragments waiting for a declaration, one per `//` line or block.
    pending: Vec<Vec<String>>,
    types: Vec<TypeDeclaration>,
    interface: Vec<InterfaceFunction>,
    names: HashSet<String>,
}

impl<'s> HeaderParser<'s> {
    fn new(sink: &'s mut dyn DiagnosticSink) -> Self {
        HeaderParser {
            sink,
            pending: Vec::new(),
            types: Vec::new(),
            interface: Vec::new(),
            names: HashSet::new(),
        }
    }

    fn report(&mut self, line: usize, kind: DiagnosticKind) {
        self.sink.report(Diagnostic::new(line, kind));
    }

    fn parse_document<I: Iterator<Item = Token>>(&mut self, tokens: &mut I) {
        while let Some(token) = tokens.next() {
            match token.kind {
                TokenKind::CommentStart(text) => self.pending.push(vec![text]),
                TokenKind::CommentLine(text) => self.continue_comment(text),
                TokenKind::SectionMarker | TokenKind::Preprocessor => self.pending.clear(),
                TokenKind::EnumOpen => {
                    self.parse_block(Members::Enum(Vec::new()), token.line, tokens)
                }
                TokenKind::StructOpen => {
                    self.parse_block(Members::Struct(Vec::new()), token.line, tokens)
                }
                TokenKind::Close(_) => {
                    self.report(token.line, DiagnosticKind::UnmatchedClose);
                    self.pending.clear();
                }
                TokenKind::Typedef(text) => self.parse_typedef(token.line, &text),
                TokenKind::Text(text) => {
                    log::trace!("line {}: ignored top-level text: {}", token.line, text)
                }
            }
        }
    }

    /// Read enum or struct members up to the closing brace.
    fn parse_block<I: Iterator<Item = Token>>(
        &mut self,
        members: Members,
        open_line: usize,
        tokens: &mut I,
    ) {
        let mut block = Block {
            doc: self.take_pending(),
            members,
        };

        while let Some(token) = tokens.next() {
            match token.kind {
                TokenKind::CommentStart(text) => self.pending.push(vec![text]),
                TokenKind::CommentLine(text) => self.continue_comment(text),
                TokenKind::SectionMarker | TokenKind::Preprocessor => self.pending.clear(),
                TokenKind::EnumOpen | TokenKind::StructOpen => {
                    self.report(token.line, DiagnosticKind::NestedBlock)
                }
                TokenKind::Close(rest) => {
                    self.close_block(block, token.line, &rest);
                    return;
                }
                TokenKind::Typedef(text) | TokenKind::Text(text) => match block.members {
                    Members::Enum(ref mut members) => {
                        self.parse_enum_member(members, token.line, &text)
                    }
                    Members::Struct(ref mut members) => {
                        self.parse_struct_member(members, token.line, &text)
                    }
                },
            }
        }

        let kind = block.members.kind();
        self.report(open_line, DiagnosticKind::UnterminatedBlock { kind });
        self.pending.clear();
    }

    fn parse_enum_member(&mut self, members: &mut Vec<EnumMember>, line: usize, text: &str) {
        let Some(caps) = RE_ENUM_MEMBER.captures(text) else {
            self.unrecognized_member("enum", line, text);
            return;
        };
        let mut doc_lines = self.take_pending();
        if let Some(comment) = caps.get(3) {
            doc_lines.push(comment.as_str().to_string());
        }

        let name = caps[1].to_string();
        let value = match caps.get(2).map(|m| m.as_str().trim()) {
            Some(raw) if RE_DECIMAL.is_match(raw) => match raw.parse::<i64>() {
                Ok(v) => v,
                Err(_) => {
                    self.unsupported_enum_value(line, name, raw);
                    return;
                }
            },
            Some(raw) => {
                self.unsupported_enum_value(line, name, raw);
                return;
            }
            None => members.len() as i64,
        };

        members.push(EnumMember {
            name,
            value,
            doc: non_empty(clean_description(&doc_lines)),
        });
    }

    fn parse_struct_member(&mut self, members: &mut Vec<StructMember>, line: usize, text: &str) {
        let parsed = RE_STRUCT_MEMBER
            .captures(text)
            .and_then(|caps| split_type_name(&caps[1]).map(|tn| (tn, caps.get(2))));
        let Some(((ty, name), comment)) = parsed else {
            self.unrecognized_member("struct", line, text);
            return;
        };
        let mut doc_lines = self.take_pending();
        if let Some(comment) = comment {
            doc_lines.push(comment.as_str().to_string());
        }
        members.push(StructMember {
            name,
            ty,
            doc: non_empty(clean_description(&doc_lines)),
        });
    }

    fn close_block(&mut self, block: Block, line: usize, rest: &str) {
        let Some(caps) = RE_CLOSE.captures(rest) else {
            self.report(
                line,
                DiagnosticKind::MissingParentName {
                    text: format!("}} {}", rest).trim_end().to_string(),
                },
            );
            self.pending.clear();
            return;
        };

        let name = caps[1].to_string();
        let mut doc_lines = block.doc;
        let deprecated = trailing_comment(caps.get(2).map(|m| m.as_str()), &mut doc_lines);
        let doc = non_empty(clean_description(&doc_lines));

        let declaration = match block.members {
            Members::Enum(members) => TypeDeclaration::Enum {
                name,
                members,
                doc,
                deprecated,
            },
            Members::Struct(members) => TypeDeclaration::Struct {
                name,
                members,
                doc,
                deprecated,
            },
        };
        self.pending.clear();
        self.push_type(line, declaration);
    }

    fn parse_typedef(&mut self, line: usize, text: &str) {
        if let Some(caps) = RE_FUNCTION.captures(text) {
            let ret = caps[1].to_string();
            let ctype = caps[2].to_string();
            let args = parse_args(&caps[3]);
            let comment = caps.get(4).map(|m| m.as_str());
            self.function_typedef(line, ret, ctype, args, comment);
            return;
        }

        let simple = RE_SIMPLE
            .captures(text)
            .and_then(|caps| split_type_name(&caps[1]).map(|tn| (tn, caps.get(2))));
        match simple {
            Some(((underlying_type, name), comment)) => {
                let mut doc_lines = self.take_pending();
                let deprecated = trailing_comment(comment.map(|m| m.as_str()), &mut doc_lines);
                let declaration = TypeDeclaration::Simple {
                    name,
                    underlying_type,
                    doc: non_empty(clean_description(&doc_lines)),
                    deprecated,
                };
                self.push_type(line, declaration);
            }
            None => {
                log::debug!("line {}: unrecognized typedef: {}", line, text);
                self.pending.clear();
            }
        }
    }

    fn function_typedef(
        &mut self,
        line: usize,
        ret: String,
        ctype: String,
        args: Vec<Arg>,
        comment: Option<&str>,
    ) {
        let fragments = std::mem::take(&mut self.pending);
        let named = fragments
            .iter()
            .position(|frag| directive::find_name(&clean_description(frag)).is_some());

        if let Some(start) = named {
            let raw: Vec<String> = fragments.into_iter().skip(start).flatten().collect();
            let doc_lines = clean_description(&raw);
            let signature = Signature {
                ctype,
                ret,
                args,
                line,
            };
            let function = directive::build_interface(signature, &doc_lines, &mut *self.sink);
            if let Some(comment) = comment {
                log::debug!("line {}: ignoring trailing comment on interface function: {}", line, comment);
            }
            log::debug!("line {}: interface function {}", line, function.name);
            self.claim_name(line, function.canonical_type_name());
            self.interface.push(function);
            return;
        }

        let mut doc_lines: Vec<String> = fragments.into_iter().flatten().collect();
        let deprecated = trailing_comment(comment, &mut doc_lines);
        let declaration = TypeDeclaration::FunctionPointer {
            name: ctype,
            ret: ReturnValue::new(ret),
            args,
            doc: non_empty(clean_description(&doc_lines)),
            deprecated,
        };
        self.push_type(line, declaration);
    }

    fn push_type(&mut self, line: usize, declaration: TypeDeclaration) {
        log::debug!("line {}: {} {}", line, declaration.kind(), declaration.name());
        self.claim_name(line, declaration.name().to_string());
        self.types.push(declaration);
    }

    fn claim_name(&mut self, line: usize, name: String) {
        if self.names.contains(&name) {
            self.report(line, DiagnosticKind::DuplicateName { name });
        } else {
            self.names.insert(name);
        }
    }

    fn continue_comment(&mut self, text: String) {
        match self.pending.last_mut() {
            Some(fragment) => fragment.push(text),
            None => self.pending.push(vec![text]),
        }
    }

    fn take_pending(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending).into_iter().flatten().collect()
    }

    fn unrecognized_member(&mut self, kind: &'static str, line: usize, text: &str) {
        self.report(
            line,
            DiagnosticKind::UnrecognizedMember {
                kind,
                text: text.to_string(),
            },
        );
        self.pending.clear();
    }

    fn unsupported_enum_value(&mut self, line: usize, member: String, value: &str) {
        self.report(
            line,
            DiagnosticKind::UnsupportedEnumValue {
                member,
                value: value.to_string(),
            },
        );
    }
}

// -- Helpers ------------------------------------------------------------------

/// Split `TYPE NAME` on the last whitespace, moving leading `*` from the name
/// onto the type: `int *p_value` → (`int *`, `p_value`).
fn split_type_name(decl: &str) -> Option<(String, String)> {
    let tokens: Vec<&str> = decl.split_whitespace().collect();
    let (last, type_tokens) = tokens.split_last()?;
    if type_tokens.is_empty() {
        return None;
    }
    let mut ty = type_tokens.join(" ");
    let name = last.trim_start_matches('*');
    if name.is_empty() {
        return None;
    }
    let stars = last.len() - name.len();
    if stars > 0 {
        if !ty.ends_with('*') {
            ty.push(' ');
        }
        ty.push_str(&"*".repeat(stars));
    }
    Some((ty, name.to_string()))
}

/// Split a function pointer argument list. Bare types (`void`, `const char *`)
/// have no name.
fn parse_args(text: &str) -> Vec<Arg> {
    text.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|arg| {
            let ends_in_pointer = arg.ends_with('*');
            match split_type_name(arg) {
                Some((ty, name)) if !ends_in_pointer => Arg {
                    ty,
                    name: Some(name),
                },
                _ => Arg {
                    ty: arg.split_whitespace().collect::<Vec<_>>().join(" "),
                    name: None,
                },
            }
        })
        .collect()
}

/// Route a trailing comment: a deprecation note is returned, anything else is
/// appended to the declaration's doc lines.
fn trailing_comment(comment: Option<&str>, doc_lines: &mut Vec<String>) -> Option<String> {
    let comment = comment?;
    let text = clean_line(comment);
    if text.is_empty() {
        return None;
    }
    if is_deprecation_comment(&text) {
        return Some(text);
    }
    doc_lines.push(text);
    None
}

fn non_empty(lines: Vec<String>) -> Option<Vec<String>> {
    if lines.is_empty() {
        None
    } else {
        Some(lines)
    }
}
