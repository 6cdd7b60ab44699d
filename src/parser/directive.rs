//! Doc directives (`@name`, `@since`, `@param`, ...) of interface functions.
//!
//! Cleaned doc lines are parsed once into a flat list of [`DocDirective`]s and
//! then folded into an [`InterfaceFunction`] in a single pass.

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::model::*;
use regex::Regex;
use std::sync::LazyLock;

static RE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z]+)(?:\s+(.*))?$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocDirective {
    Name(String),
    Since(String),
    Deprecated(String),
    Param { name: String, text: String },
    Return(String),
    /// `@note TEXT`, kept as a body line without the tag.
    Note(String),
    See(String),
    Text(String),
    Blank,
}

impl DocDirective {
    /// Parse one cleaned doc line. Unknown `@word` lines are plain text.
    pub fn parse(line: &str) -> DocDirective {
        let line = line.trim();
        if line.is_empty() {
            return DocDirective::Blank;
        }
        let Some(caps) = RE_DIRECTIVE.captures(line) else {
            return DocDirective::Text(line.to_string());
        };
        let rest = caps.get(2).map_or("", |m| m.as_str().trim()).to_string();
        match &caps[1] {
            "name" => DocDirective::Name(rest),
            "since" => DocDirective::Since(rest),
            "deprecated" => DocDirective::Deprecated(rest),
            "param" => {
                let (name, text) = match rest.split_once(char::is_whitespace) {
                    Some((name, text)) => (name.to_string(), text.trim().to_string()),
                    None => (rest, String::new()),
                };
                DocDirective::Param { name, text }
            }
            "return" | "returns" => DocDirective::Return(rest),
            "note" => DocDirective::Note(rest),
            "see" => DocDirective::See(rest),
            _ => DocDirective::Text(line.to_string()),
        }
    }
}

/// Parse every line into a directive.
pub fn parse_directives<S: AsRef<str>>(lines: &[S]) -> Vec<DocDirective> {
    lines.iter().map(|l| DocDirective::parse(l.as_ref())).collect()
}

/// The `@name` value of a doc block, if it has one.
pub fn find_name<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    lines.iter().find_map(|l| match DocDirective::parse(l.as_ref()) {
        DocDirective::Name(name) if !name.is_empty() => Some(name),
        _ => None,
    })
}

/// Directive a following text line continues.
enum Continuation {
    Param(usize),
    Return,
    Deprecated,
}

/// Signature of a function pointer typedef flagged with `@name`.
pub struct Signature {
    /// Literal typedef identifier from the source.
    pub ctype: String,
    pub ret: String,
    pub args: Vec<Arg>,
    /// Source line of the typedef, for diagnostics.
    pub line: usize,
}

/// Fold the directives of a doc block into an interface function.
pub fn build_interface(
    signature: Signature,
    doc_lines: &[String],
    sink: &mut dyn DiagnosticSink,
) -> InterfaceFunction {
    let mut name = String::new();
    let mut since: Option<String> = None;
    let mut deprecated: Option<String> = None;
    let mut params: Vec<(String, Vec<String>)> = Vec::new();
    let mut ret_doc: Vec<String> = Vec::new();
    let mut see = Vec::new();
    let mut body: Vec<String> = Vec::new();
    let mut cont: Option<Continuation> = None;

    for directive in parse_directives(doc_lines) {
        match directive {
            DocDirective::Name(n) => {
                name = n;
                cont = None;
            }
            DocDirective::Since(v) => {
                since = Some(v);
                cont = None;
            }
            DocDirective::Deprecated(reason) => {
                deprecated = Some(reason);
                cont = Some(Continuation::Deprecated);
            }
            DocDirective::Param { name, text } => {
                let lines = if text.is_empty() { Vec::new() } else { vec![text] };
                params.push((name, lines));
                cont = Some(Continuation::Param(params.len() - 1));
            }
            DocDirective::Return(text) => {
                if !text.is_empty() {
                    ret_doc.push(text);
                }
                cont = Some(Continuation::Return);
            }
            DocDirective::Note(text) => {
                body.push(text);
                cont = None;
            }
            DocDirective::See(target) => {
                see.push(target);
                cont = None;
            }
            DocDirective::Blank => {
                body.push(String::new());
                cont = None;
            }
            DocDirective::Text(text) => match cont {
                Some(Continuation::Param(i)) => params[i].1.push(text),
                Some(Continuation::Return) => ret_doc.push(text),
                Some(Continuation::Deprecated) => {
                    let reason = deprecated.get_or_insert_with(String::new);
                    if !reason.is_empty() {
                        reason.push(' ');
                    }
                    reason.push_str(&text);
                }
                None => body.push(text),
            },
        }
    }

    let mut args: Vec<InterfaceArg> = signature
        .args
        .into_iter()
        .map(|a| InterfaceArg {
            ty: a.ty,
            name: a.name,
            doc: None,
        })
        .collect();

    for (param, lines) in params {
        match args.iter_mut().find(|a| a.name.as_deref() == Some(param.as_str())) {
            Some(arg) => {
                if !lines.is_empty() {
                    arg.doc.get_or_insert_with(Vec::new).extend(lines);
                }
            }
            None => sink.report(Diagnostic::new(
                signature.line,
                DiagnosticKind::UnknownParam {
                    function: name.clone(),
                    param,
                },
            )),
        }
    }

    let mut ret = ReturnValue::new(signature.ret);
    if !ret_doc.is_empty() {
        if ret.is_void() {
            sink.report(Diagnostic::new(
                signature.line,
                DiagnosticKind::ReturnWithoutValue {
                    function: name.clone(),
                },
            ));
        } else {
            ret.doc = Some(ret_doc);
        }
    }

    let since = since.unwrap_or_else(|| {
        sink.report(Diagnostic::new(
            signature.line,
            DiagnosticKind::MissingSince {
                function: name.clone(),
            },
        ));
        String::new()
    });

    let canonical = canonical_type_name(&name);
    let ctype_legacy_name = (signature.ctype != canonical).then_some(signature.ctype);

    InterfaceFunction {
        name,
        ctype_legacy_name,
        ret,
        args,
        since,
        deprecated: deprecated.map(|r| deprecation_note(&r)),
        doc: normalize_body(body),
        see,
    }
}

/// Trim and collapse blank lines, then drop the separator after the brief line.
fn normalize_body(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_empty() && out.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    if out.len() > 1 && out[1].is_empty() {
        out.remove(1);
    }
    out
}
