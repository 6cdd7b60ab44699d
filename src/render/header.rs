//! C header renderer, the encoder half of the converter.
//!
//! Output layout is fixed: generated-file banner, copyright, preamble, every
//! type declaration in IR order, every interface function with its Doxygen
//! block, then the closing `extern "C"` guard. Nothing here depends on hash
//! ordering or the environment, so the same IR always yields the same bytes.
//!
//! Headers made by the older Python generator differ in two places: blank
//! doc lines there are ` * ` with a trailing space (here ` *`), and multi-line
//! `@param`/`@return` docs are joined onto one line (here each extra line is
//! a continuation line, so the decoder can split them again).
//!
//! `validate` rejects IR that would not decode back to itself: type
//! deprecation notes must read as one ("Deprecated ..."), interface notes
//! must be in the canonical "Deprecated ..." phrasing, and no one-line doc may
//! spell the section marker.

use crate::error::{Error, Result};
use crate::model::*;
use crate::parser::lexer::SECTION_MARKER;
use crate::render::Renderer;

const RULE: &str =
    "/**************************************************************************/";

const INTRO: &str = "
#pragma once

/* This is a C class header, you can copy it and use it directly in your own binders.
 * Together with the `extension_api.json` file, you should be able to generate any binder.
 */

#ifndef __cplusplus
#include <stddef.h>
#include <stdint.h>

typedef uint32_t char32_t;
typedef uint16_t char16_t;
#else
#include <cstddef>
#include <cstdint>

extern \"C\" {
#endif

";

const OUTRO: &str = "
#ifdef __cplusplus
}
#endif
";

/// Knobs for header generation.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// File name shown in the generated-file banner.
    pub file_name: String,
    /// Emit `ctype_legacy_name` instead of the canonical name where one is set.
    pub legacy_names: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            file_name: "gdextension_interface.h".to_string(),
            legacy_names: false,
        }
    }
}

pub struct HeaderRenderer {
    options: EncodeOptions,
}

impl HeaderRenderer {
    pub fn new(options: EncodeOptions) -> Self {
        HeaderRenderer { options }
    }
}

impl Renderer for HeaderRenderer {
    fn render(&self, doc: &Document) -> Result<String> {
        validate(doc)?;

        let mut out = String::new();
        out.push_str(RULE);
        out.push('\n');
        out.push_str(&format!("/*  {:<70}*/\n", self.options.file_name));
        for line in &doc.copyright {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(INTRO);

        for ty in &doc.types {
            write_type(&mut out, ty);
        }
        for function in &doc.interface {
            write_interface(&mut out, function, self.options.legacy_names);
        }

        out.push_str(OUTRO);
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "h"
    }
}

/// Encode with default options.
pub fn encode(doc: &Document) -> Result<String> {
    HeaderRenderer::new(EncodeOptions::default()).render(doc)
}

/// Check the contract the header relies on before writing anything, so an
/// invalid IR never produces a partial header.
fn validate(doc: &Document) -> Result<()> {
    for ty in &doc.types {
        if ty.name().is_empty() {
            return Err(Error::MissingName { kind: ty.kind() });
        }
        if let Some(text) = ty.deprecated() {
            if !decodes_as_deprecation(text) {
                return Err(Error::UndecodableDeprecation {
                    name: ty.name().to_string(),
                    text: text.to_string(),
                });
            }
        }
        if is_section_marker(ty.doc()) {
            return Err(Error::SectionMarkerDoc {
                name: ty.name().to_string(),
            });
        }
        let member_docs: Vec<(&str, Option<&[String]>)> = match ty {
            TypeDeclaration::Enum { members, .. } => members
                .iter()
                .map(|m| (m.name.as_str(), m.doc.as_deref()))
                .collect(),
            TypeDeclaration::Struct { members, .. } => members
                .iter()
                .map(|m| (m.name.as_str(), m.doc.as_deref()))
                .collect(),
            _ => Vec::new(),
        };
        for (member, doc) in member_docs {
            if is_section_marker(doc) {
                return Err(Error::SectionMarkerDoc {
                    name: format!("{}::{}", ty.name(), member),
                });
            }
        }
    }
    for function in &doc.interface {
        if function.name.is_empty() {
            return Err(Error::MissingName { kind: "interface" });
        }
        if let Some(ref note) = function.deprecated {
            if deprecation_note(deprecation_reason(note)) != *note {
                return Err(Error::UndecodableDeprecation {
                    name: function.name.clone(),
                    text: note.clone(),
                });
            }
        }
        for arg in &function.args {
            let Some(name) = arg.name.as_deref().filter(|n| !n.is_empty()) else {
                return Err(Error::MissingName {
                    kind: "interface argument",
                });
            };
            if !has_doc(arg.doc.as_deref()) {
                return Err(Error::MissingArgDoc {
                    function: function.name.clone(),
                    arg: name.to_string(),
                });
            }
        }
        if !function.ret.is_void() && !has_doc(function.ret.doc.as_deref()) {
            return Err(Error::MissingReturnDoc {
                function: function.name.clone(),
            });
        }
    }
    Ok(())
}

/// A type's deprecation note is written as a trailing comment, which decodes
/// back only when it reads as one.
fn decodes_as_deprecation(text: &str) -> bool {
    !text.is_empty() && text == text.trim() && !text.contains("*/") && is_deprecation_comment(text)
}

/// A one-line doc identical to the section marker would be dropped on decode.
fn is_section_marker(doc: Option<&[String]>) -> bool {
    matches!(doc, Some([only]) if format!("/* {} */", only.trim_end()) == SECTION_MARKER)
}

fn has_doc(doc: Option<&[String]>) -> bool {
    doc.is_some_and(|lines| lines.iter().any(|l| !l.trim().is_empty()))
}

/// `int` + `x` → `int x`, `char *` + `x` → `char *x`.
fn join_type_name(ty: &str, name: &str) -> String {
    if ty.ends_with('*') {
        format!("{}{}", ty, name)
    } else {
        format!("{} {}", ty, name)
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn write_doc(out: &mut String, doc: &[String], indent: &str) {
    if let [only] = doc {
        push_line(out, &format!("{}/* {} */", indent, only));
        return;
    }
    for (i, line) in doc.iter().enumerate() {
        let marker = if i == 0 { "/* " } else { " * " };
        push_line(out, &format!("{}{}{}", indent, marker, line));
    }
    push_line(out, &format!("{} */", indent));
}

fn deprecated_note(deprecated: Option<&str>) -> String {
    match deprecated {
        Some(text) => format!(" /* {} */", text),
        None => String::new(),
    }
}

fn write_type(out: &mut String, ty: &TypeDeclaration) {
    if let Some(doc) = ty.doc().filter(|d| !d.is_empty()) {
        write_doc(out, doc, "");
    }
    let note = deprecated_note(ty.deprecated());
    match ty {
        TypeDeclaration::Simple {
            name,
            underlying_type,
            ..
        } => {
            out.push_str(&format!(
                "typedef {};{}\n",
                join_type_name(underlying_type, name),
                note
            ));
        }
        TypeDeclaration::Enum { name, members, .. } => {
            out.push_str("typedef enum {\n");
            for member in members {
                if let Some(doc) = member.doc.as_deref().filter(|d| !d.is_empty()) {
                    write_doc(out, doc, "\t");
                }
                out.push_str(&format!("\t{} = {},\n", member.name, member.value));
            }
            out.push_str(&format!("}} {};{}\n\n", name, note));
        }
        TypeDeclaration::Struct { name, members, .. } => {
            out.push_str("typedef struct {\n");
            for member in members {
                if let Some(doc) = member.doc.as_deref().filter(|d| !d.is_empty()) {
                    write_doc(out, doc, "\t");
                }
                out.push_str(&format!("\t{};\n", join_type_name(&member.ty, &member.name)));
            }
            out.push_str(&format!("}} {};{}\n\n", name, note));
        }
        TypeDeclaration::FunctionPointer { name, ret, args, .. } => {
            let args = args
                .iter()
                .map(|a| arg_text(&a.ty, a.name.as_deref()))
                .collect::<Vec<_>>();
            write_function_type(out, &ret.ty, name, &args, &note);
        }
    }
}

fn arg_text(ty: &str, name: Option<&str>) -> String {
    match name {
        Some(name) => join_type_name(ty, name),
        None => ty.to_string(),
    }
}

fn write_function_type(out: &mut String, ret: &str, name: &str, args: &[String], note: &str) {
    let sep = if ret.ends_with('*') { "" } else { " " };
    out.push_str(&format!(
        "typedef {}{}(*{})({});{}\n",
        ret,
        sep,
        name,
        args.join(", "),
        note
    ));
}

fn write_interface(out: &mut String, function: &InterfaceFunction, legacy_names: bool) {
    let mut doc: Vec<String> = vec![
        format!("@name {}", function.name),
        format!("@since {}", function.since),
    ];

    if let Some(ref note) = function.deprecated {
        let reason = deprecation_reason(note);
        if reason.is_empty() {
            doc.push("@deprecated".to_string());
        } else {
            doc.push(format!("@deprecated {}", reason));
        }
    }

    if let Some((brief, body)) = function.doc.split_first() {
        doc.push(String::new());
        doc.push(brief.clone());
        if !body.is_empty() {
            doc.push(String::new());
            doc.extend(body.iter().cloned());
        }
    }

    if !function.args.is_empty() {
        doc.push(String::new());
        for arg in &function.args {
            let name = arg.name.as_deref().unwrap_or_default();
            let lines = arg.doc.as_deref().unwrap_or_default();
            push_directive(&mut doc, &format!("@param {}", name), lines);
        }
    }

    if !function.ret.is_void() {
        doc.push(String::new());
        push_directive(&mut doc, "@return", function.ret.doc.as_deref().unwrap_or_default());
    }

    if !function.see.is_empty() {
        doc.push(String::new());
        for see in &function.see {
            doc.push(format!("@see {}", see));
        }
    }

    out.push_str("/**\n");
    for line in &doc {
        push_line(out, &format!(" * {}", line));
    }
    out.push_str(" */\n");

    let type_name = match function.ctype_legacy_name {
        Some(ref legacy) if legacy_names => legacy.clone(),
        _ => function.canonical_type_name(),
    };
    let args = function
        .args
        .iter()
        .map(|a| arg_text(&a.ty, a.name.as_deref()))
        .collect::<Vec<_>>();
    write_function_type(out, &function.ret.ty, &type_name, &args, "");
    out.push('\n');
}

/// `@tag first line`, further lines as continuation lines.
fn push_directive(doc: &mut Vec<String>, tag: &str, lines: &[String]) {
    let mut lines = lines.iter().filter(|l| !l.trim().is_empty());
    match lines.next() {
        Some(first) => doc.push(format!("{} {}", tag, first)),
        None => doc.push(tag.to_string()),
    }
    doc.extend(lines.cloned());
}
