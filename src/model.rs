//! Intermediate representation shared by the decoder and the encoder.
//!
//! The JSON shape produced by serde here is the persisted artifact consumed by
//! downstream build steps, so field names and tags are part of the contract.

use serde::{Deserialize, Serialize};

/// Current IR format version.
pub const FORMAT_VERSION: u32 = 1;

/// Prefix of every canonical interface function type name.
pub const INTERFACE_TYPE_PREFIX: &str = "GDExtensionInterface";

/// Complete IR for one interface header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Banner lines emitted verbatim after the generated-file header.
    #[serde(rename = "_copyright", default)]
    pub copyright: Vec<String>,
    pub format_version: u32,
    /// Declaration order is significant: later types may reference earlier ones.
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
    #[serde(default)]
    pub interface: Vec<InterfaceFunction>,
}

impl Default for Document {
    fn default() -> Self {
        Document {
            copyright: Vec::new(),
            format_version: FORMAT_VERSION,
            types: Vec::new(),
            interface: Vec::new(),
        }
    }
}

/// One declaration from the types section of the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypeDeclaration {
    /// `typedef DEF NAME;`
    Simple {
        name: String,
        #[serde(rename = "def")]
        underlying_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        doc: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deprecated: Option<String>,
    },
    Enum {
        name: String,
        members: Vec<EnumMember>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        doc: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deprecated: Option<String>,
    },
    Struct {
        name: String,
        members: Vec<StructMember>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        doc: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deprecated: Option<String>,
    },
    /// A function pointer typedef that is not an interface entry point.
    #[serde(rename = "function")]
    FunctionPointer {
        name: String,
        ret: ReturnValue,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Arg>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        doc: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deprecated: Option<String>,
    },
}

impl TypeDeclaration {
    pub fn name(&self) -> &str {
        match self {
            TypeDeclaration::Simple { name, .. }
            | TypeDeclaration::Enum { name, .. }
            | TypeDeclaration::Struct { name, .. }
            | TypeDeclaration::FunctionPointer { name, .. } => name,
        }
    }

    pub fn doc(&self) -> Option<&[String]> {
        match self {
            TypeDeclaration::Simple { doc, .. }
            | TypeDeclaration::Enum { doc, .. }
            | TypeDeclaration::Struct { doc, .. }
            | TypeDeclaration::FunctionPointer { doc, .. } => doc.as_deref(),
        }
    }

    pub fn deprecated(&self) -> Option<&str> {
        match self {
            TypeDeclaration::Simple { deprecated, .. }
            | TypeDeclaration::Enum { deprecated, .. }
            | TypeDeclaration::Struct { deprecated, .. }
            | TypeDeclaration::FunctionPointer { deprecated, .. } => deprecated.as_deref(),
        }
    }

    /// Tag used in the IR (`simple`, `enum`, `struct`, `function`).
    pub fn kind(&self) -> &'static str {
        match self {
            TypeDeclaration::Simple { .. } => "simple",
            TypeDeclaration::Enum { .. } => "enum",
            TypeDeclaration::Struct { .. } => "struct",
            TypeDeclaration::FunctionPointer { .. } => "function",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructMember {
    pub name: String,
    /// Pointer markers are part of the type, e.g. `"char **"`.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Vec<String>>,
}

/// Argument of an ordinary function pointer type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnValue {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Vec<String>>,
}

impl ReturnValue {
    pub fn new(ty: impl Into<String>) -> Self {
        ReturnValue {
            ty: ty.into(),
            doc: None,
        }
    }

    pub fn is_void(&self) -> bool {
        self.ty == "void"
    }
}

/// Argument of an interface function. `doc` is required by the header
/// renderer but may be missing in a freshly decoded IR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceArg {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Vec<String>>,
}

/// A documented, versioned entry point of the interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceFunction {
    /// snake_case name from the `@name` directive.
    pub name: String,
    /// Source typedef identifier, kept only when it differs from
    /// [`InterfaceFunction::canonical_type_name`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctype_legacy_name: Option<String>,
    pub ret: ReturnValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<InterfaceArg>,
    pub since: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    /// Brief line first, then the extended description.
    #[serde(default)]
    pub doc: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub see: Vec<String>,
}

impl InterfaceFunction {
    /// `GDExtensionInterface` + PascalCase of the interface name.
    pub fn canonical_type_name(&self) -> String {
        canonical_type_name(&self.name)
    }
}

pub fn canonical_type_name(interface_name: &str) -> String {
    format!("{}{}", INTERFACE_TYPE_PREFIX, pascal_case(interface_name))
}

/// "get_proc_address" → "GetProcAddress"
pub fn pascal_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Normalize a `@deprecated` reason into the IR phrasing: "in 4.2" → "Deprecated in 4.2".
pub fn deprecation_note(reason: &str) -> String {
    let reason = reason.trim();
    if reason.is_empty() {
        "Deprecated".to_string()
    } else if deprecation_reason(reason).len() < reason.len() {
        reason.to_string()
    } else {
        format!("Deprecated {}", reason)
    }
}

/// Whether a trailing comment on a type declaration is a deprecation note.
pub fn is_deprecation_comment(text: &str) -> bool {
    text.to_ascii_lowercase().starts_with("deprecated")
}

/// Inverse of [`deprecation_note`]: drop a leading "Deprecated" word, any case.
pub fn deprecation_reason(note: &str) -> &str {
    let note = note.trim();
    let keyword = "deprecated";
    match note.get(..keyword.len()) {
        Some(head) if head.eq_ignore_ascii_case(keyword) => {
            let rest = &note[keyword.len()..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                rest.trim_start()
            } else {
                note
            }
        }
        _ => note,
    }
}
