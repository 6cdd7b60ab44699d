//! Fatal errors: contract violations in the IR and IR loading failures.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("interface function {function} is missing docs for {arg} argument")]
    MissingArgDoc { function: String, arg: String },
    #[error("interface function {function} is missing docs for return value")]
    MissingReturnDoc { function: String },
    #[error("{kind} declaration has no name")]
    MissingName { kind: &'static str },
    #[error("unsupported IR format version {0}")]
    UnsupportedFormatVersion(u32),
    #[error("invalid IR: {0}")]
    Json(#[from] serde_json::Error),
    #[error("deprecation note of {name} would not survive decoding: {text:?}")]
    UndecodableDeprecation { name: String, text: String },
    #[error("doc of {name} collides with the section marker")]
    SectionMarkerDoc { name: String },
    #[error("unknown format: {0}. Use json or header")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
