//! JSON renderer for the persisted IR consumed by downstream build steps.

use crate::error::Result;
use crate::model::Document;
use crate::render::Renderer;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, doc: &Document) -> Result<String> {
        let mut out = serde_json::to_string_pretty(doc)?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;

    #[test]
    fn renders_top_level_keys() {
        let doc = Document {
            copyright: vec!["/* c */".into()],
            types: vec![TypeDeclaration::Simple {
                name: "GDExtensionBool".into(),
                underlying_type: "uint8_t".into(),
                doc: None,
                deprecated: None,
            }],
            ..Default::default()
        };
        let out = JsonRenderer.render(&doc).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["_copyright"][0], "/* c */");
        assert_eq!(value["format_version"], 1);
        assert_eq!(value["types"][0]["type"], "simple");
        assert_eq!(value["types"][0]["def"], "uint8_t");
        assert!(value["interface"].as_array().unwrap().is_empty());
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn output_reloads_identically() {
        let doc = Document {
            interface: vec![InterfaceFunction {
                name: "mem_free".into(),
                ctype_legacy_name: None,
                ret: ReturnValue::new("void"),
                args: vec![InterfaceArg {
                    ty: "void *".into(),
                    name: Some("p_ptr".into()),
                    doc: Some(vec!["A pointer to the previously allocated memory.".into()]),
                }],
                since: "4.1".into(),
                deprecated: None,
                doc: vec!["Frees memory.".into()],
                see: Vec::new(),
            }],
            ..Default::default()
        };
        let out = JsonRenderer.render(&doc).unwrap();
        assert_eq!(crate::parser::json::parse(&out).unwrap(), doc);
    }
}
