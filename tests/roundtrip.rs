use gdext_header::model::*;
use gdext_header::{decode, encode, is_stable, Diagnostic, EncodeOptions, Error, HeaderRenderer, Renderer};

fn decode_ok(text: &str) -> Document {
    let mut diags: Vec<Diagnostic> = Vec::new();
    let doc = decode(text, &mut diags);
    assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
    doc
}

fn lines(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

fn box_line(text: &str) -> String {
    format!("/*  {:<70}*/", text)
}

fn sample_document() -> Document {
    let rule = format!("/{}/", "*".repeat(74));
    Document {
        copyright: vec![
            rule.clone(),
            box_line("This file is part of:"),
            box_line("GODOT ENGINE"),
            rule,
        ],
        format_version: FORMAT_VERSION,
        types: vec![
            TypeDeclaration::Simple {
                name: "GDExtensionInt".into(),
                underlying_type: "int64_t".into(),
                doc: None,
                deprecated: None,
            },
            TypeDeclaration::Simple {
                name: "GDExtensionConstTypePtr".into(),
                underlying_type: "const void *".into(),
                doc: lines(&["Opaque pointer to a builtin value."]),
                deprecated: None,
            },
            TypeDeclaration::Enum {
                name: "GDExtensionInitializationLevel".into(),
                members: vec![
                    EnumMember {
                        name: "GDEXTENSION_INITIALIZATION_CORE".into(),
                        value: 0,
                        doc: lines(&["Core types only.", "Runs first."]),
                    },
                    EnumMember {
                        name: "GDEXTENSION_INITIALIZATION_SERVERS".into(),
                        value: 1,
                        doc: None,
                    },
                    EnumMember {
                        name: "GDEXTENSION_MAX_INITIALIZATION_LEVEL".into(),
                        value: 10,
                        doc: None,
                    },
                ],
                doc: lines(&["Initialization levels."]),
                deprecated: None,
            },
            TypeDeclaration::Struct {
                name: "GDExtensionClassCreationInfo".into(),
                members: vec![
                    StructMember {
                        name: "is_virtual".into(),
                        ty: "GDExtensionBool".into(),
                        doc: None,
                    },
                    StructMember {
                        name: "class_userdata".into(),
                        ty: "void *".into(),
                        doc: lines(&["Per-class user data."]),
                    },
                    StructMember {
                        name: "argv".into(),
                        ty: "char **".into(),
                        doc: None,
                    },
                ],
                doc: None,
                deprecated: Some("Deprecated. Use GDExtensionClassCreationInfo2 instead.".into()),
            },
            TypeDeclaration::FunctionPointer {
                name: "GDExtensionPtrConstructor".into(),
                ret: ReturnValue::new("void"),
                args: vec![
                    Arg {
                        ty: "GDExtensionUninitializedTypePtr".into(),
                        name: Some("p_base".into()),
                    },
                    Arg {
                        ty: "const GDExtensionConstTypePtr *".into(),
                        name: Some("p_args".into()),
                    },
                ],
                doc: None,
                deprecated: None,
            },
            TypeDeclaration::FunctionPointer {
                name: "GDExtensionInterfaceFunctionPtr".into(),
                ret: ReturnValue::new("void"),
                args: Vec::new(),
                doc: None,
                deprecated: Some("deprecated in Godot 4.3.".into()),
            },
        ],
        interface: vec![
            InterfaceFunction {
                name: "get_godot_version".into(),
                ctype_legacy_name: None,
                ret: ReturnValue::new("void"),
                args: vec![InterfaceArg {
                    ty: "GDExtensionGodotVersion *".into(),
                    name: Some("r_godot_version".into()),
                    doc: lines(&["A pointer to the structure to write", "the version information into."]),
                }],
                since: "4.1".into(),
                deprecated: Some("Deprecated in Godot 4.5. Use `get_godot_version2` instead.".into()),
                doc: vec!["Gets the Godot version that the GDExtension was loaded into.".into()],
                see: Vec::new(),
            },
            InterfaceFunction {
                name: "object_get_instance_id".into(),
                ctype_legacy_name: None,
                ret: ReturnValue {
                    ty: "GDObjectInstanceID".into(),
                    doc: lines(&["The instance ID."]),
                },
                args: vec![InterfaceArg {
                    ty: "GDExtensionConstObjectPtr".into(),
                    name: Some("p_object".into()),
                    doc: lines(&["A pointer to the Object."]),
                }],
                since: "4.1".into(),
                deprecated: None,
                doc: vec![
                    "Gets the instance ID from an Object.".into(),
                    "The ID is stable for the lifetime of the object.".into(),
                    "".into(),
                    "It can be used to look the object up again.".into(),
                ],
                see: vec!["object_get_instance_from_id".into(), "object_destroy".into()],
            },
            InterfaceFunction {
                name: "mem_alloc".into(),
                ctype_legacy_name: None,
                ret: ReturnValue {
                    ty: "void *".into(),
                    doc: lines(&["A pointer to the allocated memory, or NULL if unsuccessful."]),
                },
                args: vec![InterfaceArg {
                    ty: "size_t".into(),
                    name: Some("p_bytes".into()),
                    doc: lines(&["The amount of memory to allocate in bytes."]),
                }],
                since: "4.1".into(),
                deprecated: None,
                doc: vec!["Allocates memory.".into()],
                see: Vec::new(),
            },
        ],
    }
}

#[test]
fn hand_built_document_round_trips() {
    let doc = sample_document();
    let text = encode(&doc).unwrap();
    similar_asserts::assert_eq!(decode_ok(&text), doc);
}

#[test]
fn hand_built_document_is_stable() {
    assert!(is_stable(&sample_document()).unwrap());
}

#[test]
fn encoding_is_deterministic() {
    let doc = sample_document();
    assert_eq!(encode(&doc).unwrap(), encode(&doc.clone()).unwrap());
}

#[test]
fn round_trip_through_json() {
    let doc = sample_document();
    let json = serde_json::to_string_pretty(&doc).unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();
    similar_asserts::assert_eq!(back, doc);
    similar_asserts::assert_eq!(decode_ok(&encode(&back).unwrap()), doc);
}

fn deprecated_struct(note: &str) -> Document {
    let mut doc = Document::default();
    doc.types.push(TypeDeclaration::Struct {
        name: "GDExtensionFoo".into(),
        members: vec![StructMember {
            name: "x".into(),
            ty: "int32_t".into(),
            doc: None,
        }],
        doc: lines(&["A struct."]),
        deprecated: Some(note.into()),
    });
    doc
}

#[test]
fn type_deprecation_round_trips_or_is_rejected() {
    let rejected = deprecated_struct("Use GDExtensionFoo2 instead.");
    assert!(matches!(encode(&rejected), Err(Error::UndecodableDeprecation { .. })));
    assert!(is_stable(&rejected).is_err());

    let accepted = deprecated_struct("Deprecated. Use GDExtensionFoo2 instead.");
    similar_asserts::assert_eq!(decode_ok(&encode(&accepted).unwrap()), accepted);
    assert!(is_stable(&accepted).unwrap());
}

#[test]
fn interface_deprecation_is_stored_canonically() {
    let mut doc = sample_document();
    doc.interface[0].deprecated = Some("deprecated in 4.2".into());
    assert!(matches!(encode(&doc), Err(Error::UndecodableDeprecation { .. })));

    doc.interface[0].deprecated = Some(deprecation_note("in 4.2"));
    assert!(is_stable(&doc).unwrap());
    assert_eq!(
        decode_ok(&encode(&doc).unwrap()).interface[0].deprecated.as_deref(),
        Some("Deprecated in 4.2")
    );
}

#[test]
fn section_marker_doc_is_a_contract_violation() {
    let mut doc = Document::default();
    doc.types.push(TypeDeclaration::Simple {
        name: "GDExtensionBool".into(),
        underlying_type: "uint8_t".into(),
        doc: lines(&["VARIANT TYPES"]),
        deprecated: None,
    });
    assert!(matches!(encode(&doc), Err(Error::SectionMarkerDoc { .. })));
}

#[test]
fn enum_defaults_ignore_explicit_siblings() {
    let doc = decode_ok("typedef enum {\n\tA,\n\tB = 10,\n\tC\n} GDExtensionSample;\n");
    let TypeDeclaration::Enum { members, .. } = &doc.types[0] else {
        panic!("expected enum, got {:?}", doc.types[0]);
    };
    let values: Vec<(&str, i64)> = members.iter().map(|m| (m.name.as_str(), m.value)).collect();
    assert_eq!(values, vec![("A", 0), ("B", 10), ("C", 2)]);
}

#[test]
fn pointer_suffix_folds_into_type() {
    let doc = decode_ok("typedef struct {\n\tint *p_value;\n\tchar **pp;\n} GDExtensionPointers;\n");
    let TypeDeclaration::Struct { members, .. } = &doc.types[0] else {
        panic!("expected struct, got {:?}", doc.types[0]);
    };
    assert_eq!(members[0].name, "p_value");
    assert_eq!(members[0].ty, "int *");
    assert_eq!(members[1].name, "pp");
    assert_eq!(members[1].ty, "char **");

    let text = encode(&doc).unwrap();
    assert!(text.contains("\tint *p_value;\n"));
    assert!(text.contains("\tchar **pp;\n"));
}

fn get_proc_address_header(ctype: &str) -> String {
    format!(
        "/**\n * @name get_proc_address\n * @since 4.1\n *\n * Gets a pointer to an interface function.\n *\n * @param p_function_name The name of the function.\n *\n * @return A pointer to the function.\n */\ntypedef GDExtensionInterfaceFunctionPtr (*{})(const char *p_function_name);\n",
        ctype
    )
}

#[test]
fn canonical_interface_name_has_no_legacy_name() {
    let doc = decode_ok(&get_proc_address_header("GDExtensionInterfaceGetProcAddress"));
    assert!(doc.types.is_empty());
    assert_eq!(doc.interface[0].name, "get_proc_address");
    assert_eq!(doc.interface[0].ctype_legacy_name, None);
}

#[test]
fn mismatched_interface_name_keeps_legacy_name() {
    let doc = decode_ok(&get_proc_address_header("GDExtensionInterfaceOldName"));
    let function = &doc.interface[0];
    assert_eq!(function.name, "get_proc_address");
    assert_eq!(function.ctype_legacy_name.as_deref(), Some("GDExtensionInterfaceOldName"));

    let canonical = encode(&doc).unwrap();
    assert!(canonical.contains("(*GDExtensionInterfaceGetProcAddress)"));
    assert!(!canonical.contains("GDExtensionInterfaceOldName"));

    let legacy = HeaderRenderer::new(EncodeOptions {
        legacy_names: true,
        ..EncodeOptions::default()
    })
    .render(&doc)
    .unwrap();
    assert!(legacy.contains("(*GDExtensionInterfaceOldName)"));
    similar_asserts::assert_eq!(decode_ok(&legacy), doc);
}

#[test]
fn param_docs_are_required_and_emitted_in_order() {
    let mut doc = Document::default();
    doc.interface.push(InterfaceFunction {
        name: "classdb_get_method_bind".into(),
        ctype_legacy_name: None,
        ret: ReturnValue::new("void"),
        args: vec![
            InterfaceArg {
                ty: "GDExtensionConstStringNamePtr".into(),
                name: Some("p_classname".into()),
                doc: lines(&["The class name."]),
            },
            InterfaceArg {
                ty: "GDExtensionConstStringNamePtr".into(),
                name: Some("p_methodname".into()),
                doc: None,
            },
            InterfaceArg {
                ty: "GDExtensionInt".into(),
                name: Some("p_hash".into()),
                doc: lines(&["The signature hash."]),
            },
        ],
        since: "4.1".into(),
        deprecated: None,
        doc: vec!["Gets a method bind.".into()],
        see: Vec::new(),
    });

    let err = encode(&doc).unwrap_err();
    assert!(matches!(err, Error::MissingArgDoc { ref arg, .. } if arg == "p_methodname"));

    doc.interface[0].args[1].doc = lines(&["The method name."]);
    let text = encode(&doc).unwrap();
    let params: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with(" * @param "))
        .collect();
    assert_eq!(
        params,
        vec![
            " * @param p_classname The class name.",
            " * @param p_methodname The method name.",
            " * @param p_hash The signature hash.",
        ]
    );
}

#[test]
fn struct_with_trailing_comment_end_to_end() {
    let input = "typedef struct {\n    int32_t x;\n    int32_t y; // Y coordinate\n} GDExtensionExamplePoint;\n";
    let doc = decode_ok(input);
    similar_asserts::assert_eq!(
        doc.types,
        vec![TypeDeclaration::Struct {
            name: "GDExtensionExamplePoint".into(),
            members: vec![
                StructMember {
                    name: "x".into(),
                    ty: "int32_t".into(),
                    doc: None,
                },
                StructMember {
                    name: "y".into(),
                    ty: "int32_t".into(),
                    doc: lines(&["Y coordinate"]),
                },
            ],
            doc: None,
            deprecated: None,
        }]
    );

    let text = encode(&doc).unwrap();
    assert!(text.contains(
        "typedef struct {\n\tint32_t x;\n\t/* Y coordinate */\n\tint32_t y;\n} GDExtensionExamplePoint;\n"
    ));
    similar_asserts::assert_eq!(decode_ok(&text), doc);
}

#[test]
fn intro_comment_never_becomes_documentation() {
    let mut doc = Document::default();
    doc.types.push(TypeDeclaration::Simple {
        name: "GDExtensionBool".into(),
        underlying_type: "uint8_t".into(),
        doc: None,
        deprecated: None,
    });
    let decoded = decode_ok(&encode(&doc).unwrap());
    assert_eq!(decoded.types[0].doc(), None);
    assert!(decoded.copyright.is_empty());
}
