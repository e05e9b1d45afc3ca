use rrgen_schema::{
    load_files, save_files, RSDeclarationUrl, RSElementLocation, RSEnum, RSEnumConstant, RSExtend,
    RSField, RSFieldLabel, RSFile, RSMessage, RSOneOf, RSOption, RSOptionValue, RSOptions,
    RSPackageName, RSRpc, RSService, RSTypeMemberUrl, SchemaError,
};

fn url(name: &str) -> RSDeclarationUrl {
    RSDeclarationUrl::new(format!("type.googleapis.com/greet.{}", name))
}

fn greeter_file() -> RSFile {
    let timeout = RSTypeMemberUrl::new(RSDeclarationUrl::METHOD_OPTIONS, "greet.timeout");
    let request = RSMessage {
        name: "Request".to_string(),
        type_url: url("Request"),
        fields: vec![RSField::new(1, "name", RSDeclarationUrl::STRING)],
        one_ofs: vec![RSOneOf {
            name: "greeting".to_string(),
            fields: vec![RSField {
                label: RSFieldLabel::OneOf,
                ..RSField::new(2, "formal", RSDeclarationUrl::BOOL)
            }],
            ..RSOneOf::default()
        }],
        nested_types: vec![RSEnum {
            name: "Mood".to_string(),
            type_url: url("Request.Mood"),
            constants: vec![RSEnumConstant { name: "HAPPY".to_string(), ..Default::default() }],
            ..RSEnum::default()
        }
        .into()],
        ..RSMessage::default()
    };
    let response = RSMessage {
        name: "Response".to_string(),
        type_url: url("Response"),
        fields: vec![RSField::new(1, "text", RSDeclarationUrl::STRING)],
        ..RSMessage::default()
    };
    let mut say_hello = RSRpc::new("sayHello", url("Request"), url("Response"));
    say_hello.options = RSOptions::new(vec![
        RSOption::raw("greet.timeout", timeout.clone(), "30"),
        RSOption::new(
            "greet.limits",
            RSTypeMemberUrl::new(RSDeclarationUrl::METHOD_OPTIONS, "greet.limits"),
            Some(RSOptionValue::MessageMap(vec![(
                RSTypeMemberUrl::new(url("Limits"), "burst"),
                RSOptionValue::RawMap(vec![("per_second".to_string(), "10".to_string())]),
            )])),
        ),
    ]);

    RSFile {
        package_name: RSPackageName::new("greet"),
        services: vec![RSService {
            name: "Greeter".to_string(),
            type_url: url("Greeter"),
            rpcs: vec![say_hello],
            ..RSService::default()
        }],
        extends: vec![RSExtend {
            type_url: RSDeclarationUrl::METHOD_OPTIONS,
            fields: vec![RSField {
                is_extension: true,
                namespaces: vec!["greet".to_string()],
                ..RSField::new(5000, "timeout", RSDeclarationUrl::INT32)
            }],
            ..RSExtend::default()
        }],
        types: vec![request.into(), response.into()],
        ..RSFile::new("greeter.proto", RSElementLocation::new("protos", "greeter.proto").at(1, 1))
    }
}

#[test]
fn test_json_roundtrip() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("ir").join("schema.json");
    let files = vec![greeter_file(), RSFile::new("empty.proto", RSElementLocation::UNKNOWN)];

    save_files(&path, &files).expect("failed to write IR");
    let loaded = load_files(&path).expect("failed to load IR");

    assert_eq!(loaded, files);
    assert_eq!(loaded[0].all_types().len(), 3);
}

#[test]
fn test_binary_roundtrip() {
    let files = vec![greeter_file()];
    let bytes = bincode::serialize(&files).expect("failed to encode");
    let decoded: Vec<RSFile> = bincode::deserialize(&bytes).expect("failed to decode");
    assert_eq!(decoded, files);
}

#[test]
fn test_load_errors() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");

    match load_files(&dir.path().join("missing.json")) {
        Err(SchemaError::Io(_)) => {}
        other => panic!("Expected Io error, got {:?}", other),
    }

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ not json").expect("failed to write file");
    match load_files(&broken) {
        Err(SchemaError::Json(_)) => {}
        other => panic!("Expected Json error, got {:?}", other),
    }
}

#[test]
fn test_json_uses_readable_urls() {
    let json = serde_json::to_string(&greeter_file()).expect("failed to encode");
    assert!(json.contains("\"type.googleapis.com/greet.Greeter\""));
    assert!(json.contains("\"package_name\":\"greet\""));
}
