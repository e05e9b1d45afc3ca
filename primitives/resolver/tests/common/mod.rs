use schema::{
    RSDeclarationUrl, RSElementLocation, RSEnum, RSEnumConstant, RSExtend, RSField, RSFile,
    RSMessage, RSOption, RSOptions, RSPackageName, RSRpc, RSService, RSTypeMemberUrl,
};

pub fn url(name: &str) -> RSDeclarationUrl {
    RSDeclarationUrl::new(format!("type.googleapis.com/greet.{}", name))
}

pub fn timeout_url() -> RSTypeMemberUrl {
    RSTypeMemberUrl::new(RSDeclarationUrl::METHOD_OPTIONS, "greet.timeout")
}

pub fn retries_url() -> RSTypeMemberUrl {
    RSTypeMemberUrl::new(RSDeclarationUrl::METHOD_OPTIONS, "greet.retries")
}

pub fn internal_url() -> RSTypeMemberUrl {
    RSTypeMemberUrl::new(RSDeclarationUrl::SERVICE_OPTIONS, "greet.Request.internal")
}

fn extension(tag: i32, name: &str, namespaces: &[&str]) -> RSField {
    RSField {
        is_extension: true,
        namespaces: namespaces.iter().map(|s| s.to_string()).collect(),
        ..RSField::new(tag, name, RSDeclarationUrl::INT32)
    }
}

/// `greet.proto`: two messages, a nested enum, method and service option
/// extensions and a service using all of them.
pub fn greet_file() -> RSFile {
    let request = RSMessage {
        name: "Request".to_string(),
        type_url: url("Request"),
        fields: vec![RSField::new(1, "name", RSDeclarationUrl::STRING)],
        nested_types: vec![RSEnum {
            name: "Mood".to_string(),
            type_url: url("Request.Mood"),
            constants: vec![
                RSEnumConstant { name: "HAPPY".to_string(), tag: 0, ..Default::default() },
                RSEnumConstant { name: "SAD".to_string(), tag: 1, ..Default::default() },
            ],
            ..RSEnum::default()
        }
        .into()],
        nested_extends: vec![RSExtend {
            type_url: RSDeclarationUrl::SERVICE_OPTIONS,
            fields: vec![extension(6000, "internal", &["greet", "Request"])],
            ..RSExtend::default()
        }],
        ..RSMessage::default()
    };
    let response = RSMessage {
        name: "Response".to_string(),
        type_url: url("Response"),
        fields: vec![RSField::new(1, "text", RSDeclarationUrl::STRING)],
        ..RSMessage::default()
    };

    let mut say_hello = RSRpc::new("SayHello", url("Request"), url("Response"));
    say_hello.options = RSOptions::new(vec![
        RSOption::raw("greet.timeout", timeout_url(), "30"),
        RSOption::raw("greet.retries", retries_url(), "3"),
    ]);
    let say_bye = RSRpc::new("SayBye", url("Request"), url("Response"));

    RSFile {
        package_name: RSPackageName::new("greet"),
        types: vec![request.into(), response.into()],
        extends: vec![RSExtend {
            type_url: RSDeclarationUrl::METHOD_OPTIONS,
            fields: vec![extension(5000, "timeout", &["greet"]), extension(5001, "retries", &["greet"])],
            ..RSExtend::default()
        }],
        services: vec![RSService {
            name: "Greeter".to_string(),
            type_url: url("Greeter"),
            rpcs: vec![say_hello, say_bye],
            options: RSOptions::new(vec![RSOption::raw(
                "greet.Request.internal",
                internal_url(),
                "true",
            )]),
            ..RSService::default()
        }],
        ..RSFile::new("greet.proto", RSElementLocation::new("protos", "greet.proto"))
    }
}

/// `other.proto`: redeclares `greet.Response`.
pub fn other_file() -> RSFile {
    RSFile {
        package_name: RSPackageName::new("greet"),
        types: vec![RSMessage {
            name: "Response".to_string(),
            type_url: url("Response"),
            documentation: "redeclared".to_string(),
            ..RSMessage::default()
        }
        .into()],
        ..RSFile::new("other.proto", RSElementLocation::new("protos", "other.proto"))
    }
}
