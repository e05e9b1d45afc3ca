mod common;

use common::{greet_file, other_file, timeout_url, url};
use resolver::{OptionsTarget, RSResolver, ResolverError};
use schema::{LocationPath, RSDeclarationUrl, RSElementLocation, RSTypeMemberUrl};

#[test]
fn test_resolve_types_at_any_depth() {
    let resolver = RSResolver::new(vec![greet_file()]);

    let request = resolver.resolve_type(&url("Request")).expect("Request should resolve");
    assert_eq!(request.name(), "Request");

    let mood = resolver.resolve_type(&url("Request.Mood")).expect("nested enum should resolve");
    assert_eq!(mood.as_enum().map(|e| e.constants.len()), Some(2));

    let file = resolver.resolve_file_of(&url("Request.Mood")).expect("file should resolve");
    assert_eq!(file.name, "greet.proto");

    assert!(resolver.resolve_type(&url("Missing")).is_none());
    assert_eq!(resolver.resolve_all_types().len(), 3);
}

#[test]
fn test_resolve_services() {
    let resolver = RSResolver::new(vec![greet_file()]);

    let greeter = resolver.resolve_service(&url("Greeter")).expect("Greeter should resolve");
    assert_eq!(greeter.rpcs.len(), 2);
    assert!(resolver.resolve_service(&url("Request")).is_none());
    assert_eq!(resolver.resolve_all_services().len(), 1);
}

#[test]
fn test_resolve_fields() {
    let resolver = RSResolver::new(vec![greet_file()]);

    let timeout = resolver.resolve_field(&timeout_url()).expect("extension should resolve");
    assert_eq!(timeout.tag, 5000);

    let nested = RSTypeMemberUrl::new(RSDeclarationUrl::SERVICE_OPTIONS, "greet.Request.internal");
    assert_eq!(resolver.resolve_field(&nested).map(|f| f.tag), Some(6000));

    let name = RSTypeMemberUrl::new(url("Request"), "name");
    assert_eq!(resolver.resolve_field(&name).map(|f| f.tag), Some(1));

    // Extensions are keyed by their qualified name only.
    let unqualified = RSTypeMemberUrl::new(RSDeclarationUrl::METHOD_OPTIONS, "timeout");
    assert!(resolver.resolve_field(&unqualified).is_none());
}

#[test]
fn test_resolve_files_by_location() {
    let resolver = RSResolver::new(vec![greet_file(), other_file()]);

    let by_path = resolver.resolve_file_at(&LocationPath::new("other.proto"));
    assert_eq!(by_path.map(|f| f.name.as_str()), Some("other.proto"));
    assert!(resolver.resolve_file_at(&LocationPath::new("protos/other.proto")).is_none());

    let location = RSElementLocation::new("protos", "greet.proto");
    let by_location = resolver.resolve_file_at_location(&location);
    assert_eq!(by_location.map(|f| f.name.as_str()), Some("greet.proto"));

    let elsewhere = RSElementLocation::new("vendor", "greet.proto");
    assert!(resolver.resolve_file_at_location(&elsewhere).is_none());
    assert_eq!(resolver.resolve_available_files().len(), 2);
}

#[test]
fn test_later_declaration_wins() {
    let resolver = RSResolver::new(vec![greet_file(), other_file()]);

    let response = resolver.resolve_type(&url("Response")).expect("Response should resolve");
    assert_eq!(response.documentation(), "redeclared");
    assert_eq!(
        resolver.resolve_file_of(&url("Response")).map(|f| f.name.as_str()),
        Some("other.proto")
    );

    let responses = resolver
        .resolve_all_types()
        .into_iter()
        .filter(|ty| ty.type_url() == &url("Response"))
        .count();
    assert_eq!(responses, 1);
}

#[test]
fn test_extends_lookup() {
    let resolver = RSResolver::new(vec![greet_file()]);

    assert_eq!(resolver.resolve_all_extends().len(), 2);
    assert_eq!(resolver.resolve_extends_of_type(&RSDeclarationUrl::METHOD_OPTIONS).len(), 1);
    assert!(resolver.resolve_extends_of_type(&RSDeclarationUrl::FIELD_OPTIONS).is_empty());

    let method = resolver.extends_of_kind(OptionsTarget::Method).expect("method extends");
    assert_eq!(method[0].fields.len(), 2);
    let service = resolver.extends_of_kind(OptionsTarget::Service).expect("service extends");
    assert_eq!(service.len(), 1);
    let file = resolver.extends_of_kind(OptionsTarget::File).expect("file extends");
    assert!(file.is_empty());

    match resolver.extends_of_kind(OptionsTarget::Message) {
        Err(ResolverError::UnsupportedOptionsTarget(OptionsTarget::Message)) => {}
        other => panic!("Expected UnsupportedOptionsTarget, got {:?}", other),
    }
}

#[test]
fn test_merge() {
    let first = RSResolver::new(vec![greet_file()]);
    let second = RSResolver::new(vec![other_file()]);

    let merged = RSResolver::merge([&first, &second]);
    assert_eq!(merged.resolve_available_files().len(), 2);
    assert!(merged.resolve_service(&url("Greeter")).is_some());
    assert_eq!(
        merged.resolve_type(&url("Response")).map(|ty| ty.documentation()),
        Some("redeclared")
    );
    assert_eq!(merged, merged.clone());
}
