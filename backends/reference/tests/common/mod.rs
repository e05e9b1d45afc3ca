#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use plugins::{Level, RLogger};
use schema::{
    RSDeclarationUrl, RSElementLocation, RSField, RSFile, RSMessage, RSOption, RSOptions, RSPackageName, RSRpc,
    RSService,
};

pub fn url(name: &str) -> RSDeclarationUrl {
    RSDeclarationUrl::new(format!("type.googleapis.com/helloworld.{}", name))
}

/// `helloworld.proto` with a `Greeter` service, a deprecated rpc and a
/// source-only message.
pub fn greeter() -> RSFile {
    let request = RSMessage {
        name: "HelloRequest".to_string(),
        type_url: url("HelloRequest"),
        fields: vec![RSField::new(1, "name", RSDeclarationUrl::STRING)],
        ..RSMessage::default()
    };
    let reply = RSMessage {
        name: "HelloReply".to_string(),
        type_url: url("HelloReply"),
        fields: vec![RSField::new(1, "message", RSDeclarationUrl::STRING)],
        ..RSMessage::default()
    };
    let internal = RSMessage {
        name: "Internal".to_string(),
        type_url: url("Internal"),
        options: RSOptions::new(vec![RSOption::raw(
            "source_only_message",
            RSOption::SOURCE_ONLY_MESSAGE,
            "true",
        )]),
        ..RSMessage::default()
    };

    let mut old = RSRpc::new("SayHelloOld", url("HelloRequest"), url("HelloReply"));
    old.options = RSOptions::new(vec![RSOption::raw("deprecated", RSOption::DEPRECATED, "true")]);

    RSFile {
        package_name: RSPackageName::new("helloworld"),
        types: vec![request.into(), reply.into(), internal.into()],
        services: vec![RSService {
            name: "Greeter".to_string(),
            type_url: url("Greeter"),
            rpcs: vec![RSRpc::new("SayHello", url("HelloRequest"), url("HelloReply")), old],
            ..RSService::default()
        }],
        ..RSFile::new("helloworld.proto", RSElementLocation::new("protos", "helloworld.proto"))
    }
}

/// `common.proto`, a second file of the greeter schema.
pub fn common_file() -> RSFile {
    RSFile {
        package_name: RSPackageName::new("helloworld"),
        types: vec![RSMessage {
            name: "Status".to_string(),
            type_url: url("Status"),
            fields: vec![RSField::new(1, "code", RSDeclarationUrl::INT32)],
            ..RSMessage::default()
        }
        .into()],
        ..RSFile::new("common.proto", RSElementLocation::new("protos", "common.proto"))
    }
}

/// Logger keeping every record.
#[derive(Default)]
pub struct Captured {
    pub records: Mutex<Vec<(Level, String)>>,
    pub debug: bool,
}

impl Captured {
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records
            .lock()
            .expect("lock should not be poisoned")
            .iter()
            .filter(|(record_level, _)| *record_level == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

#[async_trait]
impl RLogger for Captured {
    fn is_debug_enabled(&self) -> bool { self.debug }

    async fn log(&self, level: Level, message: &str) {
        self.records.lock().expect("lock should not be poisoned").push((level, message.to_string()));
    }
}

pub fn logger() -> Arc<Captured> { Arc::new(Captured::default()) }

pub fn debug_logger() -> Arc<Captured> { Arc::new(Captured { debug: true, ..Captured::default() }) }
