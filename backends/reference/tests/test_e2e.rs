//! Runs the reference plugin binaries as child processes.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{common_file, debug_logger, greeter, logger, Captured};
use loader::{load, LoaderError};
use pipeline::{load_plugins, CodeGenerator, ErrorPolicy, Phase, PipelineError};
use plugins::{GenerationOptions, HostedPlugin, Level, PluginError, PluginRole, RLogger};
use reference::scripted::STARTUP_RECORD;
use schema::RSFile;

const JSON: &str = env!("CARGO_BIN_EXE_rrgen-json-generator");
const PRUNE: &str = env!("CARGO_BIN_EXE_rrgen-prune-processor");
const SCRIPTED: &str = env!("CARGO_BIN_EXE_rrgen-test-plugin");

fn command(parts: &[&str]) -> Vec<String> { parts.iter().map(|part| part.to_string()).collect() }

fn scripted(mode: &str) -> Vec<String> { command(&[SCRIPTED, &format!("--mode={}", mode)]) }

fn options(root: &std::path::Path) -> GenerationOptions {
    let mut options = GenerationOptions::new();
    options.set_gen_output(root);
    options
}

#[tokio::test]
async fn test_greeter_json_generation() {
    let out = tempfile::tempdir().expect("temp dir should be created");
    let system = logger();
    let plugin = load(&command(&[JSON]), system.clone()).await.expect("json generator should load");
    let meta = plugin.meta();
    assert_eq!(meta.name, "json");
    assert_eq!(meta.role, PluginRole::Generator);
    assert_eq!(meta.options[0].name, "pretty");

    let mut options = options(out.path());
    options.set("json:pretty", "true");
    let plugin_logger = logger();
    let factory = {
        let plugin_logger = Arc::clone(&plugin_logger);
        move |_: &str| -> Arc<dyn RLogger> { plugin_logger.clone() }
    };
    let report = CodeGenerator::new(vec![plugin])
        .generate(vec![greeter(), common_file()], &options, &factory)
        .await
        .expect("generation should succeed");
    assert_eq!(report.total_errors(), 0);
    assert!(plugin_logger.messages(Level::Error).is_empty());

    let written = out.path().join("json").join("helloworld.json");
    let content = std::fs::read_to_string(&written).expect("generated file should exist");
    assert!(content.contains("\n  "), "pretty output expected");
    let file: RSFile = serde_json::from_str(&content).expect("generated file should be JSON");
    assert_eq!(file, greeter());
    assert!(out.path().join("json").join("common.json").is_file());

    let lifecycle = plugin_logger.messages(Level::Lifecycle);
    assert_eq!(lifecycle.len(), 1);
    assert!(lifecycle[0].starts_with("Wrote 2 file(s)"));
}

#[tokio::test]
async fn test_prune_feeds_generator() {
    let out = tempfile::tempdir().expect("temp dir should be created");
    let commands = vec![command(&[PRUNE]), command(&[JSON])];
    let plugins = load_plugins(&commands, logger(), Some(Duration::from_secs(30)))
        .await
        .expect("plugins should load");
    assert_eq!(plugins.iter().map(HostedPlugin::role).collect::<Vec<_>>(), vec![
        PluginRole::Processor,
        PluginRole::Generator
    ]);

    let mut options = options(out.path());
    options.set("prune:drop_deprecated", "true");
    let report = CodeGenerator::new(plugins)
        .generate(vec![greeter()], &options, &|_: &str| -> Arc<dyn RLogger> { Arc::new(Captured::default()) })
        .await
        .expect("generation should succeed");

    let rpcs: Vec<_> = report.files[0].services[0].rpcs.iter().map(|rpc| rpc.name.as_str()).collect();
    assert_eq!(rpcs, vec!["SayHello"]);

    let written = std::fs::read_to_string(out.path().join("json").join("helloworld.json"))
        .expect("generated file should exist");
    let file: RSFile = serde_json::from_str(&written).expect("generated file should be JSON");
    assert_eq!(file, report.files[0]);
    assert!(!written.contains("Internal"));
}

#[tokio::test]
async fn test_handshake_failures() {
    match load(&scripted("wrong-handshake"), logger()).await {
        Err(LoaderError::Handshake { reason, .. }) => assert!(reason.contains("CodeGenerated")),
        Err(LoaderError::Exited { reason, .. }) => assert!(reason.contains("CodeGenerated")),
        other => panic!("Expected a handshake failure, got {:?}", other.map(|plugin| plugin.meta().name)),
    }

    match load(&scripted("exit"), logger()).await {
        Err(LoaderError::Exited { command, status, .. }) => {
            assert!(command.ends_with("--mode=exit"));
            assert_eq!(status.code(), Some(reference::scripted::EXIT_CODE));
        }
        other => panic!("Expected Exited, got {:?}", other.map(|plugin| plugin.meta().name)),
    }
}

#[tokio::test]
async fn test_wrong_terminal_signal() {
    let out = tempfile::tempdir().expect("temp dir should be created");
    let plugin = load(&scripted("wrong-terminal"), logger()).await.expect("handshake should succeed");
    let generator = CodeGenerator::new(vec![plugin]);
    match generator.generate(vec![greeter()], &options(out.path()), &|_: &str| -> Arc<dyn RLogger> { logger() }).await {
        Err(PipelineError::Plugin { plugin, source: PluginError::Protocol(message) }) => {
            assert_eq!(plugin, "scripted");
            assert!(message.contains("ChangedInput"));
        }
        other => panic!("Expected a protocol error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reported_errors_follow_policy() {
    let out = tempfile::tempdir().expect("temp dir should be created");

    let plugin = load(&scripted("log-error"), logger()).await.expect("handshake should succeed");
    match CodeGenerator::new(vec![plugin])
        .generate(vec![greeter()], &options(out.path()), &|_: &str| -> Arc<dyn RLogger> { logger() })
        .await
    {
        Err(PipelineError::PluginReportedErrors { plugin, count }) => {
            assert_eq!(plugin, "scripted");
            assert_eq!(count, 1);
        }
        other => panic!("Expected PluginReportedErrors, got {:?}", other),
    }

    let captured = logger();
    let factory = {
        let captured = Arc::clone(&captured);
        move |_: &str| -> Arc<dyn RLogger> { captured.clone() }
    };
    let plugin = load(&scripted("log-error"), logger()).await.expect("handshake should succeed");
    let report = CodeGenerator::new(vec![plugin])
        .with_error_policy(ErrorPolicy::Ignore)
        .generate(vec![greeter()], &options(out.path()), &factory)
        .await
        .expect("ignored errors should not fail the run");
    assert_eq!(report.total_errors(), 1);
    assert_eq!(captured.messages(Level::Error), vec!["something broke".to_string()]);
    assert_eq!(captured.messages(Level::Lifecycle), vec!["received 1 file(s)".to_string()]);
}

#[tokio::test]
async fn test_hanging_plugin_times_out() {
    let out = tempfile::tempdir().expect("temp dir should be created");
    let system = debug_logger();
    let plugin = load(&scripted("hang"), system.clone()).await.expect("handshake should succeed");
    let pid = started_pid(&system.messages(Level::Debug));

    let generator =
        CodeGenerator::new(vec![plugin]).with_generation_timeout(Some(Duration::from_millis(500)));
    match generator.generate(vec![greeter()], &options(out.path()), &|_: &str| -> Arc<dyn RLogger> { logger() }).await {
        Err(PipelineError::Timeout { phase: Phase::Generation, plugin, .. }) => {
            assert_eq!(plugin.as_deref(), Some("scripted"));
        }
        other => panic!("Expected Timeout, got {:?}", other),
    }

    #[cfg(target_os = "linux")]
    assert_terminated(pid).await;
    #[cfg(not(target_os = "linux"))]
    let _ = pid;
}

#[tokio::test]
async fn test_records_before_metadata_are_forwarded() {
    let out = tempfile::tempdir().expect("temp dir should be created");
    let system = logger();
    let plugin = load(&scripted("log-before-meta"), system.clone())
        .await
        .expect("records ahead of the metadata should not fail the handshake");
    assert_eq!(plugin.meta().name, "scripted");
    assert_eq!(plugin.role(), PluginRole::Generator);
    assert_eq!(system.messages(Level::Lifecycle), vec![STARTUP_RECORD.to_string()]);

    let report = CodeGenerator::new(vec![plugin])
        .generate(vec![greeter()], &options(out.path()), &|_: &str| -> Arc<dyn RLogger> { logger() })
        .await
        .expect("generation should succeed");
    assert_eq!(report.total_errors(), 0);
}

#[tokio::test]
async fn test_process_plugin_serves_one_request() {
    let out = tempfile::tempdir().expect("temp dir should be created");
    let plugin = load(&scripted("well-behaved"), logger()).await.expect("handshake should succeed");
    let HostedPlugin::Generator(service) = plugin else { panic!("Expected a generator") };

    let scoped = options(out.path()).scoped_for("scripted");
    let records = logger();
    service.generate_code(&scoped, &[greeter()], records.as_ref()).await.expect("first request should succeed");
    assert_eq!(records.messages(Level::Lifecycle), vec!["received 1 file(s)".to_string()]);

    match service.generate_code(&scoped, &[greeter()], records.as_ref()).await {
        Err(PluginError::AlreadyFinished(name)) => assert_eq!(name, "scripted"),
        other => panic!("Expected AlreadyFinished, got {:?}", other),
    }
}

fn started_pid(records: &[String]) -> u32 {
    records
        .iter()
        .find_map(|record| {
            let rest = record.split("started with PID Some(").nth(1)?;
            rest.split(')').next()?.parse().ok()
        })
        .expect("start record should carry the PID")
}

/// Waits until `pid` is gone or a zombie awaiting its reaper.
#[cfg(target_os = "linux")]
async fn assert_terminated(pid: u32) {
    let status = format!("/proc/{}/status", pid);
    for _ in 0..50 {
        match std::fs::read_to_string(&status) {
            Err(_) => return,
            Ok(content) if content.lines().any(|line| line.starts_with("State:") && line.contains("Z (zombie)")) => {
                return
            }
            Ok(_) => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
    panic!("Plugin process {} is still running after the timeout", pid);
}
