use std::path::PathBuf;

use serde::Serialize;
use tracing::error;

use crate::config::{Credentials, ServerConfig};
use crate::data::registry::{DatasetRegistry, Outcome, RegistryError};
use crate::data::validate::{validate_registry_file, ValidationSeverity};
use crate::server;

const USAGE: &str = "usage: dataset-registry <serve|list|get|validate|credentials>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    List,
    Get,
    Validate,
    Credentials,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("list") => Some(Command::List),
        Some("get") => Some(Command::Get),
        Some("validate") => Some(Command::Validate),
        Some("credentials") => Some(Command::Credentials),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let config = ServerConfig::from_env();
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(&config),
        Some(Command::List) => handle_list(args, &config),
        Some(Command::Get) => handle_get(args, &config),
        Some(Command::Validate) => handle_validate(args, &config),
        Some(Command::Credentials) => handle_credentials(&config),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_serve(config: &ServerConfig) -> i32 {
    let credentials = match Credentials::load(&config.credentials_path) {
        Ok(credentials) => credentials,
        Err(err) => {
            error!(error = %err, "cannot start without dataset host credentials");
            eprintln!("startup failed: {err}");
            return 1;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            return 1;
        }
    };

    match runtime.block_on(server::run_server(config, credentials)) {
        Ok(()) => 0,
        Err(err) => {
            error!(error = %err, "server stopped with an error");
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_list(args: &[String], config: &ServerConfig) -> i32 {
    let registry = DatasetRegistry::new(registry_path(args.get(2), config));
    print_outcome(registry.list())
}

fn handle_get(args: &[String], config: &ServerConfig) -> i32 {
    let Some(name) = args.get(2) else {
        eprintln!("usage: dataset-registry get <name> [registry.json]");
        return 2;
    };
    let registry = DatasetRegistry::new(registry_path(args.get(3), config));
    print_outcome(registry.get(name))
}

fn handle_validate(args: &[String], config: &ServerConfig) -> i32 {
    let path = registry_path(args.get(2), config);
    let report = match validate_registry_file(&path) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    for diagnostic in &report.diagnostics {
        eprintln!("- {diagnostic}");
    }
    if report.has_errors() {
        eprintln!(
            "validation failed: {} error(s), {} warning(s)",
            report.count(ValidationSeverity::Error),
            report.count(ValidationSeverity::Warning)
        );
        return 1;
    }

    println!(
        "validation passed: {} ({} dataset(s), {} warning(s))",
        path.display(),
        report.entry_count,
        report.count(ValidationSeverity::Warning)
    );
    0
}

fn handle_credentials(config: &ServerConfig) -> i32 {
    match Credentials::load(&config.credentials_path) {
        Ok(credentials) => {
            println!("username: {}", credentials.username());
            println!("key: {}", credentials.masked_key());
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn registry_path(raw: Option<&String>, config: &ServerConfig) -> PathBuf {
    raw.map(PathBuf::from)
        .unwrap_or_else(|| config.registry_path.clone())
}

fn print_outcome<T: Serialize>(result: Result<Outcome<T>, RegistryError>) -> i32 {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("{}: {err}", err.kind());
            return 1;
        }
    };
    match serde_json::to_string_pretty(&outcome) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize registry payload: {err}");
            1
        }
    }
}
