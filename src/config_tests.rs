use super::{load_file_config, resolve, RunConfig, DEFAULT_LM_COMMAND};
use crate::cli::{Backend, RunArgs};
use crate::generator::PromptMode;
use std::path::PathBuf;
use std::time::Duration;

fn write_config(dir: &std::path::Path, contents: &str) -> PathBuf {
    let path = dir.join("kwperm.json");
    std::fs::write(&path, contents.as_bytes()).expect("write config");
    path
}

#[test]
fn defaults_apply_without_flags() {
    let config = resolve(&RunArgs::default(), None).expect("resolve");
    assert_eq!(
        config,
        RunConfig {
            input: PathBuf::from("input.csv"),
            output: PathBuf::from("output.csv"),
            backend: Backend::Command,
            lm_command: DEFAULT_LM_COMMAND.to_string(),
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            prompt_mode: PromptMode::Argument,
            timeout: None,
            encoding: None,
        }
    );
}

#[test]
fn env_command_used_when_flag_and_file_are_absent() {
    let config = resolve(&RunArgs::default(), Some("llm -m mini".to_string())).expect("resolve");
    assert_eq!(config.lm_command, "llm -m mini");

    let config = resolve(&RunArgs::default(), Some("  ".to_string())).expect("resolve");
    assert_eq!(config.lm_command, DEFAULT_LM_COMMAND);
}

#[test]
fn flags_override_file_which_overrides_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"{"lm_command": "from-file", "output": "file.csv", "timeout_secs": 9, "prompt_stdin": true}"#,
    );
    let args = RunArgs {
        config: Some(path),
        output: Some(PathBuf::from("flag.csv")),
        ..RunArgs::default()
    };
    let config = resolve(&args, Some("from-env".to_string())).expect("resolve");
    assert_eq!(config.lm_command, "from-file");
    assert_eq!(config.output, PathBuf::from("flag.csv"));
    assert_eq!(config.timeout, Some(Duration::from_secs(9)));
    assert_eq!(config.prompt_mode, PromptMode::Stdin);

    let args = RunArgs {
        lm: Some("from-flag".to_string()),
        ..args
    };
    assert_eq!(resolve(&args, None).expect("resolve").lm_command, "from-flag");
}

#[test]
fn unknown_config_keys_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(dir.path(), r#"{"lm_comand": "typo"}"#);
    assert!(load_file_config(&path).is_err());
}

#[test]
fn file_selects_http_backend() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"{"backend": "http", "endpoint": "http://127.0.0.1:9", "model": "phi3"}"#,
    );
    let args = RunArgs {
        config: Some(path),
        ..RunArgs::default()
    };
    let config = resolve(&args, None).expect("resolve");
    assert_eq!(config.backend, Backend::Http);
    assert_eq!(config.model, "phi3");
}

#[test]
fn invalid_settings_are_rejected() {
    let zero_timeout = RunArgs {
        timeout_secs: Some(0),
        ..RunArgs::default()
    };
    assert!(resolve(&zero_timeout, None).is_err());

    let bad_encoding = RunArgs {
        encoding: Some("ebcdic-ish".to_string()),
        ..RunArgs::default()
    };
    assert!(resolve(&bad_encoding, None).is_err());

    let unbalanced = RunArgs {
        lm: Some("ollama run 'llama".to_string()),
        ..RunArgs::default()
    };
    assert!(resolve(&unbalanced, None).is_err());

    let bad_endpoint = RunArgs {
        backend: Some(Backend::Http),
        endpoint: Some("localhost:11434".to_string()),
        ..RunArgs::default()
    };
    assert!(resolve(&bad_endpoint, None).is_err());
}
