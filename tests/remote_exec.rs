// tests/remote_exec.rs

//! Remote executor tests: argument-vector building, container rewriting,
//! credential sanitization, and exit-status classification (run against a
//! local shell, since the classification path is transport-agnostic).

mod common;
use crate::common::init_tracing;

use std::path::PathBuf;

use proptest::prelude::*;

use skyrig::errors::SkyrigError;
use skyrig::exec::RemoteTarget;
use skyrig::exec::remote::{
    build_ssh_args, run_argv, sanitized_command_line, wrap_in_container,
};

fn target(container: Option<&str>) -> RemoteTarget {
    RemoteTarget {
        address: "10.0.0.5".to_string(),
        user: "ubuntu".to_string(),
        private_key: PathBuf::from("/keys/id_rsa"),
        container: container.map(str::to_string),
    }
}

#[test]
fn container_rewrite_escapes_and_wraps() {
    let wrapped = wrap_in_container("train", "echo \"hi\"");
    assert_eq!(wrapped, "docker exec train /bin/bash -c \"echo \\\"hi\\\"\"");
}

#[test]
fn backslashes_are_escaped_before_quotes() {
    // Input `a\"b`: the backslash and the quote must each gain exactly one
    // escaping backslash, not compound.
    let wrapped = wrap_in_container("c", "a\\\"b");
    assert_eq!(wrapped, "docker exec c /bin/bash -c \"a\\\\\\\"b\"");
}

#[test]
fn ssh_args_have_the_expected_shape() {
    let args = build_ssh_args(&target(None), "nvidia-smi");

    assert_eq!(
        args,
        vec![
            "-i".to_string(),
            "/keys/id_rsa".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "ubuntu@10.0.0.5".to_string(),
            "nvidia-smi".to_string(),
        ]
    );
}

#[test]
fn container_target_sends_the_rewritten_command() {
    let args = build_ssh_args(&target(Some("train")), "echo \"hi\"");

    assert_eq!(
        args.last().unwrap(),
        "docker exec train /bin/bash -c \"echo \\\"hi\\\"\""
    );
}

#[test]
fn bare_host_command_is_untouched() {
    let command = "cd /data && python train.py --epochs 10 2>&1 | tee log.txt";
    let args = build_ssh_args(&target(None), command);
    assert_eq!(args.last().unwrap(), command);
}

#[test]
fn sanitized_command_line_elides_the_key() {
    let args = build_ssh_args(&target(None), "ls");
    let display = sanitized_command_line("ssh", &args);

    assert!(!display.contains("/keys/id_rsa"), "got {display}");
    assert!(!display.contains("-i"), "got {display}");
    assert!(display.contains("ubuntu@10.0.0.5"));
    assert!(display.contains("StrictHostKeyChecking=no"));
    assert!(display.ends_with("ls"));
}

#[tokio::test]
async fn successful_command_returns_collected_output() {
    init_tracing();
    let args = vec!["-c".to_string(), "printf hello".to_string()];
    let result = run_argv("sh", &args, "sh -c 'printf hello'").await.unwrap();

    assert_eq!(result.stdout, "hello");
    assert_eq!(result.exit_code, 0);
}

#[tokio::test]
async fn nonzero_exit_preserves_code_and_stderr() {
    init_tracing();
    let args = vec![
        "-c".to_string(),
        "echo command not found >&2; exit 127".to_string(),
    ];
    let err = run_argv("sh", &args, "sh -c '...'").await.unwrap_err();

    match err {
        SkyrigError::RemoteExecution {
            exit_code,
            command,
            stderr,
        } => {
            assert_eq!(exit_code, 127);
            assert_eq!(command, "sh -c '...'");
            assert!(stderr.contains("command not found"));
        }
        other => panic!("expected RemoteExecution, got {other:?}"),
    }
}

#[tokio::test]
async fn unstartable_program_is_a_remote_execution_error() {
    init_tracing();
    let err = run_argv("skyrig-no-such-binary", &[], "skyrig-no-such-binary")
        .await
        .unwrap_err();

    assert!(
        matches!(err, SkyrigError::RemoteExecution { exit_code: -1, .. }),
        "got {err:?}"
    );
}

/// Invert the container escaping: every escaped character follows a
/// backslash.
fn unescape(s: &str) -> String {
    let mut out = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

proptest! {
    #[test]
    fn container_escaping_round_trips(command in ".{0,40}") {
        let wrapped = wrap_in_container("c", &command);

        let payload = wrapped
            .strip_prefix("docker exec c /bin/bash -c \"")
            .and_then(|rest| rest.strip_suffix('"'))
            .expect("wrapped command shape");

        prop_assert_eq!(unescape(payload), command);
    }
}
