//! Smoke tests for the naspip CLI
//!
//! These tests drive the compiled binary end to end with fixed keys and
//! payload files in a temporary directory.

use std::path::Path;
use std::process::{Command, Output};

use naspip_lib::test_utils::{
    key_expiration_in, sample_instruction, sample_url_payload, OTHER_PUBLIC_KEY, PUBLIC_KEY,
    SECRET_KEY,
};
use tempfile::TempDir;

fn naspip(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_naspip"))
        .args(args)
        .env_remove("NASPIP_SECRET_KEY")
        .env_remove("NASPIP_PUBLIC_KEY")
        .output()
        .expect("Failed to execute naspip")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_json(dir: &Path, name: &str, value: &impl serde::Serialize) -> String {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path.to_string_lossy().into_owned()
}

fn create_raw(kind: &str, input: &str, extra: &[&str]) -> Output {
    let kep = key_expiration_in(30);
    let mut args = vec![
        "create",
        kind,
        "--input",
        input,
        "--secret-key",
        SECRET_KEY,
        "--kid",
        "key-id-one",
        "--kis",
        "payment-processor.com",
        "--kep",
        kep.as_str(),
        "--issuer",
        "qrCrypto.com",
        "--expires-in",
        "5m",
        "--raw",
    ];
    args.extend_from_slice(extra);
    naspip(&args)
}

/// Test that the CLI can show help
#[test]
fn test_cli_help() {
    let output = naspip(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["keygen", "create", "decode", "inspect", "read"] {
        assert!(text.contains(command), "Help should mention '{command}'");
    }
}

/// Test that version is shown
#[test]
fn test_cli_version() {
    let output = naspip(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("naspip"));
}

#[test]
fn test_keygen_writes_key_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("keys.json");
    let output = naspip(&["keygen", "--output", path.to_str().unwrap()]);
    assert!(output.status.success());

    let keys: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(keys["secretKey"].as_str().unwrap().starts_with("k4.secret."));
    assert!(keys["publicKey"].as_str().unwrap().starts_with("k4.public."));
}

#[test]
fn test_keygen_rejects_unknown_format() {
    let output = naspip(&["keygen", "--format", "pem"]);
    assert!(!output.status.success());
}

#[test]
fn test_create_and_read_payment() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "payment.json", &sample_instruction());

    let output = create_raw("payment", &input, &[]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let token = stdout(&output).trim().to_string();
    assert!(token.starts_with("naspip;payment-processor.com;key-id-one;v4.public."));

    let output = naspip(&[
        "read",
        token.as_str(),
        "--public-key",
        PUBLIC_KEY,
        "--kid",
        "key-id-one",
        "--issuer",
        "qrCrypto.com",
        "--json",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let read: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(read["claims"]["kid"], "key-id-one");
    assert_eq!(
        read["claims"]["data"]["instruction_payload"]["payment"]["id"],
        "payment-id"
    );
}

#[test]
fn test_read_rejects_wrong_issuer_and_key() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "payment.json", &sample_instruction());
    let token = stdout(&create_raw("payment", &input, &[])).trim().to_string();

    let output = naspip(&["read", token.as_str(), "--public-key", PUBLIC_KEY, "--issuer", "wrong"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("issuer mismatch"));

    let output = naspip(&["read", token.as_str(), "--public-key", OTHER_PUBLIC_KEY]);
    assert!(!output.status.success());
}

#[test]
fn test_create_url_then_inspect() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "url.json", &sample_url_payload());
    let output = create_raw("url", &input, &["--footer", "key-id-one"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let token = stdout(&output).trim().to_string();

    let output = naspip(&["inspect", token.as_str(), "--json"]);
    assert!(output.status.success());
    let inspected: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(inspected["purpose"], "public");
    assert_eq!(
        inspected["claims"]["data"]["url_payload"]["url"],
        "https://pay.example.com/checkout/1234"
    );

    let output = naspip(&[
        "read",
        token.as_str(),
        "--public-key",
        PUBLIC_KEY,
        "--footer",
        "other",
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_invalid_payload_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut payload = sample_instruction();
    payload.payment.amount = Some("-1".into());
    let input = write_json(dir.path(), "payment.json", &payload);

    let output = create_raw("payment", &input, &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("PAYMENT_AMOUNT_INVALID"));
}

#[test]
fn test_decode_envelope() {
    let output = naspip(&["decode", "naspip;payment-processor.com;key-id-one;v4.public.abc"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("payment-processor.com"));

    let output = naspip(&["decode", "not-a-token"]);
    assert!(!output.status.success());
}
