//! Configuration layering: defaults, then the `POKERSIM_CONFIG` file, then
//! `POKERSIM_*` variables, then flags.

use serde_json::Value;
use serial_test::serial;
use std::io::Write;

const VARS: &[&str] = &[
    "POKERSIM_CONFIG",
    "POKERSIM_SEED",
    "POKERSIM_SEATS",
    "POKERSIM_ROUNDS",
    "POKERSIM_VARIANT",
    "POKERSIM_PROGRESS_EVERY",
    "POKERSIM_PARALLEL",
];

fn clear_env() {
    for var in VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

fn set_env(key: &str, value: &str) {
    unsafe {
        std::env::set_var(key, value);
    }
}

fn run(args: &[&str]) -> (i32, String, String) {
    let mut argv = vec!["pokersim"];
    argv.extend_from_slice(args);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = pokersim_cli::run(argv, &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

fn cfg() -> Value {
    let (code, out, err) = run(&["cfg"]);
    assert_eq!(code, 0, "stderr: {}", err);
    serde_json::from_str(&out).unwrap()
}

fn config_file(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
#[serial]
fn cfg_shows_defaults() {
    clear_env();
    let json = cfg();
    assert_eq!(json["seats"]["value"].as_u64(), Some(4));
    assert_eq!(json["seats"]["source"].as_str(), Some("default"));
    assert_eq!(json["rounds"]["value"].as_u64(), Some(10_000));
    assert_eq!(json["variant"]["value"].as_str(), Some("draw"));
    assert!(json["seed"]["value"].is_null());
    assert_eq!(json["parallel"]["value"].as_bool(), Some(false));
}

#[test]
#[serial]
fn file_overrides_defaults_and_env_overrides_file() {
    clear_env();
    let file = config_file("seats = 6\nrounds = 500\nvariant = \"holdem\"\nseed = 9\n");
    set_env("POKERSIM_CONFIG", file.path().to_str().unwrap());
    set_env("POKERSIM_SEATS", "3");

    let json = cfg();
    clear_env();

    assert_eq!(json["seats"]["value"].as_u64(), Some(3));
    assert_eq!(json["seats"]["source"].as_str(), Some("env"));
    assert_eq!(json["rounds"]["value"].as_u64(), Some(500));
    assert_eq!(json["rounds"]["source"].as_str(), Some("file"));
    assert_eq!(json["variant"]["value"].as_str(), Some("holdem"));
    assert_eq!(json["seed"]["value"].as_u64(), Some(9));
    assert_eq!(json["progress_every"]["source"].as_str(), Some("default"));
}

#[test]
#[serial]
fn flags_override_environment_for_sim() {
    clear_env();
    set_env("POKERSIM_SEATS", "3");
    set_env("POKERSIM_ROUNDS", "50");
    set_env("POKERSIM_SEED", "77");

    let (code, env_out, _) = run(&["sim", "--json", "--progress-every", "0"]);
    let (_, flag_out, _) = run(&["sim", "--json", "--progress-every", "0", "--seats", "5"]);
    clear_env();

    assert_eq!(code, 0);
    let env_doc: Value = serde_json::from_str(&env_out).unwrap();
    assert_eq!(env_doc["seats"].as_u64(), Some(3));
    assert_eq!(env_doc["total_rounds"].as_u64(), Some(50));
    assert_eq!(env_doc["seed"].as_u64(), Some(77));

    let flag_doc: Value = serde_json::from_str(&flag_out).unwrap();
    assert_eq!(flag_doc["seats"].as_u64(), Some(5));
    assert_eq!(flag_doc["total_rounds"].as_u64(), Some(50));
}

#[test]
#[serial]
fn invalid_environment_value_exits_2() {
    clear_env();
    set_env("POKERSIM_SEATS", "twelve");
    let (code, _, err) = run(&["cfg"]);
    clear_env();

    assert_eq!(code, 2);
    assert!(err.contains("Invalid configuration"));
}

#[test]
#[serial]
fn config_file_with_too_many_seats_is_rejected() {
    clear_env();
    let file = config_file("seats = 11\n");
    set_env("POKERSIM_CONFIG", file.path().to_str().unwrap());
    let (code, _, err) = run(&["sim", "--rounds", "1"]);
    clear_env();

    assert_eq!(code, 2);
    assert!(err.contains("Invalid configuration"));
}

#[test]
#[serial]
fn malformed_config_file_is_reported() {
    clear_env();
    let file = config_file("seats = [");
    set_env("POKERSIM_CONFIG", file.path().to_str().unwrap());
    let (code, _, err) = run(&["cfg"]);
    clear_env();

    assert_eq!(code, 2);
    assert!(err.contains("malformed config file"));
}
