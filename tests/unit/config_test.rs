//! Tests for configuration layering and per-invocation isolation

use preflight::config::{self, Config, EnvBinding, Environment};
use serial_test::serial;

#[test]
fn test_derived_views_are_independent() {
    let mut base = Config::with_environment(Environment::fixed([("PFLT_LOGLEVEL", "debug")]));
    base.set_harness_defaults();

    let mut a = base.with_env_binding(EnvBinding::harness());
    let b = base.with_env_binding(EnvBinding::harness());
    a.set(config::ARTIFACTS, "only-a");

    assert_eq!(a.get_string(config::ARTIFACTS), "only-a");
    assert_eq!(b.get_string(config::ARTIFACTS), "artifacts");
    assert_eq!(base.get_string(config::ARTIFACTS), "artifacts");
}

#[test]
fn test_environment_ignored_without_binding() {
    let mut base = Config::with_environment(Environment::fixed([("PFLT_LOGLEVEL", "debug")]));
    base.set_harness_defaults();

    assert_eq!(base.get_string(config::LOG_LEVEL), "info");
    let bound = base.with_env_binding(EnvBinding::harness());
    assert_eq!(bound.get_string(config::LOG_LEVEL), "debug");
    assert_eq!(base.get_string(config::LOG_LEVEL), "info");
}

#[test]
fn test_hyphenated_keys_map_to_underscores() {
    let binding = EnvBinding::harness();
    assert_eq!(binding.variable_for("allow-latest"), "PFLT_ALLOW_LATEST");
    assert_eq!(binding.variable_for(config::LOG_FILE), "PFLT_LOGFILE");
}

#[test]
fn test_keys_are_case_insensitive() {
    let mut config = Config::with_environment(Environment::default());
    config.set("LogLevel", "warn");
    assert_eq!(config.get_string(config::LOG_LEVEL), "warn");
}

#[test]
fn test_unparseable_bool_is_false() {
    let mut config = Config::with_environment(Environment::default());
    config.set(config::SUBMIT, "maybe");
    assert!(!config.get_bool(config::SUBMIT));
    config.set(config::SUBMIT, "YES");
    assert!(config.get_bool(config::SUBMIT));
}

#[test]
#[serial(env)]
fn test_process_environment_is_read_through_binding() {
    // SAFETY: serialized with every other test touching the process environment.
    unsafe { std::env::set_var("PFLT_ARTIFACTS", "from-process") };

    let mut config = Config::new();
    config.set_harness_defaults();
    let bound = config.with_env_binding(EnvBinding::harness());
    let value = bound.get_string(config::ARTIFACTS);
    let unbound = config.get_string(config::ARTIFACTS);

    unsafe { std::env::remove_var("PFLT_ARTIFACTS") };
    assert_eq!(value, "from-process");
    assert_eq!(unbound, "artifacts");
}

#[test]
#[serial(env)]
fn test_empty_process_variable_counts_as_unset() {
    // SAFETY: serialized with every other test touching the process environment.
    unsafe { std::env::set_var("PFLT_LOGLEVEL", "") };

    let mut config = Config::new();
    config.set_harness_defaults();
    let value = config.with_env_binding(EnvBinding::harness()).get_string(config::LOG_LEVEL);

    unsafe { std::env::remove_var("PFLT_LOGLEVEL") };
    assert_eq!(value, "info");
}
