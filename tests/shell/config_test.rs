/*!
 * Configuration Tests
 * Settings read from the process environment
 */

use kubed_sh::ShellConfig;
use serial_test::serial;
use std::time::Duration;

const VARS: [&str; 7] = [
    "KUBEDSH_DEBUG",
    "KUBEDSH_NOPREPULL",
    "KUBECTL_BINARY",
    "KUBEDSH_NAMESPACE",
    "KUBEDSH_GC_INTERVAL_SECS",
    "KUBEDSH_WATCH_INTERVAL_SECS",
    "KUBEDSH_TRACE_JSON",
];

fn clear() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_from_empty_environment() {
    clear();
    let config = ShellConfig::from_env();
    assert!(!config.debug);
    assert!(!config.trace_json);
    assert!(!config.no_prepull);
    assert_eq!(config.kubectl_binary, "kubectl");
    assert_eq!(config.namespace, None);
    assert_eq!(config.gc_interval, Duration::from_secs(30));
    assert_eq!(config.watch_interval, Duration::from_secs(2));
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear();
    std::env::set_var("KUBEDSH_DEBUG", "1");
    std::env::set_var("KUBECTL_BINARY", "/opt/bin/kubectl");
    std::env::set_var("KUBEDSH_NAMESPACE", "team-a");
    std::env::set_var("KUBEDSH_GC_INTERVAL_SECS", "3");
    std::env::set_var("KUBEDSH_NOPREPULL", "1");

    let config = ShellConfig::from_env();
    clear();

    assert!(config.debug);
    assert!(config.no_prepull);
    assert_eq!(config.kubectl_binary, "/opt/bin/kubectl");
    assert_eq!(config.namespace.as_deref(), Some("team-a"));
    // clamped to the minimum period
    assert_eq!(config.gc_interval, Duration::from_secs(10));
}
