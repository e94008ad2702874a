//! Host resolution against the real process environment.
//!
//! These tests mutate `NDSSERVER`/`LIGONDSIP`, so they run serially.

use nds_client::{resolve_hosts, EnvSelection, HostCandidate, DEFAULT_NDS_HOST, DEFAULT_NDS_PORT};
use nds_core::Epoch;
use serial_test::serial;

fn clear_env() {
    std::env::remove_var("NDSSERVER");
    std::env::remove_var("LIGONDSIP");
    std::env::remove_var("NDSKIT_TESTENV");
}

fn default_host() -> HostCandidate {
    HostCandidate::new(DEFAULT_NDS_HOST, Some(DEFAULT_NDS_PORT))
}

#[test]
#[serial]
fn test_no_env_yields_default_host() {
    clear_env();
    let hosts = resolve_hosts(None, &Epoch::Now, &EnvSelection::Default).unwrap();
    assert_eq!(hosts, vec![default_host()]);
}

#[test]
#[serial]
fn test_primary_env_is_prepended() {
    clear_env();
    std::env::set_var("NDSSERVER", "a:1,b:2");
    let hosts = resolve_hosts(None, &Epoch::Now, &EnvSelection::Default).unwrap();
    clear_env();

    assert_eq!(
        hosts,
        vec![
            HostCandidate::new("a", Some(1)),
            HostCandidate::new("b", Some(2)),
            default_host(),
        ]
    );
}

#[test]
#[serial]
fn test_secondary_env_used_when_primary_unset() {
    clear_env();
    std::env::set_var("LIGONDSIP", "l1nds0");
    let hosts = resolve_hosts(Some("L1"), &Epoch::Now, &EnvSelection::Default).unwrap();
    clear_env();

    assert_eq!(hosts[0], HostCandidate::new("l1nds0", None));
    assert_eq!(hosts.last(), Some(&default_host()));
}

#[test]
#[serial]
fn test_named_env_ignores_defaults() {
    clear_env();
    std::env::set_var("NDSSERVER", "ignored:1");
    std::env::set_var("NDSKIT_TESTENV", "test1.ligo.org:80,test2.ligo.org:43");
    let hosts = resolve_hosts(None, &Epoch::Now, &EnvSelection::named("NDSKIT_TESTENV")).unwrap();
    clear_env();

    assert_eq!(
        hosts,
        vec![
            HostCandidate::new("test1.ligo.org", Some(80)),
            HostCandidate::new("test2.ligo.org", Some(43)),
            default_host(),
        ]
    );
}

#[test]
#[serial]
fn test_disabled_env_ignores_variables() {
    clear_env();
    std::env::set_var("NDSSERVER", "ignored:1");
    let hosts = resolve_hosts(Some("L1"), &Epoch::Now, &EnvSelection::Disabled).unwrap();
    clear_env();

    assert_eq!(
        hosts,
        vec![
            HostCandidate::new("nds.ligo-la.caltech.edu", Some(31200)),
            default_host(),
        ]
    );
}
