//! UpdateCaCertificates failure classes.

use anchor::error::TrustStoreError;
use anchor::platform::unix::UpdateCaCertificates;
use anchor::platform::CacheRefresher;

fn trust_store_error(err: &anyhow::Error) -> Option<&TrustStoreError> {
    err.chain().find_map(|e| e.downcast_ref::<TrustStoreError>())
}

#[test]
fn missing_binary_is_command_not_found() {
    let refresher = UpdateCaCertificates::new("anchor-no-such-update-ca-certificates");

    let err = refresher.refresh().unwrap_err();

    match trust_store_error(&err) {
        Some(TrustStoreError::CommandNotFound { command }) => {
            assert_eq!(command, "anchor-no-such-update-ca-certificates")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn non_zero_exit_is_refresh_failed() {
    let refresher = UpdateCaCertificates::new("false");

    let err = refresher.refresh().unwrap_err();

    match trust_store_error(&err) {
        Some(TrustStoreError::RefreshFailed { command, status }) => {
            assert_eq!(command, "false");
            assert!(!status.success());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn zero_exit_succeeds() {
    let refresher = UpdateCaCertificates::new("true");
    assert_eq!(refresher.command(), "true");
    refresher.refresh().unwrap();
}
