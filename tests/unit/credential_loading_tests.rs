//! Unit tests for environment credential loading.

use std::collections::HashMap;

use crash_relay::config::{
    Credentials, RelayConfig, BOT_TOKEN_ENV, SIGNING_SECRET_ENV, WEBHOOK_URL_ENV,
};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn all_credentials_resolve() {
    let creds = Credentials::from_lookup(lookup(&[
        (SIGNING_SECRET_ENV, "secret"),
        (BOT_TOKEN_ENV, " xoxb-token \n"),
        (WEBHOOK_URL_ENV, "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=k"),
    ]))
    .expect("resolves");

    assert_eq!(creds.signing_secret, "secret");
    assert_eq!(creds.bot_token, "xoxb-token");
    assert_eq!(
        creds.webhook_url,
        "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=k"
    );
}

#[test]
fn missing_credential_is_named() {
    let err = Credentials::from_lookup(lookup(&[
        (SIGNING_SECRET_ENV, "secret"),
        (BOT_TOKEN_ENV, "xoxb-token"),
    ]))
    .expect_err("webhook missing");
    assert_eq!(
        err.to_string(),
        "config: required env var WECHAT_BOT_WEBHOOK is not set"
    );
}

#[test]
fn empty_credential_counts_as_missing() {
    let err = Credentials::from_lookup(lookup(&[
        (SIGNING_SECRET_ENV, "   "),
        (BOT_TOKEN_ENV, "xoxb-token"),
        (WEBHOOK_URL_ENV, "https://example.invalid"),
    ]))
    .expect_err("secret blank");
    assert!(err.to_string().contains(SIGNING_SECRET_ENV), "{err}");
}

#[test]
fn debug_output_redacts_secrets() {
    let creds = Credentials::from_lookup(lookup(&[
        (SIGNING_SECRET_ENV, "top-secret"),
        (BOT_TOKEN_ENV, "xoxb-token"),
        (WEBHOOK_URL_ENV, "https://example.invalid/key"),
    ]))
    .expect("resolves");
    let debug = format!("{creds:?}");
    assert!(!debug.contains("top-secret"));
    assert!(!debug.contains("xoxb-token"));
    assert!(debug.contains("<redacted>"));
}

/// Mutates process-global env vars, so it must run serially.
#[test]
#[serial_test::serial]
fn load_credentials_reads_environment() {
    std::env::set_var(SIGNING_SECRET_ENV, "env-secret");
    std::env::set_var(BOT_TOKEN_ENV, "xoxb-env");
    std::env::set_var(WEBHOOK_URL_ENV, "https://example.invalid/env");

    let mut config = RelayConfig::default();
    let result = config.load_credentials();

    std::env::remove_var(SIGNING_SECRET_ENV);
    std::env::remove_var(BOT_TOKEN_ENV);
    std::env::remove_var(WEBHOOK_URL_ENV);

    result.expect("credentials load");
    assert_eq!(config.credentials.signing_secret, "env-secret");
    assert_eq!(config.credentials.bot_token, "xoxb-env");
}

#[test]
#[serial_test::serial]
fn load_credentials_fails_without_environment() {
    std::env::remove_var(SIGNING_SECRET_ENV);
    let mut config = RelayConfig::default();
    let err = config.load_credentials().expect_err("missing");
    assert!(err.to_string().contains(SIGNING_SECRET_ENV), "{err}");
}
