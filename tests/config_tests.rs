use std::io::Write;

use alloy_primitives::{address, B256, U256};
use fillwright::domain::DomainTag;
use fillwright::error::{ConfigError, Error};
use fillwright::infrastructure::config::settings::Config;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn full_config_builds_planner_settings() {
    let file = write_temp_config(
        r#"
[network]
rpc_url = "https://rpc.example.org"
chain_id = 8453

[exchange]
settlement = "0x0000000000000068F116a894984e2DB1123eB395"
max_allowance = "1000000000"
domain = "opensea.io"

[[exchange.conduits]]
key = "0x0000007b02230091a7ed01230072f7006a004d60a8d4e71d599b8104250f0000"
address = "0x1E0049783F008A0085193E00003D00cd54003c71"

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = Config::load(file.path()).unwrap();
    let settings = config.planner_settings().unwrap();

    assert_eq!(config.network.chain_id, 8453);
    assert_eq!(settings.max_allowance, U256::from(1_000_000_000u64));
    assert_eq!(settings.domain_tag, Some(DomainTag::from_domain("opensea.io")));

    let key: B256 = "0x0000007b02230091a7ed01230072f7006a004d60a8d4e71d599b8104250f0000"
        .parse()
        .unwrap();
    assert_eq!(
        settings.operator_for(key).unwrap(),
        address!("1E0049783F008A0085193E00003D00cd54003c71")
    );
}

#[test]
fn missing_file_is_a_read_error() {
    let result = Config::load("/nonexistent/fillwright.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn zero_settlement_is_rejected() {
    let file = write_temp_config(
        r#"
[exchange]
settlement = "0x0000000000000000000000000000000000000000"
"#,
    );

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "settlement",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid settlement error, got {err}"),
        Ok(_) => panic!("Expected zero settlement to be rejected"),
    }
}

#[test]
fn zero_conduit_key_is_rejected() {
    let file = write_temp_config(
        r#"
[[exchange.conduits]]
key = "0x0000000000000000000000000000000000000000000000000000000000000000"
address = "0x1E0049783F008A0085193E00003D00cd54003c71"
"#,
    );

    let result = Config::load(file.path());
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "conduits",
            ..
        }))
    ));
}

#[test]
fn malformed_domain_tag_is_rejected() {
    let file = write_temp_config(
        r#"
[exchange]
domain_tag = "0x1234"
"#,
    );

    let result = Config::load(file.path());
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "domain_tag",
            ..
        }))
    ));
}

#[test]
fn unparseable_rpc_url_is_rejected() {
    let file = write_temp_config(
        r#"
[network]
rpc_url = "not a url"
"#,
    );

    assert!(Config::load(file.path()).is_err());
}
