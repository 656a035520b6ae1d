//! Provider selection from model specs and credentials.

use std::collections::BTreeMap;

use order_parser::config::ModelConfig;
use order_parser::credentials::Credentials;
use order_parser::providers::{parse_model_spec, LlmProvider};
use order_parser::providers::router::{build_provider, RouterError};

fn creds(pairs: &[(&str, &str)]) -> Credentials {
    Credentials::from_map(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn model(spec: &str) -> ModelConfig {
    ModelConfig {
        spec: spec.to_owned(),
        ..ModelConfig::default()
    }
}

#[test]
fn parse_model_spec_splits_on_first_slash() {
    let parsed = parse_model_spec("gemini/gemini-3-flash-preview").expect("should parse");
    assert_eq!(parsed, ("gemini", "gemini-3-flash-preview"));
    let nested = parse_model_spec("openai/org/model").expect("should parse");
    assert_eq!(nested, ("openai", "org/model"));
}

#[test]
fn parse_model_spec_rejects_malformed() {
    assert!(parse_model_spec("gemini").is_err());
    assert!(parse_model_spec("/model").is_err());
    assert!(parse_model_spec("gemini/").is_err());
}

#[test]
fn default_spec_builds_gemini_with_key() {
    let provider = build_provider(
        &ModelConfig::default(),
        &creds(&[("GEMINI_API_KEY", "g-key")]),
    );
    match provider {
        Ok(p) => assert_eq!(p.model_id(), "gemini/gemini-3-flash-preview"),
        Err(err) => panic!("gemini provider should build: {err}"),
    }
}

#[test]
fn gemini_falls_back_to_api_key() {
    let provider = build_provider(&model("gemini/g"), &creds(&[("API_KEY", "k")]));
    assert!(provider.is_ok());
}

#[test]
fn gemini_without_key_is_missing_credential() {
    let provider = build_provider(&model("gemini/g"), &creds(&[("GEMINI_API_KEY", "  ")]));
    assert!(matches!(
        provider,
        Err(RouterError::MissingCredential { ref key, .. }) if key == "GEMINI_API_KEY"
    ));
}

#[test]
fn openai_requires_its_own_key() {
    let missing = build_provider(&model("openai/gpt-test"), &creds(&[("GEMINI_API_KEY", "g")]));
    assert!(matches!(
        missing,
        Err(RouterError::MissingCredential { ref key, .. }) if key == "OPENAI_API_KEY"
    ));

    let built = build_provider(&model("openai/gpt-test"), &creds(&[("OPENAI_API_KEY", "o")]));
    match built {
        Ok(p) => assert_eq!(p.model_id(), "openai/gpt-test"),
        Err(err) => panic!("openai provider should build: {err}"),
    }
}

#[test]
fn unknown_provider_and_bad_spec_are_rejected() {
    let all = creds(&[("GEMINI_API_KEY", "g"), ("OPENAI_API_KEY", "o")]);
    assert!(matches!(
        build_provider(&model("mistral/large"), &all),
        Err(RouterError::UnsupportedProvider { ref provider }) if provider == "mistral"
    ));
    assert!(matches!(
        build_provider(&model("no-slash"), &all),
        Err(RouterError::InvalidModelSpec { .. })
    ));
}
