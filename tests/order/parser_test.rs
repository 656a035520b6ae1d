//! Parse operation against a scripted provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use order_parser::history::HistoryStore;
use order_parser::order::prompt::SYSTEM_INSTRUCTION;
use order_parser::order::{OrderBlock, OrderParser, ParseError};
use order_parser::providers::{
    CompletionRequest, CompletionResponse, LlmProvider, ProviderError, UsageStats,
};

/// Replies with fixed text (or a fixed error) and records every request.
struct ScriptedProvider {
    reply: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_owned()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request);
        }
        match &self.reply {
            Some(text) => Ok(CompletionResponse {
                text: text.clone(),
                model: "test/mock".to_owned(),
                usage: UsageStats {
                    input_tokens: 10,
                    output_tokens: 5,
                },
            }),
            None => Err(ProviderError::HttpStatus {
                status: 503,
                body: "overloaded".to_owned(),
            }),
        }
    }

    fn model_id(&self) -> &str {
        "test/mock"
    }
}

const REPLY: &str =
    "```\n\t\t\tJane Doe\t\t1 Elm St\tAustin\tTX\t78701\tUS\t\tWHITE-WT-M\t2\n```\n\u{2705} Address valid, USPS compliant.";

#[tokio::test]
async fn parse_order_sends_instruction_and_trimmed_input() {
    let provider = ScriptedProvider::replying(REPLY);
    let parser = OrderParser::new(provider.clone());

    let blocks = parser
        .parse_order("  Jane Doe, 1 Elm St, Austin TX  \n")
        .await
        .expect("reply should parse");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].row().get(order_parser::order::Column::Quantity), "2");

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].input, "Jane Doe, 1 Elm St, Austin TX");
    assert_eq!(requests[0].system.as_deref(), Some(SYSTEM_INSTRUCTION));
    assert_eq!(requests[0].temperature, Some(0.0));
    assert_eq!(requests[0].max_tokens, None);
}

#[tokio::test]
async fn parse_order_honours_temperature_and_token_cap() {
    let provider = ScriptedProvider::replying(REPLY);
    let parser = OrderParser::new(provider.clone())
        .with_temperature(0.5)
        .with_max_tokens(Some(512));

    parser.parse_order("order").await.expect("reply should parse");
    let requests = provider.requests();
    assert_eq!(requests[0].temperature, Some(0.5));
    assert_eq!(requests[0].max_tokens, Some(512));
}

#[tokio::test]
async fn blank_input_makes_no_call() {
    let provider = ScriptedProvider::replying(REPLY);
    let parser = OrderParser::new(provider.clone());

    let err = parser.parse_order(" \n\t ").await.expect_err("blank input must fail");
    assert!(matches!(err, ParseError::EmptyInput));
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn unusable_reply_is_no_blocks() {
    let parser = OrderParser::new(ScriptedProvider::replying("I can't read this order."));
    let err = parser.parse_order("garbage").await.expect_err("should fail");
    assert!(matches!(err, ParseError::NoBlocks));
}

#[tokio::test]
async fn empty_reply_is_no_blocks() {
    let parser = OrderParser::new(ScriptedProvider::replying(""));
    let err = parser.parse_order("order").await.expect_err("should fail");
    assert!(matches!(err, ParseError::NoBlocks));
}

#[tokio::test]
async fn provider_failure_surfaces() {
    let parser = OrderParser::new(ScriptedProvider::failing());
    let err = parser.parse_order("order").await.expect_err("should fail");
    assert!(matches!(
        err,
        ParseError::Provider(ProviderError::HttpStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn parse_into_prepends_and_persists() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("history.json");
    let mut history = HistoryStore::open(&path);
    let parser = OrderParser::new(ScriptedProvider::replying(REPLY));

    let first = parser
        .parse_into(&mut history, "first order")
        .await
        .expect("first parse");
    let second = parser
        .parse_into(&mut history, "  second order ")
        .await
        .expect("second parse");

    assert_ne!(first.id, second.id);
    assert_eq!(second.original_text, "second order");
    assert_eq!(history.entries()[0].id, second.id);
    assert_eq!(history.entries()[1].id, first.id);

    let reopened = HistoryStore::open(&path);
    assert_eq!(reopened.entries(), history.entries());
}

#[tokio::test]
async fn failed_parse_leaves_history_untouched() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("history.json");
    let mut history = HistoryStore::open(&path);
    let parser = OrderParser::new(ScriptedProvider::replying("nope"));

    let result = parser.parse_into(&mut history, "order").await;
    assert!(matches!(result, Err(ParseError::NoBlocks)));
    assert!(history.is_empty());
    assert!(!path.exists());
}

#[tokio::test]
async fn blocks_copy_round_through_history() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let mut history = HistoryStore::open(tmp.path().join("h.json"));
    let parser = OrderParser::new(ScriptedProvider::replying(REPLY));
    let result = parser
        .parse_into(&mut history, "order")
        .await
        .expect("should parse");

    let expected = OrderBlock::new(
        "\t\t\tJane Doe\t\t1 Elm St\tAustin\tTX\t78701\tUS\t\tWHITE-WT-M\t2",
        "\u{2705} Address valid, USPS compliant.",
    );
    assert_eq!(result.blocks, vec![expected]);
}

#[tokio::test]
async fn unsaved_parse_is_not_recorded() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, "not a directory").expect("should write");
    let mut history = HistoryStore::open(blocker.join("history.json"));
    let parser = OrderParser::new(ScriptedProvider::replying(REPLY));

    let result = parser.parse_into(&mut history, "order").await;
    assert!(matches!(result, Err(ParseError::History(_))));
    assert!(history.is_empty());
}
