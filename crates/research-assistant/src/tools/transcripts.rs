//! Earnings call summary tool

use async_trait::async_trait;
use research_llm::{CompletionRequest, LLMProvider, Message};
use research_tools::{Result as ToolResult, Tool};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{normalize_ticker, parse_params};
use crate::analytics::current_quarter;
use crate::api::TranscriptProvider;
use crate::config::ResearchConfig;
use crate::error::{Result, ResearchError};
use crate::prompts::earnings_call_prompt;

const TRANSCRIPT_UNAVAILABLE: &str = "Transcript not found or API limit exceeded.";
const UNPARSEABLE_OUTPUT: &str = "Model output could not be parsed as JSON.";

/// Summarizes the investment signals of an earnings call with a language model
pub struct EarningsCallSummaryTool {
    transcripts: Arc<dyn TranscriptProvider>,
    llm: Arc<dyn LLMProvider>,
    model: String,
    max_tokens: usize,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct TranscriptParams {
    ticker: String,
    #[serde(default)]
    quarter: Option<String>,
}

/// Accepts `YYYYQn` with n in 1..=4
fn validate_quarter(quarter: &str) -> Result<()> {
    let valid = match quarter.split_once('Q') {
        Some((year, q)) => {
            year.len() == 4
                && year.bytes().all(|b| b.is_ascii_digit())
                && matches!(q, "1" | "2" | "3" | "4")
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ResearchError::InvalidParameters(format!(
            "quarter must look like 2024Q1, got '{quarter}'"
        )))
    }
}

/// A document with no transcript entries carries nothing to summarize
fn has_transcript(document: &Value) -> bool {
    match document {
        Value::Object(map) if map.is_empty() => false,
        Value::Object(map) => map
            .get("transcript")
            .is_none_or(|t| t.as_array().is_none_or(|entries| !entries.is_empty())),
        Value::Null => false,
        _ => true,
    }
}

impl EarningsCallSummaryTool {
    pub fn new(
        transcripts: Arc<dyn TranscriptProvider>,
        llm: Arc<dyn LLMProvider>,
        config: &ResearchConfig,
    ) -> Self {
        Self {
            transcripts,
            llm,
            model: config.model.clone(),
            max_tokens: config.llm_max_tokens,
            temperature: config.llm_temperature,
            top_p: config.llm_top_p,
        }
    }

    #[instrument(skip(self))]
    async fn summarize(&self, ticker: &str, quarter: Option<String>) -> Result<Value> {
        let ticker = normalize_ticker(ticker)?;
        let quarter = match quarter {
            Some(q) => {
                let q = q.trim().to_uppercase();
                validate_quarter(&q)?;
                q
            }
            None => current_quarter(),
        };

        let document = match self.transcripts.fetch_transcript(&ticker, &quarter).await {
            Ok(document) if has_transcript(&document) => document,
            Ok(_) | Err(ResearchError::RateLimited { .. }) => {
                info!(%ticker, %quarter, "No transcript to summarize");
                return Err(ResearchError::Upstream(TRANSCRIPT_UNAVAILABLE.to_string()));
            }
            Err(e) => return Err(e),
        };

        let request = CompletionRequest::builder(&self.model)
            .add_message(Message::user(earnings_call_prompt(&document)))
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .top_p(self.top_p)
            .build();

        let response = self.llm.complete(request).await?;
        let text = response.message.text().unwrap_or_default();
        debug!(
            %ticker,
            %quarter,
            output_tokens = response.usage.output_tokens,
            "Received transcript summary"
        );

        serde_json::from_str(text.trim()).map_err(|_| ResearchError::ParseFailure {
            message: UNPARSEABLE_OUTPUT.to_string(),
            raw_output: text.to_string(),
        })
    }
}

#[async_trait]
impl Tool for EarningsCallSummaryTool {
    async fn execute(&self, params: Value) -> ToolResult<Value> {
        let params: TranscriptParams = parse_params(params)?;
        Ok(self.summarize(&params.ticker, params.quarter).await?)
    }

    fn name(&self) -> &str {
        "get_earnings_call_summary"
    }

    fn description(&self) -> &str {
        "Fetch the earnings call transcript for a quarter and summarize new products, \
         management changes and overall sentiment. Defaults to the most recently closed quarter."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "Stock ticker symbol, e.g. IBM"
                },
                "quarter": {
                    "type": "string",
                    "description": "Fiscal quarter as YYYYQn, e.g. 2024Q1",
                    "pattern": "^[0-9]{4}Q[1-4]$"
                }
            },
            "required": ["ticker"]
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::MockTranscriptProvider;
    use mockall::predicate::eq;
    use research_llm::{CompletionResponse, LLMError, StopReason, TokenUsage};
    use std::sync::Mutex;

    /// Replies with canned text and records the requests it saw
    pub(crate) struct StubLlm {
        reply: String,
        pub(crate) requests: Mutex<Vec<CompletionRequest>>,
    }

    impl StubLlm {
        pub(crate) fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for StubLlm {
        async fn complete(&self, request: CompletionRequest) -> research_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            if self.reply == "!fail" {
                return Err(LLMError::ServiceUnavailable("overloaded".to_string()));
            }
            Ok(CompletionResponse {
                message: Message::assistant(self.reply.clone()),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn transcript() -> Value {
        json!({
            "symbol": "IBM",
            "quarter": "2024Q1",
            "transcript": [{"speaker": "Arvind Krishna", "title": "CEO", "content": "We launched watsonx."}]
        })
    }

    fn tool(transcripts: MockTranscriptProvider, llm: Arc<StubLlm>) -> EarningsCallSummaryTool {
        EarningsCallSummaryTool::new(Arc::new(transcripts), llm, &ResearchConfig::default())
    }

    #[test]
    fn test_validate_quarter() {
        assert!(validate_quarter("2024Q1").is_ok());
        assert!(validate_quarter("1999Q4").is_ok());
        assert!(validate_quarter("2024Q5").is_err());
        assert!(validate_quarter("24Q1").is_err());
        assert!(validate_quarter("2024-Q1").is_err());
        assert!(validate_quarter("").is_err());
    }

    #[test]
    fn test_has_transcript() {
        assert!(has_transcript(&transcript()));
        assert!(!has_transcript(&json!({})));
        assert!(!has_transcript(&Value::Null));
        assert!(!has_transcript(&json!({"symbol": "IBM", "transcript": []})));
    }

    #[tokio::test]
    async fn test_json_reply_returned_verbatim() {
        let mut transcripts = MockTranscriptProvider::new();
        transcripts
            .expect_fetch_transcript()
            .with(eq("IBM"), eq("2024Q1"))
            .times(1)
            .returning(|_, _| Ok(transcript()));

        let reply = r#"{"quarter":"2024Q1","summary":"AI growth","new_product":"watsonx","new_management":"none","overall_sentiment":"positive"}"#;
        let llm = Arc::new(StubLlm::replying(reply));
        let tool = tool(transcripts, llm.clone());

        let out = tool.call(json!({"ticker": "ibm", "quarter": "2024q1"})).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["new_product"], "watsonx");
        assert_eq!(value["overall_sentiment"], "positive");

        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 512);
        assert_eq!(requests[0].temperature, Some(0.5));
        assert_eq!(requests[0].top_p, Some(0.9));
        assert!(requests[0].messages[0].text().unwrap().contains("We launched watsonx."));
    }

    #[tokio::test]
    async fn test_unparseable_reply_keeps_raw_output() {
        let mut transcripts = MockTranscriptProvider::new();
        transcripts
            .expect_fetch_transcript()
            .returning(|_, _| Ok(transcript()));
        let tool = tool(transcripts, Arc::new(StubLlm::replying("Here is the summary: great quarter")));

        let out = tool.call(json!({"ticker": "IBM", "quarter": "2024Q1"})).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            value,
            json!({
                "error": "Model output could not be parsed as JSON.",
                "raw_output": "Here is the summary: great quarter"
            })
        );
    }

    #[tokio::test]
    async fn test_rate_limited_transcript() {
        let mut transcripts = MockTranscriptProvider::new();
        transcripts.expect_fetch_transcript().returning(|_, _| {
            Err(ResearchError::RateLimited {
                provider: "Alpha Vantage".to_string(),
            })
        });
        let llm = Arc::new(StubLlm::replying("{}"));
        let tool = tool(transcripts, llm.clone());

        let out = tool.call(json!({"ticker": "IBM"})).await;
        assert_eq!(out, r#"{"error":"Transcript not found or API limit exceeded."}"#);
        assert!(llm.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_transcript() {
        let mut transcripts = MockTranscriptProvider::new();
        transcripts
            .expect_fetch_transcript()
            .returning(|_, _| Ok(json!({})));
        let tool = tool(transcripts, Arc::new(StubLlm::replying("{}")));

        let out = tool.call(json!({"ticker": "IBM", "quarter": "2023Q4"})).await;
        assert_eq!(out, r#"{"error":"Transcript not found or API limit exceeded."}"#);
    }

    #[tokio::test]
    async fn test_default_quarter_is_current() {
        let expected = current_quarter();
        let mut transcripts = MockTranscriptProvider::new();
        transcripts
            .expect_fetch_transcript()
            .withf(move |ticker, quarter| ticker == "IBM" && quarter == expected)
            .returning(|_, _| Ok(transcript()));
        let tool = tool(transcripts, Arc::new(StubLlm::replying("{\"summary\": \"ok\"}")));

        let value: Value = serde_json::from_str(&tool.call(json!({"ticker": "IBM"})).await).unwrap();
        assert_eq!(value["summary"], "ok");
    }

    #[tokio::test]
    async fn test_model_failure() {
        let mut transcripts = MockTranscriptProvider::new();
        transcripts
            .expect_fetch_transcript()
            .returning(|_, _| Ok(transcript()));
        let tool = tool(transcripts, Arc::new(StubLlm::replying("!fail")));

        let value: Value = serde_json::from_str(&tool.call(json!({"ticker": "IBM"})).await).unwrap();
        assert!(value["error"].as_str().unwrap().starts_with("LLM error"));
    }

    #[tokio::test]
    async fn test_invalid_quarter_rejected() {
        let tool = tool(MockTranscriptProvider::new(), Arc::new(StubLlm::replying("{}")));
        let value: Value =
            serde_json::from_str(&tool.call(json!({"ticker": "IBM", "quarter": "Q1-2024"})).await).unwrap();
        assert!(value["error"].as_str().unwrap().starts_with("Invalid parameters"));
    }
}
