//! Prompt templates for model-backed tools

use serde_json::Value;

/// Placeholder replaced by the transcript document
const TRANSCRIPT_SLOT: &str = "{transcript}";

/// Analyst prompt for summarizing one earnings call transcript
pub const EARNINGS_CALL_PROMPT: &str = r"You are an expert financial analyst tasked with summarizing key investment-related developments from a quarterly earnings call transcript.

Your job is to analyze the transcript enclosed in <transcript> tags and identify signals that could positively impact the company's stock price. Focus especially on announcements related to:
- New product launches
- Management changes
- Positive business developments or guidance

Only base your analysis on the transcript content. If there are no such signals, say so explicitly.
Prioritize insights from company spokespersons (e.g., CEO, CFO) over external analysts or moderators.

Your output must include valid JSON with keys: quarter, summary, new_product, new_management, overall_sentiment.

<transcript>
{transcript}
</transcript>";

/// Render the earnings call prompt with the transcript embedded as JSON
pub fn earnings_call_prompt(transcript: &Value) -> String {
    EARNINGS_CALL_PROMPT.replacen(TRANSCRIPT_SLOT, &transcript.to_string(), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transcript_embedded_as_json() {
        let transcript = json!({
            "symbol": "IBM",
            "quarter": "2024Q1",
            "transcript": [{"speaker": "CEO", "content": "Record {quarter}"}]
        });
        let prompt = earnings_call_prompt(&transcript);
        assert!(prompt.contains(r#""symbol":"IBM""#));
        assert!(prompt.contains("<transcript>\n{"));
        assert!(!prompt.contains(TRANSCRIPT_SLOT));
        assert!(prompt.contains("quarter, summary, new_product, new_management, overall_sentiment"));
    }
}
