use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmClient, LlmError};

/// Mock LLM client for testing. Replays configured responses in order.
///
/// The last response is repeated once the queue is down to one entry.
/// Every prompt received is recorded for inspection.
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self::with_responses(vec![Ok(response.to_string())])
    }

    pub fn failing(error: LlmError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts().pop()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, _model: &str, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let mut queue = self
            .responses
            .lock()
            .map_err(|_| LlmError::HttpClient("mock lock poisoned".into()))?;
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        next.unwrap_or(Err(LlmError::EmptyResponse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_client_returns_configured_response() {
        let client = MockLlmClient::new("test response");
        let result = client.generate("model", "prompt").await.unwrap();
        assert_eq!(result, "test response");
    }

    #[tokio::test]
    async fn mock_client_replays_in_order_then_repeats_last() {
        let client = MockLlmClient::with_responses(vec![Ok("first".into()), Ok("second".into())]);
        assert_eq!(client.generate("m", "a").await.unwrap(), "first");
        assert_eq!(client.generate("m", "b").await.unwrap(), "second");
        assert_eq!(client.generate("m", "c").await.unwrap(), "second");
        assert_eq!(client.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn mock_client_returns_configured_error() {
        let client = MockLlmClient::failing(LlmError::Timeout(5));
        let err = client.generate("m", "p").await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout(5)));
        assert_eq!(client.last_prompt().as_deref(), Some("p"));
    }
}
