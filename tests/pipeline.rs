use bid_analyser::agent::{ChatRequest, RawResponse, Transport, TransportError};
use bid_analyser::config::LlmConfig;
use bid_analyser::session::{PipelineSettings, Session};
use bid_analyser::{summary, Answer, ChunkSplitter, Document, LlmClient};
use std::sync::Mutex;
use std::time::Duration;

const MARKER: &str = "DEADLINE-MARK";
const DEADLINE_ANSWER: &str = "Bids must be submitted by 30 April 2025, 5:00 PM IST.";

/// Answers from the document content: only the chunk holding the marker knows the deadline.
#[derive(Default)]
struct DocumentAwareTransport {
    prompts: Mutex<Vec<String>>,
}

impl DocumentAwareTransport {
    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl Transport for DocumentAwareTransport {
    async fn send(
        &self,
        request: &ChatRequest,
        _api_key: &str,
    ) -> Result<RawResponse, TransportError> {
        let user = request.messages.last().unwrap().content.clone();
        self.prompts.lock().unwrap().push(user.clone());

        let content = if user.contains(MARKER) {
            DEADLINE_ANSWER
        } else {
            "The submission deadline is not mentioned in this section."
        };
        let body = serde_json::json!({"choices": [{"message": {"content": content}}]});
        Ok(RawResponse::new(200, body.to_string()))
    }
}

fn tender_text() -> String {
    let mut text: String = (0..7000)
        .map(|i| if i % 10 == 9 && i != 6999 { ' ' } else { 'a' })
        .collect();
    text.replace_range(6000..6000 + MARKER.len(), MARKER);
    text
}

fn settings() -> PipelineSettings {
    PipelineSettings {
        splitter: ChunkSplitter::new(3000, 300).unwrap(),
        pacing: Duration::ZERO,
        max_retries: 3,
    }
}

fn client() -> LlmClient<DocumentAwareTransport> {
    let config = LlmConfig {
        api_key: Some("test-key".into()),
        ..LlmConfig::default()
    };
    LlmClient::with_transport(DocumentAwareTransport::default(), &config)
}

#[tokio::test]
async fn single_chunk_answer_is_returned_verbatim() {
    let document = Document::from_bytes("tender.txt", tender_text().as_bytes()).unwrap();
    assert_eq!(document.text.len(), 7000);

    let settings = settings();
    let client = client();
    let mut session = Session::new();
    let loaded = session.load(document, &settings.splitter);

    let starts: Vec<usize> = loaded.chunks.iter().map(|c| c.start).collect();
    assert_eq!(starts, vec![0, 2700, 5400]);

    let answer = session
        .ask(&client, &settings, "What is the tender deadline?")
        .await;

    assert_eq!(answer, Answer::Found(DEADLINE_ANSWER.to_string()));
    // One call per chunk, no consolidation.
    assert_eq!(client.transport().calls(), 3);
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().all()[0].answer, DEADLINE_ANSWER);
}

#[tokio::test]
async fn summary_runs_every_chunk_then_consolidates() {
    let document = Document::from_bytes("tender.txt", tender_text().as_bytes()).unwrap();
    let settings = settings();
    let client = client();
    let mut session = Session::new();
    session.load(document, &settings.splitter);

    let text = session.summarize(&client, &settings).await.to_string();

    assert_ne!(text, summary::NO_CONTENT);
    assert_ne!(text, summary::UNABLE_TO_SUMMARIZE);
    assert_eq!(client.transport().calls(), 4);
    assert_eq!(session.summary(), Some(text.as_str()));
}

#[tokio::test]
async fn missing_api_key_degrades_to_sentinels() {
    let document = Document::from_bytes("tender.txt", tender_text().as_bytes()).unwrap();
    let settings = settings();
    let client = LlmClient::with_transport(DocumentAwareTransport::default(), &LlmConfig::default());
    let mut session = Session::new();
    session.load(document, &settings.splitter);

    assert_eq!(
        session.summarize(&client, &settings).await,
        summary::UNABLE_TO_SUMMARIZE
    );
    let answer = session.ask(&client, &settings, "What is the EMD?").await;
    assert_eq!(answer, Answer::NoRelevant);
    assert_eq!(client.transport().calls(), 0);
}
