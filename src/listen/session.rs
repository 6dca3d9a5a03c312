//! The word-filter page: loaded words, active filter, and selection

use super::{PracticeAudio, PracticeBackend, Selection, Word, WordFilter};
use crate::error::Result;
use crate::notice::Notice;
use tracing::{debug, error};

/// Result of submitting the current selection
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Nothing was selected; no request was made
    Rejected(Notice),
    Generated { audio: PracticeAudio, notice: Notice },
    Failed(Notice),
}

impl SubmitOutcome {
    pub fn notice(&self) -> &Notice {
        match self {
            SubmitOutcome::Rejected(notice) | SubmitOutcome::Failed(notice) => notice,
            SubmitOutcome::Generated { notice, .. } => notice,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WordSession {
    pub words: Vec<Word>,
    pub filter: WordFilter,
    pub selection: Selection,
}

impl WordSession {
    pub fn new(words: Vec<Word>) -> Self {
        Self {
            words,
            ..Default::default()
        }
    }

    pub async fn load<B: PracticeBackend + ?Sized>(backend: &B) -> Result<Self> {
        Ok(Self::new(backend.fetch_words().await?))
    }

    pub fn visible(&self) -> Vec<&Word> {
        self.filter.apply(&self.words)
    }

    pub fn toggle(&mut self, word: &str) {
        self.selection.toggle(word);
    }

    /// Select every word the current filter shows
    pub fn select_visible(&mut self) {
        let visible: Vec<String> = self.visible().iter().map(|w| w.word.clone()).collect();
        for word in visible {
            if !self.selection.contains(&word) {
                self.selection.toggle(&word);
            }
        }
    }

    pub async fn submit<B: PracticeBackend + ?Sized>(&self, backend: &B) -> SubmitOutcome {
        if self.selection.is_empty() {
            return SubmitOutcome::Rejected(Notice::destructive(
                "No words selected",
                "Please select at least one word to submit.",
            ));
        }

        let words = self.selection.to_vec();
        debug!("Selected words: {:?}", words);

        match backend.generate_practice(&words).await {
            Ok(audio) => {
                let notice = Notice::info(
                    "Download started",
                    format!("Your file \"{}\" is being downloaded.", audio.filename),
                );
                SubmitOutcome::Generated { audio, notice }
            }
            Err(e) => {
                error!("Error generating listening practice: {}", e);
                SubmitOutcome::Failed(Notice::destructive(
                    "Generation failed",
                    "There was an error generating the listening practice. Please try again.",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::listen::ListenClient;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session() -> WordSession {
        WordSession::new(vec![Word::new("cat", 5), Word::new("dog", 1)])
    }

    async fn client_for(server: &MockServer) -> ListenClient {
        let mut config = Config::default();
        config.listen.base_url = server.uri();
        ListenClient::new(&config, Some("key".to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_listening_practice"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let outcome = session().submit(&client).await;

        match outcome {
            SubmitOutcome::Rejected(notice) => {
                assert!(notice.is_destructive());
                assert_eq!(notice.title, "No words selected");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        server.verify().await;
    }

    #[tokio::test]
    async fn test_submit_generates_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_listening_practice"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![9u8; 4], "audio/mpeg"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let mut session = session();
        session.toggle("cat");

        match session.submit(&client).await {
            SubmitOutcome::Generated { audio, notice } => {
                assert_eq!(audio.filename, "listening_practice.mp3");
                assert_eq!(audio.bytes.len(), 4);
                assert!(!notice.is_destructive());
                assert!(notice.description.contains("listening_practice.mp3"));
            }
            other => panic!("expected audio, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_listening_practice"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let mut session = session();
        session.toggle("dog");

        let outcome = session.submit(&client).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(outcome.notice().title, "Generation failed");
    }

    #[test]
    fn test_select_visible_only_adds() {
        let mut session = session();
        session.toggle("dog");
        session.filter = WordFilter::new("", 0, None);
        session.select_visible();
        assert_eq!(session.selection.to_vec(), vec!["cat", "dog"]);

        session.filter = WordFilter::new("zzz", 0, None);
        session.select_visible();
        assert_eq!(session.selection.len(), 2);
    }
}
