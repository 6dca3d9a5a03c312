//! Word list and listening-practice commands

use crate::config::Config;
use crate::error::Result;
use crate::listen::{PracticeBackend, SubmitOutcome, Word, WordFilter, WordSession};
use crate::notice::Notice;
use crate::progress::InFlight;
use chrono::Local;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Filtered view of the word list
#[derive(Debug, Clone, Serialize)]
pub struct WordListing {
    pub filter: WordFilter,
    pub words: Vec<Word>,
    pub total: usize,
}

pub async fn cmd_words<B: PracticeBackend + ?Sized>(
    backend: &B,
    filter: WordFilter,
) -> Result<WordListing> {
    let session = {
        let _spinner = InFlight::start("Loading words...");
        WordSession::load(backend).await?
    };
    let words: Vec<Word> = filter.apply(&session.words).into_iter().cloned().collect();
    Ok(WordListing {
        total: words.len(),
        filter,
        words,
    })
}

/// Print the word table
pub fn print_words(listing: &WordListing) {
    println!("\n{:<24} {:>7}  {}", "Word", "Count", "Last Updated");
    for word in &listing.words {
        let updated = word
            .updated_at
            .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<24} {:>7}  {}", word.word, word.count, updated);
    }
    println!("\nTotal words: {}", listing.total);
}

/// Practice options
#[derive(Debug, Clone, Default)]
pub struct PracticeOptions {
    /// Words toggled on explicitly
    pub words: Vec<String>,
    pub filter: WordFilter,
    /// Also select every word the filter shows
    pub all_matching: bool,
    pub output_dir: Option<PathBuf>,
}

/// Result of a practice run
#[derive(Debug, Clone, Serialize)]
pub struct PracticeReport {
    pub notice: Notice,
    pub saved_to: Option<PathBuf>,
    pub selected: Vec<String>,
}

pub async fn cmd_practice<B: PracticeBackend + ?Sized>(
    config: &Config,
    backend: &B,
    options: PracticeOptions,
) -> Result<PracticeReport> {
    let mut session = if options.all_matching {
        let _spinner = InFlight::start("Loading words...");
        WordSession::load(backend).await?
    } else {
        WordSession::default()
    };
    session.filter = options.filter;

    for word in &options.words {
        if !session.selection.contains(word) {
            session.toggle(word);
        }
    }
    if options.all_matching {
        session.select_visible();
    }
    let selected = session.selection.to_vec();

    let outcome = {
        let _spinner = InFlight::start("Submitting...");
        session.submit(backend).await
    };

    match outcome {
        SubmitOutcome::Generated { audio, notice } => {
            let dir = options.output_dir.unwrap_or_else(|| config.output_dir());
            std::fs::create_dir_all(&dir)?;
            let path = dir.join(&audio.filename);
            std::fs::write(&path, &audio.bytes)?;
            info!("Wrote {} bytes to {:?}", audio.bytes.len(), path);
            Ok(PracticeReport {
                notice,
                saved_to: Some(path),
                selected,
            })
        }
        SubmitOutcome::Rejected(notice) | SubmitOutcome::Failed(notice) => Ok(PracticeReport {
            notice,
            saved_to: None,
            selected,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listen::PracticeAudio;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeBackend {
        generate_calls: AtomicUsize,
    }

    #[async_trait]
    impl PracticeBackend for FakeBackend {
        async fn fetch_words(&self) -> Result<Vec<Word>> {
            Ok(vec![
                Word::new("cat", 5),
                Word::new("dog", 1),
                Word::new("catch", 8),
            ])
        }

        async fn generate_practice(&self, words: &[String]) -> Result<PracticeAudio> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(PracticeAudio {
                bytes: words.join(" ").into_bytes(),
                filename: "drill.mp3".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_cmd_words_filters() {
        let backend = FakeBackend::default();
        let listing = cmd_words(&backend, WordFilter::new("CAT", 6, None))
            .await
            .unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.words[0].word, "catch");
    }

    #[tokio::test]
    async fn test_practice_all_matching_writes_file() {
        let tmp = TempDir::new().unwrap();
        let backend = FakeBackend::default();
        let options = PracticeOptions {
            filter: WordFilter::new("cat", 0, None),
            all_matching: true,
            output_dir: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };

        let report = cmd_practice(&Config::default(), &backend, options)
            .await
            .unwrap();
        let path = report.saved_to.expect("file should be written");
        assert_eq!(path, tmp.path().join("drill.mp3"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "cat catch");
        assert_eq!(report.selected, vec!["cat", "catch"]);
    }

    #[tokio::test]
    async fn test_practice_without_selection_makes_no_call() {
        let backend = FakeBackend::default();
        let options = PracticeOptions {
            filter: WordFilter::new("zebra", 0, None),
            all_matching: true,
            ..Default::default()
        };

        let report = cmd_practice(&Config::default(), &backend, options)
            .await
            .unwrap();
        assert!(report.notice.is_destructive());
        assert!(report.saved_to.is_none());
        assert_eq!(backend.generate_calls.load(Ordering::SeqCst), 0);
    }
}
