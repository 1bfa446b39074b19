//! Administrative requests: the model summarises the request into labelled
//! lines, and the request is appended to the durable action log before the
//! user gets a confirmation.

use crate::error::AssistantError;
use crate::models::ActionSummary;
use crate::prompts;
use chrono::{NaiveDateTime, Timelike};
use providers::LlmProvider;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::action_log::{self, ActionLogRow};
use storage::StorageError;
use tokio::sync::Mutex;
use tracing::info;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub timestamp: NaiveDateTime,
    pub raw_request: String,
    pub extracted_summary: String,
}

impl ActionRecord {
    /// Single-line form stored in the log.
    pub fn to_row(&self) -> ActionLogRow {
        ActionLogRow {
            timestamp: self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            request: self.raw_request.clone(),
            summary: flatten_summary(&self.extracted_summary),
        }
    }
}

pub fn flatten_summary(summary: &str) -> String {
    summary.replace("\r\n", "\n").replace('\n', " | ")
}

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock, matching what staff see when reading the log.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

#[async_trait::async_trait]
pub trait ActionRecorder: Send + Sync {
    /// Stamps and durably stores one request. Returns the stored record.
    async fn record(
        &self,
        raw_request: &str,
        extracted_summary: &str,
    ) -> Result<ActionRecord, StorageError>;
}

/// CSV-backed recorder. Appends are serialised and timestamps never go
/// backwards within one recorder, even if the wall clock does.
pub struct CsvActionLog {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    last: Mutex<Option<NaiveDateTime>>,
}

impl CsvActionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    pub fn with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
            last: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ActionRecorder for CsvActionLog {
    async fn record(
        &self,
        raw_request: &str,
        extracted_summary: &str,
    ) -> Result<ActionRecord, StorageError> {
        let mut last = self.last.lock().await;
        let now = self.clock.now();
        // The log has second resolution.
        let now = now.with_nanosecond(0).unwrap_or(now);
        let timestamp = match *last {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        let record = ActionRecord {
            timestamp,
            raw_request: raw_request.to_string(),
            extracted_summary: extracted_summary.to_string(),
        };
        let path = self.path.clone();
        let row = record.to_row();
        // Holding `last` across the append keeps rows in timestamp order.
        tokio::task::spawn_blocking(move || action_log::append_row(&path, &row))
            .await
            .map_err(|e| StorageError::Io(io::Error::new(io::ErrorKind::Other, e)))??;
        *last = Some(timestamp);
        info!(
            path = %self.path.display(),
            timestamp = %record.timestamp,
            "recorded action request"
        );
        Ok(record)
    }
}

/// Outcome of a recorded request.
#[derive(Debug, Clone)]
pub struct RecordedAction {
    pub record: ActionRecord,
    pub summary: ActionSummary,
    /// Text shown to the user.
    pub confirmation: String,
}

/// Summarises `user_text`, records it, and builds the confirmation shown to
/// the user. The confirmation is only produced after the append succeeded.
pub async fn extract_and_record(
    llm: &dyn LlmProvider,
    recorder: &dyn ActionRecorder,
    user_text: &str,
) -> Result<RecordedAction, AssistantError> {
    let prompt = prompts::extraction_prompt(user_text);
    let summary = llm
        .complete(&prompt)
        .await
        .map_err(AssistantError::Extraction)?;
    let summary = summary.trim();
    let fields = ActionSummary::parse(summary);
    let record = recorder.record(user_text, summary).await?;
    info!(
        first_name = fields.first_name.as_deref().unwrap_or(""),
        last_name = fields.last_name.as_deref().unwrap_or(""),
        action = fields.action.as_deref().unwrap_or(""),
        "action request accepted"
    );
    Ok(RecordedAction {
        record,
        summary: fields,
        confirmation: prompts::confirmation(summary),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedLlm;
    use chrono::NaiveDate;
    use std::sync::Mutex as StdMutex;

    const JEAN: &str = "Prénom : Jean\nNom : Dupont\nAction demandée : Inscription en informatique\nDate : 02/09/2024";

    /// Returns the queued instants in order, repeating the last one.
    struct StepClock(StdMutex<Vec<NaiveDateTime>>);

    impl StepClock {
        fn new(times: Vec<NaiveDateTime>) -> Self {
            let mut times = times;
            times.reverse();
            Self(StdMutex::new(times))
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> NaiveDateTime {
            let mut times = self.0.lock().unwrap();
            if times.len() > 1 {
                times.pop().unwrap()
            } else {
                times[0]
            }
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn row_flattens_summary() {
        let record = ActionRecord {
            timestamp: at(9, 30, 0),
            raw_request: "Je veux m'inscrire".into(),
            extracted_summary: "Prénom : Jean\nNom : Dupont".into(),
        };
        let row = record.to_row();
        assert_eq!(row.timestamp, "2024-09-02 09:30:00");
        assert_eq!(row.summary, "Prénom : Jean | Nom : Dupont");
    }

    #[tokio::test]
    async fn n_calls_append_n_rows_with_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demandes.csv");
        let clock = Arc::new(StepClock::new(vec![at(10, 0, 0), at(10, 0, 0), at(10, 0, 3)]));
        let log = CsvActionLog::with_clock(&path, clock);

        for i in 0..5 {
            log.record(&format!("demande {i}"), "Prénom : Jean").await.unwrap();
        }

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.matches("timestamp,demande,résumé").count(), 1);
        let rows = action_log::read_rows(&path).unwrap();
        assert_eq!(rows.len(), 5);
        let stamps: Vec<_> = rows.iter().map(|r| r.timestamp.clone()).collect();
        let mut sorted = stamps.clone();
        sorted.sort();
        assert_eq!(stamps, sorted);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_records_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demandes.csv");
        let log = Arc::new(CsvActionLog::new(&path));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    log.record(&format!("demande, \"{i}\""), "Prénom : Jean\nNom : Dupont")
                        .await
                        .unwrap()
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.matches("timestamp,demande,résumé").count(), 1);
        let rows = action_log::read_rows(&path).unwrap();
        assert_eq!(rows.len(), 16);
        assert!(rows.iter().all(|r| r.summary == "Prénom : Jean | Nom : Dupont"));
        assert!(rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn clock_going_backwards_keeps_previous_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demandes.csv");
        let clock = Arc::new(StepClock::new(vec![at(12, 0, 0), at(11, 59, 0)]));
        let log = CsvActionLog::with_clock(&path, clock);

        let first = log.record("a", "s").await.unwrap();
        let second = log.record("b", "s").await.unwrap();
        assert_eq!(first.timestamp, at(12, 0, 0));
        assert_eq!(second.timestamp, at(12, 0, 0));
    }

    #[tokio::test]
    async fn extract_and_record_confirms_after_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("demandes.csv");
        let log = CsvActionLog::new(&path);
        let llm = ScriptedLlm::new([format!("  {JEAN}\n")]);
        let text = "Je m'appelle Jean Dupont et je veux m'inscrire en informatique";

        let outcome = extract_and_record(&llm, &log, text).await.unwrap();

        let reply = &outcome.confirmation;
        assert!(reply.contains("bien été enregistrée"));
        assert!(reply.contains("Prénom : Jean"));
        assert!(reply.contains("Nom : Dupont"));
        assert_eq!(outcome.summary.first_name.as_deref(), Some("Jean"));
        assert_eq!(outcome.summary.last_name.as_deref(), Some("Dupont"));
        assert_eq!(outcome.record.raw_request, text);
        let rows = action_log::read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].request, text);
        assert!(rows[0].summary.starts_with("Prénom : Jean | Nom : Dupont | "));
    }

    #[tokio::test]
    async fn failed_append_is_not_confirmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demandes.csv");
        std::fs::create_dir_all(&path).unwrap();
        let log = CsvActionLog::new(&path);
        let llm = ScriptedLlm::new([JEAN]);

        let err = extract_and_record(&llm, &log, "inscription").await.unwrap_err();
        assert!(matches!(err, AssistantError::Persistence(_)));
    }

    #[tokio::test]
    async fn extraction_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demandes.csv");
        let log = CsvActionLog::new(&path);
        let llm = ScriptedLlm::failing("quota exceeded");

        let err = extract_and_record(&llm, &log, "inscription").await.unwrap_err();
        assert!(matches!(err, AssistantError::Extraction(_)));
        assert!(!path.exists());
    }
}
