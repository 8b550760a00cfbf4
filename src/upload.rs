//! Spreadsheet upload.
//!
//! An upload moves through a small state machine:
//!
//! ```text
//! Idle ──start()──► Uploading ──(delay, decode, extract)──┬─► Success
//!                       ▲                                  └─► Error(message)
//!                       └──── start() again: the pending attempt is dropped
//! ```
//!
//! The file name is checked against the accepted suffixes before anything
//! else. A rejected file never reaches `Uploading`. Accepted files are decoded
//! by the [`RowDecoder`] registered for their suffix after the configured
//! delay. A suffix that is accepted but has no decoder fails at that point
//! with [`UploadError::NoDecoder`].
//!
//! Starting a new upload while one is pending cancels the pending one; only
//! the newest attempt ever produces a terminal state.

use crate::config::UploadConfig;
use crate::extract::{CsvDecoder, DecodeError, ExtractError, RowDecoder, XlsxDecoder, extract};
use crate::task::{DelayedTask, TaskError};
use crate::types::ContentRecord;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Unsupported file {file}: expected one of {accepted}")]
    UnsupportedSuffix { file: String, accepted: String },
    #[error("No decoder available for {0} files")]
    NoDecoder(String),
    #[error("Could not read spreadsheet: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("Upload did not finish: {0}")]
    Interrupted(#[from] TaskError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    Error(String),
}

/// What a finished upload produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub record: ContentRecord,
    /// Header names in the sheet that matched no known column.
    pub ignored: Vec<String>,
}

type Outcome = Result<Extracted, UploadError>;

/// Drives one upload slot.
pub struct Uploader {
    accepted: Vec<String>,
    delay: Duration,
    decoders: Vec<Arc<dyn RowDecoder>>,
    status: UploadStatus,
    pending: Option<DelayedTask<Outcome>>,
}

impl Uploader {
    /// An uploader with the bundled `.xlsx` and `.csv` decoders registered.
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            accepted: config.accepted_suffixes.clone(),
            delay: config.delay(),
            decoders: vec![Arc::new(XlsxDecoder), Arc::new(CsvDecoder)],
            status: UploadStatus::Idle,
            pending: None,
        }
    }

    /// Register another decoder. Later registrations win for the same suffix.
    pub fn with_decoder(mut self, decoder: Arc<dyn RowDecoder>) -> Self {
        self.decoders.insert(0, decoder);
        self
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    /// The accepted suffix `file_name` ends with, compared case-insensitively.
    pub fn accepted_suffix(&self, file_name: &str) -> Option<&str> {
        let lower = file_name.to_lowercase();
        self.accepted
            .iter()
            .find(|s| lower.ends_with(&s.to_lowercase()))
            .map(String::as_str)
    }

    /// Begin processing a file. Fails right away if its suffix is not accepted.
    pub fn start(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<(), UploadError> {
        let suffix = self.gate(file_name)?;

        if let Some(mut previous) = self.pending.take() {
            previous.cancel();
            tracing::warn!("superseded a pending upload");
        }

        let decoder = self.decoder_for(&suffix);
        tracing::info!(
            file = file_name,
            delay_ms = self.delay.as_millis() as u64,
            "upload started"
        );
        self.status = UploadStatus::Uploading;
        self.pending = Some(DelayedTask::spawn(self.delay, move || {
            decode_and_extract(decoder, suffix, &bytes)
        }));
        Ok(())
    }

    /// Gate, decode and extract in the calling thread, without the delay or
    /// any status change.
    pub fn extract_now(&self, file_name: &str, bytes: &[u8]) -> Outcome {
        let suffix = self.gate(file_name)?;
        decode_and_extract(self.decoder_for(&suffix), suffix, bytes)
    }

    /// Lowercased accepted suffix, or the rejection error.
    fn gate(&self, file_name: &str) -> Result<String, UploadError> {
        match self.accepted_suffix(file_name) {
            Some(suffix) => Ok(suffix.to_lowercase()),
            None => {
                tracing::debug!(file = file_name, "rejected upload by suffix");
                Err(UploadError::UnsupportedSuffix {
                    file: file_name.to_string(),
                    accepted: self.accepted.join(", "),
                })
            }
        }
    }

    fn decoder_for(&self, suffix: &str) -> Option<Arc<dyn RowDecoder>> {
        self.decoders
            .iter()
            .find(|d| d.suffix().eq_ignore_ascii_case(suffix))
            .cloned()
    }

    /// The outcome, if the pending upload has finished. Never blocks.
    pub fn poll(&mut self) -> Option<Outcome> {
        let outcome = match self.pending.as_mut()?.try_take() {
            Ok(None) => return None,
            Ok(Some(outcome)) => outcome,
            Err(e) => Err(e.into()),
        };
        self.pending = None;
        Some(self.finish(outcome))
    }

    /// Block until the pending upload finishes.
    pub fn wait(&mut self) -> Option<Outcome> {
        let outcome = self.pending.take()?.wait().unwrap_or_else(|e| Err(e.into()));
        Some(self.finish(outcome))
    }

    fn finish(&mut self, outcome: Outcome) -> Outcome {
        self.status = match &outcome {
            Ok(done) => {
                tracing::info!(tiles = done.record.tiles.len(), "upload succeeded");
                UploadStatus::Success
            }
            Err(e) => {
                tracing::info!(error = %e, "upload failed");
                UploadStatus::Error(e.to_string())
            }
        };
        outcome
    }
}

fn decode_and_extract(
    decoder: Option<Arc<dyn RowDecoder>>,
    suffix: String,
    bytes: &[u8],
) -> Outcome {
    let decoder = decoder.ok_or(UploadError::NoDecoder(suffix))?;
    let rows = decoder.decode(bytes)?;
    let ignored = rows
        .first()
        .map(|row| row.ignored().to_vec())
        .unwrap_or_default();
    Ok(Extracted {
        record: extract(&rows)?,
        ignored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::TabularRow;
    use crate::test_helpers::*;
    use std::time::Instant;

    struct PanickingDecoder;

    impl RowDecoder for PanickingDecoder {
        fn suffix(&self) -> &str {
            ".csv"
        }

        fn decode(&self, _bytes: &[u8]) -> Result<Vec<TabularRow>, DecodeError> {
            panic!("decoder crashed")
        }
    }

    fn instant_config() -> UploadConfig {
        UploadConfig {
            delay_ms: 0,
            ..UploadConfig::default()
        }
    }

    #[test]
    fn csv_upload_succeeds() {
        let mut uploader = Uploader::new(&instant_config());
        uploader
            .start("employer.csv", full_csv(3).into_bytes())
            .unwrap();
        assert_eq!(uploader.status(), &UploadStatus::Uploading);

        let record = uploader.wait().unwrap().unwrap().record;
        assert_eq!(record.company_name, "ABC Manufacturing Corp");
        assert_eq!(record.tiles.len(), 3);
        assert_eq!(uploader.status(), &UploadStatus::Success);
    }

    #[test]
    fn unaccepted_suffix_never_starts() {
        let mut uploader = Uploader::new(&instant_config());
        let err = uploader.start("employer.pdf", vec![]).unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedSuffix { .. }));
        assert_eq!(uploader.status(), &UploadStatus::Idle);
        assert!(uploader.wait().is_none());
    }

    #[test]
    fn suffix_check_ignores_case() {
        let uploader = Uploader::new(&instant_config());
        assert_eq!(uploader.accepted_suffix("DATA.XLSX"), Some(".xlsx"));
        assert_eq!(uploader.accepted_suffix("data.xlsx.txt"), None);
    }

    #[test]
    fn accepted_suffix_without_decoder_is_an_error_state() {
        let config = UploadConfig {
            accepted_suffixes: vec![".ods".into()],
            delay_ms: 0,
        };
        let mut uploader = Uploader::new(&config);
        uploader.start("employer.ods", vec![0x50, 0x4b]).unwrap();
        let outcome = uploader.wait().unwrap();
        assert!(matches!(outcome, Err(UploadError::NoDecoder(ref s)) if s == ".ods"));
        assert!(matches!(
            uploader.status(),
            UploadStatus::Error(msg) if msg.contains(".ods")
        ));
    }

    #[test]
    fn xlsx_upload_succeeds() {
        let mut uploader = Uploader::new(&instant_config());
        uploader.start("Employer.XLSX", full_xlsx(4)).unwrap();
        let record = uploader.wait().unwrap().unwrap().record;
        assert_eq!(record.company_name, "ABC Manufacturing Corp");
        assert_eq!(record.enrollment_start, "2025-09-01");
        assert_eq!(record.tiles.len(), 4);
        assert_eq!(uploader.status(), &UploadStatus::Success);
    }

    #[test]
    fn corrupt_xlsx_is_an_error_state() {
        let mut uploader = Uploader::new(&instant_config());
        uploader.start("employer.xlsx", vec![0x50, 0x4b]).unwrap();
        assert!(matches!(uploader.wait(), Some(Err(UploadError::Decode(_)))));
        assert!(matches!(uploader.status(), UploadStatus::Error(_)));
    }

    #[test]
    fn empty_sheet_is_an_error_state() {
        let mut uploader = Uploader::new(&instant_config());
        uploader
            .start("employer.csv", b"Company Name\n".to_vec())
            .unwrap();
        assert!(matches!(uploader.wait(), Some(Err(UploadError::Extract(_)))));
        assert_eq!(
            uploader.status(),
            &UploadStatus::Error("No data found in the sheet".into())
        );
    }

    #[test]
    fn newer_upload_supersedes_pending() {
        let slow = UploadConfig {
            delay_ms: 200,
            ..UploadConfig::default()
        };
        let mut uploader = Uploader::new(&slow);
        uploader
            .start("first.csv", b"Company Name\nFirst\n".to_vec())
            .unwrap();
        uploader
            .start("second.csv", b"Company Name\nSecond\n".to_vec())
            .unwrap();
        let record = uploader.wait().unwrap().unwrap().record;
        assert_eq!(record.company_name, "Second");
        assert!(uploader.wait().is_none());
    }

    #[test]
    fn registered_decoder_handles_its_suffix() {
        struct FixedDecoder;
        impl RowDecoder for FixedDecoder {
            fn suffix(&self) -> &str {
                ".xlsx"
            }
            fn decode(&self, _bytes: &[u8]) -> Result<Vec<TabularRow>, DecodeError> {
                Ok(vec![full_row(4)])
            }
        }

        let mut uploader =
            Uploader::new(&instant_config()).with_decoder(Arc::new(FixedDecoder));
        uploader.start("Employer.XLSX", vec![]).unwrap();
        let record = uploader.wait().unwrap().unwrap().record;
        assert_eq!(record.tiles.len(), 4);
    }

    #[test]
    fn crashed_decoder_ends_in_error_state() {
        let mut uploader =
            Uploader::new(&instant_config()).with_decoder(Arc::new(PanickingDecoder));
        uploader.start("employer.csv", vec![]).unwrap();
        let outcome = uploader.wait().unwrap();
        assert!(matches!(
            outcome,
            Err(UploadError::Interrupted(TaskError::Lost))
        ));
        assert!(matches!(uploader.status(), UploadStatus::Error(_)));
        assert!(uploader.wait().is_none());
    }

    #[test]
    fn polling_a_crashed_upload_settles() {
        let mut uploader =
            Uploader::new(&instant_config()).with_decoder(Arc::new(PanickingDecoder));
        uploader.start("employer.csv", vec![]).unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let outcome = loop {
            if let Some(outcome) = uploader.poll() {
                break outcome;
            }
            assert!(Instant::now() < deadline, "upload never settled");
            std::thread::sleep(Duration::from_millis(5));
        };
        assert!(outcome.is_err());
        assert!(matches!(uploader.status(), UploadStatus::Error(_)));
        assert!(uploader.poll().is_none());
    }

    #[test]
    fn poll_does_not_block() {
        let slow = UploadConfig {
            delay_ms: 30_000,
            ..UploadConfig::default()
        };
        let mut uploader = Uploader::new(&slow);
        uploader.start("a.csv", vec![]).unwrap();
        assert!(uploader.poll().is_none());
        assert_eq!(uploader.status(), &UploadStatus::Uploading);
    }

    #[test]
    fn extract_now_skips_delay_and_status() {
        let slow = UploadConfig {
            delay_ms: 60_000,
            ..UploadConfig::default()
        };
        let uploader = Uploader::new(&slow);
        let done = uploader
            .extract_now("sheet.csv", b"Company Name,Notes\nAcme,call back\n")
            .unwrap();
        assert_eq!(done.record.company_name, "Acme");
        assert_eq!(done.ignored, ["Notes"]);
        assert_eq!(uploader.status(), &UploadStatus::Idle);

        assert!(matches!(
            uploader.extract_now("sheet.txt", b""),
            Err(UploadError::UnsupportedSuffix { .. })
        ));
    }
}
