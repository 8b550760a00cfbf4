//! Simulated publishing.
//!
//! ```text
//! Idle ──publish(valid record)──► Publishing ──(delay)──► Published(url)
//!   │
//!   └──publish(invalid record)──► Err(Invalid), status unchanged
//! ```
//!
//! Published URLs look like `https://{host}/employer-{token}`. Tokens come
//! from a monotonic ULID generator, so two publishes in one session never
//! share a URL even within the same millisecond.

use crate::config::PublishConfig;
use crate::task::{DelayedTask, TaskError};
use crate::types::ContentRecord;
use crate::validate::{Gate, Violation, validate};
use std::time::Duration;
use thiserror::Error;
use ulid::{Generator, Ulid};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("record is not ready to publish ({} problem(s))", .0.len())]
    Invalid(Vec<Violation>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PublishStatus {
    #[default]
    Idle,
    Publishing,
    Published(String),
}

/// Hands out `employer-{token}` slugs.
pub struct SlugGenerator {
    ulids: Generator,
}

impl Default for SlugGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SlugGenerator {
    pub fn new() -> Self {
        Self {
            ulids: Generator::new(),
        }
    }

    pub fn next_slug(&mut self) -> String {
        let token = self.ulids.generate().unwrap_or_else(|_| {
            // Random bits exhausted within one millisecond.
            tracing::warn!("monotonic ULID overflow, falling back to a fresh ULID");
            Ulid::new()
        });
        format!("employer-{}", token.to_string().to_lowercase())
    }
}

/// Drives the publish button.
pub struct Publisher {
    host: String,
    delay: Duration,
    slugs: SlugGenerator,
    status: PublishStatus,
    pending: Option<DelayedTask<String>>,
}

impl Publisher {
    pub fn new(config: &PublishConfig) -> Self {
        Self {
            host: config.host.clone(),
            delay: config.delay(),
            slugs: SlugGenerator::new(),
            status: PublishStatus::Idle,
            pending: None,
        }
    }

    pub fn status(&self) -> &PublishStatus {
        &self.status
    }

    /// Start publishing a record. Invalid records are refused outright.
    ///
    /// Publishing again while a publish is pending replaces the pending one.
    pub fn publish(&mut self, record: &ContentRecord) -> Result<(), PublishError> {
        let violations = validate(record, Gate::Publish);
        if !violations.is_empty() {
            tracing::debug!(count = violations.len(), "publish refused");
            return Err(PublishError::Invalid(violations));
        }

        if let Some(mut previous) = self.pending.take() {
            previous.cancel();
            tracing::warn!("superseded a pending publish");
        }

        let url = format!("https://{}/{}", self.host, self.slugs.next_slug());
        tracing::info!(%url, company = record.display_company_name(), "publish started");
        self.status = PublishStatus::Publishing;
        self.pending = Some(DelayedTask::spawn(self.delay, move || url));
        Ok(())
    }

    /// The published URL, if the pending publish has finished. Never blocks.
    pub fn poll(&mut self) -> Option<String> {
        let taken = self.pending.as_mut()?.try_take();
        match taken {
            Ok(None) => None,
            Ok(Some(url)) => {
                self.pending = None;
                Some(self.finish(url))
            }
            Err(e) => {
                self.pending = None;
                self.abandon(e)
            }
        }
    }

    /// Block until the pending publish finishes.
    pub fn wait(&mut self) -> Option<String> {
        match self.pending.take()?.wait() {
            Ok(url) => Some(self.finish(url)),
            Err(e) => self.abandon(e),
        }
    }

    fn abandon(&mut self, e: TaskError) -> Option<String> {
        tracing::warn!(error = %e, "publish did not finish");
        self.status = PublishStatus::Idle;
        None
    }

    fn finish(&mut self, url: String) -> String {
        tracing::info!(%url, "published");
        self.status = PublishStatus::Published(url.clone());
        url
    }
}
