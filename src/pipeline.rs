//! One fetch → diff → render → deliver → persist run.
//!
//! Every path out of a run ends in a [`RunOutcome`]; nothing propagates past
//! [`Pipeline::run`], including panics raised by a component.

use anyhow::Context;
use chrono::Utc;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;

use crate::config::{ConfigError, Endpoints};
use crate::diff::select_new;
use crate::feed::client::FeedClient;
use crate::feed::types::extract_entries;
use crate::feed::ListingFeed;
use crate::notify::discord::DiscordWebhook;
use crate::notify::{embed, Delivery, DryRunNotifier, Notifier};
use crate::state::StateStore;

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    ConfigMissing(ConfigError),
    FetchFailed(String),
    NoUsableData,
    NothingNew {
        current_max_id: u64,
        last_max_id: u64,
    },
    Notified {
        new_ids: Vec<u64>,
        new_max_id: u64,
        delivery: Delivery,
    },
    Unexpected(String),
}

impl RunOutcome {
    /// True when the run got as far as comparing against stored state.
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::NothingNew { .. } | RunOutcome::Notified { .. })
    }

    pub fn log(&self) {
        match self {
            RunOutcome::ConfigMissing(e) => tracing::error!("{}", e),
            RunOutcome::FetchFailed(reason) => {
                tracing::error!(%reason, "failed to fetch IPO news, aborting run");
            }
            RunOutcome::NoUsableData => tracing::info!("no IPO news fetched or invalid response"),
            RunOutcome::NothingNew {
                current_max_id,
                last_max_id,
            } => tracing::info!(current_max_id, last_max_id, "no new IPOs"),
            RunOutcome::Notified {
                new_ids,
                new_max_id,
                delivery,
            } => match delivery {
                Delivery::Delivered => {
                    tracing::info!(count = new_ids.len(), new_max_id, "alert sent for new IPOs");
                }
                Delivery::Skipped => {
                    tracing::info!(count = new_ids.len(), new_max_id, "dry run complete, state left unchanged");
                }
                Delivery::Rejected { .. } | Delivery::Unreachable { .. } => {
                    tracing::warn!(new_max_id, "alert was not delivered, state advanced anyway");
                }
            },
            RunOutcome::Unexpected(message) => tracing::error!(%message, "an error occurred"),
        }
    }
}

pub struct Pipeline<F, N> {
    feed: F,
    notifier: N,
    store: StateStore,
}

impl<F: ListingFeed, N: Notifier> Pipeline<F, N> {
    pub fn new(feed: F, notifier: N, store: StateStore) -> Self {
        Self {
            feed,
            notifier,
            store,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub async fn run(&self) -> RunOutcome {
        let outcome = match AssertUnwindSafe(self.run_inner()).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => RunOutcome::Unexpected(format!("{:#}", e)),
            Err(panic) => RunOutcome::Unexpected(panic_message(panic.as_ref())),
        };
        outcome.log();
        outcome
    }

    async fn run_inner(&self) -> anyhow::Result<RunOutcome> {
        let body = match self.feed.fetch_listings().await {
            Ok(body) => body,
            Err(e) => return Ok(RunOutcome::FetchFailed(e.to_string())),
        };

        let Some(entries) = extract_entries(&body) else {
            return Ok(RunOutcome::NoUsableData);
        };
        tracing::info!(count = entries.len(), "fetched IPO news");

        let last_max_id = self
            .store
            .read_last_max_id()
            .context("failed to load last max IPO id")?;
        let diff = select_new(entries, last_max_id);

        if diff.new_entries.is_empty() {
            return Ok(RunOutcome::NothingNew {
                current_max_id: diff.new_max_id,
                last_max_id,
            });
        }

        let new_ids = diff.new_ids();
        tracing::info!(count = new_ids.len(), ids = ?new_ids, "new IPOs detected");

        let payload = embed::render(&diff.new_entries, Utc::now());
        let delivery = self.notifier.deliver(&payload).await;

        if self.notifier.persists_state() {
            self.store
                .write_last_max_id(diff.new_max_id)
                .context("failed to persist last max IPO id")?;
        }

        Ok(RunOutcome::Notified {
            new_ids,
            new_max_id: diff.new_max_id,
            delivery,
        })
    }
}

/// Resolve configuration and perform one run against the real HTTP endpoints.
pub async fn run_once(
    endpoints: Result<Endpoints, ConfigError>,
    store: StateStore,
    dry_run: bool,
) -> RunOutcome {
    let endpoints = match endpoints {
        Ok(e) => e,
        Err(e) => {
            let outcome = RunOutcome::ConfigMissing(e);
            outcome.log();
            return outcome;
        }
    };

    let feed = FeedClient::new(&endpoints.feed_url);
    if dry_run {
        Pipeline::new(feed, DryRunNotifier, store).run().await
    } else {
        let webhook = DiscordWebhook::new(&endpoints.webhook_url);
        Pipeline::new(feed, webhook, store).run().await
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "run panicked".to_string()
    }
}
