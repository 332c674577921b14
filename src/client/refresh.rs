use crate::client::reconcile::{diff, CardChange, CardPatch, DashboardView};
use crate::core::ent::NodeStatusSummary;
use crate::core::render::local_time;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{self, MissedTickBehavior};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(30_000);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("status request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("status endpoint answered {0}")]
    Status(StatusCode),
}

/// Fetches the lightweight status list from a running dashboard.
#[derive(Debug, Clone)]
pub struct StatusClient {
    http: Client,
    endpoint: String,
}

impl StatusClient {
    pub fn new(base_url: &str) -> Result<StatusClient, ClientError> {
        let http = Client::builder().build()?;
        Ok(StatusClient {
            http,
            endpoint: format!("{}/api/status", base_url.trim_end_matches('/')),
        })
    }

    pub async fn fetch(&self) -> Result<Vec<NodeStatusSummary>, ClientError> {
        let response = self.http.get(&self.endpoint).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

/// Keeps a [`DashboardView`] current by polling the status endpoint.
pub struct RefreshLoop {
    client: StatusClient,
    view: DashboardView,
    period: Duration,
}

impl RefreshLoop {
    /// Builds the initial view from one fetch, the way a page load would.
    pub async fn start(client: StatusClient, period: Duration) -> Result<RefreshLoop, ClientError> {
        let statuses = client.fetch().await?;
        let mut view = DashboardView::from_statuses(&statuses);
        view.bind_interactions();
        view.set_last_updated(local_time());
        Ok(RefreshLoop { client, view, period })
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut DashboardView {
        &mut self.view
    }

    /// Ticks forever. A tick never starts while the previous one is still
    /// waiting on its fetch; late ticks are skipped rather than queued.
    pub async fn run(&mut self) {
        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // the first tick completes immediately and the view is already fresh
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    pub async fn tick(&mut self) -> Vec<CardPatch> {
        let fetched = self.client.fetch().await;
        self.apply_fetch(fetched)
    }

    /// Applies one fetch outcome. A failed fetch leaves the view untouched.
    pub fn apply_fetch(&mut self, fetched: Result<Vec<NodeStatusSummary>, ClientError>) -> Vec<CardPatch> {
        let statuses = match fetched {
            Ok(statuses) => statuses,
            Err(err) => {
                tracing::warn!("error refreshing node statuses: {}", err);
                return Vec::new();
            }
        };
        let patches = diff(&self.view, &statuses);
        for patch in &patches {
            if let CardChange::SetState(state) = &patch.change {
                tracing::info!(url = %patch.key.url, network = %patch.key.network, "node is now {}", state.label());
            }
        }
        self.view.apply(&patches);
        self.view.set_last_updated(local_time());
        let bound = self.view.bind_interactions();
        tracing::debug!(patches = patches.len(), new_handlers = bound, "view refreshed");
        patches
    }
}
