//! Response-parameter list view-model
//!
//! Holds the rows of the "common responses" panel for one project and mirrors
//! user actions (add, delete, expand, save) onto the remote API. Rows are kept
//! behind a tokio `RwLock`; no lock is held across a remote call, so a row may
//! be gone by the time its call returns and every write-back looks the row up
//! by id again.

use crate::api::CommonResponseApi;
use crate::config::ResponseListConfig;
use crate::error::{ResponseListError, Result};
use crate::models::{ResponseDetail, ResponseParamItem};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Marks an operation in flight for as long as it is alive
///
/// Counts rather than toggles so overlapping operations keep the flag raised
/// until the last one finishes.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct ResponseParamList {
    api: Arc<dyn CommonResponseApi>,
    project_id: String,
    config: ResponseListConfig,
    items: RwLock<Vec<ResponseParamItem>>,
    loading: AtomicUsize,
    deleting: AtomicUsize,
}

impl std::fmt::Debug for ResponseParamList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseParamList")
            .field("project_id", &self.project_id)
            .field("config", &self.config)
            .field("is_loading", &self.is_loading())
            .field("is_loading_for_delete", &self.is_loading_for_delete())
            .finish_non_exhaustive()
    }
}

impl ResponseParamList {
    pub fn new(api: Arc<dyn CommonResponseApi>, project_id: impl Into<String>) -> Self {
        Self {
            api,
            project_id: project_id.into(),
            config: ResponseListConfig::default(),
            items: RwLock::new(Vec::new()),
            loading: AtomicUsize::new(0),
            deleting: AtomicUsize::new(0),
        }
    }

    pub fn with_config(
        api: Arc<dyn CommonResponseApi>,
        project_id: impl Into<String>,
        config: ResponseListConfig,
    ) -> Result<Self> {
        config.validate().map_err(ResponseListError::Config)?;
        let mut list = Self::new(api, project_id);
        list.config = config;
        Ok(list)
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// True while the initial list fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// True while a remote delete is in flight
    pub fn is_loading_for_delete(&self) -> bool {
        self.deleting.load(Ordering::SeqCst) > 0
    }

    /// Snapshot of the current rows
    pub async fn items(&self) -> Vec<ResponseParamItem> {
        self.items.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Replace the rows with the server's list
    ///
    /// On failure the current rows are left as they were.
    pub async fn initialize(&self) -> Result<()> {
        let _loading = LoadingGuard::enter(&self.loading);

        let responses = self.api.list(&self.project_id).await.map_err(|e| {
            warn!("Failed to load common responses for {}: {}", self.project_id, e);
            e
        })?;

        let rows: Vec<ResponseParamItem> = responses
            .into_iter()
            .map(ResponseParamItem::remote)
            .collect();
        info!(
            "Loaded {} common responses for project {}",
            rows.len(),
            self.project_id
        );

        *self.items.write().await = rows;
        Ok(())
    }

    /// Prepend a new unsaved row built from the configured defaults
    pub async fn handle_add_param(&self) -> ResponseParamItem {
        let detail = ResponseDetail::new(
            self.config.default_model_name.clone(),
            self.config.default_code,
            self.config.default_description.clone(),
        );
        let item = ResponseParamItem::local(detail);
        debug!("Adding local response parameter {}", item.id());

        self.items.write().await.insert(0, item.clone());
        item
    }

    /// Delete the row at `index`
    ///
    /// Unsaved rows are dropped without a remote call. Saved rows are deleted
    /// remotely first; the row is removed whatever the outcome and a remote
    /// failure is then returned to the caller.
    pub async fn handle_delete_param(&self, index: usize, unref: bool) -> Result<()> {
        let item = self.item_at(index).await?;

        let outcome = if item.is_local {
            Ok(())
        } else {
            let _deleting = LoadingGuard::enter(&self.deleting);
            self.api.delete(&self.project_id, item.id(), unref).await
        };

        if let Err(e) = &outcome {
            warn!("Remote delete of response {} failed: {}", item.id(), e);
        }

        if self.remove_by_id(item.id()).await {
            debug!("Removed response parameter {}", item.id());
        }

        outcome.map_err(ResponseListError::from)
    }

    /// Toggle the row at `index`, fetching its detail on first expand
    ///
    /// Returns the new expanded state.
    pub async fn handle_expand_param(&self, index: usize) -> Result<bool> {
        let (id, expanded, needs_fetch) = {
            let mut items = self.items.write().await;
            let item = items
                .get_mut(index)
                .ok_or(ResponseListError::ItemNotFound { index })?;
            item.expand = !item.expand;
            let needs_fetch =
                item.expand && !item.is_local && !item.is_loaded && !item.is_loading;
            if needs_fetch {
                item.is_loading = true;
            }
            (item.id().to_string(), item.expand, needs_fetch)
        };

        if !needs_fetch {
            return Ok(expanded);
        }

        let fetched = self.api.get(&self.project_id, &id).await;

        let mut items = self.items.write().await;
        let row = items.iter_mut().find(|item| item.id() == id);
        match (fetched, row) {
            (Ok(response), Some(item)) => {
                item.is_loading = false;
                item.is_loaded = true;
                item.response.code = response.code;
                item.response.description = response.description;
                item.response.detail = response.detail;
                Ok(expanded)
            }
            (Ok(_), None) => {
                debug!("Response {} was removed while its detail loaded", id);
                Ok(expanded)
            }
            (Err(e), row) => {
                if let Some(item) = row {
                    item.is_loading = false;
                }
                warn!("Failed to load response {}: {}", id, e);
                Err(e.into())
            }
        }
    }

    /// Persist the unsaved row at `index` and swap in the server copy
    pub async fn handle_save_param(&self, index: usize) -> Result<ResponseParamItem> {
        let item = self.item_at(index).await?;
        if !item.is_local {
            return Err(ResponseListError::NotLocal {
                id: item.id().to_string(),
            });
        }

        let detail = item.response.detail.clone().unwrap_or_else(|| {
            ResponseDetail::new(
                self.config.default_model_name.clone(),
                item.response.code,
                item.response.description.clone(),
            )
        });

        let created = self.api.create(&self.project_id, &detail).await?;
        let mut saved = ResponseParamItem::remote(created);
        saved.is_loaded = true;
        saved.expand = item.expand;
        if saved.response.detail.is_none() {
            saved.response.detail = Some(detail);
        }

        let mut items = self.items.write().await;
        match items.iter_mut().find(|row| row.id() == item.id()) {
            Some(row) => *row = saved.clone(),
            None => debug!("Response {} was removed while saving", item.id()),
        }
        info!("Saved response parameter {} as {}", item.id(), saved.id());

        Ok(saved)
    }

    async fn item_at(&self, index: usize) -> Result<ResponseParamItem> {
        self.items
            .read()
            .await
            .get(index)
            .cloned()
            .ok_or(ResponseListError::ItemNotFound { index })
    }

    async fn remove_by_id(&self, id: &str) -> bool {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id() != id);
        items.len() != before
    }
}
