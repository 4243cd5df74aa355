//! Typed Studyhall API

use async_trait::async_trait;
use shared::models::{ItemCreate, ItemUpdate};
use shared::request::{ClaimScopeRequest, ReorderRequest};
use shared::{OrderedItem, ScopeKey, ScopeRecord};

use crate::client::HttpClient;
use crate::sync::Reconciler;
use crate::ClientResult;

/// Typed endpoints over any [`HttpClient`]
#[derive(Debug, Clone)]
pub struct StudyhallApi<H> {
    http: H,
}

impl<H: HttpClient> StudyhallApi<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    /// POST /api/scopes
    pub async fn claim_scope(&self, scope: &ScopeKey) -> ClientResult<ScopeRecord> {
        let req = ClaimScopeRequest {
            kind: scope.kind,
            parent: scope.parent.clone(),
        };
        self.http.post("/api/scopes", &req).await
    }

    /// GET /api/scopes/{kind}/{parent}/items, sorted by order
    pub async fn list_items(&self, scope: &ScopeKey) -> ClientResult<Vec<OrderedItem>> {
        self.http.get(&items_path(scope)).await
    }

    /// POST /api/scopes/{kind}/{parent}/items
    pub async fn create_item(&self, scope: &ScopeKey, title: &str) -> ClientResult<OrderedItem> {
        let req = ItemCreate {
            title: title.to_string(),
        };
        self.http.post(&items_path(scope), &req).await
    }

    /// PUT /api/scopes/{kind}/{parent}/items/{id}
    pub async fn rename_item(
        &self,
        scope: &ScopeKey,
        id: i64,
        title: &str,
    ) -> ClientResult<OrderedItem> {
        let req = ItemUpdate {
            title: title.to_string(),
        };
        self.http
            .put(&format!("{}/{}", items_path(scope), id), &req)
            .await
    }

    /// DELETE /api/scopes/{kind}/{parent}/items/{id}
    pub async fn delete_item(&self, scope: &ScopeKey, id: i64) -> ClientResult<()> {
        self.http
            .delete(&format!("{}/{}", items_path(scope), id))
            .await
    }

    /// PUT /api/scopes/{kind}/{parent}/sort-order
    ///
    /// Returns the server listing after the commit.
    pub async fn reorder(
        &self,
        scope: &ScopeKey,
        plan: &ReorderRequest,
    ) -> ClientResult<Vec<OrderedItem>> {
        self.http
            .put(&format!("/api/scopes/{}/sort-order", scope.api_path()), plan)
            .await
    }
}

fn items_path(scope: &ScopeKey) -> String {
    format!("/api/scopes/{}/items", scope.api_path())
}

#[async_trait]
impl<H: HttpClient> Reconciler<OrderedItem> for StudyhallApi<H> {
    async fn list_items(&self, scope: &ScopeKey) -> ClientResult<Vec<OrderedItem>> {
        StudyhallApi::list_items(self, scope).await
    }

    async fn commit(&self, scope: &ScopeKey, plan: &ReorderRequest) -> ClientResult<()> {
        self.reorder(scope, plan).await.map(|_| ())
    }

    async fn create_item(&self, scope: &ScopeKey, title: &str) -> ClientResult<OrderedItem> {
        StudyhallApi::create_item(self, scope, title).await
    }
}
