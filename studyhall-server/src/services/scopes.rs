//! Scope ownership checks

use shared::{AppError, AppResult, ScopeKey, ScopeRecord};

use crate::security_log;
use crate::storage::ItemStorage;

/// Claims scopes and answers "does this user own this scope"
#[derive(Clone, Debug)]
pub struct ScopeService {
    storage: ItemStorage,
}

impl ScopeService {
    pub fn new(storage: ItemStorage) -> Self {
        Self { storage }
    }

    pub fn claim(&self, scope: &ScopeKey, user_id: &str) -> AppResult<ScopeRecord> {
        let record = self.storage.claim_scope(scope, user_id)?;
        tracing::info!(scope = %scope, owner = %record.owner_id, "Scope claimed");
        Ok(record)
    }

    /// Ensure `user_id` owns `scope`
    ///
    /// Unknown scope is `ScopeNotFound`, a foreign one `ScopeNotOwned`.
    pub fn authorize(&self, scope: &ScopeKey, user_id: &str) -> AppResult<ScopeRecord> {
        let record = self
            .storage
            .get_scope(scope)?
            .ok_or_else(|| AppError::scope_not_found(scope.to_string()))?;

        if !record.is_owned_by(user_id) {
            security_log!(
                "WARN",
                "scope_denied",
                scope = scope.to_string(),
                user_id = user_id.to_string()
            );
            return Err(AppError::scope_not_owned(scope.to_string()));
        }

        Ok(record)
    }
}
