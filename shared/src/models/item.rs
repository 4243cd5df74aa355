//! Ordered Item Model

use serde::{Deserialize, Serialize};

use super::scope::ScopeKey;
use crate::ordering::Ordered;

/// An entity in a user-orderable collection (folder, note, section, topic)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub id: i64,
    pub scope: ScopeKey,
    /// Strictly increasing with visible position, unique within the scope at rest
    pub order: i32,
    pub title: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Ordered for OrderedItem {
    type Id = i64;

    fn id(&self) -> &i64 {
        &self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }
}

/// Create item payload
///
/// No `order` field: the server assigns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreate {
    pub title: String,
}

/// Update item payload
///
/// Only the title is editable here; order changes go through the reorder
/// endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub title: String,
}
