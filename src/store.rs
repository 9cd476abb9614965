//! Storage seams between the handlers and the document store.
//!
//! Handlers are generic over these traits; `db` provides the MongoDB
//! implementations and the test suite uses in-memory ones.

use mongodb::bson::oid::ObjectId;

use crate::error::StoreError;
use crate::models::{Product, User};

#[allow(async_fn_in_trait)]
pub trait UserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when a user with the same email
    /// already exists, even if the caller's existence check raced.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;
}

#[allow(async_fn_in_trait)]
pub trait ProductStore {
    async fn all(&self) -> Result<Vec<Product>, StoreError>;

    async fn by_id(&self, id: ObjectId) -> Result<Option<Product>, StoreError>;

    /// Products flagged for the flash sale that carry a non-null discount.
    async fn flash_sale(&self) -> Result<Vec<Product>, StoreError>;

    /// Products ordered by rating, highest first. `None` and `Some(0)` return
    /// all of them.
    async fn top_rated(&self, limit: Option<u32>) -> Result<Vec<Product>, StoreError>;
}
