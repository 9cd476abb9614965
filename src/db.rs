use futures::stream::TryStreamExt;
use log::info;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, FindOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};

use crate::config::Config;
use crate::error::StoreError;
use crate::models::{Product, User};
use crate::store::{ProductStore, UserStore};

const DUPLICATE_KEY: i32 = 11000;

/// The single store connection shared by every handler.
pub struct Mongo {
    pub client: Client,
    pub users: MongoUserStore,
    pub products: MongoProductStore,
}

impl Mongo {
    pub async fn connect(config: &Config) -> mongodb::error::Result<Self> {
        let mut options = ClientOptions::parse(&config.mongodb_uri).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        let client = Client::with_options(options)?;

        // The driver connects lazily; ping so a bad URI fails at startup.
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        info!("Connected to MongoDB");

        let users = MongoUserStore {
            collection: client.database(&config.users_database).collection("users"),
        };
        users.ensure_indexes().await?;

        let products = MongoProductStore {
            collection: client
                .database(&config.products_database)
                .collection("products"),
        };

        Ok(Self {
            client,
            users,
            products,
        })
    }
}

pub async fn shutdown(client: Client) {
    client.shutdown().await;
    info!("MongoDB connection closed");
}

pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    /// Unique email index; makes concurrent duplicate registrations fail at
    /// insert time instead of both succeeding.
    async fn ensure_indexes(&self) -> mongodb::error::Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index, None).await?;
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.collection.find_one(doc! { "email": email }, None).await?)
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        match self.collection.insert_one(user, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Duplicate),
            Err(e) => Err(e.into()),
        }
    }
}

pub struct MongoProductStore {
    collection: Collection<Product>,
}

impl MongoProductStore {
    async fn find(
        &self,
        filter: Document,
        options: Option<FindOptions>,
    ) -> Result<Vec<Product>, StoreError> {
        let cursor = self.collection.find(filter, options).await?;
        Ok(cursor.try_collect().await?)
    }
}

impl ProductStore for MongoProductStore {
    async fn all(&self) -> Result<Vec<Product>, StoreError> {
        self.find(doc! {}, None).await
    }

    async fn by_id(&self, id: ObjectId) -> Result<Option<Product>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn flash_sale(&self) -> Result<Vec<Product>, StoreError> {
        let filter = doc! {
            "flashSale": true,
            "discount": { "$exists": true, "$ne": null },
        };
        self.find(filter, None).await
    }

    async fn top_rated(&self, limit: Option<u32>) -> Result<Vec<Product>, StoreError> {
        let options = FindOptions::builder()
            .sort(doc! { "ratings": -1 })
            .limit(limit.filter(|&n| n > 0).map(i64::from))
            .build();
        self.find(doc! {}, Some(options)).await
    }
}
