use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    // Existing documents keep the hash under `password`.
    #[serde(rename = "password")]
    pub password_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub token: String,
}

#[derive(Serialize)]
pub struct ServerStatus {
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// A catalog entry. Only `_id` is interpreted; every other field is owned by
/// the data-entry process and passed through as stored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Product {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    #[serde(flatten)]
    pub fields: Document,
}

#[derive(Debug, Deserialize)]
pub struct TopRatedQuery {
    pub limit: Option<u32>,
}

impl TopRatedQuery {
    /// `limit=0` means no limit, the same as the document store.
    pub fn limit(&self) -> Option<u32> {
        self.limit.filter(|&n| n > 0)
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{doc, from_document, Bson};
    use serde_json::json;

    use super::*;

    #[test]
    fn product_fields_survive_decode_untouched() {
        let id = ObjectId::new();
        let raw = doc! {
            "_id": id,
            "name": Bson::Null,
            "price": 999,
            "discount": Bson::Null,
            "tags": ["usb", "cable"],
        };

        let product: Product = from_document(raw).unwrap();
        let rendered = serde_json::to_value(&product).unwrap();

        assert_eq!(
            rendered,
            json!({
                "_id": id.to_hex(),
                "name": null,
                "price": 999,
                "discount": null,
                "tags": ["usb", "cable"],
            })
        );
    }

    #[test]
    fn string_price_is_not_a_decode_error() {
        let raw = doc! { "_id": ObjectId::new(), "price": "19.99", "ratings": Bson::Null };
        let product: Product = from_document(raw).unwrap();
        assert_eq!(product.fields.get_str("price").unwrap(), "19.99");
    }
}
