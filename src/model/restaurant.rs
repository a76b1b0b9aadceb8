//! Restaurant documents

use serde::{Deserialize, Serialize};

use super::object_id::ObjectId;

/// Postal address of a restaurant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postcode: String,
}

/// A document of the `restaurants` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Store-assigned id, absent before the first insert
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub address: Address,
    /// 1 to 5
    pub rating: i32,
    pub type_of_food: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Restaurant {
    pub fn new(
        name: impl Into<String>,
        address: Address,
        rating: i32,
        type_of_food: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            address,
            rating,
            type_of_food: type_of_food.into(),
            url: None,
        }
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        postcode: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            postcode: postcode.into(),
        }
    }
}
