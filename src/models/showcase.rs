//! Public home-screen content: carousel images and quick-link icons.
//!
//! Both use a sequential numeric string `id` as their public key, next to
//! the store's own `_id`.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::Entity;

/// Items addressed by their sequential public id.
pub trait Sequenced {
    fn seq_id(&self) -> &str;

    fn seq_number(&self) -> Option<u64> {
        self.seq_id().parse().ok()
    }
}

/// Orders by numeric id; non-numeric ids go last.
pub fn sort_by_sequence<T: Sequenced>(items: &mut [T]) {
    items.sort_by_key(|item| item.seq_number().unwrap_or(u64::MAX));
}

/// Next id after the highest numeric id in use, starting at "1".
pub fn next_sequence<T: Sequenced>(items: &[T]) -> String {
    let highest = items.iter().filter_map(Sequenced::seq_number).max().unwrap_or(0);
    (highest + 1).to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarouselImage {
    #[serde(rename = "_id")]
    pub object_id: String,
    pub id: String,
    pub image_url: String,
}

impl Entity for CarouselImage {
    const COLLECTION: &'static str = "carouselimages";
    const LABEL: &'static str = "Image";

    fn id(&self) -> &str {
        &self.object_id
    }
}

impl Sequenced for CarouselImage {
    fn seq_id(&self) -> &str {
        &self.id
    }
}

impl CarouselImage {
    pub fn new(id: String, image_url: String) -> Self {
        Self { object_id: ObjectId::new().to_hex(), id, image_url }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Icon {
    #[serde(rename = "_id")]
    pub object_id: String,
    pub id: String,
    #[serde(default)]
    pub image: String,
    pub label: String,
}

impl Entity for Icon {
    const COLLECTION: &'static str = "icons";
    const LABEL: &'static str = "Icon";

    fn id(&self) -> &str {
        &self.object_id
    }
}

impl Sequenced for Icon {
    fn seq_id(&self) -> &str {
        &self.id
    }
}

impl Icon {
    pub fn new(id: String, image: String, label: String) -> Self {
        Self { object_id: ObjectId::new().to_hex(), id, image, label }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CarouselImageRequest {
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct IconRequest {
    pub image: Option<String>,
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(ids: &[&str]) -> Vec<CarouselImage> {
        ids.iter().map(|id| CarouselImage::new(id.to_string(), format!("https://img/{}", id))).collect()
    }

    #[test]
    fn sequence_is_numeric_not_lexicographic() {
        let mut items = images(&["10", "9", "2", "1"]);
        sort_by_sequence(&mut items);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "9", "10"]);
        assert_eq!(next_sequence(&items), "11");
    }

    #[test]
    fn first_id_is_one() {
        assert_eq!(next_sequence::<Icon>(&[]), "1");
    }

    #[test]
    fn non_numeric_ids_are_skipped() {
        let items = images(&["abc", "4"]);
        assert_eq!(next_sequence(&items), "5");
    }
}
