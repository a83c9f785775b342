//! Initial catalog contents.

use crate::model::{Category, Pet, Status, Tag};
use crate::CatalogError;
use std::fs;
use std::path::Path;

/// The three pets a fresh server starts with.
pub fn default_pets() -> Vec<Pet> {
    vec![
        Pet::new("dog")
            .with_id(1)
            .with_category(Category::new(1, "dogs"))
            .with_photo_urls(["url1", "url2"])
            .with_tags(vec![Tag::new(1, "tag1"), Tag::new(2, "tag2")])
            .with_status(Status::Available),
        Pet::new("cat")
            .with_id(2)
            .with_category(Category::new(2, "cats"))
            .with_photo_urls(["url3", "url4", "url5"])
            .with_tags(vec![Tag::new(3, "tag3"), Tag::new(4, "tag4")])
            .with_status(Status::Pending),
        Pet::new("parrot")
            .with_id(3)
            .with_category(Category::new(3, "parrots"))
            .with_photo_urls(["url6"])
            .with_tags(vec![
                Tag::new(5, "tag5"),
                Tag::new(6, "tag6"),
                Tag::new(7, "tag7"),
            ])
            .with_status(Status::Sold),
    ]
}

/// Parse a JSON array of pets. Every entry needs a non-negative id and a non-empty name.
pub fn parse_seed(content: &str) -> Result<Vec<Pet>, CatalogError> {
    let pets: Vec<Pet> = serde_json::from_str(content)?;
    for pet in &pets {
        pet.validate()?;
        if pet.id.is_none() {
            return Err(CatalogError::InvalidArgument(format!(
                "seed pet '{}' has no id",
                pet.name
            )));
        }
    }
    Ok(pets)
}

pub fn load_seed(path: &Path) -> Result<Vec<Pet>, CatalogError> {
    let content = fs::read_to_string(path)?;
    let pets = parse_seed(&content)?;
    tracing::debug!("loaded {} seed pets from {}", pets.len(), path.display());
    Ok(pets)
}
