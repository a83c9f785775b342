use crate::model::Pet;
use crate::CatalogError;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Separator between status tokens in a filter string (`"available, sold"`).
pub const STATUS_SEPARATOR: &str = ", ";

/// In-memory keyed collection of pets.
///
/// Every mutation takes the single write lock; iteration is in ascending id
/// order. Callers only ever receive clones of the stored records.
#[derive(Debug, Default)]
pub struct CatalogStore {
    pets: RwLock<BTreeMap<i64, Pet>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `pets`. Each pet must carry a unique id.
    pub fn with_pets(pets: impl IntoIterator<Item = Pet>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for pet in pets {
            let id = require_id(&pet)?;
            if map.insert(id, pet).is_some() {
                return Err(CatalogError::InvalidArgument(format!(
                    "duplicate pet id {id} in seed"
                )));
            }
        }
        Ok(Self {
            pets: RwLock::new(map),
        })
    }

    // Every write replaces or removes a whole entry, so a poisoned map is
    // still consistent and safe to keep using.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<i64, Pet>> {
        self.pets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<i64, Pet>> {
        self.pets.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn find_all(&self) -> Vec<Pet> {
        self.read().values().cloned().collect()
    }

    pub fn find_by_id(&self, id: i64) -> Result<Pet, CatalogError> {
        self.read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::pet_not_found(id))
    }

    /// Insert or fully replace the entry keyed by `pet.id`.
    pub fn save(&self, pet: Pet) -> Result<Pet, CatalogError> {
        let id = require_id(&pet)?;
        let replaced = self.write().insert(id, pet.clone()).is_some();
        debug!("saved pet {id} (replaced: {replaced})");
        Ok(pet)
    }

    /// Overwrite every field of the pet stored under `id` with the fields of `pet`.
    ///
    /// A body id that disagrees with `id` is rejected, since the entry would
    /// otherwise stay filed under a key that no longer matches its own id. A
    /// body without an id keeps the stored one.
    pub fn update_by_id(&self, pet: Pet, id: i64) -> Result<Pet, CatalogError> {
        let mut pets = self.write();
        let existing = pets
            .get_mut(&id)
            .ok_or_else(|| CatalogError::pet_not_found(id))?;
        if let Some(body_id) = pet.id {
            if body_id != id {
                return Err(CatalogError::InvalidArgument(format!(
                    "pet id {body_id} does not match target id {id}"
                )));
            }
        }
        existing.overwrite_from(Pet {
            id: Some(id),
            ..pet
        });
        debug!("updated pet {id}");
        Ok(existing.clone())
    }

    /// Remove the pet stored under `id`. Absent ids are ignored.
    pub fn delete_by_id(&self, id: i64) {
        let removed = self.write().remove(&id).is_some();
        debug!("delete pet {id} (present: {removed})");
    }

    /// Pets whose status label equals any of the `", "`-separated tokens in
    /// `filter`, in store order. Unknown tokens and status-less pets match
    /// nothing.
    pub fn get_pets_by_status(&self, filter: &str) -> Vec<Pet> {
        let tokens: Vec<&str> = filter.split(STATUS_SEPARATOR).collect();
        self.read()
            .values()
            .filter(|pet| {
                pet.status_label()
                    .is_some_and(|label| tokens.contains(&label))
            })
            .cloned()
            .collect()
    }

    /// One past the largest stored id, or `1` for an empty store.
    pub fn auto_increment(&self) -> Result<i64, CatalogError> {
        match self.read().keys().next_back() {
            None => Ok(1),
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| CatalogError::InvalidArgument("id space exhausted".to_owned())),
        }
    }
}

fn require_id(pet: &Pet) -> Result<i64, CatalogError> {
    pet.id.ok_or_else(|| {
        CatalogError::InvalidArgument(format!("pet '{}' has no id", pet.name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Status, Tag};

    fn pet(id: i64, status: Option<Status>) -> Pet {
        let mut p = Pet::new(&format!("pet{id}")).with_id(id);
        p.status = status;
        p
    }

    fn seeded() -> CatalogStore {
        CatalogStore::with_pets([
            pet(1, Some(Status::Available)),
            pet(2, Some(Status::Pending)),
            pet(3, Some(Status::Sold)),
        ])
        .unwrap()
    }

    fn ids(pets: &[Pet]) -> Vec<i64> {
        pets.iter().filter_map(|p| p.id).collect()
    }

    #[test]
    fn find_all_returns_snapshot() {
        let store = seeded();
        let mut snapshot = store.find_all();
        snapshot.clear();
        assert_eq!(store.len(), 3);
        assert_eq!(ids(&store.find_all()), vec![1, 2, 3]);
    }

    #[test]
    fn find_by_id_present_and_missing() {
        let store = seeded();
        assert_eq!(store.find_by_id(2).unwrap().name, "pet2");
        let err = store.find_by_id(99).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn save_without_id_is_rejected() {
        let store = CatalogStore::new();
        let err = store.save(Pet::new("ghost")).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn save_last_write_wins() {
        let store = CatalogStore::new();
        store.save(Pet::new("a").with_id(5)).unwrap();
        store.save(Pet::new("b").with_id(6)).unwrap();
        store.save(Pet::new("c").with_id(5)).unwrap();

        let all = store.find_all();
        assert_eq!(all.len(), 2);
        assert_eq!(store.find_by_id(5).unwrap().name, "c");
        assert_eq!(store.find_by_id(6).unwrap().name, "b");
    }

    #[test]
    fn update_by_id_missing_is_not_found() {
        let store = seeded();
        let err = store
            .update_by_id(Pet::new("x").with_id(42), 42)
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn update_by_id_overwrites_every_field() {
        let store = CatalogStore::with_pets([Pet::new("dog")
            .with_id(1)
            .with_category(Category::new(1, "dogs"))
            .with_photo_urls(["url1", "url2"])
            .with_tags(vec![Tag::new(1, "tag1")])
            .with_status(Status::Available)])
        .unwrap();

        let body = Pet::new("wolf")
            .with_id(1)
            .with_category(Category::new(9, "wild"))
            .with_photo_urls(["w1"])
            .with_tags(vec![Tag::new(8, "grey"), Tag::new(8, "grey")])
            .with_status(Status::Sold);
        let updated = store.update_by_id(body, 1).unwrap();

        assert_eq!(updated.id, Some(1));
        assert_eq!(updated.name, "wolf");
        assert_eq!(updated.category, Some(Category::new(9, "wild")));
        assert_eq!(updated.photo_urls, vec!["w1".to_owned()]);
        assert_eq!(updated.tags, vec![Tag::new(8, "grey"), Tag::new(8, "grey")]);
        assert_eq!(updated.status, Some(Status::Sold));
        assert_eq!(store.find_by_id(1).unwrap(), updated);
    }

    #[test]
    fn update_by_id_clears_optional_fields() {
        let store = seeded();
        let updated = store.update_by_id(Pet::new("plain"), 1).unwrap();
        assert_eq!(updated.id, Some(1));
        assert_eq!(updated.status, None);
        assert_eq!(updated.category, None);
    }

    #[test]
    fn update_by_id_rejects_mismatched_id() {
        let store = seeded();
        let err = store
            .update_by_id(Pet::new("moved").with_id(10), 1)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
        assert_eq!(store.find_by_id(1).unwrap().name, "pet1");
        assert!(store.find_by_id(10).is_err());
    }

    #[test]
    fn delete_by_id_is_idempotent() {
        let store = seeded();
        store.delete_by_id(2);
        assert_eq!(store.len(), 2);
        store.delete_by_id(2);
        assert_eq!(store.len(), 2);
        store.delete_by_id(77);
        assert_eq!(ids(&store.find_all()), vec![1, 3]);
    }

    #[test]
    fn get_pets_by_status_matches_any_token() {
        let store = seeded();
        assert_eq!(ids(&store.get_pets_by_status("available, sold")), vec![1, 3]);
        assert_eq!(ids(&store.get_pets_by_status("pending")), vec![2]);
        assert_eq!(
            ids(&store.get_pets_by_status("sold, pending, available")),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn get_pets_by_status_unknown_tokens_match_nothing() {
        let store = seeded();
        assert!(store.get_pets_by_status("lost").is_empty());
        assert!(store.get_pets_by_status("").is_empty());
        // Only the exact ", " separator splits tokens.
        assert!(store.get_pets_by_status("available,sold").is_empty());
        assert_eq!(ids(&store.get_pets_by_status("lost, sold")), vec![3]);
    }

    #[test]
    fn get_pets_by_status_skips_pets_without_status() {
        let store = CatalogStore::with_pets([pet(1, None), pet(2, Some(Status::Sold))]).unwrap();
        assert_eq!(ids(&store.get_pets_by_status("available, pending, sold")), vec![2]);
    }

    #[test]
    fn get_pets_by_status_repeated_token_yields_pet_once() {
        let store = seeded();
        assert_eq!(ids(&store.get_pets_by_status("sold, sold")), vec![3]);
    }

    #[test]
    fn get_pets_by_status_follows_store_order() {
        let store = CatalogStore::new();
        for id in [9, 4, 7, 1] {
            store.save(pet(id, Some(Status::Available))).unwrap();
        }
        let expected = ids(&store.find_all());
        assert_eq!(ids(&store.get_pets_by_status("available")), expected);
    }

    #[test]
    fn auto_increment_empty_and_after_save() {
        let store = CatalogStore::new();
        assert_eq!(store.auto_increment().unwrap(), 1);
        let next = store.auto_increment().unwrap();
        store.save(Pet::new("first").with_id(next)).unwrap();
        assert_eq!(store.auto_increment().unwrap(), next + 1);
        store.save(Pet::new("far").with_id(40)).unwrap();
        assert_eq!(store.auto_increment().unwrap(), 41);
    }

    #[test]
    fn auto_increment_ignores_gaps() {
        let store = seeded();
        store.delete_by_id(2);
        assert_eq!(store.auto_increment().unwrap(), 4);
        store.delete_by_id(3);
        assert_eq!(store.auto_increment().unwrap(), 2);
    }

    #[test]
    fn auto_increment_at_max_id_is_exhausted() {
        let store = CatalogStore::new();
        store.save(Pet::new("big").with_id(i64::MAX)).unwrap();
        let err = store.auto_increment().unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(ref m) if m == "id space exhausted"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn with_pets_rejects_missing_and_duplicate_ids() {
        assert!(matches!(
            CatalogStore::with_pets([Pet::new("anon")]),
            Err(CatalogError::InvalidArgument(_))
        ));
        assert!(matches!(
            CatalogStore::with_pets([pet(1, None), pet(1, None)]),
            Err(CatalogError::InvalidArgument(_))
        ));
    }
}
