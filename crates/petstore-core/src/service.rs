use crate::model::Pet;
use crate::store::CatalogStore;
use crate::CatalogError;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

/// Catalog operations as seen by the transport layer.
///
/// Everything except `save` delegates to the [`CatalogStore`] unchanged;
/// `save` assigns `max(id) + 1` to pets that arrive without an id.
#[derive(Debug, Default)]
pub struct CatalogService {
    store: CatalogStore,
    // Held across id assignment and insertion so two creates cannot pick the same id.
    save_lock: Mutex<()>,
}

impl CatalogService {
    pub fn new(store: CatalogStore) -> Self {
        Self {
            store,
            save_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn find_all(&self) -> Vec<Pet> {
        self.store.find_all()
    }

    pub fn find_by_id(&self, id: i64) -> Result<Pet, CatalogError> {
        self.store.find_by_id(id)
    }

    /// Store `pet`, assigning a fresh id first if it has none.
    ///
    /// A pet that already carries an id overwrites whatever is stored under it.
    pub fn save(&self, mut pet: Pet) -> Result<Pet, CatalogError> {
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if pet.id.is_none() {
            let id = self.store.auto_increment()?;
            debug!("assigned id {id} to new pet '{}'", pet.name);
            pet.id = Some(id);
        }
        let saved = self.store.save(pet)?;
        if let Some(id) = saved.id {
            info!("saved pet {id} '{}'", saved.name);
        }
        Ok(saved)
    }

    /// Replace an existing pet wholesale. The pet must carry the id of a stored record.
    pub fn replace(&self, pet: Pet) -> Result<Pet, CatalogError> {
        let id = pet
            .id
            .ok_or_else(|| CatalogError::InvalidArgument("pet id is required".to_owned()))?;
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.find_by_id(id)?;
        let saved = self.store.save(pet)?;
        info!("replaced pet {id}");
        Ok(saved)
    }

    pub fn update_by_id(&self, pet: Pet, id: i64) -> Result<Pet, CatalogError> {
        self.store.update_by_id(pet, id)
    }

    pub fn delete_by_id(&self, id: i64) {
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.delete_by_id(id);
        info!("deleted pet {id}");
    }

    pub fn get_pets_by_status(&self, filter: &str) -> Vec<Pet> {
        self.store.get_pets_by_status(filter)
    }
}
