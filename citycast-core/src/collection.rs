//! The user's ordered, persisted list of cities.
//!
//! Every mutation rewrites the whole list to the [`BlobStore`] before it
//! returns, so the stored blob always mirrors the in-memory order. Storage
//! write failures are logged and tolerated; they never roll back the list.
//!
//! Mutations take `&mut self`, so they are serialized by the single owner and
//! one mutation can never overwrite another with a stale copy of the list.

use futures::future::join_all;

use crate::{
    CoreError, DEFAULT_STORAGE_KEY,
    model::CitySnapshot,
    provider::WeatherRecordSource,
    store::BlobStore,
};

#[derive(Debug)]
pub struct CityCollection<S, B> {
    cities: Vec<CitySnapshot>,
    last_error: Option<String>,
    source: S,
    store: B,
    storage_key: String,
}

/// How a collection is seeded when nothing usable is stored.
#[derive(Debug, Clone)]
pub struct CollectionOptions {
    pub storage_key: String,
    pub default_cities: Vec<String>,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_cities: ["Madrid", "Barcelona", "Bilbao", "Málaga"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl From<&crate::Config> for CollectionOptions {
    fn from(config: &crate::Config) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            default_cities: config.default_cities.clone(),
        }
    }
}

impl<S, B> CityCollection<S, B>
where
    S: WeatherRecordSource,
    B: BlobStore,
{
    /// Rehydrate from storage, or populate and persist the default cities.
    ///
    /// A stored list is adopted only if it parses and is non-empty. Defaults
    /// are resolved concurrently; the ones that fail are dropped and the rest
    /// keep their request order.
    pub async fn initialize(source: S, store: B, options: CollectionOptions) -> Self {
        let mut collection = Self {
            cities: Vec::new(),
            last_error: None,
            source,
            store,
            storage_key: options.storage_key,
        };

        if let Some(stored) = collection.load_stored() {
            tracing::info!(count = stored.len(), "restored city list from storage");
            collection.cities = stored;
            return collection;
        }

        let lookups = options
            .default_cities
            .iter()
            .map(|name| collection.source.snapshot_by_name(name));
        let results = join_all(lookups).await;

        collection.cities = options
            .default_cities
            .iter()
            .zip(results)
            .filter_map(|(name, result)| match result {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!(city = %name, error = %e, "skipping default city");
                    None
                }
            })
            .collect();

        tracing::info!(count = collection.cities.len(), "populated default cities");
        collection.persist();
        collection
    }

    fn load_stored(&self) -> Option<Vec<CitySnapshot>> {
        let raw = match self.store.read_blob(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored city list");
                return None;
            }
        };

        match serde_json::from_str::<Vec<CitySnapshot>>(&raw) {
            Ok(cities) if !cities.is_empty() => Some(cities),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unparseable stored city list");
                None
            }
        }
    }

    /// Current list in display order.
    pub fn cities(&self) -> &[CitySnapshot] {
        &self.cities
    }

    /// Message from the most recent failed operation, if the last one failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Resolve `name` and append it to the end of the list.
    ///
    /// On failure the list is left untouched and [`Self::last_error`] is set.
    pub async fn add(&mut self, name: &str) -> Result<CitySnapshot, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.fail(CoreError::NotFound("empty city name".to_string())));
        }

        let snapshot = match self.source.snapshot_by_name(name).await {
            Ok(snapshot) => snapshot,
            Err(e) => return Err(self.fail(e)),
        };

        tracing::info!(id = %snapshot.id, name = %snapshot.name, "adding city");
        self.cities.push(snapshot.clone());
        self.persist();
        self.last_error = None;
        Ok(snapshot)
    }

    /// Remove every entry whose id equals `id`. Returns how many were removed.
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.cities.len();
        self.cities.retain(|c| c.id != id);
        let removed = before - self.cities.len();

        if removed > 0 {
            tracing::info!(%id, removed, "removed city");
            self.persist();
        }
        self.last_error = None;
        removed
    }

    /// Move the entry `source_id` to the position currently held by `target_id`.
    ///
    /// Entries in between shift by one, so moving A onto C in `[A, B, C]` gives
    /// `[B, C, A]`. Unknown ids and a move onto itself are no-ops. Returns
    /// whether the order changed.
    pub fn reorder(&mut self, source_id: &str, target_id: &str) -> bool {
        let from = self.cities.iter().position(|c| c.id == source_id);
        let to = self.cities.iter().position(|c| c.id == target_id);
        self.last_error = None;

        let (Some(from), Some(to)) = (from, to) else {
            return false;
        };
        if from == to {
            return false;
        }

        let moved = self.cities.remove(from);
        self.cities.insert(to, moved);
        tracing::info!(%source_id, from, to, "reordered city");
        self.persist();
        true
    }

    /// Write-through of the whole list. Failures are tolerated.
    fn persist(&self) {
        let blob = match serde_json::to_string(&self.cities) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(error = %e, "could not serialize city list");
                return;
            }
        };

        if let Err(e) = self.store.write_blob(&self.storage_key, &blob) {
            tracing::warn!(error = %e, "could not persist city list");
        }
    }

    fn fail(&mut self, err: CoreError) -> CoreError {
        tracing::warn!(error = %err, "city operation failed");
        self.last_error = Some(err.user_message());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBlobStore;
    use crate::testing::FakeSource;
    use std::sync::Arc;

    fn snapshot(id: &str) -> CitySnapshot {
        CitySnapshot {
            id: id.to_string(),
            name: format!("{id}, ES"),
            temperature: 20.0,
            icon_code: "01d".to_string(),
            description: "despejado".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    fn ids<S: WeatherRecordSource, B: BlobStore>(c: &CityCollection<S, B>) -> Vec<&str> {
        c.cities().iter().map(|c| c.id.as_str()).collect()
    }

    fn stored_ids(store: &MemoryBlobStore) -> Vec<String> {
        let raw = store.get(DEFAULT_STORAGE_KEY).expect("blob must be written");
        serde_json::from_str::<Vec<CitySnapshot>>(&raw)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect()
    }

    type Seeded = (CityCollection<FakeSource, Arc<MemoryBlobStore>>, Arc<MemoryBlobStore>);

    async fn seeded_with(source: FakeSource, ids: &[&str]) -> Seeded {
        let list: Vec<_> = ids.iter().map(|id| snapshot(id)).collect();
        let store = Arc::new(MemoryBlobStore::with_blob(
            DEFAULT_STORAGE_KEY,
            &serde_json::to_string(&list).unwrap(),
        ));
        let collection =
            CityCollection::initialize(source, store.clone(), CollectionOptions::default()).await;
        (collection, store)
    }

    async fn seeded(ids: &[&str]) -> Seeded {
        seeded_with(FakeSource::new(), ids).await
    }

    #[tokio::test]
    async fn stored_non_empty_list_is_adopted_verbatim() {
        let source = FakeSource::new();
        let (collection, _) = seeded_with(source.clone(), &["c", "a", "b"]).await;

        assert_eq!(ids(&collection), vec!["c", "a", "b"]);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn empty_stored_array_triggers_defaults() {
        let store = Arc::new(MemoryBlobStore::with_blob(DEFAULT_STORAGE_KEY, "[]"));
        let source = FakeSource::new();

        let collection =
            CityCollection::initialize(source.clone(), store.clone(), CollectionOptions::default())
                .await;

        let names: Vec<_> = collection.cities().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Madrid, ES", "Barcelona, ES", "Bilbao, ES", "Málaga, ES"]);
        assert_eq!(stored_ids(&store).len(), 4);
    }

    #[tokio::test]
    async fn garbage_blob_triggers_defaults_and_failures_are_dropped() {
        let store = Arc::new(MemoryBlobStore::with_blob(DEFAULT_STORAGE_KEY, "{not json"));
        let source = FakeSource::new().not_found("Bilbao");

        let collection =
            CityCollection::initialize(source, store.clone(), CollectionOptions::default()).await;

        let names: Vec<_> = collection.cities().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Madrid, ES", "Barcelona, ES", "Málaga, ES"]);
        assert_eq!(stored_ids(&store), ids(&collection));
    }

    #[tokio::test]
    async fn add_appends_and_persists() {
        let (mut collection, store) = seeded(&["a"]).await;

        let added = collection.add("  Madrid ").await.unwrap();

        assert_eq!(ids(&collection), vec!["a", added.id.as_str()]);
        assert_eq!(stored_ids(&store), ids(&collection));
        assert_eq!(collection.last_error(), None);
    }

    #[tokio::test]
    async fn add_same_city_twice_keeps_both() {
        let (mut collection, _) = seeded(&["a"]).await;

        let first = collection.add("Madrid").await.unwrap();
        let second = collection.add("Madrid").await.unwrap();

        assert_eq!(collection.cities().len(), 3);
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn add_unknown_city_leaves_list_and_sets_error() {
        let source = FakeSource::new().not_found("Nowhere12345");
        let (mut collection, store) = seeded_with(source, &["a"]).await;

        let err = collection.add("Nowhere12345").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(ids(&collection), vec!["a"]);
        assert!(!collection.last_error().unwrap_or_default().is_empty());
        assert_eq!(stored_ids(&store), vec!["a"]);
    }

    #[tokio::test]
    async fn add_blank_name_is_rejected() {
        let (mut collection, _) = seeded(&["a"]).await;

        assert!(collection.add("   ").await.is_err());
        assert_eq!(collection.cities().len(), 1);
        assert!(collection.last_error().is_some());
    }

    #[tokio::test]
    async fn add_without_credential_is_a_configuration_error() {
        let (mut collection, _) = seeded_with(FakeSource::new().without_key(), &["a"]).await;

        let err = collection.add("Madrid").await.unwrap_err();

        assert!(matches!(err, CoreError::Configuration(_)));
        assert_eq!(collection.cities().len(), 1);
        assert!(collection.last_error().is_some());
    }

    #[tokio::test]
    async fn successful_operation_clears_last_error() {
        let (mut collection, _) = seeded(&["a"]).await;

        collection.add("").await.unwrap_err();
        assert!(collection.last_error().is_some());

        collection.add("Madrid").await.unwrap();
        assert_eq!(collection.last_error(), None);
    }

    #[tokio::test]
    async fn add_then_remove_leaves_no_trace() {
        let (mut collection, store) = seeded(&["a"]).await;

        let added = collection.add("Madrid").await.unwrap();
        assert_eq!(collection.remove(&added.id), 1);

        assert!(collection.cities().iter().all(|c| c.id != added.id));
        assert_eq!(stored_ids(&store), vec!["a"]);
    }

    #[tokio::test]
    async fn remove_drops_every_duplicate_and_ignores_unknown_ids() {
        let (mut collection, store) = seeded(&["a", "dup", "b", "dup"]).await;

        assert_eq!(collection.remove("missing"), 0);
        assert_eq!(ids(&collection), vec!["a", "dup", "b", "dup"]);

        assert_eq!(collection.remove("dup"), 2);
        assert_eq!(ids(&collection), vec!["a", "b"]);
        assert_eq!(stored_ids(&store), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn reorder_moves_source_to_target_position() {
        let (mut collection, store) = seeded(&["A", "B", "C"]).await;

        assert!(collection.reorder("A", "C"));
        assert_eq!(ids(&collection), vec!["B", "C", "A"]);
        assert_eq!(stored_ids(&store), vec!["B", "C", "A"]);

        // Applying it again moves A back before C; the move is not idempotent.
        assert!(collection.reorder("A", "C"));
        assert_eq!(ids(&collection), vec!["B", "A", "C"]);
    }

    #[tokio::test]
    async fn reorder_backwards_shifts_intervening_entries() {
        let (mut collection, _) = seeded(&["A", "B", "C", "D"]).await;

        assert!(collection.reorder("D", "B"));
        assert_eq!(ids(&collection), vec!["A", "D", "B", "C"]);
    }

    #[tokio::test]
    async fn reorder_noops() {
        let (mut collection, _) = seeded(&["A", "B", "C"]).await;

        assert!(!collection.reorder("A", "A"));
        assert!(!collection.reorder("A", "missing"));
        assert!(!collection.reorder("missing", "B"));
        assert_eq!(ids(&collection), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn write_failures_do_not_roll_back() {
        let (mut collection, store) = seeded(&["A", "B"]).await;
        store.set_fail_writes(true);

        collection.remove("A");

        assert_eq!(ids(&collection), vec!["B"]);
        assert_eq!(stored_ids(&store), vec!["A", "B"]);
        assert_eq!(collection.last_error(), None);

        store.set_fail_writes(false);
        collection.reorder("B", "B");
        collection.add("Madrid").await.unwrap();
        assert_eq!(stored_ids(&store).len(), 2);
    }
}
