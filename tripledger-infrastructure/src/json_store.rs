use crate::memory_store::InMemoryTripStore;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tripledger_application::{Field, FieldStream, FieldValue, StoreError, TripDocument, TripStore};

/// The trip document persisted as one JSON file.
///
/// Every update rewrites the whole file through a temporary sibling and a
/// rename, then publishes the field to subscribers. A failed write publishes
/// nothing.
pub struct JsonFileTripStore {
    path: PathBuf,
    cache: InMemoryTripStore,
    write_lock: Mutex<()>,
}

impl JsonFileTripStore {
    /// Opens `path`, starting from an empty trip when the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<TripDocument>(&bytes)
                .map_err(|err| StoreError::Serialization(format!("{}: {err}", path.display())))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Trip document not found; starting empty");
                TripDocument::default()
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            cache: InMemoryTripStore::from_document(document),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> TripDocument {
        self.cache.document()
    }

    async fn write_document(&self, document: &TripDocument) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

impl TripStore for JsonFileTripStore {
    fn subscribe(&self, field: Field) -> Result<FieldStream, StoreError> {
        self.cache.subscribe(field)
    }

    async fn update(&self, value: FieldValue) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.cache.document();
        document.set(value.clone());
        self.write_document(&document).await?;
        self.cache.replace(value)
    }
}
