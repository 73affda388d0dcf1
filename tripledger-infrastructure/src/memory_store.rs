use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tripledger_application::{
    Field, FieldStream, FieldValue, StoreError, TripDocument, TripStore,
};

/// Trip document kept in memory, one watch channel per field.
///
/// Clones share the same channels, so an update through one handle reaches
/// every subscriber of every clone.
#[derive(Clone)]
pub struct InMemoryTripStore {
    channels: Arc<BTreeMap<Field, watch::Sender<FieldValue>>>,
}

impl InMemoryTripStore {
    pub fn new() -> Self {
        Self::from_document(TripDocument::default())
    }

    pub fn from_document(document: TripDocument) -> Self {
        let channels = Field::ALL
            .into_iter()
            .map(|field| (field, watch::Sender::new(document.get(field))))
            .collect();
        Self {
            channels: Arc::new(channels),
        }
    }

    /// Current value of one field.
    pub fn get(&self, field: Field) -> FieldValue {
        self.channels
            .get(&field)
            .map(|sender| sender.borrow().clone())
            .unwrap_or_else(|| FieldValue::empty(field))
    }

    /// Current value of every field.
    pub fn document(&self) -> TripDocument {
        let mut document = TripDocument::default();
        for field in Field::ALL {
            document.set(self.get(field));
        }
        document
    }

    pub(crate) fn replace(&self, value: FieldValue) -> Result<(), StoreError> {
        let field = value.field();
        let sender = self
            .channels
            .get(&field)
            .ok_or_else(|| StoreError::Unavailable(format!("no channel for {field}")))?;
        sender.send_replace(value);
        Ok(())
    }
}

impl Default for InMemoryTripStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TripStore for InMemoryTripStore {
    fn subscribe(&self, field: Field) -> Result<FieldStream, StoreError> {
        let sender = self
            .channels
            .get(&field)
            .ok_or_else(|| StoreError::Unavailable(format!("no channel for {field}")))?;
        Ok(Box::pin(WatchStream::new(sender.subscribe())))
    }

    async fn update(&self, value: FieldValue) -> Result<(), StoreError> {
        self.replace(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;
    use tripledger_domain::Member;

    #[tokio::test]
    async fn subscription_starts_with_current_value() {
        let store = InMemoryTripStore::new();
        store
            .update(FieldValue::Members(vec![Member::new("alice", "Alice")]))
            .await
            .expect("update");

        let mut stream = store.subscribe(Field::Members).expect("subscribe");

        assert_eq!(
            stream.next().await,
            Some(FieldValue::Members(vec![Member::new("alice", "Alice")]))
        );
    }

    #[tokio::test]
    async fn clones_share_channels() {
        let store = InMemoryTripStore::new();
        let other = store.clone();
        let mut stream = store.subscribe(Field::Members).expect("subscribe");
        assert_eq!(stream.next().await, Some(FieldValue::Members(Vec::new())));

        other
            .update(FieldValue::Members(vec![Member::new("bob", "Bob")]))
            .await
            .expect("update");

        assert_eq!(
            stream.next().await,
            Some(FieldValue::Members(vec![Member::new("bob", "Bob")]))
        );
        assert_eq!(store.document().members, vec![Member::new("bob", "Bob")]);
    }

    #[tokio::test]
    async fn last_writer_wins() {
        let store = InMemoryTripStore::new();
        store
            .update(FieldValue::Members(vec![Member::new("alice", "Alice")]))
            .await
            .expect("first");
        store
            .update(FieldValue::Members(vec![Member::new("carol", "Carol")]))
            .await
            .expect("second");

        assert_eq!(
            store.get(Field::Members),
            FieldValue::Members(vec![Member::new("carol", "Carol")])
        );
    }
}
