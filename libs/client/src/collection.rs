//! A user's records as shown on a list screen

use tracing::warn;

use crate::{client::JournalClient, error::ClientError, filter::RecordFilter, models::Entity};

/// The signed-in user's records of one type, with a filtered view
pub struct Collection<T: Entity> {
    client: JournalClient,
    records: Vec<T>,
    filter: RecordFilter,
}

impl<T: Entity> Collection<T> {
    pub fn new(client: JournalClient) -> Self {
        Self::with_records(client, Vec::new())
    }

    /// Start from records that were already fetched
    pub fn with_records(client: JournalClient, records: Vec<T>) -> Self {
        Self {
            client,
            records,
            filter: RecordFilter::default(),
        }
    }

    /// Replace the local records with the server's
    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.records = self.client.list().await?;
        Ok(())
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Records passing the current filter, in list order
    pub fn visible(&self) -> Vec<&T> {
        self.filter.apply(&self.records)
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: RecordFilter) {
        self.filter = filter;
    }

    /// Create a record and put it at the top of the list
    pub async fn add(&mut self, record: &T) -> Result<&T, ClientError> {
        let created = self.client.create(record).await?;
        self.records.insert(0, created);
        Ok(&self.records[0])
    }

    /// Save a record and replace the local copy with the server's answer
    pub async fn save(&mut self, id: i64, record: &T) -> Result<&T, ClientError> {
        let updated = self.client.update(id, record).await?;

        match self.records.iter().position(|r| r.id() == Some(id)) {
            Some(index) => {
                self.records[index] = updated;
                Ok(&self.records[index])
            }
            None => {
                self.records.insert(0, updated);
                Ok(&self.records[0])
            }
        }
    }

    /// Remove a record locally, then on the server
    ///
    /// If the server refuses, the list is reloaded from it; when that fails
    /// too the previous local list is put back. The delete error is returned
    /// either way.
    pub async fn remove(&mut self, id: i64) -> Result<(), ClientError> {
        let previous = self.records.clone();
        self.records.retain(|r| r.id() != Some(id));

        let Err(err) = self.client.delete::<T>(id).await else {
            return Ok(());
        };

        warn!("Deleting {} {} failed: {}", T::PATH, id, err);
        if let Err(reload) = self.load().await {
            warn!("Reloading {} failed: {}", T::PATH, reload);
            self.records = previous;
        }

        Err(err)
    }
}
