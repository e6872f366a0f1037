//! Generic record repository over the document store
//!
//! Every mutating operation runs inside exactly one `DocumentStore::with_lock`
//! call: locate, mutate and persist happen under the resource lock, so two
//! concurrent requests against the same collection are strictly ordered.

use std::fmt::{Debug, Display};
use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, instrument};

use crate::db::DocumentStore;
use crate::error::{AppError, AppResult};

pub mod collections;

pub use collections::{AuditLogs, Caregivers, Patients, Users};

/// A top-level record addressed by identifier.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Human-readable kind used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Describe why `self` cannot be stored next to `existing`, if it can't.
    fn conflict_with(&self, existing: &Self) -> Option<String> {
        (self.id() == existing.id()).then(|| format!("{} already exists: {}", Self::KIND, self.id()))
    }
}

/// A serialized document holding one named array of records.
pub trait Collection: Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Record: Record;

    /// Resource name, which selects both the lock and the file.
    const RESOURCE: &'static str;

    fn records(&self) -> &[Self::Record];
    fn records_mut(&mut self) -> &mut Vec<Self::Record>;
    fn into_records(self) -> Vec<Self::Record>;
}

/// An entry of an owner's nested list, addressed by a secondary key.
pub trait Child: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Key: Ord + Clone + Display + Debug + Send + Sync + 'static;

    const KIND: &'static str;

    fn key(&self) -> &Self::Key;

    /// Replace this entry with `incoming`, which carries the same key.
    fn replace_with(&mut self, incoming: Self) {
        *self = incoming;
    }
}

/// A child that accepts partial updates.
pub trait Mergeable: Child {
    type Patch: Send + 'static;

    fn merge(&mut self, patch: Self::Patch);
}

/// A record that owns a nested list of children.
pub trait Owner: Record {
    type Child: Child;

    fn children(&self) -> &[Self::Child];
    fn children_mut(&mut self) -> &mut Vec<Self::Child>;

    /// Called after a child was inserted or replaced.
    fn child_upserted(&mut self, _key: &ChildKey<Self>) {}

    /// Called after a child was removed from the list.
    fn child_removed(&mut self, _key: &ChildKey<Self>) {}
}

pub type ChildKey<O> = <<O as Owner>::Child as Child>::Key;

/// CRUD over one collection.
pub struct Repository<C> {
    store: DocumentStore,
    _collection: PhantomData<fn() -> C>,
}

impl<C> Clone for Repository<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _collection: PhantomData,
        }
    }
}

impl<C: Collection> Repository<C> {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            _collection: PhantomData,
        }
    }

    /// Snapshot of the whole collection in storage order.
    pub async fn list(&self) -> AppResult<Vec<C::Record>> {
        let document: C = self.store.load(C::RESOURCE).await?;
        Ok(document.into_records())
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<C::Record> {
        self.find_one(|record| record.id() == id)
            .await?
            .ok_or_else(|| AppError::not_found(<C::Record as Record>::KIND, id))
    }

    /// First record matching `predicate`, in storage order.
    pub async fn find_one<P>(&self, predicate: P) -> AppResult<Option<C::Record>>
    where
        P: Fn(&C::Record) -> bool,
    {
        let document: C = self.store.load(C::RESOURCE).await?;
        Ok(document.into_records().into_iter().find(|record| predicate(record)))
    }

    /// Append a record, rejecting it if it collides with an existing one.
    #[instrument(skip(self, record), fields(resource = C::RESOURCE, id = %record.id()))]
    pub async fn insert(&self, record: C::Record) -> AppResult<C::Record> {
        let inserted = self
            .store
            .with_lock(C::RESOURCE, move |document: &mut C| -> AppResult<C::Record> {
                if let Some(reason) = document
                    .records()
                    .iter()
                    .find_map(|existing| record.conflict_with(existing))
                {
                    return Err(AppError::Conflict(reason));
                }
                document.records_mut().push(record.clone());
                Ok(record)
            })
            .await?;

        info!("{} inserted", <C::Record as Record>::KIND);
        Ok(inserted)
    }

    #[instrument(skip(self), fields(resource = C::RESOURCE))]
    pub async fn delete(&self, id: &str) -> AppResult<C::Record> {
        let id = id.to_string();
        let removed = self
            .store
            .with_lock(C::RESOURCE, move |document: &mut C| -> AppResult<C::Record> {
                let records = document.records_mut();
                let index = records
                    .iter()
                    .position(|record| record.id() == id)
                    .ok_or_else(|| AppError::not_found(<C::Record as Record>::KIND, &id))?;
                Ok(records.remove(index))
            })
            .await?;

        info!("{} deleted", <C::Record as Record>::KIND);
        Ok(removed)
    }
}

impl<C> Repository<C>
where
    C: Collection,
    C::Record: Owner,
{
    pub async fn find_child(
        &self,
        owner_id: &str,
        key: &ChildKey<C::Record>,
    ) -> AppResult<<C::Record as Owner>::Child> {
        let owner = self.find_by_id(owner_id).await?;
        owner
            .children()
            .iter()
            .find(|child| child.key() == key)
            .cloned()
            .ok_or_else(|| AppError::not_found(<<C::Record as Owner>::Child as Child>::KIND, key))
    }

    /// Replace the owner's child with the same key, or append it.
    #[instrument(skip(self, child), fields(resource = C::RESOURCE, key = %child.key()))]
    pub async fn upsert_by_secondary_key(
        &self,
        owner_id: &str,
        child: <C::Record as Owner>::Child,
    ) -> AppResult<C::Record> {
        let owner_id = owner_id.to_string();
        self.store
            .with_lock(C::RESOURCE, move |document: &mut C| -> AppResult<C::Record> {
                let owner = owner_mut(document, &owner_id)?;
                let key = child.key().clone();
                match owner.children().iter().position(|c| *c.key() == key) {
                    Some(index) => owner.children_mut()[index].replace_with(child),
                    None => owner.children_mut().push(child),
                }
                owner.child_upserted(&key);
                Ok(owner.clone())
            })
            .await
    }

    /// Remove the owner's child with `key`.
    #[instrument(skip(self), fields(resource = C::RESOURCE, key = %key))]
    pub async fn remove(&self, owner_id: &str, key: &ChildKey<C::Record>) -> AppResult<C::Record> {
        let owner_id = owner_id.to_string();
        let key = key.clone();
        self.store
            .with_lock(C::RESOURCE, move |document: &mut C| -> AppResult<C::Record> {
                let owner = owner_mut(document, &owner_id)?;
                let index = owner
                    .children()
                    .iter()
                    .position(|c| *c.key() == key)
                    .ok_or_else(|| AppError::not_found(<<C::Record as Owner>::Child as Child>::KIND, &key))?;
                owner.children_mut().remove(index);
                owner.child_removed(&key);
                Ok(owner.clone())
            })
            .await
    }
}

impl<C> Repository<C>
where
    C: Collection,
    C::Record: Owner,
    <C::Record as Owner>::Child: Mergeable,
{
    /// Merge `patch` into the owner's child with `key`; unset fields are kept.
    #[instrument(skip(self, patch), fields(resource = C::RESOURCE, key = %key))]
    pub async fn update(
        &self,
        owner_id: &str,
        key: &ChildKey<C::Record>,
        patch: <<C::Record as Owner>::Child as Mergeable>::Patch,
    ) -> AppResult<<C::Record as Owner>::Child> {
        let owner_id = owner_id.to_string();
        let key = key.clone();
        self.store
            .with_lock(C::RESOURCE, move |document: &mut C| -> AppResult<<C::Record as Owner>::Child> {
                let owner = owner_mut(document, &owner_id)?;
                let child = owner
                    .children_mut()
                    .iter_mut()
                    .find(|c| *c.key() == key)
                    .ok_or_else(|| AppError::not_found(<<C::Record as Owner>::Child as Child>::KIND, &key))?;
                child.merge(patch);
                Ok(child.clone())
            })
            .await
    }
}

fn owner_mut<'a, C: Collection>(document: &'a mut C, id: &str) -> AppResult<&'a mut C::Record> {
    document
        .records_mut()
        .iter_mut()
        .find(|record| record.id() == id)
        .ok_or_else(|| AppError::not_found(<C::Record as Record>::KIND, id))
}
