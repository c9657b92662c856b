//! In-memory mirror of the server's categories and their tags.
//!
//! Mutations are pure state transitions applied only after the matching remote
//! call succeeded. [`StoreHandle`] publishes an immutable snapshot after each
//! one so views can redraw.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

use super::client::AdminService;
use super::types::{Category, CategoryId, Tag, TagId};
use crate::shared::errors::ServiceError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTagStore {
    categories: Vec<Category>,
    tags: HashMap<CategoryId, Vec<Tag>>,
    generation: u64,
}

/// Immutable view handed to subscribers.
pub type Snapshot = CategoryTagStore;

/// The entity a pending remote call will mutate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    /// Category creation has nothing that can disappear underneath it.
    Root,
    Category(CategoryId),
    Tag {
        category_id: CategoryId,
        tag_id: TagId,
    },
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Root => f.write_str("category list"),
            EntityRef::Category(id) => write!(f, "category {}", id),
            EntityRef::Tag {
                category_id,
                tag_id,
            } => write!(f, "tag {} in category {}", tag_id, category_id),
        }
    }
}

/// Taken before a remote call is issued, checked when it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub target: EntityRef,
    pub generation: u64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{target} no longer exists (issued at generation {issued_at}, now {current})")]
pub struct StaleMutation {
    pub target: EntityRef,
    pub issued_at: u64,
    pub current: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreMutation {
    AddCategory {
        category: Category,
        tags: Vec<Tag>,
    },
    UpdateCategory {
        id: CategoryId,
        record: Category,
    },
    RemoveCategory {
        id: CategoryId,
    },
    AddTag {
        category_id: CategoryId,
        tag: Tag,
    },
    UpdateTag {
        tag_id: TagId,
        category_id: CategoryId,
        record: Tag,
    },
    RemoveTag {
        tag_id: TagId,
        category_id: CategoryId,
    },
}

impl CategoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a fresh load. Every category gets an index entry; entries
    /// for unknown categories are dropped and tags are re-owned by their key.
    pub fn from_parts(categories: Vec<Category>, mut tags: HashMap<CategoryId, Vec<Tag>>) -> Self {
        let index = categories
            .iter()
            .map(|category| {
                let mut list = tags.remove(&category.id).unwrap_or_default();
                for tag in &mut list {
                    tag.category_id = category.id.clone();
                }
                (category.id.clone(), list)
            })
            .collect();

        Self {
            categories,
            tags: index,
            generation: 0,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    pub fn contains_category(&self, id: &CategoryId) -> bool {
        self.category(id).is_some()
    }

    /// Tags of a category. A missing entry reads as no tags.
    pub fn tags_for(&self, id: &CategoryId) -> &[Tag] {
        self.tags.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tag(&self, category_id: &CategoryId, tag_id: &TagId) -> Option<&Tag> {
        self.tags_for(category_id).iter().find(|t| &t.id == tag_id)
    }

    pub fn has_index_entry(&self, id: &CategoryId) -> bool {
        self.tags.contains_key(id)
    }

    pub fn index_keys(&self) -> impl Iterator<Item = &CategoryId> {
        self.tags.keys()
    }

    /// Bumped by every mutation that changed something.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn exists(&self, target: &EntityRef) -> bool {
        match target {
            EntityRef::Root => true,
            EntityRef::Category(id) => self.contains_category(id),
            EntityRef::Tag {
                category_id,
                tag_id,
            } => self.tag(category_id, tag_id).is_some(),
        }
    }

    pub fn ticket(&self, target: EntityRef) -> Ticket {
        Ticket {
            target,
            generation: self.generation,
        }
    }

    /// Apply `mutation` only if the ticket's target still exists.
    pub fn apply_if_current(
        &mut self,
        ticket: &Ticket,
        mutation: StoreMutation,
    ) -> Result<bool, StaleMutation> {
        if !self.exists(&ticket.target) {
            return Err(StaleMutation {
                target: ticket.target.clone(),
                issued_at: ticket.generation,
                current: self.generation,
            });
        }
        Ok(self.apply(mutation))
    }

    /// Returns whether the store changed.
    pub fn apply(&mut self, mutation: StoreMutation) -> bool {
        let changed = match mutation {
            StoreMutation::AddCategory { category, tags } => self.add_category(category, tags),
            StoreMutation::UpdateCategory { id, record } => self.update_category(&id, record),
            StoreMutation::RemoveCategory { id } => self.remove_category(&id),
            StoreMutation::AddTag { category_id, tag } => self.add_tag(&category_id, tag),
            StoreMutation::UpdateTag {
                tag_id,
                category_id,
                record,
            } => self.update_tag(&tag_id, &category_id, record),
            StoreMutation::RemoveTag {
                tag_id,
                category_id,
            } => self.remove_tag(&tag_id, &category_id),
        };

        if changed {
            self.generation += 1;
        }
        changed
    }

    fn add_category(&mut self, category: Category, mut tags: Vec<Tag>) -> bool {
        for tag in &mut tags {
            tag.category_id = category.id.clone();
        }

        // server ids are unique; a repeat means we already hold this record
        if let Some(existing) = self.categories.iter_mut().find(|c| c.id == category.id) {
            *existing = category;
            return true;
        }

        self.tags.insert(category.id.clone(), tags);
        self.categories.push(category);
        true
    }

    fn update_category(&mut self, id: &CategoryId, record: Category) -> bool {
        match self.categories.iter_mut().find(|c| &c.id == id) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => false,
        }
    }

    fn remove_category(&mut self, id: &CategoryId) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| &c.id != id);
        let removed = self.categories.len() != before;
        if removed {
            self.tags.remove(id);
        }
        removed
    }

    fn add_tag(&mut self, category_id: &CategoryId, mut tag: Tag) -> bool {
        if !self.contains_category(category_id) {
            return false;
        }

        tag.category_id = category_id.clone();
        self.tags.entry(category_id.clone()).or_default().push(tag);
        true
    }

    fn update_tag(&mut self, tag_id: &TagId, category_id: &CategoryId, mut record: Tag) -> bool {
        let Some(list) = self.tags.get_mut(category_id) else {
            return false;
        };
        let Some(pos) = list.iter().position(|t| &t.id == tag_id) else {
            return false;
        };

        if &record.category_id == category_id {
            list[pos] = record;
            return true;
        }

        // moved to another category
        list.remove(pos);
        let target = record.category_id.clone();
        if self.contains_category(&target) {
            record.category_id = target.clone();
            self.tags.entry(target).or_default().push(record);
        }
        true
    }

    fn remove_tag(&mut self, tag_id: &TagId, category_id: &CategoryId) -> bool {
        let Some(list) = self.tags.get_mut(category_id) else {
            return false;
        };
        let before = list.len();
        list.retain(|t| &t.id != tag_id);
        list.len() != before
    }
}

/// Load categories, then every category's tags with at most `concurrency`
/// requests in flight. A failed tag fetch leaves that category empty.
pub async fn load_store<S>(
    service: Arc<S>,
    concurrency: usize,
) -> Result<CategoryTagStore, ServiceError>
where
    S: AdminService + ?Sized + 'static,
{
    let categories = service.list_categories().await?;
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for category in &categories {
        let service = Arc::clone(&service);
        let semaphore = Arc::clone(&semaphore);
        let id = category.id.clone();

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let result = service.list_tags(&id).await;
            (id, result)
        });
    }

    let mut index = HashMap::with_capacity(categories.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((id, Ok(tags))) => {
                index.insert(id, tags);
            }
            Ok((id, Err(e))) => {
                crate::log_target!("admin", warn, "Tags for category {} unavailable: {}", id, e);
                index.insert(id, Vec::new());
            }
            Err(e) => {
                crate::log_target!("admin", error, "Tag fetch task aborted: {}", e);
            }
        }
    }

    crate::log_target!(
        "admin",
        info,
        "Loaded {} categories, {} tags",
        categories.len(),
        index.values().map(Vec::len).sum::<usize>()
    );

    Ok(CategoryTagStore::from_parts(categories, index))
}

/// Owns the store and broadcasts a snapshot after every mutation.
pub struct StoreHandle {
    store: CategoryTagStore,
    tx: watch::Sender<Arc<Snapshot>>,
}

impl StoreHandle {
    pub fn new(store: CategoryTagStore) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(store.clone()));
        Self { store, tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn store(&self) -> &CategoryTagStore {
        &self.store
    }

    pub fn ticket(&self, target: EntityRef) -> Ticket {
        self.store.ticket(target)
    }

    /// Replace everything, e.g. after a reload.
    pub fn replace(&mut self, store: CategoryTagStore) {
        let generation = self.store.generation + 1;
        self.store = store;
        self.store.generation = generation;
        self.publish();
    }

    pub fn apply_if_current(
        &mut self,
        ticket: &Ticket,
        mutation: StoreMutation,
    ) -> Result<bool, StaleMutation> {
        let changed = self.store.apply_if_current(ticket, mutation)?;
        if changed {
            self.publish();
        }
        Ok(changed)
    }

    fn publish(&self) {
        self.tx.send_replace(Arc::new(self.store.clone()));
    }
}
