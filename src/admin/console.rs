//! Administration view model.
//!
//! Sequences remote calls and store mutations: call the service, and only on
//! success apply the matching store mutation behind a generation ticket.
//! Failures leave the store untouched and are kept in `last_error`.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use super::client::AdminService;
use super::rows::{transition, RowEffect, RowEvent, RowState};
use super::store::{load_store, EntityRef, Snapshot, StaleMutation, StoreHandle, StoreMutation};
use super::types::{Category, CategoryId, Tag, TagId};
use crate::shared::errors::ServiceError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Discarded result: {0}")]
    Stale(#[from] StaleMutation),
    #[error("No {0} is being edited")]
    NoActiveEdit(&'static str),
    #[error("Unknown category {0}")]
    UnknownCategory(CategoryId),
    #[error("Unknown tag {tag_id} in category {category_id}")]
    UnknownTag {
        category_id: CategoryId,
        tag_id: TagId,
    },
}

/// Identifies a tag row: tags are addressed through their owning category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagKey {
    pub category_id: CategoryId,
    pub tag_id: TagId,
}

/// Drives one admin session.
///
/// Every operation holds `&mut self` until its remote call finishes, so
/// operations on one console run one at a time and a ticket taken by one of
/// them cannot be invalidated before it is checked. `ConsoleError::Stale`
/// therefore only surfaces if that sequencing is bypassed.
pub struct AdminConsole<S: AdminService + ?Sized> {
    service: Arc<S>,
    store: StoreHandle,
    fetch_concurrency: usize,
    category_row: RowState<CategoryId>,
    tag_row: RowState<TagKey>,
    new_category: String,
    new_tags: HashMap<CategoryId, String>,
    last_error: Option<String>,
}

impl<S: AdminService + ?Sized + 'static> AdminConsole<S> {
    pub fn new(service: Arc<S>, fetch_concurrency: usize) -> Self {
        Self {
            service,
            store: StoreHandle::new(Default::default()),
            fetch_concurrency,
            category_row: RowState::Viewing,
            tag_row: RowState::Viewing,
            new_category: String::new(),
            new_tags: HashMap::new(),
            last_error: None,
        }
    }

    /// Rebuild the store from the server. Per-category tag failures degrade to
    /// empty lists; a category list failure leaves the current store in place.
    pub async fn load(&mut self) -> Result<(), ConsoleError> {
        let result = load_store(Arc::clone(&self.service), self.fetch_concurrency).await;
        let store = self.record(result.map_err(ConsoleError::from))?;
        self.store.replace(store);
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.store.subscribe()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }

    pub fn category_row(&self) -> &RowState<CategoryId> {
        &self.category_row
    }

    pub fn tag_row(&self) -> &RowState<TagKey> {
        &self.tag_row
    }

    pub fn new_category_draft(&self) -> &str {
        &self.new_category
    }

    pub fn new_tag_draft(&self, category_id: &CategoryId) -> &str {
        self.new_tags.get(category_id).map(String::as_str).unwrap_or("")
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    // ---- category rows ----

    pub fn begin_edit_category(&mut self, id: &CategoryId) -> Result<(), ConsoleError> {
        let current_name = match self.store.store().category(id) {
            Some(category) => category.name.clone(),
            None => return self.record(Err(ConsoleError::UnknownCategory(id.clone()))),
        };

        self.category_row = transition(
            std::mem::take(&mut self.category_row),
            RowEvent::EditRequested {
                target: id.clone(),
                current_name,
            },
        )
        .0;
        Ok(())
    }

    pub fn set_category_draft(&mut self, draft: impl Into<String>) {
        self.category_row = transition(
            std::mem::take(&mut self.category_row),
            RowEvent::DraftChanged(draft.into()),
        )
        .0;
    }

    pub fn cancel_category_edit(&mut self) {
        self.category_row = transition(
            std::mem::take(&mut self.category_row),
            RowEvent::CancelRequested,
        )
        .0;
    }

    pub async fn save_category(&mut self) -> Result<Category, ConsoleError> {
        let (state, effects) = transition(
            std::mem::take(&mut self.category_row),
            RowEvent::SaveRequested,
        );
        self.category_row = state;

        let Some((id, name)) = submitted(effects) else {
            return self.record(Err(ConsoleError::NoActiveEdit("category")));
        };

        let ticket = self.store.ticket(EntityRef::Category(id.clone()));
        match self.service.update_category(&id, &name).await {
            Ok(updated) => {
                self.category_row = transition(
                    std::mem::take(&mut self.category_row),
                    RowEvent::SaveSucceeded,
                )
                .0;
                let applied = self.store.apply_if_current(
                    &ticket,
                    StoreMutation::UpdateCategory {
                        id,
                        record: updated.clone(),
                    },
                );
                self.record(applied.map(|_| updated).map_err(ConsoleError::from))
            }
            Err(e) => {
                let (state, effects) = transition(
                    std::mem::take(&mut self.category_row),
                    RowEvent::SaveFailed {
                        message: e.to_string(),
                    },
                );
                self.category_row = state;
                self.report(effects);
                Err(e.into())
            }
        }
    }

    pub fn set_new_category_draft(&mut self, draft: impl Into<String>) {
        self.new_category = draft.into();
    }

    /// Create a category from the top-level draft. Empty names go to the server as-is.
    pub async fn submit_new_category(&mut self) -> Result<Category, ConsoleError> {
        let ticket = self.store.ticket(EntityRef::Root);
        let created = match self.service.create_category(&self.new_category).await {
            Ok(created) => created,
            Err(e) => return self.record(Err(e.into())),
        };

        let tags = match self.service.list_tags(&created.id).await {
            Ok(tags) => tags,
            Err(e) => {
                crate::log_target!("admin", warn, "Tags for new category {} unavailable: {}", created.id, e);
                Vec::new()
            }
        };

        let applied = self.store.apply_if_current(
            &ticket,
            StoreMutation::AddCategory {
                category: created.clone(),
                tags,
            },
        );
        self.record(applied.map_err(ConsoleError::from))?;

        crate::log_target!("admin", info, "Created category {} ({})", created.id, created.name);
        self.new_category.clear();
        Ok(created)
    }

    pub async fn delete_category(&mut self, id: &CategoryId) -> Result<(), ConsoleError> {
        self.ensure_category(id)?;
        let ticket = self.store.ticket(EntityRef::Category(id.clone()));
        if let Err(e) = self.service.delete_category(id).await {
            return self.record(Err(e.into()));
        }

        let applied = self
            .store
            .apply_if_current(&ticket, StoreMutation::RemoveCategory { id: id.clone() });
        self.record(applied.map_err(ConsoleError::from))?;

        self.new_tags.remove(id);
        if self.category_row.is_editing(id) {
            self.category_row = RowState::Viewing;
        }
        if self.tag_row.target().is_some_and(|key| &key.category_id == id) {
            self.tag_row = RowState::Viewing;
        }

        crate::log_target!("admin", info, "Deleted category {}", id);
        Ok(())
    }

    // ---- tag rows ----

    pub fn begin_edit_tag(
        &mut self,
        category_id: &CategoryId,
        tag_id: &TagId,
    ) -> Result<(), ConsoleError> {
        let current_name = match self.store.store().tag(category_id, tag_id) {
            Some(tag) => tag.name.clone(),
            None => {
                return self.record(Err(ConsoleError::UnknownTag {
                    category_id: category_id.clone(),
                    tag_id: tag_id.clone(),
                }))
            }
        };

        self.tag_row = transition(
            std::mem::take(&mut self.tag_row),
            RowEvent::EditRequested {
                target: TagKey {
                    category_id: category_id.clone(),
                    tag_id: tag_id.clone(),
                },
                current_name,
            },
        )
        .0;
        Ok(())
    }

    pub fn set_tag_draft(&mut self, draft: impl Into<String>) {
        self.tag_row = transition(
            std::mem::take(&mut self.tag_row),
            RowEvent::DraftChanged(draft.into()),
        )
        .0;
    }

    pub fn cancel_tag_edit(&mut self) {
        self.tag_row = transition(std::mem::take(&mut self.tag_row), RowEvent::CancelRequested).0;
    }

    pub async fn save_tag(&mut self) -> Result<Tag, ConsoleError> {
        let (state, effects) = transition(std::mem::take(&mut self.tag_row), RowEvent::SaveRequested);
        self.tag_row = state;

        let Some((key, name)) = submitted(effects) else {
            return self.record(Err(ConsoleError::NoActiveEdit("tag")));
        };

        let ticket = self.store.ticket(EntityRef::Tag {
            category_id: key.category_id.clone(),
            tag_id: key.tag_id.clone(),
        });
        match self
            .service
            .update_tag(&key.tag_id, &name, &key.category_id)
            .await
        {
            Ok(updated) => {
                self.tag_row = transition(std::mem::take(&mut self.tag_row), RowEvent::SaveSucceeded).0;
                let applied = self.store.apply_if_current(
                    &ticket,
                    StoreMutation::UpdateTag {
                        tag_id: key.tag_id,
                        category_id: key.category_id,
                        record: updated.clone(),
                    },
                );
                self.record(applied.map(|_| updated).map_err(ConsoleError::from))
            }
            Err(e) => {
                let (state, effects) = transition(
                    std::mem::take(&mut self.tag_row),
                    RowEvent::SaveFailed {
                        message: e.to_string(),
                    },
                );
                self.tag_row = state;
                self.report(effects);
                Err(e.into())
            }
        }
    }

    pub fn set_new_tag_draft(&mut self, category_id: &CategoryId, draft: impl Into<String>) {
        self.new_tags.insert(category_id.clone(), draft.into());
    }

    /// Create a tag from the category's draft. Empty names go to the server as-is.
    pub async fn submit_new_tag(&mut self, category_id: &CategoryId) -> Result<Tag, ConsoleError> {
        self.ensure_category(category_id)?;
        let ticket = self.store.ticket(EntityRef::Category(category_id.clone()));
        let name = self.new_tag_draft(category_id).to_string();

        let created = match self.service.create_tag(&name, category_id).await {
            Ok(created) => created,
            Err(e) => return self.record(Err(e.into())),
        };

        let applied = self.store.apply_if_current(
            &ticket,
            StoreMutation::AddTag {
                category_id: category_id.clone(),
                tag: created.clone(),
            },
        );
        self.record(applied.map_err(ConsoleError::from))?;

        crate::log_target!("admin", info, "Created tag {} in category {}", created.id, category_id);
        self.new_tags.insert(category_id.clone(), String::new());
        Ok(created)
    }

    pub async fn delete_tag(
        &mut self,
        category_id: &CategoryId,
        tag_id: &TagId,
    ) -> Result<(), ConsoleError> {
        if self.store.store().tag(category_id, tag_id).is_none() {
            return self.record(Err(ConsoleError::UnknownTag {
                category_id: category_id.clone(),
                tag_id: tag_id.clone(),
            }));
        }
        let ticket = self.store.ticket(EntityRef::Tag {
            category_id: category_id.clone(),
            tag_id: tag_id.clone(),
        });
        if let Err(e) = self.service.delete_tag(tag_id).await {
            return self.record(Err(e.into()));
        }

        let applied = self.store.apply_if_current(
            &ticket,
            StoreMutation::RemoveTag {
                tag_id: tag_id.clone(),
                category_id: category_id.clone(),
            },
        );
        self.record(applied.map_err(ConsoleError::from))?;

        let key = TagKey {
            category_id: category_id.clone(),
            tag_id: tag_id.clone(),
        };
        if self.tag_row.is_editing(&key) {
            self.tag_row = RowState::Viewing;
        }

        crate::log_target!("admin", info, "Deleted tag {} from category {}", tag_id, category_id);
        Ok(())
    }

    // ---- helpers ----

    fn ensure_category(&mut self, id: &CategoryId) -> Result<(), ConsoleError> {
        if self.store.store().contains_category(id) {
            Ok(())
        } else {
            self.record(Err(ConsoleError::UnknownCategory(id.clone())))
        }
    }

    fn report<T>(&mut self, effects: Vec<RowEffect<T>>) {
        for effect in effects {
            if let RowEffect::ReportError { message } = effect {
                crate::log_target!("admin", warn, "{}", message);
                self.last_error = Some(message);
            }
        }
    }

    fn record<T>(&mut self, result: Result<T, ConsoleError>) -> Result<T, ConsoleError> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(e) => {
                crate::log_target!("admin", warn, "{}", e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

fn submitted<T>(effects: Vec<RowEffect<T>>) -> Option<(T, String)> {
    effects.into_iter().find_map(|effect| match effect {
        RowEffect::SubmitUpdate { target, name } => Some((target, name)),
        _ => None,
    })
}
