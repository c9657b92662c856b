//! Text rendering of the admin tree.

use std::fmt::Write;

use super::client::AdminService;
use super::console::{AdminConsole, TagKey};
use super::rows::RowState;
use super::store::Snapshot;
use super::types::{CategoryId, TagId};

#[derive(Debug, Clone, PartialEq)]
pub enum RowMode {
    Viewing,
    Editing { draft: String },
    Saving { draft: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagRowView {
    pub id: TagId,
    pub name: String,
    pub mode: RowMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRowView {
    pub id: CategoryId,
    pub name: String,
    pub mode: RowMode,
    pub tags: Vec<TagRowView>,
    pub new_tag_draft: String,
}

/// Everything needed to draw the console once.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminView {
    pub categories: Vec<CategoryRowView>,
    pub new_category_draft: String,
    pub error: Option<String>,
}

fn row_mode<T: PartialEq>(row: &RowState<T>, candidate: &T) -> RowMode {
    match row {
        RowState::Editing { target, draft } if target == candidate => RowMode::Editing {
            draft: draft.clone(),
        },
        RowState::Committing { target, draft } if target == candidate => RowMode::Saving {
            draft: draft.clone(),
        },
        _ => RowMode::Viewing,
    }
}

impl AdminView {
    pub fn build<S: AdminService + ?Sized + 'static>(
        snapshot: &Snapshot,
        console: &AdminConsole<S>,
    ) -> Self {
        let categories = snapshot
            .categories()
            .iter()
            .map(|category| {
                let tags = snapshot
                    .tags_for(&category.id)
                    .iter()
                    .map(|tag| TagRowView {
                        id: tag.id.clone(),
                        name: tag.name.clone(),
                        mode: row_mode(
                            console.tag_row(),
                            &TagKey {
                                category_id: category.id.clone(),
                                tag_id: tag.id.clone(),
                            },
                        ),
                    })
                    .collect();

                CategoryRowView {
                    id: category.id.clone(),
                    name: category.name.clone(),
                    mode: row_mode(console.category_row(), &category.id),
                    tags,
                    new_tag_draft: console.new_tag_draft(&category.id).to_string(),
                }
            })
            .collect();

        Self {
            categories,
            new_category_draft: console.new_category_draft().to_string(),
            error: console.last_error().map(str::to_string),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Products admin: categories and tags\n");

        if self.categories.is_empty() {
            out.push_str("  (no categories)\n");
        }

        for category in &self.categories {
            let _ = match &category.mode {
                RowMode::Viewing => writeln!(out, "- [{}] {}", category.id, category.name),
                RowMode::Editing { draft } => {
                    writeln!(out, "* [{}] > {}_   (save-cat | cancel-cat)", category.id, draft)
                }
                RowMode::Saving { draft } => {
                    writeln!(out, "* [{}] > {}   (saving...)", category.id, draft)
                }
            };

            for tag in &category.tags {
                let _ = match &tag.mode {
                    RowMode::Viewing => writeln!(out, "    - [{}] {}", tag.id, tag.name),
                    RowMode::Editing { draft } => {
                        writeln!(out, "    * [{}] > {}_   (save-tag | cancel-tag)", tag.id, draft)
                    }
                    RowMode::Saving { draft } => {
                        writeln!(out, "    * [{}] > {}   (saving...)", tag.id, draft)
                    }
                };
            }

            let _ = writeln!(out, "    + new tag: \"{}\"", category.new_tag_draft);
        }

        let _ = writeln!(out, "+ new category: \"{}\"", self.new_category_draft);

        if let Some(error) = &self.error {
            let _ = writeln!(out, "! {}", error);
        }

        out
    }
}
