//! Pure state machine for an inline-editable row.
//!
//! `(RowState, RowEvent) -> (RowState, Vec<RowEffect>)`. The console owns one
//! slot per entity class and executes the effects; this module never does I/O.
//! Events that make no sense in the current state return it unchanged with no
//! effects.

/// Editing state of the single row slot for one entity class.
#[derive(Debug, Clone, PartialEq)]
pub enum RowState<T> {
    /// Every row shows its name with edit and delete triggers.
    Viewing,

    /// One row shows a text input seeded with its name.
    Editing { target: T, draft: String },

    /// Save was pressed; the update call is in flight.
    Committing { target: T, draft: String },
}

impl<T> Default for RowState<T> {
    fn default() -> Self {
        RowState::Viewing
    }
}

impl<T: PartialEq> RowState<T> {
    pub fn target(&self) -> Option<&T> {
        match self {
            RowState::Viewing => None,
            RowState::Editing { target, .. } | RowState::Committing { target, .. } => Some(target),
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            RowState::Viewing => None,
            RowState::Editing { draft, .. } | RowState::Committing { draft, .. } => Some(draft),
        }
    }

    pub fn is_editing(&self, candidate: &T) -> bool {
        self.target() == Some(candidate)
    }

    pub fn is_committing(&self) -> bool {
        matches!(self, RowState::Committing { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowEvent<T> {
    /// Edit trigger pressed on a row. Replaces any other open edit.
    EditRequested { target: T, current_name: String },

    DraftChanged(String),

    SaveRequested,

    SaveSucceeded,

    SaveFailed { message: String },

    CancelRequested,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowEffect<T> {
    /// Call the remote update with the draft.
    SubmitUpdate { target: T, name: String },

    /// Surface a failure to the user.
    ReportError { message: String },
}

pub fn transition<T: Clone>(state: RowState<T>, event: RowEvent<T>) -> (RowState<T>, Vec<RowEffect<T>>) {
    match (state, event) {
        // any state + EditRequested -> Editing, previous draft discarded
        (_, RowEvent::EditRequested {
            target,
            current_name,
        }) => (
            RowState::Editing {
                target,
                draft: current_name,
            },
            vec![],
        ),

        (RowState::Editing { target, .. }, RowEvent::DraftChanged(draft)) => {
            (RowState::Editing { target, draft }, vec![])
        }

        (RowState::Editing { target, draft }, RowEvent::SaveRequested) => {
            let effects = vec![RowEffect::SubmitUpdate {
                target: target.clone(),
                name: draft.clone(),
            }];
            (RowState::Committing { target, draft }, effects)
        }

        (RowState::Committing { .. }, RowEvent::SaveSucceeded) => (RowState::Viewing, vec![]),

        // failed commit keeps the row open with the same draft
        (RowState::Committing { target, draft }, RowEvent::SaveFailed { message }) => (
            RowState::Editing { target, draft },
            vec![RowEffect::ReportError { message }],
        ),

        // row was closed meanwhile, still report
        (state, RowEvent::SaveFailed { message }) => {
            (state, vec![RowEffect::ReportError { message }])
        }

        (RowState::Editing { .. } | RowState::Committing { .. }, RowEvent::CancelRequested) => {
            (RowState::Viewing, vec![])
        }

        (state, _) => (state, vec![]),
    }
}
