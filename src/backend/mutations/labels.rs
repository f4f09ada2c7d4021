/**
 * Label Mutations
 *
 * Labels belong to a board and are attached to cards through join rows.
 * Deleting a label is a hard delete that also detaches it everywhere.
 */

use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::mutations::{active_board, Applied};
use crate::backend::store::BoardStore;
use crate::shared::board::{sort_labels, timestamp, Label, DEFAULT_LABEL_COLOR};
use crate::shared::error::require;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLabel {
    pub board_id: Option<Uuid>,
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

async fn find_label(store: &dyn BoardStore, label_id: Uuid) -> BackendResult<Label> {
    store
        .get_label(label_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Label", label_id))
}

pub async fn board_labels(store: &dyn BoardStore, board_id: Uuid) -> BackendResult<Vec<Label>> {
    active_board(store, board_id).await?;
    let mut labels = store.labels_for_board(board_id).await?;
    sort_labels(&mut labels);
    Ok(labels)
}

/// Unnamed labels are allowed; colour defaults to green
pub async fn create_label(store: &dyn BoardStore, input: NewLabel) -> BackendResult<Applied<Label>> {
    let board_id = require("boardId", input.board_id)?;
    active_board(store, board_id).await?;

    let label = Label {
        id: Uuid::new_v4(),
        board_id,
        name: input.name.unwrap_or_default(),
        color: input
            .color
            .unwrap_or_else(|| DEFAULT_LABEL_COLOR.to_string()),
        created_at: timestamp(),
    };
    store.insert_label(&label).await?;

    tracing::debug!("[Board] Created label {} on board {}", label.id, board_id);
    Ok(Applied::new(board_id, label))
}

pub async fn update_label(
    store: &dyn BoardStore,
    label_id: Uuid,
    patch: LabelPatch,
) -> BackendResult<Applied<Label>> {
    let mut label = find_label(store, label_id).await?;
    if let Some(name) = patch.name {
        label.name = name;
    }
    if let Some(color) = patch.color {
        label.color = color;
    }
    store.update_label(&label).await?;

    tracing::debug!("[Board] Updated label {}", label_id);
    Ok(Applied::new(label.board_id, label))
}

/// Returns the label as it was before deletion
pub async fn delete_label(store: &dyn BoardStore, label_id: Uuid) -> BackendResult<Applied<Label>> {
    let label = find_label(store, label_id).await?;
    if !store.delete_label(label_id).await? {
        return Err(BackendError::not_found("Label", label_id));
    }
    tracing::debug!("[Board] Deleted label {}", label_id);
    Ok(Applied::new(label.board_id, label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mutations::fixtures::fixture;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_create_defaults_colour() {
        let f = fixture().await;
        let label = create_label(
            &f.store,
            NewLabel {
                board_id: Some(f.board_id),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .value;
        assert_eq!(label.color, DEFAULT_LABEL_COLOR);
        assert_eq!(label.name, "");
    }

    #[tokio::test]
    async fn test_create_requires_existing_board() {
        let f = fixture().await;
        assert_matches!(
            create_label(&f.store, NewLabel::default()).await,
            Err(BackendError::Validation { .. })
        );
        assert_matches!(
            create_label(
                &f.store,
                NewLabel {
                    board_id: Some(Uuid::new_v4()),
                    ..Default::default()
                }
            )
            .await,
            Err(BackendError::NotFound { entity: "Board", .. })
        );
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let f = fixture().await;
        let seeded = board_labels(&f.store, f.board_id).await.unwrap();
        let target = seeded[0].id;

        let renamed = update_label(
            &f.store,
            target,
            LabelPatch {
                name: Some("Urgent".to_string()),
                color: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.value.name, "Urgent");

        delete_label(&f.store, target).await.unwrap();
        assert_eq!(
            board_labels(&f.store, f.board_id).await.unwrap().len(),
            seeded.len() - 1
        );
        assert_matches!(
            delete_label(&f.store, target).await,
            Err(BackendError::NotFound { .. })
        );
    }
}
