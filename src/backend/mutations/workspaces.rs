/**
 * Workspace Mutations
 *
 * Workspaces group boards and carry a member list. They live outside any
 * board channel, so nothing here produces events. Only the owner may
 * delete a workspace; its active boards are archived first and the
 * workspace row with its member rows is then removed.
 */

use serde::Deserialize;
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::mutations::{boards, nullable};
use crate::backend::reader::hydrate_members;
use crate::backend::store::BoardStore;
use crate::shared::board::{timestamp, Membership, Role, Workspace, WorkspaceView};
use crate::shared::error::require_text;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkspace {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspacePatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

async fn find_workspace(store: &dyn BoardStore, workspace_id: Uuid) -> BackendResult<Workspace> {
    store
        .get_workspace(workspace_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Workspace", workspace_id))
}

/// Members with roles and active boards
async fn hydrate_workspace(
    store: &dyn BoardStore,
    workspace: Workspace,
) -> BackendResult<WorkspaceView> {
    let members = hydrate_members(store, store.workspace_members(workspace.id).await?).await?;
    let boards = boards::list_boards(store, Some(workspace.id)).await?;
    Ok(WorkspaceView::new(workspace, members, boards))
}

/// Workspaces the user belongs to, oldest first
pub async fn list_workspaces(
    store: &dyn BoardStore,
    user_id: Uuid,
) -> BackendResult<Vec<WorkspaceView>> {
    let mut workspaces = store.workspaces_for_user(user_id).await?;
    workspaces.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let mut views = Vec::with_capacity(workspaces.len());
    for workspace in workspaces {
        views.push(hydrate_workspace(store, workspace).await?);
    }
    Ok(views)
}

pub async fn get_workspace(store: &dyn BoardStore, workspace_id: Uuid) -> BackendResult<WorkspaceView> {
    let workspace = find_workspace(store, workspace_id).await?;
    hydrate_workspace(store, workspace).await
}

/// The owner becomes the first admin member
pub async fn create_workspace(
    store: &dyn BoardStore,
    owner_id: Uuid,
    input: NewWorkspace,
) -> BackendResult<WorkspaceView> {
    let name = require_text("name", input.name.as_deref())?;
    let now = timestamp();
    let workspace = Workspace {
        id: Uuid::new_v4(),
        name,
        description: input.description,
        owner_id,
        created_at: now,
        updated_at: now,
    };
    store.insert_workspace(&workspace).await?;
    store
        .add_workspace_member(
            workspace.id,
            &Membership {
                user_id: owner_id,
                role: Role::Admin,
            },
        )
        .await?;

    tracing::debug!("[Workspace] Created workspace {}", workspace.id);
    hydrate_workspace(store, workspace).await
}

pub async fn update_workspace(
    store: &dyn BoardStore,
    workspace_id: Uuid,
    patch: WorkspacePatch,
) -> BackendResult<WorkspaceView> {
    let mut workspace = find_workspace(store, workspace_id).await?;
    if let Some(name) = patch.name {
        workspace.name = require_text("name", Some(name.as_str()))?;
    }
    if let Some(description) = patch.description {
        workspace.description = description;
    }
    workspace.updated_at = timestamp();
    store.update_workspace(&workspace).await?;

    tracing::debug!("[Workspace] Updated workspace {}", workspace_id);
    hydrate_workspace(store, workspace).await
}

/// Owner only. Returns the removed workspace.
pub async fn delete_workspace(
    store: &dyn BoardStore,
    user_id: Uuid,
    workspace_id: Uuid,
) -> BackendResult<Workspace> {
    let workspace = find_workspace(store, workspace_id).await?;
    if workspace.owner_id != user_id {
        return Err(BackendError::forbidden(
            "only the owner may delete this workspace",
        ));
    }

    for board in boards::list_boards(store, Some(workspace_id)).await? {
        boards::archive_board(store, board.id).await?;
    }
    if !store.delete_workspace(workspace_id).await? {
        return Err(BackendError::not_found("Workspace", workspace_id));
    }

    tracing::info!("[Workspace] Deleted workspace {}", workspace_id);
    Ok(workspace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mutations::boards::{create_board, NewBoard};
    use crate::backend::mutations::fixtures::fixture;
    use crate::backend::reader::read_board;
    use crate::backend::store::MemoryStore;
    use crate::shared::board::Member;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn named(name: &str) -> NewWorkspace {
        NewWorkspace {
            name: Some(name.to_string()),
            description: None,
        }
    }

    async fn other_user(store: &MemoryStore) -> Member {
        let user = Member {
            id: Uuid::new_v4(),
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
        };
        store.insert_user(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_create_adds_owner_as_admin() {
        let f = fixture().await;
        let view = create_workspace(&f.store, f.user.id, named("Ops")).await.unwrap();
        assert_eq!(view.workspace.owner_id, f.user.id);
        assert_eq!(view.members.len(), 1);
        assert_eq!(view.members[0].member, f.user);
        assert_eq!(view.members[0].role, Role::Admin);
        assert!(view.boards.is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let f = fixture().await;
        assert_matches!(
            create_workspace(&f.store, f.user.id, NewWorkspace::default()).await,
            Err(BackendError::Validation { ref field, .. }) if field == "name"
        );
    }

    #[tokio::test]
    async fn test_list_only_member_workspaces_with_active_boards() {
        let f = fixture().await;
        let bob = other_user(&f.store).await;
        create_workspace(&f.store, bob.id, named("Bob's")).await.unwrap();

        let mine = list_workspaces(&f.store, f.user.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].workspace.id, f.workspace_id);
        let board_ids: Vec<Uuid> = mine[0].boards.iter().map(|b| b.id).collect();
        assert_eq!(board_ids, vec![f.board_id]);

        boards::archive_board(&f.store, f.board_id).await.unwrap();
        let mine = list_workspaces(&f.store, f.user.id).await.unwrap();
        assert!(mine[0].boards.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let f = fixture().await;
        assert_matches!(
            get_workspace(&f.store, Uuid::new_v4()).await,
            Err(BackendError::NotFound { entity: "Workspace", .. })
        );
    }

    #[tokio::test]
    async fn test_update_clears_description() {
        let f = fixture().await;
        let created = create_workspace(
            &f.store,
            f.user.id,
            NewWorkspace {
                name: Some("Ops".to_string()),
                description: Some("on call".to_string()),
            },
        )
        .await
        .unwrap();
        let patch: WorkspacePatch =
            serde_json::from_str(r#"{"description":null,"name":"Ops v2"}"#).unwrap();
        let updated = update_workspace(&f.store, created.workspace.id, patch).await.unwrap();
        assert_eq!(updated.workspace.description, None);
        assert_eq!(updated.workspace.name, "Ops v2");
        assert!(updated.workspace.updated_at >= created.workspace.updated_at);
    }

    #[tokio::test]
    async fn test_delete_is_owner_only() {
        let f = fixture().await;
        let bob = other_user(&f.store).await;
        assert_matches!(
            delete_workspace(&f.store, bob.id, f.workspace_id).await,
            Err(BackendError::Forbidden { .. })
        );
        assert!(get_workspace(&f.store, f.workspace_id).await.is_ok());
        assert!(read_board(&f.store, f.board_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_archives_boards_and_removes_membership() {
        let f = fixture().await;
        let second = create_board(
            &f.store,
            f.user.id,
            NewBoard {
                workspace_id: Some(f.workspace_id),
                name: Some("Second".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .board_id;

        let deleted = delete_workspace(&f.store, f.user.id, f.workspace_id).await.unwrap();
        assert_eq!(deleted.id, f.workspace_id);
        for board_id in [f.board_id, second] {
            assert_matches!(
                read_board(&f.store, board_id).await,
                Err(BackendError::NotFound { entity: "Board", .. })
            );
        }
        assert!(list_workspaces(&f.store, f.user.id).await.unwrap().is_empty());
        assert_matches!(
            delete_workspace(&f.store, f.user.id, f.workspace_id).await,
            Err(BackendError::NotFound { .. })
        );
    }
}
