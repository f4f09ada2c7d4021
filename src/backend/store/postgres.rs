//! PostgreSQL store
//!
//! Runtime-bound sqlx queries against the schema in `migrations/`.
//! Positions are `DOUBLE PRECISION`, so values round-trip bit-for-bit.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::backend::store::{BoardStore, StoreResult};
use crate::shared::board::{
    Board, Card, Checklist, ChecklistItem, Comment, Label, List, Member, Membership, Role,
    Workspace,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        tracing::info!("[Store] Connecting to database...");
        let pool = PgPool::connect(database_url).await?;
        tracing::info!("[Store] Running database migrations...");
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("[Store] Database ready");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const WORKSPACE_COLUMNS: &str = "id, name, description, owner_id, created_at, updated_at";
const BOARD_COLUMNS: &str =
    "id, workspace_id, name, description, background_color, is_archived, created_at, updated_at";
const LABEL_COLUMNS: &str = "id, board_id, name, color, created_at";
const LIST_COLUMNS: &str = "id, board_id, name, position, is_archived, created_at, updated_at";
const CARD_COLUMNS: &str = "id, list_id, title, description, position, due_date, cover_color, is_archived, created_at, updated_at";
const CHECKLIST_COLUMNS: &str = "id, card_id, title, position, created_at";
const ITEM_COLUMNS: &str = "id, checklist_id, title, position, is_completed, created_at";
const COMMENT_COLUMNS: &str = "id, card_id, author_id, text, created_at, updated_at";

fn member_from_row(row: &PgRow) -> Result<Member, sqlx::Error> {
    Ok(Member {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
    })
}

fn workspace_from_row(row: &PgRow) -> Result<Workspace, sqlx::Error> {
    Ok(Workspace {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        owner_id: row.try_get("owner_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn membership_from_row(row: &PgRow) -> Result<Membership, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let role = Role::parse(&role)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown role {role:?}").into()))?;
    Ok(Membership {
        user_id: row.try_get("user_id")?,
        role,
    })
}

fn board_from_row(row: &PgRow) -> Result<Board, sqlx::Error> {
    Ok(Board {
        id: row.try_get("id")?,
        workspace_id: row.try_get("workspace_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        background_color: row.try_get("background_color")?,
        is_archived: row.try_get("is_archived")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn label_from_row(row: &PgRow) -> Result<Label, sqlx::Error> {
    Ok(Label {
        id: row.try_get("id")?,
        board_id: row.try_get("board_id")?,
        name: row.try_get("name")?,
        color: row.try_get("color")?,
        created_at: row.try_get("created_at")?,
    })
}

fn list_from_row(row: &PgRow) -> Result<List, sqlx::Error> {
    Ok(List {
        id: row.try_get("id")?,
        board_id: row.try_get("board_id")?,
        name: row.try_get("name")?,
        position: row.try_get("position")?,
        is_archived: row.try_get("is_archived")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn card_from_row(row: &PgRow) -> Result<Card, sqlx::Error> {
    Ok(Card {
        id: row.try_get("id")?,
        list_id: row.try_get("list_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        position: row.try_get("position")?,
        due_date: row.try_get("due_date")?,
        cover_color: row.try_get("cover_color")?,
        is_archived: row.try_get("is_archived")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn checklist_from_row(row: &PgRow) -> Result<Checklist, sqlx::Error> {
    Ok(Checklist {
        id: row.try_get("id")?,
        card_id: row.try_get("card_id")?,
        title: row.try_get("title")?,
        position: row.try_get("position")?,
        created_at: row.try_get("created_at")?,
    })
}

fn item_from_row(row: &PgRow) -> Result<ChecklistItem, sqlx::Error> {
    Ok(ChecklistItem {
        id: row.try_get("id")?,
        checklist_id: row.try_get("checklist_id")?,
        title: row.try_get("title")?,
        position: row.try_get("position")?,
        is_completed: row.try_get("is_completed")?,
        created_at: row.try_get("created_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        card_id: row.try_get("card_id")?,
        author_id: row.try_get("author_id")?,
        text: row.try_get("text")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn collect<T>(
    rows: Vec<PgRow>,
    map: fn(&PgRow) -> Result<T, sqlx::Error>,
) -> StoreResult<Vec<T>> {
    rows.iter().map(|r| map(r).map_err(Into::into)).collect()
}

impl PgStore {
    async fn fetch_one_by_id<T>(
        &self,
        table: &str,
        columns: &str,
        id: Uuid,
        map: fn(&PgRow) -> Result<T, sqlx::Error>,
    ) -> StoreResult<Option<T>> {
        let sql = format!("SELECT {columns} FROM {table} WHERE id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(map).transpose()?)
    }

    async fn fetch_children<T>(
        &self,
        table: &str,
        columns: &str,
        parent_column: &str,
        parent_id: Uuid,
        map: fn(&PgRow) -> Result<T, sqlx::Error>,
    ) -> StoreResult<Vec<T>> {
        let sql = format!("SELECT {columns} FROM {table} WHERE {parent_column} = $1");
        let rows = sqlx::query(&sql).bind(parent_id).fetch_all(&self.pool).await?;
        collect(rows, map)
    }

    async fn delete_by_id(&self, table: &str, id: Uuid) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {table} WHERE id = $1");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BoardStore for PgStore {
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<Member>> {
        self.fetch_one_by_id("users", "id, username, email", id, member_from_row)
            .await
    }

    async fn insert_user(&self, user: &Member) -> StoreResult<()> {
        sqlx::query("INSERT INTO users (id, username, email) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>> {
        self.fetch_one_by_id("workspaces", WORKSPACE_COLUMNS, id, workspace_from_row)
            .await
    }

    async fn workspaces_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Workspace>> {
        let rows = sqlx::query(
            r#"
            SELECT w.id, w.name, w.description, w.owner_id, w.created_at, w.updated_at
            FROM workspaces w
            JOIN workspace_members wm ON wm.workspace_id = w.id
            WHERE wm.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, workspace_from_row)
    }

    async fn insert_workspace(&self, workspace: &Workspace) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO workspaces (id, name, description, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(workspace.id)
        .bind(&workspace.name)
        .bind(&workspace.description)
        .bind(workspace.owner_id)
        .bind(workspace.created_at)
        .bind(workspace.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_workspace(&self, workspace: &Workspace) -> StoreResult<()> {
        sqlx::query("UPDATE workspaces SET name = $2, description = $3, updated_at = $4 WHERE id = $1")
            .bind(workspace.id)
            .bind(&workspace.name)
            .bind(&workspace.description)
            .bind(workspace.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_workspace(&self, id: Uuid) -> StoreResult<bool> {
        // workspace_members rows go with the workspace via ON DELETE CASCADE
        self.delete_by_id("workspaces", id).await
    }

    async fn workspace_members(&self, workspace_id: Uuid) -> StoreResult<Vec<Membership>> {
        self.fetch_children(
            "workspace_members",
            "user_id, role",
            "workspace_id",
            workspace_id,
            membership_from_row,
        )
        .await
    }

    async fn add_workspace_member(&self, workspace_id: Uuid, member: &Membership) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO workspace_members (workspace_id, user_id, role) VALUES ($1, $2, $3)
            ON CONFLICT (workspace_id, user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(workspace_id)
        .bind(member.user_id)
        .bind(member.role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_board(&self, id: Uuid) -> StoreResult<Option<Board>> {
        self.fetch_one_by_id("boards", BOARD_COLUMNS, id, board_from_row)
            .await
    }

    async fn boards_for_workspace(&self, workspace_id: Uuid) -> StoreResult<Vec<Board>> {
        self.fetch_children("boards", BOARD_COLUMNS, "workspace_id", workspace_id, board_from_row)
            .await
    }

    async fn board_members(&self, board_id: Uuid) -> StoreResult<Vec<Membership>> {
        self.fetch_children("board_members", "user_id, role", "board_id", board_id, membership_from_row)
            .await
    }

    async fn add_board_member(&self, board_id: Uuid, member: &Membership) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO board_members (board_id, user_id, role) VALUES ($1, $2, $3)
            ON CONFLICT (board_id, user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(board_id)
        .bind(member.user_id)
        .bind(member.role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_boards(&self) -> StoreResult<Vec<Board>> {
        let sql = format!("SELECT {BOARD_COLUMNS} FROM boards");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        collect(rows, board_from_row)
    }

    async fn insert_board(&self, board: &Board) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO boards (id, workspace_id, name, description, background_color, is_archived, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(board.id)
        .bind(board.workspace_id)
        .bind(&board.name)
        .bind(&board.description)
        .bind(&board.background_color)
        .bind(board.is_archived)
        .bind(board.created_at)
        .bind(board.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_board(&self, board: &Board) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE boards
            SET name = $2, description = $3, background_color = $4, is_archived = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(board.id)
        .bind(&board.name)
        .bind(&board.description)
        .bind(&board.background_color)
        .bind(board.is_archived)
        .bind(board.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_label(&self, id: Uuid) -> StoreResult<Option<Label>> {
        self.fetch_one_by_id("labels", LABEL_COLUMNS, id, label_from_row)
            .await
    }

    async fn labels_for_board(&self, board_id: Uuid) -> StoreResult<Vec<Label>> {
        self.fetch_children("labels", LABEL_COLUMNS, "board_id", board_id, label_from_row)
            .await
    }

    async fn insert_label(&self, label: &Label) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO labels (id, board_id, name, color, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(label.id)
        .bind(label.board_id)
        .bind(&label.name)
        .bind(&label.color)
        .bind(label.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_label(&self, label: &Label) -> StoreResult<()> {
        sqlx::query("UPDATE labels SET name = $2, color = $3 WHERE id = $1")
            .bind(label.id)
            .bind(&label.name)
            .bind(&label.color)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_label(&self, id: Uuid) -> StoreResult<bool> {
        // card_labels rows go with the label via ON DELETE CASCADE
        self.delete_by_id("labels", id).await
    }

    async fn get_list(&self, id: Uuid) -> StoreResult<Option<List>> {
        self.fetch_one_by_id("lists", LIST_COLUMNS, id, list_from_row)
            .await
    }

    async fn lists_for_board(&self, board_id: Uuid) -> StoreResult<Vec<List>> {
        self.fetch_children("lists", LIST_COLUMNS, "board_id", board_id, list_from_row)
            .await
    }

    async fn insert_list(&self, list: &List) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO lists (id, board_id, name, position, is_archived, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(list.id)
        .bind(list.board_id)
        .bind(&list.name)
        .bind(list.position)
        .bind(list.is_archived)
        .bind(list.created_at)
        .bind(list.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_list(&self, list: &List) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE lists
            SET board_id = $2, name = $3, position = $4, is_archived = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(list.id)
        .bind(list.board_id)
        .bind(&list.name)
        .bind(list.position)
        .bind(list.is_archived)
        .bind(list.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_card(&self, id: Uuid) -> StoreResult<Option<Card>> {
        self.fetch_one_by_id("cards", CARD_COLUMNS, id, card_from_row)
            .await
    }

    async fn cards_for_list(&self, list_id: Uuid) -> StoreResult<Vec<Card>> {
        self.fetch_children("cards", CARD_COLUMNS, "list_id", list_id, card_from_row)
            .await
    }

    async fn insert_card(&self, card: &Card) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cards (id, list_id, title, description, position, due_date, cover_color, is_archived, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(card.id)
        .bind(card.list_id)
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.position)
        .bind(card.due_date)
        .bind(&card.cover_color)
        .bind(card.is_archived)
        .bind(card.created_at)
        .bind(card.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_card(&self, card: &Card) -> StoreResult<()> {
        // list_id and position change together in one statement
        sqlx::query(
            r#"
            UPDATE cards
            SET list_id = $2, title = $3, description = $4, position = $5, due_date = $6,
                cover_color = $7, is_archived = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(card.id)
        .bind(card.list_id)
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.position)
        .bind(card.due_date)
        .bind(&card.cover_color)
        .bind(card.is_archived)
        .bind(card.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn card_labels(&self, card_id: Uuid) -> StoreResult<Vec<Label>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.board_id, l.name, l.color, l.created_at
            FROM labels l
            JOIN card_labels cl ON cl.label_id = l.id
            WHERE cl.card_id = $1
            "#,
        )
        .bind(card_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, label_from_row)
    }

    async fn add_card_label(&self, card_id: Uuid, label_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO card_labels (card_id, label_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(card_id)
        .bind(label_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_card_label(&self, card_id: Uuid, label_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM card_labels WHERE card_id = $1 AND label_id = $2")
            .bind(card_id)
            .bind(label_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn card_members(&self, card_id: Uuid) -> StoreResult<Vec<Member>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username, u.email
            FROM users u
            JOIN card_members cm ON cm.user_id = u.id
            WHERE cm.card_id = $1
            "#,
        )
        .bind(card_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, member_from_row)
    }

    async fn add_card_member(&self, card_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO card_members (card_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(card_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_card_member(&self, card_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM card_members WHERE card_id = $1 AND user_id = $2")
            .bind(card_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_checklist(&self, id: Uuid) -> StoreResult<Option<Checklist>> {
        self.fetch_one_by_id("checklists", CHECKLIST_COLUMNS, id, checklist_from_row)
            .await
    }

    async fn checklists_for_card(&self, card_id: Uuid) -> StoreResult<Vec<Checklist>> {
        self.fetch_children(
            "checklists",
            CHECKLIST_COLUMNS,
            "card_id",
            card_id,
            checklist_from_row,
        )
        .await
    }

    async fn insert_checklist(&self, checklist: &Checklist) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO checklists (id, card_id, title, position, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(checklist.id)
        .bind(checklist.card_id)
        .bind(&checklist.title)
        .bind(checklist.position)
        .bind(checklist.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_checklist(&self, checklist: &Checklist) -> StoreResult<()> {
        sqlx::query("UPDATE checklists SET title = $2, position = $3 WHERE id = $1")
            .bind(checklist.id)
            .bind(&checklist.title)
            .bind(checklist.position)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_checklist(&self, id: Uuid) -> StoreResult<bool> {
        self.delete_by_id("checklists", id).await
    }

    async fn get_checklist_item(&self, id: Uuid) -> StoreResult<Option<ChecklistItem>> {
        self.fetch_one_by_id("checklist_items", ITEM_COLUMNS, id, item_from_row)
            .await
    }

    async fn items_for_checklist(&self, checklist_id: Uuid) -> StoreResult<Vec<ChecklistItem>> {
        self.fetch_children(
            "checklist_items",
            ITEM_COLUMNS,
            "checklist_id",
            checklist_id,
            item_from_row,
        )
        .await
    }

    async fn insert_checklist_item(&self, item: &ChecklistItem) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO checklist_items (id, checklist_id, title, position, is_completed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.id)
        .bind(item.checklist_id)
        .bind(&item.title)
        .bind(item.position)
        .bind(item.is_completed)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_checklist_item(&self, item: &ChecklistItem) -> StoreResult<()> {
        sqlx::query(
            "UPDATE checklist_items SET title = $2, position = $3, is_completed = $4 WHERE id = $1",
        )
        .bind(item.id)
        .bind(&item.title)
        .bind(item.position)
        .bind(item.is_completed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_checklist_item(&self, id: Uuid) -> StoreResult<bool> {
        self.delete_by_id("checklist_items", id).await
    }

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        self.fetch_one_by_id("comments", COMMENT_COLUMNS, id, comment_from_row)
            .await
    }

    async fn comments_for_card(&self, card_id: Uuid) -> StoreResult<Vec<Comment>> {
        self.fetch_children("comments", COMMENT_COLUMNS, "card_id", card_id, comment_from_row)
            .await
    }

    async fn insert_comment(&self, comment: &Comment) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, card_id, author_id, text, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(comment.id)
        .bind(comment.card_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_comment(&self, comment: &Comment) -> StoreResult<()> {
        sqlx::query("UPDATE comments SET text = $2, updated_at = $3 WHERE id = $1")
            .bind(comment.id)
            .bind(&comment.text)
            .bind(comment.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        self.delete_by_id("comments", id).await
    }
}
