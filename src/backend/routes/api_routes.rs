/**
 * API Routes
 *
 * Every route here requires a bearer token; `create_router` wraps them in
 * `auth_middleware`.
 *
 * ## Workspaces
 * - `GET|POST /api/workspaces`, `GET|PUT|DELETE /api/workspaces/{id}`
 *
 * ## Boards
 * - `GET|POST /api/boards` (`?workspaceId=` filter), `GET|PUT|DELETE /api/boards/{id}`
 *
 * ## Lists
 * - `POST /api/lists`, `PUT|DELETE /api/lists/{id}`, `PUT /api/lists/{id}/move`
 *
 * ## Cards
 * - `POST /api/cards`, `GET|PUT|DELETE /api/cards/{id}`, `PUT /api/cards/{id}/move`
 * - `POST /api/cards/{id}/labels`, `DELETE /api/cards/{id}/labels/{label_id}`
 * - `POST /api/cards/{id}/members`, `DELETE /api/cards/{id}/members/{user_id}`
 *
 * ## Checklists
 * - `POST /api/checklists`, `PUT|DELETE /api/checklists/{id}`
 * - `POST /api/checklists/items`, `PUT|DELETE /api/checklists/items/{id}`
 * - `POST /api/checklists/items/{id}/toggle`
 *
 * ## Comments and labels
 * - `GET|POST /api/comments`, `PUT|DELETE /api/comments/{id}`
 * - `GET|POST /api/labels`, `PUT|DELETE /api/labels/{id}`
 *
 * ## Realtime control
 * - `POST /realtime/connections/{id}/join|leave|publish`
 */

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::backend::auth::get_me;
use crate::backend::handlers::{boards, cards, checklists, comments, labels, lists, workspaces};
use crate::backend::realtime::handlers as realtime;
use crate::backend::server::state::AppState;

/// Configure the authenticated API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/auth/me", get(get_me))
        // Workspaces
        .route(
            "/api/workspaces",
            get(workspaces::list_workspaces).post(workspaces::create_workspace),
        )
        .route(
            "/api/workspaces/{workspace_id}",
            get(workspaces::get_workspace)
                .put(workspaces::update_workspace)
                .delete(workspaces::delete_workspace),
        )
        // Boards
        .route(
            "/api/boards",
            get(boards::list_boards).post(boards::create_board),
        )
        .route(
            "/api/boards/{board_id}",
            get(boards::get_board)
                .put(boards::update_board)
                .delete(boards::archive_board),
        )
        // Lists
        .route("/api/lists", post(lists::create_list))
        .route(
            "/api/lists/{list_id}",
            put(lists::update_list).delete(lists::archive_list),
        )
        .route("/api/lists/{list_id}/move", put(lists::move_list))
        // Cards
        .route("/api/cards", post(cards::create_card))
        .route(
            "/api/cards/{card_id}",
            get(cards::get_card)
                .put(cards::update_card)
                .delete(cards::archive_card),
        )
        .route("/api/cards/{card_id}/move", put(cards::move_card))
        .route("/api/cards/{card_id}/labels", post(cards::add_label))
        .route(
            "/api/cards/{card_id}/labels/{label_id}",
            axum::routing::delete(cards::remove_label),
        )
        .route("/api/cards/{card_id}/members", post(cards::add_member))
        .route(
            "/api/cards/{card_id}/members/{user_id}",
            axum::routing::delete(cards::remove_member),
        )
        // Checklists
        .route("/api/checklists", post(checklists::create_checklist))
        .route(
            "/api/checklists/{checklist_id}",
            put(checklists::update_checklist).delete(checklists::delete_checklist),
        )
        .route("/api/checklists/items", post(checklists::create_item))
        .route(
            "/api/checklists/items/{item_id}",
            put(checklists::update_item).delete(checklists::delete_item),
        )
        .route(
            "/api/checklists/items/{item_id}/toggle",
            post(checklists::toggle_item),
        )
        // Comments
        .route(
            "/api/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/api/comments/{comment_id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        // Labels
        .route(
            "/api/labels",
            get(labels::list_labels).post(labels::create_label),
        )
        .route(
            "/api/labels/{label_id}",
            put(labels::update_label).delete(labels::delete_label),
        )
        // Realtime control
        .route(
            "/realtime/connections/{connection_id}/join",
            post(realtime::join_board),
        )
        .route(
            "/realtime/connections/{connection_id}/leave",
            post(realtime::leave_board),
        )
        .route(
            "/realtime/connections/{connection_id}/publish",
            post(realtime::publish),
        )
}
