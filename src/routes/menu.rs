use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::menu::{MenuList, MenuQuery},
    error::AppResult,
    models::CatalogItem,
    response::ApiResponse,
    services::menu_service::{self, SeaOrmCatalog},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menu))
        .route("/{id}", get(get_menu_item))
}

#[utoipa::path(
    get,
    path = "/api/menu",
    params(MenuQuery),
    responses(
        (status = 200, description = "Menu items ordered by name", body = ApiResponse<MenuList>)
    ),
    tag = "Menu"
)]
pub async fn list_menu(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<MenuList>>> {
    let catalog = SeaOrmCatalog::new(&state.orm);
    let resp = menu_service::list_menu(&catalog, query.category).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    responses(
        (status = 200, description = "Menu item", body = ApiResponse<CatalogItem>),
        (status = 404, description = "Menu item not found"),
    ),
    tag = "Menu"
)]
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CatalogItem>>> {
    let catalog = SeaOrmCatalog::new(&state.orm);
    let resp = menu_service::get_menu_item(&catalog, id).await?;
    Ok(Json(resp))
}
