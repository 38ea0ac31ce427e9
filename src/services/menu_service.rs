use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    dto::menu::MenuList,
    entity::menu_items::{Column as MenuCol, Entity as MenuItems},
    error::{AppError, AppResult},
    models::{CatalogItem, Category},
    response::{ApiResponse, Meta},
};

/// Read access to the menu.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Items ordered by name, optionally restricted to one category.
    async fn list_items(&self, category: Option<Category>) -> AppResult<Vec<CatalogItem>>;

    async fn get_item(&self, id: Uuid) -> AppResult<Option<CatalogItem>>;
}

pub struct SeaOrmCatalog<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SeaOrmCatalog<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for SeaOrmCatalog<'_> {
    async fn list_items(&self, category: Option<Category>) -> AppResult<Vec<CatalogItem>> {
        let mut finder = MenuItems::find();
        if let Some(category) = category {
            finder = finder.filter(MenuCol::Category.eq(category));
        }

        let items = finder
            .order_by_asc(MenuCol::Name)
            .all(self.db)
            .await?
            .into_iter()
            .map(CatalogItem::from)
            .collect();
        Ok(items)
    }

    async fn get_item(&self, id: Uuid) -> AppResult<Option<CatalogItem>> {
        let item = MenuItems::find_by_id(id).one(self.db).await?;
        Ok(item.map(CatalogItem::from))
    }
}

pub async fn list_menu<C>(
    catalog: &C,
    category: Option<Category>,
) -> AppResult<ApiResponse<MenuList>>
where
    C: CatalogStore + ?Sized,
{
    let items = catalog.list_items(category).await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Menu",
        MenuList { items },
        Some(Meta::list(total)),
    ))
}

pub async fn get_menu_item<C>(catalog: &C, id: Uuid) -> AppResult<ApiResponse<CatalogItem>>
where
    C: CatalogStore + ?Sized,
{
    match catalog.get_item(id).await? {
        Some(item) => Ok(ApiResponse::success("Menu item", item, None)),
        None => Err(AppError::NotFound),
    }
}
