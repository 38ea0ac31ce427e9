use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{CatalogItem, Category};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MenuQuery {
    /// Restrict the listing to `veg` or `non-veg` items.
    pub category: Option<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuList {
    pub items: Vec<CatalogItem>,
}
