pub mod enums;
pub mod menu_items;
pub mod order_items;
pub mod orders;
pub mod users;
