//! Menu and order list queries
//!
//! Full-table reads mapped through [`MenuItem::from_row`] and
//! [`Order::from_row`]. The first row that fails to map aborts the call, so a
//! caller never sees a partial list.

use crate::db::models::{MenuItem, Order};
use crate::Result;
use sqlx::SqlitePool;
use tracing::debug;

/// Read every menu item
pub async fn get_menu_items(pool: &SqlitePool) -> Result<Vec<MenuItem>> {
    let rows = sqlx::query("SELECT * FROM menu").fetch_all(pool).await?;

    let items = rows.iter().map(MenuItem::from_row).collect::<Result<Vec<_>>>()?;
    debug!("Loaded {} menu items", items.len());

    Ok(items)
}

/// Read every order
pub async fn get_new_orders(pool: &SqlitePool) -> Result<Vec<Order>> {
    let rows = sqlx::query("SELECT * FROM restaurant_order").fetch_all(pool).await?;

    let orders = rows.iter().map(Order::from_row).collect::<Result<Vec<_>>>()?;
    debug!("Loaded {} orders", orders.len());

    Ok(orders)
}
