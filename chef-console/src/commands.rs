//! One-shot commands: list the menu, list orders, enqueue a notification

use crate::sink::OrderSink;
use chef_common::db::{get_menu_items, get_new_orders, MenuItem, Order, SqliteOrderQueue};
use chef_common::Result;
use sqlx::SqlitePool;

pub fn format_menu_item(item: &MenuItem) -> String {
    format!("{}\t{}\t{:.2}\t{}", item.item_id, item.name, item.price, item.category)
}

pub fn format_order(order: &Order) -> String {
    format!("{}\t{}\t{}", order.order_id, order.item, order.timestamp)
}

/// Print every menu item, one per line
pub async fn print_menu(pool: &SqlitePool, sink: &dyn OrderSink) -> Result<usize> {
    let items = get_menu_items(pool).await?;
    for item in &items {
        sink.line(&format_menu_item(item));
    }
    Ok(items.len())
}

/// Print every order, one per line
pub async fn print_orders(pool: &SqlitePool, sink: &dyn OrderSink) -> Result<usize> {
    let orders = get_new_orders(pool).await?;
    for order in &orders {
        sink.line(&format_order(order));
    }
    Ok(orders.len())
}

/// Enqueue `text` as an order notification
pub async fn send_order(pool: &SqlitePool, text: &str) -> Result<i64> {
    SqliteOrderQueue::new(pool.clone()).send(text).await
}
