//! Shared fixtures for chef-common integration tests

#![allow(dead_code)]

use chef_common::db::open_database;
use sqlx::SqlitePool;

/// Fresh in-memory database with the full schema
pub async fn memory_db() -> SqlitePool {
    open_database("sqlite::memory:")
        .await
        .expect("in-memory database should open")
}

pub async fn insert_menu_item(pool: &SqlitePool, id: i32, name: &str, price: f64, category: &str) {
    sqlx::query("INSERT INTO menu (ItemId, Name, Price, Category) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(price)
        .bind(category)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn insert_order(pool: &SqlitePool, id: i32, item: &str, timestamp: &str) {
    sqlx::query("INSERT INTO restaurant_order (OrderId, Item, Timestamp) VALUES (?, ?, ?)")
        .bind(id)
        .bind(item)
        .bind(timestamp)
        .execute(pool)
        .await
        .unwrap();
}
