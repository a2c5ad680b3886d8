//! Order persistence, scoped by API key.

use crate::{
    db::DbPool,
    error::AppError,
    models::order::{DEFAULT_STATUS_ID, Order, OrderBody},
    services::require,
};

const ORDER_FIELDS: &str = "id, customer_name, customer_address, customer_zip, \
    customer_city, customer_country, status_id";

pub async fn list_orders(pool: &DbPool, api_key: &str) -> Result<Vec<Order>, AppError> {
    let sql = format!("SELECT {ORDER_FIELDS} FROM orders WHERE api_key = ? ORDER BY id");

    Ok(sqlx::query_as::<_, Order>(&sql)
        .bind(api_key)
        .fetch_all(pool)
        .await?)
}

/// `None` when the key owns no order with this id.
pub async fn get_order(
    pool: &DbPool,
    api_key: &str,
    order_id: i64,
) -> Result<Option<Order>, AppError> {
    let sql = format!("SELECT {ORDER_FIELDS} FROM orders WHERE api_key = ? AND id = ?");

    Ok(sqlx::query_as::<_, Order>(&sql)
        .bind(api_key)
        .bind(order_id)
        .fetch_optional(pool)
        .await?)
}

/// Insert an order and return it with its assigned id.
pub async fn create_order(
    pool: &DbPool,
    api_key: &str,
    body: OrderBody,
) -> Result<Order, AppError> {
    let customer_name = require(body.customer_name, "customer_name")?;

    let result = sqlx::query(
        r#"
        INSERT INTO orders (api_key, customer_name, customer_address, customer_zip,
                            customer_city, customer_country, status_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(api_key)
    .bind(customer_name)
    .bind(body.customer_address)
    .bind(body.customer_zip)
    .bind(body.customer_city)
    .bind(body.customer_country)
    .bind(body.status_id.unwrap_or(DEFAULT_STATUS_ID))
    .execute(pool)
    .await?;

    let order_id = result.last_insert_rowid();
    tracing::debug!(order_id, "Order created");

    get_order(pool, api_key, order_id)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))
}

/// Overwrite the fields present in `body`; absent fields keep their value.
pub async fn update_order(
    pool: &DbPool,
    api_key: &str,
    body: OrderBody,
) -> Result<(), AppError> {
    let id = require(body.id, "id")?;

    let result = sqlx::query(
        r#"
        UPDATE orders
        SET customer_name = COALESCE(?, customer_name),
            customer_address = COALESCE(?, customer_address),
            customer_zip = COALESCE(?, customer_zip),
            customer_city = COALESCE(?, customer_city),
            customer_country = COALESCE(?, customer_country),
            status_id = COALESCE(?, status_id)
        WHERE api_key = ? AND id = ?
        "#,
    )
    .bind(body.customer_name)
    .bind(body.customer_address)
    .bind(body.customer_zip)
    .bind(body.customer_city)
    .bind(body.customer_country)
    .bind(body.status_id)
    .bind(api_key)
    .bind(id)
    .execute(pool)
    .await?;

    tracing::debug!(order_id = id, rows = result.rows_affected(), "Order updated");

    Ok(())
}

/// Deleting an order also deletes its invoices.
pub async fn delete_order(
    pool: &DbPool,
    api_key: &str,
    order_id: Option<i64>,
) -> Result<(), AppError> {
    let id = require(order_id, "id")?;

    let result = sqlx::query("DELETE FROM orders WHERE api_key = ? AND id = ?")
        .bind(api_key)
        .bind(id)
        .execute(pool)
        .await?;

    tracing::debug!(order_id = id, rows = result.rows_affected(), "Order deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::services::auth_service::issue_or_fetch_api_key;

    async fn setup() -> (DbPool, String) {
        let pool = create_test_pool().await;
        let key = issue_or_fetch_api_key(&pool, Some("test@order.com"))
            .await
            .unwrap()
            .key;
        (pool, key)
    }

    fn customer(name: &str) -> OrderBody {
        OrderBody {
            customer_name: Some(name.to_string()),
            customer_city: Some("Karlskrona".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_default_status() {
        let (pool, key) = setup().await;

        let first = create_order(&pool, &key, customer("Ada")).await.unwrap();
        let second = create_order(&pool, &key, customer("Grace")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.status_id, DEFAULT_STATUS_ID);
        assert_eq!(second.customer_name, "Grace");
        assert_eq!(list_orders(&pool, &key).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_requires_customer_name() {
        let (pool, key) = setup().await;

        let result = create_order(&pool, &key, OrderBody::default()).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (pool, key) = setup().await;
        let order = create_order(&pool, &key, customer("Ada")).await.unwrap();

        let update = OrderBody {
            id: Some(order.id),
            status_id: Some(200),
            ..Default::default()
        };
        update_order(&pool, &key, update).await.unwrap();

        let stored = get_order(&pool, &key, order.id).await.unwrap().unwrap();
        assert_eq!(stored.status_id, 200);
        assert_eq!(stored.customer_name, "Ada");
        assert_eq!(stored.customer_city.as_deref(), Some("Karlskrona"));

        delete_order(&pool, &key, Some(order.id)).await.unwrap();
        assert!(get_order(&pool, &key, order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_orders_are_scoped_by_key() {
        let (pool, key) = setup().await;
        let other = issue_or_fetch_api_key(&pool, Some("other@order.com"))
            .await
            .unwrap()
            .key;
        let order = create_order(&pool, &key, customer("Ada")).await.unwrap();

        assert!(get_order(&pool, &other, order.id).await.unwrap().is_none());

        let hijack = OrderBody {
            id: Some(order.id),
            customer_name: Some("Mallory".to_string()),
            ..Default::default()
        };
        update_order(&pool, &other, hijack).await.unwrap();

        let stored = get_order(&pool, &key, order.id).await.unwrap().unwrap();
        assert_eq!(stored.customer_name, "Ada");
    }
}
