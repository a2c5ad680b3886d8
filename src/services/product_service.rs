//! Product persistence, scoped by API key.

use crate::{
    db::DbPool,
    error::AppError,
    models::product::{Product, ProductBody},
    services::require,
};

const PRODUCT_FIELDS: &str = "id, name, description, specifiers, stock, location, price";

pub async fn list_products(pool: &DbPool, api_key: &str) -> Result<Vec<Product>, AppError> {
    let sql = format!("SELECT {PRODUCT_FIELDS} FROM products WHERE api_key = ? ORDER BY id");

    Ok(sqlx::query_as::<_, Product>(&sql)
        .bind(api_key)
        .fetch_all(pool)
        .await?)
}

/// `None` when the key owns no product with this id.
pub async fn get_product(
    pool: &DbPool,
    api_key: &str,
    product_id: i64,
) -> Result<Option<Product>, AppError> {
    let sql = format!("SELECT {PRODUCT_FIELDS} FROM products WHERE api_key = ? AND id = ?");

    Ok(sqlx::query_as::<_, Product>(&sql)
        .bind(api_key)
        .bind(product_id)
        .fetch_optional(pool)
        .await?)
}

/// Insert a product and return it as stored.
///
/// # Errors
///
/// - `InvalidRequest`: `id` or `name` missing, `id` not positive, or a
///   product with this id already exists for the key
pub async fn create_product(
    pool: &DbPool,
    api_key: &str,
    body: ProductBody,
) -> Result<Product, AppError> {
    let id = positive_id(require(body.id, "id")?)?;
    let name = require(body.name, "name")?;

    let result = sqlx::query(
        r#"
        INSERT INTO products (api_key, id, name, description, specifiers, stock, location, price)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(api_key)
    .bind(id)
    .bind(&name)
    .bind(body.description)
    .bind(body.specifiers)
    .bind(body.stock.unwrap_or(0))
    .bind(body.location)
    .bind(body.price)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(AppError::InvalidRequest(format!(
                "Product with id {id} already exists."
            )));
        }
        Err(err) => return Err(err.into()),
    }

    tracing::debug!(product_id = id, "Product created");

    // Re-read so the response reflects column defaults
    get_product(pool, api_key, id)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))
}

/// Overwrite the fields present in `body`; absent fields keep their value.
///
/// Updating an id the key does not own is a no-op.
pub async fn update_product(
    pool: &DbPool,
    api_key: &str,
    body: ProductBody,
) -> Result<(), AppError> {
    let id = require(body.id, "id")?;

    let result = sqlx::query(
        r#"
        UPDATE products
        SET name = COALESCE(?, name),
            description = COALESCE(?, description),
            specifiers = COALESCE(?, specifiers),
            stock = COALESCE(?, stock),
            location = COALESCE(?, location),
            price = COALESCE(?, price)
        WHERE api_key = ? AND id = ?
        "#,
    )
    .bind(body.name)
    .bind(body.description)
    .bind(body.specifiers)
    .bind(body.stock)
    .bind(body.location)
    .bind(body.price)
    .bind(api_key)
    .bind(id)
    .execute(pool)
    .await?;

    tracing::debug!(product_id = id, rows = result.rows_affected(), "Product updated");

    Ok(())
}

/// Deleting an id the key does not own is a no-op.
pub async fn delete_product(
    pool: &DbPool,
    api_key: &str,
    product_id: Option<i64>,
) -> Result<(), AppError> {
    let id = require(product_id, "id")?;

    let result = sqlx::query("DELETE FROM products WHERE api_key = ? AND id = ?")
        .bind(api_key)
        .bind(id)
        .execute(pool)
        .await?;

    tracing::debug!(product_id = id, rows = result.rows_affected(), "Product deleted");

    Ok(())
}

fn positive_id(id: i64) -> Result<i64, AppError> {
    if id <= 0 {
        return Err(AppError::InvalidRequest(
            "Attribute id must be a positive integer.".to_string(),
        ));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::services::auth_service::issue_or_fetch_api_key;

    async fn setup() -> (DbPool, String) {
        let pool = create_test_pool().await;
        let key = issue_or_fetch_api_key(&pool, Some("test@product.com"))
            .await
            .unwrap()
            .key;
        (pool, key)
    }

    fn screw() -> ProductBody {
        ProductBody {
            id: Some(1),
            name: Some("Screw".to_string()),
            description: Some("Mighty fine screw.".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_id_and_name() {
        let (pool, key) = setup().await;

        let no_id = ProductBody { id: None, ..screw() };
        assert!(matches!(
            create_product(&pool, &key, no_id).await,
            Err(AppError::InvalidRequest(_))
        ));

        let no_name = ProductBody { name: None, ..screw() };
        assert!(matches!(
            create_product(&pool, &key, no_name).await,
            Err(AppError::InvalidRequest(_))
        ));

        let negative = ProductBody { id: Some(-3), ..screw() };
        assert!(matches!(
            create_product(&pool, &key, negative).await,
            Err(AppError::InvalidRequest(_))
        ));

        assert!(list_products(&pool, &key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_applies_defaults_and_rejects_duplicates() {
        let (pool, key) = setup().await;

        let product = create_product(&pool, &key, screw()).await.unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(product.stock, 0);
        assert!(product.price.is_none());

        assert!(matches!(
            create_product(&pool, &key, screw()).await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let (pool, key) = setup().await;
        create_product(&pool, &key, screw()).await.unwrap();

        let update = ProductBody {
            id: Some(1),
            name: Some("Big Screw".to_string()),
            stock: Some(12),
            ..Default::default()
        };
        update_product(&pool, &key, update).await.unwrap();

        let product = get_product(&pool, &key, 1).await.unwrap().unwrap();
        assert_eq!(product.name, "Big Screw");
        assert_eq!(product.description.as_deref(), Some("Mighty fine screw."));
        assert_eq!(product.stock, 12);
    }

    #[tokio::test]
    async fn test_products_are_scoped_by_key() {
        let (pool, key) = setup().await;
        let other = issue_or_fetch_api_key(&pool, Some("other@product.com"))
            .await
            .unwrap()
            .key;
        create_product(&pool, &key, screw()).await.unwrap();

        assert!(list_products(&pool, &other).await.unwrap().is_empty());
        assert!(get_product(&pool, &other, 1).await.unwrap().is_none());

        delete_product(&pool, &other, Some(1)).await.unwrap();
        assert_eq!(list_products(&pool, &key).await.unwrap().len(), 1);

        delete_product(&pool, &key, Some(1)).await.unwrap();
        assert!(list_products(&pool, &key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_requires_id() {
        let (pool, key) = setup().await;
        assert!(matches!(
            delete_product(&pool, &key, None).await,
            Err(AppError::InvalidRequest(_))
        ));
    }
}
