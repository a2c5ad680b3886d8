//! Invoice persistence, scoped by API key.
//!
//! Invoices are always read joined with their order, so every invoice
//! row carries the customer fields of the order it bills. An invoice can
//! only reference an order owned by the same API key.

use chrono::{Duration, NaiveDate, Utc};

use crate::{
    db::DbPool,
    error::AppError,
    models::invoice::{DEFAULT_PAYMENT_TERM_DAYS, Invoice, InvoiceBody, to_minor_units},
    services::require,
};

const INVOICE_SELECT: &str = r#"
    SELECT i.id AS id,
           i.creation_date AS creation_date,
           i.due_date AS due_date,
           o.id AS order_id,
           o.customer_name AS name,
           o.customer_address AS address,
           o.customer_zip AS zip,
           o.customer_city AS city,
           o.customer_country AS country,
           CAST(i.total_price AS REAL) / 100 AS total_price
    FROM invoices i
    INNER JOIN orders o ON o.id = i.order_id AND o.api_key = i.api_key
"#;

pub async fn list_invoices(pool: &DbPool, api_key: &str) -> Result<Vec<Invoice>, AppError> {
    let sql = format!("{INVOICE_SELECT} WHERE i.api_key = ? ORDER BY i.id");

    Ok(sqlx::query_as::<_, Invoice>(&sql)
        .bind(api_key)
        .fetch_all(pool)
        .await?)
}

/// `None` when the key owns no invoice with this id.
pub async fn get_invoice(
    pool: &DbPool,
    api_key: &str,
    invoice_id: i64,
) -> Result<Option<Invoice>, AppError> {
    let sql = format!("{INVOICE_SELECT} WHERE i.api_key = ? AND i.id = ?");

    Ok(sqlx::query_as::<_, Invoice>(&sql)
        .bind(api_key)
        .bind(invoice_id)
        .fetch_optional(pool)
        .await?)
}

/// Insert an invoice and return it re-read through the order join.
///
/// # Defaults
///
/// - `creation_date`: today (UTC)
/// - `due_date`: creation date + 30 days
///
/// # Errors
///
/// - `InvalidRequest`: `order_id` or `total_price` missing, negative or
///   out-of-range total,
///   due date before creation date, or order not owned by the key
pub async fn create_invoice(
    pool: &DbPool,
    api_key: &str,
    body: InvoiceBody,
) -> Result<Invoice, AppError> {
    let order_id = require(body.order_id, "order_id")?;
    let total_price = minor_units(require(body.total_price, "total_price")?)?;

    let creation_date = body.creation_date.unwrap_or_else(|| Utc::now().date_naive());
    let due_date = body
        .due_date
        .unwrap_or(creation_date + Duration::days(DEFAULT_PAYMENT_TERM_DAYS));
    check_dates(creation_date, due_date)?;

    ensure_order_owned(pool, api_key, order_id).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO invoices (api_key, order_id, total_price, creation_date, due_date)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(api_key)
    .bind(order_id)
    .bind(total_price)
    .bind(creation_date)
    .bind(due_date)
    .execute(pool)
    .await?;

    let invoice_id = result.last_insert_rowid();
    tracing::info!(invoice_id, order_id, "Invoice created");

    get_invoice(pool, api_key, invoice_id)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))
}

/// Overwrite the fields present in `body`; absent fields keep their value.
///
/// A new `order_id` must reference an order owned by the key. Date order is
/// checked against the stored dates when only one of them changes.
pub async fn update_invoice(
    pool: &DbPool,
    api_key: &str,
    body: InvoiceBody,
) -> Result<(), AppError> {
    let id = require(body.id, "id")?;

    let total_price = body.total_price.map(minor_units).transpose()?;
    if let Some(order_id) = body.order_id {
        ensure_order_owned(pool, api_key, order_id).await?;
    }

    if body.creation_date.is_some() || body.due_date.is_some() {
        let stored: Option<(NaiveDate, NaiveDate)> = sqlx::query_as(
            "SELECT creation_date, due_date FROM invoices WHERE api_key = ? AND id = ?",
        )
        .bind(api_key)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        if let Some((creation_date, due_date)) = stored {
            check_dates(
                body.creation_date.unwrap_or(creation_date),
                body.due_date.unwrap_or(due_date),
            )?;
        }
    }

    let result = sqlx::query(
        r#"
        UPDATE invoices
        SET order_id = COALESCE(?, order_id),
            total_price = COALESCE(?, total_price),
            creation_date = COALESCE(?, creation_date),
            due_date = COALESCE(?, due_date)
        WHERE api_key = ? AND id = ?
        "#,
    )
    .bind(body.order_id)
    .bind(total_price)
    .bind(body.creation_date)
    .bind(body.due_date)
    .bind(api_key)
    .bind(id)
    .execute(pool)
    .await?;

    tracing::debug!(invoice_id = id, rows = result.rows_affected(), "Invoice updated");

    Ok(())
}

pub async fn delete_invoice(
    pool: &DbPool,
    api_key: &str,
    invoice_id: Option<i64>,
) -> Result<(), AppError> {
    let id = require(invoice_id, "id")?;

    let result = sqlx::query("DELETE FROM invoices WHERE api_key = ? AND id = ?")
        .bind(api_key)
        .bind(id)
        .execute(pool)
        .await?;

    tracing::debug!(invoice_id = id, rows = result.rows_affected(), "Invoice deleted");

    Ok(())
}

async fn ensure_order_owned(pool: &DbPool, api_key: &str, order_id: i64) -> Result<(), AppError> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM orders WHERE id = ? AND api_key = ?")
            .bind(order_id)
            .bind(api_key)
            .fetch_optional(pool)
            .await?;

    found
        .map(|_| ())
        .ok_or_else(|| AppError::InvalidRequest(format!("Order {order_id} does not exist.")))
}

fn minor_units(total_price: f64) -> Result<i64, AppError> {
    to_minor_units(total_price).ok_or_else(|| {
        AppError::InvalidRequest(
            "Attribute total_price must be a non-negative amount within range.".to_string(),
        )
    })
}

fn check_dates(creation_date: NaiveDate, due_date: NaiveDate) -> Result<(), AppError> {
    if due_date < creation_date {
        return Err(AppError::InvalidRequest(
            "Attribute due_date is before creation_date.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::order::OrderBody;
    use crate::services::auth_service::issue_or_fetch_api_key;
    use crate::services::order_service::{create_order, delete_order};

    async fn setup() -> (DbPool, String, i64) {
        let pool = create_test_pool().await;
        let key = issue_or_fetch_api_key(&pool, Some("test@invoice.com"))
            .await
            .unwrap()
            .key;
        let order = create_order(
            &pool,
            &key,
            OrderBody {
                customer_name: Some("Ada Lovelace".to_string()),
                customer_address: Some("1 Analytical Way".to_string()),
                customer_zip: Some("12345".to_string()),
                customer_city: Some("London".to_string()),
                customer_country: Some("UK".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        (pool, key, order.id)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_create_joins_order_and_scales_price() {
        let (pool, key, order_id) = setup().await;

        let invoice = create_invoice(
            &pool,
            &key,
            InvoiceBody {
                order_id: Some(order_id),
                total_price: Some(1234.5),
                creation_date: Some(date("2024-03-01")),
                due_date: Some(date("2024-03-31")),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(invoice.order_id, order_id);
        assert_eq!(invoice.name, "Ada Lovelace");
        assert_eq!(invoice.city.as_deref(), Some("London"));
        assert!((invoice.total_price - 1234.5).abs() < f64::EPSILON);

        let stored: i64 = sqlx::query_scalar("SELECT total_price FROM invoices WHERE id = ?")
            .bind(invoice.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, 123450);
    }

    #[tokio::test]
    async fn test_create_defaults_dates() {
        let (pool, key, order_id) = setup().await;

        let invoice = create_invoice(
            &pool,
            &key,
            InvoiceBody {
                order_id: Some(order_id),
                total_price: Some(10.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(
            invoice.due_date - invoice.creation_date,
            Duration::days(DEFAULT_PAYMENT_TERM_DAYS)
        );
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_order() {
        let (pool, _key, order_id) = setup().await;
        let other = issue_or_fetch_api_key(&pool, Some("other@invoice.com"))
            .await
            .unwrap()
            .key;

        let result = create_invoice(
            &pool,
            &other,
            InvoiceBody {
                order_id: Some(order_id),
                total_price: Some(10.0),
                ..Default::default()
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert!(list_invoices(&pool, &other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_validates_body() {
        let (pool, key, order_id) = setup().await;

        for body in [
            InvoiceBody {
                total_price: Some(10.0),
                ..Default::default()
            },
            InvoiceBody {
                order_id: Some(order_id),
                ..Default::default()
            },
            InvoiceBody {
                order_id: Some(order_id),
                total_price: Some(-1.0),
                ..Default::default()
            },
            InvoiceBody {
                order_id: Some(order_id),
                total_price: Some(1e20),
                ..Default::default()
            },
            InvoiceBody {
                order_id: Some(order_id),
                total_price: Some(10.0),
                creation_date: Some(date("2024-03-31")),
                due_date: Some(date("2024-03-01")),
                ..Default::default()
            },
        ] {
            let result = create_invoice(&pool, &key, body).await;
            assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        }
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (pool, key, order_id) = setup().await;
        let invoice = create_invoice(
            &pool,
            &key,
            InvoiceBody {
                order_id: Some(order_id),
                total_price: Some(10.0),
                creation_date: Some(date("2024-03-01")),
                due_date: Some(date("2024-03-31")),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let early_due = InvoiceBody {
            id: Some(invoice.id),
            due_date: Some(date("2024-02-01")),
            ..Default::default()
        };
        assert!(matches!(
            update_invoice(&pool, &key, early_due).await,
            Err(AppError::InvalidRequest(_))
        ));

        let huge_total = InvoiceBody {
            id: Some(invoice.id),
            total_price: Some(1e20),
            ..Default::default()
        };
        assert!(matches!(
            update_invoice(&pool, &key, huge_total).await,
            Err(AppError::InvalidRequest(_))
        ));

        let update = InvoiceBody {
            id: Some(invoice.id),
            total_price: Some(99.99),
            ..Default::default()
        };
        update_invoice(&pool, &key, update).await.unwrap();

        let stored = get_invoice(&pool, &key, invoice.id).await.unwrap().unwrap();
        assert!((stored.total_price - 99.99).abs() < 1e-9);
        assert_eq!(stored.due_date, date("2024-03-31"));

        delete_invoice(&pool, &key, Some(invoice.id)).await.unwrap();
        assert!(get_invoice(&pool, &key, invoice.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_order_removes_invoices() {
        let (pool, key, order_id) = setup().await;
        create_invoice(
            &pool,
            &key,
            InvoiceBody {
                order_id: Some(order_id),
                total_price: Some(10.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        delete_order(&pool, &key, Some(order_id)).await.unwrap();
        assert!(list_invoices(&pool, &key).await.unwrap().is_empty());
    }
}
