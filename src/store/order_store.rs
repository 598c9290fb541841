use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use super::{validate_for_write, OrderRepository};
use crate::domain::order::{Order, OrderError, OrderRow};

// ============================================================================
// Postgres Order Store
// ============================================================================
//
// Error mapping:
// - unique violation (23505)                    → Conflict
// - pool timed out / closed, I/O, TLS failures  → Unavailable
// - anything else                               → Internal
//
// ============================================================================

const SCHEMA: &str = include_str!("../../migrations/0001_create_orders.sql");

const INSERT_ORDER: &str =
    "INSERT INTO orders (id, created_at, account_id, total_price) VALUES ($1, $2, $3, $4)";

const INSERT_ORDER_PRODUCTS: &str = r#"
    INSERT INTO order_products (order_id, position, product_id, quantity)
    SELECT $1::text, item.position, item.product_id, item.quantity
    FROM UNNEST($2::integer[], $3::text[], $4::integer[]) AS item(position, product_id, quantity)
"#;

const SELECT_ORDERS_FOR_ACCOUNT: &str = r#"
    SELECT
        o.id,
        o.created_at,
        o.account_id,
        o.total_price,
        op.product_id,
        op.quantity
    FROM orders o
    LEFT JOIN order_products op ON o.id = op.order_id
    WHERE o.account_id = $1
    ORDER BY o.id, op.position
"#;

pub async fn create_pool(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
}

#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the order tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), OrderError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        tracing::info!("Order schema ready");
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderStore {
    async fn write(&self, order: &Order) -> Result<(), OrderError> {
        let quantities = validate_for_write(order)?;
        let positions: Vec<i32> = (0..order.products.len() as i32).collect();
        let product_ids: Vec<String> = order
            .products
            .iter()
            .map(|p| p.product_id.clone())
            .collect();

        // Rolled back on drop unless committed, which also covers the caller
        // cancelling this future mid-write.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        sqlx::query(INSERT_ORDER)
            .bind(&order.id)
            .bind(order.created_at)
            .bind(&order.account_id)
            .bind(order.total_price)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    OrderError::Conflict(order.id.clone())
                } else {
                    map_sqlx_error("insert_order", e)
                }
            })?;

        sqlx::query(INSERT_ORDER_PRODUCTS)
            .bind(&order.id)
            .bind(&positions)
            .bind(&product_ids)
            .bind(&quantities)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_order_products", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        tracing::info!(
            order_id = %order.id,
            account_id = %order.account_id,
            item_count = order.products.len(),
            "Persisted order"
        );

        Ok(())
    }

    async fn rows_for_account(&self, account_id: &str) -> Result<Vec<OrderRow>, OrderError> {
        let rows = sqlx::query(SELECT_ORDERS_FOR_ACCOUNT)
            .bind(account_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("select_orders_for_account", e))?;

        tracing::debug!(account_id = %account_id, row_count = rows.len(), "Loaded order rows");

        rows.iter().map(order_row).collect()
    }
}

fn order_row(row: &PgRow) -> Result<OrderRow, OrderError> {
    let decode = |e| map_sqlx_error("decode_order_row", e);

    let order_id: String = row.try_get("id").map_err(decode)?;
    let quantity: Option<i32> = row.try_get("quantity").map_err(decode)?;
    let quantity = quantity
        .map(|q| {
            u32::try_from(q).map_err(|_| {
                OrderError::Internal(format!("negative quantity {q} stored for order {order_id}"))
            })
        })
        .transpose()?;

    Ok(OrderRow {
        account_id: row.try_get("account_id").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        total_price: row.try_get("total_price").map_err(decode)?,
        product_id: row.try_get("product_id").map_err(decode)?,
        quantity,
        order_id,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> OrderError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => OrderError::Conflict(msg),
                _ => OrderError::Internal(msg),
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            OrderError::Unavailable(format!("connection pool unavailable in {}", operation))
        }
        sqlx::Error::Io(e) => OrderError::Unavailable(format!("I/O error in {}: {}", operation, e)),
        sqlx::Error::Tls(e) => OrderError::Unavailable(format!("TLS error in {}: {}", operation, e)),
        other => OrderError::Internal(format!("sqlx error in {}: {}", operation, other)),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}
