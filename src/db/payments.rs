use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{self, index_by};
use crate::dtos::CreatePayment;
use crate::models::{Payment, PaymentDetail};

pub async fn list(
    pool: &PgPool,
    scope: Option<Uuid>,
    unit_id: Option<Uuid>,
    expense_id: Option<Uuid>,
) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        "SELECT p.* FROM payments p
         JOIN units u ON p.unit_id = u.id
         JOIN condominiums c ON u.condominium_id = c.id
         WHERE ($1::uuid IS NULL OR c.company_id = $1)
           AND ($2::uuid IS NULL OR p.unit_id = $2)
           AND ($3::uuid IS NULL OR p.expense_id = $3)
         ORDER BY p.created_at, p.id",
    )
    .bind(scope)
    .bind(unit_id)
    .bind(expense_id)
    .fetch_all(pool)
    .await
}

pub async fn list_by_units(pool: &PgPool, unit_ids: &[Uuid]) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE unit_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(unit_ids)
    .fetch_all(pool)
    .await
}

pub async fn list_by_expenses(
    pool: &PgPool,
    expense_ids: &[Uuid],
) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE expense_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(expense_ids)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    scope: Option<Uuid>,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        "SELECT p.* FROM payments p
         JOIN units u ON p.unit_id = u.id
         JOIN condominiums c ON u.condominium_id = c.id
         WHERE p.id = $1 AND ($2::uuid IS NULL OR c.company_id = $2)",
    )
    .bind(id)
    .bind(scope)
    .fetch_optional(pool)
    .await
}

pub async fn create(pool: &PgPool, req: &CreatePayment) -> Result<Payment, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        "INSERT INTO payments (unit_id, expense_id, amount, date, method, status)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(req.unit_id)
    .bind(req.expense_id)
    .bind(req.amount)
    .bind(req.date)
    .bind(req.method)
    .bind(req.status.unwrap_or_default())
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, payment: &Payment) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        "UPDATE payments SET unit_id = $2, expense_id = $3, amount = $4, date = $5,
             method = $6, status = $7, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(payment.id)
    .bind(payment.unit_id)
    .bind(payment.expense_id)
    .bind(payment.amount)
    .bind(payment.date)
    .bind(payment.method)
    .bind(payment.status)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn with_relations(
    pool: &PgPool,
    rows: Vec<Payment>,
    with_unit: bool,
    with_expense: bool,
) -> Result<Vec<PaymentDetail>, sqlx::Error> {
    let units = if with_unit {
        let ids: Vec<Uuid> = rows.iter().map(|p| p.unit_id).collect();
        index_by(db::units::find_by_ids(pool, &ids).await?, |u| u.id)
    } else {
        Default::default()
    };
    let expenses = if with_expense {
        let ids: Vec<Uuid> = rows.iter().filter_map(|p| p.expense_id).collect();
        index_by(db::expenses::find_by_ids(pool, &ids).await?, |e| e.id)
    } else {
        Default::default()
    };

    Ok(rows
        .into_iter()
        .map(|payment| PaymentDetail {
            unit: units.get(&payment.unit_id).cloned(),
            expense: payment.expense_id.and_then(|id| expenses.get(&id).cloned()),
            payment,
        })
        .collect())
}
