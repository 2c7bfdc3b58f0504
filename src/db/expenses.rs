use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{self, group_by, index_by};
use crate::dtos::CreateExpense;
use crate::models::{Expense, ExpenseDetail};

pub async fn list(
    pool: &PgPool,
    scope: Option<Uuid>,
    condominium_id: Option<Uuid>,
) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>(
        "SELECT e.* FROM expenses e
         JOIN condominiums c ON e.condominium_id = c.id
         WHERE ($1::uuid IS NULL OR c.company_id = $1)
           AND ($2::uuid IS NULL OR e.condominium_id = $2)
         ORDER BY e.created_at, e.id",
    )
    .bind(scope)
    .bind(condominium_id)
    .fetch_all(pool)
    .await
}

pub async fn list_by_condominiums(
    pool: &PgPool,
    condominium_ids: &[Uuid],
) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>(
        "SELECT * FROM expenses WHERE condominium_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(condominium_ids)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    scope: Option<Uuid>,
) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>(
        "SELECT e.* FROM expenses e
         JOIN condominiums c ON e.condominium_id = c.id
         WHERE e.id = $1 AND ($2::uuid IS NULL OR c.company_id = $2)",
    )
    .bind(id)
    .bind(scope)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub async fn create(pool: &PgPool, req: &CreateExpense) -> Result<Expense, sqlx::Error> {
    sqlx::query_as::<_, Expense>(
        "INSERT INTO expenses (condominium_id, title, description, amount, date, type)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(req.condominium_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.amount)
    .bind(req.date)
    .bind(req.expense_type)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, expense: &Expense) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>(
        "UPDATE expenses SET condominium_id = $2, title = $3, description = $4, amount = $5,
             date = $6, type = $7, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(expense.id)
    .bind(expense.condominium_id)
    .bind(&expense.title)
    .bind(&expense.description)
    .bind(expense.amount)
    .bind(expense.date)
    .bind(expense.expense_type)
    .fetch_optional(pool)
    .await
}

/// Payments and documents that referenced it keep existing with a null
/// `expense_id`.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM expenses WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn with_relations(
    pool: &PgPool,
    rows: Vec<Expense>,
    with_condominium: bool,
) -> Result<Vec<ExpenseDetail>, sqlx::Error> {
    let ids: Vec<Uuid> = rows.iter().map(|e| e.id).collect();

    let mut payments = group_by(db::payments::list_by_expenses(pool, &ids).await?, |p| {
        p.expense_id
    });
    let mut documents = group_by(db::documents::list_by_expenses(pool, &ids).await?, |d| {
        d.expense_id
    });

    let condominiums = if with_condominium {
        let condominium_ids: Vec<Uuid> = rows.iter().map(|e| e.condominium_id).collect();
        index_by(
            db::condominiums::find_by_ids(pool, &condominium_ids).await?,
            |c| c.id,
        )
    } else {
        Default::default()
    };

    Ok(rows
        .into_iter()
        .map(|expense| ExpenseDetail {
            condominium: condominiums.get(&expense.condominium_id).cloned(),
            payments: payments.remove(&Some(expense.id)).unwrap_or_default(),
            documents: documents.remove(&Some(expense.id)).unwrap_or_default(),
            expense,
        })
        .collect())
}
