use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::CreateCompany;
use crate::models::Company;

pub async fn list(pool: &PgPool, scope: Option<Uuid>) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "SELECT * FROM companies WHERE ($1::uuid IS NULL OR id = $1)
         ORDER BY created_at, id",
    )
    .bind(scope)
    .fetch_all(pool)
    .await
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    req: &CreateCompany,
) -> Result<Company, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "INSERT INTO companies (name, vat_number, email, phone, address, is_active)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.vat_number)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.address)
    .bind(req.is_active.unwrap_or(true))
    .fetch_one(executor)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    scope: Option<Uuid>,
) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "SELECT * FROM companies WHERE id = $1 AND ($2::uuid IS NULL OR id = $2)",
    )
    .bind(id)
    .bind(scope)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

/// Write back a merged record.
pub async fn update(pool: &PgPool, company: &Company) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "UPDATE companies SET name = $2, vat_number = $3, email = $4, phone = $5,
             address = $6, is_active = $7, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(company.id)
    .bind(&company.name)
    .bind(&company.vat_number)
    .bind(&company.email)
    .bind(&company.phone)
    .bind(&company.address)
    .bind(company.is_active)
    .fetch_optional(pool)
    .await
}

/// Users and condominiums go with it (ON DELETE CASCADE), and everything
/// below the condominiums in turn.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM companies WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
