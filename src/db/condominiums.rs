use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{self, group_by, index_by};
use crate::dtos::CreateCondominium;
use crate::models::{Condominium, CondominiumDetail};

pub async fn list(
    pool: &PgPool,
    scope: Option<Uuid>,
    company_id: Option<Uuid>,
) -> Result<Vec<Condominium>, sqlx::Error> {
    sqlx::query_as::<_, Condominium>(
        "SELECT * FROM condominiums
         WHERE ($1::uuid IS NULL OR company_id = $1) AND ($2::uuid IS NULL OR company_id = $2)
         ORDER BY created_at, id",
    )
    .bind(scope)
    .bind(company_id)
    .fetch_all(pool)
    .await
}

pub async fn list_by_companies(
    pool: &PgPool,
    company_ids: &[Uuid],
) -> Result<Vec<Condominium>, sqlx::Error> {
    sqlx::query_as::<_, Condominium>(
        "SELECT * FROM condominiums WHERE company_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(company_ids)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    scope: Option<Uuid>,
) -> Result<Option<Condominium>, sqlx::Error> {
    sqlx::query_as::<_, Condominium>(
        "SELECT * FROM condominiums WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
    )
    .bind(id)
    .bind(scope)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Condominium>, sqlx::Error> {
    sqlx::query_as::<_, Condominium>("SELECT * FROM condominiums WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub async fn create(pool: &PgPool, req: &CreateCondominium) -> Result<Condominium, sqlx::Error> {
    sqlx::query_as::<_, Condominium>(
        "INSERT INTO condominiums (company_id, name, address, city, postal_code, total_units)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(req.company_id)
    .bind(&req.name)
    .bind(&req.address)
    .bind(&req.city)
    .bind(&req.postal_code)
    .bind(req.total_units)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    condominium: &Condominium,
) -> Result<Option<Condominium>, sqlx::Error> {
    sqlx::query_as::<_, Condominium>(
        "UPDATE condominiums SET company_id = $2, name = $3, address = $4, city = $5,
             postal_code = $6, total_units = $7, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(condominium.id)
    .bind(condominium.company_id)
    .bind(&condominium.name)
    .bind(&condominium.address)
    .bind(&condominium.city)
    .bind(&condominium.postal_code)
    .bind(condominium.total_units)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM condominiums WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Attach units, expenses and documents (and the company when asked).
pub async fn with_relations(
    pool: &PgPool,
    rows: Vec<Condominium>,
    with_company: bool,
) -> Result<Vec<CondominiumDetail>, sqlx::Error> {
    let ids: Vec<Uuid> = rows.iter().map(|c| c.id).collect();

    let mut units = group_by(db::units::list_by_condominiums(pool, &ids).await?, |u| {
        u.condominium_id
    });
    let mut expenses = group_by(db::expenses::list_by_condominiums(pool, &ids).await?, |e| {
        e.condominium_id
    });
    let mut documents = group_by(db::documents::list_by_condominiums(pool, &ids).await?, |d| {
        d.condominium_id
    });

    let companies = if with_company {
        let company_ids: Vec<Uuid> = rows.iter().map(|c| c.company_id).collect();
        index_by(db::companies::find_by_ids(pool, &company_ids).await?, |c| c.id)
    } else {
        Default::default()
    };

    Ok(rows
        .into_iter()
        .map(|condominium| CondominiumDetail {
            company: companies.get(&condominium.company_id).cloned(),
            units: units.remove(&condominium.id).unwrap_or_default(),
            expenses: expenses.remove(&condominium.id).unwrap_or_default(),
            documents: documents.remove(&condominium.id).unwrap_or_default(),
            condominium,
        })
        .collect())
}
