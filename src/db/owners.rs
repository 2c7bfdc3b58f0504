use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{self, group_by};
use crate::dtos::CreateOwner;
use crate::models::{Owner, OwnerDetail};

pub async fn list(pool: &PgPool) -> Result<Vec<Owner>, sqlx::Error> {
    sqlx::query_as::<_, Owner>("SELECT * FROM owners ORDER BY created_at, id")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Owner>, sqlx::Error> {
    sqlx::query_as::<_, Owner>("SELECT * FROM owners WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, req: &CreateOwner) -> Result<Owner, sqlx::Error> {
    sqlx::query_as::<_, Owner>(
        "INSERT INTO owners (name, email, phone, tax_number)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.tax_number)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, owner: &Owner) -> Result<Option<Owner>, sqlx::Error> {
    sqlx::query_as::<_, Owner>(
        "UPDATE owners SET name = $2, email = $3, phone = $4, tax_number = $5, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(owner.id)
    .bind(&owner.name)
    .bind(&owner.email)
    .bind(&owner.phone)
    .bind(&owner.tax_number)
    .fetch_optional(pool)
    .await
}

/// Memberships go with the owner; the units stay.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM owners WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Whether the owner holds a unit in a company other than `company_id`.
pub async fn linked_outside(
    pool: &PgPool,
    id: Uuid,
    company_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1 FROM unit_owners uo
             JOIN units u ON u.id = uo.unit_id
             JOIN condominiums c ON c.id = u.condominium_id
             WHERE uo.owner_id = $1 AND c.company_id <> $2
         )",
    )
    .bind(id)
    .bind(company_id)
    .fetch_one(pool)
    .await
}

/// Attach each owner's units. Units outside `scope` are not shown.
pub async fn with_units(
    pool: &PgPool,
    rows: Vec<Owner>,
    scope: Option<Uuid>,
) -> Result<Vec<OwnerDetail>, sqlx::Error> {
    let ids: Vec<Uuid> = rows.iter().map(|o| o.id).collect();
    let mut units = group_by(db::units::list_by_owners(pool, &ids, scope).await?, |u| {
        u.owner_id
    });

    Ok(rows
        .into_iter()
        .map(|owner| OwnerDetail {
            units: units
                .remove(&owner.id)
                .unwrap_or_default()
                .into_iter()
                .map(|link| link.unit)
                .collect(),
            owner,
        })
        .collect())
}
