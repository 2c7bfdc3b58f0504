//! The `unit_owners` join table: a flat set of (unit, owner) pairs.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::UnitOwner;

pub async fn owners_of_units(
    pool: &PgPool,
    unit_ids: &[Uuid],
) -> Result<Vec<UnitOwner>, sqlx::Error> {
    sqlx::query_as::<_, UnitOwner>(
        "SELECT uo.unit_id, o.* FROM unit_owners uo
         JOIN owners o ON uo.owner_id = o.id
         WHERE uo.unit_id = ANY($1)
         ORDER BY o.created_at, o.id",
    )
    .bind(unit_ids)
    .fetch_all(pool)
    .await
}

/// Idempotent: linking an existing pair changes nothing.
pub async fn add(pool: &PgPool, unit_id: Uuid, owner_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO unit_owners (unit_id, owner_id) VALUES ($1, $2)
         ON CONFLICT (unit_id, owner_id) DO NOTHING",
    )
    .bind(unit_id)
    .bind(owner_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Idempotent: removing a non-member is a no-op.
pub async fn remove(pool: &PgPool, unit_id: Uuid, owner_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM unit_owners WHERE unit_id = $1 AND owner_id = $2")
        .bind(unit_id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Replace a unit's owner set with the existing owners among `owner_ids`.
pub async fn replace(
    conn: &mut sqlx::PgConnection,
    unit_id: Uuid,
    owner_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM unit_owners WHERE unit_id = $1")
        .bind(unit_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "INSERT INTO unit_owners (unit_id, owner_id)
         SELECT $1, id FROM owners WHERE id = ANY($2)
         ON CONFLICT (unit_id, owner_id) DO NOTHING",
    )
    .bind(unit_id)
    .bind(owner_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
