use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{self, group_by, index_by};
use crate::models::{OwnerUnit, Unit, UnitDetail};

pub struct NewUnit<'a> {
    pub condominium_id: Uuid,
    pub door_number: &'a str,
    pub floor: i32,
    pub typology: &'a str,
    pub permillage: f64,
}

pub async fn list(
    pool: &PgPool,
    scope: Option<Uuid>,
    condominium_id: Option<Uuid>,
) -> Result<Vec<Unit>, sqlx::Error> {
    sqlx::query_as::<_, Unit>(
        "SELECT u.* FROM units u
         JOIN condominiums c ON u.condominium_id = c.id
         WHERE ($1::uuid IS NULL OR c.company_id = $1)
           AND ($2::uuid IS NULL OR u.condominium_id = $2)
         ORDER BY u.created_at, u.id",
    )
    .bind(scope)
    .bind(condominium_id)
    .fetch_all(pool)
    .await
}

pub async fn list_by_condominiums(
    pool: &PgPool,
    condominium_ids: &[Uuid],
) -> Result<Vec<Unit>, sqlx::Error> {
    sqlx::query_as::<_, Unit>(
        "SELECT * FROM units WHERE condominium_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(condominium_ids)
    .fetch_all(pool)
    .await
}

/// Units of the given owners, restricted to the scope.
pub async fn list_by_owners(
    pool: &PgPool,
    owner_ids: &[Uuid],
    scope: Option<Uuid>,
) -> Result<Vec<OwnerUnit>, sqlx::Error> {
    sqlx::query_as::<_, OwnerUnit>(
        "SELECT uo.owner_id, u.* FROM unit_owners uo
         JOIN units u ON uo.unit_id = u.id
         JOIN condominiums c ON u.condominium_id = c.id
         WHERE uo.owner_id = ANY($1) AND ($2::uuid IS NULL OR c.company_id = $2)
         ORDER BY u.created_at, u.id",
    )
    .bind(owner_ids)
    .bind(scope)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    scope: Option<Uuid>,
) -> Result<Option<Unit>, sqlx::Error> {
    sqlx::query_as::<_, Unit>(
        "SELECT u.* FROM units u
         JOIN condominiums c ON u.condominium_id = c.id
         WHERE u.id = $1 AND ($2::uuid IS NULL OR c.company_id = $2)",
    )
    .bind(id)
    .bind(scope)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Unit>, sqlx::Error> {
    sqlx::query_as::<_, Unit>("SELECT * FROM units WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    unit: NewUnit<'_>,
) -> Result<Unit, sqlx::Error> {
    sqlx::query_as::<_, Unit>(
        "INSERT INTO units (condominium_id, door_number, floor, typology, permillage)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(unit.condominium_id)
    .bind(unit.door_number)
    .bind(unit.floor)
    .bind(unit.typology)
    .bind(unit.permillage)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    unit: &Unit,
) -> Result<Option<Unit>, sqlx::Error> {
    sqlx::query_as::<_, Unit>(
        "UPDATE units SET condominium_id = $2, door_number = $3, floor = $4, typology = $5,
             permillage = $6, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(unit.id)
    .bind(unit.condominium_id)
    .bind(&unit.door_number)
    .bind(unit.floor)
    .bind(&unit.typology)
    .bind(unit.permillage)
    .fetch_optional(executor)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM units WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Attach owners and payments (and the condominium when asked).
pub async fn with_relations(
    pool: &PgPool,
    rows: Vec<Unit>,
    with_condominium: bool,
) -> Result<Vec<UnitDetail>, sqlx::Error> {
    let ids: Vec<Uuid> = rows.iter().map(|u| u.id).collect();

    let mut owners = group_by(db::unit_owners::owners_of_units(pool, &ids).await?, |o| {
        o.unit_id
    });
    let mut payments = group_by(db::payments::list_by_units(pool, &ids).await?, |p| p.unit_id);

    let condominiums = if with_condominium {
        let condominium_ids: Vec<Uuid> = rows.iter().map(|u| u.condominium_id).collect();
        index_by(
            db::condominiums::find_by_ids(pool, &condominium_ids).await?,
            |c| c.id,
        )
    } else {
        Default::default()
    };

    Ok(rows
        .into_iter()
        .map(|unit| UnitDetail {
            condominium: condominiums.get(&unit.condominium_id).cloned(),
            owners: owners
                .remove(&unit.id)
                .unwrap_or_default()
                .into_iter()
                .map(|link| link.owner)
                .collect(),
            payments: payments.remove(&unit.id).unwrap_or_default(),
            unit,
        })
        .collect())
}
