use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{self, index_by};
use crate::dtos::CreateDocument;
use crate::models::{Document, DocumentDetail};

pub async fn list(
    pool: &PgPool,
    scope: Option<Uuid>,
    condominium_id: Option<Uuid>,
    expense_id: Option<Uuid>,
) -> Result<Vec<Document>, sqlx::Error> {
    sqlx::query_as::<_, Document>(
        "SELECT d.* FROM documents d
         JOIN condominiums c ON d.condominium_id = c.id
         WHERE ($1::uuid IS NULL OR c.company_id = $1)
           AND ($2::uuid IS NULL OR d.condominium_id = $2)
           AND ($3::uuid IS NULL OR d.expense_id = $3)
         ORDER BY d.created_at, d.id",
    )
    .bind(scope)
    .bind(condominium_id)
    .bind(expense_id)
    .fetch_all(pool)
    .await
}

pub async fn list_by_condominiums(
    pool: &PgPool,
    condominium_ids: &[Uuid],
) -> Result<Vec<Document>, sqlx::Error> {
    sqlx::query_as::<_, Document>(
        "SELECT * FROM documents WHERE condominium_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(condominium_ids)
    .fetch_all(pool)
    .await
}

pub async fn list_by_expenses(
    pool: &PgPool,
    expense_ids: &[Uuid],
) -> Result<Vec<Document>, sqlx::Error> {
    sqlx::query_as::<_, Document>(
        "SELECT * FROM documents WHERE expense_id = ANY($1) ORDER BY created_at, id",
    )
    .bind(expense_ids)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    scope: Option<Uuid>,
) -> Result<Option<Document>, sqlx::Error> {
    sqlx::query_as::<_, Document>(
        "SELECT d.* FROM documents d
         JOIN condominiums c ON d.condominium_id = c.id
         WHERE d.id = $1 AND ($2::uuid IS NULL OR c.company_id = $2)",
    )
    .bind(id)
    .bind(scope)
    .fetch_optional(pool)
    .await
}

pub async fn create(pool: &PgPool, req: &CreateDocument) -> Result<Document, sqlx::Error> {
    sqlx::query_as::<_, Document>(
        "INSERT INTO documents (condominium_id, expense_id, title, file_path, mime_type)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(req.condominium_id)
    .bind(req.expense_id)
    .bind(&req.title)
    .bind(&req.file_path)
    .bind(&req.mime_type)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, document: &Document) -> Result<Option<Document>, sqlx::Error> {
    sqlx::query_as::<_, Document>(
        "UPDATE documents SET condominium_id = $2, expense_id = $3, title = $4, file_path = $5,
             mime_type = $6, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(document.id)
    .bind(document.condominium_id)
    .bind(document.expense_id)
    .bind(&document.title)
    .bind(&document.file_path)
    .bind(&document.mime_type)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn with_relations(
    pool: &PgPool,
    rows: Vec<Document>,
    with_condominium: bool,
    with_expense: bool,
) -> Result<Vec<DocumentDetail>, sqlx::Error> {
    let condominiums = if with_condominium {
        let ids: Vec<Uuid> = rows.iter().map(|d| d.condominium_id).collect();
        index_by(db::condominiums::find_by_ids(pool, &ids).await?, |c| c.id)
    } else {
        Default::default()
    };
    let expenses = if with_expense {
        let ids: Vec<Uuid> = rows.iter().filter_map(|d| d.expense_id).collect();
        index_by(db::expenses::find_by_ids(pool, &ids).await?, |e| e.id)
    } else {
        Default::default()
    };

    Ok(rows
        .into_iter()
        .map(|document| DocumentDetail {
            condominium: condominiums.get(&document.condominium_id).cloned(),
            expense: document.expense_id.and_then(|id| expenses.get(&id).cloned()),
            document,
        })
        .collect())
}
