use crate::error::{ApiError, Result};
use crate::models::{db_int, Regulation, RegulationInput};

/// All regulations, in number order.
pub async fn list_regulations<'e, E>(executor: E) -> Result<Vec<Regulation>>
where
    E: sqlx::PgExecutor<'e>,
{
    let regulations = sqlx::query_as::<_, Regulation>(
        r#"SELECT * FROM regulations ORDER BY regulation_number"#,
    )
    .fetch_all(executor)
    .await?;

    Ok(regulations)
}

/// Look up a regulation by number.
pub async fn get_regulation<'e, E>(executor: E, law_number: u32) -> Result<Option<Regulation>>
where
    E: sqlx::PgExecutor<'e>,
{
    let regulation = sqlx::query_as::<_, Regulation>(
        r#"SELECT * FROM regulations WHERE regulation_number = $1"#,
    )
    .bind(db_int(law_number))
    .fetch_optional(executor)
    .await?;

    Ok(regulation)
}

/// Create a regulation; its number is assigned by the store.
#[tracing::instrument(skip(executor, input), fields(regulation_name = %input.regulation_name))]
pub async fn create_regulation<'e, E>(executor: E, input: &RegulationInput) -> Result<Regulation>
where
    E: sqlx::PgExecutor<'e>,
{
    let regulation = sqlx::query_as::<_, Regulation>(
        r#"
        INSERT INTO regulations (regulation_name, authority, update_date)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&input.regulation_name)
    .bind(&input.authority)
    .bind(&input.update_date)
    .fetch_one(executor)
    .await?;

    tracing::info!(regulation_number = regulation.regulation_number, "regulation created");
    Ok(regulation)
}

/// Update a regulation's name, authority and update date.
#[tracing::instrument(skip(executor, input))]
pub async fn update_regulation<'e, E>(
    executor: E,
    law_number: u32,
    input: &RegulationInput,
) -> Result<Regulation>
where
    E: sqlx::PgExecutor<'e>,
{
    let regulation = sqlx::query_as::<_, Regulation>(
        r#"
        UPDATE regulations
        SET regulation_name = $2, authority = $3, update_date = $4, updated_at = now()
        WHERE regulation_number = $1
        RETURNING *
        "#,
    )
    .bind(db_int(law_number))
    .bind(&input.regulation_name)
    .bind(&input.authority)
    .bind(&input.update_date)
    .fetch_optional(executor)
    .await?
    .ok_or(ApiError::RegulationNotFound(law_number))?;

    Ok(regulation)
}

/// Delete a regulation. Its articles stay in place.
#[tracing::instrument(skip(executor))]
pub async fn delete_regulation<'e, E>(executor: E, law_number: u32) -> Result<bool>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(r#"DELETE FROM regulations WHERE regulation_number = $1"#)
        .bind(db_int(law_number))
        .execute(executor)
        .await?;

    let removed = result.rows_affected() > 0;
    if removed {
        tracing::info!(law_number, "regulation deleted");
    }
    Ok(removed)
}
