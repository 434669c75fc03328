use crate::models::{Event, EventRow};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct EventRepository;

impl EventRepository {
    /// Upsert an event by primary key. Copies all mutable fields including
    /// `status_changed_at` (nullable). `created_at` is preserved on update.
    pub async fn upsert(tx: &mut Transaction<'_, Postgres>, event: &Event) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (
                id, name, event_time, place_id, registration_deadline, status,
                number_of_visitors, created_at, changed_at, status_changed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                event_time = EXCLUDED.event_time,
                place_id = EXCLUDED.place_id,
                registration_deadline = EXCLUDED.registration_deadline,
                status = EXCLUDED.status,
                number_of_visitors = EXCLUDED.number_of_visitors,
                changed_at = EXCLUDED.changed_at,
                status_changed_at = EXCLUDED.status_changed_at
            "#,
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(event.event_time)
        .bind(event.place_id)
        .bind(event.registration_deadline)
        .bind(&event.status)
        .bind(event.number_of_visitors)
        .bind(event.created_at)
        .bind(event.changed_at)
        .bind(event.status_changed_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, name, event_time, place_id, registration_deadline, status,
                   number_of_visitors, created_at, changed_at, status_changed_at
            FROM events WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Event::from))
    }

    pub async fn list(
        pool: &PgPool,
        date_from: Option<chrono::NaiveDate>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<(i64, Vec<Event>)> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM events WHERE ($1::date IS NULL OR event_time::date >= $1)",
        )
        .bind(date_from)
        .fetch_one(pool)
        .await?;

        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, name, event_time, place_id, registration_deadline, status,
                   number_of_visitors, created_at, changed_at, status_changed_at
            FROM events
            WHERE ($1::date IS NULL OR event_time::date >= $1)
            ORDER BY event_time ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(date_from)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok((count, rows.into_iter().map(Event::from).collect()))
    }
}
