use crate::models::Ticket;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct TicketRepository;

impl TicketRepository {
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        ticket_id: Uuid,
        event_id: Uuid,
        seat: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> sqlx::Result<Ticket> {
        sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets (ticket_id, event_id, seat, first_name, last_name, email, registered_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING id, ticket_id, event_id, seat, first_name, last_name, email, registered_at
            "#,
        )
        .bind(ticket_id)
        .bind(event_id)
        .bind(seat)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn get_by_ticket_id(pool: &PgPool, ticket_id: Uuid) -> sqlx::Result<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            r#"
            SELECT id, ticket_id, event_id, seat, first_name, last_name, email, registered_at
            FROM tickets WHERE ticket_id = $1
            "#,
        )
        .bind(ticket_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(tx: &mut Transaction<'_, Postgres>, ticket_id: Uuid) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM tickets WHERE ticket_id = $1")
            .bind(ticket_id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}
