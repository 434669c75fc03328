use crate::models::Place;
use sqlx::{Postgres, Transaction};

pub struct PlaceRepository;

impl PlaceRepository {
    /// Upsert a place by primary key. Copies `name, city, address,
    /// seats_pattern, changed_at` onto the existing row; inserts supply
    /// `created_at`.
    pub async fn upsert(tx: &mut Transaction<'_, Postgres>, place: &Place) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO places (id, name, city, address, seats_pattern, created_at, changed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                city = EXCLUDED.city,
                address = EXCLUDED.address,
                seats_pattern = EXCLUDED.seats_pattern,
                changed_at = EXCLUDED.changed_at
            "#,
        )
        .bind(place.id)
        .bind(&place.name)
        .bind(&place.city)
        .bind(&place.address)
        .bind(&place.seats_pattern)
        .bind(place.created_at)
        .bind(place.changed_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
