//! Record writes.

use std::sync::LazyLock;

use sqlx::SqlitePool;

use crate::config::WriteMode;
use crate::error_handling::DatabaseError;
use crate::models::{CarRecord, RECORD_FIELDS};

static INSERT_SQL: LazyLock<String> = LazyLock::new(|| {
    format!(
        "INSERT INTO car_records ({}, crawled_at) VALUES ({})",
        RECORD_FIELDS.join(", "),
        vec!["?"; RECORD_FIELDS.len() + 1].join(", ")
    )
});

/// List-valued fields encoded as JSON text.
pub(crate) struct JsonColumns {
    pub images: String,
    pub equipment: String,
    pub similar_cars: String,
}

impl JsonColumns {
    pub(crate) fn encode(record: &CarRecord) -> Result<Self, DatabaseError> {
        Ok(Self {
            images: to_json("images", &record.images)?,
            equipment: to_json("equipment", &record.equipment)?,
            similar_cars: to_json("similar_cars", &record.similar_cars)?,
        })
    }
}

fn to_json<T: serde::Serialize>(column: &'static str, value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|source| DatabaseError::JsonColumn { column, source })
}

/// Writes one record.
///
/// In [`WriteMode::Upsert`] any earlier rows with the same `url` are removed in
/// the same transaction, so the table keeps one row per listing.
pub async fn insert_record(
    pool: &SqlitePool,
    record: &CarRecord,
    mode: WriteMode,
) -> Result<(), DatabaseError> {
    let json = JsonColumns::encode(record)?;
    let mut tx = pool.begin().await?;

    if mode == WriteMode::Upsert {
        let replaced = sqlx::query("DELETE FROM car_records WHERE url = ?")
            .bind(&record.url)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if replaced > 0 {
            log::debug!("Replacing {} stored row(s) for {}", replaced, record.url);
        }
    }

    sqlx::query(INSERT_SQL.as_str())
        .bind(&record.url)
        .bind(&record.make)
        .bind(&record.model)
        .bind(&record.price)
        .bind(record.vat_deductable)
        .bind(&json.images)
        .bind(&record.mileage)
        .bind(&record.gearbox)
        .bind(&record.first_registration)
        .bind(&record.fuel_type)
        .bind(&record.power)
        .bind(&record.seller)
        .bind(&record.seller_address)
        .bind(&record.seller_contact)
        .bind(&record.body_type)
        .bind(&record.car_type)
        .bind(&record.drive_train)
        .bind(&record.seats)
        .bind(&record.doors)
        .bind(&record.general_inspection)
        .bind(&record.previous_owner)
        .bind(&record.engine_size)
        .bind(&record.gears)
        .bind(&record.cylinders)
        .bind(&record.empty_weight)
        .bind(&record.fuel_consumption)
        .bind(&record.co2_emissions)
        .bind(&record.emission_class)
        .bind(&json.equipment)
        .bind(&record.color)
        .bind(&record.paint)
        .bind(&record.upholstery_colour)
        .bind(&record.upholstery)
        .bind(&record.contact)
        .bind(&json.similar_cars)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
