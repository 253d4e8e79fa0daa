//! Reading stored records back.

use std::sync::LazyLock;

use futures::stream::{BoxStream, StreamExt};
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error_handling::DatabaseError;
use crate::models::{CarRecord, RECORD_FIELDS};

static SELECT_SQL: LazyLock<String> = LazyLock::new(|| {
    format!(
        "SELECT {} FROM car_records ORDER BY id",
        RECORD_FIELDS.join(", ")
    )
});

fn from_json<T: DeserializeOwned>(row: &SqliteRow, column: &'static str) -> Result<T, DatabaseError> {
    let text: String = row.try_get(column)?;
    serde_json::from_str(&text).map_err(|source| DatabaseError::JsonColumn { column, source })
}

/// Decodes one `car_records` row.
pub fn record_from_row(row: &SqliteRow) -> Result<CarRecord, DatabaseError> {
    Ok(CarRecord {
        url: row.try_get("url")?,
        make: row.try_get("make")?,
        model: row.try_get("model")?,
        price: row.try_get("price")?,
        vat_deductable: row.try_get("vat_deductable")?,
        images: from_json(row, "images")?,
        mileage: row.try_get("mileage")?,
        gearbox: row.try_get("gearbox")?,
        first_registration: row.try_get("first_registration")?,
        fuel_type: row.try_get("fuel_type")?,
        power: row.try_get("power")?,
        seller: row.try_get("seller")?,
        seller_address: row.try_get("seller_address")?,
        seller_contact: row.try_get("seller_contact")?,
        body_type: row.try_get("body_type")?,
        car_type: row.try_get("car_type")?,
        drive_train: row.try_get("drive_train")?,
        seats: row.try_get("seats")?,
        doors: row.try_get("doors")?,
        general_inspection: row.try_get("general_inspection")?,
        previous_owner: row.try_get("previous_owner")?,
        engine_size: row.try_get("engine_size")?,
        gears: row.try_get("gears")?,
        cylinders: row.try_get("cylinders")?,
        empty_weight: row.try_get("empty_weight")?,
        fuel_consumption: row.try_get("fuel_consumption")?,
        co2_emissions: row.try_get("co2_emissions")?,
        emission_class: row.try_get("emission_class")?,
        equipment: from_json(row, "equipment")?,
        color: row.try_get("color")?,
        paint: row.try_get("paint")?,
        upholstery_colour: row.try_get("upholstery_colour")?,
        upholstery: row.try_get("upholstery")?,
        contact: row.try_get("contact")?,
        similar_cars: from_json(row, "similar_cars")?,
    })
}

/// Streams every stored record in insertion order.
pub fn stream_records(pool: &SqlitePool) -> BoxStream<'_, Result<CarRecord, DatabaseError>> {
    sqlx::query(SELECT_SQL.as_str())
        .fetch(pool)
        .map(|row| row.map_err(DatabaseError::from).and_then(|row| record_from_row(&row)))
        .boxed()
}

pub async fn count_records(pool: &SqlitePool) -> Result<i64, DatabaseError> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM car_records")
        .fetch_one(pool)
        .await?)
}
