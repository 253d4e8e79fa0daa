//! One CSV row per record.
//!
//! Cells follow [`RECORD_FIELDS`]. Missing scalars are empty cells, the VAT
//! flag is `true`/`false`, and list-valued fields are JSON cells.

use anyhow::{bail, Context, Result};
use csv::StringRecord;
use serde::de::DeserializeOwned;

use crate::models::{CarRecord, RECORD_FIELDS};

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn optional(cell: &str) -> Option<String> {
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

fn json_cell<T: DeserializeOwned + Default>(column: &str, cell: &str) -> Result<T> {
    if cell.is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(cell).with_context(|| format!("Invalid JSON in column {}", column))
}

fn parse_bool(cell: &str) -> Result<bool> {
    match cell.trim() {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" | "" => Ok(false),
        other => bail!("Invalid vat_deductable value: {}", other),
    }
}

/// Cells of one record, in column order.
pub struct CsvRow(Vec<String>);

impl CsvRow {
    pub fn from_record(r: &CarRecord) -> Result<Self, serde_json::Error> {
        Ok(Self(vec![
            r.url.clone(),
            cell(&r.make),
            cell(&r.model),
            cell(&r.price),
            r.vat_deductable.to_string(),
            serde_json::to_string(&r.images)?,
            cell(&r.mileage),
            cell(&r.gearbox),
            cell(&r.first_registration),
            cell(&r.fuel_type),
            cell(&r.power),
            cell(&r.seller),
            cell(&r.seller_address),
            cell(&r.seller_contact),
            cell(&r.body_type),
            cell(&r.car_type),
            cell(&r.drive_train),
            cell(&r.seats),
            cell(&r.doors),
            cell(&r.general_inspection),
            cell(&r.previous_owner),
            cell(&r.engine_size),
            cell(&r.gears),
            cell(&r.cylinders),
            cell(&r.empty_weight),
            cell(&r.fuel_consumption),
            cell(&r.co2_emissions),
            cell(&r.emission_class),
            serde_json::to_string(&r.equipment)?,
            cell(&r.color),
            cell(&r.paint),
            cell(&r.upholstery_colour),
            cell(&r.upholstery),
            cell(&r.contact),
            serde_json::to_string(&r.similar_cars)?,
        ]))
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }

    /// Parses a row written by [`CsvRow::from_record`].
    pub fn parse(row: &StringRecord) -> Result<CarRecord> {
        if row.len() != RECORD_FIELDS.len() {
            bail!(
                "Expected {} columns, found {}",
                RECORD_FIELDS.len(),
                row.len()
            );
        }
        let c = |i: usize| row.get(i).unwrap_or_default();

        Ok(CarRecord {
            url: c(0).to_string(),
            make: optional(c(1)),
            model: optional(c(2)),
            price: optional(c(3)),
            vat_deductable: parse_bool(c(4))?,
            images: json_cell("images", c(5))?,
            mileage: optional(c(6)),
            gearbox: optional(c(7)),
            first_registration: optional(c(8)),
            fuel_type: optional(c(9)),
            power: optional(c(10)),
            seller: optional(c(11)),
            seller_address: optional(c(12)),
            seller_contact: optional(c(13)),
            body_type: optional(c(14)),
            car_type: optional(c(15)),
            drive_train: optional(c(16)),
            seats: optional(c(17)),
            doors: optional(c(18)),
            general_inspection: optional(c(19)),
            previous_owner: optional(c(20)),
            engine_size: optional(c(21)),
            gears: optional(c(22)),
            cylinders: optional(c(23)),
            empty_weight: optional(c(24)),
            fuel_consumption: optional(c(25)),
            co2_emissions: optional(c(26)),
            emission_class: optional(c(27)),
            equipment: json_cell("equipment", c(28))?,
            color: optional(c(29)),
            paint: optional(c(30)),
            upholstery_colour: optional(c(31)),
            upholstery: optional(c(32)),
            contact: optional(c(33)),
            similar_cars: json_cell("similar_cars", c(34))?,
        })
    }
}
