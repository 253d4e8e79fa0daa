//! The extracted vehicle record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column order shared by every tabular representation of a [`CarRecord`].
pub const RECORD_FIELDS: [&str; 35] = [
    "url",
    "make",
    "model",
    "price",
    "vat_deductable",
    "images",
    "mileage",
    "gearbox",
    "first_registration",
    "fuel_type",
    "power",
    "seller",
    "seller_address",
    "seller_contact",
    "body_type",
    "car_type",
    "drive_train",
    "seats",
    "doors",
    "general_inspection",
    "previous_owner",
    "engine_size",
    "gears",
    "cylinders",
    "empty_weight",
    "fuel_consumption",
    "co2_emissions",
    "emission_class",
    "equipment",
    "color",
    "paint",
    "upholstery_colour",
    "upholstery",
    "contact",
    "similar_cars",
];

/// Equipment lists grouped the way the detail page groups them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(rename = "Comfort & Convenience", default)]
    pub comfort_convenience: Vec<String>,
    #[serde(rename = "Entertainment & Media", default)]
    pub entertainment_media: Vec<String>,
    #[serde(rename = "Safety & Security", default)]
    pub safety_security: Vec<String>,
    #[serde(rename = "Extras", default)]
    pub extras: Vec<String>,
}

impl Equipment {
    pub fn is_empty(&self) -> bool {
        self.comfort_convenience.is_empty()
            && self.entertainment_media.is_empty()
            && self.safety_security.is_empty()
            && self.extras.is_empty()
    }
}

/// One vehicle listing.
///
/// Every field except `url` is best-effort; a record always has the full shape
/// even when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarRecord {
    pub url: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub price: Option<String>,
    pub vat_deductable: bool,
    pub images: Vec<String>,
    pub mileage: Option<String>,
    pub gearbox: Option<String>,
    pub first_registration: Option<String>,
    pub fuel_type: Option<String>,
    pub power: Option<String>,
    pub seller: Option<String>,
    pub seller_address: Option<String>,
    pub seller_contact: Option<String>,
    pub body_type: Option<String>,
    pub car_type: Option<String>,
    pub drive_train: Option<String>,
    pub seats: Option<String>,
    pub doors: Option<String>,
    pub general_inspection: Option<String>,
    pub previous_owner: Option<String>,
    pub engine_size: Option<String>,
    pub gears: Option<String>,
    pub cylinders: Option<String>,
    pub empty_weight: Option<String>,
    pub fuel_consumption: Option<String>,
    pub co2_emissions: Option<String>,
    pub emission_class: Option<String>,
    pub equipment: Equipment,
    pub color: Option<String>,
    pub paint: Option<String>,
    pub upholstery_colour: Option<String>,
    pub upholstery: Option<String>,
    pub contact: Option<String>,
    pub similar_cars: Vec<Value>,
}

impl CarRecord {
    /// A record with only the identifying fields set.
    pub fn new(url: impl Into<String>, make: Option<String>, model: Option<String>) -> Self {
        Self {
            url: url.into(),
            make,
            model,
            ..Default::default()
        }
    }
}

/// Outcome of the similar-listings lookup for one detail URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentResult {
    pub correlation_key: Option<String>,
    pub items: Vec<Value>,
}

impl EnrichmentResult {
    pub fn empty(correlation_key: Option<String>) -> Self {
        Self {
            correlation_key,
            items: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_fields_match_serialized_order() {
        let record = CarRecord::new("https://x.test/offers/a", None, None);
        let value = serde_json::to_value(&record).expect("serialize");
        let keys: Vec<&str> = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        // serde_json sorts keys unless preserve_order is on, so compare as sets
        let mut expected: Vec<&str> = RECORD_FIELDS.to_vec();
        expected.sort_unstable();
        let mut actual = keys.clone();
        actual.sort_unstable();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_equipment_uses_page_group_names() {
        let equipment = Equipment {
            extras: vec!["Alloy wheels".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_string(&equipment).expect("serialize");
        assert!(json.contains("\"Comfort & Convenience\":[]"));
        assert!(json.contains("\"Extras\":[\"Alloy wheels\"]"));
        assert!(!equipment.is_empty());
        assert!(Equipment::default().is_empty());
    }

    #[test]
    fn test_new_record_has_full_shape() {
        let record = CarRecord::new("u", Some("audi".into()), Some("a4".into()));
        assert_eq!(record.url, "u");
        assert!(record.price.is_none());
        assert!(!record.vat_deductable);
        assert!(record.images.is_empty());
        assert!(record.similar_cars.is_empty());
    }
}
