//! Extraction tests against a trimmed-down detail page.

use super::*;
use scraper::Html;

const DETAIL_URL: &str =
    "https://www.autoscout24.com/offers/audi-a4-avant-diesel-grey-0b9c4f4e-59b4-4c8e-9d1a-6a2b3c4d5e6f";

const DETAIL_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<div class="Gallery">
  <img src="https://img.test/1.jpg" alt="front">
  <img src="https://img.test/2.jpg" alt="side">
  <img alt="no source">
</div>
<div class="PriceInfo">
  <span class="PriceInfo_price">€ 12,500<sup>1</sup></span>
</div>
<div class="VehicleOverview">
  <div class="Item"><div>Mileage</div><div></div><div>125,000 km</div></div>
  <div class="Item"><div>Gearbox</div><div>Manual</div></div>
  <div class="Item"><div>First registration</div><div>03/2015</div></div>
  <div class="Item"><div>Power</div><div>110 kW (150 hp)</div></div>
  <div class="Item"><div>Seller</div><div>Dealer</div></div>
</div>
<div class="Vendor">
  <div class="VendorInfo">
    <div>Autohaus Muster</div>
    <div><a href="https://maps.test"><div>Hauptstr. 1, 10115 Berlin</div></a></div>
  </div>
  <div class="VendorContact">
    <span>Contact</span>
    <div><a href="tel:123">Max Mustermann</a> <span>+49 30 123456</span></div>
  </div>
</div>
<dl>
  <dt><span>Body type</span></dt><dd>Station wagon</dd>
  <dt><span>Type</span></dt><dd>Used</dd>
  <dt><span>Drivetrain</span></dt><dd>Front</dd>
  <dt><span>Seats</span></dt><dd>5</dd>
  <dt><span>Doors</span></dt><dd>5</dd>
  <dt><span>General inspection</span></dt><dd>New</dd>
  <dt><span>Previous owner</span></dt><dd>2</dd>
</dl>
<dl>
  <dt><span>Engine size</span></dt><dd>1,968 cc</dd>
  <dt><span>Gears</span></dt><dd>6</dd>
  <dt><span>Cylinders</span></dt><dd>4</dd>
  <dt><span>Empty weight</span></dt><dd>1,555 kg</dd>
  <dt><span>Fuel type</span></dt><dd>Diesel</dd>
  <dt><span>Fuel consumption</span></dt><dd>4.4 l/100 km (comb.)</dd>
  <dt><span>CO₂-emissions</span></dt><dd>114 g/km (comb.)</dd>
  <dt><span>Emission class</span></dt><dd>Euro 6</dd>
</dl>
<dl>
  <dt><span>Comfort &amp; Convenience</span></dt>
  <dd><ul><li>Air conditioning</li><li>Cruise control</li></ul></dd>
  <dt><span>Entertainment &amp; Media</span></dt>
  <dd><ul><li>Bluetooth</li></ul></dd>
  <dt><span>Safety &amp; Security</span></dt>
  <dd><ul><li>ABS</li><li>ESP</li><li>Isofix</li></ul></dd>
  <dt><span>Extras</span></dt>
  <dd><ul><li>Alloy wheels</li></ul></dd>
</dl>
<dl>
  <dt><span>Colour</span></dt><dd>Grey</dd>
  <dt><span>Paint</span></dt><dd>Metallic</dd>
  <dt><span>Upholstery colour</span></dt><dd>Black</dd>
  <dt><span>Upholstery</span></dt><dd>Cloth</dd>
</dl>
</body></html>"#;

fn context() -> ExtractContext {
    ExtractContext {
        make: "audi".to_string(),
        model: "a4".to_string(),
    }
}

fn extract_page(html: &str) -> CarRecord {
    extract(&Html::parse_document(html), DETAIL_URL, &context())
}

#[test]
fn test_extract_full_page() {
    let record = extract_page(DETAIL_PAGE);

    assert_eq!(record.url, DETAIL_URL);
    assert_eq!(record.make.as_deref(), Some("audi"));
    assert_eq!(record.model.as_deref(), Some("a4"));
    assert_eq!(record.price.as_deref(), Some("12,500"));
    assert!(record.vat_deductable);
    assert_eq!(
        record.images,
        vec!["https://img.test/1.jpg", "https://img.test/2.jpg"]
    );
    assert_eq!(record.mileage.as_deref(), Some("125,000 km"));
    assert_eq!(record.gearbox.as_deref(), Some("Manual"));
    assert_eq!(record.first_registration.as_deref(), Some("03/2015"));
    assert_eq!(record.power.as_deref(), Some("110 kW (150 hp)"));
    assert_eq!(record.seller.as_deref(), Some("Dealer"));
    assert_eq!(
        record.seller_address.as_deref(),
        Some("Hauptstr. 1, 10115 Berlin")
    );
    assert_eq!(record.seller_contact.as_deref(), Some("Max Mustermann"));
    assert_eq!(record.contact.as_deref(), Some("+49 30 123456"));
    assert_eq!(record.body_type.as_deref(), Some("Station wagon"));
    assert_eq!(record.car_type.as_deref(), Some("Used"));
    assert_eq!(record.drive_train.as_deref(), Some("Front"));
    assert_eq!(record.seats.as_deref(), Some("5"));
    assert_eq!(record.doors.as_deref(), Some("5"));
    assert_eq!(record.general_inspection.as_deref(), Some("New"));
    assert_eq!(record.previous_owner.as_deref(), Some("2"));
    assert_eq!(record.engine_size.as_deref(), Some("1,968 cc"));
    assert_eq!(record.gears.as_deref(), Some("6"));
    assert_eq!(record.cylinders.as_deref(), Some("4"));
    assert_eq!(record.empty_weight.as_deref(), Some("1,555 kg"));
    assert_eq!(record.fuel_type.as_deref(), Some("Diesel"));
    assert_eq!(
        record.fuel_consumption.as_deref(),
        Some("4.4 l/100 km (comb.)")
    );
    assert_eq!(record.co2_emissions.as_deref(), Some("114 g/km (comb.)"));
    assert_eq!(record.emission_class.as_deref(), Some("Euro 6"));
    assert_eq!(
        record.equipment.comfort_convenience,
        vec!["Air conditioning", "Cruise control"]
    );
    assert_eq!(record.equipment.entertainment_media, vec!["Bluetooth"]);
    assert_eq!(record.equipment.safety_security, vec!["ABS", "ESP", "Isofix"]);
    assert_eq!(record.equipment.extras, vec!["Alloy wheels"]);
    assert_eq!(record.color.as_deref(), Some("Grey"));
    assert_eq!(record.paint.as_deref(), Some("Metallic"));
    assert_eq!(record.upholstery_colour.as_deref(), Some("Black"));
    assert_eq!(record.upholstery.as_deref(), Some("Cloth"));
    assert!(record.similar_cars.is_empty());
}

#[test]
fn test_extract_empty_page_keeps_shape() {
    let record = extract_page("<html><body><p>Listing removed</p></body></html>");
    assert_eq!(record.url, DETAIL_URL);
    assert_eq!(record.make.as_deref(), Some("audi"));
    assert!(record.price.is_none());
    assert!(!record.vat_deductable);
    assert!(record.images.is_empty());
    assert!(record.mileage.is_none());
    assert!(record.equipment.is_empty());
    assert!(record.upholstery.is_none());
}

#[test]
fn test_price_pattern_and_missing_vat() {
    let record = extract_page(
        "<html><body><span>€ on request</span><span>€ 7.990,-</span></body></html>",
    );
    assert_eq!(record.price.as_deref(), Some("7.990"));
    assert!(!record.vat_deductable);
}

#[test]
fn test_empty_sup_is_not_vat_marker() {
    let record = extract_page("<html><body><span>€ 4,200<sup> </sup></span></body></html>");
    assert_eq!(record.price.as_deref(), Some("4,200"));
    assert!(!record.vat_deductable);
}

#[test]
fn test_nested_sup_is_not_vat_marker() {
    let record = extract_page(
        "<html><body><span>€ 4,200<small><sup>1</sup></small></span></body></html>",
    );
    assert_eq!(record.price.as_deref(), Some("4,200"));
    assert!(!record.vat_deductable);
}

#[test]
fn test_fields_are_independent() {
    // A broken Gearbox block must not affect its neighbours.
    let html = r#"<html><body>
        <div><div>Mileage</div><div>80,000 km</div></div>
        <div><div>Gearbox</div></div>
        <div><div>Power</div><div>85 kW</div></div>
    </body></html>"#;
    let record = extract_page(html);
    assert_eq!(record.mileage.as_deref(), Some("80,000 km"));
    assert!(record.gearbox.is_none());
    assert_eq!(record.power.as_deref(), Some("85 kW"));
}

#[test]
fn test_upholstery_colour_does_not_shadow_upholstery() {
    let html = r#"<html><body><dl>
        <dt><span>Upholstery colour</span></dt><dd>Beige</dd>
    </dl></body></html>"#;
    let record = extract_page(html);
    assert_eq!(record.upholstery_colour.as_deref(), Some("Beige"));
    assert!(record.upholstery.is_none());
}

#[test]
fn test_fuel_type_falls_back_to_definition_list() {
    let html = r#"<html><body><dl>
        <dt><span>Fuel type</span></dt><dd>Petrol</dd>
    </dl></body></html>"#;
    assert_eq!(extract_page(html).fuel_type.as_deref(), Some("Petrol"));
}

#[test]
fn test_first_match_wins_for_single_fields() {
    let html = r#"<html><body>
        <div><div>Mileage</div><div>10 km</div></div>
        <div><div>Mileage</div><div>99 km</div></div>
    </body></html>"#;
    assert_eq!(extract_page(html).mileage.as_deref(), Some("10 km"));
}

#[test]
fn test_body_type_label_is_not_car_type() {
    let html = r#"<html><body><dl>
        <dt><span>Body type</span></dt><dd>Sedan</dd>
    </dl></body></html>"#;
    let record = extract_page(html);
    assert_eq!(record.body_type.as_deref(), Some("Sedan"));
    assert!(record.car_type.is_none());
}
