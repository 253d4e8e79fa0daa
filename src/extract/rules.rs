//! The detail-page rule table.
//!
//! Each record field is described by an ordered list of locators. A locator
//! names the label element (tag plus text matcher) and how to walk from that
//! label to the value. Adding or repairing a field is an edit to
//! [`FIELD_RULES`], not to the extraction routine.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::CarRecord;

/// How a label element's own text is compared with the label string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMatch {
    Contains(&'static str),
    /// Whole own text (collapsed) equals the label.
    Exact(&'static str),
}

impl LabelMatch {
    pub fn matches(&self, own_text: &str) -> bool {
        match self {
            LabelMatch::Contains(needle) => own_text.contains(needle),
            LabelMatch::Exact(label) => own_text == *label,
        }
    }
}

/// How to get from a label element to the field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueLocator {
    /// First following sibling `div` with non-empty own text.
    FollowingSiblingText,
    /// Label's parent, then its first following sibling `dd`; whole text collapsed.
    DefinitionValue,
    /// Same anchor as `DefinitionValue`, every non-empty text node of the `dd`.
    DefinitionItems,
    /// Following sibling `div`, then its direct child `a` text.
    SiblingLinkText,
    /// Last non-empty text node inside the following sibling `div`s.
    SiblingLastText,
    /// Nearest `div` ancestor, its preceding sibling `div`, that one's last child
    /// `div`, then the text of the first `a div` inside it.
    ContactAddress,
    /// The label element's own text.
    OwnText,
    /// Attribute values of every element matching a selector (label unused).
    AttributeList {
        selector: &'static str,
        attr: &'static str,
    },
}

/// One attempt at locating a field.
#[derive(Debug, Clone, Copy)]
pub struct Locator {
    pub tag: &'static str,
    pub label: LabelMatch,
    pub value: ValueLocator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    Single,
    Many,
}

/// Post-processing applied to a located text value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFilter {
    /// First run of digits with `.`/`,` group separators, e.g. `12,500`.
    Numeric,
}

static NUMERIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:[.,]\d+)*").unwrap_or_else(|e| {
        panic!("NUMERIC_PATTERN must compile: {}", e);
    })
});

impl ValueFilter {
    pub fn apply(&self, value: &str) -> Option<String> {
        match self {
            ValueFilter::Numeric => NUMERIC_PATTERN
                .find(value)
                .map(|m| m.as_str().to_string()),
        }
    }
}

/// Record fields filled from the page. `url`, `make`, `model`,
/// `vat_deductable` and `similar_cars` are set elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Price,
    Images,
    Mileage,
    Gearbox,
    FirstRegistration,
    FuelType,
    Power,
    Seller,
    SellerAddress,
    SellerContact,
    BodyType,
    CarType,
    DriveTrain,
    Seats,
    Doors,
    GeneralInspection,
    PreviousOwner,
    EngineSize,
    Gears,
    Cylinders,
    EmptyWeight,
    FuelConsumption,
    Co2Emissions,
    EmissionClass,
    ComfortConvenience,
    EntertainmentMedia,
    SafetySecurity,
    Extras,
    Color,
    Paint,
    UpholsteryColour,
    Upholstery,
    Contact,
}

impl Field {
    pub fn set_text(self, record: &mut CarRecord, value: String) {
        let slot = match self {
            Field::Price => &mut record.price,
            Field::Mileage => &mut record.mileage,
            Field::Gearbox => &mut record.gearbox,
            Field::FirstRegistration => &mut record.first_registration,
            Field::FuelType => &mut record.fuel_type,
            Field::Power => &mut record.power,
            Field::Seller => &mut record.seller,
            Field::SellerAddress => &mut record.seller_address,
            Field::SellerContact => &mut record.seller_contact,
            Field::BodyType => &mut record.body_type,
            Field::CarType => &mut record.car_type,
            Field::DriveTrain => &mut record.drive_train,
            Field::Seats => &mut record.seats,
            Field::Doors => &mut record.doors,
            Field::GeneralInspection => &mut record.general_inspection,
            Field::PreviousOwner => &mut record.previous_owner,
            Field::EngineSize => &mut record.engine_size,
            Field::Gears => &mut record.gears,
            Field::Cylinders => &mut record.cylinders,
            Field::EmptyWeight => &mut record.empty_weight,
            Field::FuelConsumption => &mut record.fuel_consumption,
            Field::Co2Emissions => &mut record.co2_emissions,
            Field::EmissionClass => &mut record.emission_class,
            Field::Color => &mut record.color,
            Field::Paint => &mut record.paint,
            Field::UpholsteryColour => &mut record.upholstery_colour,
            Field::Upholstery => &mut record.upholstery,
            Field::Contact => &mut record.contact,
            Field::Images
            | Field::ComfortConvenience
            | Field::EntertainmentMedia
            | Field::SafetySecurity
            | Field::Extras => {
                log::error!("Field {:?} is multi-valued; text value ignored", self);
                return;
            }
        };
        *slot = Some(value);
    }

    pub fn set_list(self, record: &mut CarRecord, values: Vec<String>) {
        match self {
            Field::Images => record.images = values,
            Field::ComfortConvenience => record.equipment.comfort_convenience = values,
            Field::EntertainmentMedia => record.equipment.entertainment_media = values,
            Field::SafetySecurity => record.equipment.safety_security = values,
            Field::Extras => record.equipment.extras = values,
            _ => log::error!("Field {:?} is single-valued; list value ignored", self),
        }
    }
}

/// Declarative description of one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub locators: &'static [Locator],
    pub multiplicity: Multiplicity,
    pub filter: Option<ValueFilter>,
}

// Locator shorthands for the table below.
macro_rules! sibling_text {
    ($label:expr) => {
        Locator {
            tag: "div",
            label: LabelMatch::Contains($label),
            value: ValueLocator::FollowingSiblingText,
        }
    };
}

macro_rules! definition {
    (exact $label:expr) => {
        Locator {
            tag: "span",
            label: LabelMatch::Exact($label),
            value: ValueLocator::DefinitionValue,
        }
    };
    ($label:expr) => {
        Locator {
            tag: "span",
            label: LabelMatch::Contains($label),
            value: ValueLocator::DefinitionValue,
        }
    };
}

macro_rules! definition_items {
    ($label:expr) => {
        Locator {
            tag: "span",
            label: LabelMatch::Contains($label),
            value: ValueLocator::DefinitionItems,
        }
    };
}

macro_rules! contact {
    ($value:expr) => {
        Locator {
            tag: "span",
            label: LabelMatch::Contains("Contact"),
            value: $value,
        }
    };
}

const fn single(field: Field, locators: &'static [Locator]) -> FieldRule {
    FieldRule {
        field,
        locators,
        multiplicity: Multiplicity::Single,
        filter: None,
    }
}

const fn many(field: Field, locators: &'static [Locator]) -> FieldRule {
    FieldRule {
        field,
        locators,
        multiplicity: Multiplicity::Many,
        filter: None,
    }
}

/// Detail-page rules, in record field order.
pub static FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::Price,
        locators: &[Locator {
            tag: "span",
            label: LabelMatch::Contains("€"),
            value: ValueLocator::OwnText,
        }],
        multiplicity: Multiplicity::Single,
        filter: Some(ValueFilter::Numeric),
    },
    many(
        Field::Images,
        &[Locator {
            tag: "img",
            label: LabelMatch::Contains(""),
            value: ValueLocator::AttributeList {
                selector: "img[src]",
                attr: "src",
            },
        }],
    ),
    single(Field::Mileage, &[sibling_text!("Mileage")]),
    single(Field::Gearbox, &[sibling_text!("Gearbox")]),
    single(Field::FirstRegistration, &[sibling_text!("First registration")]),
    single(
        Field::FuelType,
        &[sibling_text!("Fuel type"), definition!("Fuel type")],
    ),
    single(Field::Power, &[sibling_text!("Power")]),
    single(Field::Seller, &[sibling_text!("Seller")]),
    single(
        Field::SellerAddress,
        &[contact!(ValueLocator::ContactAddress)],
    ),
    single(
        Field::SellerContact,
        &[contact!(ValueLocator::SiblingLinkText)],
    ),
    single(Field::BodyType, &[definition!("Body type")]),
    single(Field::CarType, &[definition!(exact "Type")]),
    single(Field::DriveTrain, &[definition!("Drivetrain")]),
    single(Field::Seats, &[definition!("Seats")]),
    single(Field::Doors, &[definition!("Doors")]),
    single(
        Field::GeneralInspection,
        &[definition!("General inspection")],
    ),
    single(Field::PreviousOwner, &[definition!("Previous owner")]),
    single(Field::EngineSize, &[definition!("Engine size")]),
    single(Field::Gears, &[definition!("Gears")]),
    single(Field::Cylinders, &[definition!("Cylinders")]),
    single(Field::EmptyWeight, &[definition!("Empty weight")]),
    single(
        Field::FuelConsumption,
        &[definition!("Fuel consumption")],
    ),
    single(Field::Co2Emissions, &[definition!("CO₂-emissions")]),
    single(Field::EmissionClass, &[definition!("Emission class")]),
    many(
        Field::ComfortConvenience,
        &[definition_items!("Comfort & Convenience")],
    ),
    many(
        Field::EntertainmentMedia,
        &[definition_items!("Entertainment & Media")],
    ),
    many(Field::SafetySecurity, &[definition_items!("Safety & Security")]),
    many(Field::Extras, &[definition_items!("Extras")]),
    single(Field::Color, &[definition!("Colour")]),
    single(Field::Paint, &[definition!("Paint")]),
    single(
        Field::UpholsteryColour,
        &[definition!("Upholstery colour")],
    ),
    single(
        Field::Upholstery,
        &[definition!(exact "Upholstery")],
    ),
    single(Field::Contact, &[contact!(ValueLocator::SiblingLastText)]),
];
