//! Detail-page field extraction.
//!
//! [`extract`] runs every rule of [`rules::FIELD_RULES`] against a parsed detail
//! page. Fields are independent: a missing or malformed label only leaves its own
//! field empty.

mod locate;
pub mod rules;

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::models::{CarRecord, ListingQuery};
use crate::utils::{own_text, parse_selector_with_fallback};
use rules::{FieldRule, Locator, Multiplicity, ValueFilter, ValueLocator, FIELD_RULES};

static DIV_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| crate::utils::parse_selector_unsafe("div", "DIV_SELECTOR"));
static SPAN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| crate::utils::parse_selector_unsafe("span", "SPAN_SELECTOR"));

/// Listing context carried from the listing page to its detail pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractContext {
    pub make: String,
    pub model: String,
}

impl From<&ListingQuery> for ExtractContext {
    fn from(query: &ListingQuery) -> Self {
        Self {
            make: query.make.clone(),
            model: query.model.clone(),
        }
    }
}

/// Maps a detail page to a record.
///
/// Never fails: unmatched fields are `None` or empty lists and the record keeps
/// its full shape.
pub fn extract(document: &Html, url: &str, context: &ExtractContext) -> CarRecord {
    let mut record = CarRecord::new(
        url,
        Some(context.make.clone()),
        Some(context.model.clone()),
    );

    for rule in FIELD_RULES {
        apply_rule(document, rule, &mut record);
    }
    record.vat_deductable = has_vat_marker(document);

    record
}

fn apply_rule(document: &Html, rule: &FieldRule, record: &mut CarRecord) {
    match rule.multiplicity {
        Multiplicity::Single => {
            if let Some(value) = locate_single(document, rule) {
                rule.field.set_text(record, value);
            }
        }
        Multiplicity::Many => {
            let values = locate_many(document, rule);
            if !values.is_empty() {
                rule.field.set_list(record, values);
            }
        }
    }
}

fn tag_selector(tag: &str) -> Option<&'static Selector> {
    match tag {
        "div" => Some(&*DIV_SELECTOR),
        "span" => Some(&*SPAN_SELECTOR),
        _ => None,
    }
}

/// Label candidates for a locator, in document order.
fn labels<'a>(document: &'a Html, locator: &Locator) -> Vec<ElementRef<'a>> {
    let owned;
    let selector = match tag_selector(locator.tag) {
        Some(s) => s,
        None => {
            owned = parse_selector_with_fallback(locator.tag, "label tag");
            &owned
        }
    };
    document
        .select(selector)
        .filter(|e| locator.label.matches(&own_text(*e)))
        .collect()
}

fn locate_single(document: &Html, rule: &FieldRule) -> Option<String> {
    rule.locators.iter().find_map(|locator| {
        labels(document, locator).into_iter().find_map(|label| {
            let value = locate::text_value(label, locator.value)?;
            match rule.filter {
                Some(filter) => filter.apply(&value),
                None => Some(value),
            }
        })
    })
}

fn locate_many(document: &Html, rule: &FieldRule) -> Vec<String> {
    for locator in rule.locators {
        let values = match locator.value {
            ValueLocator::AttributeList { selector, attr } => {
                let selector = parse_selector_with_fallback(selector, "attribute list");
                locate::attribute_list(document, &selector, attr)
            }
            value => labels(document, locator)
                .into_iter()
                .map(|label| locate::list_value(label, value))
                .find(|v| !v.is_empty())
                .unwrap_or_default(),
        };
        if !values.is_empty() {
            return values;
        }
    }
    Vec::new()
}

/// True when the price span has a non-empty `sup` child (VAT deductible).
fn has_vat_marker(document: &Html) -> bool {
    document
        .select(&SPAN_SELECTOR)
        .find(|span| {
            let text = own_text(*span);
            text.contains('€') && ValueFilter::Numeric.apply(&text).is_some()
        })
        .map(|span| {
            span.children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "sup")
                .any(|sup| {
                    let marker: String = sup.text().collect();
                    !marker.trim().is_empty()
                })
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests;
