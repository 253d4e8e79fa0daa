//! Walks from a label element to its value.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use super::rules::ValueLocator;
use crate::utils::{collapse_whitespace, non_empty_text_nodes, own_text};

static ADDRESS_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| crate::utils::parse_selector_unsafe("a div", "ADDRESS_SELECTOR"));

fn is_tag(element: &ElementRef<'_>, tag: &str) -> bool {
    element.value().name() == tag
}

fn following_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.next_siblings().filter_map(ElementRef::wrap)
}

fn following_divs<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    following_elements(element).filter(|e| is_tag(e, "div"))
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// The `dd` paired with a `<dt><span>label</span></dt>` style label.
fn definition_dd(label: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let parent = label.parent().and_then(ElementRef::wrap)?;
    following_elements(parent).find(|e| is_tag(e, "dd"))
}

fn contact_address(label: ElementRef<'_>) -> Option<String> {
    let block = label
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| is_tag(e, "div"))?;
    let previous = block
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| is_tag(e, "div"))?;
    let last_child = previous
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| is_tag(e, "div"))
        .last()?;
    let address = last_child.select(&ADDRESS_SELECTOR).next()?;
    non_empty(collapse_whitespace(&address.text().collect::<String>()))
}

/// Single text value reachable from `label`, if any.
pub fn text_value(label: ElementRef<'_>, locator: ValueLocator) -> Option<String> {
    match locator {
        ValueLocator::FollowingSiblingText => following_divs(label)
            .map(own_text)
            .find(|t| !t.is_empty()),
        ValueLocator::DefinitionValue => {
            let dd = definition_dd(label)?;
            non_empty(collapse_whitespace(&dd.text().collect::<String>()))
        }
        ValueLocator::DefinitionItems => {
            non_empty(non_empty_text_nodes(definition_dd(label)?).join(", "))
        }
        ValueLocator::SiblingLinkText => following_divs(label)
            .flat_map(|div| {
                div.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| is_tag(e, "a"))
                    .collect::<Vec<_>>()
            })
            .map(own_text)
            .find(|t| !t.is_empty()),
        ValueLocator::SiblingLastText => following_divs(label)
            .flat_map(non_empty_text_nodes)
            .last(),
        ValueLocator::ContactAddress => contact_address(label),
        ValueLocator::OwnText => non_empty(own_text(label)),
        ValueLocator::AttributeList { .. } => None,
    }
}

/// List value reachable from `label`. Single-valued locators yield at most one item.
pub fn list_value(label: ElementRef<'_>, locator: ValueLocator) -> Vec<String> {
    match locator {
        ValueLocator::DefinitionItems => definition_dd(label)
            .map(non_empty_text_nodes)
            .unwrap_or_default(),
        other => text_value(label, other).into_iter().collect(),
    }
}

/// Attribute values of every element matching `selector`, in document order.
pub fn attribute_list(document: &Html, selector: &Selector, attr: &str) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|e| e.value().attr(attr))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
