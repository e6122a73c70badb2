//! Content tree returned by the `GET` command.
//!
//! A content page is a tree of named rows. Leaf rows carry an optional
//! value with unit and bounds; group rows hold nested rows. Firmware
//! versions differ in where some groups live, and the same name can appear
//! both as a leaf and as a group elsewhere in the tree. Lookups therefore
//! take a caller-supplied predicate instead of a bare name.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;

use crate::error::Result;
use crate::protocol::root_local_name;

// ============================================================================
// ContentRoot
// ============================================================================

/// All items returned by a `GET` request.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentRoot {
    /// Top-level rows.
    #[serde(rename = "item", default)]
    pub items: Vec<ContentItem>,
}

impl ContentRoot {
    /// Decodes a content document.
    ///
    /// Returns `Ok(None)` when the message is not a content document
    /// (the caller keeps waiting for its response).
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Xml`] if the document is malformed
    pub fn parse(xml: &str) -> Result<Option<Self>> {
        match root_local_name(xml).as_deref() {
            Some("content") => Ok(Some(quick_xml::de::from_str(xml)?)),
            _ => Ok(None),
        }
    }

    /// Finds the first item matching the predicate.
    ///
    /// Traversal is depth-first, pre-order; children are visited in
    /// document order.
    pub fn find<P>(&self, predicate: P) -> Option<&ContentItem>
    where
        P: Fn(&ContentItem) -> bool,
    {
        find_in(&self.items, &predicate)
    }
}

// ============================================================================
// ContentItem
// ============================================================================

/// An individual row on a content page.
///
/// Every field except `id` and `name` may be absent; an absent `value`
/// means the controller reported a placeholder row.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    /// Row id.
    #[serde(rename = "@id", default)]
    pub id: String,

    /// Display name in the controller's configured language.
    #[serde(default)]
    pub name: String,

    /// Reported value, formatted per locale.
    pub value: Option<String>,

    /// Unit label.
    pub unit: Option<String>,

    /// Lower bound for writable rows.
    pub min: Option<String>,

    /// Upper bound for writable rows.
    pub max: Option<String>,

    /// Step size for writable rows.
    pub step: Option<String>,

    /// Scaling divisor.
    pub div: Option<String>,

    /// Raw (unscaled) value.
    pub raw: Option<String>,

    /// Nested rows.
    #[serde(rename = "item", default)]
    pub items: Vec<ContentItem>,
}

impl ContentItem {
    /// Invokes the callback for each direct child with a present value.
    ///
    /// Children the controller reports as placeholders (absent value) are
    /// skipped.
    pub fn each_non_nil<F>(&self, mut callback: F)
    where
        F: FnMut(&ContentItem),
    {
        for item in &self.items {
            if item.value.is_some() {
                callback(item);
            }
        }
    }
}

fn find_in<'a, P>(items: &'a [ContentItem], predicate: &P) -> Option<&'a ContentItem>
where
    P: Fn(&ContentItem) -> bool,
{
    for item in items {
        if predicate(item) {
            return Some(item);
        }

        if let Some(found) = find_in(&item.items, predicate) {
            return Some(found);
        }
    }

    None
}

// ============================================================================
// Predicates
// ============================================================================

/// Matches an item by exact name.
pub fn by_name(name: &str) -> impl Fn(&ContentItem) -> bool + '_ {
    move |item: &ContentItem| item.name == name
}

/// Matches an item by exact name, requiring at least one child.
///
/// Used where a group name collides with an empty decoy node of the same
/// name elsewhere in the tree.
pub fn by_name_with_children(name: &str) -> impl Fn(&ContentItem) -> bool + '_ {
    move |item: &ContentItem| item.name == name && !item.items.is_empty()
}

// ============================================================================
// Tests
// ============================================================================
