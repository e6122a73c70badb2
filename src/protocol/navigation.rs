//! Navigation tree returned by the `LOGIN` command.
//!
//! The navigation document is the controller's menu structure. It is used
//! for exactly one thing: looking up the id of a named page so it can be
//! fetched with `GET`.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;

use crate::error::Result;
use crate::protocol::root_local_name;

// ============================================================================
// NavRoot
// ============================================================================

/// Navigation structure of a LuxWS server.
///
/// # Format
///
/// ```xml
/// <Navigation id="1">
///   <item id="0x1"><name>Informationen</name>
///     <item id="0x2"><name>Temperaturen</name></item>
///   </item>
/// </Navigation>
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct NavRoot {
    /// Document id assigned by the controller.
    #[serde(rename = "@id", default)]
    pub id: String,

    /// Top-level menu entries.
    #[serde(rename = "item", default)]
    pub items: Vec<NavItem>,
}

impl NavRoot {
    /// Decodes a navigation document.
    ///
    /// Returns `Ok(None)` when the message is not a navigation document
    /// (the caller keeps waiting for its response).
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Xml`] if the document is malformed
    pub fn parse(xml: &str) -> Result<Option<Self>> {
        match root_local_name(xml).as_deref() {
            Some("navigation") => Ok(Some(quick_xml::de::from_str(xml)?)),
            _ => Ok(None),
        }
    }

    /// Finds the first item with the given name.
    ///
    /// Traversal is depth-first, pre-order; children are visited in
    /// document order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&NavItem> {
        find_in(&self.items, name)
    }
}

// ============================================================================
// NavItem
// ============================================================================

/// An individual entry in the navigation structure.
///
/// Ids are unique to each connection and must not be persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct NavItem {
    /// Page id used as the `GET` argument.
    #[serde(rename = "@id", default)]
    pub id: String,

    /// Display name in the controller's configured language.
    #[serde(default)]
    pub name: String,

    /// Nested menu entries.
    #[serde(rename = "item", default)]
    pub items: Vec<NavItem>,
}

fn find_in<'a>(items: &'a [NavItem], name: &str) -> Option<&'a NavItem> {
    for item in items {
        if item.name == name {
            return Some(item);
        }

        if let Some(found) = find_in(&item.items, name) {
            return Some(found);
        }
    }

    None
}

// ============================================================================
// Tests
// ============================================================================
