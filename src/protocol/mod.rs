//! LuxWS response document types.
//!
//! The controller answers commands with XML documents. Two document kinds
//! matter to this crate:
//!
//! | Document | Command | Root element |
//! |----------|---------|--------------|
//! | [`NavRoot`] | `LOGIN` | `Navigation` |
//! | [`ContentRoot`] | `GET` | `Content` |
//!
//! Both trees are parsed once per response and immutable thereafter.
//! Messages whose root element does not match the expected document kind
//! are protocol noise and reported as "not my response" rather than as
//! errors.

// ============================================================================
// Imports
// ============================================================================

use quick_xml::events::Event;
use quick_xml::Reader;

// ============================================================================
// Submodules
// ============================================================================

/// Content tree returned by `GET`.
pub mod content;

/// Navigation tree returned by `LOGIN`.
pub mod navigation;

// ============================================================================
// Re-exports
// ============================================================================

pub use content::{by_name, by_name_with_children, ContentItem, ContentRoot};
pub use navigation::{NavItem, NavRoot};

// ============================================================================
// Helpers
// ============================================================================

/// Returns the local name of a document's root element, lowercased.
///
/// Returns `None` for documents without a root element or with malformed
/// leading markup.
pub(crate) fn root_local_name(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event().ok()? {
            Event::Start(e) | Event::Empty(e) => {
                let name = e.local_name();
                return Some(String::from_utf8_lossy(name.as_ref()).to_lowercase());
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
