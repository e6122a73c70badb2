//! High-level LuxWS client.
//!
//! Wraps a [`Transport`] and speaks the command vocabulary of the
//! controller: `LOGIN` to authenticate and obtain the navigation tree,
//! `GET` to fetch a content page by id.
//!
//! Response decoding happens inside the round-trip handler, so messages
//! that are not the expected document kind are ignored rather than treated
//! as errors.

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;
use crate::protocol::{ContentRoot, NavRoot};
use crate::transport::Transport;

// ============================================================================
// Client
// ============================================================================

/// A client for a LuxWS server.
///
/// Ids returned by the server are unique to each connection.
pub struct Client {
    transport: Transport,
}

impl Client {
    /// Connects to a LuxWS server.
    ///
    /// The address must have the format `host:port`.
    ///
    /// # Errors
    ///
    /// See [`Transport::dial`].
    pub async fn dial(address: &str) -> Result<Self> {
        let transport = Transport::dial(address).await?;
        Ok(Self::new(transport))
    }

    /// Creates a client over an established transport.
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Sends a `LOGIN` command and returns the navigation structure.
    ///
    /// # Errors
    ///
    /// - transport errors, see [`Transport::round_trip`]
    /// - [`crate::Error::Xml`] if the navigation document is malformed
    pub async fn login(&self, password: &str) -> Result<NavRoot> {
        let request = format!("LOGIN;{password}");
        self.transport
            .round_trip(&request, |payload| NavRoot::parse(payload))
            .await
    }

    /// Sends a `GET` command and returns the page content.
    ///
    /// # Errors
    ///
    /// - transport errors, see [`Transport::round_trip`]
    /// - [`crate::Error::Xml`] if the content document is malformed
    pub async fn get(&self, id: &str) -> Result<ContentRoot> {
        let request = format!("GET;{id}");
        self.transport
            .round_trip(&request, |payload| ContentRoot::parse(payload))
            .await
    }

    /// Closes the underlying connection.
    ///
    /// # Errors
    ///
    /// See [`Transport::close`].
    pub async fn close(&self) -> Result<()> {
        self.transport.close().await
    }
}

// ============================================================================
// Tests
// ============================================================================
