//! Low-level entity metadata lookup
//!
//! Entity version and timestamps are only exposed by the protocol-level
//! `Lookup` call. [`LookupClient`] is that call; any transport (gRPC, REST,
//! an emulator, a test double) implements it.

use tracing::debug;

use crate::error::{Error, Result};
use crate::key::Key;
use crate::value::EntityMetadata;
use crate::wire;

/// Upper bound on lookups issued for one key while the store defers it.
pub const MAX_DEFERRED_ATTEMPTS: usize = 5;

/// Protocol-level lookup.
///
/// Thread safety: implementations are shared across callers (requires
/// Send + Sync).
pub trait LookupClient: Send + Sync {
    /// Issue one lookup request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] (or any other variant) when the call fails.
    fn lookup(&self, request: wire::LookupRequest) -> Result<wire::LookupResponse>;
}

impl<C: LookupClient + ?Sized> LookupClient for &C {
    fn lookup(&self, request: wire::LookupRequest) -> Result<wire::LookupResponse> {
        (**self).lookup(request)
    }
}

/// Fetches [`EntityMetadata`] for single keys.
pub struct MetadataLookup<C> {
    client: C,
    project_id: String,
    database_id: String,
}

impl<C: LookupClient> MetadataLookup<C> {
    pub fn new(client: C, project_id: impl Into<String>) -> Self {
        MetadataLookup {
            client,
            project_id: project_id.into(),
            database_id: String::new(),
        }
    }

    /// Target a named database instead of the default one.
    pub fn with_database(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = database_id.into();
        self
    }

    /// Look up `key` and return its version and timestamps.
    ///
    /// The request is re-issued while the store defers the key, up to
    /// [`MAX_DEFERRED_ATTEMPTS`] lookups in total.
    ///
    /// # Errors
    ///
    /// - [`Error::EntityNotFound`] when the key has no entity
    /// - [`Error::LookupDeferred`] when the store keeps deferring
    /// - whatever the client returns
    pub fn get_metadata(&self, key: &Key) -> Result<EntityMetadata> {
        let request = wire::LookupRequest {
            project_id: self.project_id.clone(),
            database_id: self.database_id.clone(),
            keys: vec![key.to_wire()],
        };

        for attempt in 1..=MAX_DEFERRED_ATTEMPTS {
            let response = self.client.lookup(request.clone())?;

            if !response.deferred.is_empty() {
                debug!(key = %key, attempt, "lookup deferred, retrying");
                continue;
            }

            return match response.found.first() {
                Some(found) => EntityMetadata::from_entity_result(found),
                None => Err(Error::EntityNotFound(key.to_literal())),
            };
        }

        Err(Error::LookupDeferred {
            key: key.to_literal(),
            attempts: MAX_DEFERRED_ATTEMPTS,
        })
    }
}
