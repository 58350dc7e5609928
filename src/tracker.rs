//! Tracker Client
//!
//! Resolves which storage node should serve a request.
//!
//! Each lookup borrows one pooled connection, performs exactly one round trip
//! and releases the connection on every exit path. A connection whose
//! exchange did not finish cleanly is discarded rather than reused. Nothing is
//! retried.

use std::io::{Read, Write};
use std::sync::Arc;

use crate::error::Result;
use crate::network::ConnectionPool;
use crate::protocol::{decode_storage_endpoint, Exchange, Request, TrackerQuery};
use crate::types::{FileId, StorageEndpoint};

/// Issues lookups against the tracker cluster behind a pool
#[derive(Clone)]
pub struct TrackerClient {
    pool: Arc<ConnectionPool>,
}

impl TrackerClient {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Pick a node for a first-time upload with no group affinity
    pub fn query_store_without_group(&self) -> Result<StorageEndpoint> {
        self.query(TrackerQuery::StoreWithoutGroup)
    }

    /// Pick a node in `group`, used to colocate slave files with their master
    pub fn query_store_with_group(&self, group: &str) -> Result<StorageEndpoint> {
        self.query(TrackerQuery::StoreWithGroup { group })
    }

    /// Find the node that accepts updates (and deletes) for an object
    pub fn query_update(&self, file_id: &FileId) -> Result<StorageEndpoint> {
        self.query(TrackerQuery::Update {
            group: file_id.group(),
            filename: file_id.path(),
        })
    }

    /// Find a node that can serve reads of an object
    pub fn query_fetch(&self, file_id: &FileId) -> Result<StorageEndpoint> {
        self.query(TrackerQuery::Fetch {
            group: file_id.group(),
            filename: file_id.path(),
        })
    }

    /// One round trip on one pooled connection
    pub fn query(&self, query: TrackerQuery<'_>) -> Result<StorageEndpoint> {
        let request = query.encode()?;
        let mut conn = self.pool.get()?;

        let (result, clean) = {
            let mut exchange = Exchange::new(&mut conn);
            let result = round_trip(&mut exchange, &request);
            (result, exchange.is_clean())
        };

        if !clean {
            conn.discard();
        }

        let body = result.map_err(|e| {
            tracing::warn!(command = ?query.command(), "Tracker query failed: {}", e);
            e
        })?;
        let endpoint = decode_storage_endpoint(&body)?;

        tracing::debug!(
            command = ?query.command(),
            host = %endpoint.host,
            port = endpoint.port,
            group = %endpoint.group_name,
            store_path_index = endpoint.store_path_index,
            "Tracker resolved storage node"
        );
        Ok(endpoint)
    }
}

fn round_trip<S: Read + Write + ?Sized>(
    exchange: &mut Exchange<'_, S>,
    request: &Request,
) -> Result<Vec<u8>> {
    exchange.send(request)?;
    let header = exchange.recv_header()?;
    exchange.recv_body(&header)
}
