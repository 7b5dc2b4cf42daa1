//! Application state for the payroll batch API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::execution::SimulatedProvider;
use crate::service::BatchService;

/// Shared application state.
///
/// Wraps the batch service behind an async `RwLock` so read-only handlers
/// (state snapshots) run concurrently while mutations are serialized.
#[derive(Clone)]
pub struct AppState {
    service: Arc<RwLock<BatchService<SimulatedProvider>>>,
}

impl AppState {
    /// Creates a new application state owning the given service.
    pub fn new(service: BatchService<SimulatedProvider>) -> Self {
        Self {
            service: Arc::new(RwLock::new(service)),
        }
    }

    /// Acquires a read guard on the service.
    pub async fn read(&self) -> RwLockReadGuard<'_, BatchService<SimulatedProvider>> {
        self.service.read().await
    }

    /// Acquires a write guard on the service.
    pub async fn write(&self) -> RwLockWriteGuard<'_, BatchService<SimulatedProvider>> {
        self.service.write().await
    }
}
