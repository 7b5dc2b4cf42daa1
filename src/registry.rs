//! In-memory worker registry.
//!
//! A pure store of worker pay records and leave records. No business logic
//! lives here; validation and execution read from it, admin edits write to
//! it. Workers are never deleted mid-cycle, only excluded via snoozing.

use std::collections::HashMap;

use crate::models::{LeaveRecord, Worker};

/// The in-memory collection of workers and their leave records for a batch.
#[derive(Debug, Clone, Default)]
pub struct WorkerRegistry {
    workers: Vec<Worker>,
    leave: HashMap<String, LeaveRecord>,
}

impl WorkerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry from workers and leave records.
    pub fn from_parts(workers: Vec<Worker>, leave: Vec<LeaveRecord>) -> Self {
        Self {
            workers,
            leave: leave.into_iter().map(|l| (l.worker_id.clone(), l)).collect(),
        }
    }

    /// Inserts a worker, replacing any existing record with the same id.
    pub fn upsert_worker(&mut self, worker: Worker) {
        match self.workers.iter_mut().find(|w| w.id == worker.id) {
            Some(existing) => *existing = worker,
            None => self.workers.push(worker),
        }
    }

    /// Returns the worker with the given id, if present.
    pub fn worker(&self, id: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    /// Returns all workers in insertion order.
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Records leave for a worker, replacing any existing record.
    pub fn record_leave(&mut self, record: LeaveRecord) {
        self.leave.insert(record.worker_id.clone(), record);
    }

    /// Returns the leave record for a worker, if any.
    pub fn leave_for(&self, worker_id: &str) -> Option<&LeaveRecord> {
        self.leave.get(worker_id)
    }

    /// Returns all leave records keyed by worker id.
    pub fn leave_records(&self) -> &HashMap<String, LeaveRecord> {
        &self.leave
    }

    /// Returns the number of workers in the registry.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Returns true if the registry holds no workers.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
