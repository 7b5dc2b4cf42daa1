//! Batch execution: payment provider port and the concurrent run engine.

pub mod engine;
pub mod provider;

pub use engine::{
    DEFAULT_CONCURRENCY, DEFAULT_WORKER_TIMEOUT, ExecutionEngine, ExecutionEvent,
    WorkerExecutionStatus,
};
pub use provider::{PaymentProvider, ProviderError, SimulatedProvider};
