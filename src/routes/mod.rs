pub mod batches;
pub mod queue;
