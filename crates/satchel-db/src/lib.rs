//! Satchel DB Library
//!
//! Persistence for stored-object metadata: the `files` table repository
//! and the `MetadataStore` trait the orchestrator consumes. A metadata
//! record only ever exists for bytes that were durably written to some
//! backend; the orchestrator enforces that ordering, this crate just
//! persists faithfully.

pub mod files;

pub use files::{FileRepository, MetadataStore};
