//! Core systems for Horizon Arbor.
//!
//! This crate provides the infrastructure shared by the Horizon Arbor tree
//! view engine:
//!
//! - **Signal/Slot System**: Type-safe change notifications
//! - **Errors**: The error taxonomy of the engine
//! - **Logging**: `tracing` targets and flattened-tree debug output
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_arbor_core::Signal;
//!
//! let rows_inserted = Signal::<(usize, usize)>::new();
//!
//! let conn_id = rows_inserted.connect(|(first, last)| {
//!     println!("rows {first}..={last} inserted");
//! });
//!
//! rows_inserted.emit((1, 100));
//! rows_inserted.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod signal;

pub use error::{ArborError, Result, provider_contract_violation};
pub use logging::{DebugRow, FlatTreeDebug, PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
