//! Revenue leak signal evaluation.
//!
//! Turns six business tables (orders, order lines, refunds, payments, support
//! tickets, discount events) into ten scored leak signals. Every signal compares
//! the latest 28 days against the 84 days before them:
//!
//! - The anchor is the latest order, refund or payment timestamp
//! - Each heuristic estimates a dollar loss, clamped at zero and rounded to cents
//! - Severity buckets the loss against window net revenue
//! - Confidence grows with the number of rows behind the estimate
//!
//! The engine is a pure function of its inputs. It reads no files, keeps no
//! state between calls, and fails only when a present monetary column holds a
//! non-numeric value.

pub mod aggregates;
pub mod engine;
pub mod error;
pub mod frames;
pub mod heuristics;
pub mod report;
pub mod scoring;
pub mod signals;
pub mod table;
pub mod thresholds;
pub mod window;

pub use engine::{evaluate, evaluate_at, LeakInputs};
pub use error::{EngineError, EngineResult};
pub use report::{Report, Summary};
pub use scoring::{confidence, severity, Severity};
pub use signals::{LeakSignal, SignalId};
pub use table::{Cell, Table};
pub use window::{EvaluationWindow, WindowBounds};
