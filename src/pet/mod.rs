//! The pet state engine: record types, the time-advance / action / random-event steps,
//! and the error type shared by the rest of the crate.

pub mod engine;
pub mod errors;
pub mod types;

pub use engine::{advance, apply_action, maybe_trigger_event, AdvanceReport, EventSource, PetEvent};
pub use errors::{PetError, PetResult};
pub use types::{Action, ActionRequest, PetRecord, Stage};
