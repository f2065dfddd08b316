//! The per-group review loop.
//!
//! ```text
//!            new()
//!              │
//!              ▼
//!   ┌──► AtGroup(i) ──toggle──┐
//!   │      │   │   ▲          │
//!   │      │   │   └──────────┘
//!   │      │   └─confirm (failed)─┐
//!   │      │   ▲                  │
//!   │      │   └──────────────────┘
//!   │  confirm (sent) / skip
//!   │      │
//!   │      ▼
//!   └─ i + 1 < N ? ──no──► Done
//! ```
//!
//! With no groups at all the workflow starts in `Done`.

mod state;
mod workflow;

pub use state::{Included, MessageTemplate, ReviewState, Target};
pub use workflow::{ConfirmOutcome, Phase, ReviewWorkflow, RunSummary};
