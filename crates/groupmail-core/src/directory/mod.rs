//! The organizational directory: groups of departments and their recipients.
//!
//! The directory is built once from two row streams (departments, then
//! recipients) and never changes afterwards. Everything downstream borrows
//! it immutably.
//!
//! ```text
//! Group ──┬── Department ──┬── Recipient
//!         │                └── Recipient
//!         └── Department ───── Recipient
//! ```

mod builder;
mod model;
mod roster;

pub use builder::{CC_TOKEN, DepartmentRow, DirectoryBuilder, RecipientRow};
pub use model::{Department, Directory, DirectoryCounts, Group, Recipient};
pub use roster::Roster;
