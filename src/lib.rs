//! Paged entry editing for game-data editors.
//! Holds categories of keyed text entries, shows them one fixed-size page at a
//! time, and runs single inline edits, undo/redo and search against them.
//! Catalogs load from and save to JSON5 files, optionally gzipped, with
//! byte-identical output when nothing changed.

mod catalog;
mod config;
mod controller;
mod error;
mod history;
mod key;
mod record;
mod search;
mod session;
pub mod statics;
mod store;
mod window;

pub use catalog::{Catalog, CatalogFormat, LineEnding};
pub use config::EditorConfig;
pub use controller::SelectionController;
pub use error::EntryError;
pub use history::{EditHistory, EntryChange};
pub use key::{EntryKey, GoalKey, GoalType};
pub use record::EntryRecord;
pub use search::SearchState;
pub use session::{EditField, EditSession, OpenEdit};
pub use store::{CategoryStore, StoreKind};
pub use window::RangeWindow;
