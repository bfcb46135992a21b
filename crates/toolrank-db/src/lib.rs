//! Toolrank Storage Layer
//!
//! Historical signal and score tables persisted between refresh runs, plus
//! flat-file exports of rank views.
//!
//! # Example
//!
//! ```rust,no_run
//! use toolrank_db::{CsvHistoryStore, HistoryStore};
//!
//! let store = CsvHistoryStore::new("./data");
//! let history = store.load("history_trends_US");
//! println!("{} months on record", history.month_count());
//! ```

pub mod codec;
pub mod error;
pub mod export;
pub mod store;

pub use codec::{read_table, write_table, CellValue};
pub use error::{DbError, Result};
pub use export::{
    current_rank_file_name, export_rows, export_table, rank_history_file_name, rank_points_file_name,
    write_rows,
};
pub use store::{CsvHistoryStore, HistoryStore, MemoryHistoryStore};
