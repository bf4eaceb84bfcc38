//! Folder removal for cachesweep.
//!
//! Removing a folder is a single recursive filesystem call. This crate wraps
//! it so that each path reports its own success or failure, and a batch of
//! removals can run in the background while reporting progress over a
//! channel. Failures are independent: one path failing never stops the rest.

mod error;
mod removal;

pub use error::OperationError;
pub use removal::{
    RemovalEvent, RemovalOptions, RemovalOutcome, RemovalProgress, RemovalSummary,
    remove_folder, remove_folder_with, remove_folders, start_removal,
};

/// Default channel buffer size for removal progress updates.
pub const OPERATION_CHANNEL_SIZE: usize = 100;
