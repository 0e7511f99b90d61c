//! The order log: its text format and its read-side projection

pub mod format;
pub mod reader;

pub use format::{LoggedOrder, NO_NOTES, append_block, format_block, parse_log};
pub use reader::{FeedState, OrderFeed, OrderLogReader, ReaderHandle};
