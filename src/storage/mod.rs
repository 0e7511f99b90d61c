//! Order log backends

pub mod in_memory;
pub mod relay;
pub mod text_file;

pub use in_memory::InMemoryOrderLog;
pub use relay::{HttpLogSource, RelayOrderLog};
pub use text_file::TextFileOrderLog;
