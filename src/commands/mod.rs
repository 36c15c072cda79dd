pub mod areas;
pub mod check;
pub mod page;
pub mod suggest;

// Re-export command functions for convenience
pub use areas::areas;
pub use check::{check, CheckParams};
pub use page::validate_page;
pub use suggest::suggest;
