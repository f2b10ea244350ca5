pub mod error;
pub mod extract;
pub mod format;
pub mod pipeline;
pub mod regenerate;
pub mod repos;
