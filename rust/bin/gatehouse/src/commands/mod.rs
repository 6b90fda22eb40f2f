pub mod context;
pub mod details;
