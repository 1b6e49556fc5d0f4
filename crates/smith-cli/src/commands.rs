pub mod compile;
pub mod task;
pub mod templates;
pub mod version;
