pub mod assembler;
pub mod compiler;
pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod session;
pub mod tasks;
