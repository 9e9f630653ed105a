pub mod logging;
pub mod prompt;
