mod types;

pub use types::GuardConfig;
