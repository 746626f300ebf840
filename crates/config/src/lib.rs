pub mod boards;
pub mod env;
pub mod tracing_init;

pub use boards::{BoardMapping, BoardMappings};
pub use env::AppConfig;
pub use tracing_init::init_tracing;
