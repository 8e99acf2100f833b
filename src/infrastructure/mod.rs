pub mod error;
pub mod logging;

pub use error::{ErrorCategory, SimError};
pub use logging::{setup_logging, LogFormat, LogOutput, LoggingConfig};
