pub mod config;
pub mod errors;
pub mod position;
pub mod symbol;

pub use config::{CheckOptions, CheckerConfig, ConfigError};
pub use errors::{Diagnostic, DiagnosticBag, DiagnosticKind};
pub use position::Position;
pub use symbol::{Symbol, TokenCategory};
