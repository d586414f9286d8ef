pub mod conductor;
pub mod detect;
pub mod error;
pub mod io;
pub mod paths;
pub mod plan;
pub mod registry;
pub mod setup;
pub mod track;
pub mod types;

pub use conductor::Conductor;
pub use error::{ConductorError, Result};
