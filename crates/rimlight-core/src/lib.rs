pub mod config;
pub mod errors;
pub mod types;

pub use config::CaptureProfile;
pub use errors::{RimlightError, SamplerError};
pub use types::*;
