pub mod charset;
pub mod constants;
pub mod error;
pub mod level;
pub mod log;
pub mod placement_sink;
pub mod rng;
pub mod server_utils;
pub mod types;

pub use error::GenerateError;
pub use level::{generate, generate_and_place, GenerateOptions, GeneratedLevel};
pub use placement_sink::PlacementSink;
