//! Configuration hierarchy.
//!
//! Values come from built-in defaults, a system file, a per-user file, a
//! per-project file and finally explicit command-line flags, each tier
//! overwriting the one below key by key.
pub mod defaults;
pub mod keys;
pub mod loader;
pub mod persist;
pub mod resolve;
pub mod store;
pub mod validation;

pub use keys::{ConfigKey, SourceTier};
pub use loader::Strategy;
pub use resolve::{Environment, Resolution, SourcePaths, resolve};
pub use store::{ResolvedConfig, Value};
