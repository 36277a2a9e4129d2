//! External collaborators invoked after scaffolding.
//!
//! Both are opaque subprocesses: only success or failure is consumed, and a
//! failure never undoes scaffolding.
pub mod hosting;
pub mod image;
