//! Build driving.
//!
//! The build itself is opaque: berth materializes generator glue, hands the
//! folders and resolved configuration to an external [`BuildTool`], and
//! reports its exit status and output.

pub mod cmake;
pub mod context;
pub mod driver;
pub mod fingerprint;
pub mod generators;
pub mod tool;

pub use cmake::CMakeTool;
pub use context::BuildContext;
pub use driver::BuildDriver;
pub use fingerprint::package_id;
pub use tool::{BuildTool, ToolOutput};
