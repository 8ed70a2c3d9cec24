mod capture;
mod prerequisites;
mod process;
mod sandbox;
mod workspace;

pub use capture::TRUNCATED_MARKER;
pub use prerequisites::{check_prerequisites, resolve_interpreter};
pub use sandbox::ProcessSandbox;
pub use workspace::STAGED_PREFIX;
