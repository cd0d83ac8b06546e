pub mod config;
pub mod converter;
pub mod driver;
pub mod error;
pub mod util;

pub use config::{FailureMode, TortureConfig};
pub use converter::{Converter, Invocation, InvocationFailure, InvocationStatus, ProcessConverter};
pub use driver::{failure_message, run_torture, summary_message, FileOutcome, Stage, StageReport, TortureDriver, TortureReport, Workspace};
pub use error::TortureError;
