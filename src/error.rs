use thiserror::Error;

use crate::converter::InvocationFailure;

/// Run-level verdicts. Failures of single invocations only end up here
/// when the failure mode asks for it.
#[derive(Error, Debug)]
pub enum TortureError {
    #[error("aborted: command \"{command}\" {failure}")]
    Aborted {
        command: String,
        failure: InvocationFailure,
    },
    
    #[error("{failed} of {attempted} converter invocations failed")]
    Failures {
        failed: usize,
        attempted: usize,
    },
}
