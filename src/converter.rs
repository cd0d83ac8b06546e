use std::{ffi::OsString, fmt, io, path::{Path, PathBuf}, process::{Command, ExitStatus, Stdio}};

use anyhow::Result;

/// One call of the converter, i.e. its argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub input: PathBuf,
    pub destination: PathBuf,
    /// Unpack the archive's inner files as-is into `destination`, which is a directory.
    pub raw: bool,
    /// Capture stdout and stderr instead of letting them through to the terminal.
    pub quiet: bool,
}

impl Invocation {
    pub fn unpack_raw(input: &Path, output_dir: &Path) -> Self {
        Invocation {
            input: input.to_owned(),
            destination: output_dir.to_owned(),
            raw: true,
            quiet: false,
        }
    }
    
    pub fn convert(input: &Path, destination: PathBuf) -> Self {
        Invocation {
            input: input.to_owned(),
            destination,
            raw: false,
            quiet: true,
        }
    }
    
    pub fn args(&self) -> Vec<OsString> {
        let mut args = vec![self.input.clone().into_os_string()];
        
        if self.raw {
            args.push("--raw".into());
        }
        
        args.push(self.destination.clone().into_os_string());
        args
    }
    
    /// Space separated command line, only meant for printing.
    pub fn command_line(&self, program: &Path) -> String {
        let mut parts = vec![program.display().to_string()];
        parts.extend(self.args().iter().map(|arg| arg.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationStatus {
    /// A process killed by a signal reports the negated signal number.
    /// `None` only where no signal number is available.
    pub code: Option<i32>,
    /// Only present for quiet invocations.
    pub stderr: Option<String>,
}

impl InvocationStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Why a single invocation counts as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationFailure {
    Exited {
        code: Option<i32>,
        stderr: Option<String>,
    },
    Spawn(String),
}

impl fmt::Display for InvocationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationFailure::Exited { code: Some(code), .. } => write!(f, "returned {}", code),
            InvocationFailure::Exited { code: None, .. } => write!(f, "was terminated by a signal"),
            InvocationFailure::Spawn(err) => write!(f, "could not be started: {}", err),
        }
    }
}

pub trait Converter {
    /// Path of the executable, used when printing command lines.
    fn program(&self) -> &Path;
    
    fn run(&mut self, invocation: &Invocation) -> io::Result<InvocationStatus>;
    
    /// Like `run`, but folds spawn errors and non-zero exits into an `InvocationFailure`.
    fn check(&mut self, invocation: &Invocation) -> Result<(), InvocationFailure> {
        match self.run(invocation) {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(InvocationFailure::Exited {
                code: status.code,
                stderr: status.stderr,
            }),
            Err(err) => Err(InvocationFailure::Spawn(err.to_string())),
        }
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    
    status.code().or_else(|| status.signal().map(|signal| -signal))
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> Option<i32> {
    status.code()
}

/// Runs the real `ftconv` executable, one blocking child process per invocation.
pub struct ProcessConverter {
    program: PathBuf,
}

impl ProcessConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ProcessConverter { program: program.into() }
    }
}

impl Converter for ProcessConverter {
    fn program(&self) -> &Path {
        &self.program
    }
    
    fn run(&mut self, invocation: &Invocation) -> io::Result<InvocationStatus> {
        let mut command = Command::new(&self.program);
        command.args(invocation.args());
        
        log::debug!("Running {}", invocation.command_line(&self.program));
        
        if invocation.quiet {
            let output = command
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()?;
            
            Ok(InvocationStatus {
                code: exit_code(output.status),
                stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            })
        } else {
            let status = command.status()?;
            
            Ok(InvocationStatus {
                code: exit_code(status),
                stderr: None,
            })
        }
    }
}
