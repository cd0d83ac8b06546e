use std::{fmt::Write, path::{Path, PathBuf}};

use anyhow::Result;

use crate::{
    config::{FailureMode, TortureConfig},
    converter::{Converter, Invocation, InvocationFailure, ProcessConverter},
    error::TortureError,
    util::files::{create_tree, matching_files, remove_tree},
};

/// Scratch directories of a run. They are wiped when a run starts and left
/// alone afterwards so the output can be inspected.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    /// Raw files unpacked from the corpus archives (`torture1`)
    pub unpacked: PathBuf,
    /// Files converted from the unpacked ones (`torture2`)
    pub converted: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        
        Workspace {
            unpacked: root.join("torture1"),
            converted: root.join("torture2"),
            root,
        }
    }
    
    pub fn prepare(&self) -> Result<()> {
        remove_tree(&self.root)?;
        create_tree(&self.unpacked)?;
        create_tree(&self.converted)?;
        Ok(())
    }
}

/// The four passes of a run, in the order they are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    UnpackLb5,
    UnpackBin,
    ConvertText,
    ConvertImage,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::UnpackLb5, Stage::UnpackBin, Stage::ConvertText, Stage::ConvertImage];
    
    /// File name suffix an input has to end on. Case-sensitive.
    pub fn pattern(self) -> &'static str {
        match self {
            Stage::UnpackLb5 => ".lb5",
            Stage::UnpackBin => ".bin",
            Stage::ConvertText => ".txt",
            Stage::ConvertImage => ".BMP",
        }
    }
    
    pub fn banner(self) -> Option<&'static str> {
        match self {
            Stage::UnpackLb5 | Stage::UnpackBin => None,
            Stage::ConvertText => Some("Testing txt conversion"),
            Stage::ConvertImage => Some("Testing bmp conversion"),
        }
    }
    
    fn source_dir<'a>(self, corpus_dir: &'a Path, workspace: &'a Workspace) -> &'a Path {
        match self {
            Stage::UnpackLb5 | Stage::UnpackBin => corpus_dir,
            Stage::ConvertText | Stage::ConvertImage => &workspace.unpacked,
        }
    }
    
    pub fn invocation(self, input: &Path, workspace: &Workspace) -> Invocation {
        match self {
            Stage::UnpackLb5 | Stage::UnpackBin => Invocation::unpack_raw(input, &workspace.unpacked),
            Stage::ConvertText => {
                let file_name = input.file_name().unwrap_or_default();
                Invocation::convert(input, workspace.converted.join(file_name))
            },
            Stage::ConvertImage => {
                // the game stores them as .BMP, the converter writes .bmp
                let mut file_name = input.file_stem().unwrap_or_default().to_owned();
                file_name.push(".bmp");
                Invocation::convert(input, workspace.converted.join(file_name))
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub destination: PathBuf,
    pub result: Result<(), InvocationFailure>,
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    pub outcomes: Vec<FileOutcome>,
}

impl StageReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }
    
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.result.is_err()).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TortureReport {
    pub stages: Vec<StageReport>,
}

impl TortureReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }
    
    pub fn attempted(&self) -> usize {
        self.stages.iter().map(StageReport::attempted).sum()
    }
    
    pub fn failed(&self) -> usize {
        self.stages.iter().map(StageReport::failed).sum()
    }
    
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.stages.iter()
            .flat_map(|report| &report.outcomes)
            .filter(|outcome| outcome.result.is_err())
    }
    
    /// Decides whether the finished run counts as a failure.
    pub fn verdict(&self, mode: FailureMode) -> Result<(), TortureError> {
        let failed = self.failed();
        
        if mode == FailureMode::ExitCode && failed > 0 {
            return Err(TortureError::Failures {
                failed,
                attempted: self.attempted(),
            });
        }
        
        Ok(())
    }
}

/// The lines printed for a failed invocation. Captured stderr gets a line of its own.
pub fn failure_message(command: &str, failure: &InvocationFailure) -> String {
    let mut message = format!("[torture] ERROR! Command \"{}\" {}", command, failure);
    
    if let InvocationFailure::Exited { stderr: Some(stderr), .. } = failure {
        write!(message, "\n[torture] stderr: {}", stderr).ok();
    }
    
    message
}

pub fn summary_message(report: &TortureReport) -> String {
    let mut message = format!("Tested {} files :)", report.attempted());
    
    if report.failed() > 0 {
        write!(message, "\n[torture] {} of {} invocations failed", report.failed(), report.attempted()).ok();
    }
    
    message
}

pub struct TortureDriver<C: Converter> {
    converter: C,
    workspace: Workspace,
    on_failure: FailureMode,
}

impl<C: Converter> TortureDriver<C> {
    pub fn new(converter: C, workspace: Workspace, on_failure: FailureMode) -> Self {
        TortureDriver { converter, workspace, on_failure }
    }
    
    pub fn into_converter(self) -> C {
        self.converter
    }
    
    /// Runs all stages against `corpus_dir`. Failed invocations are printed and
    /// recorded, and only end the run early with `FailureMode::Abort`.
    pub fn run(&mut self, corpus_dir: &Path) -> Result<TortureReport> {
        self.workspace.prepare()?;
        
        let mut report = TortureReport::default();
        
        // every unpack has to be done before anything reads torture1
        for stage in Stage::ALL {
            let stage_report = self.run_stage(stage, corpus_dir)?;
            report.stages.push(stage_report);
        }
        
        println!("{}", summary_message(&report));
        
        Ok(report)
    }
    
    fn run_stage(&mut self, stage: Stage, corpus_dir: &Path) -> Result<StageReport> {
        if let Some(banner) = stage.banner() {
            println!("{}", banner);
        }
        
        let source_dir = stage.source_dir(corpus_dir, &self.workspace);
        let inputs = matching_files(source_dir, stage.pattern());
        log::info!("{:?}: {} input files in {}", stage, inputs.len(), source_dir.display());
        
        let mut outcomes = Vec::with_capacity(inputs.len());
        
        for input in inputs {
            let invocation = stage.invocation(&input, &self.workspace);
            let result = self.converter.check(&invocation);
            
            if let Err(failure) = &result {
                let command = invocation.command_line(self.converter.program());
                println!("{}", failure_message(&command, failure));
                
                if self.on_failure == FailureMode::Abort {
                    return Err(TortureError::Aborted {
                        command,
                        failure: failure.clone(),
                    }.into());
                }
            }
            
            outcomes.push(FileOutcome {
                input,
                destination: invocation.destination,
                result,
            });
        }
        
        Ok(StageReport { stage, outcomes })
    }
}

/// Runs the whole torture sequence with the real converter executable.
pub fn run_torture(corpus_dir: &Path, config: &TortureConfig) -> Result<TortureReport> {
    let converter = ProcessConverter::new(&config.converter);
    let workspace = Workspace::new(&config.workspace);
    
    TortureDriver::new(converter, workspace, config.on_failure).run(corpus_dir)
}
