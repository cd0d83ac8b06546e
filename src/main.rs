use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use ftconv_torture::{run_torture, FailureMode, TortureConfig};

#[derive(Parser, Debug)]
#[command(author, version, long_about = None, disable_version_flag = true, disable_help_flag = true)]
struct Args {
    /// Directory containing the game's '*.lb5' and '*.bin' archives.
    /// 
    /// Every archive gets unpacked with `ftconv <archive> --raw`, then every unpacked
    /// '*.txt' and '*.BMP' file gets converted once more.
    #[arg(verbatim_doc_comment)]
    corpus_dir: PathBuf,
    
    /// The ftconv executable to test. Defaults to './bin/ftconv'.
    #[arg(short, long)]
    converter: Option<PathBuf>,
    
    /// Scratch directory. Deleted at the start of every run and kept afterwards.
    /// Defaults to 'tmp/torture'.
    #[arg(short, long, verbatim_doc_comment)]
    workspace: Option<PathBuf>,
    
    /// What a failing ftconv invocation means for the whole run. Defaults to 'ignore'.
    #[arg(short = 'f', long, value_enum)]
    on_failure: Option<FailureMode>,
    
    /// YAML file with any of the keys 'converter', 'workspace' and 'on_failure'.
    /// Options passed on the command line take precedence.
    #[arg(long, verbatim_doc_comment)]
    config: Option<PathBuf>,
    
    /// Print app version
    #[arg(short = 'V', long, action = ArgAction::Version)]
    version: Option<bool>,
    
    // always show the long help, the short one leaves out the defaults
    
    /// Print help
    #[arg(short, long, action = ArgAction::HelpLong)]
    help: Option<bool>,
}

impl Args {
    fn resolve_config(&self) -> Result<TortureConfig> {
        let mut config = match &self.config {
            Some(path) => TortureConfig::load(path)?,
            None => TortureConfig::default(),
        };
        
        if let Some(converter) = &self.converter {
            config.converter = converter.clone();
        }
        
        if let Some(workspace) = &self.workspace {
            config.workspace = workspace.clone();
        }
        
        if let Some(on_failure) = self.on_failure {
            config.on_failure = on_failure;
        }
        
        Ok(config)
    }
}

fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    init_logging();
    
    let args = Args::parse();
    log::debug!("{:?}", args);
    
    let config = args.resolve_config()?;
    log::debug!("{:?}", config);
    
    let report = run_torture(&args.corpus_dir, &config)?;
    report.verdict(config.on_failure)?;
    
    Ok(())
}
