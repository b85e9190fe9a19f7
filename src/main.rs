use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use git_bump::cli::{Args, Orchestrator, ReleaseContext, ReleaseReport};
use git_bump::config::{self, Config};
use git_bump::git::{self, SystemGit};
use git_bump::process::SystemRunner;
use git_bump::ui::Logger;
use git_bump::BumpError;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Help goes to stdout and is not a failure
            let failed = e.use_stderr();
            let _ = e.print();
            return if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let log = Logger::terminal(args.verbose);
    match run(&args, &log) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log.error(&format!("{:#}", e));
            if let Some(bump) = e.downcast_ref::<BumpError>() {
                log.debug(&bump.detail());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, log: &Logger) -> Result<ReleaseReport> {
    let cwd = std::env::current_dir().context("Cannot determine the working directory")?;
    let root = git::discover_workdir(&cwd).context("Not inside a git work tree")?;
    log.debug(&format!("work tree: {}", root.display()));

    let loaded = config::load_config(args.config.as_deref(), &cwd)?;
    if let Some(source) = &loaded.source {
        log.debug(&format!("config file: {}", source.display()));
    }
    let config = Config::from_layers(&loaded.layer, &args.overrides());
    if log.is_verbose() {
        if let Ok(rendered) = toml::to_string(&config) {
            log.debug(&format!("effective config:\n{}", rendered.trim_end()));
        }
    }

    let mode = args.selection().into_mode(config.release_prefix.clone())?;

    let runner = SystemRunner::new(config.dry_run, log.clone());
    let git = SystemGit::new(runner, &cwd);
    let ctx = ReleaseContext::new(config, log.clone(), cwd);

    let report = Orchestrator::new(&ctx, &git).run(&mode)?;
    Ok(report)
}
