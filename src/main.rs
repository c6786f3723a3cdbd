use clap::Parser;
use log::LevelFilter;

use git_autofixup::app::{App, Config};
use git_autofixup::attribution::Strictness;
use git_autofixup::cli::Cli;
use git_autofixup::git::Git;

fn main() {
    let cli = Cli::parse();

    // -v prints assignment decisions, -vv adds per-hunk blame diffs
    let log_level = match cli.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let git = match Git::with_repo_root() {
        Ok(git) => git,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    };

    let config = Config {
        revision: Some(cli.revision),
        context: cli.context,
        strictness: Strictness::from_level(cli.strict),
    };

    if let Err(err) = App::new(git, config).run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
