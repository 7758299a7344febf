use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use haproxyctl::errors::HaproxyCtlError;
use haproxyctl::infrastructure::cli::{self, Cli, Invocation};
use haproxyctl::infrastructure::renderer;
use haproxyctl::infrastructure::settings::HaproxyCtlSettings;
use haproxyctl::modules::report::Orchestrator;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        if let HaproxyCtlError::UsageError(_) = error {
            eprintln!("{}", cli::usage());
        }
        eprintln!("{}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), HaproxyCtlError> {
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()?;

    let cli = Cli::parse();
    let invocation = cli.invocation()?;

    let settings = HaproxyCtlSettings::load_from_file(&cli.config)?;
    let endpoints = settings.endpoints()?;
    log::info!("Load balancers found: {}", endpoints.len());

    let orchestrator = Orchestrator::build(endpoints);
    let report = match &invocation {
        Invocation::Status => orchestrator.status_report().await,
        Invocation::Action {
            action,
            servers,
            backend,
        } => {
            orchestrator
                .action_report(*action, backend.as_str(), servers.as_slice())
                .await
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    renderer::render(&report, cli.format, &mut out)
}
