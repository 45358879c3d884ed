//! InfraGenius CLI entry point

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use infragenius::cli::{Args, Commands, MonitoringTier, Settings};
use infragenius::deploy::{DeployOptions, Deployer};
use infragenius::doctor::Doctor;
use infragenius::license::LicenseKey;
use infragenius::ollama::OllamaClient;
use infragenius::project::ProjectRoot;
use infragenius::setup::Setup;

#[tokio::main]
async fn main() {
    // Usage errors exit 1 per the exit-code contract; help and
    // version keep clap's 0
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            use clap::error::ErrorKind;
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(msg) = args.validate() {
        eprintln!("{} {}", "error:".red().bold(), msg);
        std::process::exit(1);
    }

    if let Err(e) = run(args).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut settings = Settings::load(args.config.clone())?;

    // CLI flags override file settings; unset flags keep the file values
    if let Some(host) = &args.host {
        settings.ollama.host = host.clone();
    }
    if let Some(port) = args.port {
        settings.ollama.port = port;
    }
    if let Some(model) = &args.model {
        settings.ollama.default_model = model.clone();
    }

    let model = settings.ollama.default_model.clone();
    let client = OllamaClient::new(&settings.ollama_url(), settings.ollama.request_timeout_secs);

    match &args.command {
        Commands::Setup { skip_server } => {
            let root = ProjectRoot::discover(&args.project_dir())?;
            let setup = Setup::new(&root, &settings, &client, &model, args.verbosity());
            setup.run(*skip_server).await?;
        }

        Commands::Deploy {
            license_key,
            target,
            domain,
            no_ssl,
            monitoring,
        } => {
            let root = ProjectRoot::discover(&args.project_dir())?;

            // License gate runs before any file is written
            let license = LicenseKey::parse(license_key)?;

            // Flags win; the [deploy] section supplies the rest.
            // settings.validate() already rejected unknown tier names.
            let domain = domain
                .clone()
                .unwrap_or_else(|| settings.deploy.domain.clone());
            let tier = monitoring.unwrap_or_else(|| {
                MonitoringTier::from_name(&settings.deploy.monitoring)
                    .unwrap_or(MonitoringTier::Basic)
            });

            let opts = DeployOptions {
                license,
                target: *target,
                domain,
                tier,
                ssl: !no_ssl,
            };

            let deployer = Deployer::new(&root, &model, args.verbosity());
            deployer.run(&opts).await?;
        }

        Commands::Doctor => {
            let doctor = Doctor::new(client, model.clone(), &args.project_dir(), settings.server_url());
            let report = doctor.run_checks().await?;
            report.print();

            if !report.is_healthy() {
                std::process::exit(1);
            }
        }

        Commands::Models => {
            let models = client.list_models().await?;

            if models.is_empty() {
                println!("No models installed. Pull one with: ollama pull {}", model);
            } else {
                println!("{}", "Installed models:".bold());
                for info in models {
                    let size_gb = info.size as f64 / 1_000_000_000.0;
                    let marker = if info.name == model { "*" } else { " " };
                    println!("  {} {:<32} {:>7.1} GB", marker, info.name, size_gb);
                }
            }
        }

        Commands::Config => {
            println!("{}", toml::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}
