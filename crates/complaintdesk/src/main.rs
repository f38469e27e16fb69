//! `complaintdesk` - CLI for the complaint intake server
//!
//! This binary runs the web server and provides maintenance commands for the
//! complaints database.

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use complaintdesk::cli::{Cli, Command, ConfigCommand, ListCommand, QrCommand, ServeCommand};
use complaintdesk::storage::schema;
use complaintdesk::web::{self, qr::QrRequest, render, AppState};
use complaintdesk::{init_logging, service, Config, IntakeError, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Serve(cmd) => handle_serve(config, cmd).await,
        Command::Provision => handle_provision(&config),
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Qr(cmd) => handle_qr(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("opening database {}", path.display()))?
        .with_provisioning(config.storage.allow_provisioning);
    Ok(storage)
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(bind) = cmd.bind {
        config.server.bind = bind;
        config.validate()?;
    }
    let addr = config.bind_addr()?;
    let storage = open_storage(&config)?;

    if config.storage.provision_on_startup {
        match service::ensure_table(&storage) {
            Ok(outcome) => info!("{}", outcome.message()),
            Err(err) => warn!("Startup provisioning failed: {}", err),
        }
    }

    info!("Using database {}", storage.path().display());
    let state = AppState::new(storage, &config);
    web::serve(addr, state).await?;
    Ok(())
}

fn handle_provision(config: &Config) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match service::ensure_table(&storage) {
        Ok(outcome) => {
            println!("{}", outcome.message());
            Ok(())
        }
        Err(err) => {
            eprintln!("{err}");
            eprintln!();
            eprintln!("Run the following SQL against {}:", storage.path().display());
            eprintln!();
            eprintln!("{}", schema::manual_setup_sql());
            bail!("provisioning failed")
        }
    }
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let complaints = match service::list_complaints(&storage) {
        Ok(complaints) => complaints,
        Err(IntakeError::SchemaMissing) => {
            bail!("The complaints table doesn't exist yet. Run `complaintdesk provision` first.")
        }
        Err(err) => return Err(err.into()),
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&complaints)?);
        return Ok(());
    }

    if complaints.is_empty() {
        println!("No complaints have been submitted yet.");
        return Ok(());
    }

    for complaint in &complaints {
        let submitted = complaint.created_at.map_or_else(
            || "Date not recorded".to_string(),
            |ts| render::format_timestamp(&ts.with_timezone(&chrono::Local)),
        );
        println!(
            "#{:<5} {:<10} {} {} ({} {})",
            complaint.id,
            render::capitalize_first(&complaint.priority),
            complaint.first_name,
            complaint.last_name,
            complaint.unit,
            render::capitalize_first(&complaint.street),
        );
        println!("       {} | {}", render::capitalize_first(&complaint.issue_type), submitted);
        println!("       {}", complaint.description);
    }
    println!();
    println!("{} complaint(s)", complaints.len());
    Ok(())
}

fn handle_qr(config: &Config, cmd: &QrCommand) -> anyhow::Result<()> {
    let size = cmd.size.map(|s| s.to_string());
    let request = QrRequest::new(cmd.url.as_deref(), size.as_deref(), &config.server.public_url);
    let svg = request.to_svg()?;
    std::fs::write(&cmd.output, svg)
        .with_context(|| format!("writing {}", cmd.output.display()))?;
    println!(
        "Wrote {}px QR code for {} to {}",
        request.size,
        request.url,
        cmd.output.display()
    );
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind:                 {}", config.server.bind);
                println!("  Public URL:           {}", config.server.public_url);
                println!();
                println!("[Storage]");
                println!("  Database path:        {}", config.database_path().display());
                println!("  Provision on startup: {}", config.storage.provision_on_startup);
                println!("  Allow provisioning:   {}", config.storage.allow_provisioning);
                println!();
                println!("[Site]");
                println!("  Community:            {}", config.site.community_name);
                println!("  Organization:         {}", config.site.organization);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
