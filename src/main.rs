use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use tecmz_client::{execute_call, sign_pairs};
use tecmz_client::{CallCommands, Cli, ClientRegistry, Commands, Config, GlobalArgs, Server, SignArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Installed before the full load so its warnings are not lost
    init_logging(&Config::log_level(&cli.global))?;

    let serve_args = match &cli.command {
        Commands::Serve(args) => Some(args),
        _ => None,
    };
    let config = Config::load(&cli.global, serve_args)?;
    config.validate()?;

    match cli.command {
        Commands::Serve(_) => serve(config).await,
        Commands::Call { command } => call(config, &cli.global, command).await,
        Commands::Sign(args) => sign(&config, &cli.global, args),
    }
}

fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(level)
        .compact()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting tecmz-client v{}", env!("CARGO_PKG_VERSION"));

    info!("📊 Configuration loaded:");
    info!("  Server: {}:{}", config.server.address, config.server.port);
    info!("  API base: {}", config.api.base_url);
    info!(
        "  Apps: [{}]",
        config
            .apps
            .iter()
            .map(|a| a.app_id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    if config.apps.is_empty() {
        warn!("⚠️  No apps configured - every callback will be answered with 404");
    }

    if !config.security.allowed_ips.is_empty() {
        info!("🔒 Allowed IPs: [{}]", config.security.allowed_ips.join(", "));
    } else {
        warn!("⚠️  No IP restrictions configured - all IPs allowed!");
    }

    if config.audit.enabled {
        info!("📝 Audit logging enabled: {}", config.audit.log_path);
    } else {
        warn!("⚠️  Audit logging disabled");
    }

    let server = Server::new(config)?;
    server.serve().await?;

    Ok(())
}

async fn call(config: Config, global: &GlobalArgs, command: CallCommands) -> Result<()> {
    let app = config.select_app(global.app_id.as_deref())?;
    let registry = ClientRegistry::from_config(&config.api)?;
    let client = registry.instance(&app.app_id, app.app_secret.as_deref());

    let output = execute_call(&client, command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn sign(config: &Config, global: &GlobalArgs, args: SignArgs) -> Result<()> {
    let secret = match args.secret {
        Some(secret) => secret,
        None => config
            .select_app(global.app_id.as_deref())?
            .app_secret
            .clone()
            .filter(|s| !s.is_empty())
            .context("No secret available (use --secret, --app-secret or an [[apps]] entry)")?,
    };

    println!("{}", sign_pairs(&args.params, &secret, args.timestamp));
    Ok(())
}
