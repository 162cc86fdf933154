use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "newsrelay")]
#[command(about = "newsrelay CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: NEWSRELAY_CONFIG_PATH or ~/.newsrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the webhook gateway.
    Gateway {
        /// Config file path (default: NEWSRELAY_CONFIG_PATH or ~/.newsrelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 9000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Post one message to a running gateway as if it came from the messaging platform, and print the reply.
    Simulate {
        /// Config file path, used to locate the gateway when --url is not given.
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Sender address (e.g. whatsapp:+15551234567)
        #[arg(long)]
        from: String,

        /// Full webhook URL (default: built from the gateway config)
        #[arg(long)]
        url: Option<String>,

        /// Message text
        message: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("newsrelay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Simulate {
            config,
            from,
            url,
            message,
        }) => {
            if let Err(e) = run_simulate(config, url, from, message).await {
                log::error!("simulate failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(relay::config::default_config_path);
    let dir = relay::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_gateway(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = relay::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting gateway on {}:{} (config {})",
        config.gateway.bind,
        config.gateway.port,
        path.display()
    );
    relay::gateway::run_gateway(config).await
}

async fn run_simulate(
    config_path: Option<std::path::PathBuf>,
    url: Option<String>,
    from: String,
    message: String,
) -> anyhow::Result<()> {
    let url = match url {
        Some(u) => u,
        None => {
            let (config, _) = relay::config::load_config(config_path)?;
            let path = config.gateway.webhook_path.trim().trim_start_matches('/').to_string();
            format!(
                "http://{}:{}/{}",
                config.gateway.bind.trim(),
                config.gateway.port,
                path
            )
        }
    };

    let res = reqwest::Client::new()
        .post(&url)
        .form(&[("Body", message.as_str()), ("From", from.as_str())])
        .send()
        .await?;
    let status = res.status();
    let body = res.text().await?;
    if !status.is_success() {
        anyhow::bail!("gateway returned {}: {}", status, body);
    }
    match relay::channels::twiml::first_message(&body) {
        Some(text) => println!("< {}", text.trim()),
        None => println!("< (no reply)"),
    }
    Ok(())
}
