//! solx command-line driver
//!
//! Launch a Token-2022 token with metadata, or quote and swap tokens through
//! Jupiter, from a local keypair.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use solx::config::Config;
use solx::metrics::metrics;
use solx::token::base_units_to_ui;
use solx::types::{find_token, popular_tokens};
use solx::{
    FlowState, JupiterClient, KeypairWallet, LaunchpadError, RpcConnection, SwapSession,
    SwapSettings, TokenCreationRequest, TokenForm, TokenInfo, TokenLaunchFlow, WalletSigner,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a Token-2022 mint with metadata and mint the initial supply
    CreateToken {
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value = "9")]
        decimals: String,
        #[arg(long)]
        supply: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        image_url: String,
    },
    /// Fetch a swap quote
    Quote(SwapArgs),
    /// Quote, then sign and submit the swap
    Swap(SwapArgs),
    /// List the built-in tokens
    Tokens,
}

#[derive(clap::Args, Debug)]
struct SwapArgs {
    /// Input token symbol or mint
    #[arg(long)]
    from: String,
    /// Output token symbol or mint
    #[arg(long)]
    to: String,
    /// Amount of the input token
    #[arg(long)]
    amount: String,
    /// Slippage tolerance in percent; config default when omitted
    #[arg(long)]
    slippage: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args.config)?;
    init_logging(args.verbose, config.logging.json)?;
    config.validate().context("Invalid configuration")?;

    let result = match args.command {
        Command::Tokens => {
            print_tokens();
            Ok(())
        }
        Command::CreateToken {
            name,
            symbol,
            decimals,
            supply,
            description,
            image_url,
        } => {
            let form = TokenForm {
                name,
                symbol,
                decimals,
                initial_supply: supply,
                description,
                image_url,
            };
            create_token(&config, form).await
        }
        Command::Quote(swap) => quote(&config, &swap).await,
        Command::Swap(swap) => execute_swap(&config, &swap).await,
    };

    if args.verbose && config.monitoring.enable_metrics {
        match metrics().gather_text() {
            Ok(text) => eprintln!("{}", text),
            Err(e) => warn!("Failed to render metrics: {}", e),
        }
    }

    result
}

/// Initialize logging subsystem
fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let env_filter = if verbose { "solx=debug,info" } else { "solx=info,warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| env_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    }

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        // Logging is not up yet
        eprintln!("Config file '{}' not found, using defaults", path);
        dotenvy::dotenv().ok();
        let mut config = Config::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }
}

fn connect(config: &Config) -> Result<(RpcConnection, KeypairWallet)> {
    let connection = RpcConnection::new(
        &config.rpc.url,
        config.rpc.timeout(),
        config.rpc.commitment_config()?,
    );
    let keypair_path = config.wallet.expanded_keypair_path();
    let wallet = KeypairWallet::from_file(
        &keypair_path,
        connection.client(),
        config.rpc.confirm_submissions,
    )
    .context("Failed to load wallet")?;
    info!(rpc = %config.rpc.url, wallet = ?wallet.pubkey(), "Connected");
    Ok((connection, wallet))
}

async fn create_token(config: &Config, form: TokenForm) -> Result<()> {
    let request = TokenCreationRequest::from_form(&form).map_err(surface)?;
    let (connection, wallet) = connect(config)?;

    let mut flow = TokenLaunchFlow::new(request);
    match flow.execute(&wallet, &connection).await {
        Ok(created) => {
            println!("Token created");
            println!("  mint:               {}", created.mint);
            println!("  associated account: {}", created.associated_token_account);
            println!("  base units minted:  {}", created.base_units);
            for (label, sig) in ["create mint", "create account", "mint supply"]
                .iter()
                .zip(created.signatures.iter())
            {
                println!("  {:<19} {}", format!("{}:", label), sig);
            }
            Ok(())
        }
        Err(e) => {
            if let FlowState::Failed(failure) = flow.state() {
                if let Some(mint) = failure.orphaned_mint {
                    eprintln!(
                        "Mint {} was created but the launch did not complete; it holds no supply",
                        mint
                    );
                }
            }
            Err(surface(e))
        }
    }
}

fn resolve_token(query: &str) -> Result<TokenInfo> {
    match find_token(query) {
        Some(token) => Ok(token),
        None => bail!("Unknown token '{}'; run `solx tokens` for the list", query),
    }
}

fn session_for(config: &Config, swap: &SwapArgs) -> Result<SwapSession> {
    let settings = match swap.slippage {
        Some(pct) => SwapSettings::from_percent(pct),
        None => SwapSettings::from_bps(config.swap.default_slippage_bps),
    }
    .map_err(surface)?;

    let mut session = SwapSession::new(resolve_token(&swap.from)?, resolve_token(&swap.to)?, settings);
    session.set_amount(&swap.amount);
    Ok(session)
}

fn print_quote(session: &SwapSession) {
    let Some(quote) = session.quote() else {
        return;
    };
    println!(
        "{} {} -> {:.6} {}",
        base_units_to_ui(quote.in_amount, session.input().decimals),
        session.input().symbol,
        session.expected_output_ui().unwrap_or_default(),
        session.output().symbol
    );
    match session.price_impact_pct() {
        Some(pct) => println!("  price impact: {:.2}%", pct),
        None => println!("  price impact: N/A"),
    }
    println!("  slippage:     {}%", session.settings().slippage_pct());
    if !quote.route_labels.is_empty() {
        println!("  route:        {}", quote.route_labels.join(" -> "));
    }
}

async fn quote(config: &Config, swap: &SwapArgs) -> Result<()> {
    let mut session = session_for(config, swap)?;
    let client = JupiterClient::new(&config.swap.jupiter_base_url, config.swap.timeout())
        .map_err(surface)?;
    session.request_quote(&client).await.map_err(surface)?;
    print_quote(&session);
    Ok(())
}

async fn execute_swap(config: &Config, swap: &SwapArgs) -> Result<()> {
    let mut session = session_for(config, swap)?;
    let client = JupiterClient::new(&config.swap.jupiter_base_url, config.swap.timeout())
        .map_err(surface)?;
    session.request_quote(&client).await.map_err(surface)?;
    print_quote(&session);

    let (_connection, wallet) = connect(config)?;
    let signature = session
        .confirm_swap(&client, &wallet)
        .await
        .map_err(surface)?;
    println!("Swap submitted: {}", signature);
    Ok(())
}

fn print_tokens() {
    println!("{:<6} {:<12} {:>8}  {}", "SYMBOL", "NAME", "DECIMALS", "MINT");
    for token in popular_tokens() {
        println!(
            "{:<6} {:<12} {:>8}  {}",
            token.symbol, token.name, token.decimals, token.mint
        );
    }
}

/// Log the detailed error and turn it into the one-line user message
fn surface(e: LaunchpadError) -> anyhow::Error {
    warn!(category = e.category(), error = %e, "Operation failed");
    anyhow::anyhow!(e.user_message())
}
