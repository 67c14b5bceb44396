//! EcoChain CLI
//!
//!   ecochain serve                       → Serve /.well-known/farcaster.json
//!   ecochain manifest                    → Print the manifest
//!   ecochain create [--ens <name>]       → Create a wallet (anonymous session)
//!   ecochain connect <address>           → Attach to an existing wallet
//!   ecochain dashboard <address>         → Balance, impact, history, rewards
//!   ecochain watch <address>             → Camera deposit loop + live balance
//!   ecochain transfer <to> <amount>      → Unsigned $EC0 transfer request
//!
//! Configuration comes from `ECOCHAIN_*` variables (a local `.env` is read
//! first) and the flags below.
//!
//! Output format:
//!   --json     Output raw JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use std::env;
use std::io::IsTerminal;
use std::sync::Arc;

use ecochain::context::{AppConfig, AppContext};
use ecochain::core::format::{format_eco_amount, short_address};
use ecochain::core::model::{DepositReceipt, Wallet};
use ecochain::dashboard::{affordable, history_rows, Dashboard, Snapshot};
use ecochain::logging::init_logging;
use ecochain::supabase::{ChangeFilter, WalletStore};
use ecochain::token::{basescan_tx_url, TransferRequest, ECO_COIN_ADDRESS};
use ecochain::wallet::Notice;
use ecochain::{install_signal_handlers, EcoError};
use serde_json::{json, Value};
use tracing::{info, warn};

fn main() {
    init_logging();
    let _ = rustls::crypto::ring::default_provider().install_default();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("ecochain {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("serve") => cmd_serve(&opts),
        Some("manifest") => cmd_manifest(&opts),
        Some("create") => cmd_create(&opts),
        Some("connect") => cmd_connect(&opts),
        Some("dashboard") => cmd_dashboard(&opts),
        Some("watch") => cmd_watch(&opts),
        Some("transfer") => cmd_transfer(&opts),
        Some(cmd) => Err(format!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = !opts.json && (opts.pretty || std::io::stdout().is_terminal());
    match result {
        Ok(output) => println!("{}", render(&output, pretty)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": e}), pretty));
            std::process::exit(1);
        }
    }
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    args: Vec<String>,
    ens: Option<String>,
    port: Option<u16>,
    backend: Option<String>,
    site_url: Option<String>,
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        load_dotenv(".env");

        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--ens" => {
                    if i + 1 < args.len() {
                        opts.ens = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--port" | "-p" => {
                    if i + 1 < args.len() {
                        opts.port = args[i + 1].parse().ok();
                        i += 1;
                    }
                }
                "--backend" | "-b" => {
                    if i + 1 < args.len() {
                        opts.backend = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--site-url" => {
                    if i + 1 < args.len() {
                        opts.site_url = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                _ if arg.starts_with('-') => {}
                _ => positional.push(arg.clone()),
            }
            i += 1;
        }

        let mut positional = positional.into_iter();
        opts.command = positional.next();
        opts.args = positional.collect();
        opts
    }

    fn arg(&self, index: usize, name: &str) -> Result<&str, String> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| format!("Missing <{}>. Run `ecochain --help`.", name))
    }
}

/// `KEY=value` lines; existing variables win.
fn load_dotenv(path: &str) {
    let Ok(contents) = std::fs::read_to_string(path) else { return };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"');
            if !value.is_empty() && env::var(key.trim()).is_err() {
                env::set_var(key.trim(), value);
            }
        }
    }
}

fn print_usage() {
    println!(
        r#"ecochain - recycle, earn $EC0

USAGE:
    ecochain <command> [options]

COMMANDS:
    serve                      Serve the mini-app manifest over HTTP
    manifest                   Print the mini-app manifest
    create [--ens <name>]      Create a wallet
    connect <address>          Connect an existing wallet
    dashboard <address>        Show balance, impact, history and rewards
    watch <address>            Run the camera deposit loop for a wallet
    transfer <to> <amount>     Build an unsigned $EC0 transfer on ECOCHAIN_NETWORK

OPTIONS:
    -p, --port <port>          Server port (ECOCHAIN_PORT, default 8080)
    -b, --backend <url>        Classifier backend (ECOCHAIN_BACKEND_URL)
        --site-url <url>       Public site URL (ECOCHAIN_SITE_URL)
        --ens <name>           ENS name for `create`
        --json                 Raw JSON output
        --pretty               Pretty JSON output
    -h, --help                 Show this help
    -V, --version              Show version

ENVIRONMENT:
    ECOCHAIN_SUPABASE_URL, ECOCHAIN_SUPABASE_ANON_KEY   Supabase project
    ECOCHAIN_POLL_MS, ECOCHAIN_DEPOSIT_DELAY_MS         Deposit loop timing
    ECOCHAIN_PROJECT_ID, ECOCHAIN_NETWORK               Wallet kit settings
    ECOCHAIN_ROOT                                       Session file root
    ECOCHAIN_LOG_JSON=1                                 JSON logs on stderr"#
    );
}

fn load_context(opts: &ParsedArgs) -> Result<Arc<AppContext>, String> {
    let mut config = AppConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(port) = opts.port {
        config = config.with_port(port);
    }
    if let Some(url) = &opts.backend {
        config = config.with_backend_url(url.clone());
    }
    if let Some(url) = &opts.site_url {
        config = config.with_site_url(url.clone());
    }
    AppContext::new(config).map_err(|e| e.to_string())
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Runtime::new().map_err(|e| format!("Failed to create runtime: {}", e))
}

fn cmd_serve(opts: &ParsedArgs) -> Result<Value, String> {
    let ctx = load_context(opts)?;
    let port = ctx.config().port;

    runtime()?.block_on(async {
        let shutdown = install_signal_handlers();
        info!("Endpoints:");
        info!("  GET  /.well-known/farcaster.json - Mini-app manifest");
        info!("  GET  /health                     - Health check");
        info!("  GET  /api/walletkit              - Wallet kit settings");
        ecochain::server::serve(ctx, shutdown).await.map_err(|e| e.to_string())
    })?;

    Ok(json!({"status": "stopped", "port": port}))
}

fn cmd_manifest(opts: &ParsedArgs) -> Result<Value, String> {
    Ok(load_context(opts)?.manifest().to_json())
}

fn notice_output(notice: &Notice, wallet: &Wallet) -> Value {
    json!({
        "notice": notice,
        "wallet": {
            "id": wallet.id,
            "address": wallet.wallet_address,
            "short": short_address(&wallet.wallet_address),
            "ens_name": wallet.ens_name,
        }
    })
}

fn notice_error(notice: &Notice, error: &EcoError) -> String {
    if !error.is_user_error() {
        warn!(error = %error, "{}", notice.title);
    }
    format!("{}: {}", notice.title, notice.description)
}

fn cmd_create(opts: &ParsedArgs) -> Result<Value, String> {
    let ctx = load_context(opts)?;
    let flows = ctx.wallet_flows().map_err(|e| e.to_string())?;

    let result = runtime()?.block_on(flows.create(opts.ens.as_deref()));
    let notice = Notice::for_create(&result);
    match &result {
        Ok(wallet) => Ok(notice_output(&notice, wallet)),
        Err(e) => Err(notice_error(&notice, e)),
    }
}

fn cmd_connect(opts: &ParsedArgs) -> Result<Value, String> {
    let address = opts.args.first().map(String::as_str).unwrap_or("");
    let ctx = load_context(opts)?;
    let flows = ctx.wallet_flows().map_err(|e| e.to_string())?;

    let result = runtime()?.block_on(flows.connect(address));
    let notice = Notice::for_connect(&result);
    match &result {
        Ok(wallet) => Ok(notice_output(&notice, wallet)),
        Err(e) => Err(notice_error(&notice, e)),
    }
}

async fn find_wallet(ctx: &AppContext, address: &str) -> Result<Wallet, String> {
    let supabase = ctx.supabase().map_err(|e| e.to_string())?;
    supabase
        .find_wallet_by_address(address)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Wallet not found: {}", address))
}

fn dashboard_output(wallet: &Wallet, snapshot: &Snapshot) -> Value {
    let summary = snapshot.summary;
    json!({
        "wallet": short_address(&wallet.wallet_address),
        "balance": format!("{} $EC0", format_eco_amount(summary.balance)),
        "total_deposits": summary.total_deposits,
        "impact_kg_co2": summary.impact_kg,
        "history": history_rows(&snapshot.transactions),
        "rewards": affordable(summary.balance),
    })
}

fn cmd_dashboard(opts: &ParsedArgs) -> Result<Value, String> {
    let address = opts.arg(0, "address")?.to_string();
    let ctx = load_context(opts)?;

    runtime()?.block_on(async {
        let wallet = find_wallet(&ctx, &address).await?;
        let dashboard = Dashboard::new(wallet.clone(), ctx.supabase().map_err(|e| e.to_string())?);
        dashboard.reload().await.map_err(|e| format!("Error loading wallet data: {}", e))?;
        Ok::<Value, String>(dashboard_output(&wallet, &dashboard.snapshot()))
    })
}

fn cmd_watch(opts: &ParsedArgs) -> Result<Value, String> {
    let address = opts.arg(0, "address")?.to_string();
    let ctx = load_context(opts)?;

    runtime()?.block_on(async {
        let shutdown = install_signal_handlers();
        let wallet = find_wallet(&ctx, &address).await?;
        let supabase = ctx.supabase().map_err(|e| e.to_string())?;

        let dashboard = Arc::new(Dashboard::new(wallet.clone(), supabase.clone()));
        let _ = dashboard.reload().await;

        let follow = match supabase
            .realtime()
            .subscribe(ChangeFilter::inserts("eco_transactions").eq("wallet_id", &wallet.id), shutdown.subscribe())
            .await
        {
            Ok(events) => Some(dashboard.clone().follow(events, shutdown.subscribe())),
            Err(e) => {
                warn!(error = %e, "realtime unavailable, balance refreshes after deposits only");
                None
            }
        };

        let mut updates = dashboard.watch();
        let printer = tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let summary = updates.borrow().summary;
                println!(
                    "balance {} $EC0 | deposits {} | {:.1} kg CO2",
                    format_eco_amount(summary.balance),
                    summary.total_deposits,
                    summary.impact_kg
                );
            }
        });

        info!(feed = %ctx.classifier().video_feed_url(), wallet = %short_address(&wallet.wallet_address), "watching camera");
        let announce = |receipt: &DepositReceipt| {
            info!(material = %receipt.material, amount = %format_eco_amount(receipt.amount), "deposit recorded");
        };
        let deposits = ctx
            .deposit_service(&wallet.wallet_address)
            .add_listener(Arc::new(announce))
            .add_listener(dashboard.clone())
            .spawn(shutdown.subscribe());

        shutdown.wait().await;
        let _ = deposits.await;
        if let Some(handle) = follow {
            let _ = handle.await;
        }
        printer.abort();

        Ok::<Value, String>(dashboard_output(&wallet, &dashboard.snapshot()))
    })
}

fn cmd_transfer(opts: &ParsedArgs) -> Result<Value, String> {
    let recipient = opts.arg(0, "recipient")?;
    let amount = opts.arg(1, "amount")?;
    let network = AppConfig::from_env().map_err(|e| e.to_string())?.network;
    let request = TransferRequest::eco_coin(recipient, amount, network.chain_id()).map_err(|e| e.to_string())?;

    Ok(json!({
        "token": ECO_COIN_ADDRESS,
        "network": network.as_str(),
        "request": request,
        "explorer": basescan_tx_url(network.chain_id(), "<tx-hash>"),
        "note": "Sign and send with your wallet; then open the explorer link with the transaction hash.",
    }))
}
