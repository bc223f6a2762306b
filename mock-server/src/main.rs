use clap::Parser;
use mock_server::MockOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Local stand-in for the keystore service.
#[derive(Debug, Parser)]
#[command(name = "keystore-mock", version)]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Serve every reply inside an HTML page carrying a `data-payload`
    #[arg(long, env = "MOCK_WRAP_HTML", value_parser = clap::builder::BoolishValueParser::new())]
    wrap_html: bool,
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let addr = format!("127.0.0.1:{}", args.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, wrap_html = args.wrap_html, "mock keystore service listening");
    mock_server::run_with(
        listener,
        MockOptions {
            wrap_html: args.wrap_html,
        },
    )
    .await
}
