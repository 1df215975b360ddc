use anyhow::Result;
use cataract_detect::{
    config::{Config, DEFAULT_BIND_ADDR},
    web::serve,
};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cataract-detect")]
#[command(about = "Cataract detection inference service")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// ONNX weight file (defaults to the file next to the executable)
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// ONNX Runtime intra-op threads
    #[arg(long)]
    intra_threads: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志系统
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting cataract detection service...");
    tracing::info!("Bind address: {}", args.bind);

    let config = Config::new(args.bind, args.model_path, args.intra_threads)?;

    serve(config).await?;

    Ok(())
}
