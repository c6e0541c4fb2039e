//! 开仓示例
//!
//! 用法:
//! ```bash
//! OPTECK_AFFILIATE_ID=1234 OPTECK_PARTNER_ID=secret \
//!     cargo run --example open_position -- <email> <password> <symbol> <call|put> <amount>
//! ```

use opteck_client::{ClientConfig, Credentials, Direction, OpteckClient, OpteckError};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("opteck_client=debug,open_position=info")),
        )
        .init();

    // 解析命令行参数
    let args: Vec<String> = env::args().collect();
    if args.len() < 6 {
        eprintln!(
            "用法: {} <email> <password> <symbol> <call|put> <amount>",
            args[0]
        );
        std::process::exit(1);
    }

    let affiliate_id: u64 = env::var("OPTECK_AFFILIATE_ID")?.parse()?;
    let partner_id = env::var("OPTECK_PARTNER_ID")?;
    let config = match env::var("OPTECK_BASE_URL") {
        Ok(url) => ClientConfig::with_base_url(&url),
        Err(_) => ClientConfig::default(),
    };

    let direction = match args[4].to_ascii_lowercase().as_str() {
        "call" | "up" => Direction::Call,
        "put" | "down" => Direction::Put,
        other => {
            eprintln!("未知方向: {}", other);
            std::process::exit(1);
        }
    };
    let amount: f64 = args[5].parse()?;

    let client = OpteckClient::with_config(Credentials::new(affiliate_id, partner_id), config)?;
    println!("禁止注册的国家: {:?}", client.forbidden_countries());

    match client
        .open_position(&args[1], &args[2], &args[3], direction, amount)
        .await
    {
        Ok(confirmation) => println!("[OK] 开仓成功: {:?}", confirmation),
        Err(OpteckError::NoAvailableOptions { symbol }) => {
            println!("[SKIP] {} 当前没有可交易的期权", symbol)
        }
        Err(OpteckError::NoEnoughBalance { description, .. }) => {
            println!("[FAIL] 余额不足: {}", description)
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
