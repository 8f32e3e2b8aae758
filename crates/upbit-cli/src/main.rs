//! 업비트 수동 거래 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 전체 잔고 조회
//! upbit balance
//!
//! # 특정 코인 잔고 조회
//! upbit balance "비트코인 얼마 있어"
//!
//! # 시세 조회
//! upbit price 비트코인
//!
//! # 10만원어치 시장가 매수
//! upbit buy 비트코인 100000
//!
//! # 전량 시장가 매도
//! upbit sell 이더리움 all
//!
//! # 자연어 명령 실행
//! upbit command "도지코인 10만원 매수"
//! ```
//!
//! `UPBIT_ACCESS_KEY`와 `UPBIT_SECRET_KEY` 환경 변수가 필요합니다
//! (`.env` 파일 지원).

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use upbit_core::intent::SellVolume;
use upbit_core::logging::{init_logging, LogConfig};
use upbit_exchange::UpbitConfig;
use upbit_trading::ManualTrader;

#[derive(Parser)]
#[command(name = "upbit")]
#[command(about = "업비트 수동 거래 CLI - 잔고/시세 조회 및 시장가 매수/매도", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 잔고 조회 (검색어에 코인이 있으면 해당 코인만)
    Balance {
        /// 검색어 (예: "비트코인 얼마 있어")
        query: Option<String>,
    },

    /// 시세 조회
    Price {
        /// 코인 이름/심볼 (예: 비트코인, BTC)
        coin: String,
    },

    /// 시장가 매수
    Buy {
        /// 코인 이름/심볼
        coin: String,

        /// 주문 금액 (원화)
        amount_krw: Decimal,
    },

    /// 시장가 매도
    Sell {
        /// 코인 이름/심볼
        coin: String,

        /// 매도 수량 또는 "all"/"전부"
        volume: String,
    },

    /// 자연어 명령 실행
    Command {
        /// 명령 텍스트 (예: "비트코인 10만원 매수")
        #[arg(num_args = 1.., required = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging(LogConfig::from_env()).map_err(|e| anyhow!("로깅 초기화 실패: {}", e))?;

    let cli = Cli::parse();

    // 자격증명은 진입 시 한 번만 읽어 주입한다. 누락 시 네트워크 호출
    // 전에 종료한다.
    let config = UpbitConfig::from_env()?;
    let trader = ManualTrader::new(config)?;

    let reply = match cli.command {
        Commands::Balance { query } => trader.balance(query.as_deref().unwrap_or("")).await,
        Commands::Price { coin } => trader.price(&coin).await,
        Commands::Buy { coin, amount_krw } => trader.buy(&coin, amount_krw).await,
        Commands::Sell { coin, volume } => {
            let volume = SellVolume::parse(&volume)
                .ok_or_else(|| anyhow!("매도 수량은 숫자 또는 all/전부 이어야 합니다"))?;
            trader.sell(&coin, volume).await
        }
        Commands::Command { message } => trader.command(&message.join(" ")).await,
    };

    println!("{}", reply.message);

    if !reply.ok {
        std::process::exit(1);
    }

    Ok(())
}
