//! 수동 거래 액션 서비스.
//!
//! 잔고/시세/매수/매도/자연어 명령 다섯 액션을 노출합니다. 모든 액션은
//! `ActionReply`를 반환하며, 이 경계를 넘어 에러가 전파되지 않습니다.
//! 처리된 거래 실패는 ❌ 텍스트를 담은 정상 응답으로, 사전 검증 실패는
//! `ok = false`로 구분합니다.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use upbit_core::format::{format_change_rate, format_krw};
use upbit_core::intent::{SellVolume, TradingIntent};
use upbit_core::market::{detect_coin, normalize, KRW_PREFIX};
use upbit_exchange::{ChangeDirection, UpbitClient, UpbitConfig, UpbitError};

use crate::interpreter::interpret;
use crate::safety::{OrderGuard, TradeConfig, TradeError};

/// 미해석 명령에 대한 도움말.
const HELP_MESSAGE: &str = "❌ 알 수 없는 명령어입니다.\n\n\
     사용 가능:\n\
     - 잔고 보여줘\n\
     - 비트코인 시세\n\
     - 도지코인 10만원 매수\n\
     - 이더리움 전부 매도";

/// 액션 실행 결과.
#[derive(Debug, Clone, Serialize)]
pub struct ActionReply {
    /// 액션이 정상 처리되었는지 여부
    pub ok: bool,
    /// 사용자에게 보여줄 메시지
    pub message: String,
}

impl ActionReply {
    /// 정상 응답 생성.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    /// 실패 응답 생성.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// 수동 거래 서비스.
///
/// 호출마다 자격증명이 주입된 자체 클라이언트를 사용합니다. 명령 간
/// 공유 상태나 캐시는 없습니다.
pub struct ManualTrader {
    client: UpbitClient,
    guard: OrderGuard,
}

impl ManualTrader {
    /// 기본 거래 설정으로 생성.
    pub fn new(config: UpbitConfig) -> Result<Self, UpbitError> {
        Self::with_trade_config(config, TradeConfig::default())
    }

    /// 거래 설정을 지정해 생성.
    pub fn with_trade_config(
        config: UpbitConfig,
        trade_config: TradeConfig,
    ) -> Result<Self, UpbitError> {
        Ok(Self {
            client: UpbitClient::new(config)?,
            guard: OrderGuard::new(trade_config),
        })
    }

    /// 내부 클라이언트 참조.
    pub fn client(&self) -> &UpbitClient {
        &self.client
    }

    // ========================================================================
    // 액션
    // ========================================================================

    /// 잔고 조회. 검색어에서 코인이 감지되면 해당 코인만, 아니면 전체
    /// 포트폴리오를 요약합니다.
    pub async fn balance(&self, query: &str) -> ActionReply {
        let result = match detect_coin(query) {
            Some(symbol) => self.coin_balance(symbol).await,
            None => self.portfolio().await,
        };

        match result {
            Ok(message) => ActionReply::ok(message),
            Err(e) => ActionReply::ok(format!("❌ 잔고 조회 실패: {}", e)),
        }
    }

    /// 시세 조회.
    pub async fn price(&self, coin: &str) -> ActionReply {
        let market = normalize(coin);

        match self.client.get_market_price(&market).await {
            Ok(ticker) => {
                let marker = match ticker.change {
                    ChangeDirection::Rise => "🔺",
                    ChangeDirection::Fall => "🔻",
                    ChangeDirection::Even => "➖",
                };

                ActionReply::ok(format!(
                    "📊 {} 현재 시세:\n\n\
                     현재가: {}\n\
                     {} 전일 대비: {} ({})\n\
                     24시간 거래량: {:.2}\n\
                     24시간 거래대금: {}",
                    market,
                    format_krw(ticker.trade_price),
                    marker,
                    format_krw(ticker.signed_change_price),
                    format_change_rate(ticker.signed_change_rate),
                    ticker.acc_trade_volume_24h,
                    format_krw(ticker.acc_trade_price_24h),
                ))
            }
            Err(_) => ActionReply::ok(format!(
                "❌ 시세 조회 실패: {} 마켓을 찾을 수 없습니다.",
                market
            )),
        }
    }

    /// 시장가 매수. 금액이 0 이하면 실행 없이 실패 응답을 반환합니다.
    pub async fn buy(&self, coin: &str, amount_krw: Decimal) -> ActionReply {
        if amount_krw <= Decimal::ZERO {
            return ActionReply::error("매수 금액은 0보다 커야 합니다");
        }

        self.run_buy(coin, amount_krw).await
    }

    /// 시장가 매도. 숫자 수량이 0 이하면 실행 없이 실패 응답을 반환합니다.
    pub async fn sell(&self, coin: &str, volume: SellVolume) -> ActionReply {
        if let SellVolume::Amount(v) = volume {
            if v <= Decimal::ZERO {
                return ActionReply::error("매도 수량은 0보다 커야 합니다");
            }
        }

        self.run_sell(coin, volume).await
    }

    /// 자연어 명령 해석 및 실행.
    pub async fn command(&self, text: &str) -> ActionReply {
        let intent = interpret(text);
        debug!(?intent, "명령 해석");

        match intent {
            TradingIntent::Balance { query } => self.balance(&query).await,
            TradingIntent::Price { coin } => self.price(&coin).await,
            TradingIntent::Buy { coin, amount_krw } => self.run_buy(&coin, amount_krw).await,
            TradingIntent::Sell { coin, volume } => self.run_sell(&coin, volume).await,
            TradingIntent::Malformed { usage } => ActionReply::ok(usage.hint()),
            TradingIntent::Unknown => ActionReply::ok(HELP_MESSAGE),
        }
    }

    // ========================================================================
    // 내부 실행 경로
    // ========================================================================

    /// 안전 장치를 거쳐 매수하고 결과를 렌더링.
    async fn run_buy(&self, coin: &str, amount_krw: Decimal) -> ActionReply {
        match self.guard.market_buy(&self.client, coin, amount_krw).await {
            Ok(report) => ActionReply::ok(format!(
                "✅ 매수 주문 완료:\n\n\
                 종목: {}\n\
                 주문 금액: {}\n\
                 예상 수량: 약 {:.8}\n\
                 주문 UUID: {}\n\n\
                 💡 체결 완료까지 수초 소요됩니다.",
                report.market,
                format_krw(report.amount_krw),
                report.estimated_volume,
                report.uuid,
            )),
            Err(TradeError::InvalidAmount(_)) => {
                ActionReply::ok("❌ 매수 금액은 0보다 커야 합니다.")
            }
            Err(TradeError::InsufficientBalance {
                required,
                available,
            }) => ActionReply::ok(format!(
                "❌ 잔고 부족: {} 필요 (현재: {})",
                format_krw(required),
                format_krw(available)
            )),
            Err(e) => ActionReply::ok(format!("❌ 매수 실패: {}", e)),
        }
    }

    /// 안전 장치를 거쳐 매도하고 결과를 렌더링.
    async fn run_sell(&self, coin: &str, volume: SellVolume) -> ActionReply {
        match self.guard.market_sell(&self.client, coin, volume).await {
            Ok(report) => ActionReply::ok(format!(
                "✅ 매도 주문 완료:\n\n\
                 종목: {}\n\
                 수량: {:.8}\n\
                 예상 금액: 약 {}\n\
                 주문 UUID: {}\n\n\
                 💡 체결 완료까지 수초 소요됩니다.",
                report.market,
                report.volume,
                format_krw(report.estimated_krw),
                report.uuid,
            )),
            Err(TradeError::NoHoldings(currency)) => ActionReply::ok(format!(
                "❌ 보유량 없음: {} 잔고가 0입니다.",
                currency
            )),
            Err(TradeError::ZeroVolume) => ActionReply::ok("❌ 매도 수량이 0입니다."),
            Err(e) => ActionReply::ok(format!("❌ 매도 실패: {}", e)),
        }
    }

    // ========================================================================
    // 잔고 요약
    // ========================================================================

    /// 특정 코인의 잔고 요약.
    async fn coin_balance(&self, symbol: &str) -> Result<String, UpbitError> {
        let account = self
            .client
            .get_balance(symbol)
            .await?
            .filter(|account| !account.balance.is_zero());

        let Some(account) = account else {
            return Ok(format!("{} 보유량: 0", symbol));
        };

        let market = format!("{}{}", KRW_PREFIX, symbol);
        let ticker = self.client.get_market_price(&market).await?;
        let value_krw = account.balance * ticker.trade_price;

        Ok(format!(
            "💰 {} 잔고:\n\
             - 수량: {} {}\n\
             - 평가액: {}\n\
             - 평균 매수가: {}",
            symbol,
            account.balance,
            symbol,
            format_krw(value_krw),
            format_krw(account.avg_buy_price),
        ))
    }

    /// 전체 포트폴리오 요약. 잔고가 0인 자산은 건너뛰고, 시세가 없는
    /// 자산(원화 마켓 미상장)은 평가에서 제외합니다.
    async fn portfolio(&self) -> Result<String, UpbitError> {
        let accounts = self.client.get_accounts().await?;

        let mut total_krw = Decimal::ZERO;
        let mut message = String::from("💰 업비트 잔고:\n\n");

        for account in accounts {
            if account.balance.is_zero() {
                continue;
            }

            if account.currency == "KRW" {
                message.push_str(&format!("- KRW: {}\n", format_krw(account.balance)));
                total_krw += account.balance;
                continue;
            }

            let market = format!("{}{}", KRW_PREFIX, account.currency);
            match self.client.get_market_price(&market).await {
                Ok(ticker) => {
                    let value_krw = account.balance * ticker.trade_price;
                    total_krw += value_krw;
                    message.push_str(&format!(
                        "- {}: {:.8} (약 {})\n",
                        account.currency,
                        account.balance,
                        format_krw(value_krw)
                    ));
                }
                Err(e) => {
                    debug!(market = %market, error = %e, "시세 조회 실패, 평가에서 제외");
                }
            }
        }

        message.push_str(&format!("\n총 평가액: {}", format_krw(total_krw)));
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    fn test_trader(server: &mockito::ServerGuard) -> ManualTrader {
        let config = UpbitConfig::new("test-access", "test-secret")
            .with_base_url(server.url())
            .with_timeout_secs(5);
        ManualTrader::new(config).expect("trader")
    }

    fn offline_trader() -> ManualTrader {
        let config = UpbitConfig::new("test-access", "test-secret")
            .with_base_url("http://127.0.0.1:1")
            .with_timeout_secs(1);
        ManualTrader::new(config).expect("trader")
    }

    #[tokio::test]
    async fn test_unknown_command_lists_supported_intents() {
        let trader = offline_trader();
        let reply = trader.command("오늘 기분 어때").await;

        assert!(reply.ok);
        assert!(reply.message.contains("알 수 없는 명령어"));
        assert!(reply.message.contains("비트코인 시세"));
        assert!(reply.message.contains("전부 매도"));
    }

    #[tokio::test]
    async fn test_malformed_buy_returns_usage_hint() {
        let trader = offline_trader();
        let reply = trader.command("매수 좀 해봐").await;

        assert!(reply.ok);
        assert!(reply.message.contains("형식 오류"));
        assert!(reply.message.contains("10만원 매수"));
    }

    #[tokio::test]
    async fn test_buy_action_rejects_nonpositive_amount() {
        let trader = offline_trader();
        let reply = trader.buy("비트코인", dec!(0)).await;

        assert!(!reply.ok);
        assert!(reply.message.contains("0보다 커야"));
    }

    #[tokio::test]
    async fn test_sell_action_rejects_nonpositive_volume() {
        let trader = offline_trader();
        let reply = trader.sell("비트코인", SellVolume::Amount(dec!(-1))).await;

        assert!(!reply.ok);
        assert!(reply.message.contains("0보다 커야"));
    }

    #[tokio::test]
    async fn test_price_for_unlisted_market_reports_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/ticker")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let trader = test_trader(&server);
        let reply = trader.price("없는코인").await;

        assert!(reply.ok);
        assert!(reply.message.contains("KRW-없는코인"));
        assert!(reply.message.contains("찾을 수 없습니다"));
    }

    #[tokio::test]
    async fn test_portfolio_totals_krw_and_valued_assets() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/accounts")
            .with_status(200)
            .with_body(
                r#"[
                    {
                        "currency": "KRW",
                        "balance": "1000000.0",
                        "locked": "0.0",
                        "avg_buy_price": "0",
                        "avg_buy_price_modified": false,
                        "unit_currency": "KRW"
                    },
                    {
                        "currency": "BTC",
                        "balance": "0.1",
                        "locked": "0.0",
                        "avg_buy_price": "52000000",
                        "avg_buy_price_modified": false,
                        "unit_currency": "KRW"
                    },
                    {
                        "currency": "XYZ",
                        "balance": "0.0",
                        "locked": "0.0",
                        "avg_buy_price": "0",
                        "avg_buy_price_modified": false,
                        "unit_currency": "KRW"
                    }
                ]"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/v1/ticker")
            .match_query(Matcher::UrlEncoded("markets".into(), "KRW-BTC".into()))
            .with_status(200)
            .with_body(
                r#"[{
                    "market": "KRW-BTC",
                    "trade_price": 50000000.0,
                    "change": "RISE",
                    "change_price": 1000.0,
                    "change_rate": 0.001,
                    "signed_change_price": 1000.0,
                    "signed_change_rate": 0.001,
                    "trade_volume": 0.01,
                    "acc_trade_price_24h": 1500000000.0,
                    "acc_trade_volume_24h": 1234.56,
                    "timestamp": 1730000000000
                }]"#,
            )
            .create_async()
            .await;

        let trader = test_trader(&server);
        let reply = trader.balance("").await;

        assert!(reply.ok);
        assert!(reply.message.contains("- KRW: ₩1,000,000"));
        assert!(reply.message.contains("- BTC: 0.10000000"));
        // 1,000,000 KRW + 0.1 BTC * 50,000,000 = 6,000,000
        assert!(reply.message.contains("총 평가액: ₩6,000,000"));
        // 잔고 0인 자산은 표시하지 않는다
        assert!(!reply.message.contains("XYZ"));
    }

    #[tokio::test]
    async fn test_balance_query_with_coin_mention_summarizes_that_coin() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/accounts")
            .with_status(200)
            .with_body(
                r#"[
                    {
                        "currency": "BTC",
                        "balance": "0.5",
                        "locked": "0.0",
                        "avg_buy_price": "52000000",
                        "avg_buy_price_modified": false,
                        "unit_currency": "KRW"
                    }
                ]"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/v1/ticker")
            .match_query(Matcher::UrlEncoded("markets".into(), "KRW-BTC".into()))
            .with_status(200)
            .with_body(
                r#"[{
                    "market": "KRW-BTC",
                    "trade_price": 60000000.0,
                    "change": "EVEN",
                    "change_price": 0.0,
                    "change_rate": 0.0,
                    "signed_change_price": 0.0,
                    "signed_change_rate": 0.0,
                    "trade_volume": 0.01,
                    "acc_trade_price_24h": 1500000000.0,
                    "acc_trade_volume_24h": 1234.56,
                    "timestamp": 1730000000000
                }]"#,
            )
            .create_async()
            .await;

        let trader = test_trader(&server);
        let reply = trader.balance("비트 얼마 있지").await;

        assert!(reply.ok);
        assert!(reply.message.contains("💰 BTC 잔고"));
        assert!(reply.message.contains("평가액: ₩30,000,000"));
        assert!(reply.message.contains("평균 매수가: ₩52,000,000"));
    }

    #[tokio::test]
    async fn test_balance_query_without_holdings_reports_zero() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/accounts")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let trader = test_trader(&server);
        let reply = trader.balance("도지코인 얼마나 있어").await;

        assert!(reply.ok);
        assert_eq!(reply.message, "DOGE 보유량: 0");
    }
}
