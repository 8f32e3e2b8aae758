//! 주문 안전 장치.
//!
//! 매수/매도 의도를 실제 주문으로 바꾸기 전에 잔고·수수료·수량
//! 불변식을 검증합니다. 검증을 통과한 경우에만 거래소 클라이언트를
//! 호출합니다.
//!
//! 잔고 확인과 주문 제출 사이는 원자적이지 않습니다. 그 사이에 다른
//! 주문 체결이나 가격 변동이 끼어들면 검증이 낡은 값이 될 수 있습니다.
//! 이 검증은 클라이언트 측 사전 차단일 뿐이며, 최종 거부 판정은
//! 거래소의 몫입니다.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use upbit_core::intent::SellVolume;
use upbit_core::market::{normalize, KRW_PREFIX};
use upbit_exchange::{UpbitClient, UpbitError};

/// 거래 안전 장치 설정.
#[derive(Debug, Clone)]
pub struct TradeConfig {
    /// 매수 시 잔고 검증에 쓰는 수수료 여유 비율.
    ///
    /// 거래소 계정 등급별 실제 수수료가 아닌 보수적인 로컬 추정값입니다.
    pub fee_rate: Decimal,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            // 0.05%
            fee_rate: Decimal::new(5, 4),
        }
    }
}

/// 거래 검증/실행 에러.
#[derive(Debug, Error)]
pub enum TradeError {
    /// 0 이하의 주문 금액
    #[error("invalid order amount: {0}")]
    InvalidAmount(Decimal),

    /// 수수료 포함 필요 금액이 보유 원화를 초과
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    /// 매도할 자산을 보유하지 않음
    #[error("no holdings for {0}")]
    NoHoldings(String),

    /// 해석된 매도 수량이 0
    #[error("resolved sell volume is zero")]
    ZeroVolume,

    /// 거래소 호출 실패
    #[error(transparent)]
    Exchange(#[from] UpbitError),
}

/// 거래 작업을 위한 Result 타입.
pub type TradeResult<T> = Result<T, TradeError>;

/// 매수 주문 요약.
#[derive(Debug, Clone)]
pub struct BuyReport {
    /// 마켓 코드
    pub market: String,
    /// 주문 금액 (원화)
    pub amount_krw: Decimal,
    /// 현재가 기준 예상 수량 (표시용 추정치)
    pub estimated_volume: Decimal,
    /// 거래소 주문 식별자
    pub uuid: String,
}

/// 매도 주문 요약.
#[derive(Debug, Clone)]
pub struct SellReport {
    /// 마켓 코드
    pub market: String,
    /// 해석된 매도 수량
    pub volume: Decimal,
    /// 현재가 기준 예상 금액 (표시용 추정치)
    pub estimated_krw: Decimal,
    /// 거래소 주문 식별자
    pub uuid: String,
}

/// 주문 전 검증을 수행하는 안전 장치.
#[derive(Debug, Clone, Default)]
pub struct OrderGuard {
    config: TradeConfig,
}

impl OrderGuard {
    /// 설정으로 새 안전 장치 생성.
    pub fn new(config: TradeConfig) -> Self {
        Self { config }
    }

    /// 설정된 수수료 여유 비율.
    pub fn fee_rate(&self) -> Decimal {
        self.config.fee_rate
    }

    /// 검증 후 시장가 매수.
    ///
    /// 순서: 금액 검증 → 마켓 정규화 → 시세 조회(표시용) → 수수료 포함
    /// 필요 금액 계산 → 원화 잔고 확인 → 주문 제출. 잔고가 부족하면
    /// 주문 호출 없이 거부합니다.
    pub async fn market_buy(
        &self,
        client: &UpbitClient,
        coin: &str,
        amount_krw: Decimal,
    ) -> TradeResult<BuyReport> {
        if amount_krw <= Decimal::ZERO {
            return Err(TradeError::InvalidAmount(amount_krw));
        }

        let market = normalize(coin);

        // 시세는 예상 수량 표시에만 쓴다. 주문 자체는 원화 금액 지정
        // 시장가라 체결가는 거래소가 정한다.
        let ticker = client.get_market_price(&market).await?;

        let required = amount_krw * (Decimal::ONE + self.config.fee_rate);
        let available = client
            .get_balance("KRW")
            .await?
            .map(|account| account.balance)
            .unwrap_or(Decimal::ZERO);

        if available < required {
            warn!(
                market = %market,
                %required,
                %available,
                "매수 거부: 잔고 부족"
            );
            return Err(TradeError::InsufficientBalance {
                required,
                available,
            });
        }

        let order = client.buy_market(&market, amount_krw).await?;
        let estimated_volume = (amount_krw / ticker.trade_price).round_dp(8);

        info!(market = %market, %amount_krw, uuid = %order.uuid, "매수 주문 제출 완료");

        Ok(BuyReport {
            market,
            amount_krw,
            estimated_volume,
            uuid: order.uuid,
        })
    }

    /// 검증 후 시장가 매도.
    ///
    /// 순서: 마켓 정규화 → 보유 수량 확인 → 수량 해석(전량 또는 보유
    /// 수량으로 클램핑) → 시세 조회(표시용) → 주문 제출. 보유량이 없거나
    /// 해석된 수량이 0이면 주문 호출 없이 거부합니다.
    pub async fn market_sell(
        &self,
        client: &UpbitClient,
        coin: &str,
        volume: SellVolume,
    ) -> TradeResult<SellReport> {
        let market = normalize(coin);
        let currency = market.strip_prefix(KRW_PREFIX).unwrap_or(&market).to_string();

        let available = client
            .get_balance(&currency)
            .await?
            .map(|account| account.balance)
            .unwrap_or(Decimal::ZERO);

        if available.is_zero() {
            return Err(TradeError::NoHoldings(currency));
        }

        let resolved = match volume {
            SellVolume::All => available,
            SellVolume::Amount(requested) => {
                if requested > available {
                    warn!(
                        market = %market,
                        %requested,
                        %available,
                        "매도 수량을 보유 수량으로 클램핑"
                    );
                }
                requested.min(available)
            }
        };

        if resolved <= Decimal::ZERO {
            return Err(TradeError::ZeroVolume);
        }

        let ticker = client.get_market_price(&market).await?;
        let estimated_krw = resolved * ticker.trade_price;

        let order = client.sell_market(&market, resolved).await?;

        info!(market = %market, volume = %resolved, uuid = %order.uuid, "매도 주문 제출 완료");

        Ok(SellReport {
            market,
            volume: resolved,
            estimated_krw,
            uuid: order.uuid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use rust_decimal_macros::dec;
    use upbit_exchange::UpbitConfig;

    fn test_client(server: &mockito::ServerGuard) -> UpbitClient {
        let config = UpbitConfig::new("test-access", "test-secret")
            .with_base_url(server.url())
            .with_timeout_secs(5);
        UpbitClient::new(config).expect("client")
    }

    fn accounts_body(krw: &str, btc: &str) -> String {
        format!(
            r#"[
                {{
                    "currency": "KRW",
                    "balance": "{krw}",
                    "locked": "0.0",
                    "avg_buy_price": "0",
                    "avg_buy_price_modified": false,
                    "unit_currency": "KRW"
                }},
                {{
                    "currency": "BTC",
                    "balance": "{btc}",
                    "locked": "0.0",
                    "avg_buy_price": "52000000",
                    "avg_buy_price_modified": false,
                    "unit_currency": "KRW"
                }}
            ]"#
        )
    }

    fn ticker_body(market: &str, price: &str) -> String {
        format!(
            r#"[{{
                "market": "{market}",
                "trade_price": {price},
                "change": "EVEN",
                "change_price": 0.0,
                "change_rate": 0.0,
                "signed_change_price": 0.0,
                "signed_change_rate": 0.0,
                "trade_volume": 0.01,
                "acc_trade_price_24h": 1500000000.0,
                "acc_trade_volume_24h": 1234.56,
                "timestamp": 1730000000000
            }}]"#
        )
    }

    fn order_body(uuid: &str) -> String {
        format!(
            r#"{{
                "uuid": "{uuid}",
                "side": "ask",
                "ord_type": "market",
                "price": null,
                "state": "wait",
                "market": "KRW-BTC",
                "created_at": "2025-11-20T10:00:00+09:00",
                "volume": "0.1",
                "remaining_volume": "0.1",
                "reserved_fee": "0.0",
                "remaining_fee": "0.0",
                "paid_fee": "0.0",
                "locked": "0.1",
                "executed_volume": "0.0",
                "trades_count": 0
            }}"#
        )
    }

    #[tokio::test]
    async fn test_buy_rejected_locally_when_balance_short_of_fee_margin() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/ticker")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(ticker_body("KRW-BTC", "100000000.0"))
            .create_async()
            .await;
        server
            .mock("GET", "/v1/accounts")
            .with_status(200)
            // 100,000원 주문 + 0.05% 수수료 = 100,050원 필요
            .with_body(accounts_body("100000.0", "0.0"))
            .create_async()
            .await;
        let orders = server
            .mock("POST", "/v1/orders")
            .expect(0)
            .create_async()
            .await;

        let client = test_client(&server);
        let guard = OrderGuard::default();
        let err = guard
            .market_buy(&client, "비트코인", dec!(100000))
            .await
            .unwrap_err();

        match err {
            TradeError::InsufficientBalance {
                required,
                available,
            } => {
                assert_eq!(required, dec!(100050.0000));
                assert_eq!(available, dec!(100000));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        orders.assert_async().await;
    }

    #[tokio::test]
    async fn test_buy_submits_and_reports_estimate() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/ticker")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(ticker_body("KRW-BTC", "100000000.0"))
            .create_async()
            .await;
        server
            .mock("GET", "/v1/accounts")
            .with_status(200)
            .with_body(accounts_body("1000000.0", "0.0"))
            .create_async()
            .await;
        let orders = server
            .mock("POST", "/v1/orders")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "market": "KRW-BTC",
                "side": "bid",
                "ord_type": "price",
                "price": "100000"
            })))
            .with_status(201)
            .with_body(order_body("11111111-2222-3333-4444-555555555555"))
            .create_async()
            .await;

        let client = test_client(&server);
        let guard = OrderGuard::default();
        let report = guard
            .market_buy(&client, "비트코인", dec!(100000))
            .await
            .unwrap();

        assert_eq!(report.market, "KRW-BTC");
        assert_eq!(report.estimated_volume, dec!(0.001));
        assert_eq!(report.uuid, "11111111-2222-3333-4444-555555555555");
        orders.assert_async().await;
    }

    #[tokio::test]
    async fn test_sell_all_submits_exact_available_balance() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/accounts")
            .with_status(200)
            .with_body(accounts_body("0.0", "0.12345678"))
            .create_async()
            .await;
        server
            .mock("GET", "/v1/ticker")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(ticker_body("KRW-BTC", "100000000.0"))
            .create_async()
            .await;
        let orders = server
            .mock("POST", "/v1/orders")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "market": "KRW-BTC",
                "side": "ask",
                "ord_type": "market",
                "volume": "0.12345678"
            })))
            .with_status(201)
            .with_body(order_body("aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee"))
            .create_async()
            .await;

        let client = test_client(&server);
        let guard = OrderGuard::default();
        let report = guard
            .market_sell(&client, "비트코인", SellVolume::All)
            .await
            .unwrap();

        assert_eq!(report.volume, dec!(0.12345678));
        assert_eq!(report.estimated_krw, dec!(12345678));
        orders.assert_async().await;
    }

    #[tokio::test]
    async fn test_sell_clamps_to_available_balance() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/accounts")
            .with_status(200)
            .with_body(accounts_body("0.0", "2.5"))
            .create_async()
            .await;
        server
            .mock("GET", "/v1/ticker")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(ticker_body("KRW-BTC", "100000000.0"))
            .create_async()
            .await;
        let orders = server
            .mock("POST", "/v1/orders")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "volume": "2.5"
            })))
            .with_status(201)
            .with_body(order_body("aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee"))
            .create_async()
            .await;

        let client = test_client(&server);
        let guard = OrderGuard::default();
        let report = guard
            .market_sell(&client, "BTC", SellVolume::Amount(dec!(10)))
            .await
            .unwrap();

        assert_eq!(report.volume, dec!(2.5));
        orders.assert_async().await;
    }

    #[tokio::test]
    async fn test_sell_zero_volume_rejected_before_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/accounts")
            .with_status(200)
            .with_body(accounts_body("0.0", "1.0"))
            .create_async()
            .await;
        let orders = server
            .mock("POST", "/v1/orders")
            .expect(0)
            .create_async()
            .await;

        let client = test_client(&server);
        let guard = OrderGuard::default();
        let err = guard
            .market_sell(&client, "BTC", SellVolume::Amount(dec!(0)))
            .await
            .unwrap_err();

        assert!(matches!(err, TradeError::ZeroVolume));
        orders.assert_async().await;
    }

    #[tokio::test]
    async fn test_sell_without_holdings_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/accounts")
            .with_status(200)
            .with_body(accounts_body("500000.0", "0.0"))
            .create_async()
            .await;

        let client = test_client(&server);
        let guard = OrderGuard::default();
        let err = guard
            .market_sell(&client, "이더리움", SellVolume::All)
            .await
            .unwrap_err();

        assert!(matches!(err, TradeError::NoHoldings(ref c) if c == "ETH"));
    }

    #[tokio::test]
    async fn test_buy_nonpositive_amount_rejected_without_network() {
        // mockito 서버 없이 호출해도 네트워크 전에 거부되어야 한다
        let config = UpbitConfig::new("test-access", "test-secret")
            .with_base_url("http://127.0.0.1:1")
            .with_timeout_secs(1);
        let client = UpbitClient::new(config).unwrap();

        let guard = OrderGuard::default();
        let err = guard
            .market_buy(&client, "비트코인", dec!(0))
            .await
            .unwrap_err();

        assert!(matches!(err, TradeError::InvalidAmount(_)));
    }
}
