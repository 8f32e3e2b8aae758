//! 업비트 REST API 클라이언트.
//!
//! 엔드포인트별 메서드 하나씩. 인증이 필요한 호출은 매번 새 자격증명을
//! 만들어 `Authorization` 헤더에 싣습니다. 재시도는 없습니다 — 실패한
//! 주문은 보고될 뿐 재제출되지 않습니다.

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::auth::authorization_header;
use crate::config::UpbitConfig;
use crate::error::{UpbitError, UpbitResult};
use crate::types::{Account, MarketInfo, MarketOrder, OrderResponse, Ticker};

// ============================================================================
// 에러 응답 타입
// ============================================================================

#[derive(Debug, serde::Deserialize)]
struct UpbitErrorBody {
    error: UpbitErrorPayload,
}

#[derive(Debug, serde::Deserialize)]
struct UpbitErrorPayload {
    // 업비트는 name에 문자열 또는 숫자를 내려준다
    name: Value,
    message: String,
}

// ============================================================================
// 클라이언트
// ============================================================================

/// 업비트 거래소 클라이언트.
pub struct UpbitClient {
    config: UpbitConfig,
    client: Client,
}

impl UpbitClient {
    /// 새 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `UpbitError::Network`를 반환합니다.
    pub fn new(config: UpbitConfig) -> UpbitResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpbitError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { config, client })
    }

    /// 파라미터에서 쿼리 문자열 생성.
    ///
    /// 서명 해시와 요청 URL에 같은 문자열을 쓰기 위해 한 번만 만듭니다.
    fn build_query(params: &[(&str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// 공개 API 요청 (인증 불필요).
    async fn public_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> UpbitResult<T> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let query = Self::build_query(params);

        let full_url = if query.is_empty() {
            url
        } else {
            format!("{}?{}", url, query)
        };

        debug!("GET {}", full_url);

        let response = self
            .client
            .get(&full_url)
            .send()
            .await
            .map_err(UpbitError::from)?;

        Self::handle_response(response).await
    }

    /// 서명된 GET 요청.
    async fn signed_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> UpbitResult<T> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let query = Self::build_query(params);

        let token = self.bearer_token(&query)?;
        let full_url = if query.is_empty() {
            url
        } else {
            format!("{}?{}", url, query)
        };

        debug!("GET (signed) {}", endpoint);

        let response = self
            .client
            .get(&full_url)
            .header(AUTHORIZATION, token)
            .send()
            .await
            .map_err(UpbitError::from)?;

        Self::handle_response(response).await
    }

    /// 서명된 POST 요청.
    ///
    /// 본문은 JSON이지만 `query_hash`는 같은 파라미터의 쿼리 문자열
    /// 형식으로 계산합니다 (업비트 규약).
    async fn signed_post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> UpbitResult<T> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let query = Self::build_query(params);
        let token = self.bearer_token(&query)?;

        let body: serde_json::Map<String, Value> = params
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::String(v.clone())))
            .collect();

        debug!("POST (signed) {}", endpoint);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, token)
            .json(&body)
            .send()
            .await
            .map_err(UpbitError::from)?;

        Self::handle_response(response).await
    }

    /// 서명된 DELETE 요청.
    async fn signed_delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> UpbitResult<T> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let query = Self::build_query(params);

        let token = self.bearer_token(&query)?;
        let full_url = if query.is_empty() {
            url
        } else {
            format!("{}?{}", url, query)
        };

        debug!("DELETE (signed) {}", endpoint);

        let response = self
            .client
            .delete(&full_url)
            .header(AUTHORIZATION, token)
            .send()
            .await
            .map_err(UpbitError::from)?;

        Self::handle_response(response).await
    }

    /// 현재 설정으로 Bearer 자격증명 생성.
    fn bearer_token(&self, query: &str) -> UpbitResult<String> {
        let query = if query.is_empty() { None } else { Some(query) };
        authorization_header(&self.config.access_key, &self.config.secret_key, query)
    }

    /// API 응답 처리.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> UpbitResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(UpbitError::from)?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse response: {} - Body: {}", e, body);
                UpbitError::Parse(e.to_string())
            })
        } else if let Ok(parsed) = serde_json::from_str::<UpbitErrorBody>(&body) {
            let name = match parsed.error.name.as_str() {
                Some(s) => s.to_string(),
                None => parsed.error.name.to_string(),
            };
            Err(Self::map_error_name(name, parsed.error.message))
        } else {
            Err(UpbitError::Api {
                name: status.as_u16().to_string(),
                message: body,
            })
        }
    }

    /// 업비트 에러 이름을 UpbitError로 매핑.
    fn map_error_name(name: String, message: String) -> UpbitError {
        match name.as_str() {
            "invalid_access_key" | "expired_access_key" | "jwt_verification"
            | "invalid_query_payload" | "no_authorization_token" => {
                UpbitError::Unauthorized(message)
            }
            "insufficient_funds_bid" | "insufficient_funds_ask" => {
                UpbitError::InsufficientFunds(message)
            }
            "too_many_requests" => UpbitError::RateLimited(message),
            _ => UpbitError::Api { name, message },
        }
    }

    // ========================================================================
    // 계좌
    // ========================================================================

    /// 전체 계좌 조회.
    pub async fn get_accounts(&self) -> UpbitResult<Vec<Account>> {
        self.signed_get("/v1/accounts", &[]).await
    }

    /// 특정 통화의 잔고 조회.
    ///
    /// 통화 코드를 대문자로 정확히 일치시키며, 보유하지 않은 통화는
    /// `None`입니다.
    pub async fn get_balance(&self, currency: &str) -> UpbitResult<Option<Account>> {
        let wanted = currency.to_uppercase();
        let accounts = self.get_accounts().await?;

        Ok(accounts.into_iter().find(|acc| acc.currency == wanted))
    }

    // ========================================================================
    // 시세
    // ========================================================================

    /// 여러 마켓의 현재가 조회.
    pub async fn get_ticker(&self, markets: &[&str]) -> UpbitResult<Vec<Ticker>> {
        self.public_get("/v1/ticker", &[("markets", markets.join(","))])
            .await
    }

    /// 단일 마켓의 현재가 조회.
    ///
    /// # Errors
    /// 거래소가 빈 결과를 돌려주면 `UpbitError::MarketNotFound`.
    pub async fn get_market_price(&self, market: &str) -> UpbitResult<Ticker> {
        let tickers = self.get_ticker(&[market]).await?;

        tickers
            .into_iter()
            .next()
            .ok_or_else(|| UpbitError::MarketNotFound(market.to_string()))
    }

    /// 전체 마켓 목록 조회.
    pub async fn get_markets(&self) -> UpbitResult<Vec<MarketInfo>> {
        self.public_get("/v1/market/all", &[("isDetails", "true".to_string())])
            .await
    }

    // ========================================================================
    // 주문
    // ========================================================================

    /// 시장가 주문 제출.
    pub async fn place_order(&self, order: &MarketOrder) -> UpbitResult<OrderResponse> {
        info!(
            "Placing {} {} order for {}",
            order.side(),
            order.ord_type(),
            order.market()
        );

        let params = order.params();
        let response: OrderResponse = self.signed_post("/v1/orders", &params).await?;

        info!("Order placed successfully: {}", response.uuid);
        Ok(response)
    }

    /// 시장가 매수 (원화 금액 기준).
    pub async fn buy_market(
        &self,
        market: &str,
        amount_krw: rust_decimal::Decimal,
    ) -> UpbitResult<OrderResponse> {
        self.place_order(&MarketOrder::Buy {
            market: market.to_string(),
            amount_krw,
        })
        .await
    }

    /// 시장가 매도 (수량 기준).
    pub async fn sell_market(
        &self,
        market: &str,
        volume: rust_decimal::Decimal,
    ) -> UpbitResult<OrderResponse> {
        self.place_order(&MarketOrder::Sell {
            market: market.to_string(),
            volume,
        })
        .await
    }

    /// 주문 조회.
    pub async fn get_order(&self, uuid: &str) -> UpbitResult<OrderResponse> {
        self.signed_get("/v1/order", &[("uuid", uuid.to_string())])
            .await
    }

    /// 주문 취소.
    pub async fn cancel_order(&self, uuid: &str) -> UpbitResult<OrderResponse> {
        self.signed_delete("/v1/order", &[("uuid", uuid.to_string())])
            .await
    }
}
