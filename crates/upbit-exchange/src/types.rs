//! 업비트 API 요청/응답 타입.
//!
//! 금액/수량 필드는 전부 `Decimal`입니다. 업비트는 계좌/주문 응답의
//! 수치를 문자열로 내려주므로 `rust_decimal::serde::str` 계열로
//! 매핑합니다. 시세 응답은 JSON 숫자입니다.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Deserialize;

/// 계좌 (자산별 잔고).
///
/// 매 조회마다 거래소에서 새로 받아옵니다. 명령 간 캐시는 없습니다.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    /// 통화 코드 (예: "KRW", "BTC")
    pub currency: String,
    /// 주문 가능 잔고
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    /// 주문에 묶인 잔고
    #[serde(with = "rust_decimal::serde::str")]
    pub locked: Decimal,
    /// 평균 매수가
    #[serde(with = "rust_decimal::serde::str")]
    pub avg_buy_price: Decimal,
    /// 평균 매수가 수정 여부
    pub avg_buy_price_modified: bool,
    /// 평균 매수가 기준 통화
    pub unit_currency: String,
}

impl Account {
    /// 총 잔고 (주문 가능 + 묶인 잔고).
    pub fn total(&self) -> Decimal {
        self.balance + self.locked
    }
}

/// 전일 대비 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeDirection {
    Rise,
    Even,
    Fall,
}

/// 현재가 스냅샷.
///
/// 같은 마켓을 다시 조회하면 이전 스냅샷은 무효입니다.
#[derive(Debug, Clone, Deserialize)]
pub struct Ticker {
    /// 마켓 코드 (예: "KRW-BTC")
    pub market: String,
    /// 최근 체결가
    pub trade_price: Decimal,
    /// 전일 대비 방향
    pub change: ChangeDirection,
    /// 변화액 (절대값)
    pub change_price: Decimal,
    /// 변화율 (절대값)
    pub change_rate: Decimal,
    /// 부호가 있는 변화액
    pub signed_change_price: Decimal,
    /// 부호가 있는 변화율
    pub signed_change_rate: Decimal,
    /// 가장 최근 거래량
    pub trade_volume: Decimal,
    /// 24시간 누적 거래대금
    pub acc_trade_price_24h: Decimal,
    /// 24시간 누적 거래량
    pub acc_trade_volume_24h: Decimal,
    /// 타임스탬프 (밀리초)
    pub timestamp: i64,
}

/// 시장가 주문 요청.
///
/// 업비트 시장가 주문은 방향에 따라 단위가 다릅니다: 매수는 원화 금액
/// (`ord_type=price`), 매도는 기초 자산 수량(`ord_type=market`).
/// variant별로 해당 값 하나만 담기므로 둘을 동시에 보낼 수 없습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketOrder {
    /// 원화 금액 기준 시장가 매수
    Buy { market: String, amount_krw: Decimal },
    /// 수량 기준 시장가 매도
    Sell { market: String, volume: Decimal },
}

impl MarketOrder {
    /// 주문 대상 마켓 코드.
    pub fn market(&self) -> &str {
        match self {
            MarketOrder::Buy { market, .. } | MarketOrder::Sell { market, .. } => market,
        }
    }

    /// 주문 방향 (`bid`=매수, `ask`=매도).
    pub fn side(&self) -> &'static str {
        match self {
            MarketOrder::Buy { .. } => "bid",
            MarketOrder::Sell { .. } => "ask",
        }
    }

    /// 주문 유형 (`price`=금액 지정 시장가 매수, `market`=수량 지정 시장가 매도).
    pub fn ord_type(&self) -> &'static str {
        match self {
            MarketOrder::Buy { .. } => "price",
            MarketOrder::Sell { .. } => "market",
        }
    }

    /// 요청 파라미터 (서명 해시와 본문에 같은 순서로 사용).
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("market", self.market().to_string()),
            ("side", self.side().to_string()),
            ("ord_type", self.ord_type().to_string()),
        ];

        match self {
            MarketOrder::Buy { amount_krw, .. } => {
                params.push(("price", amount_krw.to_string()));
            }
            MarketOrder::Sell { volume, .. } => {
                params.push(("volume", volume.to_string()));
            }
        }

        params
    }
}

/// 주문 응답.
///
/// `state`는 거래소가 관리하는 문자열이며 로컬에서 검증하지 않습니다.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    /// 거래소가 부여한 주문 식별자 (조회/취소에 사용)
    pub uuid: String,
    /// 주문 방향
    pub side: String,
    /// 주문 유형
    pub ord_type: String,
    /// 주문 금액 (매수) 또는 지정가
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub price: Option<Decimal>,
    /// 주문 상태
    pub state: String,
    /// 마켓 코드
    pub market: String,
    /// 주문 생성 시각
    pub created_at: DateTime<FixedOffset>,
    /// 주문 수량 (매도)
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub volume: Option<Decimal>,
    /// 미체결 수량
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub remaining_volume: Option<Decimal>,
    /// 예약된 수수료
    #[serde(with = "rust_decimal::serde::str")]
    pub reserved_fee: Decimal,
    /// 남은 수수료
    #[serde(with = "rust_decimal::serde::str")]
    pub remaining_fee: Decimal,
    /// 지불된 수수료
    #[serde(with = "rust_decimal::serde::str")]
    pub paid_fee: Decimal,
    /// 주문에 묶인 금액/수량
    #[serde(with = "rust_decimal::serde::str")]
    pub locked: Decimal,
    /// 체결된 수량
    #[serde(with = "rust_decimal::serde::str")]
    pub executed_volume: Decimal,
    /// 체결 횟수
    pub trades_count: u32,
}

/// 마켓 목록 항목.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketInfo {
    /// 마켓 코드
    pub market: String,
    /// 한글 이름
    pub korean_name: String,
    /// 영문 이름
    pub english_name: String,
}
