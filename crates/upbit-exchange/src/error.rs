//! 업비트 커넥터 에러 타입.

use thiserror::Error;

/// 업비트 API 작업을 위한 Result 타입.
pub type UpbitResult<T> = Result<T, UpbitError>;

/// 업비트 커넥터 에러.
#[derive(Debug, Error)]
pub enum UpbitError {
    /// 설정 에러 (자격증명 누락 등) - 네트워크 호출 전에 발생
    #[error("Configuration error: {0}")]
    Config(String),

    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 인증/권한 에러
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 요청 한도 초과
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// 잔고 부족 (거래소가 주문을 거부한 경우)
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// 거래소 에러 페이로드 (원문 보존)
    #[error("Upbit API error {name}: {message}")]
    Api { name: String, message: String },

    /// 응답 역직렬화 실패
    #[error("Parse error: {0}")]
    Parse(String),

    /// 요청한 마켓이 상장되어 있지 않음
    #[error("Market not found: {0}")]
    MarketNotFound(String),

    /// 알 수 없는 에러
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for UpbitError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpbitError::Timeout(err.to_string())
        } else if err.is_connect() {
            UpbitError::Network(err.to_string())
        } else {
            UpbitError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for UpbitError {
    fn from(err: serde_json::Error) -> Self {
        UpbitError::Parse(err.to_string())
    }
}
