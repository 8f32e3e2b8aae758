//! 업비트 API 설정.
//!
//! 업비트 Open API는 access key + secret key 쌍으로 요청을 서명합니다.
//! 두 키는 프로세스 시작 시 환경 변수에서 한 번 읽어 클라이언트에
//! 주입합니다. 깊은 호출 경로에서의 암묵적 전역 조회는 없습니다.

use std::fmt;

use crate::error::{UpbitError, UpbitResult};

/// 업비트 REST API 기본 URL.
pub const DEFAULT_BASE_URL: &str = "https://api.upbit.com";

/// access key 환경 변수 이름.
pub const ACCESS_KEY_VAR: &str = "UPBIT_ACCESS_KEY";

/// secret key 환경 변수 이름.
pub const SECRET_KEY_VAR: &str = "UPBIT_SECRET_KEY";

/// 업비트 클라이언트 설정.
///
/// # 보안
/// - `Debug` 구현은 민감 정보(`access_key`, `secret_key`)를 마스킹합니다.
#[derive(Clone)]
pub struct UpbitConfig {
    /// API access key
    pub access_key: String,
    /// API secret key (서명에만 사용, 절대 로그에 남기지 않음)
    pub secret_key: String,
    /// REST API 기본 URL (테스트에서 오버라이드)
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl fmt::Debug for UpbitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked_key = if self.access_key.len() > 8 {
            format!(
                "{}...{}",
                &self.access_key[..4],
                &self.access_key[self.access_key.len() - 4..]
            )
        } else {
            "***REDACTED***".to_string()
        };

        f.debug_struct("UpbitConfig")
            .field("access_key", &masked_key)
            .field("secret_key", &"***REDACTED***")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl UpbitConfig {
    /// 새 설정 생성.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// 기본 URL 오버라이드.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 요청 타임아웃 설정.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// 환경 변수에서 설정 생성.
    ///
    /// # 환경 변수
    /// - `UPBIT_ACCESS_KEY` (필수)
    /// - `UPBIT_SECRET_KEY` (필수)
    /// - `UPBIT_BASE_URL` (선택, 기본값 `https://api.upbit.com`)
    ///
    /// # Errors
    /// 두 키 중 하나라도 없거나 비어 있으면 두 변수 이름을 모두 담은
    /// `UpbitError::Config`를 반환합니다. 네트워크 호출 전에 실패해야
    /// 하는 치명적 설정 에러입니다.
    pub fn from_env() -> UpbitResult<Self> {
        let access_key = std::env::var(ACCESS_KEY_VAR).unwrap_or_default();
        let secret_key = std::env::var(SECRET_KEY_VAR).unwrap_or_default();

        if access_key.is_empty() || secret_key.is_empty() {
            return Err(UpbitError::Config(format!(
                "{} and {} must be set",
                ACCESS_KEY_VAR, SECRET_KEY_VAR
            )));
        }

        let mut config = Self::new(access_key, secret_key);
        if let Ok(base_url) = std::env::var("UPBIT_BASE_URL") {
            config.base_url = base_url;
        }

        Ok(config)
    }
}
