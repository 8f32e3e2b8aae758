//! 인증 요청 서명.
//!
//! 업비트 인증 API는 JWT 형식의 Bearer 자격증명을 요구합니다 (HS256).
//! 페이로드는 access key와 호출마다 새로 생성되는 nonce를 담고, 요청에
//! 파라미터가 있으면 쿼리 문자열의 SHA-512 해시를 함께 묶어 자격증명이
//! 다른 파라미터로 재사용되는 것을 막습니다.
//!
//! nonce는 카운터가 아닌 UUID v4입니다. 여러 프로세스가 같은 키를
//! 공유해도 중복이 발생하지 않습니다.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};
use uuid::Uuid;

use crate::error::{UpbitError, UpbitResult};

type HmacSha256 = Hmac<Sha256>;

/// JWT 헤더. 업비트는 HS256 고정입니다.
#[derive(Serialize)]
struct TokenHeader {
    alg: &'static str,
    typ: &'static str,
}

/// JWT 페이로드.
#[derive(Serialize)]
struct TokenPayload<'a> {
    access_key: &'a str,
    nonce: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_hash_alg: Option<&'static str>,
}

/// 쿼리 문자열의 SHA-512 해시 (소문자 16진수).
pub(crate) fn query_hash(query: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(query.as_bytes());
    hex::encode(hasher.finalize())
}

/// `Authorization` 헤더 값(`Bearer <header>.<payload>.<signature>`) 생성.
///
/// `query`가 있으면 페이로드에 `query_hash`/`query_hash_alg`를 포함해
/// 자격증명을 해당 파라미터 집합에 바인딩합니다. 없으면 두 필드를
/// 생략합니다.
///
/// # Errors
/// secret key가 비어 있으면 네트워크 호출 전에 `UpbitError::Config`로
/// 즉시 실패합니다. secret key는 반환값이나 로그에 포함되지 않습니다.
pub fn authorization_header(
    access_key: &str,
    secret_key: &str,
    query: Option<&str>,
) -> UpbitResult<String> {
    if secret_key.is_empty() {
        return Err(UpbitError::Config(
            "secret key is not configured".to_string(),
        ));
    }

    let header = TokenHeader {
        alg: "HS256",
        typ: "JWT",
    };

    let payload = TokenPayload {
        access_key,
        nonce: Uuid::new_v4().to_string(),
        query_hash: query.map(query_hash),
        query_hash_alg: query.map(|_| "SHA512"),
    };

    let encoded_header = URL_SAFE_NO_PAD.encode(serde_json::to_string(&header)?);
    let encoded_payload = URL_SAFE_NO_PAD.encode(serde_json::to_string(&payload)?);
    let signing_input = format!("{}.{}", encoded_header, encoded_payload);

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| UpbitError::Config(format!("invalid secret key: {}", e)))?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("Bearer {}.{}", signing_input, signature))
}
