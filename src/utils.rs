// src/utils.rs
use std::fmt;
use std::fmt::Write as _;
use std::net::IpAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::{HttpRequest, HttpResponse, ResponseError};
use sha2::{Digest, Sha256};

#[derive(Debug)]
pub enum RequestError {
    MissingPeerIP,
    RateLimitExceeded,
    Unauthorized,
    Storage(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPeerIP => write!(f, "Failed to extract client IP"),
            Self::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl ResponseError for RequestError {
    fn error_response(&self) -> HttpResponse {
        match self {
            Self::RateLimitExceeded => HttpResponse::TooManyRequests().body(self.to_string()),
            Self::Unauthorized => HttpResponse::Unauthorized().body(self.to_string()),
            Self::Storage(_) => HttpResponse::InternalServerError().body(self.to_string()),
            _ => HttpResponse::BadRequest().body(self.to_string()),
        }
    }
}

pub fn extract_real_ip(req: &HttpRequest) -> Result<IpAddr, RequestError> {
    // Behind the proxy the client arrives in X-Forwarded-For; take the
    // first entry. Fall back to the peer address for direct connections.
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(ip_str) = forwarded_for.to_str() {
            if let Some(first_ip) = ip_str.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return Ok(ip);
                }
            }
        }
    }

    match req.peer_addr() {
        Some(addr) => Ok(addr.ip()),
        None => Err(RequestError::MissingPeerIP),
    }
}

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        write!(&mut hex, "{:02x}", byte).expect("write to String");
    }
    hex
}

/// Compare two digest strings without short-circuiting on the first
/// mismatching byte. Length differences still return early; the digests
/// compared here are fixed-width hex.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Does `password` hash to the configured admin digest? An empty configured
/// digest matches nothing.
pub fn verify_admin_password(password: &str, admin_password_hash: &str) -> bool {
    if admin_password_hash.is_empty() {
        return false;
    }
    constant_time_eq(&sha256_hex(password), admin_password_hash)
}

/// Gate for the admin CRUD routes: the request must carry the admin
/// password in `X-Admin-Password` and it must hash to the configured
/// digest.
pub fn require_admin(req: &HttpRequest, admin_password_hash: &str) -> Result<(), RequestError> {
    let provided = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if verify_admin_password(provided, admin_password_hash) {
        Ok(())
    } else {
        Err(RequestError::Unauthorized)
    }
}

pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_digest() {
        // sha256 of the empty string.
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abcdef", "abcdef"));
        assert!(constant_time_eq("", ""));
        assert!(!constant_time_eq("abcdef", "abcdeg"));
        assert!(!constant_time_eq("abc", "abcdef"));
    }

    #[test]
    fn test_verify_admin_password() {
        let hash = sha256_hex("hunter2");
        assert!(verify_admin_password("hunter2", &hash));
        assert!(!verify_admin_password("hunter3", &hash));
        assert!(!verify_admin_password("hunter2", ""));
        assert!(!verify_admin_password("", ""));
    }
}
