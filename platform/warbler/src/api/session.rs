use std::sync::Arc;

use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use hyper::header::{self, HeaderMap, HeaderValue};
use jwt::{Claims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use sha2::Sha256;

use crate::config::SessionConfig;
use crate::global::ApiGlobal;

const FLASHES_CLAIM: &str = "flashes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
	Success,
	Info,
	Warning,
	Danger,
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Flash {
	pub category: FlashCategory,
	pub message: String,
}

impl Flash {
	pub fn new(category: FlashCategory, message: impl Into<String>) -> Self {
		Self {
			category,
			message: message.into(),
		}
	}
}

/// Everything the session cookie carries between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
	pub user_id: Option<i64>,
	pub flashes: Vec<Flash>,
}

impl SessionState {
	pub fn is_empty(&self) -> bool {
		self.user_id.is_none() && self.flashes.is_empty()
	}
}

pub trait JwtState: Sized {
	fn to_claims(&self) -> Claims;

	fn from_claims(claims: &Claims) -> Option<Self>;

	fn serialize<G: ApiGlobal>(&self, global: &Arc<G>) -> Option<String> {
		let config = global.config::<SessionConfig>();

		let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes()).ok()?;
		let mut claims = self.to_claims();

		claims.registered.issuer = Some(config.issuer.clone());

		let now = Utc::now().timestamp();

		if claims.registered.issued_at.is_none() {
			claims.registered.issued_at = Some(now as u64);
		}

		if claims.registered.expiration.is_none() {
			claims.registered.expiration = Some((now + config.max_age_secs) as u64);
		}

		claims.sign_with_key(&key).ok()
	}

	fn verify<G: ApiGlobal>(global: &Arc<G>, token: &str) -> Option<Self> {
		let config = global.config::<SessionConfig>();

		let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes()).ok()?;
		let token: Token<Header, Claims, _> = token.verify_with_key(&key).ok()?;

		let claims = token.claims();

		if claims.registered.issuer.as_ref() != Some(&config.issuer) {
			return None;
		}

		let iat = Utc.timestamp_opt(claims.registered.issued_at? as i64, 0).single()?;
		if iat > Utc::now() {
			return None;
		}

		let exp = claims
			.registered
			.expiration
			.and_then(|x| Utc.timestamp_opt(x as i64, 0).single());
		if let Some(exp) = exp {
			if exp < Utc::now() {
				return None;
			}
		}

		Self::from_claims(claims)
	}
}

impl JwtState for SessionState {
	fn to_claims(&self) -> Claims {
		let mut claims = Claims::new(RegisteredClaims {
			subject: self.user_id.map(|id| id.to_string()),
			..Default::default()
		});

		if !self.flashes.is_empty() {
			if let Ok(flashes) = serde_json::to_value(&self.flashes) {
				claims.private.insert(FLASHES_CLAIM.to_string(), flashes);
			}
		}

		claims
	}

	fn from_claims(claims: &Claims) -> Option<Self> {
		let user_id = match &claims.registered.subject {
			Some(subject) => Some(subject.parse().ok()?),
			None => None,
		};

		let flashes = match claims.private.get(FLASHES_CLAIM) {
			Some(flashes) => serde_json::from_value(flashes.clone()).ok()?,
			None => Vec::new(),
		};

		Some(Self { user_id, flashes })
	}
}

/// Finds the value of the named cookie among the request's `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	headers
		.get_all(header::COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(key, _)| *key == name)
		.map(|(_, value)| value)
}

/// The `Set-Cookie` value storing `token`, or expiring the cookie when there
/// is no token.
pub fn session_cookie(config: &SessionConfig, token: Option<&str>) -> Option<HeaderValue> {
	let mut cookie = match token {
		Some(token) => format!(
			"{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
			config.cookie_name, token, config.max_age_secs
		),
		None => format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", config.cookie_name),
	};

	if config.secure {
		cookie.push_str("; Secure");
	}

	HeaderValue::from_str(&cookie).ok()
}
