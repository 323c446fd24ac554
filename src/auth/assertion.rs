//! Self-signed JWT client assertions (RFC 7523) presented to the platform's token endpoint.

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rand::RngCore;
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, error::ConfigError, registration::Registration};

/// `client_assertion_type` value for JWT bearer client authentication.
pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
/// Namespace prepended to every `jti`.
pub const JTI_PREFIX: &str = "lti-service-token";
/// Backdating applied to `iat` to tolerate platform clock skew.
pub const CLOCK_SKEW: Duration = Duration::seconds(5);
/// Lifetime of an assertion measured from the real issue instant.
pub const ASSERTION_LIFETIME: Duration = Duration::seconds(60);

/// Claim set of a client assertion. Each value is built for exactly one token exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
	/// Issuer, always the tool's client id.
	pub iss: String,
	/// Subject, always the tool's client id.
	pub sub: String,
	/// Audience, the platform's authorization server identifier.
	pub aud: String,
	/// Issued-at, in Unix seconds.
	pub iat: i64,
	/// Expiry, in Unix seconds.
	pub exp: i64,
	/// Unique, unguessable assertion identifier.
	pub jti: String,
}
impl AssertionClaims {
	/// Builds claims for `registration` as of `now`, with a freshly generated `jti`.
	pub fn new<R>(registration: &R, now: OffsetDateTime) -> Self
	where
		R: ?Sized + Registration,
	{
		let client_id = registration.client_id().to_owned();

		Self {
			iss: client_id.clone(),
			sub: client_id,
			aud: registration.auth_server().to_owned(),
			iat: (now - CLOCK_SKEW).unix_timestamp(),
			exp: (now + ASSERTION_LIFETIME).unix_timestamp(),
			jti: generate_jti(),
		}
	}

	/// Signs the claims with the registration's RSA private key (RS256), advertising the
	/// registration's key id in the JOSE header.
	pub fn sign<R>(&self, registration: &R) -> Result<String, ConfigError>
	where
		R: ?Sized + Registration,
	{
		let key = EncodingKey::from_rsa_pem(registration.tool_private_key().as_bytes())
			.map_err(|source| ConfigError::InvalidPrivateKey { source })?;
		let mut header = Header::new(Algorithm::RS256);

		header.kid = Some(registration.kid().to_owned());

		jsonwebtoken::encode(&header, self, &key)
			.map_err(|source| ConfigError::AssertionSigning { source })
	}
}

fn generate_jti() -> String {
	let mut seed = [0_u8; 64];

	rand::rng().fill_bytes(&mut seed);

	format!("{JTI_PREFIX}{:x}", Sha256::digest(seed))
}
