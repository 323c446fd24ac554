//! Tool registration data consumed by the connector.
//!
//! The connector only reads five values from a registration: the client id, the authorization
//! server audience, the token endpoint, the tool's RSA private key, and its key id. Anything
//! that can answer those questions implements [`Registration`]; [`ToolRegistration`] is the
//! plain, validated data holder shipped with the crate.

// self
use crate::_prelude::*;

/// Read-only view over a platform registration.
pub trait Registration
where
	Self: Send + Sync,
{
	/// OAuth client id issued to the tool by the platform.
	fn client_id(&self) -> &str;

	/// Audience (`aud`) expected by the platform's authorization server.
	fn auth_server(&self) -> &str;

	/// Token endpoint accepting client-credentials exchanges.
	fn auth_token_url(&self) -> &Url;

	/// PEM-encoded RSA private key used to sign client assertions.
	fn tool_private_key(&self) -> &str;

	/// Key id published alongside the tool's public key.
	fn kid(&self) -> &str;
}

/// Errors raised while building a [`ToolRegistration`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RegistrationError {
	/// A required field was never set.
	#[error("Registration is missing the {field} field.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
	},
	/// A field was set to an empty or whitespace-only value.
	#[error("Registration field {field} cannot be empty.")]
	EmptyField {
		/// Name of the empty field.
		field: &'static str,
	},
	/// The token endpoint cannot carry a form POST.
	#[error("The token endpoint must use http or https: {url}.")]
	UnsupportedTokenUrl {
		/// Offending URL.
		url: String,
	},
}

/// Immutable registration record.
#[derive(Clone, PartialEq, Eq)]
pub struct ToolRegistration {
	client_id: String,
	auth_server: String,
	auth_token_url: Url,
	tool_private_key: String,
	kid: String,
}
impl ToolRegistration {
	/// Creates an empty builder.
	pub fn builder() -> ToolRegistrationBuilder {
		ToolRegistrationBuilder::default()
	}
}
impl Registration for ToolRegistration {
	fn client_id(&self) -> &str {
		&self.client_id
	}

	fn auth_server(&self) -> &str {
		&self.auth_server
	}

	fn auth_token_url(&self) -> &Url {
		&self.auth_token_url
	}

	fn tool_private_key(&self) -> &str {
		&self.tool_private_key
	}

	fn kid(&self) -> &str {
		&self.kid
	}
}
impl Debug for ToolRegistration {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ToolRegistration")
			.field("client_id", &self.client_id)
			.field("auth_server", &self.auth_server)
			.field("auth_token_url", &self.auth_token_url.as_str())
			.field("tool_private_key", &"<redacted>")
			.field("kid", &self.kid)
			.finish()
	}
}

/// Builder for [`ToolRegistration`] values.
#[derive(Default)]
pub struct ToolRegistrationBuilder {
	client_id: Option<String>,
	auth_server: Option<String>,
	auth_token_url: Option<Url>,
	tool_private_key: Option<String>,
	kid: Option<String>,
}
impl ToolRegistrationBuilder {
	/// Sets the client id.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Sets the authorization server audience.
	pub fn auth_server(mut self, value: impl Into<String>) -> Self {
		self.auth_server = Some(value.into());

		self
	}

	/// Sets the token endpoint.
	pub fn auth_token_url(mut self, url: Url) -> Self {
		self.auth_token_url = Some(url);

		self
	}

	/// Sets the PEM-encoded private key.
	pub fn tool_private_key(mut self, pem: impl Into<String>) -> Self {
		self.tool_private_key = Some(pem.into());

		self
	}

	/// Sets the key id.
	pub fn kid(mut self, value: impl Into<String>) -> Self {
		self.kid = Some(value.into());

		self
	}

	/// Consumes the builder and validates the resulting registration.
	pub fn build(self) -> Result<ToolRegistration, RegistrationError> {
		let auth_token_url =
			self.auth_token_url.ok_or(RegistrationError::MissingField { field: "auth_token_url" })?;

		if !matches!(auth_token_url.scheme(), "http" | "https") {
			return Err(RegistrationError::UnsupportedTokenUrl { url: auth_token_url.to_string() });
		}

		Ok(ToolRegistration {
			client_id: required("client_id", self.client_id)?,
			auth_server: required("auth_server", self.auth_server)?,
			auth_token_url,
			tool_private_key: required("tool_private_key", self.tool_private_key)?,
			kid: required("kid", self.kid)?,
		})
	}
}
impl Debug for ToolRegistrationBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ToolRegistrationBuilder")
			.field("client_id", &self.client_id)
			.field("auth_server", &self.auth_server)
			.field("auth_token_url", &self.auth_token_url)
			.field("tool_private_key_set", &self.tool_private_key.is_some())
			.field("kid", &self.kid)
			.finish()
	}
}

fn required(field: &'static str, value: Option<String>) -> Result<String, RegistrationError> {
	let value = value.ok_or(RegistrationError::MissingField { field })?;

	if value.trim().is_empty() {
		return Err(RegistrationError::EmptyField { field });
	}

	Ok(value)
}
