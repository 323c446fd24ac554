//! Structured service responses and the pure helpers that parse them.
//!
//! Platform responses are split into a raw header block and a body block. Headers are kept as
//! the ordered sequence of non-empty raw lines, status line first, and looked up
//! case-insensitively. Bodies are parsed as JSON on a best-effort basis: anything that does not
//! parse yields `None`, never an error.

// std
use std::sync::LazyLock;
// crates.io
use oauth2::HttpResponse;
use regex::Regex;
use serde_json::Value;
// self
use crate::_prelude::*;

static NEXT_PAGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"(?i)^Link:.*<([^>]*)>; ?rel="next""#).expect("Next-page pattern is valid.")
});

/// Response returned by a platform service call, whatever its HTTP status.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw header lines in arrival order.
	pub headers: ResponseHeaders,
	/// Parsed JSON body, or `None` when the body is empty or not valid JSON.
	pub body: Option<Value>,
}
impl ServiceResponse {
	/// Builds a response from a raw header block and body block.
	pub fn from_parts(status: u16, header_block: &str, body: &[u8]) -> Self {
		Self { status, headers: ResponseHeaders::parse(header_block), body: parse_body(body) }
	}

	/// Splits a transport response into header and body blocks.
	pub fn from_http(response: HttpResponse) -> Self {
		let status = response.status().as_u16();
		let header_block = render_header_block(&response);

		Self::from_parts(status, &header_block, response.body())
	}

	/// Returns true for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// URL of the next page advertised by the `Link` header, if any.
	pub fn next_page_url(&self) -> Option<String> {
		self.headers.next_page_url()
	}
}

/// Ordered raw header lines with case-insensitive lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseHeaders(Vec<String>);
impl ResponseHeaders {
	/// Parses a CRLF-delimited header block, dropping empty lines.
	pub fn parse(block: &str) -> Self {
		Self(block.split("\r\n").filter(|line| !line.is_empty()).map(str::to_owned).collect())
	}

	/// Raw lines in arrival order.
	pub fn lines(&self) -> &[String] {
		&self.0
	}

	/// First value of the named header; the name is matched case-insensitively.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.get_all(name).next()
	}

	/// Every value of the named header, in arrival order.
	pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
		self.0.iter().filter_map(move |line| {
			let (key, value) = line.split_once(':')?;

			key.trim().eq_ignore_ascii_case(name).then_some(value.trim())
		})
	}

	/// URL of the next page advertised by the `Link` header, if any.
	pub fn next_page_url(&self) -> Option<String> {
		next_page_url(&self.0)
	}
}
impl From<Vec<String>> for ResponseHeaders {
	fn from(lines: Vec<String>) -> Self {
		Self(lines.into_iter().filter(|line| !line.is_empty()).collect())
	}
}

/// Scans header lines for `Link: ...<URL>...; rel="next"` and returns the URL of the first
/// match. No match means the current page is the last one.
pub fn next_page_url<S>(lines: &[S]) -> Option<String>
where
	S: AsRef<str>,
{
	lines.iter().find_map(|line| {
		NEXT_PAGE_LINK.captures(line.as_ref()).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_owned())
	})
}

fn parse_body(body: &[u8]) -> Option<Value> {
	match serde_json::from_slice(body) {
		Ok(value) => Some(value),
		Err(_e) => {
			#[cfg(feature = "tracing")]
			tracing::debug!(error = %_e, len = body.len(), "Service response body is not JSON.");

			None
		},
	}
}

fn render_header_block(response: &HttpResponse) -> String {
	let mut block = format!("{:?} {}\r\n", response.version(), response.status());

	for (name, value) in response.headers() {
		block.push_str(&canonical_name(name.as_str()));
		block.push_str(": ");
		block.push_str(&String::from_utf8_lossy(value.as_bytes()));
		block.push_str("\r\n");
	}

	block.push_str("\r\n");

	block
}

// `http` lowercases names; restore the conventional `Content-Type` casing for raw lines.
fn canonical_name(name: &str) -> String {
	name.split('-')
		.map(|part| {
			let mut chars = part.chars();

			match chars.next() {
				Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join("-")
}
