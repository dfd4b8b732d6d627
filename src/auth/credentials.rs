//! OAuth client credential pair read from the secret store.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Client identifier + secret used for the client-credentials grant.
///
/// Values are transient: resolved on a cache miss, handed to the issuer, and dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret; never logged.
	pub client_secret: TokenSecret,
}
impl CredentialPair {
	/// Creates a new pair.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: TokenSecret::new(client_secret) }
	}
}
impl Debug for CredentialPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialPair")
			.field("client_id", &"<redacted>")
			.field("client_secret", &"<redacted>")
			.finish()
	}
}
