//! Cached bearer token value with its provider-assigned expiry.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Bearer token plus the absolute instant its validity ends.
///
/// Value and expiry always travel together; the cache replaces both as one unit.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
	/// Opaque bearer token issued by the provider.
	pub value: TokenSecret,
	/// Absolute expiry instant derived from the provider's `expires_in`.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Lifetime assumed when the provider omits `expires_in`.
	pub const DEFAULT_LIFETIME: Duration = Duration::seconds(3600);

	/// Creates a token expiring at `expires_at`.
	pub fn new(value: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { value: TokenSecret::new(value), expires_at }
	}

	/// Creates a token issued at `issued_at` that lives for `expires_in`.
	pub fn issued(value: TokenSecret, issued_at: OffsetDateTime, expires_in: Duration) -> Self {
		Self { value, expires_at: issued_at.saturating_add(expires_in) }
	}

	/// Returns `true` while `now < expires_at - margin`.
	pub fn is_usable_at(&self, now: OffsetDateTime, margin: Duration) -> bool {
		!self.value.is_empty() && now < self.expires_at.saturating_sub(margin)
	}

	/// Time left before the token expires, measured from `now`.
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		self.expires_at - now
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("value", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
