//! Process-wide, single-slot bearer token cache.
//!
//! [`TokenCache`] owns the only copy of the current [`CachedToken`]. Reads are lock-free from
//! the caller's point of view (a short `RwLock` read); replacing the token swaps value and
//! expiry together. The refresh guard serializes the read-check-exchange-write sequence so
//! concurrent requests inside one process piggy-back on a single exchange instead of racing
//! to overwrite each other.

// crates.io
use async_lock::MutexGuard as AsyncMutexGuard;
// self
use crate::{
	_prelude::*,
	auth::{CachedToken, TokenSecret},
};

/// Injectable token slot shared by every request handled in this process.
#[derive(Debug)]
pub struct TokenCache {
	slot: RwLock<Option<CachedToken>>,
	refresh_guard: AsyncMutex<()>,
	safety_margin: Duration,
}
impl TokenCache {
	/// Margin subtracted from the provider expiry before a token stops being served.
	pub const SAFETY_MARGIN: Duration = Duration::seconds(60);

	/// Creates an empty cache using [`TokenCache::SAFETY_MARGIN`].
	pub fn new() -> Self {
		Self::with_safety_margin(Self::SAFETY_MARGIN)
	}

	/// Creates an empty cache with a custom margin; negative values clamp to zero.
	pub fn with_safety_margin(margin: Duration) -> Self {
		Self {
			slot: RwLock::new(None),
			refresh_guard: AsyncMutex::new(()),
			safety_margin: if margin.is_negative() { Duration::ZERO } else { margin },
		}
	}

	/// Returns the cached token if it is still usable at `now`.
	pub fn usable_at(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		self.slot
			.read()
			.as_ref()
			.filter(|token| token.is_usable_at(now, self.safety_margin))
			.map(|token| token.value.clone())
	}

	/// Returns the cached token if it is usable right now.
	pub fn usable(&self) -> Option<TokenSecret> {
		self.usable_at(OffsetDateTime::now_utc())
	}

	/// Replaces the cached value and expiry as one unit.
	pub fn store(&self, token: CachedToken) {
		*self.slot.write() = Some(token);
	}

	/// Returns a copy of whatever the slot currently holds, usable or not.
	pub fn snapshot(&self) -> Option<CachedToken> {
		self.slot.read().clone()
	}

	/// Acquires the guard serializing refreshes within this process.
	pub(crate) async fn lock_refresh(&self) -> AsyncMutexGuard<'_, ()> {
		self.refresh_guard.lock().await
	}
}
impl Default for TokenCache {
	fn default() -> Self {
		Self::new()
	}
}
