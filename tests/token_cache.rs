// crates.io
use time::{Duration, OffsetDateTime};
// self
use guid_proxy::{auth::CachedToken, cache::TokenCache};

fn cache_with_token(value: &str, expires_in: Duration, now: OffsetDateTime) -> TokenCache {
	let cache = TokenCache::new();

	cache.store(CachedToken::new(value, now + expires_in));

	cache
}

#[test]
fn empty_cache_has_no_usable_token() {
	let cache = TokenCache::new();

	assert!(cache.usable().is_none());
	assert!(cache.snapshot().is_none());
}

#[test]
fn token_beyond_margin_is_reused() {
	let now = OffsetDateTime::now_utc();

	for seconds in [61, 120, 3600] {
		let cache = cache_with_token("fresh", Duration::seconds(seconds), now);
		let token = cache.usable_at(now).expect("Token outside the margin should be served.");

		assert_eq!(token.expose(), "fresh");
	}
}

#[test]
fn token_within_margin_forces_refresh() {
	let now = OffsetDateTime::now_utc();

	for seconds in [60, 59, 1, 0, -1, -3600] {
		let cache = cache_with_token("stale", Duration::seconds(seconds), now);

		assert!(
			cache.usable_at(now).is_none(),
			"Token expiring in {seconds}s should not be served."
		);
		assert!(cache.snapshot().is_some());
	}
}

#[test]
fn later_store_replaces_value_and_expiry_together() {
	let now = OffsetDateTime::now_utc();
	let cache = cache_with_token("token-a", Duration::seconds(30), now);

	assert!(cache.usable_at(now).is_none());

	cache.store(CachedToken::new("token-b", now + Duration::seconds(3600)));

	let snapshot = cache.snapshot().expect("Replaced token should be present.");

	assert_eq!(snapshot.value.expose(), "token-b");
	assert_eq!(snapshot.expires_at, now + Duration::seconds(3600));
	assert_eq!(
		cache.usable_at(now).expect("Replacement token should be served.").expose(),
		"token-b"
	);
}

#[test]
fn empty_token_value_is_never_served() {
	let now = OffsetDateTime::now_utc();
	let cache = cache_with_token("", Duration::seconds(3600), now);

	assert!(cache.usable_at(now).is_none());
}

#[test]
fn custom_margin_is_honored() {
	let now = OffsetDateTime::now_utc();
	let cache = TokenCache::with_safety_margin(Duration::seconds(300));

	cache.store(CachedToken::new("short", now + Duration::seconds(200)));

	assert!(cache.usable_at(now).is_none());
	assert!(cache.usable_at(now - Duration::seconds(200)).is_some());
}
