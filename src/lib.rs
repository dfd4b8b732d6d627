//! Serverless GUID translation proxy: resolves Cognito client credentials from a secret store,
//! keeps the issued bearer token cached in-process, and forwards identity lookups to the
//! upstream GUID translation service.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod issuer;
pub mod oauth;
pub mod obs;
pub mod proxy;
pub mod secrets;
pub mod server;
pub mod upstream;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
// Used by the binary target only.
use color_eyre as _;
#[cfg(test)] use {httpmock as _, tower as _};
