//! Client for the accounts API (JSON envelopes over HTTP).
//!
//! # Overview
//! Every call goes through one pipeline: a `Request` describes the call,
//! `ApiClient::dispatch` encodes it into a `{"data": …}` envelope, sends it,
//! classifies a mismatching status into an `ErrorKind`, and decodes the
//! response envelope into `Record<A>` values for whatever attribute type the
//! caller asks for. The account calls (`create_account`, `fetch_account`,
//! `list_accounts`, `list_accounts_page`, `delete_account`) are thin wrappers
//! over that pipeline.
//!
//! # Design
//! - `ApiClient` holds only an immutable config and a connection pool, so it
//!   is `Clone + Send + Sync` and safe to share between tasks.
//! - `Request::build` / `Request::parse` are pure; callers that own their
//!   HTTP stack can drive them directly (host-does-IO) and skip `dispatch`.
//! - Server metadata (`Metadata`) can only be produced by decoding, so it
//!   cannot be forged on values used as request payloads.
//! - No retries, no caching.

pub mod account;
pub mod client;
pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod http;
pub mod list;
pub mod request;

pub use account::{Account, AccountValidator, ValidationError};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use context::CallContext;
pub use envelope::{Links, Metadata, Record};
pub use error::{classify, Error, ErrorKind, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use list::ListOptions;
pub use request::Request;
pub use tokio_util::sync::CancellationToken;
