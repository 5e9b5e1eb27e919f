//! Request description: what to send, what to expect, where to put the result.
//!
//! # Design
//! A `Request` starts as `GET` expecting `200` and is shaped by named setters.
//! Setters are independent and last-write-wins. The payload is only borrowed
//! here and serialized in `build`, so assembling a request cannot fail.
//! Response sinks are type-erased decoders: `decode_into` fills a single
//! slot, `decode_each` feeds a per-item callback, and setting one replaces
//! the other. `links_into` captures the envelope's navigation links from
//! whichever sink runs.
//!
//! `build` and `parse` are pure. `ApiClient::dispatch` runs the network hop
//! between them; a host that does its own I/O can call them directly.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::envelope::{self, Links, Record};
use crate::error::{classify, Error};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Attribute payload serialized into a request envelope.
pub trait Payload {
    fn encode_envelope(
        &self,
        resource_type: &str,
        id: Option<Uuid>,
        organisation_id: Option<Uuid>,
    ) -> serde_json::Result<String>;
}

impl<T: Serialize> Payload for T {
    fn encode_envelope(
        &self,
        resource_type: &str,
        id: Option<Uuid>,
        organisation_id: Option<Uuid>,
    ) -> serde_json::Result<String> {
        envelope::encode(resource_type, id, organisation_id, self)
    }
}

type Decoder<'a> = Box<dyn FnOnce(&[u8]) -> serde_json::Result<Links> + Send + 'a>;

/// Description of one API call. Consumed by `parse` or `ApiClient::dispatch`.
pub struct Request<'a> {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    resource_type: String,
    id: Option<Uuid>,
    organisation_id: Option<Uuid>,
    payload: Option<&'a (dyn Payload + Sync)>,
    expected_status: u16,
    sink: Option<Decoder<'a>>,
    links: Option<&'a mut Links>,
}

impl<'a> Request<'a> {
    /// `path` is appended to the client's base URL, e.g. `/v1/organisation/accounts`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            query: Vec::new(),
            resource_type: String::new(),
            id: None,
            organisation_id: None,
            payload: None,
            expected_status: 200,
            sink: None,
            links: None,
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set a query parameter, replacing any earlier value for `key`.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let key = key.into();
        let value = value.to_string();
        match self.query.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.query.push((key, value)),
        }
        self
    }

    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn organisation_id(mut self, organisation_id: Uuid) -> Self {
        self.organisation_id = Some(organisation_id);
        self
    }

    /// Attributes to send as the request body.
    pub fn payload<T: Serialize + Sync>(mut self, attributes: &'a T) -> Self {
        self.payload = Some(attributes);
        self
    }

    pub fn expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// Decode a single-record response into `slot`.
    pub fn decode_into<A>(mut self, slot: &'a mut Option<Record<A>>) -> Self
    where
        A: DeserializeOwned + Send + 'a,
    {
        self.sink = Some(Box::new(move |body: &[u8]| {
            let (record, links) = envelope::decode_single(body)?;
            *slot = Some(record);
            Ok(links)
        }));
        self
    }

    /// Decode a list response, calling `on_item` once per record in order.
    pub fn decode_each<A, F>(mut self, on_item: F) -> Self
    where
        A: DeserializeOwned + 'a,
        F: FnMut(Record<A>) + Send + 'a,
    {
        self.sink = Some(Box::new(move |body: &[u8]| {
            envelope::decode_list(body, on_item)
        }));
        self
    }

    /// Store the response's `links` in `slot` once the sink has decoded.
    ///
    /// Left untouched when there is no sink or decoding fails.
    pub fn links_into(mut self, slot: &'a mut Links) -> Self {
        self.links = Some(slot);
        self
    }

    pub fn get_method(&self) -> HttpMethod {
        self.method
    }

    pub fn get_path(&self) -> &str {
        &self.path
    }

    pub fn get_query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn get_resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn get_id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn get_organisation_id(&self) -> Option<Uuid> {
        self.organisation_id
    }

    pub fn get_expected_status(&self) -> u16 {
        self.expected_status
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn has_links_slot(&self) -> bool {
        self.links.is_some()
    }

    /// Lower to a plain `HttpRequest` against `base_url`.
    ///
    /// Fails with `Encoding` if the payload does not serialize and with
    /// `InvalidUrl` if the target does not parse; nothing is sent either way.
    pub fn build(&self, base_url: &str) -> Result<HttpRequest, Error> {
        let body = match self.payload {
            Some(payload) => Some(
                payload
                    .encode_envelope(&self.resource_type, self.id, self.organisation_id)
                    .map_err(Error::Encoding)?,
            ),
            None => None,
        };

        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        Ok(HttpRequest {
            method: self.method,
            url: self.url(base_url)?,
            headers,
            body,
        })
    }

    /// Check the status against the expected one and run the sink, if any.
    ///
    /// `url` is only used for error context.
    pub fn parse(self, url: &str, response: HttpResponse) -> Result<(), Error> {
        if response.status != self.expected_status {
            return Err(Error::Status {
                kind: classify(response.status),
                status: response.status,
                status_text: response.status_text().to_string(),
                url: url.to_string(),
                body: response.body,
            });
        }

        let Some(decode) = self.sink else {
            return Ok(());
        };
        let links = decode(response.body.as_bytes()).map_err(|source| Error::Decoding {
            url: url.to_string(),
            source,
        })?;
        if let Some(slot) = self.links {
            *slot = links;
        }
        Ok(())
    }

    fn url(&self, base_url: &str) -> Result<String, Error> {
        let raw = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        let mut url = Url::parse(&raw).map_err(|source| Error::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url.into())
    }
}

impl fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("resource_type", &self.resource_type)
            .field("id", &self.id)
            .field("organisation_id", &self.organisation_id)
            .field("has_payload", &self.has_payload())
            .field("expected_status", &self.expected_status)
            .field("has_sink", &self.has_sink())
            .field("has_links_slot", &self.has_links_slot())
            .finish()
    }
}
