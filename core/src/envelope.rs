//! Envelope codec for the `{"data": …, "links": …}` wire format.
//!
//! # Design
//! The envelope layer only knows the transport metadata (type, id,
//! organisation, version, timestamps). Attributes stay a raw JSON value until
//! the record is handed to `fill`, which deserializes them into the caller's
//! type and stamps the metadata. Missing or `null` attributes decode as an
//! empty object, and missing timestamps as the Unix epoch. `Metadata` has no public constructor, so the
//! only way to obtain one is to decode a server response.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Navigation links attached to a response (`self`, `first`, `next`, …).
pub type Links = HashMap<String, String>;

#[derive(Serialize)]
struct RequestEnvelope<'a, A> {
    data: RequestRecord<'a, A>,
}

#[derive(Serialize)]
struct RequestRecord<'a, A> {
    #[serde(rename = "type")]
    resource_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organisation_id: Option<Uuid>,
    attributes: &'a A,
}

#[derive(Deserialize)]
struct ResponseEnvelope<T> {
    data: T,
    #[serde(default)]
    links: Links,
}

#[derive(Deserialize)]
struct ResourceRecord {
    #[serde(rename = "type")]
    resource_type: String,
    id: Uuid,
    organisation_id: Uuid,
    #[serde(default)]
    version: u64,
    #[serde(default)]
    created_on: DateTime<Utc>,
    #[serde(default)]
    modified_on: DateTime<Utc>,
    #[serde(default)]
    attributes: Value,
}

/// Server-assigned transport metadata of a decoded record. Read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    resource_type: String,
    id: Uuid,
    organisation_id: Uuid,
    version: u64,
    created_on: DateTime<Utc>,
    modified_on: DateTime<Utc>,
}

impl Metadata {
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn organisation_id(&self) -> Uuid {
        self.organisation_id
    }

    /// Optimistic concurrency token; required to delete the record.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    pub fn modified_on(&self) -> DateTime<Utc> {
        self.modified_on
    }
}

/// A decoded resource: server metadata plus the caller's attribute type.
///
/// Derefs to the attributes, so `record.country` reads straight through.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<A> {
    meta: Metadata,
    pub attributes: A,
}

impl<A> Record<A> {
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    pub fn id(&self) -> Uuid {
        self.meta.id
    }

    pub fn version(&self) -> u64 {
        self.meta.version
    }

    pub fn into_attributes(self) -> A {
        self.attributes
    }
}

impl<A> Deref for Record<A> {
    type Target = A;

    fn deref(&self) -> &A {
        &self.attributes
    }
}

impl<A> DerefMut for Record<A> {
    fn deref_mut(&mut self) -> &mut A {
        &mut self.attributes
    }
}

/// Wrap `attributes` into a single-record request envelope.
pub fn encode<A: Serialize>(
    resource_type: &str,
    id: Option<Uuid>,
    organisation_id: Option<Uuid>,
    attributes: &A,
) -> serde_json::Result<String> {
    serde_json::to_string(&RequestEnvelope {
        data: RequestRecord {
            resource_type,
            id,
            organisation_id,
            attributes,
        },
    })
}

/// Decode a single-record envelope into `Record<A>`.
pub fn decode_single<A: DeserializeOwned>(body: &[u8]) -> serde_json::Result<(Record<A>, Links)> {
    let envelope: ResponseEnvelope<ResourceRecord> = serde_json::from_slice(body)?;
    let record = fill(envelope.data)?;
    Ok((record, envelope.links))
}

/// Decode a list envelope, handing each record to `on_item` in response order.
///
/// Every item gets a fresh `A` and its own record's metadata. Decoding stops
/// at the first record whose attributes do not fit `A`.
pub fn decode_list<A, F>(body: &[u8], mut on_item: F) -> serde_json::Result<Links>
where
    A: DeserializeOwned,
    F: FnMut(Record<A>),
{
    let envelope: ResponseEnvelope<Option<Vec<ResourceRecord>>> = serde_json::from_slice(body)?;
    for item in envelope.data.unwrap_or_default() {
        on_item(fill(item)?);
    }
    Ok(envelope.links)
}

fn fill<A: DeserializeOwned>(record: ResourceRecord) -> serde_json::Result<Record<A>> {
    let attributes = match record.attributes {
        Value::Null => serde_json::from_value(Value::Object(Map::new()))?,
        value => serde_json::from_value(value)?,
    };
    Ok(Record {
        meta: Metadata {
            resource_type: record.resource_type,
            id: record.id,
            organisation_id: record.organisation_id,
            version: record.version,
            created_on: record.created_on,
            modified_on: record.modified_on,
        },
        attributes,
    })
}
