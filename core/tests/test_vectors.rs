//! Verify `Request::build` / `Request::parse` against JSON test vectors in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use accounts_client::{Account, ErrorKind, HttpMethod, HttpResponse, Record, Request};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080";

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn parse_kind(s: &str) -> ErrorKind {
    match s {
        "NotFound" => ErrorKind::NotFound,
        "Conflict" => ErrorKind::Conflict,
        "Unexpected" => ErrorKind::Unexpected,
        "Decoding" => ErrorKind::Decoding,
        other => panic!("unknown error kind: {other}"),
    }
}

fn simulated(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn uuid_field(value: &serde_json::Value) -> Option<Uuid> {
    value.as_str().map(|s| s.parse().unwrap())
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let expected_req = &case["expected_request"];

        let attributes: Option<Account> = if input["attributes"].is_null() {
            None
        } else {
            Some(serde_json::from_value(input["attributes"].clone()).unwrap())
        };

        let mut request = Request::new(input["path"].as_str().unwrap())
            .method(parse_method(input["method"].as_str().unwrap()))
            .resource_type(input["type"].as_str().unwrap())
            .expected_status(input["expected_status"].as_u64().unwrap() as u16);
        for pair in input["query"].as_array().unwrap() {
            request = request.query(pair[0].as_str().unwrap(), pair[1].as_str().unwrap());
        }
        if let Some(id) = uuid_field(&input["id"]) {
            request = request.id(id);
        }
        if let Some(org) = uuid_field(&input["organisation_id"]) {
            request = request.organisation_id(org);
        }
        if let Some(attributes) = &attributes {
            request = request.payload(attributes);
        }

        let req = request.build(BASE_URL).unwrap();
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["url"].as_str().unwrap()), "{name}: url");

        match req.body.as_deref() {
            Some(body) => {
                let body: serde_json::Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected_req["body"], "{name}: body");
            }
            None => assert!(expected_req["body"].is_null(), "{name}: body should be None"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse single
// ---------------------------------------------------------------------------

#[test]
fn single_response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["single"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected_status = case["expected_status"].as_u64().unwrap() as u16;

        let mut slot: Option<Record<Account>> = None;
        let result = Request::new("/v1/organisation/accounts")
            .expected_status(expected_status)
            .decode_into(&mut slot)
            .parse(BASE_URL, simulated(case));

        if let Some(kind) = case["expected_error"].as_str() {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), parse_kind(kind), "{name}: error kind");
            assert!(slot.is_none(), "{name}: slot must stay empty");
            continue;
        }

        result.unwrap();
        let record = slot.unwrap();
        let expected = &case["expected_result"];
        assert_eq!(record.id(), uuid_field(&expected["id"]).unwrap(), "{name}: id");
        assert_eq!(
            record.meta().organisation_id(),
            uuid_field(&expected["organisation_id"]).unwrap(),
            "{name}: organisation_id"
        );
        assert_eq!(record.version(), expected["version"].as_u64().unwrap(), "{name}: version");
        let attributes: Account = serde_json::from_value(expected["attributes"].clone()).unwrap();
        assert_eq!(record.attributes, attributes, "{name}: attributes");
    }
}

// ---------------------------------------------------------------------------
// Parse list
// ---------------------------------------------------------------------------

#[test]
fn list_response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["list"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let mut seen: Vec<Record<Account>> = Vec::new();
        Request::new("/v1/organisation/accounts")
            .decode_each(|record: Record<Account>| seen.push(record))
            .parse(BASE_URL, simulated(case))
            .unwrap();

        let expected = case["expected_result"].as_array().unwrap();
        assert_eq!(seen.len(), expected.len(), "{name}: count");
        for (record, want) in seen.iter().zip(expected) {
            assert_eq!(record.id(), uuid_field(&want["id"]).unwrap(), "{name}: id");
            assert_eq!(record.version(), want["version"].as_u64().unwrap(), "{name}: version");
            assert_eq!(record.country, want["country"].as_str().unwrap(), "{name}: country");
        }
    }
}
