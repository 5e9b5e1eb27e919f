//! Host-does-IO: drive `Request::build` / `Request::parse` with a foreign HTTP stack.
//!
//! # Design
//! Starts the mock server on a random port and executes every built
//! `HttpRequest` with blocking ureq, the way an embedding host would. Only
//! the pure halves of the pipeline are used; `ApiClient` is never involved.

use accounts_client::account::{ACCOUNTS_PATH, ACCOUNTS_TYPE};
use accounts_client::{Account, HttpMethod, HttpRequest, HttpResponse, Record, Request};
use uuid::Uuid;

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// handle status interpretation.
fn execute(req: &HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let url = req.url.as_str();
    let mut response = match (req.method, req.body.as_deref()) {
        (HttpMethod::Get, _) => agent.get(url).call(),
        (HttpMethod::Delete, _) => agent.delete(url).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(url).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(url).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            agent.put(url).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Put, None) => agent.put(url).send_empty(),
        (HttpMethod::Patch, Some(body)) => {
            agent.patch(url).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Patch, None) => agent.patch(url).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

/// Build, execute and parse in one go.
fn round_trip(base_url: &str, request: Request<'_>) -> Result<(), accounts_client::Error> {
    let http_request = request.build(base_url)?;
    let response = execute(&http_request);
    request.parse(&http_request.url, response)
}

#[test]
fn host_driven_lifecycle() {
    // Step 1: start mock server on a random port.
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    let base_url = format!("http://{addr}");
    let id = Uuid::new_v4();
    let org = Uuid::new_v4();
    let account = Account {
        country: "GB".to_string(),
        bic: "NWBKGB22".to_string(),
        ..Default::default()
    };

    // Step 2: create.
    let mut created: Option<Record<Account>> = None;
    round_trip(
        &base_url,
        Request::new(ACCOUNTS_PATH)
            .method(HttpMethod::Post)
            .resource_type(ACCOUNTS_TYPE)
            .id(id)
            .organisation_id(org)
            .payload(&account)
            .expected_status(201)
            .decode_into(&mut created),
    )
    .unwrap();
    let created = created.unwrap();
    assert_eq!(created.id(), id);
    assert_eq!(created.attributes, account);

    // Step 3: list.
    let mut listed = Vec::new();
    round_trip(
        &base_url,
        Request::new(ACCOUNTS_PATH)
            .query("page[size]", 10)
            .decode_each(|r: Record<Account>| listed.push(r.id())),
    )
    .unwrap();
    assert_eq!(listed, vec![id]);

    // Step 4: delete the wrong version, then the right one.
    let delete = |version: u64| {
        Request::new(format!("{ACCOUNTS_PATH}/{id}"))
            .method(HttpMethod::Delete)
            .query("version", version)
            .expected_status(204)
    };
    let err = round_trip(&base_url, delete(created.version() + 1)).unwrap_err();
    assert!(err.is_not_found());
    round_trip(&base_url, delete(created.version())).unwrap();

    // Step 5: fetch after delete is NotFound.
    let mut fetched: Option<Record<Account>> = None;
    let err = round_trip(
        &base_url,
        Request::new(format!("{ACCOUNTS_PATH}/{id}")).decode_into(&mut fetched),
    )
    .unwrap_err();
    assert!(err.is_not_found());
    assert!(fetched.is_none());
}
