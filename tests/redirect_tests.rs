//! Tests for redirect following: hop counting, budget semantics, URL
//! resolution, request preservation and the single aggregated event
//! surface.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    abort_error_count, body_bytes, collect_all, final_meta, finished_count, url, MockTransport,
    ScriptedResponse,
};
use http::{Method, StatusCode};
use reqguard::prelude::*;

fn follow(
    transport: &Arc<MockTransport>,
    request: HttpRequest,
    max_redirects: u32,
) -> Operation {
    let first = transport.start(request);
    RedirectFollower::spawn(first, max_redirects, Arc::clone(transport) as Arc<dyn Transport>)
}

#[tokio::test]
async fn chain_is_followed_to_final_body() {
    let transport = MockTransport::new();
    transport.respond("http://a.b/x", ScriptedResponse::redirect_to("http://a.b/y"));
    transport.respond("http://a.b/y", ScriptedResponse::redirect_to("http://a.b/z"));
    transport.respond("http://a.b/z", ScriptedResponse::ok("ok"));

    let operation = follow(&transport, HttpRequest::get(url("http://a.b/x")), 2);
    let events = collect_all(operation).await;

    assert_eq!(transport.request_count(), 3);
    assert_eq!(finished_count(&events), 1);
    assert_eq!(body_bytes(&events), b"ok");

    let meta = final_meta(&events);
    assert_eq!(meta.status, StatusCode::OK);
    assert_eq!(meta.url, url("http://a.b/z"));
}

#[tokio::test]
async fn budget_of_n_permits_exactly_n_plus_one_requests() {
    // Every hop redirects; with a budget of 2 the chain stops after the
    // third physical request and completes with that hop's response.
    let transport = MockTransport::new();
    transport.respond("http://a.b/x", ScriptedResponse::redirect_to("http://a.b/y"));
    transport.respond("http://a.b/y", ScriptedResponse::redirect_to("http://a.b/z"));
    transport.respond("http://a.b/z", ScriptedResponse::redirect_to("http://a.b/w"));

    let operation = follow(&transport, HttpRequest::get(url("http://a.b/x")), 2);
    let events = collect_all(operation).await;

    assert_eq!(transport.request_count(), 3);
    assert_eq!(finished_count(&events), 1);

    // The caller observes the final, unfollowed redirect response.
    let meta = final_meta(&events);
    assert_eq!(meta.status, StatusCode::FOUND);
    assert_eq!(meta.url, url("http://a.b/z"));
    assert_eq!(meta.redirect_target(), Some(url("http://a.b/w")));
}

#[tokio::test]
async fn zero_budget_sends_exactly_one_request() {
    let transport = MockTransport::new();
    transport.respond("http://a.b/x", ScriptedResponse::redirect_to("http://a.b/y"));

    let operation = follow(&transport, HttpRequest::get(url("http://a.b/x")), 0);
    let events = collect_all(operation).await;

    assert_eq!(transport.request_count(), 1);
    assert_eq!(finished_count(&events), 1);
    assert_eq!(final_meta(&events).status, StatusCode::FOUND);
}

#[tokio::test]
async fn non_redirect_response_with_budget_left_is_terminal() {
    let transport = MockTransport::new();
    transport.respond("http://a.b/x", ScriptedResponse::ok("done"));

    let operation = follow(&transport, HttpRequest::get(url("http://a.b/x")), 5);
    let events = collect_all(operation).await;

    assert_eq!(transport.request_count(), 1);
    assert_eq!(finished_count(&events), 1);
    assert_eq!(body_bytes(&events), b"done");
}

#[tokio::test]
async fn relative_targets_resolve_against_current_hop() {
    let transport = MockTransport::new();
    transport.respond("http://a.b/dir/x", ScriptedResponse::redirect_to("/y"));
    transport.respond("http://a.b/y", ScriptedResponse::redirect_to("z"));
    transport.respond("http://a.b/z", ScriptedResponse::ok("ok"));

    let operation = follow(&transport, HttpRequest::get(url("http://a.b/dir/x")), 5);
    let events = collect_all(operation).await;

    let visited: Vec<String> = transport
        .requests()
        .iter()
        .map(|request| request.url().to_string())
        .collect();
    assert_eq!(
        visited,
        vec!["http://a.b/dir/x", "http://a.b/y", "http://a.b/z"]
    );
    assert_eq!(body_bytes(&events), b"ok");
}

#[tokio::test]
async fn re_issued_request_preserves_everything_but_the_url() {
    let transport = MockTransport::new();
    transport.respond("http://a.b/x", ScriptedResponse::redirect_to("http://a.b/y"));
    transport.respond("http://a.b/y", ScriptedResponse::ok("ok"));

    let mut request = HttpRequest::post(url("http://a.b/x"), "payload");
    request
        .headers_mut()
        .insert("x-custom", "kept".parse().expect("header value"));

    let operation = follow(&transport, request, 5);
    collect_all(operation).await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    let second = &requests[1];
    assert_eq!(second.url(), &url("http://a.b/y"));
    assert_eq!(second.method(), &Method::POST);
    assert_eq!(second.body().map(|body| body.as_ref()), Some(&b"payload"[..]));
    assert_eq!(second.headers().get("x-custom").expect("header"), "kept");
}

#[tokio::test]
async fn progress_and_data_events_are_forwarded() {
    let transport = MockTransport::new();
    transport.respond("http://a.b/x", ScriptedResponse::redirect_to("http://a.b/y"));
    transport.respond("http://a.b/y", ScriptedResponse::ok("body"));

    let operation = follow(&transport, HttpRequest::get(url("http://a.b/x")), 5);
    let events = collect_all(operation).await;

    assert!(events
        .iter()
        .any(|event| matches!(event, OperationEvent::Progress { .. })));
    assert_eq!(body_bytes(&events), b"body");
}

#[tokio::test]
async fn transport_errors_are_forwarded_verbatim() {
    let transport = MockTransport::new();
    // Nothing scripted: the mock reports a transport error, then finishes.
    let operation = follow(&transport, HttpRequest::get(url("http://a.b/missing")), 5);
    let events = collect_all(operation).await;

    assert!(events.iter().any(|event| matches!(
        event,
        OperationEvent::Error(HttpError::Transport { code: 404, .. })
    )));
    assert_eq!(finished_count(&events), 1);
}

#[tokio::test]
async fn aborting_the_aggregate_aborts_the_current_hop() {
    let transport = MockTransport::new();
    transport.respond(
        "http://a.b/x",
        ScriptedResponse::ok("late").delayed(Duration::from_secs(600)),
    );

    let operation = follow(&transport, HttpRequest::get(url("http://a.b/x")), 5);
    operation.abort();
    let events = collect_all(operation).await;

    assert_eq!(abort_error_count(&events), 1);
    assert_eq!(finished_count(&events), 1);
}

#[tokio::test]
async fn non_http_scheme_target_stops_the_chain_with_an_error() {
    let transport = MockTransport::new();
    transport.respond("http://a.b/x", ScriptedResponse::redirect_to("ftp://a.b/y"));

    let operation = follow(&transport, HttpRequest::get(url("http://a.b/x")), 5);
    let events = collect_all(operation).await;

    assert_eq!(transport.request_count(), 1);
    assert!(events
        .iter()
        .any(|event| matches!(event, OperationEvent::Error(HttpError::Redirect(_)))));
    assert_eq!(finished_count(&events), 1);
}
