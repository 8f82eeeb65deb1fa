//! Requests the policy refuses never reach the upstream.

use search_gate::ProxyOptions;

mod common;

async fn assert_rejected(method: reqwest::Method, path_and_query: &str) {
    let upstream = common::start_status_backend(200).await;
    let gateway = common::start_gateway(upstream.port(), ProxyOptions::new()).await;

    let res = common::client()
        .request(method.clone(), common::url(&gateway, path_and_query))
        .send()
        .await
        .expect("gateway unreachable");

    assert_eq!(res.status(), 403, "{method} {path_and_query}");
    assert_eq!(upstream.hits(), 0, "upstream contacted for {method} {path_and_query}");
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn post_is_forbidden() {
    assert_rejected(reqwest::Method::POST, "/solr/select?q=fhqwhagads").await;
}

#[tokio::test]
async fn other_methods_are_forbidden() {
    for method in [
        reqwest::Method::PUT,
        reqwest::Method::DELETE,
        reqwest::Method::PATCH,
        reqwest::Method::OPTIONS,
        reqwest::Method::HEAD,
    ] {
        assert_rejected(method, "/solr/select?q=fhqwhagads").await;
    }
}

#[tokio::test]
async fn admin_path_is_forbidden() {
    assert_rejected(reqwest::Method::GET, "/solr/admin").await;
}

#[tokio::test]
async fn paths_sharing_only_a_string_prefix_are_forbidden() {
    assert_rejected(reqwest::Method::GET, "/solr/selectall?q=x").await;
    assert_rejected(reqwest::Method::GET, "/").await;
}

#[tokio::test]
async fn qt_parameter_is_forbidden() {
    assert_rejected(reqwest::Method::GET, "/solr/select?q=fhqwhagads&qt=%2Fupdate").await;
}

#[tokio::test]
async fn stream_url_parameter_is_forbidden() {
    assert_rejected(
        reqwest::Method::GET,
        "/solr/select?q=fhqwhagads&stream.url=EVERYBODYTOTHELIMIT!",
    )
    .await;
}

#[tokio::test]
async fn encoded_blocked_name_is_forbidden() {
    assert_rejected(reqwest::Method::GET, "/solr/select?stream%2Eurl=x&q=y").await;
}

#[tokio::test]
async fn post_is_forbidden_even_with_upstream_down() {
    let gateway = common::start_gateway(common::refused_addr().await.port(), ProxyOptions::new()).await;
    let res = common::client()
        .post(common::url(&gateway, "/solr/select?q=fhqwhagads"))
        .body("q=fhqwhagads")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);
}

#[tokio::test]
async fn configured_extra_parameter_is_forbidden() {
    let upstream = common::start_status_backend(200).await;
    let gateway = common::start_gateway(
        upstream.port(),
        ProxyOptions::new().block_params(["shards"]),
    )
    .await;
    let client = common::client();

    let res = client
        .get(common::url(&gateway, "/solr/select?q=a&shards=x,y"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);

    let res = client
        .get(common::url(&gateway, "/solr/select?q=a&qt=x"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403, "fixed blocked names stay blocked");
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn dot_segments_cannot_escape_allowed_prefix() {
    let upstream = common::start_status_backend(200).await;
    let gateway = common::start_gateway(upstream.port(), ProxyOptions::new()).await;

    for target in [
        "/solr/select/../admin/cores?action=STATUS",
        "/solr/select/%2e%2e/admin/cores",
        "/solr/select/%2E%2E/admin/cores",
        "/solr/select/./../admin/cores",
        "/solr/select/..%2Fadmin/cores",
    ] {
        let status_line = common::raw_get(gateway.local_addr(), target).await;
        assert!(
            status_line.starts_with("HTTP/1.1 403"),
            "{target} answered {status_line:?}"
        );
    }
    assert_eq!(upstream.hits(), 0);

    let status_line = common::raw_get(gateway.local_addr(), "/solr/select?q=fhqwhagads").await;
    assert!(status_line.starts_with("HTTP/1.1 200"), "{status_line:?}");
    assert_eq!(upstream.hits(), 1);
}
