//! HTTP surface integration tests

#[cfg(test)]
mod tests {
    use crate::common::{keyed_request, memory_gate};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use ratelimit_gateway::config::{Config, ProxyConfig};
    use ratelimit_gateway::server::routes;
    use ratelimit_gateway::server::{AppState, UpstreamProxy};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[actix_web::test]
    async fn test_api_and_proxy_share_header_contract() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hello"))
            .respond_with(ResponseTemplate::new(200).set_body_string("upstream hello"))
            .mount(&upstream)
            .await;

        let api_state = AppState::api(Config::default(), memory_gate(2, Duration::from_secs(60)));
        let api = test::init_service(
            App::new().configure(|cfg| routes::configure_app(cfg, &api_state)),
        )
        .await;

        let mut config = Config::default();
        config.proxy = ProxyConfig {
            upstream: upstream.uri(),
            timeout: Duration::from_secs(5),
        };
        let proxy = UpstreamProxy::new(&config.proxy).unwrap();
        let proxy_state =
            AppState::proxy(config, memory_gate(2, Duration::from_secs(60)), proxy);
        let proxy = test::init_service(
            App::new().configure(|cfg| routes::configure_app(cfg, &proxy_state)),
        )
        .await;

        let mut api_statuses = Vec::new();
        let mut proxy_statuses = Vec::new();
        for _ in 0..3 {
            let resp = test::call_service(&api, keyed_request("/hello", "k").to_request()).await;
            assert!(resp.headers().contains_key("x-ratelimit-reset"));
            api_statuses.push(resp.status());

            let resp = test::call_service(&proxy, keyed_request("/hello", "k").to_request()).await;
            assert!(resp.headers().contains_key("x-ratelimit-reset"));
            proxy_statuses.push(resp.status());
        }

        let expected = [StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS];
        assert_eq!(api_statuses, expected);
        assert_eq!(proxy_statuses, expected);
    }

    #[actix_web::test]
    async fn test_proxy_appends_forwarded_for() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&upstream)
            .await;

        let mut config = Config::default();
        config.proxy.upstream = upstream.uri();
        let proxy = UpstreamProxy::new(&config.proxy).unwrap();
        let state = AppState::proxy(config, memory_gate(5, Duration::from_secs(60)), proxy);
        let app =
            test::init_service(App::new().configure(|cfg| routes::configure_app(cfg, &state)))
                .await;

        let req = test::TestRequest::get()
            .uri("/resource")
            .insert_header(("X-Forwarded-For", "203.0.113.7"))
            .peer_addr("10.1.2.3:40000".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let received = upstream.received_requests().await.unwrap();
        let forwarded = received[0].headers.get("x-forwarded-for").unwrap();
        assert_eq!(forwarded.to_str().unwrap(), "203.0.113.7, 10.1.2.3");
    }

    #[actix_web::test]
    async fn test_callers_are_limited_independently() {
        let state = AppState::api(Config::default(), memory_gate(1, Duration::from_secs(60)));
        let app =
            test::init_service(App::new().configure(|cfg| routes::configure_app(cfg, &state)))
                .await;

        let first = test::call_service(&app, keyed_request("/hello", "a").to_request()).await;
        let second = test::call_service(&app, keyed_request("/hello", "b").to_request()).await;
        let again = test::call_service(&app, keyed_request("/hello", "a").to_request()).await;

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(again.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
