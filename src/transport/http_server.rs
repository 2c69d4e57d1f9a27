use std::{sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tower_http::{
    catch_panic::CatchPanicLayer, timeout::ResponseBodyTimeoutLayer, trace::TraceLayer,
};

use crate::{
    server::AppState,
    transport::{
        middleware::{cors_layer, handle_panic},
        routes::{download, info, ping},
    },
};

pub fn router(state: Arc<AppState>) -> Router {
    let idle_ceiling = Duration::from_secs(state.config.server.connection_timeout_secs);

    Router::new()
        .route("/", get(ping::ping))
        .route("/info", get(info::get_info))
        .route("/mp3", get(download::download_mp3))
        .route("/mp4", get(download::download_mp4))
        .layer(ResponseBodyTimeoutLayer::new(idle_ceiling))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use reqwest::{Method, StatusCode, header};
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        configs::Config,
        sources::{MediaExtractor, MediaInfo},
        testing::{MockExtractor, Step, chunk, format, thumbnails},
    };

    async fn serve(extractor: MockExtractor) -> (SocketAddr, Arc<MockExtractor>) {
        let extractor = Arc::new(extractor);
        let shared: Arc<dyn MediaExtractor> = extractor.clone();
        let app = router(AppState::new(Config::default(), shared));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, extractor)
    }

    fn song(steps: Vec<Step>) -> MockExtractor {
        let info = MediaInfo {
            title: "Never Gonna Give You Up!".to_string(),
            thumbnails: thumbnails(4),
            formats: vec![
                format(true, false, Some(128), "https://cdn.test/a128"),
                format(true, false, Some(160), "https://cdn.test/a160"),
            ],
        };
        MockExtractor::new(info, steps)
    }

    async fn get(addr: SocketAddr, path: &str) -> reqwest::Response {
        reqwest::get(format!("http://{}{}", addr, path)).await.unwrap()
    }

    #[tokio::test]
    async fn ping_answers_empty_ok() {
        let (addr, _) = serve(song(Vec::new())).await;
        let response = get(addr, "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(response.text().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn options_on_any_path_is_a_cors_preflight() {
        let (addr, _) = serve(song(Vec::new())).await;
        let client = reqwest::Client::new();

        for path in ["/mp3", "/somewhere/else"] {
            let response = client
                .request(Method::OPTIONS, format!("http://{}{}", addr, path))
                .header(header::ORIGIN, "https://app.test")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .send()
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{}", path);
            assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
                .to_str()
                .unwrap()
                .to_string();
            assert!(methods.contains("GET") && methods.contains("OPTIONS"));
            assert!(response.text().await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn missing_url_is_invalid_query() {
        let (addr, _) = serve(song(Vec::new())).await;

        for path in ["/mp3", "/mp4", "/info"] {
            let response = get(addr, path).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", path);
            assert_eq!(
                response.json::<Value>().await.unwrap(),
                json!({ "error": "Invalid query" })
            );
        }
    }

    #[tokio::test]
    async fn empty_url_is_invalid_query() {
        let (addr, ext) = serve(song(vec![chunk(b"x")])).await;

        for path in ["/mp3?url=", "/mp4?url=", "/info?url="] {
            let response = get(addr, path).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", path);
            assert_eq!(
                response.json::<Value>().await.unwrap(),
                json!({ "error": "Invalid query" })
            );
        }
        assert_eq!(ext.opened(), 0);
    }

    #[tokio::test]
    async fn rejected_url_is_invalid_url() {
        let (addr, ext) = serve(song(vec![chunk(b"x")])).await;
        let response = get(addr, "/mp3?url=https%3A%2F%2Fnot-media.test%2Fx").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>().await.unwrap(),
            json!({ "error": "Invalid url" })
        );
        assert_eq!(ext.opened(), 0);
    }

    #[tokio::test]
    async fn info_returns_title_and_thumbnail() {
        let (addr, _) = serve(song(Vec::new())).await;
        let response = get(addr, "/info?url=https://media.test/dQw4w9WgXcQ").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.json::<Value>().await.unwrap(),
            json!({
                "title": "Never Gonna Give You Up!",
                "thumbnail": "https://img.test/2.jpg",
            })
        );
    }

    #[tokio::test]
    async fn backend_failure_is_a_server_error() {
        let (addr, _) = serve(MockExtractor::failing("Video unavailable")).await;

        for path in ["/info", "/mp3", "/mp4"] {
            let response = get(addr, &format!("{}?url=https://media.test/gone", path)).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", path);
            assert_eq!(
                response.json::<Value>().await.unwrap(),
                json!({ "error": "Video unavailable" })
            );
        }
    }

    #[tokio::test]
    async fn mp3_streams_the_best_audio_as_attachment() {
        let steps = vec![chunk(b"ID3"), chunk(b"-audio-"), chunk(b"bytes")];
        let (addr, ext) = serve(song(steps)).await;
        let response = get(addr, "/mp3?url=https://media.test/dQw4w9WgXcQ").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Never%20Gonna%20Give%20You%20Up.mp3\"; \
             filename*=UTF-8''Never%20Gonna%20Give%20You%20Up.mp3"
        );
        assert_eq!(&response.bytes().await.unwrap()[..], b"ID3-audio-bytes");

        assert_eq!(ext.opened(), 1);
        assert_eq!(ext.probe.closes(), 1);
    }

    #[tokio::test]
    async fn mp4_without_video_formats_fails_before_streaming() {
        let (addr, ext) = serve(song(vec![chunk(b"x")])).await;
        let response = get(addr, "/mp4?url=https://media.test/dQw4w9WgXcQ").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<Value>().await.unwrap(),
            json!({ "error": "No suitable video format found" })
        );
        assert_eq!(ext.opened(), 0);
    }

    #[tokio::test]
    async fn upstream_error_before_data_is_reported_as_json() {
        let (addr, ext) = serve(song(vec![Step::Fail("403 from cdn")])).await;
        let response = get(addr, "/mp3?url=https://media.test/dQw4w9WgXcQ").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(
            response.json::<Value>().await.unwrap(),
            json!({ "error": "403 from cdn" })
        );
        assert_eq!(ext.probe.closes(), 1);
    }

    #[tokio::test]
    async fn failure_mid_stream_cuts_the_connection() {
        let (addr, ext) = serve(song(vec![chunk(b"partial"), Step::Fail("reset")])).await;
        let url = format!("http://{}/mp3?url=https://media.test/dQw4w9WgXcQ", addr);

        // the abort may land before or after the head reaches the client,
        // but the body never completes
        if let Ok(response) = reqwest::get(url).await {
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.bytes().await.is_err());
        }
        assert_eq!(ext.probe.closes(), 1);
        assert_eq!(ext.probe.double_closes(), 0);
    }

    #[tokio::test]
    async fn concurrent_downloads_are_independent() {
        let (addr, ext) = serve(song(vec![chunk(b"abc"), chunk(b"def")])).await;

        let requests = (0..8).map(|_| async move {
            let response = get(addr, "/mp3?url=https://media.test/dQw4w9WgXcQ").await;
            response.bytes().await.unwrap()
        });
        for body in futures::future::join_all(requests).await {
            assert_eq!(&body[..], b"abcdef");
        }

        assert_eq!(ext.opened(), 8);
        assert_eq!(ext.probe.closes(), 8);
    }
}
