// HTTP 适配器：忽略请求内容，成功 200，任何错误 500（无 body）
// router 用法：web::resource("/scale/up").route(scale_route(rescaler.clone(), 100, 1000))
use crate::scaling::rescaler::Rescaler;
use actix_web::{web, HttpResponse, Route};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub fn scale_route(rescaler: Arc<Rescaler>, min: u32, max: u32) -> Route {
    web::to(move || {
        let rescaler = rescaler.clone();
        async move { handle_scale(&rescaler, min, max).await }
    })
}

async fn handle_scale(rescaler: &Rescaler, min: u32, max: u32) -> HttpResponse {
    // dropped together with the handler future if the client goes away
    let ctx = CancellationToken::new();
    match rescaler.rescale(&ctx, min, max).await {
        Ok(outcome) => {
            log::info!("[Scale] min={} max={} => {:?}", min, max, outcome);
            HttpResponse::Ok().finish()
        }
        Err(e) => {
            log::error!("[Scale] min={} max={} failed: {}", min, max, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaling::credentials::StaticCredentials;
    use crate::scaling::identity::{EnvServiceName, StaticProjectResolver, StaticServiceName};
    use crate::scaling::scaling_config::RescalerConfig;
    use actix_web::{http::StatusCode, test, App};

    const SERVICE_PATH: &str = "/apis/serving.knative.dev/v1/namespaces/p/services/s";
    const CURRENT: &str = r#"{
        "metadata": { "name": "s", "annotations": {} },
        "spec": { "template": { "metadata": {
            "name": "s-00003-def",
            "annotations": {
                "autoscaling.knative.dev/minScale": "0",
                "autoscaling.knative.dev/maxScale": "1000"
            }
        } } }
    }"#;

    fn rescaler_for(base_url: &str) -> Arc<Rescaler> {
        let config = RescalerConfig::default().with_base_url(base_url);
        let credentials = StaticCredentials::new(&config, None).unwrap();
        Arc::new(Rescaler::new(
            config,
            Arc::new(credentials),
            Arc::new(StaticProjectResolver("p".into())),
            Arc::new(StaticServiceName("s".into())),
        ))
    }

    #[actix_rt::test]
    async fn test_scale_routes_ok() {
        let mut server = mockito::Server::new_async().await;
        let get = server
            .mock("GET", SERVICE_PATH)
            .with_status(200)
            .with_body(CURRENT)
            .expect(2)
            .create_async()
            .await;
        let put = server
            .mock("PUT", SERVICE_PATH)
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let rescaler = rescaler_for(&server.url());
        let app = test::init_service(
            App::new()
                .service(web::resource("/scale/up").route(scale_route(rescaler.clone(), 100, 1000)))
                .service(web::resource("/scale/down").route(scale_route(rescaler.clone(), 0, 1000))),
        )
        .await;

        // mutation path
        let resp = test::call_service(&app, test::TestRequest::post().uri("/scale/up").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // no-op path
        let resp = test::call_service(&app, test::TestRequest::get().uri("/scale/down").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        get.assert_async().await;
        put.assert_async().await;
    }

    #[actix_rt::test]
    async fn test_scale_route_rejected_update_is_500() {
        let mut server = mockito::Server::new_async().await;
        let _get = server
            .mock("GET", SERVICE_PATH)
            .with_status(200)
            .with_body(CURRENT)
            .create_async()
            .await;
        let _put = server
            .mock("PUT", SERVICE_PATH)
            .with_status(403)
            .with_body("denied")
            .create_async()
            .await;

        let app = test::init_service(
            App::new().service(
                web::resource("/scale/up").route(scale_route(rescaler_for(&server.url()), 100, 1000)),
            ),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::post().uri("/scale/up").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = test::read_body(resp).await;
        assert!(body.is_empty());
    }

    #[actix_rt::test]
    async fn test_scale_route_identity_error_is_500() {
        let config = RescalerConfig::default().with_base_url("http://127.0.0.1:9");
        let credentials = StaticCredentials::new(&config, None).unwrap();
        let rescaler = Arc::new(Rescaler::new(
            config,
            Arc::new(credentials),
            Arc::new(StaticProjectResolver("p".into())),
            Arc::new(EnvServiceName::new("RUN_RESCALER_TEST_HANDLER_UNSET")),
        ));

        let app = test::init_service(
            App::new().service(web::resource("/scale/down").route(scale_route(rescaler, 0, 1000))),
        )
        .await;
        let resp = test::call_service(&app, test::TestRequest::post().uri("/scale/down").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
