//http服务入口
use actix_web::{web, App, HttpServer};
use run_rescaler::{scale_route, Rescaler, RescalerConfig};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    // 凭证与项目取自 metadata server，服务名取自 K_SERVICE
    let rescaler = Rescaler::from_environment(RescalerConfig::default())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let rescaler = Arc::new(rescaler);

    HttpServer::new(move || {
        App::new()
            .service(web::resource("/scale/up").route(scale_route(rescaler.clone(), 100, 1000)))
            .service(web::resource("/scale/down").route(scale_route(rescaler.clone(), 0, 1000)))
    })
    .bind("0.0.0.0:8080")?//监听地址
    .run()
    .await
}
