//! Baseline security response headers and CORS policy.

use actix_cors::Cors;
use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;

/// Headers added to every response unless a handler already set them.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "no-referrer"))
        .add(("Cross-Origin-Resource-Policy", "same-origin"))
}

/// Open CORS policy: any origin, no credentials.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_any_header()
        .max_age(3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_headers_are_applied() {
        let app = test::init_service(
            App::new()
                .wrap(security_headers())
                .route("/", web::get().to(ok)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.headers().get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(res.headers().get("x-frame-options").unwrap(), "DENY");
    }

    #[actix_web::test]
    async fn test_preflight_is_answered() {
        let app = test::init_service(
            App::new()
                .wrap(cors())
                .route("/api/tweet", web::post().to(ok)),
        )
        .await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/tweet")
            .insert_header(("Origin", "https://client.example"))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .insert_header(("Access-Control-Request-Headers", "content-type"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get("access-control-allow-origin").unwrap(), "*");
    }

    #[actix_web::test]
    async fn test_simple_request_gets_allow_origin() {
        let app = test::init_service(
            App::new()
                .wrap(cors())
                .route("/api/tweet", web::post().to(ok)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/tweet")
            .insert_header(("Origin", "https://client.example"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("access-control-allow-origin"));
    }
}
