use std::rc::Rc;

use common::env_config::JwtConfig;
use middleware::{auth::AuthMiddleware, extractor::ExtractionMiddleware};

pub mod middleware {
    pub mod auth;
    pub mod extractor;
}

/// Validates bearer tokens and stores the outcome in request extensions.
pub fn middleware(jwt_config: JwtConfig) -> ExtractionMiddleware {
    ExtractionMiddleware::new(Rc::new(jwt_config))
}

/// Rejects requests without valid claims; exposes `web::ReqData<JwtClaims>`.
pub fn auth_middleware() -> AuthMiddleware {
    AuthMiddleware::new()
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};
    use chrono::{Duration, Utc};
    use common::jwt::JwtClaims;
    use jsonwebtoken::{EncodingKey, Header};
    use uuid::Uuid;

    use super::*;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "extractor-secret".to_string(),
            audience: "authenticated".to_string(),
        }
    }

    fn token(user_id: Uuid) -> String {
        let claims = JwtClaims {
            sub: user_id,
            email: None,
            aud: "authenticated".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"extractor-secret"),
        )
        .unwrap()
    }

    async fn whoami(claims: web::ReqData<JwtClaims>) -> HttpResponse {
        HttpResponse::Ok().body(claims.user_id().to_string())
    }

    #[actix_web::test]
    async fn guarded_scope_requires_valid_token() {
        let app = test::init_service(
            App::new().wrap(middleware(jwt_config())).service(
                web::scope("/dashboard")
                    .wrap(auth_middleware())
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let anonymous = test::TestRequest::get().uri("/dashboard/me").to_request();
        let res = test::call_service(&app, anonymous).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let forged = test::TestRequest::get()
            .uri("/dashboard/me")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let res = test::call_service(&app, forged).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let user_id = Uuid::new_v4();
        let valid = test::TestRequest::get()
            .uri("/dashboard/me")
            .insert_header(("Authorization", format!("Bearer {}", token(user_id))))
            .to_request();
        let res = test::call_service(&app, valid).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, user_id.to_string().as_bytes());
    }
}
