#[cfg(test)]
use crate::features::auth::{model::AuthenticatedUser, models::UserRole};

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
pub fn create_user(role: UserRole) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: uuid::Uuid::new_v4(),
        user_code: "USR-TEST0001".to_string(),
        full_name: "Test User".to_string(),
        email: "test.user@example.com".to_string(),
        role,
    }
}

#[cfg(test)]
async fn inject_admin_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_user(UserRole::Admin));
    next.run(request).await
}

#[cfg(test)]
async fn inject_reporter_middleware(mut request: Request, next: Next) -> Response {
    request
        .extensions_mut()
        .insert(create_user(UserRole::Reporter));
    next.run(request).await
}

#[cfg(test)]
pub fn with_admin_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_middleware))
}

#[cfg(test)]
pub fn with_reporter_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_reporter_middleware))
}
