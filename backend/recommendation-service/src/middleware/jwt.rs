//! Bearer-token check for the recommendation endpoints

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::sync::Arc;

use crate::error::AppError;

/// Claims carried by service tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (client name)
    pub exp: usize,  // Expiration time
}

/// Validates HMAC-signed bearer tokens.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, algorithm: Algorithm) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(algorithm),
        }
    }

    /// Check an `Authorization` header value.
    pub fn verify(&self, auth_header: Option<&str>) -> Result<Claims, AppError> {
        let auth_header = auth_header
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Authorization must use Bearer scheme".to_string())
        })?;

        let token_data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            AppError::Unauthorized("Could not validate credentials".to_string())
        })?;

        if token_data.claims.sub.is_empty() {
            return Err(AppError::Unauthorized(
                "Could not validate credentials".to_string(),
            ));
        }

        Ok(token_data.claims)
    }
}

/// JWT authentication middleware. Passes everything through when built
/// without a verifier.
pub struct JwtAuth {
    verifier: Option<Arc<JwtVerifier>>,
}

impl JwtAuth {
    pub fn new(verifier: Option<Arc<JwtVerifier>>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthService {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
        }))
    }
}

pub struct JwtAuthService<S> {
    service: Rc<S>,
    verifier: Option<Arc<JwtVerifier>>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let verifier = self.verifier.clone();

        Box::pin(async move {
            if let Some(verifier) = verifier {
                let auth_header = req
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|h| h.to_str().ok());

                match verifier.verify(auth_header) {
                    Ok(claims) => {
                        req.extensions_mut().insert(claims);
                    }
                    Err(e) => {
                        // Short-circuit with the structured 401 body.
                        return Ok(req.error_response(e).map_into_right_body());
                    }
                }
            }

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}
