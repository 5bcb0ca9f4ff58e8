use crate::error::AppError;
use actix_web::http::Method;
use actix_web::{
    Error, web,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::collections::HashMap;
use std::future::{Ready, ready};

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// 后台密钥校验：请求头 x-admin-key 或查询参数 key
///
/// 只挂在后台 scope 上（路由匹配按解码后的路径进行，不能用原始路径前缀判断）
pub struct AdminKeyMiddleware {
    secret: String,
}

impl AdminKeyMiddleware {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminKeyMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminKeyMiddlewareService {
            service,
            secret: self.secret.clone(),
        }))
    }
}

pub struct AdminKeyMiddlewareService<S> {
    service: S,
    secret: String,
}

impl<S, B> Service<ServiceRequest> for AdminKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let provided = extract_admin_key(&req);

        if provided.as_deref() == Some(self.secret.as_str()) {
            let fut = self.service.call(req);
            Box::pin(fut)
        } else {
            Box::pin(async move { Err(AppError::Unauthorized.into()) })
        }
    }
}

fn extract_admin_key(req: &ServiceRequest) -> Option<String> {
    if let Some(value) = req.headers().get(ADMIN_KEY_HEADER)
        && let Ok(key) = value.to_str()
    {
        return Some(key.to_string());
    }

    web::Query::<HashMap<String, String>>::from_query(req.query_string())
        .ok()
        .and_then(|query| query.into_inner().remove("key"))
}
