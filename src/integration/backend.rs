//! Backend identities and requests.

use serde::Serialize;
use std::fmt;
use url::Url;

use crate::config::{BackendConfig, BackendsConfig};
use crate::integration::IntegrationError;

/// One of the core services behind the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Product,
    Recommendation,
    Review,
}

impl Backend {
    /// Registration and reporting order.
    pub const ALL: [Backend; 3] = [Backend::Product, Backend::Recommendation, Backend::Review];

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Product => "product",
            Backend::Recommendation => "recommendation",
            Backend::Review => "review",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A call to route through the worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    pub backend: Backend,
    /// Path and query relative to the backend base URL.
    pub path: String,
}

impl BackendRequest {
    pub fn new(backend: Backend, path: impl Into<String>) -> Self {
        Self {
            backend,
            path: path.into(),
        }
    }

    pub fn product(product_id: i32) -> Self {
        Self::new(Backend::Product, format!("/product/{product_id}"))
    }

    pub fn recommendations(product_id: i32) -> Self {
        Self::new(
            Backend::Recommendation,
            format!("/recommendation?productId={product_id}"),
        )
    }

    pub fn reviews(product_id: i32) -> Self {
        Self::new(Backend::Review, format!("/review?productId={product_id}"))
    }
}

/// Parsed location of one backend.
#[derive(Debug, Clone)]
pub struct Endpoint {
    base_url: Url,
    health_path: String,
}

impl Endpoint {
    pub fn parse(backend: Backend, config: &BackendConfig) -> Result<Self, IntegrationError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| IntegrationError::InvalidUrl {
            backend,
            message: e.to_string(),
        })?;
        Ok(Self {
            base_url,
            health_path: config.health_path.clone(),
        })
    }

    /// Append `path` (with an optional query) to the base URL's own path.
    pub fn resolve(&self, backend: Backend, path: &str) -> Result<Url, IntegrationError> {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| IntegrationError::InvalidUrl {
                backend,
                message: format!("{} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        url.set_query(query);
        Ok(url)
    }

    pub fn health_path(&self) -> &str {
        &self.health_path
    }
}

/// Endpoints of all three backends.
#[derive(Debug, Clone)]
pub struct Endpoints {
    product: Endpoint,
    recommendation: Endpoint,
    review: Endpoint,
}

impl Endpoints {
    pub fn from_config(config: &BackendsConfig) -> Result<Self, IntegrationError> {
        Ok(Self {
            product: Endpoint::parse(Backend::Product, &config.product)?,
            recommendation: Endpoint::parse(Backend::Recommendation, &config.recommendation)?,
            review: Endpoint::parse(Backend::Review, &config.review)?,
        })
    }

    pub fn get(&self, backend: Backend) -> &Endpoint {
        match backend {
            Backend::Product => &self.product,
            Backend::Recommendation => &self.recommendation,
            Backend::Review => &self.review,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_paths() {
        let endpoints = Endpoints::from_config(&BackendsConfig::default()).unwrap();

        let req = BackendRequest::reviews(7);
        let url = endpoints.get(req.backend).resolve(req.backend, &req.path).unwrap();
        assert_eq!(url.as_str(), "http://review:8080/review?productId=7");

        let req = BackendRequest::product(7);
        let url = endpoints.get(req.backend).resolve(req.backend, &req.path).unwrap();
        assert_eq!(url.as_str(), "http://product:8080/product/7");
    }

    #[test]
    fn test_base_path_is_kept() {
        let mut config = BackendsConfig::default();
        config.product.base_url = "http://gw:8080/product-service".into();
        config.review.base_url = "http://gw:8080/review-service/".into();
        let endpoints = Endpoints::from_config(&config).unwrap();

        let product = endpoints.get(Backend::Product);
        let req = BackendRequest::product(7);
        assert_eq!(
            product.resolve(req.backend, &req.path).unwrap().as_str(),
            "http://gw:8080/product-service/product/7"
        );
        assert_eq!(
            product.resolve(Backend::Product, product.health_path()).unwrap().as_str(),
            "http://gw:8080/product-service/actuator/health"
        );

        let review = endpoints.get(Backend::Review);
        let req = BackendRequest::reviews(3);
        assert_eq!(
            review.resolve(req.backend, &req.path).unwrap().as_str(),
            "http://gw:8080/review-service/review?productId=3"
        );
        assert_eq!(
            review.resolve(Backend::Review, review.health_path()).unwrap().as_str(),
            "http://gw:8080/review-service/actuator/health"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = BackendsConfig::default();
        config.recommendation.base_url = "::nope".into();
        let err = Endpoints::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            IntegrationError::InvalidUrl {
                backend: Backend::Recommendation,
                ..
            }
        ));
    }

    #[test]
    fn test_names_follow_registration_order() {
        let names: Vec<_> = Backend::ALL.iter().map(Backend::name).collect();
        assert_eq!(names, vec!["product", "recommendation", "review"]);
    }
}
