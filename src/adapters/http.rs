use crate::core::catalog::CarFilter;
use crate::domain::model::{
    AuthResponse, Car, Credentials, FinancingDocument, ImportRequest, ImportRequestReceipt,
    Registration, UploadedDocument, User,
};
use crate::utils::error::{Result, StorefrontError};
use crate::utils::retry::{with_retry_if, RetryPolicy};
use crate::utils::validation::{validate_file_extension, validate_required, validate_vin};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemBody<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } => items,
        }
    }
}

impl<T> ItemBody<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Client for the storefront REST API. Every call runs under the retry
/// policy's timeout and backoff.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    policy: RetryPolicy,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, policy: RetryPolicy) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(policy.timeout).build()?;
        Ok(Self {
            client,
            base_url,
            policy,
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Appends each segment percent-encoded, so an id can never leave its
    /// own path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(StorefrontError::validation(
                "path",
                format!("'{}' is not a valid path segment", bad),
            ));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StorefrontError::ConfigError {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Idempotent methods retry on any transient failure. Anything else is
    /// only repeated when the connection was never established.
    fn should_retry(method: &Method) -> fn(&StorefrontError) -> bool {
        if method.is_idempotent() {
            StorefrontError::is_retryable
        } else {
            StorefrontError::is_connect_failure
        }
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    text
                }
            });

        Err(StorefrontError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::check(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(request: RequestBuilder) -> Result<()> {
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Sends a freshly built request per attempt and decodes the JSON body.
    async fn call<T, F>(&self, label: &str, method: Method, path: &[&str], build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = self.endpoint(path)?;
        tracing::debug!("{} {}", method, url);

        with_retry_if(&self.policy, label, Self::should_retry(&method), || {
            Self::send_json::<T>(build(self.request(method.clone(), url.clone())))
        })
        .await
    }

    /// Like [`call`](Self::call) but ignores the response body.
    async fn call_empty<F>(&self, label: &str, method: Method, path: &[&str], build: F) -> Result<()>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = self.endpoint(path)?;
        tracing::debug!("{} {}", method, url);

        with_retry_if(&self.policy, label, Self::should_retry(&method), || {
            Self::send_empty(build(self.request(method.clone(), url.clone())))
        })
        .await
    }

    /// `currency` asks the server to quote prices in that currency.
    pub async fn list_cars(&self, filter: &CarFilter, currency: Option<&str>) -> Result<Vec<Car>> {
        let mut query = filter.to_query();
        if let Some(code) = currency {
            query.push(("currency", code.to_string()));
        }
        let body: ListBody<Car> = self
            .call("list cars", Method::GET, &["cars"], |r| r.query(&query))
            .await?;
        let cars = body.into_vec();
        tracing::info!("Fetched {} cars", cars.len());
        Ok(cars)
    }

    pub async fn get_car(&self, id: &str) -> Result<Car> {
        validate_required("id", id)?;
        let body: ItemBody<Car> = self
            .call("get car", Method::GET, &["cars", id], |r| r)
            .await?;
        Ok(body.into_inner())
    }

    pub async fn list_favorites(&self) -> Result<Vec<Car>> {
        let body: ListBody<Car> = self
            .call("list favorites", Method::GET, &["favorites"], |r| r)
            .await?;
        Ok(body.into_vec())
    }

    pub async fn add_favorite(&self, car_id: &str) -> Result<()> {
        validate_required("car_id", car_id)?;
        self.call_empty("add favorite", Method::POST, &["favorites", car_id], |r| r)
            .await
    }

    pub async fn remove_favorite(&self, car_id: &str) -> Result<()> {
        validate_required("car_id", car_id)?;
        self.call_empty("remove favorite", Method::DELETE, &["favorites", car_id], |r| r)
            .await
    }

    /// Validated locally before anything is sent.
    pub async fn create_import_request(&self, request: &ImportRequest) -> Result<ImportRequestReceipt> {
        validate_required("make", &request.make)?;
        validate_required("model", &request.model)?;
        if let Some(vin) = &request.vin {
            validate_vin(vin)?;
        }
        if !(request.budget.is_finite() && request.budget > 0.0) {
            return Err(StorefrontError::validation("budget", "must be greater than zero"));
        }

        let body: ItemBody<ImportRequestReceipt> = self
            .call("create import request", Method::POST, &["import-requests"], |r| {
                r.json(request)
            })
            .await?;
        let receipt = body.into_inner();
        tracing::info!("Import request {} created", receipt.id);
        Ok(receipt)
    }

    pub async fn upload_financing_document(
        &self,
        application_id: &str,
        document: &FinancingDocument,
    ) -> Result<UploadedDocument> {
        validate_required("application_id", application_id)?;
        validate_required("document_type", &document.document_type)?;
        validate_file_extension("file", &document.file_name, DOCUMENT_EXTENSIONS)?;
        if document.content.is_empty() {
            return Err(StorefrontError::validation("file", "is empty"));
        }

        let path = ["financing", "applications", application_id, "documents"];
        let body: ItemBody<UploadedDocument> = self
            .call("upload document", Method::POST, &path, |r| {
                let part = Part::bytes(document.content.clone()).file_name(document.file_name.clone());
                let form = Form::new()
                    .text("document_type", document.document_type.clone())
                    .part("file", part);
                r.multipart(form)
            })
            .await?;
        Ok(body.into_inner())
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        validate_required("email", &credentials.email)?;
        validate_required("password", &credentials.password)?;
        self.call("login", Method::POST, &["auth", "login"], |r| r.json(credentials))
            .await
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        validate_required("name", &registration.name)?;
        validate_required("email", &registration.email)?;
        validate_required("password", &registration.password)?;
        self.call("register", Method::POST, &["auth", "register"], |r| r.json(registration))
            .await
    }

    pub async fn me(&self) -> Result<User> {
        let body: ItemBody<User> = self.call("profile", Method::GET, &["auth", "me"], |r| r).await?;
        Ok(body.into_inner())
    }

    pub async fn logout(&self) -> Result<()> {
        self.call_empty("logout", Method::POST, &["auth", "logout"], |r| r).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            timeout: Duration::from_secs(2),
        }
    }

    fn car_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "make": "Toyota",
            "model": "Harrier",
            "year": 2018,
            "price": 3100000,
            "currency": "KES",
            "mileage": 70000,
            "condition": "used",
            "stock_type": "local"
        })
    }

    #[tokio::test]
    async fn test_list_cars_bare_array_with_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/cars")
                .query_param("make", "Toyota")
                .query_param("currency", "KES");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([car_json("1"), car_json("2")]));
        });

        let client = ApiClient::new(&server.url("/api"), policy()).unwrap();
        let filter = CarFilter {
            make: Some("Toyota".to_string()),
            ..CarFilter::default()
        };
        let cars = client.list_cars(&filter, Some("KES")).await.unwrap();

        mock.assert();
        assert_eq!(cars.len(), 2);
        assert_eq!(cars[1].id, "2");
    }

    #[tokio::test]
    async fn test_list_cars_wrapped_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cars");
            then.status(200)
                .json_body(serde_json::json!({"data": [car_json("9")], "total": 1}));
        });

        let client = ApiClient::new(&server.base_url(), policy()).unwrap();
        let cars = client.list_cars(&CarFilter::default(), None).await.unwrap();
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].id, "9");
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/favorites/42")
                .header("Authorization", "Bearer secret-token");
            then.status(204);
        });

        let mut client = ApiClient::new(&server.base_url(), policy()).unwrap();
        client.set_token(Some("secret-token".to_string()));
        client.add_favorite("42").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/cars/missing");
            then.status(404).json_body(serde_json::json!({"message": "Car not found"}));
        });

        let client = ApiClient::new(&server.base_url(), policy()).unwrap();
        let err = client.get_car("missing").await.unwrap_err();

        mock.assert_hits(1);
        match err {
            StorefrontError::ApiError { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Car not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_exhaust_retries() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/favorites");
            then.status(503);
        });

        let client = ApiClient::new(&server.base_url(), policy()).unwrap();
        let err = client.list_favorites().await.unwrap_err();

        mock.assert_hits(3);
        assert!(matches!(err, StorefrontError::ApiError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_ids_stay_inside_their_path_segment() {
        let server = MockServer::start();
        let profile = server.mock(|when, then| {
            when.method(GET).path("/api/auth/me");
            then.status(200)
                .json_body(serde_json::json!({"id": "u1", "email": "x@example.com"}));
        });
        let car = server.mock(|when, then| {
            when.method(GET).path("/api/cars/..%2Fauth%2Fme");
            then.status(404).json_body(serde_json::json!({"message": "Car not found"}));
        });

        let mut client = ApiClient::new(&server.url("/api"), policy()).unwrap();
        client.set_token(Some("secret-token".to_string()));
        let err = client.get_car("../auth/me").await.unwrap_err();

        car.assert();
        profile.assert_hits(0);
        assert!(matches!(err, StorefrontError::ApiError { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_dot_segments_are_rejected() {
        let server = MockServer::start();
        let favorites = server.mock(|when, then| {
            when.method(DELETE).path_contains("/favorites");
            then.status(204);
        });

        let client = ApiClient::new(&server.base_url(), policy()).unwrap();
        let err = client.remove_favorite("..").await.unwrap_err();

        assert!(matches!(err, StorefrontError::ValidationError { .. }));
        favorites.assert_hits(0);
    }

    #[tokio::test]
    async fn test_query_characters_in_id_are_encoded() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/financing/applications/app%3F1%231/documents");
            then.status(201).json_body(serde_json::json!({"id": "d1"}));
        });

        let client = ApiClient::new(&server.base_url(), policy()).unwrap();
        let document = FinancingDocument {
            document_type: "payslip".to_string(),
            file_name: "payslip.pdf".to_string(),
            content: b"%PDF-1.4".to_vec(),
        };
        let uploaded = client
            .upload_financing_document("app?1#1", &document)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(uploaded.id, "d1");
    }

    #[tokio::test]
    async fn test_failed_submission_is_not_replayed() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/import-requests");
            then.status(503);
        });

        let client = ApiClient::new(&server.base_url(), policy()).unwrap();
        let request = ImportRequest {
            make: "Mazda".to_string(),
            model: "CX-5".to_string(),
            year: 2020,
            vin: None,
            budget: 25_000.0,
            notes: None,
        };
        let err = client.create_import_request(&request).await.unwrap_err();

        mock.assert_hits(1);
        assert!(matches!(err, StorefrontError::ApiError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_idempotent_delete_is_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/favorites/42");
            then.status(502);
        });

        let client = ApiClient::new(&server.base_url(), policy()).unwrap();
        assert!(client.remove_favorite("42").await.is_err());
        mock.assert_hits(3);
    }

    #[tokio::test]
    async fn test_invalid_vin_never_reaches_server() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/import-requests");
            then.status(201).json_body(serde_json::json!({"id": "r1"}));
        });

        let client = ApiClient::new(&server.base_url(), policy()).unwrap();
        let request = ImportRequest {
            make: "Subaru".to_string(),
            model: "Outback".to_string(),
            year: 2019,
            vin: Some("SHORTVIN".to_string()),
            budget: 20_000.0,
            notes: None,
        };

        let err = client.create_import_request(&request).await.unwrap_err();
        assert!(matches!(err, StorefrontError::ValidationError { .. }));
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_create_import_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/import-requests")
                .json_body_partial(r#"{"make": "Subaru", "vin": "JF1BR9BC5KG012345"}"#);
            then.status(201)
                .json_body(serde_json::json!({"data": {"id": "r1", "status": "pending"}}));
        });

        let client = ApiClient::new(&server.base_url(), policy()).unwrap();
        let request = ImportRequest {
            make: "Subaru".to_string(),
            model: "Outback".to_string(),
            year: 2019,
            vin: Some("JF1BR9BC5KG012345".to_string()),
            budget: 20_000.0,
            notes: Some("Prefer silver".to_string()),
        };

        let receipt = client.create_import_request(&request).await.unwrap();
        mock.assert();
        assert_eq!(receipt.id, "r1");
        assert_eq!(receipt.status.as_deref(), Some("pending"));
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_file() {
        let client = ApiClient::new("http://127.0.0.1:9", policy()).unwrap();
        let document = FinancingDocument {
            document_type: "payslip".to_string(),
            file_name: "payslip.exe".to_string(),
            content: vec![1, 2, 3],
        };
        assert!(client.upload_financing_document("app-1", &document).await.is_err());
    }
}
