#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use devcamper_api::auth::{generate_jwt, Claims};
use devcamper_api::config::AppConfig;
use devcamper_api::database::models::{Role, User};
use devcamper_api::database::schema::to_document;
use devcamper_api::database::{Collection, MemoryStore, Store};
use devcamper_api::services::{
    FileStorage, GeoPoint, GeocodeError, GeocodedAddress, Geocoder, LocalFileStorage, StorageError,
};
use devcamper_api::state::AppState;

pub const BOSTON: GeoPoint = GeoPoint { longitude: -71.104028, latitude: 42.350846 };
pub const LOWELL: GeoPoint = GeoPoint { longitude: -71.324643, latitude: 42.646677 };
pub const DENVER: GeoPoint = GeoPoint { longitude: -104.990251, latitude: 39.739236 };

pub const UPLOAD_LIMIT: usize = 1024;

/// Geocoder answering from a fixed table of queries
#[derive(Default)]
pub struct StaticGeocoder {
    points: HashMap<String, GeoPoint>,
}

impl StaticGeocoder {
    pub fn with(mut self, query: &str, point: GeoPoint) -> Self {
        self.points.insert(query.to_string(), point);
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
        Ok(self.points.get(query).map(|point| GeocodedAddress {
            point: *point,
            formatted_address: Some(query.to_string()),
            street: None,
            city: None,
            state: None,
            zipcode: None,
            country: Some("US".to_string()),
        }))
    }
}

/// Keeps uploaded files in memory
#[derive(Default)]
pub struct MemoryFileStorage {
    pub files: Mutex<HashMap<String, Bytes>>,
}

#[async_trait]
impl FileStorage for MemoryFileStorage {
    async fn put(&self, name: &str, data: Bytes) -> Result<(), StorageError> {
        self.files.lock().unwrap().insert(name.to_string(), data);
        Ok(())
    }
}

/// Storage whose writes always fail
pub struct FailingFileStorage;

#[async_trait]
impl FileStorage for FailingFileStorage {
    async fn put(&self, _name: &str, _data: Bytes) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub files: Arc<MemoryFileStorage>,
    pub config: AppConfig,
}

/// A stored user plus a bearer token for them
pub struct TestUser {
    pub id: Uuid,
    pub role: Role,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_geocoder(default_geocoder())
    }

    pub fn with_geocoder(geocoder: StaticGeocoder) -> Self {
        let files = Arc::new(MemoryFileStorage::default());
        Self::build(geocoder, files.clone(), files, |_| {})
    }

    pub fn with_failing_storage() -> Self {
        Self::build(default_geocoder(), Arc::new(FailingFileStorage), Arc::new(MemoryFileStorage::default()), |_| {})
    }

    /// Default app with test settings adjusted by `configure`
    pub fn with_config(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let files = Arc::new(MemoryFileStorage::default());
        Self::build(default_geocoder(), files.clone(), files, configure)
    }

    /// Uploads written to and served from `dir` on disk
    pub fn with_upload_dir(dir: &Path) -> Self {
        let storage = Arc::new(LocalFileStorage::new(dir));
        let dir = dir.to_path_buf();
        Self::build(default_geocoder(), storage, Arc::new(MemoryFileStorage::default()), move |config| {
            config.uploads.file_upload_path = dir;
        })
    }

    fn build(
        geocoder: StaticGeocoder,
        storage: Arc<dyn FileStorage>,
        files: Arc<MemoryFileStorage>,
        configure: impl FnOnce(&mut AppConfig),
    ) -> Self {
        let mut config = AppConfig::development();
        config.query.debug_logging = false;
        config.uploads.max_file_upload = UPLOAD_LIMIT;
        config.api.enable_rate_limiting = false;
        configure(&mut config);

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), Arc::new(geocoder), storage, config.clone());
        Self { router: devcamper_api::app(state), store, files, config }
    }

    /// Store a user with `role` and mint a token for them
    pub async fn user(&self, role: Role) -> Result<TestUser> {
        let id = Uuid::new_v4();
        let user = User {
            id,
            name: format!("{} {}", role, &id.to_string()[..8]),
            email: format!("{}@example.com", id),
            role,
            created_at: chrono::Utc::now(),
        };
        self.store.create(Collection::User, to_document(&user)?).await?;

        let token = generate_jwt(&Claims::new(id, role, 1), self.config.jwt_secret())?;
        Ok(TestUser { id, role, token })
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn send(&self, method: Method, uri: &str, user: &TestUser, body: Value) -> Result<(StatusCode, Value)> {
        self.request(method, uri, Some(&user.token), Some(body)).await
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.dispatch(request).await
    }

    /// PUT a single-part multipart body with the given field, filename and content type
    pub async fn upload(
        &self,
        uri: &str,
        user: &TestUser,
        field: &str,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<(StatusCode, Value)> {
        let boundary = "devcamper-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n", field, file_name).as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", user.token))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))?;
        self.dispatch(request).await
    }

    /// GET returning status, headers and the undecoded body
    pub async fn get_raw(&self, uri: &str) -> Result<(StatusCode, HeaderMap, Bytes)> {
        let request = Request::builder().method(Method::GET).uri(uri).body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        let (parts, body) = response.into_parts();
        Ok((parts.status, parts.headers, to_bytes(body, usize::MAX).await?))
    }

    async fn dispatch(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok((status, value))
    }

    /// Create a bootcamp through the API and return its id
    pub async fn bootcamp(&self, owner: &TestUser, name: &str, extra: Value) -> Result<String> {
        let mut body = json!({
            "name": name,
            "description": format!("{} description", name),
            "address": "233 Bay State Rd Boston MA 02215",
            "careers": ["Web Development"],
        });
        if let (Some(target), Value::Object(extra)) = (body.as_object_mut(), extra) {
            target.extend(extra);
        }
        let (status, value) = self.send(Method::POST, "/api/v1/bootcamps", owner, body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "bootcamp create failed: {} {}", status, value);
        id_of(&value)
    }
}

fn default_geocoder() -> StaticGeocoder {
    StaticGeocoder::default()
        .with("233 Bay State Rd Boston MA 02215", BOSTON)
        .with("220 Pawtucket St, Lowell, MA 01854", LOWELL)
        .with("1600 Broadway Denver CO 80202", DENVER)
        .with("02215", BOSTON)
        .with("80202", DENVER)
}

pub fn id_of(body: &Value) -> Result<String> {
    body["data"]["id"]
        .as_str()
        .map(str::to_string)
        .context("response has no data.id")
}
