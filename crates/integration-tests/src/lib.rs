//! Integration tests for Home Care.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; a
//! [`TestApp`] keeps the session cookie between requests like a browser
//! would, so each test starts from a fresh profile.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p homecare-integration-tests
//! ```

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use tower::ServiceExt;

use homecare_web::config::{Delays, HomecareConfig};
use homecare_web::state::AppState;

const MULTIPART_BOUNDARY: &str = "homecare-test-boundary";

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Decoded value of a query parameter in the redirect target.
    #[must_use]
    pub fn location_param(&self, key: &str) -> Option<String> {
        let (_, query) = self.location()?.split_once('?')?;
        query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then(|| urlencoding::decode(v).map(|s| s.into_owned()).ok())?
        })
    }
}

/// One simulated browser.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// An app on an in-memory store with no simulated latency.
    ///
    /// # Panics
    ///
    /// Panics if the state cannot be built.
    #[must_use]
    pub fn new() -> Self {
        let config = HomecareConfig {
            delays: Delays::none(),
            ..HomecareConfig::default()
        };
        let state = AppState::new(config).expect("in-memory state");
        Self {
            router: homecare_web::app(state),
            cookie: None,
        }
    }

    /// A second browser on the same server, without this one's cookie.
    #[must_use]
    pub fn other_browser(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not UTF-8.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::get(path).body(Body::empty()).expect("request");
        self.send(request).await
    }

    /// POST an urlencoded form.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not UTF-8.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request");
        self.send(request).await
    }

    /// POST a single file field as `multipart/form-data`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not UTF-8.
    pub async fn post_file(
        &mut self,
        path: &str,
        field: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> TestResponse {
        let mut body = format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

        let request = Request::post(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");
        self.send(request).await
    }

    /// Log in with any email; returns the redirect.
    pub async fn login(&mut self, email: &str) -> TestResponse {
        self.post_form("/login", &[("email", email), ("password", "whatever")])
            .await
    }

    pub async fn login_admin(&mut self) -> TestResponse {
        self.post_form("/login/admin", &[]).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().expect("cookie header"));
        }
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(set_cookie.to_owned());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
        }
    }
}
