//! Integration tests for RightHair AI.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p righthair-integration-tests
//! ```
//!
//! Every test starts the real router on `127.0.0.1:0` with its static root
//! in a temporary directory. The three upstream providers are `httpmock`
//! servers, so nothing leaves the machine.
//!
//! # Test Categories
//!
//! - `relays` - upload, age filter, checkout and current-user relays
//! - `auth` - login redirect, callback and logout
//! - `pages` - server-rendered pages, static files and headers

use std::net::SocketAddr;

use httpmock::{Mock, MockServer, prelude::*};
use righthair_core::ProductId;
use righthair_web::config::{
    IdentityConfig, ImageGenConfig, PaymentsConfig, PricingConfig, WebConfig,
};
use righthair_web::state::AppState;
use secrecy::SecretString;
use serde_json::json;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Image-generation key the mock expects in `Authorization`.
pub const ARK_KEY: &str = "ark-test-7Hq2Lp9xVb4N";

/// Payments key the mock expects in `x-api-key`.
pub const CREEM_KEY: &str = "creem-test-Rw5Tz8Kd3Jm1";

/// Identity provider public key the mock expects in `apikey`.
pub const SUPABASE_ANON_KEY: &str = "sb-anon-Gf6Ys0Pn2Qc7";

/// Access token the mocked identity provider issues on sign-in.
pub const ACCESS_TOKEN: &str = "access-token-1";

/// Product id configured for the Pro tier.
pub const PRO_PRODUCT: &str = "prod_pro_123";

/// Knobs for one test server.
#[derive(Debug, Clone)]
pub struct TestOptions {
    pub ark_key: bool,
    pub creem_key: bool,
    pub public_site_url: Option<String>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            ark_key: true,
            creem_key: true,
            public_site_url: None,
        }
    }
}

/// A running app plus its mocked upstreams.
pub struct TestServer {
    pub addr: SocketAddr,
    /// Client with a cookie store that never follows redirects.
    pub client: reqwest::Client,
    pub ark: MockServer,
    pub creem: MockServer,
    pub supabase: MockServer,
    pub static_dir: TempDir,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with both provider keys configured.
    pub async fn start() -> Self {
        Self::start_with(TestOptions::default()).await
    }

    /// Start a server with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the listener, temp dir or client cannot be created.
    pub async fn start_with(options: TestOptions) -> Self {
        let ark = MockServer::start_async().await;
        let creem = MockServer::start_async().await;
        let supabase = MockServer::start_async().await;
        let static_dir = TempDir::new().expect("Failed to create static dir");

        let config = WebConfig {
            host: "127.0.0.1".parse().expect("valid loopback address"),
            port: 0,
            public_site_url: options.public_site_url,
            static_dir: static_dir.path().to_path_buf(),
            image_gen: ImageGenConfig {
                api_key: options.ark_key.then(|| SecretString::from(ARK_KEY)),
                api_base: ark.base_url(),
            },
            payments: PaymentsConfig {
                api_key: options.creem_key.then(|| SecretString::from(CREEM_KEY)),
                api_base: creem.base_url(),
            },
            identity: IdentityConfig {
                url: supabase.base_url(),
                anon_key: SecretString::from(SUPABASE_ANON_KEY),
            },
            pricing: PricingConfig {
                basic: None,
                pro: Some(ProductId::new(PRO_PRODUCT)),
                team: None,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_traces_sample_rate: 0.0,
        };

        let state = AppState::new(config).expect("Failed to build app state");
        let app = righthair_web::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener has an address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            addr,
            client,
            ark,
            creem,
            supabase,
            static_dir,
            handle,
        }
    }

    /// Start a login so the session holds a PKCE verifier.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn begin_login(&self) -> reqwest::Response {
        self.client
            .get(self.url("/api/auth/login"))
            .send()
            .await
            .expect("login request failed")
    }

    /// Mock a successful code exchange for `code` issuing [`ACCESS_TOKEN`].
    pub async fn mock_token_exchange(&self, code: &str, expires_in: i64) -> Mock<'_> {
        let code = code.to_string();
        self.supabase
            .mock_async(move |when, then| {
                when.method(POST)
                    .path("/auth/v1/token")
                    .query_param("grant_type", "pkce")
                    .header("apikey", SUPABASE_ANON_KEY)
                    .body_includes(format!("\"auth_code\":\"{code}\""))
                    .body_includes("\"code_verifier\":\"");
                then.status(200).json_body(json!({
                    "access_token": ACCESS_TOKEN,
                    "token_type": "bearer",
                    "expires_in": expires_in,
                    "refresh_token": "refresh-token-1",
                    "user": { "id": "usr_1" }
                }));
            })
            .await
    }

    /// Run the whole login flow and return the callback response.
    pub async fn sign_in(&self, next: &str) -> reqwest::Response {
        self.sign_in_with_expiry(next, 3600).await
    }

    /// Like [`Self::sign_in`] with a custom token lifetime in seconds.
    ///
    /// # Panics
    ///
    /// Panics if a request fails.
    pub async fn sign_in_with_expiry(&self, next: &str, expires_in: i64) -> reqwest::Response {
        self.begin_login().await;
        self.mock_token_exchange("code-123", expires_in).await;

        self.client
            .get(self.url(&format!("/auth/callback?code=code-123&next={next}")))
            .send()
            .await
            .expect("callback request failed")
    }

    /// Absolute URL for a path on the app.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Origin the app sees in `Host`.
    #[must_use]
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
