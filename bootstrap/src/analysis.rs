//! Scrutinizer repository registration.
//!
//! Registration is a single authenticated POST. It only runs when an access
//! token is configured, and any failure is reported as a warning by the
//! caller rather than aborting the bootstrap.

use crate::config::ScrutinizerSettings;
use log::{debug, info};
use serde::Serialize;
use std::sync::OnceLock;
use std::time::Duration;

/// Endpoint that registers GitHub repositories with Scrutinizer.
pub const SCRUTINIZER_ENDPOINT: &str = "https://scrutinizer-ci.com/api/repositories/g";

/// Network timeout for the registration request.
const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON body of the registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryPayload {
    /// Repository name, `vendor/name`.
    pub name: String,
    /// Owning organisation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Global configuration to attach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_config: Option<String>,
}

impl RepositoryPayload {
    /// Builds the payload for `library` from the configured settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use library_bootstrap::analysis::RepositoryPayload;
    /// use library_bootstrap::config::ScrutinizerSettings;
    ///
    /// let payload = RepositoryPayload::new("acme/my-lib", &ScrutinizerSettings::default());
    /// assert_eq!(serde_json::to_string(&payload).unwrap(), r#"{"name":"acme/my-lib"}"#);
    /// ```
    #[must_use]
    pub fn new(library: &str, settings: &ScrutinizerSettings) -> Self {
        Self {
            name: library.to_owned(),
            organization: settings.organization.clone(),
            global_config: settings.global_config.clone(),
        }
    }
}

/// Errors arising from the registration request.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// Scrutinizer answered with a non-success status.
    #[error("scrutinizer responded with HTTP {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// The request could not be completed.
    #[error("scrutinizer request failed: {reason}")]
    Transport {
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The payload could not be encoded.
    #[error("failed to encode registration payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Trait for registering repositories with the analysis service.
///
/// Abstractions allow tests to observe registration without network access.
#[cfg_attr(test, mockall::automock)]
pub trait AnalysisRegistrar {
    /// Registers the repository described by `payload`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    fn register(
        &self,
        access_token: &str,
        payload: &RepositoryPayload,
    ) -> Result<(), RegistrationError>;
}

/// HTTP registrar using `ureq`.
#[derive(Debug, Clone)]
pub struct HttpRegistrar {
    endpoint: String,
}

impl Default for HttpRegistrar {
    fn default() -> Self {
        Self::new(SCRUTINIZER_ENDPOINT)
    }
}

impl HttpRegistrar {
    /// Creates a registrar posting to `endpoint`.
    #[must_use]
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
        }
    }
}

impl AnalysisRegistrar for HttpRegistrar {
    fn register(
        &self,
        access_token: &str,
        payload: &RepositoryPayload,
    ) -> Result<(), RegistrationError> {
        let body = serde_json::to_string(payload)?;
        debug!("registering {} at {}", payload.name, self.endpoint);

        http_agent()
            .post(self.endpoint.as_str())
            .query("access_token", access_token)
            .header("Content-Type", "application/json")
            .send(body.as_str())
            .map_err(|err| map_ureq_error(&err))?;

        Ok(())
    }
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(REGISTRATION_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`RegistrationError`].
fn map_ureq_error(err: &ureq::Error) -> RegistrationError {
    match err {
        ureq::Error::StatusCode(status) => RegistrationError::Status { status: *status },
        other => RegistrationError::Transport {
            reason: other.to_string(),
        },
    }
}

/// Result of the registration stage.
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// No access token is configured; nothing was sent.
    Skipped,
    /// The repository was registered.
    Registered,
    /// The request failed.
    Failed(RegistrationError),
}

/// Registers `library` with Scrutinizer when an access token is configured.
#[must_use]
pub fn register_repository(
    registrar: &dyn AnalysisRegistrar,
    settings: &ScrutinizerSettings,
    library: &str,
) -> RegistrationOutcome {
    let Some(access_token) = settings.access_token.as_deref() else {
        return RegistrationOutcome::Skipped;
    };

    let payload = RepositoryPayload::new(library, settings);
    match registrar.register(access_token, &payload) {
        Ok(()) => {
            info!("registered {library} with scrutinizer");
            RegistrationOutcome::Registered
        }
        Err(err) => RegistrationOutcome::Failed(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    fn settings(token: Option<&str>, organization: Option<&str>) -> ScrutinizerSettings {
        ScrutinizerSettings {
            access_token: token.map(ToOwned::to_owned),
            organization: organization.map(ToOwned::to_owned),
            global_config: None,
        }
    }

    #[test]
    fn missing_token_skips_without_request() {
        let registrar = MockAnalysisRegistrar::new();

        let outcome = register_repository(&registrar, &settings(None, Some("acme")), "acme/my-lib");

        assert!(matches!(outcome, RegistrationOutcome::Skipped));
    }

    #[test]
    fn token_and_optional_fields_are_forwarded() {
        let mut registrar = MockAnalysisRegistrar::new();
        registrar
            .expect_register()
            .withf(|token, payload| {
                token == "secret"
                    && payload.name == "acme/my-lib"
                    && payload.organization.as_deref() == Some("acme-org")
                    && payload.global_config.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = register_repository(
            &registrar,
            &settings(Some("secret"), Some("acme-org")),
            "acme/my-lib",
        );

        assert!(matches!(outcome, RegistrationOutcome::Registered));
    }

    #[test]
    fn rejected_registration_is_reported_not_raised() {
        let mut registrar = MockAnalysisRegistrar::new();
        registrar
            .expect_register()
            .times(1)
            .returning(|_, _| Err(RegistrationError::Status { status: 403 }));

        let outcome = register_repository(&registrar, &settings(Some("secret"), None), "acme/my-lib");

        assert!(matches!(
            outcome,
            RegistrationOutcome::Failed(RegistrationError::Status { status: 403 })
        ));
    }

    #[rstest]
    #[case::name_only(None, None, r#"{"name":"acme/my-lib"}"#)]
    #[case::all_fields(
        Some("acme-org"),
        Some("php"),
        r#"{"name":"acme/my-lib","organization":"acme-org","global_config":"php"}"#
    )]
    fn payload_omits_unset_fields(
        #[case] organization: Option<&str>,
        #[case] global_config: Option<&str>,
        #[case] expected: &str,
    ) {
        let settings = ScrutinizerSettings {
            access_token: Some("secret".to_owned()),
            organization: organization.map(ToOwned::to_owned),
            global_config: global_config.map(ToOwned::to_owned),
        };
        let payload = RepositoryPayload::new("acme/my-lib", &settings);
        assert_eq!(serde_json::to_string(&payload).expect("encode"), expected);
    }

    #[test]
    fn map_ureq_error_keeps_status_code() {
        let mapped = map_ureq_error(&ureq::Error::StatusCode(500));
        assert!(matches!(mapped, RegistrationError::Status { status: 500 }));
    }

    #[test]
    fn map_ureq_error_maps_other_errors_to_transport() {
        let mapped = map_ureq_error(&ureq::Error::Io(std::io::Error::other("connection reset")));
        assert!(matches!(mapped, RegistrationError::Transport { .. }));
    }

    struct CapturedRequest {
        head: String,
        body: String,
    }

    /// Serves one request with `status_line` and hands back what was sent.
    fn serve_once(status_line: &'static str) -> (String, JoinHandle<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
        let addr = listener.local_addr().expect("listener address");
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept request");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut head = String::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("read header line");
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                head.push_str(&line);
            }
            let length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let mut body = vec![0; length];
            reader.read_exact(&mut body).expect("read body");
            let response = format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\n\r\n");
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            CapturedRequest {
                head,
                body: String::from_utf8(body).expect("body was not UTF-8"),
            }
        });
        (format!("http://{addr}/api/repositories/g"), handle)
    }

    #[test]
    fn http_registrar_posts_json_with_token_query() {
        let (endpoint, server) = serve_once("204 No Content");
        let payload = RepositoryPayload::new("acme/my-lib", &settings(None, Some("o")));

        HttpRegistrar::new(&endpoint)
            .register("tok en&x", &payload)
            .expect("registration should succeed");

        let request = server.join().expect("server thread panicked");
        assert!(
            request
                .head
                .starts_with("POST /api/repositories/g?access_token=tok%20en%26x "),
            "unexpected request: {}",
            request.head
        );
        assert!(
            request
                .head
                .lines()
                .any(|line| line.eq_ignore_ascii_case("content-type: application/json")),
            "missing JSON content type: {}",
            request.head
        );
        assert_eq!(request.body, r#"{"name":"acme/my-lib","organization":"o"}"#);
    }

    #[test]
    fn http_registrar_maps_rejection_to_status_error() {
        let (endpoint, server) = serve_once("403 Forbidden");
        let payload = RepositoryPayload::new("acme/my-lib", &settings(None, None));

        let err = HttpRegistrar::new(&endpoint)
            .register("token", &payload)
            .expect_err("a 403 should fail");

        server.join().expect("server thread panicked");
        assert!(matches!(err, RegistrationError::Status { status: 403 }));
    }
}
