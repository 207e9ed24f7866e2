//! Host collaborators and the context attached to every forwarded event.
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::net::IpAddr;

use thiserror::Error;
use url::Url;

/// Describes the request currently served by the host.
pub trait RequestContext {
    /// Returns `true` for command line invocations.
    fn is_console_request(&self) -> bool;

    /// The address of the client that issued the request.
    fn remote_ip(&self) -> Option<IpAddr>;

    /// The resolved URL of a web request.
    fn url(&self) -> Option<Url>;

    /// The invoked script of a console request.
    fn script_path(&self) -> Option<String>;

    /// The arguments of a console request.
    fn params(&self) -> Vec<String>;
}

/// An authenticated user of the host application.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity {
    /// The stable user id.
    pub id: String,
    /// The email address, if known.
    pub email: Option<String>,
    /// The login name, if known.
    pub username: Option<String>,
    /// Whether the user has administrative rights.
    pub admin: bool,
    /// Names of the groups the user belongs to.
    pub groups: Vec<String>,
}

/// Provides the currently authenticated user, if any.
pub trait IdentityProvider {
    /// Returns `None` for anonymous requests.
    fn identity(&self) -> Option<Identity>;
}

/// Name and version of a driver the host runs on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverInfo {
    /// The driver name, e.g. `MySQL`.
    pub name: String,
    /// The driver version.
    pub version: String,
}

impl DriverInfo {
    /// Creates a new driver description.
    pub fn new<N: Into<String>, V: Into<String>>(name: N, version: V) -> Self {
        DriverInfo {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for DriverInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Failure of an optional environment probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The host does not support this probe.
    #[error("{0} probe is not available")]
    Unavailable(&'static str),
    /// The probe ran and failed.
    #[error("probe failed")]
    Failed(#[source] Box<dyn Error + Send + Sync + 'static>),
}

impl ProbeError {
    /// Wraps an arbitrary error.
    pub fn failed<E: Into<Box<dyn Error + Send + Sync + 'static>>>(error: E) -> Self {
        ProbeError::Failed(error.into())
    }
}

/// Describes the host application and its runtime.
pub trait EnvironmentProbe {
    /// The configured application name, also used as the `app` tag.
    fn app_name(&self) -> String;
    /// The product edition.
    fn edition(&self) -> String;
    /// The application version.
    fn version(&self) -> String;
    /// The version of the installed data schema.
    fn schema_version(&self) -> String;
    /// Returns `true` in development mode.
    fn dev_mode(&self) -> bool;
    /// The deployment environment name.
    fn environment(&self) -> String;
    /// The version of the runtime the host executes on.
    fn runtime_version(&self) -> String;

    /// The data store driver and its version.
    fn database(&self) -> Result<DriverInfo, ProbeError> {
        Err(ProbeError::Unavailable("database"))
    }

    /// The image processing driver and its version.
    fn image_driver(&self) -> Result<DriverInfo, ProbeError> {
        Err(ProbeError::Unavailable("image driver"))
    }
}

/// The collaborators a forwarding call reads context from.
#[derive(Clone, Copy)]
pub struct HostContext<'a> {
    /// The request being served.
    pub request: &'a dyn RequestContext,
    /// The current user.
    pub identity: &'a dyn IdentityProvider,
    /// The application and runtime.
    pub environment: &'a dyn EnvironmentProbe,
}

impl<'a> HostContext<'a> {
    /// Bundles the host collaborators.
    pub fn new(
        request: &'a dyn RequestContext,
        identity: &'a dyn IdentityProvider,
        environment: &'a dyn EnvironmentProbe,
    ) -> Self {
        HostContext {
            request,
            identity,
            environment,
        }
    }
}

impl fmt::Debug for HostContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("console", &self.request.is_console_request())
            .field("app", &self.environment.app_name())
            .finish()
    }
}

/// User information attached to an event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserContext {
    /// The stable user id.
    pub id: String,
    /// The email address, if known.
    pub email: Option<String>,
    /// The login name, if known.
    pub username: Option<String>,
    /// The remote address of the request.
    pub ip_address: Option<IpAddr>,
    /// `Yes` or `No`.
    pub admin: String,
    /// Comma joined group names, empty without groups.
    pub groups: String,
}

/// Builds the user context for the current identity.
///
/// Returns `None` without an authenticated identity or when users are
/// anonymized.
pub fn build_user_context(
    identity: Option<&Identity>,
    request: &dyn RequestContext,
    anonymize: bool,
) -> Option<UserContext> {
    if anonymize {
        return None;
    }
    let identity = identity?;
    Some(UserContext {
        id: identity.id.clone(),
        email: identity.email.clone(),
        username: identity.username.clone(),
        ip_address: request.remote_ip(),
        admin: if identity.admin { "Yes" } else { "No" }.to_owned(),
        groups: identity.groups.join(", "),
    })
}

fn probe<F>(name: &str, f: F) -> Option<DriverInfo>
where
    F: FnOnce() -> Result<DriverInfo, ProbeError>,
{
    match f() {
        Ok(info) => Some(info),
        Err(err) => {
            forwarder_debug!("skipping {} context: {}", name, err);
            None
        }
    }
}

/// Builds the extra context attached to every event.
///
/// The core keys are always present.  Driver keys are added only when their
/// probe succeeds.
pub fn build_extras(
    request: &dyn RequestContext,
    environment: &dyn EnvironmentProbe,
) -> BTreeMap<String, String> {
    let mut extras = BTreeMap::new();
    let mut put = |key: &str, value: String| {
        extras.insert(key.to_owned(), value);
    };

    put("App Name", environment.app_name());
    put("App Edition", environment.edition());
    put("App Version", environment.version());
    put("App Version (schema)", environment.schema_version());
    put(
        "Dev Mode",
        if environment.dev_mode() { "Yes" } else { "No" }.to_owned(),
    );
    put("Environment", environment.environment());
    put("Runtime Version", environment.runtime_version());

    if request.is_console_request() {
        put("Request Type", "Console".to_owned());
        put("Script", request.script_path().unwrap_or_default());
        put("Arguments", request.params().join(" "));
    } else {
        put("Request Type", "Web".to_owned());
        put(
            "Url",
            request.url().map(|url| url.to_string()).unwrap_or_default(),
        );
    }

    if let Some(database) = probe("database", || environment.database()) {
        put("Database Driver & Version", database.to_string());
    }
    if let Some(image) = probe("image driver", || environment.image_driver()) {
        put("Image Driver & Version", image.to_string());
    }

    extras
}
