//! DNS resolution seam

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::error::{ResolveError, ResolveErrorKind};

/// Hostname resolution as the scanner sees it: success, or a short
/// error code describing why the name did not resolve.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, hostname: &str) -> Result<(), String>;
}

/// Resolver backed by the platform's DNS configuration. Lookup timeouts
/// are the resolver's own; the scanner adds none on top.
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    pub fn from_system_conf() -> Result<Self, ResolveError> {
        Ok(Self {
            inner: TokioAsyncResolver::tokio_from_system_conf()?,
        })
    }
}

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, hostname: &str) -> Result<(), String> {
        self.inner
            .lookup_ip(hostname)
            .await
            .map(|_| ())
            .map_err(|e| error_code(&e))
    }
}

fn error_code(err: &ResolveError) -> String {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => response_code.to_string(),
        ResolveErrorKind::Timeout => "Timeout".to_string(),
        ResolveErrorKind::Io(io_err) => format!("{:?}", io_err.kind()),
        _ => "Unresolvable".to_string(),
    }
}
