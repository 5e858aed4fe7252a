use secrecy::SecretString;

pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 10;
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
pub const MAX_FORM_MEMORY_BYTES: usize = 2 * 1024 * 1024;

/// Hardening flags for any cookie this service would set.
///
/// No current route sets a cookie; the flags are carried configuration
/// surface so a future session layer inherits them.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub secure: bool,
    pub http_only: bool,
    pub same_site: &'static str,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            secure: true,
            http_only: true,
            same_site: "Lax",
        }
    }
}

/// Process-wide configuration, immutable after startup.
///
/// One active signing secret plus zero or more fallbacks. Only the active
/// secret signs; fallbacks exist so consumers can keep verifying tokens
/// across a rotation.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub secret_key: SecretString,
    pub secret_key_fallbacks: Vec<SecretString>,
    pub dsn: Option<String>,
    pub max_body_bytes: usize,
    pub max_form_memory_bytes: usize,
    pub default_rate_limit: u32,
    pub cookie_policy: CookiePolicy,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            secret_key,
            secret_key_fallbacks: Vec::new(),
            dsn: None,
            max_body_bytes: MAX_BODY_BYTES,
            max_form_memory_bytes: MAX_FORM_MEMORY_BYTES,
            default_rate_limit: DEFAULT_RATE_LIMIT_PER_MINUTE,
            cookie_policy: CookiePolicy::default(),
        }
    }
}
