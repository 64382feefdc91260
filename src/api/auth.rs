//! Session token lookup.
//!
//! Every backend call is authenticated with a bearer token read from local
//! session state. The source is injected so tests and alternative shells can
//! supply their own.

/// Source of the current session's bearer token.
///
/// Returning `None` means no session is established; callers fail the
/// operation before issuing any network request.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Token provider backed by a fixed string, resolved once at startup.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Option<String> {
        Some(self.token.clone())
    }
}

/// Token provider that reads an environment variable at each call, so a
/// token established after startup is picked up without restarting.
pub struct EnvTokenProvider {
    var_name: String,
}

impl EnvTokenProvider {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }
}

impl TokenProvider for EnvTokenProvider {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var_name)
            .ok()
            .filter(|token| !token.is_empty())
    }
}

/// Token provider with no session. Every operation fails pre-flight.
pub struct NoTokenProvider;

impl TokenProvider for NoTokenProvider {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}
