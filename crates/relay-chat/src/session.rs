//! Session identity: which transcript a request belongs to.
//!
//! Pure lookup. Sessions are never created, validated, or expired here.

/// Every place a request may carry a session id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionHint {
    /// `sessionId` in the JSON body.
    pub body: Option<String>,
    /// `sessionId` in the query string (read path only).
    pub query: Option<String>,
    /// Server-assigned token from the session cookie.
    pub cookie: Option<String>,
}

impl SessionHint {
    pub fn from_body(session_id: Option<String>) -> Self {
        Self {
            body: session_id,
            ..Self::default()
        }
    }

    pub fn from_query(session_id: Option<String>) -> Self {
        Self {
            query: session_id,
            ..Self::default()
        }
    }

    pub fn with_cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie;
        self
    }
}

/// Resolves a [`SessionHint`] to a session id.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    fallback: String,
}

impl SessionResolver {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// First non-blank of body, query, cookie; else the fallback.
    ///
    /// An explicit id always beats the cookie.
    pub fn resolve(&self, hint: &SessionHint) -> String {
        [&hint.body, &hint.query, &hint.cookie]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or(&self.fallback)
            .to_string()
    }
}

impl Default for SessionResolver {
    fn default() -> Self {
        Self::new("default")
    }
}
