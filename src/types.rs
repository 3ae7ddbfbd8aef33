use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request parameters merged from query string, form body or JSON body.
pub type ParsedParameters = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

/// The credential an authenticator accepted alongside the principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    ApiKey(String),
}

/// Never absent: a request without a principal resolves to `Anonymous`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedUser {
    Authenticated(Principal),
    Anonymous,
}

impl ResolvedUser {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, ResolvedUser::Authenticated(_))
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            ResolvedUser::Authenticated(p) => Some(p),
            ResolvedUser::Anonymous => None,
        }
    }
}

/// Bearer token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub user_id: Option<String>,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub expires_at: String,
}

/// A URL argument handed to the heuristic path template resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathArg {
    Str(String),
    Seq(Vec<String>),
    /// Only the values are masked; keys are ignored.
    Map(Vec<(String, String)>),
}

impl PathArg {
    pub fn is_empty(&self) -> bool {
        match self {
            PathArg::Str(s) => s.is_empty(),
            PathArg::Seq(v) => v.is_empty(),
            PathArg::Map(m) => m.is_empty(),
        }
    }
}

impl From<&str> for PathArg {
    fn from(value: &str) -> Self {
        PathArg::Str(value.to_owned())
    }
}

impl From<String> for PathArg {
    fn from(value: String) -> Self {
        PathArg::Str(value)
    }
}

/// Router output binding path segments to positional and named parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMatch {
    pub args: Vec<String>,
    pub kwargs: Vec<(String, String)>,
}

#[derive(Debug, Serialize)]
pub struct InspectionReport {
    pub user: ResolvedUser,
    pub ip: String,
    pub parameters: ParsedParameters,
    pub path_template: String,
    pub canonical_path_template: String,
    pub browser: String,
    pub os: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
