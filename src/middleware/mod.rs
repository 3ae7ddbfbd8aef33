pub mod auth;
pub mod device_info;

use axum::http::Extensions;
use crate::types::{ParsedParameters, ResolvedUser};

/// Per-request memo of derived attributes, stored in the request extensions.
///
/// Resolvers read their slot first and fill it on a miss. An empty value is
/// treated as a miss.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    /// Outcome of the authenticator chain, anonymous included.
    pub user: Option<ResolvedUser>,
    pub ip: Option<String>,
    pub parameters: Option<ParsedParameters>,
    pub path_template: Option<String>,
    pub canonical_path_template: Option<String>,
}

impl RequestContext {
    pub fn of(extensions: &Extensions) -> Option<&Self> {
        extensions.get::<Self>()
    }

    pub fn of_mut(extensions: &mut Extensions) -> &mut Self {
        extensions.get_or_insert_default::<Self>()
    }

    pub fn cached_user(extensions: &Extensions) -> Option<ResolvedUser> {
        Self::of(extensions).and_then(|c| c.user.clone())
    }

    pub fn cached_ip(extensions: &Extensions) -> Option<String> {
        Self::of(extensions).and_then(|c| non_empty(&c.ip))
    }

    pub fn cached_path_template(extensions: &Extensions) -> Option<String> {
        Self::of(extensions).and_then(|c| non_empty(&c.path_template))
    }

    pub fn cached_canonical_path_template(extensions: &Extensions) -> Option<String> {
        Self::of(extensions).and_then(|c| non_empty(&c.canonical_path_template))
    }

    pub fn cached_parameters(extensions: &Extensions) -> Option<ParsedParameters> {
        Self::of(extensions)
            .and_then(|c| c.parameters.as_ref())
            .filter(|p| !p.is_empty())
            .cloned()
    }
}

fn non_empty(slot: &Option<String>) -> Option<String> {
    slot.as_deref().filter(|s| !s.is_empty()).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slots_are_misses() {
        let mut ext = Extensions::new();
        assert_eq!(RequestContext::cached_ip(&ext), None);

        RequestContext::of_mut(&mut ext).ip = Some(String::new());
        assert_eq!(RequestContext::cached_ip(&ext), None);

        RequestContext::of_mut(&mut ext).ip = Some("10.0.0.1".into());
        assert_eq!(RequestContext::cached_ip(&ext).as_deref(), Some("10.0.0.1"));
        assert_eq!(RequestContext::cached_parameters(&ext), None);
    }
}
