//! Request attribute resolvers.
//!
//! Each resolver checks the per-request [`RequestContext`](crate::middleware::RequestContext)
//! memo first, derives the value from the raw request on a miss, and stores it
//! for later callers handling the same request.
//!
//! Failure policy differs by attribute. User resolution and the login
//! location lookup degrade to a default value. A malformed JSON body and a
//! missing `User-Agent` header are returned as errors.

mod agent;
mod ip;
mod location;
mod params;
mod path;
mod user;

pub use agent::{resolve_browser, resolve_os, user_agent};
pub use ip::{resolve_ip, UNKNOWN_IP};
pub use location::resolve_login_location;
pub use params::resolve_parameters;
pub use path::{canonical_template, resolve_canonical_path_template, resolve_path_template};
pub use user::resolve_user;
