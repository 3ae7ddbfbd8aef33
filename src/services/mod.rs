pub mod geo_lookup;
pub mod metrics;
pub mod resolve;
pub mod ua_parser;
