//! # Pipeline Steps
//!
//! The individual stages the controller runs, in order, for every request.
//! Each step is a plain function (async where it may call out to hooks or
//! adapters) returning [`ApiResult`](crate::types::ApiResult), so a failing
//! step skips everything after it.

pub mod apply_transform;
pub mod do_query;
pub mod label_to_ids;
pub mod make_query;
pub mod negotiate_content_type;
pub mod parse_filter;
pub mod parse_query_params;
pub mod parse_request_primary;
pub mod validate_content_type;
pub mod validate_document;
pub mod validate_request;
pub mod validate_resources;

pub use apply_transform::{apply_transform, apply_transform_all};
pub use do_query::do_query;
pub use label_to_ids::{is_empty_mapping, label_to_ids};
pub use make_query::make_query;
pub use negotiate_content_type::{ContentNegotiator, DefaultNegotiator};
pub use parse_filter::parse_filter;
pub use parse_query_params::{parse_query_params, ParamOptions, SortPrefix};
pub use parse_request_primary::parse_request_primary;
pub use validate_content_type::validate_content_type;
pub use validate_document::validate_document;
pub use validate_request::{check_body_existence, check_method};
pub use validate_resources::validate_resources;
