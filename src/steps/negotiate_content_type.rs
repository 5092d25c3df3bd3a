//! Response content negotiation.
//!
//! The negotiator sits behind a trait so a deployment can plug in its own
//! (possibly asynchronous) policy; the default implements the JSON:API
//! rules.

use futures_util::future::BoxFuture;

use crate::types::media_type::{MediaType, JSON, JSON_API};
use crate::types::{ApiError, ApiResult};

/// Picks the response media type from an `Accept` header
pub trait ContentNegotiator: Send + Sync {
    /// Resolve to one of `available` (or plain JSON, which is only ever
    /// used for error documents), or fail with 406
    fn negotiate<'a>(
        &'a self,
        accepts: Option<&'a str>,
        available: &'a [String],
    ) -> BoxFuture<'a, ApiResult<String>>;
}

/// JSON:API negotiation rules:
/// - no `Accept` header accepts anything
/// - a JSON:API range only counts when it carries no parameters besides `q`
/// - if every JSON:API range is parameterized the request is refused
/// - highest quality wins; ties go to the earlier available type
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNegotiator;

impl DefaultNegotiator {
    pub fn negotiate_now(accepts: Option<&str>, available: &[String]) -> ApiResult<String> {
        let Some(accepts) = accepts.filter(|a| !a.trim().is_empty()) else {
            return Ok(available
                .first()
                .cloned()
                .unwrap_or_else(|| JSON_API.to_string()));
        };

        let ranges = MediaType::parse_list(accepts);
        let json_api_ranges: Vec<&MediaType> =
            ranges.iter().filter(|r| r.essence == JSON_API).collect();
        if !json_api_ranges.is_empty()
            && json_api_ranges
                .iter()
                .all(|r| r.non_weight_params().next().is_some())
        {
            return Err(not_acceptable(
                "The JSON:API media type in your Accept header must be unmodified.",
            ));
        }

        let mut candidates: Vec<&str> = available.iter().map(String::as_str).collect();
        candidates.push(JSON);

        let mut best: Option<(&str, f32)> = None;
        for candidate in candidates {
            let quality = ranges
                .iter()
                .filter(|r| r.matches(candidate))
                .filter(|r| !(r.essence == JSON_API && r.non_weight_params().next().is_some()))
                .map(MediaType::quality)
                .fold(0.0_f32, f32::max);

            if quality > 0.0 && best.map_or(true, |(_, q)| quality > q) {
                best = Some((candidate, quality));
            }
        }

        best.map(|(media, _)| media.to_string())
            .ok_or_else(|| {
                not_acceptable(
                    "Your Accept header doesn't include any media type this server can produce.",
                )
            })
    }
}

fn not_acceptable(detail: &str) -> crate::types::ApiErrors {
    ApiError::not_acceptable("Not Acceptable").with_detail(detail).into()
}

impl ContentNegotiator for DefaultNegotiator {
    fn negotiate<'a>(
        &'a self,
        accepts: Option<&'a str>,
        available: &'a [String],
    ) -> BoxFuture<'a, ApiResult<String>> {
        Box::pin(async move { Self::negotiate_now(accepts, available) })
    }
}
