//! # API Controller
//!
//! Runs a normalized [`Request`] through every pipeline step and turns the
//! outcome, success or failure, into a [`Response`]. `handle` never fails:
//! any error raised along the way becomes an error document.
//!
//! ```text
//! method/body → negotiate → labels → params → type → body → query → render
//! ```

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::{debug_span, info, Instrument};

use crate::registry::{ResourceTypeRegistry, TransformContext, TransformMode};
use crate::steps::{
    apply_transform, apply_transform_all, check_body_existence, check_method, do_query,
    is_empty_mapping, label_to_ids, make_query, parse_query_params, parse_request_primary,
    validate_content_type, validate_document, validate_resources, ContentNegotiator,
    DefaultNegotiator, ParamOptions,
};
use crate::types::media_type::{JSON, JSON_API};
use crate::types::{
    ApiError, ApiErrors, ApiResult, Collection, Document, IdOrIds, PreparedRequest, PrimaryData,
    Query, QueryResult, Request, Response, TransportContext,
};

/// Per-request customization of the built query, applied just before it
/// runs. It may capture request data, add `returning` / `catch` hooks, or
/// reject the request. It may await I/O first, e.g. to look up which
/// records the caller can see.
pub type QueryTransform = Box<dyn FnOnce(Query) -> BoxFuture<'static, ApiResult<Query>> + Send>;

/// Box an async closure as a [`QueryTransform`]
pub fn query_transform<F, Fut>(transform: F) -> QueryTransform
where
    F: FnOnce(Query) -> Fut + Send + 'static,
    Fut: Future<Output = ApiResult<Query>> + Send + 'static,
{
    Box::new(move |query: Query| -> BoxFuture<'static, ApiResult<Query>> {
        Box::pin(transform(query))
    })
}

/// Controller settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiOptions {
    /// Extensions request bodies may name in `ext`
    pub supported_ext: Vec<String>,

    pub params: ParamOptions,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            supported_ext: vec!["bulk".to_string()],
            params: ParamOptions::default(),
        }
    }
}

/// The request pipeline
#[derive(Clone)]
pub struct ApiController {
    registry: Arc<ResourceTypeRegistry>,
    negotiator: Arc<dyn ContentNegotiator>,
    options: ApiOptions,
}

impl ApiController {
    pub fn new(registry: Arc<ResourceTypeRegistry>) -> Self {
        Self {
            registry,
            negotiator: Arc::new(DefaultNegotiator),
            options: ApiOptions::default(),
        }
    }

    pub fn with_negotiator(mut self, negotiator: impl ContentNegotiator + 'static) -> Self {
        self.negotiator = Arc::new(negotiator);
        self
    }

    pub fn with_options(mut self, options: ApiOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<ResourceTypeRegistry> {
        &self.registry
    }

    pub fn options(&self) -> &ApiOptions {
        &self.options
    }

    /// Process one request
    pub async fn handle(
        &self,
        request: Request,
        transport: TransportContext,
        transform: Option<QueryTransform>,
    ) -> Response {
        let span = debug_span!(
            "api_request",
            method = %request.method,
            resource_type = %request.resource_type,
        );
        self.handle_inner(request, transport, transform)
            .instrument(span)
            .await
    }

    async fn handle_inner(
        &self,
        request: Request,
        transport: TransportContext,
        transform: Option<QueryTransform>,
    ) -> Response {
        let mut response = Response::default();

        let outcome = match self.run(request, transport, transform, &mut response).await {
            Ok((result, ctx)) => self.render(result, &ctx, response.clone()).await,
            Err(errors) => Err(errors),
        };

        match outcome {
            Ok(rendered) => rendered,
            Err(errors) => error_response(response, errors),
        }
    }

    /// Build an error response for a failure raised outside the pipeline,
    /// e.g. a body that isn't JSON at all
    pub async fn response_from_external_error(
        &self,
        errors: impl Into<ApiErrors>,
        accepts: Option<&str>,
    ) -> Response {
        let mut response = Response::default();
        let available = [JSON_API.to_string()];
        if let Ok(negotiated) = self.negotiator.negotiate(accepts, &available).await {
            if negotiated == JSON {
                response.content_type = Some(negotiated);
            }
        }
        error_response(response, errors.into())
    }

    /// Steps up to and including query execution. Sets the negotiated
    /// content type on `response` as soon as it is known.
    async fn run(
        &self,
        mut request: Request,
        transport: TransportContext,
        transform: Option<QueryTransform>,
        response: &mut Response,
    ) -> ApiResult<(QueryResult, Arc<TransformContext>)> {
        let method = check_method(&request)?;
        check_body_existence(&request, method)?;

        let available = [JSON_API.to_string()];
        let content_type = self
            .negotiator
            .negotiate(request.accepts.as_deref(), &available)
            .await?;
        response.content_type = Some(content_type);
        response
            .headers
            .insert("Vary".to_string(), "Accept".to_string());

        let mut short_circuit = None;
        if request.allow_label {
            if let Some(id_or_ids) = request.id_or_ids.clone() {
                let mapped =
                    label_to_ids(&request.resource_type, &id_or_ids, &self.registry, &transport)
                        .await?;
                if is_empty_mapping(&mapped) {
                    short_circuit = Some(match &mapped {
                        Some(IdOrIds::Ids(_)) => PrimaryData::Collection(Collection::new(Vec::new())),
                        _ => PrimaryData::Null,
                    });
                }
                request.id_or_ids = mapped;
            }
        }

        let params = parse_query_params(&request.query_params, &self.options.params)?;

        if !self.registry.has_type(&request.resource_type) {
            return Err(ApiError::not_found(format!(
                "{} is not a valid type.",
                request.resource_type
            ))
            .into());
        }

        let ctx = Arc::new(TransformContext {
            request: request.clone(),
            transport,
        });

        let mut primary = None;
        if let Some(body) = &request.body {
            validate_content_type(&request, &self.options.supported_ext)?;
            validate_document(body)?;
            let data = body.get("data").unwrap_or(&Value::Null);
            let parsed = parse_request_primary(data, request.about_relationship())?;
            if !request.about_relationship() {
                validate_resources(&request.resource_type, &parsed, &self.registry)?;
            }
            primary = Some(
                apply_transform(parsed, TransformMode::BeforeSave, &self.registry, &ctx).await?,
            );
        }

        let result = match short_circuit {
            Some(data) => QueryResult::with_primary(data),
            None => {
                let prepared = PreparedRequest {
                    method,
                    request,
                    params,
                    primary,
                };
                let query = make_query(&prepared, &self.registry)?;
                let query = match transform {
                    Some(transform) => transform(query).await?,
                    None => query,
                };
                do_query(query, &prepared, &self.registry).await?
            }
        };

        Ok((result, ctx))
    }

    /// `beforeRender`, then the document
    async fn render(
        &self,
        result: QueryResult,
        ctx: &Arc<TransformContext>,
        mut response: Response,
    ) -> ApiResult<Response> {
        let primary = match result.primary {
            Some(data) => Some(
                apply_transform(data, TransformMode::BeforeRender, &self.registry, ctx).await?,
            ),
            None => None,
        };
        let included =
            apply_transform_all(result.included, TransformMode::BeforeRender, &self.registry, ctx)
                .await?;

        response.status = result.status.unwrap_or(200);
        response.headers.extend(result.headers);

        if response.status != 204 {
            let document = Document::new(primary.clone().unwrap_or(PrimaryData::Null))
                .with_included(included.clone())
                .with_meta(result.meta.clone())
                .with_url_templates(self.registry.url_templates())
                .with_request_uri(ctx.request.uri.clone());
            response.body = Some(document.to_json());
        }

        response.primary = primary;
        response.included = included;
        response.meta = result.meta;
        Ok(response)
    }
}

/// Replace whatever `response` holds with an error document. The status
/// is the first error's.
fn error_response(mut response: Response, errors: ApiErrors) -> Response {
    if response.content_type.as_deref() != Some(JSON) {
        response.content_type = Some(JSON_API.to_string());
    }

    for error in errors.iter() {
        info!(
            status = error.status,
            title = error.title.as_deref().unwrap_or_default(),
            detail = error.detail.as_deref().unwrap_or_default(),
            "API controller caught error"
        );
    }

    response.status = errors.status().unwrap_or(500);
    let errors = errors.into_vec();
    response.body = Some(Document::from_errors(errors.clone()).to_json());
    response.errors = errors;
    response.primary = None;
    response.included.clear();
    response.meta.clear();
    response
}
