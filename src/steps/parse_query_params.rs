//! # Query Parameter Parser
//!
//! Turns decoded query-string pairs into typed [`QueryParams`]. Problems
//! across parameters are collected and reported together.

use serde::{Deserialize, Serialize};

use crate::types::resource::is_reserved;
use crate::types::{ApiError, ApiErrors, ApiResult, Fields, QueryParams, Sort};

use super::parse_filter::parse_filter;

/// Whether sort fields must carry an explicit direction prefix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortPrefix {
    /// Bare names sort ascending
    #[default]
    Optional,
    /// Every field must start with `+` or `-`
    Required,
}

/// Parser settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamOptions {
    pub sort_prefix: SortPrefix,
    /// Largest accepted `page[limit]`
    pub max_page_size: Option<usize>,
}

/// Parse query parameters, in the order given. A repeated parameter
/// replaces the earlier value.
pub fn parse_query_params(raw: &[(String, String)], options: &ParamOptions) -> ApiResult<QueryParams> {
    let mut params = QueryParams::default();
    let mut errors = ApiErrors::new();

    for (key, value) in raw {
        if let Some(resource_type) = bracketed(key, "fields") {
            let allowed = split_list(value)
                .into_iter()
                .filter(|field| !is_reserved(field))
                .collect();
            params
                .fields
                .get_or_insert_with(Fields::new)
                .insert(resource_type.to_string(), allowed);
            continue;
        }

        if let Some(member) = bracketed(key, "page") {
            match parse_page_value(key, value) {
                Ok(n) => match member {
                    "offset" => params.page.offset = Some(n),
                    "limit" => match options.max_page_size {
                        Some(max) if n > max => errors.push(
                            ApiError::bad_request("Page size too large")
                                .with_detail(format!(
                                    "page[limit] may be at most {}, but {} was requested.",
                                    max, n
                                ))
                                .with_parameter(key.clone()),
                        ),
                        _ => params.page.limit = Some(n),
                    },
                    other => errors.push(
                        ApiError::bad_request("Unsupported pagination parameter")
                            .with_detail(format!(
                                "page[{}] is not supported; use page[offset] and page[limit].",
                                other
                            ))
                            .with_parameter(key.clone()),
                    ),
                },
                Err(error) => errors.push(error),
            }
            continue;
        }

        match key.as_str() {
            "sort" => match parse_sort(value, options.sort_prefix) {
                Ok(sort) => params.sort = Some(sort),
                Err(error) => errors.push(error),
            },
            "include" => params.include = Some(split_list(value)),
            "filter" => match parse_filter(value) {
                Ok(filter) => params.filter = Some(filter),
                Err(error) => errors.push(error),
            },
            _ => {
                params.custom.insert(key.clone(), value.clone());
            }
        }
    }

    errors.into_result()?;
    Ok(params)
}

/// `family[member]` -> `member`
fn bracketed<'k>(key: &'k str, family: &str) -> Option<&'k str> {
    key.strip_prefix(family)?
        .strip_prefix('[')?
        .strip_suffix(']')
}

/// Comma-separated list; an empty string is an empty list
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_page_value(key: &str, value: &str) -> Result<usize, ApiError> {
    value.trim().parse::<usize>().map_err(|_| {
        ApiError::bad_request("Invalid pagination parameter")
            .with_detail(format!("{} must be a non-negative integer, got \"{}\".", key, value))
            .with_parameter(key.to_string())
    })
}

/// Parse `sort`. `+name` and ` name` (a form-decoded `+`) sort ascending,
/// `-name` descending. Invalid entries are reported together.
fn parse_sort(value: &str, prefix: SortPrefix) -> Result<Vec<Sort>, ApiError> {
    let mut sorts = Vec::new();
    let mut invalid = Vec::new();

    for token in value.split(',').filter(|t| !t.is_empty()) {
        let parsed = if let Some(field) = token.strip_prefix('-') {
            Some(Sort::desc(field))
        } else if let Some(field) = token.strip_prefix('+').or_else(|| token.strip_prefix(' ')) {
            Some(Sort::asc(field))
        } else if prefix == SortPrefix::Optional {
            Some(Sort::asc(token))
        } else {
            None
        };

        match parsed {
            Some(mut sort) if !sort.field.trim().is_empty() => {
                sort.field = sort.field.trim().to_string();
                sorts.push(sort);
            }
            _ => invalid.push(token),
        }
    }

    if !invalid.is_empty() {
        return Err(ApiError::bad_request("All sort parameters must start with a + or a -.")
            .with_detail(format!(
                "The following sort parameters were invalid: {}.",
                invalid.join(", ")
            ))
            .with_parameter("sort"));
    }
    Ok(sorts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FilterOperator, Page, Predicate};
    use serde_json::json;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn parse(raw: &[(&str, &str)]) -> ApiResult<QueryParams> {
        parse_query_params(&pairs(raw), &ParamOptions::default())
    }

    #[test]
    fn test_fields_filter_reserved_names() {
        let params = parse(&[("fields[people]", "name,id,type,meta,gender")]).unwrap();
        assert_eq!(params.fields.unwrap()["people"], vec!["name", "gender"]);
    }

    #[test]
    fn test_empty_fields_is_an_empty_list() {
        let params = parse(&[("fields[people]", "")]).unwrap();
        assert_eq!(params.fields.unwrap()["people"], Vec::<String>::new());

        let params = parse(&[]).unwrap();
        assert!(params.fields.is_none());
    }

    #[test]
    fn test_sort_directions() {
        let params = parse(&[("sort", "-gender,name,+age, id")]).unwrap();
        assert_eq!(
            params.sort.unwrap(),
            vec![Sort::desc("gender"), Sort::asc("name"), Sort::asc("age"), Sort::asc("id")]
        );
    }

    #[test]
    fn test_required_sort_prefix_reports_every_invalid_field() {
        let options = ParamOptions {
            sort_prefix: SortPrefix::Required,
            ..Default::default()
        };
        let errors = parse_query_params(&pairs(&[("sort", "name,-age,gender")]), &options).unwrap_err();

        assert_eq!(errors.len(), 1);
        let error = errors.first().unwrap();
        assert_eq!(error.status, 400);
        assert_eq!(
            error.detail.as_deref(),
            Some("The following sort parameters were invalid: name, gender.")
        );
    }

    #[test]
    fn test_include_and_custom() {
        let params = parse(&[("include", "friends,friends.friends"), ("customNameFilter", "Doug")]).unwrap();
        assert_eq!(params.include.unwrap(), vec!["friends", "friends.friends"]);
        assert_eq!(params.custom["customNameFilter"], "Doug");
    }

    #[test]
    fn test_page_and_filter() {
        let params = parse(&[
            ("page[offset]", "1"),
            ("page[limit]", "3"),
            ("filter", "(name,eq,Doug Wilson)"),
        ])
        .unwrap();
        assert_eq!(
            params.page,
            Page {
                offset: Some(1),
                limit: Some(3)
            }
        );
        assert_eq!(
            params.filter.unwrap(),
            Predicate::constraint("name", FilterOperator::Eq, json!("Doug Wilson"))
        );
    }

    #[test]
    fn test_parameter_errors_collected() {
        let options = ParamOptions {
            max_page_size: Some(10),
            ..Default::default()
        };
        let errors = parse_query_params(
            &pairs(&[("page[offset]", "-1"), ("page[limit]", "50"), ("filter", "oops"), ("page[size]", "2")]),
            &options,
        )
        .unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|e| e.status == 400));
    }
}
