//! List-request feature pipeline
//!
//! [`QueryFeatures`] turns the parameters of a list request into constraints
//! on a base [`ListQuery`]:
//!
//! ```rust
//! use config::QueryConfig;
//! use query_features::{ListQuery, QueryFeatures, RawParameterMap};
//!
//! let config = QueryConfig::default();
//! let params = RawParameterMap::from_query_string("price[gte]=100&sort=-ratingsAverage,price&page=2&limit=5");
//!
//! let query = QueryFeatures::new(ListQuery::new("tours"), params, &config)
//!     .filter()
//!     .sort()
//!     .limit_fields()
//!     .paginate()
//!     .build();
//!
//! assert_eq!(query.skip_value(), Some(5));
//! assert_eq!(query.limit_value(), Some(5));
//! ```
//!
//! Each stage only records its part. `build` always applies them as
//! filter, sort, projection, then the page window, so calling the stages in
//! another order yields the same query. A stage that is never called adds
//! nothing. None of the stages fail: malformed input is logged and dropped,
//! numeric parameters fall back to the configured defaults.

use crate::params::{ParamValue, RawParameterMap};
use crate::query_builder::{ListQuery, PageSpec, Projection, QueryFilter, QueryOperator, SortKey};
use crate::validation::FieldPath;
use config::QueryConfig;
use serde_json::{Number, Value};

const SORT_PARAM: &str = "sort";
const FIELDS_PARAM: &str = "fields";
const PAGE_PARAM: &str = "page";
const LIMIT_PARAM: &str = "limit";

/// Builder for one list request
#[derive(Debug, Clone)]
pub struct QueryFeatures<'a> {
    query: ListQuery,
    params: RawParameterMap,
    config: &'a QueryConfig,
    filters: Option<Vec<QueryFilter>>,
    sort: Option<Vec<SortKey>>,
    projection: Option<Projection>,
    page: Option<PageSpec>,
}

impl<'a> QueryFeatures<'a> {
    /// Start from a base query, e.g. all reviews of one tour
    pub fn new(query: ListQuery, params: RawParameterMap, config: &'a QueryConfig) -> Self {
        Self {
            query,
            params,
            config,
            filters: None,
            sort: None,
            projection: None,
            page: None,
        }
    }

    /// Equality and range criteria from every non-reserved parameter
    pub fn filter(mut self) -> Self {
        let mut filters = Vec::new();

        for (key, value) in self.params.iter() {
            if self.config.is_reserved(key) {
                continue;
            }

            match FieldPath::new(key) {
                Ok(field) => translate_criteria(field, value, &mut filters),
                Err(e) => tracing::warn!(parameter = %key, error = %e, "Ignoring filter parameter"),
            }
        }

        crate::debug_log!("filter stage produced {} conditions", filters.len());
        self.filters = Some(filters);
        self
    }

    /// Multi-key sort from `sort`, newest first by default
    pub fn sort(mut self) -> Self {
        let requested = self
            .params
            .get_joined(SORT_PARAM)
            .filter(|raw| !raw.trim().is_empty());

        let mut keys = requested.as_deref().map(parse_sort_keys).unwrap_or_default();
        if keys.is_empty() {
            keys = parse_sort_keys(&self.config.default_sort);
        }

        crate::debug_log!("sort stage produced {} keys", keys.len());
        self.sort = Some(keys);
        self
    }

    /// Projection from `fields`, hiding the version field by default
    pub fn limit_fields(mut self) -> Self {
        let requested = self
            .params
            .get_joined(FIELDS_PARAM)
            .filter(|raw| !raw.trim().is_empty());

        let projection = requested
            .as_deref()
            .and_then(|raw| parse_projection(raw, self.config))
            .unwrap_or_else(|| default_projection(self.config));

        self.projection = Some(projection);
        self
    }

    /// Page window from `page` and `limit`
    pub fn paginate(mut self) -> Self {
        let page = PageSpec::from_params(
            self.params.get(PAGE_PARAM).and_then(ParamValue::first),
            self.params.get(LIMIT_PARAM).and_then(ParamValue::first),
            self.config.default_page,
            self.config.default_limit,
        );

        crate::debug_log!(
            "paginate stage: page={} limit={} skip={}",
            page.page(),
            page.limit(),
            page.skip()
        );
        self.page = Some(page);
        self
    }

    /// Run every stage
    pub fn all(self) -> Self {
        self.filter().sort().limit_fields().paginate()
    }

    /// Criteria recorded by the filter stage
    pub fn criteria(&self) -> Option<&[QueryFilter]> {
        self.filters.as_deref()
    }

    /// Window recorded by the paginate stage
    pub fn page_spec(&self) -> Option<PageSpec> {
        self.page
    }

    /// Freeze the recorded stages into the executable query
    pub fn build(self) -> ListQuery {
        let mut query = self.query;

        if let Some(filters) = self.filters {
            query = query.filters(filters);
        }
        if let Some(keys) = self.sort {
            query = query.sort_keys(keys);
        }
        if let Some(projection) = self.projection {
            query = query.select(projection);
        }
        if let Some(page) = self.page {
            query = query.page(page);
        }

        crate::trace_log!("built list query: {:?}", query);
        query
    }
}

/// Walk one parameter value, translating only the whitelisted range tokens
fn translate_criteria(field: FieldPath, value: &ParamValue, filters: &mut Vec<QueryFilter>) {
    match value {
        ParamValue::Single(raw) => {
            let mut candidates = equality_candidates(raw);
            if candidates.len() == 1 {
                filters.push(QueryFilter::eq(field, candidates.remove(0)));
            } else {
                filters.push(QueryFilter::in_values(field, candidates));
            }
        }
        ParamValue::Many(raws) => filters.push(QueryFilter::in_values(
            field,
            raws.iter().flat_map(|raw| equality_candidates(raw)).collect(),
        )),
        ParamValue::Nested(children) => {
            for (token, child) in children {
                if let Some(operator) = QueryOperator::from_token(token) {
                    translate_operator(&field, operator, child, filters);
                    continue;
                }

                // any other bracket key is a sub-field, never an operator
                match FieldPath::new(token) {
                    Ok(segment) => translate_criteria(field.child(&segment), child, filters),
                    Err(e) => tracing::warn!(
                        field = %field,
                        token = %token,
                        error = %e,
                        "Ignoring unsupported filter operator"
                    ),
                }
            }
        }
    }
}

fn translate_operator(
    field: &FieldPath,
    operator: QueryOperator,
    value: &ParamValue,
    filters: &mut Vec<QueryFilter>,
) {
    match value {
        ParamValue::Single(raw) => {
            filters.push(QueryFilter::condition(field.clone(), operator, coerce_scalar(raw)))
        }
        ParamValue::Many(raws) => {
            for raw in raws {
                filters.push(QueryFilter::condition(field.clone(), operator, coerce_scalar(raw)));
            }
        }
        ParamValue::Nested(_) => tracing::warn!(
            field = %field,
            operator = operator.to_sql(),
            "Ignoring nested value under comparison operator"
        ),
    }
}

/// Values an equality on `raw` accepts
///
/// Documents carry no schema, so a typed value also matches its text form:
/// `zip=01234` finds both `1234` and `"01234"`.
fn equality_candidates(raw: &str) -> Vec<Value> {
    match coerce_scalar(raw) {
        typed @ Value::String(_) => vec![typed],
        typed => vec![typed, Value::String(raw.to_string())],
    }
}

/// Type a query-string scalar: booleans, integers, finite decimals, else text
pub fn coerce_scalar(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(integer) = raw.parse::<i64>() {
        return Value::Number(integer.into());
    }

    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn parse_sort_keys(raw: &str) -> Vec<SortKey> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match SortKey::parse(token) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!(token = %token, error = %e, "Ignoring sort key");
                None
            }
        })
        .collect()
}

fn default_projection(config: &QueryConfig) -> Projection {
    match FieldPath::new(&config.version_field) {
        Ok(version) => Projection::Exclude(vec![version]),
        Err(e) => {
            tracing::warn!(field = %config.version_field, error = %e, "Invalid version field");
            Projection::All
        }
    }
}

/// `None` when no token survives validation
fn parse_projection(raw: &str, config: &QueryConfig) -> Option<Projection> {
    let mut includes: Vec<FieldPath> = Vec::new();
    let mut excludes: Vec<FieldPath> = Vec::new();

    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (name, excluded) = match token.strip_prefix('-') {
            Some(name) => (name, true),
            None => (token, false),
        };

        let field = match FieldPath::new(name) {
            Ok(field) => field,
            Err(e) => {
                tracing::warn!(token = %token, error = %e, "Ignoring projected field");
                continue;
            }
        };

        let list = if excluded { &mut excludes } else { &mut includes };
        if !list.contains(&field) {
            list.push(field);
        }
    }

    // inclusion works on top-level keys
    includes.retain(|field| {
        let top_level = field.segments().count() == 1;
        if !top_level {
            tracing::warn!(field = %field, "Ignoring nested field in inclusion projection");
        }
        top_level
    });

    // nothing left to include, so the request is an exclusion list or no list
    if includes.is_empty() {
        return (!excludes.is_empty()).then_some(Projection::Exclude(excludes));
    }

    let hide_id = excludes.iter().any(|field| field.as_str() == config.id_field);
    if !hide_id && !includes.iter().any(|field| field.as_str() == config.id_field) {
        if let Ok(id) = FieldPath::new(&config.id_field) {
            includes.insert(0, id);
        }
    }

    Some(Projection::Include(includes))
}

#[cfg(test)]
mod tests;
