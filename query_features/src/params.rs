//! Request parameters
//!
//! A [`RawParameterMap`] is the decoded query string of a list request. Keys
//! use the bracket convention of web frameworks: `price[gte]=100` nests a
//! map under `price`, while `tag[]=a&tag[]=b` and repeated keys collect an
//! array.

use std::collections::BTreeMap;
use url::form_urlencoded;

/// Value of one request parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    Many(Vec<String>),
    Nested(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// Scalar or array value joined with commas, `None` for nested maps
    pub fn joined(&self) -> Option<String> {
        match self {
            ParamValue::Single(value) => Some(value.clone()),
            ParamValue::Many(values) => Some(values.join(",")),
            ParamValue::Nested(_) => None,
        }
    }

    /// First scalar, used where only one value makes sense
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::Single(value) => Some(value),
            ParamValue::Many(values) => values.first().map(String::as_str),
            ParamValue::Nested(_) => None,
        }
    }

    fn push(self, value: String) -> ParamValue {
        match self {
            ParamValue::Single(existing) => ParamValue::Many(vec![existing, value]),
            ParamValue::Many(mut values) => {
                values.push(value);
                ParamValue::Many(values)
            }
            // a scalar after a nested map for the same key wins
            ParamValue::Nested(_) => ParamValue::Single(value),
        }
    }
}

/// Decoded query-string parameters of one request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawParameterMap {
    entries: BTreeMap<String, ParamValue>,
}

impl RawParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query string, with or without the leading `?`
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(form_urlencoded::parse(query.as_bytes()))
    }

    /// Build from already decoded key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (key, value) in pairs {
            map.insert(key.as_ref(), value);
        }
        map
    }

    /// Add one parameter, merging with earlier values of the same key
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let (base, mut path) = split_key(key);
        if base.is_empty() {
            return;
        }

        // `tag[]` appends to `tag`
        while path.last().is_some_and(|segment| segment.is_empty()) {
            path.pop();
        }

        insert_at(&mut self.entries, base, &path, value.into());
    }

    /// Overwrite a parameter with a single value
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .insert(key.to_string(), ParamValue::Single(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Control parameters given more than once are joined with commas
    pub fn get_joined(&self, key: &str) -> Option<String> {
        self.entries.get(key).and_then(ParamValue::joined)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split `a[b][c]` into `a` and `[b, c]`; malformed brackets keep the key whole
fn split_key(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[') else {
        return (key, Vec::new());
    };

    let base = &key[..open];
    let mut rest = &key[open..];
    let mut path = Vec::new();

    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return (key, Vec::new());
        };
        let Some(close) = inner.find(']') else {
            return (key, Vec::new());
        };
        path.push(&inner[..close]);
        rest = &inner[close + 1..];
    }

    (base, path)
}

fn insert_at(entries: &mut BTreeMap<String, ParamValue>, key: &str, path: &[&str], value: String) {
    match path.split_first() {
        None => {
            let merged = match entries.remove(key) {
                Some(existing) => existing.push(value),
                None => ParamValue::Single(value),
            };
            entries.insert(key.to_string(), merged);
        }
        Some((next, rest)) => {
            let entry = entries
                .entry(key.to_string())
                .or_insert_with(|| ParamValue::Nested(BTreeMap::new()));

            if !matches!(entry, ParamValue::Nested(_)) {
                *entry = ParamValue::Nested(BTreeMap::new());
            }

            if let ParamValue::Nested(children) = entry {
                insert_at(children, next, rest, value);
            }
        }
    }
}

/// Named preset of control parameters, e.g. a "top 5 cheap tours" route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAlias {
    name: String,
    overrides: Vec<(String, String)>,
}

impl QueryAlias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overrides: Vec::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Best rated, then cheapest, tours
    pub fn top_tours() -> Self {
        Self::new("top-5-cheap")
            .with("limit", "5")
            .with("sort", "-ratingsAverage,price")
            .with("fields", "name,price,summary,difficulty")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overwrite the preset keys, leaving other request parameters alone
    pub fn apply(&self, params: &mut RawParameterMap) {
        tracing::debug!(alias = %self.name, "Applying query alias");
        for (key, value) in &self.overrides {
            params.set(key, value.clone());
        }
    }
}
