//! Query feature builder.
//!
//! Turns a raw query-string map into a filtered, sorted, keyword-searched,
//! field-limited, paginated view over a collection's documents, plus the
//! pagination metadata. Stages apply in a fixed order: filter, sort, search,
//! field limiting, paginate. Documents are handled as their serialized JSON
//! form so no per-resource code is needed.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

/// Query keys that are features, not field filters.
const RESERVED_KEYS: [&str; 5] = ["page", "limit", "sort", "fields", "keyword"];

const DEFAULT_LIMIT: u64 = 50;
const DEFAULT_SORT: &str = "createdAt";

/// Which document fields the `keyword` parameter searches. Products match on
/// title or description; every other resource matches on name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFields {
    Name,
    TitleAndDescription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone)]
struct Condition {
    field: String,
    op: Op,
    value: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub limit: u64,
    pub number_of_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<u64>,
}

pub struct ApiFeatures {
    docs: Vec<Value>,
    params: HashMap<String, String>,
    base_filter: Vec<(String, String)>,
    pagination: Option<Pagination>,
}

impl ApiFeatures {
    pub fn new(docs: Vec<Value>, params: HashMap<String, String>) -> Self {
        Self {
            docs,
            params,
            base_filter: Vec::new(),
            pagination: None,
        }
    }

    /// Equality conditions injected by the handler before the client's own
    /// query applies (user scoping for orders, nested-route parents).
    pub fn base_filter(mut self, conditions: Vec<(String, String)>) -> Self {
        self.base_filter = conditions;
        self
    }

    /// Every non-reserved query key is an equality or range condition on the
    /// same-named field. `field[gte]=x` and friends become range comparisons.
    pub fn filter(mut self) -> Self {
        let mut conditions: Vec<Condition> = self
            .base_filter
            .iter()
            .map(|(field, value)| Condition {
                field: field.clone(),
                op: Op::Eq,
                value: value.clone(),
            })
            .collect();

        for (key, value) in &self.params {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            conditions.push(parse_condition(key, value));
        }

        self.docs
            .retain(|doc| conditions.iter().all(|c| condition_matches(doc, c)));
        self
    }

    /// Comma-separated sort fields, `-` prefix for descending. Defaults to
    /// `createdAt` ascending.
    pub fn sort(mut self) -> Self {
        let spec = self
            .params
            .get("sort")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SORT.to_string());

        let keys: Vec<(String, bool)> = spec
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('-') {
                Some(field) => (field.to_string(), true),
                None => (s.to_string(), false),
            })
            .collect();

        self.docs.sort_by(|a, b| {
            for (field, descending) in &keys {
                let ord = compare_values(a.get(field.as_str()), b.get(field.as_str()));
                let ord = if *descending { ord.reverse() } else { ord };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        self
    }

    /// Case-insensitive substring search on the resource's search fields.
    pub fn search(mut self, fields: SearchFields) -> Self {
        if let Some(keyword) = self.params.get("keyword") {
            let needle = keyword.to_lowercase();
            self.docs.retain(|doc| match fields {
                SearchFields::TitleAndDescription => {
                    contains_ci(doc, "title", &needle) || contains_ci(doc, "description", &needle)
                }
                SearchFields::Name => contains_ci(doc, "name", &needle),
            });
        }
        self
    }

    /// Project documents onto the comma-separated `fields` list; absent, the
    /// full document is returned.
    pub fn limit_fields(mut self) -> Self {
        if let Some(fields) = self.params.get("fields") {
            let wanted: Vec<&str> = fields.split(',').filter(|f| !f.is_empty()).collect();
            self.docs = self
                .docs
                .iter()
                .map(|doc| {
                    let mut projected = serde_json::Map::new();
                    for field in &wanted {
                        if let Some(v) = doc.get(*field) {
                            projected.insert((*field).to_string(), v.clone());
                        }
                    }
                    Value::Object(projected)
                })
                .collect();
        }
        self
    }

    /// Offset/limit pagination. `documents_count` is the unfiltered collection
    /// count, which is what `numberOfPages` and next/previous are derived from.
    pub fn paginate(mut self, documents_count: usize) -> Self {
        let limit = coerce_positive(self.params.get("limit"), DEFAULT_LIMIT);
        let page = coerce_positive(self.params.get("page"), 1);
        let skip = (page - 1) * limit;
        let end_index = page * limit;
        let total = documents_count as u64;

        let pagination = Pagination {
            current_page: page,
            limit,
            number_of_pages: total.div_ceil(limit),
            next_page: (end_index < total).then(|| page + 1),
            previous_page: (skip > 0).then(|| page - 1),
        };

        self.docs = self
            .docs
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect();
        self.pagination = Some(pagination);
        self
    }

    pub fn into_parts(self) -> (Vec<Value>, Pagination) {
        let pagination = self.pagination.unwrap_or(Pagination {
            current_page: 1,
            limit: DEFAULT_LIMIT,
            number_of_pages: 0,
            next_page: None,
            previous_page: None,
        });
        (self.docs, pagination)
    }
}

/// Best-effort numeric coercion: non-numeric or non-positive falls back.
fn coerce_positive(raw: Option<&String>, default: u64) -> u64 {
    raw.and_then(|s| s.parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

fn parse_condition(key: &str, value: &str) -> Condition {
    if let Some((field, rest)) = key.split_once('[') {
        if let Some(op_name) = rest.strip_suffix(']') {
            let op = match op_name {
                "gt" => Some(Op::Gt),
                "gte" => Some(Op::Gte),
                "lt" => Some(Op::Lt),
                "lte" => Some(Op::Lte),
                _ => None,
            };
            if let Some(op) = op {
                return Condition {
                    field: field.to_string(),
                    op,
                    value: value.to_string(),
                };
            }
        }
    }
    Condition {
        field: key.to_string(),
        op: Op::Eq,
        value: value.to_string(),
    }
}

fn condition_matches(doc: &Value, cond: &Condition) -> bool {
    let Some(actual) = doc.get(cond.field.as_str()) else {
        return false;
    };
    match actual {
        Value::Number(n) => {
            let Some(actual) = n.as_f64() else {
                return false;
            };
            let Ok(expected) = cond.value.parse::<f64>() else {
                return false;
            };
            match cond.op {
                Op::Eq => actual == expected,
                Op::Gt => actual > expected,
                Op::Gte => actual >= expected,
                Op::Lt => actual < expected,
                Op::Lte => actual <= expected,
            }
        }
        Value::String(s) => match cond.op {
            Op::Eq => s == &cond.value,
            Op::Gt => s.as_str() > cond.value.as_str(),
            Op::Gte => s.as_str() >= cond.value.as_str(),
            Op::Lt => s.as_str() < cond.value.as_str(),
            Op::Lte => s.as_str() <= cond.value.as_str(),
        },
        Value::Bool(b) => {
            cond.op == Op::Eq && cond.value.parse::<bool>().map(|v| v == *b).unwrap_or(false)
        }
        // Array fields (colors, subcategories) match when any element equals
        // the filter value, mirroring document-store semantics.
        Value::Array(items) => {
            cond.op == Op::Eq
                && items
                    .iter()
                    .any(|item| item.as_str() == Some(cond.value.as_str()))
        }
        _ => false,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            _ => Ordering::Equal,
        },
    }
}

fn contains_ci(doc: &Value, field: &str, needle: &str) -> bool {
    doc.get(field)
        .and_then(Value::as_str)
        .map(|s| s.to_lowercase().contains(needle))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn products() -> Vec<Value> {
        vec![
            json!({"title": "Red Shirt", "description": "A soft cotton shirt", "price": 30.0, "sold": 5, "createdAt": "2024-01-01T00:00:00Z"}),
            json!({"title": "Blue Jeans", "description": "Classic denim", "price": 80.0, "sold": 12, "createdAt": "2024-01-02T00:00:00Z"}),
            json!({"title": "Hat", "description": "Keeps the sun off", "price": 15.0, "sold": 2, "createdAt": "2024-01-03T00:00:00Z"}),
        ]
    }

    #[test]
    fn test_range_filter() {
        let (docs, _) = ApiFeatures::new(products(), params(&[("price[gte]", "30")]))
            .filter()
            .sort()
            .search(SearchFields::TitleAndDescription)
            .limit_fields()
            .paginate(3)
            .into_parts();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_unknown_key_is_exact_match() {
        let (docs, _) = ApiFeatures::new(products(), params(&[("title", "Hat")]))
            .filter()
            .paginate(3)
            .into_parts();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["title"], "Hat");
    }

    #[test]
    fn test_sort_descending_and_default() {
        let (docs, _) = ApiFeatures::new(products(), params(&[("sort", "-price")]))
            .filter()
            .sort()
            .paginate(3)
            .into_parts();
        assert_eq!(docs[0]["title"], "Blue Jeans");

        // Default sort is createdAt ascending.
        let (docs, _) = ApiFeatures::new(products(), params(&[]))
            .filter()
            .sort()
            .paginate(3)
            .into_parts();
        assert_eq!(docs[0]["title"], "Red Shirt");
    }

    #[test]
    fn test_keyword_search_dispatch() {
        // Product search hits title OR description.
        let (docs, _) = ApiFeatures::new(products(), params(&[("keyword", "denim")]))
            .filter()
            .sort()
            .search(SearchFields::TitleAndDescription)
            .paginate(3)
            .into_parts();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["title"], "Blue Jeans");

        // Other resources search name only.
        let brands = vec![json!({"name": "Acme"}), json!({"name": "Globex"})];
        let (docs, _) = ApiFeatures::new(brands, params(&[("keyword", "acme")]))
            .filter()
            .sort()
            .search(SearchFields::Name)
            .paginate(2)
            .into_parts();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_field_limiting() {
        let (docs, _) = ApiFeatures::new(products(), params(&[("fields", "title,price")]))
            .filter()
            .sort()
            .limit_fields()
            .paginate(3)
            .into_parts();
        let obj = docs[0].as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj.contains_key("title"));
        assert!(obj.contains_key("price"));
    }

    #[test]
    fn test_pagination_metadata() {
        // documentsCount=120, limit=50, page=2 => 3 pages, next 3, previous 1.
        let docs: Vec<Value> = (0..120).map(|i| json!({"n": i})).collect();
        let (page_docs, pagination) =
            ApiFeatures::new(docs, params(&[("page", "2"), ("limit", "50")]))
                .filter()
                .sort()
                .paginate(120)
                .into_parts();
        assert_eq!(page_docs.len(), 50);
        assert_eq!(pagination.number_of_pages, 3);
        assert_eq!(pagination.next_page, Some(3));
        assert_eq!(pagination.previous_page, Some(1));
        assert_eq!(pagination.current_page, 2);
    }

    #[test]
    fn test_pagination_bounds() {
        let docs: Vec<Value> = (0..10).map(|i| json!({"n": i})).collect();
        let (_, pagination) = ApiFeatures::new(docs, params(&[]))
            .filter()
            .paginate(10)
            .into_parts();
        assert_eq!(pagination.current_page, 1);
        assert_eq!(pagination.limit, 50);
        assert_eq!(pagination.number_of_pages, 1);
        assert_eq!(pagination.next_page, None);
        assert_eq!(pagination.previous_page, None);
    }

    #[test]
    fn test_malformed_page_falls_back() {
        let docs: Vec<Value> = (0..5).map(|i| json!({"n": i})).collect();
        let (_, pagination) =
            ApiFeatures::new(docs, params(&[("page", "abc"), ("limit", "0")]))
                .filter()
                .paginate(5)
                .into_parts();
        assert_eq!(pagination.current_page, 1);
        assert_eq!(pagination.limit, 50);
    }

    #[test]
    fn test_base_filter_scopes_results() {
        let docs = vec![
            json!({"user": "u1", "total": 10.0}),
            json!({"user": "u2", "total": 20.0}),
        ];
        let (docs, _) = ApiFeatures::new(docs, params(&[]))
            .base_filter(vec![("user".to_string(), "u1".to_string())])
            .filter()
            .paginate(2)
            .into_parts();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["user"], "u1");
    }
}
