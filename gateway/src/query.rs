// gateway/src/query.rs

/// Filter/order/limit options for a table select, rendered into
/// PostgREST-style query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pattern: Option<(String, String)>,
    order_desc: Option<String>,
    limit: Option<u32>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match on one text column
    /// (`column=ilike.*term*`). An empty term leaves the query unfiltered.
    pub fn pattern(mut self, column: impl Into<String>, term: impl Into<String>) -> Self {
        let term = term.into();
        if !term.trim().is_empty() {
            self.pattern = Some((column.into(), term.trim().to_string()));
        }
        self
    }

    /// Newest-first ordering by a timestamp column (`order=column.desc`).
    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order_desc = Some(column.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn pattern_parts(&self) -> Option<(&str, &str)> {
        self.pattern.as_ref().map(|(c, t)| (c.as_str(), t.as_str()))
    }

    pub fn order_column(&self) -> Option<&str> {
        self.order_desc.as_deref()
    }

    pub fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    /// The encoded query string, without a leading `?`. Empty when no
    /// option is set.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some((column, term)) = &self.pattern {
            parts.push(format!("{}=ilike.*{}*", column, urlencoding::encode(term)));
        }
        if let Some(column) = &self.order_desc {
            parts.push(format!("order={}.desc", column));
        }
        if let Some(limit) = self.limit {
            parts.push(format!("limit={}", limit));
        }
        parts.join("&")
    }
}
