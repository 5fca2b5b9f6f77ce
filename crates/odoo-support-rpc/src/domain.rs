use serde_json::{json, Value};

/// An Odoo search domain.
///
/// Odoo domains are lists in prefix (Polish) notation: leaves are
/// `[field, operator, value]` triples and `"&"`, `"|"` are binary
/// operators. Top-level terms are implicitly AND-ed. Each entry here is one
/// complete expression so that [`Domain::or`] can combine whole domains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domain {
    expressions: Vec<Vec<Value>>,
}

impl Domain {
    /// An empty domain, which matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `[field, operator, value]` leaf, AND-ed with existing terms.
    pub fn filter(mut self, field: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.expressions
            .push(vec![json!([field, operator, value.into()])]);
        self
    }

    /// Shorthand for `filter(field, "=", value)`.
    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, "=", value)
    }

    /// Combines two domains with OR.
    ///
    /// An empty side matches everything, so the result does too.
    pub fn or(self, other: Domain) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::new();
        }

        let mut tokens = vec![json!("|")];
        tokens.extend(self.into_prefix_expression());
        tokens.extend(other.into_prefix_expression());
        Self {
            expressions: vec![tokens],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Collapses the implicit top-level AND into explicit `"&"` operators,
    /// yielding a single prefix expression.
    fn into_prefix_expression(self) -> Vec<Value> {
        let count = self.expressions.len();
        let mut tokens: Vec<Value> = std::iter::repeat(json!("&"))
            .take(count.saturating_sub(1))
            .collect();
        tokens.extend(self.expressions.into_iter().flatten());
        tokens
    }
}

impl From<Domain> for Value {
    fn from(domain: Domain) -> Self {
        Value::Array(domain.expressions.into_iter().flatten().collect())
    }
}
