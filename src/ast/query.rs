use std::fmt;

/// Host and item key of a history function, `/host/key`.
///
/// Both parts are non-empty unless the parser allowed an empty host. Calculated
/// item queries may carry a host group and tag filter, `/*/key?[group = "A"]`,
/// kept as the text between the brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Query {
    pub host: String,
    pub item_key: String,
    pub filter: Option<String>,
}

impl Query {
    pub fn new(host: impl Into<String>, item_key: impl Into<String>) -> Self {
        Query {
            host: host.into(),
            item_key: item_key.into(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn pair(&self) -> (String, String) {
        (self.host.clone(), self.item_key.clone())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.host, self.item_key)?;
        if let Some(filter) = &self.filter {
            write!(f, "?[{}]", filter)?;
        }
        Ok(())
    }
}
