use std::fmt;

/// PostgREST filter operators, as accepted by `not` and `filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Ilike,
    Is,
    In,
    Cs,
    Cd,
    Sl,
    Sr,
    Nxl,
    Nxr,
    Adj,
    Ov,
    Fts,
    Plfts,
    Phfts,
    Wfts,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::Ilike => "ilike",
            Self::Is => "is",
            Self::In => "in",
            Self::Cs => "cs",
            Self::Cd => "cd",
            Self::Sl => "sl",
            Self::Sr => "sr",
            Self::Nxl => "nxl",
            Self::Nxr => "nxr",
            Self::Adj => "adj",
            Self::Ov => "ov",
            Self::Fts => "fts",
            Self::Plfts => "plfts",
            Self::Phfts => "phfts",
            Self::Wfts => "wfts",
        }
    }
}

impl AsRef<str> for FilterOperator {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operand of the `is` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsValue {
    Null,
    True,
    False,
    Unknown,
}

impl IsValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::Unknown => "unknown",
        }
    }
}

impl From<bool> for IsValue {
    fn from(b: bool) -> Self {
        if b {
            Self::True
        } else {
            Self::False
        }
    }
}

impl From<Option<bool>> for IsValue {
    fn from(b: Option<bool>) -> Self {
        b.map(Self::from).unwrap_or(Self::Null)
    }
}

/// Full-text search flavour. `None` in [`TextSearchOptions`] means plain `fts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSearchType {
    Plain,
    Phrase,
    Websearch,
}

impl TextSearchType {
    /// Prefix placed before `fts`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Plain => "pl",
            Self::Phrase => "ph",
            Self::Websearch => "w",
        }
    }
}

/// Options for `text_search`.
#[derive(Debug, Clone, Default)]
pub struct TextSearchOptions {
    /// Text search configuration, e.g. "english".
    pub config: Option<String>,
    pub search_type: Option<TextSearchType>,
}

impl TextSearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn search_type(mut self, search_type: TextSearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }
}

// --- Transform types ---

/// Counting algorithm requested through `Prefer: count=...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOption {
    /// Exact count via COUNT(*).
    Exact,
    /// Planner estimate.
    Planned,
    /// Exact for small tables, planner estimate above the configured threshold.
    Estimated,
}

impl CountOption {
    /// Value of the `Prefer` directive.
    pub fn prefer(&self) -> &'static str {
        match self {
            Self::Exact => "count=exact",
            Self::Planned => "count=planned",
            Self::Estimated => "count=estimated",
        }
    }
}

/// Options for `order`.
#[derive(Debug, Clone)]
pub struct OrderOptions {
    pub ascending: bool,
    pub nulls_first: Option<bool>,
    pub foreign_table: Option<String>,
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self {
            ascending: true,
            nulls_first: None,
            foreign_table: None,
        }
    }
}

impl OrderOptions {
    pub fn asc() -> Self {
        Self::default()
    }

    pub fn desc() -> Self {
        Self {
            ascending: false,
            ..Self::default()
        }
    }

    pub fn nulls_first(mut self, nulls_first: bool) -> Self {
        self.nulls_first = Some(nulls_first);
        self
    }

    pub fn foreign_table(mut self, table: impl Into<String>) -> Self {
        self.foreign_table = Some(table.into());
        self
    }
}

/// Output format of an EXPLAIN plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExplainFormat {
    #[default]
    Text,
    Json,
}

/// Options for `explain`.
#[derive(Debug, Clone, Default)]
pub struct ExplainOptions {
    pub analyze: bool,
    pub verbose: bool,
    pub settings: bool,
    pub buffers: bool,
    pub wal: bool,
    pub format: ExplainFormat,
}

impl ExplainOptions {
    /// `options=` list, `None` when every flag is off.
    pub(crate) fn options(&self) -> Option<String> {
        let flags = [
            (self.analyze, "analyze"),
            (self.verbose, "verbose"),
            (self.settings, "settings"),
            (self.buffers, "buffers"),
            (self.wal, "wal"),
        ];
        let enabled: Vec<&str> = flags
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();
        if enabled.is_empty() {
            None
        } else {
            Some(enabled.join("|"))
        }
    }
}
