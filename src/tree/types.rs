use serde::{Deserialize, Serialize};
use serde_norway::Value;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Sub-family receiving the items of a family that also has sub-families
pub const SINK: &str = "Default";

/// Title of an item whose record did not provide one
pub const DEFAULT_TITLE: &str = "No *title* provided";

/// Sort key shared by families and items.
///
/// Records may rank with booleans, integers, floats or strings. Values of
/// different kinds are not comparable in a meaningful way, so a sibling set
/// is only sorted when all its ranks share one [`RankKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rank {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Discriminant of a [`Rank`], used for type homogeneity checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RankKind {
    Bool,
    Int,
    Float,
    Text,
}

impl Rank {
    pub fn kind(&self) -> RankKind {
        match self {
            Rank::Bool(_) => RankKind::Bool,
            Rank::Int(_) => RankKind::Int,
            Rank::Float(_) => RankKind::Float,
            Rank::Text(_) => RankKind::Text,
        }
    }

    /// Read a rank from a loosely typed record value.
    /// `null` means "no rank", to be filled by defaults later.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Rank::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Rank::Int(i)),
                None => n.as_f64().map(Rank::Float),
            },
            Value::String(s) => Some(Rank::Text(s.clone())),
            other => Some(Rank::Text(value_to_text(other))),
        }
    }

    /// String form of this rank, used when siblings mix rank kinds
    pub fn to_text(&self) -> Rank {
        match self {
            Rank::Text(_) => self.clone(),
            other => Rank::Text(other.to_string()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Rank::Bool(b) => Value::Bool(*b),
            Rank::Int(i) => Value::Number((*i).into()),
            Rank::Float(f) => Value::Number((*f).into()),
            Rank::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Bool(b) => write!(f, "{}", b),
            Rank::Int(i) => write!(f, "{}", i),
            // Debug keeps the decimal point of whole floats
            Rank::Float(x) => write!(f, "{:?}", x),
            Rank::Text(s) => f.write_str(s),
        }
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Rank::Bool(a), Rank::Bool(b)) => a.cmp(b),
            (Rank::Int(a), Rank::Int(b)) => a.cmp(b),
            (Rank::Float(a), Rank::Float(b)) => a.total_cmp(b),
            (Rank::Text(a), Rank::Text(b)) => a.cmp(b),
            // Only reached for mixed sibling sets, which are never sorted
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Rank {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rank {}

/// A small colored tag attached to families and items.
///
/// Labels are plain values: two labels are the same label iff every field
/// matches, which is what lets them live in sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label {
    /// Index-token form of the label name (leading `#`)
    pub name: String,
    pub text: String,
    pub color: String,
    pub text_color: String,
    pub tooltip: String,
}

/// Values read from a record whose type is only settled by the type
/// enforcement pass. Each field is consumed (set back to `None`) once
/// it has been coerced into its typed counterpart.
#[derive(Debug, Clone, Default)]
pub struct Loose {
    pub title: Option<Value>,
    pub text: Option<Value>,
    pub pretext: Option<Value>,
    pub alias: Option<Value>,
    pub index: Option<Value>,
    pub labels: Option<Value>,
}

impl Loose {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.text.is_none()
            && self.pretext.is_none()
            && self.alias.is_none()
            && self.index.is_none()
            && self.labels.is_none()
    }
}

/// One visual item ("graph") owned by exactly one family
#[derive(Debug, Clone)]
pub struct Item {
    /// Main resource, relative to the data root
    pub name: Option<String>,
    pub file: Option<String>,
    pub export: Option<String>,
    pub title: String,
    pub pretext: String,
    pub text: String,
    /// Keyword tokens, each with a leading `#`
    pub index: BTreeSet<String>,
    pub rank: Option<Rank>,
    pub showtitle: bool,
    pub labels: BTreeSet<Label>,
    pub other: Option<Value>,
    /// 1-based position among siblings, set by the sort pass
    pub id: Option<usize>,
    pub loose: Loose,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            name: None,
            file: None,
            export: None,
            title: DEFAULT_TITLE.to_string(),
            pretext: String::new(),
            text: String::new(),
            index: BTreeSet::new(),
            rank: None,
            showtitle: false,
            labels: BTreeSet::new(),
            other: None,
            id: None,
            loose: Loose::default(),
        }
    }
}

/// Family-level record held by every tree node
#[derive(Debug, Clone, Default)]
pub struct FamilyAttrs {
    pub text: String,
    pub rank: Option<Rank>,
    /// Display name; defaults to the last path segment
    pub alias: Option<String>,
    /// Explicit labels plus inherited and aggregated ones once propagated
    pub labels: BTreeSet<Label>,
    /// Explicit labels only, captured on first propagation
    pub own_labels: Option<BTreeSet<Label>>,
    pub items: Vec<Item>,
    pub loose: Loose,
}

impl FamilyAttrs {
    pub fn alias_or_empty(&self) -> &str {
        self.alias.as_deref().unwrap_or("")
    }
}

/// Canonical text of a scalar record value
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_norway::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
