//! Collision-free renaming with a lockstep integer suffix.
//!
//! Model
//! - A batch of candidate names is checked against a set of used names. While
//!   any candidate collides, *every* candidate is rewritten through the
//!   pattern with the current index `i` (starting at 0), then `i` increments.
//! - Rewrites apply to the current candidate, so suffixes stack:
//!   `a` → `a_0` → `a_0_1`.
//! - Nothing is reserved: feed results back into `used` before the next call.
//!
//! Code cross-refs: `NamePattern`, `UniqueNamer`, `unique_name`, `unique_names`

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::cfg::DEFAULT_NAME_PATTERN;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Piece {
    Text(String),
    Name,
    Index,
}

/// Parsed rename template with `{name}` and `{i}` fields.
///
/// `{{` and `}}` escape literal braces. `{i}` is mandatory so that repeated
/// rewrites always produce fresh candidates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamePattern {
    template: String,
    pieces: Vec<Piece>,
}

impl NamePattern {
    pub fn new(template: &str) -> Result<Self, NamePatternError> {
        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut chars = template.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => return Err(NamePatternError::UnbalancedBrace),
                            Some(c) => field.push(c),
                        }
                    }
                    let piece = match field.as_str() {
                        "name" => Piece::Name,
                        "i" => Piece::Index,
                        _ => return Err(NamePatternError::UnknownField { field }),
                    };
                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(piece);
                }
                '}' => return Err(NamePatternError::UnbalancedBrace),
                c => text.push(c),
            }
        }
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }
        if !pieces.contains(&Piece::Index) {
            return Err(NamePatternError::MissingIndex);
        }
        Ok(Self {
            template: template.to_owned(),
            pieces,
        })
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn render(&self, name: &str, i: usize) -> String {
        let mut out = String::with_capacity(name.len() + self.template.len());
        for piece in &self.pieces {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Name => out.push_str(name),
                Piece::Index => out.push_str(&i.to_string()),
            }
        }
        out
    }
}

impl Default for NamePattern {
    /// `"{name}_{i}"`.
    fn default() -> Self {
        Self {
            template: DEFAULT_NAME_PATTERN.to_owned(),
            pieces: vec![Piece::Name, Piece::Text("_".to_owned()), Piece::Index],
        }
    }
}

impl FromStr for NamePattern {
    type Err = NamePatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Errors from `NamePattern::new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePatternError {
    /// Template has no `{i}` field.
    MissingIndex,
    /// Field other than `{name}` / `{i}`.
    UnknownField { field: String },
    /// Stray `{` or `}` that is not an escape.
    UnbalancedBrace,
}

impl fmt::Display for NamePatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamePatternError::MissingIndex => {
                write!(f, "name pattern must contain an {{i}} field")
            }
            NamePatternError::UnknownField { field } => write!(
                f,
                "unknown field {{{}}} in name pattern (expected {{name}} or {{i}})",
                field
            ),
            NamePatternError::UnbalancedBrace => {
                write!(f, "unbalanced brace in name pattern (use {{{{ or }}}} for literals)")
            }
        }
    }
}

impl std::error::Error for NamePatternError {}

/// Renamer bound to one pattern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UniqueNamer {
    pub pattern: NamePattern,
}

impl UniqueNamer {
    pub fn new(pattern: NamePattern) -> Self {
        Self { pattern }
    }

    /// Scalar entry point.
    pub fn name<U>(&self, name: &str, used: U) -> String
    where
        U: IntoIterator,
        U::Item: AsRef<str>,
    {
        let mut one = [name.to_owned()];
        self.rename_lockstep(&mut one, &collect_used(used));
        let [out] = one;
        out
    }

    /// Batch entry point; output order matches input order.
    pub fn names<N, U>(&self, names: &[N], used: U) -> Vec<String>
    where
        N: AsRef<str>,
        U: IntoIterator,
        U::Item: AsRef<str>,
    {
        let mut current: Vec<String> = names.iter().map(|n| n.as_ref().to_owned()).collect();
        self.rename_lockstep(&mut current, &collect_used(used));
        current
    }

    fn rename_lockstep(&self, current: &mut [String], used: &HashSet<String>) {
        let mut i = 0;
        while current.iter().any(|n| used.contains(n.as_str())) {
            for n in current.iter_mut() {
                *n = self.pattern.render(n, i);
            }
            i += 1;
        }
    }
}

fn collect_used<U>(used: U) -> HashSet<String>
where
    U: IntoIterator,
    U::Item: AsRef<str>,
{
    used.into_iter().map(|u| u.as_ref().to_owned()).collect()
}

/// `UniqueNamer::default().name(..)`.
pub fn unique_name<U>(name: &str, used: U) -> String
where
    U: IntoIterator,
    U::Item: AsRef<str>,
{
    UniqueNamer::default().name(name, used)
}

/// `UniqueNamer::default().names(..)`.
pub fn unique_names<N, U>(names: &[N], used: U) -> Vec<String>
where
    N: AsRef<str>,
    U: IntoIterator,
    U::Item: AsRef<str>,
{
    UniqueNamer::default().names(names, used)
}
