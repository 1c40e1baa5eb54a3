//! Substitution token expansion
//!
//! Resolves raw rule tokens (`$name`, `$holder`, `$now`, `$inherit`,
//! `$uuid`, argument keys, literals) into concrete values against an
//! [`ExpansionContext`]. Expansion is a pure function of (token, context);
//! only `$uuid` draws a fresh value per occurrence.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, SecondsFormat, Timelike};
use indexmap::IndexMap;
use uuid::Uuid;

/// Ancestor property lookup for `$inherit`
///
/// Implemented over the destination node: the first ancestor-or-self that
/// defines the property supplies all of its values.
pub trait InheritanceSource {
    /// Values of `property` on the nearest defining ancestor, if any
    fn inherited(&self, property: &str) -> Option<Vec<String>>;
}

/// Inheritance source that never resolves anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInheritance;

impl InheritanceSource for NoInheritance {
    fn inherited(&self, _property: &str) -> Option<Vec<String>> {
        None
    }
}

/// Immutable per-operation expansion context
///
/// Wall-clock time, acting identity, caller-supplied arguments, and the
/// destination handle for ancestor lookups.
pub struct ExpansionContext<'a> {
    now: DateTime<FixedOffset>,
    holder: String,
    args: IndexMap<String, Vec<String>>,
    inheritance: &'a dyn InheritanceSource,
}

impl<'a> ExpansionContext<'a> {
    /// Create a context with no arguments and no inheritance
    #[must_use]
    pub fn new(now: DateTime<FixedOffset>, holder: impl Into<String>) -> Self {
        Self {
            now,
            holder: holder.into(),
            args: IndexMap::new(),
            inheritance: &NoInheritance,
        }
    }

    /// Add a single-valued argument (builder style)
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), vec![value.into()]);
        self
    }

    /// Add a multi-valued argument (builder style)
    #[must_use]
    pub fn with_arg_list<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Attach an inheritance source (builder style)
    #[must_use]
    pub fn with_inheritance(mut self, source: &'a dyn InheritanceSource) -> Self {
        self.inheritance = source;
        self
    }

    /// Wall-clock time of the operation
    #[inline]
    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }

    /// Acting identity
    #[inline]
    #[must_use]
    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Argument values for a key
    #[inline]
    #[must_use]
    pub fn arg(&self, key: &str) -> Option<&[String]> {
        self.args.get(key).map(Vec::as_slice)
    }

    /// Expand one raw token into zero or more concrete values
    ///
    /// An empty result means "no substitution for this occurrence".
    ///
    /// # Errors
    /// Returns an error only for a malformed `$now` date-math suffix.
    pub fn expand(&self, token: &str) -> Result<Vec<String>, ExpandError> {
        if token == "$name" {
            return Ok(self.arg("name").map(<[String]>::to_vec).unwrap_or_default());
        }
        if token == "$holder" {
            return Ok(vec![self.holder.clone()]);
        }
        if let Some(suffix) = now_suffix(token) {
            let stamped = apply_date_math(self.now, suffix)?;
            return Ok(vec![stamped.to_rfc3339_opts(SecondsFormat::Millis, false)]);
        }
        if token == "$inherit" {
            // No property named: nothing to resolve
            return Ok(Vec::new());
        }
        if let Some(property) = token.strip_prefix("$inherit/") {
            if let Some(values) = self.arg(property) {
                return Ok(values.to_vec());
            }
            return Ok(self.inheritance.inherited(property).unwrap_or_default());
        }
        if token == "$uuid" {
            return Ok(vec![Uuid::new_v4().hyphenated().to_string()]);
        }
        if let Some(key) = token.strip_prefix('$') {
            return Ok(self.arg(key).map(<[String]>::to_vec).unwrap_or_default());
        }
        Ok(vec![token.to_string()])
    }
}

impl std::fmt::Debug for ExpansionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpansionContext")
            .field("now", &self.now)
            .field("holder", &self.holder)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Date-math suffix of a `$now` token, if the token is one
///
/// `$nowhere` is an ordinary argument key, not a time expression.
fn now_suffix(token: &str) -> Option<&str> {
    let rest = token.strip_prefix("$now")?;
    if rest.is_empty() || rest.starts_with(['+', '-', '/']) {
        Some(rest)
    } else {
        None
    }
}

/// Time unit of a date-math term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Milli,
}

fn parse_unit(s: &str) -> Result<Unit, ExpandError> {
    match s {
        "Y" => Ok(Unit::Year),
        "M" => Ok(Unit::Month),
        "D" => Ok(Unit::Day),
        "H" => Ok(Unit::Hour),
        "MIN" => Ok(Unit::Minute),
        "SEC" => Ok(Unit::Second),
        "MIL" => Ok(Unit::Milli),
        _ => Err(ExpandError::UnknownUnit(s.to_string())),
    }
}

/// Apply a `$now` suffix: signed offset terms and `/` round-downs,
/// left to right
fn apply_date_math(
    now: DateTime<FixedOffset>,
    suffix: &str,
) -> Result<DateTime<FixedOffset>, ExpandError> {
    let mut dt = now;
    let mut rest = suffix;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix('/') {
            let (unit_str, remainder) = split_unit(tail);
            let unit = parse_unit(unit_str)?;
            dt = floor_to(dt, unit).ok_or_else(|| ExpandError::Overflow(suffix.to_string()))?;
            rest = remainder;
        } else if rest.starts_with(['+', '-']) {
            let negative = rest.starts_with('-');
            let tail = &rest[1..];
            let digits_len = tail.chars().take_while(char::is_ascii_digit).count();
            if digits_len == 0 {
                return Err(ExpandError::BadTerm(suffix.to_string()));
            }
            let amount: u32 = tail[..digits_len]
                .parse()
                .map_err(|_| ExpandError::BadTerm(suffix.to_string()))?;
            let (unit_str, remainder) = split_unit(&tail[digits_len..]);
            let unit = parse_unit(unit_str)?;
            dt = shift(dt, unit, amount, negative)
                .ok_or_else(|| ExpandError::Overflow(suffix.to_string()))?;
            rest = remainder;
        } else {
            return Err(ExpandError::BadTerm(suffix.to_string()));
        }
    }
    Ok(dt)
}

/// Split a leading run of unit letters from the remainder of the suffix
fn split_unit(s: &str) -> (&str, &str) {
    let len = s.chars().take_while(char::is_ascii_alphabetic).count();
    s.split_at(len)
}

fn shift(
    dt: DateTime<FixedOffset>,
    unit: Unit,
    amount: u32,
    negative: bool,
) -> Option<DateTime<FixedOffset>> {
    match unit {
        Unit::Year | Unit::Month => {
            let months = if unit == Unit::Year {
                amount.checked_mul(12)?
            } else {
                amount
            };
            if negative {
                dt.checked_sub_months(Months::new(months))
            } else {
                dt.checked_add_months(Months::new(months))
            }
        }
        _ => {
            let span = match unit {
                Unit::Day => Duration::days(i64::from(amount)),
                Unit::Hour => Duration::hours(i64::from(amount)),
                Unit::Minute => Duration::minutes(i64::from(amount)),
                Unit::Second => Duration::seconds(i64::from(amount)),
                Unit::Milli => Duration::milliseconds(i64::from(amount)),
                Unit::Year | Unit::Month => unreachable!(),
            };
            if negative {
                dt.checked_sub_signed(span)
            } else {
                dt.checked_add_signed(span)
            }
        }
    }
}

fn floor_to(dt: DateTime<FixedOffset>, unit: Unit) -> Option<DateTime<FixedOffset>> {
    match unit {
        Unit::Milli => dt.with_nanosecond(dt.nanosecond() / 1_000_000 * 1_000_000),
        Unit::Second => dt.with_nanosecond(0),
        Unit::Minute => dt.with_second(0)?.with_nanosecond(0),
        Unit::Hour => dt.with_minute(0)?.with_second(0)?.with_nanosecond(0),
        Unit::Day => dt
            .with_hour(0)?
            .with_minute(0)?
            .with_second(0)?
            .with_nanosecond(0),
        Unit::Month => floor_to(dt.with_day(1)?, Unit::Day),
        Unit::Year => floor_to(dt.with_month(1)?.with_day(1)?, Unit::Day),
    }
}

/// Errors from token expansion
#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    /// Unit letter(s) not one of Y, M, D, H, MIN, SEC, MIL
    #[error("unknown time unit: {0}")]
    UnknownUnit(String),

    /// Malformed date-math term
    #[error("bad date expression: {0}")]
    BadTerm(String),

    /// Date arithmetic left the representable range
    #[error("date expression overflows: {0}")]
    Overflow(String),
}
