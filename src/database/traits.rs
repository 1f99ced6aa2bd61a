//! Annotation traits attached to types, members and methods.
//!
//! A trait list is ordered and keys may repeat, so `PROPERTY(tag=a, tag=b)`
//! reads back as the list `["a", "b"]`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trait {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traits(Vec<Trait>);

impl Traits {
    pub fn new() -> Self {
        Traits(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<String>, value: Option<String>) {
        self.0.push(Trait {
            key: key.into(),
            value,
        });
    }

    pub fn extend(&mut self, other: Traits) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trait> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.iter().any(|t| t.key == key)
    }

    /// Value of the first entry with `key`. A key present without a value
    /// reads as an empty string.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.value.as_deref().unwrap_or(""))
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => default,
        }
    }

    /// `true`/`on` read as true, anything else as false; a missing or empty
    /// value yields `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(value) if !value.is_empty() => parse_bool(value),
            _ => default,
        }
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|value| parse_int(value))
            .unwrap_or(default)
    }

    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        self.get(key)
            .and_then(|value| parse_float(value))
            .unwrap_or(default)
    }

    /// All values for `key`: every repeated entry, each split on `;`.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|t| t.key == key)
            .filter_map(|t| t.value.as_deref())
            .flat_map(|value| value.split(';'))
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// `key = "a:b"` as a pair of floats.
    pub fn get_range(&self, key: &str) -> Option<(f32, f32)> {
        let (low, high) = self.get(key)?.split_once(':')?;
        Some((parse_float(low)?, parse_float(high)?))
    }

    /// Build a `T` from `key = "field = value; field = value"`.
    ///
    /// Unknown field names are ignored. Returns `None` when the key is absent.
    pub fn fill<T: TraitFill>(&self, key: &str) -> Option<T> {
        let text = self.get(key)?.replace(['~', '`'], "\"");
        let mut target = T::default();
        for assignment in text.split([';', ',']) {
            let Some((field, value)) = assignment.split_once('=') else {
                continue;
            };
            let field = field.trim();
            let value = value.trim().trim_matches('"');
            if let Some((_, setter)) = T::FIELDS.iter().find(|(name, _)| *name == field) {
                setter(&mut target, value);
            }
        }
        Some(target)
    }
}

impl fmt::Display for Traits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, t) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match &t.value {
                Some(value) => write!(f, "{}={}", t.key, value)?,
                None => write!(f, "{}", t.key)?,
            }
        }
        Ok(())
    }
}

/// Setter applied to one named field of a [`TraitFill`] target.
pub type FieldSetter<T> = fn(&mut T, &str);

/// A struct that can be populated from a trait value through a static
/// field-name table.
pub trait TraitFill: Default + 'static {
    const FIELDS: &'static [(&'static str, FieldSetter<Self>)];
}

/// Slider-style bounds, e.g. `PROPERTY(range="min=0.1; max=0.5")`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

fn set_min(range: &mut NumericRange, value: &str) {
    range.min = parse_float(value).unwrap_or(range.min);
}

fn set_max(range: &mut NumericRange, value: &str) {
    range.max = parse_float(value).unwrap_or(range.max);
}

fn set_step(range: &mut NumericRange, value: &str) {
    range.step = parse_float(value).unwrap_or(range.step);
}

impl TraitFill for NumericRange {
    const FIELDS: &'static [(&'static str, FieldSetter<Self>)] =
        &[("min", set_min), ("max", set_max), ("step", set_step)];
}

pub fn parse_bool(text: &str) -> bool {
    let text = text.trim();
    text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("on")
}

pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    text.parse().ok()
}

/// Accepts a trailing `f` as C++ float literals carry one.
pub fn parse_float(text: &str) -> Option<f32> {
    let text = text.trim();
    let text = text.strip_suffix(['f', 'F']).unwrap_or(text);
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Traits {
        let mut traits = Traits::new();
        traits.push("name", Some("Speed".to_string()));
        traits.push("hidden", None);
        traits.push("enabled", Some("on".to_string()));
        traits.push("tag", Some("a; b".to_string()));
        traits.push("tag", Some("c".to_string()));
        traits.push("limits", Some("-1:2.5".to_string()));
        traits.push("range", Some("min = 0.1; max = 0.5f; color = red".to_string()));
        traits
    }

    #[test]
    fn test_lookup_helpers() {
        let traits = sample();
        assert!(traits.has("hidden"));
        assert_eq!(traits.get("hidden"), Some(""));
        assert_eq!(traits.get("name"), Some("Speed"));
        assert_eq!(traits.get("missing"), None);
        assert_eq!(traits.get_or("hidden", "fallback"), "fallback");
        assert!(traits.get_bool("enabled", false));
        assert!(traits.get_bool("missing", true));
        assert!(!traits.get_bool("name", true));
    }

    #[test]
    fn test_repeated_keys_form_a_list() {
        assert_eq!(sample().get_list("tag"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_range_pair() {
        assert_eq!(sample().get_range("limits"), Some((-1.0, 2.5)));
        assert_eq!(sample().get_range("name"), None);
    }

    #[test]
    fn test_fill_uses_static_field_table() {
        let range: NumericRange = sample().fill("range").unwrap();
        assert_eq!(range.min, 0.1);
        assert_eq!(range.max, 0.5);
        assert_eq!(range.step, 0.0);
        assert!(sample().fill::<NumericRange>("missing").is_none());
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_int("0x10"), Some(16));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_float("1.5f"), Some(1.5));
        assert_eq!(parse_float("abc"), None);
    }
}
