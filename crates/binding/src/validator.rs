//! Attribute value validators.
//!
//! A validator inspects one known value and returns every problem it finds
//! as a human-readable message. An empty list means the value is accepted.

use regex::Regex;

/// Validation rule for values of type `T`.
pub trait Validator<T>: Send + Sync {
    /// Short description shown in schemas.
    fn description(&self) -> String;

    /// Check a value, returning zero or more violation messages.
    fn validate(&self, value: &T) -> Vec<String>;
}

/// String must be one of a fixed set of values.
pub struct OneOf {
    allowed: Vec<String>,
}

/// Accept only the listed strings.
///
/// ```
/// use binding::validator::{one_of, Validator};
///
/// let action = one_of(&["ACCEPT", "REJECT", "DROP"]);
/// assert!(action.validate(&"DROP".to_string()).is_empty());
/// assert_eq!(action.validate(&"drop".to_string()).len(), 1);
/// ```
pub fn one_of(allowed: &[&str]) -> OneOf {
    OneOf {
        allowed: allowed.iter().map(|s| (*s).to_string()).collect(),
    }
}

impl OneOf {
    fn quoted(&self) -> String {
        self.allowed
            .iter()
            .map(|s| format!("{s:?}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Validator<String> for OneOf {
    fn description(&self) -> String {
        format!("value must be one of: [{}]", self.quoted())
    }

    fn validate(&self, value: &String) -> Vec<String> {
        if self.allowed.contains(value) {
            Vec::new()
        } else {
            vec![format!(
                "value must be one of: [{}], got: {value:?}",
                self.quoted()
            )]
        }
    }
}

/// Integer must lie in an inclusive range.
pub struct Between {
    min: i64,
    max: i64,
}

/// Accept integers in `min..=max`.
pub fn between(min: i64, max: i64) -> Between {
    Between { min, max }
}

impl Validator<i64> for Between {
    fn description(&self) -> String {
        format!("value must be between {} and {}", self.min, self.max)
    }

    fn validate(&self, value: &i64) -> Vec<String> {
        if (self.min..=self.max).contains(value) {
            Vec::new()
        } else {
            vec![format!(
                "value must be between {} and {}, got: {value}",
                self.min, self.max
            )]
        }
    }
}

/// String length (in characters) must lie in an inclusive range.
pub struct LengthBetween {
    min: usize,
    max: usize,
}

/// Accept strings whose length is in `min..=max`.
pub fn length_between(min: usize, max: usize) -> LengthBetween {
    LengthBetween { min, max }
}

impl Validator<String> for LengthBetween {
    fn description(&self) -> String {
        format!(
            "string length must be between {} and {}",
            self.min, self.max
        )
    }

    fn validate(&self, value: &String) -> Vec<String> {
        let len = value.chars().count();
        if (self.min..=self.max).contains(&len) {
            Vec::new()
        } else {
            vec![format!(
                "string length must be between {} and {}, got: {len}",
                self.min, self.max
            )]
        }
    }
}

/// String must contain something other than whitespace.
pub struct NotBlank;

impl Validator<String> for NotBlank {
    fn description(&self) -> String {
        "value must not be blank".to_string()
    }

    fn validate(&self, value: &String) -> Vec<String> {
        if value.trim().is_empty() {
            vec![self.description()]
        } else {
            Vec::new()
        }
    }
}

/// List must have at least `min` elements.
pub struct SizeAtLeast {
    min: usize,
}

/// Accept lists with at least `min` elements.
pub fn size_at_least(min: usize) -> SizeAtLeast {
    SizeAtLeast { min }
}

impl Validator<Vec<String>> for SizeAtLeast {
    fn description(&self) -> String {
        format!("list must contain at least {} elements", self.min)
    }

    fn validate(&self, value: &Vec<String>) -> Vec<String> {
        if value.len() >= self.min {
            Vec::new()
        } else {
            vec![format!(
                "list must contain at least {} elements, got: {}",
                self.min,
                value.len()
            )]
        }
    }
}

/// Every list element must match a pattern.
///
/// Reports one message per offending element.
pub struct EachMatches {
    pattern: Regex,
    message: String,
}

/// Accept lists whose elements all match `pattern`.
///
/// `message` describes the expected format, e.g. "port must look like 3 or 3t".
pub fn each_matches(pattern: Regex, message: impl Into<String>) -> EachMatches {
    EachMatches {
        pattern,
        message: message.into(),
    }
}

impl Validator<Vec<String>> for EachMatches {
    fn description(&self) -> String {
        format!("each element: {}", self.message)
    }

    fn validate(&self, value: &Vec<String>) -> Vec<String> {
        value
            .iter()
            .enumerate()
            .filter(|(_, element)| !self.pattern.is_match(element))
            .map(|(index, element)| format!("element {index} ({element:?}): {}", self.message))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_of() {
        let v = one_of(&["ACCEPT", "REJECT"]);
        assert!(v.validate(&"ACCEPT".to_string()).is_empty());
        assert_eq!(
            v.validate(&"ALLOW".to_string()),
            vec![r#"value must be one of: ["ACCEPT", "REJECT"], got: "ALLOW""#.to_string()]
        );
        assert_eq!(v.description(), r#"value must be one of: ["ACCEPT", "REJECT"]"#);
    }

    #[test]
    fn test_between_is_inclusive() {
        let v = between(1, 4094);
        assert!(v.validate(&1).is_empty());
        assert!(v.validate(&4094).is_empty());
        assert_eq!(v.validate(&0).len(), 1);
        assert_eq!(v.validate(&4095).len(), 1);
    }

    #[test]
    fn test_length_between_counts_chars() {
        let v = length_between(1, 3);
        assert!(v.validate(&"äöü".to_string()).is_empty());
        assert_eq!(v.validate(&String::new()).len(), 1);
    }

    #[test]
    fn test_not_blank() {
        assert!(NotBlank.validate(&"lan".to_string()).is_empty());
        assert_eq!(NotBlank.validate(&"  ".to_string()).len(), 1);
    }

    #[test]
    fn test_size_at_least() {
        let v = size_at_least(1);
        assert!(v.validate(&vec!["lan".to_string()]).is_empty());
        assert_eq!(v.validate(&Vec::new()).len(), 1);
    }

    #[test]
    fn test_each_matches_reports_every_element() {
        let v = each_matches(Regex::new(r"^\d+t?$").unwrap(), "port must look like 3 or 3t");
        let violations = v.validate(&vec![
            "1".to_string(),
            "x".to_string(),
            "3t".to_string(),
            "y".to_string(),
        ]);
        assert_eq!(violations.len(), 2);
        assert!(violations[0].starts_with("element 1"));
        assert!(violations[1].starts_with("element 3"));
    }
}
