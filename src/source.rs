//! Display names for whatever produced a log entry

use std::borrow::Cow;
use std::fmt;

/// Human-readable name of the code that issued a log call
///
/// Rendered between braces in every entry: `{my_crate::worker::Fetcher}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source(Cow<'static, str>);

impl Source {
    /// Name a type, e.g. `Source::of::<Fetcher>()`
    pub fn of<T: ?Sized>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// Name the type of a runtime value
    pub fn of_val<T: ?Sized>(_value: &T) -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// Use an arbitrary name
    pub fn named(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Source {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for Source {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fetcher;

    #[test]
    fn test_source_of_type() {
        let source = Source::of::<Fetcher>();
        assert!(source.as_str().ends_with("source::tests::Fetcher"));
    }

    #[test]
    fn test_source_of_value_uses_its_type() {
        let fetcher = Fetcher;
        assert_eq!(Source::of_val(&fetcher), Source::of::<Fetcher>());
        assert_eq!(Source::of_val(&42u32).as_str(), "u32");
    }

    #[test]
    fn test_source_from_strings() {
        assert_eq!(Source::from("main").as_str(), "main");
        assert_eq!(Source::from(String::from("worker")).to_string(), "worker");
        assert_eq!(Source::named("pool").as_str(), "pool");
    }
}
