//! Multi-valued HTTP header map.

use std::fmt;

/// An ordered, multi-valued header map.
///
/// Header names compare ASCII case-insensitively. Keys keep the order and
/// spelling of their first insertion; values keep the order they were added
/// in. Adding a value never replaces or deduplicates an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Append a value for `name`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Append every value of every key in `other`.
    pub fn extend<K, V, I>(&mut self, other: impl IntoIterator<Item = (K, I)>)
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        for (name, values) in other {
            let name = name.into();
            for value in values {
                self.add(name.clone(), value);
            }
        }
    }

    /// The first value of `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// All values of `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(idx) => &self.entries[idx].1,
            None => &[],
        }
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove every value of `name`.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Iterate over keys and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.add(name, value);
        }
        headers
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, values) in &self.entries {
            writeln!(f, "{name}: {values:?}")?;
        }
        Ok(())
    }
}
