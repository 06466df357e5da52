use super::value::Value;

use std::collections::hash_map::Iter;
use std::collections::HashMap;

/// Variable bindings visible to an evaluation. Reads of unbound names yield
/// null; assignments always bind at the top level.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Context {
            values: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Value {
        self.values.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn get_ref(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Context::new();
        for (name, value) in iter {
            context.set(name, value);
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbound_reads_null() {
        let context = Context::new();
        assert_eq!(context.get("y"), Value::Null);
        assert!(!context.has("y"));
        assert!(context.get_ref("y").is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let mut context = Context::new();
        context.set("x", 1);
        context.set("x", "one");
        assert_eq!(context.get("x"), Value::from("one"));
        assert_eq!(context.len(), 1);
        assert_eq!(context.remove("x"), Some(Value::from("one")));
        assert!(context.is_empty());
    }

    #[test]
    fn test_collect() {
        let context: Context = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(context.get("b"), Value::Integer(2));
        assert_eq!(context.iter().count(), 2);
    }
}
