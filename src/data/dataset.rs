use serde::{Deserialize, Serialize};

use crate::types::Value;

/// One training case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Feature vector read by the input variables.
    pub input: Vec<Value>,
    /// Expected output (regression target or class label value).
    pub output: Value,
    /// Class index for classification tasks.
    pub label: Option<usize>,
}

impl Example {
    pub fn new(input: Vec<Value>, output: Value) -> Self {
        Self {
            input,
            output,
            label: None,
        }
    }

    pub fn labelled(input: Vec<Value>, label: usize) -> Self {
        Self {
            input,
            output: Value::Integer(label as i64),
            label: Some(label),
        }
    }
}

/// In-memory collection of examples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    examples: Vec<Example>,
    classes: Vec<String>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regression dataset sampling `f` over the given points.
    pub fn from_fn<F>(points: &[f64], f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        let examples = points
            .iter()
            .map(|&x| Example::new(vec![Value::Float(x)], Value::Float(f(x))))
            .collect();
        Self {
            examples,
            classes: Vec::new(),
        }
    }

    pub fn push(&mut self, example: Example) {
        self.examples.push(example);
    }

    /// Index of class `name`, registering it if unseen.
    pub fn encode(&mut self, name: &str) -> usize {
        match self.classes.iter().position(|c| c == name) {
            Some(i) => i,
            None => {
                self.classes.push(name.to_string());
                self.classes.len() - 1
            }
        }
    }

    /// Number of classes (0 for regression data).
    pub fn classes(&self) -> usize {
        let labelled = self
            .examples
            .iter()
            .filter_map(|e| e.label)
            .max()
            .map_or(0, |m| m + 1);
        labelled.max(self.classes.len())
    }

    pub fn class_name(&self, i: usize) -> Option<&str> {
        self.classes.get(i).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Example> {
        self.examples.iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Example;
    type IntoIter = std::slice::Iter<'a, Example>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}
