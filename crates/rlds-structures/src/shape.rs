use std::fmt::Display;

/// Declared shape of a feature. `None` marks a variable-length dimension.
#[derive(Debug, PartialEq, Clone, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Shape(Vec<Option<usize>>);

impl Shape {
    pub fn new(dims: Vec<Option<usize>>) -> Shape {
        Shape(dims)
    }

    /// Shape with every dimension known.
    pub fn fixed(dims: &[usize]) -> Shape {
        Shape(dims.iter().map(|d| Some(*d)).collect())
    }

    pub fn scalar() -> Shape {
        Shape(Vec::new())
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Size of dimension `index`, or `None` if it is variable or out of range.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.0.get(index).copied().flatten()
    }

    pub fn dims(&self) -> &[Option<usize>] {
        &self.0
    }

    /// Checks a concrete runtime shape against this declaration.
    pub fn matches(&self, actual: &[usize]) -> bool {
        self.0.len() == actual.len()
            && self
                .0
                .iter()
                .zip(actual)
                .all(|(declared, actual)| declared.map_or(true, |d| d == *actual))
    }
}

impl From<&[usize]> for Shape {
    fn from(value: &[usize]) -> Self {
        Shape::fixed(value)
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let dims: Vec<String> = self
            .0
            .iter()
            .map(|d| match d {
                Some(n) => n.to_string(),
                None => "None".to_string(),
            })
            .collect();
        write!(f, "({})", dims.join(", "))
    }
}

/// Formats a runtime shape the same way a declared [`Shape`] is displayed.
pub fn format_dims(dims: &[usize]) -> String {
    Shape::fixed(dims).to_string()
}
