//! Categorical palettes

use crate::graph::Color;

/// matplotlib's `tab20` qualitative colour map
pub const TAB20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Index into `TAB20` of entry `i` when the map is resampled to `n` colours.
///
/// Resampling evaluates the map at `n` evenly spaced points in [0, 1]; a
/// point `x` picks entry `floor(x * 20)`, with 1.0 clamped to the last one.
fn resampled_index(i: usize, n: usize) -> usize {
    let len = TAB20.len();
    if n <= 1 {
        return 0;
    }
    let x = if i == n - 1 {
        1.0
    } else {
        i as f64 * (1.0 / (n - 1) as f64)
    };
    ((x * len as f64) as usize).min(len - 1)
}

/// Ordered name → colour assignment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    entries: Vec<(String, Color)>,
}

impl Palette {
    /// Assign `tab20` resampled to the number of names, in the order given.
    /// Callers pass sorted names so the assignment is stable across runs.
    pub fn categorical<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let n = names.len();
        let entries = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, Color::from(TAB20[resampled_index(i, n)])))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Color> {
        self.entries.iter().find(|(key, _)| key == name).map(|(_, c)| c)
    }

    /// Colour of the first key that occurs in `text`
    pub fn first_contained_in(&self, text: &str) -> Option<&Color> {
        self.entries
            .iter()
            .find(|(key, _)| text.contains(key.as_str()))
            .map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Color)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c))
    }
}
