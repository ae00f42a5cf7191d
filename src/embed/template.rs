//! Embedded page shells with typed placeholders.
//!
//! A shell is an `include_str!`ed document whose `__NAME__` placeholders
//! are filled by exactly one variable set, so a fragment page can only be
//! wrapped with the values that shell expects.

use std::marker::PhantomData;

/// Values substituted into one kind of shell.
pub trait TemplateVars {
    /// Placeholders this variable set fills, in the order of [`values`](Self::values).
    const PLACEHOLDERS: &'static [&'static str];

    fn values(&self) -> Vec<&str>;
}

/// Static shell text bound to the variable set that renders it.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    /// Replace each placeholder with its value. Values are inserted
    /// verbatim and never rescanned for later placeholders.
    pub fn render(&self, vars: &V) -> String {
        let values = vars.values();
        let mut out = String::with_capacity(self.content.len());
        let mut rest = self.content;
        loop {
            let next = V::PLACEHOLDERS
                .iter()
                .zip(&values)
                .filter_map(|(placeholder, value)| {
                    rest.find(placeholder).map(|at| (at, *placeholder, *value))
                })
                .min_by_key(|(at, ..)| *at);
            let Some((at, placeholder, value)) = next else {
                out.push_str(rest);
                return out;
            };
            out.push_str(&rest[..at]);
            out.push_str(value);
            rest = &rest[at + placeholder.len()..];
        }
    }
}
