use once_cell::unsync::OnceCell;

use crate::error::{Error, Result};

/// Deferred source of operand text, typically the evaluation of a nested expression.
///
/// An empty string stands for "no value".
pub type TextFactory<'a> = Box<dyn Fn() -> Result<String> + 'a>;

/// Build a [`TextFactory`] that always yields `text`.
pub fn literal<'a>(text: impl Into<String>) -> TextFactory<'a> {
    let text = text.into();
    Box::new(move || Ok(text.clone()))
}

type Init<'a, T> = Box<dyn Fn() -> Result<T> + 'a>;

/// A value computed on first access and memoized for the owner's lifetime.
///
/// A failed initialization is not memoized; the next access runs it again.
pub struct LazyValue<'a, T> {
    cell: OnceCell<T>,
    init: Option<Init<'a, T>>,
}

impl<'a, T> LazyValue<'a, T> {
    /// An already-initialized value.
    pub fn ready(value: T) -> Self {
        Self {
            cell: OnceCell::with_value(value),
            init: None,
        }
    }

    /// A value parsed from factory text on first access.
    pub fn from_text(factory: TextFactory<'a>, parse: fn(&str) -> Result<T>) -> Self
    where
        T: 'a,
    {
        Self {
            cell: OnceCell::new(),
            init: Some(Box::new(move || parse(&factory()?))),
        }
    }

    pub fn get(&self) -> Result<&T> {
        self.cell.get_or_try_init(|| match &self.init {
            Some(init) => init(),
            None => Err(Error::MalformedOperand("operand has no value source".to_string())),
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LazyValue<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("LazyValue").field(value).finish(),
            None => f.write_str("LazyValue(<pending>)"),
        }
    }
}
