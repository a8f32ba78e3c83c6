use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::CachedElement;
use crate::error::{Error, Result};
use crate::expression::AddressExpression;
use crate::pattern::{Pattern, PatternFormat};

/// A named signature plus its build-gated search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternDefinition {
    pub name: String,
    /// Combined pattern text, e.g. `"48 8D 0D ? ? ? ?"`
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<CachedElement>,
}

impl PatternDefinition {
    pub fn new(name: impl Into<String>, pattern: &Pattern) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.to_combined_string(),
            cached: None,
        }
    }

    /// Parse the stored pattern text. Line breaks count as separators.
    pub fn parse_pattern(&self, format: &PatternFormat) -> Result<Pattern> {
        Pattern::parse_with(&self.pattern.replace('\n', " "), format)
    }
}

/// A named address and the expression that computes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OffsetDefinition {
    pub name: String,
    /// Without an operation the offset is the pattern of the same name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<AddressExpression>,
}

impl OffsetDefinition {
    pub fn new(name: impl Into<String>, operation: AddressExpression) -> Self {
        Self {
            name: name.into(),
            operation: Some(operation),
        }
    }

    /// An offset that resolves the pattern named like itself.
    pub fn implicit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation: None,
        }
    }

    pub fn root_expression(&self) -> AddressExpression {
        match &self.operation {
            Some(operation) => operation.clone(),
            None => AddressExpression::pattern(self.name.trim()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DocumentData {
    patterns: Vec<PatternDefinition>,
    offsets: Vec<OffsetDefinition>,
}

/// In-memory form of the persisted pattern and offset definitions.
///
/// Every mutating method marks the document dirty; the resolver saves and
/// reloads dirty documents after each resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetDocument {
    data: DocumentData,
    dirty: bool,
}

impl OffsetDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate document bytes. Empty input is an empty document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, &PatternFormat::default())
    }

    /// Like [`Self::from_bytes`], checking pattern text against `format`.
    pub fn from_bytes_with(bytes: &[u8], format: &PatternFormat) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            debug!("Empty offset document, starting fresh");
            return Ok(Self::new());
        }

        let data: DocumentData = serde_json::from_slice(bytes)
            .map_err(|e| Error::InvalidDocument(e.to_string()))?;
        let document = Self { data, dirty: false };
        document.validate(format)?;
        Ok(document)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.data)?)
    }

    /// Check names, pattern text and operator identifiers.
    pub fn validate(&self, format: &PatternFormat) -> Result<()> {
        let mut names = HashSet::new();
        for definition in &self.data.patterns {
            require_name("pattern", &definition.name, &mut names)?;
            definition.parse_pattern(format).map_err(|e| {
                Error::InvalidDocument(format!("pattern '{}': {}", definition.name, e))
            })?;
        }

        let mut names = HashSet::new();
        for definition in &self.data.offsets {
            require_name("offset", &definition.name, &mut names)?;
            if let Some(operation) = &definition.operation {
                operation.validate().map_err(|e| {
                    Error::InvalidDocument(format!("offset '{}': {}", definition.name, e))
                })?;
            }
        }

        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn patterns(&self) -> &[PatternDefinition] {
        &self.data.patterns
    }

    pub fn offsets(&self) -> &[OffsetDefinition] {
        &self.data.offsets
    }

    pub fn pattern_index(&self, name: &str) -> Option<usize> {
        self.data.patterns.iter().position(|p| p.name.trim() == name)
    }

    pub fn offset_index(&self, name: &str) -> Option<usize> {
        self.data.offsets.iter().position(|o| o.name.trim() == name)
    }

    pub fn pattern(&self, name: &str) -> Option<&PatternDefinition> {
        self.pattern_index(name).map(|i| &self.data.patterns[i])
    }

    pub fn offset(&self, name: &str) -> Option<&OffsetDefinition> {
        self.offset_index(name).map(|i| &self.data.offsets[i])
    }

    /// Append a pattern definition; the name must be new.
    pub fn add_pattern(&mut self, definition: PatternDefinition) -> Result<usize> {
        if self.pattern_index(definition.name.trim()).is_some() {
            return Err(Error::InvalidDocument(format!(
                "duplicate pattern name '{}'",
                definition.name
            )));
        }
        self.data.patterns.push(definition);
        self.dirty = true;
        Ok(self.data.patterns.len() - 1)
    }

    /// Replace the pattern at `index`; the new name must not belong to another pattern.
    pub fn replace_pattern(&mut self, index: usize, definition: PatternDefinition) -> Result<PatternDefinition> {
        if self
            .pattern_index(definition.name.trim())
            .is_some_and(|existing| existing != index)
        {
            return Err(Error::InvalidDocument(format!(
                "duplicate pattern name '{}'",
                definition.name
            )));
        }
        let slot = self
            .data
            .patterns
            .get_mut(index)
            .ok_or_else(|| out_of_range("pattern", index))?;
        self.dirty = true;
        Ok(std::mem::replace(slot, definition))
    }

    pub fn remove_pattern(&mut self, name: &str) -> Option<PatternDefinition> {
        let index = self.pattern_index(name)?;
        self.dirty = true;
        Some(self.data.patterns.remove(index))
    }

    /// Set or clear the cached search result of a pattern.
    pub fn set_cached(&mut self, index: usize, cached: Option<CachedElement>) -> Result<()> {
        let definition = self
            .data
            .patterns
            .get_mut(index)
            .ok_or_else(|| out_of_range("pattern", index))?;
        definition.cached = cached;
        self.dirty = true;
        Ok(())
    }

    /// Append an offset definition; the name must be new.
    pub fn add_offset(&mut self, definition: OffsetDefinition) -> Result<usize> {
        if self.offset_index(definition.name.trim()).is_some() {
            return Err(Error::InvalidDocument(format!(
                "duplicate offset name '{}'",
                definition.name
            )));
        }
        self.data.offsets.push(definition);
        self.dirty = true;
        Ok(self.data.offsets.len() - 1)
    }

    /// Replace the offset at `index`; the new name must not belong to another offset.
    pub fn replace_offset(&mut self, index: usize, definition: OffsetDefinition) -> Result<OffsetDefinition> {
        if self
            .offset_index(definition.name.trim())
            .is_some_and(|existing| existing != index)
        {
            return Err(Error::InvalidDocument(format!(
                "duplicate offset name '{}'",
                definition.name
            )));
        }
        let slot = self
            .data
            .offsets
            .get_mut(index)
            .ok_or_else(|| out_of_range("offset", index))?;
        self.dirty = true;
        Ok(std::mem::replace(slot, definition))
    }

    pub fn remove_offset(&mut self, name: &str) -> Option<OffsetDefinition> {
        let index = self.offset_index(name)?;
        self.dirty = true;
        Some(self.data.offsets.remove(index))
    }

    /// Replace an offset's root expression; `None` makes it implicit.
    pub fn set_operation(&mut self, index: usize, operation: Option<AddressExpression>) -> Result<()> {
        let definition = self
            .data
            .offsets
            .get_mut(index)
            .ok_or_else(|| out_of_range("offset", index))?;
        definition.operation = operation;
        self.dirty = true;
        Ok(())
    }

    /// Rewrite a unary root operation of an offset as its binary form.
    pub fn convert_to_binary(&mut self, index: usize) -> Result<()> {
        let definition = self
            .data
            .offsets
            .get_mut(index)
            .ok_or_else(|| out_of_range("offset", index))?;
        if let Some(operation) = definition.operation.take() {
            definition.operation = Some(operation.into_binary());
        }
        self.dirty = true;
        Ok(())
    }
}

fn require_name<'a>(kind: &str, name: &'a str, seen: &mut HashSet<&'a str>) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidDocument(format!("{} with empty name", kind)));
    }
    if !seen.insert(name) {
        return Err(Error::InvalidDocument(format!("duplicate {} name '{}'", kind, name)));
    }
    Ok(())
}

fn out_of_range(kind: &str, index: usize) -> Error {
    Error::InvalidDocument(format!("{} index {} out of range", kind, index))
}
