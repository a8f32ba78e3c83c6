use std::sync::Arc;

use crate::operator::OperatorRegistry;
use crate::pattern::{Algorithm, MatchAlgorithm, Pattern, PatternFormat, PatternSearchEngine};

/// Settings for an [`OffsetResolver`](super::OffsetResolver).
#[derive(Clone, Default)]
pub struct ResolverConfig {
    /// Built-in search strategy for pattern lookups
    pub algorithm: Algorithm,
    /// Text form of patterns in the document
    pub pattern_format: PatternFormat,
    /// Replaces `algorithm` when set
    pub custom_algorithm: Option<Arc<dyn MatchAlgorithm>>,
    /// Operator registry; the global one when unset
    pub registry: Option<Arc<OperatorRegistry>>,
}

impl ResolverConfig {
    /// Create a new configuration builder
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::default()
    }

    pub fn registry(&self) -> &OperatorRegistry {
        match &self.registry {
            Some(registry) => registry.as_ref(),
            None => OperatorRegistry::global(),
        }
    }

    pub(crate) fn engine(&self, pattern: Pattern) -> PatternSearchEngine {
        match &self.custom_algorithm {
            Some(algorithm) => PatternSearchEngine::with_algorithm(pattern, Arc::clone(algorithm)),
            None => PatternSearchEngine::with_strategy(pattern, self.algorithm),
        }
    }
}

impl std::fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("algorithm", &self.algorithm)
            .field("pattern_format", &self.pattern_format)
            .field("custom_algorithm", &self.custom_algorithm.is_some())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Builder for ResolverConfig
#[derive(Default)]
pub struct ResolverConfigBuilder {
    algorithm: Option<Algorithm>,
    pattern_format: Option<PatternFormat>,
    custom_algorithm: Option<Arc<dyn MatchAlgorithm>>,
    registry: Option<Arc<OperatorRegistry>>,
}

impl ResolverConfigBuilder {
    /// Set the built-in search strategy
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Set the pattern text format
    pub fn pattern_format(mut self, format: PatternFormat) -> Self {
        self.pattern_format = Some(format);
        self
    }

    /// Search with a custom strategy instead of a built-in one
    pub fn custom_algorithm(mut self, algorithm: Arc<dyn MatchAlgorithm>) -> Self {
        self.custom_algorithm = Some(algorithm);
        self
    }

    /// Use a private operator registry
    pub fn registry(mut self, registry: Arc<OperatorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ResolverConfig {
        let default = ResolverConfig::default();
        ResolverConfig {
            algorithm: self.algorithm.unwrap_or(default.algorithm),
            pattern_format: self.pattern_format.unwrap_or(default.pattern_format),
            custom_algorithm: self.custom_algorithm,
            registry: self.registry,
        }
    }
}
