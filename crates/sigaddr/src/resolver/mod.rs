//! Named offset resolution over a persisted document.
//!
//! [`OffsetResolver`] answers "where is `name` in the target right now?".
//! Fully resolved names are kept in a process-lifetime cache. Pattern
//! searches behind them are cached in the document itself, per target
//! build, and written back to the store whenever they change.
//!
//! # Example
//!
//! ```ignore
//! use sigaddr::prelude::*;
//!
//! let store = FileDocumentStore::new("offsets.json");
//! let resolver = OffsetResolver::new(target, store)?;
//!
//! if resolver.can_resolve("PlayerBase") {
//!     let address = resolver.get_address("PlayerBase")?;
//! }
//! ```

mod config;
mod patterns;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cache::ProcessAddressCache;
use crate::document::{DocumentStore, OffsetDocument};
use crate::error::{Error, Result};
use crate::expression::Evaluator;
use crate::memory::ProcessContext;

pub use config::{ResolverConfig, ResolverConfigBuilder};
use patterns::DocumentPatterns;

struct DocumentState {
    document: OffsetDocument,
    /// Store timestamp observed right before the last load
    loaded_at: DateTime<Utc>,
}

/// Resolves named offsets for one target process.
pub struct OffsetResolver<C, S> {
    context: C,
    store: S,
    config: ResolverConfig,
    state: Mutex<DocumentState>,
    addresses: ProcessAddressCache,
}

impl<C: ProcessContext, S: DocumentStore> OffsetResolver<C, S> {
    /// Load the document from `store` with the default configuration
    pub fn new(context: C, store: S) -> Result<Self> {
        Self::with_config(context, store, ResolverConfig::default())
    }

    pub fn with_config(context: C, store: S, config: ResolverConfig) -> Result<Self> {
        let state = load_state(&store, &config)?;
        Ok(Self {
            context,
            store,
            config,
            state: Mutex::new(state),
            addresses: ProcessAddressCache::new(),
        })
    }

    /// Whether `name` is already resolved or has a definition.
    ///
    /// Does not reload the document.
    pub fn can_resolve(&self, name: &str) -> bool {
        self.addresses.contains(name) || self.state.lock().document.offset(name).is_some()
    }

    /// Resolve `name` to an absolute address in the target.
    pub fn get_address(&self, name: &str) -> Result<u64> {
        if let Some(address) = self.addresses.get(name) {
            debug!("Offset '{}' resolved from process cache: 0x{:X}", name, address);
            return Ok(address);
        }

        let mut state = self.state.lock();

        if self.store.last_modified()? > state.loaded_at {
            info!("Offset document changed in store, reloading");
            *state = load_state(&self.store, &self.config)?;
        }

        let expression = state
            .document
            .offset(name)
            .ok_or_else(|| Error::UnresolvedOffsetName(name.to_string()))?
            .root_expression();

        let address = {
            let patterns = DocumentPatterns::new(&mut state.document, &self.context, &self.config);
            Evaluator::new(self.config.registry(), &patterns)
                .with_memory(self.context.memory())
                .evaluate_address(&expression)?
        };

        if state.document.is_dirty() {
            self.save_and_reload(&mut state)?;
        }
        drop(state);

        info!("Resolved offset '{}' to 0x{:X}", name, address);
        // a resolved name stays valid for the process; build changes are caught by the document cache
        Ok(self.addresses.insert(name, address))
    }

    /// Forget every resolved name.
    pub fn reset(&self) {
        debug!("Clearing {} resolved offset(s)", self.addresses.len());
        self.addresses.clear();
    }

    /// Reload the document from the store, discarding unsaved changes.
    pub fn reload(&self) -> Result<()> {
        let state = load_state(&self.store, &self.config)?;
        *self.state.lock() = state;
        Ok(())
    }

    /// Apply `edit` to the document, then save and reload it if anything changed.
    ///
    /// If the edit, validation or save fails, the document is left as it was.
    pub fn edit_document<T>(&self, edit: impl FnOnce(&mut OffsetDocument) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock();
        let snapshot = state.document.clone();

        let result = edit(&mut state.document).and_then(|value| {
            if state.document.is_dirty() {
                state.document.validate(&self.config.pattern_format)?;
                self.save_and_reload(&mut state)?;
            }
            Ok(value)
        });

        if result.is_err() {
            warn!("Offset document edit rejected, keeping the previous document");
            state.document = snapshot;
        }
        result
    }

    /// A snapshot of the current document.
    pub fn document(&self) -> OffsetDocument {
        self.state.lock().document.clone()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn save_and_reload(&self, state: &mut DocumentState) -> Result<()> {
        let bytes = state.document.to_bytes()?;
        self.store.save(&bytes)?;
        state.document.mark_clean();
        *state = load_state(&self.store, &self.config)?;
        Ok(())
    }
}

fn load_state<S: DocumentStore>(store: &S, config: &ResolverConfig) -> Result<DocumentState> {
    let loaded_at = store.last_modified()?;
    let bytes = store.load()?;
    let document = OffsetDocument::from_bytes_with(&bytes, &config.pattern_format)?;
    info!(
        "Loaded offset document: {} pattern(s), {} offset(s)",
        document.patterns().len(),
        document.offsets().len()
    );
    Ok(DocumentState {
        document,
        loaded_at,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cache::CachedElement;
    use crate::document::{MemoryDocumentStore, OffsetDefinition};
    use crate::expression::AddressExpression;
    use crate::memory::{MockMemoryBuilder, MockMemoryReader, Target};
    use crate::pattern::{Algorithm, MatchAlgorithm};

    const BASE: u64 = 0x1_4000_0000;

    /// Naive search that counts how often it runs.
    #[derive(Default)]
    struct CountingAlgorithm(AtomicUsize);

    impl CountingAlgorithm {
        fn calls(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl MatchAlgorithm for CountingAlgorithm {
        fn apply(&self, pattern: &[u8], mask: &[bool], haystack: &[u8]) -> Option<usize> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Algorithm::Naive.instance().apply(pattern, mask, haystack)
        }
    }

    fn target(version: &str) -> Target<MockMemoryReader> {
        MockMemoryBuilder::new()
            .base(BASE)
            .size(0x200)
            .write_at(BASE + 0x30, &[0x48, 0x8B, 0x05, 0x11, 0x22, 0x33, 0x44, 0xC3])
            .write_at(BASE + 0x80, &[0x00, 0x20, 0x00, 0x00])
            .remote_target(version)
    }

    fn document(cached: Option<(&str, &str)>) -> String {
        let cached = cached
            .map(|(build, value)| format!(r#", "cached": {{ "build": "{}", "value": "{}" }}"#, build, value))
            .unwrap_or_default();
        format!(
            r#"{{
                "patterns": [
                    {{ "name": "Code", "pattern": "48 8B 05 ? ? ? ? C3"{} }}
                ],
                "offsets": [
                    {{ "name": "Code" }},
                    {{
                        "name": "Field",
                        "operation": {{
                            "type": "binary_operator",
                            "operator": "Add",
                            "target": {{ "type": "constant", "value": "B0" }},
                            "value": {{ "type": "constant", "value": "C" }}
                        }}
                    }},
                    {{
                        "name": "Indirect",
                        "operation": {{
                            "type": "operator",
                            "operator": "Lea",
                            "value": "Dword",
                            "operand": {{
                                "type": "operator",
                                "operator": "Add",
                                "value": "50",
                                "operand": {{ "type": "pattern", "name": "Code" }}
                            }}
                        }}
                    }}
                ]
            }}"#,
            cached
        )
    }

    fn resolver(
        version: &str,
        store: MemoryDocumentStore,
    ) -> (OffsetResolver<Target<MockMemoryReader>, MemoryDocumentStore>, Arc<CountingAlgorithm>) {
        let counter = Arc::new(CountingAlgorithm::default());
        let config = ResolverConfig::builder()
            .custom_algorithm(counter.clone())
            .build();
        let resolver = OffsetResolver::with_config(target(version), store, config).unwrap();
        (resolver, counter)
    }

    #[test]
    fn test_outdated_build_is_recomputed() {
        let store = MemoryDocumentStore::with_bytes(document(Some(("0.0.0", "999"))));
        let (resolver, counter) = resolver("1.0.0", store);

        let address = resolver.get_address("Code").unwrap();

        assert_eq!(address, BASE + 0x30);
        assert_eq!(counter.calls(), 1);
        assert_eq!(resolver.store().save_count(), 1);

        let cached = resolver.document().pattern("Code").unwrap().cached.clone();
        assert_eq!(cached, Some(CachedElement::new("1.0.0", 0x30)));

        let saved = OffsetDocument::from_bytes(&resolver.store().bytes()).unwrap();
        assert_eq!(saved.pattern("Code").unwrap().cached, cached);
        assert!(!resolver.document().is_dirty());
    }

    #[test]
    fn test_current_build_skips_search() {
        let store = MemoryDocumentStore::with_bytes(document(Some(("1.0.0", "30"))));
        let (resolver, counter) = resolver("1.0.0", store);

        assert_eq!(resolver.get_address("Code").unwrap(), BASE + 0x30);
        assert_eq!(counter.calls(), 0);
        assert_eq!(resolver.store().save_count(), 0);
    }

    #[test]
    fn test_recomputed_value_is_reused_after_reset() {
        let store = MemoryDocumentStore::with_bytes(document(Some(("0.0.0", "999"))));
        let (resolver, counter) = resolver("1.0.0", store);

        let first = resolver.get_address("Code").unwrap();
        resolver.reset();
        let second = resolver.get_address("Code").unwrap();

        assert_eq!(first, second);
        assert_eq!(counter.calls(), 1);
        assert_eq!(resolver.store().save_count(), 1);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let store = MemoryDocumentStore::with_bytes(document(None));
        let (resolver, counter) = resolver("1.0.0", store);

        let first = resolver.get_address("Code").unwrap();
        let second = resolver.get_address("Code").unwrap();

        assert_eq!(first, second);
        assert!(counter.calls() <= 1);
    }

    #[test]
    fn test_binary_add_of_constants() {
        let store = MemoryDocumentStore::with_bytes(document(None));
        let (resolver, counter) = resolver("1.0.0", store);

        assert_eq!(resolver.get_address("Field").unwrap(), 0xBC);
        assert_eq!(counter.calls(), 0);
        assert_eq!(resolver.store().save_count(), 0);
    }

    #[test]
    fn test_lea_reads_live_memory() {
        let store = MemoryDocumentStore::with_bytes(document(None));
        let (resolver, _) = resolver("1.0.0", store);

        // Code at +0x30, plus 0x50 is +0x80, which holds 0x2000
        assert_eq!(resolver.get_address("Indirect").unwrap(), 0x2000);
        assert!(resolver.document().pattern("Code").unwrap().cached.is_some());
    }

    #[test]
    fn test_unknown_name_fails() {
        let store = MemoryDocumentStore::with_bytes(document(None));
        let (resolver, _) = resolver("1.0.0", store);

        let result = resolver.get_address("Missing");

        assert!(matches!(result, Err(Error::UnresolvedOffsetName(name)) if name == "Missing"));
    }

    #[test]
    fn test_can_resolve() {
        let store = MemoryDocumentStore::with_bytes(document(None));
        let (resolver, _) = resolver("1.0.0", store);

        assert!(resolver.can_resolve("Field"));
        assert!(!resolver.can_resolve("Missing"));
    }

    #[test]
    fn test_can_resolve_cached_name_after_definition_removed() {
        let store = MemoryDocumentStore::with_bytes(document(None));
        let (resolver, _) = resolver("1.0.0", store);
        resolver.get_address("Field").unwrap();

        resolver
            .edit_document(|document| Ok(document.remove_offset("Field")))
            .unwrap();

        assert!(resolver.document().offset("Field").is_none());
        assert!(resolver.can_resolve("Field"));
        assert_eq!(resolver.get_address("Field").unwrap(), 0xBC);
    }

    #[test]
    fn test_external_edit_triggers_reload() {
        let store = MemoryDocumentStore::with_bytes(document(None));
        let (resolver, _) = resolver("1.0.0", store);
        assert!(!resolver.can_resolve("Late"));

        resolver
            .store()
            .edit(r#"{ "offsets": [ { "name": "Late", "operation": { "type": "constant", "value": "ABC" } } ] }"#);

        assert_eq!(resolver.get_address("Late").unwrap(), 0xABC);
        assert!(resolver.document().offset("Code").is_none());
    }

    #[test]
    fn test_invalid_external_edit_is_reported() {
        let store = MemoryDocumentStore::with_bytes(document(None));
        let (resolver, _) = resolver("1.0.0", store);

        resolver.store().edit("{ broken");

        assert!(matches!(resolver.get_address("Field"), Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_missing_pattern_fails() {
        let store = MemoryDocumentStore::with_bytes(
            r#"{ "offsets": [ { "name": "Ghost" } ] }"#,
        );
        let (resolver, _) = resolver("1.0.0", store);

        let result = resolver.get_address("Ghost");

        assert!(matches!(result, Err(Error::UnresolvedPatternName(name)) if name == "Ghost"));
    }

    #[test]
    fn test_pattern_not_in_memory_fails() {
        let store = MemoryDocumentStore::with_bytes(
            r#"{ "patterns": [ { "name": "Absent", "pattern": "DE AD BE EF" } ], "offsets": [ { "name": "Absent" } ] }"#,
        );
        let (resolver, _) = resolver("1.0.0", store);

        assert!(matches!(resolver.get_address("Absent"), Err(Error::NoMatch)));
        assert_eq!(resolver.store().save_count(), 0);
        assert!(resolver.document().pattern("Absent").unwrap().cached.is_none());
        assert!(!resolver.document().is_dirty());
    }

    #[test]
    fn test_failed_evaluation_keeps_cache_write_unsaved() {
        let store = MemoryDocumentStore::with_bytes(
            r#"{
                "patterns": [ { "name": "Code", "pattern": "48 8B 05" } ],
                "offsets": [ {
                    "name": "Broken",
                    "operation": {
                        "type": "binary_operator",
                        "operator": "Add",
                        "target": { "type": "pattern", "name": "Code" },
                        "value": { "type": "constant", "value": "not hex" }
                    }
                } ]
            }"#,
        );
        let (resolver, _) = resolver("1.0.0", store);

        assert!(matches!(resolver.get_address("Broken"), Err(Error::MalformedOperand(_))));
        assert_eq!(resolver.store().save_count(), 0);
        assert!(resolver.document().is_dirty());
        assert!(!resolver.can_resolve("Code"));
    }

    #[test]
    fn test_empty_store_resolves_nothing() {
        let (resolver, _) = resolver("1.0.0", MemoryDocumentStore::new());

        assert!(!resolver.can_resolve("Anything"));
        assert!(resolver.document().patterns().is_empty());
    }

    #[test]
    fn test_edit_document_saves_and_reloads() {
        let (resolver, _) = resolver("1.0.0", MemoryDocumentStore::new());

        resolver
            .edit_document(|document| {
                document.add_offset(OffsetDefinition::new(
                    "Fixed",
                    AddressExpression::constant("1234"),
                ))
            })
            .unwrap();

        assert_eq!(resolver.store().save_count(), 1);
        assert_eq!(resolver.get_address("Fixed").unwrap(), 0x1234);
    }

    #[test]
    fn test_rejected_edit_is_rolled_back() {
        let store = MemoryDocumentStore::with_bytes(document(None));
        let (resolver, _) = resolver("1.0.0", store);

        let result = resolver.edit_document(|document| {
            document.set_operation(1, None)?;
            document.replace_offset(1, OffsetDefinition::new("Code", AddressExpression::constant("30")))
        });

        assert!(matches!(result, Err(Error::InvalidDocument(_))));
        assert!(!resolver.document().is_dirty());
        assert_eq!(resolver.document().offsets()[1].name, "Field");
        assert!(resolver.document().offsets()[1].operation.is_some());

        // the next resolution must not persist the rejected edit
        assert_eq!(resolver.get_address("Code").unwrap(), BASE + 0x30);
        let saved = OffsetDocument::from_bytes(&resolver.store().bytes()).unwrap();
        assert_eq!(saved.offsets().len(), 3);
        assert!(saved.offset("Field").is_some());
    }

    #[test]
    fn test_invalid_edit_fails_validation_without_saving() {
        let (resolver, _) = resolver("1.0.0", MemoryDocumentStore::new());

        let result = resolver.edit_document(|document| {
            document.add_offset(OffsetDefinition::new(
                "Empty",
                AddressExpression::unary("", None, AddressExpression::constant("1")),
            ))
        });

        assert!(matches!(result, Err(Error::InvalidDocument(_))));
        assert!(resolver.document().offsets().is_empty());
        assert_eq!(resolver.store().save_count(), 0);
        assert!(!resolver.can_resolve("Empty"));
    }

    #[test]
    fn test_reload_discards_unsaved_changes() {
        let store = MemoryDocumentStore::with_bytes(
            r#"{
                "patterns": [ { "name": "Code", "pattern": "48 8B 05" } ],
                "offsets": [ {
                    "name": "Broken",
                    "operation": {
                        "type": "binary_operator",
                        "operator": "Add",
                        "target": { "type": "pattern", "name": "Code" },
                        "value": { "type": "constant", "value": "not hex" }
                    }
                } ]
            }"#,
        );
        let (resolver, _) = resolver("1.0.0", store);
        assert!(resolver.get_address("Broken").is_err());
        assert!(resolver.document().pattern("Code").unwrap().cached.is_some());

        resolver.reload().unwrap();

        assert!(!resolver.document().is_dirty());
        assert!(resolver.document().pattern("Code").unwrap().cached.is_none());
    }

    #[test]
    fn test_unknown_operator_fails_before_search() {
        let store = MemoryDocumentStore::with_bytes(
            r#"{
                "patterns": [ { "name": "Code", "pattern": "48 8B 05" } ],
                "offsets": [ {
                    "name": "Broken",
                    "operation": { "type": "operator", "operator": "Nope", "operand": { "type": "pattern", "name": "Code" } }
                } ]
            }"#,
        );
        let (resolver, counter) = resolver("1.0.0", store);

        assert!(matches!(resolver.get_address("Broken"), Err(Error::UnknownOperator(id)) if id == "Nope"));
        assert_eq!(counter.calls(), 0);
    }

    #[test]
    fn test_concurrent_resolution_agrees() {
        let store = MemoryDocumentStore::with_bytes(document(None));
        let (resolver, counter) = resolver("1.0.0", store);

        let results: Vec<u64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| resolver.get_address("Code").unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(|&a| a == BASE + 0x30));
        assert_eq!(counter.calls(), 1);
        assert_eq!(resolver.store().save_count(), 1);
    }
}
