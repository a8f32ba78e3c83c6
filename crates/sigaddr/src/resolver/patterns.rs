use std::cell::RefCell;

use tracing::{debug, warn};

use crate::cache::CachedElement;
use crate::document::OffsetDocument;
use crate::error::{Error, Result};
use crate::expression::PatternResolver;
use crate::memory::ProcessContext;

use super::ResolverConfig;

/// Resolves pattern leaves against the document, going through each
/// pattern's build-gated cache entry.
pub(crate) struct DocumentPatterns<'a> {
    document: RefCell<&'a mut OffsetDocument>,
    context: &'a dyn ProcessContext,
    config: &'a ResolverConfig,
}

impl<'a> DocumentPatterns<'a> {
    pub(crate) fn new(
        document: &'a mut OffsetDocument,
        context: &'a dyn ProcessContext,
        config: &'a ResolverConfig,
    ) -> Self {
        Self {
            document: RefCell::new(document),
            context,
            config,
        }
    }
}

impl PatternResolver for DocumentPatterns<'_> {
    fn resolve_pattern(&self, name: &str) -> Result<u64> {
        let module = self.context.main_module();

        let (index, pattern) = {
            let document = self.document.borrow();
            let index = document
                .pattern_index(name)
                .ok_or_else(|| Error::UnresolvedPatternName(name.to_string()))?;
            let definition = &document.patterns()[index];

            match &definition.cached {
                Some(cached) => {
                    if let Some(address) = cached.address(module) {
                        debug!("Pattern '{}' cached at 0x{:X}", name, address);
                        return Ok(address);
                    }
                    warn!(
                        "Cached address of '{}' is from build '{}', searching again for '{}'",
                        name, cached.build, module.version
                    );
                }
                None => debug!("Pattern '{}' has no cached address", name),
            }

            (index, definition.parse_pattern(&self.config.pattern_format)?)
        };

        let address = self.config.engine(pattern).find_first_in_module(self.context)?;
        debug!("Pattern '{}' found at 0x{:X}", name, address);

        self.document
            .borrow_mut()
            .set_cached(index, Some(CachedElement::capture(address, module)))?;
        Ok(address)
    }
}
