//! Cache-aware `<picture>` rendering
//!
//! A render never fails. Cache problems degrade to uncached rendering,
//! rendition problems drop the affected candidates, and an unresolvable
//! image or a tag that produced nothing renders as an empty string.

use crate::cache::{derive_cache_key, MarkupCache, MokaMarkupCache};
use crate::config::PictureConfig;
use crate::directive::{DirectiveParser, PictureRequest};
use crate::error::{CacheError, DirectiveError, PictureResult};
use crate::markup::assemble;
use crate::plan::RenditionPlan;
use crate::resolve::FormatResolver;
use picture_rendition::{ImageCatalog, RenditionService, SourceImage};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Renders compiled picture requests against a rendition service
#[derive(Clone)]
pub struct PictureRenderer {
    service: Arc<dyn RenditionService>,
    cache: Option<Arc<dyn MarkupCache>>,
    config: PictureConfig,
    parser: DirectiveParser,
}

impl fmt::Debug for PictureRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PictureRenderer")
            .field("config", &self.config)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl PictureRenderer {
    /// Create uncached renderer with default configuration
    #[must_use]
    pub fn new(service: Arc<dyn RenditionService>) -> Self {
        Self {
            service,
            cache: None,
            config: PictureConfig::default(),
            parser: DirectiveParser::new(),
        }
    }

    /// Create renderer with an in-process moka cache sized by `config`
    #[must_use]
    pub fn from_config(service: Arc<dyn RenditionService>, config: PictureConfig) -> Self {
        let renderer = Self::new(service).with_config(config);
        match MokaMarkupCache::from_config(&renderer.config.cache) {
            Some(cache) => renderer.with_cache(Arc::new(cache)),
            None => renderer,
        }
    }

    /// Create renderer from a TOML config file
    ///
    /// # Errors
    /// [`crate::PictureError::Config`] if the file cannot be read, parsed or
    /// validated.
    pub fn load(service: Arc<dyn RenditionService>, path: impl AsRef<Path>) -> PictureResult<Self> {
        let config = PictureConfig::load(path)?;
        tracing::debug!(strategy = ?config.strategy, "loaded picture config");
        Ok(Self::from_config(service, config))
    }

    /// With configuration (also sets the parser's default formats)
    #[must_use]
    pub fn with_config(mut self, config: PictureConfig) -> Self {
        self.parser = DirectiveParser::from_config(&config);
        self.config = config;
        self
    }

    /// With markup cache backend
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn MarkupCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PictureConfig {
        &self.config
    }

    /// Parser configured with this renderer's default formats
    #[inline]
    #[must_use]
    pub fn parser(&self) -> &DirectiveParser {
        &self.parser
    }

    /// Parse tag arguments, resolve the image through `catalog` and render
    ///
    /// # Errors
    /// [`DirectiveError::MissingImage`] when `tokens` is empty.
    pub fn render_tag<S: AsRef<str>>(
        &self,
        tokens: &[S],
        catalog: &dyn ImageCatalog,
    ) -> Result<String, DirectiveError> {
        let request = self.parser.parse(tokens)?;
        let image = catalog.resolve(request.image_expr());
        Ok(self.render(&request, image.as_ref()))
    }

    /// Render `request` for `image`
    ///
    /// `None` (the image expression resolved to nothing) renders as empty.
    #[must_use]
    pub fn render(&self, request: &PictureRequest, image: Option<&SourceImage>) -> String {
        let span = tracing::info_span!("render_picture", image = %request.image_expr());
        let _guard = span.enter();

        let Some(image) = image else {
            tracing::debug!("image expression resolved to nothing");
            return String::new();
        };

        let Some(cache) = self.cache.as_deref() else {
            return self.compute(request, image);
        };

        let key = derive_cache_key(self.service.as_ref(), image, request.filter_specs());
        match cache.get(key.as_str()) {
            Ok(Some(markup)) => {
                tracing::debug!(%key, "markup cache hit");
                return markup;
            }
            Ok(None) => {}
            Err(CacheError::Unavailable(reason)) => {
                tracing::warn!(%reason, "markup cache unavailable, rendering uncached");
                return self.compute(request, image);
            }
            Err(e) => tracing::warn!(%key, error = %e, "markup cache lookup failed"),
        }

        let markup = self.compute(request, image);
        if markup.is_empty() {
            return markup;
        }
        if let Err(e) = cache.set(key.as_str(), markup.clone()) {
            tracing::warn!(%key, error = %e, "markup cache write failed");
        }
        markup
    }

    fn compute(&self, request: &PictureRequest, image: &SourceImage) -> String {
        let resolver = FormatResolver::new(self.service.as_ref(), self.config.avif_name_budget);
        let plan = RenditionPlan::build(&resolver, image, request);
        if plan.is_empty() {
            tracing::debug!("no renditions produced");
            return String::new();
        }
        assemble(&plan, request, image, self.config.strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picture_rendition::{InMemoryCatalog, SimulatedRenditionService};

    fn image() -> SourceImage {
        SourceImage::new(1, "mock", "mock_img.jpg", "hash", 100, 100)
    }

    #[test]
    fn unresolved_image_renders_empty() {
        let renderer = PictureRenderer::new(Arc::new(SimulatedRenditionService::new()));
        let markup = renderer
            .render_tag(&["missing", "width-10"], &InMemoryCatalog::new())
            .unwrap();
        assert_eq!(markup, "");
    }

    #[test]
    fn empty_tag_is_rejected() {
        let renderer = PictureRenderer::new(Arc::new(SimulatedRenditionService::new()));
        let empty: [&str; 0] = [];
        assert_eq!(
            renderer.render_tag(&empty, &InMemoryCatalog::new()),
            Err(DirectiveError::MissingImage)
        );
    }

    #[test]
    fn empty_output_is_not_cached() {
        let cache = Arc::new(MokaMarkupCache::default());
        let renderer = PictureRenderer::new(Arc::new(SimulatedRenditionService::new()))
            .with_cache(cache.clone());
        let request = renderer.parser().parse(&["img", "bogus"]).unwrap();
        assert_eq!(renderer.render(&request, Some(&image())), "");
        assert_eq!(cache.entry_count(), 0);
    }

    #[test]
    fn disabled_cache_config_renders_uncached() {
        let mut config = PictureConfig::default();
        config.cache.enabled = false;
        let renderer =
            PictureRenderer::from_config(Arc::new(SimulatedRenditionService::new()), config);
        assert!(renderer.cache.is_none());
    }
}
