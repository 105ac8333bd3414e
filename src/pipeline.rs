use crate::{
    assets::decode::SourceFile,
    detect::{DetectionConfig, detect_opening},
    foundation::{
        core::{PixelBuffer, Progress, Rectangle},
        error::FramefitError,
    },
    render::CompositeBackend,
};

/// Stable identifier assigned to a product photo when it is ingested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct ProductId(pub u64);

/// An uploaded product photo with its decoded pixels.
#[derive(Clone, Debug)]
pub struct ProductItem {
    pub id: ProductId,
    pub source: SourceFile,
    pub pixels: PixelBuffer,
}

/// One finished composite.
#[derive(Clone, Debug)]
pub struct CompositeResult {
    /// Frame-sized output pixels.
    pub pixels: PixelBuffer,
    /// `"<index + 1>.png"`, by position in the batch.
    pub name: String,
    /// Name of the product photo this was made from.
    pub source_name: String,
}

/// A product that could not be composited. The rest of the batch still runs.
#[derive(Debug)]
pub struct ItemFailure {
    pub index: usize,
    pub source_name: String,
    pub error: FramefitError,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successful composites in input order.
    pub results: Vec<CompositeResult>,
    /// Skipped items in input order.
    pub failures: Vec<ItemFailure>,
    /// Opening used for every item, `None` when the batch did not run.
    pub opening: Option<Rectangle>,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.failures.is_empty()
    }
}

/// Callbacks fired while a batch runs. Everything is invoked synchronously, in input order.
pub trait BatchObserver {
    /// Called once per item, after the item finished (successfully or not).
    fn on_progress(&mut self, _progress: Progress) {}

    /// Called for each successful composite, before its progress event.
    fn on_item_ready(&mut self, _result: &CompositeResult) {}
}

impl<F: FnMut(Progress)> BatchObserver for F {
    fn on_progress(&mut self, progress: Progress) {
        self(progress)
    }
}

/// Ignores every event.
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

pub fn result_name(index: usize) -> String {
    format!("{}.png", index + 1)
}

/// Composite every product into `frame`.
///
/// Returns an empty outcome without detecting anything when `frame` is `None` or `products` is
/// empty. Otherwise the opening is detected once (unless `opening` is given) and items are
/// processed strictly in order. A failing item is recorded in [`BatchOutcome::failures`] and
/// skipped; its position-based name is not reused.
#[tracing::instrument(skip_all, fields(products = products.len()))]
pub fn run_batch(
    frame: Option<&PixelBuffer>,
    products: &[ProductItem],
    opening: Option<Rectangle>,
    detection: &DetectionConfig,
    backend: &mut dyn CompositeBackend,
    observer: &mut dyn BatchObserver,
) -> BatchOutcome {
    let Some(frame) = frame else {
        tracing::debug!("no frame selected, nothing to do");
        return BatchOutcome::default();
    };
    if products.is_empty() {
        tracing::debug!("no products pending, nothing to do");
        return BatchOutcome::default();
    }

    let opening = opening.unwrap_or_else(|| detect_opening(frame, detection));
    let total = products.len();
    let mut outcome = BatchOutcome {
        results: Vec::with_capacity(total),
        failures: Vec::new(),
        opening: Some(opening),
    };

    for (index, item) in products.iter().enumerate() {
        match backend.compose(frame, &item.pixels, opening) {
            Ok(pixels) => {
                let result = CompositeResult {
                    pixels,
                    name: result_name(index),
                    source_name: item.source.name.clone(),
                };
                observer.on_item_ready(&result);
                outcome.results.push(result);
            }
            Err(error) => {
                tracing::warn!(index, source = %item.source.name, %error, "skipping product");
                outcome.failures.push(ItemFailure {
                    index,
                    source_name: item.source.name.clone(),
                    error,
                });
            }
        }
        observer.on_progress(Progress::new(index + 1, total));
    }

    tracing::info!(
        produced = outcome.results.len(),
        skipped = outcome.failures.len(),
        "batch finished"
    );
    outcome
}
