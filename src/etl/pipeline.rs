//! Pipeline orchestration for ETL operations

use super::{Extractor, Loader, Transformer};
use eyre::Result;

/// ETL Pipeline that orchestrates Extract, Transform, and Load operations
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (must transform from E::Item)
/// - `L`: Loader type (must load T::Output)
///
/// Unlike a plain copy job, the loader always runs: an extraction that
/// yields nothing still produces (empty) output, so every window leaves
/// its artifacts behind.
///
/// # Example
/// ```no_run
/// use log_harvester::etl::Pipeline;
/// # use log_harvester::etl::{Extractor, Transformer, Loader};
/// # use eyre::Result;
/// # struct MyExtractor;
/// # impl Extractor for MyExtractor {
/// #     type Item = i32;
/// #     async fn extract(&self) -> Result<Vec<Self::Item>> { Ok(vec![]) }
/// # }
/// # struct MyTransformer;
/// # impl Transformer for MyTransformer {
/// #     type Input = i32;
/// #     type Output = i32;
/// #     fn transform(&self, input: Self::Input) -> Result<Self::Output> { Ok(input) }
/// # }
/// # struct MyLoader;
/// # impl Loader for MyLoader {
/// #     type Item = i32;
/// #     async fn load(&self, items: Vec<Self::Item>) -> Result<usize> { Ok(items.len()) }
/// # }
///
/// # async fn example() -> Result<()> {
/// let pipeline = Pipeline::new(MyExtractor, MyTransformer, MyLoader);
///
/// let count = pipeline.run().await?;
/// println!("Processed {} items", count);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
        }
    }

    /// Run the complete ETL pipeline
    ///
    /// Returns the number of items the loader reports as written
    ///
    /// # Errors
    /// Returns an error if any stage fails
    pub async fn run(&self) -> Result<usize> {
        log::debug!("Extracting from source...");
        let items = self.extractor.extract().await?;
        log::info!("Extracted {} items", items.len());

        if items.is_empty() {
            log::warn!("No items extracted, writing empty output");
        }

        log::debug!("Transforming items...");
        let transformed = self.transformer.transform_many(items)?;
        log::debug!("Transformed {} items", transformed.len());

        log::debug!("Loading to destination...");
        let count = self.loader.load(transformed).await?;
        log::info!("Loaded {} items", count);

        Ok(count)
    }
}
