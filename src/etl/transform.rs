//! Transformer trait for data transformation

use eyre::Result;

/// Transformer trait for transforming data items
///
/// Implementors define how a single raw item becomes an output item:
/// - Field projection (picking nested paths out of a hit)
/// - Derived fields (codes, buckets, calendar parts)
///
/// # Example
/// ```no_run
/// use log_harvester::etl::Transformer;
/// use eyre::Result;
///
/// struct MessageOnly;
///
/// impl Transformer for MessageOnly {
///     type Input = serde_json::Value;
///     type Output = String;
///
///     fn transform(&self, input: Self::Input) -> Result<Self::Output> {
///         Ok(input["_source"]["message"].as_str().unwrap_or_default().to_string())
///     }
/// }
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform a single item
    ///
    /// # Errors
    /// Returns an error if transformation fails
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;

    /// Transform multiple items (default batch implementation)
    ///
    /// Produces exactly one output per input, in input order.
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        inputs.into_iter().map(|i| self.transform(i)).collect()
    }
}
