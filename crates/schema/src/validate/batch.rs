//! Batch and streaming validation.
//!
//! Every item validates independently against the same immutable schema —
//! no cross-item state — so these are embarrassingly parallel maps. What
//! they must preserve exactly is index attribution: error indices reflect
//! original input order, never completion order.

use std::collections::BTreeMap;

use veld_value::{Value, ValueMap};

use super::{ValidateOptions, Validator};
use crate::error::ValidationError;
use crate::schema::Schema;

impl<'s> Validator<'s> {
    /// Validates many inputs, all-or-nothing.
    ///
    /// Returns the full list of validated outputs when every item passes,
    /// or a map from item index to that item's error list when any fails —
    /// never a partial list. Each item's error paths are additionally
    /// tagged with its index.
    pub fn validate_many(
        &self,
        inputs: &[Value],
        options: &ValidateOptions,
    ) -> Result<Vec<ValueMap>, BTreeMap<usize, Vec<ValidationError>>> {
        let mut outputs = Vec::with_capacity(inputs.len());
        let mut failures: BTreeMap<usize, Vec<ValidationError>> = BTreeMap::new();

        for (index, input) in inputs.iter().enumerate() {
            let item_options = options.clone().rooted(options.root.child(index));
            match self.validate(input, &item_options) {
                Ok(output) => outputs.push(output),
                Err(errors) => {
                    failures.insert(index, errors);
                }
            }
        }

        if failures.is_empty() {
            Ok(outputs)
        } else {
            Err(failures)
        }
    }

    /// Lazily validates a stream of inputs.
    ///
    /// Nothing is materialized up front: each item validates as it is
    /// pulled, so the source may be unbounded. Dropping the iterator
    /// abandons the remaining work (pull-based cancellation).
    pub fn validate_iter<I>(
        &self,
        inputs: I,
        options: ValidateOptions,
    ) -> impl Iterator<Item = Result<ValueMap, Vec<ValidationError>>> + use<'s, I>
    where
        I: IntoIterator<Item = Value>,
    {
        let validator = *self;
        inputs
            .into_iter()
            .map(move |input| validator.validate(&input, &options))
    }
}

impl Schema {
    /// Batch validation against this schema; see [`Validator::validate_many`].
    pub fn validate_many(
        &self,
        inputs: &[Value],
        options: &ValidateOptions,
    ) -> Result<Vec<ValueMap>, BTreeMap<usize, Vec<ValidationError>>> {
        self.validator().validate_many(inputs, options)
    }
}
