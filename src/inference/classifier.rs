//! ONNX identity classifier.

use crate::config::ClassifierConfig;
use crate::error::{Error, Result};
use crate::inference::Classifier;
use crate::inference::onnx::OnnxModel;
use crate::pipeline::NormalizedImage;
use std::path::Path;
use tracing::info;

/// Identity classifier backed by an ONNX model with a `[1, 3, S, S]` input.
pub struct OnnxClassifier {
    model: OnnxModel,
    side: u32,
}

impl OnnxClassifier {
    /// Load the classifier described by `config`.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let model = OnnxModel::load(&config.path, &config.input_name, &config.output_name)?;
        info!(
            "Loaded classifier: {}, input {}x{}, {} resize",
            config.path.display(),
            config.side,
            config.side,
            config.resize
        );
        Ok(Self {
            model,
            side: config.side,
        })
    }

    /// Model file path.
    pub fn path(&self) -> &Path {
        self.model.path()
    }

    /// Number of scores the model produces, found by running a blank input.
    pub fn output_len(&self) -> Result<usize> {
        self.classify(&NormalizedImage::zeros(self.side))
            .map(|scores| scores.len())
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, image: &NormalizedImage) -> Result<Vec<f32>> {
        if image.side() != self.side {
            return Err(Error::ClassificationFailure {
                reason: format!(
                    "input is {}x{} but model expects {}x{}",
                    image.side(),
                    image.side(),
                    self.side,
                    self.side
                ),
            });
        }

        let output = self
            .model
            .run(image.shape(), image.as_slice().to_vec())
            .map_err(|reason| Error::ClassificationFailure { reason })?;

        Ok(first_row(&output.shape, output.data))
    }
}

/// Scores of the first batch entry of a `[batch, n]` (or `[n]`) output.
fn first_row(shape: &[i64], mut data: Vec<f32>) -> Vec<f32> {
    let batch = match shape {
        [batch, _, ..] => usize::try_from(*batch).unwrap_or(1).max(1),
        _ => 1,
    };
    let row_len = data.len() / batch;
    data.truncate(row_len);
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row_of_batch() {
        assert_eq!(first_row(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), vec![1.0, 2.0, 3.0]);
        assert_eq!(first_row(&[1, 2], vec![0.5, 0.5]), vec![0.5, 0.5]);
    }

    #[test]
    fn test_first_row_flat_output() {
        assert_eq!(first_row(&[3], vec![1.0, 2.0, 3.0]), vec![1.0, 2.0, 3.0]);
    }
}
