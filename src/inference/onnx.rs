//! Shared ONNX Runtime session handling.

use crate::error::{Error, Result};
use ort::session::Session;
use ort::value::Tensor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Output of one model run: tensor shape and flattened values.
#[derive(Debug)]
pub struct ModelOutput {
    pub shape: Vec<i64>,
    pub data: Vec<f32>,
}

/// A loaded model with a single float input and a single float output.
pub struct OnnxModel {
    session: Mutex<Session>,
    path: PathBuf,
    input_name: String,
    output_name: String,
}

impl OnnxModel {
    /// Load the model at `path`.
    pub fn load(path: &Path, input_name: &str, output_name: &str) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ModelFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = std::fs::read(path)?;
        let session = Session::builder()
            .and_then(|mut builder| builder.commit_from_memory(&bytes))
            .map_err(|e| Error::ModelLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        debug!(
            "Loaded ONNX model {} ({} bytes, input '{}', output '{}')",
            path.display(),
            bytes.len(),
            input_name,
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            path: path.to_path_buf(),
            input_name: input_name.to_string(),
            output_name: output_name.to_string(),
        })
    }

    /// Model file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the model on an NCHW tensor.
    ///
    /// Errors are returned as text so the caller can wrap them in the
    /// failure kind of its stage.
    pub fn run(&self, shape: [usize; 4], data: Vec<f32>) -> std::result::Result<ModelOutput, String> {
        let input = Tensor::from_array((shape, data.into_boxed_slice()))
            .map_err(|e| e.to_string())?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| "session lock poisoned".to_string())?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| e.to_string())?;

        let value = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| format!("model has no output named '{}'", self.output_name))?;

        let (out_shape, values) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| e.to_string())?;

        Ok(ModelOutput {
            shape: out_shape.iter().copied().collect(),
            data: values.to_vec(),
        })
    }
}
