use ndarray::Axis;
use ort::{session::Session, value::Tensor};
use serde::{Deserialize, Serialize};

use crate::{
    error::BlendError,
    types::{EncodedPosition, PolicyDistribution},
};

/// A learned model mapping an encoded position to a distribution over
/// the 4096 move indices.
///
/// Implementations must not depend on anything but the tensor they are
/// given. Any failure, including malformed output, is reported as
/// [`BlendError::PolicyUnavailable`].
pub trait PolicyScorer {
    fn score(&mut self, encoded: &EncodedPosition) -> Result<PolicyDistribution, BlendError>;
}

impl<P: PolicyScorer + ?Sized> PolicyScorer for Box<P> {
    fn score(&mut self, encoded: &EncodedPosition) -> Result<PolicyDistribution, BlendError> {
        (**self).score(encoded)
    }
}

/// Pure-Rust inference backend handed to ONNX Runtime's alternative API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Tract,
    Candle,
}

impl Backend {
    /// Installs the backend process-wide. Must run before the first
    /// session is built.
    ///
    /// Returns `false` when a backend was already installed; that one
    /// stays active.
    pub fn install(self) -> bool {
        let installed = match self {
            Backend::Tract => ort::set_api(ort_tract::api()),
            Backend::Candle => ort::set_api(ort_candle::api()),
        };
        if installed {
            log::debug!("onnx backend: {self:?}");
        } else {
            log::warn!("onnx backend already installed, {self:?} ignored");
        }
        installed
    }
}

pub const DEFAULT_INPUT_NAME: &str = "input";
pub const DEFAULT_OUTPUT_NAME: &str = "output";

/// Policy scorer backed by an ONNX export of the `[1, 8, 8, 12]` to
/// softmax(4096) network.
pub struct OnnxPolicy {
    session: Session,
    input_name: String,
    output_name: String,
}

impl OnnxPolicy {
    /// Initialize from a local `.onnx` file path
    pub fn from_file(path: &str) -> Result<Self, BlendError> {
        let session = Session::builder()?.commit_from_file(path)?;

        Ok(Self::with_session(session))
    }

    /// Initialize from raw bytes
    pub fn from_memory(model_bytes: &[u8]) -> Result<Self, BlendError> {
        let session = Session::builder()?.commit_from_memory(model_bytes)?;

        Ok(Self::with_session(session))
    }

    fn with_session(session: Session) -> Self {
        Self {
            session,
            input_name: DEFAULT_INPUT_NAME.to_string(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }

    /// Override the graph's input and output tensor names.
    pub fn with_io_names(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.input_name = input.into();
        self.output_name = output.into();
        self
    }

    fn run(&mut self, encoded: &EncodedPosition) -> Result<Vec<f32>, BlendError> {
        // Batch of one: [1, 8, 8, 12]
        let batch = encoded.clone().insert_axis(Axis(0));
        let outputs = self.session.run(ort::inputs! {
            self.input_name.as_str() => Tensor::from_array(batch)?,
        })?;

        let probs = outputs[self.output_name.as_str()].try_extract_array::<f32>()?;
        Ok(probs.iter().copied().collect())
    }
}

impl PolicyScorer for OnnxPolicy {
    fn score(&mut self, encoded: &EncodedPosition) -> Result<PolicyDistribution, BlendError> {
        let probs = self.run(encoded).map_err(|e| match e {
            BlendError::OrtError(err) => BlendError::PolicyUnavailable(err.to_string()),
            other => other,
        })?;
        log::debug!("policy scorer returned {} values", probs.len());
        PolicyDistribution::new(probs)
    }
}
