//! Model Artifacts - persisted form of the classifier
//!
//! Topology + weight manifest + base64 little-endian f32 data, guarded by
//! a SHA-256 checksum of the raw weight bytes. Kernel is stored before bias.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::features::layout::{layout_hash, validate_layout, FEATURE_VERSION};

use super::logreg::LogisticModel;
use super::{ModelError, INPUT_DIM};

pub const MODEL_KIND: &str = "logistic_regression";

const KERNEL_NAME: &str = "dense/kernel";
const BIAS_NAME: &str = "dense/bias";
const DTYPE_F32: &str = "float32";

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTopology {
    pub kind: String,
    pub input_dim: usize,
    pub units: usize,
    pub activation: String,
    pub use_bias: bool,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub model_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSpec {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: String,
}

impl WeightSpec {
    /// `None` if the stored shape overflows
    fn element_count(&self) -> Option<usize> {
        self.shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifacts {
    pub topology: ModelTopology,
    pub weight_specs: Vec<WeightSpec>,
    /// Base64 of little-endian f32s in `weight_specs` order
    pub weight_data: String,
    /// Hex SHA-256 of the decoded weight bytes
    pub checksum: String,
}

fn checksum_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

// ============================================================================
// SERIALIZE
// ============================================================================

impl LogisticModel {
    pub fn to_artifacts(&self) -> ModelArtifacts {
        let dim = self.input_dim();
        let mut bytes = Vec::with_capacity((dim + 1) * 4);
        for w in self.weights().iter() {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        bytes.extend_from_slice(&self.bias().to_le_bytes());

        ModelArtifacts {
            topology: ModelTopology {
                kind: MODEL_KIND.to_string(),
                input_dim: dim,
                units: 1,
                activation: "sigmoid".to_string(),
                use_bias: true,
                feature_version: FEATURE_VERSION,
                layout_hash: layout_hash(),
                model_id: self.model_id().to_string(),
            },
            weight_specs: vec![
                WeightSpec {
                    name: KERNEL_NAME.to_string(),
                    shape: vec![dim, 1],
                    dtype: DTYPE_F32.to_string(),
                },
                WeightSpec {
                    name: BIAS_NAME.to_string(),
                    shape: vec![1],
                    dtype: DTYPE_F32.to_string(),
                },
            ],
            checksum: checksum_hex(&bytes),
            weight_data: BASE64.encode(&bytes),
        }
    }

    /// Strict load: any mismatch is an error
    pub fn try_from_artifacts(artifacts: &ModelArtifacts) -> Result<Self, ModelError> {
        let topology = &artifacts.topology;
        validate_layout(topology.feature_version, topology.layout_hash)?;

        if topology.input_dim != INPUT_DIM {
            return Err(ModelError::DimensionMismatch {
                expected: INPUT_DIM,
                actual: topology.input_dim,
            });
        }
        if topology.kind != MODEL_KIND || topology.units != 1 || !topology.use_bias {
            return Err(ModelError::MalformedWeights(format!(
                "unsupported topology: {} with {} unit(s)",
                topology.kind, topology.units
            )));
        }

        let bytes = BASE64.decode(artifacts.weight_data.as_bytes())?;
        let actual = checksum_hex(&bytes);
        if !actual.eq_ignore_ascii_case(&artifacts.checksum) {
            return Err(ModelError::ChecksumMismatch {
                expected: artifacts.checksum.clone(),
                actual,
            });
        }

        if bytes.len() % 4 != 0 {
            return Err(ModelError::MalformedWeights(format!(
                "{} bytes is not a whole number of f32 values",
                bytes.len()
            )));
        }
        let values: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        let mut offset = 0usize;
        let mut kernel: Option<Vec<f32>> = None;
        let mut bias: Option<f32> = None;
        for spec in &artifacts.weight_specs {
            if spec.dtype != DTYPE_F32 {
                return Err(ModelError::MalformedWeights(format!("unsupported dtype {}", spec.dtype)));
            }
            let count = spec
                .element_count()
                .ok_or_else(|| ModelError::MalformedWeights(format!("shape of {} overflows", spec.name)))?;
            let end = offset
                .checked_add(count)
                .ok_or_else(|| ModelError::MalformedWeights(format!("shape of {} overflows", spec.name)))?;
            let slice = values.get(offset..end).ok_or_else(|| {
                ModelError::MalformedWeights(format!("weight data too short for {}", spec.name))
            })?;
            offset = end;

            match spec.name.as_str() {
                KERNEL_NAME => {
                    let rows = spec.shape.first().copied().unwrap_or(0);
                    if rows != INPUT_DIM {
                        return Err(ModelError::DimensionMismatch {
                            expected: INPUT_DIM,
                            actual: rows,
                        });
                    }
                    if spec.shape != [INPUT_DIM, 1] {
                        return Err(ModelError::MalformedWeights(format!(
                            "kernel shape {:?}, expected [{}, 1]",
                            spec.shape, INPUT_DIM
                        )));
                    }
                    kernel = Some(slice.to_vec());
                }
                BIAS_NAME => {
                    if spec.shape != [1] {
                        return Err(ModelError::MalformedWeights(format!(
                            "bias shape {:?}, expected [1]",
                            spec.shape
                        )));
                    }
                    bias = slice.first().copied();
                }
                other => {
                    return Err(ModelError::MalformedWeights(format!("unknown weight {}", other)));
                }
            }
        }
        if offset != values.len() {
            return Err(ModelError::MalformedWeights(format!(
                "{} trailing weight values",
                values.len() - offset
            )));
        }

        match (kernel, bias) {
            (Some(kernel), Some(bias)) => Ok(Self::from_parts(kernel, bias, topology.model_id.clone())),
            _ => Err(ModelError::MalformedWeights("missing kernel or bias".to_string())),
        }
    }
}

/// Lenient load used at session start.
///
/// Returns the stored model and `true`, or a fresh model and `false` when
/// nothing usable is stored.
pub fn load_or_fresh(artifacts: Option<&ModelArtifacts>) -> (LogisticModel, bool) {
    match artifacts.map(LogisticModel::try_from_artifacts) {
        Some(Ok(model)) => {
            log::info!("Loaded stored model {}", model.model_id());
            (model, true)
        }
        Some(Err(e)) => {
            log::warn!("Stored model rejected, starting fresh: {}", e);
            (LogisticModel::new(INPUT_DIM), false)
        }
        None => (LogisticModel::new(INPUT_DIM), false),
    }
}
