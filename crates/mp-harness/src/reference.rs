use mp_model::{InferenceModel, LayerIr, LoweredGraph};
use mp_tensor::{CpuBackend, DType, Shape, Tensor};

use crate::artifact::CompiledArtifact;
use crate::compiler::Compiler;
use crate::error::{HarnessError, Result};
use crate::runtime::{Invoker, Runtime, DEFAULT_ENTRY_POINT};

/// Magic bytes at the start of a reference graph artifact.
const REFERENCE_MAGIC: &[u8; 4] = b"MPRG";

const TAG_AFFINE: u8 = 1;
const TAG_RELU: u8 = 2;
const TAG_SOFTMAX: u8 = 3;

const DTYPE_F32: u8 = 0;
const DTYPE_F16: u8 = 1;

pub const REFERENCE_BACKEND: &str = "reference";

/// The reference compiler: serializes a model's lowered graph, weights
/// included, into a self-contained artifact.
///
/// Layout: magic, u32 layer count, then one record per layer. An affine
/// record carries its weight and bias tensors (dtype tag, u32 rank, u32
/// dims, little-endian element data); relu and softmax records are a bare
/// tag. With f32 weights the artifact is a lossless capture, so replaying
/// it on the baseline `CpuBackend` compares equal with zero deviation.
/// The `half_precision` variant rounds weights to f16 on write, modeling a
/// backend that quantizes at compile time.
#[derive(Debug)]
pub struct ReferenceCompiler {
    weight_dtype: DType,
}

impl ReferenceCompiler {
    /// Compiler that stores weights as f32, bit-exact.
    pub fn new() -> Self {
        ReferenceCompiler {
            weight_dtype: DType::F32,
        }
    }

    /// Compiler that rounds weights to f16 at compile time.
    pub fn half_precision() -> Self {
        ReferenceCompiler {
            weight_dtype: DType::F16,
        }
    }

    fn encode_tensor(&self, out: &mut Vec<u8>, t: &Tensor) {
        match self.weight_dtype {
            DType::F32 => out.push(DTYPE_F32),
            DType::F16 => out.push(DTYPE_F16),
        }
        let dims = t.shape().dims();
        out.extend_from_slice(&(dims.len() as u32).to_le_bytes());
        for d in dims {
            out.extend_from_slice(&(*d as u32).to_le_bytes());
        }
        match self.weight_dtype {
            DType::F32 => out.extend_from_slice(&t.to_le_bytes()),
            DType::F16 => out.extend_from_slice(&t.to_f16_le_bytes()),
        }
    }
}

impl Default for ReferenceCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler for ReferenceCompiler {
    fn name(&self) -> &str {
        REFERENCE_BACKEND
    }

    fn compile(&self, model: &dyn InferenceModel) -> Result<CompiledArtifact> {
        let graph = model.lower().ok_or_else(|| {
            HarnessError::Compilation(format!(
                "model '{}' does not support lowering",
                model.name()
            ))
        })?;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(REFERENCE_MAGIC);
        bytes.extend_from_slice(&(graph.layers().len() as u32).to_le_bytes());
        for layer in graph.layers() {
            match layer {
                LayerIr::Affine { weight, bias } => {
                    bytes.push(TAG_AFFINE);
                    self.encode_tensor(&mut bytes, weight);
                    self.encode_tensor(&mut bytes, bias);
                }
                LayerIr::Relu => bytes.push(TAG_RELU),
                LayerIr::Softmax => bytes.push(TAG_SOFTMAX),
            }
        }
        Ok(CompiledArtifact::new(REFERENCE_BACKEND, bytes))
    }
}

/// Byte cursor over an artifact, failing with `HarnessError::Load` on
/// truncation.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|e| *e <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(HarnessError::Load(format!(
                "truncated reference graph: need {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.bytes.len() - self.pos
            ))),
        }
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}

fn decode_tensor(r: &mut Reader<'_>) -> Result<Tensor> {
    let dtype = r.u8()?;
    let ndim = r.u32()? as usize;
    let mut dims = Vec::with_capacity(ndim);
    for _ in 0..ndim {
        dims.push(r.u32()? as usize);
    }
    let shape = Shape::new(dims);
    match dtype {
        DTYPE_F32 => {
            let data = r.take(shape.numel() * 4)?;
            Tensor::from_le_bytes(data, shape).map_err(|e| HarnessError::Load(e.to_string()))
        }
        DTYPE_F16 => {
            let data = r.take(shape.numel() * 2)?;
            Tensor::from_f16_le_bytes(data, shape).map_err(|e| HarnessError::Load(e.to_string()))
        }
        other => Err(HarnessError::Load(format!(
            "unknown tensor dtype tag {}",
            other
        ))),
    }
}

/// The reference runtime: deserializes a compiled graph and executes it on
/// the trusted `CpuBackend`.
#[derive(Debug, Default)]
pub struct ReferenceRuntime;

impl ReferenceRuntime {
    pub fn new() -> Self {
        ReferenceRuntime
    }
}

impl Runtime for ReferenceRuntime {
    fn name(&self) -> &str {
        REFERENCE_BACKEND
    }

    fn load(&self, artifact: &CompiledArtifact) -> Result<Invoker> {
        let mut r = Reader::new(artifact.bytes());
        if r.take(4)? != REFERENCE_MAGIC {
            return Err(HarnessError::Load(
                "not a reference graph artifact (bad magic)".to_string(),
            ));
        }

        let n_layers = r.u32()? as usize;
        let mut layers = Vec::with_capacity(n_layers);
        for _ in 0..n_layers {
            let layer = match r.u8()? {
                TAG_AFFINE => {
                    let weight = decode_tensor(&mut r)?;
                    let bias = decode_tensor(&mut r)?;
                    LayerIr::Affine { weight, bias }
                }
                TAG_RELU => LayerIr::Relu,
                TAG_SOFTMAX => LayerIr::Softmax,
                other => {
                    return Err(HarnessError::Load(format!(
                        "unknown layer tag {}",
                        other
                    )))
                }
            };
            layers.push(layer);
        }
        if r.remaining() != 0 {
            return Err(HarnessError::Load(format!(
                "{} trailing bytes after reference graph",
                r.remaining()
            )));
        }

        let graph = LoweredGraph::new(layers);
        let mut invoker = Invoker::new(REFERENCE_BACKEND);
        invoker.register(
            DEFAULT_ENTRY_POINT,
            Box::new(move |input| {
                graph
                    .execute(input, &CpuBackend::new())
                    .map_err(|e| HarnessError::Execution(e.to_string()))
            }),
        );
        Ok(invoker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use mp_model::{LinearClassifier, Mlp, TensorSignature};

    #[test]
    fn test_compile_and_load_round_trip() {
        let model = Mlp::seeded("tiny-mlp", 4, 6, 3, 11);
        let artifact = ReferenceCompiler::new().compile(&model).unwrap();
        assert_eq!(artifact.backend_name(), REFERENCE_BACKEND);

        let invoker = ReferenceRuntime::new().load(&artifact).unwrap();
        assert!(invoker.has_entry_point(DEFAULT_ENTRY_POINT));

        let input = Tensor::new(vec![0.1, 0.2, 0.3, 0.4], Shape::new(vec![1, 4]));
        let direct = model.infer(&input, &CpuBackend::new()).unwrap();
        let replayed = invoker.invoke(DEFAULT_ENTRY_POINT, &input).unwrap();
        assert_eq!(replayed.data_f32(), direct.data_f32());
        assert_eq!(replayed.shape().dims(), &[1, 3]);
    }

    #[test]
    fn test_half_precision_weights_drift_slightly() {
        let model = LinearClassifier::seeded("quantized", 8, 4, 5);
        let artifact = ReferenceCompiler::half_precision().compile(&model).unwrap();
        let invoker = ReferenceRuntime::new().load(&artifact).unwrap();

        let input = Tensor::new(
            vec![0.5, -0.3, 0.7, 0.2, -0.9, 0.1, 0.4, -0.6],
            Shape::new(vec![1, 8]),
        );
        let direct = model.infer(&input, &CpuBackend::new()).unwrap();
        let replayed = invoker.invoke(DEFAULT_ENTRY_POINT, &input).unwrap();
        for (r, d) in replayed.data_f32().iter().zip(direct.data_f32()) {
            assert_abs_diff_eq!(r, d, epsilon = 1e-2);
        }
    }

    #[test]
    fn test_compile_rejects_non_lowerable_model() {
        #[derive(Debug)]
        struct Opaque {
            sig: TensorSignature,
        }

        impl InferenceModel for Opaque {
            fn name(&self) -> &str {
                "opaque"
            }
            fn input_signature(&self) -> &TensorSignature {
                &self.sig
            }
            fn output_signature(&self) -> &TensorSignature {
                &self.sig
            }
            fn infer(
                &self,
                input: &Tensor,
                _backend: &dyn mp_tensor::ComputeBackend,
            ) -> mp_model::Result<Tensor> {
                Ok(input.clone())
            }
        }

        let model = Opaque {
            sig: TensorSignature::f32(vec![1, 2]),
        };
        let err = ReferenceCompiler::new().compile(&model).unwrap_err();
        assert!(matches!(err, HarnessError::Compilation(_)));
    }

    #[test]
    fn test_load_bad_magic() {
        let artifact = CompiledArtifact::new(REFERENCE_BACKEND, b"JUNKJUNK".to_vec());
        assert!(matches!(
            ReferenceRuntime::new().load(&artifact),
            Err(HarnessError::Load(_))
        ));
    }

    #[test]
    fn test_load_truncated_graph() {
        let model = LinearClassifier::seeded("tiny", 2, 2, 0);
        let artifact = ReferenceCompiler::new().compile(&model).unwrap();
        let truncated =
            CompiledArtifact::new(REFERENCE_BACKEND, artifact.bytes()[..12].to_vec());
        assert!(matches!(
            ReferenceRuntime::new().load(&truncated),
            Err(HarnessError::Load(_))
        ));
    }

    #[test]
    fn test_load_unknown_layer_tag() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(REFERENCE_MAGIC);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.push(99);
        let artifact = CompiledArtifact::new(REFERENCE_BACKEND, bytes);
        let err = ReferenceRuntime::new().load(&artifact).unwrap_err();
        assert!(matches!(err, HarnessError::Load(_)));
    }

    #[test]
    fn test_load_rejects_trailing_bytes() {
        let model = LinearClassifier::seeded("tiny", 2, 2, 0);
        let artifact = ReferenceCompiler::new().compile(&model).unwrap();
        let mut bytes = artifact.bytes().to_vec();
        bytes.push(0);
        let padded = CompiledArtifact::new(REFERENCE_BACKEND, bytes);
        assert!(matches!(
            ReferenceRuntime::new().load(&padded),
            Err(HarnessError::Load(_))
        ));
    }
}
