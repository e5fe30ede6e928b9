use mp_model::TensorSignature;
use mp_tensor::{Shape, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Per-channel normalization constants for ImageNet-style RGB inputs.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Generate one input sample matching a model's f32 input signature, with
/// values drawn uniformly from [-1, 1) by a seeded RNG.
///
/// The same seed always produces the same sample. Generate the sample once
/// per test case and pass the same `&Tensor` to both the baseline and the
/// candidate; a comparison is only meaningful over bit-identical input.
pub fn random_input(signature: &TensorSignature, seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = signature.shape().numel();
    let data: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
    Tensor::new(data, signature.shape().clone())
}

/// Generate a [1, 3, 224, 224] f32 sample resembling a preprocessed image:
/// uniform pixels in [0, 1) normalized per channel with the ImageNet
/// mean and standard deviation.
pub fn imagenet_input(seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    let hw = 224 * 224;
    let mut data = Vec::with_capacity(3 * hw);
    for c in 0..3 {
        for _ in 0..hw {
            let pixel: f32 = rng.gen_range(0.0f32..1.0);
            data.push((pixel - IMAGENET_MEAN[c]) / IMAGENET_STD[c]);
        }
    }
    Tensor::new(data, Shape::new(vec![1, 3, 224, 224]))
}
