use anyhow::{ensure, Result};
use candle_core::{DType, Tensor};

/// Sentence-transformers pooling: mean over unmasked tokens, then L2 normalise.
///
/// `hidden` is `[B, T, H]`, `attention_mask` is `[B, T]` of 0/1 in any dtype.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, seq_len, hidden_dim) = hidden.dims3()?;
    ensure!(attention_mask.dims() == [batch, seq_len], "mask shape {:?} does not match hidden {:?}", attention_mask.dims(), hidden.dims());

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let summed = hidden.broadcast_mul(&mask.unsqueeze(2)?)?.sum(1)?;
    // All-padding rows would divide by zero; clamp the token count to 1.
    let counts = mask.sum_keepdim(1)?.maximum(1f64)?;
    let mean = summed.broadcast_div(&counts)?;

    let eps = match hidden.dtype() { DType::F16 | DType::BF16 => 1e-6, _ => 1e-12 };
    let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?.affine(1.0, eps)?;
    let out = mean.broadcast_div(&norm)?;
    ensure!(out.dims() == [batch, hidden_dim], "pooled shape {:?}", out.dims());
    Ok(out)
}
