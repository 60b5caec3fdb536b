//! Color compositing helpers for the cell canvas.

/// Source-over compositing of `src` at `src_alpha` onto `dst` at `dst_alpha`.
///
/// Colors are unpremultiplied channels in `[0, 1]`. Returns the resulting
/// color and alpha.
pub fn blend_over(
    src: [f32; 3],
    src_alpha: f32,
    dst: [f32; 3],
    dst_alpha: f32,
) -> ([f32; 3], f32) {
    let sa = src_alpha.clamp(0.0, 1.0);
    let da = dst_alpha.clamp(0.0, 1.0);
    let out_alpha = sa + da * (1.0 - sa);
    if out_alpha <= f32::EPSILON {
        return ([0.0; 3], 0.0);
    }
    let out = std::array::from_fn(|i| (src[i] * sa + dst[i] * da * (1.0 - sa)) / out_alpha);
    (out, out_alpha)
}

/// Brightest channel of a color, used to tell faded-out cells apart.
pub fn peak(color: [f32; 3]) -> f32 {
    color[0].max(color[1]).max(color[2])
}
