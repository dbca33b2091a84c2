/// Weighted octave sum: octave `i` samples at frequency `2^i` with weight `1/2^i`,
/// and the total is divided by the summed weights. Zero octaves yield 0.
pub fn fractal<F>(x: f64, y: f64, z: f64, octaves: u32, noise: F) -> f64
where
    F: Fn(f64, f64, f64) -> f64,
{
    if octaves == 0 {
        return 0.0;
    }
    let mut total_weight = 0.0;
    let mut freq = 1.0;
    let mut sum = 0.0;
    for _ in 0..octaves {
        sum += noise(x * freq, y * freq, z * freq) / freq;
        total_weight += 1.0 / freq;
        freq *= 2.0;
    }
    sum / total_weight
}
