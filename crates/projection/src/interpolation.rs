//! Interpolation over row-major 2-D node arrays.

/// Bilinear interpolation.
///
/// Interpolates between the four nodes surrounding `(x, y)`. At integer
/// coordinates and on the last row/column this degenerates to a direct
/// node lookup. Callers clamp `(x, y)` to `[0, width-1] x [0, height-1]`;
/// out-of-range input yields NaN.
pub fn bilinear_interpolate(data: &[f64], width: usize, height: usize, x: f64, y: f64) -> f64 {
    if width == 0 || height == 0 || !(x >= 0.0) || !(y >= 0.0) {
        return f64::NAN;
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    if x0 >= width || y0 >= height {
        return f64::NAN;
    }
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let xf = x - x0 as f64;
    let yf = y - y0 as f64;

    let v00 = data[y0 * width + x0];
    if xf == 0.0 && yf == 0.0 {
        return v00;
    }
    let v10 = data[y0 * width + x1];
    let v01 = data[y1 * width + x0];
    let v11 = data[y1 * width + x1];

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    top * (1.0 - yf) + bottom * yf
}
