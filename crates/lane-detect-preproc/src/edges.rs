//! Gaussian smoothing, horizontal Sobel gradient and thresholding.
//!
//! Borders reflect without repeating the edge pixel (`gfedcb|abcdefgh|gfedcba`).

use lane_detect_core::{GrayImage, GrayImageView};

const BLUR_KSIZE: usize = 5;

#[inline]
fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let mut i = i;
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        }
        if i >= n {
            i = 2 * (n - 1) - i;
        }
    }
    i as usize
}

fn gaussian_kernel(sigma: f32) -> [f32; BLUR_KSIZE] {
    let r = (BLUR_KSIZE / 2) as isize;
    let mut k = [0.0f32; BLUR_KSIZE];
    let mut sum = 0.0f32;
    for (i, v) in k.iter_mut().enumerate() {
        let d = (i as isize - r) as f32;
        *v = (-(d * d) / (2.0 * sigma * sigma)).exp();
        sum += *v;
    }
    for v in &mut k {
        *v /= sum;
    }
    k
}

/// Separable 5x5 Gaussian blur.
pub fn gaussian_blur(src: &GrayImageView<'_>, sigma: f32) -> GrayImage {
    let (w, h) = (src.width, src.height);
    let k = gaussian_kernel(sigma);
    let r = (BLUR_KSIZE / 2) as isize;

    let mut tmp = vec![0.0f32; w * h];
    for y in 0..h {
        let row = src.row(y);
        for x in 0..w {
            let mut acc = 0.0;
            for (j, kv) in k.iter().enumerate() {
                let xx = reflect101(x as isize + j as isize - r, w);
                acc += kv * row[xx] as f32;
            }
            tmp[y * w + x] = acc;
        }
    }

    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (j, kv) in k.iter().enumerate() {
                let yy = reflect101(y as isize + j as isize - r, h);
                acc += kv * tmp[yy * w + x];
            }
            out.data[y * w + x] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Absolute 3x3 Sobel derivative along x, saturated to `u8`.
pub fn sobel_x_abs(src: &GrayImageView<'_>) -> GrayImage {
    let (w, h) = (src.width, src.height);
    let mut out = GrayImage::new(w, h);

    for y in 0..h {
        let rows = [
            src.row(reflect101(y as isize - 1, h)),
            src.row(y),
            src.row(reflect101(y as isize + 1, h)),
        ];
        for x in 0..w {
            let xl = reflect101(x as isize - 1, w);
            let xr = reflect101(x as isize + 1, w);
            let mut gx = 0i32;
            for (row, weight) in rows.iter().zip([1i32, 2, 1]) {
                gx += weight * (row[xr] as i32 - row[xl] as i32);
            }
            out.data[y * w + x] = gx.unsigned_abs().min(255) as u8;
        }
    }
    out
}

/// Pixels `>= threshold` become 255, all others 0.
pub fn threshold_binary(src: &GrayImageView<'_>, threshold: u8) -> GrayImage {
    GrayImage {
        width: src.width,
        height: src.height,
        data: src
            .data
            .iter()
            .map(|&v| if v >= threshold { 255 } else { 0 })
            .collect(),
    }
}
