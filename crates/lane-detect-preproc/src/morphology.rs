use lane_detect_core::{GrayImage, GrayImageView};

/// Min (erode) or max (dilate) filter over a square `kernel x kernel` window.
/// Out-of-frame pixels are ignored.
fn rank_filter(src: &GrayImageView<'_>, kernel: usize, take_max: bool) -> GrayImage {
    let (w, h) = (src.width, src.height);
    let r = kernel / 2;
    let mut out = GrayImage::new(w, h);

    for y in 0..h {
        let y0 = y.saturating_sub(r);
        let y1 = (y + r + 1).min(h);
        for x in 0..w {
            let x0 = x.saturating_sub(r);
            let x1 = (x + r + 1).min(w);
            let mut acc = if take_max { u8::MIN } else { u8::MAX };
            for yy in y0..y1 {
                for &v in &src.row(yy)[x0..x1] {
                    acc = if take_max { acc.max(v) } else { acc.min(v) };
                }
            }
            out.data[y * w + x] = acc;
        }
    }
    out
}

pub fn erode(src: &GrayImageView<'_>, kernel: usize) -> GrayImage {
    rank_filter(src, kernel, false)
}

pub fn dilate(src: &GrayImageView<'_>, kernel: usize) -> GrayImage {
    rank_filter(src, kernel, true)
}

/// Morphological opening: `iterations` erosions followed by as many dilations.
/// Removes specks smaller than the kernel.
pub fn opening(src: &GrayImageView<'_>, kernel: usize, iterations: usize) -> GrayImage {
    let mut img = GrayImage {
        width: src.width,
        height: src.height,
        data: src.data.to_vec(),
    };
    for _ in 0..iterations {
        img = erode(&img.view(), kernel);
    }
    for _ in 0..iterations {
        img = dilate(&img.view(), kernel);
    }
    img
}
