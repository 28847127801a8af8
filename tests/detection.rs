use keystable::lowlevel::{detect_keypoints, gaussian_blur, scan_keypoints};
use keystable::{DetectConfig, Detector, KeystableError, PixelBuffer};

fn make_pattern(width: usize, height: usize) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        let v = ((x * 29) ^ (y * 17) ^ (x * y * 3)) & 0xFF;
        [(v / 2) as u8, 0, 0, 255]
    })
    .unwrap()
}

/// Red-channel step at column `edge_x`, green mirrors red so the descriptor
/// is flat.
fn make_step(width: usize, height: usize, edge_x: usize) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, _| {
        if x < edge_x {
            [0, 255, 0, 255]
        } else {
            [255, 0, 0, 255]
        }
    })
    .unwrap()
}

#[test]
fn infinite_threshold_yields_nothing() {
    let image = make_pattern(24, 20);
    let kps = detect_keypoints(&image, f64::INFINITY, 5, 1.0).unwrap();
    assert!(kps.is_empty());
}

#[test]
fn negative_threshold_yields_every_interior_pixel() {
    let (width, height) = (12, 9);
    let image = PixelBuffer::uniform(width, height, [10, 10, 10, 255]).unwrap();
    for size in [3usize, 5, 7] {
        let half = size / 2;
        let kps = detect_keypoints(&image, -1.0, size, 1.0).unwrap();
        assert_eq!(kps.len(), (width - 2 * half) * (height - 2 * half));
        assert!(kps
            .iter()
            .all(|k| k.x >= half && k.x < width - half && k.y >= half && k.y < height - half));
    }
}

#[test]
fn uniform_image_has_no_keypoints_at_zero_threshold() {
    let image = PixelBuffer::uniform(16, 16, [200, 3, 90, 255]).unwrap();
    assert!(detect_keypoints(&image, 0.0, 5, 1.0).unwrap().is_empty());
}

#[test]
fn scan_is_row_major() {
    let image = make_pattern(20, 14);
    let blurred = gaussian_blur(&image, 3, 1.0).unwrap();
    let kps: Vec<_> = scan_keypoints(&blurred, 50.0, 3).unwrap().collect();
    assert!(!kps.is_empty());
    for pair in kps.windows(2) {
        assert!((pair[0].y, pair[0].x) < (pair[1].y, pair[1].x));
    }
}

#[test]
fn detection_matches_scan_of_blurred_buffer() {
    let image = make_pattern(18, 15);
    let blurred = gaussian_blur(&image, 5, 1.0).unwrap();
    let scanned: Vec<_> = scan_keypoints(&blurred, 120.0, 5).unwrap().collect();
    let detected = detect_keypoints(&image, 120.0, 5, 1.0).unwrap();
    assert_eq!(scanned, detected);
}

#[test]
fn threshold_is_strict() {
    // sigma 0.2 leaves a 0/255 image untouched, so the step column has an
    // exact Sobel magnitude of 4 * 255.
    let image = make_step(10, 8, 5);
    let at = detect_keypoints(&image, 1020.0, 3, 0.2).unwrap();
    assert!(at.is_empty());
    let below = detect_keypoints(&image, 1019.9, 3, 0.2).unwrap();
    assert_eq!(below.len(), 2 * 6);
    assert!(below.iter().all(|k| k.x == 4 || k.x == 5));
    assert!(below.iter().all(|k| k.descriptor_mean == 85.0));
    assert!(below.iter().all(|k| k.gradient_orientation == 0.0));
}

#[test]
fn tiny_images_produce_no_keypoints() {
    let image = make_pattern(4, 4);
    assert!(detect_keypoints(&image, -1.0, 5, 1.0).unwrap().is_empty());
    let one_px = PixelBuffer::uniform(1, 1, [9, 9, 9, 255]).unwrap();
    assert!(detect_keypoints(&one_px, -1.0, 1, 1.0).unwrap().is_empty());
}

#[test]
fn single_scale_detector_uses_config() {
    let image = make_step(12, 10, 6);
    let detector = Detector::new(DetectConfig {
        gradient_threshold: 1000.0,
        size: 3,
        sigma: 0.2,
        parallel: false,
    });
    let kps = detector.detect(&image).unwrap();
    assert_eq!(kps.len(), 2 * 8);
}

#[test]
fn invalid_size_is_reported() {
    let image = make_pattern(10, 10);
    let err = detect_keypoints(&image, 10.0, 4, 1.0).unwrap_err();
    assert_eq!(
        err,
        KeystableError::InvalidParameter {
            name: "size",
            reason: "must be odd",
        }
    );
}
