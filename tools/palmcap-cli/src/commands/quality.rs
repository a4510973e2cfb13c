//! Sharpness check for still images.

use std::path::PathBuf;

use palmcap_capture_engine::AppConfig;
use palmcap_gesture_core::QualityGate;

pub fn run(
    config: &AppConfig,
    images: Vec<PathBuf>,
    threshold: Option<f64>,
    stride: Option<u32>,
) -> anyhow::Result<()> {
    let mut quality = config.capture.quality;
    if let Some(threshold) = threshold {
        quality.blur_threshold = threshold;
    }
    if let Some(stride) = stride {
        quality.sample_stride = stride;
    }
    quality.validate()?;
    let gate = QualityGate::new(quality);

    println!(
        "Blur threshold {:.1}, stride {}",
        quality.blur_threshold, quality.sample_stride
    );
    let mut blurry = 0usize;
    for path in &images {
        let image = match image::open(path) {
            Ok(image) => image,
            Err(e) => {
                println!("  {}: unreadable ({e})", path.display());
                blurry += 1;
                continue;
            }
        };
        let verdict = gate.assess(&image);
        if !verdict.acceptable {
            blurry += 1;
        }
        println!(
            "  {}: variance {:.1} over {} samples, {}",
            path.display(),
            verdict.variance,
            verdict.samples,
            if verdict.acceptable { "sharp" } else { "too blurry" }
        );
    }

    if blurry > 0 {
        anyhow::bail!("{blurry} of {} image(s) failed the blur check", images.len());
    }
    Ok(())
}
