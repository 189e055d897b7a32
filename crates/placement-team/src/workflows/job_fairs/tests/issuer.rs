use super::common::*;
use crate::workflows::job_fairs::issuer::{
    ErrorCorrection, IssuerError, PngQrIssuer, QrIssuer, QrRenderOptions,
};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[test]
fn default_options_match_issuance_policy() {
    let options = QrRenderOptions::default();
    assert_eq!(options.error_correction, ErrorCorrection::Low);
    assert_eq!(options.box_size, 10);
    assert_eq!(options.border, 4);
    assert_eq!(options.fill_color, [0, 0, 0]);
    assert_eq!(options.background_color, [255, 255, 255]);
}

#[test]
fn generates_png_that_decodes_to_payload() {
    let issuer = PngQrIssuer::default();
    let payload = "Job Fair ID: 1, Link: https://example.org";

    let png = issuer.generate(payload).expect("payload encodes");

    assert_eq!(&png[..8], &PNG_SIGNATURE);
    assert_eq!(decode_payload(&png), payload);
}

#[test]
fn image_size_follows_box_size_and_border() {
    let issuer = PngQrIssuer::default();
    let png = issuer.generate("Job Fair ID: 1, Link: https://example.org").expect("encodes");
    let image = image::load_from_memory(&png).expect("png decodes");

    // Payloads this short fit a version 3 symbol (29 modules) at level L.
    let side = (29 + 2 * 4) * 10;
    assert_eq!(image.width(), side);
    assert_eq!(image.height(), side);

    let rgb = image.to_rgb8();
    assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
    assert_eq!(rgb.get_pixel(40, 40).0, [0, 0, 0]);
}

#[test]
fn identical_payloads_produce_identical_bytes() {
    let issuer = PngQrIssuer::default();
    let first = issuer.generate("Job Fair ID: 3, Link: https://example.org").expect("encodes");
    let second = issuer.generate("Job Fair ID: 3, Link: https://example.org").expect("encodes");
    assert_eq!(first, second);

    let other = issuer.generate("Job Fair ID: 4, Link: https://example.org").expect("encodes");
    assert_ne!(first, other);
}

#[test]
fn higher_error_correction_still_decodes() {
    let issuer = PngQrIssuer::new(QrRenderOptions {
        error_correction: ErrorCorrection::High,
        box_size: 4,
        ..QrRenderOptions::default()
    });
    let png = issuer.generate("Job Fair ID: 9, Link: https://example.org").expect("encodes");
    assert_eq!(decode_payload(&png), "Job Fair ID: 9, Link: https://example.org");
}

#[test]
fn zero_box_size_is_rejected() {
    let issuer = PngQrIssuer::new(QrRenderOptions {
        box_size: 0,
        ..QrRenderOptions::default()
    });
    assert!(matches!(
        issuer.generate("Job Fair ID: 1"),
        Err(IssuerError::InvalidOptions(_))
    ));
}

#[test]
fn oversized_payload_reports_encode_error() {
    let issuer = PngQrIssuer::default();
    let payload = "x".repeat(8_000);
    assert!(matches!(
        issuer.generate(&payload),
        Err(IssuerError::Encode(_))
    ));
}
