use chrono::NaiveDate;

use crate::workflows::job_fairs::domain::{
    normalize_district, parse_fair_date, parse_qr_image_name, qr_image_name, qr_image_url,
    qr_payload, JobFairId, ValidationError, DISTRICT_MAX_LEN,
};

#[test]
fn parses_iso_and_us_dates() {
    let expected = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid");
    assert_eq!(parse_fair_date("2024-05-01"), Ok(expected));
    assert_eq!(parse_fair_date(" 05/01/2024 "), Ok(expected));
    assert_eq!(parse_fair_date("05/01/24"), Ok(expected));
}

#[test]
fn year_width_must_match_the_format() {
    for raw in ["24-05-01", "05/01/024", "05/01/4", "0024-05-01x"] {
        assert_eq!(
            parse_fair_date(raw),
            Err(ValidationError::InvalidDate {
                value: raw.to_string()
            }),
            "{raw}"
        );
    }
    assert_eq!(
        parse_fair_date("05/01/99"),
        Ok(NaiveDate::from_ymd_opt(1999, 5, 1).expect("valid"))
    );
}

#[test]
fn rejects_impossible_and_missing_dates() {
    assert_eq!(parse_fair_date("   "), Err(ValidationError::MissingDate));
    assert_eq!(
        parse_fair_date("2024-02-30"),
        Err(ValidationError::InvalidDate {
            value: "2024-02-30".to_string()
        })
    );
    assert!(matches!(
        parse_fair_date("next tuesday"),
        Err(ValidationError::InvalidDate { .. })
    ));
}

#[test]
fn district_is_trimmed_and_bounded() {
    assert_eq!(normalize_district("  Springfield "), Ok("Springfield".to_string()));
    assert_eq!(normalize_district(" \t"), Err(ValidationError::EmptyDistrict));

    let at_limit = "d".repeat(DISTRICT_MAX_LEN);
    assert!(normalize_district(&at_limit).is_ok());
    assert_eq!(
        normalize_district(&format!("{at_limit}x")),
        Err(ValidationError::DistrictTooLong {
            max: DISTRICT_MAX_LEN
        })
    );
}

#[test]
fn payload_embeds_identifier_and_link() {
    assert_eq!(
        qr_payload(JobFairId(1), "https://example.org"),
        "Job Fair ID: 1, Link: https://example.org"
    );
}

#[test]
fn image_names_follow_convention() {
    let id = JobFairId(42);
    assert_eq!(qr_image_name(id), "qr_42.png");
    assert_eq!(qr_image_url(id), "/qr_codes/qr_42.png");
    assert_eq!(parse_qr_image_name("qr_42.png"), Some(id));
    assert_eq!(parse_qr_image_name("qr_0.png"), None);
    assert_eq!(parse_qr_image_name("qr_42.jpg"), None);
    assert_eq!(parse_qr_image_name("../qr_42.png"), None);
}

#[test]
fn image_names_have_a_single_spelling_per_id() {
    for name in ["qr_+1.png", "qr_01.png", "qr_-1.png", "qr_.png", "qr_1 .png"] {
        assert_eq!(parse_qr_image_name(name), None, "{name}");
    }
}
