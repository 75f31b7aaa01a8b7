//! Admin collection filter tests
//!
//! The admin screens filter fetched collections in memory: case-insensitive
//! substring search across named fields, exact-match status/role filters,
//! and date-range filters.

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use pestcheck_client::filter::{by_role, by_status, in_date_range, matches_search, search};
use shared::{DateRange, Detection, DetectionStatus, Role, Severity, User};

fn user(username: &str, email: Option<&str>, role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.map(str::to_string),
        role,
        is_verified: true,
        created_at: Utc::now(),
    }
}

fn detection(pest: &str, crop: &str, status: DetectionStatus, day: u32) -> Detection {
    Detection {
        id: Uuid::new_v4(),
        pest_name: pest.to_string(),
        crop_type: crop.to_string(),
        severity: Severity::Medium,
        confidence: 0.8,
        latitude: Decimal::from(14),
        longitude: Decimal::from(121),
        address: None,
        status,
        farm_id: None,
        detected_at: Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap(),
    }
}

// ============================================================================
// Substring search
// ============================================================================

#[test]
fn search_is_case_insensitive_substring_match() {
    let users = vec![
        user("somchai", Some("somchai@farm.th"), Role::Farmer),
        user("malee", None, Role::Expert),
    ];

    assert_eq!(search(&users, "SOM").len(), 1);
    assert_eq!(search(&users, "farm.th").len(), 1);
    assert_eq!(search(&users, "lee").len(), 1);
    assert_eq!(search(&users, "nobody").len(), 0);
}

#[test]
fn empty_query_matches_everything() {
    let users = vec![user("a_user", None, Role::Farmer)];
    assert_eq!(search(&users, "").len(), 1);
    assert_eq!(search(&users, "   ").len(), 1);
}

#[test]
fn detection_search_covers_pest_and_crop() {
    let detections = vec![
        detection("Brown Planthopper", "rice", DetectionStatus::Pending, 1),
        detection("Fall Armyworm", "corn", DetectionStatus::Verified, 2),
    ];
    assert_eq!(search(&detections, "planthopper").len(), 1);
    assert_eq!(search(&detections, "corn").len(), 1);
}

// ============================================================================
// Exact-match and date-range filters
// ============================================================================

#[test]
fn status_filter_is_exact_match() {
    let detections = vec![
        detection("Brown Planthopper", "rice", DetectionStatus::Pending, 1),
        detection("Fall Armyworm", "corn", DetectionStatus::Verified, 2),
        detection("Rice Stem Borer", "rice", DetectionStatus::Pending, 3),
    ];
    let pending = by_status(&detections, DetectionStatus::Pending, |d| d.status);
    assert_eq!(pending.len(), 2);
    assert!(by_status(&detections, DetectionStatus::Rejected, |d| d.status).is_empty());
}

#[test]
fn role_filter_is_exact_match() {
    let users = vec![
        user("somchai", None, Role::Farmer),
        user("admin1", None, Role::Admin),
        user("root", None, Role::SuperAdmin),
    ];
    // super_admin does not match an exact admin filter
    let admins = by_role(&users, Role::Admin);
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].username, "admin1");
}

#[test]
fn date_range_is_inclusive_on_both_ends() {
    let detections = vec![
        detection("A", "rice", DetectionStatus::Pending, 1),
        detection("B", "rice", DetectionStatus::Pending, 10),
        detection("C", "rice", DetectionStatus::Pending, 20),
    ];
    let range = DateRange {
        start: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
    };
    let hits = in_date_range(&detections, &range, |d| d.detected_at);
    assert_eq!(hits.len(), 2);
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Any prefix of a user's username matches that user.
    #[test]
    fn any_prefix_of_a_field_matches(username in "[a-z]{4,12}", len in 1usize..4) {
        let item = user(&username, None, Role::Farmer);
        let needle = &username[..len];
        prop_assert!(matches_search(&item, needle));
    }

    /// A query containing a character absent from every field never matches.
    #[test]
    fn foreign_query_never_matches(username in "[a-z]{4,12}") {
        let item = user(&username, None, Role::Farmer);
        prop_assert!(!matches_search(&item, "7"));
    }
}
