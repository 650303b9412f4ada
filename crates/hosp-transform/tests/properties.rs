//! Property tests for the normalizer, reconciliation and delay buckets.

use polars::prelude::*;
use proptest::prelude::*;

use hosp_model::DelayBucket;
use hosp_model::columns::{DELAY_BUCKET, LOS};
use hosp_transform::{add_delay_buckets, aggregate_medications, normalize, reconcile};

fn calendar_day() -> impl Strategy<Value = (u32, u32)> {
    (1u32..29, 1u32..13)
}

/// One calendar day in one of several accepted spellings.
fn spelled_date() -> impl Strategy<Value = String> {
    (calendar_day(), 0u8..3).prop_map(|((day, month), layout)| match layout {
        0 => format!("2024-{month:02}-{day:02}"),
        1 => format!("{month:02}/{day:02}/2024"),
        _ => format!("2024{month:02}{day:02}"),
    })
}

fn date_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("not a date".to_string()),
        spelled_date(),
    ]
}

fn admission_rows() -> impl Strategy<Value = Vec<(u8, String, String)>> {
    prop::collection::vec((0u8..6, date_text(), date_text()), 0..24)
}

fn admissions(rows: &[(u8, String, String)]) -> DataFrame {
    let ids: Vec<String> = rows.iter().map(|r| format!("E{}", r.0)).collect();
    let admitted: Vec<&str> = rows.iter().map(|r| r.1.as_str()).collect();
    let discharged: Vec<&str> = rows.iter().map(|r| r.2.as_str()).collect();
    DataFrame::new(vec![
        Series::new("encounter_id".into(), ids).into(),
        Series::new("admission_date".into(), admitted).into(),
        Series::new("discharge_date".into(), discharged).into(),
        Series::new("primary_diagnosis_code".into(), vec!["D1"; rows.len()]).into(),
    ])
    .unwrap()
}

proptest! {
    #[test]
    fn normalize_is_idempotent(rows in admission_rows()) {
        let once = normalize(&admissions(&rows)).unwrap();
        let twice = normalize(&once.data).unwrap();
        prop_assert!(once.data.equals_missing(&twice.data));
        prop_assert_eq!(twice.stats.duplicates_removed, 0);
    }

    #[test]
    fn los_is_null_or_at_least_minus_one(rows in admission_rows()) {
        let normalized = normalize(&admissions(&rows)).unwrap();
        let los = normalized.data.column(LOS).unwrap().i64().unwrap();
        for value in los.into_iter().flatten() {
            prop_assert!(value >= -1);
        }
    }

    #[test]
    fn reconcile_never_drops_admissions(
        rows in admission_rows(),
        doc_ids in prop::collection::vec(0u8..8, 0..12),
        med_ids in prop::collection::vec(0u8..8, 0..12),
    ) {
        let normalized = normalize(&admissions(&rows)).unwrap();
        let diagnoses = DataFrame::new(vec![
            Series::new("diagnosis_code".into(), vec!["D1"]).into(),
        ])
        .unwrap();
        let docs = DataFrame::new(vec![
            Series::new(
                "encounter_id".into(),
                doc_ids.iter().map(|id| format!("E{id}")).collect::<Vec<_>>(),
            )
            .into(),
        ])
        .unwrap();
        let meds = DataFrame::new(vec![
            Series::new(
                "encounter_id".into(),
                med_ids.iter().map(|id| format!("E{id}")).collect::<Vec<_>>(),
            )
            .into(),
        ])
        .unwrap();

        let counts = aggregate_medications(&meds).unwrap();
        let reconciled = reconcile(&normalized.data, &diagnoses, &docs, &counts).unwrap();
        let extra: usize = reconciled.warnings.iter().map(|w| w.extra_rows).sum();
        prop_assert_eq!(reconciled.data.height(), normalized.data.height() + extra);
        prop_assert_eq!(reconciled.data.column("med_count").unwrap().null_count(), 0);
    }

    #[test]
    fn every_row_gets_a_known_bucket(hours in prop::collection::vec(
        prop_oneof![Just(None), Just(Some(f64::NAN)), (-50.0f64..20_000.0).prop_map(Some)],
        0..32,
    )) {
        let df = DataFrame::new(vec![
            Series::new("discharge_summary_delay_hours".into(), hours).into(),
        ])
        .unwrap();
        let out = add_delay_buckets(&df).unwrap();
        let buckets = out.column(DELAY_BUCKET).unwrap().str().unwrap();
        prop_assert_eq!(buckets.null_count(), 0);
        for label in buckets.into_iter().flatten() {
            prop_assert!(DelayBucket::from_label(label).is_some());
        }
    }
}
