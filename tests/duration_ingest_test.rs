// ==========================================
// DF-14 ingestion integration tests
// ==========================================

mod test_helpers;

use training_ingest::domain::{
    GroupStatistics, DURATION_CRITICAL_MESSAGE, DURATION_OK_MESSAGE, DURATION_PARTIAL_SUFFIX,
};
use training_ingest::importer::{TrainingImporter, TrainingImporterImpl};
use training_ingest::logging;
use training_ingest::repository::GroupRepository;
use test_helpers::{
    count, create_test_db, duration_row, duration_upload, open, roster_row, roster_upload, with,
};

/// Row state after ingesting both files in the given order.
async fn state_after(db_path: &str, roster_first: bool) -> (GroupStatistics, (i64, i64)) {
    let importer = TrainingImporterImpl::new(db_path.to_string());
    let roster = roster_upload(&[roster_row()]);
    let report = duration_upload(&[duration_row()]);

    if roster_first {
        importer.ingest_roster(roster).await.unwrap();
        importer.ingest_duration_report(report).await.unwrap();
    } else {
        importer.ingest_duration_report(report).await.unwrap();
        importer.ingest_roster(roster).await.unwrap();
    }

    let repo = GroupRepository::open(db_path).unwrap();
    let stats = repo.find_group_statistics(1000123).unwrap().unwrap();
    let program = repo.find_program(221101, 2).unwrap().unwrap();
    (stats, (program.lecture_hours, program.practical_hours))
}

#[tokio::test]
async fn test_hours_and_status_counts_after_roster() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = TrainingImporterImpl::new(db_path.clone());
    importer.ingest_roster(roster_upload(&[roster_row()])).await.unwrap();

    let summary = importer
        .ingest_duration_report(duration_upload(&[duration_row()]))
        .await
        .unwrap();

    assert_eq!(summary.programs_updated, 1);
    assert_eq!(summary.statistics_updated, 1);
    assert!(summary.errors.is_empty(), "errors: {:?}", summary.errors);
    assert_eq!(summary.message, DURATION_OK_MESSAGE);

    let repo = GroupRepository::open(&db_path).unwrap();
    let program = repo.find_program(221101, 2).unwrap().unwrap();
    assert_eq!((program.lecture_hours, program.practical_hours), (880, 440));

    let stats = repo.find_group_statistics(1000123).unwrap().unwrap();
    assert_eq!(stats.status.capacity, Some(30));
    assert_eq!(stats.status.in_training, Some(25));
    assert_eq!(stats.status.cancelled, None);
    // roster columns untouched
    assert_eq!(stats.enrollment.total_count, Some(30));
}

#[tokio::test]
async fn test_unknown_program_is_skipped_not_failed() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = TrainingImporterImpl::new(db_path.clone());

    let summary = importer
        .ingest_duration_report(duration_upload(&[duration_row()]))
        .await
        .unwrap();

    assert_eq!(summary.programs_updated, 0);
    assert!(summary.errors.is_empty());
    assert_eq!(summary.message, DURATION_OK_MESSAGE);
    assert_eq!(count(&db_path, "training_program"), 0);
    // hours wait for the roster to create the program
    assert_eq!(count(&db_path, "pending_program_duration"), 1);
    // statistics may precede their group
    assert_eq!(summary.statistics_updated, 1);
    assert_eq!(count(&db_path, "group_statistics"), 1);
}

#[tokio::test]
async fn test_file_order_does_not_change_row_state() {
    logging::init_test();
    let (_tmp_a, db_a) = create_test_db().unwrap();
    let (_tmp_b, db_b) = create_test_db().unwrap();

    let roster_then_report = state_after(&db_a, true).await;
    let report_then_roster = state_after(&db_b, false).await;

    assert_eq!(roster_then_report, report_then_roster);
    assert_eq!(report_then_roster.0.enrollment.male_count, Some(18));
    assert_eq!(report_then_roster.0.status.capacity, Some(30));
    assert_eq!(report_then_roster.1, (880, 440));
    assert_eq!(count(&db_b, "pending_program_duration"), 0);
}

#[tokio::test]
async fn test_absent_hours_keep_stored_values() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    open(&db_path)
        .execute(
            "INSERT INTO training_program VALUES (221101, 2, 'ADSO', 100, 200)",
            [],
        )
        .unwrap();
    let importer = TrainingImporterImpl::new(db_path.clone());

    let lecture_only = with(duration_row(), "DURACION_ETAPA_PRODUCTIVA", "");
    let summary = importer
        .ingest_duration_report(duration_upload(&[lecture_only]))
        .await
        .unwrap();

    assert_eq!(summary.programs_updated, 1);
    let program = GroupRepository::open(&db_path)
        .unwrap()
        .find_program(221101, 2)
        .unwrap()
        .unwrap();
    assert_eq!((program.lecture_hours, program.practical_hours), (880, 200));
}

#[tokio::test]
async fn test_duplicate_program_rows_update_once() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = TrainingImporterImpl::new(db_path.clone());
    importer.ingest_roster(roster_upload(&[roster_row()])).await.unwrap();

    let rows = [
        duration_row(),
        with(duration_row(), "FICHA", "1000124"),
        // no group key -> dropped before any write
        with(duration_row(), "FICHA", ""),
    ];
    let summary = importer
        .ingest_duration_report(duration_upload(&rows))
        .await
        .unwrap();

    assert_eq!(summary.programs_updated, 1);
    assert_eq!(summary.statistics_updated, 2);
    assert_eq!(count(&db_path, "group_statistics"), 2);
}

#[tokio::test]
async fn test_unreachable_database_is_critical() {
    logging::init_test();
    let importer = TrainingImporterImpl::new("/nonexistent-dir/training/ingest.db");

    let summary = importer
        .ingest_duration_report(duration_upload(&[duration_row()]))
        .await
        .unwrap();

    assert_eq!(summary.message, DURATION_CRITICAL_MESSAGE);
    assert!(summary.errors[0].starts_with("Error general procesando DF-14"));
    assert!(!summary.message.ends_with(DURATION_PARTIAL_SUFFIX));
}

#[tokio::test]
async fn test_partial_hours_before_roster_match_roster_first() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let importer = TrainingImporterImpl::new(db_path.clone());

    let lecture_only = with(duration_row(), "DURACION_ETAPA_PRODUCTIVA", "");
    importer
        .ingest_duration_report(duration_upload(&[lecture_only]))
        .await
        .unwrap();
    importer.ingest_roster(roster_upload(&[roster_row()])).await.unwrap();

    let program = GroupRepository::open(&db_path)
        .unwrap()
        .find_program(221101, 2)
        .unwrap()
        .unwrap();
    // same as roster -> DF-14: the absent value stays at the roster's zero
    assert_eq!((program.lecture_hours, program.practical_hours), (880, 0));
}
