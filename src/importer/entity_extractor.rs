// ==========================================
// Training Ingest - entity projection
// ==========================================
// Stage 2: normalized rows -> per-entity record sets.
// Distinct projections keep first-appearance order so that "last write
// wins" follows file order during the upsert stage.
// ==========================================

use crate::domain::{
    CourseGroup, EnrollmentCounts, ProgramDuration, Region, SourcedRow, StatusCounts,
    TrainingCenter, TrainingProgram,
};
use crate::importer::field_mapper::{NormalizedRow, NormalizedTable};
use crate::importer::ingestion_trait::EntityExtractor;
use crate::importer::layout::{fields, FileLayout};
use std::collections::HashSet;
use std::hash::Hash;

pub struct EntityExtractorImpl;

impl EntityExtractorImpl {
    /// Projects every row, keeping the first occurrence of each key.
    fn distinct<K, T, F>(table: &NormalizedTable, project: F) -> Vec<SourcedRow<T>>
    where
        K: Eq + Hash,
        F: Fn(&NormalizedRow) -> Option<(K, T)>,
    {
        let mut seen = HashSet::new();
        table
            .rows
            .iter()
            .filter_map(|row| {
                let (key, record) = project(row)?;
                seen.insert(key)
                    .then(|| SourcedRow::new(row.row_number, record))
            })
            .collect()
    }

    /// True when the layout maps at least one of the statistic fields.
    fn carries_statistics(layout: &FileLayout) -> bool {
        layout
            .statistic_fields
            .iter()
            .any(|f| layout.has_field(f))
    }

    fn group(row: &NormalizedRow) -> Option<CourseGroup> {
        let text = |f: &str| row.text(f).map(str::to_string);

        Some(CourseGroup {
            group_code: row.int(fields::GROUP_CODE)?,
            center_code: row.int(fields::CENTER_CODE)?,
            program_code: row.int(fields::PROGRAM_CODE)?,
            version: row.int(fields::VERSION)?,
            status: text(fields::STATUS),
            level_name: text(fields::LEVEL_NAME),
            shift: text(fields::SHIFT),
            start_date: row.date(fields::START_DATE)?,
            end_date: row.date(fields::END_DATE)?,
            stage: text(fields::STAGE)?,
            modality: text(fields::MODALITY),
            responsible_person: text(fields::RESPONSIBLE_PERSON)?,
            company_name: text(fields::COMPANY_NAME),
            municipality: text(fields::MUNICIPALITY)?,
            special_program_name: text(fields::SPECIAL_PROGRAM_NAME),
            start_time: row
                .time(fields::START_TIME)
                .unwrap_or_else(FileLayout::default_time),
            end_time: row
                .time(fields::END_TIME)
                .unwrap_or_else(FileLayout::default_time),
            classroom_id: None,
        })
    }
}

impl EntityExtractor for EntityExtractorImpl {
    fn regions(&self, table: &NormalizedTable) -> Vec<SourcedRow<Region>> {
        Self::distinct(table, |row| {
            let region_code = row.int(fields::REGION_CODE)?;
            let name = row.text(fields::REGION_NAME)?.to_string();
            Some((
                (region_code, name.clone()),
                Region { region_code, name },
            ))
        })
    }

    fn centers(&self, table: &NormalizedTable) -> Vec<SourcedRow<TrainingCenter>> {
        Self::distinct(table, |row| {
            let center_code = row.int(fields::CENTER_CODE)?;
            let name = row.text(fields::CENTER_NAME)?.to_string();
            let region_code = row.int(fields::REGION_CODE)?;
            Some((
                (center_code, name.clone(), region_code),
                TrainingCenter {
                    center_code,
                    name,
                    region_code,
                },
            ))
        })
    }

    fn programs(&self, table: &NormalizedTable) -> Vec<SourcedRow<TrainingProgram>> {
        Self::distinct(table, |row| {
            let program_code = row.int(fields::PROGRAM_CODE)?;
            let version = row.int(fields::VERSION)?;
            let name = row.text(fields::PROGRAM_NAME)?.to_string();
            Some((
                (program_code, version, name.clone()),
                TrainingProgram {
                    program_code,
                    version,
                    name,
                    lecture_hours: 0,
                    practical_hours: 0,
                },
            ))
        })
    }

    fn groups(&self, table: &NormalizedTable) -> Vec<SourcedRow<CourseGroup>> {
        table
            .rows
            .iter()
            .filter_map(|row| Self::group(row).map(|g| SourcedRow::new(row.row_number, g)))
            .collect()
    }

    fn enrollment_counts(
        &self,
        table: &NormalizedTable,
        layout: &FileLayout,
    ) -> Option<Vec<SourcedRow<EnrollmentCounts>>> {
        if !Self::carries_statistics(layout) {
            return None;
        }

        let rows = table
            .rows
            .iter()
            .filter_map(|row| {
                let counts = EnrollmentCounts {
                    group_code: row.int(fields::GROUP_CODE)?,
                    male_count: row.int(fields::MALE_COUNT),
                    female_count: row.int(fields::FEMALE_COUNT),
                    nonbinary_count: row.int(fields::NONBINARY_COUNT),
                    total_count: row.int(fields::TOTAL_COUNT),
                    active_total_count: row.int(fields::ACTIVE_TOTAL_COUNT),
                };
                let any_present = [
                    counts.male_count,
                    counts.female_count,
                    counts.nonbinary_count,
                    counts.total_count,
                    counts.active_total_count,
                ]
                .iter()
                .any(Option::is_some);

                any_present.then(|| SourcedRow::new(row.row_number, counts))
            })
            .collect();

        Some(rows)
    }

    fn program_durations(&self, table: &NormalizedTable) -> Vec<SourcedRow<ProgramDuration>> {
        Self::distinct(table, |row| {
            let program_code = row.int(fields::PROGRAM_CODE)?;
            let version = row.int(fields::VERSION)?;
            let lecture_hours = row.int(fields::LECTURE_HOURS);
            let practical_hours = row.int(fields::PRACTICAL_HOURS);
            if lecture_hours.is_none() && practical_hours.is_none() {
                return None;
            }
            Some((
                (program_code, version),
                ProgramDuration {
                    program_code,
                    version,
                    lecture_hours,
                    practical_hours,
                },
            ))
        })
    }

    fn status_counts(
        &self,
        table: &NormalizedTable,
        layout: &FileLayout,
    ) -> Option<Vec<SourcedRow<StatusCounts>>> {
        if !Self::carries_statistics(layout) {
            return None;
        }

        let rows = table
            .rows
            .iter()
            .filter_map(|row| {
                let counts = StatusCounts {
                    group_code: row.int(fields::GROUP_CODE)?,
                    capacity: row.int(fields::CAPACITY),
                    in_transit: row.int(fields::IN_TRANSIT),
                    induction: row.int(fields::INDUCTION),
                    in_training: row.int(fields::IN_TRAINING),
                    conditioned: row.int(fields::CONDITIONED),
                    deferred: row.int(fields::DEFERRED),
                    voluntary_withdrawal: row.int(fields::VOLUNTARY_WITHDRAWAL),
                    virtual_cancellation: row.int(fields::VIRTUAL_CANCELLATION),
                    virtual_dropout: row.int(fields::VIRTUAL_DROPOUT),
                    cancelled: row.int(fields::CANCELLED),
                    pending_certification: row.int(fields::PENDING_CERTIFICATION),
                    certified: row.int(fields::CERTIFIED),
                    transferred: row.int(fields::TRANSFERRED),
                    other: row.int(fields::OTHER),
                };
                let any_present = layout
                    .statistic_fields
                    .iter()
                    .any(|f| row.int(f).is_some());

                any_present.then(|| SourcedRow::new(row.row_number, counts))
            })
            .collect();

        Some(rows)
    }
}
