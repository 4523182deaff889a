// src/matching/candidates.rs - Duplicate candidate grouping
use indicatif::ProgressBar;
use std::collections::HashMap;

use crate::matching::address::{is_blank, is_po_box};
use crate::matching::name::IdentityKey;
use crate::table::{RecordId, ResolvedColumns, Table};
use crate::utils::contributor_filter::EntryRecordedByFilter;
use crate::utils::logging::{DedupeLogger, Phase};

const PROGRESS_UPDATE_EVERY: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderOptions {
    /// Leave out records whose street address is a PO box.
    pub no_pobox: bool,
    /// Leave out records without a street address.
    pub require_street_address: bool,
}

impl Default for FinderOptions {
    fn default() -> Self {
        Self {
            no_pobox: false,
            require_street_address: true,
        }
    }
}

/// Records suspected to describe the same repository, in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    pub key: IdentityKey,
    pub members: Vec<RecordId>,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinderStats {
    pub records_scanned: usize,
    pub records_evaluated: usize,
    pub skipped_blank_name: usize,
    pub skipped_missing_address: usize,
    pub skipped_po_box: usize,
    pub unique_keys: usize,
    pub groups_dropped_by_filter: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateReport {
    pub sets: Vec<CandidateSet>,
    pub stats: FinderStats,
}

pub fn find_candidate_sets(
    table: &Table,
    columns: &ResolvedColumns,
    options: &FinderOptions,
) -> CandidateReport {
    find_candidate_sets_with_filter(table, columns, options, None, None)
}

/// Group records by identity key and keep groups of two or more.
///
/// Groups come out in the order their key is first met while scanning the
/// table, members in table order, so repeated runs over the same table agree.
pub fn find_candidate_sets_with_filter(
    table: &Table,
    columns: &ResolvedColumns,
    options: &FinderOptions,
    recorded_by: Option<&EntryRecordedByFilter>,
    progress: Option<&ProgressBar>,
) -> CandidateReport {
    let logger = DedupeLogger::new(Phase::Finder);
    logger.log_start(&format!(
        "grouping {} records by (name, city, state), no_pobox={}, require_street_address={}",
        table.len(),
        options.no_pobox,
        options.require_street_address
    ));

    let mut stats = FinderStats::default();
    let mut key_positions: HashMap<IdentityKey, usize> = HashMap::new();
    let mut groups: Vec<(IdentityKey, Vec<RecordId>)> = Vec::new();

    for record in table.records() {
        stats.records_scanned += 1;
        if let Some(pb) = progress {
            if stats.records_scanned % PROGRESS_UPDATE_EVERY == 0 {
                pb.set_position(stats.records_scanned as u64);
            }
        }

        let key = IdentityKey::new(
            record.get(columns.name),
            record.get(columns.city),
            record.get(columns.state),
        );
        if !key.is_usable() {
            stats.skipped_blank_name += 1;
            continue;
        }

        if let Some(address_col) = columns.street_address {
            let address = record.get(address_col);
            if options.require_street_address && is_blank(address) {
                stats.skipped_missing_address += 1;
                continue;
            }
            if options.no_pobox && is_po_box(address) {
                stats.skipped_po_box += 1;
                continue;
            }
        }

        stats.records_evaluated += 1;
        match key_positions.get(&key) {
            Some(&pos) => groups[pos].1.push(record.id()),
            None => {
                key_positions.insert(key.clone(), groups.len());
                groups.push((key, vec![record.id()]));
            }
        }
    }
    if let Some(pb) = progress {
        pb.set_position(stats.records_scanned as u64);
    }

    logger.log_filtering_results(
        stats.records_scanned,
        stats.records_evaluated,
        stats.skipped_blank_name,
        stats.skipped_missing_address,
        stats.skipped_po_box,
    );

    stats.unique_keys = groups.len();
    let mut sets = Vec::new();
    for (key, members) in groups {
        if members.len() < 2 {
            continue;
        }
        if let Some(filter) = recorded_by {
            if !filter.matches_group(table, columns, &members) {
                stats.groups_dropped_by_filter += 1;
                logger.log_debug(&format!("Skipping group '{}': no matching entry_recorded_by", key));
                continue;
            }
        }
        sets.push(CandidateSet { key, members });
    }

    logger.log_processing_complete(stats.unique_keys, sets.len(), stats.groups_dropped_by_filter);
    CandidateReport { sets, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnMap;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn column_map() -> ColumnMap {
        ColumnMap {
            name: "name".into(),
            city: "city".into(),
            state: "state".into(),
            street_address: "address".into(),
            entry_recorded_by: "entry recorded by".into(),
            updated_at: "updated".into(),
        }
    }

    fn build(rows: &[[&str; 5]]) -> (Table, ResolvedColumns) {
        let table = Table::new(
            ["name", "city", "state", "address", "entry recorded by"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows.iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        );
        let columns = column_map().resolve(&table).unwrap();
        (table, columns)
    }

    fn smith_archive() -> (Table, ResolvedColumns) {
        build(&[
            ["Smith Archive", "Akron", "OH", "123 Main St", "alice"],
            ["smith archive", "Akron", "OH", "PO Box 9", "bob"],
        ])
    }

    #[test]
    fn test_smith_archive_grouped_without_pobox_flag() {
        let (table, columns) = smith_archive();
        let report = find_candidate_sets(&table, &columns, &FinderOptions::default());
        assert_eq!(report.sets.len(), 1);
        assert_eq!(report.sets[0].members, vec![RecordId(0), RecordId(1)]);
        assert_eq!(report.sets[0].key.name, "smith archive");
    }

    #[test]
    fn test_smith_archive_po_box_excluded_with_flag() {
        let (table, columns) = smith_archive();
        let options = FinderOptions {
            no_pobox: true,
            ..FinderOptions::default()
        };
        let report = find_candidate_sets(&table, &columns, &options);
        assert!(report.sets.is_empty());
        assert_eq!(report.stats.skipped_po_box, 1);
    }

    #[test]
    fn test_po_box_duplicates_of_a_street_group_leave_the_rest_grouped() {
        let (table, columns) = build(&[
            ["Smith Archive", "Akron", "OH", "123 Main St", ""],
            ["Smith Archive", "Akron", "OH", "P.O. Box 9", ""],
            ["Smith Archive", "Akron", "OH", "125 Main St", ""],
        ]);
        let options = FinderOptions {
            no_pobox: true,
            ..FinderOptions::default()
        };
        let report = find_candidate_sets(&table, &columns, &options);
        assert_eq!(report.sets.len(), 1);
        assert_eq!(report.sets[0].members, vec![RecordId(0), RecordId(2)]);
    }

    #[test]
    fn test_groups_in_first_encountered_order() {
        let (table, columns) = build(&[
            ["Zeta Library", "Reno", "NV", "1 A St", ""],
            ["Alpha Archive", "Provo", "UT", "2 B St", ""],
            ["Lone Museum", "Provo", "UT", "3 C St", ""],
            ["alpha archive", "Provo", "UT", "4 D St", ""],
            ["ZETA LIBRARY", "Reno", "NV", "5 E St", ""],
        ]);
        let report = find_candidate_sets(&table, &columns, &FinderOptions::default());
        let members: Vec<Vec<RecordId>> = report.sets.iter().map(|s| s.members.clone()).collect();
        assert_eq!(
            members,
            vec![vec![RecordId(0), RecordId(4)], vec![RecordId(1), RecordId(3)]]
        );
        assert_eq!(report.stats.unique_keys, 3);
    }

    #[test]
    fn test_missing_address_rows_are_not_evaluated_by_default() {
        let (table, columns) = build(&[
            ["Smith Archive", "Akron", "OH", "", ""],
            ["Smith Archive", "Akron", "OH", "123 Main St", ""],
        ]);
        let report = find_candidate_sets(&table, &columns, &FinderOptions::default());
        assert!(report.sets.is_empty());
        assert_eq!(report.stats.skipped_missing_address, 1);

        let options = FinderOptions {
            require_street_address: false,
            ..FinderOptions::default()
        };
        let report = find_candidate_sets(&table, &columns, &options);
        assert_eq!(report.sets.len(), 1);
    }

    #[test]
    fn test_different_city_or_state_does_not_group() {
        let (table, columns) = build(&[
            ["Smith Archive", "Akron", "OH", "1 A St", ""],
            ["Smith Archive", "Canton", "OH", "1 A St", ""],
            ["Smith Archive", "Akron", "PA", "1 A St", ""],
        ]);
        let report = find_candidate_sets(&table, &columns, &FinderOptions::default());
        assert!(report.sets.is_empty());
    }

    #[test]
    fn test_entry_recorded_by_keeps_whole_group() {
        let (table, columns) = build(&[
            ["Smith Archive", "Akron", "OH", "1 A St", "alice"],
            ["Smith Archive", "Akron", "OH", "2 A St", "bob"],
            ["Jones Library", "Kent", "OH", "3 A St", "alice"],
            ["Jones Library", "Kent", "OH", "4 A St", "alice"],
        ]);
        let filter = EntryRecordedByFilter::new(Some("bob".into()));
        let report = find_candidate_sets_with_filter(
            &table,
            &columns,
            &FinderOptions::default(),
            Some(&filter),
            None,
        );
        assert_eq!(report.sets.len(), 1);
        assert_eq!(report.sets[0].members, vec![RecordId(0), RecordId(1)]);
        assert_eq!(report.stats.groups_dropped_by_filter, 1);
    }

    #[test]
    fn test_blank_names_never_group() {
        let (table, columns) = build(&[
            ["", "Akron", "OH", "1 A St", ""],
            ["  ", "Akron", "OH", "1 A St", ""],
        ]);
        let report = find_candidate_sets(&table, &columns, &FinderOptions::default());
        assert!(report.sets.is_empty());
        assert_eq!(report.stats.skipped_blank_name, 2);
    }

    fn arb_rows() -> impl Strategy<Value = Vec<[String; 5]>> {
        let name = prop::sample::select(vec!["Smith Archive", "smith archive.", "Jones Library", "Lee's Museum", ""]);
        let city = prop::sample::select(vec!["Akron", "AKRON", "Kent"]);
        let state = prop::sample::select(vec!["OH", "oh", "PA"]);
        let address = prop::sample::select(vec!["1 Main St", "PO Box 4", "", "Box 9"]);
        let person = prop::sample::select(vec!["alice", "bob", ""]);
        prop::collection::vec(
            (name, city, state, address, person).prop_map(|(n, c, s, a, p)| {
                [n.to_string(), c.to_string(), s.to_string(), a.to_string(), p.to_string()]
            }),
            0..40,
        )
    }

    fn table_from(rows: &[[String; 5]]) -> (Table, ResolvedColumns) {
        let table = Table::new(
            ["name", "city", "state", "address", "entry recorded by"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows.iter().map(|r| r.to_vec()).collect(),
        );
        let columns = column_map().resolve(&table).unwrap();
        (table, columns)
    }

    proptest! {
        #[test]
        fn prop_grouping_is_idempotent(rows in arb_rows(), no_pobox in any::<bool>()) {
            let (table, columns) = table_from(&rows);
            let options = FinderOptions { no_pobox, require_street_address: true };
            let first = find_candidate_sets(&table, &columns, &options);
            let second = find_candidate_sets(&table, &columns, &options);
            prop_assert_eq!(first.sets, second.sets);
        }

        #[test]
        fn prop_sets_share_keys_and_never_overlap(rows in arb_rows(), no_pobox in any::<bool>()) {
            let (table, columns) = table_from(&rows);
            let options = FinderOptions { no_pobox, require_street_address: false };
            let report = find_candidate_sets(&table, &columns, &options);

            let key_of = |id: RecordId| {
                let r = table.get(id).unwrap();
                IdentityKey::new(r.get(columns.name), r.get(columns.city), r.get(columns.state))
            };
            let mut seen_keys = HashSet::new();
            let mut seen_members = HashSet::new();
            for set in &report.sets {
                prop_assert!(set.len() >= 2);
                for id in &set.members {
                    prop_assert_eq!(&key_of(*id), &set.key);
                    prop_assert!(seen_members.insert(*id));
                }
                prop_assert!(seen_keys.insert(set.key.clone()));
            }
        }
    }
}
