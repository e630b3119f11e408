//! Property-based tests for xref table construction and output
//!
//! Tables are built from random sets of distinct object numbers, inserted in
//! random order, then written with the classic writer and read back.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;

use pdf_xref::merge::is_fully_merged;
use pdf_xref::{ClassicTableWriter, ObjectRef, XrefTable, RECORD_WIDTH};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Free,
    Written(u64),
    Counted,
}

fn kind() -> impl Strategy<Value = Kind> {
    prop_oneof![
        2 => Just(Kind::Free),
        4 => (1u64..1_000_000).prop_map(Kind::Written),
        1 => Just(Kind::Counted),
    ]
}

/// Distinct object numbers with a kind each, in shuffled insertion order
fn entries() -> impl Strategy<Value = Vec<(u32, Kind)>> {
    prop::collection::btree_set(1u32..400, 1..60)
        .prop_flat_map(|numbers| {
            let len = numbers.len();
            (Just(numbers), prop::collection::vec(kind(), len))
        })
        .prop_map(|(numbers, kinds)| numbers.into_iter().zip(kinds).collect::<Vec<_>>())
        .prop_shuffle()
}

fn build(entries: &[(u32, Kind)]) -> XrefTable {
    let mut table = XrefTable::new();
    for &(number, kind) in entries {
        let reference = ObjectRef::new(number, 0);
        match kind {
            Kind::Free => table.add_free(reference).unwrap(),
            Kind::Written(offset) => table.add_in_use(reference, Some(offset)).unwrap(),
            Kind::Counted => table.add_in_use(reference, None).unwrap(),
        }
    }
    table
}

/// Parse a classic table into number -> (value, generation, tag)
fn parse(text: &str) -> BTreeMap<u32, (u64, u16, char)> {
    let mut lines = text.split_inclusive('\n');
    assert_eq!(lines.next(), Some("xref\n"));

    let mut rows = BTreeMap::new();
    while let Some(header) = lines.next() {
        let mut parts = header.split_whitespace();
        let first: u32 = parts.next().unwrap().parse().unwrap();
        let count: u32 = parts.next().unwrap().parse().unwrap();
        for number in first..first + count {
            let line = lines.next().expect("record");
            assert_eq!(line.len(), RECORD_WIDTH, "record {:?}", line);
            let value = line[0..10].parse().unwrap();
            let generation = line[11..16].parse().unwrap();
            let tag = line.as_bytes()[17] as char;
            assert!(rows.insert(number, (value, generation, tag)).is_none());
        }
    }
    rows
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn size_is_max_number_plus_one(entries in entries()) {
        let table = build(&entries);
        let max = entries.iter().map(|(n, _)| *n).max().unwrap();
        prop_assert_eq!(table.size(), max + 1);
    }

    #[test]
    fn prepared_blocks_never_touch(entries in entries()) {
        let mut table = build(&entries);
        table.prepare();
        prop_assert!(is_fully_merged(table.blocks()));

        let once = table.blocks().to_vec();
        table.prepare();
        prop_assert_eq!(table.blocks(), once.as_slice());
    }

    #[test]
    fn written_table_matches_entries(entries in entries()) {
        let mut table = build(&entries);
        let mut out = Cursor::new(Vec::new());
        table.write(&mut ClassicTableWriter::default(), &mut out).unwrap();
        let rows = parse(std::str::from_utf8(out.get_ref()).unwrap());

        for &(number, kind) in &entries {
            match kind {
                Kind::Written(offset) => {
                    prop_assert_eq!(rows.get(&number), Some(&(offset, 0, 'n')));
                }
                Kind::Free => {
                    prop_assert_eq!(rows.get(&number).map(|row| row.2), Some('f'));
                }
                Kind::Counted => prop_assert!(!rows.contains_key(&number)),
            }
        }
    }

    #[test]
    fn free_chain_is_one_cycle_through_zero(entries in entries()) {
        let mut table = build(&entries);
        table.mark_first_block_empty();
        let mut out = Cursor::new(Vec::new());
        table.write(&mut ClassicTableWriter::default(), &mut out).unwrap();
        let rows = parse(std::str::from_utf8(out.get_ref()).unwrap());

        let free: BTreeSet<u32> = entries
            .iter()
            .filter(|(_, kind)| *kind == Kind::Free)
            .map(|(n, _)| *n)
            .collect();

        let mut visited = Vec::new();
        let mut current = 0u32;
        loop {
            let (next, _, tag) = rows[&current];
            prop_assert_eq!(tag, 'f');
            current = next as u32;
            if current == 0 {
                break;
            }
            prop_assert!(visited.len() <= free.len());
            visited.push(current);
        }

        prop_assert_eq!(visited, free.into_iter().collect::<Vec<_>>());
        prop_assert_eq!(rows[&0].1, 65535);
    }

    #[test]
    fn duplicate_numbers_are_rejected(entries in entries(), pick in any::<prop::sample::Index>()) {
        let mut table = build(&entries);
        let (number, _) = entries[pick.index(entries.len())];
        prop_assert!(table.add_free(ObjectRef::new(number, 1)).is_err());
        prop_assert!(table.add_in_use(ObjectRef::new(number, 0), Some(1)).is_err());
    }
}
