//! Property and compatibility tests for `WindowedReader`.
//!
//! Verifies:
//! 1. Every read returns exactly the clamped window length
//! 2. The suffix always starts at `total_size - suffix_len`, whatever the chunk size
//! 3. Chunked sequential reads equal one large read on an identically seeded reader
//! 4. Filler-only output matches the filler pattern read as a repeatable regex
//! 5. Set ranges and random multipliers stay inside their bounds

use proptest::prelude::*;
use regex::Regex;
use sizefs_contents::{ContentConfig, WindowedReader};

const FILLERS: [&str; 6] = ["abc", "a(bc)*d", "[0-9]{7}", "x+y", "(ab){3}c", "q?[rs]*"];

fn seeded(filler: &str, seed: u64) -> ContentConfig {
    ContentConfig {
        filler: Some(filler.to_string()),
        seed: Some(seed),
        ..ContentConfig::default()
    }
}

fn framed(filler: &str, seed: u64) -> ContentConfig {
    ContentConfig {
        prefix: Some("HDR".to_string()),
        suffix: Some("END".to_string()),
        padder: Some("_".to_string()),
        ..seeded(filler, seed)
    }
}

/// Assert that `text` is a run of complete `unit` matches followed by a
/// partial one shorter than `max_unit_len`.
fn assert_repeats(text: &str, unit: &str, max_unit_len: usize) {
    let re = Regex::new(&format!("^(?:{unit})*")).unwrap();
    let matched = re.find(text).map(|m| m.end()).unwrap_or(0);
    assert!(
        text.len() - matched < max_unit_len,
        "only {matched} of {} bytes match ({unit})*",
        text.len()
    );
}

#[test]
fn test_star_output_matches_regex() {
    let mut reader = WindowedReader::new(1 << 20, &seeded("a(bc)*d", 1)).unwrap();
    let content = String::from_utf8(reader.read(0, 4096)).unwrap();

    let re = Regex::new(r"^(?:a(?:bc)*d)*(?:a(?:bc)*b?)?$").unwrap();
    assert!(re.is_match(&content));
    assert!(Regex::new(r"^a(bc)*d").unwrap().is_match(&content));
}

#[test]
fn test_plus_output_matches_regex() {
    let mut reader = WindowedReader::new(1 << 20, &seeded("a(bc)+d", 2)).unwrap();
    let content = String::from_utf8(reader.read(0, 4096)).unwrap();
    assert_repeats(&content, "a(?:bc)+d", 22);
}

#[test]
fn test_choice_output_matches_regex() {
    let mut reader = WindowedReader::new(1 << 20, &seeded("a[012345]{14}b", 3)).unwrap();
    let content = String::from_utf8(reader.read(0, 256)).unwrap();
    assert_repeats(&content, "a[012345]{14}b", 16);
}

#[test]
fn test_range_output_matches_regex() {
    let mut reader = WindowedReader::new(1 << 20, &seeded("a[0-9,a-z,A-Z]{5}d", 4)).unwrap();
    let content = String::from_utf8(reader.read(0, 256)).unwrap();
    assert_repeats(&content, "a[0-9,a-zA-Z]{5}d", 7);
}

#[test]
fn test_set_range_draws_only_digits() {
    let mut reader = WindowedReader::new(10_000, &seeded("[0-9]", 5)).unwrap();
    let content = reader.read(0, 10_000);
    assert!(content.iter().all(u8::is_ascii_digit));
    // 10k draws from a 255-entry pool over ten digits hit every digit.
    for digit in b'0'..=b'9' {
        assert!(content.contains(&digit), "digit {} never drawn", digit as char);
    }
}

#[test]
fn test_large_file_regex_folder() {
    let mut reader = WindowedReader::new(128 * 1024, &seeded("a(bcd)*e{4}", 6)).unwrap();
    let content = String::from_utf8(reader.read(0, 128 * 1024)).unwrap();
    assert_eq!(content.len(), 131072);
    assert!(Regex::new(r"^a(bcd)*e{4}").unwrap().is_match(&content));
}

#[test]
fn test_split_read_equals_single_read() {
    let mut split = WindowedReader::new(1024, &seeded("a(bc)*d", 9)).unwrap();
    let mut single = WindowedReader::new(1024, &seeded("a(bc)*d", 9)).unwrap();

    let mut content = split.read(0, 10);
    content.extend(split.read(10, 20));
    assert_eq!(content, single.read(0, 20));
}

#[test]
fn test_discontinuous_read_drops_remainder() {
    let mut reader = WindowedReader::new(1024, &seeded("abcdefghij", 0)).unwrap();
    assert_eq!(reader.read(0, 15), b"abcdefghijabcde");
    // A continuation would start with "fghij"; a jump starts a new expansion.
    assert_eq!(reader.read(50, 60), b"abcdefghij");
}

proptest! {
    #[test]
    fn prop_read_length_is_exact(
        total in 0u64..2500,
        start in 0u64..3000,
        len in 0u64..3000,
        filler in prop::sample::select(FILLERS.to_vec()),
    ) {
        let mut reader = WindowedReader::new(total, &framed(filler, 11)).unwrap();
        let end = (start + len).min(total);
        let expected = end - start.min(end);
        prop_assert_eq!(reader.read(start, start + len).len() as u64, expected);
    }

    #[test]
    fn prop_suffix_starts_at_boundary(
        total in 6u64..600,
        chunk in 1usize..64,
        filler in prop::sample::select(FILLERS.to_vec()),
        seed in any::<u64>(),
    ) {
        let mut reader = WindowedReader::new(total, &framed(filler, seed)).unwrap();
        prop_assert_eq!(reader.suffix_start(), total - 3);

        let content: Vec<u8> = reader.chunks(chunk).flatten().collect();
        prop_assert_eq!(content.len() as u64, total);
        prop_assert_eq!(&content[..3], b"HDR");
        prop_assert_eq!(&content[content.len() - 3..], b"END");
    }

    #[test]
    fn prop_chunked_reads_match_single_read(
        chunk in 1usize..100,
        filler in prop::sample::select(FILLERS.to_vec()),
        seed in any::<u64>(),
    ) {
        let mut chunked = WindowedReader::new(777, &framed(filler, seed)).unwrap();
        let mut single = WindowedReader::new(777, &framed(filler, seed)).unwrap();

        let content: Vec<u8> = chunked.chunks(chunk).flatten().collect();
        prop_assert_eq!(content, single.read(0, 777));
    }

    #[test]
    fn prop_fixed_regions_are_position_addressable(
        start in 0u64..64,
        len in 1u64..64,
        seed in any::<u64>(),
    ) {
        let config = ContentConfig {
            prefix: Some("[a-z]{64}".to_string()),
            suffix: Some("[A-Z]{64}".to_string()),
            ..seeded("[0-9]+", seed)
        };
        let mut reader = WindowedReader::new(1000, &config).unwrap();
        let prefix = reader.prefix().to_vec();
        let suffix = reader.suffix().to_vec();

        let end = (start + len).min(64);
        reader.read(200, 500);
        prop_assert_eq!(reader.read(start, end), prefix[start as usize..end as usize].to_vec());
        reader.read(100, 101);
        prop_assert_eq!(
            reader.read(936 + start, 936 + end),
            suffix[start as usize..end as usize].to_vec()
        );
    }
}
