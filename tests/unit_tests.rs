use clap::Parser;
use sizefs::ContentOpts;
use sizefs_contents::{PatternRole, DEFAULT_MAX_RANDOM};
use std::io::Write;

#[test]
fn test_content_opts_defaults() {
    let opts = ContentOpts::default();
    let config = opts.to_content_config().unwrap();

    assert_eq!(config.pattern(PatternRole::Filler), "0");
    assert_eq!(config.pattern(PatternRole::Prefix), "");
    assert_eq!(config.max_random, DEFAULT_MAX_RANDOM);
    assert_eq!(config.seed, None);
}

#[test]
fn test_content_opts_from_args() {
    let opts = ContentOpts::try_parse_from([
        "sizefs",
        "--filler",
        "a(bc)*d",
        "--suffix",
        "END",
        "--max-random",
        "3",
        "--seed",
        "7",
    ])
    .unwrap();
    let config = opts.to_content_config().unwrap();

    assert_eq!(config.filler.as_deref(), Some("a(bc)*d"));
    assert_eq!(config.suffix.as_deref(), Some("END"));
    assert_eq!(config.prefix, None);
    assert_eq!(config.max_random, 3);
    assert_eq!(config.seed, Some(7));
}

#[test]
fn test_command_line_overrides_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "filler: \"xyz\"\nprefix: \"HEADER\"\nmax_random: 4\nseed: 1"
    )
    .unwrap();

    let opts = ContentOpts {
        config: Some(file.path().to_path_buf()),
        filler: Some("[0-9]".to_string()),
        seed: Some(99),
        ..ContentOpts::default()
    };
    let config = opts.to_content_config().unwrap();

    assert_eq!(config.filler.as_deref(), Some("[0-9]"));
    assert_eq!(config.prefix.as_deref(), Some("HEADER"));
    assert_eq!(config.max_random, 4);
    assert_eq!(config.seed, Some(99));
}

#[test]
fn test_missing_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let opts = ContentOpts {
        config: Some(dir.path().join("missing.yaml")),
        ..ContentOpts::default()
    };

    let err = opts.to_content_config().unwrap_err();
    assert!(format!("{err:#}").contains("Failed to load content config"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_random: lots").unwrap();

    let opts = ContentOpts {
        config: Some(file.path().to_path_buf()),
        ..ContentOpts::default()
    };
    assert!(opts.to_content_config().is_err());
}
