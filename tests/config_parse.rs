use img2bin_batch::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../img2bin-batch.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.filter.extension, "png");
    assert_eq!(cfg.filter.output_extension, "bin");
    assert!(!cfg.paths.input_dir.is_empty());
}

#[test]
fn defaults_match_original_workflow() {
    let cfg = Config::default();
    assert_eq!(cfg.paths.input_dir, "img");
    assert_eq!(cfg.run.on_error, "continue");
    assert_eq!(cfg.tool.timeout_seconds, 0);
}
