use clap::Parser;
use promgate::cli::{Cli, Commands};
use promgate::config::StaticConfig;
use tempfile::TempDir;

#[test]
fn test_cli_defaults_to_serve() {
    let cli = Cli::try_parse_from(["promgate"]).unwrap();
    assert_eq!(cli.config, "config.toml");
    assert!(cli.command.is_none());
}

#[test]
fn test_cli_serve_with_config() {
    let cli = Cli::try_parse_from(["promgate", "serve", "--config", "/etc/promgate.toml"]).unwrap();
    assert_eq!(cli.config, "/etc/promgate.toml");
    assert!(matches!(cli.command, Some(Commands::Serve)));
}

#[test]
fn test_cli_unknown_command_fails() {
    assert!(Cli::try_parse_from(["promgate", "list"]).is_err());
}

#[test]
fn test_generate_config_writes_loadable_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("generated.toml");
    let output_str = output.to_str().unwrap();

    let cli = Cli::try_parse_from(["promgate", "generate-config", "-o", output_str]).unwrap();
    let Some(Commands::GenerateConfig { output: Some(path) }) = cli.command else {
        panic!("expected generate-config with output");
    };

    StaticConfig::default().save_to_file(&path).unwrap();
    let loaded = StaticConfig::try_load(&path, None).unwrap();
    assert_eq!(loaded.server.port, StaticConfig::default().server.port);
}
