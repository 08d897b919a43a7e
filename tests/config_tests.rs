use packet_courier::config::Config;
use packet_courier::domains::path_planning::PlanningAlgorithm;
use std::io::Write;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_load_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[energy]
max_battery = 500
step_cost = 5
safety_margin = 40

[planning]
algorithm = "AStar"

[simulation]
agents = 1
seed = 42
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).await.unwrap();
    assert_eq!(config.energy.max_battery, 500);
    assert_eq!(config.energy.step_cost, 5);
    assert_eq!(config.energy.carry_step_cost, 25, "unset keys keep defaults");
    assert_eq!(config.energy.resume_level(), 475);
    assert_eq!(config.planning.algorithm, PlanningAlgorithm::AStar);
    assert_eq!(config.simulation.agents, 1);
    assert_eq!(config.simulation.seed, Some(42));
    assert_eq!(config.simulation.width, 24);
}

#[tokio::test]
async fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::from_file(dir.path().join("absent.toml")).await;
    assert!(result.is_err());
}

#[test]
fn test_invalid_energy_settings_are_rejected() {
    assert!(Config::from_toml_str("[energy]\nresume_percent = 0\n").is_err());
    assert!(Config::from_toml_str("[energy]\nrecharge_rate = 0\n").is_err());
    assert!(Config::from_toml_str("").is_ok());
}

#[test]
fn test_shipped_config_parses() {
    let content = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
    let config = Config::from_toml_str(&content).unwrap();
    assert_eq!(config.energy.resume_level(), 950);
    assert_eq!(config.planning.algorithm, PlanningAlgorithm::Dijkstra);
}

#[test]
fn test_empty_simulation_grid_is_rejected() {
    assert!(Config::from_toml_str("[simulation]\nwidth = 0\n").is_err());
    assert!(Config::from_toml_str("[simulation]\nheight = 0\n").is_err());
    assert!(Config::from_toml_str("[simulation]\ncolors = []\npackets = 3\n").is_err());
    assert!(Config::from_toml_str("[simulation]\ncolors = []\npackets = 0\n").is_ok());
}
