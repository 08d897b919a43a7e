use crate::domains::path_planning::PlanningAlgorithm;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub energy: EnergyConfig,
    pub planning: PlanningConfig,
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
}

/// Battery bookkeeping and charging thresholds. The low/resume points are
/// product decisions, so they live here rather than in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub max_battery: u32,
    pub step_cost: u32,
    pub carry_step_cost: u32,
    pub recharge_rate: u32,
    pub safety_margin: u32,
    /// Leave the pad once the battery reaches this share of `max_battery`.
    pub resume_percent: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    pub algorithm: PlanningAlgorithm,
    /// Share the full target registry with peers every this many ticks
    /// (0 disables sharing).
    pub share_targets_every: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub buffer_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub width: u32,
    pub height: u32,
    pub agents: usize,
    pub colors: Vec<String>,
    pub packets: usize,
    pub stations: usize,
    pub view_radius: u32,
    pub communication_range: u32,
    pub ticks: u64,
    pub seed: Option<u64>,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.energy.validate()?;
        config.simulation.validate()?;
        Ok(config)
    }
}

impl EnergyConfig {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.max_battery > 0, "energy.max_battery must be positive");
        anyhow::ensure!(self.recharge_rate > 0, "energy.recharge_rate must be positive");
        anyhow::ensure!(
            (1..=100).contains(&self.resume_percent),
            "energy.resume_percent must be within 1..=100"
        );
        Ok(())
    }

    pub fn resume_level(&self) -> u32 {
        (u64::from(self.max_battery) * u64::from(self.resume_percent) / 100) as u32
    }

    pub fn cost_per_step(&self, carrying: bool) -> u32 {
        if carrying {
            self.carry_step_cost
        } else {
            self.step_cost
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.width > 0 && self.height > 0,
            "simulation.width and simulation.height must be positive"
        );
        anyhow::ensure!(
            self.packets == 0 || !self.colors.is_empty(),
            "simulation.colors must not be empty when packets are placed"
        );
        Ok(())
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            max_battery: 1000,
            step_cost: 10,
            carry_step_cost: 25,
            recharge_rate: 100,
            safety_margin: 80,
            resume_percent: 95,
        }
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            algorithm: PlanningAlgorithm::Dijkstra,
            share_targets_every: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            buffer_capacity: 256,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 24,
            height: 24,
            agents: 3,
            colors: vec!["red".to_string(), "blue".to_string()],
            packets: 8,
            stations: 2,
            view_radius: 3,
            communication_range: 8,
            ticks: 500,
            seed: Some(7),
        }
    }
}
