//! Health command handler.

use std::time::Instant;

use clap::ValueEnum;
use color_eyre::Result;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use sysinfo::{Disks, System};

use crate::config::Config;
use crate::data::news::{clean, parse};
use crate::graph::Graph;

use super::App;

/// Self-check run by the data component.
const SELF_CHECK_CSV: &str = "title,date,text\nTest Article,2024-01-01,Test content for health check\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HealthComponent {
    Database,
    Data,
    Configuration,
    System,
}

impl HealthComponent {
    fn name(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Data => "data",
            Self::Configuration => "configuration",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub component: &'static str,
    pub status: HealthState,
    pub message: String,
    pub response_time_ms: u128,
    pub details: JsonValue,
}

impl HealthStatus {
    fn new(
        component: HealthComponent,
        started: Instant,
        status: HealthState,
        message: impl Into<String>,
        details: JsonValue,
    ) -> Self {
        Self {
            component: component.name(),
            status,
            message: message.into(),
            response_time_ms: started.elapsed().as_millis(),
            details,
        }
    }
}

async fn check_database(config: &Config) -> HealthStatus {
    let started = Instant::now();
    let component = HealthComponent::Database;

    let result = async {
        let graph = Graph::connect(&config.neo4j).await?;
        graph.ping().await
    }
    .await;

    match result {
        Ok(()) => HealthStatus::new(
            component,
            started,
            HealthState::Healthy,
            "Database connection successful",
            json!({"uri": config.neo4j.uri}),
        ),
        Err(e) => HealthStatus::new(
            component,
            started,
            HealthState::Unhealthy,
            format!("Database connection failed: {}", e),
            json!({"uri": config.neo4j.uri}),
        ),
    }
}

fn check_data(config: &Config) -> HealthStatus {
    let started = Instant::now();
    let component = HealthComponent::Data;

    match parse(SELF_CHECK_CSV).map(clean) {
        Ok(cleaned) if !cleaned.articles.is_empty() => HealthStatus::new(
            component,
            started,
            HealthState::Healthy,
            "Data processing functions working correctly",
            json!({
                "test_records_processed": cleaned.articles.len(),
                "data_url": config.data.news_url,
            }),
        ),
        Ok(_) => HealthStatus::new(
            component,
            started,
            HealthState::Degraded,
            "Data processing completed but no records remain",
            JsonValue::Null,
        ),
        Err(e) => HealthStatus::new(
            component,
            started,
            HealthState::Unhealthy,
            format!("Data processing failed: {}", e),
            JsonValue::Null,
        ),
    }
}

fn check_configuration(config: &Result<Config, String>) -> HealthStatus {
    let started = Instant::now();
    let component = HealthComponent::Configuration;

    let result = config
        .as_ref()
        .map_err(Clone::clone)
        .and_then(|c| c.validate().map(|_| c).map_err(|e| e.to_string()));

    match result {
        Ok(config) => HealthStatus::new(
            component,
            started,
            HealthState::Healthy,
            "Configuration is valid",
            json!({
                "server_name": config.server.name,
                "transport": config.server.transport.to_string(),
                "auth_enabled": config.auth.enabled,
                "neo4j_uri": config.neo4j.uri,
            }),
        ),
        Err(e) => HealthStatus::new(
            component,
            started,
            HealthState::Unhealthy,
            format!("Configuration check failed: {}", e),
            JsonValue::Null,
        ),
    }
}

/// CPU or memory usage above this percentage degrades the system component.
const RESOURCE_LIMIT_PERCENT: f64 = 90.0;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    }
}

fn classify_resources(cpu_percent: f64, memory_percent: f64) -> (HealthState, String) {
    if cpu_percent > RESOURCE_LIMIT_PERCENT || memory_percent > RESOURCE_LIMIT_PERCENT {
        (
            HealthState::Degraded,
            format!(
                "High resource usage - CPU: {:.1}%, Memory: {:.1}%",
                cpu_percent, memory_percent
            ),
        )
    } else {
        (
            HealthState::Healthy,
            "System resources within acceptable limits".to_string(),
        )
    }
}

async fn check_system() -> HealthStatus {
    let started = Instant::now();

    // CPU usage is a delta between two refreshes.
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    sys.refresh_cpu_usage();
    sys.refresh_memory();

    let cpu_percent = f64::from(sys.global_cpu_usage());
    let memory_percent = percent(sys.used_memory(), sys.total_memory());

    let disks = Disks::new_with_refreshed_list();
    let (disk_total, disk_free) = disks
        .list()
        .iter()
        .fold((0u64, 0u64), |(total, free), disk| {
            (total + disk.total_space(), free + disk.available_space())
        });

    let (state, message) = classify_resources(cpu_percent, memory_percent);
    HealthStatus::new(
        HealthComponent::System,
        started,
        state,
        message,
        json!({
            "cpu_percent": cpu_percent,
            "memory_percent": memory_percent,
            "memory_available_gb": sys.available_memory() as f64 / GIB,
            "disk_free_gb": disk_free as f64 / GIB,
            "disk_usage_percent": percent(disk_total.saturating_sub(disk_free), disk_total),
            "cpus": sys.cpus().len(),
            "os": std::env::consts::OS,
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}

impl App {
    /// Check one component, or all of them, and print the results.
    ///
    /// Fails if any checked component is unhealthy.
    pub async fn run_health(&self, component: Option<HealthComponent>) -> Result<()> {
        let loaded = Config::load().map_err(|e| e.to_string());
        let components = match component {
            Some(c) => vec![c],
            None => HealthComponent::value_variants().to_vec(),
        };

        let mut statuses = Vec::with_capacity(components.len());
        for component in components {
            let status = match (component, &loaded) {
                (HealthComponent::Configuration, _) => check_configuration(&loaded),
                (HealthComponent::System, _) => check_system().await,
                (HealthComponent::Database, Ok(config)) => check_database(config).await,
                (HealthComponent::Data, Ok(config)) => check_data(config),
                (_, Err(e)) => HealthStatus::new(
                    component,
                    Instant::now(),
                    HealthState::Unhealthy,
                    format!("Configuration could not be loaded: {}", e),
                    JsonValue::Null,
                ),
            };
            tracing::info!(
                component = status.component,
                status = ?status.status,
                "Health check finished"
            );
            statuses.push(status);
        }

        println!("{}", serde_json::to_string_pretty(&statuses)?);

        let unhealthy: Vec<&str> = statuses
            .iter()
            .filter(|s| s.status == HealthState::Unhealthy)
            .map(|s| s.component)
            .collect();
        if !unhealthy.is_empty() {
            return Err(color_eyre::eyre::eyre!(
                "Unhealthy components: {}",
                unhealthy.join(", ")
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_self_check_is_healthy() {
        let status = check_data(&Config::default());
        assert_eq!(status.status, HealthState::Healthy);
        assert_eq!(status.details["test_records_processed"], 1);
    }

    #[test]
    fn test_configuration_without_secret_is_unhealthy() {
        let status = check_configuration(&Ok(Config::default()));
        assert_eq!(status.status, HealthState::Unhealthy);
    }

    #[test]
    fn test_configuration_load_failure_is_reported() {
        let status = check_configuration(&Err("bad toml".to_string()));
        assert_eq!(status.status, HealthState::Unhealthy);
        assert!(status.message.contains("bad toml"));
    }

    #[tokio::test]
    async fn test_system_check_reports_resources() {
        let status = check_system().await;
        assert_eq!(status.component, "system");
        assert_ne!(status.status, HealthState::Unhealthy);
        assert!(status.details["memory_percent"].is_number());
        assert!(status.details["disk_usage_percent"].is_number());
    }

    #[test]
    fn test_resource_thresholds() {
        assert_eq!(classify_resources(45.0, 60.0).0, HealthState::Healthy);
        assert_eq!(classify_resources(90.0, 90.0).0, HealthState::Healthy);

        let (state, message) = classify_resources(95.5, 40.0);
        assert_eq!(state, HealthState::Degraded);
        assert!(message.contains("CPU: 95.5%"));

        assert_eq!(classify_resources(10.0, 91.0).0, HealthState::Degraded);
    }

    #[test]
    fn test_percent_of_empty_total_is_zero() {
        assert_eq!(percent(5, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }
}
