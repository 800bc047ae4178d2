//! Migration trait and registry.

use futures::future::BoxFuture;

use crate::error::AppError;
use crate::graph::Graph;

/// A single schema migration.
///
/// Uses `BoxFuture` so the trait stays object-safe and the registry can hold
/// `Box<dyn Migration>`.
pub trait Migration: Send + Sync {
    fn id(&self) -> &'static str;
    fn version(&self) -> u32;
    fn description(&self) -> &'static str;
    fn up<'a>(&'a self, graph: &'a Graph) -> BoxFuture<'a, Result<(), AppError>>;
}

/// Ordered set of migrations.
pub struct Register {
    migrations: Vec<Box<dyn Migration>>,
}

impl Register {
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    pub fn register(mut self, migration: impl Migration + 'static) -> Self {
        self.migrations.push(Box::new(migration));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Migration> {
        self.migrations.iter().map(|m| m.as_ref())
    }

    /// Migrations above `current_version`, in registration order.
    pub fn pending(&self, current_version: u32) -> impl Iterator<Item = &dyn Migration> {
        self.iter().filter(move |m| m.version() > current_version)
    }

    /// Highest registered version.
    pub fn latest_version(&self) -> u32 {
        self.iter().map(|m| m.version()).max().unwrap_or(0)
    }
}

impl Default for Register {
    fn default() -> Self {
        Self::new()
    }
}
