//! Aggregator registry.

use crate::aggregation::arbiter::Arbiter;
use crate::aggregation::combiner::Combiner;
use crate::aggregation::mathematician::Mathematician;
use crate::aggregation::strategy::Aggregator;
use crate::aggregation::voter::Voter;
use crate::config::SimulationConfig;
use crate::core::{Error, Result};

/// Ordered, uniquely named set of aggregators.
#[derive(Default)]
pub struct AggregatorRegistry {
    aggregators: Vec<Box<dyn Aggregator>>,
}

impl AggregatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every configured strategy: voter, combiner, arbiters, mathematicians.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let learners: Vec<String> = config.classifiers.keys().cloned().collect();
        let mut registry = Self::new();

        registry.register(Box::new(Voter::from_names(
            &config.voter.name,
            &config.voter.priority,
            &learners,
        )?))?;
        registry.register(Box::new(Combiner::new(
            &config.combiner.name,
            config.combiner.meta.clone(),
        )))?;
        for &rule in &config.arbiter {
            registry.register(Box::new(Arbiter::new(rule)))?;
        }
        for &method in &config.mathematician {
            registry.register(Box::new(Mathematician::new(method)))?;
        }
        Ok(registry)
    }

    /// Add an aggregator; entity names must stay unique.
    pub fn register(&mut self, aggregator: Box<dyn Aggregator>) -> Result<()> {
        if self.aggregators.iter().any(|a| a.name() == aggregator.name()) {
            return Err(Error::InvalidConfig(format!(
                "duplicate aggregator name: {}",
                aggregator.name()
            )));
        }
        self.aggregators.push(aggregator);
        Ok(())
    }

    /// Aggregators in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Aggregator> {
        self.aggregators.iter().map(|a| a.as_ref())
    }

    /// Entity names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.aggregators.iter().map(|a| a.name()).collect()
    }

    /// Number of registered aggregators.
    pub fn len(&self) -> usize {
        self.aggregators.len()
    }

    /// Whether no aggregator is registered.
    pub fn is_empty(&self) -> bool {
        self.aggregators.is_empty()
    }
}

impl std::fmt::Debug for AggregatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
