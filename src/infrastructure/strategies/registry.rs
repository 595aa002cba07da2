//! Registry of target strategies

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::{Error, Result};
use crate::generation::strategy::TargetStrategy;
use crate::generation::types::Target;

/// Registry that maps targets to their strategies
pub struct StrategyRegistry {
    strategies: HashMap<Target, Arc<TargetStrategy>>,
}

impl StrategyRegistry {
    /// Create a new registry with the built-in strategies
    pub fn new() -> Self {
        let strategies = Target::all()
            .into_iter()
            .map(|target| (target, Arc::new(super::strategy_for(target))))
            .collect();
        Self { strategies }
    }

    /// Register a custom strategy, replacing the built-in one
    pub fn register(&mut self, strategy: TargetStrategy) {
        self.strategies.insert(strategy.target, Arc::new(strategy));
    }

    /// Get the strategy for a target
    pub fn get(&self, target: Target) -> Result<Arc<TargetStrategy>> {
        self.strategies
            .get(&target)
            .cloned()
            .ok_or_else(|| Error::config(format!("no strategy registered for target '{target}'")))
    }

    /// Supported targets, sorted by name
    pub fn supported_targets(&self) -> Vec<Target> {
        let mut targets: Vec<Target> = self.strategies.keys().copied().collect();
        targets.sort_by_key(|t| t.as_str());
        targets
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_strategies() {
        let registry = StrategyRegistry::new();
        assert_eq!(
            registry.supported_targets(),
            vec![Target::Haskell, Target::Perl, Target::Rust]
        );
        assert_eq!(registry.get(Target::Haskell).unwrap().no_content_type, "NoContent");
    }

    #[test]
    fn test_register_replaces_strategy() {
        let mut registry = StrategyRegistry::new();
        let mut custom = super::super::strategy_for(Target::Rust);
        custom.no_content_type = "Empty".to_string();
        registry.register(custom);

        assert_eq!(registry.get(Target::Rust).unwrap().no_content_type, "Empty");
    }
}
