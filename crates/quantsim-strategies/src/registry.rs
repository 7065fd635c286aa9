//! Strategy registry: constructs variants from a kind and a parameter map.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use quantsim_core::{
    error::StrategyError,
    traits::{Strategy, StrategyKind},
};

use crate::{
    MaCrossoverConfig, MaCrossoverStrategy, MeanReversionConfig, MeanReversionStrategy,
    MomentumConfig, MomentumStrategy,
};

/// Listing entry for a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Kind identifier
    pub kind: StrategyKind,
    /// Strategy name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default parameters as a flat JSON mapping
    pub default_parameters: Value,
}

/// Registry mapping strategy kinds to constructors.
///
/// New strategies are added here and to [`StrategyKind`] without touching
/// the engine.
#[derive(Debug, Default)]
pub struct StrategyRegistry;

impl StrategyRegistry {
    pub fn new() -> Self {
        Self
    }

    /// List all registered strategies with their default parameters.
    pub fn list(&self) -> Vec<StrategyInfo> {
        StrategyKind::ALL
            .iter()
            .map(|&kind| {
                let (name, description, defaults) = match kind {
                    StrategyKind::MaCrossover => (
                        "MA Crossover",
                        "Compares short-window vs long-window mean close",
                        serde_json::to_value(MaCrossoverConfig::default()),
                    ),
                    StrategyKind::MeanReversion => (
                        "Mean Reversion",
                        "Fades deviations from the rolling mean close",
                        serde_json::to_value(MeanReversionConfig::default()),
                    ),
                    StrategyKind::Momentum => (
                        "Momentum/RSI",
                        "Cumulative-return momentum gated by RSI extremes",
                        serde_json::to_value(MomentumConfig::default()),
                    ),
                };
                StrategyInfo {
                    kind,
                    name: name.to_string(),
                    description: description.to_string(),
                    default_parameters: defaults.unwrap_or(Value::Null),
                }
            })
            .collect()
    }

    /// Construct a strategy of the given kind from a parameter mapping.
    ///
    /// Keys missing from `parameters` fall back to the variant's defaults,
    /// so partial maps (as produced by the optimizer grid) are accepted.
    /// Invalid parameter values are rejected here, before any bar is
    /// processed.
    pub fn create(
        &self,
        kind: StrategyKind,
        parameters: Value,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        match kind {
            StrategyKind::MaCrossover => {
                let config: MaCrossoverConfig =
                    merged_config(MaCrossoverConfig::default(), parameters)?;
                Ok(Box::new(MaCrossoverStrategy::new(config)?))
            }
            StrategyKind::MeanReversion => {
                let config: MeanReversionConfig =
                    merged_config(MeanReversionConfig::default(), parameters)?;
                Ok(Box::new(MeanReversionStrategy::new(config)?))
            }
            StrategyKind::Momentum => {
                let config: MomentumConfig = merged_config(MomentumConfig::default(), parameters)?;
                Ok(Box::new(MomentumStrategy::new(config)?))
            }
        }
    }

    /// Construct a strategy with its default parameters.
    pub fn create_default(&self, kind: StrategyKind) -> Result<Box<dyn Strategy>, StrategyError> {
        self.create(kind, Value::Object(Default::default()))
    }
}

/// Overlay `overrides` onto the serialized defaults and deserialize the
/// result. Unknown keys are rejected by serde.
fn merged_config<C>(defaults: C, overrides: Value) -> Result<C, StrategyError>
where
    C: Serialize + serde::de::DeserializeOwned,
{
    let mut base = serde_json::to_value(defaults)
        .map_err(|e| StrategyError::Internal(e.to_string()))?;

    match (&mut base, overrides) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            for (key, value) in override_map {
                if !base_map.contains_key(&key) {
                    return Err(StrategyError::InvalidConfig(format!(
                        "Unknown parameter: {key}"
                    )));
                }
                base_map.insert(key, value);
            }
        }
        (_, Value::Null) => {}
        _ => {
            return Err(StrategyError::InvalidConfig(
                "Parameters must be a JSON object".into(),
            ))
        }
    }

    serde_json::from_value(base).map_err(|e| StrategyError::InvalidConfig(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_list() {
        let registry = StrategyRegistry::new();
        let strategies = registry.list();

        assert_eq!(strategies.len(), 3);
        assert!(strategies
            .iter()
            .any(|s| s.kind == StrategyKind::MaCrossover));
    }

    #[test]
    fn test_create_default() {
        let registry = StrategyRegistry::new();
        let strategy = registry.create_default(StrategyKind::MaCrossover).unwrap();

        assert_eq!(strategy.kind(), StrategyKind::MaCrossover);
        assert_eq!(strategy.name(), "MA Crossover");
    }

    #[test]
    fn test_create_with_partial_parameters() {
        let registry = StrategyRegistry::new();
        let strategy = registry
            .create(StrategyKind::MaCrossover, json!({ "short_window": 5 }))
            .unwrap();

        let params = strategy.parameters();
        assert_eq!(params["short_window"], json!(5));
        // Long window falls back to the default.
        assert_eq!(
            params["long_window"],
            json!(MaCrossoverConfig::default().long_window)
        );
    }

    #[test]
    fn test_invalid_parameters_rejected_at_construction() {
        let registry = StrategyRegistry::new();

        let result = registry.create(
            StrategyKind::MaCrossover,
            json!({ "short_window": 30, "long_window": 20 }),
        );
        assert!(matches!(
            result,
            Err(StrategyError::InvalidConfig(_))
        ));

        let unknown = registry.create(StrategyKind::Momentum, json!({ "lookback": 5 }));
        assert!(unknown.is_err());
    }
}
