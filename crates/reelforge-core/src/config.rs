//! Configuration structures for reelforge-core.
//!
//! These are explicit, serializable configuration objects used by higher
//! layers (planner, runner, CLI) to bound graph size and fan-out. The core
//! crate itself never reads environment variables; all configuration is
//! supplied explicitly by the caller.

use crate::errors::{CoreError, CoreResult};

/// Global configuration container for blueprint expansion and planning.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub limits: LimitsConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
        }
    }
}

/// Resource and complexity limits applied while expanding and planning a
/// blueprint. These exist to keep a malformed or pathological blueprint from
/// producing an unbounded producer graph.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_nodes: usize,
    pub max_edges: usize,
    pub max_dimension_cardinality: usize,
    pub max_expanded_instances: usize,
    pub max_layers: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_nodes: 10_000,
            max_edges: 50_000,
            max_dimension_cardinality: 10_000,
            max_expanded_instances: 200_000,
            max_layers: 1_000,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CoreConfig) -> CoreResult<()> {
    if cfg.limits.max_nodes == 0 {
        return Err(CoreError::invalid_argument(
            "max_nodes must be greater than zero",
        ));
    }
    if cfg.limits.max_dimension_cardinality == 0 {
        return Err(CoreError::invalid_argument(
            "max_dimension_cardinality must be greater than zero",
        ));
    }
    if cfg.limits.max_expanded_instances < cfg.limits.max_nodes {
        return Err(CoreError::invalid_argument(
            "max_expanded_instances must be at least max_nodes",
        ));
    }
    Ok(())
}
