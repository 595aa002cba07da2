//! Use case for generating a client library from an API description

use std::str::FromStr;
use std::sync::Arc;

use crate::core::config::{GeneratorConfig, OptionSpec, common_options};
use crate::core::error::{Error, Result};
use crate::generation::{GenerationReport, GeneratorRunner, Target, TargetStrategy};
use crate::infrastructure::openapi::load_spec;
use crate::infrastructure::output::FileSystemOutput;
use crate::infrastructure::strategies::StrategyRegistry;
use crate::infrastructure::templates::{TemplateSet, TeraRenderer, default_roots};

/// Use case for running the generator against files on disk
pub struct GenerateUseCase {
    strategies: Arc<StrategyRegistry>,
}

impl GenerateUseCase {
    pub fn new(strategies: Arc<StrategyRegistry>) -> Self {
        Self { strategies }
    }

    /// Target named by the configuration
    pub fn target(&self, config: &GeneratorConfig) -> Result<Target> {
        let name = config
            .target
            .as_deref()
            .ok_or_else(|| Error::config("a target is required"))?;
        Target::from_str(name)
    }

    /// Common options followed by the target's own
    pub fn declared_options(&self, strategy: &TargetStrategy) -> Vec<OptionSpec> {
        let mut declared = common_options();
        declared.extend(strategy.options.iter().cloned());
        declared
    }

    /// Options a target accepts
    pub fn options_for(&self, target: Target) -> Result<Vec<OptionSpec>> {
        let strategy = self.strategies.get(target)?;
        Ok(self.declared_options(&strategy))
    }

    pub async fn execute(&self, config: &GeneratorConfig) -> Result<GenerationReport> {
        // 1. Validate configuration
        let target = self.target(config)?;
        let strategy = self.strategies.get(target)?;
        let spec_path = config
            .spec
            .as_deref()
            .ok_or_else(|| Error::config("an input specification is required"))?;
        let output_dir = config.output_dir()?;
        let options = config.resolve_options(&self.declared_options(&strategy))?;

        // 2. Load the input document
        let spec = load_spec(spec_path).await?;

        // 3. Resolve templates in priority order
        let roots = default_roots(target, config.templates.as_deref())?;
        let set = TemplateSet::load(&roots).await?;
        let manifest = set.manifest()?;
        let renderer = TeraRenderer::new(set)?;

        // 4. Run the generator
        tracing::info!(
            target_language = %target,
            spec = %spec_path.display(),
            output = %output_dir.display(),
            template_set = %manifest.name,
            "Generating"
        );
        let mut runner = GeneratorRunner::new(
            strategy,
            Arc::new(renderer),
            Arc::new(FileSystemOutput::new(output_dir)),
            manifest.files,
        );
        runner.run(&spec, options).await
    }
}

impl Default for GenerateUseCase {
    fn default() -> Self {
        Self::new(Arc::new(StrategyRegistry::new()))
    }
}
