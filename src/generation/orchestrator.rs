//! Generation orchestration - drives one run through its phases

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::config::ResolvedOptions;
use crate::core::error::Result;
use crate::generation::context::{RenderContext, RunContext};
use crate::generation::model::{
    ApiGroup, CodegenModel, CodegenOperation, CodegenSecurity, SupportingFile,
};
use crate::generation::operation::OperationProcessor;
use crate::generation::post_processor::{finalize_globals, post_process_models, post_process_operations};
use crate::generation::preprocess::preprocess;
use crate::generation::schema::SchemaResolver;
use crate::generation::strategy::TargetStrategy;
use crate::generation::traits::{OutputSink, TemplateRenderer};
use crate::generation::types::{Artifact, FilePlan, FileScope, GenerationReport};
use crate::infrastructure::openapi::ApiSpec;

/// Phase of a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    PreprocessSpec,
    ResolveModels,
    ResolveOperations,
    PostProcessModels,
    PostProcessOperations,
    Render,
    Done,
}

impl RunState {
    /// The phase after this one; `None` once done
    pub fn next(self) -> Option<RunState> {
        match self {
            Self::Init => Some(Self::PreprocessSpec),
            Self::PreprocessSpec => Some(Self::ResolveModels),
            Self::ResolveModels => Some(Self::ResolveOperations),
            Self::ResolveOperations => Some(Self::PostProcessModels),
            Self::PostProcessModels => Some(Self::PostProcessOperations),
            Self::PostProcessOperations => Some(Self::Render),
            Self::Render => Some(Self::Done),
            Self::Done => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::PreprocessSpec => "preprocess_spec",
            Self::ResolveModels => "resolve_models",
            Self::ResolveOperations => "resolve_operations",
            Self::PostProcessModels => "post_process_models",
            Self::PostProcessOperations => "post_process_operations",
            Self::Render => "render",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything resolved so far in a run
#[derive(Default)]
struct Resolved {
    security: Vec<CodegenSecurity>,
    models: Vec<CodegenModel>,
    operations: Vec<CodegenOperation>,
    apis: Vec<ApiGroup>,
    files: Vec<PathBuf>,
}

/// Drives a specification through preprocessing, resolution, post-processing
/// and rendering.
///
/// A runner owns no run state besides its current phase; every call to
/// [`GeneratorRunner::run`] starts from a fresh [`RunContext`], so two runs
/// over the same input produce the same files.
pub struct GeneratorRunner {
    strategy: Arc<TargetStrategy>,
    renderer: Arc<dyn TemplateRenderer>,
    output: Arc<dyn OutputSink>,
    plan: Vec<FilePlan>,
    state: RunState,
}

impl GeneratorRunner {
    /// Create a new runner
    pub fn new(
        strategy: Arc<TargetStrategy>,
        renderer: Arc<dyn TemplateRenderer>,
        output: Arc<dyn OutputSink>,
        plan: Vec<FilePlan>,
    ) -> Self {
        Self {
            strategy,
            renderer,
            output,
            plan,
            state: RunState::Init,
        }
    }

    /// Phase reached by the last run
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute a full run
    pub async fn run(&mut self, spec: &ApiSpec, options: ResolvedOptions) -> Result<GenerationReport> {
        self.state = RunState::Init;
        let mut ctx = RunContext::new(Arc::clone(&self.strategy), options);
        let mut resolved = Resolved::default();

        tracing::info!(
            target_language = %self.strategy.target,
            planned_files = self.plan.len(),
            "Starting generation run"
        );

        while let Some(next) = self.state.next() {
            self.advance(next);
            match next {
                RunState::PreprocessSpec => {
                    resolved.security = preprocess(&mut ctx, spec, &self.plan)?;
                }
                RunState::ResolveModels => {
                    let mut resolver = SchemaResolver::new(&spec.components.schemas);
                    resolver.register_model_names(&mut ctx)?;
                    resolved.models = resolver.resolve_models(&mut ctx)?;
                }
                RunState::ResolveOperations => {
                    let security_names: IndexMap<String, String> = resolved
                        .security
                        .iter()
                        .map(|s| (s.key.clone(), s.name.clone()))
                        .collect();
                    let resolver = SchemaResolver::new(&spec.components.schemas);
                    let mut processor = OperationProcessor::new(spec, resolver, security_names);
                    resolved.operations = processor.resolve_operations(&mut ctx)?;
                    resolved.models.extend(processor.take_inline_models());
                }
                RunState::PostProcessModels => {
                    post_process_models(&ctx, &mut resolved.models);
                }
                RunState::PostProcessOperations => {
                    resolved.apis = post_process_operations(&ctx, &mut resolved.operations);
                    finalize_globals(
                        &mut ctx,
                        &resolved.models,
                        &resolved.operations,
                        &resolved.apis,
                        &resolved.security,
                    );
                }
                RunState::Render => {
                    resolved.files = self.render_all(&ctx, &resolved).await?;
                }
                RunState::Init | RunState::Done => {}
            }
        }

        tracing::info!(
            files = resolved.files.len(),
            diagnostics = ctx.diagnostics.len(),
            "Generation run complete"
        );
        Ok(GenerationReport {
            files: resolved.files,
            diagnostics: ctx.diagnostics,
        })
    }

    fn advance(&mut self, next: RunState) {
        tracing::info!(from = %self.state, to = %next, "Entering phase");
        self.state = next;
    }

    async fn render_all(&self, ctx: &RunContext, resolved: &Resolved) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for file in &self.plan {
            if !file.is_enabled(&ctx.options) {
                tracing::debug!(template = %file.template, when = ?file.when, "Skipping disabled file");
                continue;
            }
            match file.scope {
                FileScope::None => {
                    let planned = SupportingFile::new(
                        file.template.as_str(),
                        file.folder.as_str(),
                        file.filename.as_str(),
                    );
                    if !ctx.supporting_files.contains(&planned) {
                        continue;
                    }
                    let mut render_ctx = RenderContext::with_globals(&ctx.globals);
                    render_ctx.merge_json(&file.context);
                    written.push(self.render_file(file, &render_ctx, &file.template).await?);
                }
                FileScope::Model => {
                    for model in &resolved.models {
                        let mut render_ctx = RenderContext::with_globals(&ctx.globals);
                        render_ctx.add_variable("model", model);
                        render_ctx.add_variable("classname", &model.classname);
                        render_ctx.merge(&model.vendor_extensions);
                        render_ctx.merge_json(&file.context);
                        written.push(self.render_file(file, &render_ctx, &model.classname).await?);
                    }
                }
                FileScope::Operation => {
                    for op in &resolved.operations {
                        let mut render_ctx = RenderContext::with_globals(&ctx.globals);
                        render_ctx.add_variable("operation", op);
                        render_ctx.merge(&op.vendor_extensions);
                        render_ctx.merge_json(&file.context);
                        written.push(self.render_file(file, &render_ctx, &op.operation_id).await?);
                    }
                }
                FileScope::Api => {
                    for api in &resolved.apis {
                        let mut render_ctx = RenderContext::with_globals(&ctx.globals);
                        render_ctx.add_variable("tag", &api.tag);
                        render_ctx.add_variable("classname", &api.classname);
                        render_ctx.add_variable("operations", &api.operations);
                        render_ctx.merge_json(&file.context);
                        written.push(self.render_file(file, &render_ctx, &api.tag).await?);
                    }
                }
            }
        }
        Ok(written)
    }

    async fn render_file(&self, file: &FilePlan, context: &RenderContext, entity: &str) -> Result<PathBuf> {
        let folder = self
            .renderer
            .render_str(&file.folder, context)
            .map_err(|e| e.for_entity(entity))?;
        let filename = self
            .renderer
            .render_str(&file.filename, context)
            .map_err(|e| e.for_entity(entity))?;
        let content = self
            .renderer
            .render(&file.template, context)
            .map_err(|e| e.for_entity(entity))?;

        let path = PathBuf::from(folder.trim()).join(filename.trim());
        tracing::debug!(template = %file.template, entity = %entity, path = %path.display(), "Rendered file");
        self.output.write(&Artifact::new(path, content)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_order() {
        let mut states = vec![RunState::Init];
        while let Some(next) = states[states.len() - 1].next() {
            states.push(next);
        }
        let names: Vec<&str> = states.iter().map(RunState::as_str).collect();
        assert_eq!(
            names,
            vec![
                "init",
                "preprocess_spec",
                "resolve_models",
                "resolve_operations",
                "post_process_models",
                "post_process_operations",
                "render",
                "done"
            ]
        );
    }
}
