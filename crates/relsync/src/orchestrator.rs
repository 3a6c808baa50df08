//! High-level driver: analysis, synthesis and output files
//!
//! The orchestrator owns one configuration and cancellation token and runs
//! a complete pass over a code model. Writing files is kept separate from
//! rendering so callers can inspect the text first.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    analysis::{AnalysisResults, run_analysis_pipeline},
    cancellation::CancellationToken,
    code_generator::{GUARD_INTERFACE, GenerationOutput, RelationshipSynthesizer},
    code_model::CodeModel,
    config::Config,
    java_codegen::{JavaRenderer, render_guard_interface},
};

/// Suffix of generated per-entity fragments
pub const FRAGMENT_SUFFIX: &str = ".relationships.java";

/// Results of one complete pass
#[derive(Debug)]
pub struct GenerationReport {
    pub analysis: AnalysisResults,
    pub output: GenerationOutput,
}

impl GenerationReport {
    /// Whether any analysis or generation diagnostic has error severity
    pub fn has_errors(&self) -> bool {
        self.analysis.diagnostics.has_errors() || self.output.diagnostics.has_errors()
    }
}

/// A rendered output file, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug)]
pub struct RelsyncOrchestrator {
    config: Config,
    cancel: CancellationToken,
}

impl RelsyncOrchestrator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally controlled cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn analyze(&self, model: &dyn CodeModel) -> Result<AnalysisResults> {
        run_analysis_pipeline(model, &self.config, &self.cancel)
    }

    /// Analyze the model and synthesize members for every entity
    pub fn generate(&self, model: &dyn CodeModel) -> Result<GenerationReport> {
        let analysis = self.analyze(model)?;
        let output = RelationshipSynthesizer::new(&analysis, &self.config).synthesize();
        Ok(GenerationReport { analysis, output })
    }

    /// Render one fragment per entity plus the guard interface if needed
    pub fn render(&self, output: &GenerationOutput) -> Vec<RenderedFile> {
        let renderer = JavaRenderer::new(self.config.indent_width);
        let mut files: Vec<RenderedFile> = output
            .entities
            .iter()
            .map(|entity| RenderedFile {
                file_name: format!("{}{FRAGMENT_SUFFIX}", entity.simple_name()),
                contents: renderer.render_entity(entity),
            })
            .collect();

        if let Some(guard) = &output.guard_interface {
            files.push(RenderedFile {
                file_name: format!("{GUARD_INTERFACE}.java"),
                contents: render_guard_interface(guard),
            });
        }
        files
    }

    /// Write rendered files into `output_dir`, creating it when missing
    pub fn write(&self, output: &GenerationOutput, output_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;

        let mut written = Vec::new();
        for file in self.render(output) {
            let path = output_dir.join(&file.file_name);
            fs::write(&path, &file.contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            debug!("Wrote {}", path.display());
            written.push(path);
        }
        info!("Wrote {} files to {}", written.len(), output_dir.display());
        Ok(written)
    }
}
