/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Base traits and the multi-company fundamentals loader

use crate::pipeline::{Pipeline, PipelineRun, RunState};
use crate::traits::{NameSearch, StatementSource};
use crate::{LoaderResult, ProcessTracker};
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use scr_models::NormalizedRecord;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Configuration for data loaders
#[derive(Debug, Clone)]
pub struct LoaderConfig {
  /// Companies processed at the same time
  pub max_concurrent_requests: usize,

  /// Enable progress tracking
  pub show_progress: bool,

  /// Enable process state tracking
  pub track_process: bool,
}

impl Default for LoaderConfig {
  fn default() -> Self {
    Self { max_concurrent_requests: 4, show_progress: true, track_process: true }
  }
}

/// Shared context for all loaders
pub struct LoaderContext {
  pub config: LoaderConfig,
  pub process_tracker: Option<ProcessTracker>,
}

impl LoaderContext {
  pub fn new(config: LoaderConfig) -> Self {
    Self { config, process_tracker: None }
  }

  pub fn with_process_tracker(mut self, tracker: ProcessTracker) -> Self {
    self.process_tracker = Some(tracker);
    self
  }
}

/// Base trait for all data loaders
#[async_trait]
pub trait DataLoader: Send + Sync {
  /// The type of data this loader processes
  type Input;

  /// The result type after loading
  type Output;

  /// Load data from the given input
  async fn load(&self, context: &LoaderContext, input: Self::Input) -> LoaderResult<Self::Output>;

  /// Validate input before loading
  async fn validate_input(&self, _input: &Self::Input) -> LoaderResult<()> {
    Ok(())
  }

  /// Get loader name for logging/tracking
  fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
pub struct FundamentalsLoaderInput {
  pub companies: Vec<String>,
}

/// Runs in input order, plus counts
#[derive(Debug, Clone)]
pub struct FundamentalsLoaderOutput {
  pub runs: Vec<PipelineRun>,
  pub completed: usize,
  pub partial: usize,
  pub failed: usize,
}

impl FundamentalsLoaderOutput {
  /// Records of every completed run, in input order
  pub fn records(&self) -> Vec<NormalizedRecord> {
    self.runs.iter().filter_map(|r| r.output()).flat_map(|o| o.records.iter().cloned()).collect()
  }
}

/// Runs one independent pipeline per company, several at a time
pub struct FundamentalsLoader<S, F> {
  pipeline: Arc<Pipeline<S, F>>,
}

impl<S, F> FundamentalsLoader<S, F> {
  pub fn new(pipeline: Arc<Pipeline<S, F>>) -> Self {
    Self { pipeline }
  }
}

#[async_trait]
impl<S: NameSearch + 'static, F: StatementSource + 'static> DataLoader for FundamentalsLoader<S, F> {
  type Input = FundamentalsLoaderInput;
  type Output = FundamentalsLoaderOutput;

  async fn load(&self, context: &LoaderContext, input: Self::Input) -> LoaderResult<Self::Output> {
    self.validate_input(&input).await?;
    info!("Loading fundamentals for {} companies", input.companies.len());

    let progress = if context.config.show_progress {
      let pb = ProgressBar::new(input.companies.len() as u64);
      if let Ok(style) = ProgressStyle::default_bar().template("{bar:40} {pos}/{len} {msg}") {
        pb.set_style(style);
      }
      Some(pb)
    } else {
      None
    };

    let tracker = if context.config.track_process { context.process_tracker.clone() } else { None };
    let extracted_at = Utc::now();
    let max_concurrent = context.config.max_concurrent_requests.max(1);

    let mut results: Vec<(usize, PipelineRun)> = stream::iter(input.companies.into_iter().enumerate())
      .map(|(index, company)| {
        let pipeline = self.pipeline.clone();
        let tracker = tracker.clone();
        let progress = progress.clone();

        async move {
          if let Some(t) = &tracker {
            t.start(&company).await;
          }
          if let Some(pb) = &progress {
            pb.set_message(company.clone());
          }

          let run = pipeline.run_at(&company, extracted_at).await;

          if let Some(t) = &tracker {
            t.finish(&company, &run).await;
          }
          if let Some(pb) = &progress {
            pb.inc(1);
          }
          (index, run)
        }
      })
      .buffer_unordered(max_concurrent)
      .collect()
      .await;

    if let Some(pb) = &progress {
      pb.finish_with_message("Fundamentals loading complete");
    }

    results.sort_by_key(|(index, _)| *index);
    let runs: Vec<PipelineRun> = results.into_iter().map(|(_, run)| run).collect();

    let mut completed = 0;
    let mut partial = 0;
    let mut failed = 0;
    for run in &runs {
      match (run.state(), run.output()) {
        (RunState::Complete, Some(output)) if output.manifest.is_partial() => {
          warn!("{}: partial, {} statements missing", run.input(), output.manifest.missing.len());
          partial += 1;
        }
        (RunState::Complete, _) => completed += 1,
        (state, _) => {
          error!("{}: {}", run.input(), state);
          failed += 1;
        }
      }
    }

    info!("Fundamentals loading complete: {} complete, {} partial, {} failed", completed, partial, failed);

    Ok(FundamentalsLoaderOutput { runs, completed, partial, failed })
  }

  async fn validate_input(&self, input: &Self::Input) -> LoaderResult<()> {
    if input.companies.iter().any(|c| c.trim().is_empty()) {
      return Err(crate::LoaderError::InvalidData("blank company name".to_string()));
    }
    Ok(())
  }

  fn name(&self) -> &'static str {
    "FundamentalsLoader"
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_loader_config_default() {
    let config = LoaderConfig::default();
    assert_eq!(config.max_concurrent_requests, 4);
    assert!(config.show_progress);
    assert!(config.track_process);
  }

  #[test]
  fn test_loader_context_with_process_tracker() {
    let context = LoaderContext::new(LoaderConfig::default());
    assert!(context.process_tracker.is_none());

    let context = context.with_process_tracker(ProcessTracker::new());
    assert!(context.process_tracker.is_some());
  }
}
