//! Materializes the jobs and triggers of a run from the plugin configuration.

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::{GluePluginConfig, JobConfig, SupportFile, TriggerConfig, TriggerType};

/// Logical ID of the synthesized shared temp bucket.
pub const GLUE_TEMP_BUCKET_REF: &str = "GlueJobTempBucket";

/// Where a job's `--TempDir` points.
#[derive(Debug, Clone, PartialEq)]
pub enum TempDirLocation {
    /// A concrete `s3://` URI inside the configured temp bucket.
    Bucket(String),
    /// A path inside the shared temp bucket synthesized for this run.
    SharedTempBucket { key: String },
}

impl TempDirLocation {
    /// Template value for `DefaultArguments.--TempDir`.
    pub fn to_template_value(&self) -> Value {
        match self {
            TempDirLocation::Bucket(uri) => Value::String(uri.clone()),
            TempDirLocation::SharedTempBucket { key } => json!({
                "Fn::Join": ["", ["s3://", { "Ref": GLUE_TEMP_BUCKET_REF }, format!("/{key}")]]
            }),
        }
    }

    pub fn needs_shared_bucket(&self) -> bool {
        matches!(self, TempDirLocation::SharedTempBucket { .. })
    }
}

/// A job ready for staging: its configuration plus resolved defaults.
#[derive(Debug, Clone)]
pub struct GlueJob {
    pub config: JobConfig,
    pub temp_dir: Option<TempDirLocation>,
}

impl GlueJob {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Logical ID the compiled job is filed under.
    pub fn resource_name(&self) -> String {
        let raw = self
            .config
            .resource_name
            .as_deref()
            .unwrap_or(&self.config.name);
        crate::naming::to_resource_name(raw)
    }

    /// Attach the staged script URI; the only way to obtain a compilable job.
    pub fn staged(self, script_location: String) -> StagedJob {
        StagedJob {
            job: self,
            script_location,
        }
    }
}

/// A job whose script has been uploaded.
#[derive(Debug, Clone)]
pub struct StagedJob {
    pub job: GlueJob,
    /// `s3://<bucket>/<key>` of the staged script.
    pub script_location: String,
}

/// A trigger with its type discriminator resolved.
#[derive(Debug, Clone)]
pub struct GlueTrigger {
    pub config: TriggerConfig,
    pub trigger_type: TriggerType,
}

impl GlueTrigger {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn resource_name(&self) -> String {
        crate::naming::to_resource_name(&self.config.name)
    }
}

/// Jobs in declaration order. Duplicate names are kept; the later one wins
/// when fragments are recorded.
pub fn expand_jobs(config: &GluePluginConfig) -> Vec<GlueJob> {
    let Some(jobs) = config.jobs.as_ref() else {
        return Vec::new();
    };
    jobs.iter()
        .map(|job| {
            let temp_dir = job.temp_dir.then(|| temp_dir_location(config, job));
            debug!(job = %job.name, ?temp_dir, "Expanded job");
            GlueJob {
                config: job.clone(),
                temp_dir,
            }
        })
        .collect()
}

fn temp_dir_location(config: &GluePluginConfig, job: &JobConfig) -> TempDirLocation {
    let key = format!(
        "{}{}",
        config.temp_dir_s3_prefix.as_deref().unwrap_or(""),
        job.name
    );
    match config.temp_dir_bucket.as_deref() {
        Some(bucket) => TempDirLocation::Bucket(format!("s3://{bucket}/{key}")),
        None => TempDirLocation::SharedTempBucket { key },
    }
}

/// Triggers in declaration order.
pub fn expand_triggers(config: &GluePluginConfig) -> Vec<GlueTrigger> {
    let Some(triggers) = config.triggers.as_ref() else {
        return Vec::new();
    };
    triggers
        .iter()
        .map(|trigger| {
            let trigger_type = resolve_trigger_type(trigger);
            info!(trigger = %trigger.name, trigger_type = trigger_type.as_str(), "Expanded trigger");
            GlueTrigger {
                config: trigger.clone(),
                trigger_type,
            }
        })
        .collect()
}

fn resolve_trigger_type(trigger: &TriggerConfig) -> TriggerType {
    if let Some(explicit) = trigger.trigger_type {
        return explicit;
    }
    if trigger.schedule.is_some() {
        TriggerType::Scheduled
    } else if trigger.predicate.is_some() {
        TriggerType::Conditional
    } else {
        TriggerType::OnDemand
    }
}

/// Support files declared on a job, or an empty slice.
pub fn expand_support_files(job: &GlueJob) -> &[SupportFile] {
    job.config.support_files.as_deref().unwrap_or(&[])
}
