//! Typed plugin configuration, as found under `custom.Glue` in a service file.
//!
//! Keys keep the spelling users already write in their YAML (camelCase for
//! plugin options, PascalCase for AWS parameter names). Anything on a job that
//! the compiler does not recognise is captured in [`JobConfig::properties`] and
//! forwarded verbatim into the compiled resource.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GluePluginConfig {
    /// Bucket that receives every job script.
    pub bucket_deploy: String,
    #[serde(default)]
    pub create_bucket: bool,
    #[serde(default)]
    pub create_bucket_config: Option<CreateBucketOptions>,
    /// Deployment-wide script prefix, used when a job has no prefix of its own.
    #[serde(default)]
    pub s3_prefix: Option<String>,
    #[serde(default)]
    pub temp_dir_bucket: Option<String>,
    #[serde(default)]
    pub temp_dir_s3_prefix: Option<String>,
    /// `None` means "not configured", which is not the same as an empty list.
    #[serde(default)]
    pub jobs: Option<Vec<JobConfig>>,
    #[serde(default)]
    pub triggers: Option<Vec<TriggerConfig>>,
}

impl GluePluginConfig {
    pub fn trace_loaded(&self) {
        info!(
            bucket_deploy = %self.bucket_deploy,
            create_bucket = self.create_bucket,
            jobs_count = self.jobs.as_ref().map_or(0, Vec::len),
            triggers_count = self.triggers.as_ref().map_or(0, Vec::len),
            "Loaded Glue plugin config"
        );
        debug!(?self, "Glue plugin config loaded (full debug)");
    }
}

/// Options forwarded to the store's CreateBucket call.
///
/// `LocationConstraint` is a shorthand for
/// `CreateBucketConfiguration.LocationConstraint`; see
/// [`crate::compile::compile_bucket_creation_params`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBucketOptions {
    #[serde(rename = "ACL", default)]
    pub acl: Option<String>,
    #[serde(default)]
    pub location_constraint: Option<String>,
    #[serde(default)]
    pub create_bucket_configuration: Option<BucketConfiguration>,
    #[serde(default)]
    pub grant_full_control: Option<String>,
    #[serde(default)]
    pub grant_read: Option<String>,
    #[serde(rename = "GrantReadACP", default)]
    pub grant_read_acp: Option<String>,
    #[serde(default)]
    pub grant_write: Option<String>,
    #[serde(rename = "GrantWriteACP", default)]
    pub grant_write_acp: Option<String>,
    #[serde(default)]
    pub object_lock_enabled_for_bucket: Option<bool>,
    #[serde(default)]
    pub object_ownership: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketConfiguration {
    #[serde(default)]
    pub location_constraint: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    #[default]
    Spark,
    PythonShell,
    Streaming,
}

impl JobType {
    /// Value of `Command.Name` for this job type.
    pub fn command_name(self) -> &'static str {
        match self {
            JobType::Spark => "glueetl",
            JobType::PythonShell => "pythonshell",
            JobType::Streaming => "gluestreaming",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    pub name: String,
    pub script_path: PathBuf,
    #[serde(rename = "type", default)]
    pub job_type: JobType,
    /// `python<major>-<glue version>`, e.g. `python3-4.0`.
    #[serde(default)]
    pub glue_version: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub script_s3_location_prefix: Option<String>,
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(rename = "SupportFiles", default)]
    pub support_files: Option<Vec<SupportFile>>,
    #[serde(default)]
    pub temp_dir: bool,
    #[serde(rename = "MaxConcurrentRuns", default)]
    pub max_concurrent_runs: Option<u32>,
    #[serde(rename = "Connections", default)]
    pub connections: Option<Vec<String>>,
    #[serde(rename = "DefaultArguments", default)]
    pub default_arguments: Option<DefaultArguments>,
    /// Everything else (`MaxCapacity`, `WorkerType`, `Timeout`, `Tags`, ...).
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultArguments {
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub job_bookmark_option: Option<String>,
    #[serde(default)]
    pub enable_glue_datacatalog: bool,
    #[serde(default)]
    pub script_arguments: Map<String, Value>,
    #[serde(default)]
    pub custom_arguments: Map<String, Value>,
    /// Unrecognised argument keys, forwarded as written.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Auxiliary artifact staged alongside a job.
///
/// Fields stay optional here so that the staging step can reject incomplete
/// entries as a whole instead of failing at parse time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportFile {
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    #[serde(default)]
    pub s3_bucket: Option<String>,
    #[serde(default)]
    pub s3_prefix: Option<String>,
    #[serde(default)]
    pub execute_upload: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    Scheduled,
    Conditional,
    OnDemand,
}

impl TriggerType {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerType::Scheduled => "SCHEDULED",
            TriggerType::Conditional => "CONDITIONAL",
            TriggerType::OnDemand => "ON_DEMAND",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfig {
    pub name: String,
    #[serde(rename = "type", default)]
    pub trigger_type: Option<TriggerType>,
    /// Cron expression, e.g. `cron(0 12 * * ? *)`.
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub predicate: Option<TriggerPredicate>,
    #[serde(default)]
    pub actions: Vec<TriggerAction>,
    #[serde(default)]
    pub start_on_creation: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub workflow_name: Option<String>,
    #[serde(rename = "Tags", default)]
    pub tags: Option<Map<String, Value>>,
    /// Other trigger properties (`EventBatchingCondition`, ...), forwarded as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerAction {
    /// Name of the job this action starts.
    pub name: String,
    #[serde(default)]
    pub args: Option<Map<String, Value>>,
    #[serde(default)]
    pub timeout: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPredicate {
    /// `AND` or `ANY`.
    #[serde(default)]
    pub logical: Option<String>,
    #[serde(default)]
    pub conditions: Vec<TriggerCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerCondition {
    pub job_name: String,
    /// Job run state to wait for, e.g. `SUCCEEDED`.
    pub state: String,
    #[serde(default)]
    pub logical_operator: Option<String>,
}
