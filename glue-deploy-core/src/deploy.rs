//! High-level pipeline: stages Glue job artifacts and records the compiled template.
//!
//! This module provides the top-level orchestration for one deployment run. It:
//!   - Optionally provisions the deploy bucket (existence check, then create)
//!   - Uploads each job's script and support files via a [`BlobStore`]
//!   - Compiles each staged job and records it in a [`TemplateAccumulator`]
//!   - Synthesizes a shared temp bucket when jobs need one and none is configured
//!   - Compiles and records all triggers
//!
//! # Major Types
//! - [`Deployer`]: holds the store and the directory local paths are relative to
//! - [`DeployReport`]: what was staged and recorded, for the caller to print or audit
//!
//! # Responsibilities
//! - Fail-fast orchestration: the first error aborts the run. Uploads already
//!   made and entries already recorded are left in place; the accumulator must
//!   then be discarded by the caller.
//! - Does not mutate the configuration: the staged script location lives on
//!   [`StagedJob`], bucket params are built by a pure transform.
//! - Jobs are processed in declaration order; uploads of one job's support
//!   files run concurrently and are all awaited before the job is compiled.
//!
//! # Navigation
//! - Main entrypoint: [`Deployer::run`]

use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::compile::{
    compile_bucket, compile_bucket_creation_params, compile_job, compile_ref_output,
    compile_trigger,
};
use crate::config::{GluePluginConfig, SupportFile};
use crate::contract::{BlobStore, TemplateAccumulator};
use crate::error::DeployError;
use crate::expand::{
    expand_jobs, expand_support_files, expand_triggers, GlueJob, StagedJob, TempDirLocation,
    GLUE_TEMP_BUCKET_REF,
};
use crate::naming::random_suffix;
use crate::template::{OUTPUTS, RESOURCES};

/// Output name exposing the synthesized temp bucket.
pub const GLUE_TEMP_BUCKET_OUTPUT: &str = "GlueJobTempBucketName";

/// Summary of a completed run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DeployReport {
    pub jobs: Vec<JobReport>,
    pub triggers: Vec<String>,
    /// Physical name of the synthesized temp bucket, if one was added.
    pub temp_bucket: Option<String>,
    /// Whether the deploy bucket was created during this run.
    pub bucket_created: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub resource_name: String,
    pub script_location: String,
    pub support_objects: Vec<String>,
}

/// A support file entry with every required field present.
#[derive(Debug, Clone)]
struct CheckedSupportFile<'a> {
    local_path: &'a Path,
    bucket: &'a str,
    prefix: &'a str,
    execute_upload: bool,
}

/// One object to upload.
#[derive(Debug)]
struct PendingUpload {
    path: PathBuf,
    bucket: String,
    key: String,
}

pub fn s3_uri(bucket: &str, key: &str) -> String {
    format!("s3://{bucket}/{key}")
}

pub struct Deployer<'s, S: BlobStore + ?Sized> {
    store: &'s S,
    service_root: PathBuf,
}

impl<'s, S: BlobStore + ?Sized> Deployer<'s, S> {
    /// `service_root` is the directory relative local paths are resolved against.
    pub fn new(store: &'s S, service_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            service_root: service_root.into(),
        }
    }

    /// Run the whole pipeline.
    ///
    /// Returns `Ok(None)` when there is no plugin configuration, which means
    /// the plugin does not apply to this service.
    pub async fn run<T>(
        &self,
        config: Option<&GluePluginConfig>,
        template: &mut T,
    ) -> Result<Option<DeployReport>, DeployError>
    where
        T: TemplateAccumulator + ?Sized,
    {
        let Some(config) = config else {
            info!("[DEPLOY] Glue config not found, nothing to do");
            return Ok(None);
        };
        info!("[DEPLOY] Glue config detected");

        let mut report = DeployReport::default();
        self.process_jobs(config, template, &mut report).await?;
        self.process_triggers(config, template, &mut report)?;

        info!(
            jobs = report.jobs.len(),
            triggers = report.triggers.len(),
            temp_bucket = ?report.temp_bucket,
            "[DEPLOY] Run complete"
        );
        Ok(Some(report))
    }

    async fn process_jobs<T>(
        &self,
        config: &GluePluginConfig,
        template: &mut T,
        report: &mut DeployReport,
    ) -> Result<(), DeployError>
    where
        T: TemplateAccumulator + ?Sized,
    {
        if config.jobs.is_none() {
            info!("[DEPLOY] Jobs not found");
            return Ok(());
        }
        info!("[DEPLOY] Processing jobs");
        let jobs = expand_jobs(config);
        let resource_names = jobs
            .iter()
            .map(|job| checked_resource_name(job.name(), job.resource_name()))
            .collect::<Result<Vec<_>, _>>()?;

        if config.create_bucket {
            report.bucket_created = self.ensure_deploy_bucket(config).await?;
        }

        let mut needs_temp_bucket = false;
        for (job, resource_name) in jobs.into_iter().zip(resource_names) {
            needs_temp_bucket |= job
                .temp_dir
                .as_ref()
                .is_some_and(TempDirLocation::needs_shared_bucket);

            if job.config.resource_name.is_some() {
                info!(job = %job.name(), %resource_name, "[DEPLOY] Resource name specified");
            } else {
                info!(job = %job.name(), %resource_name, "[DEPLOY] Resource name not specified, using job name");
            }

            let staged = self.stage_script(config, job).await?;
            let support_objects = self.stage_support_files(&staged.job).await?;

            template.append(RESOURCES, &resource_name, compile_job(&staged));
            report.jobs.push(JobReport {
                resource_name,
                script_location: staged.script_location,
                support_objects,
            });
        }

        if needs_temp_bucket {
            let bucket_name = format!("GlueTempBucket-{}", random_suffix(8)).to_lowercase();
            info!(bucket = %bucket_name, "[DEPLOY] Adding shared temp bucket");
            template.append(RESOURCES, GLUE_TEMP_BUCKET_REF, compile_bucket(&bucket_name));
            template.append(
                OUTPUTS,
                GLUE_TEMP_BUCKET_OUTPUT,
                compile_ref_output(GLUE_TEMP_BUCKET_REF),
            );
            report.temp_bucket = Some(bucket_name);
        }
        Ok(())
    }

    fn process_triggers<T>(
        &self,
        config: &GluePluginConfig,
        template: &mut T,
        report: &mut DeployReport,
    ) -> Result<(), DeployError>
    where
        T: TemplateAccumulator + ?Sized,
    {
        if config.triggers.is_none() {
            info!("[DEPLOY] Triggers not found");
            return Ok(());
        }
        info!("[DEPLOY] Processing triggers");
        let triggers = expand_triggers(config);
        let resource_names = triggers
            .iter()
            .map(|trigger| checked_resource_name(trigger.name(), trigger.resource_name()))
            .collect::<Result<Vec<_>, _>>()?;
        for (trigger, resource_name) in triggers.iter().zip(resource_names) {
            debug!(trigger = %trigger.name(), %resource_name, "[DEPLOY] Recording trigger");
            template.append(RESOURCES, &resource_name, compile_trigger(trigger));
            report.triggers.push(resource_name);
        }
        Ok(())
    }

    /// Create the deploy bucket unless it exists. Returns whether it was created.
    pub async fn ensure_deploy_bucket(&self, config: &GluePluginConfig) -> Result<bool, DeployError> {
        let params = compile_bucket_creation_params(config);
        let exists = self
            .store
            .bucket_exists(&params.bucket)
            .await
            .map_err(|source| {
                error!(bucket = %params.bucket, error = ?source, "[DEPLOY][ERROR] Bucket existence check failed");
                DeployError::Store {
                    operation: "bucket_exists",
                    target: params.bucket.clone(),
                    source,
                }
            })?;
        if exists {
            info!(bucket = %params.bucket, "[DEPLOY] Deploy bucket exists");
            return Ok(false);
        }

        info!(bucket = %params.bucket, "[DEPLOY] Bucket doesn't exist, creating it");
        self.store.create_bucket(&params).await.map_err(|source| {
            error!(bucket = %params.bucket, error = ?source, "[DEPLOY][ERROR] Bucket creation failed");
            DeployError::Store {
                operation: "create_bucket",
                target: params.bucket.clone(),
                source,
            }
        })?;
        info!(bucket = %params.bucket, "[DEPLOY] Bucket created");
        Ok(true)
    }

    /// Upload the job script and bind its staged location to the job.
    ///
    /// The job's own prefix wins over the deployment-wide one; having neither
    /// is a configuration error raised before anything is read or uploaded.
    pub async fn stage_script(
        &self,
        config: &GluePluginConfig,
        job: GlueJob,
    ) -> Result<StagedJob, DeployError> {
        let prefix = job
            .config
            .script_s3_location_prefix
            .as_deref()
            .or(config.s3_prefix.as_deref())
            .ok_or_else(|| {
                error!(job = %job.name(), "[DEPLOY][ERROR] No script prefix configured");
                DeployError::MissingScriptPrefix {
                    job: job.name().to_string(),
                }
            })?;

        let key = format!("{prefix}{}", file_name(&job.config.script_path));
        let bucket = config.bucket_deploy.as_str();
        let path = self.resolve(&job.config.script_path);

        let body = read_artifact(&path).await?;
        self.put(bucket, &key, body).await?;

        let location = s3_uri(bucket, &key);
        info!(job = %job.name(), %location, "[DEPLOY] Uploaded job script");
        Ok(job.staged(location))
    }

    /// Upload the job's support files and return their staged URIs.
    ///
    /// All entries are checked for completeness before any of them is acted on.
    pub async fn stage_support_files(&self, job: &GlueJob) -> Result<Vec<String>, DeployError> {
        let entries = expand_support_files(job);
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        info!(job = %job.name(), count = entries.len(), "[DEPLOY] Processing support files");

        let checked = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| check_support_file(job.name(), index, entry))
            .collect::<Result<Vec<_>, _>>()?;

        let mut pending = Vec::new();
        for entry in &checked {
            if !entry.execute_upload {
                info!(local_path = %entry.local_path.display(), "[DEPLOY] Skipping upload for support file");
                continue;
            }
            pending.extend(self.collect_uploads(entry).await?);
        }

        let uploads = pending.iter().map(|upload| async move {
            let body = read_artifact(&upload.path).await?;
            self.put(&upload.bucket, &upload.key, body).await?;
            let location = s3_uri(&upload.bucket, &upload.key);
            info!(local_path = %upload.path.display(), %location, "[DEPLOY] Uploaded support file");
            Ok::<_, DeployError>(location)
        });
        try_join_all(uploads).await
    }

    /// Expand one support file entry into the objects it uploads: the file
    /// itself, or every direct child file of a directory.
    async fn collect_uploads(
        &self,
        entry: &CheckedSupportFile<'_>,
    ) -> Result<Vec<PendingUpload>, DeployError> {
        let path = self.resolve(entry.local_path);
        let metadata = tokio::fs::metadata(&path).await.map_err(|source| io_error(&path, source))?;
        let upload = |path: PathBuf| PendingUpload {
            key: format!("{}{}", entry.prefix, file_name(&path)),
            bucket: entry.bucket.to_string(),
            path,
        };

        if metadata.is_file() {
            return Ok(vec![upload(path)]);
        }
        if !metadata.is_dir() {
            warn!(local_path = %path.display(), "[DEPLOY] Support file is neither a file nor a directory, skipping");
            return Ok(Vec::new());
        }

        info!(local_path = %path.display(), "[DEPLOY] Uploading all files in directory");
        let mut children = Vec::new();
        let mut dir = tokio::fs::read_dir(&path)
            .await
            .map_err(|source| io_error(&path, source))?;
        while let Some(child) = dir
            .next_entry()
            .await
            .map_err(|source| io_error(&path, source))?
        {
            let child_path = child.path();
            let child_meta = tokio::fs::metadata(&child_path)
                .await
                .map_err(|source| io_error(&child_path, source))?;
            if child_meta.is_file() {
                children.push(child_path);
            } else {
                debug!(path = %child_path.display(), "[DEPLOY] Not descending into nested entry");
            }
        }
        children.sort();
        Ok(children.into_iter().map(upload).collect())
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), DeployError> {
        self.store.put_object(bucket, key, body).await.map_err(|source| {
            error!(%bucket, %key, error = ?source, "[DEPLOY][ERROR] Upload failed");
            DeployError::Store {
                operation: "put_object",
                target: s3_uri(bucket, key),
                source,
            }
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.service_root.join(path)
        }
    }
}

fn check_support_file<'a>(
    job: &str,
    index: usize,
    entry: &'a SupportFile,
) -> Result<CheckedSupportFile<'a>, DeployError> {
    match (
        entry.local_path.as_deref(),
        entry.s3_bucket.as_deref(),
        entry.s3_prefix.as_deref(),
        entry.execute_upload,
    ) {
        (Some(local_path), Some(bucket), Some(prefix), Some(execute_upload)) => {
            Ok(CheckedSupportFile {
                local_path,
                bucket,
                prefix,
                execute_upload,
            })
        }
        _ => {
            let missing: Vec<&str> = [
                ("local_path", entry.local_path.is_none()),
                ("s3_bucket", entry.s3_bucket.is_none()),
                ("s3_prefix", entry.s3_prefix.is_none()),
                ("execute_upload", entry.execute_upload.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, absent)| absent.then_some(field))
            .collect();
            error!(job, index, ?missing, "[DEPLOY][ERROR] Incomplete support file entry");
            Err(DeployError::IncompleteSupportFile {
                job: job.to_string(),
                index,
                missing: missing.join(", "),
            })
        }
    }
}

/// Names made only of separators format to an empty logical ID.
fn checked_resource_name(name: &str, resource_name: String) -> Result<String, DeployError> {
    if resource_name.is_empty() {
        error!(configured_name = name, "[DEPLOY] Name does not yield a resource name");
        return Err(DeployError::EmptyResourceName {
            name: name.to_string(),
        });
    }
    Ok(resource_name)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

async fn read_artifact(path: &Path) -> Result<Vec<u8>, DeployError> {
    tokio::fs::read(path).await.map_err(|source| {
        error!(path = %path.display(), error = ?source, "[DEPLOY][ERROR] Failed to read artifact");
        io_error(path, source)
    })
}

fn io_error(path: &Path, source: std::io::Error) -> DeployError {
    DeployError::Io {
        path: path.to_path_buf(),
        source,
    }
}
