//! Pure compilation of jobs, triggers and buckets into CloudFormation fragments.

use serde_json::{json, Map, Value};

use crate::config::{DefaultArguments, GluePluginConfig};
use crate::contract::{CreateBucketParams, ResourceFragment};
use crate::expand::{GlueTrigger, StagedJob};

pub const GLUE_JOB_TYPE: &str = "AWS::Glue::Job";
pub const GLUE_TRIGGER_TYPE: &str = "AWS::Glue::Trigger";
pub const S3_BUCKET_TYPE: &str = "AWS::S3::Bucket";

/// Compile a staged job into an `AWS::Glue::Job` fragment.
///
/// Unrecognised job keys are forwarded as-is; derived keys take precedence
/// over a pass-through key of the same name.
pub fn compile_job(staged: &StagedJob) -> ResourceFragment {
    let job = &staged.job.config;
    let mut properties = job.properties.clone();

    let (python_version, glue_version) = job
        .glue_version
        .as_deref()
        .map(parse_glue_version)
        .unwrap_or((None, None));

    let mut command = Map::new();
    command.insert("Name".into(), json!(job.job_type.command_name()));
    command.insert("ScriptLocation".into(), json!(staged.script_location));
    if let Some(python) = python_version {
        command.insert("PythonVersion".into(), json!(python));
    }

    properties.insert("Name".into(), json!(job.name));
    properties.insert("Command".into(), Value::Object(command));
    if let Some(role) = &job.role {
        properties.insert("Role".into(), json!(role));
    }
    if let Some(glue) = glue_version {
        properties.insert("GlueVersion".into(), json!(glue));
    }

    let mut arguments = default_arguments(job.default_arguments.as_ref());
    if let Some(temp_dir) = &staged.job.temp_dir {
        arguments.insert("--TempDir".into(), temp_dir.to_template_value());
    }
    if !arguments.is_empty() {
        properties.insert("DefaultArguments".into(), Value::Object(arguments));
    }

    if let Some(runs) = job.max_concurrent_runs {
        properties.insert(
            "ExecutionProperty".into(),
            json!({ "MaxConcurrentRuns": runs }),
        );
    }
    if let Some(connections) = &job.connections {
        properties.insert(
            "Connections".into(),
            json!({ "Connections": connections }),
        );
    }

    json!({ "Type": GLUE_JOB_TYPE, "Properties": properties })
}

/// Split `python3-4.0` into `("3", "4.0")`. A bare version is taken as the
/// Glue version.
fn parse_glue_version(raw: &str) -> (Option<String>, Option<String>) {
    match raw.strip_prefix("python").and_then(|rest| rest.split_once('-')) {
        Some((python, glue)) => (
            (!python.is_empty()).then(|| python.to_string()),
            (!glue.is_empty()).then(|| glue.to_string()),
        ),
        None => (None, Some(raw.to_string())),
    }
}

fn default_arguments(args: Option<&DefaultArguments>) -> Map<String, Value> {
    let Some(args) = args else {
        return Map::new();
    };
    let mut out = args.extra.clone();
    if let Some(class) = &args.class {
        out.insert("--class".into(), json!(class));
    }
    if let Some(bookmark) = &args.job_bookmark_option {
        out.insert("--job-bookmark-option".into(), json!(bookmark));
    }
    if args.enable_glue_datacatalog {
        out.insert("--enable-glue-datacatalog".into(), json!("true"));
    }
    for (key, value) in args.script_arguments.iter().chain(&args.custom_arguments) {
        out.insert(key.clone(), value.clone());
    }
    out
}

/// Compile a trigger into an `AWS::Glue::Trigger` fragment.
///
/// As for jobs, unrecognised trigger and action keys are forwarded and lose
/// to derived keys of the same name.
pub fn compile_trigger(trigger: &GlueTrigger) -> ResourceFragment {
    let config = &trigger.config;

    let actions: Vec<Value> = config
        .actions
        .iter()
        .map(|action| {
            let mut out = action.extra.clone();
            out.insert("JobName".into(), json!(action.name));
            if let Some(args) = &action.args {
                out.insert("Arguments".into(), Value::Object(args.clone()));
            }
            if let Some(timeout) = action.timeout {
                out.insert("Timeout".into(), json!(timeout));
            }
            Value::Object(out)
        })
        .collect();

    let mut properties = config.extra.clone();
    properties.insert("Name".into(), json!(config.name));
    properties.insert("Type".into(), json!(trigger.trigger_type.as_str()));
    properties.insert("Actions".into(), Value::Array(actions));

    if let Some(schedule) = &config.schedule {
        properties.insert("Schedule".into(), json!(schedule));
    }
    if let Some(predicate) = &config.predicate {
        let conditions: Vec<Value> = predicate
            .conditions
            .iter()
            .map(|c| {
                json!({
                    "JobName": c.job_name,
                    "State": c.state,
                    "LogicalOperator": c.logical_operator.as_deref().unwrap_or("EQUALS"),
                })
            })
            .collect();
        let mut out = Map::new();
        if let Some(logical) = &predicate.logical {
            out.insert("Logical".into(), json!(logical));
        }
        out.insert("Conditions".into(), Value::Array(conditions));
        properties.insert("Predicate".into(), Value::Object(out));
    }
    if let Some(start) = config.start_on_creation {
        properties.insert("StartOnCreation".into(), json!(start));
    }
    if let Some(description) = &config.description {
        properties.insert("Description".into(), json!(description));
    }
    if let Some(workflow) = &config.workflow_name {
        properties.insert("WorkflowName".into(), json!(workflow));
    }
    if let Some(tags) = &config.tags {
        properties.insert("Tags".into(), Value::Object(tags.clone()));
    }

    json!({ "Type": GLUE_TRIGGER_TYPE, "Properties": properties })
}

/// Minimal `AWS::S3::Bucket` fragment.
pub fn compile_bucket(name: &str) -> ResourceFragment {
    json!({ "Type": S3_BUCKET_TYPE, "Properties": { "BucketName": name } })
}

/// Output entry exposing the value of another logical ID.
pub fn compile_ref_output(logical_id: &str) -> ResourceFragment {
    json!({ "Value": { "Ref": logical_id } })
}

/// Params for creating the deploy bucket.
///
/// The `LocationConstraint` shorthand moves into
/// `CreateBucketConfiguration.LocationConstraint`, replacing any nested value.
/// The configuration itself is left untouched.
pub fn compile_bucket_creation_params(config: &GluePluginConfig) -> CreateBucketParams {
    let mut params = CreateBucketParams {
        bucket: config.bucket_deploy.clone(),
        ..Default::default()
    };
    let Some(options) = config.create_bucket_config.as_ref() else {
        return params;
    };

    params.acl = options.acl.clone();
    params.create_bucket_configuration = match &options.location_constraint {
        Some(constraint) => Some(crate::config::BucketConfiguration {
            location_constraint: Some(constraint.clone()),
        }),
        None => options.create_bucket_configuration.clone(),
    };
    params.grant_full_control = options.grant_full_control.clone();
    params.grant_read = options.grant_read.clone();
    params.grant_read_acp = options.grant_read_acp.clone();
    params.grant_write = options.grant_write.clone();
    params.grant_write_acp = options.grant_write_acp.clone();
    params.object_lock_enabled_for_bucket = options.object_lock_enabled_for_bucket;
    params.object_ownership = options.object_ownership.clone();
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_glue_versions() {
        assert_eq!(
            parse_glue_version("python3-4.0"),
            (Some("3".into()), Some("4.0".into()))
        );
        assert_eq!(parse_glue_version("4.0"), (None, Some("4.0".into())));
    }

    #[test]
    fn bucket_fragment_is_minimal() {
        assert_eq!(
            compile_bucket("my-bucket"),
            json!({ "Type": "AWS::S3::Bucket", "Properties": { "BucketName": "my-bucket" } })
        );
    }
}
