use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use glue_deploy::load_config::load_config;

/// A serverless-style file with a `custom.Glue` block yields a typed config.
#[test]
fn test_load_config_reads_custom_glue_block() {
    let config_yaml = r#"
service: analytics
custom:
  Glue:
    bucketDeploy: deploy-bucket
    s3Prefix: glue/
    createBucket: true
    createBucketConfig:
      LocationConstraint: eu-west-1
    jobs:
      - name: etl1
        scriptPath: jobs/etl1.py
        type: spark
        glueVersion: python3-4.0
        WorkerType: G.1X
        SupportFiles:
          - local_path: libs
            s3_bucket: support-bucket
            s3_prefix: libs/
            execute_upload: true
    triggers:
      - name: nightly
        schedule: cron(0 2 * * ? *)
        actions:
          - name: etl1
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path())
        .expect("Config should load")
        .expect("Glue block should be found");

    assert_eq!(config.bucket_deploy, "deploy-bucket");
    assert_eq!(config.s3_prefix.as_deref(), Some("glue/"));
    assert!(config.create_bucket);
    let jobs = config.jobs.as_ref().expect("jobs configured");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].script_path, PathBuf::from("jobs/etl1.py"));
    assert_eq!(jobs[0].properties["WorkerType"], "G.1X");
    let support = jobs[0].support_files.as_ref().unwrap();
    assert_eq!(support[0].execute_upload, Some(true));
    assert_eq!(config.triggers.as_ref().unwrap()[0].actions[0].name, "etl1");
}

/// A top-level `Glue` key is accepted as well.
#[test]
fn test_load_config_accepts_top_level_block() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "Glue:\n  bucketDeploy: b\n").unwrap();

    let config = load_config(config_file.path()).unwrap().unwrap();
    assert_eq!(config.bucket_deploy, "b");
    assert!(config.jobs.is_none(), "absent jobs stay unconfigured");
    assert!(config.triggers.is_none());
}

/// A file without the plugin block means the plugin does not apply.
#[test]
fn test_load_config_without_glue_block_is_none() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "service: other\ncustom:\n  foo: bar\n").unwrap();

    let config = load_config(config_file.path()).expect("Loader should succeed");
    assert!(config.is_none());
}

/// If the config file is not valid YAML, load_config errors and reports as such.
#[test]
fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

/// A Glue block without the required deploy bucket is rejected at load time.
#[test]
fn test_load_config_errors_on_missing_bucket() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "custom:\n  Glue:\n    s3Prefix: glue/\n").unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    assert!(
        format!("{err:#}").contains("bucketDeploy"),
        "Missing field expected, got: {err:#}"
    );
}

#[test]
fn test_load_config_errors_for_missing_file() {
    let err = load_config("definitely/not/here.yml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
