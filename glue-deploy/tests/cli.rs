use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Writes a service file with one job and its script into `root`.
fn create_service(root: &Path, glue_block: &str) -> std::path::PathBuf {
    fs::create_dir_all(root.join("jobs")).expect("Creating jobs dir failed");
    fs::write(root.join("jobs/etl1.py"), "print('etl1')").expect("Writing script failed");
    let config = root.join("serverless.yml");
    fs::write(&config, format!("service: analytics\ncustom:\n{glue_block}"))
        .expect("Writing temp config failed");
    config
}

#[test]
fn package_dry_run_writes_compiled_template() {
    let root = tempdir().unwrap();
    let config = create_service(
        root.path(),
        "  Glue:\n    bucketDeploy: deploy-bucket\n    jobs:\n      - name: etl1\n        scriptPath: jobs/etl1.py\n        scriptS3LocationPrefix: scripts/\n",
    );
    let output = root.path().join("template.json");

    let mut cmd = Command::cargo_bin("glue-deploy").expect("Binary exists");
    cmd.arg("package")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .arg("--dry-run");
    cmd.assert().success();

    let rendered: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        rendered["Resources"]["Etl1"]["Properties"]["Command"]["ScriptLocation"],
        "s3://deploy-bucket/scripts/etl1.py"
    );
    assert!(rendered.get("Outputs").is_none());
}

#[test]
fn package_dry_run_prints_template_to_stdout() {
    let root = tempdir().unwrap();
    let config = create_service(
        root.path(),
        "  Glue:\n    bucketDeploy: deploy-bucket\n    s3Prefix: glue/\n    jobs:\n      - name: etl1\n        scriptPath: jobs/etl1.py\n",
    );

    let mut cmd = Command::cargo_bin("glue-deploy").expect("Binary exists");
    cmd.arg("package").arg("--config").arg(&config).arg("--dry-run");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("s3://deploy-bucket/glue/etl1.py"));
}

#[test]
fn package_fails_without_any_script_prefix() {
    let root = tempdir().unwrap();
    let config = create_service(
        root.path(),
        "  Glue:\n    bucketDeploy: deploy-bucket\n    jobs:\n      - name: etl1\n        scriptPath: jobs/etl1.py\n",
    );

    let mut cmd = Command::cargo_bin("glue-deploy").expect("Binary exists");
    cmd.arg("package").arg("--config").arg(&config).arg("--dry-run");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("s3Prefix"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use glue_deploy::cli::{run, Cli, Commands};

    // A missing config file still passes through the run entrypoint.
    let cli = Cli {
        command: Commands::Package {
            config: std::path::PathBuf::from("dummy.yaml"),
            output: None,
            service_root: None,
            region: None,
            dry_run: true,
        },
    };

    let result = run(cli).await;
    assert!(result.is_err(), "dummy.yaml does not exist");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}

#[tokio::test]
async fn package_with_dry_run_store_records_uploads() {
    use glue_deploy::cli::package;
    use glue_deploy::dry_run::DryRunStore;
    use glue_deploy::load_config::load_config;
    use glue_deploy_core::template::TemplateSections;

    let root = tempdir().unwrap();
    let config = create_service(
        root.path(),
        "  Glue:\n    bucketDeploy: deploy-bucket\n    s3Prefix: glue/\n    jobs:\n      - name: etl1\n        scriptPath: jobs/etl1.py\n        tempDir: true\n",
    );
    let plugin_config = load_config(&config).unwrap();

    let store = DryRunStore::new();
    let mut template = TemplateSections::new();
    let report = package(&store, plugin_config.as_ref(), root.path(), &mut template)
        .await
        .expect("package should succeed")
        .expect("Glue config present");

    assert_eq!(store.uploads(), vec!["s3://deploy-bucket/glue/etl1.py".to_string()]);
    assert!(report.temp_bucket.is_some());
    assert_eq!(
        template.to_cloudformation()["Outputs"]["GlueJobTempBucketName"]["Value"]["Ref"],
        "GlueJobTempBucket"
    );
}
