//! Configuration loading from a TOML file and bootstrapping from it.

mod common;

use std::io::Write;

use tokio_test::assert_ok;
use topic_coordinator::config::{ConfigManager, LockBackendKind};
use topic_coordinator::orchestration::CoordinatorSystem;
use topic_coordinator::test_helpers::FakeCollaborators;

#[tokio::test]
async fn test_bootstrap_from_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[lock]
backend = "memory"
instance_id = "worker-a"
spin_timeout_ms = 500
spin_interval_ms = 50

[stop_task]
max_concurrent_topics = 3

[consumer]
worker_count = 2
"#
    )
    .unwrap();

    let manager = ConfigManager::load_with_env(Some(file.path()), "test").unwrap();
    let config = manager.config();
    assert_eq!(config.lock.backend, LockBackendKind::Memory);
    assert_eq!(config.lock.instance_id, "worker-a");
    assert_eq!(config.stop_task.max_concurrent_topics, 3);
    assert_eq!(config.consumer.worker_count, 2);
    assert_eq!(config.queue_drain.lock_key_prefix, "drain");

    let system = CoordinatorSystem::bootstrap(config, FakeCollaborators::new().collaborators()).await;
    let system = assert_ok!(system);
    assert!(system.lock_service().new_owner_token().starts_with("worker-a:"));
}

#[test]
fn test_invalid_file_values_fail_validation() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[queue_drain]\nlock_ttl_seconds = 0").unwrap();

    assert!(ConfigManager::load_with_env(Some(file.path()), "test").is_err());
}
