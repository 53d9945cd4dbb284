use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use fleet_domain::{
    action_queue, Action, ActionExecutor, ActionStatus, ActionTracker, ActionType,
    CreateActionInput, DeviceManagementService, DeviceRegistry, DeviceStatus, DomainError,
    InMemoryActionTracker, InMemoryDeviceRegistry, RegisterDeviceInput, UpdateEffect,
};

/// Update effect that completes instantly.
struct InstantEffect;

#[async_trait]
impl UpdateEffect for InstantEffect {
    async fn apply(&self, _action: &Action) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Update effect that blocks until the test releases it, holding the action
/// in its Running state.
struct GatedEffect {
    release: watch::Receiver<bool>,
}

#[async_trait]
impl UpdateEffect for GatedEffect {
    async fn apply(&self, _action: &Action) -> anyhow::Result<()> {
        let mut release = self.release.clone();
        while !*release.borrow() {
            release.changed().await?;
        }
        Ok(())
    }
}

struct Harness {
    service: Arc<DeviceManagementService>,
    registry: Arc<InMemoryDeviceRegistry>,
    tracker: Arc<InMemoryActionTracker>,
    shutdown: CancellationToken,
    executor_handle: tokio::task::JoinHandle<()>,
}

impl Harness {
    fn start(effect: Arc<dyn UpdateEffect>) -> Self {
        let registry = Arc::new(InMemoryDeviceRegistry::new());
        let tracker = Arc::new(InMemoryActionTracker::new());
        let (dispatcher, queue) = action_queue(16);

        let executor = ActionExecutor::new(registry.clone(), tracker.clone(), effect, queue);
        let shutdown = CancellationToken::new();
        let executor_handle = tokio::spawn(executor.run(shutdown.clone()));

        let service = Arc::new(DeviceManagementService::new(
            registry.clone(),
            tracker.clone(),
            Arc::new(dispatcher),
        ));

        Self {
            service,
            registry,
            tracker,
            shutdown,
            executor_handle,
        }
    }

    async fn register(&self, device_id: &str, version: &str) {
        self.service
            .register_device(RegisterDeviceInput {
                device_id: device_id.to_string(),
                initial_firmware_version: version.to_string(),
            })
            .await
            .unwrap();
    }

    async fn initiate_update(&self, device_id: &str, target: &str) -> Result<Action, DomainError> {
        self.service
            .initiate_action(CreateActionInput {
                device_id: device_id.to_string(),
                action_type: ActionType::SoftwareUpdate,
                parameters: target.to_string(),
            })
            .await
    }

    async fn wait_for_action_status(&self, action_id: &str, expected: ActionStatus) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let action = self.service.get_action_status(action_id).await.unwrap();
            if action.status == expected {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "action {} never reached {:?}, last seen {:?}",
                action_id,
                expected,
                action.status
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    async fn stop(self) {
        self.shutdown.cancel();
        self.executor_handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_software_update_end_to_end() {
    let harness = Harness::start(Arc::new(InstantEffect));
    harness.register("dev-1", "1.0.0").await;

    let device = harness.service.get_device_info("dev-1").await.unwrap();
    assert_eq!(device.status, DeviceStatus::Idle);
    assert_eq!(device.firmware_version, "1.0.0");

    let action = harness.initiate_update("dev-1", "2.0.0").await.unwrap();
    assert!(!action.action_id.is_empty());

    // Poll to the terminal state; the device must never surface as Error
    // while the update is still in flight.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let polled = harness
            .service
            .get_action_status(&action.action_id)
            .await
            .unwrap();
        if polled.status == ActionStatus::Completed {
            break;
        }
        assert_ne!(polled.status, ActionStatus::Failed);

        let device = harness.service.get_device_info("dev-1").await.unwrap();
        assert_ne!(device.status, DeviceStatus::Error);

        assert!(
            tokio::time::Instant::now() < deadline,
            "update never completed"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let device = harness.service.get_device_info("dev-1").await.unwrap();
    assert_eq!(device.firmware_version, "2.0.0");
    assert_eq!(device.status, DeviceStatus::Idle);

    harness.stop().await;
}

#[tokio::test]
async fn test_second_action_rejected_until_first_is_terminal() {
    let (release_tx, release_rx) = watch::channel(false);
    let harness = Harness::start(Arc::new(GatedEffect {
        release: release_rx,
    }));
    harness.register("dev-1", "1.0.0").await;

    let first = harness.initiate_update("dev-1", "2.0.0").await.unwrap();

    // While the first action is non-terminal, a second initiation must be
    // rejected, whether the executor has started it or not.
    let result = harness.initiate_update("dev-1", "3.0.0").await;
    assert!(matches!(result.unwrap_err(), DomainError::DeviceBusy(_)));

    harness
        .wait_for_action_status(&first.action_id, ActionStatus::Running)
        .await;
    let result = harness.initiate_update("dev-1", "3.0.0").await;
    assert!(matches!(result.unwrap_err(), DomainError::DeviceBusy(_)));

    release_tx.send(true).unwrap();
    harness
        .wait_for_action_status(&first.action_id, ActionStatus::Completed)
        .await;

    // Terminal state frees the device for the next action.
    let second = harness.initiate_update("dev-1", "3.0.0").await.unwrap();
    harness
        .wait_for_action_status(&second.action_id, ActionStatus::Completed)
        .await;

    let device = harness.service.get_device_info("dev-1").await.unwrap();
    assert_eq!(device.firmware_version, "3.0.0");

    harness.stop().await;
}

#[tokio::test]
async fn test_concurrent_initiations_accept_at_most_one() {
    let (release_tx, release_rx) = watch::channel(false);
    let harness = Harness::start(Arc::new(GatedEffect {
        release: release_rx,
    }));
    harness.register("dev-1", "1.0.0").await;

    // Fire a burst of simultaneous initiations while pollers hold read
    // locks on the stores; only one may be accepted.
    let poller = {
        let service = harness.service.clone();
        tokio::spawn(async move {
            loop {
                let _ = service.get_device_info("dev-1").await;
                tokio::task::yield_now().await;
            }
        })
    };

    let mut attempts = Vec::new();
    for n in 0..8 {
        let service = harness.service.clone();
        attempts.push(tokio::spawn(async move {
            service
                .initiate_action(CreateActionInput {
                    device_id: "dev-1".to_string(),
                    action_type: ActionType::SoftwareUpdate,
                    parameters: format!("2.0.{}", n),
                })
                .await
        }));
    }

    let mut accepted = Vec::new();
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(action) => accepted.push(action),
            Err(e) => assert!(matches!(e, DomainError::DeviceBusy(_))),
        }
    }
    assert_eq!(accepted.len(), 1, "exactly one initiation may win");

    // Only the winner's action is non-terminal in the tracker.
    let active = harness.tracker.active_for_device("dev-1").await.unwrap();
    assert_eq!(active.unwrap().action_id, accepted[0].action_id);

    poller.abort();
    release_tx.send(true).unwrap();
    harness
        .wait_for_action_status(&accepted[0].action_id, ActionStatus::Completed)
        .await;

    harness.stop().await;
}

#[tokio::test]
async fn test_initiate_on_unknown_device_creates_no_action() {
    let harness = Harness::start(Arc::new(InstantEffect));

    let result = harness.initiate_update("dev-gone", "2.0.0").await;
    assert!(matches!(result.unwrap_err(), DomainError::DeviceNotFound(_)));

    assert!(harness
        .tracker
        .active_for_device("dev-gone")
        .await
        .unwrap()
        .is_none());

    harness.stop().await;
}

#[tokio::test]
async fn test_register_twice_fails_second_time() {
    let harness = Harness::start(Arc::new(InstantEffect));

    harness.register("dev-1", "1.0.0").await;
    let result = harness
        .service
        .register_device(RegisterDeviceInput {
            device_id: "dev-1".to_string(),
            initial_firmware_version: "1.0.0".to_string(),
        })
        .await;
    assert!(matches!(
        result.unwrap_err(),
        DomainError::DeviceAlreadyExists(_)
    ));

    harness.stop().await;
}

#[tokio::test]
async fn test_failed_update_leaves_device_in_error() {
    struct FailingEffect;

    #[async_trait]
    impl UpdateEffect for FailingEffect {
        async fn apply(&self, _action: &Action) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("image checksum mismatch"))
        }
    }

    let harness = Harness::start(Arc::new(FailingEffect));
    harness.register("dev-1", "1.0.0").await;

    let action = harness.initiate_update("dev-1", "2.0.0").await.unwrap();
    harness
        .wait_for_action_status(&action.action_id, ActionStatus::Failed)
        .await;

    let device = harness.registry.get("dev-1").await.unwrap().unwrap();
    assert_eq!(device.status, DeviceStatus::Error);
    assert_eq!(device.firmware_version, "1.0.0");

    let polled = harness
        .service
        .get_action_status(&action.action_id)
        .await
        .unwrap();
    assert!(polled.details.contains("image checksum mismatch"));

    harness.stop().await;
}
