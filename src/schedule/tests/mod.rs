use super::*;
use crate::error::Result as WorkerResult;
use crate::queue::memory::MemoryQueue;
use crate::services::mock::MockTranslator;
use crate::schedule::scheduler::{TaskManager, TaskScheduler};
use crate::schedule::types::*;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use anyhow::Result;
use tracing::error;

struct PanickingProcessor;

#[async_trait]
impl TaskProcessor for PanickingProcessor {
    fn task_type(&self) -> TaskType {
        TaskType::Query
    }

    fn validate_params(&self, _request: &TaskRequest) -> WorkerResult<()> {
        Ok(())
    }

    async fn process(&self, _request: &TaskRequest) -> WorkerResult<Value> {
        panic!("processor blew up");
    }
}

fn test_task(id: &str, task_type: TaskType, input: Value) -> Task {
    let input_data: Map<String, Value> = serde_json::from_value(input).unwrap();
    Task {
        task_id: id.to_string(),
        workflow_instance_id: format!("wf-{}", id),
        task_type: task_type.definition_name().to_string(),
        task_def_name: Some(task_type.definition_name().to_string()),
        input_data,
        ..Default::default()
    }
}

fn setup_test_environment(queue: Arc<MemoryQueue>, report_failures: bool) -> Arc<TaskScheduler> {
    let mut task_manager = TaskManager::new(queue, "worker-test")
        .with_report_failures(report_failures)
        .with_update_retry(3, Duration::from_millis(10));
    task_manager.register_processor(Box::new(GreetingProcessor));
    task_manager.register_processor(Box::new(TranslateProcessor::new(Arc::new(MockTranslator::default()))));
    task_manager.register_processor(Box::new(PanickingProcessor));

    Arc::new(
        TaskScheduler::new(Arc::new(task_manager))
            .with_poll_interval(Duration::from_millis(10))
            .with_concurrency(2),
    )
}

async fn wait_for_updates(queue: &MemoryQueue, expected: usize) -> Vec<TaskUpdate> {
    for _ in 0..200 {
        let updates = queue.updates();
        if updates.len() >= expected {
            return updates;
        }
        sleep(Duration::from_millis(10)).await;
    }
    queue.updates()
}

fn start(scheduler: &Arc<TaskScheduler>) -> tokio::task::JoinHandle<()> {
    tokio::spawn({
        let scheduler = scheduler.clone();
        async move {
            scheduler.spawn_all().await;
            if let Err(e) = scheduler.run().await {
                error!("Scheduler error: {}", e);
            }
        }
    })
}

#[tokio::test]
async fn test_complete_task_lifecycle() -> Result<()> {
    let queue = Arc::new(MemoryQueue::new());
    queue.push(test_task("t-1", TaskType::Greeting, json!({"name": "conductor"})));
    queue.push(test_task(
        "t-2",
        TaskType::Translate,
        json!({"text": ["a", "b"], "src": "hin_Deva", "dst": "eng_Latn"}),
    ));

    let scheduler = setup_test_environment(queue.clone(), false);
    let handle = start(&scheduler);

    let mut updates = wait_for_updates(&queue, 2).await;
    scheduler.shutdown();
    tokio::time::timeout(Duration::from_secs(2), handle).await??;

    assert_eq!(updates.len(), 2);
    assert_eq!(queue.pending(), 0);
    updates.sort_by(|a, b| a.task_id.cmp(&b.task_id));

    assert_eq!(updates[0].task_id, "t-1");
    assert_eq!(updates[0].workflow_instance_id, "wf-t-1");
    assert_eq!(updates[0].worker_id, "worker-test");
    assert_eq!(updates[0].status, TaskStatus::Completed);
    assert_eq!(updates[0].output_data.get("result"), Some(&json!("hello, conductor")));

    assert_eq!(
        updates[1].output_data.get("result"),
        Some(&json!(["[eng_Latn] a", "[eng_Latn] b"]))
    );
    Ok(())
}

#[tokio::test]
async fn test_panicking_processor_reports_failure() -> Result<()> {
    let queue = Arc::new(MemoryQueue::new());
    queue.push(test_task("t-1", TaskType::Query, json!({"query": "boom"})));
    queue.push(test_task("t-2", TaskType::Query, json!({"query": "again"})));

    let scheduler = setup_test_environment(queue.clone(), true);
    let handle = start(&scheduler);

    // both tasks are reported, so the loop survived the first panic
    let updates = wait_for_updates(&queue, 2).await;
    scheduler.shutdown();
    tokio::time::timeout(Duration::from_secs(2), handle).await??;

    assert_eq!(updates.len(), 2);
    for update in &updates {
        assert_eq!(update.status, TaskStatus::Failed);
        let reason = update.reason_for_incompletion.as_deref().unwrap_or_default();
        assert!(reason.starts_with("Error: processor aborted"), "reason: {}", reason);
    }
    Ok(())
}

#[tokio::test]
async fn test_error_outcomes_complete_by_default() -> Result<()> {
    let queue = Arc::new(MemoryQueue::new());
    let scheduler = setup_test_environment(queue.clone(), false);
    let task_manager = scheduler.task_manager();

    let task = test_task("t-1", TaskType::Greeting, json!({}));
    let outcome = task_manager.invoke(TaskType::Greeting, task.request()).await?;
    task_manager.complete(&task, outcome).await?;

    let updates = queue.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].status, TaskStatus::Completed);
    assert_eq!(updates[0].reason_for_incompletion, None);
    assert_eq!(
        updates[0].output_data.get("result"),
        Some(&json!("Error: Missing required parameter: name"))
    );
    assert_eq!(updates[0].logs[0].log, "Error: Missing required parameter: name");
    Ok(())
}

#[tokio::test]
async fn test_report_failures_marks_rejections_failed() -> Result<()> {
    let queue = Arc::new(MemoryQueue::new());
    let scheduler = setup_test_environment(queue.clone(), true);
    let task_manager = scheduler.task_manager();

    let task = test_task("t-1", TaskType::Translate, json!({"text": "x", "src": "a"}));
    let outcome = task_manager.invoke(TaskType::Translate, task.request()).await?;
    let update = task_manager.build_update(&task, outcome);

    assert_eq!(update.status, TaskStatus::Failed);
    assert_eq!(
        update.reason_for_incompletion.as_deref(),
        Some("Error: Missing required parameter: dst")
    );
    Ok(())
}

#[tokio::test]
async fn test_unregistered_type_is_an_error() {
    let queue = Arc::new(MemoryQueue::new());
    let scheduler = setup_test_environment(queue, false);
    let task_manager = scheduler.task_manager();

    assert_eq!(
        task_manager.registered_types(),
        vec![TaskType::Greeting, TaskType::Query, TaskType::Translate]
    );
    let result = task_manager
        .invoke(TaskType::Transcribe, TaskRequest::default())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_failed_update_keeps_the_loop_alive() -> Result<()> {
    let queue = Arc::new(MemoryQueue::rejecting_updates());
    queue.push(test_task("t-1", TaskType::Greeting, json!({"name": "a"})));
    queue.push(test_task("t-2", TaskType::Greeting, json!({"name": "b"})));

    let scheduler = setup_test_environment(queue.clone(), false);
    let handle = start(&scheduler);

    for _ in 0..200 {
        if queue.pending() == 0 {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    scheduler.shutdown();
    tokio::time::timeout(Duration::from_secs(2), handle).await??;

    assert_eq!(queue.pending(), 0);
    assert!(queue.updates().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_update_is_retried_until_accepted() -> Result<()> {
    let queue = Arc::new(MemoryQueue::refusing_first_updates(2));
    let scheduler = setup_test_environment(queue.clone(), false);
    let task_manager = scheduler.task_manager();

    let task = test_task("t-1", TaskType::Greeting, json!({"name": "retry"}));
    let outcome = task_manager.invoke(TaskType::Greeting, task.request()).await?;
    task_manager.complete(&task, outcome).await?;

    assert_eq!(queue.update_attempts(), 3);
    let updates = queue.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].output_data.get("result"), Some(&json!("hello, retry")));
    Ok(())
}

#[tokio::test]
async fn test_update_gives_up_after_bounded_attempts() -> Result<()> {
    let queue = Arc::new(MemoryQueue::rejecting_updates());
    let scheduler = setup_test_environment(queue.clone(), false);
    let task_manager = scheduler.task_manager();

    let task = test_task("t-1", TaskType::Greeting, json!({"name": "lost"}));
    let outcome = task_manager.invoke(TaskType::Greeting, task.request()).await?;
    let result = task_manager.complete(&task, outcome).await;

    assert!(result.is_err());
    assert_eq!(queue.update_attempts(), 3);
    assert!(queue.updates().is_empty());
    Ok(())
}
