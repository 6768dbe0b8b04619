use sequentq::prelude::*;
use std::time::Duration;

#[tokio::main]
async fn main() -> SequentResult<()> {
    let config = SequentConfig {
        queue: QueueConfig::default().with_delay_ms(100),
        ..SequentConfig::development()
    };
    sequentq::logging::init(&config.logging)?;

    let queue = SequentialQueue::<String>::with_config(
        |job: String| async move {
            if job.starts_with("bad") {
                return Err(SequentError::handler(format!("refusing {job}")));
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            tracing::info!("finished {}", job);
            Ok(())
        },
        config,
    )?;

    queue.on_error(|err, job| tracing::error!("{} failed: {}", job, err));

    queue
        .enqueue_back("resize-1".to_string())
        .enqueue_back("bad-upload".to_string())
        .enqueue_back_with("resize-2".to_string(), |outcome| async move {
            tracing::info!("resize-2 done, ok = {}", outcome.is_none());
            SequentResult::Ok(())
        })
        .enqueue_front("urgent".to_string());

    queue.drain().await;

    let stats = queue.stats();
    println!("processed {} items, {} failed", stats.processed, stats.failed);
    Ok(())
}
