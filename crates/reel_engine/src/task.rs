use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use futures_util::future::poll_fn;
use futures_util::{FutureExt, StreamExt};
use reel_core::Work;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::types::{Envelope, TaskKey, TaskOutcome};

/// Runs one effect's work until it ends or `token` fires, forwarding every
/// yielded action to the store. `Finished` is always the task's last envelope.
pub(crate) async fn drive<A: Send + 'static>(
    task: TaskKey,
    work: Work<A>,
    token: CancellationToken,
    outbox: UnboundedSender<Envelope<A>>,
) {
    let outcome = match work {
        Work::Once(future) => run_once(task, future, &token, &outbox).await,
        Work::Stream(stream) => run_stream(task, stream, &token, &outbox).await,
    };
    let _ = outbox.send(Envelope::Finished { task, outcome });
}

/// Makes `reel_*!` lines from `future` carry `seq`, whichever worker thread
/// polls it. The thread's previous value is restored after every poll.
pub(crate) fn with_dispatch_seq<F: Future>(seq: u64, future: F) -> impl Future<Output = F::Output> {
    let mut future = Box::pin(future);
    poll_fn(move |cx| {
        let previous = reel_logging::dispatch_seq();
        reel_logging::set_dispatch_seq(seq);
        let poll = future.as_mut().poll(cx);
        reel_logging::set_dispatch_seq(previous);
        poll
    })
}

async fn run_once<A>(
    task: TaskKey,
    future: BoxFuture<'static, Option<A>>,
    token: &CancellationToken,
    outbox: &UnboundedSender<Envelope<A>>,
) -> TaskOutcome {
    tokio::select! {
        biased;
        _ = token.cancelled() => TaskOutcome::Cancelled,
        result = AssertUnwindSafe(future).catch_unwind() => match result {
            Ok(Some(action)) => {
                let _ = outbox.send(Envelope::Emitted { task, action });
                TaskOutcome::Completed
            }
            Ok(None) => TaskOutcome::Completed,
            Err(panic) => TaskOutcome::Failed(panic_message(panic)),
        },
    }
}

async fn run_stream<A>(
    task: TaskKey,
    stream: BoxStream<'static, A>,
    token: &CancellationToken,
    outbox: &UnboundedSender<Envelope<A>>,
) -> TaskOutcome {
    let mut stream = AssertUnwindSafe(stream).catch_unwind();
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return TaskOutcome::Cancelled,
            next = stream.next() => match next {
                Some(Ok(action)) => {
                    if outbox.send(Envelope::Emitted { task, action }).is_err() {
                        // Store is gone; nobody is left to observe the stream.
                        return TaskOutcome::Cancelled;
                    }
                }
                Some(Err(panic)) => return TaskOutcome::Failed(panic_message(panic)),
                None => return TaskOutcome::Completed,
            },
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "effect panicked".to_string()
    }
}
