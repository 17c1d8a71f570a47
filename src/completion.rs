// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::{Error, Result};

use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Deferred engine work, produced once all parameters have been checked
pub type Job<T> = Box<dyn FnOnce() -> Result<T> + Send + 'static>;

enum State<T> {
    Ready(Option<Result<T>>),
    Blocking(JoinHandle<Result<T>>),
}

/// The single result of a provider operation.
///
/// Parameter errors produce an already resolved completion, engine work
/// runs on the tokio blocking pool when a runtime is available.
pub struct Completion<T> {
    state: State<T>,
}

impl<T: Send + 'static> Completion<T> {
    pub(crate) fn failed(error: Error) -> Completion<T> {
        Completion {
            state: State::Ready(Some(Err(error))),
        }
    }

    pub(crate) fn dispatch(
        offload: bool,
        op: &'static str,
        job: Job<T>,
    ) -> Completion<T> {
        let work = move || {
            let res = job();
            if let Err(ref e) = res {
                warn!("{} failed: {}", op, e);
            }
            res
        };
        if offload {
            if let Ok(rt) = Handle::try_current() {
                debug!("{}: dispatched to the blocking pool", op);
                return Completion {
                    state: State::Blocking(rt.spawn_blocking(work)),
                };
            }
        }
        Completion {
            state: State::Ready(Some(work())),
        }
    }

    /// True when the result is available without waiting
    pub fn is_resolved(&self) -> bool {
        match &self.state {
            State::Ready(r) => r.is_some(),
            State::Blocking(h) => h.is_finished(),
        }
    }
}

impl<T: Unpin> Future for Completion<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<T>> {
        match &mut self.get_mut().state {
            State::Ready(res) => match res.take() {
                Some(r) => Poll::Ready(r),
                None => Poll::Ready(Err(Error::other_error(
                    "completion polled after delivering its result",
                ))),
            },
            State::Blocking(handle) => match Pin::new(handle).poll(cx) {
                Poll::Ready(Ok(r)) => Poll::Ready(r),
                Poll::Ready(Err(e)) => Poll::Ready(Err(e.into())),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}
