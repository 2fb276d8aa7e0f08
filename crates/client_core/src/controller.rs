//! Logo request lifecycle: owns one [`RequestState`] per screen and drives it
//! through `Idle -> Creating -> Completed | Failed`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use anyhow::{anyhow, Context, Result};
use shared::{
    domain::{clamp_prompt, style_by_id, StyleId},
    protocol::{CreateLogoRequest, CreateLogoResponse},
};
use thiserror::Error;
use tokio::{runtime::Handle, sync::broadcast, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    state::{LogoResult, NavigationIntent, RequestState, RequestStatus},
    GenerationService,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerOptions {
    /// Reject `submit` while a creation is already in flight instead of letting
    /// the last response to arrive win.
    pub single_flight: bool,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    StateChanged(RequestState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("unknown logo style {0}")]
    UnknownStyle(StyleId),
    #[error("a logo request is already in flight")]
    RequestInFlight,
}

struct ControllerInner {
    state: RequestState,
    surprise_in_flight: usize,
}

impl ControllerInner {
    fn sync_surprise_pending(&mut self) {
        self.state.surprise_pending = self.surprise_in_flight > 0;
    }
}

struct ControllerShared {
    inner: Mutex<ControllerInner>,
    events: broadcast::Sender<ControllerEvent>,
}

impl ControllerShared {
    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &ControllerInner) {
        let _ = self
            .events
            .send(ControllerEvent::StateChanged(inner.state.clone()));
    }
}

pub struct LogoRequestController {
    service: Arc<dyn GenerationService>,
    runtime: Handle,
    options: ControllerOptions,
    shared: Arc<ControllerShared>,
}

impl LogoRequestController {
    /// Builds a controller bound to the tokio runtime the caller is running on.
    pub fn new(service: Arc<dyn GenerationService>, options: ControllerOptions) -> Result<Self> {
        let runtime =
            Handle::try_current().context("logo controller requires a running tokio runtime")?;
        Ok(Self::with_runtime(service, options, runtime))
    }

    pub fn with_runtime(
        service: Arc<dyn GenerationService>,
        options: ControllerOptions,
        runtime: Handle,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service,
            runtime,
            options,
            shared: Arc::new(ControllerShared {
                inner: Mutex::new(ControllerInner {
                    state: RequestState::default(),
                    surprise_in_flight: 0,
                }),
                events,
            }),
        }
    }

    pub fn snapshot(&self) -> RequestState {
        self.shared.lock().state.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.shared.events.subscribe()
    }

    pub fn set_prompt_text(&self, text: &str) {
        let mut inner = self.shared.lock();
        inner.state.prompt_text = clamp_prompt(text);
        inner.state.clear_validation_error();
        self.shared.publish(&inner);
    }

    pub fn select_style(&self, style_id: StyleId) {
        let mut inner = self.shared.lock();
        if inner.state.selected_style_id == style_id {
            return;
        }
        inner.state.selected_style_id = style_id;
        self.shared.publish(&inner);
    }

    /// Submits whatever prompt and style the state currently holds.
    pub fn submit_current(&self) -> Result<JoinHandle<()>, SubmitError> {
        let (prompt, style_id) = {
            let inner = self.shared.lock();
            (
                inner.state.prompt_text.clone(),
                inner.state.selected_style_id,
            )
        };
        self.submit(&prompt, style_id)
    }

    /// Validates synchronously, moves to `Creating` and dispatches one creation
    /// call. Returns as soon as the call is spawned.
    pub fn submit(
        &self,
        prompt_text: &str,
        style_id: StyleId,
    ) -> Result<JoinHandle<()>, SubmitError> {
        let prompt = clamp_prompt(prompt_text);
        let style = {
            let mut inner = self.shared.lock();
            if prompt.trim().is_empty() {
                inner.state.reject_empty_prompt();
                self.shared.publish(&inner);
                return Err(SubmitError::EmptyPrompt);
            }
            let Some(style) = style_by_id(style_id) else {
                warn!(style_id = %style_id, "submit with style outside the catalog");
                return Err(SubmitError::UnknownStyle(style_id));
            };
            if self.options.single_flight && inner.state.status == RequestStatus::Creating {
                debug!("logo request already in flight; ignoring submit");
                return Err(SubmitError::RequestInFlight);
            }
            inner.state.begin_create();
            self.shared.publish(&inner);
            style
        };

        let request = CreateLogoRequest {
            prompt,
            style: style.key.to_string(),
        };
        let service = Arc::clone(&self.service);
        let shared = Arc::downgrade(&self.shared);
        info!(style = style.key, "creating logo");

        Ok(self.runtime.spawn(async move {
            let outcome = service
                .create_logo(request.clone())
                .await
                .and_then(|response| into_logo_result(&request, response));
            let Some(shared) = live(&shared) else {
                return;
            };
            let mut inner = shared.lock();
            match outcome {
                Ok(result) => {
                    info!(logo_id = %result.id, "logo ready");
                    inner.state.complete(result);
                }
                Err(err) => {
                    error!("error creating logo: {err:#}");
                    inner.state.fail();
                }
            }
            shared.publish(&inner);
        }))
    }

    /// Fetches a generated prompt and, on success, replaces the prompt text.
    /// Failures are logged and otherwise ignored.
    pub fn surprise(&self) -> JoinHandle<()> {
        {
            let mut inner = self.shared.lock();
            inner.surprise_in_flight += 1;
            inner.sync_surprise_pending();
            self.shared.publish(&inner);
        }

        let service = Arc::clone(&self.service);
        let shared = Arc::downgrade(&self.shared);

        self.runtime.spawn(async move {
            let outcome = service.surprise_me().await;
            let Some(shared) = live(&shared) else {
                return;
            };
            let mut inner = shared.lock();
            inner.surprise_in_flight = inner.surprise_in_flight.saturating_sub(1);
            match outcome {
                Ok(response) => inner.state.prompt_text = clamp_prompt(&response.prompt),
                Err(err) => warn!("error getting surprise prompt: {err:#}"),
            }
            inner.sync_surprise_pending();
            shared.publish(&inner);
        })
    }

    /// Tap on the toast: yields where to navigate only once a design is ready.
    pub fn on_toast_activate(&self) -> Option<NavigationIntent> {
        let intent = self.shared.lock().state.navigation_intent();
        if intent.is_none() {
            debug!("toast activated with no completed design");
        }
        intent
    }
}

fn live(shared: &Weak<ControllerShared>) -> Option<Arc<ControllerShared>> {
    let shared = shared.upgrade();
    if shared.is_none() {
        debug!("controller dropped before request finished; discarding result");
    }
    shared
}

fn into_logo_result(
    request: &CreateLogoRequest,
    response: CreateLogoResponse,
) -> Result<LogoResult> {
    let Some(image_url) = response.ready_image_url() else {
        return Err(anyhow!(
            "logo {} came back {:?} without an image: {}",
            response.id,
            response.status,
            response.error.as_deref().unwrap_or("no detail")
        ));
    };
    Ok(LogoResult {
        id: response.id.clone(),
        prompt: request.prompt.clone(),
        style_key: request.style.clone(),
        image_url: image_url.to_string(),
    })
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
