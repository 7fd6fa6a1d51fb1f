//! The mounted screen: owns session state, the theme store and the
//! background sequence.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use nimbus_weather::{
    LocationGateway, PermissionRequester, PermissionStatus, PositionSource, WeatherProvider,
};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::screen::{self, Screen, ScreenInput};
use crate::services::{self, PromptPermission, WeatherServiceMessage};
use crate::state::{FetchFailurePolicy, SessionState};
use crate::theme::{ThemeSelection, ThemeStore};

pub struct Session {
    state: SessionState,
    theme: ThemeStore,
    tx: Sender<WeatherServiceMessage>,
    rx: Receiver<WeatherServiceMessage>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    permission_reply: Option<oneshot::Sender<PermissionStatus>>,
    mounted: bool,
    torn_down: bool,
}

impl Session {
    pub fn new(theme: ThemeStore, fetch_failure: FetchFailurePolicy) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: SessionState::new(fetch_failure),
            theme,
            tx,
            rx,
            cancel: CancellationToken::new(),
            task: None,
            permission_reply: None,
            mounted: false,
            torn_down: false,
        }
    }

    /// Permission requester that asks through this session's screen
    pub fn permission_prompt(&self) -> PromptPermission {
        PromptPermission::new(self.tx.clone())
    }

    /// Start the location and weather sequence. Only the first call on a live
    /// session does anything; returns whether the sequence was started.
    pub fn mount<P, S>(
        &mut self,
        runtime: &Handle,
        gateway: LocationGateway<P, S>,
        provider: Arc<WeatherProvider>,
    ) -> bool
    where
        P: PermissionRequester + 'static,
        S: PositionSource + 'static,
    {
        if self.mounted || self.torn_down {
            tracing::debug!("Session already mounted, not restarting sequence");
            return false;
        }
        self.mounted = true;
        self.state.begin();

        tracing::info!("Starting location and weather sequence");
        self.task = Some(services::request_weather_fetch(
            runtime,
            &self.tx,
            self.cancel.clone(),
            gateway,
            provider,
        ));
        true
    }

    /// Apply every pending message. Returns true if anything on screen may
    /// have changed.
    pub fn poll(&mut self) -> bool {
        if self.torn_down {
            return false;
        }

        let mut changed = false;
        while let Ok(message) = self.rx.try_recv() {
            changed |= self.apply(message);
        }
        changed
    }

    fn apply(&mut self, message: WeatherServiceMessage) -> bool {
        match message {
            WeatherServiceMessage::PermissionRequested(reply) => {
                self.permission_reply = Some(reply);
                true
            }
            WeatherServiceMessage::LocationAcquired(fix) => self.state.location_acquired(fix),
            WeatherServiceMessage::LocationFailed(err) => self.state.location_failed(&err),
            WeatherServiceMessage::FetchStarted => self.state.fetch_started(),
            WeatherServiceMessage::FetchDone(Ok(snapshot)) => self.state.weather_loaded(snapshot),
            WeatherServiceMessage::FetchDone(Err(err)) => self.state.fetch_failed(&err),
        }
    }

    /// True while the location question is waiting for an answer
    pub fn is_prompting(&self) -> bool {
        self.permission_reply.is_some()
    }

    /// Answer the pending location question. Returns false if nothing was asked.
    pub fn answer_permission(&mut self, granted: bool) -> bool {
        let Some(reply) = self.permission_reply.take() else {
            return false;
        };
        let status = if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        tracing::info!("Location permission answered: {:?}", status);
        // The sequence may have been cancelled in the meantime
        let _ = reply.send(status);
        true
    }

    pub fn toggle_theme(&mut self) -> ThemeSelection {
        self.theme.toggle()
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        screen::render(&ScreenInput {
            theme: self.theme.selection(),
            location: self.state.location(),
            weather: self.state.weather(),
            error: self.state.displayed_error(),
            permission_pending: self.is_prompting(),
        })
    }

    /// Stop the sequence. Messages still in flight are discarded.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.cancel.cancel();
        self.permission_reply = None;
        if self.task.take().is_some() {
            tracing::info!("Session torn down, weather sequence cancelled");
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}
