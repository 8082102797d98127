//! Gesture Session Controller
//!
//! One parameterized state machine that every screen runs instead of its
//! own press/move/release plumbing. A screen describes itself once (its
//! regions, an optional scroll container and a [`SessionPolicy`]) through a
//! [`ScreenHandler`]. The session then owns the registry, focus, tap, scroll
//! and measurement components and routes each pointer event through them.
//!
//! # State Machine
//!
//! ```text
//!            press                        release
//!   Idle ───────────────► Active ───────────────────► Idle
//!     │                     │ move                     │
//!     │                     ├─► Focus Tracker          ├─► clear focus (policy)
//!     │                     └─► Scroll-Follow          └─► stop scroll-follow
//!     │ press
//!     ├─► Focus Tracker (press hit moves focus)
//!     └─► Tap Classifier ─(window closes)─► ScreenHandler::on_gesture
//! ```
//!
//! # Timers
//!
//! The session owns no timers. Tap windows, measurement retries and
//! scroll-follow repeats are deadlines; the owner sleeps until
//! [`GestureSession::next_deadline`] and calls [`GestureSession::poll`].
//! Every event also polls up to its own timestamp first, so timers always
//! fire in order relative to pointer events. After
//! [`GestureSession::teardown`] every call is a no-op.
//!
//! # Confirm Target
//!
//! A classified tap burst acts on the region that was focused as of the
//! burst's last press. A press on a region moves focus there first, so
//! tapping a region confirms that region; tapping empty space confirms the
//! region focused before. The target is remembered per burst, which keeps
//! confirm working on screens that clear focus on release.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::adaptive::{score_path, AdaptiveSettings, PathRecorder, PathSample, StruggleModel};
use crate::config::EngineConfig;
use crate::events::{PointerEvent, PointerPhase, SessionOutput};
use crate::feedback::{FeedbackChannel, ImpactLevel, DEFAULT_SPEECH_RATE};
use crate::focus::{hit_test, FocusChange, FocusTracker};
use crate::geometry::Point;
use crate::measurement::{LayoutProbe, MeasurementService};
use crate::media::PlaybackStatus;
use crate::navigation::NavigationRequest;
use crate::region::{Region, RegionId, RegionRegistry, RegionSpec};
use crate::scroll::{ScrollContainer, ScrollFollowController, ScrollOffset};
use crate::tap::{TapClassifier, TapGesture, TapPolicy};

/// Spoken when a confirm gesture has nothing to act on
pub const SELECT_FIRST_HINT: &str = "Select an option first";

/// Per-screen behavior switches
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    /// Drop focus when the finger lifts
    pub clear_focus_on_release: bool,
    /// Tap policy for this screen; the configured default when `None`
    pub tap_policy: Option<TapPolicy>,
}

impl SessionPolicy {
    /// Default policy: focus retained on release, configured tap policy
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear focus on release
    #[must_use]
    pub fn with_clear_focus_on_release(mut self, clear: bool) -> Self {
        self.clear_focus_on_release = clear;
        self
    }

    /// Override the tap policy
    #[must_use]
    pub fn with_tap_policy(mut self, policy: TapPolicy) -> Self {
        self.tap_policy = Some(policy);
        self
    }
}

/// What a screen mounts
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScreenMount {
    /// Regions in hit-test order
    pub regions: Vec<RegionSpec>,
    /// Scroll container the regions live in, if any
    pub scroll: Option<ScrollContainer>,
    /// Behavior switches
    pub policy: SessionPolicy,
}

impl ScreenMount {
    /// Mount these regions with the default policy
    #[must_use]
    pub fn regions(regions: Vec<RegionSpec>) -> Self {
        Self {
            regions,
            ..Self::default()
        }
    }

    /// Attach a scroll container
    #[must_use]
    pub fn with_scroll(mut self, container: ScrollContainer) -> Self {
        self.scroll = Some(container);
        self
    }

    /// Set the policy
    #[must_use]
    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Deferred effect requested by a screen while handling a gesture
#[derive(Clone, Debug, PartialEq)]
pub enum ScreenCommand {
    /// Forward to the navigation sink
    Navigate(NavigationRequest),
    /// Unmount every region and mount these instead
    ReplaceRegions(Vec<RegionSpec>),
    /// Drop focus
    ClearFocus,
}

/// What a screen may do from inside [`ScreenHandler::on_gesture`]
#[derive(Debug)]
pub struct ScreenContext<'a> {
    feedback: &'a FeedbackChannel,
    commands: Vec<ScreenCommand>,
}

impl<'a> ScreenContext<'a> {
    /// Create a context around a feedback channel
    #[must_use]
    pub fn new(feedback: &'a FeedbackChannel) -> Self {
        Self {
            feedback,
            commands: Vec::new(),
        }
    }

    /// The feedback channel
    #[must_use]
    pub fn feedback(&self) -> &FeedbackChannel {
        self.feedback
    }

    /// Speak, cancelling whatever is being said
    pub fn speak(&self, text: impl Into<String>) {
        self.feedback.speak(text);
    }

    /// Tell the user a confirm needs a focused region
    pub fn hint_select_first(&self) {
        self.feedback.speak(SELECT_FIRST_HINT);
    }

    /// Ask the host to show another screen
    pub fn navigate(&mut self, request: NavigationRequest) {
        self.commands.push(ScreenCommand::Navigate(request));
    }

    /// Replace the mounted regions (focus is cleared)
    pub fn replace_regions(&mut self, regions: Vec<RegionSpec>) {
        self.commands.push(ScreenCommand::ReplaceRegions(regions));
    }

    /// Drop focus
    pub fn clear_focus(&mut self) {
        self.commands.push(ScreenCommand::ClearFocus);
    }

    /// Commands queued so far
    #[must_use]
    pub fn into_commands(self) -> Vec<ScreenCommand> {
        self.commands
    }
}

/// A screen's behavior on top of the shared session machinery
///
/// This is where region activation lives: the session classifies the
/// gesture and finds the focused region, the handler decides what it means.
pub trait ScreenHandler: Send {
    /// Describe the screen and speak any introduction
    fn mount(&mut self, feedback: &FeedbackChannel) -> ScreenMount;

    /// Announce a newly focused region
    fn announce_focus(&mut self, region: &Region, feedback: &FeedbackChannel) {
        feedback.speak(&region.label);
        feedback.impact(ImpactLevel::Light);
    }

    /// A tap burst was classified; `focused` is the confirm target
    fn on_gesture(
        &mut self,
        gesture: TapGesture,
        focused: Option<&Region>,
        ctx: &mut ScreenContext<'_>,
    );

    /// Every raw pointer event, before the session routes it
    fn on_pointer(&mut self, _event: &PointerEvent, _feedback: &FeedbackChannel) {}

    /// Periodic playback status, for screens that own media
    fn on_playback_status(&mut self, _status: PlaybackStatus, _feedback: &FeedbackChannel) {}

    /// The screen is going away
    fn unmount(&mut self, _feedback: &FeedbackChannel) {}
}

/// Whether a finger is down
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GestureState {
    /// No finger down
    #[default]
    Idle,
    /// Finger down since `since`, first touched at `origin`
    Active {
        /// Press point
        origin: Point,
        /// Press time
        since: Instant,
    },
}

/// Per-screen gesture session
pub struct GestureSession<H> {
    handler: H,
    feedback: FeedbackChannel,
    probe: Box<dyn LayoutProbe>,
    registry: RegionRegistry,
    focus: FocusTracker,
    taps: TapClassifier,
    scroll: ScrollFollowController,
    measurement: MeasurementService,
    config: EngineConfig,
    policy: SessionPolicy,
    state: GestureState,
    burst_target: Option<RegionId>,
    last_point: Option<Point>,
    path: PathRecorder,
    last_path: Vec<PathSample>,
    torn_down: bool,
}

impl<H: ScreenHandler> GestureSession<H> {
    /// Build a session; call [`mount`](Self::mount) before feeding events
    pub fn new(
        handler: H,
        config: &EngineConfig,
        probe: impl LayoutProbe + 'static,
        feedback: FeedbackChannel,
    ) -> Self {
        if (config.speech_rate - DEFAULT_SPEECH_RATE).abs() > f32::EPSILON {
            feedback.set_speech_rate(config.speech_rate);
        }
        Self {
            handler,
            feedback,
            probe: Box::new(probe),
            registry: RegionRegistry::new(),
            focus: FocusTracker::new(config.hit_padding),
            taps: TapClassifier::new(config.tap.clone()),
            scroll: ScrollFollowController::new(config.scroll.clone()),
            measurement: MeasurementService::new(config.measurement.clone()),
            config: config.clone(),
            policy: SessionPolicy::default(),
            state: GestureState::Idle,
            burst_target: None,
            last_point: None,
            path: PathRecorder::default(),
            last_path: Vec::new(),
            torn_down: false,
        }
    }

    /// Mount the screen's regions and run the first measurement pass
    pub fn mount(&mut self, now: Instant) -> Vec<SessionOutput> {
        let mount = self.handler.mount(&self.feedback);
        let tap_policy = mount.policy.tap_policy.unwrap_or(self.config.tap.policy);
        self.taps = TapClassifier::new(self.config.tap.clone().with_policy(tap_policy));
        self.policy = mount.policy;
        self.scroll.set_container(mount.scroll);
        self.probe.scroll_to(self.scroll.offset());
        self.install_regions(mount.regions, now);

        debug!(
            regions = self.registry.len(),
            tap_policy = ?tap_policy,
            clear_on_release = self.policy.clear_focus_on_release,
            "Screen mounted"
        );
        self.poll(now)
    }

    /// Route one pointer event
    pub fn handle_event(&mut self, event: PointerEvent) -> Vec<SessionOutput> {
        if self.torn_down {
            trace!(?event, "Event after teardown ignored");
            return Vec::new();
        }
        // Timers due before this event fire first
        let mut out = self.poll(event.at);
        self.handler.on_pointer(&event, &self.feedback);

        match event.phase {
            PointerPhase::Press => self.on_press(event.point, event.at, &mut out),
            PointerPhase::Move => self.on_move(event.point, event.at, &mut out),
            PointerPhase::Release => self.on_release(event.point, event.at, &mut out),
        }
        out
    }

    /// Fire every timer due at `now`
    pub fn poll(&mut self, now: Instant) -> Vec<SessionOutput> {
        let mut out = Vec::new();
        if self.torn_down {
            return out;
        }
        self.measure_due(now);
        if let Some(offset) = self.scroll.poll(now) {
            self.after_scroll(offset, now, &mut out);
        }
        if let Some(gesture) = self.taps.poll(now) {
            self.dispatch_gesture(gesture, now, &mut out);
        }
        out
    }

    /// Earliest pending timer
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.torn_down {
            return None;
        }
        [
            self.taps.next_deadline(),
            self.measurement.next_deadline(),
            self.scroll.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Re-measure every region (window or orientation change)
    pub fn remeasure(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        self.measurement.request_all(&self.registry, now);
        self.measure_due(now);
    }

    /// Forward a playback status report to the screen
    pub fn on_playback_status(&mut self, status: PlaybackStatus) {
        if !self.torn_down {
            self.handler.on_playback_status(status, &self.feedback);
        }
    }

    /// Apply an assistance profile
    pub fn apply_adaptive(&mut self, settings: AdaptiveSettings) {
        if self.torn_down {
            return;
        }
        info!(
            level = ?settings.level,
            padding = settings.hit_padding,
            rate = settings.speech_rate,
            "Applying assistance profile"
        );
        self.focus.set_padding(settings.hit_padding);
        self.feedback.set_speech_rate(settings.speech_rate);
    }

    /// Score the last completed gesture path and apply the matching profile
    pub fn assess(&mut self, model: &dyn StruggleModel) -> Option<AdaptiveSettings> {
        let settings = AdaptiveSettings::from_score(score_path(model, &self.last_path)?);
        self.apply_adaptive(settings);
        Some(settings)
    }

    /// Cancel every timer and unmount; later calls are no-ops
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.taps.cancel();
        self.measurement.cancel_all();
        self.scroll.stop();
        self.focus.clear();
        self.registry.clear();
        self.burst_target = None;
        self.last_point = None;
        self.state = GestureState::Idle;
        self.handler.unmount(&self.feedback);
        debug!("Session torn down");
    }

    /// Mounted regions
    #[must_use]
    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    /// Focused region id
    #[must_use]
    pub fn focused(&self) -> Option<&RegionId> {
        self.focus.focused()
    }

    /// Current hit-box padding
    #[must_use]
    pub fn hit_padding(&self) -> f32 {
        self.focus.padding()
    }

    /// Whether a finger is down
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Current scroll offset
    #[must_use]
    pub fn scroll_offset(&self) -> ScrollOffset {
        self.scroll.offset()
    }

    /// Path of the last completed gesture
    #[must_use]
    pub fn last_path(&self) -> &[PathSample] {
        &self.last_path
    }

    /// Whether [`teardown`](Self::teardown) ran
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// The screen handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The screen handler, mutably
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// The feedback channel
    pub fn feedback(&self) -> &FeedbackChannel {
        &self.feedback
    }

    fn on_press(&mut self, point: Point, at: Instant, out: &mut Vec<SessionOutput>) {
        if let GestureState::Active { .. } = self.state {
            trace!("Press without release, starting a new gesture");
        }
        self.state = GestureState::Active {
            origin: point,
            since: at,
        };
        self.path.start(point, at);
        self.last_point = Some(point);

        let focused_before = self.focus.focused().cloned();
        let hit = hit_test(&self.registry, point, self.focus.padding());
        let pressed = hit.map(|r| r.id.clone());

        if let Some(change) = self.focus.press_on(hit) {
            self.announce(change, out);
        }
        self.burst_target = self.focus.focused().cloned();

        if let Some(gesture) = self
            .taps
            .on_press(at, pressed.as_ref(), focused_before.as_ref())
        {
            self.dispatch_gesture(gesture, at, out);
        }
    }

    fn on_move(&mut self, point: Point, at: Instant, out: &mut Vec<SessionOutput>) {
        if self.state == GestureState::Idle {
            trace!("Move without press ignored");
            return;
        }
        self.path.push(point, at);
        self.last_point = Some(point);

        if let Some(change) = self.focus.on_pointer_move(point, &self.registry) {
            self.announce(change, out);
        }
        if let Some(offset) = self.scroll.on_pointer_move(point.y, at) {
            self.after_scroll(offset, at, out);
        }
    }

    fn on_release(&mut self, point: Point, at: Instant, out: &mut Vec<SessionOutput>) {
        if self.state == GestureState::Idle {
            trace!("Release without press ignored");
            return;
        }
        self.state = GestureState::Idle;
        self.last_point = None;
        self.scroll.stop();
        self.last_path = self.path.finish(point, at);

        if self.policy.clear_focus_on_release {
            if let Some(change) = self.focus.clear() {
                out.push(SessionOutput::Focus(change));
            }
        }
    }

    fn announce(&mut self, change: FocusChange, out: &mut Vec<SessionOutput>) {
        if let Some(region) = change.focused().and_then(|id| self.registry.get(id)) {
            self.handler.announce_focus(region, &self.feedback);
        }
        out.push(SessionOutput::Focus(change));
    }

    fn dispatch_gesture(&mut self, gesture: TapGesture, now: Instant, out: &mut Vec<SessionOutput>) {
        let target = self
            .burst_target
            .take()
            .filter(|id| self.registry.contains(id));
        let region = target.as_ref().and_then(|id| self.registry.get(id)).cloned();
        debug!(?gesture, target = ?target, "Dispatching gesture");
        out.push(SessionOutput::Gesture {
            gesture,
            target,
        });

        let mut ctx = ScreenContext::new(&self.feedback);
        self.handler.on_gesture(gesture, region.as_ref(), &mut ctx);
        let commands = ctx.into_commands();
        self.apply_commands(commands, now, out);
    }

    fn apply_commands(&mut self, commands: Vec<ScreenCommand>, now: Instant, out: &mut Vec<SessionOutput>) {
        for command in commands {
            match command {
                ScreenCommand::Navigate(request) => {
                    debug!(destination = %request.destination, "Navigation requested");
                    out.push(SessionOutput::Navigate(request));
                }
                ScreenCommand::ReplaceRegions(regions) => {
                    if let Some(change) = self.focus.clear() {
                        out.push(SessionOutput::Focus(change));
                    }
                    self.burst_target = None;
                    self.install_regions(regions, now);
                    self.measure_due(now);
                }
                ScreenCommand::ClearFocus => {
                    if let Some(change) = self.focus.clear() {
                        out.push(SessionOutput::Focus(change));
                    }
                    self.burst_target = None;
                }
            }
        }
    }

    fn install_regions(&mut self, regions: Vec<RegionSpec>, now: Instant) {
        self.measurement.cancel_all();
        self.registry.clear();
        for spec in regions {
            if let Err(e) = self.registry.register(spec) {
                warn!(error = %e, "Skipping region");
            }
        }
        self.measurement.request_all(&self.registry, now);
    }

    fn measure_due(&mut self, now: Instant) {
        let pass = self
            .measurement
            .poll(now, self.probe.as_mut(), &mut self.registry);
        if !pass.is_empty() {
            trace!(
                measured = pass.measured.len(),
                gave_up = pass.gave_up.len(),
                "Measurement pass"
            );
        }
    }

    fn after_scroll(&mut self, offset: ScrollOffset, now: Instant, out: &mut Vec<SessionOutput>) {
        self.probe.scroll_to(offset);
        self.measurement.request_all(&self.registry, now);
        self.measure_due(now);
        out.push(SessionOutput::Scrolled(offset));

        // The list moved under a resting finger
        if let Some(point) = self.last_point {
            if let Some(change) = self.focus.on_pointer_move(point, &self.registry) {
                self.announce(change, out);
            }
        }
    }
}

impl<H> std::fmt::Debug for GestureSession<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureSession")
            .field("regions", &self.registry.len())
            .field("focused", &self.focus.focused())
            .field("state", &self.state)
            .field("policy", &self.policy)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}
