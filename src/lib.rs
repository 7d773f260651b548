//! Deterministic fallback UI overlay runtime.
//!
//! When a page's primary rendering engine fails to produce an interactive
//! visual tree, this crate substitutes a functional alternate UI — a role
//! chooser and three role-specific login forms — and keeps it synchronized
//! with client-side navigation it cannot directly observe.
//!
//! The runtime carries its own simulated host page (arena DOM, location,
//! virtual-clock timer queue, lifecycle signals), so every timing-sensitive
//! behavior is exercised deterministically: nothing runs until the caller
//! advances the clock.
//!
//! ```
//! use fallback_overlay::FallbackRuntime;
//!
//! let mut runtime = FallbackRuntime::new("/login/staff");
//! runtime.install()?;
//! runtime.click("#demo-email")?;
//! runtime.click("#demo-password")?;
//! runtime.click("#fallback-submit")?;
//! assert_eq!(runtime.pathname(), "/staff/home");
//! # Ok::<(), fallback_overlay::Error>(())
//! ```

use std::error::Error as StdError;
use std::fmt;

mod dom;
mod engine;
mod page;
mod render;
mod route;
mod surface;
mod theme;

pub use engine::LoginAttempt;
pub use page::{Navigation, NavigationKind, PendingTimer};
pub use route::{ViewDescriptor, classify};
pub use theme::{Role, RoleTheme, role_theme};

use dom::*;
use engine::*;
use page::*;
use render::*;
use route::*;
use surface::*;
use theme::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Runtime(String),
    UnsupportedSelector(String),
    SelectorNotFound(String),
    BodyUnavailable,
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::BodyUnavailable => write!(f, "host body is not attached yet"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

/// The fallback engine installed into a simulated host page.
///
/// Construction gives a page with nothing scheduled; [`install`] registers
/// the bootstrap triggers and makes the first render attempt. Interaction
/// and assertion methods mirror what a browser-driving test would do.
///
/// [`install`]: FallbackRuntime::install
pub struct FallbackRuntime {
    page: HostPage,
    engine: FallbackEngine,
}

impl FallbackRuntime {
    /// A page whose body is available immediately.
    pub fn new(initial_path: &str) -> Self {
        Self {
            page: HostPage::new(initial_path, true),
            engine: FallbackEngine::default(),
        }
    }

    /// A page still early in its load: the body does not exist until
    /// [`attach_body`](FallbackRuntime::attach_body) is called, as with a
    /// script injected ahead of `document.body`.
    pub fn with_deferred_body(initial_path: &str) -> Self {
        Self {
            page: HostPage::new(initial_path, false),
            engine: FallbackEngine::default(),
        }
    }

    /// Installs the fallback: immediate render attempt, readiness poll,
    /// navigation watcher, and periodic re-assertion. Idempotent.
    pub fn install(&mut self) -> Result<()> {
        self.engine.install(&mut self.page)
    }

    /// Runs the idempotent `ensure surface → classify → render` pipeline
    /// once, outside any scheduled trigger.
    pub fn ensure_rendered(&mut self) -> Result<()> {
        self.engine.ensure_rendered(&mut self.page)
    }

    pub fn attach_body(&mut self) {
        self.page.attach_body();
    }

    /// Fires the page's content-loaded lifecycle signal.
    pub fn fire_content_loaded(&mut self) -> Result<()> {
        self.engine.content_loaded(&mut self.page)
    }

    /// A client-side route change performed by the host application. The
    /// engine cannot observe this directly; only the navigation watcher's
    /// polling picks it up.
    pub fn navigate(&mut self, path: &str) {
        self.page.navigate_push(path);
    }

    pub fn pathname(&self) -> &str {
        &self.page.pathname
    }

    pub fn navigations(&self) -> &[Navigation] {
        &self.page.navigations
    }

    pub fn alerts(&self) -> &[String] {
        &self.page.alerts
    }

    pub fn login_attempts(&self) -> &[LoginAttempt] {
        &self.engine.login_attempts
    }

    /// How many times a fallback view has been rendered into the surface.
    pub fn render_count(&self) -> usize {
        self.engine.render_count
    }

    pub fn last_rendered_view(&self) -> Option<ViewDescriptor> {
        self.engine.last_view
    }

    /// Whether the overlay surface element currently exists in the page.
    pub fn surface_present(&self) -> bool {
        self.engine
            .surface
            .map(|surface| self.page.dom.is_connected(surface))
            .unwrap_or(false)
    }

    pub fn focused_id(&self) -> Option<String> {
        self.page
            .active_element
            .and_then(|node| self.page.dom.attr(node, "id"))
    }

    // ---- host-side simulation -------------------------------------------

    /// Simulates the primary engine painting an interactive button.
    pub fn simulate_host_button(&mut self, label: &str) -> Result<()> {
        let Some(body) = self.page.body else {
            return Err(Error::BodyUnavailable);
        };
        let button = self.page.dom.create_element(body, "button", &[]);
        self.page.dom.create_text(button, label);
        Ok(())
    }

    /// Simulates the primary engine painting its own login form.
    pub fn simulate_host_login_form(&mut self) -> Result<()> {
        let Some(body) = self.page.body else {
            return Err(Error::BodyUnavailable);
        };
        let form = self.page.dom.create_element(body, "form", &[]);
        self.page
            .dom
            .create_element(form, "input", &[("type", "email")]);
        self.page
            .dom
            .create_element(form, "input", &[("type", "password")]);
        let button = self
            .page
            .dom
            .create_element(form, "button", &[("type", "submit")]);
        self.page.dom.create_text(button, "Sign In");
        Ok(())
    }

    /// Simulates an engine takeover that wipes everything under `body`,
    /// including the overlay surface.
    pub fn host_clear_body(&mut self) -> Result<()> {
        let Some(body) = self.page.body else {
            return Err(Error::BodyUnavailable);
        };
        self.page.dom.remove_children(body);
        Ok(())
    }

    // ---- interaction ----------------------------------------------------

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.page.dom.disabled(target) {
            return Ok(());
        }

        // Nearest bound ancestor-or-self, except submit bindings: those
        // only fire through form submission, never from a stray click on
        // the form area.
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            if let Some(action) = self.engine.bindings.get(&node) {
                if !matches!(action, Action::SubmitLogin(_)) {
                    let action = action.clone();
                    return self.engine.handle_action(&mut self.page, action);
                }
            }
            cursor = self.page.dom.parent(node);
        }

        if is_submit_control(&self.page.dom, target) {
            if let Some(form) = self.enclosing_form(target) {
                return self.submit_form(form);
            }
        }
        Ok(())
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.page.dom.disabled(target) {
            return Ok(());
        }
        let tag = self
            .page
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();
        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }
        self.page.dom.set_value(target, text)
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.page.active_element = Some(target);
        Ok(())
    }

    /// Submits the form containing the target (or the form itself).
    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let form = if self
            .page
            .dom
            .tag_name(target)
            .map(|t| t.eq_ignore_ascii_case("form"))
            .unwrap_or(false)
        {
            Some(target)
        } else {
            self.enclosing_form(target)
        };
        if let Some(form) = form {
            return self.submit_form(form);
        }
        Ok(())
    }

    fn submit_form(&mut self, form: NodeId) -> Result<()> {
        // Browser-native constraint validation is the only gate; the
        // engine adds no validation of its own.
        if let Some(blocked) = self.first_empty_required(form)? {
            self.page.trace_render_line(format!(
                "[form] submit blocked, required field empty: {blocked}"
            ));
            return Ok(());
        }
        let Some(action) = self.engine.bindings.get(&form).cloned() else {
            return Ok(());
        };
        self.engine.handle_action(&mut self.page, action)
    }

    fn first_empty_required(&self, form: NodeId) -> Result<Option<String>> {
        for node in self.page.dom.all_element_nodes() {
            if !self.page.dom.is_descendant_of(node, form) {
                continue;
            }
            if self.page.dom.required(node) && self.page.dom.value(node)?.is_empty() {
                let id = self
                    .page
                    .dom
                    .attr(node, "id")
                    .unwrap_or_else(|| "<anonymous>".into());
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    fn enclosing_form(&self, target: NodeId) -> Option<NodeId> {
        let mut cursor = self.page.dom.parent(target);
        while let Some(node) = cursor {
            if self
                .page
                .dom
                .tag_name(node)
                .map(|t| t.eq_ignore_ascii_case("form"))
                .unwrap_or(false)
            {
                return Some(node);
            }
            cursor = self.page.dom.parent(node);
        }
        None
    }

    // ---- assertions -----------------------------------------------------

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.page.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.page.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn count_matches(&self, selector: &str) -> Result<usize> {
        Ok(self.page.dom.query_selector_all(selector)?.len())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.page.dom.dump_node(target))
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.page
            .dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.page.dom.dump_node(node_id), 200)
    }

    // ---- virtual clock --------------------------------------------------

    pub fn now_ms(&self) -> i64 {
        self.page.now_ms
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Runtime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.page.now_ms;
        self.page.now_ms = self.page.now_ms.saturating_add(delta_ms);
        let ran = self.run_timer_queue(Some(self.page.now_ms), false)?;
        self.page.trace_timer_line(format!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms, from, self.page.now_ms, ran
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.page.now_ms {
            return Err(Error::Runtime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.page.now_ms
            )));
        }
        let from = self.page.now_ms;
        self.page.now_ms = target_ms;
        let ran = self.run_timer_queue(Some(self.page.now_ms), false)?;
        self.page.trace_timer_line(format!(
            "[timer] advance_to from={} to={} ran_due={}",
            from, self.page.now_ms, ran
        ));
        Ok(())
    }

    /// Drains the queue, advancing the clock to each task. With the
    /// periodic watcher or re-assertion armed this runs into the timer
    /// step limit, which is reported as an error rather than spinning.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.page.now_ms;
        let ran = self.run_timer_queue(None, true)?;
        self.page.trace_timer_line(format!(
            "[timer] flush from={} to={} ran={}",
            from, self.page.now_ms, ran
        ));
        Ok(())
    }

    /// Runs everything already due at the current clock, without moving it.
    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_timer_queue(Some(self.page.now_ms), false)?;
        self.page.trace_timer_line(format!(
            "[timer] run_due now_ms={} ran={}",
            self.page.now_ms, ran
        ));
        Ok(ran)
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.page.pending_timers()
    }

    pub fn clear_timer(&mut self, timer_id: i64) -> bool {
        self.page.clear_timer(timer_id)
    }

    pub fn clear_all_timers(&mut self) -> usize {
        self.page.clear_all_timers()
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.page.next_task_index(due_limit) {
            steps += 1;
            if steps > self.page.timer_step_limit {
                return Err(Error::Runtime(format!(
                    "timer step limit exceeded after {} steps",
                    self.page.timer_step_limit
                )));
            }
            let task = self.page.task_queue.remove(next_idx);
            if advance_clock && task.due_at > self.page.now_ms {
                self.page.now_ms = task.due_at;
            }
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.page.trace_timer_line(format!(
            "[timer] run id={} due_at={} task={:?} now_ms={}",
            task.id, task.due_at, task.task, self.page.now_ms
        ));
        let kind = task.task;
        self.engine.handle_task(kind, &mut self.page)?;
        if let Some(interval_ms) = task.interval_ms {
            self.page.requeue_interval(task, interval_ms);
        }
        Ok(())
    }

    // ---- tracing --------------------------------------------------------

    pub fn enable_trace(&mut self, enabled: bool) {
        self.page.trace.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.page.trace.logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.page.trace.to_stderr = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.page.trace.timers = enabled;
    }

    pub fn set_trace_renders(&mut self, enabled: bool) {
        self.page.trace.renders = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Runtime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.page.trace.log_limit = max_entries;
        while self.page.trace.logs.len() > self.page.trace.log_limit {
            self.page.trace.logs.remove(0);
        }
        Ok(())
    }
}

fn is_submit_control(dom: &Dom, target: NodeId) -> bool {
    let Some(tag) = dom.tag_name(target) else {
        return false;
    };
    if tag.eq_ignore_ascii_case("button") {
        return dom
            .attr(target, "type")
            .map(|t| !t.eq_ignore_ascii_case("button"))
            .unwrap_or(true);
    }
    if tag.eq_ignore_ascii_case("input") {
        return dom.attr(target, "type").as_deref() == Some("submit");
    }
    false
}
