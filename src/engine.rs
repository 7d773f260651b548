use std::collections::HashMap;

use super::*;

pub(crate) const READINESS_POLL_MS: i64 = 100;
pub(crate) const NAV_POLL_MS: i64 = 1000;
pub(crate) const SETTLE_MS: i64 = 500;
pub(crate) const REASSERT_MS: i64 = 3000;

/// The closed set of work the engine schedules on the page's timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerTask {
    /// One-shot, re-arming poll until the body exists.
    ReadinessPoll,
    /// Periodic location comparison; schedules a settling render on change.
    WatchLocation,
    /// Delayed render after a detected navigation, letting the host finish
    /// its own transition first.
    SettleRender,
    /// Unconditional periodic re-run of the bootstrap pipeline.
    ReassertRender,
}

/// Behavior attached to a rendered node. Bindings live exactly as long as
/// the surface content they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Navigate(String),
    FillDemoEmail(Role),
    FillDemoPassword(Role),
    SubmitLogin(Role),
    ShowHelp,
}

/// A recorded form submission. No credential verification happens; the
/// submit handler reads the fields and performs the simulated redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginAttempt {
    pub role: Role,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default)]
pub(crate) struct FallbackEngine {
    pub(crate) surface: Option<NodeId>,
    pub(crate) bindings: HashMap<NodeId, Action>,
    pub(crate) last_location: Option<String>,
    pub(crate) installed: bool,
    pub(crate) render_count: usize,
    pub(crate) last_view: Option<ViewDescriptor>,
    pub(crate) login_attempts: Vec<LoginAttempt>,
}

impl FallbackEngine {
    /// Registers the bootstrap triggers and makes the first render attempt.
    /// Calling it again is a no-op; every trigger converges on the same
    /// idempotent [`FallbackEngine::ensure_rendered`] pipeline, so
    /// redundant firings are harmless.
    pub(crate) fn install(&mut self, page: &mut HostPage) -> Result<()> {
        if self.installed {
            return Ok(());
        }
        self.installed = true;
        self.last_location = Some(page.pathname.clone());
        page.trace_render_line(format!("[boot] install path={}", page.pathname));

        self.ensure_rendered(page)?;
        if !page.body_ready() {
            page.set_timeout(TimerTask::ReadinessPoll, READINESS_POLL_MS);
        }
        page.set_interval(TimerTask::WatchLocation, NAV_POLL_MS);
        page.set_interval(TimerTask::ReassertRender, REASSERT_MS);
        Ok(())
    }

    /// The page's content-loaded signal, the third bootstrap trigger.
    pub(crate) fn content_loaded(&mut self, page: &mut HostPage) -> Result<()> {
        page.content_loaded = true;
        if self.installed {
            self.ensure_rendered(page)
        } else {
            Ok(())
        }
    }

    pub(crate) fn handle_task(&mut self, task: TimerTask, page: &mut HostPage) -> Result<()> {
        match task {
            TimerTask::ReadinessPoll => {
                if page.body_ready() {
                    self.ensure_rendered(page)
                } else {
                    page.set_timeout(TimerTask::ReadinessPoll, READINESS_POLL_MS);
                    Ok(())
                }
            }
            TimerTask::WatchLocation => {
                let current = page.pathname.clone();
                if self.last_location.as_deref() != Some(current.as_str()) {
                    page.trace_render_line(format!("[nav] change detected to={current}"));
                    self.last_location = Some(current);
                    page.set_timeout(TimerTask::SettleRender, SETTLE_MS);
                }
                Ok(())
            }
            TimerTask::SettleRender | TimerTask::ReassertRender => self.ensure_rendered(page),
        }
    }

    /// The full pipeline: ensure surface, classify the current path, then
    /// either render the fallback view or retract in favor of host
    /// content. A missing body is a retryable precondition, not an error.
    pub(crate) fn ensure_rendered(&mut self, page: &mut HostPage) -> Result<()> {
        let Some(surface) = ensure_surface(self, page)? else {
            page.trace_render_line("[boot] body not ready".into());
            return Ok(());
        };
        let descriptor = classify(&page.pathname);
        if host_content_present(page, surface, descriptor) {
            return retract_surface(self, page, surface);
        }
        render_view(self, page, surface, descriptor)?;
        show_surface(page, surface)?;
        self.render_count += 1;
        self.last_view = Some(descriptor);
        Ok(())
    }

    pub(crate) fn handle_action(&mut self, page: &mut HostPage, action: Action) -> Result<()> {
        match action {
            Action::Navigate(path) => {
                page.navigate_href(&path);
                Ok(())
            }
            Action::FillDemoEmail(role) => {
                self.fill_demo_field(page, "fallback-email", role_theme(role).demo_email)
            }
            Action::FillDemoPassword(role) => {
                self.fill_demo_field(page, "fallback-password", role_theme(role).demo_password)
            }
            Action::ShowHelp => {
                page.alert(HELP_MESSAGE);
                Ok(())
            }
            Action::SubmitLogin(role) => self.submit_login(page, role),
        }
    }

    fn fill_demo_field(&mut self, page: &mut HostPage, id: &str, value: &str) -> Result<()> {
        // Field gone means the surface was rebuilt under us; stay silent,
        // the next render re-attaches everything.
        let Some(field) = page.dom.by_id(id) else {
            return Ok(());
        };
        page.dom.set_value(field, value)?;
        page.active_element = Some(field);
        Ok(())
    }

    fn submit_login(&mut self, page: &mut HostPage, role: Role) -> Result<()> {
        let email = field_value(page, "fallback-email")?;
        let password = field_value(page, "fallback-password")?;
        page.trace_render_line(format!("[form] login submit role={role} email={email}"));
        self.login_attempts.push(LoginAttempt {
            role,
            email,
            password,
        });
        page.navigate_href(&format!("/{role}/home"));
        Ok(())
    }
}

fn field_value(page: &HostPage, id: &str) -> Result<String> {
    match page.dom.by_id(id) {
        Some(node) => page.dom.value(node),
        None => Ok(String::new()),
    }
}

/// Whether the primary engine has already produced the interactive tree
/// this view would substitute for, anywhere outside the overlay.
fn host_content_present(page: &HostPage, surface: NodeId, descriptor: ViewDescriptor) -> bool {
    let host_nodes = page
        .dom
        .all_element_nodes()
        .into_iter()
        .filter(|node| *node != surface && !page.dom.is_descendant_of(*node, surface))
        .collect::<Vec<_>>();

    match descriptor {
        ViewDescriptor::Chooser => host_nodes.iter().any(|node| {
            page.dom
                .tag_name(*node)
                .map(|tag| tag.eq_ignore_ascii_case("button"))
                .unwrap_or(false)
                && !page.dom.text_content(*node).trim().is_empty()
        }),
        ViewDescriptor::Login(_) => {
            let has_input_of = |kind: &str| {
                host_nodes.iter().any(|node| {
                    page.dom
                        .tag_name(*node)
                        .map(|tag| tag.eq_ignore_ascii_case("input"))
                        .unwrap_or(false)
                        && page.dom.attr(*node, "type").as_deref() == Some(kind)
                })
            };
            has_input_of("email") && has_input_of("password")
        }
    }
}
