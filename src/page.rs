use super::*;

/// How a recorded location change was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// The host application's own client-side routing moved the location.
    PushState,
    /// The fallback assigned a new location (full navigation).
    HrefSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub kind: NavigationKind,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
    pub interval_ms: Option<i64>,
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) interval_ms: Option<i64>,
    pub(crate) task: TimerTask,
}

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) timers: bool,
    pub(crate) renders: bool,
    pub(crate) logs: Vec<String>,
    pub(crate) log_limit: usize,
    pub(crate) to_stderr: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            timers: true,
            renders: true,
            logs: Vec::new(),
            log_limit: 10_000,
            to_stderr: true,
        }
    }
}

/// The simulated host page: document tree, location, timer queue, and the
/// lifecycle signals the fallback engine reacts to. The clock is virtual;
/// nothing runs until the owner advances it.
#[derive(Debug)]
pub(crate) struct HostPage {
    pub(crate) dom: Dom,
    pub(crate) body: Option<NodeId>,
    pub(crate) active_element: Option<NodeId>,
    pub(crate) pathname: String,
    pub(crate) navigations: Vec<Navigation>,
    pub(crate) alerts: Vec<String>,
    pub(crate) content_loaded: bool,
    pub(crate) task_queue: Vec<ScheduledTask>,
    pub(crate) now_ms: i64,
    pub(crate) timer_step_limit: usize,
    next_timer_id: i64,
    next_task_order: i64,
    pub(crate) trace: TraceState,
}

impl HostPage {
    pub(crate) fn new(initial_path: &str, body_ready: bool) -> Self {
        let mut page = Self {
            dom: Dom::new(),
            body: None,
            active_element: None,
            pathname: normalize_path(initial_path),
            navigations: Vec::new(),
            alerts: Vec::new(),
            content_loaded: false,
            task_queue: Vec::new(),
            now_ms: 0,
            timer_step_limit: 10_000,
            next_timer_id: 1,
            next_task_order: 0,
            trace: TraceState::default(),
        };
        if body_ready {
            page.attach_body();
        }
        page
    }

    pub(crate) fn attach_body(&mut self) {
        if self.body.is_none() {
            let root = self.dom.root();
            self.body = Some(self.dom.create_element(root, "body", &[]));
        }
    }

    pub(crate) fn body_ready(&self) -> bool {
        self.body.is_some()
    }

    pub(crate) fn navigate_push(&mut self, path: &str) {
        let to = normalize_path(path);
        let from = std::mem::replace(&mut self.pathname, to.clone());
        self.navigations.push(Navigation {
            kind: NavigationKind::PushState,
            from,
            to,
        });
    }

    pub(crate) fn navigate_href(&mut self, path: &str) {
        let to = normalize_path(path);
        let from = std::mem::replace(&mut self.pathname, to.clone());
        self.trace_render_line(format!("[nav] href from={from} to={to}"));
        self.navigations.push(Navigation {
            kind: NavigationKind::HrefSet,
            from,
            to,
        });
    }

    pub(crate) fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    pub(crate) fn set_timeout(&mut self, task: TimerTask, delay_ms: i64) -> i64 {
        self.schedule(task, delay_ms, None)
    }

    pub(crate) fn set_interval(&mut self, task: TimerTask, delay_ms: i64) -> i64 {
        self.schedule(task, delay_ms, Some(delay_ms))
    }

    fn schedule(&mut self, task: TimerTask, delay_ms: i64, interval_ms: Option<i64>) -> i64 {
        let delay_ms = delay_ms.max(0);
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.allocate_task_order();
        let due_at = self.now_ms.saturating_add(delay_ms);
        self.trace_timer_line(format!(
            "[timer] schedule id={id} due_at={due_at} interval_ms={} task={task:?}",
            interval_desc(interval_ms)
        ));
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            interval_ms,
            task,
        });
        id
    }

    pub(crate) fn requeue_interval(&mut self, task: ScheduledTask, interval_ms: i64) {
        let delay_ms = interval_ms.max(0);
        let due_at = task.due_at.saturating_add(delay_ms);
        let order = self.allocate_task_order();
        self.trace_timer_line(format!(
            "[timer] requeue id={} due_at={due_at} interval_ms={delay_ms}",
            task.id
        ));
        self.task_queue.push(ScheduledTask {
            id: task.id,
            due_at,
            order,
            interval_ms: Some(delay_ms),
            task: task.task,
        });
    }

    fn allocate_task_order(&mut self) -> i64 {
        let order = self.next_task_order;
        self.next_task_order += 1;
        order
    }

    pub(crate) fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| {
                if let Some(limit) = due_limit {
                    task.due_at <= limit
                } else {
                    true
                }
            })
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    pub(crate) fn clear_timer(&mut self, timer_id: i64) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != timer_id);
        let existed = self.task_queue.len() != before;
        if existed {
            self.trace_timer_line(format!("[timer] clear id={timer_id}"));
        }
        existed
    }

    pub(crate) fn clear_all_timers(&mut self) -> usize {
        let cleared = self.task_queue.len();
        self.task_queue.clear();
        self.trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    pub(crate) fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                interval_ms: task.interval_ms,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub(crate) fn trace_timer_line(&mut self, line: String) {
        if self.trace.timers {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_render_line(&mut self, line: String) {
        if self.trace.renders {
            self.trace_line(line);
        }
    }

    fn trace_line(&mut self, line: String) {
        if !self.trace.enabled {
            return;
        }
        if self.trace.to_stderr {
            eprintln!("{line}");
        }
        self.trace.logs.push(line);
        while self.trace.logs.len() > self.trace.log_limit {
            self.trace.logs.remove(0);
        }
    }
}

fn interval_desc(interval_ms: Option<i64>) -> String {
    interval_ms
        .map(|value| value.to_string())
        .unwrap_or_else(|| "none".into())
}

pub(crate) fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
