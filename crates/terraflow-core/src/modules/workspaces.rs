use std::{sync::Arc, time::Duration};

use itertools::Itertools;
use log::{debug, error};
use terraflow_proto::ports::hyprland::{
    HyprlandPort, HyprlandWorkspaceSelector, HyprlandWorkspaceSnapshot,
};
use tokio::{runtime::Handle, task::JoinHandle, time::sleep};
use tokio_stream::StreamExt;

use crate::{
    ModuleContext, event_bus::ModuleEvent, modules::ModuleError, reactive::Observable,
};

const WORKSPACE_EVENT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// CSS-style class applied to the focused workspace button.
pub const FOCUSED_CLASS: &str = "focused";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Workspace {
    pub id: i32,
}

/// Single highlight predicate of the strip.
pub fn is_focused(id: i32, active: Option<i32>) -> bool {
    active == Some(id)
}

/// IPC text equivalent of switching to workspace `id`.
///
/// ```
/// use terraflow_core::modules::workspaces::workspace_dispatch_command;
///
/// assert_eq!(workspace_dispatch_command(3), "dispatch workspace 3");
/// ```
pub fn workspace_dispatch_command(id: i32) -> String {
    HyprlandWorkspaceSelector::Id(id).dispatch_command()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceButton {
    pub id: i32,
    pub label: String,
    pub class: &'static str,
}

fn map_snapshot_to_workspaces(snapshot: &HyprlandWorkspaceSnapshot) -> Vec<Workspace> {
    snapshot
        .workspaces
        .iter()
        .unique_by(|workspace| workspace.id)
        .map(|workspace| Workspace { id: workspace.id })
        .sorted_by_key(|workspace| workspace.id)
        .collect()
}

fn read_snapshot(port: &dyn HyprlandPort) -> Option<HyprlandWorkspaceSnapshot> {
    match port.workspace_snapshot() {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            error!("failed to retrieve workspace snapshot: {err}");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    ListChanged(Vec<Workspace>),
    ActiveChanged(Option<i32>),
    ChangeWorkspace(i32),
}

/// Workspace strip.
///
/// The workspace list and the active id are observed independently: the
/// listener publishes each through its own [`Observable`], and an
/// active-id change never rebuilds the list.
pub struct Workspaces {
    hyprland: Arc<dyn HyprlandPort>,
    workspaces: Arc<[Workspace]>,
    active: Option<i32>,
    list_source: Observable<Vec<Workspace>>,
    active_source: Observable<Option<i32>>,
    runtime: Option<Handle>,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for Workspaces {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspaces")
            .field("workspaces", &self.workspaces)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Workspaces {
    pub fn new(hyprland: Arc<dyn HyprlandPort>) -> Self {
        let snapshot = read_snapshot(hyprland.as_ref()).unwrap_or_default();
        let workspaces = map_snapshot_to_workspaces(&snapshot);
        let active = snapshot.active_workspace_id;

        Self {
            hyprland,
            workspaces: workspaces.clone().into(),
            active,
            list_source: Observable::new(workspaces),
            active_source: Observable::new(active),
            runtime: None,
            tasks: Vec::new(),
        }
    }

    pub fn items(&self) -> &Arc<[Workspace]> {
        &self.workspaces
    }

    pub fn active(&self) -> Option<i32> {
        self.active
    }

    /// One button per workspace, in id order.
    pub fn buttons(&self) -> impl Iterator<Item = WorkspaceButton> + '_ {
        self.workspaces.iter().map(|workspace| WorkspaceButton {
            id: workspace.id,
            label: workspace.id.to_string(),
            class: if is_focused(workspace.id, self.active) {
                FOCUSED_CLASS
            } else {
                ""
            },
        })
    }

    /// Start the Hyprland listener and forward list and active-id changes to
    /// the UI.
    pub fn register(&mut self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        for task in self.tasks.drain(..) {
            task.abort();
        }

        let handle = ctx.runtime_handle();
        self.runtime = Some(handle.clone());
        self.tasks.push(self.list_source.bind(
            handle,
            ctx.module_sender(ModuleEvent::Workspaces),
            Message::ListChanged,
        ));
        self.tasks.push(self.active_source.bind(
            handle,
            ctx.module_sender(ModuleEvent::Workspaces),
            Message::ActiveChanged,
        ));
        self.tasks.push(handle.spawn(listen(
            Arc::clone(&self.hyprland),
            self.list_source.clone(),
            self.active_source.clone(),
        )));

        Ok(())
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::ListChanged(workspaces) => {
                self.workspaces = workspaces.into();
            }
            Message::ActiveChanged(active) => {
                self.active = active;
            }
            Message::ChangeWorkspace(id) => {
                debug!("{}", workspace_dispatch_command(id));

                let port = Arc::clone(&self.hyprland);
                let dispatch = move || {
                    if let Err(err) = port.change_workspace(HyprlandWorkspaceSelector::Id(id)) {
                        error!("failed to dispatch workspace change: {err}");
                    }
                };

                // The dispatch blocks on the Hyprland socket; keep it off the
                // UI thread once a runtime is known.
                match &self.runtime {
                    Some(runtime) => {
                        runtime.spawn_blocking(dispatch);
                    }
                    None => dispatch(),
                }
            }
        }
    }
}

impl Drop for Workspaces {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

async fn refresh(
    hyprland: &Arc<dyn HyprlandPort>,
    list: &Observable<Vec<Workspace>>,
    active: &Observable<Option<i32>>,
) {
    let port = Arc::clone(hyprland);
    let snapshot = match tokio::task::spawn_blocking(move || read_snapshot(port.as_ref())).await
    {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => return,
        Err(err) => {
            error!("workspace snapshot task failed: {err}");
            return;
        }
    };

    list.set(map_snapshot_to_workspaces(&snapshot));
    active.set(snapshot.active_workspace_id);
}

async fn listen(
    hyprland: Arc<dyn HyprlandPort>,
    list: Observable<Vec<Workspace>>,
    active: Observable<Option<i32>>,
) {
    loop {
        match hyprland.workspace_events() {
            Ok(mut stream) => {
                refresh(&hyprland, &list, &active).await;

                while let Some(event) = stream.next().await {
                    match event {
                        Ok(event) => {
                            debug!("workspace event: {event:?}");
                            refresh(&hyprland, &list, &active).await;
                        }
                        Err(err) => {
                            // The adapter reconnects on its own; resync in case
                            // events were lost meanwhile.
                            error!("workspace event stream error: {err}");
                            refresh(&hyprland, &list, &active).await;
                        }
                    }
                }
            }
            Err(err) => {
                error!("failed to start workspace event stream, retrying: {err}");
            }
        }

        debug!("workspace event stream ended, reopening");

        sleep(WORKSPACE_EVENT_RETRY_DELAY).await;
    }
}
