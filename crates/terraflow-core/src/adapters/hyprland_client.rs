mod config;
mod listeners;
mod sync_ops;
mod util;

use std::sync::Arc;

pub use config::HyprlandClientConfig;

use hyprland::{
    data::{Client, Workspace, Workspaces},
    dispatch::{Dispatch, DispatchType, WorkspaceIdentifierWithSpecial},
    shared::{HyprData, HyprDataActive, HyprDataActiveOptional, HyprDataVec},
};
use log::debug;
use terraflow_proto::ports::hyprland::{
    HyprlandError, HyprlandEventStream, HyprlandPort, HyprlandWindowEvent, HyprlandWindowInfo,
    HyprlandWorkspaceEvent, HyprlandWorkspaceInfo, HyprlandWorkspaceSelector,
    HyprlandWorkspaceSnapshot,
};

const WORKSPACE_SNAPSHOT_OP: &str = "workspace_snapshot";
const CHANGE_WORKSPACE_OP: &str = "change_workspace";
const ACTIVE_WINDOW_OP: &str = "active_window";

/// [`HyprlandPort`] implementation backed by the `hyprland-rs` crate.
#[derive(Clone, Debug, Default)]
pub struct HyprlandClient {
    config: Arc<HyprlandClientConfig>,
}

impl HyprlandClient {
    /// Construct a new [`HyprlandClient`] using [`HyprlandClientConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a [`HyprlandClient`] with the provided configuration.
    pub fn with_config(config: HyprlandClientConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub(crate) fn backend_error<E>(operation: &'static str, err: E) -> HyprlandError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HyprlandError::Backend {
            operation,
            source: Box::new(err),
        }
    }
}

fn selector_identifier(selector: &HyprlandWorkspaceSelector) -> WorkspaceIdentifierWithSpecial<'_> {
    match selector {
        HyprlandWorkspaceSelector::Id(id) => WorkspaceIdentifierWithSpecial::Id(*id),
    }
}

impl HyprlandPort for HyprlandClient {
    fn workspace_events(
        &self,
    ) -> Result<HyprlandEventStream<HyprlandWorkspaceEvent>, HyprlandError> {
        listeners::spawn_workspace_listener(Arc::clone(&self.config))
    }

    fn workspace_snapshot(&self) -> Result<HyprlandWorkspaceSnapshot, HyprlandError> {
        sync_ops::execute_with_retry(&self.config, WORKSPACE_SNAPSHOT_OP, || {
            let workspaces = Workspaces::get()
                .map_err(|err| HyprlandClient::backend_error(WORKSPACE_SNAPSHOT_OP, err))?;
            let active = Workspace::get_active().ok().map(|workspace| workspace.id);

            let workspaces = workspaces
                .to_vec()
                .into_iter()
                .map(|workspace| HyprlandWorkspaceInfo {
                    id: workspace.id,
                    name: workspace.name,
                })
                .collect();

            Ok(HyprlandWorkspaceSnapshot {
                workspaces,
                active_workspace_id: active,
            })
        })
    }

    fn change_workspace(&self, workspace: HyprlandWorkspaceSelector) -> Result<(), HyprlandError> {
        debug!(
            target: "terraflow::hyprland",
            "{}",
            workspace.dispatch_command()
        );

        sync_ops::execute_with_retry(&self.config, CHANGE_WORKSPACE_OP, move || {
            Dispatch::call(DispatchType::Workspace(selector_identifier(&workspace)))
                .map_err(|err| HyprlandClient::backend_error(CHANGE_WORKSPACE_OP, err))
        })
    }

    fn window_events(&self) -> Result<HyprlandEventStream<HyprlandWindowEvent>, HyprlandError> {
        listeners::spawn_window_listener(Arc::clone(&self.config))
    }

    fn active_window(&self) -> Result<Option<HyprlandWindowInfo>, HyprlandError> {
        sync_ops::execute_with_retry(&self.config, ACTIVE_WINDOW_OP, || {
            Client::get_active()
                .map_err(|err| HyprlandClient::backend_error(ACTIVE_WINDOW_OP, err))
                .map(|client| {
                    client.map(|client| HyprlandWindowInfo {
                        title: client.title,
                        class: client.class,
                    })
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_maps_to_dispatch_identifier() {
        assert!(matches!(
            selector_identifier(&HyprlandWorkspaceSelector::Id(4)),
            WorkspaceIdentifierWithSpecial::Id(4)
        ));
        assert!(matches!(
            selector_identifier(&HyprlandWorkspaceSelector::Id(-98)),
            WorkspaceIdentifierWithSpecial::Id(-98)
        ));
    }

    #[test]
    fn workspace_events_require_runtime() {
        let client = HyprlandClient::new();

        let result = client.workspace_events();
        assert!(matches!(
            result,
            Err(HyprlandError::RuntimeUnavailable { operation: "workspace_events" })
        ));
    }

    #[test]
    fn window_events_require_runtime() {
        let client = HyprlandClient::new();

        assert!(matches!(
            client.window_events(),
            Err(HyprlandError::RuntimeUnavailable { operation: "window_events" })
        ));
    }
}
