use std::{sync::Arc, time::Duration};

use log::{debug, error};
use terraflow_proto::ports::hyprland::HyprlandPort;
use tokio::{task::JoinHandle, time::sleep};
use tokio_stream::StreamExt;

use crate::{
    ModuleContext,
    config::{WindowTitleConfig, WindowTitleMode},
    event_bus::ModuleEvent,
    modules::ModuleError,
    reactive::Observable,
    utils::truncate_text,
};

const WINDOW_EVENT_RETRY_DELAY: Duration = Duration::from_millis(500);

fn get_window(port: &dyn HyprlandPort, config: &WindowTitleConfig) -> Option<String> {
    match port.active_window() {
        Ok(Some(window)) => Some(match config.mode {
            WindowTitleMode::Title => window.title,
            WindowTitleMode::Class => window.class,
        }),
        Ok(None) => None,
        Err(err) => {
            error!("failed to retrieve active window: {err}");
            None
        }
    }
}

fn read_title(port: &dyn HyprlandPort, config: &WindowTitleConfig) -> Option<String> {
    get_window(port, config)
        .map(|value| truncate_text(&value, config.truncate_title_after_length))
}

#[derive(Debug, Clone)]
pub enum Message {
    TitleChanged(Option<String>),
}

/// Title or class of the focused window.
pub struct WindowTitle {
    hyprland: Arc<dyn HyprlandPort>,
    config: WindowTitleConfig,
    value: Option<String>,
    source: Observable<Option<String>>,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for WindowTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowTitle")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl WindowTitle {
    pub fn new(hyprland: Arc<dyn HyprlandPort>, config: &WindowTitleConfig) -> Self {
        let value = read_title(hyprland.as_ref(), config);

        Self {
            hyprland,
            config: config.clone(),
            source: Observable::new(value.clone()),
            value,
            tasks: Vec::new(),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Follow focus changes reported by Hyprland.
    pub fn register(&mut self, ctx: &ModuleContext) -> Result<(), ModuleError> {
        for task in self.tasks.drain(..) {
            task.abort();
        }

        let handle = ctx.runtime_handle();
        self.tasks.push(self.source.bind(
            handle,
            ctx.module_sender(ModuleEvent::WindowTitle),
            Message::TitleChanged,
        ));
        self.tasks.push(handle.spawn(listen(
            Arc::clone(&self.hyprland),
            self.config.clone(),
            self.source.clone(),
        )));

        Ok(())
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::TitleChanged(value) => self.value = value,
        }
    }
}

impl Drop for WindowTitle {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

async fn refresh(
    hyprland: &Arc<dyn HyprlandPort>,
    config: &WindowTitleConfig,
    source: &Observable<Option<String>>,
) {
    let port = Arc::clone(hyprland);
    let config = config.clone();

    match tokio::task::spawn_blocking(move || read_title(port.as_ref(), &config)).await {
        Ok(title) => {
            source.set(title);
        }
        Err(err) => error!("active window task failed: {err}"),
    }
}

async fn listen(
    hyprland: Arc<dyn HyprlandPort>,
    config: WindowTitleConfig,
    source: Observable<Option<String>>,
) {
    loop {
        match hyprland.window_events() {
            Ok(mut stream) => {
                refresh(&hyprland, &config, &source).await;

                while let Some(event) = stream.next().await {
                    match event {
                        Ok(event) => debug!("window event: {event:?}"),
                        Err(err) => error!("window event stream error: {err}"),
                    }

                    refresh(&hyprland, &config, &source).await;
                }
            }
            Err(err) => {
                error!("failed to start window event stream, retrying: {err}");
            }
        }

        sleep(WINDOW_EVENT_RETRY_DELAY).await;
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use terraflow_proto::ports::hyprland::{HyprlandWindowEvent, HyprlandWindowInfo};
    use tokio::runtime::Handle;

    use super::*;
    use crate::{
        event_bus::{BusEvent, EventBus},
        test_utils::MockHyprlandPort,
    };

    #[test]
    fn initializes_title_from_port() {
        let port = Arc::new(MockHyprlandPort::with_active_window("Demo", "Class"));

        let module = WindowTitle::new(port, &WindowTitleConfig::default());

        assert_eq!(module.value(), Some("Demo"));
    }

    #[test]
    fn class_mode_shows_window_class() {
        let port = Arc::new(MockHyprlandPort::with_active_window("Demo", "firefox"));
        let config = WindowTitleConfig {
            mode: WindowTitleMode::Class,
            ..Default::default()
        };

        let module = WindowTitle::new(port, &config);

        assert_eq!(module.value(), Some("firefox"));
    }

    #[test]
    fn long_titles_are_truncated() {
        let port = Arc::new(MockHyprlandPort::with_active_window("Quarterly report", "x"));
        let config = WindowTitleConfig {
            truncate_title_after_length: 9,
            ..Default::default()
        };

        let module = WindowTitle::new(port, &config);

        assert_eq!(module.value(), Some("Quarterly..."));
    }

    #[test]
    fn no_focused_window_shows_nothing() {
        let module = WindowTitle::new(
            Arc::new(MockHyprlandPort::default()),
            &WindowTitleConfig::default(),
        );

        assert_eq!(module.value(), None);
    }

    #[tokio::test]
    async fn focus_changes_reach_the_module() {
        let port = Arc::new(MockHyprlandPort::with_active_window("Editor", "code"));
        let bus = EventBus::new(NonZeroUsize::new(8).expect("capacity"));
        let ctx = ModuleContext::new(bus.sender(), Handle::current());
        let mut module = WindowTitle::new(port.clone(), &WindowTitleConfig::default());
        module.register(&ctx).expect("register");
        tokio::task::yield_now().await;

        port.set_active_window(Some(HyprlandWindowInfo {
            title: "Browser".into(),
            class: "firefox".into(),
        }));
        port.emit_window(HyprlandWindowEvent::ActiveWindowChanged);

        for _ in 0..200 {
            for event in bus.drain().expect("drain") {
                if let BusEvent::Module(ModuleEvent::WindowTitle(message)) = event {
                    module.update(message);
                }
            }
            if module.value() == Some("Browser") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(module.value(), Some("Browser"));

        port.set_active_window(None);
        port.emit_window(HyprlandWindowEvent::WindowClosed);

        for _ in 0..200 {
            for event in bus.drain().expect("drain") {
                if let BusEvent::Module(ModuleEvent::WindowTitle(message)) = event {
                    module.update(message);
                }
            }
            if module.value().is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(module.value(), None);
    }
}
