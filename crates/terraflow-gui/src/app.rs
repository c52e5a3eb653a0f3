mod bus;
mod micro_ticker;
mod view;

use std::sync::{Arc, Mutex};

use iced::{
    Subscription, Task,
    event::{
        listen_with,
        wayland::{Event as WaylandEvent, OutputEvent},
    },
    time,
};
use log::{debug, error, info};
use terraflow_core::{
    ModuleContext,
    config::{Config, Stylesheet},
    event_bus::{BusEvent, EventReceiver, ModuleEvent},
    modules::{
        self, battery::Battery, clock::Clock, dashboard::Dashboard, window_title::WindowTitle,
        workspaces::Workspaces,
    },
    outputs::Outputs,
    services::ServicePorts,
    windows::{bar::BarLayout, registered_windows},
};
use wayland_client::protocol::wl_output::WlOutput;

use self::{
    bus::{BusFlushOutcome, drain_bus},
    micro_ticker::MicroTicker,
};

pub struct App {
    bus_receiver: Arc<Mutex<EventReceiver>>,
    micro_ticker: MicroTicker,
    stylesheet: Stylesheet,
    outputs: Outputs,
    bar: BarLayout,
    workspaces: Workspaces,
    window_title: WindowTitle,
    clock: Clock,
    battery: Battery,
    dashboard: Dashboard,
}

#[derive(Debug, Clone)]
pub enum Message {
    MicroTick,
    BusFlushed(BusFlushOutcome),
    Workspaces(modules::workspaces::Message),
    WindowTitle(modules::window_title::Message),
    Clock(modules::clock::Message),
    Battery(modules::battery::Message),
    Dashboard(modules::dashboard::Message),
    OutputEvent((OutputEvent, WlOutput)),
}

impl App {
    /// Build the application state and register the bar and dashboard
    /// windows for the given configuration.
    ///
    /// Modules start their background work on the runtime behind `ctx`.
    pub fn new(
        (config, stylesheet, ports, ctx, bus_receiver): (
            Config,
            Stylesheet,
            ServicePorts,
            ModuleContext,
            EventReceiver,
        ),
    ) -> impl FnOnce() -> (Self, Task<Message>) {
        move || {
            let windows = registered_windows(&config);
            info!("Registering windows: {windows:?}");
            let (outputs, task) = Outputs::new(&windows);

            let mut workspaces = Workspaces::new(Arc::clone(&ports.hyprland));
            let mut window_title = WindowTitle::new(Arc::clone(&ports.hyprland), &config.window_title);
            let mut clock = Clock::new(&config.clock);
            let mut battery = Battery::new(ports.battery.clone());
            let mut dashboard = Dashboard::new(&ports, &config.dashboard);

            if let Err(err) = workspaces.register(&ctx) {
                error!("Failed to register workspaces module: {err}");
            }
            if let Err(err) = window_title.register(&ctx) {
                error!("Failed to register window title module: {err}");
            }
            if let Err(err) = clock.register(&ctx) {
                error!("Failed to register clock module: {err}");
            }
            if let Err(err) = battery.register(&ctx) {
                error!("Failed to register battery module: {err}");
            }
            if let Err(err) = dashboard.register(&ctx) {
                error!("Failed to register dashboard module: {err}");
            }

            (
                App {
                    bus_receiver: Arc::new(Mutex::new(bus_receiver)),
                    micro_ticker: MicroTicker::default(),
                    stylesheet,
                    outputs,
                    bar: BarLayout::new(&config.bar),
                    workspaces,
                    window_title,
                    clock,
                    battery,
                    dashboard,
                },
                task,
            )
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::MicroTick => Task::perform(
                drain_bus(Arc::clone(&self.bus_receiver)),
                Message::BusFlushed,
            ),
            Message::BusFlushed(outcome) => {
                if outcome.had_error() {
                    error!("failed to drain event bus, keeping fast cadence");
                    self.micro_ticker.record_activity();
                }

                if outcome.is_empty() {
                    if !outcome.had_error() {
                        self.micro_ticker.record_idle();
                    }
                    Task::none()
                } else {
                    if !outcome.had_error() {
                        self.micro_ticker.record_activity();
                    }

                    let tasks: Vec<_> = outcome
                        .into_events()
                        .into_iter()
                        .filter_map(App::message_from_bus_event)
                        .map(|msg| self.update(msg))
                        .collect();

                    Task::batch(tasks)
                }
            }
            Message::Workspaces(message) => {
                self.workspaces.update(message);
                Task::none()
            }
            Message::WindowTitle(message) => {
                self.window_title.update(message);
                Task::none()
            }
            Message::Clock(message) => {
                self.clock.update(message);
                Task::none()
            }
            Message::Battery(message) => {
                self.battery.update(message);
                Task::none()
            }
            Message::Dashboard(message) => {
                self.dashboard.update(message);
                Task::none()
            }
            Message::OutputEvent((event, wl_output)) => match event {
                OutputEvent::Created(info) => {
                    info!("Output created: {info:?}");
                    self.outputs.add(wl_output)
                }
                OutputEvent::Removed => {
                    info!("Output destroyed");
                    self.outputs.remove(wl_output)
                }
                _ => Task::none(),
            },
        }
    }

    fn message_from_bus_event(event: BusEvent) -> Option<Message> {
        match event {
            BusEvent::Module(module) => App::message_from_module_event(module),
            _ => None,
        }
    }

    fn message_from_module_event(event: ModuleEvent) -> Option<Message> {
        match event {
            ModuleEvent::Workspaces(message) => Some(Message::Workspaces(message)),
            ModuleEvent::WindowTitle(message) => Some(Message::WindowTitle(message)),
            ModuleEvent::Clock(message) => Some(Message::Clock(message)),
            ModuleEvent::Battery(message) => Some(Message::Battery(message)),
            ModuleEvent::Dashboard(message) => Some(Message::Dashboard(message)),
            _ => None,
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let timer = time::every(self.micro_ticker.interval()).map(|_| Message::MicroTick);

        Subscription::batch(vec![
            timer,
            listen_with(|evt, _, _| match evt {
                iced::Event::PlatformSpecific(iced::event::PlatformSpecific::Wayland(
                    WaylandEvent::Output(event, wl_output),
                )) => {
                    debug!("Wayland event: {event:?}");
                    Some(Message::OutputEvent((event, wl_output)))
                }
                _ => None,
            }),
        ])
    }
}
