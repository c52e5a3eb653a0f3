use iced::{Task, window::Id};
use log::debug;
use wayland_client::protocol::wl_output::WlOutput;

use super::wayland::{create_layer_surface, destroy_layer};
use crate::windows::{WindowKind, WindowSpec};

#[derive(Debug, Clone)]
struct Surface {
    id: Id,
    spec: WindowSpec,
    /// `None` while the surface sits on the active output.
    output: Option<WlOutput>,
}

/// Layer surfaces of the registered windows plus the outputs seen so far.
///
/// Every window starts on the active output. After each output change a
/// window bound to monitor `n` is placed on the `n`-th output currently
/// known, or on the active output when fewer than `n + 1` exist.
///
/// # Examples
///
/// ```
/// # use terraflow_core::outputs::Outputs;
/// # use terraflow_core::windows::{WindowKind, WindowSpec};
/// let (outputs, _task) = Outputs::new::<()>(&[WindowSpec::bar(0), WindowSpec::dashboard()]);
/// assert_eq!(outputs.ids().count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Outputs {
    surfaces: Vec<Surface>,
    wl_outputs: Vec<WlOutput>,
}

impl Outputs {
    /// Create one surface per window. The returned [`Task`] must be run.
    pub fn new<Message: 'static>(windows: &[WindowSpec]) -> (Self, Task<Message>) {
        let mut tasks = Vec::with_capacity(windows.len());
        let surfaces = windows
            .iter()
            .map(|spec| {
                let (id, task) = create_layer_surface(spec, None);
                tasks.push(task);
                Surface {
                    id,
                    spec: spec.clone(),
                    output: None,
                }
            })
            .collect();

        (
            Self {
                surfaces,
                wl_outputs: Vec::new(),
            },
            Task::batch(tasks),
        )
    }

    /// Window kind rendered on surface `id`.
    pub fn kind(&self, id: Id) -> Option<WindowKind> {
        self.surfaces
            .iter()
            .find(|surface| surface.id == id)
            .map(|surface| surface.spec.kind)
    }

    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.surfaces.iter().map(|surface| surface.id)
    }

    /// Track a new output and re-place every monitor-bound window.
    pub fn add<Message: 'static>(&mut self, wl_output: WlOutput) -> Task<Message> {
        self.wl_outputs.push(wl_output);
        self.rebind()
    }

    /// Forget an output and re-place every monitor-bound window.
    ///
    /// Output indices shift down, so a window bound to monitor `n` lands on
    /// whatever output is now `n`-th, or on the active output if none is.
    pub fn remove<Message: 'static>(&mut self, wl_output: WlOutput) -> Task<Message> {
        self.wl_outputs.retain(|output| *output != wl_output);
        self.rebind()
    }

    /// Recreate each surface whose output no longer matches its monitor.
    fn rebind<Message: 'static>(&mut self) -> Task<Message> {
        let placements: Vec<_> = self
            .surfaces
            .iter()
            .map(|surface| (surface.spec.monitor, surface.output.clone()))
            .collect();

        let mut tasks = Vec::new();
        for (index, target) in pending_moves(&placements, &self.wl_outputs) {
            let surface = &mut self.surfaces[index];
            debug!(
                "Moving {} to {}",
                surface.spec.name,
                if target.is_some() { "its monitor" } else { "the active output" }
            );

            tasks.push(destroy_layer(surface.id));
            let (id, task) = create_layer_surface(&surface.spec, target.clone());
            tasks.push(task);

            surface.id = id;
            surface.output = target;
        }

        Task::batch(tasks)
    }
}

/// Output a window bound to `monitor` belongs on. `None` means the active
/// output.
fn target_output<O: Clone>(monitor: Option<usize>, outputs: &[O]) -> Option<O> {
    monitor.and_then(|index| outputs.get(index)).cloned()
}

/// Indices of `placements` (monitor, current output) that must move, with
/// their new output.
fn pending_moves<O: Clone + PartialEq>(
    placements: &[(Option<usize>, Option<O>)],
    outputs: &[O],
) -> Vec<(usize, Option<O>)> {
    placements
        .iter()
        .enumerate()
        .filter_map(|(index, (monitor, current))| {
            let target = target_output(*monitor, outputs);
            (target != *current).then_some((index, target))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_window_gets_a_surface() {
        let (outputs, _task) = Outputs::new::<()>(&[WindowSpec::bar(0), WindowSpec::dashboard()]);

        let kinds: Vec<_> = outputs.ids().filter_map(|id| outputs.kind(id)).collect();
        assert_eq!(kinds, [WindowKind::Bar, WindowKind::Dashboard]);
    }

    #[test]
    fn unknown_surface_has_no_kind() {
        let (outputs, _task) = Outputs::new::<()>(&[WindowSpec::dashboard()]);

        assert_eq!(outputs.kind(Id::unique()), None);
    }

    type Placement = (Option<usize>, Option<&'static str>);

    /// Apply the moves for `outputs` and return the resulting outputs.
    fn settle(placements: &mut [Placement], outputs: &[&'static str]) -> Vec<Option<&'static str>> {
        for (index, target) in pending_moves(placements, outputs) {
            placements[index].1 = target;
        }
        placements.iter().map(|(_, output)| *output).collect()
    }

    #[test]
    fn target_follows_current_index() {
        assert_eq!(target_output(Some(1), &["a", "b"]), Some("b"));
        assert_eq!(target_output(Some(2), &["a", "b"]), None);
        assert_eq!(target_output(None, &["a", "b"]), None);
    }

    #[test]
    fn hotplug_keeps_bars_on_their_monitor_index() {
        // bar on monitor 0, bar on monitor 1, dashboard unbound
        let mut placements: Vec<Placement> = vec![(Some(0), None), (Some(1), None), (None, None)];

        assert_eq!(settle(&mut placements, &["A"]), [Some("A"), None, None]);
        assert_eq!(settle(&mut placements, &["A", "B"]), [Some("A"), Some("B"), None]);

        // unplug A: B becomes monitor 0
        assert_eq!(settle(&mut placements, &["B"]), [Some("B"), None, None]);

        // replug A: it is appended as monitor 1
        assert_eq!(settle(&mut placements, &["B", "A"]), [Some("B"), Some("A"), None]);
    }

    #[test]
    fn bar_never_stays_detached_while_its_index_exists() {
        let mut placements: Vec<Placement> = vec![(Some(0), None)];

        settle(&mut placements, &["A", "B"]);
        assert_eq!(settle(&mut placements, &["B"]), [Some("B")]);
        assert_eq!(settle(&mut placements, &[]), [None]);
        assert_eq!(settle(&mut placements, &["A"]), [Some("A")]);
    }

    #[test]
    fn settled_windows_are_not_recreated() {
        let placements: Vec<Placement> = vec![(Some(0), Some("A")), (None, None)];

        assert!(pending_moves(&placements, &["A", "B"]).is_empty());
        assert_eq!(pending_moves(&placements, &["B"]), [(0, Some("B"))]);
    }
}
