use iced::{
    Task,
    platform_specific::shell::commands::layer_surface::{
        Anchor, KeyboardInteractivity, Layer, destroy_layer_surface, get_layer_surface,
    },
    runtime::platform_specific::wayland::layer_surface::{IcedOutput, SctkLayerSurfaceSettings},
    window::Id,
};
use wayland_client::protocol::wl_output::WlOutput;

use crate::{
    HEIGHT,
    windows::{Edges, WindowKind, WindowSpec},
};

/// Width of the dashboard panel in logical pixels.
pub const DASHBOARD_WIDTH: u32 = 320;

pub(crate) fn anchor(edges: Edges) -> Anchor {
    let mut anchor = Anchor::empty();
    if edges.top {
        anchor |= Anchor::TOP;
    }
    if edges.bottom {
        anchor |= Anchor::BOTTOM;
    }
    if edges.left {
        anchor |= Anchor::LEFT;
    }
    if edges.right {
        anchor |= Anchor::RIGHT;
    }
    anchor
}

pub(crate) fn layer_settings(
    id: Id,
    spec: &WindowSpec,
    wl_output: Option<WlOutput>,
) -> SctkLayerSurfaceSettings {
    let (size, layer) = match spec.kind {
        WindowKind::Bar => ((None, Some(HEIGHT as u32)), Layer::Bottom),
        WindowKind::Dashboard => ((Some(DASHBOARD_WIDTH), None), Layer::Top),
    };

    SctkLayerSurfaceSettings {
        id,
        namespace: format!("terraflow-{}", spec.name),
        size: Some(size),
        layer,
        pointer_interactivity: true,
        keyboard_interactivity: KeyboardInteractivity::None,
        exclusive_zone: if spec.exclusive { HEIGHT as i32 } else { 0 },
        output: wl_output.map_or(IcedOutput::Active, IcedOutput::Output),
        anchor: anchor(spec.anchor),
        ..Default::default()
    }
}

pub(crate) fn create_layer_surface<Message: 'static>(
    spec: &WindowSpec,
    wl_output: Option<WlOutput>,
) -> (Id, Task<Message>) {
    let id = Id::unique();
    (id, get_layer_surface(layer_settings(id, spec, wl_output)))
}

pub(crate) fn destroy_layer<Message: 'static>(id: Id) -> Task<Message> {
    destroy_layer_surface(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_reserves_its_height() {
        let settings = layer_settings(Id::unique(), &WindowSpec::bar(0), None);

        assert_eq!(settings.anchor, Anchor::TOP | Anchor::LEFT | Anchor::RIGHT);
        assert_eq!(settings.exclusive_zone, HEIGHT as i32);
        assert_eq!(settings.size, Some((None, Some(HEIGHT as u32))));
        assert_eq!(settings.namespace, "terraflow-bar-0");
    }

    #[test]
    fn dashboard_does_not_reserve_space() {
        let settings = layer_settings(Id::unique(), &WindowSpec::dashboard(), None);

        assert_eq!(settings.anchor, Anchor::RIGHT | Anchor::TOP | Anchor::BOTTOM);
        assert_eq!(settings.exclusive_zone, 0);
        assert_eq!(settings.size, Some((Some(DASHBOARD_WIDTH), None)));
    }
}
