use iced::{
    Alignment, Element, Length, alignment,
    widget::{Row, button, container, text},
};
use terraflow_core::{
    modules::workspaces::{FOCUSED_CLASS, Message as WorkspacesMessage, Workspaces},
    style::workspace_button_style,
};

use crate::app::Message;

/// One button per workspace in ascending id order. The focused one is wider.
pub fn render_workspaces(workspaces: &Workspaces) -> Element<'_, Message> {
    Row::with_children(
        workspaces
            .buttons()
            .map(|workspace| {
                button(
                    container(text(workspace.label).size(10))
                        .align_x(alignment::Horizontal::Center)
                        .align_y(alignment::Vertical::Center),
                )
                .style(workspace_button_style(workspace.class))
                .padding([0, 0])
                .on_press(Message::Workspaces(WorkspacesMessage::ChangeWorkspace(workspace.id)))
                .width(if workspace.class == FOCUSED_CLASS {
                    Length::Fixed(32.)
                } else {
                    Length::Fixed(16.)
                })
                .height(16)
                .into()
            })
            .collect::<Vec<Element<'_, Message>>>(),
    )
    .padding([2, 0])
    .spacing(4)
    .align_y(Alignment::Center)
    .into()
}
