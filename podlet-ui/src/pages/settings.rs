use std::{cell::RefCell, rc::Rc, sync::Arc};

use podlet_core::{catalog::Device, system_info};

use crate::{
    ctx::Ctx,
    menu::{MenuPage, MenuState, PlaceholderPage, RowSource, MENU_PAGE_SIZE},
    page::{NavAction, Page, PageHandle},
    render::{LineItem, LineKind, MenuSnapshot, Rendering},
};

/// Settings menu.  Children are long lived; selecting one reloads it first
/// so device lists and system readings are current when they appear.
pub struct SettingsSource {
    pages: Vec<PageHandle>,
}

impl SettingsSource {
    pub fn new(ctx: &Ctx) -> Self {
        let pages = vec![
            AboutPage::new(ctx.clone()).into_handle(),
            MenuPage::new(
                ctx.clone(),
                DeviceListSource::new(ctx, DeviceKind::AudioOutput),
            )
            .into_handle(),
            MenuPage::new(ctx.clone(), DeviceListSource::new(ctx, DeviceKind::Bluetooth))
                .into_handle(),
        ];
        Self { pages }
    }
}

impl RowSource for SettingsSource {
    fn title(&self) -> Arc<str> {
        "Settings".into()
    }

    fn total(&mut self, _ctx: &Ctx) -> usize {
        self.pages.len()
    }

    fn row(&mut self, _ctx: &Ctx, index: usize) -> Option<PageHandle> {
        self.pages.get(index).map(Rc::clone)
    }

    fn select(&mut self, _ctx: &Ctx, index: usize) -> Option<NavAction> {
        let child = self.pages.get(index)?;
        child.borrow_mut().reload();
        Some(NavAction::Push(Rc::clone(child)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    Bluetooth,
    AudioOutput,
}

impl DeviceKind {
    fn title(&self) -> &'static str {
        match self {
            Self::Bluetooth => "Bluetooth",
            Self::AudioOutput => "Audio Output",
        }
    }

    fn list(&self, ctx: &Ctx) -> Vec<Device> {
        match self {
            Self::Bluetooth => ctx.bluetooth.paired_devices(),
            Self::AudioOutput => ctx.audio_output.output_devices(),
        }
    }

    fn activate(&self, ctx: &Ctx, device: &Device) {
        match self {
            Self::Bluetooth => ctx.bluetooth.toggle(device),
            Self::AudioOutput => ctx.audio_output.select(device),
        }
    }
}

/// Paired Bluetooth devices or audio outputs.  Selecting a row acts on the
/// device, re-reads the list and returns to the settings menu.
pub struct DeviceListSource {
    kind: DeviceKind,
    devices: Vec<Device>,
}

impl DeviceListSource {
    pub fn new(ctx: &Ctx, kind: DeviceKind) -> Self {
        Self {
            kind,
            devices: kind.list(ctx),
        }
    }

    #[cfg(test)]
    pub(crate) fn device_at(&self, index: usize) -> Option<&Device> {
        self.devices.get(index)
    }
}

impl RowSource for DeviceListSource {
    fn title(&self) -> Arc<str> {
        self.kind.title().into()
    }

    fn total(&mut self, _ctx: &Ctx) -> usize {
        self.devices.len()
    }

    fn row(&mut self, ctx: &Ctx, index: usize) -> Option<PageHandle> {
        let device = self.devices.get(index)?;
        Some(PlaceholderPage::new(ctx.clone(), Arc::clone(&device.name), false).into_handle())
    }

    fn select(&mut self, ctx: &Ctx, index: usize) -> Option<NavAction> {
        let device = self.devices.get(index)?.clone();
        self.kind.activate(ctx, &device);
        self.devices = self.kind.list(ctx);
        Some(NavAction::Pop)
    }

    fn reload(&mut self, ctx: &Ctx) {
        self.devices = self.kind.list(ctx);
    }
}

struct InfoLine {
    title: Arc<str>,
    value: Arc<str>,
}

impl InfoLine {
    fn new(title: &str, value: String) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

fn info_lines() -> Vec<InfoLine> {
    vec![
        InfoLine::new("Model", system_info::DEVICE_MODEL.to_string()),
        InfoLine::new("Capacity", system_info::disk_capacity()),
        InfoLine::new("Version", system_info::os_version()),
        InfoLine::new("Serial", system_info::serial_number()),
        InfoLine::new("Uptime", system_info::uptime()),
    ]
}

/// Read-only system information panel.  Unlike the menus, up and down move
/// the whole window: up reveals the next row at the bottom, down the
/// previous row at the top, and the highlight rides along the window edge.
pub struct AboutPage {
    ctx: Ctx,
    items: Vec<InfoLine>,
    state: MenuState,
}

impl AboutPage {
    pub fn new(ctx: Ctx) -> Self {
        Self {
            ctx,
            items: info_lines(),
            state: MenuState::new(),
        }
    }

    pub fn into_handle(self) -> PageHandle {
        Rc::new(RefCell::new(self))
    }

    #[cfg(test)]
    fn with_items(ctx: Ctx, items: Vec<InfoLine>) -> Self {
        Self {
            ctx,
            items,
            state: MenuState::new(),
        }
    }
}

impl Page for AboutPage {
    fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    fn header(&self) -> Arc<str> {
        "About".into()
    }

    fn has_sub_page(&self) -> bool {
        true
    }

    fn reload(&mut self) {
        self.items = info_lines();
    }

    fn nav_up(&mut self) {
        if self.items.len() <= self.state.page_start + MENU_PAGE_SIZE {
            return;
        }
        self.state.page_start += 1;
        self.state.index = self.state.page_start + MENU_PAGE_SIZE - 1;
    }

    fn nav_down(&mut self) {
        if self.state.page_start == 0 {
            return;
        }
        self.state.page_start -= 1;
        self.state.index = self.state.page_start;
    }

    fn nav_select(&mut self) -> NavAction {
        NavAction::Stay
    }

    fn render(&mut self) -> Rendering {
        let total = self.items.len();
        let mut lines = Vec::with_capacity(MENU_PAGE_SIZE);
        for i in self.state.page_start..self.state.page_start + MENU_PAGE_SIZE {
            match self.items.get(i) {
                Some(item) => lines.push(LineItem {
                    title: item.title.clone(),
                    kind: if i == self.state.index {
                        LineKind::Highlighted
                    } else {
                        LineKind::Normal
                    },
                    show_arrow: false,
                    selectable: false,
                    value: Some(item.value.clone()),
                }),
                None => lines.push(LineItem::empty()),
            }
        }
        Rendering::Menu(MenuSnapshot {
            header: self.header(),
            lines,
            cursor_index: self.state.index,
            total_count: total,
            now_playing: self.ctx.api.now_playing(),
            has_internet: self.ctx.api.has_internet(),
        })
    }
}
