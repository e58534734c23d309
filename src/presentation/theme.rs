use eframe::egui;
use tracing::{info, warn};

pub struct KioskPalette {
    pub bg: egui::Color32,
    pub fg: egui::Color32,
    pub stroke: egui::Color32,
    pub accent: egui::Color32,
}

impl KioskPalette {
    pub fn new(is_dark: bool) -> Self {
        if is_dark {
            Self {
                bg: egui::Color32::from_rgb(24, 24, 32),
                fg: egui::Color32::from_rgb(240, 240, 245),
                stroke: egui::Color32::from_rgb(90, 90, 110),
                accent: egui::Color32::from_rgb(99, 102, 241),
            }
        } else {
            Self {
                bg: egui::Color32::from_rgb(241, 245, 249),
                fg: egui::Color32::from_rgb(15, 23, 42),
                stroke: egui::Color32::from_rgb(203, 213, 225),
                accent: egui::Color32::from_rgb(79, 70, 229),
            }
        }
    }
}

/// Large touch targets and soft cards for a standing kiosk
pub fn configure_kiosk_style(ctx: &egui::Context, is_dark: bool) {
    let mut style = (*ctx.style()).clone();
    let palette = KioskPalette::new(is_dark);

    style
        .text_styles
        .iter_mut()
        .for_each(|(text_style, font_id)| {
            font_id.size = match text_style {
                egui::TextStyle::Heading => 32.0,
                egui::TextStyle::Body => 20.0,
                egui::TextStyle::Button => 24.0,
                _ => font_id.size,
            };
        });

    style.spacing.item_spacing = egui::vec2(14.0, 14.0);
    style.spacing.button_padding = egui::vec2(24.0, 16.0);

    let rounding = egui::Rounding::same(16.0);
    for widget in [
        &mut style.visuals.widgets.noninteractive,
        &mut style.visuals.widgets.inactive,
        &mut style.visuals.widgets.hovered,
        &mut style.visuals.widgets.active,
    ] {
        widget.rounding = rounding;
        widget.bg_stroke = egui::Stroke::new(1.0, palette.stroke);
        widget.fg_stroke = egui::Stroke::new(1.0, palette.fg);
    }
    style.visuals.widgets.noninteractive.bg_fill = palette.bg;
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(2.0, palette.accent);
    style.visuals.widgets.active.bg_fill = palette.accent;
    style.visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);

    style.visuals.selection.bg_fill = palette.accent;
    style.visuals.window_rounding = rounding;
    style.visuals.window_fill = palette.bg;
    style.visuals.panel_fill = palette.bg;
    style.visuals.override_text_color = Some(palette.fg);

    ctx.set_style(style);
}

/// Fonts with Hangul coverage, first match wins
const HANGUL_FONT_CANDIDATES: &[&str] = &[
    "C:\\Windows\\Fonts\\malgun.ttf",
    "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
];

/// egui's bundled fonts have no Hangul glyphs; borrow one from the system
pub fn install_hangul_font(ctx: &egui::Context) {
    let Some((path, bytes)) = HANGUL_FONT_CANDIDATES
        .iter()
        .find_map(|path| std::fs::read(path).ok().map(|bytes| (*path, bytes)))
    else {
        warn!("No Hangul font found, Korean text may not render");
        return;
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("hangul".to_owned(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push("hangul".to_owned());
    }
    ctx.set_fonts(fonts);
    info!("Loaded Hangul font from {}", path);
}
