use super::state::{BannerKind, ConnectionState};
use super::Word2MdUploader;
use crate::upload::{collect_files, ConversionStatus, UploadFile};
use crate::utils::color::hex_or;
use crate::utils::file_size::format_size;
use crate::view::{Badge, DisplayRow, RowState};
use eframe::egui::{self, Align, Color32, RichText};
use rfd::FileDialog;

const ACCENT: Color32 = Color32::from_rgb(13, 110, 253);

/// Things the user asked for this frame, applied once drawing is done.
enum UiAction {
    Connect,
    ForgetToken,
    PickFiles,
    Refresh,
    Open(String),
    Submit(Vec<UploadFile>),
    AnswerPrompt(Option<String>),
}

fn banner_colors(kind: BannerKind) -> (Color32, Color32) {
    let (fill, text) = match kind {
        BannerKind::Info => ("#cff4fc", "#055160"),
        BannerKind::Success => ("#d1e7dd", "#0f5132"),
        BannerKind::Warning => ("#fff3cd", "#664d03"),
        BannerKind::Danger => ("#f8d7da", "#842029"),
    };
    (
        hex_or(fill, Color32::LIGHT_GRAY),
        hex_or(text, Color32::BLACK),
    )
}

fn muted(ui: &egui::Ui, text: impl Into<String>) -> RichText {
    RichText::new(text).color(ui.visuals().text_color().gamma_multiply(0.7))
}

impl Word2MdUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();

        if let Some(files) = Self::dropped_files(ctx) {
            actions.push(UiAction::Submit(files));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let footer_height = 28.0;
            let content_height = ui.available_height() - footer_height;

            egui::ScrollArea::vertical()
                .max_height(content_height)
                .show(ui, |ui| {
                    self.render_header(ui, &mut actions);
                    self.render_banner(ui);
                    ui.add_space(12.0);
                    self.render_drop_zone(ui, ctx, &mut actions);
                    ui.add_space(16.0);
                    self.render_artifacts(ui, &mut actions);
                    if !self.state.file_statuses.is_empty() {
                        ui.add_space(10.0);
                        self.render_details(ui);
                    }
                    ui.add_space(20.0);
                });

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(6.0);
                self.render_footer(ui);
            });
        });

        self.render_prompt(ctx, &mut actions);

        for action in actions {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::Connect => self.connect(),
            UiAction::ForgetToken => self.forget_token(),
            UiAction::PickFiles => {
                if let Some(paths) = self.file_dialog().pick_files() {
                    let files = collect_files(&paths);
                    self.submit(files);
                }
            }
            UiAction::Refresh => self.refresh(),
            UiAction::Open(url) => {
                if let Err(e) = open::that(&url) {
                    tracing::error!("Failed to open link {}: {}", url, e);
                }
            }
            UiAction::Submit(files) => self.submit(files),
            UiAction::AnswerPrompt(secret) => self.answer_prompt(secret),
        }
    }

    fn dropped_files(ctx: &egui::Context) -> Option<Vec<UploadFile>> {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return None;
        }

        let mut paths = Vec::new();
        let mut files = Vec::new();
        for file in dropped {
            if let Some(path) = file.path {
                paths.push(path);
            } else if let Some(bytes) = file.bytes {
                files.push(UploadFile::from_bytes(file.name, bytes));
            }
        }
        files.extend(collect_files(&paths));
        Some(files)
    }

    fn file_dialog(&self) -> FileDialog {
        let extensions: Vec<String> = self
            .config
            .accepted_patterns
            .iter()
            .filter_map(|p| p.strip_prefix("*."))
            .map(String::from)
            .collect();

        let dialog = FileDialog::new();
        if extensions.is_empty() {
            dialog
        } else {
            dialog.add_filter("Documents", extensions.as_slice())
        }
    }

    fn render_header(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.add_space(16.0);
        ui.vertical_centered(|ui| {
            ui.heading("Word2MD");
            ui.add_space(3.0);
            ui.label(muted(ui, "Drop Word documents to convert them to Markdown"));
        });
        ui.add_space(12.0);

        ui.horizontal(|ui| match &self.state.connection {
            Some(ConnectionState::Ready { login }) => {
                ui.label(format!(
                    "Connected as {} · {}/{} ({})",
                    login, login, self.config.repo, self.config.branch
                ));
                if ui.small_button("Forget token").clicked() {
                    actions.push(UiAction::ForgetToken);
                }
            }
            Some(ConnectionState::Disabled { reason }) => {
                ui.colored_label(
                    Color32::from_rgb(220, 50, 50),
                    format!("Uploads disabled: {}", reason),
                );
                if ui.button("Enter token").clicked() {
                    actions.push(UiAction::Connect);
                }
            }
            Some(ConnectionState::Connecting) | None => {
                ui.add(egui::Spinner::new());
                ui.label("Connecting...");
            }
        });
    }

    fn render_banner(&self, ui: &mut egui::Ui) {
        let Some(banner) = &self.state.banner else {
            return;
        };
        let (fill, text) = banner_colors(banner.kind);

        ui.add_space(8.0);
        egui::Frame::none()
            .fill(fill)
            .rounding(4.0)
            .inner_margin(egui::Margin::same(10.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.colored_label(text, &banner.message);
            });
    }

    fn render_drop_zone(
        &self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        actions: &mut Vec<UiAction>,
    ) {
        let enabled = self.state.can_upload();
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let stroke_color = if hovering && enabled {
            ACCENT
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };

        egui::Frame::none()
            .stroke(egui::Stroke::new(2.0, stroke_color))
            .rounding(8.0)
            .inner_margin(egui::Margin::same(24.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    if self.state.is_uploading {
                        ui.add(egui::Spinner::new());
                        ui.label("Uploading...");
                    } else if enabled {
                        ui.label(RichText::new("Drop files here").size(18.0));
                    } else {
                        ui.label(muted(ui, "Connect to GitHub to enable uploads"));
                    }
                    ui.add_space(6.0);
                    ui.add_enabled_ui(enabled, |ui| {
                        let button =
                            egui::Button::new("📁 Choose files").min_size(egui::vec2(160.0, 32.0));
                        if ui.add(button).clicked() {
                            actions.push(UiAction::PickFiles);
                        }
                    });
                });
            });
    }

    fn render_artifacts(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            ui.heading("Converted files");
            if self.state.is_refreshing {
                ui.add(egui::Spinner::new());
            } else if ui
                .small_button("⟳")
                .on_hover_text("Refresh list")
                .clicked()
            {
                actions.push(UiAction::Refresh);
            }
            let pending = self.state.pending_count();
            if pending > 0 {
                ui.label(muted(ui, format!("{} converting", pending)));
            }
        });
        ui.add_space(6.0);

        if self.state.rows.is_empty() {
            ui.label(muted(ui, "No converted files yet"));
            return;
        }

        egui::Grid::new("converted_files")
            .num_columns(4)
            .striped(true)
            .spacing(egui::vec2(12.0, 6.0))
            .show(ui, |ui| {
                for row in &self.state.rows {
                    Self::render_row(ui, row, actions);
                    ui.end_row();
                }
            });
    }

    fn render_row(ui: &mut egui::Ui, row: &DisplayRow, actions: &mut Vec<UiAction>) {
        match &row.state {
            RowState::Pending => {
                ui.horizontal(|ui| {
                    ui.add(egui::Spinner::new());
                    ui.label(&row.name);
                });
                let source = row.source.as_deref().unwrap_or("upload");
                ui.label(muted(ui, format!("converting {}", source)));
                ui.label("");
                ui.label("");
            }
            RowState::Ready {
                download_url,
                html_url,
                size,
                badge,
            } => {
                ui.horizontal(|ui| {
                    ui.label(&row.name);
                    match badge {
                        Some(Badge::Updating) => {
                            ui.colored_label(ACCENT, "updating");
                        }
                        Some(Badge::Failed { reason }) => {
                            ui.colored_label(Color32::from_rgb(220, 50, 50), "update failed")
                                .on_hover_text(reason.as_str());
                        }
                        None => {}
                    }
                });
                ui.label(format_size(*size));
                if ui
                    .add_enabled(download_url.is_some(), egui::Button::new("Download"))
                    .clicked()
                {
                    if let Some(url) = download_url {
                        actions.push(UiAction::Open(url.clone()));
                    }
                }
                if ui
                    .add_enabled(html_url.is_some(), egui::Button::new("View"))
                    .clicked()
                {
                    if let Some(url) = html_url {
                        actions.push(UiAction::Open(url.clone()));
                    }
                }
            }
        }
    }

    fn render_details(&mut self, ui: &mut egui::Ui) {
        if ui
            .button(if self.state.show_details {
                "Hide Details"
            } else {
                "Show Details"
            })
            .clicked()
        {
            self.state.show_details = !self.state.show_details;
        }

        if !self.state.show_details {
            return;
        }

        egui::ScrollArea::vertical()
            .id_source("status_details")
            .max_height(200.0)
            .show(ui, |ui| {
                egui::Frame::none()
                    .fill(ui.style().visuals.extreme_bg_color)
                    .show(ui, |ui| {
                        ui.add_space(8.0);
                        for status in self.state.file_statuses.iter().rev() {
                            let (icon, color, text) = match &status.status {
                                ConversionStatus::Uploading => (
                                    "⏳",
                                    Color32::from_rgb(150, 150, 150),
                                    format!("{} - Uploaded, converting...", status.name),
                                ),
                                ConversionStatus::Completed => (
                                    "✅",
                                    Color32::from_rgb(0, 180, 0),
                                    format!("{} - Converted", status.name),
                                ),
                                ConversionStatus::Timeout => (
                                    "⌛",
                                    Color32::from_rgb(200, 150, 0),
                                    format!("{} - Timed out waiting for conversion", status.name),
                                ),
                                ConversionStatus::Error(err) => (
                                    "❌",
                                    Color32::from_rgb(220, 50, 50),
                                    format!("{} - {}", status.name, err),
                                ),
                            };
                            ui.horizontal(|ui| {
                                ui.label(icon);
                                ui.colored_label(color, text);
                            });
                            ui.add_space(4.0);
                        }
                        ui.add_space(8.0);
                    });
            });
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        ui.label(muted(
            ui,
            format!(
                "Files go to {}/ and conversions are read from {}/",
                self.config.uploads_dir, self.config.converted_dir
            ),
        ));
    }

    fn render_prompt(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let reason = match &self.state.prompt {
            Some(request) => request.reason,
            None => return,
        };
        let input = &mut self.state.prompt_input;

        egui::Window::new("GitHub token")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(reason.message());
                ui.add_space(8.0);
                let response = ui.add(
                    egui::TextEdit::singleline(input)
                        .password(true)
                        .hint_text("ghp_...")
                        .desired_width(320.0),
                );
                let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() || entered {
                        actions.push(UiAction::AnswerPrompt(Some(input.clone())));
                    }
                    if ui.button("Cancel").clicked() {
                        actions.push(UiAction::AnswerPrompt(None));
                    }
                });
            });
    }
}
